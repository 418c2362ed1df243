use eclio_error::{EclResult, ecl_bail, ecl_err};
use regex::Regex;

/// Placeholder in `WGNAMES` for vectors that do not belong to a well or group.
const NO_WELL_OR_GROUP: &str = ":+:+:+:+";
/// Segment keywords that carry neither a well nor a segment number.
const SEGMENT_EXCEPTIONS: [&str; 3] = ["STEPTYPE", "SEPARATE", "SUMTHIN"];
/// Region-to-region flows pack both regions into one number: `r1 + 32768 * (r2 + 10)`.
const REGION_PAIR_BASE: i32 = 1 << 15;

/// Grid extent used to unpack global cell indices into `i,j,k`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct GridDims {
    pub nx: i32,
    pub ny: i32,
}

impl GridDims {
    pub fn try_new(nx: i32, ny: i32) -> EclResult<Self> {
        if nx <= 0 || ny <= 0 {
            ecl_bail!(MalformedFile: "invalid grid dimensions {} x {}", nx, ny);
        }
        Ok(Self { nx, ny })
    }

    /// One based `i,j,k` of a one based global cell index, `None` outside the grid's range.
    fn ijk(&self, global: i32) -> Option<String> {
        if global <= 0 {
            return None;
        }
        let g = global - 1;
        let layer = self.nx.checked_mul(self.ny)?;
        let k = 1 + g / layer;
        let rest = g % layer;
        Some(format!("{},{},{}", 1 + rest % self.nx, 1 + rest / self.nx, k))
    }
}

/// Build the summary key of one vector, e.g. `WBHP:PROD1` or `BPR:3,4,5`.
///
/// Returns `None` for vectors that have no addressable key: well and group vectors without
/// a name, and block or connection vectors without a valid cell.
pub(crate) fn key_string(keyword: &str, wgname: &str, num: i32, dims: GridDims) -> Option<String> {
    let category = keyword.chars().next()?;
    match category {
        'A' => Some(format!("{keyword}:{num}")),
        'B' => dims.ijk(num).map(|ijk| format!("{keyword}:{ijk}")),
        'C' => dims.ijk(num).map(|ijk| format!("{keyword}:{wgname}:{ijk}")),
        'G' | 'W' => (wgname != NO_WELL_OR_GROUP).then(|| format!("{keyword}:{wgname}")),
        'R' if keyword.as_bytes().get(2) == Some(&b'F') => {
            let r1 = num % REGION_PAIR_BASE;
            let r2 = num / REGION_PAIR_BASE - 10;
            Some(format!("{keyword}:{r1}-{r2}"))
        }
        'R' => Some(format!("{keyword}:{num}")),
        'S' if SEGMENT_EXCEPTIONS.contains(&keyword) => Some(keyword.to_string()),
        'S' => Some(format!("{keyword}:{wgname}:{num}")),
        _ => Some(keyword.to_string()),
    }
}

/// Compile a shell style pattern (`*`, `?`, `[...]`, `[!...]`) into an anchored regex.
pub(crate) fn glob_regex(pattern: &str) -> EclResult<Regex> {
    let mut expr = String::with_capacity(pattern.len() + 8);
    expr.push('^');
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '*' => expr.push_str(".*"),
            '?' => expr.push('.'),
            '[' => {
                expr.push('[');
                let mut first = true;
                loop {
                    match chars.next() {
                        Some(']') if !first => break,
                        Some('!') if first => expr.push('^'),
                        Some(c @ ('\\' | '[' | ']' | '^' | '&' | '~' | '-')) if c != '-' || first => {
                            expr.push('\\');
                            expr.push(c);
                        }
                        Some(c) => expr.push(c),
                        None => ecl_bail!("unterminated character class in pattern '{}'", pattern),
                    }
                    first = false;
                }
                expr.push(']');
            }
            c => expr.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
        }
    }
    expr.push('$');
    Regex::new(&expr).map_err(|err| ecl_err!("invalid pattern '{}': {}", pattern, err))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    const DIMS: GridDims = GridDims { nx: 10, ny: 5 };

    #[rstest]
    #[case("WBHP", "PROD1", 0, Some("WBHP:PROD1"))]
    #[case("WBHP", ":+:+:+:+", 0, None)]
    #[case("GOPR", "NORTH", 0, Some("GOPR:NORTH"))]
    #[case("FOPT", ":+:+:+:+", 0, Some("FOPT"))]
    #[case("TIME", ":+:+:+:+", 0, Some("TIME"))]
    #[case("AAQR", ":+:+:+:+", 2, Some("AAQR:2"))]
    #[case("BPR", ":+:+:+:+", 1, Some("BPR:1,1,1"))]
    #[case("BPR", ":+:+:+:+", 64, Some("BPR:4,2,2"))]
    #[case("COPR", "OP_1", 12, Some("COPR:OP_1:2,2,1"))]
    #[case("BPR", ":+:+:+:+", 0, None)]
    #[case("BPR", ":+:+:+:+", -4, None)]
    #[case("COPR", "OP_1", 0, None)]
    #[case("RPR", ":+:+:+:+", 3, Some("RPR:3"))]
    #[case("RGFR", ":+:+:+:+", 2 + 32768 * 13, Some("RGFR:2-3"))]
    #[case("SOFR", "OP_1", 7, Some("SOFR:OP_1:7"))]
    #[case("STEPTYPE", ":+:+:+:+", 0, Some("STEPTYPE"))]
    fn key_strings(
        #[case] keyword: &str,
        #[case] wgname: &str,
        #[case] num: i32,
        #[case] expected: Option<&str>,
    ) {
        assert_eq!(key_string(keyword, wgname, num, DIMS).as_deref(), expected);
    }

    #[rstest]
    #[case("W*", "WBHP:W1", true)]
    #[case("W*", "FOPT", false)]
    #[case("WBHP:*", "WBHP:PROD1", true)]
    #[case("F?PT", "FOPT", true)]
    #[case("F?PT", "FOOPT", false)]
    #[case("[FG]OPR*", "GOPR:NORTH", true)]
    #[case("[!F]OPR", "FOPR", false)]
    #[case("BPR:1,1,1", "BPR:1,1,1", true)]
    #[case("A.B", "AXB", false)]
    fn glob_patterns(#[case] pattern: &str, #[case] key: &str, #[case] matches: bool) {
        assert_eq!(glob_regex(pattern).unwrap().is_match(key), matches);
    }

    #[test]
    fn oversized_grid_has_no_block_keys() {
        let dims = GridDims::try_new(i32::MAX, 2).unwrap();
        assert_eq!(key_string("BPR", ":+:+:+:+", 5, dims), None);
        assert_eq!(key_string("FOPT", ":+:+:+:+", 0, dims).as_deref(), Some("FOPT"));
    }

    #[test]
    fn unterminated_class() {
        assert!(glob_regex("W[BHP").is_err());
    }
}
