use std::fmt::{Display, Formatter};

use eclio_dtype::{ElementType, MAX_NAME_LEN};
use eclio_error::{EclResult, ecl_bail};

/// The `(name, type, count)` triple that opens every array on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordHeader {
    /// Array name with trailing blanks removed.
    pub name: String,
    /// Declared element type.
    pub element_type: ElementType,
    /// Declared number of elements.
    pub count: usize,
}

impl RecordHeader {
    /// Create a header, validating the name and the payload rules of the type.
    pub fn try_new(name: &str, element_type: ElementType, count: usize) -> EclResult<Self> {
        validate_name(name)?;
        if !element_type.has_payload() && count > 0 {
            ecl_bail!("array {} of type MESS cannot hold {} elements", name, count);
        }
        if i32::try_from(count).is_err() {
            ecl_bail!("array {} has {} elements, more than a header can declare", name, count);
        }
        Ok(Self {
            name: name.to_string(),
            element_type,
            count,
        })
    }

    /// The name blank padded to the on-disk width.
    pub fn padded_name(&self) -> String {
        format!("{:<width$}", self.name, width = MAX_NAME_LEN)
    }
}

impl Display for RecordHeader {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} [{}]", self.name, self.element_type, self.count)
    }
}

/// Array names are at most eight printable ASCII characters and never contain a quote.
pub(crate) fn validate_name(name: &str) -> EclResult<()> {
    if name.is_empty() || name.len() > MAX_NAME_LEN {
        ecl_bail!(
            "array name '{}' must be between 1 and {} characters",
            name,
            MAX_NAME_LEN
        );
    }
    if !name.bytes().all(|b| b == b' ' || b.is_ascii_graphic()) || name.contains('\'') {
        ecl_bail!("array name '{}' contains unsupported characters", name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use eclio_error::EclError;

    use super::*;

    #[test]
    fn pads_to_eight() {
        let header = RecordHeader::try_new("SEQNUM", ElementType::Inte, 1);
        assert_eq!(header.map(|h| h.padded_name()).ok().as_deref(), Some("SEQNUM  "));
    }

    #[test]
    fn rejects_bad_names() {
        for name in ["", "PRESSURES", "BAD'NAME", "TAB\tX"] {
            assert!(matches!(
                RecordHeader::try_new(name, ElementType::Real, 0),
                Err(EclError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn mess_has_no_payload() {
        assert!(RecordHeader::try_new("ENDSOL", ElementType::Mess, 0).is_ok());
        assert!(RecordHeader::try_new("ENDSOL", ElementType::Mess, 2).is_err());
    }
}
