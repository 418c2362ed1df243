//! Import of legacy summary output.
//!
//! The legacy layout splits a summary over a specification file (`.SMSPEC`) describing
//! every vector, and results written row by row: one `PARAMS` array per time step, preceded
//! by `MINISTEP` and, when a report step starts, by `SEQHDR`. Results live either in one
//! unified file (`.UNSMRY`) or in one file per report step (`.S0001`, `.S0002`, ...). The
//! formatted variants use `.FSMSPEC`, `.FUNSMRY` and `.A0001`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use eclio_codec::Format;
use eclio_error::{EclError, EclResult, ecl_bail, ecl_err};
use itertools::Itertools;

use super::keys::{GridDims, key_string};
use super::{SummaryWriter, parse_start};
use crate::OpenOptions;

const KEYWORDS: &str = "KEYWORDS";
const WGNAMES: &str = "WGNAMES";
const NAMES: &str = "NAMES";
const NUMS: &str = "NUMS";
const UNITS: &str = "UNITS";
const DIMENS: &str = "DIMENS";
const STARTDAT: &str = "STARTDAT";
const RESTART: &str = "RESTART";
const SEQHDR: &str = "SEQHDR";
const MINISTEP: &str = "MINISTEP";
const PARAMS: &str = "PARAMS";

/// Read a legacy summary into a writer holding the columnar form, keys sorted.
///
/// Base runs named by the specification's `RESTART` array are followed.
pub fn read_legacy(smspec: impl AsRef<Path>) -> EclResult<SummaryWriter> {
    LegacyOptions::new().read(smspec)
}

/// Convert a legacy summary into a columnar summary file at `output`.
pub fn convert_legacy(smspec: impl AsRef<Path>, output: impl AsRef<Path>) -> EclResult<()> {
    read_legacy(smspec)?.write(output)
}

/// Options for importing a legacy summary.
///
/// A run restarted from an earlier run names that run's root in its `RESTART` array and
/// its first report step in `DIMENS[5]`. By default the import stitches the chain together:
/// every base run contributes its rows up to the report step where the next run restarts,
/// and the key set is the union over all runs. Vectors absent from a run read as zero in
/// its rows.
///
/// ```no_run
/// use eclio_file::summary::LegacyOptions;
///
/// let summary = LegacyOptions::new().with_base_runs(false).read("RESTARTED.SMSPEC")?;
/// # Ok::<(), eclio_error::EclError>(())
/// ```
#[derive(Debug, Clone)]
pub struct LegacyOptions {
    base_runs: bool,
}

impl Default for LegacyOptions {
    fn default() -> Self {
        Self { base_runs: true }
    }
}

impl LegacyOptions {
    /// Options that follow restart chains.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether rows of the runs a restarted run continues are imported.
    pub fn with_base_runs(mut self, base_runs: bool) -> Self {
        self.base_runs = base_runs;
        self
    }

    /// Read the summary at `smspec`, with or without its extension.
    pub fn read(&self, smspec: impl AsRef<Path>) -> EclResult<SummaryWriter> {
        let runs = self.chain(smspec_path(smspec.as_ref())?)?;

        // Newest first, so the units of older runs win.
        let mut key_units = BTreeMap::new();
        for run in &runs {
            for (key, unit) in run.header.entry_keys.iter().zip(&run.header.units) {
                if let Some(key) = key {
                    key_units.insert(key.clone(), unit.clone());
                }
            }
        }
        let (keys, units): (Vec<String>, Vec<String>) = key_units.into_iter().unzip();
        let start = runs
            .last()
            .map(|run| run.header.start)
            .ok_or_else(|| ecl_err!("no summary run to import"))?;
        log::debug!(
            "importing {} summary vectors from {} runs",
            keys.len(),
            runs.len()
        );

        let mut writer = SummaryWriter::new(keys, units, start)?;
        let mut first_step = 0;
        for (i, run) in runs.iter().enumerate().rev() {
            let stop_at = i
                .checked_sub(1)
                .and_then(|i| runs.get(i))
                .map(|next| next.header.restart_step);
            run.import(&mut writer, first_step, stop_at)?;
            first_step = stop_at.unwrap_or(first_step);
        }
        Ok(writer)
    }

    /// The run at `smspec` followed by its base runs, newest first.
    fn chain(&self, smspec: PathBuf) -> EclResult<Vec<Run>> {
        let mut seen = vec![fs::canonicalize(&smspec)?];
        let mut runs = vec![Run::read(smspec)?];
        while self.base_runs {
            let Some(base) = runs.last().and_then(|run| run.header.restart.as_deref()) else {
                break;
            };
            let base = base_smspec(base);
            let canonical = fs::canonicalize(&base)
                .map_err(|e| EclError::from(e).with_context(format!("base run {}", base.display())))?;
            if seen.contains(&canonical) {
                ecl_bail!(
                    MalformedFile: "restart chain returns to {}",
                    base.display()
                );
            }
            log::debug!("summary restarts from {}", base.display());
            seen.push(canonical);
            runs.push(Run::read(base)?);
        }
        Ok(runs)
    }
}

/// One run of a restart chain.
struct Run {
    smspec: PathBuf,
    format: Format,
    header: SmspecHeader,
}

impl Run {
    fn read(smspec: PathBuf) -> EclResult<Self> {
        let format = Format::from_path(&smspec);
        let header = SmspecHeader::read(&smspec, format)
            .map_err(|e| e.with_context(format!("reading {}", smspec.display())))?;
        Ok(Self {
            smspec,
            format,
            header,
        })
    }

    /// Append this run's rows, counting report steps from `first_step` and stopping once
    /// `stop_at` steps are complete.
    fn import(
        &self,
        writer: &mut SummaryWriter,
        first_step: i32,
        stop_at: Option<i32>,
    ) -> EclResult<()> {
        let columns = self
            .header
            .entry_keys
            .iter()
            .map(|key| key.as_ref().and_then(|k| writer.keys().binary_search(k).ok()))
            .collect_vec();

        let results = result_files(&self.smspec, self.format)?;
        let stores = results
            .iter()
            .map(|path| OpenOptions::new().with_format(self.format).open(path))
            .collect::<EclResult<Vec<_>>>()?;
        log::debug!(
            "importing {} from {} result files",
            self.smspec.display(),
            stores.len()
        );

        let arrays = stores
            .iter()
            .flat_map(|store| (0..store.len()).map(move |index| (store, index)))
            .collect_vec();
        let name = |i: usize| {
            arrays
                .get(i)
                .and_then(|(store, index)| store.get_list().get(*index))
                .map(|d| d.name.as_str())
        };

        let mut step = first_step;
        let mut i = usize::from(name(0) == Some(SEQHDR));
        let mut row = vec![0.0f32; writer.keys().len()];
        while i < arrays.len() {
            if name(i) != Some(MINISTEP) || name(i + 1) != Some(PARAMS) {
                ecl_bail!(
                    MalformedFile: "expected {} and {} at array {} of the summary results",
                    MINISTEP,
                    PARAMS,
                    i
                );
            }
            let (store, index) = arrays
                .get(i + 1)
                .ok_or_else(|| ecl_err!(MalformedFile: "truncated summary results"))?;
            let params = store.get::<f32>(*index)?;
            i += 2;

            row.fill(0.0);
            for (value, column) in params.iter().zip(&columns) {
                if let Some(slot) = column.and_then(|c| row.get_mut(c)) {
                    *slot = *value;
                }
            }

            let starts_run = params.first() == Some(&0.0);
            let closes_step = match name(i) {
                Some(SEQHDR) => {
                    i += 1;
                    true
                }
                Some(_) => false,
                None => true,
            };
            if closes_step {
                step += 1;
            }
            writer.push_row(&row, starts_run || closes_step)?;

            if stop_at.is_some_and(|stop| step >= stop) {
                break;
            }
        }
        Ok(())
    }
}

struct SmspecHeader {
    start: chrono::NaiveDateTime,
    /// Key of every specification entry, `None` for entries without a key.
    entry_keys: Vec<Option<String>>,
    units: Vec<String>,
    /// Root of the run this one restarts from, resolved against the specification's directory.
    restart: Option<PathBuf>,
    /// First report step of this run when it restarts another.
    restart_step: i32,
}

impl SmspecHeader {
    fn read(path: &Path, format: Format) -> EclResult<Self> {
        let store = OpenOptions::new().with_format(format).open(path)?;

        let keywords = store.get_by_name::<String>(KEYWORDS)?;
        let wgnames = if store.has_key(WGNAMES) {
            store.get_by_name::<String>(WGNAMES)?
        } else {
            store.get_by_name::<String>(NAMES)?
        };
        let nums = if store.has_key(NUMS) {
            store.get_by_name::<i32>(NUMS)?.to_vec()
        } else {
            vec![0; keywords.len()]
        };
        let units = store.get_by_name::<String>(UNITS)?.to_vec();
        let dimens = store.get_by_name::<i32>(DIMENS)?;
        let dims = match dimens {
            &[_, nx, ny, ..] => GridDims::try_new(nx, ny)?,
            _ => ecl_bail!(MalformedFile: "{} holds fewer than three values", DIMENS),
        };
        let restart_step = dimens.get(5).copied().unwrap_or(0);
        let start = parse_start(store.get_by_name::<i32>(STARTDAT)?)?;

        if wgnames.len() != keywords.len() || nums.len() != keywords.len() || units.len() != keywords.len()
        {
            ecl_bail!(
                MalformedFile: "summary specification arrays disagree on the number of vectors"
            );
        }

        let entry_keys = keywords
            .iter()
            .zip(wgnames)
            .zip(&nums)
            .map(|((keyword, wgname), num)| key_string(keyword, wgname, *num, dims))
            .collect();

        let restart = if store.has_key(RESTART) {
            let root = store.get_by_name::<String>(RESTART)?.concat();
            let root = root.trim();
            (!root.is_empty()).then(|| spec_dir(path).join(root))
        } else {
            None
        };

        Ok(Self {
            start,
            entry_keys,
            units,
            restart,
            restart_step,
        })
    }
}

/// Specification of the run rooted at `root`, preferring the binary file.
fn base_smspec(root: &Path) -> PathBuf {
    let binary = root.with_extension("SMSPEC");
    if binary.exists() {
        binary
    } else {
        root.with_extension("FSMSPEC")
    }
}

fn spec_dir(smspec: &Path) -> &Path {
    match smspec.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

/// Accept a specification path with or without its extension.
fn smspec_path(path: &Path) -> EclResult<PathBuf> {
    match path.extension().and_then(|ext| ext.to_str()) {
        None => Ok(path.with_extension("SMSPEC")),
        Some("SMSPEC" | "FSMSPEC") => Ok(path.to_path_buf()),
        Some(other) => Err(ecl_err!(
            "summary specification must have extension SMSPEC or FSMSPEC, found {}",
            other
        )),
    }
}

/// The unified results file if present, otherwise the per step files in order.
///
/// When both exist the most recently modified wins.
fn result_files(smspec: &Path, format: Format) -> EclResult<Vec<PathBuf>> {
    let unified = smspec.with_extension(if format.is_formatted() { "FUNSMRY" } else { "UNSMRY" });
    let multiple = multiple_result_files(smspec, format)?;

    let use_unified = match (unified.exists(), multiple.last()) {
        (false, None) => {
            return Err(EclError::from(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no unified or per step summary results",
            ))
            .with_context(format!("importing {}", smspec.display())));
        }
        (true, None) => true,
        (false, Some(_)) => false,
        (true, Some(last)) => modified(&unified)? >= modified(last)?,
    };
    Ok(if use_unified { vec![unified] } else { multiple })
}

fn multiple_result_files(smspec: &Path, format: Format) -> EclResult<Vec<PathBuf>> {
    let stem = smspec
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| ecl_err!("invalid summary specification path {}", smspec.display()))?;
    let prefix = format!("{stem}.{}", if format.is_formatted() { 'A' } else { 'S' });
    let dir = spec_dir(smspec);

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_step_file = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_prefix(&prefix))
            .is_some_and(|suffix| suffix.len() == 4 && suffix.bytes().all(|b| b.is_ascii_digit()));
        if is_step_file {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn modified(path: &Path) -> EclResult<std::time::SystemTime> {
    Ok(fs::metadata(path)?.modified()?)
}
