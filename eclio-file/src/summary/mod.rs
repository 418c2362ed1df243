//! Columnar summary files.
//!
//! A summary file is a plain array file laid out as
//!
//! ```text
//! START     INTE  [day, month, year, hour, minute, second, microsecond]
//! KEYCHECK  C024  one key per column, e.g. WBHP:PROD1
//! UNITS     CHAR  one unit per column
//! RSTEP     INTE  one flag per row, 1 when the row closes a report step
//! V0 .. Vn  REAL  one array per column, each holding every row
//! ```
//!
//! Storing whole columns lets a reader pull a single vector out of a long run without
//! touching the others.

use std::fs::File;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use eclio_codec::Format;
use eclio_dtype::{ElementType, NativeElement};
use eclio_error::{EclError, EclResult, ecl_bail, ecl_err};
use itertools::Itertools;
use rustc_hash::FxHashMap;

pub use legacy::*;
pub use writer::*;

use crate::ArrayStore;

mod keys;
mod legacy;
mod writer;

pub const START: &str = "START";
pub const KEYCHECK: &str = "KEYCHECK";
pub const UNITS: &str = "UNITS";
pub const RSTEP: &str = "RSTEP";
/// Width of the `KEYCHECK` strings.
pub const KEY_WIDTH: usize = 24;
/// Summary key of the elapsed time column, in days.
pub const TIME_KEY: &str = "TIME";

/// Array name of the `index`-th column.
pub fn column_name(index: usize) -> String {
    format!("V{index}")
}

/// Read access to a columnar summary file.
///
/// The header arrays are decoded when the store is opened. Columns stay on disk until a
/// key is first requested and are cached afterwards.
pub struct SummaryStore<R = File> {
    store: ArrayStore<R>,
    start: NaiveDateTime,
    keys: Vec<String>,
    units: Vec<String>,
    /// Key to directory position of its column.
    columns: FxHashMap<String, usize>,
    report_rows: Vec<usize>,
    row_count: usize,
}

impl SummaryStore<File> {
    pub fn open(path: impl AsRef<Path>) -> EclResult<Self> {
        Self::new(ArrayStore::open(path)?)
    }
}

impl SummaryStore<Cursor<Vec<u8>>> {
    /// Import a legacy specification file and its results into an in-memory summary.
    pub fn from_legacy(smspec: impl AsRef<Path>) -> EclResult<Self> {
        let bytes = read_legacy(smspec)?.write_to(Vec::new(), Format::Binary)?;
        Self::new(ArrayStore::from_reader(Cursor::new(bytes), Format::Binary)?)
    }
}

impl<R: Read + Seek> SummaryStore<R> {
    /// Read the header arrays of an opened store and locate every column.
    pub fn new(store: ArrayStore<R>) -> EclResult<Self> {
        let start = parse_start(header::<i32, _>(&store, START)?)?;
        let keys = header::<String, _>(&store, KEYCHECK)?.to_vec();
        let units = header::<String, _>(&store, UNITS)?.to_vec();
        let flags = header::<i32, _>(&store, RSTEP)?;

        if keys.len() != units.len() {
            ecl_bail!(
                MalformedFile: "summary has {} keys but {} units",
                keys.len(),
                units.len()
            );
        }

        let row_count = flags.len();
        let mut report_rows = Vec::new();
        for (row, flag) in flags.iter().enumerate() {
            match flag {
                0 => {}
                1 => report_rows.push(row),
                other => ecl_bail!(MalformedFile: "invalid report flag {} in row {}", other, row),
            }
        }

        let mut columns = FxHashMap::default();
        for (i, key) in keys.iter().enumerate() {
            let name = column_name(i);
            let index = store
                .index_of(&name)
                .map_err(|_| ecl_err!(MalformedFile: "summary column {} ({}) is missing", name, key))?;
            let descriptor = store.descriptor(index)?;
            if descriptor.element_type != ElementType::Real || descriptor.count != row_count {
                ecl_bail!(
                    MalformedFile: "summary column {} is {}, expected REAL [{}]",
                    descriptor,
                    key,
                    row_count
                );
            }
            columns.entry(key.clone()).or_insert(index);
        }

        log::debug!(
            "opened summary of {} vectors, {} rows and {} report steps",
            keys.len(),
            row_count,
            report_rows.len()
        );
        Ok(Self {
            store,
            start,
            keys,
            units,
            columns,
            report_rows,
            row_count,
        })
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.columns.contains_key(key)
    }

    /// Every key, in column order.
    pub fn keyword_list(&self) -> &[String] {
        &self.keys
    }

    /// Keys matching a shell style pattern such as `W*:PROD?`.
    pub fn keyword_list_matching(&self, pattern: &str) -> EclResult<Vec<&str>> {
        let regex = keys::glob_regex(pattern)?;
        Ok(self
            .keys
            .iter()
            .map(String::as_str)
            .filter(|key| regex.is_match(key))
            .collect())
    }

    /// Every row of the vector `key`.
    pub fn get(&self, key: &str) -> EclResult<&[f32]> {
        self.store.get(self.column(key)?)
    }

    /// The rows of `key` that close a report step.
    pub fn get_at_report_steps(&self, key: &str) -> EclResult<Vec<f32>> {
        let values = self.get(key)?;
        Ok(self.at_report_steps(values))
    }

    pub fn unit_of(&self, key: &str) -> EclResult<&str> {
        self.keys
            .iter()
            .position(|k| k == key)
            .and_then(|i| self.units.get(i))
            .map(String::as_str)
            .ok_or_else(|| ecl_err!(ArrayNotFound: "summary key {}", key))
    }

    /// Row indices that close a report step, ascending.
    pub fn report_step_rows(&self) -> &[usize] {
        &self.report_rows
    }

    pub fn number_of_report_steps(&self) -> usize {
        self.report_rows.len()
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Row index of the one based report step `step`.
    pub fn timestep_index_at_report_step_start(&self, step: usize) -> EclResult<usize> {
        step.checked_sub(1)
            .and_then(|i| self.report_rows.get(i))
            .copied()
            .ok_or_else(|| {
                ecl_err!(
                    "report step {} outside valid range 1 .. {}",
                    step,
                    self.report_rows.len()
                )
            })
    }

    pub fn start_date(&self) -> NaiveDateTime {
        self.start
    }

    /// Date of every row, derived from the `TIME` vector.
    pub fn dates(&self) -> EclResult<Vec<NaiveDateTime>> {
        Ok(self
            .get(TIME_KEY)?
            .iter()
            .map(|&days| self.start + elapsed(days))
            .collect())
    }

    pub fn dates_at_report_steps(&self) -> EclResult<Vec<NaiveDateTime>> {
        let dates = self.dates()?;
        Ok(self.at_report_steps(&dates))
    }

    /// Decode the columns of the given keys.
    pub fn load(&self, keys: &[&str]) -> EclResult<()> {
        keys.iter()
            .try_for_each(|key| self.store.load_by_index(self.column(key)?))
    }

    /// Decode every column.
    pub fn load_all(&self) -> EclResult<()> {
        self.columns
            .values()
            .try_for_each(|&index| self.store.load_by_index(index))
    }

    pub fn store(&self) -> &ArrayStore<R> {
        &self.store
    }

    pub fn into_store(self) -> ArrayStore<R> {
        self.store
    }

    fn column(&self, key: &str) -> EclResult<usize> {
        self.columns
            .get(key)
            .copied()
            .ok_or_else(|| ecl_err!(ArrayNotFound: "summary key {}", key))
    }

    fn at_report_steps<T: Copy>(&self, values: &[T]) -> Vec<T> {
        self.report_rows
            .iter()
            .filter_map(|&row| values.get(row).copied())
            .collect()
    }
}

fn header<'a, T: NativeElement, R: Read + Seek>(
    store: &'a ArrayStore<R>,
    name: &str,
) -> EclResult<&'a [T]> {
    match store.get_by_name::<T>(name) {
        Err(EclError::ArrayNotFound(_)) => {
            Err(ecl_err!(MalformedFile: "summary file has no {} array", name))
        }
        other => other,
    }
}

/// `[day, month, year]` optionally followed by hour, minute, second and microsecond.
pub(crate) fn parse_start(fields: &[i32]) -> EclResult<NaiveDateTime> {
    let field = |i: usize| {
        fields
            .get(i)
            .map_or(Some(0), |&v| u32::try_from(v).ok())
    };
    let (&[day, month, year, ..], Some(hour), Some(minute), Some(second), Some(micros)) =
        (fields, field(3), field(4), field(5), field(6))
    else {
        ecl_bail!(MalformedFile: "invalid start date [{}]", fields.iter().join(", "));
    };

    u32::try_from(month)
        .ok()
        .zip(u32::try_from(day).ok())
        .and_then(|(month, day)| NaiveDate::from_ymd_opt(year, month, day))
        .and_then(|date| date.and_hms_micro_opt(hour, minute, second, micros))
        .ok_or_else(|| ecl_err!(MalformedFile: "invalid start date [{}]", fields.iter().join(", ")))
}

/// Elapsed days as a duration, rounded to the millisecond.
#[allow(clippy::cast_possible_truncation)]
fn elapsed(days: f32) -> TimeDelta {
    TimeDelta::milliseconds((f64::from(days) * 86_400_000.0).round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_with_and_without_time() {
        let date = NaiveDate::from_ymd_opt(2020, 3, 15).unwrap();
        assert_eq!(
            parse_start(&[15, 3, 2020]).ok(),
            date.and_hms_opt(0, 0, 0)
        );
        assert_eq!(
            parse_start(&[15, 3, 2020, 6, 30, 10, 250_000]).ok(),
            date.and_hms_micro_opt(6, 30, 10, 250_000)
        );
    }

    #[test]
    fn invalid_start() {
        assert!(parse_start(&[31, 2, 2020]).is_err());
        assert!(parse_start(&[1, 1]).is_err());
        assert!(parse_start(&[1, 1, 2000, -1]).is_err());
    }

    #[test]
    fn elapsed_days() {
        assert_eq!(elapsed(1.5), TimeDelta::hours(36));
        assert_eq!(elapsed(0.0), TimeDelta::zero());
    }
}
