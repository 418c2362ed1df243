use std::io::Write;
use std::path::Path;

use chrono::{Datelike, NaiveDateTime, Timelike};
use eclio_codec::Format;
use eclio_dtype::CHAR_WIDTH;
use eclio_error::{EclResult, ecl_bail};

use super::{KEY_WIDTH, KEYCHECK, RSTEP, START, UNITS, column_name};
use crate::{ArrayWriter, WriteOptions};

/// Collects summary rows in memory and writes them as one columnar file.
///
/// Nothing touches the disk until [`SummaryWriter::write`]; the file is then produced front to
/// back in a single pass.
#[derive(Debug, Clone)]
pub struct SummaryWriter {
    start: NaiveDateTime,
    keys: Vec<String>,
    units: Vec<String>,
    columns: Vec<Vec<f32>>,
    report_flags: Vec<i32>,
}

impl SummaryWriter {
    pub fn new(keys: Vec<String>, units: Vec<String>, start: NaiveDateTime) -> EclResult<Self> {
        if keys.len() != units.len() {
            ecl_bail!("{} summary keys but {} units", keys.len(), units.len());
        }
        if let Some(key) = keys.iter().find(|k| k.is_empty() || k.len() > KEY_WIDTH) {
            ecl_bail!("summary key '{}' must be 1 to {} characters", key, KEY_WIDTH);
        }
        if let Some(unit) = units.iter().find(|u| u.len() > CHAR_WIDTH) {
            ecl_bail!("unit '{}' is longer than {} characters", unit, CHAR_WIDTH);
        }

        let columns = vec![Vec::new(); keys.len()];
        Ok(Self {
            start,
            keys,
            units,
            columns,
            report_flags: Vec::new(),
        })
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn row_count(&self) -> usize {
        self.report_flags.len()
    }

    /// Append one row, one value per key, flagging whether it closes a report step.
    pub fn push_row(&mut self, values: &[f32], is_report_step: bool) -> EclResult<()> {
        if values.len() != self.columns.len() {
            ecl_bail!(
                "row of {} values for {} summary keys",
                values.len(),
                self.columns.len()
            );
        }
        for (column, value) in self.columns.iter_mut().zip(values) {
            column.push(*value);
        }
        self.report_flags.push(i32::from(is_report_step));
        Ok(())
    }

    /// Write the file at `path`; the representation follows the file name.
    pub fn write(&self, path: impl AsRef<Path>) -> EclResult<()> {
        let mut writer = WriteOptions::new().create(path)?;
        self.write_arrays(&mut writer)?;
        writer.finish()?;
        Ok(())
    }

    /// Write into `sink` and hand it back.
    pub fn write_to<W: Write>(&self, sink: W, format: Format) -> EclResult<W> {
        let mut writer = ArrayWriter::new(sink, format);
        self.write_arrays(&mut writer)?;
        writer.finish()
    }

    fn write_arrays<W: Write>(&self, writer: &mut ArrayWriter<W>) -> EclResult<()> {
        let field = |value: u32| i32::try_from(value).unwrap_or_default();
        let start = [
            field(self.start.day()),
            field(self.start.month()),
            self.start.year(),
            field(self.start.hour()),
            field(self.start.minute()),
            field(self.start.second()),
            field(self.start.nanosecond() / 1_000),
        ];

        writer.write(START, &start)?;
        writer.write_strings_with_width(KEYCHECK, &self.keys, KEY_WIDTH)?;
        writer.write(UNITS, &self.units)?;
        writer.write(RSTEP, &self.report_flags)?;
        for (i, column) in self.columns.iter().enumerate() {
            writer.write(&column_name(i), column)?;
        }
        log::debug!(
            "wrote summary of {} vectors over {} rows",
            self.columns.len(),
            self.report_flags.len()
        );
        Ok(())
    }
}
