use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use eclio_codec::{Format, encode};
use eclio_dtype::{ArrayData, ElementType, NativeElement};
use eclio_error::{EclError, EclExpect, EclResult};
use eclio_metrics::{Counter, EclMetrics, WRITER_ARRAYS, WRITER_BYTES};

/// Options for creating an [`ArrayWriter`].
#[derive(Default, Clone)]
pub struct WriteOptions {
    format: Option<Format>,
    metrics: EclMetrics,
}

impl WriteOptions {
    /// Options that infer the representation from the file name and report to a private registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Write the given representation regardless of the file name.
    pub fn with_format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    /// Report write activity to a shared registry.
    pub fn with_metrics(mut self, metrics: EclMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Create (or truncate) the file at `path`.
    pub fn create(self, path: impl AsRef<Path>) -> EclResult<ArrayWriter<BufWriter<File>>> {
        let path = path.as_ref();
        let format = self.format.unwrap_or_else(|| Format::from_path(path));
        let file = File::create(path).map_err(|err| {
            EclError::from(err).with_context(format!("failed to create {}", path.display()))
        })?;
        log::debug!("writing {} array file {}", format, path.display());
        Ok(self.with_format(format).write_to(BufWriter::new(file)))
    }

    /// Write to an arbitrary sink, in binary unless a format was set.
    pub fn write_to<W: Write>(self, sink: W) -> ArrayWriter<W> {
        ArrayWriter {
            sink: Some(sink),
            format: self.format.unwrap_or_default(),
            position: 0,
            arrays: self.metrics.counter(WRITER_ARRAYS),
            bytes: self.metrics.counter(WRITER_BYTES),
        }
    }
}

/// Appends arrays to a file, one complete array per call.
///
/// The order of calls is the order a reader's directory will show. Nothing already written
/// can be revisited; a file is revised by writing it again.
pub struct ArrayWriter<W: Write> {
    // Only `None` once `finish` has handed the sink back.
    sink: Option<W>,
    format: Format,
    position: u64,
    arrays: Arc<Counter>,
    bytes: Arc<Counter>,
}

impl ArrayWriter<BufWriter<File>> {
    /// Create a file, inferring its representation from the file name.
    pub fn create(path: impl AsRef<Path>) -> EclResult<Self> {
        WriteOptions::new().create(path)
    }
}

impl<W: Write> ArrayWriter<W> {
    /// Append arrays to `sink` in the given representation.
    pub fn new(sink: W, format: Format) -> Self {
        WriteOptions::new().with_format(format).write_to(sink)
    }

    pub fn format(&self) -> Format {
        self.format
    }

    /// Bytes written so far.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Append `values` using the element type of `T`.
    pub fn write<T: NativeElement>(&mut self, name: &str, values: &[T]) -> EclResult<()> {
        self.write_data(name, &T::into_data(values.to_vec()))
    }

    /// Append an array of any element type. Nothing reaches the sink when encoding fails.
    pub fn write_data(&mut self, name: &str, data: &ArrayData) -> EclResult<()> {
        let bytes = encode(name, data, self.format)?;
        self.sink
            .as_mut()
            .ecl_expect("writer is open until finished")
            .write_all(&bytes)?;

        self.position += bytes.len() as u64;
        self.arrays.inc();
        self.bytes.add(i64::try_from(bytes.len()).unwrap_or(i64::MAX));
        log::trace!("wrote array {} {} [{}]", name, data.element_type(), data.len());
        Ok(())
    }

    /// Append a `MESS` marker.
    pub fn write_message(&mut self, name: &str) -> EclResult<()> {
        self.write_data(name, &ArrayData::Mess)
    }

    /// Append strings as `C0nn` elements of the given width.
    pub fn write_strings_with_width(
        &mut self,
        name: &str,
        values: &[String],
        width: usize,
    ) -> EclResult<()> {
        let mut data = ArrayData::with_capacity(ElementType::string_of_width(width)?, values.len());
        if let ArrayData::CharN(_, strings) = &mut data {
            strings.extend_from_slice(values);
        }
        self.write_data(name, &data)
    }

    /// Flush and return the sink. Dropping the writer flushes too, ignoring failures.
    pub fn finish(mut self) -> EclResult<W> {
        let mut sink = self
            .sink
            .take()
            .ecl_expect("writer is open until finished");
        sink.flush()?;
        Ok(sink)
    }
}

impl<W: Write> Drop for ArrayWriter<W> {
    fn drop(&mut self) {
        if let Some(sink) = self.sink.as_mut() {
            // Callers needing the flush result use `finish`.
            let _ = sink.flush();
        }
    }
}
