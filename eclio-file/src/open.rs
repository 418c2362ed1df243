use std::fs::File;
use std::path::Path;

use eclio_codec::Format;
use eclio_error::{EclError, EclResult};
use eclio_metrics::EclMetrics;

use crate::ArrayStore;

/// Open options for an [`ArrayStore`].
///
/// ```no_run
/// use eclio_codec::Format;
/// use eclio_file::OpenOptions;
///
/// let store = OpenOptions::new()
///     .with_format(Format::Formatted)
///     .open("CASE.INIT.txt")?;
/// # Ok::<(), eclio_error::EclError>(())
/// ```
#[derive(Default, Clone)]
pub struct OpenOptions {
    /// Representation override; inferred from the file name when absent.
    format: Option<Format>,
    metrics: EclMetrics,
}

impl OpenOptions {
    /// Options that infer the representation from the file name and report to a private registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the file in the given representation regardless of its name.
    pub fn with_format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    /// Report decode activity to a shared registry.
    pub fn with_metrics(mut self, metrics: EclMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Open the file and build its directory.
    pub fn open(self, path: impl AsRef<Path>) -> EclResult<ArrayStore<File>> {
        let path = path.as_ref();
        let format = self.format.unwrap_or_else(|| Format::from_path(path));
        let file = File::open(path).map_err(|err| {
            EclError::from(err).with_context(format!("failed to open {}", path.display()))
        })?;
        log::debug!("opening {} as {} array file", path.display(), format);
        ArrayStore::try_new(file, format, self.metrics)
    }
}
