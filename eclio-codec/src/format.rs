use std::fmt::{Display, Formatter};
use std::path::Path;

/// The physical representation of an array file.
///
/// A file is either entirely binary or entirely formatted; the two are never mixed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Format {
    /// Big-endian records framed by 32-bit length markers.
    #[default]
    Binary,
    /// Human readable text with one quoted header line per array.
    Formatted,
}

impl Format {
    /// Infer the representation from a file name.
    ///
    /// Formatted files carry an extension starting with `F` (`.FUNRST`, `.FEGRID`) or, for
    /// per-step files, `A` (`.A0001`). Everything else is binary.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let formatted = path
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.chars().next())
            .is_some_and(|first| matches!(first.to_ascii_uppercase(), 'F' | 'A'));
        if formatted {
            Format::Formatted
        } else {
            Format::Binary
        }
    }

    /// Whether this is the text representation.
    pub fn is_formatted(&self) -> bool {
        matches!(self, Format::Formatted)
    }
}

impl Display for Format {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Format::Binary => write!(f, "binary"),
            Format::Formatted => write!(f, "formatted"),
        }
    }
}
