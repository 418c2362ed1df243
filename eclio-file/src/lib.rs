//! Read and write typed array files of reservoir simulators.
//!
//! A file is a flat sequence of named, typed arrays. Every array is a header carrying its
//! name, element type and element count, followed by its values in blocks. The same sequence
//! can be stored in a binary or a formatted (text) representation; see [`Format`].
//!
//! # Reading
//!
//! [`ArrayStore`] reads every header once when the file is opened and keeps an ordered
//! directory of [`ArrayDescriptor`]s. Values are decoded on first access and cached, so the
//! cost of opening a file grows with the number of arrays, not with their size.
//!
//! Several file kinds layer an index over a store:
//!
//! 1. [`RestartFile`] splits a unified restart file into report steps at every `SEQNUM` array.
//!
//! 2. [`RftFile`] splits a well report file into `(well, date)` entries at every `TIME` array.
//!
//! 3. [`SummaryStore`](summary::SummaryStore) reads columnar summaries: one array per vector,
//!    each holding every time step. Legacy summaries can be imported with
//!    [`read_legacy`](summary::read_legacy).
//!
//! # Writing
//!
//! [`ArrayWriter`] appends arrays to any [`Write`](std::io::Write) sink in either
//! representation. Arrays written with it read back through an [`ArrayStore`] with the same
//! names, types and values.
//!
//! ```
//! use std::io::Cursor;
//!
//! use eclio_file::{ArrayStore, ArrayWriter, Format};
//!
//! let mut writer = ArrayWriter::new(Vec::new(), Format::Binary);
//! writer.write("PRESSURE", &[210.5f32, 211.0])?;
//! let bytes = writer.finish()?;
//!
//! let store = ArrayStore::from_reader(Cursor::new(bytes), Format::Binary)?;
//! assert_eq!(store.get_by_name::<f32>("PRESSURE")?, &[210.5, 211.0]);
//! # Ok::<(), eclio_error::EclError>(())
//! ```

pub use eclio_codec::Format;
pub use open::*;
pub use restart::*;
pub use rft::*;
pub use store::*;
pub use writer::*;

mod open;
mod restart;
mod rft;
mod store;
pub mod summary;
#[cfg(test)]
mod tests;
mod writer;
