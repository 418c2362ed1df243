//! The binary representation: big-endian values framed by 32-bit length markers.
//!
//! ```text
//! [16][name: 8 bytes][count: i32][tag: 4 bytes][16]
//! [nbytes][values ...][nbytes]    one record per chunk
//! ```

mod decoder;
mod encoder;

pub(crate) use decoder::*;
pub(crate) use encoder::*;

/// Byte length of the header record between its markers.
const HEADER_MARKER: i32 = 16;
/// Byte length of the header record including both markers.
const HEADER_RECORD_LEN: usize = 24;
