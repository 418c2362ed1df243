//! The formatted representation: one quoted header line per array followed by its values in
//! fixed-width columns.
//!
//! ```text
//!  'PRESSURE'           3 'DOUB'
//!    0.10000000000000000D+03   0.20050000000000000D+03   0.30025000000000000D+03
//! ```

mod decoder;
mod encoder;
mod number;

pub(crate) use decoder::*;
pub(crate) use encoder::*;
