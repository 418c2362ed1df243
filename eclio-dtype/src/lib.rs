#![deny(missing_docs)]

//! The element type registry for eclio.
//!
//! Every array in a file declares one of a closed set of element types through a four-byte
//! tag. This crate describes each type's encoding rules (byte width, chunk caps, text
//! geometry), the Rust types values can be read as, and the decoded value buffer.

pub use data::*;
pub use etype::*;
pub use native::*;

mod data;
mod etype;
mod native;
