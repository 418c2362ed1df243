#![deny(missing_docs)]

//! The record codec for eclio.
//!
//! An array file is a flat sequence of records, each a `(name, type, count)` header followed
//! by the values split into chunks. The same logical content has two physical forms selected
//! by [`Format`]: big-endian binary records framed by 32-bit length markers, and a text form
//! with fixed-width columns.
//!
//! Reading is split in two so a store can index a file without materializing it:
//! [`decode_header`] followed by either [`skip_values`] (scan mode) or [`decode_values`].

use std::io::{BufRead, Seek};

use bytes::{Bytes, BytesMut};
use eclio_dtype::{ArrayData, ElementType};
use eclio_error::{EclResult, ecl_bail};

pub use format::*;
pub use header::*;

mod binary;
mod format;
mod header;
mod text;

/// Encode one array, header and values, into its on-disk bytes.
///
/// Zero-length arrays produce the header alone. Strings must fit the element width and may
/// not contain a quote.
pub fn encode(name: &str, data: &ArrayData, format: Format) -> EclResult<Bytes> {
    let header = RecordHeader::try_new(name, data.element_type(), data.len())?;
    validate_strings(&header, data)?;

    match format {
        Format::Binary => {
            let mut buf = BytesMut::new();
            binary::encode_header(&header, &mut buf)?;
            binary::encode_values(data, &mut buf)?;
            Ok(buf.freeze())
        }
        Format::Formatted => {
            let mut out = String::new();
            text::encode_header(&header, &mut out);
            text::encode_values(data, &mut out)?;
            Ok(Bytes::from(out))
        }
    }
}

/// Read the next array header, or `None` at a clean end of input.
///
/// On success the reader is positioned at the first value of the array.
pub fn decode_header<R: BufRead>(reader: &mut R, format: Format) -> EclResult<Option<RecordHeader>> {
    match format {
        Format::Binary => binary::decode_header(reader),
        Format::Formatted => text::decode_header(reader),
    }
}

/// Move past the values of the array whose header was just read.
///
/// Chunk boundaries are still checked against the declared count, so a scan detects a
/// malformed or truncated file without decoding any values.
pub fn skip_values<R: BufRead + Seek>(
    reader: &mut R,
    header: &RecordHeader,
    format: Format,
) -> EclResult<()> {
    match format {
        Format::Binary => binary::skip_values(reader, header),
        Format::Formatted => text::skip_values(reader, header),
    }
}

/// Decode `count` values of `element_type` starting at the reader's position.
pub fn decode_values<R: BufRead>(
    reader: &mut R,
    element_type: ElementType,
    count: usize,
    format: Format,
) -> EclResult<ArrayData> {
    match format {
        Format::Binary => binary::decode_values(reader, element_type, count),
        Format::Formatted => text::decode_values(reader, element_type, count),
    }
}

fn validate_strings(header: &RecordHeader, data: &ArrayData) -> EclResult<()> {
    let (Some(width), Some(values)) = (
        header.element_type.char_width(),
        data.as_slice::<String>(),
    ) else {
        return Ok(());
    };

    for value in values {
        if value.len() > width {
            ecl_bail!(
                "value '{}' of array {} is longer than {} characters",
                value,
                header.name,
                width
            );
        }
        if !value.bytes().all(|b| b == b' ' || b.is_ascii_graphic()) || value.contains('\'') {
            ecl_bail!(
                "value '{}' of array {} contains unsupported characters",
                value,
                header.name
            );
        }
    }
    Ok(())
}
