use std::io::{BufRead, ErrorKind, Read, Seek};

use bytes::Buf;
use eclio_dtype::{ArrayData, ElementType, LOGI_FALSE, LOGI_TRUE};
use eclio_error::{EclResult, ecl_bail, ecl_err};

use super::{HEADER_MARKER, HEADER_RECORD_LEN};
use crate::RecordHeader;

pub(crate) fn decode_header<R: BufRead>(reader: &mut R) -> EclResult<Option<RecordHeader>> {
    if reader.fill_buf()?.is_empty() {
        return Ok(None);
    }

    let mut raw = [0u8; HEADER_RECORD_LEN];
    read_exact(reader, &mut raw, "array header")?;
    let mut buf = &raw[..];

    let head = buf.get_i32();
    let mut name = [0u8; 8];
    buf.copy_to_slice(&mut name);
    let count = buf.get_i32();
    let mut tag = [0u8; 4];
    buf.copy_to_slice(&mut tag);
    let tail = buf.get_i32();

    let name = String::from_utf8_lossy(&name).trim_end().to_string();
    if head != HEADER_MARKER || tail != HEADER_MARKER {
        ecl_bail!(
            MalformedFile: "array header {} has record markers {} and {}, expected {}",
            name,
            head,
            tail,
            HEADER_MARKER
        );
    }
    let element_type = ElementType::from_tag(&tag)?;
    let count = usize::try_from(count)
        .map_err(|_| ecl_err!(MalformedFile: "array {} declares negative count {}", name, count))?;
    if !element_type.has_payload() && count != 0 {
        ecl_bail!(MalformedFile: "MESS array {} declares {} elements", name, count);
    }

    Ok(Some(RecordHeader {
        name,
        element_type,
        count,
    }))
}

pub(crate) fn decode_values<R: Read>(
    reader: &mut R,
    element_type: ElementType,
    count: usize,
) -> EclResult<ArrayData> {
    // The declared count is unchecked until the values arrive; reserve one block at most.
    let capacity = element_type
        .binary_block_elements()
        .map_or(0, |block| count.min(block));
    let mut data = ArrayData::with_capacity(element_type, capacity);
    if count == 0 {
        return Ok(data);
    }

    let mut chunks = Chunks::try_new(element_type, count)?;
    let mut payload = Vec::new();
    while let Some(len) = chunks.open(reader)? {
        payload.resize(len * chunks.element_size, 0);
        read_exact(reader, &mut payload, "array values")?;
        extend(&mut data, &payload)?;
        chunks.close(reader)?;
    }
    Ok(data)
}

pub(crate) fn skip_values<R: Read + Seek>(reader: &mut R, header: &RecordHeader) -> EclResult<()> {
    if header.count == 0 {
        return Ok(());
    }

    let mut chunks = Chunks::try_new(header.element_type, header.count)?;
    while let Some(len) = chunks.open(reader)? {
        let nbytes = i64::try_from(len * chunks.element_size)
            .map_err(|_| ecl_err!(MalformedFile: "chunk of array {} too large", header.name))?;
        reader.seek_relative(nbytes)?;
        chunks.close(reader)?;
    }
    Ok(())
}

/// Walks the chunk records of one array, checking every marker against the declared count.
struct Chunks {
    element_size: usize,
    block_elements: usize,
    remaining: usize,
    open: Option<i32>,
}

impl Chunks {
    fn try_new(element_type: ElementType, count: usize) -> EclResult<Self> {
        Ok(Self {
            element_size: element_type.element_size(),
            block_elements: element_type.binary_block_elements()?,
            remaining: count,
            open: None,
        })
    }

    /// Read the leading marker of the next chunk, returning its element count.
    fn open<R: Read>(&mut self, reader: &mut R) -> EclResult<Option<usize>> {
        if self.remaining == 0 {
            return Ok(None);
        }

        let head = read_i32(reader)?;
        let nbytes = usize::try_from(head)
            .ok()
            .filter(|n| *n > 0 && n % self.element_size == 0)
            .ok_or_else(|| ecl_err!(MalformedFile: "invalid chunk marker {}", head))?;
        let len = nbytes / self.element_size;

        if len > self.remaining || len > self.block_elements {
            ecl_bail!(
                MalformedFile: "chunk of {} elements exceeds the {} remaining",
                len,
                self.remaining.min(self.block_elements)
            );
        }
        if len < self.block_elements && len != self.remaining {
            ecl_bail!(
                MalformedFile: "short chunk of {} elements with {} remaining",
                len,
                self.remaining
            );
        }

        self.remaining -= len;
        self.open = Some(head);
        Ok(Some(len))
    }

    /// Read and verify the trailing marker of the open chunk.
    fn close<R: Read>(&mut self, reader: &mut R) -> EclResult<()> {
        let tail = read_i32(reader)?;
        match self.open.take() {
            Some(head) if head == tail => Ok(()),
            Some(head) => Err(ecl_err!(
                MalformedFile: "chunk markers disagree: head {}, tail {}",
                head,
                tail
            )),
            None => Err(ecl_err!("no chunk is open")),
        }
    }
}

fn extend(data: &mut ArrayData, mut payload: &[u8]) -> EclResult<()> {
    match data {
        ArrayData::Inte(values) => {
            while payload.has_remaining() {
                values.push(payload.get_i32());
            }
        }
        ArrayData::Real(values) => {
            while payload.has_remaining() {
                values.push(payload.get_f32());
            }
        }
        ArrayData::Doub(values) => {
            while payload.has_remaining() {
                values.push(payload.get_f64());
            }
        }
        ArrayData::Logi(values) => {
            while payload.has_remaining() {
                values.push(match payload.get_u32() {
                    LOGI_TRUE => true,
                    LOGI_FALSE => false,
                    other => ecl_bail!(MalformedFile: "invalid logical value {:#x}", other),
                });
            }
        }
        ArrayData::Char(values) => extend_strings(values, payload, eclio_dtype::CHAR_WIDTH),
        ArrayData::CharN(width, values) => extend_strings(values, payload, *width as usize),
        ArrayData::Mess => {}
    }
    Ok(())
}

fn extend_strings(values: &mut Vec<String>, payload: &[u8], width: usize) {
    values.extend(
        payload
            .chunks_exact(width)
            .map(|raw| String::from_utf8_lossy(raw).trim_end().to_string()),
    );
}

fn read_i32<R: Read>(reader: &mut R) -> EclResult<i32> {
    let mut raw = [0u8; 4];
    read_exact(reader, &mut raw, "record marker")?;
    Ok(i32::from_be_bytes(raw))
}

fn read_exact<R: Read>(reader: &mut R, buf: &mut [u8], what: &str) -> EclResult<()> {
    reader.read_exact(buf).map_err(|err| match err.kind() {
        ErrorKind::UnexpectedEof => ecl_err!(MalformedFile: "truncated {}", what),
        _ => err.into(),
    })
}
