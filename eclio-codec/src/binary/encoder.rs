use bytes::{BufMut, BytesMut};
use eclio_dtype::{ArrayData, LOGI_FALSE, LOGI_TRUE};
use eclio_error::{EclResult, ecl_err};

use super::{HEADER_MARKER, HEADER_RECORD_LEN};
use crate::RecordHeader;

pub(crate) fn encode_header(header: &RecordHeader, buf: &mut BytesMut) -> EclResult<()> {
    let count = i32::try_from(header.count)
        .map_err(|_| ecl_err!("array {} is too long for a header", header.name))?;
    buf.reserve(HEADER_RECORD_LEN);
    buf.put_i32(HEADER_MARKER);
    buf.put_slice(header.padded_name().as_bytes());
    buf.put_i32(count);
    buf.put_slice(&header.element_type.tag());
    buf.put_i32(HEADER_MARKER);
    Ok(())
}

pub(crate) fn encode_values(data: &ArrayData, buf: &mut BytesMut) -> EclResult<()> {
    let element_type = data.element_type();
    if data.is_empty() {
        return Ok(());
    }
    let block = element_type.binary_block_elements()?;
    let size = element_type.element_size();

    match data {
        ArrayData::Inte(values) => put_chunks(buf, values, block, size, |b, v| b.put_i32(*v)),
        ArrayData::Real(values) => put_chunks(buf, values, block, size, |b, v| b.put_f32(*v)),
        ArrayData::Doub(values) => put_chunks(buf, values, block, size, |b, v| b.put_f64(*v)),
        ArrayData::Logi(values) => put_chunks(buf, values, block, size, |b, v| {
            b.put_u32(if *v { LOGI_TRUE } else { LOGI_FALSE })
        }),
        ArrayData::Char(values) | ArrayData::CharN(_, values) => {
            put_chunks(buf, values, block, size, |b, v| {
                b.put_slice(v.as_bytes());
                b.put_bytes(b' ', size - v.len());
            })
        }
        ArrayData::Mess => Ok(()),
    }
}

fn put_chunks<T>(
    buf: &mut BytesMut,
    values: &[T],
    block: usize,
    size: usize,
    mut put: impl FnMut(&mut BytesMut, &T),
) -> EclResult<()> {
    // Each chunk adds two markers to the payload.
    buf.reserve(values.len() * size + values.len().div_ceil(block) * 8);
    for chunk in values.chunks(block) {
        let nbytes = i32::try_from(chunk.len() * size)
            .map_err(|_| ecl_err!("chunk of {} elements does not fit a record", chunk.len()))?;
        buf.put_i32(nbytes);
        for value in chunk {
            put(buf, value);
        }
        buf.put_i32(nbytes);
    }
    Ok(())
}
