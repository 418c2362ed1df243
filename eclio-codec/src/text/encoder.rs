use eclio_dtype::{ArrayData, TextLayout};
use eclio_error::EclResult;
use itertools::Itertools;

use super::number::{render_doub, render_real};
use crate::RecordHeader;

pub(crate) fn encode_header(header: &RecordHeader, out: &mut String) {
    out.push_str(&format!(
        " '{}' {:>11} '{}'\n",
        header.padded_name(),
        header.count,
        header.element_type
    ));
}

pub(crate) fn encode_values(data: &ArrayData, out: &mut String) -> EclResult<()> {
    if data.is_empty() {
        return Ok(());
    }
    let layout = data.element_type().text_layout()?;
    let width = layout.column_width;

    match data {
        ArrayData::Inte(values) => write_blocks(out, &layout, values, |v| format!("{v:>width$}")),
        ArrayData::Real(values) => write_blocks(out, &layout, values, |v| {
            format!("{:>width$}", render_real(*v))
        }),
        ArrayData::Doub(values) => write_blocks(out, &layout, values, |v| {
            format!("{:>width$}", render_doub(*v))
        }),
        ArrayData::Logi(values) => write_blocks(out, &layout, values, |v| {
            format!("{:>width$}", if *v { "T" } else { "F" })
        }),
        ArrayData::Char(values) | ArrayData::CharN(_, values) => {
            let chars = width - 3;
            write_blocks(out, &layout, values, |v| format!(" '{v:<chars$}'"))
        }
        ArrayData::Mess => {}
    }
    Ok(())
}

/// Lines break after `columns` values and at the end of every block.
fn write_blocks<T>(
    out: &mut String,
    layout: &TextLayout,
    values: &[T],
    render: impl Fn(&T) -> String,
) {
    for block in values.chunks(layout.block_elements) {
        for line in block.chunks(layout.columns) {
            out.push_str(&line.iter().map(&render).join(""));
            out.push('\n');
        }
    }
}
