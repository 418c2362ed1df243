use std::io::{BufRead, ErrorKind};

use eclio_dtype::{ArrayData, ElementType};
use eclio_error::{EclResult, ecl_bail, ecl_err};

use super::number::parse_float;
use crate::RecordHeader;

pub(crate) fn decode_header<R: BufRead>(reader: &mut R) -> EclResult<Option<RecordHeader>> {
    let mut line = String::new();
    loop {
        line.clear();
        if read_line(reader, &mut line)? == 0 {
            return Ok(None);
        }
        if !line.trim().is_empty() {
            break;
        }
    }
    parse_header(&line).map(Some)
}

fn parse_header(line: &str) -> EclResult<RecordHeader> {
    let malformed = || ecl_err!(MalformedFile: "invalid array header '{}'", line.trim_end());

    let mut parts = line.split('\'');
    let (Some(lead), Some(name), Some(count), Some(tag), Some(trail), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return Err(malformed());
    };
    if !lead.trim().is_empty() || !trail.trim().is_empty() {
        return Err(malformed());
    }

    let count = count.trim().parse::<usize>().map_err(|_| malformed())?;
    let element_type = ElementType::from_tag(tag.as_bytes())?;
    let name = name.trim_end().to_string();
    if !element_type.has_payload() && count != 0 {
        ecl_bail!(MalformedFile: "MESS array {} declares {} elements", name, count);
    }

    Ok(RecordHeader {
        name,
        element_type,
        count,
    })
}

pub(crate) fn decode_values<R: BufRead>(
    reader: &mut R,
    element_type: ElementType,
    count: usize,
) -> EclResult<ArrayData> {
    // The declared count is unchecked until the values arrive; reserve one block at most.
    let capacity = element_type
        .text_layout()
        .map_or(0, |layout| count.min(layout.block_elements));
    let mut data = ArrayData::with_capacity(element_type, capacity);
    if count == 0 {
        return Ok(data);
    }
    if !element_type.has_payload() {
        ecl_bail!("type MESS has no associated data");
    }

    let mut lines = Lines::new(reader, count);
    while let Some(line) = lines.next_line()? {
        let before = data.len();
        extend(&mut data, line)?;
        let added = data.len() - before;
        lines.consume(added)?;
    }
    Ok(data)
}

pub(crate) fn skip_values<R: BufRead>(reader: &mut R, header: &RecordHeader) -> EclResult<()> {
    if header.count == 0 {
        return Ok(());
    }

    let is_char = header.element_type.is_char();
    let mut lines = Lines::new(reader, header.count);
    while let Some(line) = lines.next_line()? {
        let values = if is_char {
            quoted(line)?.len()
        } else {
            line.split_whitespace().count()
        };
        lines.consume(values)?;
    }
    Ok(())
}

/// Reads value lines until the declared count is reached.
struct Lines<'a, R> {
    reader: &'a mut R,
    line: String,
    remaining: usize,
}

impl<'a, R: BufRead> Lines<'a, R> {
    fn new(reader: &'a mut R, count: usize) -> Self {
        Self {
            reader,
            line: String::new(),
            remaining: count,
        }
    }

    fn next_line(&mut self) -> EclResult<Option<&str>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.line.clear();
        if read_line(self.reader, &mut self.line)? == 0 {
            ecl_bail!(
                MalformedFile: "truncated array, {} values missing",
                self.remaining
            );
        }
        Ok(Some(self.line.as_str()))
    }

    fn consume(&mut self, values: usize) -> EclResult<()> {
        if values == 0 {
            ecl_bail!(MalformedFile: "line without values, {} still expected", self.remaining);
        }
        if values > self.remaining {
            ecl_bail!(
                MalformedFile: "line holds {} values, only {} remaining",
                values,
                self.remaining
            );
        }
        self.remaining -= values;
        Ok(())
    }
}

fn extend(data: &mut ArrayData, line: &str) -> EclResult<()> {
    match data {
        ArrayData::Inte(values) => {
            for token in line.split_whitespace() {
                values.push(
                    token
                        .parse::<i32>()
                        .map_err(|_| ecl_err!(MalformedFile: "invalid integer '{}'", token))?,
                );
            }
        }
        ArrayData::Real(values) => {
            for token in line.split_whitespace() {
                values.push(parse_float::<f32>(token)?);
            }
        }
        ArrayData::Doub(values) => {
            for token in line.split_whitespace() {
                values.push(parse_float::<f64>(token)?);
            }
        }
        ArrayData::Logi(values) => {
            for token in line.split_whitespace() {
                values.push(match token {
                    "T" => true,
                    "F" => false,
                    other => ecl_bail!(MalformedFile: "invalid logical '{}'", other),
                });
            }
        }
        ArrayData::Char(values) | ArrayData::CharN(_, values) => {
            values.extend(quoted(line)?.into_iter().map(|v| v.trim_end().to_string()));
        }
        ArrayData::Mess => {}
    }
    Ok(())
}

/// Split a line of `'...'` fields. Anything outside quotes other than blanks is an error.
fn quoted(line: &str) -> EclResult<Vec<&str>> {
    let mut fields = Vec::new();
    let mut rest = line;
    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            return Ok(fields);
        }
        let Some(body) = rest.strip_prefix('\'') else {
            ecl_bail!(MalformedFile: "unquoted string in '{}'", line.trim_end());
        };
        let Some((field, tail)) = body.split_once('\'') else {
            ecl_bail!(MalformedFile: "unterminated string in '{}'", line.trim_end());
        };
        fields.push(field);
        rest = tail;
    }
}

fn read_line<R: BufRead>(reader: &mut R, line: &mut String) -> EclResult<usize> {
    reader.read_line(line).map_err(|err| match err.kind() {
        ErrorKind::InvalidData => ecl_err!(MalformedFile: "array file is not valid text"),
        _ => err.into(),
    })
}
