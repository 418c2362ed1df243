use std::fmt::{Display, Formatter};

use eclio_error::{EclResult, ecl_bail, ecl_err};
use static_assertions::const_assert_eq;

/// Maximum length of an array name; names are blank padded to this width on disk.
pub const MAX_NAME_LEN: usize = 8;
/// Width in bytes of a `CHAR` element.
pub const CHAR_WIDTH: usize = 8;
/// Binary encoding of a logical `true`.
pub const LOGI_TRUE: u32 = 0xFFFF_FFFF;
/// Binary encoding of a logical `false`.
pub const LOGI_FALSE: u32 = 0;

const NUMERIC_BLOCK_ELEMENTS: usize = 1000;
const STRING_BLOCK_ELEMENTS: usize = 105;
const TEXT_LINE_BUDGET: usize = 80;

// A full string chunk of 8-byte elements is the legacy 840-byte record.
const_assert_eq!(STRING_BLOCK_ELEMENTS * CHAR_WIDTH, 840);

/// The element kinds an array on disk may hold.
///
/// This is a closed set: the four-byte tag in every array header selects exactly one variant,
/// and every encode/decode path branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementType {
    /// 32-bit signed integer, tag `INTE`.
    Inte,
    /// 32-bit float, tag `REAL`.
    Real,
    /// 64-bit float, tag `DOUB`.
    Doub,
    /// Logical, tag `LOGI`.
    Logi,
    /// Eight character blank padded string, tag `CHAR`.
    Char,
    /// Blank padded string of the given width (1..=99), tag `C0nn`.
    C0nn(u8),
    /// Marker without payload, tag `MESS`.
    Mess,
}

/// How values of one element type are laid out in the text representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextLayout {
    /// Number of elements written before a block is closed with a line break.
    pub block_elements: usize,
    /// Number of elements per line.
    pub columns: usize,
    /// Width of one rendered element including its leading separator.
    pub column_width: usize,
}

impl ElementType {
    /// Every fixed-width element type; `C0nn` is parameterized and listed separately.
    pub const FIXED: [ElementType; 6] = [
        ElementType::Inte,
        ElementType::Real,
        ElementType::Doub,
        ElementType::Logi,
        ElementType::Char,
        ElementType::Mess,
    ];

    /// Resolve a four-byte header tag.
    pub fn from_tag(tag: &[u8]) -> EclResult<Self> {
        match tag {
            b"INTE" => Ok(ElementType::Inte),
            b"REAL" => Ok(ElementType::Real),
            b"DOUB" => Ok(ElementType::Doub),
            b"LOGI" => Ok(ElementType::Logi),
            b"CHAR" => Ok(ElementType::Char),
            b"MESS" => Ok(ElementType::Mess),
            [b'C', b'0', tens @ b'0'..=b'9', ones @ b'0'..=b'9'] => {
                let width = (tens - b'0') * 10 + (ones - b'0');
                if width == 0 {
                    ecl_bail!(MalformedFile: "string element width must be positive in tag C000");
                }
                Ok(ElementType::C0nn(width))
            }
            other => Err(ecl_err!(
                MalformedFile: "unknown array type '{}'",
                String::from_utf8_lossy(other)
            )),
        }
    }

    /// Build a variable-width string type, rejecting widths the tag cannot encode.
    pub fn string_of_width(width: usize) -> EclResult<Self> {
        match u8::try_from(width) {
            Ok(w @ 1..=99) => Ok(ElementType::C0nn(w)),
            _ => Err(ecl_err!("string width {} outside 1..=99", width)),
        }
    }

    /// The four-byte tag written into array headers.
    pub fn tag(&self) -> [u8; 4] {
        match self {
            ElementType::Inte => *b"INTE",
            ElementType::Real => *b"REAL",
            ElementType::Doub => *b"DOUB",
            ElementType::Logi => *b"LOGI",
            ElementType::Char => *b"CHAR",
            ElementType::Mess => *b"MESS",
            ElementType::C0nn(width) => [b'C', b'0', b'0' + width / 10, b'0' + width % 10],
        }
    }

    /// Size in bytes of one element in the binary representation.
    pub fn element_size(&self) -> usize {
        match self {
            ElementType::Inte | ElementType::Real | ElementType::Logi => 4,
            ElementType::Doub => 8,
            ElementType::Char => CHAR_WIDTH,
            ElementType::C0nn(width) => *width as usize,
            ElementType::Mess => 0,
        }
    }

    /// Maximum number of elements one binary chunk may hold.
    pub fn binary_block_elements(&self) -> EclResult<usize> {
        match self {
            ElementType::Inte | ElementType::Real | ElementType::Doub | ElementType::Logi => {
                Ok(NUMERIC_BLOCK_ELEMENTS)
            }
            ElementType::Char | ElementType::C0nn(_) => Ok(STRING_BLOCK_ELEMENTS),
            ElementType::Mess => Err(ecl_err!("type MESS has no associated data")),
        }
    }

    /// Block and line geometry of the text representation.
    pub fn text_layout(&self) -> EclResult<TextLayout> {
        let (block_elements, columns, column_width) = match self {
            ElementType::Inte => (NUMERIC_BLOCK_ELEMENTS, 6, 12),
            ElementType::Real => (NUMERIC_BLOCK_ELEMENTS, 4, 17),
            ElementType::Doub => (NUMERIC_BLOCK_ELEMENTS, 3, 25),
            ElementType::Logi => (NUMERIC_BLOCK_ELEMENTS, 25, 3),
            ElementType::Char => (STRING_BLOCK_ELEMENTS, 7, CHAR_WIDTH + 3),
            ElementType::C0nn(width) => {
                let column_width = *width as usize + 3;
                (
                    STRING_BLOCK_ELEMENTS,
                    (TEXT_LINE_BUDGET / column_width).max(1),
                    column_width,
                )
            }
            ElementType::Mess => ecl_bail!("type MESS has no associated data"),
        };
        Ok(TextLayout {
            block_elements,
            columns,
            column_width,
        })
    }

    /// Number of significant digits used when rendering floats as text.
    pub fn significant_digits(&self) -> Option<usize> {
        match self {
            ElementType::Real => Some(9),
            ElementType::Doub => Some(17),
            _ => None,
        }
    }

    /// Whether elements are blank padded strings.
    pub fn is_char(&self) -> bool {
        matches!(self, ElementType::Char | ElementType::C0nn(_))
    }

    /// Whether arrays of this type carry values at all.
    pub fn has_payload(&self) -> bool {
        !matches!(self, ElementType::Mess)
    }

    /// Width of a string element, if this is a string type.
    pub fn char_width(&self) -> Option<usize> {
        match self {
            ElementType::Char => Some(CHAR_WIDTH),
            ElementType::C0nn(width) => Some(*width as usize),
            _ => None,
        }
    }
}

impl Display for ElementType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let tag = self.tag();
        write!(f, "{}", String::from_utf8_lossy(&tag))
    }
}
