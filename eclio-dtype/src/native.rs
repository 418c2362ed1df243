use crate::{ArrayData, ElementType};

/// A Rust type that array values can be read as or written from.
///
/// Typed access never converts: asking for `f64` values from a `REAL` array is a type
/// mismatch, not a widening.
pub trait NativeElement: Sized + Clone + 'static {
    /// The element type used when writing values of this Rust type.
    const ELEMENT_TYPE: ElementType;

    /// Whether arrays of `element_type` can be borrowed as `Self`.
    fn accepts(element_type: ElementType) -> bool {
        element_type == Self::ELEMENT_TYPE
    }

    /// Borrow the values of `data` as `Self`, if the variant matches.
    fn slice(data: &ArrayData) -> Option<&[Self]>;

    /// Wrap owned values in the matching variant.
    fn into_data(values: Vec<Self>) -> ArrayData;
}

macro_rules! native_element {
    ($T:ty, $variant:ident) => {
        impl NativeElement for $T {
            const ELEMENT_TYPE: ElementType = ElementType::$variant;

            fn slice(data: &ArrayData) -> Option<&[Self]> {
                match data {
                    ArrayData::$variant(values) => Some(values.as_slice()),
                    _ => None,
                }
            }

            fn into_data(values: Vec<Self>) -> ArrayData {
                ArrayData::$variant(values)
            }
        }
    };
}

native_element!(i32, Inte);
native_element!(f32, Real);
native_element!(f64, Doub);
native_element!(bool, Logi);

impl NativeElement for String {
    const ELEMENT_TYPE: ElementType = ElementType::Char;

    fn accepts(element_type: ElementType) -> bool {
        element_type.is_char()
    }

    fn slice(data: &ArrayData) -> Option<&[Self]> {
        match data {
            ArrayData::Char(values) | ArrayData::CharN(_, values) => Some(values.as_slice()),
            _ => None,
        }
    }

    fn into_data(values: Vec<Self>) -> ArrayData {
        ArrayData::Char(values)
    }
}
