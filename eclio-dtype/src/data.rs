use crate::{ElementType, NativeElement};

/// The decoded values of one array.
///
/// The variant always agrees with the element type of the descriptor it was decoded for, and
/// the number of values with its declared count.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayData {
    /// `INTE` values.
    Inte(Vec<i32>),
    /// `REAL` values.
    Real(Vec<f32>),
    /// `DOUB` values.
    Doub(Vec<f64>),
    /// `LOGI` values.
    Logi(Vec<bool>),
    /// `CHAR` values with trailing blanks removed.
    Char(Vec<String>),
    /// `C0nn` values of the given width with trailing blanks removed.
    CharN(u8, Vec<String>),
    /// A `MESS` marker.
    Mess,
}

impl ArrayData {
    /// Wrap typed values using the default element type of `T`.
    pub fn from_values<T: NativeElement>(values: Vec<T>) -> Self {
        T::into_data(values)
    }

    /// An empty buffer of the given element type, able to hold `capacity` values.
    pub fn with_capacity(element_type: ElementType, capacity: usize) -> Self {
        match element_type {
            ElementType::Inte => ArrayData::Inte(Vec::with_capacity(capacity)),
            ElementType::Real => ArrayData::Real(Vec::with_capacity(capacity)),
            ElementType::Doub => ArrayData::Doub(Vec::with_capacity(capacity)),
            ElementType::Logi => ArrayData::Logi(Vec::with_capacity(capacity)),
            ElementType::Char => ArrayData::Char(Vec::with_capacity(capacity)),
            ElementType::C0nn(width) => ArrayData::CharN(width, Vec::with_capacity(capacity)),
            ElementType::Mess => ArrayData::Mess,
        }
    }

    /// The element type these values are encoded as.
    pub fn element_type(&self) -> ElementType {
        match self {
            ArrayData::Inte(_) => ElementType::Inte,
            ArrayData::Real(_) => ElementType::Real,
            ArrayData::Doub(_) => ElementType::Doub,
            ArrayData::Logi(_) => ElementType::Logi,
            ArrayData::Char(_) => ElementType::Char,
            ArrayData::CharN(width, _) => ElementType::C0nn(*width),
            ArrayData::Mess => ElementType::Mess,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            ArrayData::Inte(v) => v.len(),
            ArrayData::Real(v) => v.len(),
            ArrayData::Doub(v) => v.len(),
            ArrayData::Logi(v) => v.len(),
            ArrayData::Char(v) | ArrayData::CharN(_, v) => v.len(),
            ArrayData::Mess => 0,
        }
    }

    /// Whether there are no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrow the values as `T`, or `None` if `T` does not match the element type.
    pub fn as_slice<T: NativeElement>(&self) -> Option<&[T]> {
        T::slice(self)
    }

    /// Approximate number of bytes the values occupy in memory.
    pub fn nbytes(&self) -> usize {
        match self {
            ArrayData::Char(v) | ArrayData::CharN(_, v) => v.iter().map(String::len).sum(),
            other => other.len() * other.element_type().element_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_access_requires_matching_variant() {
        let data = ArrayData::from_values(vec![1.5f32, 2.5]);
        assert_eq!(data.element_type(), ElementType::Real);
        assert_eq!(data.as_slice::<f32>(), Some([1.5f32, 2.5].as_slice()));
        assert!(data.as_slice::<f64>().is_none());
        assert!(data.as_slice::<i32>().is_none());
    }

    #[test]
    fn strings_of_any_width_borrow_as_string() {
        let data = ArrayData::CharN(24, vec!["WBHP:PROD1".to_string()]);
        assert_eq!(data.element_type(), ElementType::C0nn(24));
        assert_eq!(data.as_slice::<String>().map(<[String]>::len), Some(1));
    }

    #[test]
    fn empty_buffer_keeps_width() {
        let data = ArrayData::with_capacity(ElementType::C0nn(12), 4);
        assert_eq!(data.element_type(), ElementType::C0nn(12));
        assert!(data.is_empty());
    }

    #[test]
    fn mess_is_empty() {
        assert!(ArrayData::Mess.is_empty());
        assert_eq!(ArrayData::Mess.nbytes(), 0);
    }
}
