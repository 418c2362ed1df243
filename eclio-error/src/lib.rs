#![deny(missing_docs)]

//! Error handling for eclio.
//!
//! Every fallible operation in the workspace returns an [`EclResult`]. Errors are surfaced to
//! the caller at the point of the offending call and always carry the array, step or entry
//! name involved. Nothing in eclio logs an error, retries, or substitutes a default value.

use std::borrow::Cow;
use std::fmt::{Debug, Display, Formatter};
use std::ops::Deref;
use std::{fmt, io};

/// A string that can be used as an error message.
#[derive(Debug)]
pub struct ErrString(Cow<'static, str>);

#[allow(clippy::fallible_impl_from)]
impl<T> From<T> for ErrString
where
    T: Into<Cow<'static, str>>,
{
    fn from(msg: T) -> Self {
        Self(msg.into())
    }
}

impl AsRef<str> for ErrString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for ErrString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for ErrString {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// The top-level error type for eclio.
#[derive(thiserror::Error)]
#[non_exhaustive]
pub enum EclError {
    /// A header or chunk is inconsistent, the stream is truncated, or a type tag is unknown.
    #[error("malformed file: {0}")]
    MalformedFile(ErrString),
    /// The requested element type disagrees with the array's declared type.
    #[error("array {name} has element type {found}, requested {expected}")]
    TypeMismatch {
        /// The array name.
        name: String,
        /// The element type the caller asked for.
        expected: String,
        /// The element type declared in the file.
        found: String,
    },
    /// No array with the given name exists.
    #[error("array not found: {0}")]
    ArrayNotFound(ErrString),
    /// The step exists but holds no array with the given name.
    #[error("array {name} not found in report step {step}")]
    ArrayNotFoundInStep {
        /// The array name.
        name: String,
        /// The report step that was searched.
        step: i32,
    },
    /// The report step does not exist in the file.
    #[error("report step {0} not found")]
    StepNotFound(i32),
    /// No report entry exists for the (well, date) pair.
    #[error("no report entry for well {well} at {date}")]
    EntryNotFound {
        /// The well name.
        well: String,
        /// The report date, rendered as `YYYY-MM-DD`.
        date: String,
    },
    /// A directory position outside the valid range was requested.
    #[error("index {index} out of range for directory of {len} arrays")]
    IndexOutOfRange {
        /// The requested position.
        index: usize,
        /// The directory length.
        len: usize,
    },
    /// The caller supplied an argument the format cannot represent.
    #[error("invalid argument: {0}")]
    InvalidArgument(ErrString),
    /// An error wrapped with additional context.
    #[error("{0}: {1}")]
    Context(ErrString, Box<EclError>),
    /// An underlying file-system error.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl EclError {
    /// Adds additional context to an error.
    pub fn with_context<T: Into<ErrString>>(self, msg: T) -> Self {
        EclError::Context(msg.into(), Box::new(self))
    }

    /// Strips any [`EclError::Context`] wrappers, returning the underlying error.
    pub fn root(&self) -> &EclError {
        match self {
            EclError::Context(_, inner) => inner.root(),
            other => other,
        }
    }
}

impl Debug for EclError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

/// A type alias for results that can return eclio errors.
pub type EclResult<T> = Result<T, EclError>;

/// A trait for expect-ing an eclio result or an option.
pub trait EclExpect {
    /// The type of the value being expected.
    type Output;

    /// Returns the value of the result if it is Ok, otherwise panics with the error.
    /// Should be called only in contexts where the error condition represents a bug (programmer error).
    fn ecl_expect(self, msg: &str) -> Self::Output;
}

impl<T, E> EclExpect for Result<T, E>
where
    E: Into<EclError>,
{
    type Output = T;

    #[inline(always)]
    fn ecl_expect(self, msg: &str) -> Self::Output {
        self.map_err(|err| err.into())
            .unwrap_or_else(|e| ecl_panic!(e.with_context(msg.to_string())))
    }
}

impl<T> EclExpect for Option<T> {
    type Output = T;

    #[inline(always)]
    fn ecl_expect(self, msg: &str) -> Self::Output {
        self.unwrap_or_else(|| {
            let err = EclError::InvalidArgument(msg.to_string().into());
            ecl_panic!(err)
        })
    }
}

/// A convenient macro for creating an eclio error.
///
/// Without a variant prefix the error is an [`EclError::InvalidArgument`]; any variant holding
/// a single [`ErrString`] can be named explicitly, e.g. `ecl_err!(MalformedFile: "...")`.
#[macro_export]
macro_rules! ecl_err {
    (IndexOutOfRange: $idx:expr, $len:expr) => {{
        $crate::__private::must_use($crate::EclError::IndexOutOfRange {
            index: $idx,
            len: $len,
        })
    }};
    ($variant:ident: $fmt:literal $(, $arg:expr)* $(,)?) => {{
        $crate::__private::must_use(
            $crate::EclError::$variant(format!($fmt, $($arg),*).into())
        )
    }};
    ($fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::ecl_err!(InvalidArgument: $fmt, $($arg),*)
    };
}

/// A convenience macro for returning an eclio error from a function.
#[macro_export]
macro_rules! ecl_bail {
    ($($tt:tt)+) => {
        return Err($crate::ecl_err!($($tt)+))
    };
}

/// A convenience macro for panicking with an eclio error.
#[macro_export]
macro_rules! ecl_panic {
    ($variant:ident: $fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::ecl_panic!($crate::ecl_err!($variant: $fmt, $($arg),*))
    };
    ($msg:literal, $err:expr) => {{
        let err: $crate::EclError = $err;
        $crate::ecl_panic!(err.with_context($msg.to_string()))
    }};
    ($fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::ecl_panic!($crate::ecl_err!($fmt, $($arg),*))
    };
    ($err:expr) => {{
        #[allow(clippy::panic)]
        {
            let err: $crate::EclError = $err;
            panic!("{}", err)
        }
    }};
}

#[doc(hidden)]
pub mod __private {
    #[doc(hidden)]
    #[inline]
    #[must_use]
    pub const fn must_use(error: crate::EclError) -> crate::EclError {
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bails(flag: bool) -> EclResult<u32> {
        if flag {
            ecl_bail!(MalformedFile: "bad record marker {}", 12);
        }
        Ok(1)
    }

    #[test]
    fn bail_uses_named_variant() {
        let err = bails(true).err().ecl_expect("must fail");
        assert!(matches!(err, EclError::MalformedFile(_)));
        assert_eq!(err.to_string(), "malformed file: bad record marker 12");
        assert_eq!(bails(false).ok(), Some(1));
    }

    #[test]
    fn default_variant_is_invalid_argument() {
        let err = ecl_err!("name {} too long", "TOOLONGNAME");
        assert!(matches!(err, EclError::InvalidArgument(_)));
    }

    #[test]
    fn context_unwraps_to_root() {
        let err = ecl_err!(IndexOutOfRange: 7, 3).with_context("loading step");
        assert!(matches!(
            err.root(),
            EclError::IndexOutOfRange { index: 7, len: 3 }
        ));
        assert_eq!(
            err.to_string(),
            "loading step: index 7 out of range for directory of 3 arrays"
        );
    }

    #[test]
    fn io_errors_convert() {
        let io = io::Error::new(io::ErrorKind::UnexpectedEof, "eof");
        let err: EclError = io.into();
        assert!(matches!(err, EclError::Io(_)));
    }

    #[test]
    #[should_panic(expected = "invariant broken")]
    fn expect_on_none_panics() {
        let none: Option<u8> = None;
        none.ecl_expect("invariant broken");
    }
}
