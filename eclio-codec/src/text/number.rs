//! Fortran style floating point notation.
//!
//! Values are written with a leading `0.` mantissa, so `150.5` renders as `0.150500000E+03`.
//! Doubles use `D` as the exponent marker, which legacy writers omit once the exponent needs
//! three digits (`0.1234-100`). Both spellings are accepted on input.

use std::borrow::Cow;
use std::str::FromStr;

use eclio_error::{EclResult, ecl_err};

/// Render a `REAL` value with nine significant digits.
pub(crate) fn render_real(value: f32) -> String {
    if !value.is_finite() {
        return render_non_finite(value.is_nan(), value.is_sign_negative());
    }
    to_fortran(&format!("{:.8E}", value), 'E')
}

/// Render a `DOUB` value with seventeen significant digits.
pub(crate) fn render_doub(value: f64) -> String {
    if !value.is_finite() {
        return render_non_finite(value.is_nan(), value.is_sign_negative());
    }
    to_fortran(&format!("{:.16E}", value), 'D')
}

fn render_non_finite(nan: bool, negative: bool) -> String {
    match (nan, negative) {
        (true, _) => "NaN".to_string(),
        (false, true) => "-Inf".to_string(),
        (false, false) => "Inf".to_string(),
    }
}

/// Shift Rust's `d.dddE[-]x` into `0.ddddE±xx`.
fn to_fortran(scientific: &str, marker: char) -> String {
    let (mantissa, exponent) = scientific.split_once('E').unwrap_or((scientific, "0"));
    let (sign, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", mantissa),
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let exponent = if digits.bytes().all(|b| b == b'0') {
        0
    } else {
        exponent.parse::<i32>().unwrap_or_default() + 1
    };

    if exponent.abs() >= 100 {
        format!("{sign}0.{digits}{exponent:+04}")
    } else {
        format!("{sign}0.{digits}{marker}{exponent:+03}")
    }
}

/// Parse a float token in any of the accepted exponent spellings.
pub(crate) fn parse_float<T: FromStr>(token: &str) -> EclResult<T> {
    normalize(token)
        .parse::<T>()
        .map_err(|_| ecl_err!(MalformedFile: "invalid number '{}'", token))
}

fn normalize(token: &str) -> Cow<'_, str> {
    let mut normalized = Cow::Borrowed(token);
    if normalized.contains(['D', 'd']) {
        normalized = Cow::Owned(normalized.replace(['D', 'd'], "E"));
    }
    if !normalized.contains(['E', 'e']) {
        // The exponent marker is dropped for three digit exponents.
        if let Some(pos) = normalized
            .get(1..)
            .and_then(|rest| rest.find(['+', '-']))
            .map(|pos| pos + 1)
        {
            let mut owned = normalized.into_owned();
            owned.insert(pos, 'E');
            normalized = Cow::Owned(owned);
        }
    }
    normalized
}
