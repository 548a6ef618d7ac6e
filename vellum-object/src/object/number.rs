//! Number objects.

use std::fmt;

/// A PDF number.
///
/// The file format distinguishes integers from reals, and some dictionary
/// entries (object counts, stream lengths) are only meaningful as integers,
/// so the distinction is preserved instead of collapsing everything to
/// floating point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Number(InternalNumber);

#[derive(Clone, Copy, Debug, PartialEq)]
enum InternalNumber {
    Integer(i64),
    Real(f64),
}

impl Number {
    /// Create a new `Number` from an integer.
    pub fn from_integer(num: i64) -> Self {
        Self(InternalNumber::Integer(num))
    }

    /// Create a new `Number` from a real.
    pub fn from_real(num: f64) -> Self {
        Self(InternalNumber::Real(num))
    }

    /// Returns the number as an f64.
    pub fn as_f64(&self) -> f64 {
        match self.0 {
            InternalNumber::Integer(i) => i as f64,
            InternalNumber::Real(r) => r,
        }
    }

    /// Returns the contained integer, or `None` for reals.
    pub fn as_integer(&self) -> Option<i64> {
        match self.0 {
            InternalNumber::Integer(i) => Some(i),
            InternalNumber::Real(_) => None,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            InternalNumber::Integer(i) => write!(f, "{i}"),
            InternalNumber::Real(r) => write!(f, "{}", format_real(r)),
        }
    }
}

/// Format a real in the fixed-point notation the file format requires.
///
/// Exponent syntax is not valid in PDF, so the shortest-round-trip `Display`
/// of `f64` cannot be used directly.
pub(crate) fn format_real(value: f64) -> String {
    if !value.is_finite() {
        // Non-finite values cannot be represented; 0 is the conventional
        // substitute.
        return "0".into();
    }

    if value == value.trunc() && value.abs() < 1e15 {
        return format!("{}", value.trunc() as i64);
    }

    let mut s = format!("{value:.6}");

    while s.ends_with('0') {
        s.pop();
    }

    if s.ends_with('.') {
        s.pop();
    }

    s
}

#[cfg(test)]
mod tests {
    use crate::object::number::Number;

    #[test]
    fn integer() {
        assert_eq!(Number::from_integer(34).to_string(), "34");
        assert_eq!(Number::from_integer(-7).to_string(), "-7");
    }

    #[test]
    fn real_trims_trailing_zeros() {
        assert_eq!(Number::from_real(34.5).to_string(), "34.5");
        assert_eq!(Number::from_real(0.25).to_string(), "0.25");
    }

    #[test]
    fn whole_real_written_as_integer() {
        assert_eq!(Number::from_real(612.0).to_string(), "612");
    }

    #[test]
    fn real_never_uses_exponent_syntax() {
        let s = Number::from_real(1e-5).to_string();

        assert!(!s.contains('e') && !s.contains('E'), "{s}");
    }

    #[test]
    fn non_finite_falls_back_to_zero() {
        assert_eq!(Number::from_real(f64::NAN).to_string(), "0");
    }
}
