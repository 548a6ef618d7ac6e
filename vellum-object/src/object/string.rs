//! String objects.

use std::fmt;
use std::fmt::Debug;
use std::ops::Deref;

/// A PDF string.
///
/// Strings are byte sequences, not text; encoding is a concern of whoever
/// put the bytes in. The serialized form is chosen per string: mostly
/// printable content is written as a literal `(...)` string with escapes,
/// anything else as a hex `<...>` string.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PdfString(Vec<u8>);

impl PdfString {
    /// Create a new string from raw bytes.
    pub fn new(data: impl AsRef<[u8]>) -> Self {
        Self(data.as_ref().to_vec())
    }

    /// The raw bytes of the string.
    pub fn get(&self) -> &[u8] {
        &self.0
    }

    /// Whether the literal `(...)` form is the sensible serialization.
    ///
    /// Binary-heavy strings (document ids, encrypted payloads) are better
    /// written in hex, where every byte costs two characters but none needs
    /// an escape.
    pub(crate) fn prefers_literal_form(&self) -> bool {
        let binary = self
            .0
            .iter()
            .filter(|b| !(0x20..0x7f).contains(*b) && !matches!(**b, b'\n' | b'\r' | b'\t'))
            .count();

        binary * 4 <= self.0.len()
    }
}

impl Deref for PdfString {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<&str> for PdfString {
    fn from(value: &str) -> Self {
        Self::new(value.as_bytes())
    }
}

impl From<Vec<u8>> for PdfString {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

impl Debug for PdfString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", String::from_utf8_lossy(&self.0))
    }
}
