/*!
The starting point for building PDF files.

A [`PdfDocument`] owns a cross-reference table and a trailer, hands out
references to the objects registered in it, and serializes the whole graph
on [`PdfDocument::save`]: unreachable objects are discarded, the survivors
are renumbered into a contiguous range and written together with a
byte-exact cross-reference section.

The underlying object model lives in [`vellum_object`]; font-related
functionality lives in [`vellum_font`], re-exported as [`font`].
*/

pub use vellum_font as font;

pub mod document;
pub mod imports;
pub mod metadata;
pub mod trailer;

pub use document::{PdfDocument, SaveError, SaveOptions};
pub use metadata::DocumentInfo;
pub use vellum_object::object::{Object, ObjectId};
pub use vellum_object::xref::XrefTable;

/// A version of the PDF specification.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum PdfVersion {
    Pdf14,
    Pdf15,
    Pdf16,
    Pdf17,
    Pdf20,
}

impl PdfVersion {
    /// Build a version from its major and minor number.
    pub fn from_parts(major: u8, minor: u8) -> Option<Self> {
        match (major, minor) {
            (1, 4) => Some(Self::Pdf14),
            (1, 5) => Some(Self::Pdf15),
            (1, 6) => Some(Self::Pdf16),
            (1, 7) => Some(Self::Pdf17),
            (2, 0) => Some(Self::Pdf20),
            _ => None,
        }
    }

    /// The version as it appears in the file header.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf14 => "1.4",
            Self::Pdf15 => "1.5",
            Self::Pdf16 => "1.6",
            Self::Pdf17 => "1.7",
            Self::Pdf20 => "2.0",
        }
    }

    /// The header line plus the binary marker comment.
    ///
    /// The four high bytes in the comment line are what convince transfer
    /// tools that the file is binary, not text.
    pub(crate) fn header(&self) -> Vec<u8> {
        let mut header = format!("%PDF-{}\n", self.as_str()).into_bytes();
        header.extend_from_slice(b"%\xE2\xE3\xCF\xD3\n");

        header
    }
}
