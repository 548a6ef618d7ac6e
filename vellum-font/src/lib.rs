/*!
A reader for the glyph outline tables of TrueType/OpenType fonts, plus a
process-wide stock of raw font data.

Only the parts needed for embedding fonts into PDF files are covered:
slicing the `glyf` table per glyph through the `loca` offset index,
expanding a set of glyph ids with every component a composite glyph pulls
in, and deduplicating raw font buffers across documents. Outlining,
hinting and the remaining tables of a font are out of scope.
*/

use thiserror::Error;

pub mod glyf;
pub mod stock;

mod reader;

/// A type-safe wrapper for glyph ID.
#[repr(transparent)]
#[derive(Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Default, Debug, Hash)]
pub struct GlyphId(pub u16);

impl GlyphId {
    /// The `.notdef` glyph, which every subset must contain.
    pub const NOTDEF: Self = Self(0);
}

/// A list of errors that can occur while reading font data.
///
/// Font files come from outside the process and are not trusted; every
/// variant here marks the font as unusable rather than something worth
/// crashing over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FontError {
    /// The offset index is shorter than its glyph count claims.
    #[error("glyph offset table is truncated")]
    TruncatedOffsetTable,
    /// A glyph's offsets point outside the outline data.
    #[error("glyph {} has an out-of-range data range", .0.0)]
    GlyphRangeOutOfBounds(GlyphId),
    /// A composite glyph's component list never terminates.
    #[error("component list of glyph {} does not terminate", .0.0)]
    UnterminatedComponentList(GlyphId),
}
