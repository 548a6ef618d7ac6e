//! Reading the `glyf` outline table through the `loca` offset index.
//!
//! The `loca` table maps a glyph id to the byte range of its outline data
//! inside `glyf`; a composite glyph's outline consists of component records
//! that pull in other glyphs. Both are needed for subsetting: the byte
//! ranges to copy, and the component closure so that no composite ends up
//! referencing a glyph that was left out of the subset.

use crate::reader::Reader;
use crate::{FontError, GlyphId};
use bitflags::bitflags;
use std::collections::BTreeSet;
use std::ops::Range;

bitflags! {
    /// The flags word of one composite glyph component record.
    ///
    /// The values are fixed by the sfnt format. Only the bits that change
    /// the record's size (and the continuation bit) matter here; the rest
    /// are retained but ignored.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ComponentFlags: u16 {
        /// Arguments are 16-bit words instead of bytes.
        const ARG_1_AND_2_ARE_WORDS = 0x0001;
        /// A single F2Dot14 scale follows the arguments.
        const WE_HAVE_A_SCALE = 0x0008;
        /// At least one more component record follows.
        const MORE_COMPONENTS = 0x0020;
        /// Two F2Dot14 scales (x and y) follow the arguments.
        const WE_HAVE_AN_X_AND_Y_SCALE = 0x0040;
        /// A full F2Dot14 2x2 transform follows the arguments.
        const WE_HAVE_A_TWO_BY_TWO = 0x0080;
    }
}

/// Composite records are self-delimiting, so a component list longer than
/// this can only come from a font whose continuation bits lie.
const MAX_COMPONENTS: usize = u16::MAX as usize;

/// The parsed `loca` offset index.
#[derive(Debug, Clone)]
pub struct LocaTable {
    offsets: Vec<u32>,
}

impl LocaTable {
    /// Parse the offset index.
    ///
    /// `long_format` corresponds to `indexToLocFormat` in the font head:
    /// the short format stores half-offsets in 16 bits, the long format
    /// plain 32-bit offsets. The table holds one entry more than there are
    /// glyphs; glyph `i` spans `[offset(i), offset(i + 1))`.
    pub fn parse(data: &[u8], num_glyphs: u16, long_format: bool) -> Result<Self, FontError> {
        let count = num_glyphs as usize + 1;
        let mut r = Reader::new(data);
        let mut offsets = Vec::with_capacity(count);

        for _ in 0..count {
            let offset = if long_format {
                r.read_u32()
            } else {
                r.read_u16().map(|n| u32::from(n) * 2)
            };

            offsets.push(offset.ok_or(FontError::TruncatedOffsetTable)?);
        }

        Ok(Self { offsets })
    }

    /// The number of glyphs the index covers.
    pub fn num_glyphs(&self) -> u16 {
        (self.offsets.len() - 1) as u16
    }

    /// The byte range of a glyph's outline data.
    ///
    /// An empty range is a valid result: glyphs without an outline (space,
    /// most control characters) have none.
    pub fn range(&self, glyph: GlyphId) -> Result<Range<usize>, FontError> {
        let start = *self
            .offsets
            .get(glyph.0 as usize)
            .ok_or(FontError::GlyphRangeOutOfBounds(glyph))?;
        let end = *self
            .offsets
            .get(glyph.0 as usize + 1)
            .ok_or(FontError::GlyphRangeOutOfBounds(glyph))?;

        if end < start {
            return Err(FontError::GlyphRangeOutOfBounds(glyph));
        }

        Ok(start as usize..end as usize)
    }
}

/// The `glyf` outline table of one font.
#[derive(Debug, Clone)]
pub struct GlyphTable<'a> {
    data: &'a [u8],
    loca: LocaTable,
}

impl<'a> GlyphTable<'a> {
    /// Create a new glyph table over the raw `glyf` bytes.
    pub fn new(data: &'a [u8], loca: LocaTable) -> Self {
        Self { data, loca }
    }

    /// The offset index.
    pub fn loca(&self) -> &LocaTable {
        &self.loca
    }

    /// Extract the outline data of one glyph.
    pub fn glyph_data(&self, glyph: GlyphId) -> Result<&'a [u8], FontError> {
        let range = self.loca.range(glyph)?;

        self.data
            .get(range)
            .ok_or(FontError::GlyphRangeOutOfBounds(glyph))
    }

    /// Expand a set of glyph ids with every glyph referenced, directly or
    /// transitively, by a composite glyph among them.
    ///
    /// `.notdef` (glyph 0) is always part of the result, requested or not.
    pub fn closure(
        &self,
        requested: impl IntoIterator<Item = GlyphId>,
    ) -> Result<BTreeSet<GlyphId>, FontError> {
        let mut closed = BTreeSet::new();
        let mut worklist: Vec<GlyphId> = requested.into_iter().collect();
        worklist.push(GlyphId::NOTDEF);

        while let Some(glyph) = worklist.pop() {
            if !closed.insert(glyph) {
                continue;
            }

            self.push_components(glyph, &mut worklist)?;
        }

        Ok(closed)
    }

    /// Append the direct components of `glyph` to the worklist, if it is
    /// composite.
    fn push_components(&self, glyph: GlyphId, worklist: &mut Vec<GlyphId>) -> Result<(), FontError> {
        let data = self.glyph_data(glyph)?;

        // Glyphs without outline data have no components either.
        if data.is_empty() {
            return Ok(());
        }

        let mut r = Reader::new(data);

        let num_contours = r
            .read_i16()
            .ok_or(FontError::GlyphRangeOutOfBounds(glyph))?;

        // A non-negative contour count marks a simple glyph.
        if num_contours >= 0 {
            return Ok(());
        }

        // Skip the remaining header (the bounding box).
        r.skip_bytes(8)
            .ok_or(FontError::GlyphRangeOutOfBounds(glyph))?;

        for _ in 0..MAX_COMPONENTS {
            let flags = r
                .read_u16()
                .map(ComponentFlags::from_bits_retain)
                .ok_or(FontError::UnterminatedComponentList(glyph))?;
            let component = r
                .read_u16()
                .map(GlyphId)
                .ok_or(FontError::UnterminatedComponentList(glyph))?;

            worklist.push(component);

            let mut skip = if flags.contains(ComponentFlags::ARG_1_AND_2_ARE_WORDS) {
                4
            } else {
                2
            };

            if flags.contains(ComponentFlags::WE_HAVE_A_SCALE) {
                skip += 2;
            } else if flags.contains(ComponentFlags::WE_HAVE_AN_X_AND_Y_SCALE) {
                skip += 4;
            } else if flags.contains(ComponentFlags::WE_HAVE_A_TWO_BY_TWO) {
                skip += 8;
            }

            r.skip_bytes(skip)
                .ok_or(FontError::UnterminatedComponentList(glyph))?;

            if !flags.contains(ComponentFlags::MORE_COMPONENTS) {
                return Ok(());
            }
        }

        Err(FontError::UnterminatedComponentList(glyph))
    }
}

#[cfg(test)]
mod tests {
    use crate::glyf::{ComponentFlags, GlyphTable, LocaTable};
    use crate::{FontError, GlyphId};
    use std::collections::BTreeSet;

    /// Build a `glyf` table plus matching short-format `loca` bytes from
    /// per-glyph outline data.
    fn build_font(glyphs: &[Vec<u8>]) -> (Vec<u8>, Vec<u8>) {
        let mut glyf = Vec::new();
        let mut loca = Vec::new();

        loca.extend_from_slice(&0u16.to_be_bytes());

        for data in glyphs {
            glyf.extend_from_slice(data);
            // Short-format entries store half-offsets; keep them even.
            assert_eq!(glyf.len() % 2, 0);
            loca.extend_from_slice(&((glyf.len() / 2) as u16).to_be_bytes());
        }

        (glyf, loca)
    }

    fn simple_glyph() -> Vec<u8> {
        // One contour, a zeroed bounding box and no actual outline; enough
        // for everything that only looks at the header.
        let mut data = 1i16.to_be_bytes().to_vec();
        data.extend_from_slice(&[0; 8]);

        data
    }

    fn composite_glyph(components: &[(ComponentFlags, u16)]) -> Vec<u8> {
        let mut data = (-1i16).to_be_bytes().to_vec();
        data.extend_from_slice(&[0; 8]);

        for (flags, glyph) in components {
            data.extend_from_slice(&flags.bits().to_be_bytes());
            data.extend_from_slice(&glyph.to_be_bytes());

            let args = if flags.contains(ComponentFlags::ARG_1_AND_2_ARE_WORDS) {
                4
            } else {
                2
            };
            data.extend_from_slice(&vec![0; args]);

            if flags.contains(ComponentFlags::WE_HAVE_A_SCALE) {
                data.extend_from_slice(&[0; 2]);
            } else if flags.contains(ComponentFlags::WE_HAVE_AN_X_AND_Y_SCALE) {
                data.extend_from_slice(&[0; 4]);
            } else if flags.contains(ComponentFlags::WE_HAVE_A_TWO_BY_TWO) {
                data.extend_from_slice(&[0; 8]);
            }
        }

        data
    }

    fn ids(ids: &[u16]) -> BTreeSet<GlyphId> {
        ids.iter().copied().map(GlyphId).collect()
    }

    #[test]
    fn flag_values_match_the_format() {
        assert_eq!(ComponentFlags::ARG_1_AND_2_ARE_WORDS.bits(), 1);
        assert_eq!(ComponentFlags::WE_HAVE_A_SCALE.bits(), 8);
        assert_eq!(ComponentFlags::MORE_COMPONENTS.bits(), 32);
        assert_eq!(ComponentFlags::WE_HAVE_AN_X_AND_Y_SCALE.bits(), 64);
        assert_eq!(ComponentFlags::WE_HAVE_A_TWO_BY_TWO.bits(), 128);
    }

    #[test]
    fn glyph_ranges() {
        let (glyf, loca) = build_font(&[simple_glyph(), Vec::new(), simple_glyph()]);
        let loca = LocaTable::parse(&loca, 3, false).unwrap();
        let table = GlyphTable::new(&glyf, loca);

        assert_eq!(table.glyph_data(GlyphId(0)).unwrap().len(), 10);
        // The empty glyph has an empty, but valid, range.
        assert_eq!(table.glyph_data(GlyphId(1)).unwrap(), b"");
        assert_eq!(table.glyph_data(GlyphId(2)).unwrap().len(), 10);

        assert_eq!(
            table.glyph_data(GlyphId(3)),
            Err(FontError::GlyphRangeOutOfBounds(GlyphId(3)))
        );
    }

    #[test]
    fn long_format_offsets() {
        let mut loca = Vec::new();
        for offset in [0u32, 10, 10] {
            loca.extend_from_slice(&offset.to_be_bytes());
        }

        let loca = LocaTable::parse(&loca, 2, true).unwrap();

        assert_eq!(loca.range(GlyphId(0)).unwrap(), 0..10);
        assert_eq!(loca.range(GlyphId(1)).unwrap(), 10..10);
    }

    #[test]
    fn truncated_loca_is_rejected() {
        let loca = 0u16.to_be_bytes().to_vec();

        assert_eq!(
            LocaTable::parse(&loca, 4, false).err(),
            Some(FontError::TruncatedOffsetTable)
        );
    }

    #[test]
    fn closure_expands_composites() {
        // Glyph 5 is composite and pulls in glyphs 2 and 9.
        let mut glyphs = vec![simple_glyph(); 10];
        glyphs[5] = composite_glyph(&[
            (
                ComponentFlags::ARG_1_AND_2_ARE_WORDS | ComponentFlags::MORE_COMPONENTS,
                2,
            ),
            (ComponentFlags::empty(), 9),
        ]);

        let (glyf, loca) = build_font(&glyphs);
        let loca = LocaTable::parse(&loca, 10, false).unwrap();
        let table = GlyphTable::new(&glyf, loca);

        let closed = table.closure([GlyphId(5)]).unwrap();

        assert_eq!(closed, ids(&[0, 2, 5, 9]));
    }

    #[test]
    fn closure_is_transitive() {
        // 3 -> 5 -> 7, so requesting 3 must surface 7 as well.
        let mut glyphs = vec![simple_glyph(); 10];
        glyphs[3] = composite_glyph(&[(ComponentFlags::empty(), 5)]);
        glyphs[5] = composite_glyph(&[(ComponentFlags::WE_HAVE_A_SCALE, 7)]);

        let (glyf, loca) = build_font(&glyphs);
        let loca = LocaTable::parse(&loca, 10, false).unwrap();
        let table = GlyphTable::new(&glyf, loca);

        let closed = table.closure([GlyphId(3)]).unwrap();

        assert_eq!(closed, ids(&[0, 3, 5, 7]));
    }

    #[test]
    fn closure_always_contains_notdef() {
        let (glyf, loca) = build_font(&[simple_glyph(), simple_glyph()]);
        let loca = LocaTable::parse(&loca, 2, false).unwrap();
        let table = GlyphTable::new(&glyf, loca);

        assert_eq!(table.closure([GlyphId(1)]).unwrap(), ids(&[0, 1]));
        assert_eq!(table.closure([]).unwrap(), ids(&[0]));
    }

    #[test]
    fn cyclic_composites_terminate() {
        let mut glyphs = vec![simple_glyph(); 4];
        glyphs[1] = composite_glyph(&[(ComponentFlags::empty(), 2)]);
        glyphs[2] = composite_glyph(&[(ComponentFlags::empty(), 1)]);

        let (glyf, loca) = build_font(&glyphs);
        let loca = LocaTable::parse(&loca, 4, false).unwrap();
        let table = GlyphTable::new(&glyf, loca);

        assert_eq!(table.closure([GlyphId(1)]).unwrap(), ids(&[0, 1, 2]));
    }

    #[test]
    fn lying_continuation_bit_is_an_error() {
        // A single record claiming that more follow, with nothing behind it.
        let mut glyphs = vec![simple_glyph(); 3];
        glyphs[1] = composite_glyph(&[(ComponentFlags::MORE_COMPONENTS, 2)]);

        let (glyf, loca) = build_font(&glyphs);
        let loca = LocaTable::parse(&loca, 3, false).unwrap();
        let table = GlyphTable::new(&glyf, loca);

        assert_eq!(
            table.closure([GlyphId(1)]),
            Err(FontError::UnterminatedComponentList(GlyphId(1)))
        );
    }
}
