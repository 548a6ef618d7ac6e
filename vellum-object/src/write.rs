//! Serializing the object graph.
//!
//! Every object knows how to write itself through [`WriteDirect`]; the
//! writer only contributes a running byte position, which the
//! cross-reference section is later built from. Offsets in that section
//! must match the serialized bytes exactly, so all output goes through
//! [`PdfWriter::write_raw`] and nothing else counts bytes.

use crate::object::Object;
use crate::object::array::Array;
use crate::object::date::DateTime;
use crate::object::dict::Dict;
use crate::object::indirect::IndirectObject;
use crate::object::name::Name;
use crate::object::number::Number;
use crate::object::r#ref::ObjRef;
use crate::object::stream::Stream;
use crate::object::string::PdfString;
use std::io;
use std::io::Write;

/// A byte sink that tracks the current byte position.
pub struct PdfWriter<W> {
    inner: W,
    position: u64,
}

impl<W: Write> PdfWriter<W> {
    /// Create a new writer starting at position 0.
    pub fn new(inner: W) -> Self {
        Self { inner, position: 0 }
    }

    /// The number of bytes written so far.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Write raw bytes to the sink.
    pub fn write_raw(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.inner.write_all(bytes)?;
        self.position += bytes.len() as u64;

        Ok(())
    }

    /// Serialize one indirect object, recording its byte position.
    pub fn write_indirect_object(&mut self, entry: &mut IndirectObject) -> io::Result<()> {
        entry.set_position(self.position);

        self.write_raw(entry.id().to_string().as_bytes())?;
        self.write_raw(b" obj\n")?;
        entry.object().write_direct(self)?;
        self.write_raw(b"\nendobj\n")
    }

    /// Flush the underlying sink.
    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    /// Consume the writer and return the sink.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

/// Serialization of one object value, without the surrounding
/// `obj`/`endobj` wrapper.
pub trait WriteDirect {
    /// Write the object's token representation.
    fn write_direct<W: Write>(&self, w: &mut PdfWriter<W>) -> io::Result<()>;
}

impl WriteDirect for Object {
    fn write_direct<W: Write>(&self, w: &mut PdfWriter<W>) -> io::Result<()> {
        match self {
            Self::Null => w.write_raw(b"null"),
            Self::Boolean(b) => w.write_raw(if *b { b"true" } else { b"false" }),
            Self::Number(n) => n.write_direct(w),
            Self::String(s) => s.write_direct(w),
            Self::Name(n) => n.write_direct(w),
            Self::Date(d) => d.write_direct(w),
            Self::Array(a) => a.write_direct(w),
            Self::Dict(d) => d.write_direct(w),
            Self::Stream(s) => s.write_direct(w),
            Self::Ref(r) => r.write_direct(w),
        }
    }
}

impl WriteDirect for Number {
    fn write_direct<W: Write>(&self, w: &mut PdfWriter<W>) -> io::Result<()> {
        w.write_raw(self.to_string().as_bytes())
    }
}

impl WriteDirect for ObjRef {
    fn write_direct<W: Write>(&self, w: &mut PdfWriter<W>) -> io::Result<()> {
        w.write_raw(self.to_string().as_bytes())
    }
}

impl WriteDirect for DateTime {
    fn write_direct<W: Write>(&self, w: &mut PdfWriter<W>) -> io::Result<()> {
        w.write_raw(b"(")?;
        w.write_raw(self.to_string().as_bytes())?;
        w.write_raw(b")")
    }
}

impl WriteDirect for Name {
    fn write_direct<W: Write>(&self, w: &mut PdfWriter<W>) -> io::Result<()> {
        w.write_raw(b"/")?;

        for byte in self.iter().copied() {
            if is_regular_character(byte) && byte.is_ascii_graphic() && byte != b'#' {
                w.write_raw(&[byte])?;
            } else {
                // Everything that is not a regular graphic character has to
                // be hex-escaped in a name token.
                w.write_raw(format!("#{byte:02X}").as_bytes())?;
            }
        }

        Ok(())
    }
}

impl WriteDirect for PdfString {
    fn write_direct<W: Write>(&self, w: &mut PdfWriter<W>) -> io::Result<()> {
        if self.prefers_literal_form() {
            w.write_raw(b"(")?;

            for byte in self.get().iter().copied() {
                match byte {
                    b'(' | b')' | b'\\' => w.write_raw(&[b'\\', byte])?,
                    b'\n' => w.write_raw(b"\\n")?,
                    b'\r' => w.write_raw(b"\\r")?,
                    b'\t' => w.write_raw(b"\\t")?,
                    0x08 => w.write_raw(b"\\b")?,
                    0x0c => w.write_raw(b"\\f")?,
                    0x20..=0x7e => w.write_raw(&[byte])?,
                    _ => w.write_raw(format!("\\{byte:03o}").as_bytes())?,
                }
            }

            w.write_raw(b")")
        } else {
            w.write_raw(b"<")?;

            for byte in self.get() {
                w.write_raw(format!("{byte:02X}").as_bytes())?;
            }

            w.write_raw(b">")
        }
    }
}

impl WriteDirect for Array {
    fn write_direct<W: Write>(&self, w: &mut PdfWriter<W>) -> io::Result<()> {
        w.write_raw(b"[")?;

        for (i, item) in self.iter().enumerate() {
            if i > 0 {
                w.write_raw(b" ")?;
            }

            item.write_direct(w)?;
        }

        w.write_raw(b"]")
    }
}

impl WriteDirect for Dict {
    fn write_direct<W: Write>(&self, w: &mut PdfWriter<W>) -> io::Result<()> {
        w.write_raw(b"<<")?;

        for (key, value) in self.entries() {
            key.write_direct(w)?;
            w.write_raw(b" ")?;
            value.write_direct(w)?;
        }

        w.write_raw(b">>")
    }
}

impl WriteDirect for Stream {
    fn write_direct<W: Write>(&self, w: &mut PdfWriter<W>) -> io::Result<()> {
        self.dict().write_direct(w)?;
        w.write_raw(b"\nstream\n")?;
        w.write_raw(self.raw_data())?;
        w.write_raw(b"\nendstream")
    }
}

#[inline]
fn is_regular_character(char: u8) -> bool {
    match char {
        // Whitespace characters
        0x00 | 0x09 | 0x0a | 0x0c | 0x0d | 0x20 => false,
        // Delimiter characters
        b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%' => false,
        // All other characters are considered regular.
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use crate::object::date::DateTime;
    use crate::object::dict::Dict;
    use crate::object::indirect::IndirectObject;
    use crate::object::name::Name;
    use crate::object::r#ref::ObjRef;
    use crate::object::stream::Stream;
    use crate::object::string::PdfString;
    use crate::object::{Object, ObjectId};
    use crate::write::{PdfWriter, WriteDirect};

    fn serialized(item: &impl WriteDirect) -> Vec<u8> {
        let mut w = PdfWriter::new(Vec::new());
        item.write_direct(&mut w).unwrap();
        w.into_inner()
    }

    #[test]
    fn position_tracks_bytes() {
        let mut w = PdfWriter::new(Vec::new());
        w.write_raw(b"%PDF-1.7\n").unwrap();

        assert_eq!(w.position(), 9);
    }

    #[test]
    fn null_and_booleans() {
        assert_eq!(serialized(&Object::Null), b"null");
        assert_eq!(serialized(&Object::Boolean(true)), b"true");
        assert_eq!(serialized(&Object::Boolean(false)), b"false");
    }

    #[test]
    fn name_plain() {
        assert_eq!(serialized(&Name::new(b"Type")), b"/Type");
    }

    #[test]
    fn name_escapes_irregular_bytes() {
        assert_eq!(serialized(&Name::new(b"lime Green")), b"/lime#20Green");
        assert_eq!(serialized(&Name::new(b"paired()")), b"/paired#28#29");
        assert_eq!(serialized(&Name::new(b"F#")), b"/F#23");
    }

    #[test]
    fn string_literal_escapes() {
        assert_eq!(
            serialized(&PdfString::from("a(b)c\\d")),
            b"(a\\(b\\)c\\\\d)"
        );
        assert_eq!(serialized(&PdfString::from("line\nbreak")), b"(line\\nbreak)");
    }

    #[test]
    fn string_hex_form() {
        assert_eq!(serialized(&PdfString::new([0x00, 0x9c, 0xff])), b"<009CFF>");
    }

    #[test]
    fn date() {
        assert_eq!(
            serialized(&DateTime::new(2024, 3, 9)),
            b"(D:20240309000000Z)"
        );
    }

    #[test]
    fn array() {
        let arr: crate::object::array::Array = [0i64, 0, 612, 792].into_iter().collect();

        assert_eq!(serialized(&arr), b"[0 0 612 792]");
    }

    #[test]
    fn dict() {
        let mut dict = Dict::new();
        dict.insert(Name::new(b"Type"), Name::new(b"Page"));
        dict.insert(Name::new(b"Count"), 3i64);

        assert_eq!(serialized(&dict), b"<</Type /Page/Count 3>>");
    }

    #[test]
    fn reference() {
        assert_eq!(
            serialized(&ObjRef::new(ObjectId::with_generation(12, 1))),
            b"12 1 R"
        );
    }

    #[test]
    fn stream_body() {
        let stream = Stream::new(b"abc".to_vec());

        assert_eq!(
            serialized(&stream),
            b"<</Length 3>>\nstream\nabc\nendstream"
        );
    }

    #[test]
    fn indirect_object_records_position() {
        let mut w = PdfWriter::new(Vec::new());
        w.write_raw(b"%PDF-1.7\n").unwrap();

        let mut entry = IndirectObject::new(ObjectId::new(1), Object::Boolean(true));
        w.write_indirect_object(&mut entry).unwrap();

        assert_eq!(entry.position(), Some(9));
        assert_eq!(w.into_inner(), b"%PDF-1.7\n1 0 obj\ntrue\nendobj\n");
    }
}
