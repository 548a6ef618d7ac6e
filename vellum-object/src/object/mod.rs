//! The polymorphic set of PDF values.

use crate::object::array::Array;
use crate::object::date::DateTime;
use crate::object::dict::Dict;
use crate::object::name::Name;
use crate::object::number::Number;
use crate::object::r#ref::ObjRef;
use crate::object::stream::Stream;
use crate::object::string::PdfString;
use log::warn;
use std::fmt;

pub mod array;
pub mod date;
pub mod dict;
pub mod indirect;
pub mod name;
pub mod number;
pub mod r#ref;
pub mod stream;
pub mod string;

/// The identity of one indirect object: an object number paired with a
/// generation number.
///
/// Object numbers of live objects start at 1; the number 0 is reserved for
/// the head of the free list and doubles as the "not yet assigned" sentinel
/// (see [`ObjectId::EMPTY`]).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ObjectId {
    number: u32,
    generation: u16,
}

impl ObjectId {
    /// The sentinel id of an object that has not been assigned a number yet.
    pub const EMPTY: Self = Self {
        number: 0,
        generation: 0,
    };

    /// Create a new id with generation number 0.
    pub const fn new(number: u32) -> Self {
        Self {
            number,
            generation: 0,
        }
    }

    /// Create a new id with an explicit generation number.
    ///
    /// Non-conformant producers occasionally emit generation numbers above
    /// the 16-bit range the file format allows; those are truncated rather
    /// than rejected so such files can still be imported.
    pub fn with_generation(number: u32, generation: u32) -> Self {
        let truncated = generation as u16;

        if u32::from(truncated) != generation {
            warn!("generation number {generation} of object {number} was truncated to {truncated}");
        }

        Self {
            number,
            generation: truncated,
        }
    }

    /// The object number.
    pub const fn number(&self) -> u32 {
        self.number
    }

    /// The generation number.
    pub const fn generation(&self) -> u16 {
        self.generation
    }

    /// Whether this is the unassigned sentinel.
    pub const fn is_empty(&self) -> bool {
        self.number == 0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.number, self.generation)
    }
}

/// A PDF object.
///
/// Only dictionaries, arrays and streams contain child items; every other
/// kind is a leaf. Children are either held directly or through an indirect
/// reference ([`Object::Ref`]) that is resolved against the owning
/// cross-reference table.
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    /// The null object.
    Null,
    /// A boolean object.
    Boolean(bool),
    /// A number object.
    Number(Number),
    /// A string object.
    String(PdfString),
    /// A name object.
    Name(Name),
    /// A date, stored as a string object in its `D:` form.
    Date(DateTime),
    /// An array object.
    Array(Array),
    /// A dict object.
    Dict(Dict),
    /// A stream object, a dictionary with an attached byte payload.
    Stream(Stream),
    /// A reference to an indirect object.
    Ref(ObjRef),
}

impl Object {
    /// Borrow the object as a dictionary.
    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Self::Dict(d) => Some(d),
            Self::Stream(s) => Some(s.dict()),
            _ => None,
        }
    }

    /// Mutably borrow the object as a dictionary.
    pub fn as_dict_mut(&mut self) -> Option<&mut Dict> {
        match self {
            Self::Dict(d) => Some(d),
            Self::Stream(s) => Some(s.dict_mut()),
            _ => None,
        }
    }

    /// Borrow the object as an array.
    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Mutably borrow the object as an array.
    pub fn as_array_mut(&mut self) -> Option<&mut Array> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Borrow the object as a stream.
    pub fn as_stream(&self) -> Option<&Stream> {
        match self {
            Self::Stream(s) => Some(s),
            _ => None,
        }
    }

    /// Return the reference this object holds, if it is one.
    pub fn as_ref_obj(&self) -> Option<ObjRef> {
        match self {
            Self::Ref(r) => Some(*r),
            _ => None,
        }
    }

    /// Return the contained integer, if the object is an integer number.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(n) => n.as_integer(),
            _ => None,
        }
    }

    /// Return the contained name, if the object is one.
    pub fn as_name(&self) -> Option<&Name> {
        match self {
            Self::Name(n) => Some(n),
            _ => None,
        }
    }

    /// Whether this object can hold child items.
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Dict(_) | Self::Array(_) | Self::Stream(_))
    }
}

impl From<bool> for Object {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for Object {
    fn from(value: i64) -> Self {
        Self::Number(Number::from_integer(value))
    }
}

impl From<f64> for Object {
    fn from(value: f64) -> Self {
        Self::Number(Number::from_real(value))
    }
}

impl From<Number> for Object {
    fn from(value: Number) -> Self {
        Self::Number(value)
    }
}

impl From<Name> for Object {
    fn from(value: Name) -> Self {
        Self::Name(value)
    }
}

impl From<PdfString> for Object {
    fn from(value: PdfString) -> Self {
        Self::String(value)
    }
}

impl From<DateTime> for Object {
    fn from(value: DateTime) -> Self {
        Self::Date(value)
    }
}

impl From<Array> for Object {
    fn from(value: Array) -> Self {
        Self::Array(value)
    }
}

impl From<Dict> for Object {
    fn from(value: Dict) -> Self {
        Self::Dict(value)
    }
}

impl From<Stream> for Object {
    fn from(value: Stream) -> Self {
        Self::Stream(value)
    }
}

impl From<ObjRef> for Object {
    fn from(value: ObjRef) -> Self {
        Self::Ref(value)
    }
}

#[cfg(test)]
mod tests {
    use crate::object::ObjectId;

    #[test]
    fn id_ordering() {
        let a = ObjectId::new(1);
        let b = ObjectId::with_generation(1, 4);
        let c = ObjectId::new(7);

        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn id_empty() {
        assert!(ObjectId::EMPTY.is_empty());
        assert!(!ObjectId::new(1).is_empty());
    }

    #[test]
    fn id_display() {
        assert_eq!(ObjectId::with_generation(34, 1).to_string(), "34 1");
    }

    #[test]
    fn generation_truncation() {
        // 65536 wraps to 0, 65537 to 1; malformed input is tolerated.
        assert_eq!(ObjectId::with_generation(5, 65537).generation(), 1);
        assert_eq!(ObjectId::with_generation(5, 65535).generation(), 65535);
    }
}
