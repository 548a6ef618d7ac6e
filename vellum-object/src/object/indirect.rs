//! Indirect objects, the entries of the cross-reference table.

use crate::DocumentId;
use crate::object::{Object, ObjectId};
use std::cmp::Ordering;

/// An indirect object: an id bound to an owned value.
///
/// The table owns the value; everything else points at it through
/// [`crate::object::ObjRef`] handles. Once the object has been serialized,
/// [`IndirectObject::position`] records the byte offset its serialization
/// started at, which is what the cross-reference section is built from.
#[derive(Debug, Clone, PartialEq)]
pub struct IndirectObject {
    id: ObjectId,
    object: Object,
    owner: Option<DocumentId>,
    position: Option<u64>,
}

impl IndirectObject {
    /// Create a new indirect object that has not been registered anywhere.
    pub fn new(id: ObjectId, object: Object) -> Self {
        Self {
            id,
            object,
            owner: None,
            position: None,
        }
    }

    /// The id of the object.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: ObjectId) {
        self.id = id;
    }

    /// The contained value.
    pub fn object(&self) -> &Object {
        &self.object
    }

    /// The contained value, mutably.
    pub fn object_mut(&mut self) -> &mut Object {
        &mut self.object
    }

    /// The document this object belongs to, if it has been registered.
    pub fn owner(&self) -> Option<DocumentId> {
        self.owner
    }

    pub(crate) fn set_owner(&mut self, owner: DocumentId) {
        self.owner = Some(owner);
    }

    /// The byte offset the object's serialization started at, once written.
    pub fn position(&self) -> Option<u64> {
        self.position
    }

    /// Record the byte offset the object's serialization started at.
    pub fn set_position(&mut self, position: u64) {
        self.position = Some(position);
    }

    pub(crate) fn clear_position(&mut self) {
        self.position = None;
    }

    /// The total order used for every stable sort of table entries:
    /// object number first, generation number as the tie break.
    pub fn compare(a: &Self, b: &Self) -> Ordering {
        a.id.cmp(&b.id)
    }
}
