//! The document trailer.
//!
//! The trailer is both the serialization tail of the file and the root of
//! every reachability walk: whatever it does not reference, directly or
//! transitively, does not survive a save.

use log::warn;
use rustc_hash::FxHashMap;
use vellum_object::object::array::Array;
use vellum_object::object::dict::Dict;
use vellum_object::object::dict::keys::{ID, INFO, ROOT, SIZE};
use vellum_object::object::name::Name;
use vellum_object::object::r#ref::ObjRef;
use vellum_object::object::string::PdfString;
use vellum_object::object::{Object, ObjectId};

/// The trailer of one document.
#[derive(Debug, Clone)]
pub struct Trailer {
    root: ObjRef,
    info: Option<ObjRef>,
    file_id: Option<PdfString>,
}

impl Trailer {
    pub(crate) fn new(root: ObjRef) -> Self {
        Self {
            root,
            info: None,
            file_id: None,
        }
    }

    /// The reference to the document catalog.
    pub fn root(&self) -> ObjRef {
        self.root
    }

    /// The reference to the information dictionary, if one is set.
    pub fn info(&self) -> Option<ObjRef> {
        self.info
    }

    /// The file identifier, if one has been computed.
    pub fn file_id(&self) -> Option<&PdfString> {
        self.file_id.as_ref()
    }

    pub(crate) fn set_info(&mut self, info: ObjRef) {
        self.info = Some(info);
    }

    pub(crate) fn set_file_id(&mut self, file_id: PdfString) {
        self.file_id = Some(file_id);
    }

    /// Rewrite the held references after the table was renumbered.
    pub(crate) fn remap(&mut self, map: &FxHashMap<ObjectId, ObjectId>) {
        let root = map
            .get(&self.root.id())
            .expect("the catalog is always reachable from the trailer");
        self.root = ObjRef::new(*root);

        if let Some(info) = self.info {
            match map.get(&info.id()) {
                Some(new_id) => self.info = Some(ObjRef::new(*new_id)),
                None => {
                    warn!("information dictionary disappeared during compaction");
                    self.info = None;
                }
            }
        }
    }

    /// Build the trailer dictionary.
    ///
    /// `size` is the value of the `/Size` entry and only known at
    /// serialization time; the same dictionary without it serves as the
    /// root of the reachability walk.
    pub(crate) fn to_object(&self, size: Option<i64>) -> Object {
        let mut dict = Dict::new();

        if let Some(size) = size {
            dict.insert(Name::new(SIZE), size);
        }

        dict.insert(Name::new(ROOT), self.root);

        if let Some(info) = self.info {
            dict.insert(Name::new(INFO), info);
        }

        if let Some(file_id) = &self.file_id {
            // Both halves are identical until incremental update exists:
            // the original id and the id of the current revision.
            let mut id = Array::new();
            id.push(file_id.clone());
            id.push(file_id.clone());
            dict.insert(Name::new(ID), id);
        }

        Object::Dict(dict)
    }
}
