//! The cross-reference table: the registry of every indirect object of one
//! document.
//!
//! The table assigns object numbers, resolves references, computes which
//! objects are reachable from the document trailer, discards the rest
//! (compaction), renumbers the survivors into a contiguous range and writes
//! the byte-exact cross-reference section. Serialization strictness matters
//! here: several widely deployed readers (Acrobat above all) reject files
//! whose cross-reference entries are not exactly 20 bytes.

use crate::DocumentId;
use crate::object::dict::Dict;
use crate::object::dict::keys::{COUNT, DEAD_OBJECT, TYPE};
use crate::object::indirect::IndirectObject;
use crate::object::name::Name;
use crate::object::r#ref::ObjRef;
use crate::object::{Object, ObjectId};
use crate::write::PdfWriter;
use log::warn;
use rustc_hash::{FxBuildHasher, FxHashMap, FxHashSet};
use std::io;
use std::io::Write;
use thiserror::Error;

/// The default depth bound of a reachability walk.
///
/// Real documents never come close; the bound only exists so that a
/// pathologically nested (or deliberately adversarial) graph cannot make the
/// walk run away.
pub const DEFAULT_CLOSURE_DEPTH: usize = 32767;

/// The nesting level at which the walk stops descending inline and defers
/// the node to a follow-up pass instead.
const NESTING_LIMIT: usize = 1000;

/// An error raised by table mutation.
///
/// Both variants are contract violations on the caller's side, not
/// recoverable input conditions: a table holding duplicate or foreign
/// entries would serialize a corrupt file, so these fail fast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ObjectError {
    /// An object with this id is already registered in the table.
    #[error("object {0} is already registered")]
    DuplicateObject(ObjectId),
    /// The object belongs to a different document.
    #[error("object {0} belongs to a different document")]
    ForeignObject(ObjectId),
}

/// Where in the save lifecycle the table currently is.
///
/// The phases progress `Building → ClosureComputed → Compacted → Renumbered
/// → Written` during one save pass; any mutation drops the table back to
/// [`Phase::Building`]. The save orchestrator is responsible for running the
/// steps in order and exactly once per save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Objects are being added, removed or mutated.
    Building,
    /// A reachability closure has been computed.
    ClosureComputed,
    /// Unreachable objects have been discarded.
    Compacted,
    /// Surviving objects carry contiguous numbers starting at 1.
    Renumbered,
    /// The cross-reference section has been serialized.
    Written,
}

/// The cross-reference table of one document.
#[derive(Debug)]
pub struct XrefTable {
    document_id: DocumentId,
    entries: FxHashMap<ObjectId, IndirectObject>,
    max_object_number: u32,
    dead_object: Option<ObjectId>,
    phase: Phase,
}

impl XrefTable {
    /// Create an empty table owned by the given document.
    pub fn new(document_id: DocumentId) -> Self {
        Self {
            document_id,
            entries: FxHashMap::default(),
            max_object_number: 0,
            dead_object: None,
            phase: Phase::Building,
        }
    }

    /// The id of the owning document.
    pub fn document_id(&self) -> DocumentId {
        self.document_id
    }

    /// The number of registered objects.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The highest object number handed out so far.
    pub fn max_object_number(&self) -> u32 {
        self.max_object_number
    }

    /// Hand out the next unused object number.
    ///
    /// Monotonic within one save lifecycle: no two calls return the same
    /// number unless a compaction recomputed the high-water mark in between.
    pub fn next_object_number(&mut self) -> u32 {
        self.max_object_number += 1;
        self.max_object_number
    }

    /// Whether an object with the given id is registered.
    pub fn contains(&self, id: ObjectId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Return the entry for an id.
    ///
    /// A missing id is not an error; unresolved references are a normal
    /// state while a document is being put together.
    pub fn get(&self, id: ObjectId) -> Option<&IndirectObject> {
        self.entries.get(&id)
    }

    /// Return the entry for an id, mutably.
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut IndirectObject> {
        self.phase = Phase::Building;
        self.entries.get_mut(&id)
    }

    /// Resolve a reference to the value it points at.
    pub fn resolve(&self, reference: ObjRef) -> Option<&Object> {
        self.entries.get(&reference.id()).map(IndirectObject::object)
    }

    /// Register a prepared indirect object.
    ///
    /// An entry with the empty sentinel id gets the next free number
    /// assigned. An entry without an owner is stamped with this table's
    /// document; an entry owned by a different document is rejected.
    pub fn add(&mut self, mut reference: IndirectObject) -> Result<ObjRef, ObjectError> {
        if let Some(owner) = reference.owner() {
            if owner != self.document_id {
                return Err(ObjectError::ForeignObject(reference.id()));
            }
        } else {
            reference.set_owner(self.document_id);
        }

        let id = if reference.id().is_empty() {
            let id = ObjectId::new(self.next_object_number());
            reference.set_id(id);
            id
        } else {
            reference.id()
        };

        if self.entries.contains_key(&id) {
            return Err(ObjectError::DuplicateObject(id));
        }

        self.max_object_number = self.max_object_number.max(id.number());
        self.entries.insert(id, reference);
        self.phase = Phase::Building;

        Ok(ObjRef::new(id))
    }

    /// Register a plain value as a new indirect object, assigning it the
    /// next free number.
    pub fn add_object(&mut self, object: Object) -> ObjRef {
        let id = ObjectId::new(self.next_object_number());
        let mut entry = IndirectObject::new(id, object);
        entry.set_owner(self.document_id);

        self.entries.insert(id, entry);
        self.phase = Phase::Building;

        ObjRef::new(id)
    }

    /// Remove the entry for an id, returning it.
    ///
    /// Removing an id that is not registered is a no-op.
    pub fn remove(&mut self, id: ObjectId) -> Option<IndirectObject> {
        let removed = self.entries.remove(&id);

        if removed.is_some() {
            self.phase = Phase::Building;

            if self.dead_object == Some(id) {
                self.dead_object = None;
            }
        }

        removed
    }

    /// A snapshot of all entries, sorted by id.
    pub fn all_references(&self) -> Vec<&IndirectObject> {
        let mut refs: Vec<&IndirectObject> = self.entries.values().collect();
        refs.sort_by(|a, b| IndirectObject::compare(a, b));

        refs
    }

    /// All registered ids, sorted ascending.
    pub fn sorted_ids(&self) -> Vec<ObjectId> {
        let mut ids: Vec<ObjectId> = self.entries.keys().copied().collect();
        ids.sort();

        ids
    }

    /// The placeholder object substituted for references to missing objects
    /// encountered during an import.
    ///
    /// Created once per table and reused for every substitution; its
    /// `/Count` entry records how many substitutions were made.
    pub fn dead_object(&mut self) -> ObjRef {
        if let Some(id) = self.dead_object {
            if let Some(entry) = self.entries.get_mut(&id) {
                let count = entry.object_mut().as_dict_mut().and_then(|d| d.get_mut(COUNT));

                if let Some(count) = count {
                    let n = count.as_i64().unwrap_or(0);
                    *count = Object::from(n + 1);
                }

                self.phase = Phase::Building;

                return ObjRef::new(id);
            }
        }

        let mut dict = Dict::new();
        dict.insert(Name::new(TYPE), Name::new(DEAD_OBJECT));
        dict.insert(Name::new(COUNT), 1i64);

        let reference = self.add_object(Object::Dict(dict));
        self.dead_object = Some(reference.id());

        reference
    }

    /// Compute the set of all objects transitively reachable from `root`.
    ///
    /// The walk is depth-first over immediate children; indirect references
    /// are resolved through the table and visited exactly once, keyed by id,
    /// so cyclic structures (the page tree's `/Parent` back-links being the
    /// everyday case) terminate. Dangling references are skipped. Nodes
    /// encountered beyond the internal nesting threshold are deferred to an
    /// overflow worklist and picked up in follow-up passes, which bounds the
    /// walk's memory footprint per pass without dropping anything.
    ///
    /// Runs in O(V + E) of the reachable subgraph.
    pub fn transitive_closure(&self, root: &Object, max_depth: usize) -> FxHashSet<ObjectId> {
        let mut reached = FxHashSet::default();
        let mut overflow: Vec<ObjectId> = Vec::new();

        self.walk(root, max_depth, &mut reached, &mut overflow);

        // Deferred nodes restart at depth zero and may defer further nodes
        // themselves; iterate until the worklist runs dry.
        while let Some(id) = overflow.pop() {
            if let Some(entry) = self.entries.get(&id) {
                self.walk(entry.object(), max_depth, &mut reached, &mut overflow);
            }
        }

        reached
    }

    fn walk(
        &self,
        root: &Object,
        max_depth: usize,
        reached: &mut FxHashSet<ObjectId>,
        overflow: &mut Vec<ObjectId>,
    ) {
        let mut stack: Vec<(&Object, usize)> = vec![(root, 0)];

        while let Some((item, depth)) = stack.pop() {
            match item {
                Object::Ref(r) => {
                    let id = r.id();

                    match self.entries.get(&id) {
                        None => {
                            warn!("skipping dangling reference {id} during reachability walk");
                        }
                        Some(entry) => {
                            if reached.insert(id) {
                                if depth >= NESTING_LIMIT {
                                    overflow.push(id);
                                } else {
                                    stack.push((entry.object(), depth + 1));
                                }
                            }
                        }
                    }
                }
                Object::Dict(dict) => {
                    self.push_children(dict.entries().map(|(_, v)| v), depth, max_depth, &mut stack);
                }
                Object::Array(array) => {
                    self.push_children(array.iter(), depth, max_depth, &mut stack);
                }
                Object::Stream(stream) => {
                    self.push_children(
                        stream.dict().entries().map(|(_, v)| v),
                        depth,
                        max_depth,
                        &mut stack,
                    );
                }
                _ => {}
            }
        }
    }

    fn push_children<'a>(
        &self,
        children: impl Iterator<Item = &'a Object>,
        depth: usize,
        max_depth: usize,
        stack: &mut Vec<(&'a Object, usize)>,
    ) {
        if depth >= max_depth {
            warn!("reachability walk truncated at depth {depth}");

            return;
        }

        for child in children {
            stack.push((child, depth + 1));
        }
    }

    /// Discard every object not reachable from `root` and return how many
    /// were removed.
    ///
    /// Idempotent: a second call with an unchanged graph removes nothing.
    pub fn compact(&mut self, root: &Object) -> usize {
        let reached = self.transitive_closure(root, DEFAULT_CLOSURE_DEPTH);
        self.phase = Phase::ClosureComputed;

        let before = self.entries.len();
        self.entries.retain(|id, _| reached.contains(id));

        self.max_object_number = self
            .entries
            .keys()
            .map(|id| id.number())
            .max()
            .unwrap_or(0);

        if let Some(id) = self.dead_object {
            if !self.entries.contains_key(&id) {
                self.dead_object = None;
            }
        }

        self.phase = Phase::Compacted;

        before - self.entries.len()
    }

    /// Reassign contiguous object numbers `1..=N`, preserving the relative
    /// order of the previous ids, and rewrite every reference held inside
    /// surviving objects accordingly.
    ///
    /// Returns the old-to-new id mapping so that structures outside the
    /// table (the trailer above all) can be rewritten with
    /// [`remap_references`] as well. Recorded byte positions are cleared;
    /// they belong to the numbering they were recorded under.
    pub fn renumber(&mut self) -> FxHashMap<ObjectId, ObjectId> {
        debug_assert!(
            self.phase != Phase::Written,
            "renumbering a table that has already been serialized"
        );

        let ids = self.sorted_ids();

        let map: FxHashMap<ObjectId, ObjectId> = ids
            .iter()
            .enumerate()
            .map(|(i, old)| (*old, ObjectId::new(i as u32 + 1)))
            .collect();

        let mut renumbered =
            FxHashMap::with_capacity_and_hasher(self.entries.len(), FxBuildHasher::default());

        for old in ids {
            let mut entry = self.entries.remove(&old).unwrap();
            let new_id = map[&old];

            entry.set_id(new_id);
            entry.clear_position();
            remap_references(entry.object_mut(), &map);

            renumbered.insert(new_id, entry);
        }

        self.entries = renumbered;
        self.max_object_number = self.entries.len() as u32;
        self.dead_object = self.dead_object.and_then(|id| map.get(&id).copied());
        self.phase = Phase::Renumbered;

        map
    }

    /// Serialize every object in ascending id order, recording the byte
    /// position of each.
    pub fn write_objects<W: Write>(&mut self, w: &mut PdfWriter<W>) -> io::Result<()> {
        for id in self.sorted_ids() {
            let entry = self.entries.get_mut(&id).unwrap();
            w.write_indirect_object(entry)?;
        }

        Ok(())
    }

    /// Serialize the cross-reference section.
    ///
    /// Emits the `xref` keyword, a single subsection covering objects
    /// `0..=N`, the 20-byte free-list head for object 0 and one 20-byte
    /// entry per object in ascending id order. Requires contiguous object
    /// numbers (i.e. a renumbered table) and a recorded byte position on
    /// every entry.
    pub fn write_xref<W: Write>(&mut self, w: &mut PdfWriter<W>) -> io::Result<()> {
        let refs = self.all_references();

        debug_assert!(
            refs.last()
                .is_none_or(|e| e.id().number() as usize == refs.len()),
            "cross-reference subsection requires contiguous object numbers"
        );

        w.write_raw(b"xref\n")?;
        w.write_raw(format!("0 {}\n", refs.len() + 1).as_bytes())?;
        // The free-list head. Exactly 20 bytes, like every entry line.
        w.write_raw(b"0000000000 65535 f \n")?;

        for entry in refs {
            let position = entry
                .position()
                .expect("object was registered but never serialized");

            w.write_raw(
                format!("{:010} {:05} n \n", position, entry.id().generation()).as_bytes(),
            )?;
        }

        self.phase = Phase::Written;

        Ok(())
    }
}

/// Rewrite every reference inside `object` according to `map`.
///
/// References whose target is not in the map point at removed objects; the
/// file format defines such references to mean the null object, so that is
/// what they are replaced with.
pub fn remap_references(object: &mut Object, map: &FxHashMap<ObjectId, ObjectId>) {
    let mut stack: Vec<&mut Object> = vec![object];

    while let Some(item) = stack.pop() {
        if let Object::Ref(reference) = *item {
            let old = reference.id();

            *item = match map.get(&old).copied() {
                Some(new_id) => Object::Ref(ObjRef::new(new_id)),
                None => {
                    warn!("reference to removed object {old}, substituting null");
                    Object::Null
                }
            };

            continue;
        }

        match item {
            Object::Dict(d) => stack.extend(d.values_mut()),
            Object::Array(a) => stack.extend(a.iter_mut()),
            Object::Stream(s) => stack.extend(s.dict_mut().values_mut()),
            _ => {}
        }
    }
}
