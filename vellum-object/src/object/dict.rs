//! Dictionaries.

use crate::object::Object;
use crate::object::name::Name;
use std::ops::Deref;

/// A dictionary, a key-value map with names as keys and any PDF object
/// (or object reference) as values.
///
/// Entries keep their insertion order: re-inserting an existing key replaces
/// the value in place. Iteration is therefore stable and re-derivable, which
/// the reachability walk relies on, and serialized output does not reshuffle
/// between saves.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dict(Vec<(Name, Object)>);

impl Dict {
    /// Create a new empty dictionary.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Returns the number of entries in the dictionary.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return whether the dictionary is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Checks whether the dictionary contains an entry with a specific key.
    pub fn contains_key(&self, key: impl Deref<Target = [u8]>) -> bool {
        self.index_of(&key).is_some()
    }

    /// Set the entry for a key, replacing any previous value in place.
    pub fn insert(&mut self, key: impl Into<Name>, value: impl Into<Object>) {
        let key = key.into();
        let value = value.into();

        match self.index_of(&key) {
            Some(idx) => self.0[idx].1 = value,
            None => self.0.push((key, value)),
        }
    }

    /// Returns the entry of a key.
    pub fn get(&self, key: impl Deref<Target = [u8]>) -> Option<&Object> {
        self.index_of(&key).map(|idx| &self.0[idx].1)
    }

    /// Returns the entry of a key, mutably.
    pub fn get_mut(&mut self, key: impl Deref<Target = [u8]>) -> Option<&mut Object> {
        self.index_of(&key).map(|idx| &mut self.0[idx].1)
    }

    /// Remove the entry for a key, returning its previous value.
    pub fn remove(&mut self, key: impl Deref<Target = [u8]>) -> Option<Object> {
        let idx = self.index_of(&key)?;

        Some(self.0.remove(idx).1)
    }

    /// Returns an iterator over all keys in the dictionary.
    pub fn keys(&self) -> impl Iterator<Item = &Name> {
        self.0.iter().map(|(k, _)| k)
    }

    /// An iterator over all entries, in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&Name, &Object)> {
        self.0.iter().map(|(k, v)| (k, v))
    }

    /// A mutable iterator over all values, in insertion order.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut Object> {
        self.0.iter_mut().map(|(_, v)| v)
    }

    fn index_of(&self, key: &impl Deref<Target = [u8]>) -> Option<usize> {
        // Dictionaries in real documents are small; a scan beats a side
        // index that would have to be kept in sync with insertion order.
        self.0.iter().position(|(k, _)| **k == **key)
    }
}

/// A collection of well-known keys and name values in a PDF dictionary.
#[allow(missing_docs)]
pub mod keys {
    macro_rules! key {
        ($i:ident, $e:expr) => {
            pub const $i: &'static [u8] = $e;
        };
    }

    key!(AUTHOR, b"Author");
    key!(CATALOG, b"Catalog");
    key!(CONTENTS, b"Contents");
    key!(COUNT, b"Count");
    key!(CREATION_DATE, b"CreationDate");
    key!(CREATOR, b"Creator");
    key!(DEAD_OBJECT, b"DeadObject");
    key!(FILTER, b"Filter");
    key!(FLATE_DECODE, b"FlateDecode");
    key!(ID, b"ID");
    key!(INFO, b"Info");
    key!(KEYWORDS, b"Keywords");
    key!(KIDS, b"Kids");
    key!(LENGTH, b"Length");
    key!(MEDIA_BOX, b"MediaBox");
    key!(MOD_DATE, b"ModDate");
    key!(PAGE, b"Page");
    key!(PAGES, b"Pages");
    key!(PARENT, b"Parent");
    key!(PRODUCER, b"Producer");
    key!(RESOURCES, b"Resources");
    key!(ROOT, b"Root");
    key!(SIZE, b"Size");
    key!(SUBJECT, b"Subject");
    key!(TITLE, b"Title");
    key!(TYPE, b"Type");
    key!(VERSION, b"Version");
}

#[cfg(test)]
mod tests {
    use crate::object::Object;
    use crate::object::dict::Dict;
    use crate::object::dict::keys::{COUNT, KIDS, TYPE};
    use crate::object::name::Name;

    #[test]
    fn insert_and_get() {
        let mut dict = Dict::new();
        dict.insert(Name::new(TYPE), Name::new(b"Pages"));
        dict.insert(Name::new(COUNT), 0i64);

        assert_eq!(dict.len(), 2);
        assert!(dict.contains_key(TYPE));
        assert_eq!(dict.get(COUNT), Some(&Object::from(0i64)));
    }

    #[test]
    fn reinsert_replaces_in_place() {
        let mut dict = Dict::new();
        dict.insert(Name::new(TYPE), Name::new(b"Pages"));
        dict.insert(Name::new(COUNT), 0i64);
        dict.insert(Name::new(TYPE), Name::new(b"Page"));

        assert_eq!(dict.len(), 2);

        let keys: Vec<_> = dict.keys().map(|k| k.as_str().to_string()).collect();
        assert_eq!(keys, ["Type", "Count"]);
    }

    #[test]
    fn enumeration_is_stable() {
        let mut dict = Dict::new();
        dict.insert(Name::new(KIDS), 1i64);
        dict.insert(Name::new(COUNT), 2i64);

        let first: Vec<_> = dict.entries().map(|(k, _)| k.clone()).collect();
        let second: Vec<_> = dict.entries().map(|(k, _)| k.clone()).collect();

        assert_eq!(first, second);
    }

    #[test]
    fn remove() {
        let mut dict = Dict::new();
        dict.insert(Name::new(COUNT), 2i64);

        assert!(dict.remove(COUNT).is_some());
        assert!(dict.remove(COUNT).is_none());
        assert!(dict.is_empty());
    }
}
