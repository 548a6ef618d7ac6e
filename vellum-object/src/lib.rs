/*!
The in-memory PDF object graph and the cross-reference table that manages it.

A PDF file is a graph of *indirect objects* (dictionaries, arrays, streams
and scalars) addressed by `(object number, generation number)` pairs. This
crate provides the owned, mutable representation of that graph ([`object`])
together with the table that registers indirect objects, computes which of
them are reachable from the document trailer, compacts and renumbers the
survivors, and serializes the byte-exact cross-reference section ([`xref`]).

Reading existing PDF files is not part of this crate; it only produces new
object graphs and writes them out through [`write`].
*/

use std::sync::atomic::{AtomicU64, Ordering};

pub mod object;
pub mod write;
pub mod xref;

static NEXT_DOCUMENT_ID: AtomicU64 = AtomicU64::new(1);

/// A process-unique identifier for one document.
///
/// Every [`xref::XrefTable`] is stamped with the id of the document that owns
/// it, and so is every indirect object registered in it. This is what makes
/// accidental cross-document insertion detectable.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct DocumentId(u64);

impl DocumentId {
    /// Allocate a fresh document id.
    ///
    /// Ids are never reused within one process.
    pub fn new() -> Self {
        Self(NEXT_DOCUMENT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}
