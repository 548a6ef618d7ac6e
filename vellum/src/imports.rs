//! Per-thread tracking of imported documents.
//!
//! Workers importing pages from the same source file should not parse and
//! intern it twice, but the cache must not keep a closed document alive
//! either, and threads importing concurrently must not contend on a shared
//! table. So: one cache per thread, weak handles, and a lazy sweep of dead
//! entries whenever the cache is consulted.

use crate::PdfDocument;
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::sync::{Arc, Weak};

thread_local! {
    static IMPORTED: RefCell<FxHashMap<String, Weak<PdfDocument>>> =
        RefCell::new(FxHashMap::default());
}

/// Look up a previously registered import by its key (conventionally the
/// source path).
///
/// Only finds documents registered on the calling thread, and only while
/// someone still holds a strong handle to them.
pub fn imported_document(key: &str) -> Option<Arc<PdfDocument>> {
    IMPORTED.with(|cache| {
        let mut cache = cache.borrow_mut();
        cache.retain(|_, document| document.strong_count() > 0);

        cache.get(key).and_then(Weak::upgrade)
    })
}

/// Register an imported document under a key on the calling thread.
///
/// The cache holds the document weakly; dropping every strong handle makes
/// the entry disappear on the next access.
pub fn register_import(key: impl Into<String>, document: &Arc<PdfDocument>) {
    IMPORTED.with(|cache| {
        cache
            .borrow_mut()
            .insert(key.into(), Arc::downgrade(document));
    });
}

#[cfg(test)]
mod tests {
    use crate::PdfDocument;
    use crate::imports::{imported_document, register_import};
    use std::sync::Arc;

    #[test]
    fn registered_documents_are_found() {
        let doc = Arc::new(PdfDocument::new());
        register_import("a.pdf", &doc);

        let found = imported_document("a.pdf").unwrap();
        assert!(Arc::ptr_eq(&doc, &found));
        assert!(imported_document("other.pdf").is_none());
    }

    #[test]
    fn dropped_documents_disappear() {
        let doc = Arc::new(PdfDocument::new());
        register_import("b.pdf", &doc);
        drop(doc);

        assert!(imported_document("b.pdf").is_none());
    }

    #[test]
    fn caches_are_per_thread() {
        let doc = Arc::new(PdfDocument::new());
        register_import("c.pdf", &doc);

        let seen_elsewhere = std::thread::scope(|scope| {
            scope
                .spawn(|| imported_document("c.pdf").is_some())
                .join()
                .unwrap()
        });

        assert!(!seen_elsewhere);
        assert!(imported_document("c.pdf").is_some());
    }
}
