//! Per-document write serialization.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use quire_types::DocumentRef;

/// One exclusive lock per document, created on first use.
///
/// Held for the duration of a commit or merge so head updates on the same
/// document are serialized; different documents never contend.
#[derive(Debug, Default)]
pub struct DocumentLocks {
    locks: Mutex<HashMap<DocumentRef, Arc<Mutex<()>>>>,
}

impl DocumentLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&self, document: &DocumentRef) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().expect("lock table poisoned");
        Arc::clone(locks.entry(document.clone()).or_default())
    }

    /// Run `f` while holding `document`'s lock.
    pub fn with<T>(&self, document: &DocumentRef, f: impl FnOnce() -> T) -> T {
        let lock = self.handle(document);
        let _guard = lock.lock().expect("document lock poisoned");
        f()
    }

    /// Number of documents that have been locked at least once.
    pub fn len(&self) -> usize {
        self.locks.lock().expect("lock table poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn same_document_is_serialized() {
        let locks = Arc::new(DocumentLocks::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let doc = DocumentRef::parse("sim", "notes").unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let locks = Arc::clone(&locks);
                let inside = Arc::clone(&inside);
                let doc = doc.clone();
                thread::spawn(move || {
                    locks.with(&doc, || {
                        assert_eq!(inside.fetch_add(1, Ordering::SeqCst), 0);
                        thread::yield_now();
                        inside.fetch_sub(1, Ordering::SeqCst);
                    })
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(locks.len(), 1);
    }

    #[test]
    fn distinct_documents_get_distinct_locks() {
        let locks = DocumentLocks::new();
        let a = DocumentRef::parse("sim", "notes").unwrap();
        let b = DocumentRef::parse("tim", "notes").unwrap();
        // Nested acquisition of two different documents must not deadlock.
        let value = locks.with(&a, || locks.with(&b, || 42));
        assert_eq!(value, 42);
        assert_eq!(locks.len(), 2);
    }
}
