use std::sync::{Arc, RwLock};

use hashbrown::HashMap;

use crate::document::Document;
use crate::IndexError;

/// Storage behind the retrieval index: posting lists plus a document store.
///
/// Implementations must be safe to share across threads; batch runs insert
/// from one thread but query from many.
pub trait IndexBackend: Send + Sync {
    /// Store a document and add it to the posting list of every term.
    fn insert(&self, doc_id: u64, terms: &[String], doc: Arc<Document>) -> Result<(), IndexError>;

    /// Fetch a document by id.
    fn doc(&self, doc_id: u64) -> Result<Option<Arc<Document>>, IndexError>;

    /// Document ids containing the term, in insertion order.
    fn postings(&self, term: &str) -> Result<Vec<u64>, IndexError>;

    /// Number of stored documents.
    fn len(&self) -> usize;
}

#[derive(Default)]
struct MemoryState {
    postings: HashMap<String, Vec<u64>>,
    docs: HashMap<u64, Arc<Document>>,
}

/// In-process backend over hash-map posting lists.
#[derive(Default)]
pub struct MemoryBackend {
    state: RwLock<MemoryState>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IndexBackend for MemoryBackend {
    fn insert(&self, doc_id: u64, terms: &[String], doc: Arc<Document>) -> Result<(), IndexError> {
        let mut state = self
            .state
            .write()
            .map_err(|_| IndexError::backend("poisoned lock"))?;
        for term in terms {
            state.postings.entry(term.clone()).or_default().push(doc_id);
        }
        state.docs.insert(doc_id, doc);
        Ok(())
    }

    fn doc(&self, doc_id: u64) -> Result<Option<Arc<Document>>, IndexError> {
        let state = self
            .state
            .read()
            .map_err(|_| IndexError::backend("poisoned lock"))?;
        Ok(state.docs.get(&doc_id).cloned())
    }

    fn postings(&self, term: &str) -> Result<Vec<u64>, IndexError> {
        let state = self
            .state
            .read()
            .map_err(|_| IndexError::backend("poisoned lock"))?;
        Ok(state.postings.get(term).cloned().unwrap_or_default())
    }

    fn len(&self) -> usize {
        self.state.read().map(|s| s.docs.len()).unwrap_or(0)
    }
}
