//! # Record retrieval index
//!
//! A small full-text index over the normalized value of one schema field.
//! Field values are tokenized into fixed-size character n-grams, posting
//! lists map each gram to the documents containing it, and a query returns
//! the top-K documents ranked by term overlap with the query string.
//!
//! The ranking is a retrieval relevance score, not a true similarity: a
//! candidate sharing many grams with the query may still be a poor match
//! once the matching engine computes real field similarity. Callers must
//! treat the order as a hint, never as monotonic in match quality.
//!
//! ## Backends
//!
//! Storage sits behind the [`IndexBackend`] trait so the posting-list
//! representation can be swapped; [`MemoryBackend`] is the in-process
//! implementation used by both production batch runs and tests.
//!
//! ## Example
//!
//! ```
//! use index::{Document, RecordIndex};
//!
//! let index = RecordIndex::in_memory();
//!
//! let mut doc = Document::new();
//! doc.push_field("id", vec!["1".into()], "1");
//! doc.push_field("title", vec!["machinelearning".into()], "Machine Learning");
//! index.insert("machinelearning", doc).unwrap();
//!
//! let hits = index.search("machinelearning", 10).unwrap();
//! assert_eq!(hits.len(), 1);
//! assert_eq!(hits[0].doc.first_value("id"), Some("1"));
//! ```

mod backend;
mod document;
mod query;

pub use crate::backend::{IndexBackend, MemoryBackend};
pub use crate::document::Document;
pub use crate::query::SearchHit;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use thiserror::Error;

/// Fixed character n-gram size used by the tokenizer.
pub const GRAM_SIZE: usize = 3;

/// Errors raised by index storage or lookup.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("backend failure: {0}")]
    Backend(String),

    #[error("cannot index an empty value")]
    EmptyValue,
}

impl IndexError {
    pub fn backend(msg: impl Into<String>) -> Self {
        IndexError::Backend(msg.into())
    }
}

/// Tokenize a normalized value into overlapping character n-grams.
///
/// Values shorter than [`GRAM_SIZE`] become a single whole-value term so
/// short identifiers remain retrievable.
pub fn tokenize(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return Vec::new();
    }
    if chars.len() < GRAM_SIZE {
        return vec![text.to_string()];
    }

    let mut seen = hashbrown::HashSet::with_capacity(chars.len());
    let mut grams: Vec<String> = Vec::with_capacity(chars.len() - GRAM_SIZE + 1);
    for window in chars.windows(GRAM_SIZE) {
        let gram: String = window.iter().collect();
        if seen.insert(gram.clone()) {
            grams.push(gram);
        }
    }
    grams
}

/// Retrieval index over one field of a record corpus.
pub struct RecordIndex {
    backend: Box<dyn IndexBackend>,
    next_id: AtomicU64,
}

impl RecordIndex {
    /// Index backed by in-process posting lists.
    pub fn in_memory() -> Self {
        Self::with_backend(Box::new(MemoryBackend::new()))
    }

    /// Index over a caller-provided backend.
    pub fn with_backend(backend: Box<dyn IndexBackend>) -> Self {
        Self {
            backend,
            next_id: AtomicU64::new(0),
        }
    }

    /// Store a document under the n-grams of its indexed-field text.
    /// Returns the internal document id.
    pub fn insert(&self, indexed_text: &str, doc: Document) -> Result<u64, IndexError> {
        let terms = tokenize(indexed_text);
        if terms.is_empty() {
            return Err(IndexError::EmptyValue);
        }
        let doc_id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.backend.insert(doc_id, &terms, Arc::new(doc))?;
        log::debug!("indexed doc {doc_id} under {} grams", terms.len());
        Ok(doc_id)
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.backend.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backend.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_produces_overlapping_trigrams() {
        assert_eq!(tokenize("abcde"), vec!["abc", "bcd", "cde"]);
    }

    #[test]
    fn tokenize_deduplicates_repeated_grams() {
        assert_eq!(tokenize("ababab"), vec!["aba", "bab"]);
    }

    #[test]
    fn short_values_become_a_single_term() {
        assert_eq!(tokenize("ab"), vec!["ab"]);
        assert_eq!(tokenize("a"), vec!["a"]);
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn tokenize_counts_characters_not_bytes() {
        assert_eq!(tokenize("héllo").len(), 3);
    }

    #[test]
    fn inserting_an_empty_value_is_an_error() {
        let index = RecordIndex::in_memory();
        let err = index
            .insert("", Document::new())
            .expect_err("empty indexed text");
        assert!(matches!(err, IndexError::EmptyValue));
        assert!(index.is_empty());
    }

    #[test]
    fn insert_assigns_increasing_ids() {
        let index = RecordIndex::in_memory();
        let first = index.insert("abcdef", Document::new()).expect("insert");
        let second = index.insert("abcdef", Document::new()).expect("insert");
        assert!(second > first);
        assert_eq!(index.len(), 2);
    }
}
