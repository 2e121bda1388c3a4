use std::sync::Arc;

use hashbrown::HashMap;

use crate::document::Document;
use crate::{tokenize, IndexError, RecordIndex};

/// One retrieval candidate: the stored document plus its relevance score.
///
/// The score is the fraction of the query's distinct n-grams found in the
/// document, in `[0, 1]`. It ranks candidates for evaluation order only.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub doc: Arc<Document>,
    pub score: f32,
}

impl RecordIndex {
    /// Top-K documents by term overlap with the query text.
    ///
    /// Results are ordered by descending score with insertion id as the tie
    /// break, so a given corpus and query always produce the same ranking.
    pub fn search(&self, query_text: &str, top_k: usize) -> Result<Vec<SearchHit>, IndexError> {
        let terms = tokenize(query_text);
        if terms.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        let mut overlap: HashMap<u64, u32> = HashMap::new();
        for term in &terms {
            for doc_id in self.backend.postings(term)? {
                *overlap.entry(doc_id).or_insert(0) += 1;
            }
        }
        log::debug!(
            "query produced {} grams, {} candidate docs",
            terms.len(),
            overlap.len()
        );

        let mut ranked: Vec<(u64, u32)> = overlap.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(top_k);

        let total = terms.len() as f32;
        let mut hits = Vec::with_capacity(ranked.len());
        for (doc_id, matched) in ranked {
            let doc = self
                .backend
                .doc(doc_id)?
                .ok_or_else(|| IndexError::backend(format!("missing doc {doc_id}")))?;
            hits.push(SearchHit {
                doc,
                score: matched as f32 / total,
            });
        }
        Ok(hits)
    }
}
