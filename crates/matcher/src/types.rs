use std::cmp::Ordering;
use std::sync::Arc;

use index::Document;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Categorical outcome of comparing one field between query and candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// The field agrees; counts towards the tier's matched-field minimum.
    Similar,
    /// The field disagrees under the plain policy.
    NotSimilar,
    /// Nothing to decide: empty side, non-compared kind, or an unmet
    /// field dependency.
    Ignore,
    /// Disagreement under the max-score policy: the pair is only acceptable
    /// at full indexed-field similarity.
    MaxScore,
    /// Disagreement under the deny-dup policy: the pair is vetoed.
    DenyDup,
}

/// Outcome of one field comparison, kept for reporting and decision input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckFieldResult {
    pub field_name: String,
    pub query_value: String,
    pub candidate_value: String,
    pub condition: Condition,
    pub similarity: f32,
}

/// One accepted (query, candidate) pair.
///
/// Created only on acceptance and immutable afterwards. Output collections
/// order results by `(similarity, candidate database, candidate id)` so
/// ranking is deterministic across runs.
#[derive(Debug, Clone, Serialize)]
pub struct MatchResult {
    pub query_params: Vec<String>,
    pub query_id: String,
    pub query_database: String,
    pub candidate_id: String,
    pub candidate_database: String,
    /// True indexed-field similarity between the pair.
    pub similarity: f32,
    /// Relevance score the retrieval index ranked this candidate with.
    pub retrieval_score: f32,
    pub field_results: Vec<CheckFieldResult>,
    #[serde(skip)]
    pub doc: Arc<Document>,
}

impl MatchResult {
    /// Deterministic output ordering: descending similarity, then candidate
    /// database and id.
    pub fn cmp_ranked(&self, other: &Self) -> Ordering {
        other
            .similarity
            .total_cmp(&self.similarity)
            .then_with(|| self.candidate_database.cmp(&other.candidate_database))
            .then_with(|| self.candidate_id.cmp(&other.candidate_id))
    }

    /// Summary form of the report: pair identity and scores plus the
    /// normalized and original text of the indexed field and every field
    /// that was actually compared.
    pub fn summary(&self, indexed_field: &str) -> MatchSummary {
        let fields = self
            .field_results
            .iter()
            .filter(|r| r.field_name == indexed_field || r.condition != Condition::Ignore)
            .map(|r| FieldText {
                field_name: r.field_name.clone(),
                query_value: r.query_value.clone(),
                candidate_value: r.candidate_value.clone(),
                candidate_original: self.doc.original(&r.field_name).to_string(),
            })
            .collect();

        MatchSummary {
            similarity: self.similarity,
            retrieval_score: self.retrieval_score,
            query_id: self.query_id.clone(),
            query_database: self.query_database.clone(),
            candidate_id: self.candidate_id.clone(),
            candidate_database: self.candidate_database.clone(),
            fields,
        }
    }
}

/// Normalized and original text of one reported field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldText {
    pub field_name: String,
    pub query_value: String,
    pub candidate_value: String,
    pub candidate_original: String,
}

/// Compact report emitted per accepted pair unless full per-field reporting
/// is requested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchSummary {
    pub similarity: f32,
    pub retrieval_score: f32,
    pub query_id: String,
    pub query_database: String,
    pub candidate_id: String,
    pub candidate_database: String,
    pub fields: Vec<FieldText>,
}

/// Errors produced by the matching layer.
#[derive(Debug, Error)]
pub enum MatchError {
    /// Invalid engine options.
    #[error("invalid engine options: {0}")]
    InvalidOptions(String),
    /// Schema construction or lookup failed.
    #[error("schema error: {0}")]
    Schema(#[from] schema::SchemaError),
    /// One input record was malformed.
    #[error("record error: {0}")]
    Record(#[from] schema::RecordError),
    /// Index storage or retrieval failed.
    #[error("index error: {0}")]
    Index(#[from] index::IndexError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(similarity: f32, database: &str, id: &str) -> MatchResult {
        MatchResult {
            query_params: vec![],
            query_id: "q".into(),
            query_database: "qdb".into(),
            candidate_id: id.into(),
            candidate_database: database.into(),
            similarity,
            retrieval_score: 0.0,
            field_results: vec![],
            doc: Arc::new(Document::new()),
        }
    }

    #[test]
    fn ranking_orders_by_similarity_then_database_then_id() {
        let mut results = vec![
            result(0.8, "db2", "1"),
            result(0.9, "db1", "2"),
            result(0.8, "db1", "9"),
            result(0.8, "db1", "3"),
        ];
        results.sort_by(MatchResult::cmp_ranked);

        let keys: Vec<(String, String)> = results
            .iter()
            .map(|r| (r.candidate_database.clone(), r.candidate_id.clone()))
            .collect();
        assert_eq!(results[0].similarity, 0.9);
        assert_eq!(
            keys[1..].to_vec(),
            vec![
                ("db1".to_string(), "3".to_string()),
                ("db1".to_string(), "9".to_string()),
                ("db2".to_string(), "1".to_string()),
            ]
        );
    }

    #[test]
    fn condition_serde_round_trip() {
        let json = serde_json::to_string(&Condition::DenyDup).expect("serialize");
        assert_eq!(json, "\"deny_dup\"");
        let back: Condition = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, Condition::DenyDup);
    }

    #[test]
    fn summary_keeps_compared_fields_and_the_indexed_field() {
        let mut r = result(0.95, "db1", "2");
        r.field_results = vec![
            CheckFieldResult {
                field_name: "title".into(),
                query_value: "machinelearning".into(),
                candidate_value: "machinelearning".into(),
                condition: Condition::Ignore,
                similarity: 0.95,
            },
            CheckFieldResult {
                field_name: "year".into(),
                query_value: "2020".into(),
                candidate_value: "2020".into(),
                condition: Condition::Similar,
                similarity: 1.0,
            },
            CheckFieldResult {
                field_name: "note".into(),
                query_value: "x".into(),
                candidate_value: "y".into(),
                condition: Condition::Ignore,
                similarity: 0.0,
            },
        ];

        let summary = r.summary("title");
        let names: Vec<&str> = summary
            .fields
            .iter()
            .map(|f| f.field_name.as_str())
            .collect();
        assert_eq!(names, vec!["title", "year"]);
    }
}
