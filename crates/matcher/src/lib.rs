//! # Record matcher (`matcher`)
//!
//! ## Purpose
//!
//! `matcher` sits on top of the normalization layer (`canonical`), the
//! similarity primitives (`similarity`), the record schema (`schema`) and
//! the retrieval index (`index`). Given one query record it retrieves
//! candidate documents, runs every schema field through its comparator, and
//! applies the tiered scoring policy to decide whether each candidate is the
//! same real-world entity.
//!
//! ## Decision model
//!
//! Each field comparison yields a [`Condition`]:
//!
//! - `Similar` fields count towards the tier's matched-field minimum.
//! - A single `DenyDup` vetoes the pair, whatever the similarity.
//! - A `MaxScore` raises the similarity requirement of every tier to 1.0.
//! - `Ignore` carries reporting data but no decision weight.
//!
//! The tier table is scanned in declared order and the first satisfied tier
//! governs; its `min_fields` is then the last hurdle. Callers that care
//! about which tier wins when several would match must order the table
//! accordingly — the engine deliberately never reorders it.
//!
//! ## Dedup tracking
//!
//! [`CheckedPairs`] is a caller-owned set of symmetric pair keys. Sharing
//! one set across a batch suppresses the mirror report of every accepted
//! pair; injecting a fresh set scopes suppression to a single invocation.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use index::RecordIndex;
//! use schema::{FieldKind, FieldSpec, Schema, ScoreTier};
//! use matcher::{CheckedPairs, EngineOptions, MatchEngine};
//!
//! let schema = Schema::new(
//!     vec![
//!         FieldSpec::new("id", 0, FieldKind::Id),
//!         FieldSpec::new("database", 1, FieldKind::Database),
//!         FieldSpec::new("title", 2, FieldKind::IndexedNGram),
//!         FieldSpec::new("year", 3, FieldKind::Exact),
//!     ],
//!     vec![ScoreTier::new(0.9, 1)],
//! )
//! .expect("schema builds");
//!
//! let engine = MatchEngine::new(
//!     Arc::new(schema),
//!     Arc::new(RecordIndex::in_memory()),
//!     EngineOptions::default(),
//! )
//! .expect("engine builds");
//!
//! engine.index_record("2|db1|Machine Learning|2020").expect("indexes");
//!
//! let pairs = CheckedPairs::new();
//! let results = engine
//!     .search_record("1|db1|Machine Learning|2020", &pairs)
//!     .expect("search runs");
//! assert_eq!(results.len(), 1);
//! ```

mod authors;
mod dedup;
mod engine;
mod types;

pub use crate::dedup::{pair_key, CheckedPairs};
pub use crate::engine::{compare_fields, EngineOptions, MatchEngine};
pub use crate::types::{
    CheckFieldResult, Condition, FieldText, MatchError, MatchResult, MatchSummary,
};
