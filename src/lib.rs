//! recdup: fuzzy record matching and deduplication.
//!
//! Given a schema describing the columns of a piped-text record, recdup
//! decides whether a candidate record retrieved from its n-gram text index
//! is the same real-world entity as a query record. Field comparisons run
//! over canonicalized text, per-field outcomes aggregate through a tiered
//! similarity/field-count policy, and symmetric duplicate reports are
//! suppressed within a run.
//!
//! This crate stitches the pipeline together: configuration loading
//! ([`ServiceConfig`]), the [`DedupService`] owning one schema plus one
//! index, and the caller-owned [`ServiceRegistry`] mapping service names to
//! running instances. The heavy lifting lives in the member crates:
//! `canonical` (normalization), `similarity` (string measures), `schema`
//! (field model), `index` (retrieval) and `matcher` (decision engine).
//!
//! ## Example
//!
//! ```
//! use recdup::{DedupService, ServiceConfig};
//!
//! let config = ServiceConfig::from_json(r#"{
//!     "fields": [
//!         { "name": "id", "position": 0, "kind": "id" },
//!         { "name": "database", "position": 1, "kind": "database" },
//!         { "name": "title", "position": 2, "kind": "indexed_ngram" },
//!         { "name": "year", "position": 3, "kind": "exact" }
//!     ],
//!     "tiers": [ { "min_similarity": 0.9, "min_fields": 1 } ]
//! }"#).expect("config parses");
//!
//! let service = DedupService::from_config(config).expect("service builds");
//! service.index_record("2|db1|Machine Learning|2020").expect("indexes");
//!
//! let outcome = service.search_lines(["1|db1|Machine Learning|2020"]).expect("searches");
//! assert_eq!(outcome.matches.len(), 1);
//! ```

pub mod config;

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

pub use crate::config::{ConfigError, FieldConfig, FieldKindConfig, OptionsConfig, ServiceConfig,
    TierConfig};
pub use canonical::{limit_size, normalize, order_occ};
pub use index::RecordIndex;
pub use matcher::{
    CheckedPairs, Condition, EngineOptions, MatchEngine, MatchError, MatchResult, MatchSummary,
};
pub use schema::{FieldKind, FieldSpec, MatchPolicy, Schema, SchemaError, ScoreTier};

/// Errors surfaced by the service layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Match(#[from] MatchError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("report serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Counters for one file ingestion pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct IndexStats {
    pub indexed: usize,
    pub skipped: usize,
}

/// One batch search: accepted matches plus input counters.
#[derive(Debug)]
pub struct SearchOutcome {
    pub matches: Vec<MatchResult>,
    pub searched: usize,
    pub skipped: usize,
}

/// One schema, one index, one engine. Built from a [`ServiceConfig`] and
/// shared read-only afterwards.
pub struct DedupService {
    name: String,
    engine: MatchEngine,
    report: bool,
}

impl std::fmt::Debug for DedupService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DedupService")
            .field("name", &self.name)
            .field("report", &self.report)
            .finish_non_exhaustive()
    }
}

impl DedupService {
    pub fn from_config(config: ServiceConfig) -> Result<Self, ServiceError> {
        let schema = config.build_schema()?;
        let options = EngineOptions {
            top_k: config.options.top_k,
            occurrence_separator: config.options.occurrence_separator.clone(),
            max_text_size: config.options.max_text_size,
            self_check: config.options.self_check,
        };
        let engine = MatchEngine::new(
            Arc::new(schema),
            Arc::new(RecordIndex::in_memory()),
            options,
        )?;

        Ok(Self {
            name: config.name.clone().unwrap_or_else(|| "default".to_string()),
            engine,
            report: config.options.report,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn engine(&self) -> &MatchEngine {
        &self.engine
    }

    /// Index a single piped record.
    pub fn index_record(&self, line: &str) -> Result<(), ServiceError> {
        self.engine.index_record(line)?;
        Ok(())
    }

    /// Index every record of a piped-text file.
    ///
    /// Bad records (wrong column count, empty key fields, undecodable
    /// lines) are logged and skipped; the counters report both outcomes so
    /// a caller preferring abort-on-error can check `skipped`.
    pub fn index_file<P: AsRef<Path>>(&self, path: P) -> Result<IndexStats, ServiceError> {
        let reader = BufReader::new(File::open(path)?);
        let mut stats = IndexStats::default();

        for line in reader.lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    tracing::warn!(%err, "skipping undecodable input line");
                    stats.skipped += 1;
                    continue;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match self.engine.index_record(&line) {
                Ok(_) => stats.indexed += 1,
                Err(err) => {
                    tracing::warn!(%err, "skipping bad record");
                    stats.skipped += 1;
                }
            }
        }

        tracing::info!(
            service = %self.name,
            indexed = stats.indexed,
            skipped = stats.skipped,
            "ingestion finished"
        );
        Ok(stats)
    }

    /// Match one query record. The dedup set is caller-owned so its scope —
    /// one call, one batch, one whole run — stays a caller decision.
    pub fn search_record(
        &self,
        line: &str,
        pairs: &CheckedPairs,
    ) -> Result<Vec<MatchResult>, ServiceError> {
        Ok(self.engine.search_record(line, pairs)?)
    }

    /// Match a batch of query records under one shared dedup set.
    pub fn search_lines<I, S>(&self, lines: I) -> Result<SearchOutcome, ServiceError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let pairs = CheckedPairs::new();
        let mut outcome = SearchOutcome {
            matches: Vec::new(),
            searched: 0,
            skipped: 0,
        };

        for line in lines {
            let line = line.as_ref();
            if line.trim().is_empty() {
                continue;
            }
            match self.engine.search_record(line, &pairs) {
                Ok(results) => {
                    outcome.searched += 1;
                    outcome.matches.extend(results);
                }
                Err(err) => {
                    tracing::warn!(%err, "skipping bad query record");
                    outcome.skipped += 1;
                }
            }
        }
        Ok(outcome)
    }

    /// Match every record of a query file under one shared dedup set.
    pub fn search_file<P: AsRef<Path>>(&self, path: P) -> Result<SearchOutcome, ServiceError> {
        let reader = BufReader::new(File::open(path)?);
        let mut lines = Vec::new();
        for line in reader.lines() {
            match line {
                Ok(line) => lines.push(line),
                Err(err) => {
                    tracing::warn!(%err, "skipping undecodable query line");
                }
            }
        }
        self.search_lines(lines)
    }

    /// Render one accepted match as a JSON value: the compact summary by
    /// default, the full per-field result tuples in report mode.
    pub fn render(&self, result: &MatchResult) -> Result<serde_json::Value, ServiceError> {
        if self.report {
            Ok(serde_json::to_value(result)?)
        } else {
            let indexed_name = &self.engine.schema().indexed_field().name;
            Ok(serde_json::to_value(result.summary(indexed_name))?)
        }
    }
}

/// Explicit, caller-owned registry of running services.
///
/// Constructed at startup and passed by reference wherever a service must
/// be resolved by name; there is no process-wide instance map.
#[derive(Default)]
pub struct ServiceRegistry {
    services: HashMap<String, Arc<DedupService>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a service under its configured name, replacing any previous
    /// entry with that name. Returns the shared handle.
    pub fn register(&mut self, service: DedupService) -> Arc<DedupService> {
        let handle = Arc::new(service);
        self.services
            .insert(handle.name().to_string(), Arc::clone(&handle));
        handle
    }

    pub fn get(&self, name: &str) -> Option<Arc<DedupService>> {
        self.services.get(name).cloned()
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.services.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}
