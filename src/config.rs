//! Declarative configuration for a dedup service.
//!
//! A service is described by one JSON document: the field list, the score
//! tiers and the engine options. The file deserializes into plain config
//! structs which then validate into the runtime [`Schema`]; every
//! construction failure (bad position table, malformed pattern, empty tier
//! table) surfaces here, before any record is touched.
//!
//! ## Example configuration
//!
//! ```json
//! {
//!   "name": "articles",
//!   "fields": [
//!     { "name": "id", "position": 0, "kind": "id" },
//!     { "name": "database", "position": 1, "kind": "database" },
//!     { "name": "title", "position": 2, "kind": "indexed_ngram" },
//!     { "name": "authors", "position": 3, "kind": "authors" },
//!     { "name": "year", "position": 4, "kind": "exact", "policy": "deny_dup" },
//!     { "name": "pages", "position": 5, "kind": "regexp",
//!       "pattern": "(\\d+)", "group": 1, "required_field": "year" }
//!   ],
//!   "tiers": [
//!     { "min_similarity": 0.95, "min_fields": 1 },
//!     { "min_similarity": 0.82, "min_fields": 2 }
//!   ],
//!   "options": {
//!     "top_k": 500,
//!     "occurrence_separator": "//",
//!     "max_text_size": 300,
//!     "self_check": true
//!   }
//! }
//! ```
//!
//! Engine options can additionally be overridden through `RECDUP_*`
//! environment variables in the binary.

use std::fs;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use schema::{FieldKind, FieldSpec, MatchPolicy, Schema, SchemaError, ScoreTier};

/// Errors raised while loading or validating a service configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse config JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("invalid schema: {0}")]
    Schema(#[from] SchemaError),

    #[error("invalid value for {variable}: {value}")]
    EnvOverride { variable: String, value: String },
}

/// Top-level configuration document for one dedup service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Optional service name, used by the registry and in logs.
    #[serde(default)]
    pub name: Option<String>,
    pub fields: Vec<FieldConfig>,
    pub tiers: Vec<TierConfig>,
    #[serde(default)]
    pub options: OptionsConfig,
}

/// One declared field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldConfig {
    pub name: String,
    pub position: u32,
    #[serde(flatten)]
    pub kind: FieldKindConfig,
    #[serde(default)]
    pub policy: MatchPolicy,
    #[serde(default)]
    pub required_field: Option<String>,
}

/// Declared comparison kind. Mirrors [`FieldKind`] minus the compiled
/// pattern, which only exists after validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKindConfig {
    Id,
    Database,
    IndexedNgram,
    Authors,
    Exact,
    Ngram { min_score: f32 },
    Dice { min_score: f32 },
    Regexp { pattern: String, group: usize },
    NoCompare,
}

/// One declared score tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierConfig {
    pub min_similarity: f32,
    pub min_fields: u32,
}

/// Engine tuning options as declared in the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionsConfig {
    pub top_k: usize,
    pub occurrence_separator: String,
    pub max_text_size: usize,
    pub self_check: bool,
    /// Emit the full per-field result tuples instead of the compact
    /// summary.
    pub report: bool,
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            top_k: 1000,
            occurrence_separator: "//".to_string(),
            max_text_size: 300,
            self_check: false,
            report: false,
        }
    }
}

impl ServiceConfig {
    /// Load and parse a configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse a configuration document from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Validate the declared fields and tiers into a runtime [`Schema`].
    ///
    /// Regular-expression patterns are compiled here; a malformed pattern
    /// is a configuration error, not a per-record one.
    pub fn build_schema(&self) -> Result<Schema, ConfigError> {
        let mut fields = Vec::with_capacity(self.fields.len());
        for declared in &self.fields {
            let kind = match &declared.kind {
                FieldKindConfig::Id => FieldKind::Id,
                FieldKindConfig::Database => FieldKind::Database,
                FieldKindConfig::IndexedNgram => FieldKind::IndexedNGram,
                FieldKindConfig::Authors => FieldKind::Authors,
                FieldKindConfig::Exact => FieldKind::Exact,
                FieldKindConfig::Ngram { min_score } => FieldKind::NGram {
                    min_score: *min_score,
                },
                FieldKindConfig::Dice { min_score } => FieldKind::Dice {
                    min_score: *min_score,
                },
                FieldKindConfig::Regexp { pattern, group } => {
                    let compiled = Regex::new(pattern).map_err(|source| {
                        SchemaError::InvalidPattern {
                            field: declared.name.clone(),
                            source,
                        }
                    })?;
                    FieldKind::RegExp {
                        pattern: compiled,
                        group: *group,
                    }
                }
                FieldKindConfig::NoCompare => FieldKind::NoCompare,
            };

            let mut field = FieldSpec::new(&declared.name, declared.position, kind)
                .with_policy(declared.policy);
            if let Some(required) = &declared.required_field {
                field = field.with_required_field(required);
            }
            fields.push(field);
        }

        let tiers = self
            .tiers
            .iter()
            .map(|t| ScoreTier::new(t.min_similarity, t.min_fields))
            .collect();

        Ok(Schema::new(fields, tiers)?)
    }
}

impl OptionsConfig {
    /// Apply `RECDUP_*` environment overrides on top of the file values.
    ///
    /// Recognized: `RECDUP_TOP_K`, `RECDUP_SEPARATOR`,
    /// `RECDUP_MAX_TEXT_SIZE`, `RECDUP_SELF_CHECK`, `RECDUP_REPORT`.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(value) = std::env::var("RECDUP_TOP_K") {
            self.top_k = parse_env("RECDUP_TOP_K", &value)?;
        }
        if let Ok(value) = std::env::var("RECDUP_SEPARATOR") {
            self.occurrence_separator = value;
        }
        if let Ok(value) = std::env::var("RECDUP_MAX_TEXT_SIZE") {
            self.max_text_size = parse_env("RECDUP_MAX_TEXT_SIZE", &value)?;
        }
        if let Ok(value) = std::env::var("RECDUP_SELF_CHECK") {
            self.self_check = parse_env("RECDUP_SELF_CHECK", &value)?;
        }
        if let Ok(value) = std::env::var("RECDUP_REPORT") {
            self.report = parse_env("RECDUP_REPORT", &value)?;
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(variable: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::EnvOverride {
        variable: variable.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "fields": [
            { "name": "id", "position": 0, "kind": "id" },
            { "name": "database", "position": 1, "kind": "database" },
            { "name": "title", "position": 2, "kind": "indexed_ngram" },
            { "name": "year", "position": 3, "kind": "exact" }
        ],
        "tiers": [ { "min_similarity": 0.9, "min_fields": 1 } ]
    }"#;

    #[test]
    fn minimal_config_builds_a_schema() {
        let config = ServiceConfig::from_json(MINIMAL).expect("config parses");
        let schema = config.build_schema().expect("schema builds");
        assert_eq!(schema.max_position(), 3);
        assert_eq!(config.options.top_k, 1000);
    }

    #[test]
    fn field_kinds_with_parameters_parse() {
        let json = r#"{
            "fields": [
                { "name": "id", "position": 0, "kind": "id" },
                { "name": "database", "position": 1, "kind": "database" },
                { "name": "title", "position": 2, "kind": "indexed_ngram" },
                { "name": "journal", "position": 3, "kind": "ngram", "min_score": 0.8 },
                { "name": "pages", "position": 4, "kind": "regexp",
                  "pattern": "(\\d+)", "group": 1, "policy": "max_score" }
            ],
            "tiers": [ { "min_similarity": 0.9, "min_fields": 1 } ]
        }"#;
        let config = ServiceConfig::from_json(json).expect("config parses");
        let schema = config.build_schema().expect("schema builds");

        assert!(matches!(
            schema.fields()[3].kind,
            FieldKind::NGram { min_score } if min_score == 0.8
        ));
        assert_eq!(schema.fields()[4].policy, MatchPolicy::MaxScore);
    }

    #[test]
    fn malformed_pattern_is_a_config_error() {
        let json = r#"{
            "fields": [
                { "name": "id", "position": 0, "kind": "id" },
                { "name": "database", "position": 1, "kind": "database" },
                { "name": "title", "position": 2, "kind": "indexed_ngram" },
                { "name": "pages", "position": 3, "kind": "regexp",
                  "pattern": "(unclosed", "group": 1 }
            ],
            "tiers": [ { "min_similarity": 0.9, "min_fields": 1 } ]
        }"#;
        let config = ServiceConfig::from_json(json).expect("config parses");
        let err = config.build_schema().expect_err("bad pattern");
        assert!(matches!(
            err,
            ConfigError::Schema(SchemaError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn schema_violations_surface_as_config_errors() {
        let json = r#"{
            "fields": [
                { "name": "id", "position": 0, "kind": "id" },
                { "name": "database", "position": 1, "kind": "database" },
                { "name": "title", "position": 2, "kind": "indexed_ngram" },
                { "name": "year", "position": 2, "kind": "exact" }
            ],
            "tiers": [ { "min_similarity": 0.9, "min_fields": 1 } ]
        }"#;
        let config = ServiceConfig::from_json(json).expect("config parses");
        let err = config.build_schema().expect_err("duplicate position");
        assert!(matches!(
            err,
            ConfigError::Schema(SchemaError::DuplicatePosition(2))
        ));
    }

    #[test]
    fn unknown_kind_fails_at_parse_time() {
        let json = r#"{
            "fields": [ { "name": "id", "position": 0, "kind": "mystery" } ],
            "tiers": []
        }"#;
        assert!(matches!(
            ServiceConfig::from_json(json),
            Err(ConfigError::JsonParse(_))
        ));
    }
}
