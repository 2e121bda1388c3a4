use std::sync::Arc;

use canonical::{limit_size, normalize};
use index::{Document, RecordIndex};
use schema::{FieldKind, FieldSpec, MatchPolicy, Schema};
use similarity::{dice_coefficient, edit_similarity, ngram_similarity};

use crate::authors::match_author_lists;
use crate::dedup::{pair_key, CheckedPairs};
use crate::types::{CheckFieldResult, Condition, MatchError, MatchResult};


/// How many more ranked candidates to examine after the true similarity
/// first drops below the tier table's floor. Retrieval rank is not
/// monotonic in similarity, so a short tail is worth scanning; an unbounded
/// one is not.
const PRUNE_LOOKAHEAD: usize = 5;

/// Engine tuning knobs. Cheap to clone, serde-friendly, validated once at
/// engine construction.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EngineOptions {
    /// Maximum number of candidates requested from the retrieval index.
    pub top_k: usize,
    /// Reserved token separating the occurrences of a multi-valued column.
    pub occurrence_separator: String,
    /// Character budget for indexed-field text fed to n-gram comparison.
    pub max_text_size: usize,
    /// Suppress symmetric duplicate reports (A-vs-B and B-vs-A) within one
    /// run, and skip a record retrieving itself.
    pub self_check: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            top_k: 1000,
            occurrence_separator: "//".to_string(),
            max_text_size: 300,
            self_check: false,
        }
    }
}

impl EngineOptions {
    pub fn validate(&self) -> Result<(), MatchError> {
        if self.top_k == 0 {
            return Err(MatchError::InvalidOptions(
                "top_k must be greater than zero".into(),
            ));
        }
        if self.occurrence_separator.is_empty() {
            return Err(MatchError::InvalidOptions(
                "occurrence_separator must not be empty".into(),
            ));
        }
        if self.max_text_size == 0 {
            return Err(MatchError::InvalidOptions(
                "max_text_size must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// Matching engine: evaluates query records against retrieved candidates
/// under one schema.
///
/// The schema and index are shared read-only; the dedup set is passed into
/// every search by the caller, so batches decide its scope.
pub struct MatchEngine {
    schema: Arc<Schema>,
    index: Arc<RecordIndex>,
    options: EngineOptions,
}

impl std::fmt::Debug for MatchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchEngine")
            .field("schema", &self.schema)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl MatchEngine {
    pub fn new(
        schema: Arc<Schema>,
        index: Arc<RecordIndex>,
        options: EngineOptions,
    ) -> Result<Self, MatchError> {
        options.validate()?;
        Ok(Self {
            schema,
            index,
            options,
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn index(&self) -> &RecordIndex {
        &self.index
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Parse one piped record and store it in the retrieval index.
    ///
    /// Every column is split on the occurrence separator and each occurrence
    /// normalized; the raw column text is stored alongside for reporting.
    /// The id and database columns must be non-empty after normalization.
    pub fn index_record(&self, line: &str) -> Result<u64, MatchError> {
        let params = self.schema.parse_record(line)?;
        let sep = &self.options.occurrence_separator;

        let mut doc = Document::new();
        for field in self.schema.fields() {
            let raw = &params[field.position as usize];
            let values: Vec<String> = raw
                .split(sep.as_str())
                .map(|occurrence| normalize(occurrence, sep))
                .filter(|occurrence| !occurrence.is_empty())
                .collect();
            doc.push_field(&field.name, values, raw.as_str());
        }

        for key_field in [self.schema.id_field(), self.schema.database_field()] {
            if doc.first_value(&key_field.name).is_none() {
                return Err(schema::RecordError::EmptyField(key_field.name.clone()).into());
            }
        }

        let indexed_raw = &params[self.schema.indexed_field().position as usize];
        let indexed_text = limit_size(
            &normalize(indexed_raw, sep),
            self.options.max_text_size,
        );
        if indexed_text.is_empty() {
            return Err(
                schema::RecordError::EmptyField(self.schema.indexed_field().name.clone()).into(),
            );
        }

        Ok(self.index.insert(&indexed_text, doc)?)
    }

    /// Match one query record against the index.
    ///
    /// Candidates come back in retrieval-rank order; for each one the true
    /// indexed-field similarity is computed and the pair evaluated. Once the
    /// similarity falls below the lowest tier, only [`PRUNE_LOOKAHEAD`] more
    /// candidates are examined before the rest of the ranked list is
    /// abandoned. Accepted results are ordered by descending similarity,
    /// then candidate database and id.
    pub fn search_record(
        &self,
        line: &str,
        pairs: &CheckedPairs,
    ) -> Result<Vec<MatchResult>, MatchError> {
        let params = self.schema.parse_record(line)?;
        let sep = &self.options.occurrence_separator;

        let indexed_field = self.schema.indexed_field();
        let query_text = limit_size(
            &normalize(&params[indexed_field.position as usize], sep),
            self.options.max_text_size,
        );

        let hits = self.index.search(&query_text, self.options.top_k)?;
        let floor = self.schema.similarity_floor();

        let mut results = Vec::new();
        let mut below_floor = 0usize;
        for hit in &hits {
            let candidate_text = limit_size(
                hit.doc.first_value(&indexed_field.name).unwrap_or(""),
                self.options.max_text_size,
            );
            let similarity = ngram_similarity(&query_text, &candidate_text);

            if similarity < floor {
                below_floor += 1;
                if below_floor > PRUNE_LOOKAHEAD {
                    tracing::debug!(
                        examined = results.len() + below_floor,
                        retrieved = hits.len(),
                        "abandoning ranked tail below similarity floor"
                    );
                    break;
                }
                continue;
            }
            below_floor = 0;

            if let Some(result) =
                self.evaluate_pair(&params, &query_text, hit.doc.clone(), similarity, hit.score, pairs)
            {
                results.push(result);
            }
        }

        results.sort_by(MatchResult::cmp_ranked);
        Ok(results)
    }

    /// Full evaluation of one (query, candidate) pair: dedup key check,
    /// per-field dispatch, tier lookup.
    fn evaluate_pair(
        &self,
        params: &[String],
        query_text: &str,
        doc: Arc<Document>,
        similarity: f32,
        retrieval_score: f32,
        pairs: &CheckedPairs,
    ) -> Option<MatchResult> {
        let sep = &self.options.occurrence_separator;
        let query_id = normalize(&params[self.schema.id_field().position as usize], sep);
        let query_db = normalize(&params[self.schema.database_field().position as usize], sep);
        let candidate_id = doc
            .first_value(&self.schema.id_field().name)
            .unwrap_or("")
            .to_string();
        let candidate_db = doc
            .first_value(&self.schema.database_field().name)
            .unwrap_or("")
            .to_string();

        let key = pair_key(&query_id, &query_db, &candidate_id, &candidate_db);
        if self.options.self_check {
            if query_id == candidate_id && query_db == candidate_db {
                return None;
            }
            if pairs.contains(&key) {
                tracing::debug!(%key, "pair already reported, skipping symmetric duplicate");
                return None;
            }
        }

        let mut field_results: Vec<CheckFieldResult> =
            Vec::with_capacity(self.schema.fields().len());
        let mut matched_fields: u32 = 0;
        let mut max_score = false;
        let mut deny_dup = false;

        for field in self.schema.fields() {
            let result = self.check_field(similarity, query_text, field, params, &doc, &field_results);
            match result.condition {
                Condition::Similar => matched_fields += 1,
                Condition::MaxScore => max_score = true,
                Condition::DenyDup => deny_dup = true,
                Condition::NotSimilar | Condition::Ignore => {}
            }
            field_results.push(result);
        }

        if deny_dup {
            tracing::debug!(%key, "deny-dup field mismatch vetoes the pair");
            return None;
        }

        // First tier in declared order whose effective minimum is met; a
        // max-score mismatch raises every minimum to 1.0. Declared order is
        // part of the policy contract, so no sorting here.
        let tier = self.schema.tiers().iter().find(|tier| {
            let min = if max_score { 1.0 } else { tier.min_similarity };
            similarity >= min
        })?;
        if matched_fields < tier.min_fields {
            return None;
        }

        if self.options.self_check && !pairs.insert(&key) {
            return None;
        }

        Some(MatchResult {
            query_params: params.to_vec(),
            query_id,
            query_database: query_db,
            candidate_id,
            candidate_database: candidate_db,
            similarity,
            retrieval_score,
            field_results,
            doc,
        })
    }

    /// Per-field comparator dispatch.
    ///
    /// Every schema field produces a result; non-comparing kinds report a
    /// diagnostic similarity but always `Ignore`. A field whose declared
    /// dependency did not come out `Similar` is not compared at all.
    fn check_field(
        &self,
        indexed_similarity: f32,
        query_text: &str,
        field: &FieldSpec,
        params: &[String],
        doc: &Document,
        prior: &[CheckFieldResult],
    ) -> CheckFieldResult {
        let sep = &self.options.occurrence_separator;
        let raw = params[field.position as usize].as_str();

        if let Some(required) = &field.required_field {
            let satisfied = prior
                .iter()
                .find(|r| &r.field_name == required)
                .is_some_and(|r| r.condition == Condition::Similar);
            if !satisfied {
                return CheckFieldResult {
                    field_name: field.name.clone(),
                    query_value: normalize(raw, sep),
                    candidate_value: doc.first_value(&field.name).unwrap_or("").to_string(),
                    condition: Condition::Ignore,
                    similarity: 0.0,
                };
            }
        }

        match &field.kind {
            FieldKind::IndexedNGram => CheckFieldResult {
                field_name: field.name.clone(),
                query_value: query_text.to_string(),
                candidate_value: doc.first_value(&field.name).unwrap_or("").to_string(),
                condition: Condition::Ignore,
                similarity: indexed_similarity,
            },

            FieldKind::Exact => {
                let query_value = normalize(raw, sep);
                let candidate_value = doc.first_value(&field.name).unwrap_or("").to_string();
                let condition = compare_fields(field.policy, &query_value, &candidate_value);
                let similarity = if condition == Condition::Similar { 1.0 } else { 0.0 };
                CheckFieldResult {
                    field_name: field.name.clone(),
                    query_value,
                    candidate_value,
                    condition,
                    similarity,
                }
            }

            FieldKind::NGram { min_score } => {
                self.scored_field(field, raw, doc, *min_score, ngram_similarity)
            }

            FieldKind::Dice { min_score } => {
                self.scored_field(field, raw, doc, *min_score, dice_coefficient)
            }

            FieldKind::RegExp { pattern, group } => {
                let query_norm = normalize(raw, sep);
                let candidate_norm = doc.first_value(&field.name).unwrap_or("").to_string();

                let query_part = extract_group(pattern, *group, &query_norm);
                let candidate_part = extract_group(pattern, *group, &candidate_norm);

                let (query_value, candidate_value) = match (query_part, candidate_part) {
                    (Some(q), Some(c)) => (q, c),
                    // Extraction failed on either side: fall back to the
                    // full normalized strings.
                    _ => (query_norm, candidate_norm),
                };

                let condition = compare_fields(field.policy, &query_value, &candidate_value);
                let similarity = if condition == Condition::Similar { 1.0 } else { 0.0 };
                CheckFieldResult {
                    field_name: field.name.clone(),
                    query_value,
                    candidate_value,
                    condition,
                    similarity,
                }
            }

            FieldKind::Authors => {
                let candidate_original = doc.original(&field.name);
                let outcome = match_author_lists(
                    raw,
                    doc.values(&field.name),
                    candidate_original,
                    sep,
                );
                let condition = if outcome.matched {
                    Condition::Similar
                } else {
                    mismatch_condition(field.policy)
                };
                CheckFieldResult {
                    field_name: field.name.clone(),
                    query_value: raw.trim().to_string(),
                    candidate_value: candidate_original.trim().to_string(),
                    condition,
                    similarity: outcome.similarity,
                }
            }

            // Identifier columns and declared no-compare fields never touch
            // the decision; the similarity is purely diagnostic.
            FieldKind::Id | FieldKind::Database | FieldKind::NoCompare => {
                let query_value = normalize(raw, sep);
                let candidate_value = doc.first_value(&field.name).unwrap_or("").to_string();
                let similarity = edit_similarity(&query_value, &candidate_value);
                CheckFieldResult {
                    field_name: field.name.clone(),
                    query_value,
                    candidate_value,
                    condition: Condition::Ignore,
                    similarity,
                }
            }
        }
    }

    /// Shared rule for the two threshold comparators: best similarity over
    /// the candidate's stored occurrences, `Similar` only when the candidate
    /// side is non-empty and the score reaches the field's minimum.
    fn scored_field(
        &self,
        field: &FieldSpec,
        raw: &str,
        doc: &Document,
        min_score: f32,
        measure: fn(&str, &str) -> f32,
    ) -> CheckFieldResult {
        let sep = &self.options.occurrence_separator;
        let query_value = normalize(raw, sep);
        let values = doc.values(&field.name);

        let (candidate_value, similarity) = values
            .iter()
            .map(|value| (value.as_str(), measure(&query_value, value)))
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .unwrap_or(("", 0.0));

        let condition = if !candidate_value.is_empty() && similarity >= min_score {
            Condition::Similar
        } else {
            mismatch_condition(field.policy)
        };

        CheckFieldResult {
            field_name: field.name.clone(),
            query_value,
            candidate_value: candidate_value.to_string(),
            condition,
            similarity,
        }
    }
}

/// Generic equality rule shared by `Exact` and `RegExp` comparators.
///
/// Both sides are trimmed first. Equal non-empty values match; an empty
/// side means there is nothing to compare, never a mismatch; a real
/// disagreement maps through the field's policy.
pub fn compare_fields(policy: MatchPolicy, a: &str, b: &str) -> Condition {
    let a = a.trim();
    let b = b.trim();

    if a == b {
        if a.is_empty() {
            Condition::Ignore
        } else {
            Condition::Similar
        }
    } else if a.is_empty() || b.is_empty() {
        Condition::Ignore
    } else {
        mismatch_condition(policy)
    }
}

fn mismatch_condition(policy: MatchPolicy) -> Condition {
    match policy {
        MatchPolicy::DenyDup => Condition::DenyDup,
        MatchPolicy::MaxScore => Condition::MaxScore,
        MatchPolicy::Required => Condition::NotSimilar,
    }
}

fn extract_group(pattern: &regex::Regex, group: usize, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|captures| captures.get(group))
        .map(|m| m.as_str().to_string())
}
