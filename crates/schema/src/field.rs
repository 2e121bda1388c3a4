use regex::Regex;
use serde::{Deserialize, Serialize};

/// What a mismatch on the field means for the whole pair.
///
/// `Required` is the plain case: a mismatch counts against the pair but the
/// tier table decides. `MaxScore` forces the indexed-field similarity
/// threshold to 1.0 when the field disagrees, and `DenyDup` vetoes the pair
/// outright.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    #[default]
    Required,
    MaxScore,
    DenyDup,
}

/// Comparison kind of a field. Closed set; the comparator dispatch matches
/// exhaustively so a new kind cannot be added without deciding its rule.
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// Record identifier. Exactly one per schema; never compared.
    Id,
    /// Source collection identifier. Exactly one per schema; never compared.
    Database,
    /// The field used to retrieve candidates from the text index. Its own
    /// comparator never rejects; it only carries the retrieval similarity.
    IndexedNGram,
    /// Multi-valued author list, compared by greedy one-to-one name matching.
    Authors,
    /// Normalized string equality.
    Exact,
    /// Character n-gram similarity against a minimum score.
    NGram { min_score: f32 },
    /// Dice-coefficient similarity against a minimum score.
    Dice { min_score: f32 },
    /// Equality on a captured sub-group of both sides, with a full-string
    /// fallback when extraction fails. The pattern is compiled before the
    /// schema is built; a malformed pattern never reaches per-record work.
    RegExp { pattern: Regex, group: usize },
    /// Stored and reported, never compared.
    NoCompare,
}

impl FieldKind {
    /// Kinds that can contribute a `Similar`/`NotSimilar` outcome.
    pub fn is_comparable(&self) -> bool {
        matches!(
            self,
            FieldKind::Authors
                | FieldKind::Exact
                | FieldKind::NGram { .. }
                | FieldKind::Dice { .. }
                | FieldKind::RegExp { .. }
        )
    }

}

/// One named, positioned column of a piped record.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub position: u32,
    pub policy: MatchPolicy,
    pub required_field: Option<String>,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, position: u32, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            position,
            policy: MatchPolicy::default(),
            required_field: None,
            kind,
        }
    }

    pub fn with_policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_required_field(mut self, required: impl Into<String>) -> Self {
        self.required_field = Some(required.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_serde_round_trip() {
        let json = serde_json::to_string(&MatchPolicy::DenyDup).expect("serialize");
        assert_eq!(json, "\"deny_dup\"");
        let back: MatchPolicy = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, MatchPolicy::DenyDup);
    }

    #[test]
    fn comparable_kinds() {
        assert!(FieldKind::Exact.is_comparable());
        assert!(FieldKind::NGram { min_score: 0.5 }.is_comparable());
        assert!(!FieldKind::Id.is_comparable());
        assert!(!FieldKind::IndexedNGram.is_comparable());
        assert!(!FieldKind::NoCompare.is_comparable());
    }

    #[test]
    fn builder_sets_policy_and_requirement() {
        let field = FieldSpec::new("year", 3, FieldKind::Exact)
            .with_policy(MatchPolicy::MaxScore)
            .with_required_field("title");
        assert_eq!(field.policy, MatchPolicy::MaxScore);
        assert_eq!(field.required_field.as_deref(), Some("title"));
    }
}
