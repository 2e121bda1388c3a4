use thiserror::Error;

/// Fatal configuration errors raised while building a [`crate::Schema`].
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("schema declares no fields")]
    NoFields,

    #[error("duplicate field position {0}")]
    DuplicatePosition(u32),

    #[error("field position {position} out of range: schema declares {count} fields")]
    PositionOutOfRange { position: u32, count: usize },

    #[error("duplicate field name '{0}'")]
    DuplicateName(String),

    #[error("schema requires exactly one {kind} field, found {found}")]
    WrongCardinality { kind: &'static str, found: usize },

    #[error("schema allows at most one authors field, found {0}")]
    TooManyAuthors(usize),

    #[error("field '{field}': required field '{required}' is not declared")]
    UnknownRequiredField { field: String, required: String },

    #[error(
        "field '{field}': required field '{required}' must be declared at an earlier position"
    )]
    ForwardRequirement { field: String, required: String },

    #[error("field '{field}': min_score {value} outside [0, 1]")]
    InvalidMinScore { field: String, value: f32 },

    #[error("field '{field}': capture group must be >= 1")]
    InvalidCaptureGroup { field: String },

    #[error("field '{field}': invalid pattern: {source}")]
    InvalidPattern {
        field: String,
        #[source]
        source: regex::Error,
    },

    #[error("schema has no comparable field besides id, database and the indexed field")]
    NoComparableField,

    #[error("score tier table is empty")]
    EmptyTiers,

    #[error("duplicate score tier with min_similarity {0}")]
    DuplicateTier(f32),

    #[error("score tier min_similarity {0} outside [0, 1]")]
    InvalidTierSimilarity(f32),
}

/// Per-record input failures. One bad record never poisons the schema or the
/// engine; the caller chooses whether to skip it or abort the batch.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("record has {found} columns but the schema needs {needed}")]
    MissingColumns { found: usize, needed: usize },

    #[error("record field '{0}' is empty")]
    EmptyField(String),
}
