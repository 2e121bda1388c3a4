//! Record schema for the matching engine.
//!
//! A schema describes the columns of a piped-text record: one typed field
//! descriptor per column position, plus the score-tier table that turns
//! per-field outcomes into an accept/reject decision. The schema is built
//! once, validated completely at construction, and shared read-only by every
//! comparison in a run.
//!
//! ## Structural invariants
//!
//! [`Schema::new`] enforces all of these and never returns a partially
//! usable schema:
//!
//! - field positions are unique and cover `0..N` with no gaps
//! - exactly one [`FieldKind::Id`], one [`FieldKind::Database`] and one
//!   [`FieldKind::IndexedNGram`]; at most one [`FieldKind::Authors`]
//! - a `required_field` reference names a declared field at a strictly lower
//!   position, which rules out dependency cycles by construction
//! - at least one comparable field exists besides id, database and the
//!   indexed field
//! - similarity thresholds sit in `[0, 1]`, regexp capture groups are >= 1,
//!   and the tier table is non-empty and unique by minimum similarity
//!
//! Two error kinds keep construction failures apart from per-record input
//! failures: [`SchemaError`] is fatal when the schema is built,
//! [`RecordError`] is fatal for one record and leaves the caller to decide
//! whether to skip or abort.

mod error;
mod field;
mod model;
mod record;
mod tier;

pub use crate::error::{RecordError, SchemaError};
pub use crate::field::{FieldKind, FieldSpec, MatchPolicy};
pub use crate::model::Schema;
pub use crate::tier::ScoreTier;
