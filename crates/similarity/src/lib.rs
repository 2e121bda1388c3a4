//! String similarity primitives for the matching engine.
//!
//! Three measures with one shared contract: symmetric, deterministic, and a
//! score in `[0.0, 1.0]` where `1.0` means identical input.
//!
//! - [`ngram_similarity`] — overlap of padded character trigram sets; the
//!   measure used for the indexed field and `NGram` comparators.
//! - [`dice_coefficient`] — Sørensen–Dice over adjacent character bigrams;
//!   the measure used by `Dice` comparators and author-name matching.
//! - [`edit_similarity`] — normalized Levenshtein; diagnostic reporting only,
//!   never part of an accept/reject decision.
//!
//! Inputs are expected to be pre-normalized by the caller; nothing here
//! trims, folds case or touches Unicode.

mod ngram;

pub use crate::ngram::{ngram_similarity, NGRAM_SIZE};

/// Dice coefficient over adjacent character bigrams.
///
/// Delegates to `strsim`. Strings shorter than two characters only score
/// `1.0` when equal.
pub fn dice_coefficient(a: &str, b: &str) -> f32 {
    strsim::sorensen_dice(a, b) as f32
}

/// Normalized Levenshtein similarity, for diagnostics on fields that do not
/// participate in the match decision.
pub fn edit_similarity(a: &str, b: &str) -> f32 {
    strsim::normalized_levenshtein(a, b) as f32
}
