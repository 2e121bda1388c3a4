use serde::{Deserialize, Serialize};

/// One row of the acceptance policy: a pair that reaches `min_similarity` on
/// the indexed field must also have at least `min_fields` similar fields.
///
/// The table is kept in declared order and scanned first-match; callers must
/// not reorder it, because the governing tier for a given similarity depends
/// on declaration order when several tiers are satisfied at once.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreTier {
    pub min_similarity: f32,
    pub min_fields: u32,
}

impl ScoreTier {
    pub fn new(min_similarity: f32, min_fields: u32) -> Self {
        Self {
            min_similarity,
            min_fields,
        }
    }
}
