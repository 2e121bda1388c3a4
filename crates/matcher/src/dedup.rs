use std::collections::HashSet;
use std::sync::Mutex;

/// Pairs already reported in this run, keyed symmetrically.
///
/// Owned by the caller and passed into every search so tests inject a fresh
/// set and concurrent batches decide how to share or partition it. Both
/// operations take `&self`; `insert` is the atomic check-then-insert that
/// keeps two threads from accepting the same symmetric pair twice.
#[derive(Debug, Default)]
pub struct CheckedPairs {
    seen: Mutex<HashSet<String>>,
}

impl CheckedPairs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the key has already been recorded.
    pub fn contains(&self, key: &str) -> bool {
        self.seen
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains(key)
    }

    /// Record the key. Returns false when it was already present.
    pub fn insert(&self, key: &str) -> bool {
        self.seen
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key.to_string())
    }

    pub fn len(&self) -> usize {
        self.seen
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Symmetric key for a (query, candidate) pair built from the normalized
/// `(id, database)` of both sides. The composite halves are ordered
/// lexicographically, so A-vs-B and B-vs-A produce the same key.
pub fn pair_key(id_a: &str, db_a: &str, id_b: &str, db_b: &str) -> String {
    let half_a = format!("{id_a}_{db_a}");
    let half_b = format!("{id_b}_{db_b}");
    if half_a <= half_b {
        format!("{half_a}_{half_b}")
    } else {
        format!("{half_b}_{half_a}")
    }
}
