use canonical::normalize;
use similarity::dice_coefficient;

/// Minimum Dice similarity for one query author name to claim a candidate
/// name.
const NAME_FLOOR: f32 = 0.4;

/// Minimum whole-text Dice similarity once every query author found a
/// partner.
const TEXT_FLOOR: f32 = 0.75;

/// Outcome of matching two author lists.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct AuthorsOutcome {
    pub matched: bool,
    /// Whole-text Dice similarity when it was computed, 0.0 otherwise.
    /// Reported either way.
    pub similarity: f32,
}

/// Greedy one-to-one matching of two author lists.
///
/// Each query name (normalized independently, empty names skipped) claims
/// the single best-scoring remaining candidate name, provided the score
/// reaches `NAME_FLOOR`; the claimed name leaves the pool so two query
/// authors can never consume the same candidate. One unmatched query author
/// fails the whole field. When every name found a partner, the full
/// untouched texts (trimmed only) must still agree at `TEXT_FLOOR` — the
/// per-name floor is loose enough that initials-vs-fullname pairings
/// need the global check to weed out coincidences.
///
/// An empty list on either side fails the field; an absent author column is
/// a real disagreement, not an ignorable gap.
pub(crate) fn match_author_lists(
    query_text: &str,
    candidate_names: &[String],
    candidate_text: &str,
    occurrence_separator: &str,
) -> AuthorsOutcome {
    let query_names: Vec<String> = query_text
        .split(occurrence_separator)
        .map(|name| normalize(name, occurrence_separator))
        .filter(|name| !name.is_empty())
        .collect();

    let mut pool: Vec<&String> = candidate_names.iter().filter(|n| !n.is_empty()).collect();

    if query_names.is_empty() || pool.is_empty() {
        return AuthorsOutcome {
            matched: false,
            similarity: 0.0,
        };
    }

    for query_name in &query_names {
        let best = pool
            .iter()
            .enumerate()
            .map(|(idx, candidate)| (idx, dice_coefficient(query_name, candidate.as_str())))
            .max_by(|a, b| a.1.total_cmp(&b.1));

        match best {
            Some((idx, score)) if score >= NAME_FLOOR => {
                pool.swap_remove(idx);
            }
            _ => {
                return AuthorsOutcome {
                    matched: false,
                    similarity: dice_coefficient(query_text.trim(), candidate_text.trim()),
                };
            }
        }
    }

    let text_similarity = dice_coefficient(query_text.trim(), candidate_text.trim());
    AuthorsOutcome {
        matched: text_similarity >= TEXT_FLOOR,
        similarity: text_similarity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEP: &str = "//";

    fn names(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|n| normalize(n, SEP)).collect()
    }

    #[test]
    fn identical_lists_match() {
        let candidate = "Silva, Marcos//Adams, Bryan";
        let outcome =
            match_author_lists(candidate, &names(&["Silva, Marcos", "Adams, Bryan"]), candidate, SEP);
        assert!(outcome.matched);
        assert_eq!(outcome.similarity, 1.0);
    }

    #[test]
    fn order_does_not_matter_for_name_pairing() {
        let outcome = match_author_lists(
            "Adams, Bryan//Silva, Marcos",
            &names(&["Silva, Marcos", "Adams, Bryan"]),
            "Silva, Marcos//Adams, Bryan",
            SEP,
        );
        assert!(outcome.matched);
    }

    #[test]
    fn one_unmatched_query_author_fails_the_field() {
        let outcome = match_author_lists(
            "Silva, Marcos//Zebrowski, Quentin",
            &names(&["Silva, Marcos", "Adams, Bryan"]),
            "Silva, Marcos//Adams, Bryan",
            SEP,
        );
        assert!(!outcome.matched);
    }

    #[test]
    fn candidate_names_are_consumed_one_to_one() {
        // Both query authors best-match the single candidate name; the
        // second must fail because the pool is exhausted.
        let outcome = match_author_lists(
            "Silva, Marcos//Silva, Marco",
            &names(&["Silva, Marcos"]),
            "Silva, Marcos",
            SEP,
        );
        assert!(!outcome.matched);
    }

    #[test]
    fn empty_query_side_fails() {
        let outcome = match_author_lists("", &names(&["Silva, Marcos"]), "Silva, Marcos", SEP);
        assert!(!outcome.matched);
        assert_eq!(outcome.similarity, 0.0);
    }

    #[test]
    fn empty_candidate_side_fails() {
        let outcome = match_author_lists("Silva, Marcos", &[], "", SEP);
        assert!(!outcome.matched);
    }

    #[test]
    fn whole_text_floor_rejects_a_strict_subset_author_list() {
        // Every query author pairs up cleanly, but the candidate list has
        // two extra authors; the whole-text comparison has to catch that.
        let outcome = match_author_lists(
            "Silva, Marcos",
            &names(&["Silva, Marcos", "Adams, Bryan", "Zebrowski, Quentin"]),
            "Silva, Marcos//Adams, Bryan//Zebrowski, Quentin",
            SEP,
        );
        assert!(!outcome.matched);
        assert!(outcome.similarity < TEXT_FLOOR);
    }

    #[test]
    fn blank_query_occurrences_are_skipped() {
        let outcome = match_author_lists(
            "Silva, Marcos////",
            &names(&["Silva, Marcos"]),
            "Silva, Marcos",
            SEP,
        );
        // The two empty occurrences vanish; the remaining name matches and
        // the whole-text comparison still clears the floor.
        assert!(outcome.similarity > 0.0);
    }
}
