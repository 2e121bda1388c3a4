use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Canonicalize a raw field value into its comparison form.
///
/// The steps run in a fixed order: trim and lowercase, canonical occurrence
/// ordering for multi-valued columns, NFD with combining marks dropped, then
/// a single left-to-right rebuild that keeps `[a-z0-9]` and decides the fate
/// of everything else. A non-alphanumeric character survives (as itself,
/// already folded to a space) only when the previously kept character is a
/// digit and the next character is a digit too. Word boundaries between
/// alphabetic runs are dropped outright, so `"state of the art"` and
/// `"state-of-the-art"` collapse to the same string, while `"12.34"` keeps
/// one separating space between the two digit runs.
pub fn normalize(value: &str, occurrence_separator: &str) -> String {
    let lowered = value.trim().to_lowercase();

    let ordered = if !occurrence_separator.is_empty() && lowered.contains(occurrence_separator) {
        order_occ(&lowered, occurrence_separator)
    } else {
        lowered
    };

    // NFD splits precomposed characters so the base letter survives the
    // mark filter: 'ã' becomes 'a' + combining tilde, and the tilde goes.
    let folded: String = ordered.nfd().filter(|ch| !is_combining_mark(*ch)).collect();

    // One space per rejected character, not collapsed. The rebuild below
    // relies on a one-to-one mapping to look a single character ahead.
    let spaced: Vec<char> = folded
        .chars()
        .map(|ch| if is_kept(ch) { ch } else { ' ' })
        .collect();

    rebuild(&spaced)
}

/// Sort the occurrences of a multi-valued field so the canonical form does
/// not depend on input order. Values without the separator pass through.
pub fn order_occ(value: &str, occurrence_separator: &str) -> String {
    if occurrence_separator.is_empty() || !value.contains(occurrence_separator) {
        return value.to_string();
    }
    let mut occurrences: Vec<&str> = value.split(occurrence_separator).collect();
    occurrences.sort_unstable();
    occurrences.join(occurrence_separator)
}

fn is_kept(ch: char) -> bool {
    ch.is_ascii_lowercase() || ch.is_ascii_digit()
}

fn rebuild(spaced: &[char]) -> String {
    let mut out = String::with_capacity(spaced.len());
    let mut prev_kept: Option<char> = None;

    for (i, &ch) in spaced.iter().enumerate() {
        if is_kept(ch) {
            out.push(ch);
            prev_kept = Some(ch);
            continue;
        }
        // Lookahead stops at the string boundary: a trailing separator can
        // never qualify, so output never ends in a space.
        let prev_is_digit = prev_kept.is_some_and(|c| c.is_ascii_digit());
        let next_is_digit = spaced.get(i + 1).is_some_and(|c| c.is_ascii_digit());
        if prev_is_digit && next_is_digit {
            out.push(ch);
            prev_kept = Some(ch);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rebuild_skips_leading_and_trailing_separators() {
        assert_eq!(normalize(".1.", "//"), "1");
        assert_eq!(normalize("...abc...", "//"), "abc");
    }

    #[test]
    fn consecutive_separators_inside_digits_keep_a_single_space() {
        // "1--2" folds to "1  2"; only the second space sees a digit on
        // both sides once the first one is dropped.
        assert_eq!(normalize("1--2", "//"), "1 2");
        assert_eq!(normalize("1 - 2", "//"), "1 2");
    }

    #[test]
    fn digits_and_letters_concatenate_without_space() {
        assert_eq!(normalize("area 51", "//"), "area51");
        assert_eq!(normalize("51 area", "//"), "51area");
    }

    #[test]
    fn empty_separator_disables_occurrence_ordering() {
        assert_eq!(normalize("b a", ""), "ba");
        assert_eq!(order_occ("b a", ""), "b a");
    }
}
