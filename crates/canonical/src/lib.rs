//! recdup canonical text layer.
//!
//! Field values arrive from piped-text records in whatever shape the source
//! database produced: mixed case, diacritics, punctuation, multi-valued
//! columns in arbitrary occurrence order. Every comparison in the matching
//! engine runs over the canonical form produced here, so two records that
//! mean the same thing compare equal (or near-equal) byte-wise.
//!
//! ## What we do
//!
//! - Trim and lowercase
//! - Canonical ordering of multi-valued occurrences ([`order_occ`])
//! - Unicode NFD with combining marks dropped, so `São` and `Sao` agree
//! - Collapse everything outside `[a-z0-9]`: word separators vanish entirely,
//!   but a single space survives between digit runs that punctuation split
//!   (a decimal point is signal, a word boundary is not)
//! - Bounded-size sampling of long values ([`limit_size`]) that keeps
//!   discriminating characters from the start, middle and end
//!
//! ## Pure function guarantee
//!
//! No I/O, no clock calls, no OS/locale dependence. Same input, same output,
//! on any machine. `normalize` is idempotent: feeding its output back in
//! returns it unchanged.

mod limit;
mod normalize;

pub use crate::limit::limit_size;
pub use crate::normalize::{normalize, order_occ};

#[cfg(test)]
mod tests {
    use super::*;

    const SEP: &str = "//";

    #[test]
    fn trims_and_lowercases() {
        assert_eq!(normalize("  Machine Learning  ", SEP), "machinelearning");
    }

    #[test]
    fn diacritics_are_stripped() {
        assert_eq!(normalize("São Paulo", SEP), normalize("sao paulo", SEP));
        assert_eq!(normalize("São Paulo", SEP), "saopaulo");
    }

    #[test]
    fn composed_and_decomposed_agree() {
        let composed = "Caf\u{00E9}";
        let decomposed = "Cafe\u{0301}";
        assert_eq!(normalize(composed, SEP), normalize(decomposed, SEP));
        assert_eq!(normalize(composed, SEP), "cafe");
    }

    #[test]
    fn word_separators_vanish_but_digit_runs_keep_one_space() {
        // The documented asymmetry: "abc" concatenates directly after the
        // digits, while the punctuation-split digit run keeps one space.
        assert_eq!(normalize("12.34 abc", SEP), "12 34abc");
    }

    #[test]
    fn adjacent_digit_runs_never_merge() {
        assert_eq!(normalize("1.2.3", SEP), "1 2 3");
        assert_eq!(normalize("10, 20", SEP), "10 20");
        assert_eq!(normalize("v1.2-rc3", SEP), "v1 2rc3");
    }

    #[test]
    fn separators_between_letters_are_dropped() {
        assert_eq!(normalize("state-of-the-art", SEP), "stateoftheart");
        assert_eq!(normalize("Rev. Saúde Pública", SEP), "revsaudepublica");
    }

    #[test]
    fn occurrences_are_sorted_before_folding() {
        let a = normalize("Smith, J//Adams, B", SEP);
        let b = normalize("Adams, B//Smith, J", SEP);
        assert_eq!(a, b);
    }

    #[test]
    fn order_occ_sorts_lexicographically() {
        assert_eq!(order_occ("c//a//b", SEP), "a//b//c");
        assert_eq!(order_occ("single", SEP), "single");
        assert_eq!(order_occ("", SEP), "");
    }

    #[test]
    fn normalize_is_idempotent() {
        for input in [
            "  Machine Learning  ",
            "São Paulo",
            "12.34 abc",
            "v1.2-rc3",
            "Smith, J//Adams, B",
            "",
        ] {
            let once = normalize(input, SEP);
            let twice = normalize(&once, SEP);
            assert_eq!(once, twice, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn empty_and_symbol_only_inputs_normalize_to_empty() {
        assert_eq!(normalize("", SEP), "");
        assert_eq!(normalize("  ---  ", SEP), "");
        assert_eq!(normalize("!?§", SEP), "");
    }

    #[test]
    fn limit_size_returns_short_values_unchanged() {
        assert_eq!(limit_size("abc", 3), "abc");
        assert_eq!(limit_size("abc", 10), "abc");
        assert_eq!(limit_size("", 0), "");
    }

    #[test]
    fn limit_size_samples_start_middle_and_end() {
        let value: String = ('a'..='z').collect();
        let limited = limit_size(&value, 9);
        assert_eq!(limited.chars().count(), 9);
        // 3 from the start, 3 centered on the midpoint, 3 from the end.
        assert_eq!(limited, "abcmnoxyz");
    }

    #[test]
    fn limit_size_distributes_remainder_to_middle_then_right() {
        let value: String = ('a'..='z').collect();
        // 10 = 3 + 4 + 3
        assert_eq!(limit_size(&value, 10).chars().count(), 10);
        // 11 = 3 + 4 + 4
        assert_eq!(limit_size(&value, 11).chars().count(), 11);
    }

    #[test]
    fn limit_size_is_char_based_not_byte_based() {
        let value = "áéíóú".repeat(10);
        let limited = limit_size(&value, 12);
        assert_eq!(limited.chars().count(), 12);
    }
}
