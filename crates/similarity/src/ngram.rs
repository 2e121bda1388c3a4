use ahash::AHashSet;

/// Fixed character n-gram size shared with the retrieval index tokenizer.
pub const NGRAM_SIZE: usize = 3;

/// Similarity of two strings as the Dice overlap of their padded character
/// trigram sets.
///
/// Each string is padded with `NGRAM_SIZE - 1` spaces on both ends before
/// gram extraction, so prefixes and suffixes weigh the same as interior
/// grams. Equal strings score `1.0` without extraction; when either side
/// yields no grams the score is `0.0`.
pub fn ngram_similarity(a: &str, b: &str) -> f32 {
    if a == b {
        return 1.0;
    }

    let grams_a = gram_set(a);
    let grams_b = gram_set(b);
    if grams_a.is_empty() || grams_b.is_empty() {
        return 0.0;
    }

    let shared = grams_a.intersection(&grams_b).count();
    (2.0 * shared as f32) / (grams_a.len() + grams_b.len()) as f32
}

fn gram_set(s: &str) -> AHashSet<String> {
    let mut grams = AHashSet::new();
    if s.is_empty() {
        return grams;
    }

    let padding = NGRAM_SIZE - 1;
    let mut chars: Vec<char> = Vec::with_capacity(s.chars().count() + 2 * padding);
    chars.extend(std::iter::repeat(' ').take(padding));
    chars.extend(s.chars());
    chars.extend(std::iter::repeat(' ').take(padding));

    for window in chars.windows(NGRAM_SIZE) {
        grams.insert(window.iter().collect());
    }
    grams
}
