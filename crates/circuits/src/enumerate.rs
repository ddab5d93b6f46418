//! Enumeration of the qualifying substrings of a corpus.
//!
//! A substring qualifies when every character is an ASCII letter, an ASCII
//! digit, or one of `-`, `.`, `*` (host-name-like tokens). The result is
//! deduplicated and sorted, so leaf order and therefore the root are
//! reproducible.

use std::collections::HashSet;

use rayon::prelude::*;

use crate::text::Corpus;

/// Characters allowed inside a committed substring.
pub fn is_allowed_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '*')
}

/// True if every character of `s` is allowed.
pub fn is_qualifying(s: &str) -> bool {
    s.chars().all(is_allowed_char)
}

/// All unique qualifying substrings of length `1..=max_pattern_len`, sorted.
///
/// Work is partitioned by start offset. From each offset the longest
/// qualifying run (capped at `max_pattern_len`) is found once; every prefix of
/// that run qualifies and every longer window does not.
pub fn enumerate_substrings(corpus: &Corpus, max_pattern_len: usize) -> Vec<String> {
    let chars = corpus.chars();

    let unique = (0..chars.len())
        .into_par_iter()
        .fold(HashSet::new, |mut set, start| {
            let window = &chars[start..];
            let run = window
                .iter()
                .take(max_pattern_len)
                .take_while(|c| is_allowed_char(**c))
                .count();
            for len in 1..=run {
                set.insert(window[..len].iter().collect::<String>());
            }
            set
        })
        .reduce(HashSet::new, |mut a, mut b| {
            if a.len() < b.len() {
                std::mem::swap(&mut a, &mut b);
            }
            a.extend(b);
            a
        });

    let mut patterns: Vec<String> = unique.into_iter().collect();
    patterns.par_sort_unstable();
    patterns
}
