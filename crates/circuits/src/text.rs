//! Corpus and pattern encoding into field elements.
//!
//! Characters map to their Unicode scalar value. Zero is reserved as the
//! padding sentinel for fixed-width buffers.

use ark_bn254::Fr;
use ark_ff::Zero;

use crate::error::CircuitError;

/// Bit width that holds every Unicode scalar value (max 0x10FFFF).
pub const CHAR_BITS: usize = 21;

/// Field encoding of a single character.
pub fn char_to_field(c: char) -> Fr {
    Fr::from(c as u64)
}

/// The public text searched or committed over, truncated to a maximum length.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Corpus {
    chars: Vec<char>,
}

impl Corpus {
    /// Build a corpus from `text`, keeping at most `max_len` characters.
    pub fn new(text: &str, max_len: usize) -> Self {
        Self {
            chars: text.chars().take(max_len).collect(),
        }
    }

    /// Concatenate fragments in order, then truncate to `max_len` characters.
    pub fn from_fragments<S: AsRef<str>>(fragments: &[S], max_len: usize) -> Self {
        let chars = fragments
            .iter()
            .flat_map(|f| f.as_ref().chars())
            .take(max_len)
            .collect();
        Self { chars }
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Encode as a buffer of exactly `width` field elements, zero padded.
    ///
    /// Characters beyond `width` are dropped.
    pub fn encode(&self, width: usize) -> Vec<Fr> {
        let mut buffer = vec![Fr::zero(); width];
        for (slot, &c) in buffer.iter_mut().zip(self.chars.iter()) {
            *slot = char_to_field(c);
        }
        buffer
    }
}

impl std::fmt::Display for Corpus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.chars.iter().try_for_each(|c| write!(f, "{}", c))
    }
}

/// Encode a pattern as a `width`-wide buffer right-padded with zero.
///
/// Rejects empty patterns, patterns longer than `width`, and patterns that
/// contain NUL (it would be indistinguishable from padding).
pub fn pad_pattern(pattern: &str, width: usize) -> Result<Vec<Fr>, CircuitError> {
    let chars: Vec<char> = pattern.chars().collect();
    if chars.is_empty() {
        return Err(CircuitError::EmptyPattern);
    }
    if chars.len() > width {
        return Err(CircuitError::PatternTooLong {
            len: chars.len(),
            width,
        });
    }
    if chars.contains(&'\0') {
        return Err(CircuitError::NulCharacter);
    }

    let mut buffer = vec![Fr::zero(); width];
    for (slot, &c) in buffer.iter_mut().zip(chars.iter()) {
        *slot = char_to_field(c);
    }
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncation_keeps_prefix() {
        let corpus = Corpus::new("abcdef", 4);
        assert_eq!(corpus.to_string(), "abcd");
        assert_eq!(corpus.len(), 4);
    }

    #[test]
    fn test_truncation_counts_characters_not_bytes() {
        let corpus = Corpus::new("héllo", 2);
        assert_eq!(corpus.chars(), &['h', 'é']);
    }

    #[test]
    fn test_fragments_concatenate_before_truncation() {
        let corpus = Corpus::from_fragments(&["ab", "cd", "ef"], 5);
        assert_eq!(corpus.to_string(), "abcde");
    }

    #[test]
    fn test_encode_pads_with_zero() {
        let corpus = Corpus::new("ab", 10);
        let encoded = corpus.encode(4);
        assert_eq!(
            encoded,
            vec![Fr::from(97u64), Fr::from(98u64), Fr::zero(), Fr::zero()]
        );
    }

    #[test]
    fn test_pad_pattern() {
        let padded = pad_pattern("abc", 5).unwrap();
        assert_eq!(padded.len(), 5);
        assert_eq!(padded[2], Fr::from(99u64));
        assert_eq!(padded[3], Fr::zero());
    }

    #[test]
    fn test_pad_pattern_rejects_bad_input() {
        assert_eq!(pad_pattern("", 4), Err(CircuitError::EmptyPattern));
        assert_eq!(
            pad_pattern("abcde", 4),
            Err(CircuitError::PatternTooLong { len: 5, width: 4 })
        );
        assert_eq!(pad_pattern("a\0b", 4), Err(CircuitError::NulCharacter));
    }
}
