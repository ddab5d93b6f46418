//! Errors raised while encoding inputs or building commitments natively.

use thiserror::Error;

/// Errors from native (out-of-circuit) operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CircuitError {
    #[error("Invalid circuit parameters: {0}")]
    InvalidParams(String),
    #[error("Pattern is empty")]
    EmptyPattern,
    #[error("Pattern has {len} characters but the buffer holds {width}")]
    PatternTooLong { len: usize, width: usize },
    #[error("Pattern contains a NUL character, which is reserved for padding")]
    NulCharacter,
    #[error("Corpus has no qualifying substrings to commit to")]
    EmptyLeafSet,
    #[error("Tree height {height} exceeds the maximum proof depth {max_depth}")]
    TreeTooDeep { height: usize, max_depth: usize },
    #[error("Leaf index {index} out of range for {len} leaves")]
    LeafOutOfRange { index: usize, len: usize },
}
