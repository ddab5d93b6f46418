//! ZK circuits for proving a private pattern occurs in a public corpus.
//!
//! This crate provides:
//! - `SubstringCommitment`: Merkle commitment to every qualifying substring
//! - `MembershipCircuit`: prove a private pattern is committed under a public root
//! - `RollingHashSubstringCircuit`: prove a private pattern occurs in a public
//!   corpus buffer via a rolling hash, with an exact-match guard

pub mod commitment;
pub mod enumerate;
pub mod error;
pub mod leaf;
pub mod membership;
pub mod merkle;
pub mod poseidon;
pub mod range_check;
pub mod rolling_hash;
pub mod text;

#[cfg(test)]
mod tests;

pub use commitment::SubstringCommitment;
pub use enumerate::{enumerate_substrings, is_allowed_char, is_qualifying};
pub use error::CircuitError;
pub use leaf::{hash_pattern, leaf_hash};
pub use membership::{MembershipCircuit, MembershipParams};
pub use merkle::{InclusionProof, MerkleTree};
pub use poseidon::poseidon_config;
pub use rolling_hash::{char_values, RollingHashParams, RollingHashSubstringCircuit, RollingHasher};
pub use text::{pad_pattern, Corpus};

use ark_bn254::Fr;

/// Common type aliases
pub type ConstraintF = Fr;
