//! Binary Merkle commitment over the sorted leaf set.
//!
//! This module provides:
//! - Batch tree construction (zero-padded odd tails)
//! - Fixed-depth inclusion proofs with an active/inactive mask
//! - In-circuit masked hash-chain verification

mod gadgets;
mod proof;
mod tree;


pub use gadgets::{
    compute_masked_root, enforce_mask_prefix, hash_nodes_var, verify_membership,
    InclusionProofVar,
};
pub use proof::InclusionProof;
pub use tree::{hash_nodes, MerkleTree};
