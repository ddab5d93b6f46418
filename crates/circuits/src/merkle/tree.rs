//! Native Merkle tree construction.
//!
//! Level 0 holds the leaves in canonical order. Each parent is
//! `H(left, right)`; a level of odd length pairs its last node with zero.
//! The tree is complete by construction, so every leaf has the same path
//! length: `ceil(log2(leaf_count))`.

use ark_bn254::Fr;
use ark_ff::Zero;
use rayon::prelude::*;
use tracing::debug;

use super::proof::InclusionProof;
use crate::error::CircuitError;
use crate::poseidon::poseidon_hash_two;

/// Hash two child nodes: H(left, right).
pub fn hash_nodes(left: Fr, right: Fr) -> Fr {
    poseidon_hash_two(left, right)
}

/// Immutable Merkle tree, stored level by level.
#[derive(Clone, Debug)]
pub struct MerkleTree {
    /// levels[0] = leaves, levels[height] = [root]
    levels: Vec<Vec<Fr>>,
}

impl MerkleTree {
    /// Build the tree bottom-up from an ordered, non-empty leaf sequence.
    pub fn build(leaves: Vec<Fr>) -> Result<Self, CircuitError> {
        if leaves.is_empty() {
            return Err(CircuitError::EmptyLeafSet);
        }

        let mut levels = vec![leaves];
        loop {
            let current = &levels[levels.len() - 1];
            if current.len() == 1 {
                break;
            }

            let next: Vec<Fr> = current
                .par_chunks(2)
                .map(|pair| {
                    let right = pair.get(1).copied().unwrap_or_else(Fr::zero);
                    hash_nodes(pair[0], right)
                })
                .collect();

            debug!(level = levels.len(), nodes = next.len(), "built tree level");
            levels.push(next);
        }

        Ok(Self { levels })
    }

    /// The root hash.
    pub fn root(&self) -> Fr {
        self.levels[self.levels.len() - 1][0]
    }

    /// Number of hashing levels above the leaves.
    pub fn height(&self) -> usize {
        self.levels.len() - 1
    }

    pub fn levels(&self) -> &[Vec<Fr>] {
        &self.levels
    }

    pub fn leaves(&self) -> &[Fr] {
        &self.levels[0]
    }

    /// Number of leaves.
    pub fn len(&self) -> usize {
        self.levels[0].len()
    }

    /// Always false: an empty leaf set is rejected at build time.
    pub fn is_empty(&self) -> bool {
        self.levels[0].is_empty()
    }

    /// Inclusion proof for the leaf at `index`, padded to `max_depth` entries.
    ///
    /// The first `height()` entries are active. Remaining entries are the
    /// identity pair `(0, 0)` with their mask bit cleared.
    pub fn proof(
        &self,
        index: usize,
        max_depth: usize,
    ) -> Result<InclusionProof<Fr>, CircuitError> {
        if index >= self.len() {
            return Err(CircuitError::LeafOutOfRange {
                index,
                len: self.len(),
            });
        }
        let height = self.height();
        if height > max_depth {
            return Err(CircuitError::TreeTooDeep { height, max_depth });
        }

        let mut siblings = vec![Fr::zero(); max_depth];
        let mut directions = vec![false; max_depth];
        let mut mask = vec![false; max_depth];

        let mut current_index = index;
        for level in 0..height {
            let nodes = &self.levels[level];
            siblings[level] = nodes.get(current_index ^ 1).copied().unwrap_or_else(Fr::zero);
            directions[level] = current_index & 1 == 1;
            mask[level] = true;
            current_index >>= 1;
        }

        Ok(InclusionProof::new(siblings, directions, mask))
    }

    /// Check a proof for `leaf` against this tree's root.
    pub fn verify_proof(&self, leaf: Fr, proof: &InclusionProof<Fr>) -> bool {
        proof.compute_root(leaf) == self.root()
    }
}
