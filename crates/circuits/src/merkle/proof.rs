//! Fixed-depth inclusion proof with an active/inactive mask.

use ark_bn254::Fr;
use ark_ff::PrimeField;

use super::tree::hash_nodes;

/// A Merkle inclusion proof padded to the circuit's maximum depth.
///
/// Entry `i` is active when `mask[i]` is set. Active entries form a prefix
/// whose length equals the tree height; inactive entries are `(0, false)` and
/// are skipped when replaying the chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InclusionProof<F: PrimeField> {
    /// Sibling hashes from leaf level upwards
    siblings: Vec<F>,

    /// Direction at each level: true = current node is the right child
    directions: Vec<bool>,

    /// Active flag at each level
    mask: Vec<bool>,
}

impl<F: PrimeField> InclusionProof<F> {
    pub fn new(siblings: Vec<F>, directions: Vec<bool>, mask: Vec<bool>) -> Self {
        assert_eq!(
            siblings.len(),
            directions.len(),
            "siblings and directions must have same length"
        );
        assert_eq!(siblings.len(), mask.len(), "siblings and mask must have same length");
        Self {
            siblings,
            directions,
            mask,
        }
    }

    /// An all-inactive proof of the given depth (used for circuit setup).
    pub fn empty(max_depth: usize) -> Self {
        Self {
            siblings: vec![F::zero(); max_depth],
            directions: vec![false; max_depth],
            mask: vec![false; max_depth],
        }
    }

    pub fn siblings(&self) -> &[F] {
        &self.siblings
    }

    pub fn directions(&self) -> &[bool] {
        &self.directions
    }

    pub fn mask(&self) -> &[bool] {
        &self.mask
    }

    /// Fixed length of every vector (the circuit's `D_max`).
    pub fn max_depth(&self) -> usize {
        self.siblings.len()
    }

    /// Number of active entries (the tree height at build time).
    pub fn actual_height(&self) -> usize {
        self.mask.iter().take_while(|active| **active).count()
    }

    /// Split into `(siblings, directions, mask)`.
    pub fn into_parts(self) -> (Vec<F>, Vec<bool>, Vec<bool>) {
        (self.siblings, self.directions, self.mask)
    }
}

impl InclusionProof<Fr> {
    /// Replay the masked hash chain from `leaf`.
    pub fn compute_root(&self, leaf: Fr) -> Fr {
        let mut current = leaf;

        for ((sibling, &is_right), &active) in self
            .siblings
            .iter()
            .zip(self.directions.iter())
            .zip(self.mask.iter())
        {
            if !active {
                continue;
            }
            current = if is_right {
                hash_nodes(*sibling, current)
            } else {
                hash_nodes(current, *sibling)
            };
        }

        current
    }
}

#[cfg(test)]
mod proof_tests {
    use super::*;

    #[test]
    fn test_proof_structure() {
        let siblings = vec![Fr::from(1u64), Fr::from(2u64), Fr::from(0u64)];
        let directions = vec![false, true, false];
        let mask = vec![true, true, false];

        let proof = InclusionProof::new(siblings.clone(), directions.clone(), mask.clone());

        assert_eq!(proof.max_depth(), 3);
        assert_eq!(proof.actual_height(), 2);
        assert_eq!(proof.siblings(), &siblings);
        assert_eq!(proof.directions(), &directions);
        assert_eq!(proof.mask(), &mask);
    }

    #[test]
    fn test_inactive_entries_are_skipped() {
        let active = InclusionProof::new(vec![Fr::from(7u64)], vec![false], vec![true]);
        let padded = InclusionProof::new(
            vec![Fr::from(7u64), Fr::from(1234u64)],
            vec![false, true],
            vec![true, false],
        );

        let leaf = Fr::from(3u64);
        assert_eq!(active.compute_root(leaf), padded.compute_root(leaf));
    }

    #[test]
    fn test_empty_proof_returns_leaf() {
        let proof = InclusionProof::<Fr>::empty(4);
        assert_eq!(proof.actual_height(), 0);
        assert_eq!(proof.compute_root(Fr::from(9u64)), Fr::from(9u64));
    }

    #[test]
    #[should_panic(expected = "same length")]
    fn test_mismatched_lengths_panic() {
        let _ = InclusionProof::new(vec![Fr::from(1u64)], vec![], vec![true]);
    }
}
