//! In-circuit verification of masked inclusion proofs.
//!
//! The chain is always iterated `D_max` times. An inactive level computes the
//! candidate hash anyway and then passes the current value through, so one
//! fixed-size circuit verifies proofs for trees of any height up to `D_max`.

use ark_bn254::Fr;
use ark_r1cs_std::{boolean::Boolean, fields::fp::FpVar, prelude::*};
use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError};

use super::proof::InclusionProof;
use crate::poseidon::poseidon_hash_two_var;

/// Circuit variable representation of an inclusion proof.
#[derive(Clone)]
pub struct InclusionProofVar {
    siblings: Vec<FpVar<Fr>>,
    directions: Vec<Boolean<Fr>>,
    mask: Vec<Boolean<Fr>>,
}

impl InclusionProofVar {
    /// Allocate a proof of `max_depth` entries as witness variables.
    ///
    /// `proof` may be `None` during key generation; values are then reported
    /// as missing assignments.
    pub fn new_witness(
        cs: ConstraintSystemRef<Fr>,
        proof: Option<&InclusionProof<Fr>>,
        max_depth: usize,
    ) -> Result<Self, SynthesisError> {
        if let Some(p) = proof {
            if p.max_depth() != max_depth {
                return Err(SynthesisError::Unsatisfiable);
            }
        }

        let siblings = (0..max_depth)
            .map(|i| {
                FpVar::new_witness(cs.clone(), || {
                    proof
                        .map(|p| p.siblings()[i])
                        .ok_or(SynthesisError::AssignmentMissing)
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let directions = (0..max_depth)
            .map(|i| {
                Boolean::new_witness(cs.clone(), || {
                    proof
                        .map(|p| p.directions()[i])
                        .ok_or(SynthesisError::AssignmentMissing)
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mask = (0..max_depth)
            .map(|i| {
                Boolean::new_witness(cs.clone(), || {
                    proof
                        .map(|p| p.mask()[i])
                        .ok_or(SynthesisError::AssignmentMissing)
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            siblings,
            directions,
            mask,
        })
    }

    pub fn siblings(&self) -> &[FpVar<Fr>] {
        &self.siblings
    }

    pub fn directions(&self) -> &[Boolean<Fr>] {
        &self.directions
    }

    pub fn mask(&self) -> &[Boolean<Fr>] {
        &self.mask
    }

    pub fn max_depth(&self) -> usize {
        self.siblings.len()
    }
}

/// Hash two child nodes in-circuit.
pub fn hash_nodes_var(
    cs: ConstraintSystemRef<Fr>,
    left: &FpVar<Fr>,
    right: &FpVar<Fr>,
) -> Result<FpVar<Fr>, SynthesisError> {
    poseidon_hash_two_var(cs, left, right)
}

/// Enforce that active entries form a prefix: `mask[i+1]` implies `mask[i]`.
pub fn enforce_mask_prefix(mask: &[Boolean<Fr>]) -> Result<(), SynthesisError> {
    for pair in mask.windows(2) {
        let gap = pair[1].and(&pair[0].not())?;
        gap.enforce_equal(&Boolean::FALSE)?;
    }
    Ok(())
}

/// Replay the masked hash chain from `leaf_hash`.
///
/// Per level: `candidate = H(left, right)` ordered by the direction bit, then
/// `current = current + mask * (candidate - current)`.
pub fn compute_masked_root(
    cs: ConstraintSystemRef<Fr>,
    leaf_hash: &FpVar<Fr>,
    proof: &InclusionProofVar,
) -> Result<FpVar<Fr>, SynthesisError> {
    let mut current = leaf_hash.clone();

    for ((sibling, is_right), active) in proof
        .siblings
        .iter()
        .zip(proof.directions.iter())
        .zip(proof.mask.iter())
    {
        let left = is_right.select(sibling, &current)?;
        let right = is_right.select(&current, sibling)?;
        let candidate = hash_nodes_var(cs.clone(), &left, &right)?;

        current = active.select(&candidate, &current)?;
    }

    Ok(current)
}

/// Constrain: the masked chain from `leaf_hash` ends at `expected_root`.
pub fn verify_membership(
    cs: ConstraintSystemRef<Fr>,
    expected_root: &FpVar<Fr>,
    leaf_hash: &FpVar<Fr>,
    proof: &InclusionProofVar,
) -> Result<(), SynthesisError> {
    enforce_mask_prefix(&proof.mask)?;
    let computed_root = compute_masked_root(cs, leaf_hash, proof)?;
    computed_root.enforce_equal(expected_root)
}

#[cfg(test)]
mod gadget_tests {
    use super::*;
    use crate::merkle::MerkleTree;
    use ark_relations::r1cs::ConstraintSystem;

    fn tree() -> MerkleTree {
        MerkleTree::build((1..=5u64).map(Fr::from).collect()).unwrap()
    }

    fn check(leaf: Fr, root: Fr, proof: &InclusionProof<Fr>) -> bool {
        let cs = ConstraintSystem::<Fr>::new_ref();
        let root_var = FpVar::new_input(cs.clone(), || Ok(root)).unwrap();
        let leaf_var = FpVar::new_witness(cs.clone(), || Ok(leaf)).unwrap();
        let proof_var =
            InclusionProofVar::new_witness(cs.clone(), Some(proof), proof.max_depth()).unwrap();
        verify_membership(cs.clone(), &root_var, &leaf_var, &proof_var).unwrap();
        cs.is_satisfied().unwrap()
    }

    #[test]
    fn test_verify_membership_valid() {
        let tree = tree();
        for index in 0..tree.len() {
            let proof = tree.proof(index, 6).unwrap();
            assert!(check(tree.leaves()[index], tree.root(), &proof));
        }
    }

    #[test]
    fn test_verify_membership_wrong_leaf() {
        let tree = tree();
        let proof = tree.proof(2, 6).unwrap();
        assert!(!check(Fr::from(42u64), tree.root(), &proof));
    }

    #[test]
    fn test_mask_must_be_prefix() {
        let tree = tree();
        let (siblings, directions, mut mask) = tree.proof(0, 6).unwrap().into_parts();
        mask[1] = false;
        mask[4] = true;
        let proof = InclusionProof::new(siblings, directions, mask);
        assert!(!check(tree.leaves()[0], tree.root(), &proof));
    }

    #[test]
    fn test_depth_mismatch_rejected() {
        let tree = tree();
        let proof = tree.proof(0, 6).unwrap();
        let cs = ConstraintSystem::<Fr>::new_ref();
        assert!(matches!(
            InclusionProofVar::new_witness(cs, Some(&proof), 8),
            Err(SynthesisError::Unsatisfiable)
        ));
    }

    #[test]
    fn test_constraint_count_scales_with_max_depth() {
        let tree = tree();
        let mut counts = Vec::new();
        for max_depth in [4, 8] {
            let proof = tree.proof(0, max_depth).unwrap();
            let cs = ConstraintSystem::<Fr>::new_ref();
            let root_var = FpVar::new_input(cs.clone(), || Ok(tree.root())).unwrap();
            let leaf_var = FpVar::new_witness(cs.clone(), || Ok(tree.leaves()[0])).unwrap();
            let proof_var =
                InclusionProofVar::new_witness(cs.clone(), Some(&proof), max_depth).unwrap();
            verify_membership(cs.clone(), &root_var, &leaf_var, &proof_var).unwrap();
            assert!(cs.is_satisfied().unwrap());
            counts.push(cs.num_constraints());
        }
        println!("Masked chain constraints (depth 4, 8): {:?}", counts);
        assert!(counts[1] > counts[0]);
    }
}
