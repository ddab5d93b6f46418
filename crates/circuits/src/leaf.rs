//! Leaf hashing: the canonical digest of a fixed-width padded pattern.
//!
//! A fresh Poseidon sponge absorbs a leaf domain tag, the buffer width, then
//! every padded character in order. Interior nodes absorb exactly two child
//! digests with no tag, so a leaf digest cannot be replayed as a node. The
//! gadget performs the identical absorb sequence, so a pattern hashed
//! in-circuit lands on the same leaf as the tree builder.

use ark_bn254::Fr;
use ark_r1cs_std::fields::fp::FpVar;
use ark_r1cs_std::prelude::*;
use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError};

use crate::error::CircuitError;
use crate::poseidon::{poseidon_hash_many, poseidon_hash_many_var};
use crate::text::pad_pattern;

/// Domain tag absorbed ahead of every leaf ("leaf" in ASCII).
pub const LEAF_DOMAIN: u64 = 0x6c65_6166;

/// Digest of an already padded buffer.
pub fn leaf_hash(padded: &[Fr]) -> Fr {
    let mut input = Vec::with_capacity(padded.len() + 2);
    input.push(Fr::from(LEAF_DOMAIN));
    input.push(Fr::from(padded.len() as u64));
    input.extend_from_slice(padded);
    poseidon_hash_many(&input)
}

/// Pad `pattern` to `width` and hash it.
pub fn hash_pattern(pattern: &str, width: usize) -> Result<Fr, CircuitError> {
    Ok(leaf_hash(&pad_pattern(pattern, width)?))
}

/// In-circuit leaf digest over a padded buffer of variables.
pub fn leaf_hash_var(
    cs: ConstraintSystemRef<Fr>,
    padded: &[FpVar<Fr>],
) -> Result<FpVar<Fr>, SynthesisError> {
    let mut input = Vec::with_capacity(padded.len() + 2);
    input.push(FpVar::constant(Fr::from(LEAF_DOMAIN)));
    input.push(FpVar::constant(Fr::from(padded.len() as u64)));
    input.extend_from_slice(padded);
    poseidon_hash_many_var(cs, &input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merkle::hash_nodes;
    use ark_ff::Zero;
    use ark_relations::r1cs::ConstraintSystem;

    #[test]
    fn test_padding_width_is_part_of_the_digest() {
        let narrow = hash_pattern("abc", 4).unwrap();
        let wide = hash_pattern("abc", 5).unwrap();
        assert_ne!(narrow, wide);
    }

    #[test]
    fn test_distinct_patterns_distinct_leaves() {
        assert_ne!(
            hash_pattern("abc", 8).unwrap(),
            hash_pattern("abd", 8).unwrap()
        );
    }

    #[test]
    fn test_leaf_never_equals_node_over_same_elements() {
        let a = Fr::from('a' as u64);
        let b = Fr::from('b' as u64);
        assert_ne!(leaf_hash(&[a, b]), hash_nodes(a, b));
        assert_ne!(leaf_hash(&[a]), hash_nodes(a, Fr::zero()));
    }

    #[test]
    fn test_trailing_padding_is_bound_by_width() {
        let a = Fr::from('a' as u64);
        assert_ne!(leaf_hash(&[a]), leaf_hash(&[a, Fr::zero()]));
    }

    #[test]
    fn test_gadget_matches_native() {
        let padded = pad_pattern("host-1.example", 16).unwrap();
        let expected = leaf_hash(&padded);

        let cs = ConstraintSystem::<Fr>::new_ref();
        let vars: Vec<FpVar<Fr>> = padded
            .iter()
            .map(|c| FpVar::new_witness(cs.clone(), || Ok(*c)).unwrap())
            .collect();
        let digest = leaf_hash_var(cs.clone(), &vars).unwrap();
        let expected_var = FpVar::new_input(cs.clone(), || Ok(expected)).unwrap();
        digest.enforce_equal(&expected_var).unwrap();

        assert!(cs.is_satisfied().unwrap());
    }
}
