//! Membership circuit for committed substrings.
//!
//! Proves that a private pattern is one of the substrings committed to under
//! a public Merkle root.
//!
//! Public input: the commitment root.
//! Witnesses: the padded pattern and a masked inclusion proof of `D_max` levels.
//!
//! Pattern slots are range-checked to `CHAR_BITS`, so an interior node digest
//! cannot be smuggled in as a pattern.

use ark_bn254::Fr;
use ark_ff::Zero;
use ark_r1cs_std::fields::fp::FpVar;
use ark_r1cs_std::prelude::*;
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystemRef, SynthesisError};

use crate::error::CircuitError;
use crate::leaf::leaf_hash_var;
use crate::merkle::{verify_membership, InclusionProof, InclusionProofVar};
use crate::range_check::enforce_range;
use crate::text::{pad_pattern, CHAR_BITS};

/// Shape of a membership circuit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MembershipParams {
    /// Padded pattern width `P`
    pub max_pattern_len: usize,
    /// Number of hash-chain levels `D_max`
    pub max_depth: usize,
}

impl MembershipParams {
    pub fn validate(&self) -> Result<(), CircuitError> {
        if self.max_pattern_len == 0 {
            return Err(CircuitError::InvalidParams(
                "max_pattern_len must be positive".to_string(),
            ));
        }
        if self.max_depth == 0 {
            return Err(CircuitError::InvalidParams(
                "max_depth must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Membership circuit for a substring commitment.
#[derive(Clone)]
pub struct MembershipCircuit {
    params: MembershipParams,
    /// Commitment root (public)
    pub root: Option<Fr>,
    /// Padded pattern (witness)
    pub pattern: Option<Vec<Fr>>,
    /// Inclusion proof for the pattern's leaf (witness)
    pub proof: Option<InclusionProof<Fr>>,
}

impl MembershipCircuit {
    /// Create an empty circuit for setup.
    /// Uses dummy values that produce valid constraint structure.
    pub fn empty(params: MembershipParams) -> Self {
        Self {
            params,
            root: Some(Fr::zero()),
            pattern: Some(vec![Fr::zero(); params.max_pattern_len]),
            proof: Some(InclusionProof::empty(params.max_depth)),
        }
    }

    /// Create a new circuit with witnesses.
    pub fn new(
        params: MembershipParams,
        root: Fr,
        pattern: &str,
        proof: InclusionProof<Fr>,
    ) -> Result<Self, CircuitError> {
        params.validate()?;
        if proof.max_depth() != params.max_depth {
            return Err(CircuitError::InvalidParams(format!(
                "proof has {} levels, circuit expects {}",
                proof.max_depth(),
                params.max_depth
            )));
        }

        Ok(Self {
            params,
            root: Some(root),
            pattern: Some(pad_pattern(pattern, params.max_pattern_len)?),
            proof: Some(proof),
        })
    }

    pub fn params(&self) -> &MembershipParams {
        &self.params
    }

    /// Public inputs in allocation order.
    pub fn public_inputs(&self) -> Option<Vec<Fr>> {
        self.root.map(|root| vec![root])
    }
}

impl ConstraintSynthesizer<Fr> for MembershipCircuit {
    fn generate_constraints(self, cs: ConstraintSystemRef<Fr>) -> Result<(), SynthesisError> {
        let params = self.params;

        // === Allocate public input ===
        let root_var = FpVar::new_input(cs.clone(), || {
            self.root.ok_or(SynthesisError::AssignmentMissing)
        })?;

        // === Allocate pattern witnesses ===
        let pattern_vars = (0..params.max_pattern_len)
            .map(|i| {
                FpVar::new_witness(cs.clone(), || {
                    self.pattern
                        .as_ref()
                        .and_then(|p| p.get(i).copied())
                        .ok_or(SynthesisError::AssignmentMissing)
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        // === Constraint: every pattern slot is a character code or padding ===
        for c in &pattern_vars {
            enforce_range(cs.clone(), c, CHAR_BITS)?;
        }

        // === Allocate inclusion proof ===
        let proof_var =
            InclusionProofVar::new_witness(cs.clone(), self.proof.as_ref(), params.max_depth)?;

        // === Constraint: leaf = H(padded pattern) is under the root ===
        let leaf = leaf_hash_var(cs.clone(), &pattern_vars)?;
        verify_membership(cs, &root_var, &leaf, &proof_var)?;

        Ok(())
    }
}
