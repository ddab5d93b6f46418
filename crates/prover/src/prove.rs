//! Proof generation for the substring circuits.
//!
//! Every relation is synthesized once against a plain constraint system before
//! Groth16 proving, so an unsatisfiable witness is reported as
//! [`ProveError::Unsatisfied`] instead of producing a proof that cannot verify.

use ark_bn254::{Bn254, Fr};
use ark_groth16::{Groth16, Proof, ProvingKey};
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystem};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_snark::SNARK;
use ark_std::rand::{rngs::StdRng, SeedableRng};
use thiserror::Error;
use tracing::debug;

use substring_circuits::{
    CircuitError, Corpus, MembershipCircuit, MembershipParams, RollingHashParams,
    RollingHashSubstringCircuit, SubstringCommitment,
};

/// Errors during proof generation
#[derive(Error, Debug)]
pub enum ProveError {
    #[error("Pattern '{0}' is not committed")]
    NotFound(String),
    #[error("Failed to build witness: {0}")]
    Witness(#[from] CircuitError),
    #[error("Witness does not satisfy the circuit")]
    Unsatisfied,
    #[error("Proof generation failed: {0}")]
    ProofGeneration(String),
    #[error("Serialization failed: {0}")]
    Serialization(String),
}

/// A proof with its public inputs
#[derive(Clone)]
pub struct ProofWithInputs {
    pub proof: Proof<Bn254>,
    pub public_inputs: Vec<Fr>,
}

impl ProofWithInputs {
    /// Serialize proof to bytes
    pub fn serialize_proof(&self) -> Result<Vec<u8>, ProveError> {
        let mut bytes = Vec::new();
        self.proof
            .serialize_compressed(&mut bytes)
            .map_err(|e| ProveError::Serialization(e.to_string()))?;
        Ok(bytes)
    }

    /// Serialize public inputs to bytes (each Fr is 32 bytes)
    pub fn serialize_public_inputs(&self) -> Result<Vec<u8>, ProveError> {
        let mut bytes = Vec::new();
        for input in &self.public_inputs {
            input
                .serialize_compressed(&mut bytes)
                .map_err(|e| ProveError::Serialization(e.to_string()))?;
        }
        Ok(bytes)
    }

    /// Deserialize proof from bytes
    pub fn deserialize_proof(bytes: &[u8]) -> Result<Proof<Bn254>, ProveError> {
        Proof::deserialize_compressed(bytes).map_err(|e| ProveError::Serialization(e.to_string()))
    }
}

/// Synthesize `circuit` with its witness and check every constraint holds.
pub fn check_satisfied<C>(circuit: C) -> Result<(), ProveError>
where
    C: ConstraintSynthesizer<Fr>,
{
    let cs = ConstraintSystem::<Fr>::new_ref();
    circuit
        .generate_constraints(cs.clone())
        .map_err(|e| ProveError::ProofGeneration(e.to_string()))?;

    let satisfied = cs
        .is_satisfied()
        .map_err(|e| ProveError::ProofGeneration(e.to_string()))?;
    if satisfied {
        Ok(())
    } else {
        if let Ok(Some(name)) = cs.which_is_unsatisfied() {
            debug!(constraint = %name, "first unsatisfied constraint");
        }
        Err(ProveError::Unsatisfied)
    }
}

fn prove_circuit<C>(pk: &ProvingKey<Bn254>, circuit: C) -> Result<Proof<Bn254>, ProveError>
where
    C: ConstraintSynthesizer<Fr> + Clone,
{
    check_satisfied(circuit.clone())?;

    let mut rng = StdRng::from_entropy();
    Groth16::<Bn254>::prove(pk, circuit, &mut rng)
        .map_err(|e| ProveError::ProofGeneration(e.to_string()))
}

/// Generate proof for MembershipCircuit
///
/// Public input: the commitment root.
pub fn prove_membership(
    pk: &ProvingKey<Bn254>,
    params: &MembershipParams,
    commitment: &SubstringCommitment,
    pattern: &str,
) -> Result<ProofWithInputs, ProveError> {
    let inclusion = commitment
        .generate_proof(pattern, params.max_depth)?
        .ok_or_else(|| ProveError::NotFound(pattern.to_string()))?;

    let root = commitment.root();
    let circuit = MembershipCircuit::new(*params, root, pattern, inclusion)?;
    let proof = prove_circuit(pk, circuit)?;

    Ok(ProofWithInputs {
        proof,
        public_inputs: vec![root],
    })
}

/// Generate proof for RollingHashSubstringCircuit
///
/// `params.effective_len` must equal the pattern's character count.
/// Public inputs: the zero-padded corpus buffer.
pub fn prove_rolling_hash(
    pk: &ProvingKey<Bn254>,
    params: &RollingHashParams,
    corpus: &Corpus,
    pattern: &str,
) -> Result<ProofWithInputs, ProveError> {
    let circuit = RollingHashSubstringCircuit::new(*params, corpus, pattern)?;
    let public_inputs = corpus.encode(params.corpus_width);
    let proof = prove_circuit(pk, circuit)?;

    Ok(ProofWithInputs {
        proof,
        public_inputs,
    })
}
