//! Local proof verification for the substring circuits.

use ark_bn254::{Bn254, Fr};
use ark_groth16::{Groth16, Proof, VerifyingKey};
use ark_snark::SNARK;
use thiserror::Error;

use substring_circuits::RollingHashParams;

/// Errors during verification
#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("Verification failed: {0}")]
    Verification(String),
    #[error("Invalid public inputs: expected {expected}, got {actual}")]
    InvalidInputs { expected: usize, actual: usize },
}

/// Verify a membership proof (uses the commitment root as single input)
pub fn verify_membership(
    vk: &VerifyingKey<Bn254>,
    proof: &Proof<Bn254>,
    root: Fr,
) -> Result<bool, VerifyError> {
    let public_inputs = vec![root];

    Groth16::<Bn254>::verify(vk, &public_inputs, proof)
        .map_err(|e| VerifyError::Verification(e.to_string()))
}

/// Verify a rolling-hash proof against an encoded corpus buffer
pub fn verify_rolling_hash(
    vk: &VerifyingKey<Bn254>,
    proof: &Proof<Bn254>,
    params: &RollingHashParams,
    corpus_inputs: &[Fr],
) -> Result<bool, VerifyError> {
    if corpus_inputs.len() != params.corpus_width {
        return Err(VerifyError::InvalidInputs {
            expected: params.corpus_width,
            actual: corpus_inputs.len(),
        });
    }

    Groth16::<Bn254>::verify(vk, corpus_inputs, proof)
        .map_err(|e| VerifyError::Verification(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prove::{prove_membership, prove_rolling_hash};
    use crate::setup::{setup_membership, setup_rolling_hash, setup_rng};
    use substring_circuits::{Corpus, MembershipParams, SubstringCommitment};

    fn rolling_params() -> RollingHashParams {
        RollingHashParams {
            corpus_width: 12,
            pattern_width: 4,
            effective_len: 3,
            base: 256,
            modulus: 1_000_000_007,
            exact_match: true,
        }
    }

    #[test]
    fn test_verify_membership() {
        let params = MembershipParams {
            max_pattern_len: 6,
            max_depth: 8,
        };
        let keys = setup_membership(&mut setup_rng(Some(42)), &params).unwrap();
        let commitment =
            SubstringCommitment::build(&Corpus::new("www.example.net", 100), 6).unwrap();

        let result = prove_membership(&keys.proving_key, &params, &commitment, "ample").unwrap();

        let valid =
            verify_membership(&keys.verifying_key, &result.proof, commitment.root()).unwrap();
        assert!(valid);
    }

    #[test]
    fn test_verify_wrong_root_fails() {
        let params = MembershipParams {
            max_pattern_len: 6,
            max_depth: 8,
        };
        let keys = setup_membership(&mut setup_rng(Some(42)), &params).unwrap();
        let commitment =
            SubstringCommitment::build(&Corpus::new("www.example.net", 100), 6).unwrap();

        let result = prove_membership(&keys.proving_key, &params, &commitment, "ample").unwrap();

        // Try to verify with wrong root
        let wrong_root = Fr::from(99999u64);
        let valid = verify_membership(&keys.verifying_key, &result.proof, wrong_root).unwrap();

        assert!(!valid);
    }

    #[test]
    fn test_verify_rolling_hash() {
        let params = rolling_params();
        let keys = setup_rolling_hash(&mut setup_rng(Some(42)), &params).unwrap();
        let corpus = Corpus::new("xxabcxxabcxx", params.corpus_width);

        let result = prove_rolling_hash(&keys.proving_key, &params, &corpus, "abc").unwrap();

        let inputs = corpus.encode(params.corpus_width);
        assert!(verify_rolling_hash(&keys.verifying_key, &result.proof, &params, &inputs).unwrap());

        let other = Corpus::new("xxabcxxabcxy", params.corpus_width).encode(params.corpus_width);
        assert!(!verify_rolling_hash(&keys.verifying_key, &result.proof, &params, &other).unwrap());
    }

    #[test]
    fn test_verify_rolling_hash_input_count() {
        let params = rolling_params();
        let keys = setup_rolling_hash(&mut setup_rng(Some(42)), &params).unwrap();
        let corpus = Corpus::new("xxabcxxabcxx", params.corpus_width);
        let result = prove_rolling_hash(&keys.proving_key, &params, &corpus, "abc").unwrap();

        let short = &result.public_inputs[..5];
        assert!(matches!(
            verify_rolling_hash(&keys.verifying_key, &result.proof, &params, short),
            Err(VerifyError::InvalidInputs { expected: 12, actual: 5 })
        ));
    }
}
