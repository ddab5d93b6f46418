//! End-to-end Groth16 tests for both substring circuits.

use ark_bn254::{Bn254, Fr};
use ark_groth16::Groth16;
use ark_snark::SNARK;
use rand::{rngs::StdRng, SeedableRng};

use crate::commitment::SubstringCommitment;
use crate::membership::{MembershipCircuit, MembershipParams};
use crate::rolling_hash::{RollingHashParams, RollingHashSubstringCircuit};
use crate::text::Corpus;

const MEMBERSHIP: MembershipParams = MembershipParams {
    max_pattern_len: 8,
    max_depth: 12,
};

fn rolling_params() -> RollingHashParams {
    RollingHashParams {
        corpus_width: 16,
        pattern_width: 4,
        effective_len: 3,
        base: 256,
        modulus: 1_000_000_007,
        exact_match: true,
    }
}

/// Test full Groth16 proof generation and verification for MembershipCircuit
#[test]
fn test_membership_full_proof() {
    let mut rng = StdRng::seed_from_u64(7);

    // Setup
    let empty_circuit = MembershipCircuit::empty(MEMBERSHIP);
    let (pk, vk) = Groth16::<Bn254>::circuit_specific_setup(empty_circuit, &mut rng).unwrap();

    let corpus = Corpus::new("login.corp-42.internal", 1_000);
    let commitment = SubstringCommitment::build(&corpus, MEMBERSHIP.max_pattern_len).unwrap();
    let proof = commitment
        .generate_proof("corp-42", MEMBERSHIP.max_depth)
        .unwrap()
        .unwrap();

    let circuit = MembershipCircuit::new(MEMBERSHIP, commitment.root(), "corp-42", proof).unwrap();
    let public_inputs = circuit.public_inputs().unwrap();

    // Generate proof
    let groth_proof = Groth16::<Bn254>::prove(&pk, circuit, &mut rng).unwrap();

    // Verify against the commitment root
    let valid = Groth16::<Bn254>::verify(&vk, &public_inputs, &groth_proof).unwrap();
    assert!(valid, "Membership proof verification failed");

    // Same proof must not verify against another root
    let other = SubstringCommitment::build(
        &Corpus::new("login.corp-43.internal", 1_000),
        MEMBERSHIP.max_pattern_len,
    )
    .unwrap();
    let invalid = Groth16::<Bn254>::verify(&vk, &[other.root()], &groth_proof).unwrap();
    assert!(!invalid, "Proof verified against a foreign root");
}

/// One membership key pair serves trees of different heights
#[test]
fn test_membership_keys_reused_across_tree_heights() {
    let mut rng = StdRng::seed_from_u64(11);
    let (pk, vk) =
        Groth16::<Bn254>::circuit_specific_setup(MembershipCircuit::empty(MEMBERSHIP), &mut rng)
            .unwrap();

    for text in ["a", "abc", "node-17.cluster.example"] {
        let commitment =
            SubstringCommitment::build(&Corpus::new(text, 1_000), MEMBERSHIP.max_pattern_len)
                .unwrap();
        let proof = commitment
            .generate_proof("a", MEMBERSHIP.max_depth)
            .unwrap()
            .unwrap();
        let circuit = MembershipCircuit::new(MEMBERSHIP, commitment.root(), "a", proof).unwrap();

        let groth_proof = Groth16::<Bn254>::prove(&pk, circuit, &mut rng).unwrap();
        let valid = Groth16::<Bn254>::verify(&vk, &[commitment.root()], &groth_proof).unwrap();
        assert!(valid, "height {} proof failed", commitment.height());
    }
}

/// Test full Groth16 proof generation and verification for RollingHashSubstringCircuit
#[test]
fn test_rolling_hash_full_proof() {
    let mut rng = StdRng::seed_from_u64(13);
    let params = rolling_params();

    // Setup
    let empty_circuit = RollingHashSubstringCircuit::empty(params);
    let (pk, vk) = Groth16::<Bn254>::circuit_specific_setup(empty_circuit, &mut rng).unwrap();

    let corpus = Corpus::new("xxabcxxabcxx", params.corpus_width);
    let circuit = RollingHashSubstringCircuit::new(params, &corpus, "abc").unwrap();
    let public_inputs = circuit.public_inputs().unwrap();
    assert_eq!(public_inputs.len(), params.corpus_width);

    // Generate proof
    let groth_proof = Groth16::<Bn254>::prove(&pk, circuit, &mut rng).unwrap();

    let valid = Groth16::<Bn254>::verify(&vk, &public_inputs, &groth_proof).unwrap();
    assert!(valid, "Rolling hash proof verification failed");

    // A different public corpus must not verify
    let other = Corpus::new("yyabcyyabcyy", params.corpus_width).encode(params.corpus_width);
    let invalid = Groth16::<Bn254>::verify(&vk, &other, &groth_proof).unwrap();
    assert!(!invalid, "Proof verified against a foreign corpus");
}

/// Public inputs must carry the full zero-padded buffer
#[test]
fn test_rolling_hash_public_input_padding() {
    let params = rolling_params();
    let corpus = Corpus::new("abc", params.corpus_width);
    let circuit = RollingHashSubstringCircuit::new(params, &corpus, "abc").unwrap();
    let inputs = circuit.public_inputs().unwrap();

    assert_eq!(inputs.len(), 16);
    assert_eq!(inputs[0], Fr::from('a' as u64));
    assert!(inputs[3..].iter().all(|x| *x == Fr::from(0u64)));
}

/// Text past the corpus width never reaches the public inputs
#[test]
fn test_rolling_hash_truncates_beyond_corpus_width() {
    let params = rolling_params();
    let head = "xxabcxxabcxxabcx";
    assert_eq!(head.len(), params.corpus_width);

    let a = Corpus::new(&format!("{}tail-one", head), 1_000);
    let b = Corpus::new(&format!("{}other", head), 1_000);
    let inputs_a = RollingHashSubstringCircuit::new(params, &a, "abc")
        .unwrap()
        .public_inputs()
        .unwrap();
    let inputs_b = RollingHashSubstringCircuit::new(params, &b, "abc")
        .unwrap()
        .public_inputs()
        .unwrap();

    assert_eq!(inputs_a, inputs_b);
    assert_eq!(inputs_a, Corpus::new(head, 1_000).encode(params.corpus_width));
}
