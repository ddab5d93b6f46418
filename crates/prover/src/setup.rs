//! Trusted setup utilities for generating proving and verifying keys.
//!
//! Both relations are circuit-specific: membership keys depend on `(P, D_max)`
//! and rolling-hash keys on `(N, P, L, base, modulus, exact_match)`. Key files
//! are named after those parameters so a cache directory can hold many shapes.

use std::path::{Path, PathBuf};
use std::time::Instant;

use ark_bn254::{Bn254, Fr};
use ark_groth16::{Groth16, ProvingKey, VerifyingKey};
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystem};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_snark::SNARK;
use ark_std::rand::{rngs::StdRng, SeedableRng};
use thiserror::Error;
use tracing::{debug, info};

use substring_circuits::{
    MembershipCircuit, MembershipParams, RollingHashParams, RollingHashSubstringCircuit,
};

/// Errors that can occur during setup
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Invalid circuit parameters: {0}")]
    InvalidParams(#[from] substring_circuits::CircuitError),
    #[error("Circuit setup failed: {0}")]
    CircuitSetup(String),
    #[error("Serialization failed: {0}")]
    Serialization(String),
    #[error("Deserialization failed: {0}")]
    Deserialization(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Keys for a single circuit
#[derive(Clone)]
pub struct CircuitKeyPair {
    pub proving_key: ProvingKey<Bn254>,
    pub verifying_key: VerifyingKey<Bn254>,
}

impl CircuitKeyPair {
    /// Serialize proving key to bytes
    pub fn serialize_pk(&self) -> Result<Vec<u8>, SetupError> {
        let mut bytes = Vec::new();
        self.proving_key
            .serialize_compressed(&mut bytes)
            .map_err(|e| SetupError::Serialization(e.to_string()))?;
        Ok(bytes)
    }

    /// Serialize verifying key to bytes
    pub fn serialize_vk(&self) -> Result<Vec<u8>, SetupError> {
        let mut bytes = Vec::new();
        self.verifying_key
            .serialize_compressed(&mut bytes)
            .map_err(|e| SetupError::Serialization(e.to_string()))?;
        Ok(bytes)
    }

    /// Deserialize proving key from bytes
    pub fn deserialize_pk(bytes: &[u8]) -> Result<ProvingKey<Bn254>, SetupError> {
        ProvingKey::deserialize_compressed(bytes)
            .map_err(|e| SetupError::Deserialization(e.to_string()))
    }

    /// Deserialize verifying key from bytes
    pub fn deserialize_vk(bytes: &[u8]) -> Result<VerifyingKey<Bn254>, SetupError> {
        VerifyingKey::deserialize_compressed(bytes)
            .map_err(|e| SetupError::Deserialization(e.to_string()))
    }

    /// Write `<name>.pk` and `<name>.vk` into `dir`.
    pub fn save_to_directory(&self, dir: &Path, name: &str) -> Result<(), SetupError> {
        std::fs::create_dir_all(dir)?;
        std::fs::write(dir.join(format!("{}.pk", name)), self.serialize_pk()?)?;
        std::fs::write(dir.join(format!("{}.vk", name)), self.serialize_vk()?)?;
        Ok(())
    }

    /// Read `<name>.pk` and `<name>.vk` from `dir`.
    pub fn load_from_directory(dir: &Path, name: &str) -> Result<Self, SetupError> {
        Ok(Self {
            proving_key: Self::deserialize_pk(&std::fs::read(dir.join(format!("{}.pk", name)))?)?,
            verifying_key: Self::deserialize_vk(&std::fs::read(
                dir.join(format!("{}.vk", name)),
            )?)?,
        })
    }

    /// True if both key files for `name` exist in `dir`.
    pub fn exists_in_directory(dir: &Path, name: &str) -> bool {
        dir.join(format!("{}.pk", name)).exists() && dir.join(format!("{}.vk", name)).exists()
    }
}

/// File stem for membership keys.
pub fn membership_key_name(params: &MembershipParams) -> String {
    format!("membership_p{}_d{}", params.max_pattern_len, params.max_depth)
}

/// File stem for rolling-hash keys.
pub fn rolling_hash_key_name(params: &RollingHashParams) -> String {
    format!(
        "rolling_n{}_p{}_l{}_b{}_m{}{}",
        params.corpus_width,
        params.pattern_width,
        params.effective_len,
        params.base,
        params.modulus,
        if params.exact_match { "_exact" } else { "" }
    )
}

/// Setup randomness: seeded for reproducible keys, otherwise from entropy.
pub fn setup_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Number of R1CS constraints `circuit` synthesizes to.
pub fn count_constraints<C: ConstraintSynthesizer<Fr>>(circuit: C) -> Result<usize, SetupError> {
    let cs = ConstraintSystem::<Fr>::new_ref();
    circuit
        .generate_constraints(cs.clone())
        .map_err(|e| SetupError::CircuitSetup(e.to_string()))?;
    Ok(cs.num_constraints())
}

/// Setup MembershipCircuit
pub fn setup_membership(
    rng: &mut StdRng,
    params: &MembershipParams,
) -> Result<CircuitKeyPair, SetupError> {
    params.validate()?;
    let circuit = MembershipCircuit::empty(*params);
    let (pk, vk) = Groth16::<Bn254>::circuit_specific_setup(circuit, rng)
        .map_err(|e| SetupError::CircuitSetup(e.to_string()))?;

    Ok(CircuitKeyPair {
        proving_key: pk,
        verifying_key: vk,
    })
}

/// Setup RollingHashSubstringCircuit
pub fn setup_rolling_hash(
    rng: &mut StdRng,
    params: &RollingHashParams,
) -> Result<CircuitKeyPair, SetupError> {
    params.validate()?;
    let circuit = RollingHashSubstringCircuit::empty(*params);
    let (pk, vk) = Groth16::<Bn254>::circuit_specific_setup(circuit, rng)
        .map_err(|e| SetupError::CircuitSetup(e.to_string()))?;

    Ok(CircuitKeyPair {
        proving_key: pk,
        verifying_key: vk,
    })
}

/// Supplies key pairs, loading from and saving to a cache directory when one
/// is configured.
#[derive(Clone, Debug, Default)]
pub struct KeyProvider {
    seed: Option<u64>,
    cache_dir: Option<PathBuf>,
}

impl KeyProvider {
    pub fn new(seed: Option<u64>, cache_dir: Option<PathBuf>) -> Self {
        Self { seed, cache_dir }
    }

    /// Keys are generated on every request and never persisted.
    pub fn ephemeral(seed: Option<u64>) -> Self {
        Self {
            seed,
            cache_dir: None,
        }
    }

    pub fn cache_dir(&self) -> Option<&Path> {
        self.cache_dir.as_deref()
    }

    pub fn membership(&self, params: &MembershipParams) -> Result<CircuitKeyPair, SetupError> {
        let name = membership_key_name(params);
        self.load_or_setup(&name, |rng| setup_membership(rng, params))
    }

    pub fn rolling_hash(&self, params: &RollingHashParams) -> Result<CircuitKeyPair, SetupError> {
        let name = rolling_hash_key_name(params);
        self.load_or_setup(&name, |rng| setup_rolling_hash(rng, params))
    }

    fn load_or_setup<F>(&self, name: &str, setup: F) -> Result<CircuitKeyPair, SetupError>
    where
        F: FnOnce(&mut StdRng) -> Result<CircuitKeyPair, SetupError>,
    {
        if let Some(dir) = &self.cache_dir {
            if CircuitKeyPair::exists_in_directory(dir, name) {
                info!(keys = name, dir = %dir.display(), "loading cached keys");
                return CircuitKeyPair::load_from_directory(dir, name);
            }
        }

        info!(keys = name, "running circuit setup");
        let start = Instant::now();
        let mut rng = setup_rng(self.seed);
        let keys = setup(&mut rng)?;
        debug!(keys = name, elapsed = ?start.elapsed(), "setup complete");

        if let Some(dir) = &self.cache_dir {
            keys.save_to_directory(dir, name)?;
            info!(keys = name, dir = %dir.display(), "keys saved");
        }
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARAMS: MembershipParams = MembershipParams {
        max_pattern_len: 4,
        max_depth: 4,
    };

    #[test]
    fn test_setup_membership() {
        let mut rng = StdRng::seed_from_u64(42);
        let keys = setup_membership(&mut rng, &PARAMS).unwrap();

        // Verify keys can be serialized and deserialized
        let pk_bytes = keys.serialize_pk().unwrap();
        let vk_bytes = keys.serialize_vk().unwrap();

        let _pk = CircuitKeyPair::deserialize_pk(&pk_bytes).unwrap();
        let vk = CircuitKeyPair::deserialize_vk(&vk_bytes).unwrap();
        assert_eq!(vk, keys.verifying_key);
    }

    #[test]
    fn test_invalid_params_rejected() {
        let mut rng = StdRng::seed_from_u64(42);
        let params = MembershipParams {
            max_pattern_len: 0,
            max_depth: 4,
        };
        assert!(matches!(
            setup_membership(&mut rng, &params),
            Err(SetupError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_seeded_setup_is_reproducible() {
        let a = setup_membership(&mut setup_rng(Some(7)), &PARAMS).unwrap();
        let b = setup_membership(&mut setup_rng(Some(7)), &PARAMS).unwrap();
        assert_eq!(a.serialize_vk().unwrap(), b.serialize_vk().unwrap());
    }

    #[test]
    fn test_key_provider_persists_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let provider = KeyProvider::new(Some(1), Some(dir.path().to_path_buf()));

        let name = membership_key_name(&PARAMS);
        assert!(!CircuitKeyPair::exists_in_directory(dir.path(), &name));

        let first = provider.membership(&PARAMS).unwrap();
        assert!(CircuitKeyPair::exists_in_directory(dir.path(), &name));

        let reloaded = provider.membership(&PARAMS).unwrap();
        assert_eq!(first.verifying_key, reloaded.verifying_key);
    }

    #[test]
    fn test_key_names_encode_shape() {
        let params = RollingHashParams {
            corpus_width: 64,
            pattern_width: 8,
            effective_len: 3,
            base: 256,
            modulus: 1_000_000_007,
            exact_match: true,
        };
        assert_eq!(
            rolling_hash_key_name(&params),
            "rolling_n64_p8_l3_b256_m1000000007_exact"
        );
        assert_ne!(
            rolling_hash_key_name(&params),
            rolling_hash_key_name(&params.with_effective_len(4))
        );
        assert_eq!(membership_key_name(&PARAMS), "membership_p4_d4");
    }
}
