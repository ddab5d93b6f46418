//! Poseidon R1CS gadgets for in-circuit hashing.

use ark_bn254::Fr;
use ark_crypto_primitives::sponge::constraints::CryptographicSpongeVar;
use ark_crypto_primitives::sponge::poseidon::constraints::PoseidonSpongeVar;
use ark_r1cs_std::fields::fp::FpVar;
use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError};

use super::config::poseidon_config;

/// In-circuit counterpart of [`super::PoseidonHasher`].
pub struct PoseidonHasherVar {
    sponge: PoseidonSpongeVar<Fr>,
}

impl PoseidonHasherVar {
    pub fn new(cs: ConstraintSystemRef<Fr>) -> Self {
        Self {
            sponge: PoseidonSpongeVar::new(cs, poseidon_config()),
        }
    }

    pub fn absorb(&mut self, input: &FpVar<Fr>) -> Result<(), SynthesisError> {
        self.sponge.absorb(input)
    }

    pub fn finalize(mut self) -> Result<FpVar<Fr>, SynthesisError> {
        let result = self.sponge.squeeze_field_elements(1)?;
        Ok(result[0].clone())
    }
}

/// Hash two field elements in-circuit.
pub fn poseidon_hash_two_var(
    cs: ConstraintSystemRef<Fr>,
    a: &FpVar<Fr>,
    b: &FpVar<Fr>,
) -> Result<FpVar<Fr>, SynthesisError> {
    let mut hasher = PoseidonHasherVar::new(cs);
    hasher.absorb(a)?;
    hasher.absorb(b)?;
    hasher.finalize()
}

/// Hash multiple field elements in-circuit.
pub fn poseidon_hash_many_var(
    cs: ConstraintSystemRef<Fr>,
    inputs: &[FpVar<Fr>],
) -> Result<FpVar<Fr>, SynthesisError> {
    let mut hasher = PoseidonHasherVar::new(cs);
    for input in inputs {
        hasher.absorb(input)?;
    }
    hasher.finalize()
}
