//! Native Poseidon hashing (outside circuits).

use ark_bn254::Fr;
use ark_crypto_primitives::sponge::poseidon::PoseidonSponge;
use ark_crypto_primitives::sponge::CryptographicSponge;

use super::config::poseidon_config;

/// A scoped Poseidon hasher: fresh sponge per digest, consumed by `finalize`.
pub struct PoseidonHasher {
    sponge: PoseidonSponge<Fr>,
}

impl PoseidonHasher {
    pub fn new() -> Self {
        Self {
            sponge: PoseidonSponge::new(poseidon_config()),
        }
    }

    /// Absorb one field element.
    pub fn absorb(&mut self, input: &Fr) {
        self.sponge.absorb(input);
    }

    /// Squeeze the digest.
    pub fn finalize(mut self) -> Fr {
        self.sponge.squeeze_field_elements::<Fr>(1)[0]
    }
}

impl Default for PoseidonHasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Hash two field elements (Merkle node compression).
pub fn poseidon_hash_two(a: Fr, b: Fr) -> Fr {
    let mut hasher = PoseidonHasher::new();
    hasher.absorb(&a);
    hasher.absorb(&b);
    hasher.finalize()
}

/// Hash multiple field elements in order.
pub fn poseidon_hash_many(inputs: &[Fr]) -> Fr {
    let mut hasher = PoseidonHasher::new();
    for input in inputs {
        hasher.absorb(input);
    }
    hasher.finalize()
}
