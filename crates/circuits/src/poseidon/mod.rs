//! Poseidon hash over the BN254 scalar field.
//!
//! Native and R1CS versions share one configuration. Every digest is produced
//! by a fresh hasher value; nothing is reset and reused across chain steps.

mod config;
mod gadgets;
mod native;

pub use config::poseidon_config;
pub use gadgets::{poseidon_hash_many_var, poseidon_hash_two_var, PoseidonHasherVar};
pub use native::{poseidon_hash_many, poseidon_hash_two, PoseidonHasher};
