//! Poseidon configuration for BN254.
//!
//! Built once per process and shared by every native hash and every
//! in-circuit sponge, so leaf and node digests agree bit-for-bit across both.

use std::sync::OnceLock;

use ark_bn254::Fr;
use ark_crypto_primitives::sponge::poseidon::PoseidonConfig;
use ark_ff::MontFp;

/// Number of full rounds (beginning + end)
const FULL_ROUNDS: usize = 8;

/// Number of partial rounds
const PARTIAL_ROUNDS: usize = 57;

/// S-box exponent
const ALPHA: u64 = 5;

/// Sponge rate (field elements absorbed per permutation)
const RATE: usize = 2;

/// Sponge capacity
const CAPACITY: usize = 1;

/// Seed for the round constant generator ("POSEIDON" in ASCII)
const ARK_SEED: u64 = 0x504f534549444f4e;

static CONFIG: OnceLock<PoseidonConfig<Fr>> = OnceLock::new();

/// Shared Poseidon configuration for the BN254 scalar field.
///
/// Rate 2, capacity 1, 8 full rounds, 57 partial rounds, x^5 S-box.
pub fn poseidon_config() -> &'static PoseidonConfig<Fr> {
    CONFIG.get_or_init(build_config)
}

fn build_config() -> PoseidonConfig<Fr> {
    let mds = vec![
        vec![
            MontFp!("7511745149465107256748700652201246547602992235352608707588321460060273774987"),
            MontFp!("10370080108974718697676803824769673834027675643658433702224577712625900127200"),
            MontFp!("19705173408229649878903981084052839426532978878058043055305024233888854471533"),
        ],
        vec![
            MontFp!("18732019378264290557468133440468564866454307626475683536618613112504878618481"),
            MontFp!("20870176810702568768751421378473869562658540583882454726129544628203806653987"),
            MontFp!("7266061498423634438932006217945904744987532209093972706694887950396501989428"),
        ],
        vec![
            MontFp!("9131299761947733513298312097611845208338517739621853568979632113419485819303"),
            MontFp!("10595341252162738537912664445405114076324478519622938027420701542910180337937"),
            MontFp!("11597556804922396090267472882856054602429588299176362916247939723151043581408"),
        ],
    ];

    PoseidonConfig {
        full_rounds: FULL_ROUNDS,
        partial_rounds: PARTIAL_ROUNDS,
        alpha: ALPHA,
        ark: round_constants(),
        mds,
        rate: RATE,
        capacity: CAPACITY,
    }
}

/// Deterministic round constants: a quadratic recurrence seeded from `ARK_SEED`.
fn round_constants() -> Vec<Vec<Fr>> {
    let width = RATE + CAPACITY;
    let mut state = Fr::from(ARK_SEED);

    (0..FULL_ROUNDS + PARTIAL_ROUNDS)
        .map(|_| {
            (0..width)
                .map(|_| {
                    state = state * state + Fr::from(7u64);
                    state
                })
                .collect()
        })
        .collect()
}
