//! Circuit statistics utility - reports constraint counts and proof timing
//!
//! Usage:
//!   cargo run --release --bin circuit-stats                       # Default sizes
//!   cargo run --release --bin circuit-stats -- config.toml        # Configured sizes
//!   cargo run --release --bin circuit-stats -- config.toml --time # Include proof timing

use std::path::Path;
use std::time::Instant;

use ark_bn254::Fr;
use ark_relations::r1cs::ConstraintSynthesizer;

use substring_circuits::{
    Corpus, MembershipCircuit, RollingHashSubstringCircuit, SubstringCommitment,
};
use substring_prover::{
    count_constraints, prove_membership, prove_rolling_hash, setup_membership, setup_rolling_hash,
    Config,
};

/// Effective lengths sampled for the rolling-hash circuit.
const SAMPLE_LENGTHS: [usize; 3] = [1, 8, 32];

const RUNS: u32 = 3;

fn report<C: ConstraintSynthesizer<Fr>>(
    circuit: C,
    name: &str,
) -> Result<usize, Box<dyn std::error::Error>> {
    let count = count_constraints(circuit)?;
    // Empty circuits use dummy values; the count is still exact
    println!("{:32} {:>10} constraints", name, count);
    Ok(count)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let include_timing = args.iter().any(|a| a == "--time");
    let config = match args.iter().find(|a| a.ends_with(".toml")) {
        Some(path) => Config::load_from_file(Path::new(path))?,
        None => Config::default(),
    };

    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║              SUBSTRING AUDIT CIRCUIT STATS               ║");
    println!("╚══════════════════════════════════════════════════════════╝\n");

    let membership = config.membership_params();
    println!("Membership: P = {}, D_max = {}", membership.max_pattern_len, membership.max_depth);
    println!(
        "Rolling hash: N = {}, P = {}, base = {}, modulus = {}, exact match = {}\n",
        config.rolling_hash.corpus_width,
        config.rolling_hash.pattern_width,
        config.rolling_hash.base,
        config.rolling_hash.modulus,
        config.rolling_hash.exact_match
    );

    println!("─────────────────────────────────────────────────────────────");
    println!("CIRCUIT CONSTRAINTS:");
    println!("─────────────────────────────────────────────────────────────\n");

    report(MembershipCircuit::empty(membership), "Membership")?;

    let lengths: Vec<usize> = SAMPLE_LENGTHS
        .iter()
        .copied()
        .filter(|&len| config.rolling_hash_params(len).validate().is_ok())
        .collect();
    for &len in &lengths {
        let params = config.rolling_hash_params(len);
        report(
            RollingHashSubstringCircuit::empty(params),
            &format!("RollingHash (L = {})", len),
        )?;
    }

    if !include_timing {
        println!("\n(Run with --time to include proof generation timing)");
        return Ok(());
    }

    println!("\n─────────────────────────────────────────────────────────────");
    println!("PROOF TIMING ({} runs each):", RUNS);
    println!("─────────────────────────────────────────────────────────────\n");

    let mut rng = substring_prover::setup::setup_rng(config.setup.seed);

    // Membership over a small synthetic corpus
    let corpus = Corpus::new("edge-01.eu-west.example.net", config.corpus.max_len);
    let commitment = SubstringCommitment::build(&corpus, membership.max_pattern_len)?;
    let pattern = "example";
    let start = Instant::now();
    let keys = setup_membership(&mut rng, &membership)?;
    println!("{:32} setup {:?}", "Membership", start.elapsed());

    let start = Instant::now();
    for _ in 0..RUNS {
        prove_membership(&keys.proving_key, &membership, &commitment, pattern)?;
    }
    println!("{:32} prove {:?}", "Membership", start.elapsed() / RUNS);

    // Rolling hash over the same text, one shape
    let corpus = Corpus::new("edge-01.eu-west.example.net", config.rolling_hash.corpus_width);
    let params = config.rolling_hash_params(pattern.len());
    if params.validate().is_ok() {
        let start = Instant::now();
        let keys = setup_rolling_hash(&mut rng, &params)?;
        println!("{:32} setup {:?}", "RollingHash", start.elapsed());

        let start = Instant::now();
        for _ in 0..RUNS {
            prove_rolling_hash(&keys.proving_key, &params, &corpus, pattern)?;
        }
        println!("{:32} prove {:?}", "RollingHash", start.elapsed() / RUNS);
    }

    Ok(())
}
