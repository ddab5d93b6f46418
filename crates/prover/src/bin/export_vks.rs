//! Export verifying keys as hex.
//!
//! Loads keys from the configured cache directory, running setup for any that
//! are missing, and prints each verifying key as a hex string.
//!
//! Usage:
//!   export-vks [config.toml] [effective_len ...]
//!
//! The membership key is always exported; rolling-hash keys are exported for
//! each effective length given.

use std::path::Path;

use substring_prover::{CircuitKeyPair, Config, KeyProvider};

fn print_vk(label: &str, keys: &CircuitKeyPair) -> Result<String, Box<dyn std::error::Error>> {
    let vk = keys.serialize_vk()?;
    println!("{} VK ({} bytes):", label, vk.len());
    let encoded = format!("0x{}", hex::encode(&vk));
    println!("{}\n", encoded);
    Ok(encoded)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let config = match args.first().filter(|a| a.ends_with(".toml")) {
        Some(path) => Config::load_from_file(Path::new(path))?,
        None => Config::default(),
    };
    let lengths = args
        .iter()
        .filter(|a| !a.ends_with(".toml"))
        .map(|a| a.parse::<usize>())
        .collect::<Result<Vec<_>, _>>()?;

    let keys_dir = config.keys.cache_dir.clone();
    let provider = KeyProvider::new(config.setup.seed, Some(keys_dir.clone()));

    println!("Loading or generating circuit keys in {:?}...", keys_dir);
    println!("\n=== Verifying Keys ===\n");

    let mut exported = serde_json::Map::new();

    let membership_params = config.membership_params();
    let membership = provider.membership(&membership_params)?;
    let label = format!(
        "Membership (P={}, D={})",
        membership_params.max_pattern_len, membership_params.max_depth
    );
    exported.insert(
        "membership_vk".to_string(),
        print_vk(&label, &membership)?.into(),
    );

    for len in lengths {
        let params = config.rolling_hash_params(len);
        let keys = provider.rolling_hash(&params)?;
        let label = format!("RollingHash (N={}, L={})", params.corpus_width, len);
        exported.insert(format!("rolling_hash_l{}_vk", len), print_vk(&label, &keys)?.into());
    }

    // Also export as JSON for scripting
    let json_path = keys_dir.join("verifying_keys.json");
    std::fs::write(
        &json_path,
        serde_json::to_string_pretty(&serde_json::Value::Object(exported))?,
    )?;
    println!("JSON exported to {:?}", json_path);

    Ok(())
}
