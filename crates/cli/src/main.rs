//! Command-line auditor: prove and verify that candidate patterns occur in a
//! corpus, either through a Merkle commitment of its substrings or directly
//! with the rolling-hash circuit.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use substring_circuits::{Corpus, SubstringCommitment};
use substring_prover::{
    load_corpus, load_patterns, AuditReport, Config, KeyProvider, MembershipAuditor,
    RollingHashAuditor,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML configuration file; defaults apply when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Prove patterns against a Merkle commitment of the corpus substrings
    Membership(AuditArgs),
    /// Prove patterns directly against the corpus with the rolling-hash circuit
    Rolling(AuditArgs),
    /// Build the commitment and print its root
    Commit {
        /// JSON array of corpus fragments
        #[arg(long)]
        corpus: PathBuf,
    },
    /// Write the effective configuration as TOML
    InitConfig {
        /// Destination file
        #[arg(long, default_value = "substring-audit.toml")]
        output: PathBuf,
    },
}

#[derive(Args, Debug)]
struct AuditArgs {
    /// JSON array of corpus fragments, concatenated in order
    #[arg(long)]
    corpus: PathBuf,

    /// JSON array of candidate patterns
    #[arg(long)]
    patterns: PathBuf,

    /// Cache proving and verifying keys in this directory
    #[arg(long)]
    keys_dir: Option<PathBuf>,

    /// Deterministic setup seed (testing only)
    #[arg(long)]
    seed: Option<u64>,

    /// Process patterns one at a time
    #[arg(long)]
    sequential: bool,

    /// Write per-pattern results and statistics as JSON
    #[arg(long)]
    report: Option<PathBuf>,
}

impl AuditArgs {
    fn key_provider(&self, config: &Config) -> KeyProvider {
        let cache_dir = self.keys_dir.clone().or_else(|| config.key_cache_dir());
        KeyProvider::new(self.seed.or(config.setup.seed), cache_dir)
    }

    fn parallel(&self, config: &Config) -> bool {
        config.batch.parallel && !self.sequential
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(Config::default()),
    }
}

fn finish(report: &AuditReport, output: Option<&Path>, started: Instant) -> Result<()> {
    println!("\n{}", report.summary);
    println!("  Total time:               {:?}", started.elapsed());

    if let Some(path) = output {
        let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        info!(path = %path.display(), "report written");
    }
    Ok(())
}

fn run_membership(args: &AuditArgs, config: &Config) -> Result<()> {
    let started = Instant::now();
    let corpus = load_corpus(&args.corpus, config.corpus.max_len)?;
    let patterns = load_patterns(&args.patterns)?;

    let auditor = MembershipAuditor::new(
        &corpus,
        config.membership_params(),
        &args.key_provider(config),
    )
    .context("Failed to prepare membership audit")?
    .with_parallel(args.parallel(config));

    println!(
        "Commitment root: {} ({} substrings, height {})",
        auditor.commitment().root(),
        auditor.commitment().len(),
        auditor.commitment().height()
    );

    let report = auditor.run(&patterns);
    finish(&report, args.report.as_deref(), started)
}

fn run_rolling(args: &AuditArgs, config: &Config) -> Result<()> {
    let started = Instant::now();
    let corpus = load_corpus(&args.corpus, config.corpus.max_len)?;
    let patterns = load_patterns(&args.patterns)?;

    let template = config.rolling_hash_params(1);
    let mut auditor = RollingHashAuditor::new(corpus, template, args.key_provider(config))
        .context("Failed to prepare rolling-hash audit")?
        .with_parallel(args.parallel(config));

    let report = auditor
        .run(&patterns)
        .context("Rolling-hash circuit setup failed")?;
    finish(&report, args.report.as_deref(), started)
}

fn run_commit(corpus_path: &Path, config: &Config) -> Result<()> {
    let corpus: Corpus = load_corpus(corpus_path, config.corpus.max_len)?;
    let commitment = SubstringCommitment::build(&corpus, config.membership.max_pattern_len)
        .context("Failed to build commitment")?;

    println!("Root:       {}", commitment.root());
    println!("Substrings: {}", commitment.len());
    println!("Height:     {}", commitment.height());
    Ok(())
}

fn run_init_config(output: &Path, config: &Config) -> Result<()> {
    config
        .save_to_file(output)
        .with_context(|| format!("Failed to write config to {}", output.display()))?;
    println!("Configuration written to {}", output.display());
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match &cli.command {
        Command::Membership(args) => run_membership(args, &config),
        Command::Rolling(args) => run_rolling(args, &config),
        Command::Commit { corpus } => run_commit(corpus, &config),
        Command::InitConfig { output } => run_init_config(output, &config),
    }
}
