//! Batch auditing: prove and verify presence for a list of candidate patterns.
//!
//! Per-pattern failures become a [`QueryOutcome`] and are tallied in
//! [`ProcessingStats`]; only commitment and setup failures abort a run.

use std::collections::BTreeMap;
use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use substring_circuits::{
    CircuitError, Corpus, MembershipCircuit, MembershipParams, RollingHashParams,
    RollingHashSubstringCircuit, SubstringCommitment,
};

use crate::prove::{prove_membership, prove_rolling_hash, ProveError, ProofWithInputs};
use crate::setup::{count_constraints, CircuitKeyPair, KeyProvider, SetupError};
use crate::stats::{ProcessingStats, StatsSummary};
use crate::verify::{verify_membership, verify_rolling_hash};

/// Log batch progress every this many patterns.
const PROGRESS_INTERVAL: usize = 100;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error(transparent)]
    Circuit(#[from] CircuitError),
    #[error(transparent)]
    Setup(#[from] SetupError),
}

/// Result of one candidate pattern.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum QueryOutcome {
    /// Proof generated and accepted
    Verified,
    /// Proof generated but rejected by the verifier
    Rejected,
    /// Verifier returned an error
    VerificationFailed(String),
    /// Pattern is not in the committed set
    NotFound,
    /// Pattern could not be encoded as a witness
    WitnessFailed(String),
    /// Witness unsatisfiable or the backend failed to produce a proof
    ProvingFailed(String),
    /// Empty pattern, not processed
    Skipped,
}

#[derive(Clone, Debug, Serialize)]
pub struct QueryResult {
    pub pattern: String,
    pub outcome: QueryOutcome,
}

#[derive(Clone, Debug, Serialize)]
pub struct AuditReport {
    pub results: Vec<QueryResult>,
    pub summary: StatsSummary,
}

impl AuditReport {
    pub fn count(&self, outcome: &QueryOutcome) -> usize {
        self.results.iter().filter(|r| &r.outcome == outcome).count()
    }
}

/// Run `process` over every non-empty pattern, in order, optionally in parallel.
///
/// Patterns go through in chunks of [`PROGRESS_INTERVAL`]. Nothing is logged
/// from inside a rayon closure; outcomes and progress are logged between
/// chunks.
fn run_queries<F>(
    patterns: &[String],
    parallel: bool,
    stats: &ProcessingStats,
    process: F,
) -> Vec<QueryResult>
where
    F: Fn(&str) -> QueryOutcome + Sync,
{
    let total = patterns.len();
    let handle = |pattern: &String| {
        let outcome = if pattern.is_empty() {
            stats.record_skipped();
            QueryOutcome::Skipped
        } else {
            process(pattern)
        };
        QueryResult {
            pattern: pattern.clone(),
            outcome,
        }
    };

    let mut results = Vec::with_capacity(total);
    for chunk in patterns.chunks(PROGRESS_INTERVAL) {
        let chunk_results: Vec<QueryResult> = if parallel {
            chunk.par_iter().map(handle).collect()
        } else {
            chunk.iter().map(handle).collect()
        };
        chunk_results.iter().for_each(log_outcome);
        results.extend(chunk_results);
        info!(done = results.len(), total, "processed patterns");
    }
    results
}

fn log_outcome(result: &QueryResult) {
    let pattern = result.pattern.as_str();
    match &result.outcome {
        QueryOutcome::Verified => debug!(pattern, "proof verified"),
        QueryOutcome::Rejected => warn!(pattern, "proof rejected by verifier"),
        QueryOutcome::VerificationFailed(e) => warn!(pattern, error = %e, "verification failed"),
        QueryOutcome::NotFound => debug!(pattern, "pattern not found"),
        QueryOutcome::WitnessFailed(e) => warn!(pattern, error = %e, "failed to build witness"),
        QueryOutcome::ProvingFailed(e) => warn!(pattern, error = %e, "proof generation failed"),
        QueryOutcome::Skipped => debug!("empty pattern skipped"),
    }
}

/// Map a proving failure onto an outcome and record it.
fn proving_failure(stats: &ProcessingStats, err: ProveError) -> QueryOutcome {
    match err {
        ProveError::NotFound(_) => {
            stats.record_not_found();
            QueryOutcome::NotFound
        }
        ProveError::Witness(e) => {
            stats.record_witness_failure();
            QueryOutcome::WitnessFailed(e.to_string())
        }
        // An unsatisfiable witness is a proving failure; for the rolling-hash
        // circuit this is how an absent pattern surfaces
        e => {
            stats.record_proving_failure();
            QueryOutcome::ProvingFailed(e.to_string())
        }
    }
}

/// Time a verifier call and record its verdict.
fn verified<E: std::fmt::Display>(
    stats: &ProcessingStats,
    verify: impl FnOnce() -> Result<bool, E>,
) -> QueryOutcome {
    let start = Instant::now();
    let verdict = verify();
    let elapsed = start.elapsed();

    match verdict {
        Ok(true) => {
            stats.record_verification(elapsed, true);
            QueryOutcome::Verified
        }
        Ok(false) => {
            stats.record_verification(elapsed, false);
            QueryOutcome::Rejected
        }
        Err(e) => {
            stats.record_verification(elapsed, false);
            QueryOutcome::VerificationFailed(e.to_string())
        }
    }
}

/// Time a prover call.
fn timed_prove(
    stats: &ProcessingStats,
    prove: impl FnOnce() -> Result<ProofWithInputs, ProveError>,
) -> Result<ProofWithInputs, ProveError> {
    let start = Instant::now();
    let result = prove();
    stats.record_proving(start.elapsed());
    result
}

/// Audits patterns against a Merkle commitment of the corpus substrings.
pub struct MembershipAuditor {
    params: MembershipParams,
    commitment: SubstringCommitment,
    keys: CircuitKeyPair,
    parallel: bool,
    stats: ProcessingStats,
}

impl MembershipAuditor {
    /// Build the commitment and obtain keys for `params`.
    pub fn new(
        corpus: &Corpus,
        params: MembershipParams,
        provider: &KeyProvider,
    ) -> Result<Self, AuditError> {
        params.validate()?;
        let stats = ProcessingStats::new();

        let start = Instant::now();
        let commitment = SubstringCommitment::build(corpus, params.max_pattern_len)?;
        stats.record_build(start.elapsed());
        if commitment.height() > params.max_depth {
            return Err(CircuitError::TreeTooDeep {
                height: commitment.height(),
                max_depth: params.max_depth,
            }
            .into());
        }

        let start = Instant::now();
        let constraints = count_constraints(MembershipCircuit::empty(params))?;
        stats.record_compile(start.elapsed());
        info!(constraints, "membership circuit synthesized");

        let start = Instant::now();
        let keys = provider.membership(&params)?;
        stats.record_setup(start.elapsed());

        Ok(Self {
            params,
            commitment,
            keys,
            parallel: true,
            stats,
        })
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn commitment(&self) -> &SubstringCommitment {
        &self.commitment
    }

    pub fn keys(&self) -> &CircuitKeyPair {
        &self.keys
    }

    pub fn stats(&self) -> &ProcessingStats {
        &self.stats
    }

    /// Prove and verify every pattern.
    pub fn run(&self, patterns: &[String]) -> AuditReport {
        info!(
            patterns = patterns.len(),
            root = %self.commitment.root(),
            "membership audit started"
        );
        let results = run_queries(patterns, self.parallel, &self.stats, |p| self.process(p));
        AuditReport {
            results,
            summary: self.stats.snapshot(),
        }
    }

    fn process(&self, pattern: &str) -> QueryOutcome {
        let proof = timed_prove(&self.stats, || {
            prove_membership(&self.keys.proving_key, &self.params, &self.commitment, pattern)
        });

        match proof {
            Ok(proof) => verified(&self.stats, || {
                verify_membership(&self.keys.verifying_key, &proof.proof, self.commitment.root())
            }),
            Err(e) => proving_failure(&self.stats, e),
        }
    }
}

/// Audits patterns directly against the corpus buffer with the rolling-hash
/// circuit. Keys are set up once per effective length and cached.
pub struct RollingHashAuditor {
    template: RollingHashParams,
    corpus: Corpus,
    corpus_inputs: Vec<ark_bn254::Fr>,
    provider: KeyProvider,
    keys: BTreeMap<usize, CircuitKeyPair>,
    parallel: bool,
    stats: ProcessingStats,
}

impl RollingHashAuditor {
    /// `template.effective_len` is ignored; each pattern supplies its own.
    pub fn new(
        corpus: Corpus,
        template: RollingHashParams,
        provider: KeyProvider,
    ) -> Result<Self, AuditError> {
        template.with_effective_len(1).validate()?;
        if corpus.len() > template.corpus_width {
            warn!(
                corpus_len = corpus.len(),
                width = template.corpus_width,
                "corpus exceeds the circuit buffer and will be truncated"
            );
        }

        let stats = ProcessingStats::new();
        let start = Instant::now();
        let corpus_inputs = corpus.encode(template.corpus_width);
        stats.record_build(start.elapsed());

        Ok(Self {
            template,
            corpus,
            corpus_inputs,
            provider,
            keys: BTreeMap::new(),
            parallel: true,
            stats,
        })
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn stats(&self) -> &ProcessingStats {
        &self.stats
    }

    /// Effective lengths with cached keys.
    pub fn cached_lengths(&self) -> Vec<usize> {
        self.keys.keys().copied().collect()
    }

    fn params_for(&self, effective_len: usize) -> RollingHashParams {
        self.template.with_effective_len(effective_len)
    }

    /// Set up keys for every effective length in `patterns` not yet cached.
    fn prepare_keys(&mut self, patterns: &[String]) -> Result<(), AuditError> {
        let mut lengths: Vec<usize> = patterns
            .iter()
            .map(|p| p.chars().count())
            .filter(|&len| len > 0 && self.params_for(len).validate().is_ok())
            .collect();
        lengths.sort_unstable();
        lengths.dedup();

        for len in lengths {
            if self.keys.contains_key(&len) {
                continue;
            }
            let params = self.params_for(len);

            let start = Instant::now();
            let constraints = count_constraints(RollingHashSubstringCircuit::empty(params))?;
            self.stats.record_compile(start.elapsed());
            info!(effective_len = len, constraints, "rolling-hash circuit synthesized");

            let start = Instant::now();
            let keys = self.provider.rolling_hash(&params)?;
            self.stats.record_setup(start.elapsed());
            self.keys.insert(len, keys);
        }
        Ok(())
    }

    /// Prove and verify every pattern.
    pub fn run(&mut self, patterns: &[String]) -> Result<AuditReport, AuditError> {
        self.prepare_keys(patterns)?;
        info!(
            patterns = patterns.len(),
            key_sets = self.keys.len(),
            "rolling-hash audit started"
        );

        let this = &*self;
        let results = run_queries(patterns, this.parallel, &this.stats, |p| this.process(p));
        Ok(AuditReport {
            results,
            summary: this.stats.snapshot(),
        })
    }

    fn process(&self, pattern: &str) -> QueryOutcome {
        let len = pattern.chars().count();
        let params = self.params_for(len);

        let Some(keys) = self.keys.get(&len) else {
            let reason = params
                .validate()
                .err()
                .map(|e| e.to_string())
                .unwrap_or_else(|| format!("no keys for effective length {}", len));
            return proving_failure(
                &self.stats,
                ProveError::Witness(CircuitError::InvalidParams(reason)),
            );
        };

        let proof = timed_prove(&self.stats, || {
            prove_rolling_hash(&keys.proving_key, &params, &self.corpus, pattern)
        });

        match proof {
            Ok(proof) => verified(&self.stats, || {
                verify_rolling_hash(&keys.verifying_key, &proof.proof, &params, &self.corpus_inputs)
            }),
            Err(e) => proving_failure(&self.stats, e),
        }
    }
}
