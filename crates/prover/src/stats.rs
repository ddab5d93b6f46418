//! Batch processing statistics.
//!
//! Counters are atomics so parallel workers can record outcomes through a
//! shared reference.

use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use serde::Serialize;

#[derive(Debug, Default)]
pub struct ProcessingStats {
    build_nanos: AtomicU64,
    compile_nanos: AtomicU64,
    setup_nanos: AtomicU64,
    proving_nanos: AtomicU64,
    verification_nanos: AtomicU64,
    successful: AtomicUsize,
    failed: AtomicUsize,
    not_found: AtomicUsize,
    witness_failures: AtomicUsize,
    proving_failures: AtomicUsize,
    skipped: AtomicUsize,
}

fn add(target: &AtomicU64, elapsed: Duration) {
    let nanos = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
    target.fetch_add(nanos, Ordering::Relaxed);
}

fn load(source: &AtomicU64) -> Duration {
    Duration::from_nanos(source.load(Ordering::Relaxed))
}

impl ProcessingStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commitment construction (enumeration, hashing, tree levels)
    pub fn record_build(&self, elapsed: Duration) {
        add(&self.build_nanos, elapsed);
    }

    /// Constraint synthesis of the empty circuit
    pub fn record_compile(&self, elapsed: Duration) {
        add(&self.compile_nanos, elapsed);
    }

    /// Key generation or key loading
    pub fn record_setup(&self, elapsed: Duration) {
        add(&self.setup_nanos, elapsed);
    }

    pub fn record_proving(&self, elapsed: Duration) {
        add(&self.proving_nanos, elapsed);
    }

    /// A proof was checked; `valid` is the verifier's verdict.
    pub fn record_verification(&self, elapsed: Duration, valid: bool) {
        add(&self.verification_nanos, elapsed);
        if valid {
            self.successful.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_not_found(&self) {
        self.not_found.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_witness_failure(&self) {
        self.witness_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_proving_failure(&self) {
        self.proving_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSummary {
        let successful = self.successful.load(Ordering::Relaxed);
        let failed = self.failed.load(Ordering::Relaxed);
        let verification = load(&self.verification_nanos);
        let verified = successful + failed;

        StatsSummary {
            build_time: load(&self.build_nanos),
            compile_time: load(&self.compile_nanos),
            setup_time: load(&self.setup_nanos),
            total_proving_time: load(&self.proving_nanos),
            average_verification_time: u32::try_from(verified)
                .ok()
                .filter(|n| *n > 0)
                .map(|n| verification / n),
            successful_proofs: successful,
            failed_proofs: failed,
            not_found: self.not_found.load(Ordering::Relaxed),
            witness_failures: self.witness_failures.load(Ordering::Relaxed),
            proving_failures: self.proving_failures.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`ProcessingStats`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StatsSummary {
    pub build_time: Duration,
    pub compile_time: Duration,
    pub setup_time: Duration,
    pub total_proving_time: Duration,
    /// `None` when no proof reached verification
    pub average_verification_time: Option<Duration>,
    pub successful_proofs: usize,
    pub failed_proofs: usize,
    pub not_found: usize,
    pub witness_failures: usize,
    pub proving_failures: usize,
    pub skipped: usize,
}

impl StatsSummary {
    /// Patterns that reached a terminal outcome (skipped ones excluded).
    pub fn processed(&self) -> usize {
        self.successful_proofs
            + self.failed_proofs
            + self.not_found
            + self.witness_failures
            + self.proving_failures
    }
}

impl fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Final Statistics:")?;
        writeln!(f, "  Commitment build time:    {:?}", self.build_time)?;
        writeln!(f, "  Circuit synthesis time:   {:?}", self.compile_time)?;
        writeln!(f, "  Setup time:               {:?}", self.setup_time)?;
        writeln!(f, "  Total proving time:       {:?}", self.total_proving_time)?;
        match self.average_verification_time {
            Some(avg) => writeln!(f, "  Average verification:     {:?}", avg)?,
            None => writeln!(f, "  Average verification:     n/a")?,
        }
        writeln!(f, "  Successful proofs:        {}", self.successful_proofs)?;
        writeln!(f, "  Failed proofs:            {}", self.failed_proofs)?;
        writeln!(f, "  Patterns not found:       {}", self.not_found)?;
        writeln!(f, "  Witness failures:         {}", self.witness_failures)?;
        writeln!(f, "  Proving failures:         {}", self.proving_failures)?;
        write!(f, "  Skipped (empty):          {}", self.skipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_verification_time() {
        let stats = ProcessingStats::new();
        stats.record_verification(Duration::from_millis(10), true);
        stats.record_verification(Duration::from_millis(30), false);

        let summary = stats.snapshot();
        assert_eq!(summary.successful_proofs, 1);
        assert_eq!(summary.failed_proofs, 1);
        assert_eq!(summary.average_verification_time, Some(Duration::from_millis(20)));
    }

    #[test]
    fn test_no_verifications_has_no_average() {
        let stats = ProcessingStats::new();
        stats.record_not_found();
        let summary = stats.snapshot();
        assert_eq!(summary.average_verification_time, None);
        assert_eq!(summary.processed(), 1);
        assert!(summary.to_string().contains("n/a"));
    }

    #[test]
    fn test_durations_accumulate() {
        let stats = ProcessingStats::new();
        stats.record_proving(Duration::from_millis(5));
        stats.record_proving(Duration::from_millis(7));
        stats.record_setup(Duration::from_secs(1));
        let summary = stats.snapshot();
        assert_eq!(summary.total_proving_time, Duration::from_millis(12));
        assert_eq!(summary.setup_time, Duration::from_secs(1));
    }
}
