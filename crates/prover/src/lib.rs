//! Proof generation library for substring presence audits.
//!
//! This crate provides utilities for:
//! - Trusted setup (generating, caching and loading proving/verifying keys)
//! - Proof generation for the membership and rolling-hash circuits
//! - Local proof verification
//! - Batch auditing of candidate patterns with processing statistics

pub mod batch;
pub mod config;
pub mod input;
pub mod prove;
pub mod setup;
pub mod stats;
pub mod verify;

pub use batch::{
    AuditError, AuditReport, MembershipAuditor, QueryOutcome, QueryResult, RollingHashAuditor,
};
pub use config::{Config, ConfigError};
pub use input::{load_corpus, load_patterns, InputError};
pub use prove::{check_satisfied, prove_membership, prove_rolling_hash, ProofWithInputs, ProveError};
pub use setup::{
    count_constraints, setup_membership, setup_rolling_hash, CircuitKeyPair, KeyProvider,
    SetupError,
};
pub use stats::{ProcessingStats, StatsSummary};
pub use verify::{verify_membership, verify_rolling_hash, VerifyError};

use ark_bn254::Fr;

/// Common field type for all operations
pub type ConstraintF = Fr;
