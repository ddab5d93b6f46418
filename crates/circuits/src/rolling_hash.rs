//! Rolling-hash substring circuit.
//!
//! Proves that a private pattern of effective length `L` occurs as a
//! contiguous window of a public corpus buffer of width `N`, with no
//! commitment structure. A Rabin–Karp hash is rolled across every offset and
//! each window additionally gets an exact character comparison, so a hash
//! collision never counts as a match.
//!
//! Every hash step is reduced exactly modulo `modulus` (see
//! [`crate::range_check::reduce_mod`]), identically for the pattern hash, the
//! first window, and every rolling update. `L` is part of the circuit shape:
//! all loop bounds are `N`, `P` and `L`, never data.

use ark_bn254::Fr;
use ark_ff::Zero;
use ark_r1cs_std::fields::fp::FpVar;
use ark_r1cs_std::prelude::*;
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystemRef, SynthesisError};

use crate::error::CircuitError;
use crate::range_check::{bit_len, reduce_mod};
use crate::text::{pad_pattern, Corpus, CHAR_BITS};

/// Exclusive upper bound on character values.
const CHAR_BOUND: u128 = 1 << CHAR_BITS;

/// Largest modulus accepted; keeps every intermediate far below the field size.
pub const MAX_MODULUS: u64 = 1 << 40;

/// Largest base accepted.
pub const MAX_BASE: u64 = 1 << 20;

/// Shape and hash parameters of a rolling-hash circuit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RollingHashParams {
    /// Width `N` of the public corpus buffer
    pub corpus_width: usize,
    /// Width `P` of the private pattern buffer
    pub pattern_width: usize,
    /// Effective pattern length `L` (1..=P)
    pub effective_len: usize,
    /// Hash base
    pub base: u64,
    /// Hash modulus
    pub modulus: u64,
    /// Confirm each hash match with an exact character comparison
    pub exact_match: bool,
}

impl RollingHashParams {
    pub fn validate(&self) -> Result<(), CircuitError> {
        let fail = |msg: String| Err(CircuitError::InvalidParams(msg));

        if self.corpus_width == 0 || self.pattern_width == 0 {
            return fail("buffer widths must be positive".to_string());
        }
        if self.effective_len == 0 || self.effective_len > self.pattern_width {
            return fail(format!(
                "effective length {} outside 1..={}",
                self.effective_len, self.pattern_width
            ));
        }
        if self.effective_len > self.corpus_width {
            return fail(format!(
                "effective length {} exceeds corpus width {}",
                self.effective_len, self.corpus_width
            ));
        }
        if self.base < 2 || self.base > MAX_BASE {
            return fail(format!("base {} outside 2..={}", self.base, MAX_BASE));
        }
        if self.modulus < 2 || self.modulus > MAX_MODULUS {
            return fail(format!("modulus {} outside 2..={}", self.modulus, MAX_MODULUS));
        }
        Ok(())
    }

    /// Same parameters with a different effective length.
    pub fn with_effective_len(self, effective_len: usize) -> Self {
        Self {
            effective_len,
            ..self
        }
    }

    /// `base^(L-1) mod modulus`.
    pub fn base_pow(&self) -> u64 {
        let modulus = u128::from(self.modulus);
        let mut pow = 1u128;
        for _ in 1..self.effective_len {
            pow = pow * u128::from(self.base) % modulus;
        }
        pow as u64
    }

    /// Offset added before the rolling subtraction: `CHAR_BOUND * modulus`.
    fn shift(&self) -> u128 {
        CHAR_BOUND * u128::from(self.modulus)
    }

    /// Bits needed for the quotient of any value fed to a reduction.
    ///
    /// The largest operand is the rolling update
    /// `(h + shift - c * base_pow) * base + c'` with `h, base_pow < modulus`
    /// and `c, c' < CHAR_BOUND`.
    fn quotient_bits(&self) -> usize {
        let modulus = u128::from(self.modulus);
        let max_value = (modulus + self.shift()) * u128::from(self.base) + CHAR_BOUND;
        bit_len(max_value / modulus)
    }

    /// Number of window offsets checked: `N - L + 1`.
    pub fn num_windows(&self) -> usize {
        self.corpus_width - self.effective_len + 1
    }
}

/// Native reference of the in-circuit hash, operating on character values.
#[derive(Clone, Copy, Debug)]
pub struct RollingHasher {
    params: RollingHashParams,
}

impl RollingHasher {
    pub fn new(params: RollingHashParams) -> Self {
        Self { params }
    }

    /// Horner hash of `chars` with a reduction after each step.
    pub fn hash(&self, chars: &[u64]) -> u64 {
        let base = u128::from(self.params.base);
        let modulus = u128::from(self.params.modulus);
        chars
            .iter()
            .fold(0u128, |h, &c| (h * base + u128::from(c)) % modulus) as u64
    }

    /// Hash of every length-`L` window of `corpus`, computed by rolling.
    pub fn window_hashes(&self, corpus: &[u64]) -> Vec<u64> {
        let len = self.params.effective_len;
        if corpus.len() < len {
            return Vec::new();
        }

        let base = u128::from(self.params.base);
        let modulus = u128::from(self.params.modulus);
        let base_pow = u128::from(self.params.base_pow());
        let shift = self.params.shift();

        let mut current = u128::from(self.hash(&corpus[..len]));
        let mut hashes = Vec::with_capacity(corpus.len() - len + 1);
        hashes.push(current as u64);
        for i in 0..corpus.len() - len {
            let outgoing = u128::from(corpus[i]) * base_pow;
            current = ((current + shift - outgoing) * base + u128::from(corpus[i + len])) % modulus;
            hashes.push(current as u64);
        }
        hashes
    }

    /// First offset where `pattern` matches, under the configured match rule.
    ///
    /// With `exact_match` disabled a hash collision counts as a match.
    pub fn find(&self, corpus: &[u64], pattern: &[u64]) -> Option<usize> {
        if pattern.len() != self.params.effective_len {
            return None;
        }
        let target = self.hash(pattern);
        self.window_hashes(corpus)
            .iter()
            .enumerate()
            .position(|(i, &h)| {
                h == target
                    && (!self.params.exact_match || corpus[i..i + pattern.len()] == *pattern)
            })
    }
}

/// Character values of a string, for the native hasher.
pub fn char_values(s: &str) -> Vec<u64> {
    s.chars().map(|c| c as u64).collect()
}

/// Rolling-hash substring circuit.
///
/// Public inputs: the `N` corpus characters (zero padded).
/// Witnesses: the `P` pattern characters (zero padded beyond `L`).
#[derive(Clone)]
pub struct RollingHashSubstringCircuit {
    params: RollingHashParams,
    /// Corpus buffer (public)
    pub corpus: Option<Vec<Fr>>,
    /// Pattern buffer (witness)
    pub pattern: Option<Vec<Fr>>,
}

impl RollingHashSubstringCircuit {
    /// Create a circuit with placeholder values, for setup and constraint counting.
    pub fn empty(params: RollingHashParams) -> Self {
        Self {
            params,
            corpus: Some(vec![Fr::zero(); params.corpus_width]),
            pattern: Some(vec![Fr::zero(); params.pattern_width]),
        }
    }

    /// Create a circuit with witnesses.
    ///
    /// The pattern's character count must equal the configured effective length.
    pub fn new(
        params: RollingHashParams,
        corpus: &Corpus,
        pattern: &str,
    ) -> Result<Self, CircuitError> {
        params.validate()?;

        let pattern_len = pattern.chars().count();
        if pattern_len != params.effective_len {
            return Err(CircuitError::InvalidParams(format!(
                "pattern has {} characters, circuit expects {}",
                pattern_len, params.effective_len
            )));
        }

        Ok(Self {
            params,
            corpus: Some(corpus.encode(params.corpus_width)),
            pattern: Some(pad_pattern(pattern, params.pattern_width)?),
        })
    }

    pub fn params(&self) -> &RollingHashParams {
        &self.params
    }

    /// Public inputs in allocation order.
    pub fn public_inputs(&self) -> Option<Vec<Fr>> {
        self.corpus.clone()
    }
}

/// In-circuit Horner hash with exact reduction after each step.
fn horner_hash_var(
    cs: ConstraintSystemRef<Fr>,
    chars: &[FpVar<Fr>],
    params: &RollingHashParams,
) -> Result<FpVar<Fr>, SynthesisError> {
    let base = Fr::from(params.base);
    let quotient_bits = params.quotient_bits();

    let mut hash = FpVar::<Fr>::zero();
    for c in chars {
        let step = hash * base + c;
        hash = reduce_mod(cs.clone(), &step, params.modulus, quotient_bits)?;
    }
    Ok(hash)
}

/// Conjunction of per-character equalities between two equal-length windows.
fn window_equals_var(
    window: &[FpVar<Fr>],
    pattern: &[FpVar<Fr>],
) -> Result<Boolean<Fr>, SynthesisError> {
    let eqs = window
        .iter()
        .zip(pattern.iter())
        .map(|(a, b)| a.is_eq(b))
        .collect::<Result<Vec<_>, _>>()?;
    Boolean::kary_and(&eqs)
}

impl ConstraintSynthesizer<Fr> for RollingHashSubstringCircuit {
    fn generate_constraints(self, cs: ConstraintSystemRef<Fr>) -> Result<(), SynthesisError> {
        let params = self.params;
        params
            .validate()
            .map_err(|_| SynthesisError::Unsatisfiable)?;

        let n = params.corpus_width;
        let len = params.effective_len;

        // === Allocate public corpus ===
        let corpus_vars = (0..n)
            .map(|i| {
                FpVar::new_input(cs.clone(), || {
                    self.corpus
                        .as_ref()
                        .and_then(|c| c.get(i).copied())
                        .ok_or(SynthesisError::AssignmentMissing)
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        // === Allocate private pattern ===
        let pattern_vars = (0..params.pattern_width)
            .map(|i| {
                FpVar::new_witness(cs.clone(), || {
                    self.pattern
                        .as_ref()
                        .and_then(|p| p.get(i).copied())
                        .ok_or(SynthesisError::AssignmentMissing)
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        // Positions past the effective length are padding
        for padding in &pattern_vars[len..] {
            padding.enforce_equal(&FpVar::zero())?;
        }

        let pattern = &pattern_vars[..len];
        let pattern_hash = horner_hash_var(cs.clone(), pattern, &params)?;
        let mut current = horner_hash_var(cs.clone(), &corpus_vars[..len], &params)?;

        let base = Fr::from(params.base);
        let base_pow = Fr::from(params.base_pow());
        let shift = Fr::from(params.shift());
        let quotient_bits = params.quotient_bits();

        let last = n - len;
        let mut found = Boolean::FALSE;
        for i in 0..=last {
            let hash_match = current.is_eq(&pattern_hash)?;
            let is_match = if params.exact_match {
                let exact = window_equals_var(&corpus_vars[i..i + len], pattern)?;
                hash_match.and(&exact)?
            } else {
                hash_match
            };
            found = found.or(&is_match)?;

            if i < last {
                let rolled = (&current + shift - &corpus_vars[i] * base_pow) * base
                    + &corpus_vars[i + len];
                current = reduce_mod(cs.clone(), &rolled, params.modulus, quotient_bits)?;
            }
        }

        found.enforce_equal(&Boolean::TRUE)?;

        Ok(())
    }
}
