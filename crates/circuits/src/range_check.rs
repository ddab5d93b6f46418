//! Range checks and exact modular reduction for field-encoded integers.
//!
//! R1CS has no native `%`. A reduction is witnessed instead: the prover
//! supplies `q` and `r`, the circuit enforces `q * m + r == value`, `r < m` and
//! `q < 2^k`. As long as `2^k * m + m` stays below the field modulus, the
//! integer pair is unique and `r` is the true remainder.

use ark_ff::{BigInteger, PrimeField};
use ark_r1cs_std::fields::fp::FpVar;
use ark_r1cs_std::prelude::*;
use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError};
use num_bigint::BigUint;

/// Number of bits needed to represent `x` (0 for 0).
pub fn bit_len(x: u128) -> usize {
    (u128::BITS - x.leading_zeros()) as usize
}

/// Enforce that a field element fits in `num_bits` bits.
///
/// Allocates `num_bits` boolean witnesses and constrains their little-endian
/// recomposition to equal `value`.
pub fn enforce_range<F: PrimeField>(
    cs: ConstraintSystemRef<F>,
    value: &FpVar<F>,
    num_bits: usize,
) -> Result<(), SynthesisError> {
    debug_assert!(num_bits < F::MODULUS_BIT_SIZE as usize);

    let bits = (0..num_bits)
        .map(|i| {
            Boolean::new_witness(cs.clone(), || {
                let v = value.value()?;
                Ok(v.into_bigint().get_bit(i))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut recomposed = FpVar::<F>::zero();
    let mut coeff = F::one();
    for bit in &bits {
        recomposed += FpVar::from(bit.clone()) * coeff;
        coeff.double_in_place();
    }

    recomposed.enforce_equal(value)
}

/// Enforce `value < bound` for a constant `bound >= 1`.
///
/// Both `value` and `bound - 1 - value` must fit in `bit_len(bound - 1)` bits,
/// which rules out wrap-around.
pub fn enforce_less_than<F: PrimeField>(
    cs: ConstraintSystemRef<F>,
    value: &FpVar<F>,
    bound: u64,
) -> Result<(), SynthesisError> {
    if bound == 0 {
        return Err(SynthesisError::Unsatisfiable);
    }
    let num_bits = bit_len(u128::from(bound - 1));
    let headroom = FpVar::constant(F::from(bound - 1)) - value;

    enforce_range(cs.clone(), value, num_bits)?;
    enforce_range(cs, &headroom, num_bits)
}

/// Reduce `value` modulo the constant `modulus`, returning the remainder.
///
/// `quotient_bits` bounds `value / modulus`; callers size it from the largest
/// value they can feed in.
pub fn reduce_mod<F: PrimeField>(
    cs: ConstraintSystemRef<F>,
    value: &FpVar<F>,
    modulus: u64,
    quotient_bits: usize,
) -> Result<FpVar<F>, SynthesisError> {
    if modulus == 0 {
        return Err(SynthesisError::Unsatisfiable);
    }

    let quotient = FpVar::new_witness(cs.clone(), || {
        let v: BigUint = value.value()?.into();
        Ok(F::from(v / modulus))
    })?;
    let remainder = FpVar::new_witness(cs.clone(), || {
        let v: BigUint = value.value()?.into();
        Ok(F::from(v % modulus))
    })?;

    let recomposed = &quotient * F::from(modulus) + &remainder;
    recomposed.enforce_equal(value)?;

    enforce_range(cs.clone(), &quotient, quotient_bits)?;
    enforce_less_than(cs, &remainder, modulus)?;

    Ok(remainder)
}
