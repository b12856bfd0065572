//! Decimal square root.
//!
//! Newton's method over [`DecimalValue`], producing results rounded to 16
//! significant digits half-even (the decimal64 contract). The input is
//! first rescaled by an even power of ten so that a single double-precision
//! seed plus one Newton step at 18 digits lands within the final rounding.

use num_bigint::BigInt;
use num_traits::One;
use tracing::warn;

use crate::error::CalcError;
use crate::value::{DecimalValue, Rounding};

/// Significant digits kept in results.
pub(crate) const RESULT_PRECISION: i64 = 16;

/// Minimum precision of the Newton step; two guard digits past the result.
const STEP_PRECISION: i64 = 18;

/// Square root of a non-negative decimal.
///
/// The result carries the input's preferred scale (`input.scale() / 2`)
/// when that can be done without inventing digits: `sqrt(100)` is exactly
/// `10` at scale 0 and `sqrt(0.09)` is `0.3` at scale 1.
pub fn sqrt(number: &DecimalValue) -> Result<DecimalValue, CalcError> {
    if number.is_negative() {
        warn!("square root of a negative number");
        return Err(CalcError::InvalidInput);
    }
    if number.is_zero() {
        return Ok(DecimalValue::zero());
    }

    let preferred_scale = number.scale() / 2;
    let stripped = number.normalized();

    // Powers of ten with an even exponent have an exact one-digit root.
    if stripped.unscaled().is_one() && stripped.scale() % 2 == 0 {
        let root = DecimalValue::from_parts(BigInt::one(), stripped.scale() / 2);
        if root.scale() != preferred_scale {
            return Ok(apply_preferred_scale(root, preferred_scale));
        }
        return Ok(root);
    }

    // Shift by an even power of ten so the seed exponent halves exactly.
    let exponent_offset = {
        let scale = stripped.scale() - stripped.precision() + 1;
        if scale % 2 == 0 { scale } else { scale - 1 }
    };
    let working = stripped.mul_pow10(exponent_offset);

    let guess = DecimalValue::from_f64_exact(working.to_f64().sqrt());
    let precision = STEP_PRECISION.max(working.precision());
    let quotient = working.div_to_precision(&guess, precision, Rounding::HalfEven);
    let sum = guess.add(&quotient);
    let half = DecimalValue::from_parts(BigInt::from(5), 1);
    let approx = half.mul(&sum).round_to_precision(precision, Rounding::HalfEven);

    let result = approx
        .mul_pow10(-exponent_offset / 2)
        .round_to_precision(RESULT_PRECISION, Rounding::HalfEven);
    if result.scale() != preferred_scale {
        return Ok(apply_preferred_scale(result, preferred_scale));
    }
    Ok(result)
}

/// Re-expresses an exact result at the scale the input suggests, padding
/// with zeros up to the 16-digit cap and never discarding digits.
fn apply_preferred_scale(value: DecimalValue, preferred: i64) -> DecimalValue {
    let stripped = value.normalized();
    let target = stripped.scale().max(preferred);
    stripped
        .with_scale(target, Rounding::Down)
        .round_to_precision(RESULT_PRECISION, Rounding::HalfEven)
}
