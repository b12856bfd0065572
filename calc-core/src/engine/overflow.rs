//! Result range validation.
//!
//! Results are kept within the range a pocket calculator can still talk
//! about in scientific notation with a four-digit exponent: the first value
//! to overflow upward is `1e+10000`, the first to underflow is `1e-10000`.

use tracing::warn;

use crate::error::CalcError;
use crate::value::DecimalValue;

/// First unrepresentable decimal exponent, in either direction.
const EXPONENT_LIMIT: i64 = 10_000;

/// Checks a normalized result against the representable range.
///
/// A nonzero value overflows when the exponent of its leading digit reaches
/// `10000` or `-10000`; `9.99…e+9999` and `1.e-9999` are the last values in
/// range. Zero is always valid, including the exact zero produced by
/// dividing zero.
pub fn validate(value: &DecimalValue) -> Result<(), CalcError> {
    if value.is_zero() {
        return Ok(());
    }
    let exponent = value.exponent();
    if exponent.abs() >= EXPONENT_LIMIT {
        warn!(exponent, "result out of representable range");
        return Err(CalcError::Overflow);
    }
    Ok(())
}
