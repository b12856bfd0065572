//! Arbitrary-precision signed decimal values.
//!
//! A [`DecimalValue`] is an immutable pair of an unscaled [`BigInt`] and a
//! decimal scale: the numeric value is `unscaled × 10^(−scale)`. The scale
//! counts fraction digits and may be negative, which represents trailing
//! integer zeros compactly (`1.e+16` is unscaled `1` at scale `−16`).
//!
//! Equality is representation-sensitive: `2.5` and `2.50` are different
//! values here. Use [`DecimalValue::cmp_value`] for numeric comparison and
//! [`DecimalValue::normalized`] to strip trailing fraction zeros.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use num_bigint::{BigInt, Sign};
use num_traits::{Signed, Zero};
use thiserror::Error;

/// Rounding modes used when digits are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    /// Truncate toward zero.
    Down,
    /// Round to nearest; ties away from zero.
    HalfUp,
    /// Round to nearest; ties to the even neighbour.
    HalfEven,
}

/// Error returned when a decimal literal cannot be parsed.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid decimal literal: {text:?}")]
pub struct ParseError {
    pub text: String,
}

/// Arbitrary-precision signed decimal number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecimalValue {
    unscaled: BigInt,
    scale: i64,
}

fn pow10(n: usize) -> BigInt {
    num_traits::pow(BigInt::from(10), n)
}

/// Rounds a non-negative quotient magnitude given its remainder.
fn round_magnitude(quotient: BigInt, remainder: BigInt, divisor: &BigInt, mode: Rounding) -> BigInt {
    let doubled = remainder * 2u8;
    let round_up = match mode {
        Rounding::Down => false,
        Rounding::HalfUp => &doubled >= divisor,
        Rounding::HalfEven => match doubled.cmp(divisor) {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => !(&quotient % 2u8).is_zero(),
        },
    };
    if round_up { quotient + 1u8 } else { quotient }
}

impl DecimalValue {
    pub fn zero() -> Self {
        Self { unscaled: BigInt::zero(), scale: 0 }
    }

    pub fn one() -> Self {
        Self { unscaled: BigInt::from(1), scale: 0 }
    }

    pub fn from_digit(digit: u8) -> Self {
        debug_assert!(digit <= 9);
        Self { unscaled: BigInt::from(digit), scale: 0 }
    }

    pub fn from_i64(value: i64) -> Self {
        Self { unscaled: BigInt::from(value), scale: 0 }
    }

    pub(crate) fn from_parts(unscaled: BigInt, scale: i64) -> Self {
        Self { unscaled, scale }
    }

    pub(crate) fn unscaled(&self) -> &BigInt {
        &self.unscaled
    }

    /// Number of fraction digits; negative for compact trailing zeros.
    pub fn scale(&self) -> i64 {
        self.scale
    }

    pub fn is_zero(&self) -> bool {
        self.unscaled.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.unscaled.is_negative()
    }

    /// Number of decimal digits in the unscaled value. Zero has precision 1.
    pub fn precision(&self) -> i64 {
        if self.unscaled.is_zero() {
            1
        } else {
            self.unscaled.magnitude().to_str_radix(10).len() as i64
        }
    }

    /// Exponent of the leading digit in scientific notation.
    ///
    /// `123.4` has exponent 2, `0.05` has exponent −2. The result does not
    /// depend on the representation: `2.e+16` and plain `20000000000000000`
    /// both report 16. Zero reports 0.
    pub fn exponent(&self) -> i64 {
        self.precision() - self.scale - 1
    }

    /// Strips trailing fraction zeros, never below scale 0.
    ///
    /// `2.500` becomes `2.5` and `100.00` becomes `100`; plain `100` and
    /// compact `1.e+2` are returned unchanged.
    pub fn normalized(&self) -> Self {
        if self.scale <= 0 {
            return self.clone();
        }
        if self.unscaled.is_zero() {
            return Self::zero();
        }
        let mut unscaled = self.unscaled.clone();
        let mut scale = self.scale;
        let mut chunk = scale.min(16);
        while scale > 0 && chunk > 0 {
            if chunk > scale {
                chunk = scale;
                continue;
            }
            let divisor = pow10(chunk as usize);
            if (&unscaled % &divisor).is_zero() {
                unscaled /= &divisor;
                scale -= chunk;
            } else {
                chunk /= 2;
            }
        }
        Self { unscaled, scale }
    }

    pub fn neg(&self) -> Self {
        Self { unscaled: -&self.unscaled, scale: self.scale }
    }

    pub fn abs(&self) -> Self {
        Self { unscaled: self.unscaled.abs(), scale: self.scale }
    }

    fn aligned_unscaled(&self, scale: i64) -> BigInt {
        debug_assert!(scale >= self.scale);
        &self.unscaled * pow10((scale - self.scale) as usize)
    }

    /// Exact addition; result scale is the larger operand scale.
    pub fn add(&self, rhs: &Self) -> Self {
        let scale = self.scale.max(rhs.scale);
        Self { unscaled: self.aligned_unscaled(scale) + rhs.aligned_unscaled(scale), scale }
    }

    /// Exact subtraction; result scale is the larger operand scale.
    pub fn sub(&self, rhs: &Self) -> Self {
        let scale = self.scale.max(rhs.scale);
        Self { unscaled: self.aligned_unscaled(scale) - rhs.aligned_unscaled(scale), scale }
    }

    /// Exact multiplication; result scale is the sum of the operand scales.
    pub fn mul(&self, rhs: &Self) -> Self {
        Self { unscaled: &self.unscaled * &rhs.unscaled, scale: self.scale + rhs.scale }
    }

    /// Multiplies by `10^n` by shifting the scale; the digits are unchanged.
    pub fn mul_pow10(&self, n: i64) -> Self {
        Self { unscaled: self.unscaled.clone(), scale: self.scale - n }
    }

    /// Numeric comparison, independent of representation.
    pub fn cmp_value(&self, rhs: &Self) -> Ordering {
        match self.sub(rhs).unscaled.sign() {
            Sign::Minus => Ordering::Less,
            Sign::NoSign => Ordering::Equal,
            Sign::Plus => Ordering::Greater,
        }
    }

    /// Rescales to exactly `scale` fraction digits.
    ///
    /// Growing the scale appends zeros exactly; shrinking it discards digits
    /// under the given rounding mode.
    pub fn with_scale(&self, scale: i64, mode: Rounding) -> Self {
        if scale >= self.scale {
            return Self { unscaled: self.aligned_unscaled(scale), scale };
        }
        let divisor = pow10((self.scale - scale) as usize);
        let magnitude = self.unscaled.abs();
        let quotient = &magnitude / &divisor;
        let remainder = magnitude - &quotient * &divisor;
        let rounded = round_magnitude(quotient, remainder, &divisor, mode);
        let unscaled = if self.unscaled.is_negative() { -rounded } else { rounded };
        Self { unscaled, scale }
    }

    /// Rounds to at most `digits` significant digits.
    ///
    /// A carry that lengthens the value (`999` → `1000` at 3 digits) is
    /// folded back by dropping the exact trailing zero it produced.
    pub fn round_to_precision(&self, digits: i64, mode: Rounding) -> Self {
        debug_assert!(digits > 0);
        let precision = self.precision();
        if self.unscaled.is_zero() || precision <= digits {
            return self.clone();
        }
        let mut rounded = self.with_scale(self.scale - (precision - digits), mode);
        if rounded.precision() > digits {
            rounded = rounded.with_scale(rounded.scale - 1, Rounding::Down);
        }
        rounded
    }

    /// Division rounded once at exactly `scale` fraction digits.
    ///
    /// The divisor must be nonzero; a zero dividend yields zero at the
    /// requested scale.
    pub fn div_round(&self, rhs: &Self, scale: i64, mode: Rounding) -> Self {
        debug_assert!(!rhs.is_zero());
        if self.unscaled.is_zero() {
            return Self { unscaled: BigInt::zero(), scale };
        }
        let shift = scale + rhs.scale - self.scale;
        let (numerator, divisor) = if shift >= 0 {
            (self.unscaled.abs() * pow10(shift as usize), rhs.unscaled.abs())
        } else {
            (self.unscaled.abs(), rhs.unscaled.abs() * pow10((-shift) as usize))
        };
        let quotient = &numerator / &divisor;
        let remainder = numerator - &quotient * &divisor;
        let rounded = round_magnitude(quotient, remainder, &divisor, mode);
        let negative = self.unscaled.is_negative() != rhs.unscaled.is_negative();
        let unscaled = if negative { -rounded } else { rounded };
        Self { unscaled, scale }
    }

    /// Division rounded once to `digits` significant digits.
    pub fn div_to_precision(&self, rhs: &Self, digits: i64, mode: Rounding) -> Self {
        debug_assert!(digits > 0);
        debug_assert!(!rhs.is_zero());
        if self.unscaled.is_zero() {
            return Self::zero();
        }
        // The quotient exponent is this estimate or one below it.
        let estimate = self.exponent() - rhs.exponent();
        let scale = digits - 1 - estimate;
        let mut quotient = self.div_round(rhs, scale, mode);
        if quotient.precision() < digits {
            quotient = self.div_round(rhs, scale + 1, mode);
        }
        if quotient.precision() > digits {
            quotient = quotient.with_scale(quotient.scale - 1, Rounding::Down);
        }
        quotient
    }

    /// Exact decimal expansion of a finite `f64`.
    ///
    /// Every finite double is `m × 2^e` for integers `m`, `e`; negative
    /// binary exponents become `m × 5^(−e)` at scale `−e`, so no digits are
    /// invented or lost.
    pub fn from_f64_exact(value: f64) -> Self {
        debug_assert!(value.is_finite());
        let bits = value.to_bits();
        let negative = bits >> 63 == 1;
        let biased = ((bits >> 52) & 0x7ff) as i64;
        let fraction = bits & 0xf_ffff_ffff_ffff;
        let (mut mantissa, mut exp2) = if biased == 0 {
            (fraction, -1074)
        } else {
            (fraction | (1 << 52), biased - 1075)
        };
        if mantissa == 0 {
            return Self::zero();
        }
        // Reduce the binary fraction so 0.5 lands at scale 1, not 53.
        while mantissa & 1 == 0 && exp2 < 0 {
            mantissa >>= 1;
            exp2 += 1;
        }
        let mut unscaled = BigInt::from(mantissa);
        let scale = if exp2 >= 0 {
            unscaled <<= exp2 as usize;
            0
        } else {
            unscaled *= num_traits::pow(BigInt::from(5), (-exp2) as usize);
            -exp2
        };
        if negative {
            unscaled = -unscaled;
        }
        Self { unscaled, scale }
    }

    /// Nearest `f64`, used only to seed iterative algorithms.
    pub fn to_f64(&self) -> f64 {
        if self.unscaled.is_zero() {
            return 0.0;
        }
        let digits = self.unscaled.magnitude().to_str_radix(10);
        let take = digits.len().min(17);
        let exp = self.exponent() - (take as i64 - 1);
        let sign = if self.is_negative() { "-" } else { "" };
        format!("{sign}{}e{exp}", &digits[..take]).parse().unwrap_or(0.0)
    }
}

impl FromStr for DecimalValue {
    type Err = ParseError;

    /// Parses a plain or scientific decimal literal (`-12.5`, `1.e+16`,
    /// `6e-3`). No grouping separators.
    fn from_str(text: &str) -> Result<Self, ParseError> {
        let err = || ParseError { text: text.to_string() };
        let mut rest = text;
        let mut negative = false;
        if let Some(stripped) = rest.strip_prefix('-') {
            negative = true;
            rest = stripped;
        } else if let Some(stripped) = rest.strip_prefix('+') {
            rest = stripped;
        }
        let (mantissa, exp) = match rest.find(['e', 'E']) {
            Some(split) => {
                let exp = rest[split + 1..].parse::<i64>().map_err(|_| err())?;
                (&rest[..split], exp)
            }
            None => (rest, 0),
        };
        let (int_part, frac_part) = match mantissa.find('.') {
            Some(split) => (&mantissa[..split], &mantissa[split + 1..]),
            None => (mantissa, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(err());
        }
        let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(int_part) || !all_digits(frac_part) {
            return Err(err());
        }
        let digits = format!("{int_part}{frac_part}");
        let unscaled = BigInt::parse_bytes(digits.as_bytes(), 10).ok_or_else(err)?;
        Ok(Self {
            unscaled: if negative { -unscaled } else { unscaled },
            scale: frac_part.len() as i64 - exp,
        })
    }
}

impl fmt::Display for DecimalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.unscaled.magnitude().to_str_radix(10);
        let sign = if self.is_negative() { "-" } else { "" };
        if self.scale == 0 {
            write!(f, "{sign}{digits}")
        } else if self.scale < 0 {
            write!(f, "{sign}{digits}e+{}", -self.scale)
        } else {
            let scale = self.scale as usize;
            if digits.len() > scale {
                let (int_part, frac_part) = digits.split_at(digits.len() - scale);
                write!(f, "{sign}{int_part}.{frac_part}")
            } else {
                write!(f, "{sign}0.{}{digits}", "0".repeat(scale - digits.len()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn dec(text: &str) -> DecimalValue {
        text.parse().unwrap()
    }

    // =========================================================================
    // parsing and display
    // =========================================================================

    #[test]
    fn parses_plain_literal() {
        let value = dec("-12.50");

        assert_eq!(value.unscaled, BigInt::from(-1250));
        assert_eq!(value.scale(), 2);
    }

    #[test]
    fn parses_compact_scientific_literal() {
        let value = dec("1.e+16");

        assert_eq!(value.unscaled, BigInt::from(1));
        assert_eq!(value.scale(), -16);
    }

    #[test]
    fn parses_negative_exponent() {
        assert_eq!(dec("6.73e-16"), DecimalValue::from_parts(BigInt::from(673), 18));
    }

    #[test]
    fn rejects_garbage() {
        assert!("12..5".parse::<DecimalValue>().is_err());
        assert!("".parse::<DecimalValue>().is_err());
        assert!("-".parse::<DecimalValue>().is_err());
        assert!("1e".parse::<DecimalValue>().is_err());
        assert!("abc".parse::<DecimalValue>().is_err());
    }

    #[test]
    fn displays_fractional_values_with_padding() {
        assert_eq!(dec("0.005").to_string(), "0.005");
        assert_eq!(dec("-12.5").to_string(), "-12.5");
        assert_eq!(dec("3.e+4").to_string(), "3e+4");
    }

    // =========================================================================
    // precision / exponent / normalization
    // =========================================================================

    #[test]
    fn precision_counts_unscaled_digits() {
        assert_eq!(dec("0").precision(), 1);
        assert_eq!(dec("0.00").precision(), 1);
        assert_eq!(dec("123.45").precision(), 5);
        assert_eq!(dec("1.e+16").precision(), 1);
    }

    #[test]
    fn exponent_is_representation_invariant() {
        assert_eq!(dec("2.e+16").exponent(), 16);
        assert_eq!(dec("20000000000000000").exponent(), 16);
        assert_eq!(dec("0.05").exponent(), -2);
        assert_eq!(dec("123.4").exponent(), 2);
    }

    #[test]
    fn normalized_strips_fraction_zeros_only() {
        assert_eq!(dec("2.500").normalized(), dec("2.5"));
        assert_eq!(dec("100.00").normalized(), dec("100"));
        assert_eq!(dec("100").normalized(), dec("100"));
        assert_eq!(dec("1.e+2").normalized(), dec("1.e+2"));
        assert_eq!(dec("0.000").normalized(), DecimalValue::zero());
    }

    #[test]
    fn normalized_handles_long_zero_runs() {
        let long = format!("1.5{}", "0".repeat(9998));

        assert_eq!(dec(&long).normalized(), dec("1.5"));
    }

    // =========================================================================
    // arithmetic
    // =========================================================================

    #[test]
    fn add_aligns_scales() {
        assert_eq!(dec("1.25").add(&dec("0.755")), dec("2.005"));
        assert_eq!(dec("1.e+2").add(&dec("0.5")), dec("100.5"));
    }

    #[test]
    fn sub_can_cross_zero() {
        assert_eq!(dec("1.5").sub(&dec("2")), dec("-0.5"));
    }

    #[test]
    fn mul_sums_scales() {
        assert_eq!(dec("0.5").mul(&dec("0.2")), dec("0.10"));
        assert_eq!(dec("-3").mul(&dec("4")), dec("-12"));
    }

    #[test]
    fn mul_pow10_shifts_scale_only() {
        assert_eq!(dec("1.6").mul_pow10(-2), dec("0.016"));
        assert_eq!(dec("1.6").mul_pow10(3), DecimalValue::from_parts(BigInt::from(16), -2));
    }

    #[test]
    fn cmp_value_ignores_representation() {
        assert_eq!(dec("2.50").cmp_value(&dec("2.5")), Ordering::Equal);
        assert_eq!(dec("-1").cmp_value(&dec("0.001")), Ordering::Less);
        assert_eq!(dec("1.e+2").cmp_value(&dec("99.9")), Ordering::Greater);
    }

    // =========================================================================
    // rounding
    // =========================================================================

    #[test]
    fn with_scale_half_up_rounds_away_from_zero() {
        assert_eq!(dec("2.5").with_scale(0, Rounding::HalfUp), dec("3"));
        assert_eq!(dec("-2.5").with_scale(0, Rounding::HalfUp), dec("-3"));
        assert_eq!(dec("2.4999").with_scale(0, Rounding::HalfUp), dec("2"));
    }

    #[test]
    fn with_scale_half_even_breaks_ties_to_even() {
        assert_eq!(dec("2.5").with_scale(0, Rounding::HalfEven), dec("2"));
        assert_eq!(dec("3.5").with_scale(0, Rounding::HalfEven), dec("4"));
        assert_eq!(dec("2.51").with_scale(0, Rounding::HalfEven), dec("3"));
    }

    #[test]
    fn with_scale_down_truncates() {
        assert_eq!(dec("-2.9").with_scale(0, Rounding::Down), dec("-2"));
        assert_eq!(dec("0.199").with_scale(2, Rounding::Down), dec("0.19"));
    }

    #[test]
    fn with_scale_grows_exactly() {
        assert_eq!(dec("2.5").with_scale(3, Rounding::HalfUp), dec("2.500"));
    }

    #[test]
    fn round_to_precision_handles_carry() {
        assert_eq!(
            dec("999").round_to_precision(2, Rounding::HalfUp),
            DecimalValue::from_parts(BigInt::from(10), -2)
        );
        assert_eq!(dec("0.09999").round_to_precision(3, Rounding::HalfEven), dec("0.100"));
        assert_eq!(dec("123.456").round_to_precision(4, Rounding::HalfEven), dec("123.5"));
        assert_eq!(dec("123.456").round_to_precision(9, Rounding::HalfEven), dec("123.456"));
    }

    // =========================================================================
    // division
    // =========================================================================

    #[test]
    fn div_round_half_up_at_fixed_scale() {
        assert_eq!(dec("1").div_round(&dec("3"), 4, Rounding::HalfUp), dec("0.3333"));
        assert_eq!(dec("2").div_round(&dec("3"), 4, Rounding::HalfUp), dec("0.6667"));
        assert_eq!(dec("1").div_round(&dec("8"), 2, Rounding::HalfUp), dec("0.13"));
        assert_eq!(dec("-1").div_round(&dec("8"), 2, Rounding::HalfUp), dec("-0.13"));
    }

    #[test]
    fn div_round_exact_quotient_keeps_scale() {
        assert_eq!(dec("10").div_round(&dec("4"), 4, Rounding::HalfUp), dec("2.5000"));
    }

    #[test]
    fn div_to_precision_gives_significant_digits() {
        assert_eq!(dec("1").div_to_precision(&dec("3"), 5, Rounding::HalfEven), dec("0.33333"));
        assert_eq!(dec("1000").div_to_precision(&dec("3"), 5, Rounding::HalfEven), dec("333.33"));
        assert_eq!(dec("1").div_to_precision(&dec("999"), 3, Rounding::HalfEven), dec("0.00100"));
    }

    // =========================================================================
    // f64 bridging
    // =========================================================================

    #[test]
    fn from_f64_exact_expands_exact_binary_fractions() {
        assert_eq!(DecimalValue::from_f64_exact(0.5), dec("0.5"));
        assert_eq!(DecimalValue::from_f64_exact(3.0), dec("3"));
        assert_eq!(DecimalValue::from_f64_exact(0.0), DecimalValue::zero());
    }

    #[test]
    fn from_f64_exact_keeps_every_bit_of_an_inexact_double() {
        let expanded = DecimalValue::from_f64_exact(0.1);

        // 0.1 as a double is slightly above one tenth.
        assert_eq!(expanded.cmp_value(&dec("0.1")), Ordering::Greater);
        assert_eq!(
            expanded.cmp_value(&dec("0.100000000000000006")),
            Ordering::Less
        );
    }

    #[test]
    fn to_f64_round_trips_through_the_seed_path() {
        assert_eq!(dec("0.16").to_f64(), 0.16);
        assert_eq!(dec("12.25").to_f64(), 12.25);
        assert_eq!(dec("-3").to_f64(), -3.0);
    }
}
