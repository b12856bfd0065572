//! Display formatting and parsing.
//!
//! [`format`] renders a value the way the calculator screen shows it: at
//! most 16 significant digits, with `,` grouping in plain notation and a
//! `1.e+16` style compact scientific notation past the cap. [`parse`] is
//! the exact inverse for everything the screen can produce.
//!
//! | value | rendered |
//! |-------|----------|
//! | `1234.5` | `1,234.5` |
//! | `9999999999999999.5` | `1.e+16` |
//! | `0.0000000000000001` | `0.0000000000000001` |
//! | `0.00000000000000011` | `1.1e-16` |

use num_bigint::BigInt;

use crate::value::{DecimalValue, ParseError, Rounding};

/// Most significant digits the screen renders.
pub const MAX_SYMBOLS: i64 = 16;

/// Values below this (and with more than 16 fraction digits) render in
/// scientific notation even though their integer part fits.
fn min_plain() -> DecimalValue {
    DecimalValue::from_parts(BigInt::from(1), 3)
}

/// Renders a value for the screen or the equation label.
///
/// Trailing fraction zeros the caller typed (`100.00`) survive; zeros that
/// only exist in the internal representation do not.
pub fn format(value: &DecimalValue, grouping: bool) -> String {
    let normalized = value.normalized();
    let trailing = (value.scale() - normalized.scale()).max(0);
    let mut text = render(&normalized, grouping);
    if trailing > 0 {
        if !text.contains('.') {
            text.push('.');
        }
        for _ in 0..trailing {
            text.push('0');
        }
    }
    text
}

fn render(value: &DecimalValue, grouping: bool) -> String {
    if value.is_zero() {
        return "0".to_string();
    }
    if value.scale() > MAX_SYMBOLS && value.abs().cmp_value(&min_plain()).is_lt() {
        return render_scientific(value);
    }
    let int_len = value.precision() - value.scale();
    if int_len > MAX_SYMBOLS {
        return render_scientific(value);
    }
    let fraction_digits = (MAX_SYMBOLS - int_len).min(MAX_SYMBOLS).max(0);
    let rounded = value.with_scale(fraction_digits, Rounding::HalfUp).normalized();
    if rounded.precision() - rounded.scale() > MAX_SYMBOLS {
        // Rounding carried into a 17th integer digit.
        return render_scientific(&rounded);
    }
    render_plain(&rounded, grouping)
}

fn render_plain(value: &DecimalValue, grouping: bool) -> String {
    let digits = value.unscaled().magnitude().to_str_radix(10);
    let scale = value.scale();
    let (int_digits, fraction) = if scale <= 0 {
        (format!("{digits}{}", "0".repeat((-scale) as usize)), String::new())
    } else if digits.len() as i64 > scale {
        let (int_part, frac_part) = digits.split_at(digits.len() - scale as usize);
        (int_part.to_string(), frac_part.to_string())
    } else {
        let padding = "0".repeat(scale as usize - digits.len());
        ("0".to_string(), format!("{padding}{digits}"))
    };
    let int_digits = if grouping { group(&int_digits) } else { int_digits };
    let sign = if value.is_negative() { "-" } else { "" };
    if fraction.is_empty() {
        format!("{sign}{int_digits}")
    } else {
        format!("{sign}{int_digits}.{fraction}")
    }
}

/// Inserts a `,` between every group of three integer digits.
fn group(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    let offset = digits.len() % 3;
    for (index, c) in digits.chars().enumerate() {
        if index > 0 && index % 3 == offset % 3 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// Compact scientific notation: one leading digit, a dot that is always
/// present, and an explicitly signed exponent (`1.e+16`, `6.73e-16`).
fn render_scientific(value: &DecimalValue) -> String {
    let rounded = value.round_to_precision(MAX_SYMBOLS, Rounding::HalfUp);
    let exponent = rounded.exponent();
    let digits = rounded.unscaled().magnitude().to_str_radix(10);
    let digits = digits.trim_end_matches('0');
    let digits = if digits.is_empty() { "1" } else { digits };
    let (lead, rest) = digits.split_at(1);
    let sign = if rounded.is_negative() { "-" } else { "" };
    let separator = if exponent >= 0 { "e+" } else { "e-" };
    format!("{sign}{lead}.{rest}{separator}{}", exponent.abs())
}

/// Parses screen text back into a value.
///
/// Accepts everything [`format`] emits: grouping separators, plain and
/// compact scientific notation with either exponent sign.
pub fn parse(text: &str) -> Result<DecimalValue, ParseError> {
    let cleaned: String = text.chars().filter(|&c| c != ',').collect();
    cleaned.parse()
}
