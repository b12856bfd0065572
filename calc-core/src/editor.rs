//! Digit-by-digit screen editing.
//!
//! Pure functions mirroring what typing on the keypad does to the screen
//! value. The pending decimal point ("5." before any fraction digit) is
//! carried by the caller as `prepend_dot`; it only exists while the scale
//! is still zero.

use crate::value::{DecimalValue, Rounding};

/// Most digits a typed number may have.
pub const MAX_INPUT_DIGITS: i64 = 16;

/// Appends one digit to the value being typed.
///
/// A pristine zero is replaced by the digit; a full screen (16 digits)
/// ignores further input. Appending keeps the sign of the value:
/// `-12` + `5` is `-125`.
pub fn append_digit(value: &DecimalValue, digit: u8, prepend_dot: bool) -> DecimalValue {
    debug_assert!(digit <= 9);
    debug_assert!(!prepend_dot || value.scale() == 0);
    if value.is_zero() && value.scale() == 0 && !prepend_dot {
        return DecimalValue::from_digit(digit);
    }
    if value.precision() >= MAX_INPUT_DIGITS {
        return value.clone();
    }
    let signed = if value.is_negative() { -i64::from(digit) } else { i64::from(digit) };
    let unscaled = value.unscaled() * 10 + signed;
    let scale = if value.scale() == 0 && !prepend_dot { 0 } else { value.scale() + 1 };
    DecimalValue::from_parts(unscaled, scale)
}

/// Removes the last typed digit.
///
/// The final digit collapses to zero; integer values lose their last digit
/// by truncating division, fractional ones by dropping a fraction digit.
pub fn delete_digit(value: &DecimalValue) -> DecimalValue {
    if value.precision() <= 1 {
        return DecimalValue::zero();
    }
    if value.scale() == 0 {
        DecimalValue::from_parts(value.unscaled() / 10, 0)
    } else {
        value.with_scale(value.scale() - 1, Rounding::Down)
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
    // append_digit
    // =========================================================================

    #[test]
    fn digit_replaces_a_pristine_zero() {
        assert_eq!(append_digit(&dec("0"), 7, false), dec("7"));
    }

    #[test]
    fn digits_accumulate_in_the_integer_part() {
        let value = append_digit(&dec("12"), 3, false);

        assert_eq!(value, dec("123"));
    }

    #[test]
    fn pending_dot_starts_the_fraction() {
        assert_eq!(append_digit(&dec("5"), 3, true), dec("5.3"));
        assert_eq!(append_digit(&dec("0"), 3, true), dec("0.3"));
    }

    #[test]
    fn fraction_digits_extend_the_scale() {
        assert_eq!(append_digit(&dec("5.3"), 0, false), dec("5.30"));
        assert_eq!(append_digit(&dec("0.00"), 4, false), dec("0.004"));
    }

    #[test]
    fn negative_values_keep_their_sign() {
        assert_eq!(append_digit(&dec("-12"), 5, false), dec("-125"));
        assert_eq!(append_digit(&dec("-0.5"), 1, false), dec("-0.51"));
    }

    #[test]
    fn a_full_screen_ignores_input() {
        let full = dec("1234567890123456");

        assert_eq!(append_digit(&full, 9, false), full);

        let full_fraction = dec("1.234567890123456");
        assert_eq!(append_digit(&full_fraction, 9, false), full_fraction);
    }

    // =========================================================================
    // delete_digit
    // =========================================================================

    #[test]
    fn deleting_the_last_digit_leaves_zero() {
        assert_eq!(delete_digit(&dec("7")), DecimalValue::zero());
        assert_eq!(delete_digit(&dec("0.5")), DecimalValue::zero());
    }

    #[test]
    fn integer_deletion_truncates() {
        assert_eq!(delete_digit(&dec("123")), dec("12"));
        assert_eq!(delete_digit(&dec("-45")), dec("-4"));
    }

    #[test]
    fn fraction_deletion_drops_the_last_place() {
        assert_eq!(delete_digit(&dec("1.25")), dec("1.2"));
        assert_eq!(delete_digit(&dec("1.20")), dec("1.2"));
    }

    #[test]
    fn a_lone_fraction_digit_counts_as_the_last_digit() {
        // 0.04 has a single significant digit, so deletion collapses it.
        assert_eq!(delete_digit(&dec("0.04")), DecimalValue::zero());
    }
}
