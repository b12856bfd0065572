//! User-visible calculator failures.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced to the calculator user.
///
/// The `Display` text is exactly what the calculator screen shows when the
/// operation fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum CalcError {
    /// The result left the representable magnitude range.
    #[error("Overflow")]
    Overflow,

    /// A nonzero value was divided by zero.
    #[error("Cannot divide by zero")]
    DivideByZero,

    /// Zero was divided by zero.
    #[error("Result is undefined")]
    DivideZeroByZero,

    /// An operation was applied outside its domain, such as the square root
    /// of a negative number or unparseable input.
    #[error("Invalid input")]
    InvalidInput,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn display_matches_screen_messages() {
        assert_eq!(CalcError::Overflow.to_string(), "Overflow");
        assert_eq!(CalcError::DivideByZero.to_string(), "Cannot divide by zero");
        assert_eq!(CalcError::DivideZeroByZero.to_string(), "Result is undefined");
        assert_eq!(CalcError::InvalidInput.to_string(), "Invalid input");
    }
}
