//! The calculation engine.
//!
//! [`CalculationEngine`] is the single place binary, unary and percentage
//! operations are evaluated. It holds two operands and the pending binary
//! operation as an explicit state struct; every result is normalized and
//! range-checked before it is stored.
//!
//! | operation | semantics |
//! |-----------|-----------|
//! | `+` `-` `×` | exact |
//! | `÷` | 10000 fraction digits, half-up |
//! | `1/x` | 10000 fraction digits, half-up |
//! | `x²` | exact |
//! | `√x` | 16 significant digits, half-even |

pub mod overflow;
pub mod sqrt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::CalcError;
use crate::value::{DecimalValue, Rounding};

/// Fraction digits carried by division results before normalization.
pub const DIVIDE_SCALE: i64 = 10_000;

/// The four in-fix operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

/// The single-operand operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Negate,
    Square,
    Inverse,
    Sqrt,
}

/// Two-operand calculator state machine.
///
/// `first` holds the left operand (and every intermediate result), `second`
/// the right operand. After equals, results latch into `first` so that
/// repeated equals and follow-up unary operations work on them.
#[derive(Debug, Clone)]
pub struct CalculationEngine {
    first: DecimalValue,
    second: DecimalValue,
    pending: Option<BinaryOp>,
    /// A binary operation was pressed but no right operand arrived yet.
    awaiting_second: bool,
    /// Unary and percent operations apply to `first` (set by equals and by
    /// entering an operand with no pending operation).
    unary_targets_first: bool,
    previous_was_equals: bool,
}

impl Default for CalculationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl CalculationEngine {
    pub fn new() -> Self {
        Self {
            first: DecimalValue::zero(),
            second: DecimalValue::zero(),
            pending: None,
            awaiting_second: false,
            unary_targets_first: false,
            previous_was_equals: false,
        }
    }

    /// Returns to the initial state. Safe to call repeatedly.
    pub fn reset_all(&mut self) {
        *self = Self::new();
    }

    pub fn first(&self) -> &DecimalValue {
        &self.first
    }

    pub fn pending(&self) -> Option<BinaryOp> {
        self.pending
    }

    /// Feeds a finished operand into the state machine.
    ///
    /// With a pending operation the value becomes the right operand;
    /// otherwise it replaces the left one and any stale result state.
    pub fn set_operand(&mut self, value: DecimalValue) {
        if self.previous_was_equals {
            // Typing after equals starts a fresh calculation.
            self.reset_all();
        }
        if self.pending.is_some() {
            self.second = value;
            self.awaiting_second = false;
            self.unary_targets_first = false;
        } else {
            self.first = value;
            self.second = DecimalValue::zero();
            self.unary_targets_first = true;
        }
        self.previous_was_equals = false;
    }

    /// Registers a binary operation, evaluating any completed pair first.
    ///
    /// Returns the value to display: the running result so far.
    pub fn set_binary(&mut self, op: BinaryOp) -> Result<DecimalValue, CalcError> {
        if let Some(pending) = self.pending
            && !self.awaiting_second
            && !self.previous_was_equals
        {
            self.first = evaluate(pending, &self.first, &self.second)?;
        }
        self.pending = Some(op);
        self.awaiting_second = true;
        self.unary_targets_first = false;
        self.previous_was_equals = false;
        Ok(self.first.clone())
    }

    /// Evaluates the pending operation.
    ///
    /// `5 + =` doubles the operand; repeated equals re-applies the retained
    /// right operand to each new result. Without a pending operation the
    /// current operand is returned unchanged.
    pub fn equals(&mut self) -> Result<DecimalValue, CalcError> {
        if let Some(pending) = self.pending {
            if self.awaiting_second {
                self.second = self.first.clone();
                self.awaiting_second = false;
            }
            self.first = evaluate(pending, &self.first, &self.second)?;
        }
        self.unary_targets_first = true;
        self.previous_was_equals = true;
        Ok(self.first.clone())
    }

    /// Applies a unary operation to whichever operand is in play.
    pub fn unary(&mut self, op: UnaryOp) -> Result<DecimalValue, CalcError> {
        let to_first = self.unary_targets_first || self.pending.is_none();
        let input = if to_first || self.awaiting_second {
            &self.first
        } else {
            &self.second
        };
        let result = apply_unary(op, input)?;
        if to_first {
            self.first = result.clone();
        } else {
            self.second = result.clone();
            self.awaiting_second = false;
        }
        self.previous_was_equals = false;
        Ok(result)
    }

    /// Turns the operand in play into a percentage.
    ///
    /// Pending `+`/`-` read it as a percentage of the left operand, pending
    /// `×`/`÷` as a plain fraction of one hundred. The pending operation
    /// survives equals, so after `53 + 12 =` a percent reads the latched
    /// `65` as both base and operand. With nothing pending the whole
    /// calculation resets to zero.
    pub fn percent(&mut self) -> Result<DecimalValue, CalcError> {
        let Some(pending) = self.pending else {
            self.reset_all();
            return Ok(DecimalValue::zero());
        };
        let operand = if self.unary_targets_first || self.awaiting_second {
            self.first.clone()
        } else {
            self.second.clone()
        };
        let result = match pending {
            BinaryOp::Add | BinaryOp::Subtract => {
                let product = self.first.mul(&operand);
                finish(product.div_round(&hundred(), DIVIDE_SCALE, Rounding::HalfUp))?
            }
            BinaryOp::Multiply | BinaryOp::Divide => finish(operand.mul_pow10(-2))?,
        };
        self.second = result.clone();
        self.awaiting_second = false;
        self.previous_was_equals = false;
        Ok(result)
    }
}

fn hundred() -> DecimalValue {
    DecimalValue::from_i64(100)
}

/// Normalizes a raw result and checks it against the representable range.
fn finish(value: DecimalValue) -> Result<DecimalValue, CalcError> {
    let normalized = value.normalized();
    overflow::validate(&normalized)?;
    Ok(normalized)
}

fn evaluate(op: BinaryOp, first: &DecimalValue, second: &DecimalValue) -> Result<DecimalValue, CalcError> {
    let raw = match op {
        BinaryOp::Add => first.add(second),
        BinaryOp::Subtract => first.sub(second),
        BinaryOp::Multiply => first.mul(second),
        BinaryOp::Divide => {
            if second.is_zero() {
                warn!("division by zero");
                return Err(if first.is_zero() {
                    CalcError::DivideZeroByZero
                } else {
                    CalcError::DivideByZero
                });
            }
            if first.is_zero() {
                // Exact zero, valid at any divisor scale.
                return Ok(DecimalValue::zero());
            }
            first.div_round(second, DIVIDE_SCALE, Rounding::HalfUp)
        }
    };
    finish(raw)
}

fn apply_unary(op: UnaryOp, value: &DecimalValue) -> Result<DecimalValue, CalcError> {
    let raw = match op {
        UnaryOp::Negate => value.neg(),
        UnaryOp::Square => value.mul(value),
        UnaryOp::Inverse => {
            if value.is_zero() {
                warn!("inverse of zero");
                return Err(CalcError::DivideByZero);
            }
            DecimalValue::one().div_round(value, DIVIDE_SCALE, Rounding::HalfUp)
        }
        UnaryOp::Sqrt => sqrt::sqrt(value)?,
    };
    finish(raw)
}
