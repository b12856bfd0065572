//! The session layer: keys in, display out.
//!
//! [`Session`] wires the editor, the engine and the memory register behind
//! a single [`Command`] interface. Every accepted key produces a
//! [`DisplayUpdate`] with the screen text and the running equation label;
//! failures surface as [`CalcError`] and show their message on the screen
//! until the next key.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::editor;
use crate::engine::{BinaryOp, CalculationEngine, UnaryOp};
use crate::error::CalcError;
use crate::format;
use crate::memory::MemoryRegister;
use crate::value::DecimalValue;

/// Thin space separating equation tokens.
const NARROW_SPACE: &str = "\u{2009}";

/// A single key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    Digit(u8),
    Dot,
    Backspace,
    Binary(BinaryOp),
    Unary(UnaryOp),
    Percent,
    Equals,
    ClearEntry,
    ClearAll,
    MemoryStore,
    MemoryRecall,
    MemoryAdd,
    MemorySubtract,
    MemoryClear,
}

/// What the calculator shows after a key press.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayUpdate {
    /// The main screen: the current number, or an error message.
    pub screen_text: String,
    /// The running equation label above the screen.
    pub equation_text: String,
}

/// One interactive calculator.
#[derive(Debug)]
pub struct Session {
    engine: CalculationEngine,
    memory: MemoryRegister,
    screen: DecimalValue,
    /// Decimal point typed but no fraction digit yet.
    pending_dot: bool,
    /// Digits still edit the screen value; results turn this off.
    editable: bool,
    equation: Vec<String>,
    error: Option<CalcError>,
    binary_pressed: bool,
    equals_pressed: bool,
    recalled: bool,
}

fn symbol(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Subtract => "-",
        BinaryOp::Multiply => "×",
        BinaryOp::Divide => "÷",
    }
}

fn wrap(op: UnaryOp, inner: &str) -> String {
    let name = match op {
        UnaryOp::Negate => "negate",
        UnaryOp::Square => "sqr",
        UnaryOp::Inverse => "1/",
        UnaryOp::Sqrt => "\u{221a}",
    };
    format!("{name}({NARROW_SPACE}{inner}{NARROW_SPACE})")
}

fn is_op_token(token: &str) -> bool {
    matches!(token, "+" | "-" | "×" | "÷")
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            engine: CalculationEngine::new(),
            memory: MemoryRegister::new(),
            screen: DecimalValue::zero(),
            pending_dot: false,
            editable: true,
            equation: Vec::new(),
            error: None,
            binary_pressed: false,
            equals_pressed: false,
            recalled: false,
        }
    }

    /// Handles one key press.
    pub fn submit(&mut self, command: Command) -> Result<DisplayUpdate, CalcError> {
        debug!(?command, "key");
        if self.error.take().is_some() {
            self.recover();
        }
        match command {
            Command::Digit(digit) => self.digit(digit),
            Command::Dot => Ok(self.dot()),
            Command::Backspace => Ok(self.backspace()),
            Command::Binary(op) => self.binary(op),
            Command::Unary(op) => self.unary(op),
            Command::Percent => self.percent(),
            Command::Equals => self.equals(),
            Command::ClearEntry => Ok(self.clear_entry()),
            Command::ClearAll => Ok(self.clear_all()),
            Command::MemoryStore => {
                self.memory.store(self.screen.clone());
                Ok(self.end_entry())
            }
            Command::MemoryRecall => Ok(self.memory_recall()),
            Command::MemoryAdd => {
                self.memory.add(&self.screen);
                Ok(self.end_entry())
            }
            Command::MemorySubtract => {
                self.memory.subtract(&self.screen);
                Ok(self.end_entry())
            }
            Command::MemoryClear => {
                self.memory.clear();
                Ok(self.end_entry())
            }
        }
    }

    /// The current screen and equation, unchanged.
    pub fn display(&self) -> DisplayUpdate {
        DisplayUpdate {
            screen_text: self.screen_text(),
            equation_text: self.equation.join(NARROW_SPACE),
        }
    }

    pub fn has_memory(&self) -> bool {
        self.memory.has_memory()
    }

    /// Stored memory values formatted for display, most recent first.
    pub fn memory_snapshot(&self) -> Vec<String> {
        self.memory
            .snapshot()
            .iter()
            .map(|value| format::format(value, true))
            .collect()
    }

    fn screen_text(&self) -> String {
        if let Some(error) = self.error {
            return error.to_string();
        }
        let mut text = format::format(&self.screen, true);
        if self.pending_dot {
            text.push('.');
        }
        text
    }

    fn last_token_is_operand(&self) -> bool {
        self.equation.last().is_some_and(|token| !is_op_token(token))
    }

    /// Begins a fresh screen entry over a finished result.
    fn start_entry(&mut self) {
        self.screen = DecimalValue::zero();
        self.pending_dot = false;
        self.editable = true;
        self.recalled = false;
        if self.equals_pressed || self.engine.pending().is_none() {
            self.equation.clear();
        } else if self.last_token_is_operand() {
            // The replaced operand gets re-appended at the next operation.
            self.equation.pop();
        }
        self.equals_pressed = false;
        self.binary_pressed = false;
    }

    fn digit(&mut self, digit: u8) -> Result<DisplayUpdate, CalcError> {
        if digit > 9 {
            return Err(CalcError::InvalidInput);
        }
        if !self.editable {
            self.start_entry();
        }
        let appended = editor::append_digit(&self.screen, digit, self.pending_dot);
        if self.pending_dot && appended.scale() > 0 {
            self.pending_dot = false;
        }
        self.screen = appended;
        Ok(self.display())
    }

    fn dot(&mut self) -> DisplayUpdate {
        if !self.editable {
            self.start_entry();
        }
        if self.screen.scale() == 0 && !self.pending_dot {
            self.pending_dot = true;
        }
        self.display()
    }

    fn backspace(&mut self) -> DisplayUpdate {
        if self.editable {
            if self.pending_dot {
                self.pending_dot = false;
            } else {
                // Deleting the last fraction digit keeps the separator, so
                // the next digit continues the fraction.
                let keep_dot = self.screen.scale() == 1;
                self.screen = editor::delete_digit(&self.screen);
                self.pending_dot = keep_dot;
            }
        }
        self.display()
    }

    fn binary(&mut self, op: BinaryOp) -> Result<DisplayUpdate, CalcError> {
        let operand_entered = self.editable || self.recalled;
        let entered = self.screen.clone();
        if operand_entered {
            self.engine.set_operand(entered.clone());
        }
        let shown = self.engine.set_binary(op).map_err(|e| self.fail(e))?;

        if self.equals_pressed {
            self.equation.clear();
        }
        let sym = symbol(op).to_string();
        if self.binary_pressed
            && !operand_entered
            && let Some(last) = self.equation.last_mut()
            && is_op_token(last)
        {
            // Two operations in a row replace the trailing symbol.
            *last = sym;
        } else {
            if !self.last_token_is_operand() {
                self.equation.push(format::format(&entered, false));
            }
            self.equation.push(sym);
        }

        self.screen = shown;
        self.editable = false;
        self.pending_dot = false;
        self.recalled = false;
        self.equals_pressed = false;
        self.binary_pressed = true;
        Ok(self.display())
    }

    fn unary(&mut self, op: UnaryOp) -> Result<DisplayUpdate, CalcError> {
        if op == UnaryOp::Negate && self.editable {
            // While typing, the sign toggle is a screen edit, not an
            // operation; the engine never sees it.
            self.screen = self.screen.neg();
            return Ok(self.display());
        }
        let operand_entered = self.editable || self.recalled;
        let entered = self.screen.clone();
        if operand_entered {
            self.engine.set_operand(entered.clone());
        }
        let result = self.engine.unary(op).map_err(|e| self.fail(e))?;

        if self.equals_pressed {
            self.equation.clear();
        }
        let inner = if !operand_entered && self.last_token_is_operand() {
            self.equation.pop().unwrap_or_default()
        } else {
            format::format(&entered, false)
        };
        self.equation.push(wrap(op, &inner));

        self.screen = result;
        self.editable = false;
        self.pending_dot = false;
        self.recalled = false;
        self.equals_pressed = false;
        self.binary_pressed = false;
        Ok(self.display())
    }

    fn percent(&mut self) -> Result<DisplayUpdate, CalcError> {
        let operand_entered = self.editable || self.recalled;
        if operand_entered {
            self.engine.set_operand(self.screen.clone());
        }
        let result = self.engine.percent().map_err(|e| self.fail(e))?;

        if self.equals_pressed {
            self.equation.clear();
        }
        let text = format::format(&result, false);
        if self.engine.pending().is_none() {
            // Percent with nothing pending collapsed the calculation.
            self.equation.clear();
            self.equation.push(text);
        } else if !operand_entered
            && let Some(last) = self.equation.last_mut()
            && !is_op_token(last)
        {
            *last = text;
        } else {
            self.equation.push(text);
        }

        self.screen = result;
        self.editable = false;
        self.pending_dot = false;
        self.recalled = false;
        self.equals_pressed = false;
        self.binary_pressed = false;
        Ok(self.display())
    }

    fn equals(&mut self) -> Result<DisplayUpdate, CalcError> {
        if self.editable || self.recalled {
            self.engine.set_operand(self.screen.clone());
        }
        let result = self.engine.equals().map_err(|e| self.fail(e))?;

        self.equation.clear();
        self.screen = result;
        self.editable = false;
        self.pending_dot = false;
        self.recalled = false;
        self.equals_pressed = true;
        self.binary_pressed = false;
        Ok(self.display())
    }

    fn clear_entry(&mut self) -> DisplayUpdate {
        self.screen = DecimalValue::zero();
        self.pending_dot = false;
        self.editable = true;
        self.recalled = false;
        if self.equals_pressed || self.engine.pending().is_none() {
            self.equation.clear();
        } else if self.last_token_is_operand() {
            self.equation.pop();
        }
        self.equals_pressed = false;
        self.binary_pressed = false;
        self.display()
    }

    fn clear_all(&mut self) -> DisplayUpdate {
        self.engine.reset_all();
        self.screen = DecimalValue::zero();
        self.pending_dot = false;
        self.editable = true;
        self.recalled = false;
        self.equation.clear();
        self.equals_pressed = false;
        self.binary_pressed = false;
        self.display()
    }

    /// Memory mutations finish the current entry; the next digit starts
    /// a fresh number instead of appending.
    fn end_entry(&mut self) -> DisplayUpdate {
        self.editable = false;
        self.pending_dot = false;
        self.display()
    }

    fn memory_recall(&mut self) -> DisplayUpdate {
        if let Some(value) = self.memory.recall() {
            self.screen = value.clone();
            self.pending_dot = false;
            self.editable = false;
            self.recalled = true;
        }
        self.display()
    }

    /// Puts the session back into a usable state after an error screen.
    fn recover(&mut self) {
        // The engine was already reset when the error was raised.
        self.screen = DecimalValue::zero();
        self.pending_dot = false;
        self.editable = true;
        self.equation.clear();
        self.equals_pressed = false;
        self.binary_pressed = false;
        self.recalled = false;
    }

    fn fail(&mut self, error: CalcError) -> CalcError {
        warn!(%error, "calculation failed");
        self.engine.reset_all();
        self.screen = DecimalValue::zero();
        self.pending_dot = false;
        self.editable = false;
        self.error = Some(error);
        self.equals_pressed = false;
        self.binary_pressed = false;
        self.recalled = false;
        error
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn press(session: &mut Session, keys: &[Command]) -> DisplayUpdate {
        let mut last = session.display();
        for &key in keys {
            last = session.submit(key).unwrap();
        }
        last
    }

    fn screen(session: &mut Session, keys: &[Command]) -> String {
        press(session, keys).screen_text
    }

    use Command::*;

    // =========================================================================
    // screen editing
    // =========================================================================

    #[test]
    fn digits_and_dot_build_a_number() {
        let mut session = Session::new();

        assert_eq!(
            screen(&mut session, &[Digit(1), Digit(2), Dot, Digit(5)]),
            "12.5"
        );
    }

    #[test]
    fn dot_shows_before_the_first_fraction_digit() {
        let mut session = Session::new();

        assert_eq!(screen(&mut session, &[Digit(5), Dot]), "5.");
    }

    #[test]
    fn typed_numbers_are_grouped() {
        let mut session = Session::new();
        let keys: Vec<Command> = (1..=7).map(Digit).collect();

        assert_eq!(screen(&mut session, &keys), "1,234,567");
    }

    #[test]
    fn backspace_undoes_typing() {
        let mut session = Session::new();

        assert_eq!(
            screen(&mut session, &[Digit(1), Digit(2), Backspace]),
            "1"
        );
        assert_eq!(screen(&mut session, &[Dot, Backspace]), "1");
        assert_eq!(screen(&mut session, &[Backspace]), "0");
    }

    #[test]
    fn backspace_keeps_the_separator_of_a_single_fraction_digit() {
        let mut session = Session::new();

        assert_eq!(
            screen(&mut session, &[Digit(1), Dot, Digit(2), Backspace]),
            "1."
        );
        assert_eq!(screen(&mut session, &[Digit(5)]), "1.5");
    }

    #[test]
    fn negate_while_typing_is_a_sign_toggle() {
        let mut session = Session::new();

        assert_eq!(
            screen(&mut session, &[Digit(5), Unary(UnaryOp::Negate)]),
            "-5"
        );
        assert_eq!(screen(&mut session, &[Unary(UnaryOp::Negate)]), "5");
    }

    #[test]
    fn negate_on_a_pristine_zero_stays_zero() {
        let mut session = Session::new();

        assert_eq!(screen(&mut session, &[Unary(UnaryOp::Negate)]), "0");
    }

    #[test]
    fn rejects_out_of_range_digits() {
        let mut session = Session::new();

        assert_eq!(session.submit(Digit(10)), Err(CalcError::InvalidInput));
        assert_eq!(session.display().screen_text, "0");
    }

    // =========================================================================
    // equation label
    // =========================================================================

    #[test]
    fn binary_operations_build_the_equation() {
        let mut session = Session::new();
        let update = press(
            &mut session,
            &[Digit(2), Binary(BinaryOp::Add), Digit(3), Binary(BinaryOp::Multiply)],
        );

        assert_eq!(update.equation_text, "2\u{2009}+\u{2009}3\u{2009}×");
        assert_eq!(update.screen_text, "5");
    }

    #[test]
    fn pressing_two_operations_replaces_the_symbol() {
        let mut session = Session::new();
        let update = press(
            &mut session,
            &[Digit(6), Binary(BinaryOp::Add), Binary(BinaryOp::Divide)],
        );

        assert_eq!(update.equation_text, "6\u{2009}÷");
    }

    #[test]
    fn unary_operations_nest_in_the_label() {
        let mut session = Session::new();
        let update = press(
            &mut session,
            &[Digit(9), Unary(UnaryOp::Sqrt), Unary(UnaryOp::Sqrt)],
        );

        assert_eq!(
            update.equation_text,
            "\u{221a}(\u{2009}\u{221a}(\u{2009}9\u{2009})\u{2009})"
        );
    }

    #[test]
    fn equals_clears_the_label() {
        let mut session = Session::new();
        let update = press(
            &mut session,
            &[Digit(2), Binary(BinaryOp::Add), Digit(2), Equals],
        );

        assert_eq!(update.equation_text, "");
        assert_eq!(update.screen_text, "4");
    }

    // =========================================================================
    // error recovery
    // =========================================================================

    #[test]
    fn divide_by_zero_shows_the_message_until_the_next_key() {
        let mut session = Session::new();
        let error = press_error(
            &mut session,
            &[Digit(5), Binary(BinaryOp::Divide), Digit(0)],
            Equals,
        );

        assert_eq!(error, CalcError::DivideByZero);
        assert_eq!(session.display().screen_text, "Cannot divide by zero");
        assert_eq!(screen(&mut session, &[Digit(7)]), "7");
    }

    fn press_error(session: &mut Session, setup: &[Command], last: Command) -> CalcError {
        press(session, setup);
        session.submit(last).unwrap_err()
    }

    // =========================================================================
    // memory
    // =========================================================================

    #[test]
    fn memory_store_and_recall_round_trip() {
        let mut session = Session::new();
        press(&mut session, &[Digit(4), Digit(2), MemoryStore, ClearAll]);

        assert_eq!(screen(&mut session, &[MemoryRecall]), "42");
        assert!(session.has_memory());
        assert_eq!(session.memory_snapshot(), vec!["42".to_string()]);
    }

    #[test]
    fn memory_recall_feeds_the_next_operation() {
        let mut session = Session::new();
        press(&mut session, &[Digit(8), MemoryStore, ClearAll]);

        assert_eq!(
            screen(
                &mut session,
                &[Digit(2), Binary(BinaryOp::Multiply), MemoryRecall, Equals]
            ),
            "16"
        );
    }

    #[test]
    fn digits_after_a_memory_mutation_start_a_fresh_entry() {
        let mut session = Session::new();
        press(&mut session, &[Digit(1), Digit(0), MemoryAdd]);

        assert_eq!(screen(&mut session, &[Digit(5)]), "5");
        assert_eq!(session.memory_snapshot(), vec!["10".to_string()]);
    }

    #[test]
    fn memory_clear_empties_the_register() {
        let mut session = Session::new();
        press(&mut session, &[Digit(5), MemoryAdd, MemoryClear]);

        assert!(!session.has_memory());
    }
}
