//! Token reader driving a calculator [`Session`].
//!
//! Input is split on whitespace; each token maps to one or more key
//! presses. Number tokens are replayed digit by digit so that the screen
//! editor applies its usual rules (the 16 digit cap included).
//!
//! | token | key | | token | key |
//! |-------|----------------|-|-------|----------------|
//! | `0`..`9`, `12.5`, `-3` | digits, dot, sign | | `back` | backspace |
//! | `.` | decimal point | | `ce` | clear entry |
//! | `+` `-` `*` `/` | binary operation | | `c` | clear all |
//! | `=` | equals | | `ms` `mr` `m+` `m-` `mc` | memory |
//! | `%` | percent | | `mem` | list memory |
//! | `neg` `sqr` `sqrt` `inv` | unary operation | | `quit` | leave |

use std::io::BufRead;
use std::sync::LazyLock;

use anyhow::Context;
use regex::Regex;
use tracing::warn;

use calc_core::{BinaryOp, Command, Session, UnaryOp};

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?[0-9]+(\.[0-9]*)?$").expect("literal pattern"));

/// What a single input token asks for.
#[derive(Debug, PartialEq, Eq)]
enum Action {
    Keys(Vec<Command>),
    ShowMemory,
    Quit,
}

/// Expands one token into key presses.
///
/// Returns `None` for tokens that mean nothing to the calculator.
fn parse_token(token: &str) -> Option<Action> {
    let command = match token {
        "." => Command::Dot,
        "+" => Command::Binary(BinaryOp::Add),
        "-" => Command::Binary(BinaryOp::Subtract),
        "*" => Command::Binary(BinaryOp::Multiply),
        "/" => Command::Binary(BinaryOp::Divide),
        "=" => Command::Equals,
        "%" => Command::Percent,
        "neg" => Command::Unary(UnaryOp::Negate),
        "sqr" => Command::Unary(UnaryOp::Square),
        "sqrt" => Command::Unary(UnaryOp::Sqrt),
        "inv" => Command::Unary(UnaryOp::Inverse),
        "back" => Command::Backspace,
        "ce" => Command::ClearEntry,
        "c" => Command::ClearAll,
        "ms" => Command::MemoryStore,
        "mr" => Command::MemoryRecall,
        "m+" => Command::MemoryAdd,
        "m-" => Command::MemorySubtract,
        "mc" => Command::MemoryClear,
        "mem" => return Some(Action::ShowMemory),
        "quit" | "exit" => return Some(Action::Quit),
        _ => return number_keys(token).map(Action::Keys),
    };
    Some(Action::Keys(vec![command]))
}

/// Turns a numeric literal into the key presses that type it.
fn number_keys(token: &str) -> Option<Vec<Command>> {
    if !NUMBER.is_match(token) {
        return None;
    }
    let negative = token.starts_with('-');
    let mut keys = Vec::new();
    for ch in token.trim_start_matches('-').chars() {
        keys.push(match ch {
            '.' => Command::Dot,
            digit => Command::Digit(digit as u8 - b'0'),
        });
    }
    if negative {
        keys.push(Command::Unary(UnaryOp::Negate));
    }
    Some(keys)
}

/// Interactive loop state.
pub struct Repl {
    session: Session,
    quiet: bool,
}

impl Repl {
    pub fn new(quiet: bool) -> Self {
        Self {
            session: Session::new(),
            quiet,
        }
    }

    /// Consumes lines until end of input or a `quit` token.
    pub fn run(&mut self, input: impl BufRead) -> anyhow::Result<()> {
        for line in input.lines() {
            let line = line.context("reading input")?;
            let quitting = !self.run_line(&line);
            if quitting {
                break;
            }
            if !self.quiet {
                println!("{}", self.render());
            }
        }
        if self.quiet {
            println!("{}", self.session.display().screen_text);
        }
        Ok(())
    }

    /// Applies one line of tokens. Returns `false` when quitting.
    fn run_line(&mut self, line: &str) -> bool {
        for token in line.split_whitespace() {
            let Some(action) = parse_token(token) else {
                warn!(token, "unrecognised token");
                continue;
            };
            match action {
                Action::Quit => return false,
                Action::ShowMemory => self.show_memory(),
                Action::Keys(keys) => {
                    for key in keys {
                        // Errors already show on the screen; the loop keeps
                        // accepting keys, like the calculator itself.
                        if self.session.submit(key).is_err() {
                            break;
                        }
                    }
                }
            }
        }
        true
    }

    fn show_memory(&self) {
        if !self.session.has_memory() {
            println!("memory empty");
            return;
        }
        for (slot, value) in self.session.memory_snapshot().iter().enumerate() {
            println!("M{slot}: {value}");
        }
    }

    fn render(&self) -> String {
        let update = self.session.display();
        if update.equation_text.is_empty() {
            update.screen_text
        } else {
            format!("{}\n{}", update.equation_text, update.screen_text)
        }
    }
}
