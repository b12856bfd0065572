//! The memory register.
//!
//! An ordered list of stored values, most recent last. Store replaces the
//! most recent cell; add and subtract adjust it arithmetically. Memory
//! never validates against the overflow range and never touches the
//! calculation state.

use crate::value::DecimalValue;

#[derive(Debug, Default, Clone)]
pub struct MemoryRegister {
    cells: Vec<DecimalValue>,
}

impl MemoryRegister {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the most recent cell, creating it when the register is empty.
    pub fn store(&mut self, value: DecimalValue) {
        match self.cells.last_mut() {
            Some(top) => *top = value,
            None => self.cells.push(value),
        }
    }

    /// Adds to the most recent cell; an empty register counts as zero.
    pub fn add(&mut self, value: &DecimalValue) {
        match self.cells.last_mut() {
            Some(top) => *top = top.add(value),
            None => self.cells.push(value.clone()),
        }
    }

    /// Subtracts from the most recent cell; an empty register counts as zero.
    pub fn subtract(&mut self, value: &DecimalValue) {
        match self.cells.last_mut() {
            Some(top) => *top = top.sub(value),
            None => self.cells.push(value.neg()),
        }
    }

    /// The most recent cell, if any.
    pub fn recall(&self) -> Option<&DecimalValue> {
        self.cells.last()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn has_memory(&self) -> bool {
        !self.cells.is_empty()
    }

    /// Stored values, most recent first.
    pub fn snapshot(&self) -> Vec<DecimalValue> {
        self.cells.iter().rev().cloned().collect()
    }
}
