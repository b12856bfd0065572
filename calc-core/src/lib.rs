pub mod editor;
pub mod engine;
pub mod error;
pub mod format;
pub mod memory;
pub mod session;
pub mod value;

pub use engine::{BinaryOp, CalculationEngine, UnaryOp};
pub use error::CalcError;
pub use session::{Command, DisplayUpdate, Session};
pub use value::DecimalValue;
