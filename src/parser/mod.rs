//! Escape sequence parser
//!
//! A pure scanner that converts chunks of program output into console
//! operations: print runs with their styles, plus the control actions
//! recognised from CSI and single-character escape sequences. Parsing
//! never touches a buffer; executing the operations is the buffer's job.

mod op;
mod scanner;

pub use op::{ConsoleOperation, ControlAction, EraseMode};
pub use scanner::{contains_escapes, parse};
