//! Ansiloom
//!
//! A styled text-run engine for ANSI/VT escape streams. Raw characters go
//! in, styled editable text comes out:
//!
//! - `core`: style model, SGR codec, segment chains with render mirroring,
//!   cursor state, deterministic snapshots
//! - `parser`: escape sequence scanner producing print and cursor operations
//! - `buffer`: executor that applies parsed operations to a console buffer
//!
//! The engine is deterministic: given the same character stream and starting
//! style, it always produces the same operations and the same buffer state.

pub mod buffer;
pub mod core;
pub mod parser;
