//! Output Engine Core
//!
//! Platform-independent terminal output state. This module contains:
//! - Styled segment chains with stable handles and splice operations
//! - The style model and SGR attribute codec
//! - Render mirror synchronisation
//! - Packed cursor coordinates
//! - Deterministic snapshot generation
//!
//! The core is completely deterministic: the same sequence of operations
//! always produces the same chains, mirror edits, and snapshots.

mod chain;
mod cursor;
mod mirror;
mod segment;
pub mod sgr;
mod snapshot;
mod style;

pub use chain::{ChainError, Runs, SegmentChain};
pub use cursor::Cursor;
pub use mirror::{ChannelMirror, MirrorEdit, RenderMirror, VecMirror};
pub use segment::{Segment, SegmentId, SegmentKind};
pub use snapshot::{BufferSnapshot, CursorSnapshot, LineSnapshot, RunSnapshot};
pub use style::{Color, Style};
