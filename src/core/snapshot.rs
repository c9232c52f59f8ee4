//! Point-in-time captures of buffer state
//!
//! Snapshots flatten live chains into plain serialisable values for
//! inspection, golden tests, and the dump binary. Capturing never mutates
//! the buffer, and the same input stream always produces an identical
//! snapshot.

use serde::{Deserialize, Serialize};

use super::chain::SegmentChain;
use super::style::Style;

/// One styled run within a captured line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSnapshot {
    pub text: String,
    #[serde(default, skip_serializing_if = "Style::is_plain")]
    pub style: Style,
}

/// A captured line: its runs in chain order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSnapshot {
    pub runs: Vec<RunSnapshot>,
}

impl LineSnapshot {
    /// Capture a chain's runs, head included.
    pub fn of_chain<M>(chain: &SegmentChain<M>) -> Self {
        let runs = chain
            .iter()
            .map(|(_, seg)| RunSnapshot {
                text: seg.text().to_owned(),
                style: seg.style(),
            })
            .collect();
        LineSnapshot { runs }
    }

    /// The line's text with styling stripped.
    pub fn text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }
}

/// Captured cursor position, zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorSnapshot {
    pub row: u16,
    pub column: u16,
}

/// A full buffer capture: every line, the cursor, and the pending style
/// the next write would use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BufferSnapshot {
    pub lines: Vec<LineSnapshot>,
    pub cursor: CursorSnapshot,
    #[serde(default, skip_serializing_if = "Style::is_plain")]
    pub style: Style,
}

impl BufferSnapshot {
    /// Serialise the capture as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse a capture back from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Render the capture as plain text, one line per buffer row.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for (row, line) in self.lines.iter().enumerate() {
            if row > 0 {
                out.push('\n');
            }
            out.push_str(&line.text());
        }
        out
    }
}
