//! Render mirror
//!
//! The presentation layer keeps an ordered container of display handles,
//! one per segment. A chain drives that container through [`RenderMirror`]
//! so the mirror's entry count and order match the chain's at every
//! observation point. Every structural chain mutation performs its mirror
//! edit inside the same exclusive call, so a half-synchronized pair is
//! never observable.

use std::sync::mpsc::Sender;

use serde::{Deserialize, Serialize};

use super::style::Style;

/// Chain-facing surface of an ordered display container.
///
/// The chain calls these with exactly one entry per segment, in chain
/// order. Indices are always valid for the mirror's current length.
pub trait RenderMirror {
    /// A segment appeared at `index`.
    fn insert_at(&mut self, index: usize, text: &str, style: &Style);

    /// The segment at `index` changed content in place; order is unchanged.
    fn update_at(&mut self, index: usize, text: &str, style: &Style);

    /// The segment at `index` went away.
    fn remove_at(&mut self, index: usize);

    /// Number of mirrored entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory mirror of `(text, style)` entries.
///
/// This is what tests observe to verify mirror synchronization; a real
/// presentation layer would hold display nodes instead.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VecMirror {
    entries: Vec<(String, Style)>,
}

impl VecMirror {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[(String, Style)] {
        &self.entries
    }

    /// Entry texts in mirror order.
    pub fn texts(&self) -> Vec<&str> {
        self.entries.iter().map(|(text, _)| text.as_str()).collect()
    }
}

impl RenderMirror for VecMirror {
    fn insert_at(&mut self, index: usize, text: &str, style: &Style) {
        self.entries.insert(index, (text.to_owned(), *style));
    }

    fn update_at(&mut self, index: usize, text: &str, style: &Style) {
        self.entries[index] = (text.to_owned(), *style);
    }

    fn remove_at(&mut self, index: usize) {
        self.entries.remove(index);
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// One mirror edit, in the order the chain performed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MirrorEdit {
    Insert {
        index: usize,
        text: String,
        style: Style,
    },
    Update {
        index: usize,
        text: String,
        style: Style,
    },
    Remove {
        index: usize,
    },
}

impl MirrorEdit {
    /// Replay this edit against another mirror.
    pub fn apply(&self, mirror: &mut impl RenderMirror) {
        match self {
            MirrorEdit::Insert { index, text, style } => {
                mirror.insert_at(*index, text, style)
            }
            MirrorEdit::Update { index, text, style } => {
                mirror.update_at(*index, text, style)
            }
            MirrorEdit::Remove { index } => mirror.remove_at(*index),
        }
    }
}

/// Mirror that defers edits to another execution context over a channel.
///
/// Edits are enqueued inside the chain's critical section, so successive
/// updates for the same segment arrive serialized in mutation order. The
/// hand-off is fire-and-forget: a hung-up receiver drops edits without
/// failing the mutation.
#[derive(Debug)]
pub struct ChannelMirror {
    sender: Sender<MirrorEdit>,
    len: usize,
}

impl ChannelMirror {
    pub fn new(sender: Sender<MirrorEdit>) -> Self {
        Self { sender, len: 0 }
    }
}

impl RenderMirror for ChannelMirror {
    fn insert_at(&mut self, index: usize, text: &str, style: &Style) {
        self.len += 1;
        let _ = self.sender.send(MirrorEdit::Insert {
            index,
            text: text.to_owned(),
            style: *style,
        });
    }

    fn update_at(&mut self, index: usize, text: &str, style: &Style) {
        let _ = self.sender.send(MirrorEdit::Update {
            index,
            text: text.to_owned(),
            style: *style,
        });
    }

    fn remove_at(&mut self, index: usize) {
        self.len = self.len.saturating_sub(1);
        let _ = self.sender.send(MirrorEdit::Remove { index });
    }

    fn len(&self) -> usize {
        self.len
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;

    #[test]
    fn test_vec_mirror_ordered_edits() {
        let mut mirror = VecMirror::new();
        mirror.insert_at(0, "DEF", &Style::default());
        mirror.insert_at(0, "ABC", &Style::default());
        mirror.insert_at(1, "XY", &Style::default());
        assert_eq!(mirror.texts(), ["ABC", "XY", "DEF"]);

        mirror.update_at(1, "xy", &Style::default());
        assert_eq!(mirror.texts(), ["ABC", "xy", "DEF"]);

        mirror.remove_at(0);
        assert_eq!(mirror.texts(), ["xy", "DEF"]);
        assert_eq!(mirror.len(), 2);
    }

    #[test]
    fn test_channel_mirror_replays_in_order() {
        let (tx, rx) = mpsc::channel();
        let mut deferred = ChannelMirror::new(tx);
        let style = Style {
            bold: true,
            ..Style::default()
        };

        deferred.insert_at(0, "one", &Style::default());
        deferred.insert_at(1, "two", &style);
        deferred.update_at(0, "1", &Style::default());
        deferred.remove_at(1);
        assert_eq!(deferred.len(), 1);

        let mut replayed = VecMirror::new();
        while let Ok(edit) = rx.try_recv() {
            edit.apply(&mut replayed);
        }
        assert_eq!(replayed.texts(), ["1"]);
    }

    #[test]
    fn test_channel_mirror_survives_hangup() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let mut deferred = ChannelMirror::new(tx);
        deferred.insert_at(0, "lost", &Style::default());
        deferred.remove_at(0);
        assert_eq!(deferred.len(), 0);
    }
}
