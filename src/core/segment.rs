//! Segment nodes
//!
//! A segment is one styled run of text in a line's chain. Segments live in
//! their chain's arena and are addressed by stable [`SegmentId`] handles;
//! splicing reassigns links between slots rather than moving nodes, so a
//! handle stays valid until its segment is destroyed.
//!
//! Column arithmetic is in Unicode scalar values (`char` count). Display
//! cell width is a separate query backed by `unicode-width`.

use unicode_width::UnicodeWidthChar;

use super::style::Style;

/// Stable handle to a segment slot in a chain's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SegmentId(pub(crate) usize);

/// Role of a segment within its chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// The unique anchor of a line; never has a previous link.
    Head,
    /// Interior or tail segment with both neighbors addressable.
    Body,
}

/// One styled text run.
#[derive(Debug, Clone)]
pub struct Segment {
    kind: SegmentKind,
    text: String,
    style: Style,
    pub(crate) prev: Option<SegmentId>,
    pub(crate) next: Option<SegmentId>,
}

impl Segment {
    pub(crate) fn head(text: impl Into<String>, style: Style) -> Self {
        Segment {
            kind: SegmentKind::Head,
            text: text.into(),
            style,
            prev: None,
            next: None,
        }
    }

    pub(crate) fn body(text: impl Into<String>, style: Style) -> Self {
        Segment {
            kind: SegmentKind::Body,
            text: text.into(),
            style,
            prev: None,
            next: None,
        }
    }

    pub fn kind(&self) -> SegmentKind {
        self.kind
    }

    pub fn is_head(&self) -> bool {
        self.kind == SegmentKind::Head
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn style(&self) -> Style {
        self.style
    }

    /// Length in chars, the unit of column arithmetic.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Rendered cell width of this run (wide characters count 2, control
    /// characters 0).
    pub fn display_width(&self) -> usize {
        self.text
            .chars()
            .map(|c| UnicodeWidthChar::width(c).unwrap_or(0))
            .sum()
    }

    pub fn prev(&self) -> Option<SegmentId> {
        self.prev
    }

    pub fn next(&self) -> Option<SegmentId> {
        self.next
    }

    pub(crate) fn promote(&mut self) {
        self.kind = SegmentKind::Head;
        self.prev = None;
    }

    pub(crate) fn demote(&mut self) {
        self.kind = SegmentKind::Body;
    }

    /// Byte offset of the char at `char_index` (text length when past the
    /// end).
    pub(crate) fn byte_index(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map(|(byte, _)| byte)
            .unwrap_or(self.text.len())
    }

    /// The first `count` chars.
    pub(crate) fn chars_to(&self, count: usize) -> String {
        self.text[..self.byte_index(count)].to_owned()
    }

    /// The chars from `char_index` to the end.
    pub(crate) fn chars_from(&self, char_index: usize) -> String {
        self.text[self.byte_index(char_index)..].to_owned()
    }

    /// Keep only the first `count` chars.
    pub(crate) fn truncate_chars(&mut self, count: usize) {
        let at = self.byte_index(count);
        self.text.truncate(at);
    }

    pub(crate) fn push_str(&mut self, text: &str) {
        self.text.push_str(text);
    }

    pub(crate) fn set_content(&mut self, text: &str, style: Style) {
        self.text.clear();
        self.text.push_str(text);
        self.style = style;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_length_not_byte_length() {
        let seg = Segment::body("héllo", Style::default());
        assert_eq!(seg.len(), 5);
        assert_eq!(seg.text().len(), 6);
    }

    #[test]
    fn test_char_carving() {
        let seg = Segment::body("naïveté", Style::default());
        assert_eq!(seg.chars_to(3), "naï");
        assert_eq!(seg.chars_from(3), "veté");
        assert_eq!(seg.chars_from(7), "");

        let mut seg = seg;
        seg.truncate_chars(5);
        assert_eq!(seg.text(), "naïve");
    }

    #[test]
    fn test_display_width_counts_cells() {
        let seg = Segment::body("ab", Style::default());
        assert_eq!(seg.display_width(), 2);
        // CJK characters occupy two cells but one column in chain space.
        let wide = Segment::body("本語", Style::default());
        assert_eq!(wide.len(), 2);
        assert_eq!(wide.display_width(), 4);
    }

    #[test]
    fn test_promote_clears_previous_link() {
        let mut seg = Segment::body("x", Style::default());
        seg.prev = Some(SegmentId(4));
        seg.promote();
        assert!(seg.is_head());
        assert_eq!(seg.prev(), None);

        seg.demote();
        assert_eq!(seg.kind(), SegmentKind::Body);
    }
}
