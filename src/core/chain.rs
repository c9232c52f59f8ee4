//! Styled segment chains
//!
//! A line of terminal output is a linked chain of [`Segment`] runs anchored
//! by a single head segment. Chains own their nodes in a slot arena and
//! hand out stable [`SegmentId`] handles; splice operations rewire links
//! between slots instead of moving nodes, so handles held across edits keep
//! resolving until their segment is destroyed.
//!
//! Every chain carries a [`RenderMirror`] that receives one edit per
//! structural change, at the same index, inside the same call. The mirror
//! therefore always holds exactly one entry per segment, in chain order.
//!
//! Two positional write operations exist. `insert_run` splits the line at a
//! column and splices new text between the halves without losing anything.
//! `overwrite_run` replaces the characters under the new text, carving
//! prefix and suffix remainders out of the runs it lands on and consuming
//! whole runs when the text spans them; writing past the end of the line
//! extends the line.

use std::fmt;

use thiserror::Error;

use super::mirror::RenderMirror;
use super::segment::{Segment, SegmentId};
use super::style::Style;

/// Structural errors raised by chain edits.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ChainError {
    /// The handle is stale or belongs to a different line.
    #[error("segment handle does not belong to this line")]
    UnknownSegment,
    /// The column lies outside the addressable range of the line.
    #[error("column {column} is out of bounds for a line of length {length}")]
    ColumnOutOfBounds { column: usize, length: usize },
    /// A staged-segment argument is still linked into the line.
    #[error("segment is still linked into a line")]
    StillLinked,
    /// The edit would place a segment before the line's head anchor.
    #[error("cannot splice a segment before the head of a line")]
    BeforeHead,
}

/// A line's segment chain plus its render mirror.
#[derive(Debug)]
pub struct SegmentChain<M> {
    slots: Vec<Option<Segment>>,
    free: Vec<usize>,
    head: SegmentId,
    mirror: M,
}

impl<M: RenderMirror> SegmentChain<M> {
    /// Create an empty line: a single empty head segment, mirrored.
    pub fn new(mirror: M) -> Self {
        let mut chain = SegmentChain {
            slots: Vec::new(),
            free: Vec::new(),
            head: SegmentId(0),
            mirror,
        };
        let head = chain.alloc(Segment::head("", Style::default()));
        chain.head = head;
        chain.mirror.insert_at(0, "", &Style::default());
        chain
    }

    /// Append text at the end of the line, merging into the tail run when
    /// the style matches. Returns the run holding the appended text.
    pub fn append(&mut self, text: &str, style: Style) -> SegmentId {
        if text.is_empty() {
            return self.tail();
        }
        let tail = self.tail();
        if !self.node(tail).is_empty() && self.node(tail).style() == style {
            self.node_mut(tail).push_str(text);
            let idx = self.index_of(tail);
            self.mirror_refresh(idx, tail);
            return tail;
        }
        self.push_run(text, style)
    }

    /// Insert text at `position`, splitting the run found there. Nothing is
    /// overwritten; the line grows by the length of `text`. Columns up to
    /// and including the line length are valid.
    pub fn insert_run(
        &mut self,
        position: usize,
        text: &str,
        style: Style,
    ) -> Result<SegmentId, ChainError> {
        let length = self.line_len();
        if position > length {
            return Err(ChainError::ColumnOutOfBounds {
                column: position,
                length,
            });
        }
        if text.is_empty() {
            // Nothing to splice; report the run the position falls in.
            return Ok(if position == length {
                self.tail()
            } else {
                self.seek(position)?.0
            });
        }
        if position == length {
            return Ok(self.push_run(text, style));
        }
        let (target, offset) = self.seek(position)?;
        let idx = self.index_of(target);
        if offset == 0 {
            let new = self.alloc(Segment::body(text, style));
            if target == self.head {
                // The new run takes over head duty and the old head drops
                // in behind it.
                self.node_mut(target).demote();
                self.node_mut(new).promote();
                self.node_mut(new).next = Some(target);
                self.node_mut(target).prev = Some(new);
                self.head = new;
            } else {
                let before = self.node(target).prev;
                self.node_mut(new).prev = before;
                self.node_mut(new).next = Some(target);
                if let Some(before) = before {
                    self.node_mut(before).next = Some(new);
                }
                self.node_mut(target).prev = Some(new);
            }
            self.mirror.insert_at(idx, text, &style);
            return Ok(new);
        }
        // Split the target and slot the new run between the halves.
        let tail_text = self.node(target).chars_from(offset);
        let target_style = self.node(target).style();
        self.node_mut(target).truncate_chars(offset);
        self.mirror_refresh(idx, target);
        let new = self.alloc(Segment::body(text, style));
        let suffix = self.alloc(Segment::body(tail_text.as_str(), target_style));
        let after = self.node(target).next;
        self.node_mut(target).next = Some(new);
        self.node_mut(new).prev = Some(target);
        self.node_mut(new).next = Some(suffix);
        self.node_mut(suffix).prev = Some(new);
        self.node_mut(suffix).next = after;
        if let Some(after) = after {
            self.node_mut(after).prev = Some(suffix);
        }
        self.mirror.insert_at(idx + 1, text, &style);
        self.mirror.insert_at(idx + 2, &tail_text, &target_style);
        Ok(new)
    }

    /// Overwrite the characters starting at `position` with `text`. The
    /// runs underneath are carved up or consumed; text reaching past the
    /// end of the line extends it. Columns up to and including the line
    /// length are valid, and writing at the line length appends.
    pub fn overwrite_run(
        &mut self,
        position: usize,
        text: &str,
        style: Style,
    ) -> Result<SegmentId, ChainError> {
        let length = self.line_len();
        if position > length {
            return Err(ChainError::ColumnOutOfBounds {
                column: position,
                length,
            });
        }
        if text.is_empty() {
            return Ok(if position == length {
                self.tail()
            } else {
                self.seek(position)?.0
            });
        }
        if position == length {
            return Ok(self.push_run(text, style));
        }
        let (target, _) = self.seek(position)?;
        let start = self.start_of(target);
        let run = self.alloc(Segment::body(text, style));
        self.splice_core(target, start, position, run);
        Ok(run)
    }

    /// [`Self::overwrite_run`] starting the search at `node` instead of the
    /// head. The node is a hint; the write lands at the absolute column,
    /// walking left or right from the hint as needed.
    pub fn overwrite_at(
        &mut self,
        node: SegmentId,
        position: usize,
        text: &str,
        style: Style,
    ) -> Result<SegmentId, ChainError> {
        self.ensure_attached(node)?;
        let length = self.line_len();
        if position > length {
            return Err(ChainError::ColumnOutOfBounds {
                column: position,
                length,
            });
        }
        if text.is_empty() {
            return Ok(if position == length {
                self.tail()
            } else {
                self.seek(position)?.0
            });
        }
        if position == length {
            return Ok(self.push_run(text, style));
        }
        let mut target = node;
        let mut start = self.start_of(node);
        while position < start {
            match self.node(target).prev {
                Some(prev) => {
                    start -= self.node(prev).len();
                    target = prev;
                }
                None => {
                    return Err(ChainError::ColumnOutOfBounds {
                        column: position,
                        length,
                    })
                }
            }
        }
        loop {
            let len = self.node(target).len();
            if position <= start + len {
                break;
            }
            match self.node(target).next {
                Some(next) => {
                    start += len;
                    target = next;
                }
                None => {
                    return Err(ChainError::ColumnOutOfBounds {
                        column: position,
                        length,
                    })
                }
            }
        }
        let run = self.alloc(Segment::body(text, style));
        self.splice_core(target, start, position, run);
        Ok(run)
    }

    /// Core overwrite splice. `run` is a detached body segment landing at
    /// absolute column `position`; `target` is the run whose span the write
    /// begins in (or exactly after). Carved remainders keep the target's
    /// style. Overrun into the following segment recurses so the remainder
    /// is consumed there; overrun at the tail extends the line.
    fn splice_core(
        &mut self,
        target: SegmentId,
        target_start: usize,
        position: usize,
        run: SegmentId,
    ) {
        let t_len = self.node(target).len() as isize;
        let run_len = self.node(run).len() as isize;
        let prefix_len = position as isize - target_start as isize;
        let suffix_len = t_len - (prefix_len + run_len);
        let t_next = self.node(target).next;

        if prefix_len >= t_len {
            // The write begins exactly at the target's end.
            match t_next {
                Some(next) => {
                    let next_start = target_start + t_len as usize;
                    self.splice_core(next, next_start, position, run);
                }
                None => {
                    self.node_mut(target).next = Some(run);
                    self.node_mut(run).prev = Some(target);
                    let idx = self.index_of(run);
                    self.mirror_insert(idx, run);
                }
            }
            return;
        }

        if suffix_len < 0 {
            if let Some(next) = t_next {
                // The run spills past this target. Let the successor consume
                // the overrun and link the run in its place, then carve this
                // target's surviving prefix in front of it.
                let next_start = target_start + t_len as usize;
                self.splice_core(next, next_start, position, run);
                let idx = self.index_of(target);
                let t_prev = self.node(target).prev;
                let was_head = self.node(target).is_head();
                if prefix_len > 0 {
                    let kept = self.node(target).chars_to(prefix_len as usize);
                    let kept_style = self.node(target).style();
                    let prefix = self.alloc(Segment::body(kept.as_str(), kept_style));
                    self.node_mut(prefix).next = Some(run);
                    self.node_mut(run).prev = Some(prefix);
                    if was_head {
                        self.node_mut(prefix).promote();
                        self.head = prefix;
                    } else {
                        self.node_mut(prefix).prev = t_prev;
                        if let Some(prev) = t_prev {
                            self.node_mut(prev).next = Some(prefix);
                        }
                    }
                    self.release(target);
                    self.mirror.remove_at(idx);
                    self.mirror_insert(idx, prefix);
                } else {
                    if was_head {
                        self.node_mut(run).promote();
                        self.head = run;
                    } else {
                        self.node_mut(run).prev = t_prev;
                        if let Some(prev) = t_prev {
                            self.node_mut(prev).next = Some(run);
                        }
                    }
                    self.release(target);
                    self.mirror.remove_at(idx);
                }
                return;
            }
            // No successor to consume; the line extends under the run.
        }

        let t_style = self.node(target).style();
        let mut pieces = Vec::with_capacity(3);
        if prefix_len > 0 {
            let kept = self.node(target).chars_to(prefix_len as usize);
            pieces.push(self.alloc(Segment::body(kept.as_str(), t_style)));
        }
        pieces.push(run);
        if suffix_len > 0 {
            let kept = self.node(target).chars_from((prefix_len + run_len) as usize);
            pieces.push(self.alloc(Segment::body(kept.as_str(), t_style)));
        }
        self.replace_with(target, &pieces);
    }

    /// Replace `target` with a sequence of detached pieces, keeping links
    /// and mirror entries aligned. The first piece inherits head duty when
    /// the target was the head. `pieces` must be non-empty.
    fn replace_with(&mut self, target: SegmentId, pieces: &[SegmentId]) {
        let idx = self.index_of(target);
        let t_prev = self.node(target).prev;
        let t_next = self.node(target).next;
        let was_head = self.node(target).is_head();
        self.release(target);
        self.mirror.remove_at(idx);

        let first = pieces[0];
        if was_head {
            self.node_mut(first).promote();
            self.head = first;
        } else {
            self.node_mut(first).prev = t_prev;
            if let Some(prev) = t_prev {
                self.node_mut(prev).next = Some(first);
            }
        }
        for pair in pieces.windows(2) {
            self.node_mut(pair[0]).next = Some(pair[1]);
            self.node_mut(pair[1]).prev = Some(pair[0]);
        }
        let last = pieces[pieces.len() - 1];
        self.node_mut(last).next = t_next;
        if let Some(next) = t_next {
            self.node_mut(next).prev = Some(last);
        }
        for (k, &piece) in pieces.iter().enumerate() {
            self.mirror_insert(idx + k, piece);
        }
    }

    /// Remove a segment from the line. Removing the head promotes its
    /// successor; removing the last remaining segment empties the line,
    /// which always keeps its head anchor.
    pub fn remove_segment(&mut self, id: SegmentId) -> Result<(), ChainError> {
        self.ensure_attached(id)?;
        let idx = self.index_of(id);
        let next = self.node(id).next;
        if self.node(id).is_head() {
            match next {
                Some(next) => {
                    self.node_mut(next).promote();
                    self.head = next;
                    self.release(id);
                    self.mirror.remove_at(idx);
                }
                None => {
                    self.node_mut(id).set_content("", Style::default());
                    self.mirror_refresh(0, id);
                }
            }
        } else {
            let prev = self.node(id).prev;
            if let Some(prev) = prev {
                self.node_mut(prev).next = next;
            }
            if let Some(next) = next {
                self.node_mut(next).prev = prev;
            }
            self.release(id);
            self.mirror.remove_at(idx);
        }
        Ok(())
    }

    /// Splice a staged run into the line directly after `at`. Returns the
    /// first segment of the spliced run.
    pub fn append_chain(&mut self, at: SegmentId, sub: SegmentId) -> Result<SegmentId, ChainError> {
        self.ensure_attached(at)?;
        self.ensure_staged(sub)?;
        let pieces = self.staged_run(sub);
        let (first, last) = (pieces[0], pieces[pieces.len() - 1]);
        let after = self.node(at).next;
        self.node_mut(at).next = Some(first);
        self.node_mut(first).prev = Some(at);
        self.node_mut(last).next = after;
        if let Some(after) = after {
            self.node_mut(after).prev = Some(last);
        }
        let idx = self.index_of(at);
        for (k, &piece) in pieces.iter().enumerate() {
            self.mirror_insert(idx + 1 + k, piece);
        }
        Ok(first)
    }

    /// Splice a staged run into the line directly before `at`. The head
    /// anchor cannot be displaced, so `at` must not be the head.
    pub fn prepend_chain(
        &mut self,
        at: SegmentId,
        sub: SegmentId,
    ) -> Result<SegmentId, ChainError> {
        self.ensure_attached(at)?;
        if at == self.head {
            return Err(ChainError::BeforeHead);
        }
        self.ensure_staged(sub)?;
        let pieces = self.staged_run(sub);
        let (first, last) = (pieces[0], pieces[pieces.len() - 1]);
        let idx = self.index_of(at);
        let before = self.node(at).prev;
        self.node_mut(first).prev = before;
        if let Some(before) = before {
            self.node_mut(before).next = Some(first);
        }
        self.node_mut(last).next = Some(at);
        self.node_mut(at).prev = Some(last);
        for (k, &piece) in pieces.iter().enumerate() {
            self.mirror_insert(idx + k, piece);
        }
        Ok(first)
    }

    /// Replace `at` with a staged run. Replacing the head hands head duty
    /// to the run's first segment.
    pub fn replace_chain(
        &mut self,
        at: SegmentId,
        sub: SegmentId,
    ) -> Result<SegmentId, ChainError> {
        self.ensure_attached(at)?;
        self.ensure_staged(sub)?;
        let pieces = self.staged_run(sub);
        self.replace_with(at, &pieces);
        Ok(pieces[0])
    }

    /// Drop everything at and after `column`. Truncating at 0 clears the
    /// line; columns past the end are a no-op.
    pub fn truncate_from(&mut self, column: usize) -> Result<(), ChainError> {
        let length = self.line_len();
        if column >= length {
            return Ok(());
        }
        if column == 0 {
            self.clear();
            return Ok(());
        }
        let (target, offset) = self.seek(column)?;
        let mut idx = self.index_of(target);
        let first_removed;
        if offset > 0 {
            self.node_mut(target).truncate_chars(offset);
            self.mirror_refresh(idx, target);
            first_removed = self.node(target).next;
            self.node_mut(target).next = None;
            idx += 1;
        } else {
            first_removed = Some(target);
            let prev = self.node(target).prev;
            if let Some(prev) = prev {
                self.node_mut(prev).next = None;
            }
        }
        let mut cur = first_removed;
        while let Some(id) = cur {
            cur = self.node(id).next;
            self.release(id);
            self.mirror.remove_at(idx);
        }
        Ok(())
    }

    /// Reset the line to a single empty head.
    pub fn clear(&mut self) {
        let mut cur = self.node(self.head).next;
        self.node_mut(self.head).next = None;
        while let Some(id) = cur {
            cur = self.node(id).next;
            self.release(id);
            self.mirror.remove_at(1);
        }
        let head = self.head;
        self.node_mut(head).set_content("", Style::default());
        self.mirror_refresh(0, head);
    }

    /// Append a run at the tail without style merging. A lone empty head
    /// adopts the run instead of gaining a sibling.
    fn push_run(&mut self, text: &str, style: Style) -> SegmentId {
        let tail = self.tail();
        if self.node(tail).is_empty() {
            // Only the head may sit empty, and only while it is alone.
            self.node_mut(tail).set_content(text, style);
            let idx = self.index_of(tail);
            self.mirror_refresh(idx, tail);
            return tail;
        }
        let new = self.alloc(Segment::body(text, style));
        self.node_mut(tail).next = Some(new);
        self.node_mut(new).prev = Some(tail);
        let idx = self.index_of(new);
        self.mirror_insert(idx, new);
        new
    }

    fn mirror_refresh(&mut self, idx: usize, id: SegmentId) {
        let (text, style) = {
            let seg = self.node(id);
            (seg.text().to_owned(), seg.style())
        };
        self.mirror.update_at(idx, &text, &style);
    }

    fn mirror_insert(&mut self, idx: usize, id: SegmentId) {
        let (text, style) = {
            let seg = self.node(id);
            (seg.text().to_owned(), seg.style())
        };
        self.mirror.insert_at(idx, &text, &style);
    }
}

impl<M> SegmentChain<M> {
    /// Handle of the line's head anchor.
    pub fn head(&self) -> SegmentId {
        self.head
    }

    /// The chain's render mirror.
    pub fn mirror(&self) -> &M {
        &self.mirror
    }

    /// Resolve a handle, if it still points at a live segment.
    pub fn get(&self, id: SegmentId) -> Option<&Segment> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    /// Handle of the last segment in the line.
    pub fn tail(&self) -> SegmentId {
        let mut cur = self.head;
        while let Some(next) = self.node(cur).next {
            cur = next;
        }
        cur
    }

    /// Iterate the line's runs in order.
    pub fn iter(&self) -> Runs<'_, M> {
        Runs {
            chain: self,
            cursor: Some(self.head),
        }
    }

    /// The run texts in chain order.
    pub fn run_texts(&self) -> Vec<&str> {
        self.iter().map(|(_, seg)| seg.text()).collect()
    }

    /// Number of segments in the line, head included.
    pub fn segment_count(&self) -> usize {
        self.iter().count()
    }

    /// Line length in chars.
    pub fn line_len(&self) -> usize {
        self.iter().map(|(_, seg)| seg.len()).sum()
    }

    /// True when the line holds no text.
    pub fn is_empty(&self) -> bool {
        self.line_len() == 0
    }

    /// Rendered cell width of the whole line.
    pub fn display_width(&self) -> usize {
        self.iter().map(|(_, seg)| seg.display_width()).sum()
    }

    /// Zero-based position of a segment within the line.
    pub fn index_in_line(&self, id: SegmentId) -> Result<usize, ChainError> {
        self.ensure_attached(id)?;
        Ok(self.index_of(id))
    }

    /// Absolute column at which a segment's text begins.
    pub fn segment_start(&self, id: SegmentId) -> Result<usize, ChainError> {
        self.ensure_attached(id)?;
        Ok(self.start_of(id))
    }

    /// Locate the run containing `column`, returning the segment and the
    /// char offset within it. The column must be below the line length.
    pub fn seek(&self, column: usize) -> Result<(SegmentId, usize), ChainError> {
        let mut start = 0;
        for (id, seg) in self.iter() {
            let len = seg.len();
            if column < start + len {
                return Ok((id, column - start));
            }
            start += len;
        }
        Err(ChainError::ColumnOutOfBounds {
            column,
            length: start,
        })
    }

    /// Allocate a detached body segment for later splicing. Staged
    /// segments have no mirror entry until they are spliced in.
    pub fn stage(&mut self, text: &str, style: Style) -> SegmentId {
        self.alloc(Segment::body(text, style))
    }

    /// Extend a staged run: link a new segment after the tail of the run
    /// containing `prev`.
    pub fn stage_after(
        &mut self,
        prev: SegmentId,
        text: &str,
        style: Style,
    ) -> Result<SegmentId, ChainError> {
        self.ensure_staged(prev)?;
        let mut tail = prev;
        while let Some(next) = self.node(tail).next {
            tail = next;
        }
        let new = self.alloc(Segment::body(text, style));
        self.node_mut(tail).next = Some(new);
        self.node_mut(new).prev = Some(tail);
        Ok(new)
    }

    /// Collect a staged run from its first segment to its last, starting
    /// anywhere within it.
    fn staged_run(&self, member: SegmentId) -> Vec<SegmentId> {
        let mut first = member;
        while let Some(prev) = self.node(first).prev {
            first = prev;
        }
        let mut pieces = vec![first];
        let mut cur = first;
        while let Some(next) = self.node(cur).next {
            pieces.push(next);
            cur = next;
        }
        pieces
    }

    fn ensure_attached(&self, id: SegmentId) -> Result<(), ChainError> {
        if self.get(id).is_none() {
            return Err(ChainError::UnknownSegment);
        }
        if self.root_of(id) != self.head {
            return Err(ChainError::UnknownSegment);
        }
        Ok(())
    }

    fn ensure_staged(&self, id: SegmentId) -> Result<(), ChainError> {
        if self.get(id).is_none() {
            return Err(ChainError::UnknownSegment);
        }
        if self.root_of(id) == self.head {
            return Err(ChainError::StillLinked);
        }
        Ok(())
    }

    fn root_of(&self, id: SegmentId) -> SegmentId {
        let mut cur = id;
        while let Some(prev) = self.node(cur).prev {
            cur = prev;
        }
        cur
    }

    fn index_of(&self, id: SegmentId) -> usize {
        let mut count = 0;
        let mut cur = id;
        while let Some(prev) = self.node(cur).prev {
            count += 1;
            cur = prev;
        }
        count
    }

    fn start_of(&self, id: SegmentId) -> usize {
        let mut start = 0;
        let mut cur = id;
        while let Some(prev) = self.node(cur).prev {
            start += self.node(prev).len();
            cur = prev;
        }
        start
    }

    fn alloc(&mut self, seg: Segment) -> SegmentId {
        match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(seg);
                SegmentId(slot)
            }
            None => {
                self.slots.push(Some(seg));
                SegmentId(self.slots.len() - 1)
            }
        }
    }

    fn release(&mut self, id: SegmentId) {
        self.slots[id.0] = None;
        self.free.push(id.0);
    }

    fn node(&self, id: SegmentId) -> &Segment {
        match self.slots.get(id.0).and_then(Option::as_ref) {
            Some(seg) => seg,
            None => panic!("dangling segment handle: {:?}", id),
        }
    }

    fn node_mut(&mut self, id: SegmentId) -> &mut Segment {
        match self.slots.get_mut(id.0).and_then(Option::as_mut) {
            Some(seg) => seg,
            None => panic!("dangling segment handle: {:?}", id),
        }
    }
}

impl<M: RenderMirror + Default> Default for SegmentChain<M> {
    fn default() -> Self {
        SegmentChain::new(M::default())
    }
}

impl<M> fmt::Display for SegmentChain<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (_, seg) in self.iter() {
            f.write_str(seg.text())?;
        }
        Ok(())
    }
}

/// Forward iterator over a line's runs.
pub struct Runs<'a, M> {
    chain: &'a SegmentChain<M>,
    cursor: Option<SegmentId>,
}

impl<'a, M> Iterator for Runs<'a, M> {
    type Item = (SegmentId, &'a Segment);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        let seg = self.chain.get(id)?;
        self.cursor = seg.next();
        Some((id, seg))
    }
}
