//! Console Buffer Executor
//!
//! Ties together the parser and the line model: feeds input through the
//! scanner with the carried style, splices print runs into the cursor
//! line's chain, and applies control actions to the cursor. This is the
//! main integration point between parsing and the segment chains.
//!
//! The buffer grows downward on demand. A line exists once something has
//! been printed on its row; cursor motion alone never opens lines.
//! Writes land at the cursor column with overwrite semantics, the way a
//! terminal prints over existing cells, and a cursor parked past the end
//! of its line pads the gap with default-style spaces when the next write
//! arrives.

use tracing::debug;

use crate::core::{
    BufferSnapshot, Cursor, CursorSnapshot, LineSnapshot, RenderMirror, SegmentChain, Style,
};
use crate::parser::{contains_escapes, parse, ConsoleOperation, ControlAction, EraseMode};

/// Executor that owns the lines, cursor, and carried style.
pub struct ConsoleBuffer<M> {
    /// One chain per row, top to bottom.
    lines: Vec<SegmentChain<M>>,
    cursor: Cursor,
    /// Style the next print run will use; SGR resets restore it to the
    /// value it had when the current chunk began.
    style: Style,
}

impl<M: RenderMirror + Default> ConsoleBuffer<M> {
    /// Create an empty buffer: one empty line, cursor at the origin.
    pub fn new() -> Self {
        Self {
            lines: vec![SegmentChain::default()],
            cursor: Cursor::default(),
            style: Style::default(),
        }
    }

    /// Scan one chunk of output and apply every operation it contains.
    ///
    /// The style in force when the chunk ends is carried over as the
    /// starting style of the next call.
    pub fn process(&mut self, input: &str) {
        if !contains_escapes(input) {
            // Plain chunk; no scanning needed.
            self.print(input, self.style);
            return;
        }
        let (ops, style) = parse(input, &self.style);
        for op in ops {
            match op {
                ConsoleOperation::PrintOut { text, style } => self.print(&text, style),
                ConsoleOperation::Action(action) => self.apply_action(action),
            }
        }
        self.style = style;
    }

    /// Print text at the cursor, interpreting newlines and carriage
    /// returns between styled fragments.
    fn print(&mut self, text: &str, style: Style) {
        let mut fragment = String::new();
        for ch in text.chars() {
            match ch {
                '\n' => {
                    self.write_fragment(&fragment, style);
                    fragment.clear();
                    self.cursor = Cursor::new(self.cursor.row().saturating_add(1), 0);
                }
                '\r' => {
                    self.write_fragment(&fragment, style);
                    fragment.clear();
                    self.cursor = self.cursor.with_column(0);
                }
                ch => fragment.push(ch),
            }
        }
        self.write_fragment(&fragment, style);
    }

    /// Splice one fragment into the cursor line and advance the column.
    fn write_fragment(&mut self, text: &str, style: Style) {
        if text.is_empty() {
            return;
        }
        let row = self.cursor.row() as usize;
        let column = self.cursor.column() as usize;
        let line = self.line_mut(row);
        let length = line.line_len();
        if column >= length {
            if column > length {
                let pad = " ".repeat(column - length);
                line.append(&pad, Style::default());
            }
            line.append(text, style);
        } else if let Err(err) = line.overwrite_run(column, text, style) {
            debug!("Dropping write at column {}: {}", column, err);
        }
        let count = text.chars().count().min(u16::MAX as usize) as u16;
        self.cursor = self.cursor.move_forward(count);
    }

    /// Apply a single control action.
    fn apply_action(&mut self, action: ControlAction) {
        match action {
            ControlAction::CursorUp(n) => self.cursor = self.cursor.move_up(n),
            ControlAction::CursorDown(n) => self.cursor = self.cursor.move_down(n),
            ControlAction::CursorForward(n) => self.cursor = self.cursor.move_forward(n),
            ControlAction::CursorBack(n) => self.cursor = self.cursor.move_back(n),
            ControlAction::CursorNextLine(n) => {
                self.cursor = Cursor::new(self.cursor.row().saturating_add(n), 0);
            }
            ControlAction::CursorPreviousLine(n) => {
                self.cursor = Cursor::new(self.cursor.row().saturating_sub(n), 0);
            }
            // Escape text addresses are one-based.
            ControlAction::CursorColumn(n) => {
                self.cursor = self.cursor.with_column(n.max(1) - 1);
            }
            ControlAction::CursorPosition { row, column } => {
                self.cursor = Cursor::new(row.max(1) - 1, column.max(1) - 1);
            }
            ControlAction::EraseInLine(mode) => self.erase_in_line(mode),
            // Screen-level requests have no line-model meaning; recognise
            // and drop them.
            other => debug!("Ignoring screen-level action: {:?}", other),
        }
    }

    /// Erase within the cursor line. Rows nothing was printed on are left
    /// unopened.
    fn erase_in_line(&mut self, mode: EraseMode) {
        let row = self.cursor.row() as usize;
        let column = self.cursor.column() as usize;
        if row >= self.lines.len() {
            return;
        }
        let line = &mut self.lines[row];
        let result = match mode {
            EraseMode::ToEnd => line.truncate_from(column),
            EraseMode::ToBeginning => {
                let blank = column.min(line.line_len());
                if blank == 0 {
                    Ok(())
                } else {
                    line.overwrite_run(0, &" ".repeat(blank), Style::default())
                        .map(|_| ())
                }
            }
            EraseMode::All => {
                line.clear();
                Ok(())
            }
            // The scanner only emits scrollback erase for the display
            // form, which is screen-level and dropped above.
            EraseMode::Scrollback => Ok(()),
        };
        if let Err(err) = result {
            debug!("Erase in line at column {} failed: {}", column, err);
        }
    }

    /// The chain for `row`, opening lines up to it as needed.
    fn line_mut(&mut self, row: usize) -> &mut SegmentChain<M> {
        while self.lines.len() <= row {
            self.lines.push(SegmentChain::default());
        }
        &mut self.lines[row]
    }
}

impl<M: RenderMirror + Default> Default for ConsoleBuffer<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> ConsoleBuffer<M> {
    /// The chain for `row`, if anything has been printed on it.
    pub fn line(&self, row: usize) -> Option<&SegmentChain<M>> {
        self.lines.get(row)
    }

    /// Number of opened lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Style the next print run would use.
    pub fn style(&self) -> Style {
        self.style
    }

    /// Capture the whole buffer as plain serialisable data.
    pub fn snapshot(&self) -> BufferSnapshot {
        BufferSnapshot {
            lines: self.lines.iter().map(LineSnapshot::of_chain).collect(),
            cursor: CursorSnapshot {
                row: self.cursor.row(),
                column: self.cursor.column(),
            },
            style: self.style,
        }
    }
}
