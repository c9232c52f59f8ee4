//! Cursor state
//!
//! A cursor is a (row, column) pair packed into a single `u64`: row in bits
//! 0-11, column in bits 24-35. Both fields are 12 bits wide, so moves
//! saturate at 0 and at 4095. Values are immutable; every operation returns
//! the moved cursor.

/// 12-bit field mask shared by row and column.
const FIELD_MASK: u64 = 0xFFF;
const COLUMN_SHIFT: u64 = 24;

/// Packed (row, column) position, zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor(u64);

impl Cursor {
    /// Largest representable row or column.
    pub const MAX_FIELD: u16 = FIELD_MASK as u16;

    pub fn new(row: u16, column: u16) -> Self {
        let row = (row as u64).min(FIELD_MASK);
        let column = (column as u64).min(FIELD_MASK);
        Cursor(row | (column << COLUMN_SHIFT))
    }

    pub fn row(&self) -> u16 {
        (self.0 & FIELD_MASK) as u16
    }

    pub fn column(&self) -> u16 {
        ((self.0 >> COLUMN_SHIFT) & FIELD_MASK) as u16
    }

    pub fn with_row(self, row: u16) -> Self {
        Cursor::new(row, self.column())
    }

    pub fn with_column(self, column: u16) -> Self {
        Cursor::new(self.row(), column)
    }

    pub fn move_up(self, n: u16) -> Self {
        self.with_row(self.row().saturating_sub(n))
    }

    pub fn move_down(self, n: u16) -> Self {
        self.with_row(self.row().saturating_add(n))
    }

    pub fn move_forward(self, n: u16) -> Self {
        self.with_column(self.column().saturating_add(n))
    }

    pub fn move_back(self, n: u16) -> Self {
        self.with_column(self.column().saturating_sub(n))
    }
}
