//! Parsed output operations
//!
//! The scanner reduces an input stream to a flat list of
//! [`ConsoleOperation`]s: styled text to print, interleaved with control
//! actions in the order they appeared. Control actions carry their
//! parameters and can serialise themselves back to escape text.

use serde::{Deserialize, Serialize};

use crate::core::Style;

/// One parsed unit of terminal output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConsoleOperation {
    /// Text to print with the style in effect when it was scanned.
    PrintOut { text: String, style: Style },
    /// A non-printing control action.
    Action(ControlAction),
}

/// Target region of an erase action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EraseMode {
    /// From the cursor to the end of the line or display.
    ToEnd,
    /// From the beginning of the line or display to the cursor.
    ToBeginning,
    /// The whole line or display.
    All,
    /// The whole display plus scrollback. Display erase only.
    Scrollback,
}

impl EraseMode {
    /// Map a CSI parameter to an erase mode.
    pub fn from_param(param: u16) -> Option<EraseMode> {
        match param {
            0 => Some(EraseMode::ToEnd),
            1 => Some(EraseMode::ToBeginning),
            2 => Some(EraseMode::All),
            3 => Some(EraseMode::Scrollback),
            _ => None,
        }
    }

    /// The CSI parameter naming this mode.
    pub fn param(&self) -> u16 {
        match self {
            EraseMode::ToEnd => 0,
            EraseMode::ToBeginning => 1,
            EraseMode::All => 2,
            EraseMode::Scrollback => 3,
        }
    }
}

/// Control actions recognised by the scanner.
///
/// Cursor rows and columns are one-based here, exactly as they travel in
/// the escape sequences; the buffer converts to its zero-based space when
/// it executes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlAction {
    CursorUp(u16),
    CursorDown(u16),
    CursorForward(u16),
    CursorBack(u16),
    CursorNextLine(u16),
    CursorPreviousLine(u16),
    CursorColumn(u16),
    CursorPosition { row: u16, column: u16 },
    EraseInDisplay(EraseMode),
    EraseInLine(EraseMode),
    ScrollUp(u16),
    ScrollDown(u16),
    AuxPortOn,
    AuxPortOff,
    DeviceStatusReport,
    SingleShiftTwo,
    SingleShiftThree,
    DeviceControlString,
    StringTerminator,
    OperatingSystemCommand,
    StartOfString,
    PrivacyMessage,
    ApplicationProgramCommand,
    ResetToInitialState,
}

impl ControlAction {
    /// Write the action back out as escape text.
    pub fn serialise(&self) -> String {
        match self {
            ControlAction::CursorUp(n) => format!("\x1b[{n}A"),
            ControlAction::CursorDown(n) => format!("\x1b[{n}B"),
            ControlAction::CursorForward(n) => format!("\x1b[{n}C"),
            ControlAction::CursorBack(n) => format!("\x1b[{n}D"),
            ControlAction::CursorNextLine(n) => format!("\x1b[{n}E"),
            ControlAction::CursorPreviousLine(n) => format!("\x1b[{n}F"),
            ControlAction::CursorColumn(n) => format!("\x1b[{n}G"),
            ControlAction::CursorPosition { row, column } => format!("\x1b[{row};{column}H"),
            ControlAction::EraseInDisplay(mode) => format!("\x1b[{}J", mode.param()),
            ControlAction::EraseInLine(mode) => format!("\x1b[{}K", mode.param()),
            ControlAction::ScrollUp(n) => format!("\x1b[{n}S"),
            ControlAction::ScrollDown(n) => format!("\x1b[{n}T"),
            ControlAction::AuxPortOn => "\x1b[5i".to_string(),
            ControlAction::AuxPortOff => "\x1b[4i".to_string(),
            ControlAction::DeviceStatusReport => "\x1b[6n".to_string(),
            ControlAction::SingleShiftTwo => "\x1bN".to_string(),
            ControlAction::SingleShiftThree => "\x1bO".to_string(),
            ControlAction::DeviceControlString => "\x1bP".to_string(),
            ControlAction::StringTerminator => "\x1b\\".to_string(),
            ControlAction::OperatingSystemCommand => "\x1b]".to_string(),
            ControlAction::StartOfString => "\x1bX".to_string(),
            ControlAction::PrivacyMessage => "\x1b^".to_string(),
            ControlAction::ApplicationProgramCommand => "\x1b_".to_string(),
            ControlAction::ResetToInitialState => "\x1bc".to_string(),
        }
    }
}
