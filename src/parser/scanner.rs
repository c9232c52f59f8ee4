//! Escape Stream Scanner
//!
//! A mode-driven scanner that turns one chunk of program output into a
//! flat list of [`ConsoleOperation`]s. Plain text becomes print runs
//! carrying the style in force when they were read; escape sequences
//! become control actions or style changes that affect the runs after
//! them.
//!
//! # Modes
//!
//! The scanner keeps an explicit mode stack instead of a single state
//! variable so quoted text can nest:
//!
//! - Default: ordinary text with backslash escapes
//! - QuoteText: between `\Q` and `\E`, only backslash escapes apply
//! - Ansi: after an escape introducer, waiting for the sequence kind
//! - Csi: inside `ESC [`, collecting numeric parameters
//!
//! Escape sequences have two spellings that behave identically: the raw
//! ESC control character (0x1B) and the textual `\ESC`. Both end any
//! pending print run before the sequence is read.
//!
//! # Chunk boundaries
//!
//! A chunk is scanned as a unit. The style reached at the end of the
//! chunk is returned next to the operations so the caller can hand it
//! back as the starting style of the following chunk; SGR 0 resets to
//! that starting style, not to a global default.

use std::mem;

use tracing::debug;

use super::op::{ConsoleOperation, ControlAction, EraseMode};
use crate::core::sgr;
use crate::core::Style;

const ESC: char = '\x1b';

/// True if `text` contains either escape spelling the scanner reacts to.
///
/// Callers with mostly-plain traffic can skip the scanner for chunks
/// where this is false and print the whole chunk as one run.
pub fn contains_escapes(text: &str) -> bool {
    text.contains('\\') || text.contains(ESC)
}

/// Scan one chunk of output into operations.
///
/// `starting_style` is the style in force when the chunk begins; it is
/// also the style an SGR reset restores. Returns the operations in
/// input order and the style in force after the chunk, to be fed back
/// in for the next one.
pub fn parse(input: &str, starting_style: &Style) -> (Vec<ConsoleOperation>, Style) {
    Scanner::new(input, *starting_style).run()
}

/// Scanner mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Default,
    QuoteText,
    Ansi,
    Csi,
}

#[derive(Debug)]
struct Scanner {
    chars: Vec<char>,
    /// Mode stack; the last element is the active mode.
    modes: Vec<Mode>,
    ops: Vec<ConsoleOperation>,
    /// Print text accumulated since the last flush.
    text: String,
    /// Finished CSI parameters for the sequence being read.
    params: Vec<u16>,
    /// Current parameter being built.
    pending: u16,
    /// Whether the current parameter has seen a digit.
    param_has_digit: bool,
    /// Style the chunk began with; SGR 0 restores this.
    starting: Style,
    /// Style in force at the scan position.
    style: Style,
}

impl Scanner {
    fn new(input: &str, starting: Style) -> Self {
        Self {
            chars: input.chars().collect(),
            modes: vec![Mode::Default],
            ops: Vec::new(),
            text: String::new(),
            params: Vec::new(),
            pending: 0,
            param_has_digit: false,
            starting,
            style: starting,
        }
    }

    fn run(mut self) -> (Vec<ConsoleOperation>, Style) {
        let mut i = 0;
        while i < self.chars.len() {
            let mode = self.modes.last().copied().unwrap_or(Mode::Default);
            i = match mode {
                Mode::Default => self.scan_default(i),
                Mode::QuoteText => self.scan_quote(i),
                Mode::Ansi => self.scan_ansi(i),
                Mode::Csi => self.scan_csi(i),
            };
        }
        self.flush_text();
        (self.ops, self.style)
    }

    /// Ordinary text. Returns the index to continue from.
    fn scan_default(&mut self, i: usize) -> usize {
        match self.chars[i] {
            '\\' => match self.chars.get(i + 1) {
                Some('Q') => {
                    self.modes.push(Mode::QuoteText);
                    i + 2
                }
                // `\ESC` spells the escape introducer in text form. A
                // lone `\E` is not special here and prints an `E`.
                Some('E') => {
                    if self.chars.get(i + 2) == Some(&'S') && self.chars.get(i + 3) == Some(&'C') {
                        self.flush_text();
                        self.modes.push(Mode::Ansi);
                        i + 4
                    } else {
                        self.text.push('E');
                        i + 2
                    }
                }
                Some(&escaped) => self.scan_escape(escaped, i),
                None => {
                    self.text.push('\\');
                    i + 1
                }
            },
            ESC => {
                self.flush_text();
                self.modes.push(Mode::Ansi);
                i + 1
            }
            ch => {
                self.text.push(ch);
                i + 1
            }
        }
    }

    /// Inside `\Q .. \E`. Raw ESC is ordinary text here; only the
    /// backslash escapes apply, and `\E` ends the quote without the
    /// `SC` lookahead.
    fn scan_quote(&mut self, i: usize) -> usize {
        match self.chars[i] {
            '\\' => match self.chars.get(i + 1) {
                Some('Q') => {
                    self.modes.push(Mode::QuoteText);
                    i + 2
                }
                Some('E') => {
                    self.modes.pop();
                    i + 2
                }
                Some(&escaped) => self.scan_escape(escaped, i),
                None => {
                    self.text.push('\\');
                    i + 1
                }
            },
            ch => {
                self.text.push(ch);
                i + 1
            }
        }
    }

    /// Decode the backslash escapes shared by the default and quote
    /// modes. `i` points at the backslash; an unrecognised escape prints
    /// the escaped character itself.
    fn scan_escape(&mut self, escaped: char, i: usize) -> usize {
        match escaped {
            'u' => self.scan_unicode(i + 2),
            '\\' => {
                self.text.push('\\');
                i + 2
            }
            '/' => {
                self.text.push('/');
                i + 2
            }
            'b' => {
                self.text.push('\x08');
                i + 2
            }
            'f' => {
                self.text.push('\x0c');
                i + 2
            }
            'n' => {
                self.text.push('\n');
                i + 2
            }
            'r' => {
                self.text.push('\r');
                i + 2
            }
            't' => {
                self.text.push('\t');
                i + 2
            }
            other => {
                self.text.push(other);
                i + 2
            }
        }
    }

    /// Four hex digits after `\u`. `i` points at the first digit.
    fn scan_unicode(&mut self, i: usize) -> usize {
        let mut code: u32 = 0;
        for k in 0..4 {
            match self.chars.get(i + k).and_then(|c| c.to_digit(16)) {
                Some(digit) => code = code * 16 + digit,
                None => {
                    // Not a four-digit escape after all. Print the `u`
                    // and rescan what followed it as ordinary text.
                    self.text.push('u');
                    return i;
                }
            }
        }
        // Surrogate code points have no char; substitute U+FFFD.
        self.text.push(char::from_u32(code).unwrap_or('\u{fffd}'));
        i + 4
    }

    /// After the escape introducer, reading the sequence kind.
    fn scan_ansi(&mut self, i: usize) -> usize {
        match self.chars[i] {
            '[' => {
                if let Some(top) = self.modes.last_mut() {
                    *top = Mode::Csi;
                }
                self.params.clear();
                self.pending = 0;
                self.param_has_digit = false;
            }
            'N' => self.emit_action(ControlAction::SingleShiftTwo),
            'O' => self.emit_action(ControlAction::SingleShiftThree),
            'P' => self.emit_action(ControlAction::DeviceControlString),
            '\\' => self.emit_action(ControlAction::StringTerminator),
            ']' => self.emit_action(ControlAction::OperatingSystemCommand),
            'X' => self.emit_action(ControlAction::StartOfString),
            '^' => self.emit_action(ControlAction::PrivacyMessage),
            '_' => self.emit_action(ControlAction::ApplicationProgramCommand),
            'c' => self.emit_action(ControlAction::ResetToInitialState),
            other => {
                debug!("Unknown escape introducer: {:?}", other);
                self.modes.pop();
            }
        }
        i + 1
    }

    /// Inside `ESC [`. Digits build a parameter, `;` finishes one, and
    /// any other character is the sequence's final byte.
    fn scan_csi(&mut self, i: usize) -> usize {
        let ch = self.chars[i];
        match ch {
            '0'..='9' => {
                let digit = (ch as u8 - b'0') as u16;
                self.pending = self.pending.saturating_mul(10).saturating_add(digit);
                self.param_has_digit = true;
            }
            ';' => self.finish_param(),
            final_byte => {
                self.finish_trailing_param();
                self.dispatch_csi(final_byte);
            }
        }
        i + 1
    }

    /// Finish the parameter at a separator. An empty parameter is pushed
    /// as 0 so the parameters after it keep their positions.
    fn finish_param(&mut self) {
        self.params.push(self.pending);
        self.pending = 0;
        self.param_has_digit = false;
    }

    /// Finish the parameter before the final byte. A bare final keeps
    /// the list empty; once a separator has produced parameters, a
    /// trailing empty parameter is pushed as 0 like any other.
    fn finish_trailing_param(&mut self) {
        if self.param_has_digit || !self.params.is_empty() {
            self.params.push(self.pending);
        }
        self.pending = 0;
        self.param_has_digit = false;
    }

    fn dispatch_csi(&mut self, final_byte: char) {
        match final_byte {
            'A' => self.emit_action(ControlAction::CursorUp(self.param_or_default(0, 1))),
            'B' => self.emit_action(ControlAction::CursorDown(self.param_or_default(0, 1))),
            'C' => self.emit_action(ControlAction::CursorForward(self.param_or_default(0, 1))),
            'D' => self.emit_action(ControlAction::CursorBack(self.param_or_default(0, 1))),
            'E' => self.emit_action(ControlAction::CursorNextLine(self.param_or_default(0, 1))),
            'F' => {
                self.emit_action(ControlAction::CursorPreviousLine(self.param_or_default(0, 1)))
            }
            'G' => self.emit_action(ControlAction::CursorColumn(self.param_or_default(0, 1))),
            // HVP (`f`) positions exactly like CUP.
            'H' | 'f' => self.emit_action(ControlAction::CursorPosition {
                row: self.param_or_default(0, 1),
                column: self.param_or_default(1, 1),
            }),
            'J' => match EraseMode::from_param(self.param(0, 0)) {
                Some(mode) => self.emit_action(ControlAction::EraseInDisplay(mode)),
                None => self.drop_frame(final_byte),
            },
            // Scrollback erase exists only for the display.
            'K' => match EraseMode::from_param(self.param(0, 0)) {
                Some(EraseMode::Scrollback) | None => self.drop_frame(final_byte),
                Some(mode) => self.emit_action(ControlAction::EraseInLine(mode)),
            },
            'S' => self.emit_action(ControlAction::ScrollUp(self.param_or_default(0, 1))),
            'T' => self.emit_action(ControlAction::ScrollDown(self.param_or_default(0, 1))),
            'i' => match self.param(0, 0) {
                5 => self.emit_action(ControlAction::AuxPortOn),
                4 => self.emit_action(ControlAction::AuxPortOff),
                _ => self.drop_frame(final_byte),
            },
            'n' => match self.param(0, 0) {
                6 => self.emit_action(ControlAction::DeviceStatusReport),
                _ => self.drop_frame(final_byte),
            },
            'm' => {
                // A bare `ESC[m` resets; otherwise the codes rewrite the
                // current style, with SGR 0 restoring the chunk's
                // starting style.
                self.style = if self.params.is_empty() {
                    self.starting
                } else {
                    sgr::apply_seeded(&self.starting, self.style, &self.params)
                };
                self.modes.pop();
            }
            other => self.drop_frame(other),
        }
    }

    /// Discard the sequence without emitting an operation.
    fn drop_frame(&mut self, final_byte: char) {
        debug!("Unhandled CSI sequence: {:?} {:?}", self.params, final_byte);
        self.modes.pop();
    }

    fn emit_action(&mut self, action: ControlAction) {
        self.ops.push(ConsoleOperation::Action(action));
        self.modes.pop();
    }

    fn param(&self, index: usize, default: u16) -> u16 {
        self.params.get(index).copied().unwrap_or(default)
    }

    /// Parameter at `index`, treating zero as the default. Counts and
    /// positions resolve this way; erase modes and selector codes read
    /// zero literally through [`Self::param`].
    fn param_or_default(&self, index: usize, default: u16) -> u16 {
        match self.params.get(index) {
            Some(&0) | None => default,
            Some(&value) => value,
        }
    }

    fn flush_text(&mut self) {
        if !self.text.is_empty() {
            self.ops.push(ConsoleOperation::PrintOut {
                text: mem::take(&mut self.text),
                style: self.style,
            });
        }
    }
}
