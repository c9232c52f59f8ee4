//! Text rendition model
//!
//! `Style` is the immutable value type describing how a run of text is
//! rendered: a set of boolean rendition flags plus foreground and background
//! colours. Styles are produced by the SGR codec and attached to segments;
//! two styles are equal iff every field matches.

use serde::{Deserialize, Serialize};

/// Colour of a foreground or background.
///
/// `Default` inherits whatever the surrounding context renders as its
/// default colour rather than naming a concrete one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Color {
    /// Inherit the context's default colour
    #[default]
    Default,
    /// 3-bit colour index (0-7), optionally in its bright variant
    ThreeBit { index: u8, bright: bool },
    /// 8-bit xterm-256 palette index
    EightBit(u8),
    /// 24-bit RGB colour
    Rgb(u8, u8, u8),
}

impl Color {
    pub const BLACK: Color = Color::ThreeBit { index: 0, bright: false };
    pub const RED: Color = Color::ThreeBit { index: 1, bright: false };
    pub const GREEN: Color = Color::ThreeBit { index: 2, bright: false };
    pub const YELLOW: Color = Color::ThreeBit { index: 3, bright: false };
    pub const BLUE: Color = Color::ThreeBit { index: 4, bright: false };
    pub const MAGENTA: Color = Color::ThreeBit { index: 5, bright: false };
    pub const CYAN: Color = Color::ThreeBit { index: 6, bright: false };
    pub const WHITE: Color = Color::ThreeBit { index: 7, bright: false };

    /// The bright variant of a 3-bit index.
    pub fn bright(index: u8) -> Color {
        Color::ThreeBit {
            index,
            bright: true,
        }
    }

    /// True for `Color::Default`.
    pub fn is_default(&self) -> bool {
        matches!(self, Color::Default)
    }
}

/// Active text rendition: flags plus colours.
///
/// The flag vocabulary mirrors the SGR codes that set them (codes 1-9, 20
/// and 21). Off codes clear flags in pairs where SGR defines them that way;
/// see the codec in [`crate::core::sgr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Style {
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    /// Decreased intensity (SGR 2); cleared together with bold by SGR 22.
    #[serde(default, skip_serializing_if = "is_false")]
    pub faint: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub underline: bool,
    /// Doubly underlined (SGR 21); cleared together with underline by SGR 24.
    #[serde(default, skip_serializing_if = "is_false")]
    pub double_underline: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub slow_blink: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub rapid_blink: bool,
    /// Swap foreground and background (SGR 7).
    #[serde(default, skip_serializing_if = "is_false")]
    pub reverse: bool,
    /// Concealed text (SGR 8); revealed by SGR 28.
    #[serde(default, skip_serializing_if = "is_false")]
    pub conceal: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub strike: bool,
    /// Fraktur/blackletter rendition (SGR 20); cleared with italic by SGR 23.
    #[serde(default, skip_serializing_if = "is_false")]
    pub fraktur: bool,
    #[serde(default, skip_serializing_if = "Color::is_default")]
    pub fg: Color,
    #[serde(default, skip_serializing_if = "Color::is_default")]
    pub bg: Color,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl Style {
    /// A style with no flags set and default colours.
    pub fn new() -> Self {
        Self::default()
    }

    /// True if no flag is set and both colours are default.
    pub fn is_plain(&self) -> bool {
        *self == Self::default()
    }
}
