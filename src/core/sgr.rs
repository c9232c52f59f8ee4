//! SGR codec
//!
//! Bidirectional mapping between numeric Select Graphic Rendition codes and
//! the [`Style`] model. `apply` consumes a code list left-to-right and
//! returns the resulting style; `params_for` and `serialise` go the other
//! way, producing the code list for a style and the escape text for a code
//! list.
//!
//! The codec never fails: codes outside the recognized table are skipped
//! (consuming their sub-parameters best-effort) so vendor and extension
//! codes cannot derail a stream.

use tracing::debug;

use super::style::{Color, Style};

/// Apply SGR codes to a style. Code `0` resets to `base` itself.
pub fn apply(base: &Style, codes: &[u16]) -> Style {
    apply_seeded(base, *base, codes)
}

/// Apply SGR codes to an accumulator seeded from `seed`, with code `0`
/// resetting to `reset` rather than to a blank style. The parser uses this
/// form: the seed is the style at CSI entry, the reset target is the
/// starting style of the whole parse call, so nested contexts inherit their
/// ambient style across a reset.
pub fn apply_seeded(reset: &Style, seed: Style, codes: &[u16]) -> Style {
    let mut style = seed;
    let mut i = 0;
    while i < codes.len() {
        match codes[i] {
            0 => style = *reset,
            1 => style.bold = true,
            2 => style.faint = true,
            3 => style.italic = true,
            4 => style.underline = true,
            5 => style.slow_blink = true,
            6 => style.rapid_blink = true,
            7 => style.reverse = true,
            8 => style.conceal = true,
            9 => style.strike = true,
            // Font selection carries no state in this model; the codes are
            // consumed so the rest of the list stays aligned.
            10..=19 => {}
            20 => style.fraktur = true,
            21 => style.double_underline = true,
            22 => {
                style.bold = false;
                style.faint = false;
            }
            23 => {
                style.italic = false;
                style.fraktur = false;
            }
            24 => {
                style.underline = false;
                style.double_underline = false;
            }
            25 => {
                style.slow_blink = false;
                style.rapid_blink = false;
            }
            27 => style.reverse = false,
            28 => style.conceal = false,
            29 => style.strike = false,
            30..=37 => {
                style.fg = Color::ThreeBit {
                    index: (codes[i] - 30) as u8,
                    bright: false,
                }
            }
            38 => {
                if let Some(color) = parse_extended_color(codes, &mut i) {
                    style.fg = color;
                }
            }
            39 => style.fg = Color::Default,
            40..=47 => {
                style.bg = Color::ThreeBit {
                    index: (codes[i] - 40) as u8,
                    bright: false,
                }
            }
            48 => {
                if let Some(color) = parse_extended_color(codes, &mut i) {
                    style.bg = color;
                }
            }
            49 => style.bg = Color::Default,
            // Underline colour takes the same argument shape as 38/48 but
            // has no field in the model; consume the arguments and move on.
            58 => {
                let skipped = parse_extended_color(codes, &mut i);
                debug!("Skipping underline colour SGR: {:?}", skipped);
            }
            90..=97 => {
                style.fg = Color::ThreeBit {
                    index: (codes[i] - 90) as u8,
                    bright: true,
                }
            }
            100..=107 => {
                style.bg = Color::ThreeBit {
                    index: (codes[i] - 100) as u8,
                    bright: true,
                }
            }
            other => {
                debug!("Skipping unsupported SGR code: {}", other);
            }
        }
        i += 1;
    }
    style
}

/// Parse an extended colour specification following a 38/48/58 code.
///
/// `i` points at the introducing code; on success it is advanced past the
/// consumed arguments. A malformed tail (unknown selector, missing
/// arguments) consumes nothing, so the remaining codes are reinterpreted
/// individually.
fn parse_extended_color(params: &[u16], i: &mut usize) -> Option<Color> {
    match params.get(*i + 1)? {
        5 => {
            let index = *params.get(*i + 2)?;
            *i += 2;
            Some(Color::EightBit(index.min(255) as u8))
        }
        2 => {
            if *i + 4 >= params.len() {
                return None;
            }
            let r = params[*i + 2].min(255) as u8;
            let g = params[*i + 3].min(255) as u8;
            let b = params[*i + 4].min(255) as u8;
            *i += 4;
            Some(Color::Rgb(r, g, b))
        }
        _ => None,
    }
}

/// The SGR codes that produce `style` when applied to a default style.
pub fn params_for(style: &Style) -> Vec<u16> {
    let mut codes = Vec::new();
    if style.bold {
        codes.push(1);
    }
    if style.faint {
        codes.push(2);
    }
    if style.italic {
        codes.push(3);
    }
    if style.underline {
        codes.push(4);
    }
    if style.slow_blink {
        codes.push(5);
    }
    if style.rapid_blink {
        codes.push(6);
    }
    if style.reverse {
        codes.push(7);
    }
    if style.conceal {
        codes.push(8);
    }
    if style.strike {
        codes.push(9);
    }
    if style.fraktur {
        codes.push(20);
    }
    if style.double_underline {
        codes.push(21);
    }
    push_color(&mut codes, style.fg, 30);
    push_color(&mut codes, style.bg, 40);
    codes
}

/// Push the codes selecting `color`, with `offset` 30 for foreground and 40
/// for background.
fn push_color(codes: &mut Vec<u16>, color: Color, offset: u16) {
    match color {
        Color::Default => {}
        Color::ThreeBit { index, bright } => {
            let base = if bright { offset + 60 } else { offset };
            codes.push(base + index.min(7) as u16);
        }
        Color::EightBit(index) => codes.extend([offset + 8, 5, index as u16]),
        Color::Rgb(r, g, b) => {
            codes.extend([offset + 8, 2, r as u16, g as u16, b as u16])
        }
    }
}

/// Render a code list as escape text: `ESC [ p1 ; p2 ; ... m`.
pub fn serialise(codes: &[u16]) -> String {
    let mut out = String::from("\x1b[");
    for (n, code) in codes.iter().enumerate() {
        if n > 0 {
            out.push(';');
        }
        out.push_str(&code.to_string());
    }
    out.push('m');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_codes_set() {
        let style = apply(&Style::default(), &[1, 3, 4, 9]);
        assert!(style.bold);
        assert!(style.italic);
        assert!(style.underline);
        assert!(style.strike);
        assert!(!style.faint);
    }

    #[test]
    fn test_off_codes_clear_pairs() {
        let on = apply(&Style::default(), &[1, 2, 4, 21, 3, 20, 5, 6]);
        assert!(on.bold && on.faint);

        let off = apply_seeded(&Style::default(), on, &[22]);
        assert!(!off.bold && !off.faint);

        let off = apply_seeded(&Style::default(), on, &[24]);
        assert!(!off.underline && !off.double_underline);

        let off = apply_seeded(&Style::default(), on, &[23]);
        assert!(!off.italic && !off.fraktur);

        let off = apply_seeded(&Style::default(), on, &[25]);
        assert!(!off.slow_blink && !off.rapid_blink);
    }

    #[test]
    fn test_reset_restores_starting_style() {
        let base = Style {
            italic: true,
            fg: Color::CYAN,
            ..Style::default()
        };
        let styled = apply(&base, &[1, 31]);
        assert!(styled.bold);
        assert_eq!(styled.fg, Color::RED);

        let reset = apply_seeded(&base, styled, &[0]);
        assert_eq!(reset, base);
    }

    #[test]
    fn test_three_bit_colors() {
        assert_eq!(apply(&Style::default(), &[31]).fg, Color::RED);
        assert_eq!(apply(&Style::default(), &[94]).fg, Color::bright(4));
        assert_eq!(apply(&Style::default(), &[42]).bg, Color::GREEN);
        assert_eq!(apply(&Style::default(), &[103]).bg, Color::bright(3));
    }

    #[test]
    fn test_default_color_codes() {
        let base = Style {
            fg: Color::RED,
            bg: Color::EightBit(17),
            ..Style::default()
        };
        let style = apply(&base, &[39, 49]);
        assert_eq!(style.fg, Color::Default);
        assert_eq!(style.bg, Color::Default);
    }

    #[test]
    fn test_extended_palette_color() {
        assert_eq!(apply(&Style::default(), &[38, 5, 208]).fg, Color::EightBit(208));
        assert_eq!(apply(&Style::default(), &[48, 5, 17]).bg, Color::EightBit(17));
    }

    #[test]
    fn test_extended_rgb_color() {
        let style = apply(&Style::default(), &[38, 2, 10, 20, 30]);
        assert_eq!(style.fg, Color::Rgb(10, 20, 30));
        let style = apply(&Style::default(), &[48, 2, 255, 0, 128]);
        assert_eq!(style.bg, Color::Rgb(255, 0, 128));
    }

    #[test]
    fn test_three_bit_replaces_extended() {
        let base = Style {
            fg: Color::Rgb(1, 2, 3),
            ..Style::default()
        };
        assert_eq!(apply(&base, &[31]).fg, Color::RED);
    }

    #[test]
    fn test_malformed_extended_tail_skips_introducer() {
        // The trailing 5 has no argument; it falls through to its flag
        // meaning once the 38 is skipped.
        let style = apply(&Style::default(), &[38, 5]);
        assert_eq!(style.fg, Color::Default);
        assert!(style.slow_blink);

        let style = apply(&Style::default(), &[38, 2, 10, 20]);
        assert_eq!(style.fg, Color::Default);
        assert!(style.faint);
    }

    #[test]
    fn test_unknown_codes_skipped() {
        let style = apply(&Style::default(), &[51, 1, 73]);
        assert!(style.bold);
        assert_eq!(
            style,
            Style {
                bold: true,
                ..Style::default()
            }
        );
    }

    #[test]
    fn test_underline_color_arguments_consumed() {
        let style = apply(&Style::default(), &[58, 2, 10, 20, 30, 1]);
        assert!(style.bold);
        assert_eq!(style.fg, Color::Default);
        assert_eq!(style.bg, Color::Default);
    }

    #[test]
    fn test_font_codes_consumed_silently() {
        let style = apply(&Style::default(), &[11, 1, 10]);
        assert_eq!(
            style,
            Style {
                bold: true,
                ..Style::default()
            }
        );
    }

    #[test]
    fn test_empty_code_list_is_identity() {
        let base = Style {
            reverse: true,
            ..Style::default()
        };
        assert_eq!(apply(&base, &[]), base);
    }

    #[test]
    fn test_params_round_trip() {
        let samples = [
            Style {
                bold: true,
                fg: Color::RED,
                ..Style::default()
            },
            Style {
                faint: true,
                conceal: true,
                bg: Color::Rgb(9, 8, 7),
                ..Style::default()
            },
            Style {
                double_underline: true,
                fg: Color::bright(2),
                bg: Color::EightBit(99),
                ..Style::default()
            },
            Style::default(),
        ];
        for style in samples {
            let codes = params_for(&style);
            assert_eq!(apply(&Style::default(), &codes), style, "codes {:?}", codes);
        }
    }

    #[test]
    fn test_serialise_text_form() {
        assert_eq!(serialise(&[1, 31]), "\x1b[1;31m");
        assert_eq!(serialise(&[38, 5, 208]), "\x1b[38;5;208m");
        assert_eq!(serialise(&[]), "\x1b[m");
    }
}
