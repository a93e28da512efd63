//! Color types for terminal rendering.
//!
//! A color is either one of the 16 named ANSI colors, a 256-palette index,
//! or a 24-bit RGB value. "No color" (inherit / terminal default) is
//! expressed as `Option<Color>` on [`crate::style::Style`].

use crate::error::{Result, WeftCoreError};

/// A terminal color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Color {
    /// Named ANSI color.
    Named(NamedColor),
    /// 256-color palette index.
    Indexed(u8),
    /// True color RGB.
    Rgb {
        /// Red component.
        r: u8,
        /// Green component.
        g: u8,
        /// Blue component.
        b: u8,
    },
}

/// The 16 standard ANSI colors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum NamedColor {
    /// Black (0).
    Black,
    /// Red (1).
    Red,
    /// Green (2).
    Green,
    /// Yellow (3).
    Yellow,
    /// Blue (4).
    Blue,
    /// Magenta (5).
    Magenta,
    /// Cyan (6).
    Cyan,
    /// White (7).
    White,
    /// Bright black / dark gray (8).
    BrightBlack,
    /// Bright red (9).
    BrightRed,
    /// Bright green (10).
    BrightGreen,
    /// Bright yellow (11).
    BrightYellow,
    /// Bright blue (12).
    BrightBlue,
    /// Bright magenta (13).
    BrightMagenta,
    /// Bright cyan (14).
    BrightCyan,
    /// Bright white (15).
    BrightWhite,
}

impl Color {
    /// Parse a hex color string like `"#rrggbb"` or `"#rgb"`.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        match hex.len() {
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16)
                    .map_err(|e| WeftCoreError::Style(format!("invalid hex color: {e}")))?;
                let g = u8::from_str_radix(&hex[2..4], 16)
                    .map_err(|e| WeftCoreError::Style(format!("invalid hex color: {e}")))?;
                let b = u8::from_str_radix(&hex[4..6], 16)
                    .map_err(|e| WeftCoreError::Style(format!("invalid hex color: {e}")))?;
                Ok(Self::Rgb { r, g, b })
            }
            3 => {
                let r = u8::from_str_radix(&hex[0..1], 16)
                    .map_err(|e| WeftCoreError::Style(format!("invalid hex color: {e}")))?;
                let g = u8::from_str_radix(&hex[1..2], 16)
                    .map_err(|e| WeftCoreError::Style(format!("invalid hex color: {e}")))?;
                let b = u8::from_str_radix(&hex[2..3], 16)
                    .map_err(|e| WeftCoreError::Style(format!("invalid hex color: {e}")))?;
                Ok(Self::Rgb {
                    r: r * 17,
                    g: g * 17,
                    b: b * 17,
                })
            }
            _ => Err(WeftCoreError::Style(format!(
                "invalid hex color length: expected 3 or 6, got {}",
                hex.len()
            ))),
        }
    }

    /// Lighten the color toward white by `amount` in `[0.0, 1.0]`.
    ///
    /// Defined only for RGB colors; named and indexed colors are returned
    /// unchanged.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        match self {
            Self::Rgb { r, g, b } => {
                let t = amount.clamp(0.0, 1.0);
                Self::Rgb {
                    r: blend_channel(r, 255, t),
                    g: blend_channel(g, 255, t),
                    b: blend_channel(b, 255, t),
                }
            }
            other => other,
        }
    }

    /// Darken the color toward black by `amount` in `[0.0, 1.0]`.
    ///
    /// Defined only for RGB colors; named and indexed colors are returned
    /// unchanged.
    #[must_use]
    pub fn darken(self, amount: f32) -> Self {
        match self {
            Self::Rgb { r, g, b } => {
                let t = amount.clamp(0.0, 1.0);
                Self::Rgb {
                    r: blend_channel(r, 0, t),
                    g: blend_channel(g, 0, t),
                    b: blend_channel(b, 0, t),
                }
            }
            other => other,
        }
    }

    /// Interpolate from `self` toward `to` at progress `t` in `[0.0, 1.0]`.
    ///
    /// Only defined when both endpoints are RGB. For any other pairing the
    /// source color is returned below `t = 1.0` and the target at or above.
    #[must_use]
    pub fn lerp(self, to: Color, t: f32) -> Color {
        match (self, to) {
            (Self::Rgb { r, g, b }, Self::Rgb { r: r2, g: g2, b: b2 }) => {
                let t = t.clamp(0.0, 1.0);
                Self::Rgb {
                    r: blend_channel(r, r2, t),
                    g: blend_channel(g, g2, t),
                    b: blend_channel(b, b2, t),
                }
            }
            _ => {
                if t >= 1.0 {
                    to
                } else {
                    self
                }
            }
        }
    }

    /// Downgrade this color to the given support level.
    ///
    /// Returns `None` when the level is [`ColorSupport::NoColor`] (the
    /// color is stripped entirely).
    pub fn downgrade(self, support: ColorSupport) -> Option<Color> {
        match support {
            ColorSupport::TrueColor => Some(self),
            ColorSupport::Extended256 => match self {
                Self::Rgb { r, g, b } => Some(Self::Indexed(rgb_to_256(r, g, b))),
                other => Some(other),
            },
            ColorSupport::Basic16 => match self {
                Self::Rgb { r, g, b } => Some(Self::Named(rgb_to_named(r, g, b))),
                Self::Indexed(i) => Some(Self::Named(index_to_named(i))),
                other => Some(other),
            },
            ColorSupport::NoColor => None,
        }
    }

    /// SGR parameter list selecting this color as the foreground,
    /// e.g. `"31"`, `"38;5;42"`, or `"38;2;255;0;0"`.
    pub fn fg_params(self) -> String {
        match self {
            Self::Named(n) => n.fg_code().to_string(),
            Self::Indexed(i) => format!("38;5;{i}"),
            Self::Rgb { r, g, b } => format!("38;2;{r};{g};{b}"),
        }
    }

    /// SGR parameter list selecting this color as the background.
    pub fn bg_params(self) -> String {
        match self {
            Self::Named(n) => n.bg_code().to_string(),
            Self::Indexed(i) => format!("48;5;{i}"),
            Self::Rgb { r, g, b } => format!("48;2;{r};{g};{b}"),
        }
    }
}

impl NamedColor {
    /// SGR code selecting this color as the foreground (30-37, 90-97).
    pub const fn fg_code(self) -> u8 {
        match self {
            Self::Black => 30,
            Self::Red => 31,
            Self::Green => 32,
            Self::Yellow => 33,
            Self::Blue => 34,
            Self::Magenta => 35,
            Self::Cyan => 36,
            Self::White => 37,
            Self::BrightBlack => 90,
            Self::BrightRed => 91,
            Self::BrightGreen => 92,
            Self::BrightYellow => 93,
            Self::BrightBlue => 94,
            Self::BrightMagenta => 95,
            Self::BrightCyan => 96,
            Self::BrightWhite => 97,
        }
    }

    /// SGR code selecting this color as the background (40-47, 100-107).
    pub const fn bg_code(self) -> u8 {
        match self {
            Self::Black => 40,
            Self::Red => 41,
            Self::Green => 42,
            Self::Yellow => 43,
            Self::Blue => 44,
            Self::Magenta => 45,
            Self::Cyan => 46,
            Self::White => 47,
            Self::BrightBlack => 100,
            Self::BrightRed => 101,
            Self::BrightGreen => 102,
            Self::BrightYellow => 103,
            Self::BrightBlue => 104,
            Self::BrightMagenta => 105,
            Self::BrightCyan => 106,
            Self::BrightWhite => 107,
        }
    }
}

/// How many colors the output sink can express.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorSupport {
    /// 24-bit RGB.
    #[default]
    TrueColor,
    /// 256-color palette.
    Extended256,
    /// The 16 ANSI colors.
    Basic16,
    /// No color at all (e.g. `NO_COLOR` environments).
    NoColor,
}

/// Linear blend of one channel toward a target at `t` in `[0, 1]`.
fn blend_channel(from: u8, to: u8, t: f32) -> u8 {
    let f = f32::from(from);
    let delta = (f32::from(to) - f) * t;
    (f + delta).round().clamp(0.0, 255.0) as u8
}

/// Convert RGB to the nearest 256-color palette index.
///
/// The 256-color palette is:
/// - 0-7: standard colors
/// - 8-15: bright colors
/// - 16-231: 6x6x6 color cube
/// - 232-255: grayscale ramp
pub fn rgb_to_256(r: u8, g: u8, b: u8) -> u8 {
    if r == g && g == b {
        if r < 8 {
            return 16; // black corner of the cube
        }
        if r > 248 {
            return 231; // white corner of the cube
        }
        return (((u16::from(r) - 8) * 24 / 240) as u8) + 232;
    }

    let ri = color_cube_index(r);
    let gi = color_cube_index(g);
    let bi = color_cube_index(b);
    16 + 36 * ri + 6 * gi + bi
}

/// Map an 8-bit color channel to a 6-level color cube index.
fn color_cube_index(val: u8) -> u8 {
    if val < 48 {
        0
    } else if val < 115 {
        1
    } else {
        ((u16::from(val) - 35) / 40) as u8
    }
}

/// Convert RGB to the nearest named 16-color ANSI color by Euclidean distance.
pub fn rgb_to_named(r: u8, g: u8, b: u8) -> NamedColor {
    let candidates: [(NamedColor, (u8, u8, u8)); 16] = [
        (NamedColor::Black, (0, 0, 0)),
        (NamedColor::Red, (128, 0, 0)),
        (NamedColor::Green, (0, 128, 0)),
        (NamedColor::Yellow, (128, 128, 0)),
        (NamedColor::Blue, (0, 0, 128)),
        (NamedColor::Magenta, (128, 0, 128)),
        (NamedColor::Cyan, (0, 128, 128)),
        (NamedColor::White, (192, 192, 192)),
        (NamedColor::BrightBlack, (128, 128, 128)),
        (NamedColor::BrightRed, (255, 0, 0)),
        (NamedColor::BrightGreen, (0, 255, 0)),
        (NamedColor::BrightYellow, (255, 255, 0)),
        (NamedColor::BrightBlue, (0, 0, 255)),
        (NamedColor::BrightMagenta, (255, 0, 255)),
        (NamedColor::BrightCyan, (0, 255, 255)),
        (NamedColor::BrightWhite, (255, 255, 255)),
    ];

    let mut best = NamedColor::White;
    let mut best_dist = u32::MAX;
    for (name, (cr, cg, cb)) in &candidates {
        let dr = i32::from(r) - i32::from(*cr);
        let dg = i32::from(g) - i32::from(*cg);
        let db = i32::from(b) - i32::from(*cb);
        let dist = (dr * dr + dg * dg + db * db) as u32;
        if dist < best_dist {
            best_dist = dist;
            best = *name;
        }
    }
    best
}

/// Convert a 256-color index to the nearest named 16-color.
pub fn index_to_named(idx: u8) -> NamedColor {
    match idx {
        0 => NamedColor::Black,
        1 => NamedColor::Red,
        2 => NamedColor::Green,
        3 => NamedColor::Yellow,
        4 => NamedColor::Blue,
        5 => NamedColor::Magenta,
        6 => NamedColor::Cyan,
        7 => NamedColor::White,
        8 => NamedColor::BrightBlack,
        9 => NamedColor::BrightRed,
        10 => NamedColor::BrightGreen,
        11 => NamedColor::BrightYellow,
        12 => NamedColor::BrightBlue,
        13 => NamedColor::BrightMagenta,
        14 => NamedColor::BrightCyan,
        15 => NamedColor::BrightWhite,
        16..=231 => {
            // Color cube: convert index back to approximate RGB.
            let idx = idx - 16;
            let b_idx = idx % 6;
            let g_idx = (idx / 6) % 6;
            let r_idx = idx / 36;
            let r = if r_idx == 0 { 0 } else { 55 + 40 * r_idx };
            let g = if g_idx == 0 { 0 } else { 55 + 40 * g_idx };
            let b = if b_idx == 0 { 0 } else { 55 + 40 * b_idx };
            rgb_to_named(r, g, b)
        }
        _ => {
            // Grayscale ramp: 232-255 maps to 8, 18, ..., 238.
            let gray = 8 + 10 * (idx - 232);
            rgb_to_named(gray, gray, gray)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_6_digit() {
        let c = Color::from_hex("#1e1e2e").ok();
        assert_eq!(
            c,
            Some(Color::Rgb {
                r: 30,
                g: 30,
                b: 46
            })
        );
    }

    #[test]
    fn hex_3_digit() {
        let c = Color::from_hex("#f0a").ok();
        assert_eq!(
            c,
            Some(Color::Rgb {
                r: 255,
                g: 0,
                b: 170
            })
        );
    }

    #[test]
    fn hex_no_hash() {
        let c = Color::from_hex("ff0000").ok();
        assert_eq!(c, Some(Color::Rgb { r: 255, g: 0, b: 0 }));
    }

    #[test]
    fn hex_invalid() {
        assert!(Color::from_hex("#gg0000").is_err());
        assert!(Color::from_hex("#1234").is_err());
        assert!(Color::from_hex("").is_err());
    }

    #[test]
    fn lighten_moves_toward_white() {
        let c = Color::Rgb { r: 100, g: 100, b: 100 }.lighten(0.5);
        assert_eq!(
            c,
            Color::Rgb {
                r: 178,
                g: 178,
                b: 178
            }
        );
    }

    #[test]
    fn darken_moves_toward_black() {
        let c = Color::Rgb { r: 100, g: 100, b: 100 }.darken(0.5);
        assert_eq!(c, Color::Rgb { r: 50, g: 50, b: 50 });
    }

    #[test]
    fn lighten_named_is_identity() {
        let c = Color::Named(NamedColor::Red);
        assert_eq!(c.lighten(0.5), c);
        assert_eq!(c.darken(0.5), c);
    }

    #[test]
    fn lerp_rgb_midpoint() {
        let a = Color::Rgb { r: 0, g: 0, b: 0 };
        let b = Color::Rgb {
            r: 200,
            g: 100,
            b: 50,
        };
        assert_eq!(
            a.lerp(b, 0.5),
            Color::Rgb {
                r: 100,
                g: 50,
                b: 25
            }
        );
    }

    #[test]
    fn lerp_non_rgb_snaps() {
        let a = Color::Named(NamedColor::Red);
        let b = Color::Rgb { r: 0, g: 0, b: 0 };
        assert_eq!(a.lerp(b, 0.5), a);
        assert_eq!(a.lerp(b, 1.0), b);
    }

    #[test]
    fn fg_params_variants() {
        assert_eq!(Color::Named(NamedColor::Red).fg_params(), "31");
        assert_eq!(Color::Indexed(42).fg_params(), "38;5;42");
        assert_eq!(
            Color::Rgb {
                r: 255,
                g: 128,
                b: 0
            }
            .fg_params(),
            "38;2;255;128;0"
        );
    }

    #[test]
    fn bg_params_variants() {
        assert_eq!(Color::Named(NamedColor::Blue).bg_params(), "44");
        assert_eq!(Color::Named(NamedColor::BrightBlue).bg_params(), "104");
        assert_eq!(Color::Indexed(7).bg_params(), "48;5;7");
    }

    #[test]
    fn downgrade_truecolor_passthrough() {
        let c = Color::Rgb { r: 1, g: 2, b: 3 };
        assert_eq!(c.downgrade(ColorSupport::TrueColor), Some(c));
    }

    #[test]
    fn downgrade_to_256() {
        let c = Color::Rgb { r: 255, g: 0, b: 0 };
        assert_eq!(
            c.downgrade(ColorSupport::Extended256),
            Some(Color::Indexed(196))
        );
    }

    #[test]
    fn downgrade_to_16() {
        let c = Color::Rgb { r: 255, g: 0, b: 0 };
        assert_eq!(
            c.downgrade(ColorSupport::Basic16),
            Some(Color::Named(NamedColor::BrightRed))
        );
    }

    #[test]
    fn downgrade_no_color_strips() {
        let c = Color::Rgb { r: 255, g: 0, b: 0 };
        assert_eq!(c.downgrade(ColorSupport::NoColor), None);
    }

    #[test]
    fn rgb_to_256_pure_red() {
        // Pure red in color cube: r=5, g=0, b=0 -> 16 + 36*5 = 196
        assert_eq!(rgb_to_256(255, 0, 0), 196);
    }

    #[test]
    fn rgb_to_256_grayscale() {
        // (128-8)*24/240 = 12 -> 232 + 12 = 244
        assert_eq!(rgb_to_256(128, 128, 128), 244);
    }

    #[test]
    fn rgb_to_256_black() {
        assert_eq!(rgb_to_256(0, 0, 0), 16);
    }

    #[test]
    fn rgb_to_named_corners() {
        assert_eq!(rgb_to_named(255, 0, 0), NamedColor::BrightRed);
        assert_eq!(rgb_to_named(0, 0, 0), NamedColor::Black);
        assert_eq!(rgb_to_named(255, 255, 255), NamedColor::BrightWhite);
    }

    #[test]
    fn index_to_named_basic() {
        assert_eq!(index_to_named(1), NamedColor::Red);
        assert_eq!(index_to_named(15), NamedColor::BrightWhite);
    }
}
