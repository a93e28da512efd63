//! Cell style: colors plus bit-encoded attributes, SGR emission, and the
//! transition state machine used by the output encoder.

use std::fmt::Write;

use bitflags::bitflags;

use crate::color::{Color, ColorSupport};

bitflags! {
    /// Text attribute bit set.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Attributes: u8 {
        /// Bold text (SGR 1).
        const BOLD = 1 << 0;
        /// Italic text (SGR 3).
        const ITALIC = 1 << 1;
        /// Underlined text (SGR 4).
        const UNDERLINE = 1 << 2;
        /// Blinking text (SGR 5).
        const BLINK = 1 << 3;
        /// Reverse video (SGR 7). Also marks the logical cursor cell.
        const REVERSE = 1 << 4;
        /// Strikethrough text (SGR 9).
        const STRIKETHROUGH = 1 << 5;
    }
}

/// Attribute flags in SGR emission order, paired with their codes.
const ATTR_CODES: [(Attributes, u8); 6] = [
    (Attributes::BOLD, 1),
    (Attributes::ITALIC, 3),
    (Attributes::UNDERLINE, 4),
    (Attributes::BLINK, 5),
    (Attributes::REVERSE, 7),
    (Attributes::STRIKETHROUGH, 9),
];

/// Style attributes for one cell.
///
/// Styles are immutable values: the `with_*` builders return a new style.
/// The empty style is the identity under [`Style::merge`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Style {
    /// Foreground color. `None` inherits the terminal default.
    pub fg: Option<Color>,
    /// Background color. `None` inherits the terminal default.
    pub bg: Option<Color>,
    /// Attribute bit set.
    pub attrs: Attributes,
}

impl Style {
    /// Create an empty style with no colors and no attributes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the foreground color.
    #[must_use]
    pub fn with_foreground(mut self, color: Color) -> Self {
        self.fg = Some(color);
        self
    }

    /// Set the background color.
    #[must_use]
    pub fn with_background(mut self, color: Color) -> Self {
        self.bg = Some(color);
        self
    }

    /// Set bold.
    #[must_use]
    pub fn with_bold(self, val: bool) -> Self {
        self.with_attr(Attributes::BOLD, val)
    }

    /// Set italic.
    #[must_use]
    pub fn with_italic(self, val: bool) -> Self {
        self.with_attr(Attributes::ITALIC, val)
    }

    /// Set underline.
    #[must_use]
    pub fn with_underline(self, val: bool) -> Self {
        self.with_attr(Attributes::UNDERLINE, val)
    }

    /// Set blink.
    #[must_use]
    pub fn with_blink(self, val: bool) -> Self {
        self.with_attr(Attributes::BLINK, val)
    }

    /// Set reverse video.
    #[must_use]
    pub fn with_reverse(self, val: bool) -> Self {
        self.with_attr(Attributes::REVERSE, val)
    }

    /// Set strikethrough.
    #[must_use]
    pub fn with_strikethrough(self, val: bool) -> Self {
        self.with_attr(Attributes::STRIKETHROUGH, val)
    }

    fn with_attr(mut self, attr: Attributes, val: bool) -> Self {
        self.attrs.set(attr, val);
        self
    }

    /// Returns true if bold is set.
    pub fn bold(&self) -> bool {
        self.attrs.contains(Attributes::BOLD)
    }

    /// Returns true if reverse video is set.
    pub fn reverse(&self) -> bool {
        self.attrs.contains(Attributes::REVERSE)
    }

    /// Returns true if the style has no colors and no attributes.
    pub fn is_empty(&self) -> bool {
        self.fg.is_none() && self.bg.is_none() && self.attrs.is_empty()
    }

    /// Merge another style on top of this one. The `other` style's set
    /// colors take priority; attributes are OR-combined.
    #[must_use]
    pub fn merge(&self, other: &Style) -> Style {
        Style {
            fg: other.fg.or(self.fg),
            bg: other.bg.or(self.bg),
            attrs: self.attrs | other.attrs,
        }
    }

    /// The SGR parameter list expressing this style from a reset state,
    /// downgraded to the given color support level.
    fn sgr_params(&self, support: ColorSupport) -> Vec<String> {
        let mut codes = Vec::new();
        for (attr, code) in ATTR_CODES {
            if self.attrs.contains(attr) {
                codes.push(code.to_string());
            }
        }
        if let Some(fg) = self.fg.and_then(|c| c.downgrade(support)) {
            codes.push(fg.fg_params());
        }
        if let Some(bg) = self.bg.and_then(|c| c.downgrade(support)) {
            codes.push(bg.bg_params());
        }
        codes
    }

    /// Emit the minimal combined SGR sequence expressing this style from a
    /// reset state (e.g. `\x1b[1;31m` for bold red). The empty style maps
    /// to the empty string, not `\x1b[0m`.
    pub fn to_escape_sequence(&self) -> String {
        self.escape_sequence_for(ColorSupport::TrueColor)
    }

    /// Like [`Self::to_escape_sequence`] with colors downgraded to the
    /// given support level.
    pub fn escape_sequence_for(&self, support: ColorSupport) -> String {
        let codes = self.sgr_params(support);
        if codes.is_empty() {
            String::new()
        } else {
            format!("\x1b[{}m", codes.join(";"))
        }
    }
}

/// Count the style axes that differ between two styles. Foreground,
/// background, and each attribute bit count as one axis each.
fn changed_axes(prev: &Style, next: &Style) -> usize {
    let mut n = usize::from(prev.fg != next.fg) + usize::from(prev.bg != next.bg);
    n += (prev.attrs ^ next.attrs).bits().count_ones() as usize;
    n
}

/// Returns true when `next` clears an attribute that `prev` had set.
/// SGR in the emitted repertoire has no per-attribute off codes, so a
/// cleared attribute forces a full reset.
fn clears_attribute(prev: &Style, next: &Style) -> bool {
    !(prev.attrs - next.attrs).is_empty()
}

/// Append the shortest SGR sequence taking the terminal from `prev` to
/// `next`.
///
/// The rules, in order:
/// - identical styles emit nothing;
/// - a transition to the empty style is the reset alone;
/// - clearing any attribute, or changing four or more axes, emits a full
///   reset followed by the complete new style;
/// - otherwise only the deltas are emitted (changed colors, newly set
///   attributes).
pub fn write_transition(out: &mut String, prev: &Style, next: &Style, support: ColorSupport) {
    if prev == next {
        return;
    }
    if next.is_empty() {
        out.push_str("\x1b[0m");
        return;
    }
    if clears_attribute(prev, next) || changed_axes(prev, next) >= 4 {
        if !prev.is_empty() {
            out.push_str("\x1b[0m");
        }
        out.push_str(&next.escape_sequence_for(support));
        return;
    }

    let mut codes = Vec::new();
    for (attr, code) in ATTR_CODES {
        if next.attrs.contains(attr) && !prev.attrs.contains(attr) {
            codes.push(code.to_string());
        }
    }
    // Compare post-downgrade so a NoColor sink never emits color codes.
    let prev_fg = prev.fg.and_then(|c| c.downgrade(support));
    let next_fg = next.fg.and_then(|c| c.downgrade(support));
    if prev_fg != next_fg {
        match next_fg {
            Some(fg) => codes.push(fg.fg_params()),
            None => codes.push("39".to_string()),
        }
    }
    let prev_bg = prev.bg.and_then(|c| c.downgrade(support));
    let next_bg = next.bg.and_then(|c| c.downgrade(support));
    if prev_bg != next_bg {
        match next_bg {
            Some(bg) => codes.push(bg.bg_params()),
            None => codes.push("49".to_string()),
        }
    }
    if !codes.is_empty() {
        let _ = write!(out, "\x1b[{}m", codes.join(";"));
    }
}

/// Convenience wrapper around [`write_transition`] returning a new string.
pub fn transition(prev: &Style, next: &Style, support: ColorSupport) -> String {
    let mut out = String::new();
    write_transition(&mut out, prev, next, support);
    out
}
