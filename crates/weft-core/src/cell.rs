//! Cell type — a single terminal cell.

use unicode_width::UnicodeWidthChar;

use crate::style::Style;

/// A single cell in the screen buffer.
///
/// A default-constructed cell is a *hole*: `('\0', empty style, width 1)`.
/// Holes are painted as spaces at encode time. The cell immediately after a
/// width-2 rune is a *ghost* cell of width 0 and is never emitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    /// The codepoint displayed in this cell. `'\0'` marks a hole.
    pub ch: char,
    /// The style of this cell.
    pub style: Style,
    /// Display width: 1 for most characters, 2 for East-Asian-Wide
    /// glyphs, 0 for the ghost slot after a wide glyph.
    pub width: u8,
}

impl Default for Cell {
    fn default() -> Self {
        Self::hole()
    }
}

impl Cell {
    /// Create a new cell, computing the display width from the codepoint.
    ///
    /// Zero-width codepoints become ghost cells; `'\0'` stays a hole of
    /// width 1.
    pub fn new(ch: char, style: Style) -> Self {
        let width = display_width(ch);
        Self { ch, style, width }
    }

    /// Create a hole cell carrying a style but no glyph.
    pub fn hole() -> Self {
        Self {
            ch: '\0',
            style: Style::default(),
            width: 1,
        }
    }

    /// Create the zero-width ghost slot that follows a wide glyph.
    pub fn ghost(style: Style) -> Self {
        Self {
            ch: '\0',
            style,
            width: 0,
        }
    }

    /// Returns true for the zero-width slot after a wide glyph.
    pub fn is_ghost(&self) -> bool {
        self.width == 0
    }

    /// Returns true for East-Asian-Wide glyphs (width 2).
    pub fn is_wide(&self) -> bool {
        self.width == 2
    }

    /// Returns true if this is an unpainted hole (to be emitted as a space).
    pub fn is_hole(&self) -> bool {
        self.ch == '\0' && self.width == 1
    }
}

/// Display width of a codepoint on the terminal grid.
///
/// CJK blocks, Hangul, the BMP emoji ranges, and the supplementary CJK
/// planes are width 2 per the East-Asian-Wide table; control and combining
/// codepoints are width 0; everything else is width 1. `'\0'` is the hole
/// marker and keeps width 1.
pub fn display_width(ch: char) -> u8 {
    if ch == '\0' {
        return 1;
    }
    UnicodeWidthChar::width(ch).unwrap_or(0) as u8
}
