//! Output encoder: turns a frame diff into a minimal escape-code stream.
//!
//! The encoder walks dirty cells in row-major order, coalescing style
//! transitions through the style state machine and eliding cursor moves
//! between adjacent cells. It also tracks the logical cursor (the
//! reverse-styled cell) across frames so a moved cursor always repaints
//! both its old and new positions.

use std::fmt::Write;

use crate::buffer::Buffer;
use crate::color::ColorSupport;
use crate::diff::DirtyResult;
use crate::geometry::Position;
use crate::style::{Style, write_transition};

/// Encodes frame diffs into terminal escape sequences.
#[derive(Debug)]
pub struct Encoder {
    color_support: ColorSupport,
    first_frame: bool,
    last_cursor: Option<Position>,
}

impl Encoder {
    /// Create a new encoder. The first encoded frame is prefixed with
    /// clear-screen and hide-cursor.
    pub fn new(color_support: ColorSupport) -> Self {
        Self {
            color_support,
            first_frame: true,
            last_cursor: None,
        }
    }

    /// An encoder that never emits the first-frame clear/hide prefix.
    /// Compositor layers use this: clearing the screen is the owner's
    /// decision, not an individual surface's.
    pub fn without_clear(color_support: ColorSupport) -> Self {
        Self {
            color_support,
            first_frame: false,
            last_cursor: None,
        }
    }

    /// Returns true if the next frame is treated as the first.
    pub fn is_first_frame(&self) -> bool {
        self.first_frame
    }

    /// Drop cursor tracking without forcing a full repaint.
    pub fn forget_cursor(&mut self) {
        self.last_cursor = None;
    }

    /// Force the next frame to be treated as the first (clear + full
    /// repaint). Used to escalate after a render error.
    pub fn invalidate(&mut self) {
        self.first_frame = true;
        self.last_cursor = None;
    }

    /// Encode the dirty cells of `buffer` into an escape-code stream.
    ///
    /// Cells inside the dirty regions are emitted in (row, column) order
    /// with minimal cursor movement and style transitions. The stream is
    /// terminated with a style reset and a cursor move to the bottom-left
    /// so the cursor never rests inside live content.
    pub fn encode(&mut self, buffer: &Buffer, dirty: &DirtyResult) -> String {
        self.encode_at(buffer, dirty, Position::new(0, 0))
    }

    /// Like [`Self::encode`], with every emitted coordinate shifted by
    /// `origin`. Used by the compositor to drive a layer whose buffer is
    /// in layer-local coordinates.
    pub fn encode_at(&mut self, buffer: &Buffer, dirty: &DirtyResult, origin: Position) -> String {
        let mut coords: Vec<(u16, u16)> = Vec::new();
        for region in &dirty.regions {
            for y in region.y()..region.bottom().min(buffer.height()) {
                for x in region.x()..region.right().min(buffer.width()) {
                    coords.push((x, y));
                }
            }
        }

        // Cursor tracking: the reverse-styled cell is the logical cursor.
        // When it moves, both the old and the new position are refreshed
        // even if their cells compare equal, so the old inversion clears.
        let cursor = find_cursor(buffer);
        if cursor != self.last_cursor {
            tracing::trace!(?cursor, previous = ?self.last_cursor, "cursor moved");
            if let Some(old) = self.last_cursor {
                if old.x < buffer.width() && old.y < buffer.height() {
                    coords.push((old.x, old.y));
                }
            }
            if let Some(new) = cursor {
                coords.push((new.x, new.y));
            }
            self.last_cursor = cursor;
        }

        if coords.is_empty() && !self.first_frame {
            return String::new();
        }

        coords.sort_unstable_by_key(|&(x, y)| (y, x));
        coords.dedup();

        let mut out = String::with_capacity(coords.len() * 8 + 16);
        if self.first_frame {
            out.push_str("\x1b[2J\x1b[?25l");
            self.first_frame = false;
        }

        self.write_cells(&mut out, buffer, &coords, origin);

        out.push_str("\x1b[0m");
        if buffer.height() > 0 {
            let _ = write!(out, "\x1b[{};1H", origin.y + buffer.height());
        }
        out
    }

    /// Direct full-frame path: unconditionally rewrite the whole buffer
    /// from the top-left, regardless of what changed.
    pub fn encode_full(&mut self, buffer: &Buffer) -> String {
        let mut out = String::with_capacity(buffer.size().area() as usize * 4 + 16);
        if self.first_frame {
            out.push_str("\x1b[2J\x1b[?25l");
            self.first_frame = false;
        }
        self.last_cursor = find_cursor(buffer);

        let mut coords = Vec::with_capacity(buffer.size().area() as usize);
        for y in 0..buffer.height() {
            for x in 0..buffer.width() {
                coords.push((x, y));
            }
        }
        self.write_cells(&mut out, buffer, &coords, Position::new(0, 0));

        out.push_str("\x1b[0m");
        if buffer.height() > 0 {
            let _ = write!(out, "\x1b[{};1H", buffer.height());
        }
        out
    }

    /// Emit the given cells, assumed sorted by (row, column), with
    /// emitted coordinates shifted by `origin`.
    fn write_cells(&self, out: &mut String, buffer: &Buffer, coords: &[(u16, u16)], origin: Position) {
        let mut current_style = Style::default();
        let mut last_x: Option<u16> = None;
        let mut last_y: Option<u16> = None;

        for &(x, y) in coords {
            let Some(cell) = buffer.get(x, y) else {
                continue;
            };
            // Ghost slots never produce output; the wide glyph before
            // them already advanced the cursor over this column.
            if cell.is_ghost() {
                continue;
            }

            match (last_x, last_y) {
                (Some(lx), Some(ly)) if ly == y => {
                    if x > lx {
                        // Forward gaps are bridged with cursor-right so
                        // the clean cells in between stay untouched.
                        for _ in 0..(x - lx) {
                            out.push_str("\x1b[C");
                        }
                    } else if x < lx {
                        let _ = write!(out, "\x1b[{};{}H", origin.y + y + 1, origin.x + x + 1);
                    }
                }
                _ => {
                    let _ = write!(out, "\x1b[{};{}H", origin.y + y + 1, origin.x + x + 1);
                }
            }

            write_transition(out, &current_style, &cell.style, self.color_support);
            current_style = cell.style;

            out.push(if cell.ch == '\0' { ' ' } else { cell.ch });

            last_x = Some(x + u16::from(cell.width));
            last_y = Some(y);
        }
    }
}

/// Locate the logical cursor: the first reverse-styled cell in row-major
/// order.
fn find_cursor(buffer: &Buffer) -> Option<Position> {
    for y in 0..buffer.height() {
        let row = buffer.row(y)?;
        for (x, cell) in row.iter().enumerate() {
            if cell.style.reverse() && !cell.is_ghost() {
                return Some(Position::new(x as u16, y));
            }
        }
    }
    None
}
