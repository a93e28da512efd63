//! Paint phase: clipped cell emission for the laid-out tree.
//!
//! Paint order follows tree order, children over parents. Borders and
//! padding are drawn by shared helpers; every component write goes
//! through the clipped [`PaintContext`] so nothing escapes the node's
//! rect. A panic inside one component's paint is confined to that
//! subtree: its cells simply keep whatever the previous frame showed.

use std::cell::Cell as StateCell;
use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::buffer::Buffer;
use crate::cell::display_width;
use crate::component::FocusPath;
use crate::geometry::{Position, Rect};
use crate::layout::{BorderEdges, LayoutNode};
use crate::style::Style;
use crate::theme;

/// Border glyph sets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BorderKind {
    /// Single light lines.
    #[default]
    Normal,
    /// Light lines with rounded corners.
    Rounded,
    /// Double lines.
    Double,
    /// Heavy lines.
    Thick,
    /// Dashed light lines.
    Dashed,
    /// Dotted light lines.
    Dotted,
    /// Occupies the border cells but paints only spaces.
    Hidden,
}

/// Border character set: (top-left, top-right, bottom-left, bottom-right,
/// horizontal, vertical).
pub type BorderChars = (char, char, char, char, char, char);

impl BorderKind {
    /// The box-drawing characters for this border kind.
    pub const fn chars(self) -> BorderChars {
        match self {
            Self::Normal => ('\u{250c}', '\u{2510}', '\u{2514}', '\u{2518}', '\u{2500}', '\u{2502}'),
            Self::Rounded => ('\u{256d}', '\u{256e}', '\u{2570}', '\u{256f}', '\u{2500}', '\u{2502}'),
            Self::Double => ('\u{2554}', '\u{2557}', '\u{255a}', '\u{255d}', '\u{2550}', '\u{2551}'),
            Self::Thick => ('\u{250f}', '\u{2513}', '\u{2517}', '\u{251b}', '\u{2501}', '\u{2503}'),
            Self::Dashed => ('\u{250c}', '\u{2510}', '\u{2514}', '\u{2518}', '\u{254c}', '\u{254e}'),
            Self::Dotted => ('\u{250c}', '\u{2510}', '\u{2514}', '\u{2518}', '\u{2504}', '\u{2506}'),
            Self::Hidden => (' ', ' ', ' ', ' ', ' ', ' '),
        }
    }
}

/// Accumulates the cells a paint pass wrote.
///
/// The paint context notifies the tracker on every write its clip
/// admits, keeping a running bounding region and cell count. Interior
/// mutability lets many contexts share one tracker during a single
/// traversal.
#[derive(Debug, Default)]
pub struct DirtyTracker {
    region: StateCell<Option<Rect>>,
    cells: StateCell<usize>,
}

impl DirtyTracker {
    /// An empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one cell write. Wide glyphs count their ghost slot too.
    pub fn note_cell(&self, x: u16, y: u16, width: u8) {
        let width = u16::from(width.max(1));
        self.note_rect(Rect::new(x, y, width, 1));
    }

    /// Record a rectangular write.
    pub fn note_rect(&self, rect: Rect) {
        if rect.is_empty() {
            return;
        }
        let merged = match self.region.get() {
            Some(region) => region.union(&rect),
            None => rect,
        };
        self.region.set(Some(merged));
        self.cells.set(self.cells.get() + rect.area() as usize);
    }

    /// Bounding region of everything written, if anything was.
    pub fn region(&self) -> Option<Rect> {
        self.region.get()
    }

    /// Total cells written (a cell written twice counts twice).
    pub fn cell_count(&self) -> usize {
        self.cells.get()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.region.get().is_none()
    }

    /// Forget everything recorded, ready for the next frame.
    pub fn reset(&self) {
        self.region.set(None);
        self.cells.set(0);
    }
}

/// Everything a component needs while painting.
///
/// The context clips: the write helpers drop anything outside the
/// content area, so a component can paint naively and let the engine
/// crop. Writes that pass the clip are reported to the attached
/// [`DirtyTracker`], when there is one.
#[derive(Clone, Debug)]
pub struct PaintContext<'a> {
    /// The node's full laid-out rect (border and padding included).
    pub rect: Rect,
    /// The content area (rect minus border and padding); also the clip.
    pub content: Rect,
    /// The focus chain from the root, if any part of it touches this node.
    pub focus: Option<&'a FocusPath>,
    /// Whether this node is the focused leaf.
    pub focused: bool,
    /// Whether this node is disabled.
    pub disabled: bool,
    /// Z-index of the surface being painted.
    pub z_index: i32,
    /// Scroll offset applied by `Overflow::Scroll` containers.
    pub viewport_offset: Option<Position>,
    /// Tracker notified on every admitted cell write.
    pub tracker: Option<&'a DirtyTracker>,
}

impl<'a> PaintContext<'a> {
    /// A context covering `rect` with no insets, focus, or offset.
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            content: rect,
            focus: None,
            focused: false,
            disabled: false,
            z_index: 0,
            viewport_offset: None,
            tracker: None,
        }
    }

    /// Narrow the content area (clip) to `content`.
    #[must_use]
    pub fn with_content(mut self, content: Rect) -> Self {
        self.content = content;
        self
    }

    /// Attach focus information.
    #[must_use]
    pub fn with_focus(mut self, focus: &'a FocusPath, focused: bool) -> Self {
        self.focus = Some(focus);
        self.focused = focused;
        self
    }

    /// Set the surface z-index.
    #[must_use]
    pub fn with_z_index(mut self, z: i32) -> Self {
        self.z_index = z;
        self
    }

    /// Set the scroll offset.
    #[must_use]
    pub fn with_viewport_offset(mut self, offset: Position) -> Self {
        self.viewport_offset = Some(offset);
        self
    }

    /// Attach a dirty tracker notified on every admitted write.
    #[must_use]
    pub fn with_tracker(mut self, tracker: &'a DirtyTracker) -> Self {
        self.tracker = Some(tracker);
        self
    }

    /// The top-left cell of the content area.
    pub fn content_origin(&self) -> Position {
        self.content.position
    }

    /// Clipped single-cell write.
    pub fn set_cell(&self, buf: &mut Buffer, x: u16, y: u16, ch: char, style: Style) {
        if !self.content.contains(Position::new(x, y)) {
            return;
        }
        // A wide glyph whose ghost would cross the clip edge is dropped.
        let width = display_width(ch);
        if width == 2 && x + 1 >= self.content.right() {
            return;
        }
        buf.set_cell(x, y, ch, style);
        if let Some(tracker) = self.tracker {
            tracker.note_cell(x, y, width);
        }
    }

    /// Clipped string write; advances by display width like
    /// [`Buffer::set_string`] and stops at the clip edge.
    pub fn set_string(&self, buf: &mut Buffer, x: u16, y: u16, s: &str, style: Style) {
        if y < self.content.y() || y >= self.content.bottom() {
            return;
        }
        let mut col = x;
        for ch in s.chars() {
            let w = u16::from(display_width(ch));
            if w == 0 {
                continue;
            }
            if col < self.content.x() {
                col += w;
                continue;
            }
            if col + w > self.content.right() {
                break;
            }
            buf.set_cell(col, y, ch, style);
            if let Some(tracker) = self.tracker {
                tracker.note_cell(col, y, w as u8);
            }
            col += w;
        }
    }

    /// Clipped rectangle fill.
    pub fn fill(&self, buf: &mut Buffer, rect: Rect, ch: char, style: Style) {
        if let Some(clipped) = rect.intersection(&self.content) {
            buf.fill(clipped, ch, style);
            if let Some(tracker) = self.tracker {
                tracker.note_rect(clipped);
            }
        }
    }
}

/// Shrink `rect` by the enabled border sides.
pub fn inner_after_border(rect: Rect, border: BorderEdges) -> Rect {
    let left = u16::from(border.left);
    let top = u16::from(border.top);
    let width = rect
        .width()
        .saturating_sub(border.horizontal());
    let height = rect
        .height()
        .saturating_sub(border.vertical());
    Rect::new(rect.x() + left, rect.y() + top, width, height)
}

/// The content area of a node at `rect`: inside its border and padding.
pub fn content_area(node: &LayoutNode, rect: Rect) -> Rect {
    let inner = inner_after_border(rect, node.border);
    Rect::new(
        inner.x().saturating_add(node.padding.left),
        inner.y().saturating_add(node.padding.top),
        inner.width().saturating_sub(node.padding.horizontal()),
        inner.height().saturating_sub(node.padding.vertical()),
    )
}

/// Draw the enabled border sides of `rect` into the buffer.
///
/// Corner glyphs appear where two enabled sides meet; a side on its own
/// runs edge to edge.
pub fn draw_border(buf: &mut Buffer, rect: Rect, border: BorderEdges, kind: BorderKind, style: Style) {
    if rect.width() == 0 || rect.height() == 0 || !border.any() {
        return;
    }
    let (tl, tr, bl, br, h, v) = kind.chars();
    let x1 = rect.x();
    let y1 = rect.y();
    let x2 = rect.right() - 1;
    let y2 = rect.bottom() - 1;

    if border.top {
        for x in x1..=x2 {
            buf.set_cell(x, y1, h, style);
        }
    }
    if border.bottom {
        for x in x1..=x2 {
            buf.set_cell(x, y2, h, style);
        }
    }
    if border.left {
        for y in y1..=y2 {
            buf.set_cell(x1, y, v, style);
        }
    }
    if border.right {
        for y in y1..=y2 {
            buf.set_cell(x2, y, v, style);
        }
    }
    if border.top && border.left {
        buf.set_cell(x1, y1, tl, style);
    }
    if border.top && border.right {
        buf.set_cell(x2, y1, tr, style);
    }
    if border.bottom && border.left {
        buf.set_cell(x1, y2, bl, style);
    }
    if border.bottom && border.right {
        buf.set_cell(x2, y2, br, style);
    }
}

/// Paint a laid-out tree into the buffer.
///
/// Nodes without an assigned rect (layout has not visited them) are
/// skipped. Children paint after (over) their parent.
pub fn paint_tree(root: &LayoutNode, buf: &mut Buffer, focus: &FocusPath) {
    paint_node(root, buf, focus, 0, None);
}

/// Like [`paint_tree`], recording every admitted cell write into
/// `tracker`.
pub fn paint_tree_tracked(
    root: &LayoutNode,
    buf: &mut Buffer,
    focus: &FocusPath,
    tracker: &DirtyTracker,
) {
    paint_node(root, buf, focus, 0, Some(tracker));
}

fn paint_node(
    node: &LayoutNode,
    buf: &mut Buffer,
    focus: &FocusPath,
    z_index: i32,
    tracker: Option<&DirtyTracker>,
) {
    let Some(rect) = node.rect else {
        return;
    };
    if rect.is_empty() {
        return;
    }

    let focused = focus.leaf().is_some_and(|leaf| *leaf == node.id);

    if node.border.any() {
        let state = if focused { "focused" } else { "normal" };
        let style = theme::resolve("border", state);
        draw_border(buf, rect, node.border, node.border_kind, style);
        if let Some(tracker) = tracker {
            note_border(tracker, rect, node.border);
        }
    }

    if let Some(component) = &node.content {
        let content = content_area(node, rect);
        let mut ctx = PaintContext::new(rect)
            .with_content(content)
            .with_focus(focus, focused)
            .with_z_index(z_index);
        if let Some(tracker) = tracker {
            ctx = ctx.with_tracker(tracker);
        }
        // Confine a panicking component to its own subtree; the cells it
        // would have painted keep their previous-frame contents.
        let outcome = catch_unwind(AssertUnwindSafe(|| component.paint(&ctx, buf)));
        if outcome.is_err() {
            tracing::warn!(id = %node.id, "component paint panicked; subtree skipped");
            return;
        }
    }

    for child in &node.children {
        paint_node(child, buf, focus, z_index, tracker);
    }
}

/// Record the edge cells a border draw touched.
fn note_border(tracker: &DirtyTracker, rect: Rect, border: BorderEdges) {
    if rect.is_empty() {
        return;
    }
    let x2 = rect.right() - 1;
    let y2 = rect.bottom() - 1;
    if border.top {
        tracker.note_rect(Rect::new(rect.x(), rect.y(), rect.width(), 1));
    }
    if border.bottom {
        tracker.note_rect(Rect::new(rect.x(), y2, rect.width(), 1));
    }
    if border.left {
        tracker.note_rect(Rect::new(rect.x(), rect.y(), 1, rect.height()));
    }
    if border.right {
        tracker.note_rect(Rect::new(x2, rect.y(), 1, rect.height()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;
    use crate::layout::{BoxConstraints, Edges};

    #[test]
    fn border_kinds_have_distinct_glyphs() {
        assert_ne!(BorderKind::Normal.chars(), BorderKind::Double.chars());
        assert_ne!(BorderKind::Normal.chars(), BorderKind::Thick.chars());
        assert_eq!(BorderKind::Hidden.chars().0, ' ');
    }

    #[test]
    fn draw_full_border() {
        let mut buf = Buffer::new(Size::new(10, 5));
        draw_border(
            &mut buf,
            Rect::new(0, 0, 10, 5),
            BorderEdges::all(),
            BorderKind::Normal,
            Style::default(),
        );
        assert_eq!(buf.get(0, 0).map(|c| c.ch), Some('\u{250c}'));
        assert_eq!(buf.get(9, 0).map(|c| c.ch), Some('\u{2510}'));
        assert_eq!(buf.get(0, 4).map(|c| c.ch), Some('\u{2514}'));
        assert_eq!(buf.get(9, 4).map(|c| c.ch), Some('\u{2518}'));
        assert_eq!(buf.get(4, 0).map(|c| c.ch), Some('\u{2500}'));
        assert_eq!(buf.get(0, 2).map(|c| c.ch), Some('\u{2502}'));
    }

    #[test]
    fn draw_partial_border_no_corner() {
        let mut buf = Buffer::new(Size::new(10, 5));
        let border = BorderEdges {
            top: true,
            ..BorderEdges::default()
        };
        draw_border(
            &mut buf,
            Rect::new(0, 0, 10, 5),
            border,
            BorderKind::Normal,
            Style::default(),
        );
        // Top edge runs full width with no corner glyphs.
        assert_eq!(buf.get(0, 0).map(|c| c.ch), Some('\u{2500}'));
        assert!(buf.get(0, 1).is_some_and(crate::cell::Cell::is_hole));
    }

    #[test]
    fn rounded_corners() {
        let mut buf = Buffer::new(Size::new(4, 3));
        draw_border(
            &mut buf,
            Rect::new(0, 0, 4, 3),
            BorderEdges::all(),
            BorderKind::Rounded,
            Style::default(),
        );
        assert_eq!(buf.get(0, 0).map(|c| c.ch), Some('\u{256d}'));
        assert_eq!(buf.get(3, 2).map(|c| c.ch), Some('\u{256f}'));
    }

    #[test]
    fn inner_after_border_shrinks_enabled_sides() {
        let rect = Rect::new(0, 0, 10, 5);
        let inner = inner_after_border(rect, BorderEdges::all());
        assert_eq!(inner, Rect::new(1, 1, 8, 3));
        let top_only = BorderEdges {
            top: true,
            ..BorderEdges::default()
        };
        assert_eq!(inner_after_border(rect, top_only), Rect::new(0, 1, 10, 4));
    }

    #[test]
    fn content_area_subtracts_padding_and_border() {
        let node = LayoutNode::row("n")
            .with_padding(Edges::uniform(1))
            .with_border(BorderEdges::all(), BorderKind::Normal);
        let content = content_area(&node, Rect::new(0, 0, 10, 8));
        assert_eq!(content, Rect::new(2, 2, 6, 4));
    }

    #[test]
    fn context_clips_cell_writes() {
        let mut buf = Buffer::new(Size::new(10, 10));
        let ctx = PaintContext::new(Rect::new(2, 2, 3, 3));
        ctx.set_cell(&mut buf, 0, 0, 'x', Style::default());
        ctx.set_cell(&mut buf, 2, 2, 'y', Style::default());
        ctx.set_cell(&mut buf, 5, 2, 'z', Style::default()); // just past right edge
        assert!(buf.get(0, 0).is_some_and(crate::cell::Cell::is_hole));
        assert_eq!(buf.get(2, 2).map(|c| c.ch), Some('y'));
        assert!(buf.get(5, 2).is_some_and(crate::cell::Cell::is_hole));
    }

    #[test]
    fn context_clips_wide_glyph_at_edge() {
        let mut buf = Buffer::new(Size::new(10, 10));
        let ctx = PaintContext::new(Rect::new(0, 0, 4, 1));
        // Wide glyph at column 3 would ghost into column 4, outside.
        ctx.set_cell(&mut buf, 3, 0, '\u{4e16}', Style::default());
        assert!(buf.get(3, 0).is_some_and(crate::cell::Cell::is_hole));
    }

    #[test]
    fn context_clips_string_writes() {
        let mut buf = Buffer::new(Size::new(20, 5));
        let ctx = PaintContext::new(Rect::new(2, 1, 4, 1));
        ctx.set_string(&mut buf, 2, 1, "abcdef", Style::default());
        assert_eq!(buf.get(2, 1).map(|c| c.ch), Some('a'));
        assert_eq!(buf.get(5, 1).map(|c| c.ch), Some('d'));
        assert!(buf.get(6, 1).is_some_and(crate::cell::Cell::is_hole));
    }

    #[test]
    fn context_fill_clips() {
        let mut buf = Buffer::new(Size::new(10, 10));
        let ctx = PaintContext::new(Rect::new(1, 1, 3, 3));
        ctx.fill(&mut buf, Rect::new(0, 0, 10, 10), '#', Style::default());
        assert!(buf.get(0, 0).is_some_and(crate::cell::Cell::is_hole));
        assert_eq!(buf.get(1, 1).map(|c| c.ch), Some('#'));
        assert_eq!(buf.get(3, 3).map(|c| c.ch), Some('#'));
        assert!(buf.get(4, 4).is_some_and(crate::cell::Cell::is_hole));
    }

    #[test]
    fn tracker_records_cell_writes() {
        let mut buf = Buffer::new(Size::new(10, 10));
        let tracker = DirtyTracker::new();
        let ctx = PaintContext::new(Rect::new(0, 0, 10, 10)).with_tracker(&tracker);
        ctx.set_cell(&mut buf, 2, 3, 'x', Style::default());
        ctx.set_cell(&mut buf, 5, 3, 'y', Style::default());
        assert_eq!(tracker.region(), Some(Rect::new(2, 3, 4, 1)));
        assert_eq!(tracker.cell_count(), 2);
    }

    #[test]
    fn tracker_ignores_clipped_writes() {
        let mut buf = Buffer::new(Size::new(10, 10));
        let tracker = DirtyTracker::new();
        let ctx = PaintContext::new(Rect::new(2, 2, 3, 3)).with_tracker(&tracker);
        ctx.set_cell(&mut buf, 0, 0, 'x', Style::default());
        assert!(tracker.is_empty());
        assert_eq!(tracker.cell_count(), 0);
    }

    #[test]
    fn tracker_counts_wide_glyph_ghost() {
        let mut buf = Buffer::new(Size::new(10, 1));
        let tracker = DirtyTracker::new();
        let ctx = PaintContext::new(Rect::new(0, 0, 10, 1)).with_tracker(&tracker);
        ctx.set_cell(&mut buf, 0, 0, '\u{4e16}', Style::default());
        assert_eq!(tracker.region(), Some(Rect::new(0, 0, 2, 1)));
        assert_eq!(tracker.cell_count(), 2);
    }

    #[test]
    fn tracker_records_string_and_fill() {
        let mut buf = Buffer::new(Size::new(20, 5));
        let tracker = DirtyTracker::new();
        let ctx = PaintContext::new(Rect::new(0, 0, 20, 5)).with_tracker(&tracker);
        ctx.set_string(&mut buf, 1, 0, "abc", Style::default());
        ctx.fill(&mut buf, Rect::new(0, 2, 4, 2), '#', Style::default());
        assert_eq!(tracker.region(), Some(Rect::new(0, 0, 4, 4)));
        assert_eq!(tracker.cell_count(), 3 + 8);
    }

    #[test]
    fn tracker_reset_forgets() {
        let tracker = DirtyTracker::new();
        tracker.note_cell(1, 1, 1);
        tracker.reset();
        assert!(tracker.is_empty());
        assert_eq!(tracker.region(), None);
    }

    #[test]
    fn paint_tree_tracked_bounds_the_writes() {
        let mut node = LayoutNode::text("t", "hi");
        node.rect = Some(Rect::new(3, 1, 5, 1));
        let mut buf = Buffer::new(Size::new(10, 3));
        let tracker = DirtyTracker::new();
        paint_tree_tracked(&node, &mut buf, &FocusPath::new(), &tracker);
        assert_eq!(tracker.region(), Some(Rect::new(3, 1, 2, 1)));
    }

    #[test]
    fn paint_tree_tracked_includes_borders() {
        let mut node = LayoutNode::row("r").with_border(BorderEdges::all(), BorderKind::Normal);
        node.rect = Some(Rect::new(0, 0, 6, 4));
        let mut buf = Buffer::new(Size::new(10, 5));
        let tracker = DirtyTracker::new();
        paint_tree_tracked(&node, &mut buf, &FocusPath::new(), &tracker);
        assert_eq!(tracker.region(), Some(Rect::new(0, 0, 6, 4)));
    }

    #[test]
    fn paint_tree_skips_unlaid_nodes() {
        let node = LayoutNode::text("t", "hello");
        let mut buf = Buffer::new(Size::new(10, 2));
        paint_tree(&node, &mut buf, &FocusPath::new());
        assert!(buf.get(0, 0).is_some_and(crate::cell::Cell::is_hole));
    }

    #[test]
    fn paint_tree_paints_text_leaf() {
        let mut node = LayoutNode::text("t", "hi");
        node.rect = Some(Rect::new(1, 1, 5, 1));
        let mut buf = Buffer::new(Size::new(10, 3));
        paint_tree(&node, &mut buf, &FocusPath::new());
        assert_eq!(buf.get(1, 1).map(|c| c.ch), Some('h'));
        assert_eq!(buf.get(2, 1).map(|c| c.ch), Some('i'));
    }

    #[test]
    fn paint_tree_children_over_parent() {
        let mut parent = LayoutNode::row("p");
        parent.rect = Some(Rect::new(0, 0, 10, 1));
        let mut child = LayoutNode::text("p.c", "X");
        child.rect = Some(Rect::new(0, 0, 1, 1));
        parent.children.push(child);
        let mut buf = Buffer::new(Size::new(10, 1));
        paint_tree(&parent, &mut buf, &FocusPath::new());
        assert_eq!(buf.get(0, 0).map(|c| c.ch), Some('X'));
    }

    #[test]
    fn panicking_component_confined_to_subtree() {
        struct Bomb;
        impl crate::component::Component for Bomb {
            fn measure(&self, _c: BoxConstraints) -> Size {
                Size::new(1, 1)
            }
            fn paint(&self, _ctx: &PaintContext<'_>, _buf: &mut Buffer) {
                panic!("boom");
            }
        }

        let mut root = LayoutNode::row("root");
        root.rect = Some(Rect::new(0, 0, 10, 1));
        let mut bomb = LayoutNode::custom("root.bomb", Box::new(Bomb));
        bomb.rect = Some(Rect::new(0, 0, 2, 1));
        let mut ok = LayoutNode::text("root.ok", "ok");
        ok.rect = Some(Rect::new(3, 0, 2, 1));
        root.children.push(bomb);
        root.children.push(ok);

        let mut buf = Buffer::new(Size::new(10, 1));
        let hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(|_| {}));
        paint_tree(&root, &mut buf, &FocusPath::new());
        std::panic::set_hook(hook);

        // The sibling after the panicking component still painted.
        assert_eq!(buf.get(3, 0).map(|c| c.ch), Some('o'));
        assert_eq!(buf.get(4, 0).map(|c| c.ch), Some('k'));
    }
}
