//! The component contract and focus bookkeeping.
//!
//! Widgets are out of scope for the engine; everything paintable goes
//! through the small [`Component`] capability trait. Cross-cutting
//! helpers (border drawing, clipping) are free functions in
//! [`crate::paint`] that operate on the capability, not on concrete
//! widget types.

use crate::buffer::Buffer;
use crate::cell::display_width;
use crate::event::Event;
use crate::geometry::Size;
use crate::layout::{BoxConstraints, NodeId};
use crate::paint::PaintContext;
use crate::style::Style;

/// Result of handling an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventResult {
    /// The event was consumed; the component is now dirty.
    Consumed,
    /// The event was not handled; propagate onward.
    Ignored,
}

/// A paintable node's capabilities.
///
/// `measure` and `paint` are the required surface; event handling and
/// focus hooks are optional.
pub trait Component {
    /// Report the preferred size under the given constraints.
    fn measure(&self, constraints: BoxConstraints) -> Size;

    /// Paint into the buffer. Writes must go through the context's
    /// clipped helpers; anything outside the node's rect is dropped.
    fn paint(&self, ctx: &PaintContext<'_>, buf: &mut Buffer);

    /// Handle an input event routed to this component.
    fn handle_event(&mut self, event: &Event) -> EventResult {
        let _ = event;
        EventResult::Ignored
    }

    /// Called when the component gains focus.
    fn on_focus(&mut self) {}

    /// Called when the component loses focus.
    fn on_blur(&mut self) {}
}

/// The ordered id chain from the root to the currently focused leaf.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FocusPath {
    ids: Vec<NodeId>,
}

impl FocusPath {
    /// An empty focus path (nothing focused).
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole path.
    pub fn set(&mut self, ids: Vec<NodeId>) {
        self.ids = ids;
    }

    /// Push a deeper id onto the chain.
    pub fn push(&mut self, id: impl Into<NodeId>) {
        self.ids.push(id.into());
    }

    /// Clear the path.
    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// The focused leaf, if any.
    pub fn leaf(&self) -> Option<&NodeId> {
        self.ids.last()
    }

    /// Whether the path is empty.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Whether the given id is anywhere on the chain.
    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|i| i == id)
    }

    /// The ids from root to leaf.
    pub fn ids(&self) -> &[NodeId] {
        &self.ids
    }
}

/// A plain single-line text component.
///
/// This is the one concrete component the engine ships; it exists for
/// text leaves in the layout tree and for exercising the pipeline in
/// tests.
#[derive(Clone, Debug)]
pub struct Text {
    content: String,
    style: Style,
}

impl Text {
    /// Create a text component with the empty style.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            style: Style::default(),
        }
    }

    /// Set the text style.
    #[must_use]
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// The text content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Replace the text content.
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    /// Display width of the content in cells.
    pub fn display_width(&self) -> u16 {
        self.content
            .chars()
            .map(|c| u16::from(display_width(c)))
            .sum()
    }
}

impl Component for Text {
    fn measure(&self, constraints: BoxConstraints) -> Size {
        let width = self.display_width().min(constraints.max_w);
        let height = if constraints.max_h == 0 { 0 } else { 1 };
        constraints.clamp_size(Size::new(width, height))
    }

    fn paint(&self, ctx: &PaintContext<'_>, buf: &mut Buffer) {
        let origin = ctx.content_origin();
        ctx.set_string(buf, origin.x, origin.y, &self.content, self.style);
    }
}
