//! A compositor layer: an independent z-ordered surface with its own
//! buffer and dirty flag.

use crate::buffer::Buffer;
use crate::color::ColorSupport;
use crate::diff::DirtyResult;
use crate::encoder::Encoder;
use crate::geometry::{Rect, Size};

/// What role a layer plays; the kind picks a default z-index and, for
/// [`LayerKind::Stream`], enables the terminal scroll-region
/// optimization at encode time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayerKind {
    /// Backdrop behind everything.
    Background,
    /// Main application content.
    Content,
    /// Append-mostly log/stream area drawn inside a scroll region.
    Stream,
    /// Modal/popup surfaces above everything else.
    Overlay,
}

impl LayerKind {
    /// The default z-index for this kind.
    pub const fn default_z(self) -> i32 {
        match self {
            Self::Background => 0,
            Self::Content => 10,
            Self::Stream => 20,
            Self::Overlay => 100,
        }
    }
}

/// An independently-buffered surface composited at a z-index.
///
/// The layer's buffer is in layer-local coordinates; `rect` positions it
/// on the screen. Each layer carries its own previous-frame snapshot and
/// encoder so its dirty changes can be emitted independently.
pub struct Layer {
    /// Layer identity.
    pub id: String,
    /// Role of this layer.
    pub kind: LayerKind,
    /// Stacking order; higher paints later (on top).
    pub z_index: i32,
    /// The layer's cell buffer, sized to `rect`.
    pub buffer: Buffer,
    /// Screen-space placement of the layer.
    pub rect: Rect,
    /// Disabled layers are skipped entirely.
    pub enabled: bool,
    /// Invisible layers keep state but do not composite or emit.
    pub visible: bool,
    /// Whether this layer needs re-emission.
    pub dirty: bool,
    pub(crate) prev: Option<Buffer>,
    pub(crate) encoder: Encoder,
}

impl Layer {
    /// Create a layer of the given kind at `rect`, with the kind's
    /// default z-index.
    pub fn new(id: impl Into<String>, kind: LayerKind, rect: Rect, color_support: ColorSupport) -> Self {
        Self {
            id: id.into(),
            kind,
            z_index: kind.default_z(),
            buffer: Buffer::new(rect.size),
            rect,
            enabled: true,
            visible: true,
            dirty: true,
            prev: None,
            encoder: Encoder::without_clear(color_support),
        }
    }

    /// Override the z-index.
    #[must_use]
    pub fn with_z_index(mut self, z: i32) -> Self {
        self.z_index = z;
        self
    }

    /// Mark the layer as needing re-emission.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Whether this layer participates in compositing and emission.
    pub fn is_active(&self) -> bool {
        self.enabled && self.visible && !self.rect.is_empty()
    }

    /// Diff the buffer against this layer's previous snapshot.
    pub(crate) fn take_diff(&self) -> DirtyResult {
        crate::diff::diff(self.prev.as_ref(), &self.buffer)
    }

    /// Record the current buffer as the emitted state.
    pub(crate) fn commit(&mut self) {
        self.prev = Some(self.buffer.clone());
        self.dirty = false;
    }

    /// Resize to a new placement, remaking the buffer when dimensions
    /// changed (contents are invalidated).
    pub fn set_rect(&mut self, rect: Rect) {
        if rect.size != self.buffer.size() {
            self.buffer.resize(rect.size);
            self.prev = None;
            self.encoder.forget_cursor();
            self.dirty = true;
        }
        self.rect = rect;
    }

    /// The scroll-region rows for a stream layer, as 1-based inclusive
    /// terminal rows.
    pub fn scroll_region(&self) -> (u16, u16) {
        (self.rect.y() + 1, self.rect.bottom().max(self.rect.y() + 1))
    }

    /// The layer's size.
    pub fn size(&self) -> Size {
        self.buffer.size()
    }
}

impl std::fmt::Debug for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Layer")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("z_index", &self.z_index)
            .field("rect", &self.rect)
            .field("enabled", &self.enabled)
            .field("visible", &self.visible)
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Style;

    #[test]
    fn kind_default_z_ordering() {
        assert!(LayerKind::Background.default_z() < LayerKind::Content.default_z());
        assert!(LayerKind::Content.default_z() < LayerKind::Stream.default_z());
        assert!(LayerKind::Stream.default_z() < LayerKind::Overlay.default_z());
    }

    #[test]
    fn new_layer_is_dirty_and_active() {
        let layer = Layer::new(
            "bg",
            LayerKind::Background,
            Rect::new(0, 0, 10, 5),
            ColorSupport::TrueColor,
        );
        assert!(layer.dirty);
        assert!(layer.is_active());
        assert_eq!(layer.size(), Size::new(10, 5));
    }

    #[test]
    fn disabled_or_invisible_is_inactive() {
        let mut layer = Layer::new(
            "l",
            LayerKind::Content,
            Rect::new(0, 0, 4, 4),
            ColorSupport::TrueColor,
        );
        layer.enabled = false;
        assert!(!layer.is_active());
        layer.enabled = true;
        layer.visible = false;
        assert!(!layer.is_active());
    }

    #[test]
    fn first_diff_covers_whole_layer() {
        let layer = Layer::new(
            "l",
            LayerKind::Content,
            Rect::new(2, 3, 6, 4),
            ColorSupport::TrueColor,
        );
        let diff = layer.take_diff();
        assert_eq!(diff.regions, vec![Rect::new(0, 0, 6, 4)]);
    }

    #[test]
    fn commit_then_clean_diff() {
        let mut layer = Layer::new(
            "l",
            LayerKind::Content,
            Rect::new(0, 0, 6, 4),
            ColorSupport::TrueColor,
        );
        layer.commit();
        assert!(!layer.take_diff().has_changes);
        layer.buffer.set_cell(1, 1, 'x', Style::default());
        assert!(layer.take_diff().has_changes);
    }

    #[test]
    fn set_rect_same_size_keeps_snapshot() {
        let mut layer = Layer::new(
            "l",
            LayerKind::Content,
            Rect::new(0, 0, 6, 4),
            ColorSupport::TrueColor,
        );
        layer.commit();
        layer.set_rect(Rect::new(2, 2, 6, 4));
        assert!(!layer.take_diff().has_changes);
    }

    #[test]
    fn set_rect_new_size_invalidates() {
        let mut layer = Layer::new(
            "l",
            LayerKind::Content,
            Rect::new(0, 0, 6, 4),
            ColorSupport::TrueColor,
        );
        layer.commit();
        layer.set_rect(Rect::new(0, 0, 8, 4));
        assert!(layer.dirty);
        assert_eq!(layer.take_diff().regions, vec![Rect::new(0, 0, 8, 4)]);
    }

    #[test]
    fn stream_scroll_region_rows() {
        let layer = Layer::new(
            "log",
            LayerKind::Stream,
            Rect::new(0, 5, 80, 10),
            ColorSupport::TrueColor,
        );
        assert_eq!(layer.scroll_region(), (6, 15));
    }
}
