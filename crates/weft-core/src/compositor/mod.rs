//! Layered compositor: z-ordered independent surfaces.
//!
//! Each layer owns its own buffer, dirty flag, and encoder, so surfaces
//! refresh independently of one another. `render_dirty` emits only the
//! layers that changed; `composite` materializes a single flattened
//! buffer when a consumer needs one (screenshots, the direct full-frame
//! output path).

pub mod layer;

pub use layer::{Layer, LayerKind};

use std::fmt::Write;

use crate::buffer::Buffer;
use crate::geometry::{Position, Size};

/// Z-ordered stack of independently-buffered surfaces.
#[derive(Debug)]
pub struct Compositor {
    layers: Vec<Layer>,
    viewport: Size,
}

impl Compositor {
    /// Create an empty compositor for the given viewport.
    pub fn new(viewport: Size) -> Self {
        Self {
            layers: Vec::new(),
            viewport,
        }
    }

    /// The viewport size.
    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Number of registered layers.
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Register a layer, keeping the stack sorted by ascending z-index.
    /// Insertion is stable: equal z-indexes keep registration order.
    pub fn add_layer(&mut self, layer: Layer) {
        let at = self
            .layers
            .partition_point(|existing| existing.z_index <= layer.z_index);
        self.layers.insert(at, layer);
    }

    /// Look up a layer by id.
    pub fn layer(&self, id: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    /// Look up a layer by id, mutably.
    pub fn layer_mut(&mut self, id: &str) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id == id)
    }

    /// Remove a layer by id. Returns true if it was present.
    pub fn remove_layer(&mut self, id: &str) -> bool {
        let before = self.layers.len();
        self.layers.retain(|l| l.id != id);
        self.layers.len() != before
    }

    /// Layers in z-order (bottom first).
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Emit the encoded changes of every dirty active layer, in z-order.
    ///
    /// Stream layers are bracketed with a terminal scroll region limited
    /// to their rows, so fast-appended lines can use native scrolling,
    /// and the region is reset afterwards.
    pub fn render_dirty(&mut self) -> String {
        let mut out = String::new();
        for layer in &mut self.layers {
            if !layer.is_active() || !layer.dirty {
                continue;
            }
            let diff = layer.take_diff();
            if !diff.has_changes && !layer.encoder.is_first_frame() {
                layer.dirty = false;
                continue;
            }

            let stream = layer.kind == LayerKind::Stream;
            if stream {
                let (top, bottom) = layer.scroll_region();
                let _ = write!(out, "\x1b[{top};{bottom}r");
            }
            let origin = Position::new(layer.rect.x(), layer.rect.y());
            out.push_str(&layer.encoder.encode_at(&layer.buffer, &diff, origin));
            if stream {
                out.push_str("\x1b[r");
            }
            layer.commit();
        }
        out
    }

    /// Flatten all active layers into one buffer by z-ordered blit.
    /// Non-hole source cells overwrite destination cells.
    pub fn composite(&self) -> Buffer {
        let mut out = Buffer::new(self.viewport);
        for layer in &self.layers {
            if !layer.is_active() {
                continue;
            }
            blit(&mut out, layer);
        }
        out
    }

    /// Resize the viewport: every layer's rect is clamped into the new
    /// bounds and buffers whose dimensions changed are remade.
    pub fn resize(&mut self, viewport: Size) {
        self.viewport = viewport;
        for layer in &mut self.layers {
            let clamped = layer.rect.clamp_into(viewport);
            layer.set_rect(clamped);
        }
    }
}

/// Copy a layer's non-hole cells into `dest` at the layer's position.
fn blit(dest: &mut Buffer, layer: &Layer) {
    let origin = layer.rect.position;
    for y in 0..layer.buffer.height() {
        let Some(row) = layer.buffer.row(y) else {
            continue;
        };
        let dest_y = origin.y.saturating_add(y);
        for (x, cell) in row.iter().enumerate() {
            if cell.is_hole() || cell.is_ghost() {
                continue;
            }
            dest.put(origin.x.saturating_add(x as u16), dest_y, *cell);
        }
    }
}
