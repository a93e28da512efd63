//! Measure phase: bottom-up sizing under constraints, with a cache keyed
//! by `(node id, constraints)`.
//!
//! Re-measuring is always safe; the cache is purely an optimization and
//! a miss falls through to recomputation. The cache is invalidated
//! globally on viewport resize and by id prefix on content mutation.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::geometry::Size;
use crate::layout::flex;
use crate::layout::{BoxConstraints, FlexDirection, LayoutNode, NodeId};

/// Measurement cache shared across frames.
///
/// Guarded by a read-write lock: the loop thread owns all mutation, but
/// diagnostic dumps may read concurrently.
#[derive(Debug, Default)]
pub struct MeasureCache {
    entries: RwLock<HashMap<(NodeId, BoxConstraints), Size>>,
}

impl MeasureCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a cached measurement.
    pub fn get(&self, id: &str, constraints: BoxConstraints) -> Option<Size> {
        self.read().get(&(id.to_string(), constraints)).copied()
    }

    /// Store a measurement.
    pub fn insert(&self, id: NodeId, constraints: BoxConstraints, size: Size) {
        self.write().insert((id, constraints), size);
    }

    /// Drop every entry (viewport resize).
    pub fn invalidate_all(&self) {
        self.write().clear();
    }

    /// Drop entries whose node id starts with `prefix` (content mutation
    /// in that subtree).
    pub fn invalidate_prefix(&self, prefix: &str) {
        self.write().retain(|(id, _), _| !id.starts_with(prefix));
    }

    /// Number of cached measurements.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<(NodeId, BoxConstraints), Size>> {
        match self.entries.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<(NodeId, BoxConstraints), Size>> {
        match self.entries.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Measure a subtree bottom-up under the given constraints.
///
/// Containers measure their children against loosened inner constraints
/// and size themselves by flex distribution; leaves resolve explicit
/// dimensions and fall back to their component's own measurement.
/// Results land on `node.measured` and in the cache.
pub fn measure(node: &mut LayoutNode, constraints: BoxConstraints, cache: &MeasureCache) -> Size {
    if !node.dirty
        && let Some(size) = cache.get(&node.id, constraints)
    {
        node.measured = Some(size);
        return size;
    }

    let h_inset = node.horizontal_inset();
    let v_inset = node.vertical_inset();
    let inner = constraints.deflate(h_inset, v_inset);

    let size = if node.is_container() && !node.children.is_empty() {
        let child_constraints = inner.loosen();
        for child in &mut node.children {
            measure(child, child_constraints, cache);
        }
        let solution = flex::solve(node, inner);
        let content = match node.effective_direction() {
            FlexDirection::Row => Size::new(solution.container_main, solution.container_cross),
            FlexDirection::Column => Size::new(solution.container_cross, solution.container_main),
        };
        let outer = Size::new(
            content.width.saturating_add(h_inset),
            content.height.saturating_add(v_inset),
        );
        let w = node.width.resolve(constraints.max_w).unwrap_or(outer.width);
        let h = node.height.resolve(constraints.max_h).unwrap_or(outer.height);
        constraints.clamp_size(Size::new(w, h))
    } else {
        let explicit_w = node.width.resolve(constraints.max_w);
        let explicit_h = node.height.resolve(constraints.max_h);
        match (explicit_w, explicit_h) {
            (Some(w), Some(h)) => constraints.clamp_size(Size::new(w, h)),
            _ => {
                let content = node
                    .content
                    .as_ref()
                    .map(|c| c.measure(inner))
                    .unwrap_or_default();
                let w = explicit_w.unwrap_or_else(|| content.width.saturating_add(h_inset));
                let h = explicit_h.unwrap_or_else(|| content.height.saturating_add(v_inset));
                constraints.clamp_size(Size::new(w, h))
            }
        }
    };

    node.measured = Some(size);
    node.dirty = false;
    cache.insert(node.id.clone(), constraints, size);
    size
}
