//! Layout phase: top-down placement of measured nodes.
//!
//! Walks the tree assigning each node its rect. Flex children are placed
//! along the main axis per the container's `justify` and along the cross
//! axis per `align_items`; `Stretch` overrides the child's measured cross
//! size with the available space.

use crate::geometry::{Rect, Size};
use crate::layout::flex;
use crate::layout::{AlignItems, BoxConstraints, FlexDirection, Justify, LayoutNode};
use crate::paint::content_area;

/// Assign `rect` to `node` and recursively place its children.
///
/// Children must already be measured; placement consumes the measured
/// sizes via the flex solver.
pub fn layout(node: &mut LayoutNode, rect: Rect) {
    node.rect = Some(rect);

    if !node.is_container() || node.children.is_empty() {
        return;
    }

    let content = content_area(node, rect);
    let solution = flex::solve(node, BoxConstraints::loose(content.size));

    let direction = node.effective_direction();
    let (content_main, content_cross) = match direction {
        FlexDirection::Row => (content.width(), content.height()),
        FlexDirection::Column => (content.height(), content.width()),
    };

    let n = node.children.len();
    let total_gap = if n >= 2 {
        node.gap.saturating_mul((n - 1) as u16)
    } else {
        0
    };
    let packed: u32 = solution.main_sizes.iter().map(|&m| u32::from(m)).sum::<u32>()
        + u32::from(total_gap);
    let free = u32::from(content_main).saturating_sub(packed) as u16;

    let (lead, between_extra) = match node.justify {
        Justify::Start => (0, 0),
        Justify::End => (free, 0),
        Justify::Center => (free / 2, 0),
        Justify::SpaceBetween if n <= 1 => (0, 0),
        Justify::SpaceBetween => (0, free / (n - 1) as u16),
        Justify::SpaceAround if n <= 1 => (free / 2, 0),
        Justify::SpaceAround => {
            let unit = free / n as u16;
            (unit / 2, unit)
        }
        Justify::SpaceEvenly => {
            let unit = free / (n + 1) as u16;
            (unit, unit)
        }
    };
    let between = node.gap.saturating_add(between_extra);

    let align = node.align_items;
    let mut main_pos = lead;
    for (i, child) in node.children.iter_mut().enumerate() {
        let main_size = solution.main_sizes[i];
        let measured_cross = solution.cross_sizes[i];
        let cross_size = match align {
            AlignItems::Stretch => content_cross,
            _ => measured_cross.min(content_cross),
        };
        let cross_pos = match align {
            AlignItems::Start | AlignItems::Stretch => 0,
            AlignItems::Center => (content_cross - cross_size) / 2,
            AlignItems::End => content_cross - cross_size,
        };

        let child_rect = match direction {
            FlexDirection::Row => Rect::new(
                content.x().saturating_add(main_pos),
                content.y().saturating_add(cross_pos),
                main_size,
                cross_size,
            ),
            FlexDirection::Column => Rect::new(
                content.x().saturating_add(cross_pos),
                content.y().saturating_add(main_pos),
                cross_size,
                main_size,
            ),
        };

        layout(child, apply_margin(child_rect, child));
        main_pos = main_pos.saturating_add(main_size).saturating_add(between);
    }
}

/// Inset the assigned rect by the child's own margin.
fn apply_margin(rect: Rect, child: &LayoutNode) -> Rect {
    let margin = child.margin;
    Rect::new(
        rect.x().saturating_add(margin.left),
        rect.y().saturating_add(margin.top),
        rect.width().saturating_sub(margin.horizontal()),
        rect.height().saturating_sub(margin.vertical()),
    )
}

/// Convenience for the full measure + layout pass over a tree at a
/// viewport size.
pub fn measure_and_layout(
    node: &mut LayoutNode,
    viewport: Size,
    cache: &super::measure::MeasureCache,
) {
    super::measure::measure(node, BoxConstraints::tight(viewport), cache);
    layout(node, Rect::new(0, 0, viewport.width, viewport.height));
}
