//! Main-axis flex distribution.
//!
//! Given a container's measured children, computes each child's main-axis
//! size and the container's own content size. Free space goes to children
//! with a `flex_grow` factor; deficits are clawed back from every child.

use crate::layout::{AlignItems, BoxConstraints, FlexDirection, Justify, LayoutNode};

/// The solved main/cross sizes for a flex container.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FlexSolution {
    /// Main-axis size per child, in child order.
    pub main_sizes: Vec<u16>,
    /// Measured cross-axis size per child (before any stretch).
    pub cross_sizes: Vec<u16>,
    /// Container content size on the main axis.
    pub container_main: u16,
    /// Container content size on the cross axis.
    pub container_cross: u16,
}

/// Solve the main-axis distribution for `node`'s children under the
/// given inner (content-area) constraints.
///
/// Children must already be measured. The integer-division remainder of
/// the grow distribution goes to the first growing child.
pub fn solve(node: &LayoutNode, inner: BoxConstraints) -> FlexSolution {
    let direction = node.effective_direction();
    let (main_max, cross_max) = match direction {
        FlexDirection::Row => (inner.max_w, inner.max_h),
        FlexDirection::Column => (inner.max_h, inner.max_w),
    };

    let n = node.children.len();
    let mut main_sizes = Vec::with_capacity(n);
    let mut cross_sizes = Vec::with_capacity(n);
    for child in &node.children {
        let measured = child.measured.unwrap_or_default();
        let (main, cross) = match direction {
            FlexDirection::Row => (measured.width, measured.height),
            FlexDirection::Column => (measured.height, measured.width),
        };
        main_sizes.push(main);
        cross_sizes.push(cross);
    }

    let total_gap = if n >= 2 {
        node.gap.saturating_mul((n - 1) as u16)
    } else {
        0
    };

    let fixed: u32 = node
        .children
        .iter()
        .zip(&main_sizes)
        .filter(|(child, _)| child.flex_grow == 0)
        .map(|(_, &main)| u32::from(main))
        .sum();
    let grow_sum: u32 = node.children.iter().map(|c| u32::from(c.flex_grow)).sum();
    let remaining = i64::from(main_max) - i64::from(fixed) - i64::from(total_gap);

    if grow_sum > 0 && remaining > 0 {
        let remaining = remaining as u32;
        let mut distributed = 0u32;
        let mut first_growing = None;
        for (i, child) in node.children.iter().enumerate() {
            if child.flex_grow == 0 {
                continue;
            }
            let share = remaining * u32::from(child.flex_grow) / grow_sum;
            main_sizes[i] = share.min(u32::from(u16::MAX)) as u16;
            distributed += share;
            if first_growing.is_none() {
                first_growing = Some(i);
            }
        }
        // Integer division discards a remainder; hand it to the first
        // growing child so the distribution is deterministic.
        if let Some(i) = first_growing {
            let remainder = remaining.saturating_sub(distributed) as u16;
            main_sizes[i] = main_sizes[i].saturating_add(remainder);
        }
    } else if remaining < 0 {
        // Overflow: each child loses its share of the deficit at the
        // point of processing. Children too small to give absorb what
        // they can.
        let mut deficit = (-remaining).min(i64::from(u32::MAX)) as u32;
        for (i, size) in main_sizes.iter_mut().enumerate() {
            if deficit == 0 {
                break;
            }
            let left = (n - i) as u32;
            let cut = (deficit / left) as u16;
            let lost = (*size).min(cut);
            *size -= lost;
            deficit -= u32::from(lost);
        }
    }

    let packed: u32 = main_sizes.iter().map(|&m| u32::from(m)).sum::<u32>() + u32::from(total_gap);
    let any_grow = grow_sum > 0;
    let container_main = if node.justify != Justify::Start || any_grow {
        main_max
    } else {
        packed.min(u32::from(main_max)) as u16
    };

    let max_child_cross = cross_sizes.iter().copied().max().unwrap_or(0);
    let container_cross = if node.align_items == AlignItems::Stretch {
        cross_max
    } else {
        max_child_cross.min(cross_max)
    };

    FlexSolution {
        main_sizes,
        cross_sizes,
        container_main,
        container_cross,
    }
}
