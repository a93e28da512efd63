//! Frame diff engine.
//!
//! Compares two buffers and produces a minimal set of non-overlapping
//! dirty rectangles: changed cells are marked into a boolean grid,
//! connected components are extracted by flood fill, and nearby rects
//! are merged until a fixed point.

use crate::buffer::Buffer;
use crate::geometry::Rect;

/// The outcome of diffing two frames.
///
/// Regions are non-empty, pairwise non-overlapping, and each covers at
/// least one cell that actually changed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DirtyResult {
    /// Rectangles that need to be redrawn.
    pub regions: Vec<Rect>,
    /// Whether anything changed at all.
    pub has_changes: bool,
    /// Number of individual cells that changed.
    pub changed_cells: usize,
}

impl DirtyResult {
    /// A result covering the entire buffer (full repaint).
    pub fn full(buffer: &Buffer) -> Self {
        let size = buffer.size();
        if size.is_empty() {
            return Self::default();
        }
        Self {
            regions: vec![Rect::new(0, 0, size.width, size.height)],
            has_changes: true,
            changed_cells: size.area() as usize,
        }
    }
}

/// Compare `current` against `previous` and return the dirty regions.
///
/// With no previous frame, or when dimensions differ, the whole current
/// buffer is one region.
pub fn diff(previous: Option<&Buffer>, current: &Buffer) -> DirtyResult {
    let Some(prev) = previous else {
        return DirtyResult::full(current);
    };
    if prev.size() != current.size() {
        return DirtyResult::full(current);
    }

    let width = usize::from(current.width());
    let height = usize::from(current.height());
    if width == 0 || height == 0 {
        return DirtyResult::default();
    }

    // Mark inequality cell by cell. Two cells are equal iff codepoint,
    // full style, and width all match.
    let mut marked = vec![false; width * height];
    let mut changed_cells = 0usize;
    for y in 0..current.height() {
        let (Some(cur_row), Some(prev_row)) = (current.row(y), prev.row(y)) else {
            continue;
        };
        for (x, (cur, old)) in cur_row.iter().zip(prev_row).enumerate() {
            if cur != old {
                marked[usize::from(y) * width + x] = true;
                changed_cells += 1;
            }
        }
    }

    if changed_cells == 0 {
        return DirtyResult::default();
    }

    let mut regions = extract_regions(&marked, width, height);
    merge_adjacent(&mut regions);

    DirtyResult {
        regions,
        has_changes: true,
        changed_cells,
    }
}

/// Extract connected components of marked cells as bounding rects.
///
/// Four-directional flood fill with an explicit work stack; recursion
/// would overflow on large dirty areas.
fn extract_regions(marked: &[bool], width: usize, height: usize) -> Vec<Rect> {
    let mut visited = vec![false; marked.len()];
    let mut regions = Vec::new();
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for start_y in 0..height {
        for start_x in 0..width {
            let start_idx = start_y * width + start_x;
            if !marked[start_idx] || visited[start_idx] {
                continue;
            }

            let (mut min_x, mut max_x) = (start_x, start_x);
            let (mut min_y, mut max_y) = (start_y, start_y);
            visited[start_idx] = true;
            stack.push((start_x, start_y));

            while let Some((x, y)) = stack.pop() {
                min_x = min_x.min(x);
                max_x = max_x.max(x);
                min_y = min_y.min(y);
                max_y = max_y.max(y);

                let mut neighbor = |nx: usize, ny: usize| {
                    let idx = ny * width + nx;
                    if marked[idx] && !visited[idx] {
                        visited[idx] = true;
                        stack.push((nx, ny));
                    }
                };
                if x > 0 {
                    neighbor(x - 1, y);
                }
                if x + 1 < width {
                    neighbor(x + 1, y);
                }
                if y > 0 {
                    neighbor(x, y - 1);
                }
                if y + 1 < height {
                    neighbor(x, y + 1);
                }
            }

            regions.push(Rect::new(
                min_x as u16,
                min_y as u16,
                (max_x - min_x + 1) as u16,
                (max_y - min_y + 1) as u16,
            ));
        }
    }

    regions
}

/// Merge overlapping or one-cell-adjacent rects by repeated passes until
/// no pair merges. Quadratic in rect count; flood fill already coalesces
/// contiguous changes, so counts stay small.
fn merge_adjacent(regions: &mut Vec<Rect>) {
    loop {
        let mut merged_any = false;
        'pass: for i in 0..regions.len() {
            for j in (i + 1)..regions.len() {
                if regions[i].expand(1).intersects(&regions[j].expand(1)) {
                    let union = regions[i].union(&regions[j]);
                    regions[i] = union;
                    regions.swap_remove(j);
                    merged_any = true;
                    break 'pass;
                }
            }
        }
        if !merged_any {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;
    use crate::style::Style;

    fn blank(w: u16, h: u16) -> Buffer {
        Buffer::new(Size::new(w, h))
    }

    #[test]
    fn no_previous_is_full_region() {
        let buf = blank(80, 24);
        let result = diff(None, &buf);
        assert!(result.has_changes);
        assert_eq!(result.regions, vec![Rect::new(0, 0, 80, 24)]);
        assert_eq!(result.changed_cells, 80 * 24);
    }

    #[test]
    fn size_mismatch_is_full_region() {
        let prev = blank(40, 12);
        let cur = blank(80, 24);
        let result = diff(Some(&prev), &cur);
        assert_eq!(result.regions, vec![Rect::new(0, 0, 80, 24)]);
    }

    #[test]
    fn empty_buffer_no_previous_has_no_regions() {
        let buf = blank(0, 0);
        let result = diff(None, &buf);
        assert!(!result.has_changes);
        assert!(result.regions.is_empty());
    }

    #[test]
    fn identical_buffers_no_changes() {
        let prev = blank(20, 10);
        let cur = blank(20, 10);
        let result = diff(Some(&prev), &cur);
        assert!(!result.has_changes);
        assert!(result.regions.is_empty());
        assert_eq!(result.changed_cells, 0);
    }

    #[test]
    fn single_cell_change() {
        let prev = blank(20, 10);
        let mut cur = blank(20, 10);
        cur.set_cell(10, 5, 'X', Style::default());
        let result = diff(Some(&prev), &cur);
        assert!(result.has_changes);
        assert_eq!(result.changed_cells, 1);
        assert_eq!(result.regions, vec![Rect::new(10, 5, 1, 1)]);
    }

    #[test]
    fn style_only_change_is_dirty() {
        let mut prev = blank(20, 10);
        let mut cur = blank(20, 10);
        prev.set_cell(0, 0, 'A', Style::default());
        cur.set_cell(0, 0, 'A', Style::new().with_bold(true));
        let result = diff(Some(&prev), &cur);
        assert_eq!(result.changed_cells, 1);
    }

    #[test]
    fn contiguous_run_is_one_region() {
        let prev = blank(20, 10);
        let mut cur = blank(20, 10);
        cur.set_string(3, 4, "hello", Style::default());
        let result = diff(Some(&prev), &cur);
        assert_eq!(result.regions, vec![Rect::new(3, 4, 5, 1)]);
        assert_eq!(result.changed_cells, 5);
    }

    #[test]
    fn distant_changes_are_separate_regions() {
        let prev = blank(40, 20);
        let mut cur = blank(40, 20);
        cur.set_cell(2, 2, 'A', Style::default());
        cur.set_cell(30, 15, 'B', Style::default());
        let result = diff(Some(&prev), &cur);
        assert_eq!(result.regions.len(), 2);
        assert_eq!(result.changed_cells, 2);
    }

    #[test]
    fn one_cell_gap_merges() {
        let prev = blank(20, 5);
        let mut cur = blank(20, 5);
        cur.set_cell(3, 2, 'A', Style::default());
        cur.set_cell(5, 2, 'B', Style::default()); // gap at column 4
        let result = diff(Some(&prev), &cur);
        assert_eq!(result.regions, vec![Rect::new(3, 2, 3, 1)]);
        assert_eq!(result.changed_cells, 2);
    }

    #[test]
    fn two_cell_gap_stays_separate() {
        let prev = blank(20, 5);
        let mut cur = blank(20, 5);
        cur.set_cell(3, 2, 'A', Style::default());
        cur.set_cell(7, 2, 'B', Style::default()); // gap at columns 4-6
        let result = diff(Some(&prev), &cur);
        assert_eq!(result.regions.len(), 2);
    }

    #[test]
    fn l_shaped_change_is_one_bounding_region() {
        let prev = blank(10, 10);
        let mut cur = blank(10, 10);
        // Vertical arm plus horizontal arm sharing the corner at (2, 2).
        for y in 0..3 {
            cur.set_cell(2, y, '|', Style::default());
        }
        for x in 2..6 {
            cur.set_cell(x, 2, '-', Style::default());
        }
        let result = diff(Some(&prev), &cur);
        assert_eq!(result.regions, vec![Rect::new(2, 0, 4, 3)]);
    }

    #[test]
    fn regions_do_not_overlap() {
        let prev = blank(30, 30);
        let mut cur = blank(30, 30);
        for &(x, y) in &[(1, 1), (10, 1), (20, 5), (5, 20), (25, 25)] {
            cur.set_cell(x, y, '*', Style::default());
        }
        let result = diff(Some(&prev), &cur);
        for (i, a) in result.regions.iter().enumerate() {
            for b in result.regions.iter().skip(i + 1) {
                assert!(!a.intersects(b), "regions {a:?} and {b:?} overlap");
            }
        }
    }

    #[test]
    fn every_region_covers_a_change() {
        let prev = blank(30, 10);
        let mut cur = blank(30, 10);
        cur.set_string(0, 0, "left", Style::default());
        cur.set_string(20, 9, "right", Style::default());
        let result = diff(Some(&prev), &cur);
        for region in &result.regions {
            let mut covers = false;
            for y in region.y()..region.bottom() {
                for x in region.x()..region.right() {
                    if cur.get(x, y) != prev.get(x, y) {
                        covers = true;
                    }
                }
            }
            assert!(covers, "region {region:?} covers no changed cell");
        }
    }

    #[test]
    fn wide_char_change_marks_both_columns() {
        let prev = blank(10, 1);
        let mut cur = blank(10, 1);
        cur.set_cell(3, 0, '\u{4e16}', Style::default());
        let result = diff(Some(&prev), &cur);
        assert_eq!(result.changed_cells, 2);
        assert_eq!(result.regions, vec![Rect::new(3, 0, 2, 1)]);
    }

    #[test]
    fn unchanged_wide_row_is_clean() {
        let mut prev = blank(80, 1);
        prev.set_string(0, 0, "\u{4f60}\u{597d}", Style::default());
        let cur = prev.clone();
        let result = diff(Some(&prev), &cur);
        assert!(!result.has_changes);
    }

    #[test]
    fn merge_cascades_to_fixpoint() {
        // Three single cells in a diagonal staircase, each adjacent to the
        // next: the pairwise merges must cascade into one region.
        let prev = blank(10, 10);
        let mut cur = blank(10, 10);
        cur.set_cell(1, 1, 'a', Style::default());
        cur.set_cell(3, 3, 'b', Style::default());
        cur.set_cell(5, 5, 'c', Style::default());
        let result = diff(Some(&prev), &cur);
        // (1,1) and (3,3) have a one-cell diagonal gap; their expanded
        // boxes intersect, so they merge; the union then reaches (5,5).
        assert_eq!(result.regions, vec![Rect::new(1, 1, 5, 5)]);
    }
}
