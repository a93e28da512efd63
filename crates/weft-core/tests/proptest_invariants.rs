//! Property tests for the engine's universal invariants: buffer writes,
//! style merging, frame diffing, and flex sizing.

use proptest::prelude::*;

use weft_core::buffer::Buffer;
use weft_core::color::{Color, NamedColor};
use weft_core::diff::diff;
use weft_core::geometry::{Rect, Size};
use weft_core::layout::{BoxConstraints, Dimension, LayoutNode, MeasureCache, place};
use weft_core::style::Style;

fn arb_color() -> impl Strategy<Value = Color> {
    prop_oneof![
        prop_oneof![
            Just(NamedColor::Black),
            Just(NamedColor::Red),
            Just(NamedColor::Green),
            Just(NamedColor::Blue),
            Just(NamedColor::BrightWhite),
        ]
        .prop_map(Color::Named),
        (0u8..=255).prop_map(Color::Indexed),
        (any::<u8>(), any::<u8>(), any::<u8>()).prop_map(|(r, g, b)| Color::Rgb { r, g, b }),
    ]
}

fn arb_style() -> impl Strategy<Value = Style> {
    (
        proptest::option::of(arb_color()),
        proptest::option::of(arb_color()),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(fg, bg, bold, italic, underline, reverse)| {
            let mut style = Style::new()
                .with_bold(bold)
                .with_italic(italic)
                .with_underline(underline)
                .with_reverse(reverse);
            style.fg = fg;
            style.bg = bg;
            style
        })
}

/// Sparse cell writes into a fixed 24x10 buffer.
fn arb_writes() -> impl Strategy<Value = Vec<(u16, u16, char)>> {
    proptest::collection::vec(((0u16..24), (0u16..10), proptest::char::range('!', '~')), 0..40)
}

fn buffer_from(writes: &[(u16, u16, char)]) -> Buffer {
    let mut buf = Buffer::new(Size::new(24, 10));
    for &(x, y, ch) in writes {
        buf.set_cell(x, y, ch, Style::default());
    }
    buf
}

proptest! {
    #[test]
    fn set_then_get_round_trips_in_bounds(
        x in 0u16..30,
        y in 0u16..12,
        ch in proptest::char::range('!', '~'),
        style in arb_style(),
    ) {
        let mut buf = Buffer::new(Size::new(24, 10));
        buf.set_cell(x, y, ch, style);
        match buf.get(x, y) {
            Some(cell) if x < 24 && y < 10 => {
                prop_assert_eq!(cell.ch, ch);
                prop_assert_eq!(cell.style, style);
                prop_assert_eq!(cell.width, 1);
            }
            Some(_) => prop_assert!(false, "get returned a cell out of bounds"),
            None => prop_assert!(x >= 24 || y >= 10),
        }
    }

    #[test]
    fn merge_with_empty_is_identity(style in arb_style()) {
        let empty = Style::new();
        prop_assert_eq!(empty.merge(&style), style);
        prop_assert_eq!(style.merge(&empty), style);
    }

    #[test]
    fn merge_right_operand_colors_win(a in arb_style(), b in arb_style()) {
        let merged = a.merge(&b);
        prop_assert_eq!(merged.fg, b.fg.or(a.fg));
        prop_assert_eq!(merged.bg, b.bg.or(a.bg));
        prop_assert_eq!(merged.attrs, a.attrs | b.attrs);
    }

    #[test]
    fn equal_buffers_diff_clean(writes in arb_writes()) {
        let a = buffer_from(&writes);
        let b = buffer_from(&writes);
        let result = diff(Some(&a), &b);
        prop_assert!(!result.has_changes);
        prop_assert_eq!(result.changed_cells, 0);
    }

    #[test]
    fn absent_previous_is_one_full_region(writes in arb_writes()) {
        let buf = buffer_from(&writes);
        let result = diff(None, &buf);
        prop_assert_eq!(result.regions, vec![Rect::new(0, 0, 24, 10)]);
        prop_assert_eq!(result.changed_cells, 24 * 10);
    }

    #[test]
    fn regions_disjoint_and_each_covers_a_change(
        before in arb_writes(),
        after in arb_writes(),
    ) {
        let a = buffer_from(&before);
        let b = buffer_from(&after);
        let result = diff(Some(&a), &b);

        for (i, r1) in result.regions.iter().enumerate() {
            prop_assert!(!r1.is_empty());
            for r2 in result.regions.iter().skip(i + 1) {
                prop_assert!(!r1.intersects(r2), "{r1:?} overlaps {r2:?}");
            }
        }

        for region in &result.regions {
            let mut covers = false;
            for y in region.y()..region.bottom() {
                for x in region.x()..region.right() {
                    if a.get(x, y) != b.get(x, y) {
                        covers = true;
                    }
                }
            }
            prop_assert!(covers, "region {region:?} covers no change");
        }
    }

    #[test]
    fn changed_cells_counts_exact_differences(
        before in arb_writes(),
        after in arb_writes(),
    ) {
        let a = buffer_from(&before);
        let b = buffer_from(&after);
        let result = diff(Some(&a), &b);

        let mut expected = 0usize;
        for y in 0..10u16 {
            for x in 0..24u16 {
                if a.get(x, y) != b.get(x, y) {
                    expected += 1;
                }
            }
        }
        prop_assert_eq!(result.changed_cells, expected);
        prop_assert_eq!(result.has_changes, expected > 0);
    }

    #[test]
    fn flex_children_fit_inside_container(
        sizes in proptest::collection::vec((1u16..30, 0u16..3), 1..6),
        gap in 0u16..4,
        main in 20u16..200,
    ) {
        let mut root = LayoutNode::row("root").with_gap(gap);
        for (i, (width, grow)) in sizes.iter().enumerate() {
            root.children.push(
                LayoutNode::text(format!("root.c{i}"), "")
                    .with_width(Dimension::Cells(*width))
                    .with_height(Dimension::Cells(1))
                    .with_flex_grow(*grow),
            );
        }

        let fixed_total: u32 = sizes
            .iter()
            .filter(|(_, grow)| *grow == 0)
            .map(|(w, _)| u32::from(*w))
            .sum();
        let gap_total = u32::from(gap) * (sizes.len().saturating_sub(1)) as u32;

        let cache = MeasureCache::new();
        place::measure_and_layout(&mut root, Size::new(main, 4), &cache);

        // When nothing overflows, the packed children plus gaps fit the
        // container's inner main size.
        if fixed_total + gap_total <= u32::from(main) {
            let occupied: u32 = root
                .children
                .iter()
                .map(|c| u32::from(c.rect.unwrap_or_default().width()))
                .sum::<u32>()
                + gap_total;
            prop_assert!(
                occupied <= u32::from(main),
                "children + gaps {} exceed container {}",
                occupied,
                main
            );
        }
    }

    #[test]
    fn measure_is_idempotent(writes in arb_writes()) {
        // Measuring the same tree twice under the same constraints gives
        // the same answer (cache on the second pass).
        let text: String = writes.iter().take(8).map(|&(_, _, ch)| ch).collect();
        let mut node = LayoutNode::text("t", text);
        let cache = MeasureCache::new();
        let constraints = BoxConstraints::loose(Size::new(40, 10));
        let first = weft_core::layout::measure(&mut node, constraints, &cache);
        let second = weft_core::layout::measure(&mut node, constraints, &cache);
        prop_assert_eq!(first, second);
    }
}
