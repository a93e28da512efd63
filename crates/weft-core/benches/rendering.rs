//! Rendering benchmarks — frame diff and escape-code encoding.

#![allow(missing_docs)]

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use weft_core::buffer::Buffer;
use weft_core::color::{Color, ColorSupport, NamedColor};
use weft_core::diff::diff;
use weft_core::encoder::Encoder;
use weft_core::geometry::Size;
use weft_core::style::Style;

/// Checkerboard of changed cells over an 80x24 grid.
fn benchmark_diff_80x24(c: &mut Criterion) {
    c.bench_function("diff_80x24", |b| {
        b.iter(|| {
            let previous = Buffer::new(Size::new(80, 24));
            let mut current = Buffer::new(Size::new(80, 24));
            let style = Style::new().with_foreground(Color::Named(NamedColor::Red));
            for y in 0..24 {
                for x in 0..80 {
                    if (x + y) % 2 == 0 {
                        current.set_cell(x, y, 'X', style);
                    }
                }
            }
            black_box(diff(Some(&previous), &current))
        })
    });
}

/// Sparse change pattern over a 200x60 grid.
fn benchmark_diff_200x60(c: &mut Criterion) {
    c.bench_function("diff_200x60", |b| {
        b.iter(|| {
            let previous = Buffer::new(Size::new(200, 60));
            let mut current = Buffer::new(Size::new(200, 60));
            let style = Style::new()
                .with_foreground(Color::Named(NamedColor::Blue))
                .with_bold(true);
            for y in 0..60 {
                for x in 0..200 {
                    if (x + y) % 4 == 0 {
                        current.set_cell(x, y, '*', style);
                    }
                }
            }
            black_box(diff(Some(&previous), &current))
        })
    });
}

/// Encode a few dirty lines of a mostly-clean frame.
fn benchmark_encode_dirty_lines(c: &mut Criterion) {
    let previous = Buffer::new(Size::new(120, 40));
    let mut current = Buffer::new(Size::new(120, 40));
    let style = Style::new().with_foreground(Color::Rgb {
        r: 200,
        g: 150,
        b: 40,
    });
    for y in (0..40).step_by(5) {
        current.set_string(0, y, "a reasonably long status line with content", style);
    }
    let dirty = diff(Some(&previous), &current);

    c.bench_function("encode_dirty_lines", |b| {
        b.iter(|| {
            let mut encoder = Encoder::new(ColorSupport::TrueColor);
            black_box(encoder.encode(&current, &dirty))
        })
    });
}

/// The full diff + encode hot path for one frame.
fn benchmark_diff_and_encode(c: &mut Criterion) {
    let previous = Buffer::new(Size::new(80, 24));
    let mut current = Buffer::new(Size::new(80, 24));
    let style = Style::new().with_background(Color::Indexed(236));
    for y in 0..24 {
        current.set_string(2, y, "column of repeated text", style);
    }

    c.bench_function("diff_and_encode_80x24", |b| {
        b.iter(|| {
            let dirty = diff(Some(&previous), &current);
            let mut encoder = Encoder::new(ColorSupport::TrueColor);
            black_box(encoder.encode(&current, &dirty))
        })
    });
}

criterion_group!(
    benches,
    benchmark_diff_80x24,
    benchmark_diff_200x60,
    benchmark_encode_dirty_lines,
    benchmark_diff_and_encode
);
criterion_main!(benches);
