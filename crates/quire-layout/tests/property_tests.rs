//! Property tests for the sizing equations, the margin-box solver, line
//! splitting and the page driver.

mod common;

use common::{Doc, block, block_of_height};
use quickcheck_macros::quickcheck;
use quire_dom::NodeId;
use quire_layout::layout::percentages::resolve_percentages;
use quire_layout::layout::{AutoOr, solve_axis, split_inline_level};
use quire_layout::page::EdgeBox;
use quire_layout::style::{LengthPercentage, LengthPercentageOrAuto, Sides};
use quire_layout::{BoxKind, ComputedStyle, ContainingBlock, LayoutBox, MarginBoxSolver, layout_document};

const TOLERANCE: f32 = 1e-2;

fn auto_or(auto: bool, value: u16) -> AutoOr {
    if auto {
        AutoOr::Auto
    } else {
        AutoOr::Length(f32::from(value % 500))
    }
}

fn percentage_or_px(percent: bool, value: u16) -> LengthPercentageOrAuto {
    if percent {
        LengthPercentageOrAuto::Percent(f32::from(value % 200))
    } else {
        LengthPercentageOrAuto::Px(f32::from(value % 500))
    }
}

#[quickcheck]
fn prop_percentage_resolution_is_idempotent(values: (u16, u16, u16, u16), width: u16, height: Option<u16>) -> bool {
    let (w, m, p, h) = values;
    let style = ComputedStyle {
        width: percentage_or_px(w % 2 == 0, w),
        height: percentage_or_px(h % 2 == 0, h),
        margin: Sides::all(percentage_or_px(m % 2 == 0, m)),
        padding: Sides::all(LengthPercentage::Percent(f32::from(p % 100))),
        ..block()
    };
    let cb = ContainingBlock {
        x: 0.0,
        width: f32::from(width),
        height: height.map(f32::from),
    };

    let mut bx = LayoutBox::new(BoxKind::Block, style, None);
    resolve_percentages(&mut bx, &cb);
    let once = bx.used;
    resolve_percentages(&mut bx, &cb);
    once == bx.used
}

#[quickcheck]
fn prop_solved_axis_fills_the_available_space(
    autos: (bool, bool, bool),
    values: (u16, u16, u16, u16),
    available: u16,
) -> bool {
    let (start, size, end, pb) = values;
    let available = f32::from(available % 1000);
    let solved = solve_axis(
        available,
        auto_or(autos.0, start),
        f32::from(pb % 100),
        auto_or(autos.1, size),
        auto_or(autos.2, end),
    );
    (solved.outer(f32::from(pb % 100)) - available).abs() < TOLERANCE
}

/// Bits: 1 = absent, 2 = auto start margin, 4 = auto inner size, 8 = auto
/// end margin.
fn edge_box(bits: u8, values: (u16, u16, u16, u16)) -> EdgeBox {
    if bits & 1 != 0 {
        return EdgeBox::ABSENT;
    }
    let (margin, inner, min, extra) = values;
    let min_content = f32::from(min % 100);
    EdgeBox {
        margin_start: auto_or(bits & 2 != 0, margin % 50),
        inner: auto_or(bits & 4 != 0, inner % 200),
        margin_end: auto_or(bits & 8 != 0, margin % 30),
        padding_border: f32::from(extra % 10),
        min_content,
        max_content: min_content + f32::from(extra % 150),
    }
}

#[quickcheck]
fn prop_solved_edges_sum_to_their_length(
    bits: (u8, u8, u8),
    a: (u16, u16, u16, u16),
    b: (u16, u16, u16, u16),
    c: (u16, u16, u16, u16),
    length: u16,
) -> bool {
    let solver = MarginBoxSolver::new().expect("solver table is complete");
    let boxes = [edge_box(bits.0, a), edge_box(bits.1, b), edge_box(bits.2, c)];
    let length = f32::from(length % 1000);
    let solution = solver.solve(boxes, length);
    if solution.degraded {
        return true;
    }
    let total: f32 = solution
        .sizes
        .iter()
        .zip(&boxes)
        .map(|(sizes, edge_box)| sizes.outer(edge_box.padding_border))
        .sum();
    (total - length).abs() < TOLERANCE
}

#[quickcheck]
fn prop_a_fitting_first_word_is_never_deferred(words: Vec<u8>, slack: u8) -> bool {
    let words: Vec<String> = words
        .iter()
        .take(20)
        .map(|len| "x".repeat(usize::from(len % 8) + 1))
        .collect();
    let Some(first) = words.first() else {
        return true;
    };
    let doc = Doc::new();
    let ctx = doc.ctx();
    let text = LayoutBox::text(&words.join(" "), block());
    let available = (first.len() * 10) as f32 + f32::from(slack % 50);
    let cb = ContainingBlock::with_width(0.0, available);

    let Ok(split) = split_inline_level(&ctx, &text, available, 0.0, None, false, &cb) else {
        return false;
    };
    split
        .fragment
        .as_ref()
        .and_then(LayoutBox::text_str)
        .is_some_and(|placed| placed.starts_with(first.as_str()))
}

/// Each item is a fixed-height block (even tag) or a paragraph of words.
#[quickcheck]
fn prop_pagination_places_every_word_once(items: Vec<(u8, u8)>) -> bool {
    let mut doc = Doc::new();
    let root = doc.element(NodeId::ROOT, "div", block());
    let mut expected: Vec<String> = Vec::new();
    for (i, (tag, size)) in items.iter().take(12).enumerate() {
        if tag % 2 == 0 {
            let _ = doc.element(root, "div", block_of_height(f32::from(size % 120) + 1.0));
        } else {
            let p = doc.element(root, "p", block());
            let words: Vec<String> = (0..=size % 20).map(|j| format!("w{i}_{j}")).collect();
            doc.text(p, &words.join(" "));
            expected.extend(words);
        }
    }

    let Ok(pages) = layout_document(&doc.ctx()) else {
        return false;
    };
    let placed: Vec<String> = pages
        .iter()
        .flat_map(|page| page.descendants())
        .filter_map(LayoutBox::text_str)
        .flat_map(str::split_whitespace)
        .map(str::to_string)
        .collect();
    placed == expected && pages.len() <= doc.config.max_pages
}
