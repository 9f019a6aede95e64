//! Integration tests for block, inline, replaced and table layout on a
//! single page.

mod common;

use common::{Doc, block, fragment, inline, line_texts, margins, paddings, px, styled};
use quire_dom::NodeId;
use quire_layout::style::{
    LengthPercentage, LengthPercentageOrAuto, Sides, TableLayoutMode, TextAlign, WordBreak,
};
use quire_layout::{BoxKind, ComputedStyle, Display, Intrinsics, LayoutBox};

fn first_page(doc: &Doc) -> LayoutBox {
    let mut pages = doc.pages();
    assert!(!pages.is_empty());
    pages.swap_remove(0)
}

fn root_fragment(page: &LayoutBox) -> &LayoutBox {
    fragment(page).expect("the first page holds the root fragment")
}

#[test]
fn test_break_all_puts_one_glyph_per_line() {
    // Two 2px glyphs in a 3px wide block.
    let mut doc = Doc::new();
    let div = doc.element(
        NodeId::ROOT,
        "div",
        ComputedStyle {
            width: px(3.0),
            font_size: 2.0,
            word_break: WordBreak::BreakAll,
            ..block()
        },
    );
    doc.text(div, "AB");

    let page = first_page(&doc);
    assert_eq!(line_texts(root_fragment(&page)), vec!["A", "B"]);
}

#[test]
fn test_auto_margins_center_a_block() {
    let mut doc = Doc::new();
    let root = doc.element(NodeId::ROOT, "div", block());
    let _ = doc.element(
        root,
        "p",
        ComputedStyle {
            width: px(100.0),
            margin: Sides {
                left: LengthPercentageOrAuto::Auto,
                right: LengthPercentageOrAuto::Auto,
                ..margins(0.0)
            },
            height: px(10.0),
            ..block()
        },
    );

    let page = first_page(&doc);
    let p = &root_fragment(&page).children[0];
    assert_eq!(p.dimensions.content.width, 100.0);
    assert_eq!(p.dimensions.margin.left, 40.0);
    assert_eq!(p.dimensions.margin.right, 40.0);
    assert_eq!(p.dimensions.content.x, 50.0);
}

#[test]
fn test_sibling_margins_collapse() {
    let mut doc = Doc::new();
    let root = doc.element(NodeId::ROOT, "div", block());
    let _ = doc.element(
        root,
        "p",
        ComputedStyle {
            height: px(10.0),
            margin: margins(5.0),
            ..block()
        },
    );
    let _ = doc.element(
        root,
        "p",
        ComputedStyle {
            height: px(10.0),
            margin: margins(8.0),
            ..block()
        },
    );

    let page = first_page(&doc);
    let root = root_fragment(&page);
    let (first, second) = (&root.children[0], &root.children[1]);
    assert_eq!(first.dimensions.content.y, 15.0);
    // The larger of the two adjoining margins separates the border boxes.
    assert_eq!(
        second.dimensions.border_box().y - first.dimensions.border_box().bottom(),
        8.0
    );
    assert_eq!(second.dimensions.content.y, 33.0);
    // The last bottom margin stays inside the root's auto height.
    assert_eq!(root.dimensions.content.height, 41.0);
}

#[test]
fn test_percentages_resolve_against_the_containing_block() {
    let mut doc = Doc::new();
    let root = doc.element(NodeId::ROOT, "div", block());
    let _ = doc.element(
        root,
        "p",
        ComputedStyle {
            width: LengthPercentageOrAuto::Percent(50.0),
            padding: Sides::all(LengthPercentage::Percent(10.0)),
            height: px(5.0),
            ..block()
        },
    );

    let page = first_page(&doc);
    let p = &root_fragment(&page).children[0];
    assert_eq!(p.dimensions.content.width, 90.0);
    assert_eq!(p.dimensions.padding.left, 18.0);
    // Vertical padding percentages also refer to the width.
    assert_eq!(p.dimensions.padding.top, 18.0);
}

#[test]
fn test_max_width_clamps_auto_width() {
    let mut doc = Doc::new();
    let _ = doc.element(
        NodeId::ROOT,
        "div",
        ComputedStyle {
            max_width: Some(LengthPercentage::Px(50.0)),
            ..block()
        },
    );

    let page = first_page(&doc);
    assert_eq!(root_fragment(&page).dimensions.content.width, 50.0);
}

#[test]
fn test_text_align_center_offsets_the_line_content() {
    let mut doc = Doc::new();
    let div = doc.element(
        NodeId::ROOT,
        "div",
        ComputedStyle {
            text_align: TextAlign::Center,
            ..block()
        },
    );
    doc.text(div, "abc");

    let page = first_page(&doc);
    let line = &root_fragment(&page).children[0];
    assert!(line.is_line());
    // (180 - 30) / 2 from the left edge of the page area.
    assert_eq!(line.children[0].dimensions.content.x, 85.0);
}

#[test]
fn test_text_indent_applies_to_the_first_line_only() {
    let mut doc = Doc::new();
    let div = doc.element(
        NodeId::ROOT,
        "div",
        ComputedStyle {
            width: px(100.0),
            text_indent: LengthPercentage::Px(20.0),
            ..block()
        },
    );
    doc.text(div, "aaaa bbbb");

    let page = first_page(&doc);
    let root = root_fragment(&page);
    assert_eq!(line_texts(root), vec!["aaaa", "bbbb"]);
    assert_eq!(root.children[0].children[0].dimensions.content.x, 30.0);
    assert_eq!(root.children[1].children[0].dimensions.content.x, 10.0);
}

#[test]
fn test_lines_stack_at_the_line_height() {
    let mut doc = Doc::new();
    let div = doc.element(NodeId::ROOT, "div", ComputedStyle { width: px(50.0), ..block() });
    doc.text(div, "one two three");

    let page = first_page(&doc);
    let root = root_fragment(&page);
    assert_eq!(line_texts(root), vec!["one", "two", "three"]);
    let tops: Vec<f32> = root.children.iter().map(|line| line.dimensions.content.y).collect();
    assert_eq!(tops, vec![10.0, 22.0, 34.0]);
    assert_eq!(root.dimensions.content.height, 36.0);
}

#[test]
fn test_inline_block_shrinks_to_fit() {
    let mut doc = Doc::new();
    let div = doc.element(NodeId::ROOT, "div", block());
    let span = doc.element(div, "span", styled(Display::InlineBlock));
    doc.text(span, "ab abcd a");

    let page = first_page(&doc);
    let line = &root_fragment(&page).children[0];
    let inline_block = &line.children[0];
    assert_eq!(inline_block.kind, BoxKind::InlineBlock);
    assert_eq!(inline_block.dimensions.content.width, 90.0);
    assert_eq!(line_texts(inline_block), vec!["ab abcd a"]);
}

#[test]
fn test_inline_image_sets_the_line_height() {
    let mut doc = Doc::new();
    doc.images.insert("photo.png", Intrinsics::from_size(40.0, 20.0));
    let div = doc.element(NodeId::ROOT, "div", block());
    let _ = doc.element_with_attrs(div, "img", &[("src", "photo.png")], inline());

    let page = first_page(&doc);
    let line = &root_fragment(&page).children[0];
    let image = &line.children[0];
    assert!(image.is_replaced());
    assert_eq!(image.dimensions.content.width, 40.0);
    assert_eq!(image.dimensions.content.height, 20.0);
    // The image sits on the baseline: 20px above it, the strut's 3px
    // descent below.
    assert_eq!(image.dimensions.content.y, 10.0);
    assert_eq!(line.dimensions.content.height, 23.0);
}

#[test]
fn test_block_image_keeps_its_ratio() {
    let mut doc = Doc::new();
    doc.images.insert("wide.png", Intrinsics::from_size(100.0, 50.0));
    let div = doc.element(NodeId::ROOT, "div", block());
    let _ = doc.element_with_attrs(
        div,
        "img",
        &[("src", "wide.png")],
        ComputedStyle {
            width: px(60.0),
            ..block()
        },
    );

    let page = first_page(&doc);
    let image = &root_fragment(&page).children[0];
    assert!(image.is_replaced());
    assert_eq!(image.dimensions.content.width, 60.0);
    assert_eq!(image.dimensions.content.height, 30.0);
}

#[test]
fn test_fixed_table_shares_the_remaining_width() {
    // Columns of 10px, 10px and auto in a 40px table.
    let mut doc = Doc::new();
    let div = doc.element(NodeId::ROOT, "div", block());
    let table = doc.element(
        div,
        "table",
        ComputedStyle {
            width: px(40.0),
            table_layout: TableLayoutMode::Fixed,
            ..styled(Display::Table)
        },
    );
    for width in [px(10.0), px(10.0), LengthPercentageOrAuto::Auto] {
        let _ = doc.element(
            table,
            "col",
            ComputedStyle {
                width,
                ..styled(Display::TableColumn)
            },
        );
    }
    let tr = doc.element(table, "tr", styled(Display::TableRow));
    for text in ["a", "b", "c"] {
        let td = doc.element(tr, "td", styled(Display::TableCell));
        doc.text(td, text);
    }

    let page = first_page(&doc);
    let table = &root_fragment(&page).children[0];
    let BoxKind::Table(info) = &table.kind else {
        panic!("expected a table, got {}", table.describe());
    };
    assert_eq!(info.column_widths, vec![10.0, 10.0, 20.0]);
    assert_eq!(table.dimensions.content.width, 40.0);

    let row = &table.children[0].children[0];
    let xs: Vec<f32> = row.children.iter().map(|cell| cell.dimensions.content.x).collect();
    assert_eq!(xs, vec![10.0, 20.0, 30.0]);
    // Every cell is as tall as the row.
    assert!(row.children.iter().all(|cell| cell.dimensions.content.height == 12.0));
}

#[test]
fn test_outside_marker_sits_left_of_the_first_line() {
    let mut doc = Doc::new();
    let ul = doc.element(NodeId::ROOT, "ul", block());
    let li = doc.element(ul, "li", styled(Display::ListItem));
    doc.text(li, "item");

    let page = first_page(&doc);
    let item = &root_fragment(&page).children[0];
    let marker = item.outside_marker.as_deref().expect("list item has a marker");
    assert!(marker.dimensions.margin_box().right() <= item.dimensions.content.x);
    assert_eq!(marker.text_content(), "• ");
}

#[test]
fn test_padded_span_keeps_an_overflowing_word_on_the_first_line() {
    // An 80px word in a 50px block, inside a span with 5px left padding.
    let mut doc = Doc::new();
    let div = doc.element(NodeId::ROOT, "div", ComputedStyle { width: px(50.0), ..block() });
    let span = doc.element(
        div,
        "span",
        ComputedStyle {
            padding: Sides {
                left: LengthPercentage::Px(5.0),
                ..paddings(0.0)
            },
            ..inline()
        },
    );
    doc.text(span, "abcdefgh");

    let page = first_page(&doc);
    let root = root_fragment(&page);
    assert_eq!(line_texts(root), vec!["abcdefgh"]);
    let span = &root.children[0].children[0];
    assert_eq!(span.dimensions.padding.left, 5.0);
    assert_eq!(span.children[0].dimensions.content.x, 15.0);
}

#[test]
fn test_trailing_space_before_an_empty_span_is_removed() {
    let mut doc = Doc::new();
    let div = doc.element(
        NodeId::ROOT,
        "div",
        ComputedStyle {
            text_align: TextAlign::Right,
            ..block()
        },
    );
    doc.text(div, "abc ");
    let _ = doc.element(div, "span", inline());

    let page = first_page(&doc);
    let line = &root_fragment(&page).children[0];
    let text = &line.children[0];
    assert_eq!(text.text_str(), Some("abc"));
    // Flush with the right edge of the 180px page area.
    assert_eq!(text.dimensions.content.x, 160.0);
}
