//! Integration tests for the page driver and page-margin boxes.

mod common;

use std::collections::HashMap;

use common::{Doc, block, block_of_height, fragment, line_texts, margins, px, styled};
use quire_dom::NodeId;
use quire_layout::style::{ContentItem, PageBreak};
use quire_layout::{
    BoxKind, ComputedStyle, Display, LayoutBox, LayoutError, MarginArea, PageRule, PageSelector,
    PageSide, layout_document,
};

/// Number of children of the root fragment on each page.
fn children_per_page(pages: &[LayoutBox]) -> Vec<usize> {
    pages
        .iter()
        .map(|page| fragment(page).map_or(0, |root| root.children.len()))
        .collect()
}

fn margin_box(page: &LayoutBox, area: MarginArea) -> Option<&LayoutBox> {
    page.children
        .iter()
        .find(|child| child.kind == BoxKind::MarginBox(area))
}

/// A page style with the same 10px margins as the default page.
fn page_style() -> ComputedStyle {
    ComputedStyle {
        margin: margins(10.0),
        ..block()
    }
}

fn content(items: Vec<ContentItem>) -> ComputedStyle {
    ComputedStyle {
        content: Some(items),
        ..styled(Display::Block)
    }
}

#[test]
fn test_blocks_flow_onto_following_pages() {
    // Five 30px blocks in an 80px page area.
    let mut doc = Doc::new();
    let root = doc.element(NodeId::ROOT, "div", block());
    for _ in 0..5 {
        let _ = doc.element(root, "p", block_of_height(30.0));
    }

    let pages = doc.pages();
    assert_eq!(children_per_page(&pages), vec![2, 2, 1]);

    let second = fragment(&pages[1]).expect("second page has content");
    assert_eq!(second.children[0].dimensions.content.y, 10.0);
    assert_eq!(second.dimensions.margin.top, 0.0);

    for (index, page) in pages.iter().enumerate() {
        let BoxKind::Page(page_type) = page.kind else {
            panic!("expected a page box");
        };
        assert_eq!(page_type.index, index);
        assert_eq!(page_type.first, index == 0);
    }
}

#[test]
fn test_split_block_drops_edges_at_the_break() {
    let mut doc = Doc::new();
    let root = doc.element(
        NodeId::ROOT,
        "div",
        ComputedStyle {
            padding: common::paddings(5.0),
            ..block()
        },
    );
    for _ in 0..3 {
        let _ = doc.element(root, "p", block_of_height(30.0));
    }

    let pages = doc.pages();
    assert_eq!(pages.len(), 2);
    let first = fragment(&pages[0]).expect("first fragment");
    let second = fragment(&pages[1]).expect("second fragment");
    assert_eq!(first.dimensions.padding.top, 5.0);
    assert_eq!(first.dimensions.padding.bottom, 0.0);
    assert_eq!(second.dimensions.padding.top, 0.0);
    assert_eq!(second.dimensions.padding.bottom, 5.0);
}

#[test]
fn test_lines_continue_on_the_next_page() {
    // Two eight-letter words per 180px line, six 12px lines per page.
    let mut doc = Doc::new();
    let div = doc.element(NodeId::ROOT, "div", block());
    let words: Vec<String> = (0..20).map(|i| format!("word{i:04}")).collect();
    doc.text(div, &words.join(" "));

    let pages = doc.pages();
    assert_eq!(pages.len(), 2);
    let first = line_texts(fragment(&pages[0]).expect("first fragment"));
    let second = line_texts(fragment(&pages[1]).expect("second fragment"));
    assert_eq!(first.len(), 6);
    assert_eq!(second.len(), 4);
    assert_eq!(first[0], "word0000 word0001");
    assert_eq!(second[0], "word0012 word0013");

    let all: Vec<&str> = first
        .iter()
        .chain(&second)
        .flat_map(|line| line.split(' '))
        .collect();
    assert_eq!(all, words.iter().map(String::as_str).collect::<Vec<_>>());
}

#[test]
fn test_forced_break_starts_a_new_page() {
    let mut doc = Doc::new();
    let root = doc.element(NodeId::ROOT, "div", block());
    let _ = doc.element(root, "p", block_of_height(10.0));
    let _ = doc.element(
        root,
        "p",
        ComputedStyle {
            page_break_before: PageBreak::Always,
            ..block_of_height(10.0)
        },
    );
    let _ = doc.element(root, "p", block_of_height(10.0));

    let pages = doc.pages();
    assert_eq!(children_per_page(&pages), vec![1, 2]);
}

#[test]
fn test_right_break_inserts_a_blank_left_page() {
    let mut doc = Doc::new();
    let root = doc.element(NodeId::ROOT, "div", block());
    let _ = doc.element(root, "p", block_of_height(10.0));
    let _ = doc.element(
        root,
        "p",
        ComputedStyle {
            page_break_before: PageBreak::Right,
            ..block_of_height(10.0)
        },
    );

    let pages = doc.pages();
    assert_eq!(pages.len(), 3);
    let BoxKind::Page(blank) = pages[1].kind else {
        panic!("expected a page box");
    };
    assert!(blank.blank);
    assert_eq!(blank.side, PageSide::Left);
    assert!(fragment(&pages[1]).is_none());
    assert_eq!(children_per_page(&pages), vec![1, 0, 1]);
}

#[test]
fn test_over_tall_block_is_placed_on_an_empty_page() {
    let mut doc = Doc::new();
    let root = doc.element(NodeId::ROOT, "div", block());
    let _ = doc.element(root, "p", block_of_height(10.0));
    let _ = doc.element(root, "p", block_of_height(500.0));

    let pages = doc.pages();
    assert_eq!(children_per_page(&pages), vec![1, 1]);
    let tall = &fragment(&pages[1]).expect("second fragment").children[0];
    assert_eq!(tall.dimensions.content.height, 500.0);
}

#[test]
fn test_table_rows_are_not_split() {
    let mut doc = Doc::new();
    let div = doc.element(NodeId::ROOT, "div", block());
    let table = doc.element(div, "table", styled(Display::Table));
    for _ in 0..5 {
        let tr = doc.element(
            table,
            "tr",
            ComputedStyle {
                height: px(30.0),
                ..styled(Display::TableRow)
            },
        );
        let _ = doc.element(tr, "td", styled(Display::TableCell));
    }

    let pages = doc.pages();
    let rows: Vec<usize> = pages
        .iter()
        .map(|page| {
            let table = &fragment(page).expect("table fragment").children[0];
            table.children.iter().map(|group| group.children.len()).sum::<usize>()
        })
        .collect();
    assert_eq!(rows, vec![2, 2, 1]);
}

#[test]
fn test_page_cap_is_an_error() {
    let mut doc = Doc::new();
    doc.config.max_pages = 2;
    let root = doc.element(NodeId::ROOT, "div", block());
    for _ in 0..5 {
        let _ = doc.element(root, "p", block_of_height(30.0));
    }

    let error = layout_document(&doc.ctx()).unwrap_err();
    assert!(matches!(error, LayoutError::TooManyPages { limit: 2 }));
}

#[test]
fn test_margin_boxes_show_page_counters() {
    let mut doc = Doc::new();
    doc.page_rule(PageRule {
        selector: PageSelector::default(),
        style: page_style(),
        margin_boxes: HashMap::from([(
            MarginArea::BottomCenter,
            content(vec![
                ContentItem::Text("Page ".to_string()),
                ContentItem::PageCounter,
                ContentItem::Text(" of ".to_string()),
                ContentItem::PagesCounter,
            ]),
        )]),
    });
    let root = doc.element(NodeId::ROOT, "div", block());
    for _ in 0..3 {
        let _ = doc.element(root, "p", block_of_height(30.0));
    }

    let pages = doc.pages();
    assert_eq!(pages.len(), 2);
    for (index, page) in pages.iter().enumerate() {
        let footer = margin_box(page, MarginArea::BottomCenter).expect("footer generated");
        assert_eq!(footer.text_content(), format!("Page {} of 2", index + 1));
        assert_eq!(footer.dimensions.content.y, 90.0);
        // Painted after the page content.
        assert!(matches!(page.children.last(), Some(last) if last.kind == BoxKind::MarginBox(MarginArea::BottomCenter)));
    }
    assert!(margin_box(&pages[0], MarginArea::TopCenter).is_none());
}

#[test]
fn test_first_page_rule_adds_a_header() {
    let mut doc = Doc::new();
    doc.page_rule(PageRule {
        selector: PageSelector::default(),
        style: page_style(),
        margin_boxes: HashMap::new(),
    });
    doc.page_rule(PageRule {
        selector: PageSelector {
            first: true,
            ..PageSelector::default()
        },
        style: page_style(),
        margin_boxes: HashMap::from([(
            MarginArea::TopCenter,
            content(vec![ContentItem::Text("Title".to_string())]),
        )]),
    });
    let root = doc.element(NodeId::ROOT, "div", block());
    for _ in 0..3 {
        let _ = doc.element(root, "p", block_of_height(30.0));
    }

    let pages = doc.pages();
    assert_eq!(pages.len(), 2);
    let header = margin_box(&pages[0], MarginArea::TopCenter).expect("header on the first page");
    assert_eq!(header.text_content(), "Title");
    assert!(margin_box(&pages[1], MarginArea::TopCenter).is_none());
}

#[test]
fn test_page_rule_margins_shape_the_page_area() {
    let mut doc = Doc::new();
    doc.page_rule(PageRule {
        selector: PageSelector::default(),
        style: ComputedStyle {
            margin: margins(20.0),
            ..block()
        },
        margin_boxes: HashMap::new(),
    });
    let _ = doc.element(NodeId::ROOT, "div", block_of_height(10.0));

    let pages = doc.pages();
    let area = pages[0].dimensions.content;
    assert_eq!((area.x, area.y, area.width, area.height), (20.0, 20.0, 160.0, 60.0));
    assert_eq!(fragment(&pages[0]).expect("root fragment").dimensions.content.x, 20.0);
}
