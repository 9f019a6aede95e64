//! Formatting structure construction.
//!
//! [§ 9.2 Controlling box generation](https://www.w3.org/TR/CSS2/visuren.html#box-gen)
//!
//! Turns the element tree into one normalized root box in five steps:
//! tree construction, white space processing, anonymous table objects,
//! anonymous block boxes around inline runs, and splitting inline boxes
//! around block-level descendants.

pub mod anonymous;
pub mod markers;
pub mod whitespace;

use quire_dom::{NodeId, NodeType};

use crate::config::LayoutContext;
use crate::error::{LayoutError, Result};
use crate::layout::{BoxKind, LayoutBox, TableInfo, check_invariants};
use crate::style::{
    ComputedStyle, ContentItem, Display, ListStylePosition, PseudoElement, StyleTarget,
};

pub use anonymous::{block_in_inline, inline_in_block, table_fixup};
pub use markers::{marker_box, marker_text};
pub use whitespace::process_whitespace;

/// Build the normalized box tree of the document element.
///
/// # Errors
/// [`LayoutError::Invariant`] when the tree has no document element,
/// [`LayoutError::MissingStyle`] when an element has no computed style and
/// [`LayoutError::UnsupportedDisplay`] for display values without a layout
/// model here.
pub fn build_formatting_structure(ctx: &LayoutContext<'_>) -> Result<LayoutBox> {
    let root = ctx
        .tree
        .document_element()
        .ok_or_else(|| LayoutError::Invariant("document has no root element".to_string()))?;

    // STEP 1: Tree construction.
    //
    // [§ 2.7](https://www.w3.org/TR/css-display-3/#transformations)
    // "The root element's display type is always blockified."
    let mut root_style = ctx
        .styles
        .style_for(StyleTarget::Element(root), None)
        .ok_or(LayoutError::MissingStyle(root))?;
    root_style.display = root_style.display.blockified();
    let root_box = match element_to_box(ctx, root, root_style, 1)? {
        Some(bx) => bx,
        None => LayoutBox::new(
            BoxKind::Block,
            ComputedStyle::with_display(Display::Block),
            Some(root),
        ),
    };

    // STEP 2: White space processing.
    let root_box = process_whitespace(root_box);
    // STEP 3: Anonymous table objects.
    let root_box = table_fixup(root_box);
    // STEP 4: Inline-level runs inside block containers.
    let root_box = inline_in_block(root_box);
    // STEP 5: Block-level boxes inside inline boxes.
    let root_box = block_in_inline(root_box);

    debug_assert!(
        check_invariants(&root_box).is_ok(),
        "builder produced a malformed box tree"
    );
    log::debug!(
        "built formatting structure: {} boxes",
        root_box.descendants().count()
    );
    Ok(root_box)
}

/// [§ 4.9.11](https://html.spec.whatwg.org/multipage/tables.html#attributes-common-to-td-and-th-elements)
///
/// "The td and th elements may have a colspan content attribute specified,
/// whose value must be a valid non-negative integer greater than zero and
/// less than or equal to 1000." Larger spans are clamped to the limit.
const MAX_COLSPAN: usize = 1000;

/// "... rowspan ... less than or equal to 65534."
const MAX_ROWSPAN: usize = 65534;

/// [§ 9.2.4 The 'display' property](https://www.w3.org/TR/CSS2/visuren.html#display-prop)
///
/// The box kind `display` generates for `element`; `None` for
/// `display: none`.
fn kind_for_display(
    element: NodeId,
    display: Display,
    colspan: Option<i64>,
    rowspan: Option<i64>,
    span: Option<i64>,
) -> Result<Option<BoxKind>> {
    // Zero or negative spans count as one, except rowspan="0" which spans
    // the rest of the row group.
    let positive = |value: Option<i64>, max: usize| {
        value
            .and_then(|v| usize::try_from(v).ok())
            .filter(|&v| v > 0)
            .map_or(1, |v| v.min(max))
    };
    let kind = match display {
        Display::None => return Ok(None),
        Display::Block | Display::ListItem => BoxKind::Block,
        Display::Inline => BoxKind::Inline,
        Display::InlineBlock => BoxKind::InlineBlock,
        Display::Table | Display::InlineTable => BoxKind::Table(TableInfo {
            inline: display == Display::InlineTable,
            ..TableInfo::default()
        }),
        Display::TableRowGroup | Display::TableHeaderGroup | Display::TableFooterGroup => {
            BoxKind::TableRowGroup
        }
        Display::TableRow => BoxKind::TableRow,
        Display::TableCell => BoxKind::TableCell {
            colspan: positive(colspan, MAX_COLSPAN),
            rowspan: rowspan
                .and_then(|v| usize::try_from(v).ok())
                .map_or(1, |v| v.min(MAX_ROWSPAN)),
        },
        Display::TableColumn => BoxKind::TableColumn {
            span: positive(span, MAX_COLSPAN),
        },
        Display::TableColumnGroup => BoxKind::TableColumnGroup {
            span: positive(span, MAX_COLSPAN),
        },
        Display::TableCaption
        | Display::Flex
        | Display::InlineFlex
        | Display::Grid
        | Display::InlineGrid
        | Display::RunIn
        | Display::Contents => {
            return Err(LayoutError::UnsupportedDisplay { element, display });
        }
    };
    Ok(Some(kind))
}

/// Build the box of `element` and its subtree. `ordinal` is the list item
/// number used when the element is a list item.
fn element_to_box(
    ctx: &LayoutContext<'_>,
    element: NodeId,
    style: ComputedStyle,
    ordinal: i64,
) -> Result<Option<LayoutBox>> {
    let Some(data) = ctx.tree.as_element(element) else {
        return Ok(None);
    };

    // [§ 10.3.2 Inline, replaced elements](https://www.w3.org/TR/CSS2/visudet.html#inline-replaced-width)
    //
    // Images with known intrinsics are replaced; their children are never
    // visited. Otherwise the alternative text stands in.
    if data.tag_name.eq_ignore_ascii_case("img") && style.display != Display::None {
        if let Some(intrinsics) = data.attr("src").and_then(|src| ctx.replaced.resolve(src)) {
            let block_level = style.display.blockified() == style.display;
            let kind = BoxKind::Replaced {
                intrinsics,
                block_level,
            };
            return Ok(Some(LayoutBox::new(kind, style, Some(element))));
        }
        return Ok(data.attr("alt").filter(|alt| !alt.is_empty()).map(|alt| {
            let text = LayoutBox::text(alt, ComputedStyle::anonymous_from(&style));
            LayoutBox {
                children: vec![text],
                ..LayoutBox::new(BoxKind::Inline, style, Some(element))
            }
        }));
    }

    let Some(kind) = kind_for_display(
        element,
        style.display,
        data.integer_attr("colspan"),
        data.integer_attr("rowspan"),
        data.integer_attr("span"),
    )?
    else {
        return Ok(None);
    };

    let mut bx = LayoutBox::new(kind, style, Some(element));

    if let Some(before) = pseudo_box(ctx, element, PseudoElement::Before)? {
        bx.children.push(before);
    }

    // [§ 12.4 Automatic counters and numbering](https://www.w3.org/TR/CSS2/generate.html#counters)
    //
    // Items of an `<ol start>` count from `start`; `<li value>` resets the
    // count for itself and the items after it.
    let mut counter = if data.tag_name.eq_ignore_ascii_case("ol") {
        data.integer_attr("start").unwrap_or(1)
    } else {
        1
    };

    for &child in ctx.tree.children(element) {
        let Some(node) = ctx.tree.get(child) else {
            continue;
        };
        match &node.node_type {
            NodeType::Element(child_data) => {
                let child_style = ctx
                    .styles
                    .style_for(StyleTarget::Element(child), None)
                    .ok_or(LayoutError::MissingStyle(child))?;
                let is_item = child_style.display == Display::ListItem;
                if is_item {
                    if let Some(value) = child_data.integer_attr("value") {
                        counter = value;
                    }
                }
                if let Some(child_box) = element_to_box(ctx, child, child_style, counter)? {
                    bx.children.push(child_box);
                }
                if is_item {
                    counter += 1;
                }
            }
            NodeType::Text(text) => {
                bx.children
                    .push(LayoutBox::text(text, ComputedStyle::anonymous_from(&bx.style)));
            }
            NodeType::Comment(_) | NodeType::Document => {}
        }
    }

    if let Some(after) = pseudo_box(ctx, element, PseudoElement::After)? {
        bx.children.push(after);
    }

    // [§ 12.5 Lists](https://www.w3.org/TR/CSS2/generate.html#lists)
    if bx.style.display == Display::ListItem {
        if let Some(marker) = marker_box(ctx, element, &bx.style, ordinal) {
            match bx.style.list_style_position {
                ListStylePosition::Inside => bx.children.insert(0, marker),
                ListStylePosition::Outside => bx.outside_marker = Some(Box::new(marker)),
            }
        }
    }

    Ok(Some(bx))
}

/// [§ 12.1 The :before and :after pseudo-elements](https://www.w3.org/TR/CSS2/generate.html#before-after-content)
///
/// "Authors specify the style and location of generated content with the
/// :before and :after pseudo-elements." Only string items generate text
/// here; page counters belong to margin boxes.
fn pseudo_box(
    ctx: &LayoutContext<'_>,
    element: NodeId,
    pseudo: PseudoElement,
) -> Result<Option<LayoutBox>> {
    let Some(style) = ctx
        .styles
        .style_for(StyleTarget::Element(element), Some(pseudo))
        .filter(ComputedStyle::has_content)
    else {
        return Ok(None);
    };

    let text: String = style
        .content
        .iter()
        .flatten()
        .filter_map(|item| match item {
            ContentItem::Text(text) => Some(text.as_str()),
            ContentItem::PageCounter | ContentItem::PagesCounter => None,
        })
        .collect();

    let Some(kind) = kind_for_display(element, style.display, None, None, None)? else {
        return Ok(None);
    };
    let mut bx = LayoutBox::new(kind, style, Some(element));
    if !text.is_empty() {
        bx.children
            .push(LayoutBox::text(&text, ComputedStyle::anonymous_from(&bx.style)));
    }
    Ok(Some(bx))
}
