//! Anonymous box generation.
//!
//! Three passes that make the box tree satisfy the structural invariants:
//!
//! - [`table_fixup`]: [§ 17.2.1 Anonymous table objects](https://www.w3.org/TR/CSS2/tables.html#anonymous-boxes)
//! - [`inline_in_block`]: [§ 9.2.1.1 Anonymous block boxes](https://www.w3.org/TR/CSS2/visuren.html#anonymous-block-level)
//! - [`block_in_inline`]: the same section, for block-level boxes inside
//!   inline boxes
//!
//! Each pass consumes the tree and returns a new one.

use crate::layout::{BoxKind, LayoutBox, TableInfo};
use crate::style::{ComputedStyle, Display, LengthPercentage, LengthPercentageOrAuto};

fn is_whitespace_text(bx: &LayoutBox) -> bool {
    matches!(&bx.kind, BoxKind::Text(text) if text.trim_matches(' ').is_empty())
        && bx.style.white_space.collapses_spaces()
}

const fn is_row_group(bx: &LayoutBox) -> bool {
    matches!(bx.kind, BoxKind::TableRowGroup)
}

const fn is_row(bx: &LayoutBox) -> bool {
    matches!(bx.kind, BoxKind::TableRow)
}

const fn is_cell(bx: &LayoutBox) -> bool {
    matches!(bx.kind, BoxKind::TableCell { .. })
}

const fn is_column_like(bx: &LayoutBox) -> bool {
    matches!(
        bx.kind,
        BoxKind::TableColumn { .. } | BoxKind::TableColumnGroup { .. }
    )
}

const fn is_table_internal(bx: &LayoutBox) -> bool {
    is_row_group(bx) || is_row(bx) || is_cell(bx) || is_column_like(bx)
}

/// [§ 17.2.1 Anonymous table objects](https://www.w3.org/TR/CSS2/tables.html#anonymous-boxes)
///
/// "Document languages other than HTML may not contain all the elements
/// in the CSS 2.1 table model. In these cases, the 'missing' elements must
/// be assumed in order for the table model to work."
#[must_use]
pub fn table_fixup(mut bx: LayoutBox) -> LayoutBox {
    let children: Vec<LayoutBox> = std::mem::take(&mut bx.children)
        .into_iter()
        .map(table_fixup)
        .collect();
    if let Some(marker) = bx.outside_marker.take() {
        bx.outside_marker = Some(Box::new(table_fixup(*marker)));
    }

    match &bx.kind {
        BoxKind::Table(_) => fix_table(bx, children),
        // "1.1 All child boxes of a 'table-column' parent are treated as if
        // they had 'display: none'."
        BoxKind::TableColumn { .. } => bx,
        // "1.2 If a child C of a 'table-column-group' parent is not a
        // 'table-column' box, then it is treated as if it had
        // 'display: none'."
        BoxKind::TableColumnGroup { .. } => {
            bx.children = children
                .into_iter()
                .filter(|child| matches!(child.kind, BoxKind::TableColumn { .. }))
                .collect();
            bx
        }
        BoxKind::TableRowGroup => {
            bx.children = fix_row_group_children(children, &bx.style);
            bx
        }
        BoxKind::TableRow => {
            bx.children = fix_row_children(children, &bx.style);
            bx
        }
        _ => {
            let inline = matches!(bx.kind, BoxKind::Inline | BoxKind::Line);
            bx.children = wrap_orphans(children, &bx.style, inline);
            bx
        }
    }
}

/// "2.1 An anonymous 'table-row' box must be generated around each sequence
/// of consecutive children of a 'table-row' parent that are not
/// 'table-cell' boxes." (here: an anonymous cell around each such run)
fn fix_row_children(children: Vec<LayoutBox>, row_style: &ComputedStyle) -> Vec<LayoutBox> {
    let mut out = Vec::new();
    let mut run: Vec<LayoutBox> = Vec::new();
    let flush = |run: &mut Vec<LayoutBox>, out: &mut Vec<LayoutBox>| {
        if run.is_empty() {
            return;
        }
        if run.iter().all(is_whitespace_text) {
            run.clear();
            return;
        }
        out.push(LayoutBox::anonymous(
            BoxKind::TableCell {
                colspan: 1,
                rowspan: 1,
            },
            ComputedStyle::anonymous_with_display(row_style, Display::TableCell),
            std::mem::take(run),
        ));
    };
    for child in children {
        if is_cell(&child) {
            flush(&mut run, &mut out);
            out.push(child);
        } else {
            run.push(child);
        }
    }
    flush(&mut run, &mut out);
    out
}

/// "2.2 An anonymous 'table-row' box must be generated around each sequence
/// of consecutive children of a 'table-row-group' parent that are not
/// 'table-row' boxes."
fn fix_row_group_children(children: Vec<LayoutBox>, group_style: &ComputedStyle) -> Vec<LayoutBox> {
    let mut out = Vec::new();
    let mut run: Vec<LayoutBox> = Vec::new();
    let flush = |run: &mut Vec<LayoutBox>, out: &mut Vec<LayoutBox>| {
        if run.is_empty() {
            return;
        }
        let row_style = ComputedStyle::anonymous_with_display(group_style, Display::TableRow);
        let cells = fix_row_children(std::mem::take(run), &row_style);
        if !cells.is_empty() {
            out.push(LayoutBox::anonymous(BoxKind::TableRow, row_style, cells));
        }
    };
    for child in children {
        if is_row(&child) {
            flush(&mut run, &mut out);
            out.push(child);
        } else {
            run.push(child);
        }
    }
    flush(&mut run, &mut out);
    out
}

/// "2.3 An anonymous 'table' or 'inline-table' box must be generated around
/// each sequence of consecutive proper table child boxes which are
/// misparented."
fn fix_table(mut table: LayoutBox, children: Vec<LayoutBox>) -> LayoutBox {
    let mut groups: Vec<LayoutBox> = Vec::new();
    let mut column_groups: Vec<LayoutBox> = Vec::new();
    let mut bare_columns: Vec<LayoutBox> = Vec::new();
    let mut run: Vec<LayoutBox> = Vec::new();
    let style = table.style.clone();

    let flush_columns = |bare: &mut Vec<LayoutBox>, out: &mut Vec<LayoutBox>| {
        if !bare.is_empty() {
            out.push(LayoutBox::anonymous(
                BoxKind::TableColumnGroup { span: 1 },
                ComputedStyle::anonymous_with_display(&style, Display::TableColumnGroup),
                std::mem::take(bare),
            ));
        }
    };
    let flush_rows = |run: &mut Vec<LayoutBox>, out: &mut Vec<LayoutBox>| {
        if run.is_empty() {
            return;
        }
        let group_style = ComputedStyle::anonymous_with_display(&style, Display::TableRowGroup);
        let rows = fix_row_group_children(std::mem::take(run), &group_style);
        if !rows.is_empty() {
            out.push(LayoutBox::anonymous(BoxKind::TableRowGroup, group_style, rows));
        }
    };

    for child in children {
        match child.kind {
            // "1.3 If a child C of a tabular container P is an anonymous
            // inline box that contains only white space ... it is treated as
            // if it had 'display: none'."
            _ if is_whitespace_text(&child) => {}
            BoxKind::TableColumn { .. } => bare_columns.push(child),
            BoxKind::TableColumnGroup { .. } => {
                flush_columns(&mut bare_columns, &mut column_groups);
                column_groups.push(child);
            }
            BoxKind::TableRowGroup => {
                flush_rows(&mut run, &mut groups);
                groups.push(child);
            }
            _ => run.push(child),
        }
    }
    flush_columns(&mut bare_columns, &mut column_groups);
    flush_rows(&mut run, &mut groups);

    if let BoxKind::Table(info) = &mut table.kind {
        info.column_groups = column_groups;
    }
    table.children = groups;
    table
}

/// Wrap each run of misparented table-internal boxes in an anonymous table.
fn wrap_orphans(children: Vec<LayoutBox>, parent_style: &ComputedStyle, inline: bool) -> Vec<LayoutBox> {
    if !children.iter().any(is_table_internal) {
        return children;
    }
    let mut out = Vec::new();
    let mut run: Vec<LayoutBox> = Vec::new();
    let flush = |run: &mut Vec<LayoutBox>, out: &mut Vec<LayoutBox>| {
        if run.is_empty() {
            return;
        }
        let display = if inline { Display::InlineTable } else { Display::Table };
        let table = LayoutBox::anonymous(
            BoxKind::Table(TableInfo {
                inline,
                ..TableInfo::default()
            }),
            ComputedStyle::anonymous_with_display(parent_style, display),
            Vec::new(),
        );
        out.push(fix_table(table, std::mem::take(run)));
    };
    for child in children {
        if is_table_internal(&child) {
            run.push(child);
        } else {
            flush(&mut run, &mut out);
            out.push(child);
        }
    }
    flush(&mut run, &mut out);
    out
}

/// [§ 9.2.1.1 Anonymous block boxes](https://www.w3.org/TR/CSS2/visuren.html#anonymous-block-level)
///
/// "if a block container box has a block-level box inside it, then we
/// force it to have only block-level boxes inside it."
///
/// The inline-level children of a block container go into one anonymous
/// line box. When they are mixed with block-level children, each run of
/// inline-level children is wrapped in an anonymous block of its own; runs
/// holding only collapsible white space are dropped.
#[must_use]
pub fn inline_in_block(mut bx: LayoutBox) -> LayoutBox {
    let children: Vec<LayoutBox> = std::mem::take(&mut bx.children)
        .into_iter()
        .map(inline_in_block)
        .collect();

    if !bx.is_block_container() || children.is_empty() {
        bx.children = children;
        return bx;
    }

    let line_style = ComputedStyle::anonymous_from(&bx.style);
    if children.iter().all(LayoutBox::is_inline_level) {
        bx.children = vec![LayoutBox::anonymous(BoxKind::Line, line_style, children)];
        return bx;
    }

    let block_style = ComputedStyle::anonymous_with_display(&bx.style, Display::Block);
    let mut out = Vec::new();
    let mut run: Vec<LayoutBox> = Vec::new();
    let flush = |run: &mut Vec<LayoutBox>, out: &mut Vec<LayoutBox>| {
        if run.is_empty() {
            return;
        }
        if run.iter().all(is_whitespace_text) {
            run.clear();
            return;
        }
        let line = LayoutBox::anonymous(BoxKind::Line, line_style.clone(), std::mem::take(run));
        out.push(LayoutBox::anonymous(
            BoxKind::Block,
            block_style.clone(),
            vec![line],
        ));
    };
    for child in children {
        if child.is_inline_level() {
            run.push(child);
        } else {
            flush(&mut run, &mut out);
            out.push(child);
        }
    }
    flush(&mut run, &mut out);
    bx.children = out;
    bx
}

/// A piece of an inline box split around block-level descendants.
enum Piece {
    Inline(LayoutBox),
    Block(LayoutBox),
}

fn contains_block(bx: &LayoutBox) -> bool {
    bx.children.iter().any(|child| {
        child.is_block_level() || (matches!(child.kind, BoxKind::Inline) && contains_block(child))
    })
}

/// Split `bx` (an inline or line box) at every block-level descendant.
fn split_inline(bx: LayoutBox) -> Vec<Piece> {
    let mut template = bx.copy_without_children();
    template.children = Vec::new();
    let mut pieces: Vec<Piece> = Vec::new();
    let mut run: Vec<LayoutBox> = Vec::new();

    let flush = |run: &mut Vec<LayoutBox>, pieces: &mut Vec<Piece>| {
        pieces.push(Piece::Inline(template.copy_with_children(std::mem::take(run))));
    };

    for child in bx.children {
        if child.is_block_level() {
            flush(&mut run, &mut pieces);
            pieces.push(Piece::Block(child));
        } else if matches!(child.kind, BoxKind::Inline) && contains_block(&child) {
            for piece in split_inline(child) {
                match piece {
                    Piece::Inline(fragment) => run.push(fragment),
                    Piece::Block(block) => {
                        flush(&mut run, &mut pieces);
                        pieces.push(Piece::Block(block));
                    }
                }
            }
        } else {
            run.push(child);
        }
    }
    flush(&mut run, &mut pieces);

    // The start edges stay on the first piece, the end edges on the last.
    let inline_count = pieces.iter().filter(|p| matches!(p, Piece::Inline(_))).count();
    let mut seen = 0;
    for piece in &mut pieces {
        if let Piece::Inline(fragment) = piece {
            if seen > 0 {
                fragment.style.margin.left = LengthPercentageOrAuto::ZERO;
                fragment.style.padding.left = LengthPercentage::Px(0.0);
                fragment.style.border_width.left = 0.0;
            }
            if seen + 1 < inline_count {
                fragment.style.margin.right = LengthPercentageOrAuto::ZERO;
                fragment.style.padding.right = LengthPercentage::Px(0.0);
                fragment.style.border_width.right = 0.0;
            }
            seen += 1;
        }
    }
    pieces
}

/// Something on this line worth an anonymous block of its own.
fn has_inline_content(bx: &LayoutBox) -> bool {
    match &bx.kind {
        BoxKind::Text(_) => !is_whitespace_text(bx),
        BoxKind::Inline | BoxKind::Line => {
            let style = &bx.style;
            let edges = style.border_width.left != 0.0
                || style.border_width.right != 0.0
                || !matches!(style.padding.left, LengthPercentage::Px(p) if p == 0.0)
                || !matches!(style.padding.right, LengthPercentage::Px(p) if p == 0.0);
            edges || bx.children.iter().any(has_inline_content)
        }
        _ => true,
    }
}

/// [§ 9.2.1.1 Anonymous block boxes](https://www.w3.org/TR/CSS2/visuren.html#anonymous-block-level)
///
/// "When an inline box contains an in-flow block-level box, the inline box
/// (and its inline ancestors within the same line box) are broken around
/// the block-level box (and any block-level siblings that are consecutive
/// or separated only by collapsible whitespace and/or out-of-flow
/// elements), splitting the inline box into two boxes (even if either side
/// is empty), one on each side of the block-level box(es). The line boxes
/// before the break and after the break are enclosed in anonymous block
/// boxes, and the block-level box becomes a sibling of those anonymous
/// boxes."
#[must_use]
pub fn block_in_inline(mut bx: LayoutBox) -> LayoutBox {
    bx.children = std::mem::take(&mut bx.children)
        .into_iter()
        .map(block_in_inline)
        .collect();

    let needs_split = bx.is_block_container()
        && matches!(bx.children.as_slice(), [line] if line.is_line() && contains_block(line));
    if !needs_split {
        return bx;
    }

    let block_style = ComputedStyle::anonymous_with_display(&bx.style, Display::Block);
    let mut out = Vec::new();
    let lines = std::mem::take(&mut bx.children);
    for line in lines {
        for piece in split_inline(line) {
            match piece {
                Piece::Block(block) => out.push(block),
                Piece::Inline(line_piece) if has_inline_content(&line_piece) => {
                    out.push(LayoutBox::anonymous(
                        BoxKind::Block,
                        block_style.clone(),
                        vec![line_piece],
                    ));
                }
                Piece::Inline(_) => {}
            }
        }
    }
    bx.children = out;
    bx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::check_invariants;

    fn style(display: Display) -> ComputedStyle {
        ComputedStyle::with_display(display)
    }

    fn text(s: &str) -> LayoutBox {
        LayoutBox::text(s, style(Display::Inline))
    }

    fn block(children: Vec<LayoutBox>) -> LayoutBox {
        LayoutBox {
            children,
            ..LayoutBox::new(BoxKind::Block, style(Display::Block), None)
        }
    }

    fn inline(children: Vec<LayoutBox>) -> LayoutBox {
        LayoutBox {
            children,
            ..LayoutBox::new(BoxKind::Inline, style(Display::Inline), None)
        }
    }

    #[test]
    fn test_only_inline_children_make_one_line() {
        let root = inline_in_block(block(vec![text("a"), inline(vec![text("b")])]));
        assert_eq!(root.children.len(), 1);
        assert!(root.children[0].is_line());
        assert!(root.children[0].anonymous);
    }

    #[test]
    fn test_mixed_children_get_anonymous_blocks() {
        let root = inline_in_block(block(vec![text("a"), block(vec![]), text(" ")]));
        assert_eq!(root.children.len(), 2);
        assert!(root.children[0].anonymous);
        assert!(root.children[0].children[0].is_line());
        assert!(check_invariants(&root).is_ok());
    }

    #[test]
    fn test_block_in_inline_splits_the_inline() {
        let mut span = inline(vec![text("before"), block(vec![text("inside")]), text("after")]);
        span.style.padding.left = LengthPercentage::Px(4.0);
        span.style.padding.right = LengthPercentage::Px(4.0);
        let root = block_in_inline(inline_in_block(block(vec![span])));

        assert_eq!(root.children.len(), 3);
        assert!(root.children[0].anonymous);
        assert!(!root.children[1].anonymous);
        assert!(root.children[2].anonymous);
        assert!(check_invariants(&root).is_ok());

        let first_span = &root.children[0].children[0].children[0];
        let last_span = &root.children[2].children[0].children[0];
        assert_eq!(first_span.style.padding.right, LengthPercentage::Px(0.0));
        assert_eq!(first_span.style.padding.left, LengthPercentage::Px(4.0));
        assert_eq!(last_span.style.padding.left, LengthPercentage::Px(0.0));
        assert_eq!(last_span.style.padding.right, LengthPercentage::Px(4.0));
    }

    #[test]
    fn test_cells_get_rows_groups_and_a_table() {
        let cell = LayoutBox::new(
            BoxKind::TableCell {
                colspan: 1,
                rowspan: 1,
            },
            style(Display::TableCell),
            None,
        );
        let root = table_fixup(block(vec![cell]));
        let table = &root.children[0];
        assert!(matches!(table.kind, BoxKind::Table(_)));
        assert!(is_row_group(&table.children[0]));
        assert!(is_row(&table.children[0].children[0]));
        assert!(is_cell(&table.children[0].children[0].children[0]));
    }

    #[test]
    fn test_table_collects_columns_and_drops_whitespace() {
        let column = LayoutBox::new(BoxKind::TableColumn { span: 2 }, style(Display::TableColumn), None);
        let row = LayoutBox::new(BoxKind::TableRow, style(Display::TableRow), None);
        let table = LayoutBox {
            children: vec![column, text(" "), row],
            ..LayoutBox::new(BoxKind::Table(TableInfo::default()), style(Display::Table), None)
        };
        let table = table_fixup(table);
        let BoxKind::Table(info) = &table.kind else {
            panic!("expected a table");
        };
        assert_eq!(info.column_groups.len(), 1);
        assert_eq!(table.children.len(), 1);
        assert!(is_row_group(&table.children[0]));
    }
}
