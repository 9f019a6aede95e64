//! CSS Table Layout.
//!
//! [§ 17 Tables](https://www.w3.org/TR/CSS2/tables.html)
//!
//! This module implements the fixed table layout algorithm (§ 17.5.2.1):
//! - row groups, rows and cells, including `colspan` and `rowspan`
//! - column and column-group widths
//! - `border-spacing` in the separated borders model
//! - page breaks between rows
//!
//! `table-layout: auto` is laid out with the fixed algorithm as well.
//! Not implemented: `border-collapse: collapse`, captions, `vertical-align`
//! within cells.

use quire_common::warning::warn_once;

use super::block::{BlockOutcome, block_container_layout, resolve_width, vertical_edges};
use super::layout_box::{BoxKind, LayoutBox, TableInfo};
use super::percentages::used_values;
use super::resume::{ResumeCursor, split_cursor};
use super::values::{AutoOr, UsedValues};
use super::{ContainingBlock, Rect};
use crate::config::LayoutContext;
use crate::error::{LayoutError, Result};
use crate::style::{BoxSizing, LengthPercentage, LengthPercentageOrAuto, PageBreak, TableLayoutMode};

/// Where one cell sits in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CellSlot {
    /// Row group index in the table.
    group: usize,
    /// Row index in its group.
    row: usize,
    /// Cell index in its row.
    cell: usize,
    /// First column.
    column: usize,
    colspan: usize,
    rowspan: usize,
}

/// [§ 17.5 Visual layout of table contents](https://www.w3.org/TR/CSS2/tables.html#table-layout)
///
/// "Each cell occupies a rectangle of table grid cells ... rows fill the
/// grid top to bottom, cells fill a row left to right, skipping grid cells
/// already occupied by cells spanning from earlier rows."
///
/// Row spans never leave their row group.
fn place_cells(table: &LayoutBox) -> (Vec<CellSlot>, usize) {
    let mut slots = Vec::new();
    let mut columns = 0;

    for (group_index, group) in table.children.iter().enumerate() {
        let row_count = group.children.len();
        let mut occupied: Vec<Vec<bool>> = vec![Vec::new(); row_count];

        for (row_index, row) in group.children.iter().enumerate() {
            let mut column = 0;
            for (cell_index, cell) in row.children.iter().enumerate() {
                let BoxKind::TableCell { colspan, rowspan } = cell.kind else {
                    continue;
                };
                while occupied[row_index].get(column).copied().unwrap_or(false) {
                    column += 1;
                }
                let colspan = colspan.max(1);
                // HTML: "rowspan=0" spans to the end of the row group.
                let remaining = row_count - row_index;
                let rowspan = if rowspan == 0 { remaining } else { rowspan.min(remaining) };

                for taken in occupied.iter_mut().skip(row_index).take(rowspan) {
                    if taken.len() < column + colspan {
                        taken.resize(column + colspan, false);
                    }
                    for flag in &mut taken[column..column + colspan] {
                        *flag = true;
                    }
                }
                slots.push(CellSlot {
                    group: group_index,
                    row: row_index,
                    cell: cell_index,
                    column,
                    colspan,
                    rowspan,
                });
                column += colspan;
                columns = columns.max(column);
            }
        }
    }
    (slots, columns)
}

/// Declared widths of the columns, one entry per grid column.
fn declared_column_widths(info: &TableInfo, table_width: f32) -> Vec<Option<f32>> {
    let mut widths = Vec::new();
    for group in &info.column_groups {
        if group.children.is_empty() {
            let span = match group.kind {
                BoxKind::TableColumnGroup { span } => span.max(1),
                _ => 1,
            };
            widths.extend(std::iter::repeat_n(column_width(group.style.width, table_width), span));
            continue;
        }
        for column in &group.children {
            let span = match column.kind {
                BoxKind::TableColumn { span } => span.max(1),
                _ => 1,
            };
            widths.extend(std::iter::repeat_n(column_width(column.style.width, table_width), span));
        }
    }
    widths
}

/// Column and cell widths in the fixed algorithm; percentages refer to the
/// table width.
fn column_width(value: LengthPercentageOrAuto, table_width: f32) -> Option<f32> {
    match value {
        LengthPercentageOrAuto::Px(px) => Some(px),
        LengthPercentageOrAuto::Percent(percent) => Some(table_width * percent / 100.0),
        LengthPercentageOrAuto::Auto => None,
    }
}

fn px(value: LengthPercentageOrAuto) -> Option<f32> {
    match value {
        LengthPercentageOrAuto::Px(px) => Some(px),
        _ => None,
    }
}

/// [§ 17.5.2.1 Fixed table layout](https://www.w3.org/TR/CSS2/tables.html#fixed-table-layout)
///
/// "1. A column element with a value other than 'auto' for the 'width'
/// property sets the width for that column.
/// 2. Otherwise, a cell in the first row with a value other than 'auto'
/// for the 'width' property determines the width for that column. If the
/// cell spans more than one column, the width is divided over the columns.
/// 3. Any remaining columns equally divide the remaining horizontal table
/// space (minus borders or cell spacing)."
///
/// Returns the column widths and the table width they add up to, which is
/// larger than `table_width` when the declared widths do not fit.
fn fixed_column_widths(
    table: &LayoutBox,
    info: &TableInfo,
    slots: &[CellSlot],
    columns: usize,
    table_width: f32,
) -> (Vec<f32>, f32) {
    let spacing = table.style.border_spacing;
    let mut widths: Vec<Option<f32>> = declared_column_widths(info, table_width);
    widths.resize(columns, None);
    widths.truncate(columns);

    // STEP 1: Column widths are already in `widths`.

    // STEP 2: First-row cells with a width.
    let first_group = table.children.iter().position(|group| !group.children.is_empty());
    for slot in slots
        .iter()
        .filter(|slot| Some(slot.group) == first_group && slot.row == 0)
    {
        let cell = &table.children[slot.group].children[slot.row].children[slot.cell];
        let Some(width) = column_width(cell.style.width, table_width) else {
            continue;
        };
        let edges = fixed_padding(cell.style.padding.left)
            + fixed_padding(cell.style.padding.right)
            + cell.style.border_width.left
            + cell.style.border_width.right;
        let outer = if cell.style.box_sizing == BoxSizing::BorderBox {
            width
        } else {
            width + edges
        };

        let span = slot.column..slot.column + slot.colspan;
        let known: f32 = widths[span.clone()].iter().flatten().sum();
        let unknown = widths[span.clone()].iter().filter(|w| w.is_none()).count();
        if unknown == 0 {
            continue;
        }
        let gaps = spacing * (slot.colspan - 1) as f32;
        let each = ((outer - known - gaps) / unknown as f32).max(0.0);
        for width in &mut widths[span] {
            if width.is_none() {
                *width = Some(each);
            }
        }
    }

    // STEP 3: Remaining columns share what is left.
    let spacing_total = spacing * (columns + 1) as f32;
    let target = (table_width - spacing_total).max(0.0);
    let known: f32 = widths.iter().flatten().sum();
    let unknown = widths.iter().filter(|w| w.is_none()).count();
    if unknown > 0 {
        let each = ((target - known) / unknown as f32).max(0.0);
        for width in &mut widths {
            if width.is_none() {
                *width = Some(each);
            }
        }
    }
    let mut widths: Vec<f32> = widths.into_iter().map(|w| w.unwrap_or(0.0)).collect();

    // STEP 4: Columns fill the table exactly.
    //
    // "the table width is the greater of the value of the table's 'width'
    // property and the sum of the column widths (plus cell spacing or
    // borders). If the table is wider than the columns, the extra space
    // should be distributed over the columns."
    let sum: f32 = widths.iter().sum();
    if columns > 0 && sum < target {
        if sum > 0.0 {
            let scale = target / sum;
            for width in &mut widths {
                *width *= scale;
            }
        } else {
            widths = vec![target / columns as f32; columns];
        }
    }
    let used_width = widths.iter().sum::<f32>() + spacing_total;
    (widths, used_width.max(table_width))
}

fn fixed_padding(value: LengthPercentage) -> f32 {
    match value {
        LengthPercentage::Px(px) => px,
        LengthPercentage::Percent(_) => 0.0,
    }
}

/// Left edge of each column: border spacing, then each column and its gap.
fn column_positions(widths: &[f32], start_x: f32, spacing: f32) -> Vec<f32> {
    let mut positions = Vec::with_capacity(widths.len());
    let mut x = start_x + spacing;
    for width in widths {
        positions.push(x);
        x += width + spacing;
    }
    positions
}

/// Width of a cell spanning `span` columns from `column`, including the
/// spacing between them.
fn span_width(widths: &[f32], column: usize, span: usize, spacing: f32) -> f32 {
    let end = (column + span).min(widths.len());
    let covered = widths.get(column..end).unwrap_or(&[]);
    covered.iter().sum::<f32>() + spacing * covered.len().saturating_sub(1) as f32
}

/// A row-spanning cell waiting for its last row.
struct PendingSpan {
    /// Index of the row fragment holding the cell.
    row_fragment: usize,
    cell: usize,
    last_row: usize,
    top: f32,
}

/// Grow pending spanning cells to reach `bottom`.
fn stretch_spans(rows: &mut [LayoutBox], spans: &[PendingSpan], bottom: f32) {
    for span in spans {
        if let Some(cell) = rows
            .get_mut(span.row_fragment)
            .and_then(|row| row.children.get_mut(span.cell))
        {
            stretch_cell(cell, bottom - span.top);
        }
    }
}

/// "the cell box's height is increased to the height of the row".
fn stretch_cell(cell: &mut LayoutBox, outer_height: f32) {
    let current = cell.dimensions.margin_box().height;
    if outer_height > current {
        cell.dimensions.content.height += outer_height - current;
    }
}

/// Lay out a table box, or the rows of it that fit.
///
/// Rows are the unit of fragmentation: a row is never split, and the
/// resume cursor is `<group>/<row>`.
///
/// # Errors
/// Returns [`LayoutError::Invariant`] when `bx` is not a table, and
/// propagates cell layout errors.
#[allow(clippy::too_many_arguments)]
pub(crate) fn table_layout(
    ctx: &LayoutContext<'_>,
    bx: &LayoutBox,
    used: UsedValues,
    position_y: f32,
    max_bottom: f32,
    resume: Option<&ResumeCursor>,
    cb: &ContainingBlock,
    page_is_empty: bool,
) -> Result<BlockOutcome> {
    let BoxKind::Table(info) = &bx.kind else {
        return Err(LayoutError::Invariant(format!("{} is not a table", bx.describe())));
    };
    if bx.style.table_layout == TableLayoutMode::Auto {
        warn_once("table", "table-layout: auto is laid out with the fixed algorithm");
    }
    let spacing = bx.style.border_spacing;

    // STEP 1: Resolve the table's own width and position.
    let mut new = bx.copy_without_children();
    new.used = used;
    resolve_width(&mut new, cb);

    let continuation = resume.is_some();
    let (margin, border, padding) = vertical_edges(&used, continuation);
    new.dimensions.margin.top = margin.top;
    new.dimensions.margin.bottom = margin.bottom;
    new.dimensions.border.top = border.top;
    new.dimensions.border.bottom = border.bottom;
    new.dimensions.padding.top = padding.top;
    new.dimensions.padding.bottom = padding.bottom;
    new.dimensions.content.y = position_y + margin.top + border.top + padding.top;
    let content_top = new.dimensions.content.y;

    // STEP 2: Identify the grid and size the columns.
    let (slots, columns) = place_cells(bx);
    let (widths, table_width) =
        fixed_column_widths(bx, info, &slots, columns, new.dimensions.content.width);
    if table_width > new.dimensions.content.width {
        log::debug!(
            "{}: columns widen the table from {} to {table_width}",
            bx.describe(),
            new.dimensions.content.width
        );
        new.dimensions.margin.right -= table_width - new.dimensions.content.width;
        new.dimensions.content.width = table_width;
    }
    let content_x = new.dimensions.content.x;
    let positions = column_positions(&widths, content_x, spacing);

    // STEP 3: Lay out rows until one does not fit.
    let (start_group, group_resume) = split_cursor(resume);
    let start_row = group_resume.map_or(0, |cursor| cursor.index);
    let table_cb = ContainingBlock::with_width(content_x, new.dimensions.content.width);
    let mut y = content_top + spacing;
    let mut groups: Vec<LayoutBox> = Vec::new();
    let mut rows_placed = 0_usize;
    let mut resume_at: Option<ResumeCursor> = None;
    let mut next_page = PageBreak::Auto;

    'groups: for (group_index, group) in bx.children.iter().enumerate().skip(start_group) {
        let first_row = if group_index == start_group { start_row } else { 0 };
        let group_top = y;
        let mut rows: Vec<LayoutBox> = Vec::new();
        let mut spans: Vec<PendingSpan> = Vec::new();

        for (row_index, row) in group.children.iter().enumerate().skip(first_row) {
            // [§ 13.3.1](https://www.w3.org/TR/CSS2/page.html#page-break-props)
            //
            // Page breaks apply between rows.
            if rows_placed > 0 && row.style.page_break_before.is_forced() {
                resume_at = Some(ResumeCursor::nested(group_index, ResumeCursor::at(row_index)));
                next_page = row.style.page_break_before;
                stretch_spans(&mut rows, &spans, y - spacing);
                finish_group(&mut groups, group, rows, content_x, &table_cb, group_top, y - spacing);
                break 'groups;
            }

            let mut new_row = row.copy_without_children();
            let mut row_height: f32 = 0.0;
            for slot in slots
                .iter()
                .filter(|slot| slot.group == group_index && slot.row == row_index)
            {
                let cell = &row.children[slot.cell];
                let cell_width = span_width(&widths, slot.column, slot.colspan, spacing);
                let x = positions.get(slot.column).copied().unwrap_or(content_x);
                let placed = lay_out_cell(ctx, cell, cell_width, x, y, &table_cb)?;
                let height = placed.dimensions.margin_box().height;
                if slot.rowspan > 1 {
                    spans.push(PendingSpan {
                        row_fragment: rows.len(),
                        cell: new_row.children.len(),
                        last_row: row_index + slot.rowspan - 1,
                        top: y,
                    });
                } else {
                    row_height = row_height.max(height);
                }
                new_row.children.push(placed);
            }

            // [§ 17.5.3 Table height algorithms](https://www.w3.org/TR/CSS2/tables.html#height-layout)
            //
            // "The height of a 'table-row' element's box is calculated once
            // the user agent has all the cells in the row available: it is
            // the maximum of the row's computed 'height', the computed
            // 'height' of each cell in the row, and the minimum height
            // (MIN) required by the cells."
            if let Some(h) = px(row.style.height) {
                row_height = row_height.max(h);
            }
            for span in spans.iter().filter(|span| span.last_row == row_index) {
                let cell_height = if span.row_fragment == rows.len() {
                    new_row.children.get(span.cell)
                } else {
                    rows.get(span.row_fragment).and_then(|r| r.children.get(span.cell))
                }
                .map_or(0.0, |cell| cell.dimensions.margin_box().height);
                row_height = row_height.max(span.top + cell_height - y);
            }

            // The row does not fit: stop before it.
            let bottom = y + row_height;
            let may_overflow = page_is_empty && rows_placed == 0;
            if bottom > max_bottom && !may_overflow {
                if rows_placed == 0 {
                    return Ok(BlockOutcome::nothing());
                }
                log::trace!("table row {group_index}/{row_index} moves to the next page");
                resume_at = Some(ResumeCursor::nested(group_index, ResumeCursor::at(row_index)));
                stretch_spans(&mut rows, &spans, y - spacing);
                finish_group(&mut groups, group, rows, content_x, &table_cb, group_top, y - spacing);
                break 'groups;
            }

            for cell in &mut new_row.children {
                stretch_cell(cell, row_height);
            }
            new_row.dimensions.content = Rect {
                x: content_x,
                y,
                width: table_cb.width,
                height: row_height,
            };
            rows.push(new_row);
            let (done, waiting): (Vec<PendingSpan>, Vec<PendingSpan>) =
                spans.into_iter().partition(|span| span.last_row == row_index);
            stretch_spans(&mut rows, &done, bottom);
            spans = waiting;
            rows_placed += 1;
            y = bottom + spacing;

            if row.style.page_break_after.is_forced() && row_index + 1 < group.children.len() {
                resume_at = Some(ResumeCursor::nested(group_index, ResumeCursor::at(row_index + 1)));
                next_page = row.style.page_break_after;
                stretch_spans(&mut rows, &spans, y - spacing);
                finish_group(&mut groups, group, rows, content_x, &table_cb, group_top, y - spacing);
                break 'groups;
            }
        }

        stretch_spans(&mut rows, &spans, y - spacing);
        finish_group(&mut groups, group, rows, content_x, &table_cb, group_top, y - spacing);
    }

    // STEP 4: Table height.
    let cut = resume_at.is_some();
    let auto_height = if rows_placed == 0 { 0.0 } else { y - content_top };
    new.dimensions.content.height = if cut || continuation {
        auto_height
    } else {
        used.clamp_height(used.height.to_px_or(0.0)).max(auto_height)
    };
    if cut {
        new.dimensions.margin.bottom = 0.0;
        new.dimensions.border.bottom = 0.0;
        new.dimensions.padding.bottom = 0.0;
    }
    new.children = groups;

    // STEP 5: Columns, for painters.
    if let BoxKind::Table(new_info) = &mut new.kind {
        position_columns(
            new_info,
            &widths,
            &positions,
            spacing,
            content_top,
            new.dimensions.content.height,
        );
        new_info.column_widths = widths;
        new_info.column_positions = positions;
    }

    Ok(BlockOutcome {
        new_box: Some(new),
        resume_at,
        next_page,
    })
}

/// Lay out one cell at the width of the columns it spans.
fn lay_out_cell(
    ctx: &LayoutContext<'_>,
    cell: &LayoutBox,
    width: f32,
    x: f32,
    y: f32,
    table_cb: &ContainingBlock,
) -> Result<LayoutBox> {
    let mut used = used_values(&cell.style, false, table_cb);
    // [§ 17.5](https://www.w3.org/TR/CSS2/tables.html#table-layout)
    //
    // "Cells ... do not have margins."
    used.margin.top = AutoOr::Length(0.0);
    used.margin.right = AutoOr::Length(0.0);
    used.margin.bottom = AutoOr::Length(0.0);
    used.margin.left = AutoOr::Length(0.0);
    used.width = AutoOr::Length((width - used.horizontal_pb()).max(0.0));
    used.min_width = 0.0;
    used.max_width = f32::INFINITY;
    used.height = AutoOr::Auto;

    let cell_cb = ContainingBlock::with_width(x, width);
    let outcome = block_container_layout(ctx, cell, used, y, f32::INFINITY, None, &cell_cb, true)?;
    outcome.new_box.ok_or_else(|| {
        LayoutError::Invariant(format!("{} placed nothing on an unbounded page", cell.describe()))
    })
}

/// Close a row group fragment; groups that placed no row are dropped.
fn finish_group(
    groups: &mut Vec<LayoutBox>,
    group: &LayoutBox,
    rows: Vec<LayoutBox>,
    x: f32,
    table_cb: &ContainingBlock,
    top: f32,
    bottom: f32,
) {
    if rows.is_empty() {
        return;
    }
    let mut fragment = group.copy_with_children(rows);
    fragment.dimensions.content = Rect {
        x,
        y: top,
        width: table_cb.width,
        height: (bottom - top).max(0.0),
    };
    groups.push(fragment);
}

/// Give column and column-group boxes the geometry of their columns.
fn position_columns(
    info: &mut TableInfo,
    widths: &[f32],
    positions: &[f32],
    spacing: f32,
    top: f32,
    height: f32,
) {
    let mut next = 0;
    let mut place = |bx: &mut LayoutBox, span: usize| {
        let first = next;
        next += span.max(1);
        bx.dimensions.content = Rect {
            x: positions.get(first).copied().unwrap_or(0.0),
            y: top,
            width: span_width(widths, first, span.max(1), spacing),
            height,
        };
    };
    for group in &mut info.column_groups {
        if group.children.is_empty() {
            let span = match group.kind {
                BoxKind::TableColumnGroup { span } => span,
                _ => 1,
            };
            place(group, span);
            continue;
        }
        for column in &mut group.children {
            let span = match column.kind {
                BoxKind::TableColumn { span } => span,
                _ => 1,
            };
            place(column, span);
        }
        if let (Some(first), Some(last)) = (group.children.first(), group.children.last()) {
            let (first, last) = (first.dimensions.content, last.dimensions.content);
            group.dimensions.content = Rect {
                x: first.x,
                y: top,
                width: last.right() - first.x,
                height,
            };
        }
    }
}
