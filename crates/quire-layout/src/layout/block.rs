//! Block formatting context layout.
//!
//! [§ 9.4.1 Block formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#block-formatting)
//!
//! "In a block formatting context, boxes are laid out one after the other,
//! vertically, beginning at the top of a containing block."
//!
//! Layout is resumable: [`block_level_layout`] places as much of a box as
//! fits above `max_bottom` and returns a new box holding only what was
//! placed, plus a [`ResumeCursor`] saying where the next page continues.
//!
//! [§ 4.4 Controlling Breaks](https://www.w3.org/TR/css-break-3/#break-between)
//!
//! A box is only split between its lines or between its children. When the
//! first thing on a page does not fit, `page_is_empty` lets it overflow
//! instead of being deferred forever.

use super::box_model::{EdgeSizes, Rect};
use super::inline::{get_next_linebox, place_vertically, split_inline_level};
use super::layout_box::{BoxKind, LayoutBox};
use super::percentages::used_values;
use super::resume::{ResumeCursor, split_cursor};
use super::table::table_layout;
use super::values::{AutoOr, UsedValues};
use super::{AxisSizes, ContainingBlock, collapse_two_margins, solve_axis};
use crate::config::{LayoutConfig, LayoutContext};
use crate::error::{LayoutError, Result};
use crate::replaced::Intrinsics;
use crate::style::PageBreak;

/// What one call of [`block_level_layout`] produced.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockOutcome {
    /// The placed fragment, or `None` when nothing fit and the caller should
    /// retry on the next page.
    pub new_box: Option<LayoutBox>,
    /// Where layout continues on the next page; `None` when the box is
    /// finished.
    pub resume_at: Option<ResumeCursor>,
    /// The forced break that ended this fragment, carrying a page-side hint
    /// for the next page.
    pub next_page: PageBreak,
}

impl BlockOutcome {
    /// Nothing fit.
    #[must_use]
    pub const fn nothing() -> Self {
        Self {
            new_box: None,
            resume_at: None,
            next_page: PageBreak::Auto,
        }
    }

    /// The whole box was placed.
    #[must_use]
    pub const fn complete(new_box: LayoutBox) -> Self {
        Self {
            new_box: Some(new_box),
            resume_at: None,
            next_page: PageBreak::Auto,
        }
    }
}

/// The in-flow children placed inside one block container fragment.
struct Flow {
    children: Vec<LayoutBox>,
    /// Bottom of the last child's margin box.
    content_bottom: f32,
    resume_at: Option<ResumeCursor>,
    next_page: PageBreak,
}

/// Lay out a block-level box, or the part of it that fits.
///
/// `position_y` is the top of the box's margin edge. Content whose bottom
/// would pass `max_bottom` is left for the next page unless it is the first
/// thing on an empty page.
///
/// # Errors
/// Returns [`LayoutError::Invariant`] when `bx` is not a block-level box or a
/// block container, and propagates errors from nested layout.
pub fn block_level_layout(
    ctx: &LayoutContext<'_>,
    bx: &LayoutBox,
    position_y: f32,
    max_bottom: f32,
    resume: Option<&ResumeCursor>,
    cb: &ContainingBlock,
    page_is_empty: bool,
) -> Result<BlockOutcome> {
    let used = used_values(&bx.style, false, cb);
    match &bx.kind {
        BoxKind::Table(_) => table_layout(
            ctx,
            bx,
            used,
            position_y,
            max_bottom,
            resume,
            cb,
            page_is_empty,
        ),
        BoxKind::Replaced { intrinsics, .. } => Ok(replaced_block_layout(
            ctx,
            bx,
            intrinsics,
            used,
            position_y,
            max_bottom,
            cb,
            page_is_empty,
        )),
        _ if bx.is_block_container() => block_container_layout(
            ctx,
            bx,
            used,
            position_y,
            max_bottom,
            resume,
            cb,
            page_is_empty,
        ),
        _ => Err(LayoutError::Invariant(format!(
            "{} cannot take part in a block formatting context",
            bx.describe()
        ))),
    }
}

/// [§ 10.3.3 Block-level, non-replaced elements in normal flow](https://www.w3.org/TR/CSS2/visudet.html#blockwidth)
///
/// Resolve the horizontal geometry of `new` from its used values.
///
/// Block-level boxes solve the constraint equation. Other block containers
/// (inline-blocks, table cells, margin boxes) arrive with their width
/// already decided by the caller and treat `auto` margins as zero.
pub(crate) fn resolve_width(new: &mut LayoutBox, cb: &ContainingBlock) {
    let used = new.used;
    let pb = used.horizontal_pb();

    let sizes = if new.is_block_level() {
        // STEP 1: Solve with the specified width.
        let tentative = solve_axis(cb.width, used.margin.left, pb, used.width, used.margin.right);

        // STEP 2: [§ 10.4 Minimum and maximum widths](https://www.w3.org/TR/CSS2/visudet.html#min-max-widths)
        //
        // "If the tentative used width is greater than 'max-width', the rules
        // above are applied again, but this time using the computed value of
        // 'max-width' as the computed value for 'width'." Likewise for
        // 'min-width'. A width never goes below zero.
        let clamped = used.clamp_width(tentative.size).max(0.0);
        if clamped == tentative.size {
            tentative
        } else {
            solve_axis(
                cb.width,
                used.margin.left,
                pb,
                AutoOr::Length(clamped),
                used.margin.right,
            )
        }
    } else {
        let margin_start = used.margin.left.to_px_or(0.0);
        let margin_end = used.margin.right.to_px_or(0.0);
        let size = used
            .width
            .to_px_or(cb.width - margin_start - margin_end - pb);
        AxisSizes {
            margin_start,
            size: used.clamp_width(size).max(0.0),
            margin_end,
        }
    };

    let dims = &mut new.dimensions;
    dims.margin.left = sizes.margin_start;
    dims.margin.right = sizes.margin_end;
    dims.border.left = used.border.left;
    dims.border.right = used.border.right;
    dims.padding.left = used.padding.left;
    dims.padding.right = used.padding.right;
    dims.content.width = sizes.size;
    dims.content.x = cb.x + dims.left_mbp();
}

/// Vertical margins, borders and paddings of a fragment.
///
/// [§ 5.4.1 Breaks Between Boxes](https://www.w3.org/TR/css-break-3/#break-margins)
///
/// "When a forced break occurs ... margins adjoining the break are
/// truncated." A continuation fragment drops its top edges; a fragment cut
/// before its end drops its bottom edges.
pub(crate) fn vertical_edges(used: &UsedValues, continuation: bool) -> (EdgeSizes, EdgeSizes, EdgeSizes) {
    let keep_top = if continuation { 0.0 } else { 1.0 };
    let margin = EdgeSizes {
        top: used.margin.top.to_px_or(0.0) * keep_top,
        bottom: used.margin.bottom.to_px_or(0.0),
        ..EdgeSizes::default()
    };
    let border = EdgeSizes {
        top: used.border.top * keep_top,
        bottom: used.border.bottom,
        ..EdgeSizes::default()
    };
    let padding = EdgeSizes {
        top: used.padding.top * keep_top,
        bottom: used.padding.bottom,
        ..EdgeSizes::default()
    };
    (margin, border, padding)
}

/// Lay out a block container with its used values already decided.
///
/// # Errors
/// Propagates errors from child layout.
#[allow(clippy::too_many_arguments)]
pub(crate) fn block_container_layout(
    ctx: &LayoutContext<'_>,
    bx: &LayoutBox,
    used: UsedValues,
    position_y: f32,
    max_bottom: f32,
    resume: Option<&ResumeCursor>,
    cb: &ContainingBlock,
    page_is_empty: bool,
) -> Result<BlockOutcome> {
    let mut new = bx.copy_without_children();
    new.used = used;

    // STEP 1: Calculate width and horizontal position.
    resolve_width(&mut new, cb);

    // STEP 2: Calculate the vertical edges and the top of the content box.
    let continuation = resume.is_some();
    let (margin, border, padding) = vertical_edges(&used, continuation);
    {
        let dims = &mut new.dimensions;
        dims.margin.top = margin.top;
        dims.margin.bottom = margin.bottom;
        dims.border.top = border.top;
        dims.border.bottom = border.bottom;
        dims.padding.top = padding.top;
        dims.padding.bottom = padding.bottom;
        dims.content.y = position_y + margin.top + border.top + padding.top;
    }
    let content_top = new.dimensions.content.y;
    let child_cb = ContainingBlock {
        x: new.dimensions.content.x,
        width: new.dimensions.content.width,
        height: used.height.length(),
    };

    // STEP 3: Lay out the children that fit.
    let flow = match bx.children.as_slice() {
        [line] if line.is_line() => lay_out_lines(
            ctx,
            line,
            content_top,
            max_bottom,
            resume,
            &child_cb,
            page_is_empty,
        )?,
        children => lay_out_block_children(
            ctx,
            children,
            content_top,
            max_bottom,
            resume,
            &child_cb,
            page_is_empty,
        )?,
    };
    let Some(flow) = flow else {
        return Ok(BlockOutcome::nothing());
    };
    let cut = flow.resume_at.is_some();
    let had_children = !bx.children.is_empty();
    new.children = flow.children;

    // STEP 4: Calculate height.
    //
    // [§ 10.6.3 Block-level non-replaced elements in normal flow](https://www.w3.org/TR/CSS2/visudet.html#normal-block)
    //
    // "If 'height' is 'auto', the height depends on whether the element has
    // any block-level children..." Fragments of a split box take the height
    // of what they hold.
    let auto_height = (flow.content_bottom - content_top).max(0.0);
    new.dimensions.content.height = if cut || continuation {
        auto_height
    } else {
        used.clamp_height(used.height.to_px_or(auto_height))
    };
    if cut {
        let dims = &mut new.dimensions;
        dims.margin.bottom = 0.0;
        dims.border.bottom = 0.0;
        dims.padding.bottom = 0.0;
    }

    // STEP 5: A box that overflows only through its own specified height,
    // or has no content to split, moves to the next page as a whole.
    let overflows = new.dimensions.border_box().bottom() > max_bottom;
    if overflows && !page_is_empty && !cut && (!had_children || !used.height.is_auto()) {
        return Ok(BlockOutcome::nothing());
    }

    // STEP 6: Place the outside list marker beside the first line.
    if !continuation {
        if let Some(marker) = &bx.outside_marker {
            new.outside_marker = place_outside_marker(ctx, marker, &new, &child_cb)?.map(Box::new);
        }
    }

    Ok(BlockOutcome {
        new_box: Some(new),
        resume_at: flow.resume_at,
        next_page: flow.next_page,
    })
}

/// [§ 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
///
/// Stack the line boxes of `line` until one would cross `max_bottom`.
/// A block container holding a line box resumes at `0/<cursor in line>`.
fn lay_out_lines(
    ctx: &LayoutContext<'_>,
    line: &LayoutBox,
    top: f32,
    max_bottom: f32,
    resume: Option<&ResumeCursor>,
    cb: &ContainingBlock,
    page_is_empty: bool,
) -> Result<Option<Flow>> {
    let mut line_resume: Option<ResumeCursor> = resume.and_then(ResumeCursor::child).cloned();
    let mut y = top;
    let mut lines: Vec<LayoutBox> = Vec::new();

    loop {
        let (next_line, next_resume) = get_next_linebox(ctx, line, y, line_resume.as_ref(), cb)?;
        let Some(line_box) = next_line else {
            break;
        };

        let bottom = line_box.dimensions.margin_box().bottom();
        let may_overflow = page_is_empty && lines.is_empty();
        if bottom > max_bottom && !may_overflow {
            if lines.is_empty() {
                return Ok(None);
            }
            log::trace!("line at y={y} overflows {max_bottom}, breaking");
            return Ok(Some(Flow {
                children: lines,
                content_bottom: y,
                resume_at: Some(ResumeCursor::with_child(0, line_resume)),
                next_page: PageBreak::Auto,
            }));
        }

        y = bottom;
        lines.push(line_box);
        match next_resume {
            Some(next) => line_resume = Some(next),
            None => break,
        }
    }

    Ok(Some(Flow {
        children: lines,
        content_bottom: y,
        resume_at: None,
        next_page: PageBreak::Auto,
    }))
}

/// The stronger of two break values: sided breaks beat `always`, which
/// beats everything else.
const fn stronger_break(a: PageBreak, b: PageBreak) -> PageBreak {
    match (a, b) {
        (PageBreak::Left | PageBreak::Right, _) => a,
        (_, PageBreak::Left | PageBreak::Right) => b,
        (PageBreak::Always, _) => a,
        (_, PageBreak::Always) => b,
        _ => a,
    }
}

/// [§ 3.1 Breaks Between Boxes](https://www.w3.org/TR/css-break-3/#break-between)
///
/// "Break opportunities occur ... between siblings ... the properties on
/// all the elements ... at the break are combined." A break before the
/// first child is a break before its parent.
fn break_before(bx: &LayoutBox) -> PageBreak {
    let inner = bx
        .children
        .first()
        .filter(|child| child.is_block_level())
        .map_or(PageBreak::Auto, break_before);
    stronger_break(bx.style.page_break_before, inner)
}

/// A break after the last child is a break after its parent.
fn break_after(bx: &LayoutBox) -> PageBreak {
    let inner = bx
        .children
        .last()
        .filter(|child| child.is_block_level())
        .map_or(PageBreak::Auto, break_after);
    stronger_break(bx.style.page_break_after, inner)
}

/// Lay out block-level `children` one after the other.
fn lay_out_block_children(
    ctx: &LayoutContext<'_>,
    children: &[LayoutBox],
    top: f32,
    max_bottom: f32,
    resume: Option<&ResumeCursor>,
    cb: &ContainingBlock,
    page_is_empty: bool,
) -> Result<Option<Flow>> {
    let (start, start_resume) = split_cursor(resume);
    // Bottom border edge of the previous child and its pending margin.
    let mut y = top;
    let mut pending_margin = 0.0;
    let mut placed: Vec<LayoutBox> = Vec::new();

    let stop = |placed: Vec<LayoutBox>, bottom: f32, resume_at: ResumeCursor, next_page: PageBreak| {
        Some(Flow {
            children: placed,
            content_bottom: bottom,
            resume_at: Some(resume_at),
            next_page,
        })
    };

    for (index, child) in children.iter().enumerate().skip(start) {
        let child_resume = if index == start { start_resume } else { None };

        // STEP 1: A forced break before this child ends the fragment.
        if !placed.is_empty() && child_resume.is_none() {
            let before = break_before(child);
            if before.is_forced() {
                log::trace!("forced break before child {index}");
                return Ok(stop(placed, y + pending_margin, ResumeCursor::at(index), before));
            }
        }

        // STEP 2: Collapse the top margin with the previous sibling's bottom
        // margin.
        //
        // [§ 8.3.1](https://www.w3.org/TR/CSS2/box.html#collapsing-margins)
        //
        // "bottom margin of box and top margin of its next in-flow following
        // sibling" are adjoining.
        let top_margin = if child_resume.is_some() {
            0.0
        } else {
            used_values(&child.style, false, cb).margin.top.to_px_or(0.0)
        };
        let child_y = y + collapse_two_margins(pending_margin, top_margin) - top_margin;

        // STEP 3: Lay out the child.
        let child_page_is_empty = page_is_empty && placed.is_empty();
        let outcome = block_level_layout(
            ctx,
            child,
            child_y,
            max_bottom,
            child_resume,
            cb,
            child_page_is_empty,
        )?;
        let Some(new_child) = outcome.new_box else {
            // Nothing fit: an ancestor retries the whole box on the next
            // page, unless something is already placed here.
            if placed.is_empty() {
                return Ok(None);
            }
            return Ok(stop(
                placed,
                y + pending_margin,
                ResumeCursor::at(index),
                PageBreak::Auto,
            ));
        };

        // STEP 4: Advance past the child.
        y = new_child.dimensions.border_box().bottom();
        pending_margin = new_child.dimensions.margin.bottom;
        placed.push(new_child);

        if outcome.resume_at.is_some() {
            return Ok(stop(
                placed,
                y + pending_margin,
                ResumeCursor::with_child(index, outcome.resume_at),
                outcome.next_page,
            ));
        }

        // STEP 5: A forced break after this child ends the fragment.
        let after = break_after(child);
        if after.is_forced() && index + 1 < children.len() {
            log::trace!("forced break after child {index}");
            return Ok(stop(placed, y + pending_margin, ResumeCursor::at(index + 1), after));
        }
    }

    Ok(Some(Flow {
        children: placed,
        content_bottom: y + pending_margin,
        resume_at: None,
        next_page: PageBreak::Auto,
    }))
}

/// [§ 10.3.2 Inline, replaced elements](https://www.w3.org/TR/CSS2/visudet.html#inline-replaced-width)
/// and [§ 10.6.2](https://www.w3.org/TR/CSS2/visudet.html#inline-replaced-height)
///
/// Used content width and height of replaced content.
#[must_use]
pub fn replaced_size(config: &LayoutConfig, intrinsics: &Intrinsics, used: &UsedValues) -> (f32, f32) {
    let ratio = intrinsics.effective_ratio().filter(|r| *r > 0.0);
    let default_width = config.replaced_default_width;
    let default_height = config.replaced_default_height;

    let (width, height) = match (used.width, used.height) {
        (AutoOr::Length(w), AutoOr::Length(h)) => (w, h),
        // "Otherwise, if 'width' has a computed value of 'auto', and the
        // element has an intrinsic ratio then ... (used height) *
        // (intrinsic ratio)"
        (AutoOr::Auto, AutoOr::Length(h)) => (
            ratio.map_or(intrinsics.width.unwrap_or(default_width), |r| h * r),
            h,
        ),
        (AutoOr::Length(w), AutoOr::Auto) => (
            w,
            ratio.map_or(intrinsics.height.unwrap_or(default_height), |r| w / r),
        ),
        // "If 'height' and 'width' both have computed values of 'auto' and
        // the element also has an intrinsic width, then that intrinsic width
        // is the used value of 'width'."
        (AutoOr::Auto, AutoOr::Auto) => {
            let w = intrinsics
                .width
                .or_else(|| intrinsics.height.zip(ratio).map(|(h, r)| h * r))
                .unwrap_or(default_width);
            let h = intrinsics
                .height
                .or_else(|| ratio.map(|r| w / r))
                .unwrap_or(default_height);
            (w, h)
        }
    };
    (used.clamp_width(width), used.clamp_height(height))
}

/// A block-level replaced box. Never split.
#[allow(clippy::too_many_arguments)]
fn replaced_block_layout(
    ctx: &LayoutContext<'_>,
    bx: &LayoutBox,
    intrinsics: &Intrinsics,
    used: UsedValues,
    position_y: f32,
    max_bottom: f32,
    cb: &ContainingBlock,
    page_is_empty: bool,
) -> BlockOutcome {
    let (width, height) = replaced_size(ctx.config, intrinsics, &used);
    let mut new = bx.copy_without_children();
    new.used = UsedValues {
        width: AutoOr::Length(width),
        min_width: 0.0,
        max_width: f32::INFINITY,
        ..used
    };
    resolve_width(&mut new, cb);

    let (margin, border, padding) = vertical_edges(&used, false);
    let dims = &mut new.dimensions;
    dims.margin.top = margin.top;
    dims.margin.bottom = margin.bottom;
    dims.border.top = border.top;
    dims.border.bottom = border.bottom;
    dims.padding.top = padding.top;
    dims.padding.bottom = padding.bottom;
    dims.content.y = position_y + margin.top + border.top + padding.top;
    dims.content.height = height;

    if !page_is_empty && dims.border_box().bottom() > max_bottom {
        return BlockOutcome::nothing();
    }
    BlockOutcome::complete(new)
}

/// Absolute y of the first line's baseline inside `bx`.
pub(crate) fn first_baseline(bx: &LayoutBox) -> Option<f32> {
    if bx.is_line() {
        return Some(bx.dimensions.content.y + bx.baseline.unwrap_or(0.0));
    }
    bx.children.iter().find_map(first_baseline)
}

/// Absolute y of the last line's baseline inside `bx`.
pub(crate) fn last_baseline(bx: &LayoutBox) -> Option<f32> {
    if bx.is_line() {
        return Some(bx.dimensions.content.y + bx.baseline.unwrap_or(0.0));
    }
    bx.children.iter().rev().find_map(last_baseline)
}

/// [§ 12.5.1 Lists](https://www.w3.org/TR/CSS2/generate.html#lists)
///
/// "The marker box is outside the principal block box." It sits left of
/// the border box, on the baseline of the first line.
fn place_outside_marker(
    ctx: &LayoutContext<'_>,
    marker: &LayoutBox,
    principal: &LayoutBox,
    cb: &ContainingBlock,
) -> Result<Option<LayoutBox>> {
    let split = split_inline_level(ctx, marker, f32::INFINITY, 0.0, None, true, cb)?;
    let Some(mut fragment) = split.fragment else {
        return Ok(None);
    };

    let border_box: Rect = principal.dimensions.border_box();
    let dx = border_box.x - split.width - fragment.dimensions.margin_box().x;
    fragment.translate(dx, 0.0);

    let baseline_y = first_baseline(principal).unwrap_or_else(|| {
        principal.dimensions.content.y + fragment.baseline.unwrap_or(0.0)
    });
    place_vertically(ctx, &mut fragment, baseline_y);
    Ok(Some(fragment))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stronger_break() {
        assert_eq!(stronger_break(PageBreak::Auto, PageBreak::Always), PageBreak::Always);
        assert_eq!(stronger_break(PageBreak::Always, PageBreak::Left), PageBreak::Left);
        assert_eq!(stronger_break(PageBreak::Right, PageBreak::Left), PageBreak::Right);
        assert_eq!(stronger_break(PageBreak::Avoid, PageBreak::Auto), PageBreak::Avoid);
    }

    #[test]
    fn test_replaced_size_rules() {
        let config = LayoutConfig::default();
        let used = UsedValues::default();

        let image = Intrinsics::from_size(40.0, 20.0);
        assert_eq!(replaced_size(&config, &image, &used), (40.0, 20.0));

        let sized = UsedValues {
            width: AutoOr::Length(80.0),
            ..UsedValues::default()
        };
        assert_eq!(replaced_size(&config, &image, &sized), (80.0, 40.0));

        let nothing = Intrinsics::default();
        assert_eq!(replaced_size(&config, &nothing, &used), (300.0, 150.0));

        let clamped = UsedValues {
            max_width: 10.0,
            ..UsedValues::default()
        };
        assert_eq!(replaced_size(&config, &image, &clamped).0, 10.0);
    }
}
