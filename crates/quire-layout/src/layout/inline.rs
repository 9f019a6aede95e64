//! Inline formatting context.
//!
//! [§ 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
//!
//! "In an inline formatting context, boxes are laid out horizontally, one
//! after the other, beginning at the top of a containing block."
//!
//! "When several inline-level boxes cannot fit horizontally within a single
//! line box, they are distributed among two or more vertically-stacked line
//! boxes."
//!
//! A block container holds one line box template. [`get_next_linebox`] cuts
//! the next line out of it, starting at a resume cursor, and returns the
//! cursor where the following line starts.

use super::block::{block_container_layout, last_baseline, replaced_size};
use super::layout_box::{BoxKind, LayoutBox};
use super::percentages::used_values;
use super::preferred::shrink_to_fit;
use super::resume::{ResumeCursor, split_cursor};
use super::table::table_layout;
use super::values::{AutoOr, UsedValues};
use super::{BoxDimensions, ContainingBlock, Rect};
use crate::config::LayoutContext;
use crate::error::{LayoutError, Result};
use crate::style::{
    ComputedStyle, LengthPercentage, LengthPercentageOrAuto, TextAlign, WhiteSpace,
};

/// Slack for comparing widths that went through float arithmetic.
const FIT_EPSILON: f32 = 1e-3;

/// The result of fitting one inline-level box into what is left of a line.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineSplit {
    /// The part placed on this line, or `None` when the whole box moves to
    /// the next line.
    pub fragment: Option<LayoutBox>,
    /// Where the next line continues inside the box; `None` when the box
    /// was placed to its end.
    pub resume_at: Option<ResumeCursor>,
    /// Margin-box width of the fragment.
    pub width: f32,
    /// Width the fragment needs to fit, not counting trailing spaces that
    /// would be removed at the end of the line.
    pub fit_width: f32,
}

impl InlineSplit {
    const fn deferred() -> Self {
        Self {
            fragment: None,
            resume_at: None,
            width: 0.0,
            fit_width: 0.0,
        }
    }
}

/// Where a line starts once leading collapsible spaces are skipped.
enum Skip {
    /// The line starts at this cursor.
    Resume(Option<ResumeCursor>),
    /// Only collapsible whitespace is left.
    Exhausted,
}

/// [§ 4.1.2 Phase II: Trimming and Positioning](https://www.w3.org/TR/css-text-3/#white-space-phase-2)
///
/// "A sequence of collapsible spaces at the beginning of a line is removed."
fn skip_first_whitespace(bx: &LayoutBox, resume: Option<&ResumeCursor>) -> Skip {
    match &bx.kind {
        BoxKind::Text(text) => {
            let offset = resume.map_or(0, |r| r.index);
            if offset >= text.len() {
                return Skip::Exhausted;
            }
            if !bx.style.white_space.collapses_spaces() {
                return Skip::Resume(resume.cloned());
            }
            let rest = &text[offset..];
            let skipped = rest.len() - rest.trim_start_matches(' ').len();
            if skipped == rest.len() {
                Skip::Exhausted
            } else if skipped == 0 {
                Skip::Resume(resume.cloned())
            } else {
                Skip::Resume(Some(ResumeCursor::at(offset + skipped)))
            }
        }
        BoxKind::Inline | BoxKind::Line => {
            // The start edge of an inline box is content of its own.
            if resume.is_none() && has_start_edge(&bx.style) {
                return Skip::Resume(None);
            }
            let (start, start_resume) = split_cursor(resume);
            for (index, child) in bx.children.iter().enumerate().skip(start) {
                let child_resume = if index == start { start_resume } else { None };
                match skip_first_whitespace(child, child_resume) {
                    Skip::Exhausted => {}
                    Skip::Resume(inner) => {
                        if index == start && inner.as_ref() == child_resume {
                            return Skip::Resume(resume.cloned());
                        }
                        return Skip::Resume(Some(ResumeCursor::with_child(index, inner)));
                    }
                }
            }
            if resume.is_none() && has_end_edge(&bx.style) {
                Skip::Resume(None)
            } else {
                Skip::Exhausted
            }
        }
        _ => Skip::Resume(resume.cloned()),
    }
}

fn has_start_edge(style: &ComputedStyle) -> bool {
    margin_is_nonzero(style.margin.left)
        || padding_is_nonzero(style.padding.left)
        || style.border_width.left != 0.0
}

fn has_end_edge(style: &ComputedStyle) -> bool {
    margin_is_nonzero(style.margin.right)
        || padding_is_nonzero(style.padding.right)
        || style.border_width.right != 0.0
}

// 'auto' margins of inline boxes are zero.
fn margin_is_nonzero(value: LengthPercentageOrAuto) -> bool {
    matches!(value, LengthPercentageOrAuto::Px(v) | LengthPercentageOrAuto::Percent(v) if v != 0.0)
}

fn padding_is_nonzero(value: LengthPercentage) -> bool {
    matches!(value, LengthPercentage::Px(v) | LengthPercentage::Percent(v) if v != 0.0)
}

/// Lay out the next line box of `line`, starting at `resume`.
///
/// Returns the positioned line (or `None` when the template is exhausted)
/// and the cursor where the following line starts (or `None` after the
/// last line).
///
/// # Errors
/// Returns [`LayoutError::Invariant`] if a line consumes no content, which
/// would otherwise loop forever.
pub fn get_next_linebox(
    ctx: &LayoutContext<'_>,
    line: &LayoutBox,
    position_y: f32,
    resume: Option<&ResumeCursor>,
    cb: &ContainingBlock,
) -> Result<(Option<LayoutBox>, Option<ResumeCursor>)> {
    let mut resume = resume.cloned();

    loop {
        // STEP 1: Skip collapsible whitespace at the start of the line.
        let first_line = resume.is_none();
        let start = match skip_first_whitespace(line, resume.as_ref()) {
            Skip::Exhausted => return Ok((None, None)),
            Skip::Resume(start) => start,
        };

        // STEP 2: [§ 16.1 Indentation](https://www.w3.org/TR/CSS2/text.html#indentation-prop)
        //
        // "'text-indent' only affects a line if it is the first formatted
        // line of an element."
        let indent = if first_line {
            line.style.text_indent.resolve(Some(cb.width)).unwrap_or(0.0)
        } else {
            0.0
        };
        let available = cb.width - indent;

        // STEP 3: Fill the line.
        let split = split_inline_level(ctx, line, available, cb.x + indent, start.as_ref(), true, cb)?;
        let Some(mut fragment) = split.fragment else {
            return Err(LayoutError::Invariant(format!(
                "{} deferred content on an empty line",
                line.describe()
            )));
        };
        if split.resume_at.is_some() && split.resume_at == start {
            return Err(LayoutError::Invariant(format!(
                "line starting at {} consumed nothing",
                start.as_ref().map_or_else(|| "start".to_string(), ToString::to_string)
            )));
        }

        // STEP 4: A line holding only collapsed whitespace is not a line.
        //
        // [§ 9.4.2](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
        //
        // "Line boxes that contain no text, no preserved white space, no
        // inline elements with non-zero margins, padding, or borders or other
        // in-flow content ... must be treated as zero-height line boxes."
        if !has_visible_content(&fragment) {
            match split.resume_at {
                Some(next) => {
                    resume = Some(next);
                    continue;
                }
                None => return Ok((None, None)),
            }
        }

        // STEP 5: Remove trailing collapsible spaces.
        trim_trailing_spaces(ctx, &mut fragment);

        // STEP 6: [§ 16.2 Alignment](https://www.w3.org/TR/CSS2/text.html#alignment-prop)
        //
        // "This property describes how inline-level content of a block
        // container is aligned."
        let used_width = fragment.dimensions.content.width;
        let offset = match line.style.text_align {
            TextAlign::Left => 0.0,
            TextAlign::Right => available - used_width,
            TextAlign::Center => (available - used_width) / 2.0,
        }
        .max(0.0);
        if offset > 0.0 {
            for child in &mut fragment.children {
                child.translate(offset, 0.0);
            }
        }

        // STEP 7: [§ 10.8 Line height calculations](https://www.w3.org/TR/CSS2/visudet.html#line-height)
        //
        // Align every baseline on one line, then size the line to the
        // tallest ascent plus the deepest descent.
        let (ascent, descent) = metrics(ctx, &fragment);
        for child in &mut fragment.children {
            place_vertically(ctx, child, position_y + ascent);
        }
        fragment.dimensions = BoxDimensions {
            content: Rect {
                x: cb.x,
                y: position_y,
                width: cb.width,
                height: ascent + descent,
            },
            ..BoxDimensions::default()
        };
        fragment.baseline = Some(ascent);

        return Ok((Some(fragment), split.resume_at));
    }
}

/// Fit `bx` into `available` pixels starting at `x`.
///
/// An inline box is split at the first child that does not fit; it keeps
/// its start edges only on its first fragment and its end edges only on its
/// last. When `line_is_empty` is false and not even the first piece of the
/// box fits, the whole box is deferred to the next line.
///
/// # Errors
/// Returns [`LayoutError::Invariant`] for boxes that cannot take part in an
/// inline formatting context, and propagates atomic inline layout errors.
pub fn split_inline_level(
    ctx: &LayoutContext<'_>,
    bx: &LayoutBox,
    available: f32,
    x: f32,
    resume: Option<&ResumeCursor>,
    line_is_empty: bool,
    cb: &ContainingBlock,
) -> Result<InlineSplit> {
    match &bx.kind {
        BoxKind::Text(text) => Ok(split_text(ctx, bx, text, available, x, resume, line_is_empty)),
        BoxKind::Inline | BoxKind::Line => {
            split_inline_box(ctx, bx, available, x, resume, line_is_empty, cb)
        }
        _ if bx.is_atomic_inline() => {
            let atomic = layout_atomic_inline(ctx, bx, x, cb)?;
            let width = atomic.dimensions.margin_box().width;
            if width > available + FIT_EPSILON && !line_is_empty {
                return Ok(InlineSplit::deferred());
            }
            Ok(InlineSplit {
                fragment: Some(atomic),
                resume_at: None,
                width,
                fit_width: width,
            })
        }
        _ => Err(LayoutError::Invariant(format!(
            "{} cannot take part in an inline formatting context",
            bx.describe()
        ))),
    }
}

fn split_text(
    ctx: &LayoutContext<'_>,
    bx: &LayoutBox,
    text: &str,
    available: f32,
    x: f32,
    resume: Option<&ResumeCursor>,
    line_is_empty: bool,
) -> InlineSplit {
    let offset = resume.map_or(0, |r| r.index).min(text.len());
    let rest = &text[offset..];
    let measured = ctx.measurer.measure(rest, &bx.style, Some(available.max(0.0)));
    let fitted = &rest[..measured.fitted_len.min(rest.len())];

    let trailing = trailing_space_width(ctx, fitted, &bx.style);
    let fit_width = measured.width - trailing;
    if fit_width > available + FIT_EPSILON && !line_is_empty {
        return InlineSplit::deferred();
    }

    let mut fragment = bx.copy_without_children();
    fragment.kind = BoxKind::Text(fitted.to_string());
    fragment.dimensions = BoxDimensions {
        content: Rect {
            x,
            y: 0.0,
            width: measured.width,
            height: measured.height,
        },
        ..BoxDimensions::default()
    };
    fragment.baseline = Some(measured.baseline);

    InlineSplit {
        fragment: Some(fragment),
        resume_at: measured.resume_at.map(|next| ResumeCursor::at(offset + next)),
        width: measured.width,
        fit_width,
    }
}

/// Width of the spaces that would hang or be removed at the end of a line.
fn trailing_space_width(ctx: &LayoutContext<'_>, text: &str, style: &ComputedStyle) -> f32 {
    if style.white_space == WhiteSpace::Pre {
        return 0.0;
    }
    let trimmed = text.trim_end_matches(' ');
    if trimmed.len() == text.len() {
        return 0.0;
    }
    ctx.measurer.measure(&text[trimmed.len()..], style, None).width
}

#[allow(clippy::too_many_arguments)]
fn split_inline_box(
    ctx: &LayoutContext<'_>,
    bx: &LayoutBox,
    available: f32,
    x: f32,
    resume: Option<&ResumeCursor>,
    line_is_empty: bool,
    cb: &ContainingBlock,
) -> Result<InlineSplit> {
    let used = used_values(&bx.style, false, cb);
    let mut fragment = bx.copy_without_children();
    fragment.used = used;

    // STEP 1: The start edges belong to the first fragment only.
    let first = resume.is_none();
    let margin_left = if first { used.margin.left.to_px_or(0.0) } else { 0.0 };
    let border_left = if first { used.border.left } else { 0.0 };
    let padding_left = if first { used.padding.left } else { 0.0 };
    let left = margin_left + border_left + padding_left;

    // STEP 2: Place children until one has to continue on the next line.
    let (start, start_resume) = split_cursor(resume);
    let content_x = x + left;
    let mut cursor_x = content_x;
    let mut fit_end = content_x;
    let mut resume_at = None;
    for (index, child) in bx.children.iter().enumerate().skip(start) {
        let child_resume = if index == start { start_resume } else { None };
        let child_line_is_empty = line_is_empty && fragment.children.is_empty();
        let split = split_inline_level(
            ctx,
            child,
            available - (cursor_x - x),
            cursor_x,
            child_resume,
            child_line_is_empty,
            cb,
        )?;
        let Some(child_fragment) = split.fragment else {
            if fragment.children.is_empty() && !line_is_empty {
                return Ok(InlineSplit::deferred());
            }
            resume_at = Some(ResumeCursor::with_child(index, child_resume.cloned()));
            break;
        };

        fit_end = cursor_x + split.fit_width;
        cursor_x += split.width;
        fragment.children.push(child_fragment);
        if let Some(next) = split.resume_at {
            resume_at = Some(ResumeCursor::nested(index, next));
            break;
        }
    }

    // STEP 3: The end edges belong to the last fragment only.
    let last = resume_at.is_none();
    let margin_right = if last { used.margin.right.to_px_or(0.0) } else { 0.0 };
    let border_right = if last { used.border.right } else { 0.0 };
    let padding_right = if last { used.padding.right } else { 0.0 };
    let right = margin_right + border_right + padding_right;

    let dims = &mut fragment.dimensions;
    *dims = BoxDimensions::default();
    dims.margin.left = margin_left;
    dims.margin.right = margin_right;
    dims.border = used.border;
    dims.border.left = border_left;
    dims.border.right = border_right;
    dims.padding = used.padding;
    dims.padding.left = padding_left;
    dims.padding.right = padding_right;
    dims.content.x = content_x;
    dims.content.width = cursor_x - content_x;

    let width = left + dims.content.width + right;
    let fit_width = if right > 0.0 { width } else { fit_end - x };
    Ok(InlineSplit {
        fragment: Some(fragment),
        resume_at,
        width,
        fit_width,
    })
}

/// [§ 10.3.9 'Inline-block', non-replaced elements in normal flow](https://www.w3.org/TR/CSS2/visudet.html#inlineblock-width)
///
/// "If 'width' is 'auto', the used value is the shrink-to-fit width."
/// Atomic inlines are laid out at `y = 0` and moved into place by baseline
/// alignment.
fn layout_atomic_inline(
    ctx: &LayoutContext<'_>,
    bx: &LayoutBox,
    x: f32,
    cb: &ContainingBlock,
) -> Result<LayoutBox> {
    let mut used = used_values(&bx.style, false, cb);
    used.margin.top = AutoOr::Length(used.margin.top.to_px_or(0.0));
    used.margin.right = AutoOr::Length(used.margin.right.to_px_or(0.0));
    used.margin.bottom = AutoOr::Length(used.margin.bottom.to_px_or(0.0));
    used.margin.left = AutoOr::Length(used.margin.left.to_px_or(0.0));
    let here = ContainingBlock { x, ..*cb };

    if let BoxKind::Replaced { intrinsics, .. } = &bx.kind {
        return Ok(layout_inline_replaced(ctx, bx, intrinsics, &used, x));
    }

    if used.width.is_auto() {
        let outside = used.margin.left.to_px_or(0.0) + used.margin.right.to_px_or(0.0) + used.horizontal_pb();
        let preferred = shrink_to_fit(ctx, bx, cb.width - outside);
        used.width = AutoOr::Length(preferred);
    }

    let outcome = if matches!(bx.kind, BoxKind::Table(_)) {
        table_layout(ctx, bx, used, 0.0, f32::INFINITY, None, &here, true)?
    } else {
        block_container_layout(ctx, bx, used, 0.0, f32::INFINITY, None, &here, true)?
    };
    let mut placed = outcome.new_box.ok_or_else(|| {
        LayoutError::Invariant(format!("{} placed nothing on an unbounded page", bx.describe()))
    })?;

    // [§ 10.8.1](https://www.w3.org/TR/CSS2/visudet.html#leading)
    //
    // "The baseline of an 'inline-block' is the baseline of its last line
    // box in the normal flow, unless it has either no in-flow line boxes
    // ..., in which case the baseline is the bottom margin edge."
    let margin_box = placed.dimensions.margin_box();
    placed.baseline = Some(
        last_baseline(&placed).map_or(margin_box.height, |baseline| baseline - margin_box.y),
    );
    Ok(placed)
}

fn layout_inline_replaced(
    ctx: &LayoutContext<'_>,
    bx: &LayoutBox,
    intrinsics: &crate::replaced::Intrinsics,
    used: &UsedValues,
    x: f32,
) -> LayoutBox {
    let (width, height) = replaced_size(ctx.config, intrinsics, used);
    let mut placed = bx.copy_without_children();
    placed.used = *used;
    let dims = &mut placed.dimensions;
    *dims = BoxDimensions::default();
    dims.margin.top = used.margin.top.to_px_or(0.0);
    dims.margin.right = used.margin.right.to_px_or(0.0);
    dims.margin.bottom = used.margin.bottom.to_px_or(0.0);
    dims.margin.left = used.margin.left.to_px_or(0.0);
    dims.border = used.border;
    dims.padding = used.padding;
    dims.content = Rect {
        x: x + dims.left_mbp(),
        y: dims.top_mbp(),
        width,
        height,
    };
    // A replaced element sits on the baseline with its bottom margin edge.
    placed.baseline = Some(dims.margin_box().height);
    placed
}

/// (ascent, descent) of a fragment around its baseline.
fn metrics(ctx: &LayoutContext<'_>, bx: &LayoutBox) -> (f32, f32) {
    match &bx.kind {
        BoxKind::Text(_) => {
            let height = bx.dimensions.content.height;
            let baseline = bx.baseline.unwrap_or(height);
            (baseline, height - baseline)
        }
        BoxKind::Inline | BoxKind::Line => {
            // "each line box starts with a zero-width inline box with the
            // element's font and line height properties" (the strut).
            let strut = ctx.measurer.measure("", &bx.style, None);
            let mut ascent = strut.baseline;
            let mut descent = strut.height - strut.baseline;
            for child in &bx.children {
                let (a, d) = metrics(ctx, child);
                ascent = ascent.max(a);
                descent = descent.max(d);
            }
            (ascent, descent)
        }
        _ => {
            let height = bx.dimensions.margin_box().height;
            let baseline = bx.baseline.unwrap_or(height);
            (baseline, height - baseline)
        }
    }
}

/// Move `bx` so that its baseline sits at `baseline_y`.
pub(crate) fn place_vertically(ctx: &LayoutContext<'_>, bx: &mut LayoutBox, baseline_y: f32) {
    match &bx.kind {
        BoxKind::Text(_) => {
            let baseline = bx.baseline.unwrap_or(bx.dimensions.content.height);
            bx.dimensions.content.y = baseline_y - baseline;
        }
        BoxKind::Inline | BoxKind::Line => {
            // [§ 10.6.1 Inline, non-replaced elements](https://www.w3.org/TR/CSS2/visudet.html#inline-non-replaced)
            //
            // "The height of the content area should be based on the font";
            // vertical padding, border and margin do not affect the line.
            let strut = ctx.measurer.measure("", &bx.style, None);
            bx.dimensions.content.y = baseline_y - strut.baseline;
            bx.dimensions.content.height = strut.height;
            bx.baseline = Some(strut.baseline + bx.dimensions.top_mbp());
            for child in &mut bx.children {
                place_vertically(ctx, child, baseline_y);
            }
        }
        _ => {
            let baseline = bx.baseline.unwrap_or_else(|| bx.dimensions.margin_box().height);
            let dy = baseline_y - baseline - bx.dimensions.margin_box().y;
            bx.translate(0.0, dy);
        }
    }
}

/// Anything on this fragment that makes the line worth keeping.
fn has_visible_content(bx: &LayoutBox) -> bool {
    match &bx.kind {
        BoxKind::Text(text) => {
            !text.trim_matches(' ').is_empty() || bx.style.white_space.preserves_newlines()
        }
        BoxKind::Inline | BoxKind::Line => {
            bx.dimensions.left_mbp() + bx.dimensions.right_mbp() != 0.0
                || bx.children.iter().any(has_visible_content)
        }
        _ => true,
    }
}

/// [§ 4.1.2](https://www.w3.org/TR/css-text-3/#white-space-phase-2)
///
/// "A sequence of collapsible spaces at the end of a line is removed."
/// Preserved spaces under `pre-wrap` hang instead: they stay in the text
/// but stop counting towards the width.
fn trim_trailing_spaces(ctx: &LayoutContext<'_>, line: &mut LayoutBox) {
    if let Some(removed) = trim_line_end(ctx, line) {
        log::trace!("trimmed {removed}px of trailing space from {}", line.describe());
    }
}

/// Returns the width removed, or `None` when `bx` holds nothing that can
/// end a line, so the search continues with the previous sibling.
fn trim_line_end(ctx: &LayoutContext<'_>, bx: &mut LayoutBox) -> Option<f32> {
    let removed = match &mut bx.kind {
        BoxKind::Text(text) => {
            let white_space = bx.style.white_space;
            if white_space == WhiteSpace::Pre {
                return Some(0.0);
            }
            let keep = text.trim_end_matches(' ').len();
            if keep == text.len() {
                return Some(0.0);
            }
            let width = ctx.measurer.measure(&text[keep..], &bx.style, None).width;
            if white_space.collapses_spaces() {
                text.truncate(keep);
            }
            width
        }
        // Empty inline boxes are transparent: step back over them.
        BoxKind::Inline | BoxKind::Line => {
            let mut found = None;
            for index in (0..bx.children.len()).rev() {
                if let Some(width) = trim_line_end(ctx, &mut bx.children[index]) {
                    for later in &mut bx.children[index + 1..] {
                        later.translate(-width, 0.0);
                    }
                    found = Some(width);
                    break;
                }
            }
            found?
        }
        // An atomic inline ends the line itself.
        _ => return Some(0.0),
    };
    bx.dimensions.content.width = (bx.dimensions.content.width - removed).max(0.0);
    Some(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Display;

    fn text(content: &str) -> LayoutBox {
        LayoutBox::text(content, ComputedStyle::with_display(Display::Inline))
    }

    #[test]
    fn test_skip_leading_spaces_in_text() {
        let bx = text("   abc");
        match skip_first_whitespace(&bx, None) {
            Skip::Resume(Some(cursor)) => assert_eq!(cursor, ResumeCursor::at(3)),
            _ => panic!("expected a cursor past the spaces"),
        }
        assert!(matches!(skip_first_whitespace(&text("   "), None), Skip::Exhausted));
    }

    #[test]
    fn test_skip_walks_into_the_next_child() {
        let style = ComputedStyle::with_display(Display::Inline);
        let line = LayoutBox::anonymous(BoxKind::Line, style, vec![text("  "), text(" x")]);
        match skip_first_whitespace(&line, None) {
            Skip::Resume(Some(cursor)) => {
                assert_eq!(cursor, ResumeCursor::nested(1, ResumeCursor::at(1)));
            }
            _ => panic!("expected a cursor into the second child"),
        }
    }

    #[test]
    fn test_skip_keeps_preserved_spaces() {
        let mut style = ComputedStyle::with_display(Display::Inline);
        style.white_space = WhiteSpace::Pre;
        let bx = LayoutBox::text("  a", style);
        assert!(matches!(skip_first_whitespace(&bx, None), Skip::Resume(None)));
    }

    #[test]
    fn test_blank_text_is_not_visible() {
        assert!(!has_visible_content(&text("   ")));
        assert!(has_visible_content(&text(" a ")));
    }
}
