//! CSS Layout Engine
//!
//! This module implements the parts of the CSS Visual Formatting Model a
//! paginated renderer needs, with every entry point resumable at a page
//! break.
//!
//! # Relevant Specifications
//!
//! - [CSS Box Model Module Level 3](https://www.w3.org/TR/css-box-3/)
//! - [CSS 2.1 Visual Formatting Model](https://www.w3.org/TR/CSS2/visuren.html)
//! - [CSS 2.1 Visual formatting model details](https://www.w3.org/TR/CSS2/visudet.html)
//! - [CSS 2.1 Tables](https://www.w3.org/TR/CSS2/tables.html)
//! - [CSS Fragmentation Module Level 3](https://www.w3.org/TR/css-break-3/)
//!
//! # Module Structure
//!
//! - [`box_model`] - Box dimensions, rectangles, and edge sizes
//! - [`values`] - Used values that may still be `auto`
//! - [`layout_box`] - The box entity and its invariants
//! - [`resume`] - Resume cursors threaded across page breaks
//! - [`percentages`] - Used-value resolution against a containing block
//! - [`block`] - Block formatting context layout with pagination
//! - [`inline`] - Line breaking and baseline alignment
//! - [`preferred`] - Min-content and max-content widths
//! - [`table`] - The fixed table layout algorithm

pub mod block;
pub mod box_model;
pub mod inline;
pub mod layout_box;
pub mod percentages;
pub mod preferred;
pub mod resume;
pub mod table;
pub mod values;

pub use block::{BlockOutcome, block_level_layout};
pub use box_model::{BoxDimensions, EdgeSizes, Rect};
pub use inline::{InlineSplit, get_next_linebox, split_inline_level};
pub use layout_box::{BoxKind, LayoutBox, TableInfo, check_invariants};
pub use percentages::resolve_percentages;
pub use resume::ResumeCursor;
pub use values::{AutoEdgeSizes, AutoOr, UsedValues};

/// [§ 10.1 Definition of "containing block"](https://www.w3.org/TR/CSS2/visudet.html#containing-block-details)
///
/// "The position and size of an element's box(es) are sometimes calculated
/// relative to a certain rectangle, called the containing block of the
/// element."
///
/// Never stored on a box: each layout call receives the one it needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainingBlock {
    /// Left edge of the containing block's content area.
    pub x: f32,
    /// Width of the content area.
    pub width: f32,
    /// Height of the content area, when already known.
    pub height: Option<f32>,
}

impl ContainingBlock {
    /// A containing block whose height is not known yet.
    #[must_use]
    pub const fn with_width(x: f32, width: f32) -> Self {
        Self {
            x,
            width,
            height: None,
        }
    }
}

/// [§ 8.3.1 Collapsing margins](https://www.w3.org/TR/CSS2/box.html#collapsing-margins)
///
/// "When two or more margins collapse, the resulting margin width is the
/// maximum of the collapsing margins' widths. In the case of negative
/// margins, the maximum of the absolute values of the negative adjoining
/// margins is deducted from the maximum of the positive adjoining margins.
/// If there are no positive margins, the maximum of the absolute values
/// of the adjoining margins is deducted from zero."
#[must_use]
pub fn collapse_two_margins(a: f32, b: f32) -> f32 {
    if a >= 0.0 && b >= 0.0 {
        a.max(b)
    } else if a < 0.0 && b < 0.0 {
        a.min(b)
    } else {
        a + b
    }
}

/// Used (start margin, size, end margin) along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AxisSizes {
    /// Margin before the box.
    pub margin_start: f32,
    /// Content size.
    pub size: f32,
    /// Margin after the box.
    pub margin_end: f32,
}

impl AxisSizes {
    /// Margins plus `size` plus the given padding and border.
    #[must_use]
    pub fn outer(&self, padding_border: f32) -> f32 {
        self.margin_start + padding_border + self.size + self.margin_end
    }
}

/// [§ 10.3.3 Block-level, non-replaced elements in normal flow](https://www.w3.org/TR/CSS2/visudet.html#blockwidth)
///
/// "The following constraints must hold among the used values of the
/// other properties:
///
///   'margin-left' + 'border-left-width' + 'padding-left' + 'width' +
///   'padding-right' + 'border-right-width' + 'margin-right'
///   = width of containing block"
///
/// Solved for any axis: block widths, margin-box cross sizes and corner
/// boxes all use the same rules.
#[must_use]
pub fn solve_axis(
    available: f32,
    margin_start: AutoOr,
    padding_border: f32,
    size: AutoOr,
    margin_end: AutoOr,
) -> AxisSizes {
    let mut margin_start = margin_start;
    let mut margin_end = margin_end;

    // STEP 1: Handle the over-constrained case.
    //
    // "If 'width' is not 'auto' and 'border-left-width' + 'padding-left' +
    // 'width' + 'padding-right' + 'border-right-width' (plus any of
    // 'margin-left' or 'margin-right' that are not 'auto') is larger than
    // the width of the containing block, then any 'auto' values for
    // 'margin-left' or 'margin-right' are, for the following rules,
    // treated as zero."
    if let AutoOr::Length(size) = size {
        let total = padding_border + size + margin_start.to_px_or(0.0) + margin_end.to_px_or(0.0);
        if total > available {
            margin_start = AutoOr::Length(margin_start.to_px_or(0.0));
            margin_end = AutoOr::Length(margin_end.to_px_or(0.0));
        }
    }

    // STEP 2: Apply the constraint rules.
    match (margin_start, size, margin_end) {
        // RULE A: "If 'width' is set to 'auto', any other 'auto' values become
        //         '0' and 'width' follows from the resulting equality."
        (start, AutoOr::Auto, end) => {
            let start = start.to_px_or(0.0);
            let end = end.to_px_or(0.0);
            AxisSizes {
                margin_start: start,
                size: available - start - end - padding_border,
                margin_end: end,
            }
        }
        // RULE B: "If both 'margin-left' and 'margin-right' are 'auto', their
        //         used values are equal. This horizontally centers the element
        //         with respect to the edges of the containing block."
        (AutoOr::Auto, AutoOr::Length(size), AutoOr::Auto) => {
            let half = (available - size - padding_border) / 2.0;
            AxisSizes {
                margin_start: half,
                size,
                margin_end: half,
            }
        }
        // RULE C: "If there is exactly one value specified as 'auto', its used
        //         value follows from the equality."
        (AutoOr::Auto, AutoOr::Length(size), AutoOr::Length(end)) => AxisSizes {
            margin_start: available - size - end - padding_border,
            size,
            margin_end: end,
        },
        // RULE D: "If all of the above have a computed value other than 'auto',
        //         the values are said to be 'over-constrained' ... the specified
        //         value of 'margin-right' is ignored and the value is calculated
        //         so as to make the equality true."
        (AutoOr::Length(start), AutoOr::Length(size), _) => AxisSizes {
            margin_start: start,
            size,
            margin_end: available - size - start - padding_border,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_two_margins() {
        assert_eq!(collapse_two_margins(10.0, 20.0), 20.0);
        assert_eq!(collapse_two_margins(-10.0, -20.0), -20.0);
        assert_eq!(collapse_two_margins(30.0, -10.0), 20.0);
    }

    #[test]
    fn test_auto_width_absorbs_and_zeroes_auto_margins() {
        let s = solve_axis(
            100.0,
            AutoOr::Auto,
            10.0,
            AutoOr::Auto,
            AutoOr::Length(5.0),
        );
        assert_eq!(s, AxisSizes {
            margin_start: 0.0,
            size: 85.0,
            margin_end: 5.0
        });
    }

    #[test]
    fn test_auto_margins_center() {
        let s = solve_axis(100.0, AutoOr::Auto, 0.0, AutoOr::Length(60.0), AutoOr::Auto);
        assert_eq!(s.margin_start, 20.0);
        assert_eq!(s.margin_end, 20.0);
    }

    #[test]
    fn test_single_auto_margin_absorbs() {
        let s = solve_axis(
            100.0,
            AutoOr::Auto,
            4.0,
            AutoOr::Length(60.0),
            AutoOr::Length(6.0),
        );
        assert_eq!(s.margin_start, 30.0);
    }

    #[test]
    fn test_over_constrained_zeroes_auto_margins_first() {
        let s = solve_axis(50.0, AutoOr::Auto, 0.0, AutoOr::Length(80.0), AutoOr::Auto);
        assert_eq!(s.margin_start, 0.0);
        assert_eq!(s.margin_end, -30.0);
        assert_eq!(s.outer(0.0), 50.0);
    }
}
