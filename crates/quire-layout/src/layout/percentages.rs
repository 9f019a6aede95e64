//! Percentage resolution.
//!
//! [§ 4.3 Percentages](https://www.w3.org/TR/css-values-4/#percentages)
//!
//! "Percentage values are always relative to another quantity, for example
//! a length. Each property that allows percentages also defines the quantity
//! to which the percentage refers."
//!
//! Reads the box's computed style, writes [`UsedValues`] onto the box. The
//! computed style is never modified, so resolving twice against the same
//! containing block gives the same result.

use super::ContainingBlock;
use super::box_model::EdgeSizes;
use super::layout_box::{BoxKind, LayoutBox};
use super::values::{AutoEdgeSizes, AutoOr, UsedValues};
use crate::style::{BoxSizing, ComputedStyle, LengthPercentageOrAuto};

fn resolve_auto(value: LengthPercentageOrAuto, reference: Option<f32>) -> AutoOr {
    match value {
        LengthPercentageOrAuto::Auto => AutoOr::Auto,
        LengthPercentageOrAuto::Px(px) => AutoOr::Length(px),
        // A percentage against an unknown reference behaves as 'auto'.
        LengthPercentageOrAuto::Percent(p) => {
            reference.map_or(AutoOr::Auto, |r| AutoOr::Length(r * p / 100.0))
        }
    }
}

/// Resolve the percentages of `bx` against `cb`.
///
/// [§ 8.3 Margin properties](https://www.w3.org/TR/CSS2/box.html#margin-properties)
///
/// "The percentage is calculated with respect to the width of the generated
/// box's containing block. Note that this is true for 'margin-top' and
/// 'margin-bottom' as well."
///
/// Page boxes are the exception: their vertical margins and paddings refer
/// to the page height.
///
/// [§ 10.5 Content height](https://www.w3.org/TR/CSS2/visudet.html#the-height-property)
///
/// "If the height of the containing block is not specified explicitly ...
/// the value computes to 'auto'." Likewise `min-height` falls back to 0 and
/// `max-height` to `none`.
pub fn resolve_percentages(bx: &mut LayoutBox, cb: &ContainingBlock) {
    bx.used = used_values(&bx.style, matches!(bx.kind, BoxKind::Page(_)), cb);
}

/// The used values of `style` against `cb`.
#[must_use]
pub fn used_values(style: &ComputedStyle, is_page: bool, cb: &ContainingBlock) -> UsedValues {
    let width = Some(cb.width);
    let vertical_reference = if is_page { cb.height } else { width };

    let margin = AutoEdgeSizes {
        top: resolve_auto(style.margin.top, vertical_reference),
        right: resolve_auto(style.margin.right, width),
        bottom: resolve_auto(style.margin.bottom, vertical_reference),
        left: resolve_auto(style.margin.left, width),
    };
    let padding = EdgeSizes {
        top: style.padding.top.resolve(vertical_reference).unwrap_or(0.0),
        right: style.padding.right.resolve(width).unwrap_or(0.0),
        bottom: style.padding.bottom.resolve(vertical_reference).unwrap_or(0.0),
        left: style.padding.left.resolve(width).unwrap_or(0.0),
    };
    // Border widths are never percentages.
    let border = EdgeSizes {
        top: style.border_width.top,
        right: style.border_width.right,
        bottom: style.border_width.bottom,
        left: style.border_width.left,
    };

    let mut used = UsedValues {
        margin,
        padding,
        border,
        width: resolve_auto(style.width, width),
        height: resolve_auto(style.height, cb.height),
        min_width: style.min_width.resolve(width).unwrap_or(0.0),
        max_width: style
            .max_width
            .and_then(|max| max.resolve(width))
            .unwrap_or(f32::INFINITY),
        min_height: style.min_height.resolve(cb.height).unwrap_or(0.0),
        max_height: style
            .max_height
            .and_then(|max| max.resolve(cb.height))
            .unwrap_or(f32::INFINITY),
        text_indent: style.text_indent.resolve(width).unwrap_or(0.0),
    };

    // [§ 4.4 box-sizing](https://www.w3.org/TR/css-sizing-3/#box-sizing)
    //
    // "border-box: ... the width and height properties (and min/max
    // properties) on this element determine the border box of the element."
    //
    // Used values are content-box sizes from here on.
    if style.box_sizing == BoxSizing::BorderBox {
        let horizontal = used.horizontal_pb();
        let vertical = used.vertical_pb();
        let shrink = |value: f32, by: f32| (value - by).max(0.0);
        if let AutoOr::Length(w) = used.width {
            used.width = AutoOr::Length(shrink(w, horizontal));
        }
        if let AutoOr::Length(h) = used.height {
            used.height = AutoOr::Length(shrink(h, vertical));
        }
        used.min_width = shrink(used.min_width, horizontal);
        used.max_width = shrink(used.max_width, horizontal);
        used.min_height = shrink(used.min_height, vertical);
        used.max_height = shrink(used.max_height, vertical);
    }

    used
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{Display, LengthPercentage, Sides};

    fn block(style: ComputedStyle) -> LayoutBox {
        LayoutBox::new(BoxKind::Block, style, None)
    }

    #[test]
    fn test_percentages_refer_to_width() {
        let mut style = ComputedStyle::with_display(Display::Block);
        style.margin.top = LengthPercentageOrAuto::Percent(10.0);
        style.padding.left = LengthPercentage::Percent(5.0);
        style.width = LengthPercentageOrAuto::Percent(50.0);
        style.text_indent = LengthPercentage::Percent(2.0);
        let mut bx = block(style);

        resolve_percentages(&mut bx, &ContainingBlock::with_width(0.0, 200.0));
        assert_eq!(bx.used.margin.top, AutoOr::Length(20.0));
        assert_eq!(bx.used.padding.left, 10.0);
        assert_eq!(bx.used.width, AutoOr::Length(100.0));
        assert_eq!(bx.used.text_indent, 4.0);
    }

    #[test]
    fn test_unknown_height_falls_back() {
        let mut style = ComputedStyle::with_display(Display::Block);
        style.height = LengthPercentageOrAuto::Percent(50.0);
        style.min_height = LengthPercentage::Percent(10.0);
        style.max_height = Some(LengthPercentage::Percent(90.0));
        let mut bx = block(style);

        resolve_percentages(&mut bx, &ContainingBlock::with_width(0.0, 200.0));
        assert_eq!(bx.used.height, AutoOr::Auto);
        assert_eq!(bx.used.min_height, 0.0);
        assert_eq!(bx.used.max_height, f32::INFINITY);
    }

    #[test]
    fn test_page_vertical_edges_refer_to_height() {
        let mut style = ComputedStyle::with_display(Display::Block);
        style.margin = Sides::all(LengthPercentageOrAuto::Percent(10.0));
        let mut page = LayoutBox::new(
            BoxKind::Page(crate::page::PageType::first()),
            style,
            None,
        );
        let cb = ContainingBlock {
            x: 0.0,
            width: 100.0,
            height: Some(300.0),
        };
        resolve_percentages(&mut page, &cb);
        assert_eq!(page.used.margin.top, AutoOr::Length(30.0));
        assert_eq!(page.used.margin.left, AutoOr::Length(10.0));
    }

    #[test]
    fn test_border_box_sizing_is_undone() {
        let mut style = ComputedStyle::with_display(Display::Block);
        style.box_sizing = BoxSizing::BorderBox;
        style.width = LengthPercentageOrAuto::Px(10.0);
        style.padding = Sides::all(LengthPercentage::Px(4.0));
        style.border_width = Sides::all(1.0);
        let mut bx = block(style);

        resolve_percentages(&mut bx, &ContainingBlock::with_width(0.0, 100.0));
        assert_eq!(bx.used.width, AutoOr::Length(0.0));
        assert_eq!(bx.used.border.left, 1.0);
    }
}
