//! Preferred widths.
//!
//! [§ 10.3.5 Floating, non-replaced elements](https://www.w3.org/TR/CSS2/visudet.html#float-width)
//!
//! "Calculation of the shrink-to-fit width is similar to calculating the
//! width of a table cell using the automatic table layout algorithm.
//! Roughly: calculate the preferred width by formatting the content without
//! breaking lines other than where explicit line breaks occur, and also
//! calculate the preferred minimum width, e.g., by trying all possible line
//! breaks."
//!
//! Percentages have no reference here and count as zero.

use super::block::replaced_size;
use super::layout_box::{BoxKind, LayoutBox};
use super::percentages::used_values;
use super::ContainingBlock;
use crate::config::LayoutContext;
use crate::style::{BoxSizing, ComputedStyle, LengthPercentage, LengthPercentageOrAuto};

/// Min-content and max-content widths.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PreferredWidths {
    /// Narrowest width without overflow: the widest unbreakable unit.
    pub min: f32,
    /// Width without any soft wrap.
    pub max: f32,
}

impl PreferredWidths {
    fn both(width: f32) -> Self {
        Self {
            min: width,
            max: width,
        }
    }

    fn widen(self, by: f32) -> Self {
        Self {
            min: self.min + by,
            max: self.max + by,
        }
    }
}

/// Preferred widths of the content of `bx`, excluding its own edges.
#[must_use]
pub fn content_widths(ctx: &LayoutContext<'_>, bx: &LayoutBox) -> PreferredWidths {
    match &bx.kind {
        BoxKind::Text(text) => text_widths(ctx, text, &bx.style),
        BoxKind::Replaced { intrinsics, .. } => {
            let used = used_values(&bx.style, false, &ContainingBlock::with_width(0.0, 0.0));
            PreferredWidths::both(replaced_size(ctx.config, intrinsics, &used).0)
        }
        // Inline content flows: the widest piece or everything side by side.
        BoxKind::Inline | BoxKind::Line => {
            bx.children
                .iter()
                .map(|child| outer_widths(ctx, child))
                .fold(PreferredWidths::default(), |acc, child| PreferredWidths {
                    min: acc.min.max(child.min),
                    max: acc.max + child.max,
                })
        }
        BoxKind::Table(info) => {
            let spacing = bx.style.border_spacing;
            let mut widths = PreferredWidths::default();
            for row in bx.children.iter().flat_map(|group| &group.children) {
                let cells = row.children.iter().map(|cell| outer_widths(ctx, cell));
                let row_widths = cells.fold(PreferredWidths::default(), |acc, cell| {
                    PreferredWidths {
                        min: acc.min + cell.min + spacing,
                        max: acc.max + cell.max + spacing,
                    }
                });
                let row_widths = row_widths.widen(spacing);
                widths.min = widths.min.max(row_widths.min);
                widths.max = widths.max.max(row_widths.max);
            }
            let columns: f32 = info
                .column_groups
                .iter()
                .flat_map(|group| &group.children)
                .filter_map(|column| px(column.style.width))
                .sum();
            PreferredWidths {
                min: widths.min.max(columns),
                max: widths.max.max(columns),
            }
        }
        // Block content stacks: the widest child either way.
        _ => bx
            .children
            .iter()
            .map(|child| outer_widths(ctx, child))
            .fold(PreferredWidths::default(), |acc, child| PreferredWidths {
                min: acc.min.max(child.min),
                max: acc.max.max(child.max),
            }),
    }
}

/// Preferred widths of `bx` including its margins, borders and paddings.
/// A fixed `width` replaces the content widths.
#[must_use]
pub fn outer_widths(ctx: &LayoutContext<'_>, bx: &LayoutBox) -> PreferredWidths {
    let style = &bx.style;
    let edges = margin_px(style.margin.left)
        + margin_px(style.margin.right)
        + padding_px(style.padding.left)
        + padding_px(style.padding.right)
        + style.border_width.left
        + style.border_width.right;

    let sized = !matches!(bx.kind, BoxKind::Inline | BoxKind::Line | BoxKind::Text(_));
    let content = match px(style.width) {
        Some(width) if sized && !bx.is_replaced() => {
            let width = if style.box_sizing == BoxSizing::BorderBox {
                (width - padding_px(style.padding.left) - padding_px(style.padding.right)
                    - style.border_width.left
                    - style.border_width.right)
                    .max(0.0)
            } else {
                width
            };
            PreferredWidths::both(width)
        }
        _ => content_widths(ctx, bx),
    };
    let content = if sized { clamp(content, style) } else { content };
    content.widen(edges)
}

/// [§ 10.3.5](https://www.w3.org/TR/CSS2/visudet.html#float-width)
///
/// "the shrink-to-fit width is: min(max(preferred minimum width, available
/// width), preferred width)."
#[must_use]
pub fn shrink_to_fit(ctx: &LayoutContext<'_>, bx: &LayoutBox, available: f32) -> f32 {
    let preferred = content_widths(ctx, bx);
    preferred.min.max(available).min(preferred.max)
}

/// Widest unbreakable unit and widest forced line of `text`.
fn text_widths(ctx: &LayoutContext<'_>, text: &str, style: &ComputedStyle) -> PreferredWidths {
    let max = ctx
        .measurer
        .line_widths(text, style)
        .into_iter()
        .fold(0.0, f32::max);

    // Break after every unit: each measured prefix at zero width is one
    // unbreakable piece.
    let mut min: f32 = 0.0;
    let mut rest = text;
    while !rest.is_empty() {
        let measured = ctx.measurer.measure(rest, style, Some(0.0));
        let unit = rest[..measured.fitted_len.min(rest.len())].trim_end_matches(' ');
        if !unit.is_empty() {
            min = min.max(ctx.measurer.measure(unit, style, None).width);
        }
        match measured.resume_at {
            Some(next) if next > 0 && next <= rest.len() => rest = &rest[next..],
            _ => break,
        }
    }

    PreferredWidths { min, max: max.max(min) }
}

fn clamp(widths: PreferredWidths, style: &ComputedStyle) -> PreferredWidths {
    let min_width = padding_px(style.min_width);
    let max_width = style.max_width.map_or(f32::INFINITY, padding_px);
    let clamp = |w: f32| w.min(max_width).max(min_width);
    PreferredWidths {
        min: clamp(widths.min),
        max: clamp(widths.max),
    }
}

fn px(value: LengthPercentageOrAuto) -> Option<f32> {
    match value {
        LengthPercentageOrAuto::Px(px) => Some(px),
        _ => None,
    }
}

fn margin_px(value: LengthPercentageOrAuto) -> f32 {
    px(value).unwrap_or(0.0)
}

fn padding_px(value: LengthPercentage) -> f32 {
    match value {
        LengthPercentage::Px(px) => px,
        LengthPercentage::Percent(_) => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::replaced::ImageTable;
    use crate::style::{Display, StyleMap};
    use crate::text::MonospaceMeasurer;
    use quire_dom::DomTree;

    fn with_ctx(check: impl FnOnce(&LayoutContext<'_>)) {
        let tree = DomTree::new();
        let styles = StyleMap::new();
        // 10px per character with a 10px font.
        let measurer = MonospaceMeasurer::new(1.0);
        let images = ImageTable::new();
        let config = LayoutConfig::default();
        let ctx = LayoutContext {
            tree: &tree,
            styles: &styles,
            measurer: &measurer,
            replaced: &images,
            config: &config,
        };
        check(&ctx);
    }

    fn small_text(content: &str) -> LayoutBox {
        let mut style = ComputedStyle::with_display(Display::Inline);
        style.font_size = 10.0;
        LayoutBox::text(content, style)
    }

    #[test]
    fn test_text_min_is_longest_word() {
        with_ctx(|ctx| {
            let widths = content_widths(ctx, &small_text("ab abcd a"));
            assert_eq!(widths.min, 40.0);
            assert_eq!(widths.max, 90.0);
        });
    }

    #[test]
    fn test_shrink_to_fit_clamps_between_min_and_max() {
        with_ctx(|ctx| {
            let line = LayoutBox::anonymous(
                BoxKind::Line,
                ComputedStyle::default(),
                vec![small_text("ab abcd a")],
            );
            let block = LayoutBox::anonymous(
                BoxKind::InlineBlock,
                ComputedStyle::with_display(Display::InlineBlock),
                vec![line],
            );
            assert_eq!(shrink_to_fit(ctx, &block, 10.0), 40.0);
            assert_eq!(shrink_to_fit(ctx, &block, 60.0), 60.0);
            assert_eq!(shrink_to_fit(ctx, &block, 500.0), 90.0);
        });
    }

    #[test]
    fn test_fixed_width_and_edges_count_outside() {
        with_ctx(|ctx| {
            let mut style = ComputedStyle::with_display(Display::Block);
            style.width = LengthPercentageOrAuto::Px(50.0);
            style.padding.left = LengthPercentage::Px(5.0);
            style.padding.right = LengthPercentage::Percent(50.0);
            let bx = LayoutBox::new(BoxKind::Block, style, None);
            assert_eq!(outer_widths(ctx, &bx), PreferredWidths::both(55.0));
        });
    }
}
