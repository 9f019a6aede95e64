//! Box geometry.
//!
//! [CSS Box Model Module Level 3](https://www.w3.org/TR/css-box-3/)

use serde::Serialize;

/// [§ 3. The CSS Box Model](https://www.w3.org/TR/css-box-3/#box-model)
///
/// "Each box has a content area and optional surrounding padding, border,
/// and margin areas."
///
/// The content rectangle is positioned in page coordinates; the three edge
/// sets are used values in pixels. Fragments sliced at a page break carry
/// zero on the sliced side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BoxDimensions {
    /// Content area, positioned.
    pub content: Rect,
    /// Padding widths around the content area.
    pub padding: EdgeSizes,
    /// Border widths around the padding area.
    pub border: EdgeSizes,
    /// Margin widths around the border area.
    pub margin: EdgeSizes,
}

/// A rectangle positioned in page coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Rect {
    /// Horizontal position of the top-left corner.
    pub x: f32,
    /// Vertical position of the top-left corner.
    pub y: f32,
    /// Width of the rectangle.
    pub width: f32,
    /// Height of the rectangle.
    pub height: f32,
}

impl Rect {
    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}

/// Edge sizes for padding, border, or margin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct EdgeSizes {
    /// Top edge size.
    pub top: f32,
    /// Right edge size.
    pub right: f32,
    /// Bottom edge size.
    pub bottom: f32,
    /// Left edge size.
    pub left: f32,
}

impl EdgeSizes {
    /// Left plus right.
    #[must_use]
    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    /// Top plus bottom.
    #[must_use]
    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }
}

impl BoxDimensions {
    // The boxes from innermost to outermost:
    //   1. Content box  - the actual content (text, images, etc.)
    //   2. Padding box  - content + padding
    //   3. Border box   - content + padding + border
    //   4. Margin box   - content + padding + border + margin (outermost)

    /// [§ 3.1 Margins](https://www.w3.org/TR/css-box-3/#margins)
    ///
    /// "The margin box is the outermost box, and contains all four areas."
    #[must_use]
    pub fn margin_box(&self) -> Rect {
        self.expand(&[self.padding, self.border, self.margin])
    }

    /// [§ 3.2 Padding](https://www.w3.org/TR/css-box-3/#paddings)
    ///
    /// "The padding box contains both the content and padding areas."
    #[must_use]
    pub fn padding_box(&self) -> Rect {
        self.expand(&[self.padding])
    }

    /// [§ 3.3 Borders](https://www.w3.org/TR/css-box-3/#borders)
    ///
    /// "The border box contains content, padding, and border areas."
    #[must_use]
    pub fn border_box(&self) -> Rect {
        self.expand(&[self.padding, self.border])
    }

    /// The content area.
    #[must_use]
    pub const fn content_box(&self) -> Rect {
        self.content
    }

    /// Grow the content rectangle outward through `layers`, innermost first.
    ///
    /// ```text
    /// x = content.x - Σ layer.left
    /// width = content.width + Σ (layer.left + layer.right)
    /// ```
    fn expand(&self, layers: &[EdgeSizes]) -> Rect {
        layers.iter().fold(self.content, |rect, edges| Rect {
            x: rect.x - edges.left,
            y: rect.y - edges.top,
            width: rect.width + edges.horizontal(),
            height: rect.height + edges.vertical(),
        })
    }

    /// Sum of left margin, border and padding.
    #[must_use]
    pub fn left_mbp(&self) -> f32 {
        self.margin.left + self.border.left + self.padding.left
    }

    /// Sum of right padding, border and margin.
    #[must_use]
    pub fn right_mbp(&self) -> f32 {
        self.margin.right + self.border.right + self.padding.right
    }

    /// Sum of top margin, border and padding.
    #[must_use]
    pub fn top_mbp(&self) -> f32 {
        self.margin.top + self.border.top + self.padding.top
    }

    /// Sum of bottom padding, border and margin.
    #[must_use]
    pub fn bottom_mbp(&self) -> f32 {
        self.margin.bottom + self.border.bottom + self.padding.bottom
    }
}
