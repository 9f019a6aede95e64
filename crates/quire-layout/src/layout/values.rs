//! Used values that may still be `auto`.
//!
//! [§ 6.1 Used Values](https://www.w3.org/TR/css-cascade-4/#used)
//!
//! "The used value is the result of taking the computed value and
//! completing any remaining calculations to make it the absolute
//! theoretical value used in the layout of the document."
//!
//! The percentage resolver turns computed values into these; width and
//! height solving then eliminates the remaining `auto`s.

use serde::Serialize;

use super::box_model::EdgeSizes;

/// [§ 4.4 Automatic values](https://www.w3.org/TR/CSS2/cascade.html#value-def-auto)
///
/// "Some properties can take the keyword 'auto' as a value. This keyword
/// allows the user agent to compute the value based on other properties."
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub enum AutoOr {
    /// The value is 'auto' and must be resolved during layout.
    #[default]
    Auto,
    /// The value is a specific length in pixels.
    Length(f32),
}

impl AutoOr {
    /// Check if the value is 'auto'.
    #[must_use]
    pub const fn is_auto(&self) -> bool {
        matches!(self, Self::Auto)
    }

    /// Get the length value, or a default if 'auto'.
    #[must_use]
    pub const fn to_px_or(&self, default: f32) -> f32 {
        match self {
            Self::Length(v) => *v,
            Self::Auto => default,
        }
    }

    /// The length, if not 'auto'.
    #[must_use]
    pub const fn length(&self) -> Option<f32> {
        match self {
            Self::Length(v) => Some(*v),
            Self::Auto => None,
        }
    }
}

/// [§ 8 Box model](https://www.w3.org/TR/CSS2/box.html)
///
/// Edge values where each side can be 'auto' or a specific length.
/// Used for margins where 'auto' has special meaning (centering).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AutoEdgeSizes {
    /// Top edge value.
    pub top: AutoOr,
    /// Right edge value.
    pub right: AutoOr,
    /// Bottom edge value.
    pub bottom: AutoOr,
    /// Left edge value.
    pub left: AutoOr,
}

/// Everything the percentage resolver writes onto a box.
///
/// Sizes are content-box sizes: `box-sizing: border-box` has already been
/// undone. Resolving twice against the same containing block gives equal
/// values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UsedValues {
    /// Margins; `auto` survives until width/height solving.
    pub margin: AutoEdgeSizes,
    /// Paddings in pixels.
    pub padding: EdgeSizes,
    /// Border widths in pixels.
    pub border: EdgeSizes,
    /// Content width or `auto`.
    pub width: AutoOr,
    /// Content height or `auto` (also when a percentage cannot resolve).
    pub height: AutoOr,
    /// Minimum content width.
    pub min_width: f32,
    /// Maximum content width (`f32::INFINITY` for `none`).
    pub max_width: f32,
    /// Minimum content height.
    pub min_height: f32,
    /// Maximum content height (`f32::INFINITY` for `none`).
    pub max_height: f32,
    /// First-line indentation.
    pub text_indent: f32,
}

impl Default for UsedValues {
    fn default() -> Self {
        Self {
            margin: AutoEdgeSizes {
                top: AutoOr::Length(0.0),
                right: AutoOr::Length(0.0),
                bottom: AutoOr::Length(0.0),
                left: AutoOr::Length(0.0),
            },
            padding: EdgeSizes::default(),
            border: EdgeSizes::default(),
            width: AutoOr::Auto,
            height: AutoOr::Auto,
            min_width: 0.0,
            max_width: f32::INFINITY,
            min_height: 0.0,
            max_height: f32::INFINITY,
            text_indent: 0.0,
        }
    }
}

impl UsedValues {
    /// Horizontal padding plus border.
    #[must_use]
    pub fn horizontal_pb(&self) -> f32 {
        self.padding.horizontal() + self.border.horizontal()
    }

    /// Vertical padding plus border.
    #[must_use]
    pub fn vertical_pb(&self) -> f32 {
        self.padding.vertical() + self.border.vertical()
    }

    /// Clamp a content width by min/max-width.
    ///
    /// [§ 10.4](https://www.w3.org/TR/CSS2/visudet.html#min-max-widths):
    /// max-width applies first, then min-width wins.
    #[must_use]
    pub fn clamp_width(&self, width: f32) -> f32 {
        width.min(self.max_width).max(self.min_width)
    }

    /// Clamp a content height by min/max-height.
    #[must_use]
    pub fn clamp_height(&self, height: f32) -> f32 {
        height.min(self.max_height).max(self.min_height)
    }
}
