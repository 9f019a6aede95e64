//! Computed style snapshot consumed by layout.
//!
//! [§ 4.4 Computed Values](https://www.w3.org/TR/css-cascade-4/#computed)
//!
//! "The computed value is the result of resolving the specified value...
//! as far as possible without laying out the document."
//!
//! Lengths arrive already reduced to pixels; only percentages and `auto`
//! remain for the [percentage resolver](crate::layout::percentages).

use serde::{Deserialize, Serialize};
use strum_macros::{Display as StrumDisplay, EnumString};

/// [§ 2 Box Layout Modes: the display property](https://www.w3.org/TR/css-display-3/#the-display-properties)
///
/// Every keyword the cascade can hand us. Values without a layout model in
/// this engine are kept so the builder can reject them explicitly.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, StrumDisplay, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Display {
    /// `display: block`
    Block,
    /// `display: inline`
    #[default]
    Inline,
    /// `display: inline-block`
    InlineBlock,
    /// `display: list-item`
    ListItem,
    /// `display: table`
    Table,
    /// `display: inline-table`
    InlineTable,
    /// `display: table-row-group`
    TableRowGroup,
    /// `display: table-header-group`
    TableHeaderGroup,
    /// `display: table-footer-group`
    TableFooterGroup,
    /// `display: table-row`
    TableRow,
    /// `display: table-cell`
    TableCell,
    /// `display: table-column`
    TableColumn,
    /// `display: table-column-group`
    TableColumnGroup,
    /// `display: table-caption` (unsupported)
    TableCaption,
    /// `display: flex` (unsupported)
    Flex,
    /// `display: inline-flex` (unsupported)
    InlineFlex,
    /// `display: grid` (unsupported)
    Grid,
    /// `display: inline-grid` (unsupported)
    InlineGrid,
    /// `display: run-in` (unsupported)
    RunIn,
    /// `display: contents` (unsupported)
    Contents,
    /// `display: none`
    None,
}

impl Display {
    /// [§ 2.7 Automatic Box Type Transformations](https://www.w3.org/TR/css-display-3/#transformations)
    ///
    /// "The root element's display type is always blockified."
    #[must_use]
    pub const fn blockified(self) -> Self {
        match self {
            Self::Inline | Self::InlineBlock => Self::Block,
            Self::InlineTable => Self::Table,
            other => other,
        }
    }

    /// True for the table-internal display types of CSS 2.1 § 17.2.
    #[must_use]
    pub const fn is_table_internal(self) -> bool {
        matches!(
            self,
            Self::TableRowGroup
                | Self::TableHeaderGroup
                | Self::TableFooterGroup
                | Self::TableRow
                | Self::TableCell
                | Self::TableColumn
                | Self::TableColumnGroup
        )
    }
}

/// A `<length-percentage>` with the length already in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthPercentage {
    /// Absolute pixels.
    Px(f32),
    /// Percentage of the containing block (0–100).
    Percent(f32),
}

impl Default for LengthPercentage {
    fn default() -> Self {
        Self::Px(0.0)
    }
}

impl LengthPercentage {
    /// Resolve against `reference`; `None` when the reference is unknown and
    /// the value is a percentage.
    #[must_use]
    pub fn resolve(self, reference: Option<f32>) -> Option<f32> {
        match self {
            Self::Px(px) => Some(px),
            Self::Percent(p) => reference.map(|r| r * p / 100.0),
        }
    }
}

/// A `<length-percentage> | auto`, as used by margins, width and height.
///
/// The default is zero pixels, the initial value of margins; `width` and
/// `height` start from `auto` explicitly in [`ComputedStyle::default`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthPercentageOrAuto {
    /// The `auto` keyword.
    Auto,
    /// Absolute pixels.
    Px(f32),
    /// Percentage of the containing block (0–100).
    Percent(f32),
}

impl Default for LengthPercentageOrAuto {
    fn default() -> Self {
        Self::ZERO
    }
}

impl LengthPercentageOrAuto {
    /// Zero pixels, the initial value of margins.
    pub const ZERO: Self = Self::Px(0.0);

    /// True for `auto`.
    #[must_use]
    pub const fn is_auto(self) -> bool {
        matches!(self, Self::Auto)
    }
}

/// Four per-side values in CSS order.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Sides<T> {
    /// Top side.
    pub top: T,
    /// Right side.
    pub right: T,
    /// Bottom side.
    pub bottom: T,
    /// Left side.
    pub left: T,
}

impl<T: Copy> Sides<T> {
    /// The same value on every side.
    pub const fn all(value: T) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }
}

/// [§ 4.4 box-sizing](https://www.w3.org/TR/css-sizing-3/#box-sizing)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BoxSizing {
    /// Sizes refer to the content box.
    #[default]
    ContentBox,
    /// Sizes include padding and border.
    BorderBox,
}

/// [§ 16.2 Alignment: the 'text-align' property](https://www.w3.org/TR/CSS2/text.html#alignment-prop)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// Lines start at the left edge.
    #[default]
    Left,
    /// Lines end at the right edge.
    Right,
    /// Lines are centered.
    Center,
}

/// [§ 16.6 White space: the 'white-space' property](https://www.w3.org/TR/CSS2/text.html#white-space-prop)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, StrumDisplay, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum WhiteSpace {
    /// Collapse white space, wrap lines.
    #[default]
    Normal,
    /// Collapse white space, never wrap.
    Nowrap,
    /// Preserve white space, wrap only at newlines.
    Pre,
    /// Preserve white space, wrap as needed.
    PreWrap,
    /// Collapse spaces but keep newlines.
    PreLine,
}

impl WhiteSpace {
    /// Runs of spaces and tabs collapse to one space.
    #[must_use]
    pub const fn collapses_spaces(self) -> bool {
        matches!(self, Self::Normal | Self::Nowrap | Self::PreLine)
    }

    /// Newlines are forced line breaks.
    #[must_use]
    pub const fn preserves_newlines(self) -> bool {
        matches!(self, Self::Pre | Self::PreWrap | Self::PreLine)
    }

    /// Soft wrap opportunities exist.
    #[must_use]
    pub const fn wraps(self) -> bool {
        matches!(self, Self::Normal | Self::PreWrap | Self::PreLine)
    }
}

/// [§ 5.2 Breaking Rules for Letters: the word-break property](https://www.w3.org/TR/css-text-3/#word-break-property)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WordBreak {
    /// Break only at word boundaries.
    #[default]
    Normal,
    /// Any typographic letter unit is a break opportunity.
    BreakAll,
}

/// [§ 10.8.1 Leading and half-leading](https://www.w3.org/TR/CSS2/visudet.html#leading)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineHeight {
    /// "We recommend a used value for 'normal' between 1.0 and 1.2."
    #[default]
    Normal,
    /// A multiple of the font size.
    Number(f32),
    /// Absolute pixels.
    Px(f32),
}

/// [§ 13.3.1 Page break properties](https://www.w3.org/TR/CSS2/page.html#page-break-props)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageBreak {
    /// "Neither force nor forbid a page break."
    #[default]
    Auto,
    /// "Always force a page break."
    Always,
    /// "Avoid a page break." Accepted, treated as `auto`.
    Avoid,
    /// "Force one or two page breaks so that the next page is formatted as a
    /// left page."
    Left,
    /// "Force one or two page breaks so that the next page is formatted as a
    /// right page."
    Right,
}

impl PageBreak {
    /// True for the values that force a break.
    #[must_use]
    pub const fn is_forced(self) -> bool {
        matches!(self, Self::Always | Self::Left | Self::Right)
    }

    /// The page-side hint carried to the next page.
    #[must_use]
    pub const fn hint(self) -> Self {
        match self {
            Self::Left | Self::Right => self,
            _ => Self::Auto,
        }
    }
}

/// [§ 12.6.2 Lists: the 'list-style-type' property](https://www.w3.org/TR/CSS2/generate.html#propdef-list-style-type)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListStyleType {
    /// A filled circle.
    #[default]
    Disc,
    /// A hollow circle.
    Circle,
    /// A filled square.
    Square,
    /// 1, 2, 3, ...
    Decimal,
    /// a, b, c, ...
    LowerAlpha,
    /// A, B, C, ...
    UpperAlpha,
    /// i, ii, iii, ...
    LowerRoman,
    /// I, II, III, ...
    UpperRoman,
    /// No marker.
    None,
}

/// [§ 12.6.2 'list-style-position'](https://www.w3.org/TR/CSS2/generate.html#propdef-list-style-position)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListStylePosition {
    /// The marker box is outside the principal block box.
    #[default]
    Outside,
    /// The marker box is the first inline box in the principal block box.
    Inside,
}

/// [§ 17.5.2 Table width algorithms: the 'table-layout' property](https://www.w3.org/TR/CSS2/tables.html#width-layout)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableLayoutMode {
    /// The automatic algorithm (laid out with the fixed one here).
    #[default]
    Auto,
    /// The fixed table layout algorithm.
    Fixed,
}

/// One item of the `content` property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentItem {
    /// A literal string.
    Text(String),
    /// `counter(page)`
    PageCounter,
    /// `counter(pages)`
    PagesCounter,
}

/// [§ 7.1 Page size: the 'size' property](https://www.w3.org/TR/css-page-3/#page-size-prop)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    /// Page width in pixels.
    pub width: f32,
    /// Page height in pixels.
    pub height: f32,
}

/// The computed values of every property layout reads.
///
/// Each box owns its own snapshot; layout may adjust it per fragment without
/// affecting the normalized tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ComputedStyle {
    /// `display`
    pub display: Display,
    /// `margin-*`
    pub margin: Sides<LengthPercentageOrAuto>,
    /// `padding-*`
    pub padding: Sides<LengthPercentage>,
    /// `border-*-width`, already zero where the border style is `none`.
    pub border_width: Sides<f32>,
    /// `width`
    pub width: LengthPercentageOrAuto,
    /// `height`
    pub height: LengthPercentageOrAuto,
    /// `min-width`
    pub min_width: LengthPercentage,
    /// `min-height`
    pub min_height: LengthPercentage,
    /// `max-width`; `None` is the `none` keyword.
    pub max_width: Option<LengthPercentage>,
    /// `max-height`; `None` is the `none` keyword.
    pub max_height: Option<LengthPercentage>,
    /// `box-sizing`
    pub box_sizing: BoxSizing,
    /// `text-indent` (inherited)
    pub text_indent: LengthPercentage,
    /// `text-align` (inherited)
    pub text_align: TextAlign,
    /// `white-space` (inherited)
    pub white_space: WhiteSpace,
    /// `word-break` (inherited)
    pub word_break: WordBreak,
    /// `font-size` in pixels (inherited)
    pub font_size: f32,
    /// `line-height` (inherited)
    pub line_height: LineHeight,
    /// `page-break-before`
    pub page_break_before: PageBreak,
    /// `page-break-after`
    pub page_break_after: PageBreak,
    /// `list-style-type` (inherited)
    pub list_style_type: ListStyleType,
    /// `list-style-position` (inherited)
    pub list_style_position: ListStylePosition,
    /// `list-style-image` (inherited)
    pub list_style_image: Option<String>,
    /// `border-spacing`, one value for both axes (inherited)
    pub border_spacing: f32,
    /// `table-layout`
    pub table_layout: TableLayoutMode,
    /// `content`; `None` is `normal`/`none`.
    pub content: Option<Vec<ContentItem>>,
    /// `size`, meaningful on page styles only.
    pub size: Option<PageSize>,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            display: Display::Inline,
            margin: Sides::all(LengthPercentageOrAuto::ZERO),
            padding: Sides::default(),
            border_width: Sides::default(),
            width: LengthPercentageOrAuto::Auto,
            height: LengthPercentageOrAuto::Auto,
            min_width: LengthPercentage::Px(0.0),
            min_height: LengthPercentage::Px(0.0),
            max_width: None,
            max_height: None,
            box_sizing: BoxSizing::ContentBox,
            text_indent: LengthPercentage::Px(0.0),
            text_align: TextAlign::Left,
            white_space: WhiteSpace::Normal,
            word_break: WordBreak::Normal,
            font_size: 16.0,
            line_height: LineHeight::Normal,
            page_break_before: PageBreak::Auto,
            page_break_after: PageBreak::Auto,
            list_style_type: ListStyleType::Disc,
            list_style_position: ListStylePosition::Outside,
            list_style_image: None,
            border_spacing: 0.0,
            table_layout: TableLayoutMode::Auto,
            content: None,
            size: None,
        }
    }
}

impl ComputedStyle {
    /// A style with every property at its initial value except `display`.
    #[must_use]
    pub fn with_display(display: Display) -> Self {
        Self {
            display,
            ..Self::default()
        }
    }

    /// [§ 9.2.1.1 Anonymous block boxes](https://www.w3.org/TR/CSS2/visuren.html#anonymous-block-level)
    ///
    /// "The properties of anonymous boxes are inherited from the enclosing
    /// non-anonymous box. Non-inherited properties have their initial value."
    #[must_use]
    pub fn anonymous_from(parent: &Self) -> Self {
        Self {
            text_indent: parent.text_indent,
            text_align: parent.text_align,
            white_space: parent.white_space,
            word_break: parent.word_break,
            font_size: parent.font_size,
            line_height: parent.line_height,
            list_style_type: parent.list_style_type,
            list_style_position: parent.list_style_position,
            list_style_image: parent.list_style_image.clone(),
            border_spacing: parent.border_spacing,
            ..Self::default()
        }
    }

    /// Like [`anonymous_from`](Self::anonymous_from) with an explicit display.
    #[must_use]
    pub fn anonymous_with_display(parent: &Self, display: Display) -> Self {
        Self {
            display,
            ..Self::anonymous_from(parent)
        }
    }

    /// [§ 10.8.1](https://www.w3.org/TR/CSS2/visudet.html#leading)
    ///
    /// Used line height in pixels; `normal` is 1.2 times the font size.
    #[must_use]
    pub fn line_height_px(&self) -> f32 {
        const NORMAL_LINE_HEIGHT: f32 = 1.2;
        match self.line_height {
            LineHeight::Normal => self.font_size * NORMAL_LINE_HEIGHT,
            LineHeight::Number(n) => self.font_size * n,
            LineHeight::Px(px) => px,
        }
    }

    /// True when `content` would generate a box.
    #[must_use]
    pub fn has_content(&self) -> bool {
        self.content.as_ref().is_some_and(|items| !items.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_display_keywords_round_trip_through_strum() {
        assert_eq!(Display::from_str("inline-block"), Ok(Display::InlineBlock));
        assert_eq!(Display::TableRowGroup.to_string(), "table-row-group");
        assert!(Display::from_str("marquee").is_err());
    }

    #[test]
    fn test_root_blockification() {
        assert_eq!(Display::Inline.blockified(), Display::Block);
        assert_eq!(Display::InlineTable.blockified(), Display::Table);
        assert_eq!(Display::ListItem.blockified(), Display::ListItem);
    }

    #[test]
    fn test_anonymous_style_inherits_text_properties_only() {
        let mut parent = ComputedStyle::with_display(Display::Block);
        parent.white_space = WhiteSpace::Pre;
        parent.font_size = 20.0;
        parent.margin = Sides::all(LengthPercentageOrAuto::Px(8.0));
        parent.width = LengthPercentageOrAuto::Px(100.0);

        let anon = ComputedStyle::anonymous_from(&parent);
        assert_eq!(anon.white_space, WhiteSpace::Pre);
        assert_eq!(anon.font_size, 20.0);
        assert_eq!(anon.margin.top, LengthPercentageOrAuto::ZERO);
        assert_eq!(anon.width, LengthPercentageOrAuto::Auto);
        assert_eq!(anon.display, Display::Inline);
    }

    #[test]
    fn test_line_height_px() {
        let mut style = ComputedStyle {
            font_size: 10.0,
            ..ComputedStyle::default()
        };
        assert!((style.line_height_px() - 12.0).abs() < 1e-4);
        style.line_height = LineHeight::Number(2.0);
        assert_eq!(style.line_height_px(), 20.0);
        style.line_height = LineHeight::Px(7.0);
        assert_eq!(style.line_height_px(), 7.0);
    }

    #[test]
    fn test_style_deserializes_with_css_names() {
        let json = r#"{
            "display": "list-item",
            "margin": {"left": "auto", "top": {"percent": 10}},
            "white-space": "pre-wrap",
            "page-break-before": "right",
            "content": [{"text": "Page "}, "page-counter"]
        }"#;
        let style: ComputedStyle = serde_json::from_str(json).expect("valid style");
        assert_eq!(style.display, Display::ListItem);
        assert_eq!(style.margin.left, LengthPercentageOrAuto::Auto);
        assert_eq!(style.margin.top, LengthPercentageOrAuto::Percent(10.0));
        // Sides missing from the object keep the initial margin.
        assert_eq!(style.margin.right, LengthPercentageOrAuto::ZERO);
        assert_eq!(style.white_space, WhiteSpace::PreWrap);
        assert_eq!(style.page_break_before, PageBreak::Right);
        assert!(style.has_content());
    }
}
