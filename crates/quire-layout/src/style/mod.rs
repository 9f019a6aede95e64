//! Computed styles and the accessor layout reads them through.

pub mod accessor;
pub mod computed;

pub use accessor::{PageRule, PageSelector, PseudoElement, StyleAccessor, StyleMap, StyleTarget};
pub use computed::{
    BoxSizing, ComputedStyle, ContentItem, Display, LengthPercentage, LengthPercentageOrAuto,
    LineHeight, ListStylePosition, ListStyleType, PageBreak, PageSize, Sides, TableLayoutMode,
    TextAlign, WhiteSpace, WordBreak,
};
