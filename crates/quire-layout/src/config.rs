//! Per-run configuration and the context threaded through layout.

use quire_dom::DomTree;
use serde::Deserialize;

use crate::error::{LayoutError, Result};
use crate::replaced::ReplacedResolver;
use crate::style::StyleAccessor;
use crate::text::TextMeasurer;

/// Knobs for one rendering run.
///
/// Loaded from JSON with every field optional:
///
/// ```
/// # use quire_layout::LayoutConfig;
/// let config = LayoutConfig::from_json_str(r#"{ "max-pages": 50 }"#).unwrap();
/// assert_eq!(config.max_pages, 50);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LayoutConfig {
    /// Page width when no page style sets `size` (A4 at 96 dpi).
    pub page_width: f32,
    /// Page height when no page style sets `size`.
    pub page_height: f32,
    /// Page margins when no `@page` rule applies.
    pub page_margin: f32,
    /// Hard cap on the number of pages.
    pub max_pages: usize,
    /// Consecutive pages that may consume no content before pagination
    /// gives up.
    pub max_stalled_pages: usize,
    /// [§ 10.3.2](https://www.w3.org/TR/CSS2/visudet.html#inline-replaced-width)
    ///
    /// "Otherwise, if 'width' has a computed value of 'auto', and the element
    /// has an intrinsic width, then that intrinsic width is the used value of
    /// 'width'... Otherwise ... the used value of 'width' becomes 300px."
    pub replaced_default_width: f32,
    /// [§ 10.6.2](https://www.w3.org/TR/CSS2/visudet.html#inline-replaced-height)
    ///
    /// "...the used value of 'height' must be set to the height of the
    /// largest rectangle that has a 2:1 ratio, has a height not greater than
    /// 150px."
    pub replaced_default_height: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page_width: 793.7,
            page_height: 1122.5,
            page_margin: 75.0,
            max_pages: 10_000,
            max_stalled_pages: 16,
            replaced_default_width: 300.0,
            replaced_default_height: 150.0,
        }
    }
}

impl LayoutConfig {
    /// Parse a JSON configuration document.
    ///
    /// # Errors
    /// Returns [`LayoutError::Config`] when the document is not valid JSON
    /// or has fields of the wrong type.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| LayoutError::Config(e.to_string()))
    }
}

/// Everything layout consults besides the boxes themselves.
///
/// Built once per rendering run and passed explicitly into the builder and
/// every layout entry point.
#[derive(Clone, Copy)]
pub struct LayoutContext<'a> {
    /// The input element tree.
    pub tree: &'a DomTree,
    /// Computed style lookup.
    pub styles: &'a dyn StyleAccessor,
    /// Text measurement.
    pub measurer: &'a dyn TextMeasurer,
    /// Replaced content intrinsics.
    pub replaced: &'a dyn ReplacedResolver,
    /// Run configuration.
    pub config: &'a LayoutConfig,
}

impl std::fmt::Debug for LayoutContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutContext")
            .field("nodes", &self.tree.len())
            .field("config", self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config = LayoutConfig::from_json_str(r#"{ "page-width": 400 }"#).unwrap();
        assert_eq!(config.page_width, 400.0);
        assert_eq!(config.page_height, LayoutConfig::default().page_height);
        assert_eq!(config.replaced_default_width, 300.0);
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let err = LayoutConfig::from_json_str(r#"{ "max-pages": "many" }"#).unwrap_err();
        assert!(matches!(err, LayoutError::Config(_)));
    }
}
