//! Replaced content intrinsics.
//!
//! [§ 3 Intrinsic dimensions](https://www.w3.org/TR/CSS2/conform.html#replaced-element)
//!
//! "An element whose content is outside the scope of the CSS formatting
//! model, such as an image..." Layout never decodes images; it asks a
//! [`ReplacedResolver`] for the intrinsic dimensions behind a URL.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// [§ 5.1 Intrinsic dimensions](https://www.w3.org/TR/css-images-3/#intrinsic-dimensions)
///
/// "The term intrinsic dimensions refers to the set of the intrinsic
/// height, intrinsic width, and intrinsic aspect ratio." Each may be absent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Intrinsics {
    /// Intrinsic width in pixels.
    pub width: Option<f32>,
    /// Intrinsic height in pixels.
    pub height: Option<f32>,
    /// Intrinsic width / height ratio.
    pub ratio: Option<f32>,
}

impl Intrinsics {
    /// Intrinsics of a raster image: both sizes and the ratio they imply.
    #[must_use]
    pub fn from_size(width: f32, height: f32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            ratio: (height > 0.0).then(|| width / height),
        }
    }

    /// The ratio, derived from both sizes when not given explicitly.
    #[must_use]
    pub fn effective_ratio(&self) -> Option<f32> {
        self.ratio.or_else(|| match (self.width, self.height) {
            (Some(w), Some(h)) if h > 0.0 => Some(w / h),
            _ => None,
        })
    }
}

/// Resolves a replaced-content URL to its intrinsics; `None` when the
/// resource is unavailable.
pub trait ReplacedResolver {
    /// Look up the intrinsic dimensions of the resource at `url`.
    fn resolve(&self, url: &str) -> Option<Intrinsics>;
}

/// Map-backed [`ReplacedResolver`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageTable {
    images: HashMap<String, Intrinsics>,
}

impl ImageTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the intrinsics of `url`.
    pub fn insert(&mut self, url: &str, intrinsics: Intrinsics) {
        let _ = self.images.insert(url.to_string(), intrinsics);
    }
}

impl ReplacedResolver for ImageTable {
    fn resolve(&self, url: &str) -> Option<Intrinsics> {
        self.images.get(url).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_ratio() {
        assert_eq!(Intrinsics::from_size(200.0, 100.0).effective_ratio(), Some(2.0));
        let only_width = Intrinsics {
            width: Some(10.0),
            ..Intrinsics::default()
        };
        assert_eq!(only_width.effective_ratio(), None);
    }

    #[test]
    fn test_image_table_lookup() {
        let mut table = ImageTable::new();
        table.insert("logo.png", Intrinsics::from_size(40.0, 20.0));
        assert_eq!(
            table.resolve("logo.png").and_then(|i| i.width),
            Some(40.0)
        );
        assert!(table.resolve("missing.png").is_none());
    }
}
