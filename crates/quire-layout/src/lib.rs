//! Paginated CSS box layout for the quire engine.
//!
//! # Scope
//!
//! This crate implements:
//! - **Formatting structure** ([§ 9.2 Controlling box generation](https://www.w3.org/TR/CSS2/visuren.html#box-gen))
//!   - Box tree construction from an element tree and computed styles
//!   - White space processing, list markers, `::before`/`::after` text
//!   - Anonymous block, line and table boxes
//!
//! - **Layout** ([CSS 2.1 Visual formatting model details](https://www.w3.org/TR/CSS2/visudet.html))
//!   - Percentage resolution against the containing block
//!   - Block layout with margin collapsing between siblings
//!   - Line breaking and baseline alignment
//!   - The fixed table layout algorithm
//!
//! - **Fragmentation** ([CSS Paged Media Level 3](https://www.w3.org/TR/css-page-3/))
//!   - Resumable layout: each page continues where the last one stopped
//!   - Forced and avoided breaks, blank pages for left/right breaks
//!   - The sixteen page-margin boxes with page counters
//!
//! # Not Yet Implemented
//!
//! - Floats, positioning, flex and grid layout
//! - The automatic table layout algorithm (the fixed one is used instead)
//! - Parent/child margin collapsing

/// Layout configuration and the per-run context.
pub mod config;
/// Error types per the error taxonomy of the engine.
pub mod error;
/// Box tree construction per [CSS 2.1 § 9.2](https://www.w3.org/TR/CSS2/visuren.html#box-gen).
pub mod build;
/// Box model and layout algorithms per [CSS 2.1 § 10](https://www.w3.org/TR/CSS2/visudet.html).
pub mod layout;
/// Page boxes and margin boxes per [CSS Paged Media Level 3](https://www.w3.org/TR/css-page-3/).
pub mod page;
/// Replaced content intrinsics per [CSS Images Level 3](https://www.w3.org/TR/css-images-3/).
pub mod replaced;
/// Computed styles and the accessor layout reads them through.
pub mod style;
/// Text measurement per [CSS Text Level 3](https://www.w3.org/TR/css-text-3/).
pub mod text;

// Re-exports for convenience
pub use build::build_formatting_structure;
pub use config::{LayoutConfig, LayoutContext};
pub use error::{LayoutError, Result};
pub use layout::{BoxDimensions, BoxKind, ContainingBlock, EdgeSizes, LayoutBox, Rect, ResumeCursor};
pub use page::{MarginArea, MarginBoxSolver, PageSide, PageType, make_page, paginate};
pub use replaced::{ImageTable, Intrinsics, ReplacedResolver};
pub use style::{ComputedStyle, Display, PageRule, PageSelector, StyleAccessor, StyleMap};
pub use text::{CachedMeasurer, MonospaceMeasurer, TextMeasure, TextMeasurer};

/// Build the box tree of the document in `ctx` and lay it out into pages.
///
/// Unsupported-feature warnings are reported once per run.
///
/// # Errors
/// Any error from [`build_formatting_structure`] or [`paginate`].
pub fn layout_document(ctx: &LayoutContext<'_>) -> Result<Vec<LayoutBox>> {
    quire_common::warning::clear_warnings();
    let root = build_formatting_structure(ctx)?;
    let pages = paginate(ctx, &root)?;
    log::debug!("laid out {} pages", pages.len());
    Ok(pages)
}
