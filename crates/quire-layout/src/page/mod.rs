//! Pagination.
//!
//! [CSS Paged Media Module Level 3](https://www.w3.org/TR/css-page-3/)
//!
//! "A page box is a rectangular region that contains two areas: the page
//! area ... and the margin area."
//!
//! The driver lays the normalized root box out once per page, threading the
//! resume cursor returned by block layout into the next call, until the
//! whole tree has been consumed. Margin boxes are generated afterwards,
//! when the total page count is known.

pub mod margin_boxes;

use serde::{Deserialize, Serialize};
use strum_macros::Display as StrumDisplay;

pub use margin_boxes::{
    EdgeBox, EdgeSolution, MarginArea, MarginBoxSolver, PageEdge, SolverKey, make_margin_boxes,
};

use crate::config::LayoutContext;
use crate::error::{LayoutError, Result};
use crate::layout::block::block_level_layout;
use crate::layout::percentages::resolve_percentages;
use crate::layout::{BoxDimensions, BoxKind, ContainingBlock, EdgeSizes, LayoutBox, Rect, ResumeCursor};
use crate::style::{
    ComputedStyle, Display, LengthPercentageOrAuto, PageBreak, PageSize, Sides, StyleTarget,
};

/// [§ 4.3.2 Spread pseudo-classes](https://www.w3.org/TR/css-page-3/#spread-pseudos)
///
/// "All pages are automatically classified by user agents into either the
/// :left or :right pseudo-class."
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, StrumDisplay,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PageSide {
    /// A left (verso) page.
    Left,
    /// A right (recto) page.
    Right,
}

/// Everything page selectors can match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PageType {
    /// Left or right page.
    pub side: PageSide,
    /// [§ 4.3.4 :blank](https://www.w3.org/TR/css-page-3/#blank-pseudo)
    ///
    /// "The :blank pseudo-class matches pages that have no content from the
    /// document flow."
    pub blank: bool,
    /// "The :first pseudo-class matches the first page of the document."
    pub first: bool,
    /// Zero-based page index.
    pub index: usize,
}

impl PageType {
    /// The type of the first page.
    #[must_use]
    pub const fn first() -> Self {
        Self::for_index(0, PageBreak::Auto)
    }

    /// The type of page `index`, given the side hint left by the previous
    /// page's forced break.
    ///
    /// "In a left-to-right document, the first page is a :right page."
    /// Sides alternate after that. A page whose side contradicts the hint is
    /// left blank so the content lands on the requested side.
    #[must_use]
    pub const fn for_index(index: usize, hint: PageBreak) -> Self {
        let side = if index % 2 == 0 {
            PageSide::Right
        } else {
            PageSide::Left
        };
        let blank = matches!(
            (hint, side),
            (PageBreak::Left, PageSide::Right) | (PageBreak::Right, PageSide::Left)
        );
        Self {
            side,
            blank,
            first: index == 0,
            index,
        }
    }
}

/// The page style used when no `@page` rule applies.
fn default_page_style(margin: f32) -> ComputedStyle {
    ComputedStyle {
        margin: Sides::all(LengthPercentageOrAuto::Px(margin)),
        ..ComputedStyle::with_display(Display::Block)
    }
}

/// [§ 3 Page Boxes](https://www.w3.org/TR/css-page-3/#page-box-page-rule)
///
/// Build an empty page box: size from `size`, page area inside the page
/// margins, border and padding.
#[must_use]
pub fn make_page(ctx: &LayoutContext<'_>, page_type: PageType) -> LayoutBox {
    let style = ctx
        .styles
        .style_for(StyleTarget::Page(page_type), None)
        .unwrap_or_else(|| default_page_style(ctx.config.page_margin));
    let size = style.size.unwrap_or(PageSize {
        width: ctx.config.page_width,
        height: ctx.config.page_height,
    });

    let mut page = LayoutBox::new(BoxKind::Page(page_type), style, None);
    resolve_percentages(
        &mut page,
        &ContainingBlock {
            x: 0.0,
            width: size.width,
            height: Some(size.height),
        },
    );

    let used = page.used;
    let margin = EdgeSizes {
        top: used.margin.top.to_px_or(0.0),
        right: used.margin.right.to_px_or(0.0),
        bottom: used.margin.bottom.to_px_or(0.0),
        left: used.margin.left.to_px_or(0.0),
    };
    let (border, padding) = (used.border, used.padding);
    page.dimensions = BoxDimensions {
        content: Rect {
            x: margin.left + border.left + padding.left,
            y: margin.top + border.top + padding.top,
            width: (size.width - margin.horizontal() - border.horizontal() - padding.horizontal())
                .max(0.0),
            height: (size.height - margin.vertical() - border.vertical() - padding.vertical())
                .max(0.0),
        },
        padding,
        border,
        margin,
    };
    page
}

/// Counts consecutive pages that consumed no content.
///
/// The escape valve places over-tall content on an empty page and line
/// layout rejects lines that consume nothing, so no known input trips this
/// guard; it bounds the page loop if a layout routine ever stops advancing.
#[derive(Debug)]
struct ProgressGuard {
    stalled: usize,
    limit: usize,
}

impl ProgressGuard {
    const fn new(limit: usize) -> Self {
        Self { stalled: 0, limit }
    }

    /// Record whether page `index` advanced the resume cursor.
    fn record(&mut self, index: usize, progressed: bool) -> Result<()> {
        if progressed {
            self.stalled = 0;
            return Ok(());
        }
        self.stalled += 1;
        log::warn!("page {index}: no content consumed ({} in a row)", self.stalled);
        if self.stalled >= self.limit {
            return Err(LayoutError::Stalled { page: index });
        }
        Ok(())
    }
}

/// Lay `root` out into as many pages as it needs.
///
/// Returns the page boxes in order. Each page's children are the root
/// fragment placed on it (absent on blank pages), followed by its margin
/// boxes in painting order.
///
/// # Errors
/// [`LayoutError::TooManyPages`] when the document needs more than
/// `max_pages` pages, [`LayoutError::Stalled`] when `max_stalled_pages`
/// consecutive pages consumed no content, and any error raised by layout.
pub fn paginate(ctx: &LayoutContext<'_>, root: &LayoutBox) -> Result<Vec<LayoutBox>> {
    let solver = MarginBoxSolver::new()?;
    let mut pages: Vec<LayoutBox> = Vec::new();
    let mut resume: Option<ResumeCursor> = None;
    let mut hint = PageBreak::Auto;
    let mut guard = ProgressGuard::new(ctx.config.max_stalled_pages);

    loop {
        let index = pages.len();
        if index >= ctx.config.max_pages {
            return Err(LayoutError::TooManyPages {
                limit: ctx.config.max_pages,
            });
        }

        let page_type = PageType::for_index(index, hint);
        let mut page = make_page(ctx, page_type);
        if page_type.blank {
            log::debug!("page {index}: blank page inserted for a {hint:?} break");
            pages.push(page);
            hint = PageBreak::Auto;
            continue;
        }

        let area = page.dimensions.content;
        let cb = ContainingBlock {
            x: area.x,
            width: area.width,
            height: Some(area.height),
        };
        let outcome = block_level_layout(
            ctx,
            root,
            area.y,
            area.bottom(),
            resume.as_ref(),
            &cb,
            true,
        )?;

        let progressed = outcome.new_box.is_some()
            && (outcome.resume_at.is_none() || outcome.resume_at != resume);
        guard.record(index, progressed)?;

        let fragment_placed = outcome.new_box.is_some();
        if let Some(fragment) = outcome.new_box {
            page.children.push(fragment);
        }
        pages.push(page);

        match outcome.resume_at {
            Some(next) => {
                log::debug!("page {index}: resume at {next}");
                resume = Some(next);
                hint = outcome.next_page.hint();
            }
            None if fragment_placed => break,
            // Nothing placed and nothing left to resume: retry from the
            // same cursor on the next page.
            None => {}
        }
    }

    let total = pages.len();
    log::debug!("paginated into {total} pages");
    for page in &mut pages {
        make_margin_boxes(ctx, &solver, page, total)?;
    }
    Ok(pages)
}
