//! Page-margin boxes.
//!
//! [§ 5 Page-Margin Boxes](https://www.w3.org/TR/css-page-3/#margin-boxes)
//!
//! "The margin area of a page box is divided into 16 page-margin boxes."
//!
//! Each page edge holds three collinear boxes, called A, B and C here in
//! reading order (e.g. `@top-left`, `@top-center`, `@top-right`). Their
//! sizes along the edge satisfy
//!
//! ```text
//! outer(A) + outer(B) + outer(C) == edge length
//! ```
//!
//! with B centered whenever A and C can be made equally wide. Which closed
//! form applies depends on which boxes have an `auto` inner size and which
//! have an `auto` margin; [`MarginBoxSolver`] is the decision table over the
//! 64 combinations, checked for completeness when it is built.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display as StrumDisplay, EnumIter, EnumString};

use super::PageType;
use crate::config::LayoutContext;
use crate::error::{LayoutError, Result};
use crate::layout::block::block_container_layout;
use crate::layout::percentages::used_values;
use crate::layout::preferred::content_widths;
use crate::layout::{
    AutoEdgeSizes, AutoOr, AxisSizes, BoxKind, ContainingBlock, LayoutBox, Rect, UsedValues,
    solve_axis,
};
use crate::style::{ComputedStyle, ContentItem, PseudoElement, StyleTarget};

/// Tolerance for "the sizes add up".
const EPSILON: f32 = 1e-3;

/// [§ 5.1 Page-Margin Box Definitions](https://www.w3.org/TR/css-page-3/#margin-box-definitions)
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    StrumDisplay,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum MarginArea {
    /// `@top-left-corner`
    TopLeftCorner,
    /// `@top-left`
    TopLeft,
    /// `@top-center`
    TopCenter,
    /// `@top-right`
    TopRight,
    /// `@top-right-corner`
    TopRightCorner,
    /// `@right-top`
    RightTop,
    /// `@right-middle`
    RightMiddle,
    /// `@right-bottom`
    RightBottom,
    /// `@bottom-right-corner`
    BottomRightCorner,
    /// `@bottom-right`
    BottomRight,
    /// `@bottom-center`
    BottomCenter,
    /// `@bottom-left`
    BottomLeft,
    /// `@bottom-left-corner`
    BottomLeftCorner,
    /// `@left-bottom`
    LeftBottom,
    /// `@left-middle`
    LeftMiddle,
    /// `@left-top`
    LeftTop,
}

impl MarginArea {
    /// True for the four corner boxes.
    #[must_use]
    pub const fn is_corner(self) -> bool {
        matches!(
            self,
            Self::TopLeftCorner
                | Self::TopRightCorner
                | Self::BottomRightCorner
                | Self::BottomLeftCorner
        )
    }

    /// True for the B box of each edge.
    #[must_use]
    pub const fn is_center(self) -> bool {
        matches!(
            self,
            Self::TopCenter | Self::RightMiddle | Self::BottomCenter | Self::LeftMiddle
        )
    }

    /// Painting order: edge A/C boxes first, then corners, then the
    /// centers last.
    #[must_use]
    pub const fn painting_rank(self) -> u8 {
        if self.is_center() {
            2
        } else if self.is_corner() {
            1
        } else {
            0
        }
    }

    /// All 16 areas in painting order.
    #[must_use]
    pub fn painting_order() -> Vec<Self> {
        let mut areas: Vec<Self> = Self::iter().collect();
        areas.sort_by_key(|area| area.painting_rank());
        areas
    }
}

/// One side of the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum PageEdge {
    /// Along the top margin, left to right.
    Top,
    /// Along the right margin, top to bottom.
    Right,
    /// Along the bottom margin, left to right.
    Bottom,
    /// Along the left margin, top to bottom.
    Left,
}

impl PageEdge {
    /// The A, B and C boxes of this edge.
    #[must_use]
    pub const fn areas(self) -> [MarginArea; 3] {
        match self {
            Self::Top => [MarginArea::TopLeft, MarginArea::TopCenter, MarginArea::TopRight],
            Self::Right => [
                MarginArea::RightTop,
                MarginArea::RightMiddle,
                MarginArea::RightBottom,
            ],
            Self::Bottom => [
                MarginArea::BottomLeft,
                MarginArea::BottomCenter,
                MarginArea::BottomRight,
            ],
            Self::Left => [MarginArea::LeftTop, MarginArea::LeftMiddle, MarginArea::LeftBottom],
        }
    }

    /// Whether the boxes of this edge are laid side by side horizontally.
    #[must_use]
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Self::Top | Self::Bottom)
    }
}

/// Which boxes have `auto` values: bit 1 is A, bit 2 is B, bit 4 is C.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SolverKey {
    /// Boxes whose inner size is `auto`.
    pub auto_inner: u8,
    /// Boxes with at least one `auto` margin along the edge.
    pub auto_margin: u8,
}

impl SolverKey {
    /// Bit of box A.
    pub const A: u8 = 1;
    /// Bit of box B.
    pub const B: u8 = 2;
    /// Bit of box C.
    pub const C: u8 = 4;

    /// Every one of the 64 combinations.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..8u8).flat_map(|auto_inner| {
            (0..8u8).map(move |auto_margin| Self {
                auto_inner,
                auto_margin,
            })
        })
    }

    /// The key describing `boxes`.
    #[must_use]
    pub fn of(boxes: &[EdgeBox; 3]) -> Self {
        let bits = [Self::A, Self::B, Self::C];
        let mut key = Self {
            auto_inner: 0,
            auto_margin: 0,
        };
        for (edge_box, bit) in boxes.iter().zip(bits) {
            if edge_box.inner.is_auto() {
                key.auto_inner |= bit;
            }
            if edge_box.has_auto_margin() {
                key.auto_margin |= bit;
            }
        }
        key
    }

    const fn any_auto(self, bit: u8) -> bool {
        (self.auto_inner | self.auto_margin) & bit != 0
    }

    /// B and one of its neighbours both want the free space through their
    /// margins; no closed form picks between them.
    const fn needs_relaxation(self) -> bool {
        self.auto_margin & Self::B != 0 && self.auto_margin & (Self::A | Self::C) != 0
    }

    /// (A has autos, B has autos, C has autos) for keys with a closed form.
    fn family(self) -> Option<(bool, bool, bool)> {
        (!self.needs_relaxation()).then(|| {
            (
                self.any_auto(Self::A),
                self.any_auto(Self::B),
                self.any_auto(Self::C),
            )
        })
    }
}

impl fmt::Display for SolverKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letters = |mask: u8| -> String {
            [(Self::A, 'A'), (Self::B, 'B'), (Self::C, 'C')]
                .iter()
                .map(|&(bit, letter)| if mask & bit == 0 { '-' } else { letter })
                .collect()
        };
        write!(
            f,
            "auto inner [{}] auto margin [{}]",
            letters(self.auto_inner),
            letters(self.auto_margin)
        )
    }
}

/// One margin box along an edge, in that edge's axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeBox {
    /// Margin before the box.
    pub margin_start: AutoOr,
    /// Inner (content) size.
    pub inner: AutoOr,
    /// Margin after the box.
    pub margin_end: AutoOr,
    /// Padding plus border along the axis.
    pub padding_border: f32,
    /// Min-content inner size.
    pub min_content: f32,
    /// Max-content inner size.
    pub max_content: f32,
}

impl EdgeBox {
    /// A box that is not generated: everything zero.
    pub const ABSENT: Self = Self {
        margin_start: AutoOr::Length(0.0),
        inner: AutoOr::Length(0.0),
        margin_end: AutoOr::Length(0.0),
        padding_border: 0.0,
        min_content: 0.0,
        max_content: 0.0,
    };

    /// True when either margin is `auto`.
    #[must_use]
    pub const fn has_auto_margin(&self) -> bool {
        self.margin_start.is_auto() || self.margin_end.is_auto()
    }

    fn fixed_margins(&self) -> f32 {
        self.margin_start.to_px_or(0.0) + self.margin_end.to_px_or(0.0)
    }

    /// Outer size with every `auto` taken as zero.
    fn fixed(&self) -> AxisSizes {
        AxisSizes {
            margin_start: self.margin_start.to_px_or(0.0),
            size: self.inner.to_px_or(0.0),
            margin_end: self.margin_end.to_px_or(0.0),
        }
    }

    fn outer_with(&self, content: f32) -> f32 {
        self.inner.to_px_or(content) + self.padding_border + self.fixed_margins()
    }

    /// Outer size at the min-content inner size.
    fn min_outer(&self) -> f32 {
        self.outer_with(self.min_content)
    }

    /// Outer size at the max-content inner size.
    fn max_outer(&self) -> f32 {
        self.outer_with(self.max_content)
    }

    /// Distribute `target` outer size over this box's `auto` values.
    ///
    /// An `auto` inner size takes the room, shrink-to-fit when `auto`
    /// margins compete for it; `auto` margins split what is left. `None`
    /// when the target cannot be met without a negative size.
    fn absorb(&self, target: f32) -> Option<AxisSizes> {
        let room = target - self.padding_border - self.fixed_margins();
        let auto_margins = u8::from(self.margin_start.is_auto()) + u8::from(self.margin_end.is_auto());

        let (size, slack) = match self.inner {
            AutoOr::Auto if room < -EPSILON => return None,
            AutoOr::Auto if auto_margins == 0 => (room.max(0.0), 0.0),
            AutoOr::Auto => {
                let size = room.max(0.0).min(self.max_content);
                (size, room.max(0.0) - size)
            }
            AutoOr::Length(size) => (size, room - size),
        };
        if auto_margins == 0 && slack.abs() > EPSILON {
            return None;
        }
        if slack < -EPSILON {
            return None;
        }

        let share = if auto_margins == 0 {
            0.0
        } else {
            slack / f32::from(auto_margins)
        };
        Some(AxisSizes {
            margin_start: self.margin_start.length().unwrap_or(share),
            size,
            margin_end: self.margin_end.length().unwrap_or(share),
        })
    }

    fn drop_auto_margins(&mut self) {
        self.margin_start = AutoOr::Length(self.margin_start.to_px_or(0.0));
        self.margin_end = AutoOr::Length(self.margin_end.to_px_or(0.0));
    }
}

type SolverFn = fn(&[EdgeBox; 3], f32) -> Option<[AxisSizes; 3]>;

#[derive(Clone, Copy)]
enum Entry {
    Solve(SolverFn),
    Relax,
}

fn outer(edge_box: &EdgeBox, sizes: &AxisSizes) -> f32 {
    sizes.outer(edge_box.padding_border)
}

// ===== Closed forms =====
//
// Each receives [A, B, C] and the edge length. Sizes returned always
// satisfy outer(A) + outer(B) + outer(C) == length.

/// Nothing is `auto`: over-constrained, C's end margin gives.
fn solve_all_fixed(boxes: &[EdgeBox; 3], length: f32) -> Option<[AxisSizes; 3]> {
    let [a, b, mut c] = boxes.map(|edge_box| edge_box.fixed());
    let used = outer(&boxes[0], &a) + outer(&boxes[1], &b) + outer(&boxes[2], &c);
    c.margin_end += length - used;
    Some([a, b, c])
}

/// A and C are fixed; B takes the rest.
fn solve_center_absorbs(boxes: &[EdgeBox; 3], length: f32) -> Option<[AxisSizes; 3]> {
    let (a, c) = (boxes[0].fixed(), boxes[2].fixed());
    let rest = length - outer(&boxes[0], &a) - outer(&boxes[2], &c);
    Some([a, boxes[1].absorb(rest)?, c])
}

/// One side box is flexible, B is fixed: the flexible side takes the rest.
///
/// B stays where the sum puts it and is not centered; the symmetric
/// `2 * outer(A|C)` form of [`solve_side_mirrors`] needs a flexible B.
fn solve_side_absorbs(boxes: &[EdgeBox; 3], length: f32, flexible: usize) -> Option<[AxisSizes; 3]> {
    let other = 2 - flexible;
    let mut sizes = boxes.map(|edge_box| edge_box.fixed());
    let rest = length - outer(&boxes[1], &sizes[1]) - outer(&boxes[other], &sizes[other]);
    sizes[flexible] = boxes[flexible].absorb(rest)?;
    Some(sizes)
}

fn solve_start_absorbs(boxes: &[EdgeBox; 3], length: f32) -> Option<[AxisSizes; 3]> {
    solve_side_absorbs(boxes, length, 0)
}

fn solve_end_absorbs(boxes: &[EdgeBox; 3], length: f32) -> Option<[AxisSizes; 3]> {
    solve_side_absorbs(boxes, length, 2)
}

/// One side box is flexible and so is B: the flexible side mirrors the
/// fixed one, keeping B centered, and B takes the rest.
fn solve_side_mirrors(boxes: &[EdgeBox; 3], length: f32, flexible: usize) -> Option<[AxisSizes; 3]> {
    let fixed = 2 - flexible;
    let mut sizes = [AxisSizes::default(); 3];
    sizes[fixed] = boxes[fixed].fixed();
    let side = outer(&boxes[fixed], &sizes[fixed]);
    sizes[flexible] = boxes[flexible].absorb(side)?;
    sizes[1] = boxes[1].absorb(length - 2.0 * side)?;
    Some(sizes)
}

fn solve_start_mirrors(boxes: &[EdgeBox; 3], length: f32) -> Option<[AxisSizes; 3]> {
    solve_side_mirrors(boxes, length, 0)
}

fn solve_end_mirrors(boxes: &[EdgeBox; 3], length: f32) -> Option<[AxisSizes; 3]> {
    solve_side_mirrors(boxes, length, 2)
}

/// Both side boxes are flexible and B is fixed: they split the rest.
fn solve_sides_split(boxes: &[EdgeBox; 3], length: f32) -> Option<[AxisSizes; 3]> {
    let b = boxes[1].fixed();
    let side = (length - outer(&boxes[1], &b)) / 2.0;
    Some([boxes[0].absorb(side)?, b, boxes[2].absorb(side)?])
}

/// Everything is flexible.
///
/// [§ 5.3.2 Margin Box Variable Dimension Computation Rules](https://www.w3.org/TR/css-page-3/#variable-auto-sizing)
///
/// B shrinks to leave the side boxes their max-content size, but never
/// below its own min-content size; A and C split what remains.
fn solve_all_flexible(boxes: &[EdgeBox; 3], length: f32) -> Option<[AxisSizes; 3]> {
    let side_preferred = boxes[0].max_outer().max(boxes[2].max_outer());
    let center = boxes[1]
        .max_outer()
        .min(length - 2.0 * side_preferred)
        .max(boxes[1].min_outer());
    let side = (length - center) / 2.0;
    Some([
        boxes[0].absorb(side)?,
        boxes[1].absorb(center)?,
        boxes[2].absorb(side)?,
    ])
}

/// The closed form for each (A flexible, B flexible, C flexible) family.
const FAMILIES: [((bool, bool, bool), SolverFn); 8] = [
    ((false, false, false), solve_all_fixed),
    ((false, true, false), solve_center_absorbs),
    ((true, false, false), solve_start_absorbs),
    ((false, false, true), solve_end_absorbs),
    ((true, true, false), solve_start_mirrors),
    ((false, true, true), solve_end_mirrors),
    ((true, false, true), solve_sides_split),
    ((true, true, true), solve_all_flexible),
];

/// The sizes chosen for the three boxes of an edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeSolution {
    /// Sizes of A, B and C.
    pub sizes: [AxisSizes; 3],
    /// Offset of each box's margin edge from the start of the edge.
    pub offsets: [f32; 3],
    /// How many `auto` margin requirements were dropped.
    pub relaxations: usize,
    /// No closed form applied; `auto` margins became zero and B was
    /// centered without the sum constraint.
    pub degraded: bool,
}

/// The decision table over every [`SolverKey`].
pub struct MarginBoxSolver {
    table: HashMap<SolverKey, Entry>,
}

impl fmt::Debug for MarginBoxSolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarginBoxSolver")
            .field("entries", &self.table.len())
            .finish()
    }
}

impl MarginBoxSolver {
    /// Build the table and check that each of the 64 keys has exactly one
    /// entry.
    ///
    /// # Errors
    /// [`LayoutError::DuplicateSolver`] or [`LayoutError::IncompleteSolver`]
    /// when the registrations overlap or leave a key out.
    pub fn new() -> Result<Self> {
        let mut solver = Self {
            table: HashMap::new(),
        };
        for key in SolverKey::all().filter(|key| key.needs_relaxation()) {
            solver.register(key, Entry::Relax)?;
        }
        for (family, solve) in FAMILIES {
            for key in SolverKey::all().filter(|key| key.family() == Some(family)) {
                solver.register(key, Entry::Solve(solve))?;
            }
        }
        solver.verify()?;
        Ok(solver)
    }

    fn register(&mut self, key: SolverKey, entry: Entry) -> Result<()> {
        if self.table.insert(key, entry).is_some() {
            return Err(LayoutError::DuplicateSolver(key));
        }
        Ok(())
    }

    fn verify(&self) -> Result<()> {
        match SolverKey::all().find(|key| !self.table.contains_key(key)) {
            Some(missing) => Err(LayoutError::IncompleteSolver(missing)),
            None => Ok(()),
        }
    }

    /// Number of keys with a closed-form solution.
    #[must_use]
    pub fn closed_form_count(&self) -> usize {
        self.table
            .values()
            .filter(|entry| matches!(entry, Entry::Solve(_)))
            .count()
    }

    /// Size the three boxes of an edge of `length`.
    ///
    /// Unsatisfiable combinations drop one `auto` margin requirement at a
    /// time, B first, then A, then C. When nothing is left to drop, the
    /// edge degrades: `auto` margins are zero and B is centered.
    #[must_use]
    pub fn solve(&self, boxes: [EdgeBox; 3], length: f32) -> EdgeSolution {
        let mut boxes = boxes;
        let mut relaxations = 0;
        loop {
            let key = SolverKey::of(&boxes);
            let solved = match self.table.get(&key) {
                Some(Entry::Solve(solve)) => solve(&boxes, length),
                Some(Entry::Relax) | None => None,
            };
            if let Some(sizes) = solved {
                let a = outer(&boxes[0], &sizes[0]);
                let c = outer(&boxes[2], &sizes[2]);
                return EdgeSolution {
                    sizes,
                    offsets: [0.0, a, length - c],
                    relaxations,
                    degraded: false,
                };
            }

            let Some(index) = [1, 0, 2]
                .into_iter()
                .find(|&index| boxes[index].has_auto_margin())
            else {
                break;
            };
            log::debug!("margin boxes: no solution for {key}, dropping auto margins of box {index}");
            boxes[index].drop_auto_margins();
            relaxations += 1;
        }

        log::debug!("margin boxes: degrading edge of length {length}");
        Self::degrade(&boxes, length, relaxations)
    }

    fn degrade(boxes: &[EdgeBox; 3], length: f32, relaxations: usize) -> EdgeSolution {
        let mut sizes = boxes.map(|edge_box| AxisSizes {
            size: edge_box.inner.to_px_or(edge_box.max_content),
            ..edge_box.fixed()
        });
        let a = outer(&boxes[0], &sizes[0]);
        let c = outer(&boxes[2], &sizes[2]);
        if boxes[1].inner.is_auto() {
            sizes[1].size = (length - a - c - boxes[1].padding_border - boxes[1].fixed_margins())
                .max(0.0);
        }
        let b = outer(&boxes[1], &sizes[1]);
        EdgeSolution {
            sizes,
            offsets: [0.0, (length - b) / 2.0, length - c],
            relaxations,
            degraded: true,
        }
    }
}

/// The text of `content` on page `index` of `total`.
///
/// [§ 6.3 Page-based counters](https://www.w3.org/TR/css-page-3/#page-based-counters)
///
/// "counter(page)" is the one-based page number, "counter(pages)" the
/// total number of pages.
#[must_use]
pub fn content_text(items: &[ContentItem], index: usize, total: usize) -> String {
    items
        .iter()
        .map(|item| match item {
            ContentItem::Text(text) => text.clone(),
            ContentItem::PageCounter => (index + 1).to_string(),
            ContentItem::PagesCounter => total.to_string(),
        })
        .collect()
}

/// The unpositioned margin box for `area`, when its style generates one.
///
/// [§ 5.2 Page-Margin Box Generation](https://www.w3.org/TR/css-page-3/#margin-box-generation)
///
/// "A page-margin box is generated if the computed value of its content
/// property is not none."
fn margin_box_template(
    ctx: &LayoutContext<'_>,
    page_type: PageType,
    area: MarginArea,
    total: usize,
) -> Option<LayoutBox> {
    let style = ctx
        .styles
        .style_for(StyleTarget::Page(page_type), Some(PseudoElement::Margin(area)))?;
    let items = style.content.as_ref()?;
    let text = content_text(items, page_type.index, total);

    let inherited = ComputedStyle::anonymous_from(&style);
    let mut children = Vec::new();
    if !text.is_empty() {
        children.push(LayoutBox::anonymous(
            BoxKind::Line,
            inherited.clone(),
            vec![LayoutBox::text(&text, inherited)],
        ));
    }
    Some(LayoutBox {
        children,
        ..LayoutBox::new(BoxKind::MarginBox(area), style, None)
    })
}

/// A margin box laid out in `rect` with solved sizes on both axes.
fn place(
    ctx: &LayoutContext<'_>,
    template: &LayoutBox,
    used: UsedValues,
    horizontal: AxisSizes,
    vertical: AxisSizes,
    origin: (f32, f32),
) -> Result<LayoutBox> {
    let used = UsedValues {
        margin: AutoEdgeSizes {
            top: AutoOr::Length(vertical.margin_start),
            right: AutoOr::Length(horizontal.margin_end),
            bottom: AutoOr::Length(vertical.margin_end),
            left: AutoOr::Length(horizontal.margin_start),
        },
        width: AutoOr::Length(horizontal.size),
        height: AutoOr::Length(vertical.size),
        min_width: 0.0,
        max_width: f32::INFINITY,
        min_height: 0.0,
        max_height: f32::INFINITY,
        ..used
    };
    let cb = ContainingBlock::with_width(origin.0, horizontal.outer(used.horizontal_pb()));
    let outcome =
        block_container_layout(ctx, template, used, origin.1, f32::INFINITY, None, &cb, true)?;
    outcome.new_box.ok_or_else(|| {
        LayoutError::Invariant(format!("margin box {} was not placed", template.describe()))
    })
}

/// Content height of `template` when its content box is `width` wide.
fn content_height(ctx: &LayoutContext<'_>, template: &LayoutBox, used: UsedValues, width: f32) -> Result<f32> {
    let used = UsedValues {
        width: AutoOr::Length(width),
        height: AutoOr::Auto,
        min_height: 0.0,
        max_height: f32::INFINITY,
        ..used
    };
    let cb = ContainingBlock::with_width(0.0, width + used.horizontal_pb());
    let outcome = block_container_layout(ctx, template, used, 0.0, f32::INFINITY, None, &cb, true)?;
    Ok(outcome
        .new_box
        .map_or(0.0, |bx| bx.dimensions.content.height))
}

/// Generate, size and position the margin boxes of `page`, appending them
/// to its children in painting order.
///
/// # Errors
/// Propagates errors from laying out margin-box contents.
pub fn make_margin_boxes(
    ctx: &LayoutContext<'_>,
    solver: &MarginBoxSolver,
    page: &mut LayoutBox,
    total: usize,
) -> Result<()> {
    let BoxKind::Page(page_type) = page.kind else {
        return Ok(());
    };
    let page_rect = page.dimensions.margin_box();
    let margin = page.dimensions.margin;
    let (left, top) = (page_rect.x, page_rect.y);
    let (right, bottom) = (page_rect.right(), page_rect.bottom());

    let mut placed: Vec<LayoutBox> = Vec::new();

    // [§ 5.3.1 Margin Box Sizing](https://www.w3.org/TR/css-page-3/#margin-dimension)
    //
    // Corner boxes fill the square where two page margins meet.
    let corners = [
        (MarginArea::TopLeftCorner, Rect { x: left, y: top, width: margin.left, height: margin.top }),
        (
            MarginArea::TopRightCorner,
            Rect { x: right - margin.right, y: top, width: margin.right, height: margin.top },
        ),
        (
            MarginArea::BottomRightCorner,
            Rect {
                x: right - margin.right,
                y: bottom - margin.bottom,
                width: margin.right,
                height: margin.bottom,
            },
        ),
        (
            MarginArea::BottomLeftCorner,
            Rect { x: left, y: bottom - margin.bottom, width: margin.left, height: margin.bottom },
        ),
    ];
    for (area, rect) in corners {
        let Some(template) = margin_box_template(ctx, page_type, area, total) else {
            continue;
        };
        let cb = ContainingBlock {
            x: rect.x,
            width: rect.width,
            height: Some(rect.height),
        };
        let used = used_values(&template.style, false, &cb);
        let horizontal = solve_axis(
            rect.width,
            used.margin.left,
            used.horizontal_pb(),
            used.width,
            used.margin.right,
        );
        let vertical = solve_axis(
            rect.height,
            used.margin.top,
            used.vertical_pb(),
            used.height,
            used.margin.bottom,
        );
        placed.push(place(ctx, &template, used, horizontal, vertical, (rect.x, rect.y))?);
    }

    for edge in <PageEdge as IntoEnumIterator>::iter() {
        let (origin_x, origin_y, length, depth) = match edge {
            PageEdge::Top => (left + margin.left, top, page_rect.width - margin.horizontal(), margin.top),
            PageEdge::Bottom => (
                left + margin.left,
                bottom - margin.bottom,
                page_rect.width - margin.horizontal(),
                margin.bottom,
            ),
            PageEdge::Left => (left, top + margin.top, page_rect.height - margin.vertical(), margin.left),
            PageEdge::Right => (
                right - margin.right,
                top + margin.top,
                page_rect.height - margin.vertical(),
                margin.right,
            ),
        };
        let templates = edge
            .areas()
            .map(|area| margin_box_template(ctx, page_type, area, total));
        if templates.iter().all(Option::is_none) {
            continue;
        }

        // [§ 5.3.2](https://www.w3.org/TR/css-page-3/#margin-dimension)
        //
        // Percentages refer to the page margin area the edge's boxes share.
        let cb = if edge.is_horizontal() {
            ContainingBlock { x: origin_x, width: length, height: Some(depth) }
        } else {
            ContainingBlock { x: origin_x, width: depth, height: Some(length) }
        };

        let mut inputs = [EdgeBox::ABSENT; 3];
        let mut cross = [AxisSizes::default(); 3];
        let mut used_all = [UsedValues::default(); 3];
        for (index, template) in templates.iter().enumerate() {
            let Some(template) = template else { continue };
            let used = used_values(&template.style, false, &cb);
            used_all[index] = used;
            if edge.is_horizontal() {
                let preferred = content_widths(ctx, template);
                inputs[index] = EdgeBox {
                    margin_start: used.margin.left,
                    inner: used.width,
                    margin_end: used.margin.right,
                    padding_border: used.horizontal_pb(),
                    min_content: preferred.min,
                    max_content: preferred.max,
                };
                cross[index] = solve_axis(
                    depth,
                    used.margin.top,
                    used.vertical_pb(),
                    used.height,
                    used.margin.bottom,
                );
            } else {
                cross[index] = solve_axis(
                    depth,
                    used.margin.left,
                    used.horizontal_pb(),
                    used.width,
                    used.margin.right,
                );
                let height = content_height(ctx, template, used, cross[index].size.max(0.0))?;
                inputs[index] = EdgeBox {
                    margin_start: used.margin.top,
                    inner: used.height,
                    margin_end: used.margin.bottom,
                    padding_border: used.vertical_pb(),
                    min_content: height,
                    max_content: height,
                };
            }
        }

        let solution = solver.solve(inputs, length);
        for (index, template) in templates.iter().enumerate() {
            let Some(template) = template else { continue };
            let along = solution.sizes[index];
            let offset = solution.offsets[index];
            let bx = if edge.is_horizontal() {
                place(ctx, template, used_all[index], along, cross[index], (origin_x + offset, origin_y))?
            } else {
                place(ctx, template, used_all[index], cross[index], along, (origin_x, origin_y + offset))?
            };
            placed.push(bx);
        }
    }

    placed.sort_by_key(|bx| match bx.kind {
        BoxKind::MarginBox(area) => (area.painting_rank(), area),
        _ => (u8::MAX, MarginArea::TopLeftCorner),
    });
    page.children.extend(placed);
    Ok(())
}
