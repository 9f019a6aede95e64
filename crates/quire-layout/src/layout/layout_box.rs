//! The box entity and its structural invariants.
//!
//! [§ 9.2 Controlling box generation](https://www.w3.org/TR/CSS2/visuren.html#box-gen)
//!
//! "The following sections describe the types of boxes that may be generated
//! in CSS 2.1. A box's type affects, in part, its behavior in the visual
//! formatting model."
//!
//! Box types are one tagged union, [`BoxKind`], with a small capability set
//! on [`LayoutBox`]. Layout never mutates a box it was given: every page and
//! every line is a new box, so the normalized tree can be laid out again for
//! the next page without aliasing.

use quire_dom::NodeId;
use serde::Serialize;

use super::box_model::BoxDimensions;
use super::values::UsedValues;
use crate::error::{LayoutError, Result};
use crate::page::{MarginArea, PageType};
use crate::replaced::Intrinsics;
use crate::style::ComputedStyle;

/// Column structure of a table box.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TableInfo {
    /// `display: inline-table`
    pub inline: bool,
    /// [§ 17.2 The CSS table model](https://www.w3.org/TR/CSS2/tables.html#table-display)
    ///
    /// Column groups are kept apart from the row groups: "column boxes
    /// ... do not generate boxes in the normal flow".
    pub column_groups: Vec<LayoutBox>,
    /// Used column widths, filled by table layout.
    pub column_widths: Vec<f32>,
    /// Left edge of each column, filled by table layout.
    pub column_positions: Vec<f32>,
}

/// [§ 9.2 Controlling box generation](https://www.w3.org/TR/CSS2/visuren.html#box-gen)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum BoxKind {
    /// A block container that is block-level (`block`, `list-item`, or an
    /// anonymous block box).
    Block,
    /// [§ 9.2.4](https://www.w3.org/TR/CSS2/visuren.html#display-prop)
    ///
    /// "This value causes an element to generate an inline-level block
    /// container."
    InlineBlock,
    /// [§ 9.2.2 Inline-level elements and inline boxes](https://www.w3.org/TR/CSS2/visuren.html#inline-boxes)
    Inline,
    /// [§ 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
    ///
    /// "The rectangular area that contains the boxes that form a line is
    /// called a line box." Always anonymous.
    Line,
    /// [§ 9.2.2.1 Anonymous inline boxes](https://www.w3.org/TR/CSS2/visuren.html#anonymous)
    ///
    /// A run of text. Always anonymous, always a leaf.
    Text(String),
    /// A table box; `display: table` or `inline-table`.
    Table(TableInfo),
    /// `table-row-group`, `table-header-group`, `table-footer-group`.
    TableRowGroup,
    /// `table-row`
    TableRow,
    /// `table-cell`, a block container.
    TableCell {
        /// Columns spanned.
        colspan: usize,
        /// Rows spanned.
        rowspan: usize,
    },
    /// `table-column-group`
    TableColumnGroup {
        /// Columns spanned when the group has no column children.
        span: usize,
    },
    /// `table-column`
    TableColumn {
        /// Columns spanned.
        span: usize,
    },
    /// [§ 10.3.2 Inline, replaced elements](https://www.w3.org/TR/CSS2/visudet.html#inline-replaced-width)
    ///
    /// Content outside the formatting model; children are never generated.
    Replaced {
        /// Intrinsic dimensions of the content.
        intrinsics: Intrinsics,
        /// Block-level (`display: block`) rather than inline-level.
        block_level: bool,
    },
    /// A page box; its children are the root fragment then the margin boxes.
    Page(PageType),
    /// A page-margin box.
    MarginBox(MarginArea),
}

/// A node of the box tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutBox {
    /// Box type.
    pub kind: BoxKind,
    /// This box's own style snapshot.
    pub style: ComputedStyle,
    /// The generating element, for lookup only.
    pub element: Option<NodeId>,
    /// Generated to preserve structural invariants, not by an element.
    pub anonymous: bool,
    /// In-flow children, in document order.
    pub children: Vec<LayoutBox>,
    /// [§ 12.5 Lists](https://www.w3.org/TR/CSS2/generate.html#lists)
    ///
    /// The marker of an `outside` list item, laid out beside the principal
    /// box instead of inside it.
    pub outside_marker: Option<Box<LayoutBox>>,
    /// Used values, written by the percentage resolver.
    #[serde(skip)]
    pub used: UsedValues,
    /// Positioned geometry, written by layout.
    pub dimensions: BoxDimensions,
    /// Distance from the top of the margin box to the baseline, for boxes
    /// taking part in an inline formatting context.
    pub baseline: Option<f32>,
}

impl LayoutBox {
    /// A box generated by `element`.
    #[must_use]
    pub fn new(kind: BoxKind, style: ComputedStyle, element: Option<NodeId>) -> Self {
        Self {
            kind,
            style,
            element,
            anonymous: false,
            children: Vec::new(),
            outside_marker: None,
            used: UsedValues::default(),
            dimensions: BoxDimensions::default(),
            baseline: None,
        }
    }

    /// An anonymous box with `children`.
    #[must_use]
    pub fn anonymous(kind: BoxKind, style: ComputedStyle, children: Vec<Self>) -> Self {
        Self {
            anonymous: true,
            children,
            ..Self::new(kind, style, None)
        }
    }

    /// An anonymous text box.
    #[must_use]
    pub fn text(content: &str, style: ComputedStyle) -> Self {
        Self::anonymous(BoxKind::Text(content.to_string()), style, Vec::new())
    }

    /// A copy of this box with no children, the starting point of every
    /// fragment layout produces.
    #[must_use]
    pub fn copy_without_children(&self) -> Self {
        Self {
            kind: self.kind.clone(),
            style: self.style.clone(),
            element: self.element,
            anonymous: self.anonymous,
            children: Vec::new(),
            outside_marker: None,
            used: self.used,
            dimensions: self.dimensions,
            baseline: self.baseline,
        }
    }

    /// A copy of this box with `children` in place of its own.
    #[must_use]
    pub fn copy_with_children(&self, children: Vec<Self>) -> Self {
        Self {
            children,
            ..self.copy_without_children()
        }
    }

    // ===== Capabilities =====

    /// [§ 9.2.1 Block-level elements and block boxes](https://www.w3.org/TR/CSS2/visuren.html#block-boxes)
    ///
    /// "Block-level boxes are boxes that participate in a block formatting
    /// context."
    #[must_use]
    pub const fn is_block_level(&self) -> bool {
        match &self.kind {
            BoxKind::Block => true,
            BoxKind::Table(info) => !info.inline,
            BoxKind::Replaced { block_level, .. } => *block_level,
            _ => false,
        }
    }

    /// [§ 9.2.2](https://www.w3.org/TR/CSS2/visuren.html#inline-boxes)
    ///
    /// "Inline-level boxes are boxes that participate in an inline
    /// formatting context."
    #[must_use]
    pub const fn is_inline_level(&self) -> bool {
        match &self.kind {
            BoxKind::Inline | BoxKind::InlineBlock | BoxKind::Text(_) => true,
            BoxKind::Table(info) => info.inline,
            BoxKind::Replaced { block_level, .. } => !*block_level,
            _ => false,
        }
    }

    /// [§ 9.2.1](https://www.w3.org/TR/CSS2/visuren.html#block-boxes)
    ///
    /// "A block container box either contains only block-level boxes or
    /// establishes an inline formatting context and thus contains only
    /// inline-level boxes."
    #[must_use]
    pub const fn is_block_container(&self) -> bool {
        matches!(
            self.kind,
            BoxKind::Block
                | BoxKind::InlineBlock
                | BoxKind::TableCell { .. }
                | BoxKind::Page(_)
                | BoxKind::MarginBox(_)
        )
    }

    /// [§ 9.2.2](https://www.w3.org/TR/CSS2/visuren.html#inline-boxes)
    ///
    /// "An inline-level box that is not an inline box (such as replaced
    /// inline-level elements, inline-block elements, and inline-table
    /// elements) is called an atomic inline-level box."
    #[must_use]
    pub const fn is_atomic_inline(&self) -> bool {
        match &self.kind {
            BoxKind::InlineBlock => true,
            BoxKind::Table(info) => info.inline,
            BoxKind::Replaced { block_level, .. } => !*block_level,
            _ => false,
        }
    }

    /// Content outside the formatting model.
    #[must_use]
    pub const fn is_replaced(&self) -> bool {
        matches!(self.kind, BoxKind::Replaced { .. })
    }

    /// Generated by the builder, not by an element.
    #[must_use]
    pub const fn is_anonymous(&self) -> bool {
        self.anonymous
    }

    /// Whether this kind of box may hold children.
    #[must_use]
    pub const fn has_children(&self) -> bool {
        !matches!(self.kind, BoxKind::Text(_) | BoxKind::Replaced { .. })
    }

    /// A line box.
    #[must_use]
    pub const fn is_line(&self) -> bool {
        matches!(self.kind, BoxKind::Line)
    }

    /// The text of a text box.
    #[must_use]
    pub fn text_str(&self) -> Option<&str> {
        match &self.kind {
            BoxKind::Text(text) => Some(text),
            _ => None,
        }
    }

    /// All text in this subtree, in document order.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if let Some(marker) = &self.outside_marker {
            marker.collect_text(out);
        }
        if let BoxKind::Text(text) = &self.kind {
            out.push_str(text);
        }
        for child in &self.children {
            child.collect_text(out);
        }
    }

    /// Move this box and its whole subtree.
    ///
    /// [§ 9.4.3 Relative positioning](https://www.w3.org/TR/CSS2/visuren.html#relative-positioning)
    /// uses the same recursive shift; here it serves margin collapsing,
    /// baseline alignment and text alignment.
    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.dimensions.content.x += dx;
        self.dimensions.content.y += dy;
        for child in &mut self.children {
            child.translate(dx, dy);
        }
        if let Some(marker) = &mut self.outside_marker {
            marker.translate(dx, dy);
        }
        if let BoxKind::Table(info) = &mut self.kind {
            for group in &mut info.column_groups {
                group.translate(dx, dy);
            }
            for position in &mut info.column_positions {
                *position += dx;
            }
        }
    }

    /// Depth-first iteration over this box and its descendants.
    pub fn descendants(&self) -> impl Iterator<Item = &Self> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(next.children.iter().rev());
            Some(next)
        })
    }

    /// Short label used in diagnostics.
    #[must_use]
    pub fn describe(&self) -> String {
        let kind = match &self.kind {
            BoxKind::Block => "Block",
            BoxKind::InlineBlock => "InlineBlock",
            BoxKind::Inline => "Inline",
            BoxKind::Line => "Line",
            BoxKind::Text(_) => "Text",
            BoxKind::Table(_) => "Table",
            BoxKind::TableRowGroup => "TableRowGroup",
            BoxKind::TableRow => "TableRow",
            BoxKind::TableCell { .. } => "TableCell",
            BoxKind::TableColumnGroup { .. } => "TableColumnGroup",
            BoxKind::TableColumn { .. } => "TableColumn",
            BoxKind::Replaced { .. } => "Replaced",
            BoxKind::Page(_) => "Page",
            BoxKind::MarginBox(_) => "MarginBox",
        };
        match self.element {
            Some(id) => format!("{kind}({id})"),
            None if self.anonymous => format!("Anonymous{kind}"),
            None => kind.to_string(),
        }
    }
}

/// Check the structural invariants of a normalized box tree.
///
/// 1. A block container's children are either all block-level or a single
///    anonymous line box.
/// 2. A line or inline box's children are all inline-level.
/// 3. Text and replaced boxes are leaves.
///
/// # Errors
/// Returns [`LayoutError::Invariant`] naming the first offending box.
pub fn check_invariants(root: &LayoutBox) -> Result<()> {
    check_box(root, &mut Vec::new())
}

fn check_box(bx: &LayoutBox, path: &mut Vec<String>) -> Result<()> {
    path.push(bx.describe());
    let fail = |path: &[String], what: &str| -> Result<()> {
        Err(LayoutError::Invariant(format!("{}: {what}", path.join(" > "))))
    };

    if !bx.has_children() && !bx.children.is_empty() {
        return fail(path.as_slice(), "leaf box has children");
    }

    if bx.is_block_container() && !bx.children.is_empty() {
        let single_line = bx.children.len() == 1 && bx.children[0].is_line();
        let all_block = bx.children.iter().all(LayoutBox::is_block_level);
        if !single_line && !all_block {
            return fail(
                path.as_slice(),
                "block container mixes block-level and inline-level children",
            );
        }
        if single_line && !bx.children[0].anonymous {
            return fail(path.as_slice(), "line box is not anonymous");
        }
    }

    if matches!(bx.kind, BoxKind::Line | BoxKind::Inline)
        && !bx.children.iter().all(LayoutBox::is_inline_level)
    {
        return fail(path.as_slice(), "inline formatting context holds a non-inline child");
    }

    for child in &bx.children {
        check_box(child, path)?;
    }
    let _ = path.pop();
    Ok(())
}
