//! Shared document builder for the integration tests.
//!
//! Every test document uses a monospace measurer whose glyphs are exactly
//! `font-size` pixels wide, so widths in assertions are character counts
//! times the font size.

#![allow(dead_code)]

use quire_dom::{DomTree, ElementData, NodeId};
use quire_layout::style::{LengthPercentage, LengthPercentageOrAuto, PseudoElement, Sides};
use quire_layout::{
    ComputedStyle, Display, ImageTable, LayoutBox, LayoutConfig, LayoutContext, MonospaceMeasurer,
    PageRule, StyleMap, build_formatting_structure, layout_document,
};

/// A document under construction.
pub struct Doc {
    pub tree: DomTree,
    pub styles: StyleMap,
    pub images: ImageTable,
    pub config: LayoutConfig,
    pub measurer: MonospaceMeasurer,
}

impl Doc {
    /// An empty document on 200x100 pages with 10px margins.
    pub fn new() -> Self {
        Self {
            tree: DomTree::new(),
            styles: StyleMap::new(),
            images: ImageTable::new(),
            config: LayoutConfig {
                page_width: 200.0,
                page_height: 100.0,
                page_margin: 10.0,
                max_pages: 200,
                ..LayoutConfig::default()
            },
            measurer: MonospaceMeasurer::new(1.0),
        }
    }

    /// Append an element under `parent` (use [`NodeId::ROOT`] for the
    /// document element).
    pub fn element(&mut self, parent: NodeId, tag: &str, style: ComputedStyle) -> NodeId {
        self.element_with_attrs(parent, tag, &[], style)
    }

    /// Append an element with attributes.
    pub fn element_with_attrs(
        &mut self,
        parent: NodeId,
        tag: &str,
        attrs: &[(&str, &str)],
        style: ComputedStyle,
    ) -> NodeId {
        let mut data = ElementData::new(tag);
        for (name, value) in attrs {
            let _ = data.attrs.insert((*name).to_string(), (*value).to_string());
        }
        let id = self.tree.append_element(parent, data);
        self.styles.set(id, style);
        id
    }

    /// Append a text node.
    pub fn text(&mut self, parent: NodeId, text: &str) {
        let _ = self.tree.append_text(parent, text);
    }

    pub fn pseudo(&mut self, element: NodeId, pseudo: PseudoElement, style: ComputedStyle) {
        self.styles.set_pseudo(element, pseudo, style);
    }

    pub fn page_rule(&mut self, rule: PageRule) {
        self.styles.add_page_rule(rule);
    }

    pub fn ctx(&self) -> LayoutContext<'_> {
        LayoutContext {
            tree: &self.tree,
            styles: &self.styles,
            measurer: &self.measurer,
            replaced: &self.images,
            config: &self.config,
        }
    }

    /// The normalized box tree.
    pub fn build(&self) -> LayoutBox {
        build_formatting_structure(&self.ctx()).expect("document should build")
    }

    /// The laid-out pages.
    pub fn pages(&self) -> Vec<LayoutBox> {
        layout_document(&self.ctx()).expect("document should lay out")
    }
}

/// A style with `display` and a font size of 10px.
pub fn styled(display: Display) -> ComputedStyle {
    ComputedStyle {
        font_size: 10.0,
        ..ComputedStyle::with_display(display)
    }
}

pub fn block() -> ComputedStyle {
    styled(Display::Block)
}

pub fn inline() -> ComputedStyle {
    styled(Display::Inline)
}

/// A block with a fixed pixel height.
pub fn block_of_height(height: f32) -> ComputedStyle {
    ComputedStyle {
        height: LengthPercentageOrAuto::Px(height),
        ..block()
    }
}

pub fn px(value: f32) -> LengthPercentageOrAuto {
    LengthPercentageOrAuto::Px(value)
}

pub fn margins(value: f32) -> Sides<LengthPercentageOrAuto> {
    Sides::all(px(value))
}

pub fn paddings(value: f32) -> Sides<LengthPercentage> {
    Sides::all(LengthPercentage::Px(value))
}

/// The root fragment placed on `page`, if any.
pub fn fragment(page: &LayoutBox) -> Option<&LayoutBox> {
    page.children
        .iter()
        .find(|child| !matches!(child.kind, quire_layout::BoxKind::MarginBox(_)))
}

/// Text of each line box under `bx`, in order.
pub fn line_texts(bx: &LayoutBox) -> Vec<String> {
    bx.descendants()
        .filter(|descendant| descendant.is_line())
        .map(LayoutBox::text_content)
        .collect()
}
