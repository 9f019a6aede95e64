//! JSON document descriptions.
//!
//! A document is an element tree whose elements carry their computed styles
//! directly, plus `@page` rules and an image table:
//!
//! ```json
//! {
//!   "root": {
//!     "tag": "body",
//!     "style": { "display": "block" },
//!     "children": ["Hello, ", { "tag": "em", "children": ["World"] }]
//!   },
//!   "pages": [{ "selector": { "first": true }, "style": { "margin": { ... } } }],
//!   "images": { "logo.png": { "width": 120, "height": 40 } }
//! }
//! ```

use std::collections::HashMap;

use anyhow::{Context, Result};
use quire_dom::{DomTree, ElementData, NodeId};
use quire_layout::style::PseudoElement;
use quire_layout::{ComputedStyle, ImageTable, PageRule, StyleMap};
use serde::Deserialize;

/// The top-level document description.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DocumentSpec {
    /// The document element.
    pub root: ElementSpec,
    /// `@page` rules, in stylesheet order.
    #[serde(default)]
    pub pages: Vec<PageRule>,
    /// Intrinsic sizes of the images the document refers to.
    #[serde(default)]
    pub images: ImageTable,
}

/// A child node: a bare string is a text node.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum NodeSpec {
    /// A text node.
    Text(String),
    /// An element.
    Element(ElementSpec),
}

/// One element with its computed style.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ElementSpec {
    /// Local name.
    pub tag: String,
    /// Attributes such as `src`, `colspan` or `start`.
    pub attrs: HashMap<String, String>,
    /// Computed style of the element.
    pub style: ComputedStyle,
    /// Style of `::before`.
    pub before: Option<ComputedStyle>,
    /// Style of `::after`.
    pub after: Option<ComputedStyle>,
    /// Style of `::marker`.
    pub marker: Option<ComputedStyle>,
    /// Child nodes in document order.
    pub children: Vec<NodeSpec>,
}

/// A document ready for layout.
#[derive(Debug)]
pub struct LoadedDocument {
    /// The element tree.
    pub tree: DomTree,
    /// Element, pseudo-element and page styles.
    pub styles: StyleMap,
    /// Image intrinsics.
    pub images: ImageTable,
}

impl DocumentSpec {
    /// Parse a document description.
    ///
    /// # Errors
    /// Returns an error when `json` is not a valid document description.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("invalid document description")
    }

    /// Build the element tree and the style map.
    #[must_use]
    pub fn load(self) -> LoadedDocument {
        let mut tree = DomTree::new();
        let mut styles = StyleMap::new();
        add_element(&mut tree, &mut styles, NodeId::ROOT, self.root);
        for rule in self.pages {
            styles.add_page_rule(rule);
        }
        log::debug!("loaded document with {} nodes", tree.len());
        LoadedDocument {
            tree,
            styles,
            images: self.images,
        }
    }
}

fn add_element(tree: &mut DomTree, styles: &mut StyleMap, parent: NodeId, element: ElementSpec) {
    let data = ElementData {
        tag_name: element.tag,
        attrs: element.attrs,
    };
    let id = tree.append_element(parent, data);
    styles.set(id, element.style);

    let pseudos = [
        (PseudoElement::Before, element.before),
        (PseudoElement::After, element.after),
        (PseudoElement::Marker, element.marker),
    ];
    for (pseudo, style) in pseudos {
        if let Some(style) = style {
            styles.set_pseudo(id, pseudo, style);
        }
    }

    for child in element.children {
        match child {
            NodeSpec::Text(text) => {
                let _ = tree.append_text(id, &text);
            }
            NodeSpec::Element(element) => add_element(tree, styles, id, element),
        }
    }
}
