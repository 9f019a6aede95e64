//! The read-only style lookup layout runs against.
//!
//! Selector matching and the cascade happen upstream. Layout only asks
//! "what is the computed style of this element (or page, or pseudo-element)",
//! through [`StyleAccessor`].

use std::collections::HashMap;

use quire_dom::NodeId;
use serde::{Deserialize, Serialize};

use super::ComputedStyle;
use crate::page::{MarginArea, PageSide, PageType};

/// Pseudo-elements layout may ask about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PseudoElement {
    /// [§ 12.1 The :before and :after pseudo-elements](https://www.w3.org/TR/CSS2/generate.html#before-after-content)
    Before,
    /// See [`PseudoElement::Before`].
    After,
    /// [§ 3.1 The ::marker pseudo-element](https://www.w3.org/TR/css-lists-3/#marker-pseudo)
    Marker,
    /// A page-margin box of a page style.
    Margin(MarginArea),
}

/// What a style is looked up for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleTarget {
    /// An element of the input tree.
    Element(NodeId),
    /// A page of the given type.
    Page(PageType),
}

/// `style_for(element_or_page, pseudo) -> ComputedStyle`.
///
/// Every element has a style before layout starts, and the mapping never
/// changes during layout. `None` means "no box": an element missing from the
/// map is an upstream defect, a pseudo-element or margin box missing from it
/// is simply not generated.
pub trait StyleAccessor {
    /// Look up the computed style of `target`, or of its pseudo-element.
    fn style_for(&self, target: StyleTarget, pseudo: Option<PseudoElement>)
    -> Option<ComputedStyle>;
}

/// [§ 4.1 Page selectors](https://www.w3.org/TR/css-page-3/#page-selectors)
///
/// "A page selector ... can also include one or more page pseudo-classes."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSelector {
    /// `:first`
    pub first: bool,
    /// `:blank`
    pub blank: bool,
    /// `:left` or `:right`
    pub side: Option<PageSide>,
}

impl PageSelector {
    /// Whether this selector applies to `page`.
    #[must_use]
    pub fn matches(&self, page: &PageType) -> bool {
        (!self.first || page.first)
            && (!self.blank || page.blank)
            && self.side.is_none_or(|side| side == page.side)
    }

    /// [§ 4.2 Page selectors and cascade](https://www.w3.org/TR/css-page-3/#cascading-and-page-context)
    ///
    /// ":first and :blank count like ID selectors, :left and :right like
    /// class selectors."
    #[must_use]
    pub fn specificity(&self) -> (u8, u8) {
        (
            u8::from(self.first) + u8::from(self.blank),
            u8::from(self.side.is_some()),
        )
    }
}

/// One `@page` rule: the page style and the margin boxes it declares.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PageRule {
    /// Which pages the rule applies to.
    pub selector: PageSelector,
    /// The page box style.
    pub style: ComputedStyle,
    /// Margin-box styles declared inside the rule.
    pub margin_boxes: HashMap<MarginArea, ComputedStyle>,
}

/// In-memory [`StyleAccessor`] fed by an upstream cascade or by tests.
#[derive(Debug, Clone, Default)]
pub struct StyleMap {
    elements: HashMap<(NodeId, Option<PseudoElement>), ComputedStyle>,
    pages: Vec<PageRule>,
}

impl StyleMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the computed style of an element.
    pub fn set(&mut self, element: NodeId, style: ComputedStyle) {
        let _ = self.elements.insert((element, None), style);
    }

    /// Set the computed style of an element's pseudo-element.
    pub fn set_pseudo(&mut self, element: NodeId, pseudo: PseudoElement, style: ComputedStyle) {
        let _ = self.elements.insert((element, Some(pseudo)), style);
    }

    /// Append an `@page` rule; later rules win specificity ties.
    pub fn add_page_rule(&mut self, rule: PageRule) {
        self.pages.push(rule);
    }

    /// Matching page rules, most specific first.
    fn matching_page_rules(&self, page: &PageType) -> Vec<&PageRule> {
        let mut rules: Vec<(usize, &PageRule)> = self
            .pages
            .iter()
            .enumerate()
            .filter(|(_, rule)| rule.selector.matches(page))
            .collect();
        rules.sort_by(|(ia, a), (ib, b)| {
            (b.selector.specificity(), ib).cmp(&(a.selector.specificity(), ia))
        });
        rules.into_iter().map(|(_, rule)| rule).collect()
    }
}

impl StyleAccessor for StyleMap {
    fn style_for(
        &self,
        target: StyleTarget,
        pseudo: Option<PseudoElement>,
    ) -> Option<ComputedStyle> {
        match target {
            StyleTarget::Element(id) => self.elements.get(&(id, pseudo)).cloned(),
            StyleTarget::Page(page) => {
                let rules = self.matching_page_rules(&page);
                match pseudo {
                    None => rules.first().map(|rule| rule.style.clone()),
                    Some(PseudoElement::Margin(area)) => rules
                        .iter()
                        .find_map(|rule| rule.margin_boxes.get(&area))
                        .cloned(),
                    Some(_) => None,
                }
            }
        }
    }
}
