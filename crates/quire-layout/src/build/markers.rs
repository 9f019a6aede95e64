//! List markers.
//!
//! [§ 12.5 Lists](https://www.w3.org/TR/CSS2/generate.html#lists)
//!
//! "An element with 'display: list-item' generates a principal block box
//! for the element's content and, depending on the values of
//! 'list-style-type' and 'list-style-image', possibly also a marker box as
//! a visual indication that the element is a list item."

use quire_common::warning::warn_once;
use quire_dom::NodeId;

use crate::config::LayoutContext;
use crate::layout::{BoxKind, LayoutBox};
use crate::style::{ComputedStyle, Display, ListStyleType, PseudoElement, StyleTarget};

/// [§ 12.6.2 'list-style-type'](https://www.w3.org/TR/CSS2/generate.html#propdef-list-style-type)
///
/// The marker string for `ordinal`, suffix included. `None` for
/// `list-style-type: none`.
#[must_use]
pub fn marker_text(list_style: ListStyleType, ordinal: i64) -> Option<String> {
    let text = match list_style {
        ListStyleType::None => return None,
        ListStyleType::Disc => "\u{2022} ".to_string(),
        ListStyleType::Circle => "\u{25e6} ".to_string(),
        ListStyleType::Square => "\u{25aa} ".to_string(),
        ListStyleType::Decimal => format!("{ordinal}. "),
        ListStyleType::LowerAlpha => format!("{}. ", alphabetic(ordinal)),
        ListStyleType::UpperAlpha => format!("{}. ", alphabetic(ordinal).to_uppercase()),
        ListStyleType::LowerRoman => format!("{}. ", roman(ordinal)),
        ListStyleType::UpperRoman => format!("{}. ", roman(ordinal).to_uppercase()),
    };
    Some(text)
}

/// "lower-latin or lower-alpha: Lowercase ascii letters (a, b, c, ... z)."
/// After `z` comes `aa`; ordinals below 1 fall back to decimal.
fn alphabetic(ordinal: i64) -> String {
    if ordinal < 1 {
        return ordinal.to_string();
    }
    let mut n = ordinal;
    let mut letters = Vec::new();
    while n > 0 {
        n -= 1;
        letters.push(b'a' + u8::try_from(n % 26).unwrap_or(0));
        n /= 26;
    }
    letters.iter().rev().map(|&b| char::from(b)).collect()
}

/// "lower-roman: Lowercase roman numerals (i, ii, iii, iv, v, etc.)."
/// Outside 1..=3999 the ordinal falls back to decimal.
fn roman(ordinal: i64) -> String {
    const NUMERALS: [(i64, &str); 13] = [
        (1000, "m"),
        (900, "cm"),
        (500, "d"),
        (400, "cd"),
        (100, "c"),
        (90, "xc"),
        (50, "l"),
        (40, "xl"),
        (10, "x"),
        (9, "ix"),
        (5, "v"),
        (4, "iv"),
        (1, "i"),
    ];
    if !(1..=3999).contains(&ordinal) {
        return ordinal.to_string();
    }
    let mut n = ordinal;
    let mut out = String::new();
    for (value, numeral) in NUMERALS {
        while n >= value {
            out.push_str(numeral);
            n -= value;
        }
    }
    out
}

/// Build the marker box of list item `element`, or `None` when the item
/// has no marker.
///
/// [§ 12.6.2 'list-style-image'](https://www.w3.org/TR/CSS2/generate.html#propdef-list-style-image)
///
/// "This property sets the image that will be used as the list item
/// marker. When the image is available, it will replace the marker set
/// with the 'list-style-type' marker."
#[must_use]
pub fn marker_box(
    ctx: &LayoutContext<'_>,
    element: NodeId,
    item_style: &ComputedStyle,
    ordinal: i64,
) -> Option<LayoutBox> {
    let style = ctx
        .styles
        .style_for(StyleTarget::Element(element), Some(PseudoElement::Marker))
        .unwrap_or_else(|| ComputedStyle::anonymous_with_display(item_style, Display::Inline));

    let mut marker = LayoutBox::new(BoxKind::Inline, style.clone(), Some(element));
    marker.anonymous = true;

    if let Some(url) = &item_style.list_style_image {
        match ctx.replaced.resolve(url) {
            Some(intrinsics) => {
                let image = LayoutBox::new(
                    BoxKind::Replaced {
                        intrinsics,
                        block_level: false,
                    },
                    ComputedStyle::anonymous_from(&style),
                    Some(element),
                );
                marker.children.push(image);
                marker.children.push(LayoutBox::text(" ", ComputedStyle::anonymous_from(&style)));
                return Some(marker);
            }
            None => warn_once(
                "marker",
                "list-style-image could not be resolved; using list-style-type",
            ),
        }
    }

    let text = marker_text(item_style.list_style_type, ordinal)?;
    marker
        .children
        .push(LayoutBox::text(&text, ComputedStyle::anonymous_from(&style)));
    Some(marker)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_strings() {
        assert_eq!(marker_text(ListStyleType::Disc, 1).as_deref(), Some("\u{2022} "));
        assert_eq!(marker_text(ListStyleType::Decimal, 7).as_deref(), Some("7. "));
        assert_eq!(marker_text(ListStyleType::UpperAlpha, 2).as_deref(), Some("B. "));
        assert_eq!(marker_text(ListStyleType::None, 1), None);
    }

    #[test]
    fn test_alphabetic_wraps_after_z() {
        assert_eq!(alphabetic(1), "a");
        assert_eq!(alphabetic(26), "z");
        assert_eq!(alphabetic(27), "aa");
        assert_eq!(alphabetic(0), "0");
    }

    #[test]
    fn test_roman_numerals() {
        assert_eq!(roman(4), "iv");
        assert_eq!(roman(1994), "mcmxciv");
        assert_eq!(roman(4000), "4000");
        assert_eq!(marker_text(ListStyleType::UpperRoman, 9).as_deref(), Some("IX. "));
    }
}
