//! White space processing.
//!
//! [§ 4.1.1 Phase I: Collapsing and Transformation](https://www.w3.org/TR/css-text-3/#white-space-phase-1)
//!
//! "For each inline (including anonymous inlines; see CSS2.1 § 9.2.2.1)
//! within an inline formatting context, white space characters are
//! processed as follows prior to line breaking and bidi reordering,
//! ignoring bidi formatting characters as if they were not there."
//!
//! One left-to-right pass over the tree carries a single bit: whether the
//! last character emitted was a collapsible space. Spaces at the start of a
//! line are removed later, by line breaking.

use crate::layout::{BoxKind, LayoutBox};
use crate::style::WhiteSpace;

/// Collapse white space in every text box and drop text boxes left empty.
#[must_use]
pub fn process_whitespace(mut root: LayoutBox) -> LayoutBox {
    let mut following_space = true;
    process(&mut root, &mut following_space);
    root
}

fn process(bx: &mut LayoutBox, following_space: &mut bool) {
    if let BoxKind::Text(text) = &mut bx.kind {
        *text = collapse(text, bx.style.white_space, following_space);
        return;
    }

    // Atomic inlines sit inside the surrounding run; their own contents
    // start a fresh one.
    let block_level = bx.is_block_level() || !bx.is_inline_level();
    if block_level {
        *following_space = true;
    }
    let mut inner_state = true;
    let children_state = if bx.is_atomic_inline() {
        &mut inner_state
    } else {
        &mut *following_space
    };

    if let Some(marker) = &mut bx.outside_marker {
        let mut marker_state = true;
        process(marker, &mut marker_state);
    }
    for child in &mut bx.children {
        process(child, children_state);
    }
    bx.children
        .retain(|child| !matches!(&child.kind, BoxKind::Text(text) if text.is_empty()));

    if block_level {
        *following_space = true;
    } else if bx.is_atomic_inline() {
        *following_space = false;
    }
}

/// "1. ... any collapsible segment break immediately following another
/// collapsible space ... is removed. 2. Collapsible segment breaks are
/// transformed for rendering. 3. Every collapsible tab is converted to a
/// collapsible space. 4. Any collapsible space immediately following
/// another collapsible space ... is collapsed to have zero advance width."
fn collapse(text: &str, white_space: WhiteSpace, following_space: &mut bool) -> String {
    if !white_space.collapses_spaces() {
        if !text.is_empty() {
            *following_space = false;
        }
        return text.to_string();
    }

    let keep_newlines = white_space.preserves_newlines();
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        let ch = match ch {
            '\n' if keep_newlines => '\n',
            '\t' | '\n' | '\r' => ' ',
            other => other,
        };
        match ch {
            ' ' => {
                if !*following_space {
                    out.push(' ');
                    *following_space = true;
                }
            }
            // pre-line: spaces around a preserved newline are removed.
            '\n' => {
                while out.ends_with(' ') {
                    let _ = out.pop();
                }
                out.push('\n');
                *following_space = true;
            }
            other => {
                out.push(other);
                *following_space = false;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{ComputedStyle, Display};

    fn styled_text(content: &str, white_space: WhiteSpace) -> LayoutBox {
        let mut style = ComputedStyle::with_display(Display::Inline);
        style.white_space = white_space;
        LayoutBox::text(content, style)
    }

    fn block(children: Vec<LayoutBox>) -> LayoutBox {
        LayoutBox::anonymous(BoxKind::Block, ComputedStyle::with_display(Display::Block), children)
    }

    #[test]
    fn test_runs_collapse_across_boxes() {
        let root = process_whitespace(block(vec![
            styled_text("  a \t\n b ", WhiteSpace::Normal),
            styled_text("  c", WhiteSpace::Normal),
        ]));
        let texts: Vec<&str> = root.children.iter().filter_map(LayoutBox::text_str).collect();
        assert_eq!(texts, vec!["a b ", "c"]);
    }

    #[test]
    fn test_empty_text_is_removed() {
        let root = process_whitespace(block(vec![
            styled_text("   ", WhiteSpace::Normal),
            styled_text("x", WhiteSpace::Normal),
        ]));
        assert_eq!(root.children.len(), 1);
    }

    #[test]
    fn test_space_after_inline_block_survives() {
        let inline_block = LayoutBox::anonymous(
            BoxKind::InlineBlock,
            ComputedStyle::with_display(Display::InlineBlock),
            vec![styled_text(" B ", WhiteSpace::Normal)],
        );
        let root = process_whitespace(block(vec![
            styled_text("a ", WhiteSpace::Normal),
            inline_block,
            styled_text(" c", WhiteSpace::Normal),
        ]));
        assert_eq!(root.children[1].children[0].text_str(), Some("B "));
        assert_eq!(root.children[2].text_str(), Some(" c"));
    }

    #[test]
    fn test_pre_is_untouched() {
        let root = process_whitespace(block(vec![styled_text("  a\n  b", WhiteSpace::Pre)]));
        assert_eq!(root.children[0].text_str(), Some("  a\n  b"));
    }

    #[test]
    fn test_pre_line_keeps_newlines_only() {
        let root = process_whitespace(block(vec![styled_text("a  \n  b\tc", WhiteSpace::PreLine)]));
        assert_eq!(root.children[0].text_str(), Some("a\nb c"));
    }
}
