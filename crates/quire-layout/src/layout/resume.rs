//! Resume cursors: where a previous layout pass stopped.
//!
//! A cursor is a path of child indices. At each level `index` names the
//! child to continue from and `child` says where inside that child to
//! continue; `None` means "from the start of it". For a text box the index
//! is a byte offset into its text.
//!
//! Cursors are values threaded between the page driver and the block,
//! inline and table layouts. Nothing stores them.

use std::fmt;

/// An ordered path of (child index, nested cursor or absent).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResumeCursor {
    /// Child index (byte offset for text boxes).
    pub index: usize,
    /// Where to continue inside that child.
    pub child: Option<Box<ResumeCursor>>,
}

impl ResumeCursor {
    /// Continue from the start of child `index`.
    #[must_use]
    pub const fn at(index: usize) -> Self {
        Self { index, child: None }
    }

    /// Continue inside child `index` at `child`.
    #[must_use]
    pub fn nested(index: usize, child: Self) -> Self {
        Self {
            index,
            child: Some(Box::new(child)),
        }
    }

    /// Continue inside child `index` at an optional position.
    #[must_use]
    pub fn with_child(index: usize, child: Option<Self>) -> Self {
        Self {
            index,
            child: child.map(Box::new),
        }
    }

    /// The nested cursor, borrowed.
    #[must_use]
    pub fn child(&self) -> Option<&Self> {
        self.child.as_deref()
    }

    /// Number of levels in the path.
    #[must_use]
    pub fn depth(&self) -> usize {
        1 + self.child().map_or(0, Self::depth)
    }
}

/// Split an optional cursor into (start index, cursor for that child).
#[must_use]
pub fn split_cursor(resume: Option<&ResumeCursor>) -> (usize, Option<&ResumeCursor>) {
    resume.map_or((0, None), |r| (r.index, r.child()))
}

impl fmt::Display for ResumeCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index)?;
        if let Some(child) = self.child() {
            write!(f, "/{child}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_depth() {
        let cursor = ResumeCursor::nested(2, ResumeCursor::nested(0, ResumeCursor::at(17)));
        assert_eq!(cursor.to_string(), "2/0/17");
        assert_eq!(cursor.depth(), 3);
    }

    #[test]
    fn test_split_cursor() {
        assert_eq!(split_cursor(None), (0, None));
        let cursor = ResumeCursor::nested(4, ResumeCursor::at(1));
        let (index, child) = split_cursor(Some(&cursor));
        assert_eq!(index, 4);
        assert_eq!(child, Some(&ResumeCursor::at(1)));
    }
}
