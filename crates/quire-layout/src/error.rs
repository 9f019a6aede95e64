//! Error types for box tree construction and layout.
//!
//! Only defects and unsupported features are errors. A box that does not fit
//! on the current page is reported through the layout outcome instead, and
//! unsatisfiable margin-box constraints are relaxed rather than surfaced.

use quire_dom::NodeId;
use thiserror::Error;

use crate::page::SolverKey;
use crate::style::Display;

/// Result type alias for layout operations.
pub type Result<T> = std::result::Result<T, LayoutError>;

/// Errors raised while building or laying out a box tree.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    /// An element uses a display value this engine does not lay out.
    ///
    /// Fatal for the subtree: the value is never approximated.
    #[error("unsupported display value '{display}' on element {element}")]
    UnsupportedDisplay {
        /// The element carrying the value.
        element: NodeId,
        /// The offending value.
        display: Display,
    },

    /// The style accessor has no computed style for an element.
    #[error("no computed style for element {0}")]
    MissingStyle(NodeId),

    /// A structural invariant of the box tree does not hold.
    #[error("box tree invariant violated: {0}")]
    Invariant(String),

    /// Pagination made no progress for too many consecutive pages.
    #[error("pagination stalled at page {page}: no content was consumed")]
    Stalled {
        /// Index of the page where the guard tripped.
        page: usize,
    },

    /// The document needs more pages than the configured cap.
    #[error("document exceeds the page limit of {limit}")]
    TooManyPages {
        /// The configured `max_pages`.
        limit: usize,
    },

    /// The margin-box dispatch table has no entry for a combination.
    #[error("margin-box dispatch table has no entry for {0}")]
    IncompleteSolver(SolverKey),

    /// The margin-box dispatch table has two entries for a combination.
    #[error("margin-box dispatch table registers {0} twice")]
    DuplicateSolver(SolverKey),

    /// A configuration document could not be read.
    #[error("invalid layout configuration: {0}")]
    Config(String),
}
