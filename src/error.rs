//! Construction-time error type for the B-tree and B+-tree engines
//! (Section 7, "Invalid order").

use std::fmt;

/// Returned by `BTree::try_new`/`BPlusTree::try_new` when the requested
/// order is below the structural minimum of 3.
///
/// `BTree::new`/`BPlusTree::new` panic on the same condition instead;
/// `try_new` exists for callers that accept an externally-supplied order
/// (for example, from a config file) and cannot tolerate a panic on bad
/// input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidOrder {
    pub order: usize,
}

impl fmt::Display for InvalidOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid order {}: order must be at least 3",
            self.order
        )
    }
}

impl std::error::Error for InvalidOrder {}
