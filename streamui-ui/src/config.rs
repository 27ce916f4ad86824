//! Interpreter limits.

use serde::{Deserialize, Serialize};

/// Default maximum nesting depth of a specification tree.
pub const DEFAULT_MAX_DEPTH: usize = 12;

/// Largest usable depth. A node at depth `d` sits at JSON nesting
/// `2d + 1`, and decoders prune JSON deeper than 100 levels, so deeper
/// nodes could arrive already replaced by `null`.
pub const MAX_SUPPORTED_DEPTH: usize = 48;

/// Default maximum number of children (or list items, or table rows) kept
/// per node.
pub const DEFAULT_MAX_CHILDREN: usize = 100;

/// Resource bounds applied while interpreting a specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterpreterConfig {
    /// Nodes deeper than this are replaced by a truncation marker. The root
    /// is at depth 0.
    pub max_depth: usize,
    /// Children beyond this count are dropped.
    pub max_children: usize,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_children: DEFAULT_MAX_CHILDREN,
        }
    }
}

impl InterpreterConfig {
    /// Create the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum depth, clamped to `1..=MAX_SUPPORTED_DEPTH`.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.clamp(1, MAX_SUPPORTED_DEPTH);
        self
    }

    /// Depth at which parsing stops, whatever `max_depth` was set to.
    #[must_use]
    pub fn depth_limit(&self) -> usize {
        self.max_depth.clamp(1, MAX_SUPPORTED_DEPTH)
    }

    /// Set the maximum number of children per node.
    #[must_use]
    pub fn with_max_children(mut self, max_children: usize) -> Self {
        self.max_children = max_children;
        self
    }
}
