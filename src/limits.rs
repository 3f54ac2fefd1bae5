//! Limits for schema matching
//!
//! Recursion depth equals the combined nesting depth of schema and input.
//! Schemas are finite by construction, and owned input trees cannot be
//! cyclic, so no limit is needed for termination. A depth limit is still
//! useful to bound stack usage when validating untrusted, deeply nested
//! input.

use serde::{Deserialize, Serialize};

/// Limits configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Limits {
    /// Maximum container nesting depth (None = unlimited)
    #[serde(default)]
    pub max_depth: Option<usize>,
}

impl Limits {
    /// Create a new Limits with default values (unlimited)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create strict limits for untrusted input
    pub fn strict() -> Self {
        Self {
            max_depth: Some(64),
        }
    }

    /// Set the maximum nesting depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Check if a nesting depth is within limits
    pub fn allows_depth(&self, depth: usize) -> bool {
        self.max_depth.map_or(true, |max| depth <= max)
    }
}
