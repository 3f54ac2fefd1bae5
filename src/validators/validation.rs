//! Validation configuration
//!
//! [`ValidationContext`] carries the options of a form and the nesting level
//! of the walk in progress. Each validation run starts from a fresh copy, so
//! no state survives between runs.

use crate::error::{Error, Result};
use crate::limits::Limits;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Handling of input keys that no schema entry accounts for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownKeys {
    /// Report each as an unexpected key and fail the mapping
    #[default]
    Strict,
    /// Drop them from the cleaned output without a diagnostic
    Ignore,
}

impl UnknownKeys {
    /// Get the policy as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            UnknownKeys::Strict => "strict",
            UnknownKeys::Ignore => "ignore",
        }
    }
}

impl FromStr for UnknownKeys {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "strict" => Ok(UnknownKeys::Strict),
            "ignore" => Ok(UnknownKeys::Ignore),
            _ => Err(Error::Config(format!(
                "Invalid unknown-keys policy: '{}'. Must be 'strict' or 'ignore'",
                s
            ))),
        }
    }
}

impl fmt::Display for UnknownKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Options and walk state for one validation run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationContext {
    /// Policy for keys not claimed by any schema entry
    #[serde(default)]
    pub unknown_keys: UnknownKeys,
    /// Keep the accepted part of a failed nested container in the cleaned output
    #[serde(default)]
    pub partial_containers: bool,
    /// Resource limits
    #[serde(default)]
    pub limits: Limits,
    /// Current container nesting level
    #[serde(skip)]
    pub level: usize,
}

impl ValidationContext {
    /// Create a context with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the unknown-keys policy
    pub fn with_unknown_keys(mut self, policy: UnknownKeys) -> Self {
        self.unknown_keys = policy;
        self
    }

    /// Keep partial cleaned output of failed nested containers
    pub fn with_partial_containers(mut self) -> Self {
        self.partial_containers = true;
        self
    }

    /// Set the limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Set maximum depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.limits = self.limits.with_max_depth(depth);
        self
    }

    /// Check whether descending one more level would exceed the depth limit
    pub fn is_max_depth_exceeded(&self) -> bool {
        !self.limits.allows_depth(self.level + 1)
    }

    /// Enter a new level
    pub fn enter_level(&mut self) {
        self.level += 1;
    }

    /// Exit current level
    pub fn exit_level(&mut self) {
        if self.level > 0 {
            self.level -= 1;
        }
    }

    /// Copy of the options with the walk state reset
    pub fn fresh(&self) -> Self {
        Self {
            level: 0,
            ..self.clone()
        }
    }
}
