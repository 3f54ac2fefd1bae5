//! Schema matching engine
//!
//! A [`Matcher`] walks schema and input together. The value matcher
//! (`values`), key matcher (`keys`) and the mapping/sequence validators
//! (`containers`) are mutually recursive methods on the same type. The
//! root input travels with the matcher so that conditional keys can
//! resolve paths against the whole tree.

mod containers;
mod keys;
mod validation;
mod values;

pub use containers::{MappingResult, SequenceResult};
pub use validation::{UnknownKeys, ValidationContext};

use crate::report::{ErrorTree, Problem};
use crate::value::{Key, Value};

/// Result of matching one value against one node
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// Whether the value matched
    pub valid: bool,
    /// Cleaned value (present when valid, or a partial container when enabled)
    pub cleaned: Option<Value>,
    /// Messages for the key the value belongs to
    pub messages: Vec<Problem>,
    /// Diagnostics of a failed nested container
    pub nested: Option<ErrorTree>,
}

impl Outcome {
    /// A successful match
    pub fn accept(cleaned: Value) -> Self {
        Self {
            valid: true,
            cleaned: Some(cleaned),
            messages: Vec::new(),
            nested: None,
        }
    }

    /// A failed match with a single message
    pub fn reject(problem: Problem) -> Self {
        Self {
            valid: false,
            cleaned: None,
            messages: vec![problem],
            nested: None,
        }
    }

    /// Record the diagnostics under `key` and hand back the cleaned value
    pub(crate) fn record(self, key: &Key, errors: &mut ErrorTree) -> Option<Value> {
        if !self.messages.is_empty() {
            errors.entry(key.clone()).extend(self.messages);
        }
        if let Some(tree) = self.nested {
            errors.attach(key.clone(), tree);
        }
        self.cleaned
    }
}

/// Walks a schema and an input tree together
#[derive(Debug)]
pub struct Matcher<'a> {
    root: &'a Value,
    context: ValidationContext,
}

impl<'a> Matcher<'a> {
    /// Create a matcher over a root input
    pub fn new(root: &'a Value, context: &ValidationContext) -> Self {
        Self {
            root,
            context: context.fresh(),
        }
    }

    /// The root input that conditional keys resolve against
    pub fn root(&self) -> &'a Value {
        self.root
    }

    /// The options in effect
    pub fn context(&self) -> &ValidationContext {
        &self.context
    }
}
