//! Diagnostics and the error tree
//!
//! Every failure found while matching is recorded as a [`Problem`]. Problems
//! are collected in an [`ErrorTree`] that mirrors the nesting of the schema:
//! per-key message lists, nested trees for container failures, and a list of
//! section-level problems that do not belong to a single key.

use crate::value::{Key, Value, ValueType};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;
use std::fmt;
use std::ops::Index;
use thiserror::Error;

/// Key names listed in group diagnostics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyList(pub Vec<Key>);

impl fmt::Display for KeyList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.0.iter().map(Key::repr).collect();
        write!(f, "[{}]", names.join(", "))
    }
}

/// A single validation diagnostic.
///
/// The `Display` output is the user-facing message.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Problem {
    /// A required key is absent
    #[error("Missing {0}")]
    MissingKey(Key),

    /// None of the alternatives of an `Or` group is present
    #[error("Missing any of {0}")]
    MissingAnyOf(KeyList),

    /// None of the alternatives of an `XOr` group validated
    #[error("Missing one of {0}")]
    MissingOneOf(KeyList),

    /// More than one alternative of an `XOr` group validated
    #[error("Only one of {0} permitted")]
    TooManyOf(KeyList),

    /// An input key no schema entry accounts for
    #[error("Unexpected key {0}")]
    UnexpectedKey(Key),

    /// Runtime type differs from the required type
    #[error("{value} must be of type {expected}")]
    TypeMismatch {
        /// The rejected value
        value: Value,
        /// The required type
        expected: ValueType,
    },

    /// Value differs from the literal in the schema
    #[error("{} should equal {}", .value.repr(), .expected.repr())]
    LiteralMismatch {
        /// The rejected value
        value: Value,
        /// The literal from the schema
        expected: Value,
    },

    /// Predicate returned false
    #[error("{name} did not match {value}")]
    PredicateRejected {
        /// Predicate name
        name: String,
        /// The rejected value
        value: Value,
    },

    /// Predicate reported an error
    #[error("{0}")]
    PredicateRaised(String),

    /// Transform reported an error
    #[error("{0}")]
    TransformRaised(String),

    /// No branch of an `Or` node matched
    #[error("{value} is not valid for any of {alternatives}")]
    NoMatch {
        /// The rejected value
        value: Value,
        /// Description of the alternatives
        alternatives: String,
    },

    /// Message supplied through `Msg`
    #[error("{0}")]
    Custom(String),

    /// A key name failed a key filter
    #[error("Key {} rejected: {}", .key.repr(), .reason)]
    RejectedKey {
        /// The rejected key
        key: Key,
        /// Messages produced by the filter
        reason: String,
    },

    /// Nesting deeper than the configured limit
    #[error("Maximum nesting depth {0} exceeded")]
    DepthExceeded(usize),

    /// A group key whose reference is not a mapping of alternatives
    #[error("Group key requires a mapping of alternatives")]
    MalformedGroup,
}

impl Serialize for Problem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Accumulated diagnostics for one level of validation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ErrorTree {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    section_errors: Vec<Problem>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    fields: IndexMap<Key, Vec<Problem>>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    nested: IndexMap<Key, ErrorTree>,
}

impl ErrorTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the message list for a key, creating it if absent
    pub fn entry(&mut self, key: impl Into<Key>) -> &mut Vec<Problem> {
        self.fields.entry(key.into()).or_default()
    }

    /// Append a problem under a key
    pub fn push(&mut self, key: impl Into<Key>, problem: Problem) {
        self.entry(key).push(problem);
    }

    /// Get the problems recorded for a key (empty if none)
    pub fn get(&self, key: impl Into<Key>) -> &[Problem] {
        self.problems_for(&key.into())
    }

    fn problems_for(&self, key: &Key) -> &[Problem] {
        self.fields.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Get the nested tree recorded for a container key
    pub fn nested(&self, key: impl Into<Key>) -> Option<&ErrorTree> {
        self.nested.get(&key.into())
    }

    /// Attach a nested tree under a key, merging with any tree already there
    pub fn attach(&mut self, key: impl Into<Key>, tree: ErrorTree) {
        match self.nested.entry(key.into()) {
            indexmap::map::Entry::Occupied(mut existing) => existing.get_mut().merge(tree),
            indexmap::map::Entry::Vacant(slot) => {
                slot.insert(tree);
            }
        }
    }

    /// Get the section-level problems
    pub fn section_errors(&self) -> &[Problem] {
        &self.section_errors
    }

    /// Append a section-level problem
    pub fn push_section(&mut self, problem: Problem) {
        self.section_errors.push(problem);
    }

    /// Iterate over keys with at least one problem
    pub fn fields(&self) -> impl Iterator<Item = (&Key, &[Problem])> {
        self.fields
            .iter()
            .filter(|(_, problems)| !problems.is_empty())
            .map(|(k, problems)| (k, problems.as_slice()))
    }

    /// Iterate over non-empty nested trees
    pub fn nested_trees(&self) -> impl Iterator<Item = (&Key, &ErrorTree)> {
        self.nested.iter().filter(|(_, tree)| !tree.is_empty())
    }

    /// Check whether a key has problems or a non-empty nested tree
    pub fn contains(&self, key: impl Into<Key>) -> bool {
        let key = key.into();
        !self.problems_for(&key).is_empty()
            || self.nested.get(&key).map_or(false, |tree| !tree.is_empty())
    }

    /// Check whether nothing was recorded at this level or below.
    ///
    /// Message lists created through [`entry`](Self::entry) but never
    /// appended to do not count.
    pub fn is_empty(&self) -> bool {
        self.section_errors.is_empty()
            && self.fields.values().all(Vec::is_empty)
            && self.nested.values().all(ErrorTree::is_empty)
    }

    /// Total number of problems at this level and below
    pub fn problem_count(&self) -> usize {
        self.section_errors.len()
            + self.fields.values().map(Vec::len).sum::<usize>()
            + self.nested.values().map(ErrorTree::problem_count).sum::<usize>()
    }

    /// Merge another tree into this one
    pub fn merge(&mut self, other: ErrorTree) {
        self.section_errors.extend(other.section_errors);
        for (key, problems) in other.fields {
            self.entry(key).extend(problems);
        }
        for (key, tree) in other.nested {
            self.attach(key, tree);
        }
    }

    /// Convert to JSON with messages rendered as strings
    pub fn to_json(&self) -> JsonValue {
        serde_json::to_value(self).unwrap_or_default()
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let pad = "  ".repeat(indent);
        for problem in &self.section_errors {
            writeln!(f, "{}{}", pad, problem)?;
        }
        for (key, problems) in self.fields() {
            let messages: Vec<String> = problems.iter().map(ToString::to_string).collect();
            writeln!(f, "{}{}: {}", pad, key, messages.join("; "))?;
        }
        for (key, tree) in self.nested_trees() {
            writeln!(f, "{}{}:", pad, key)?;
            tree.fmt_indented(f, indent + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for ErrorTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}

impl Index<&Key> for ErrorTree {
    type Output = [Problem];

    fn index(&self, key: &Key) -> &[Problem] {
        self.problems_for(key)
    }
}

impl Index<&str> for ErrorTree {
    type Output = [Problem];

    fn index(&self, key: &str) -> &[Problem] {
        self.problems_for(&Key::from(key))
    }
}
