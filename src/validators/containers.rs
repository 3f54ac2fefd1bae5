//! Mapping and sequence validators
//!
//! Each call owns a fresh error tree and cleaned container for its level;
//! sibling levels never share them.

use super::validation::UnknownKeys;
use super::Matcher;
use crate::report::{ErrorTree, Problem};
use crate::schema::{Node, Schema};
use crate::value::{Key, Mapping, Value};
use std::collections::HashSet;
use tracing::trace;

/// Result of validating one mapping level
#[derive(Debug, Clone, Default)]
pub struct MappingResult {
    /// Whether every key spec matched and no unexpected key was found
    pub valid: bool,
    /// Entries whose key matcher succeeded
    pub cleaned: Mapping,
    /// Diagnostics for this level
    pub errors: ErrorTree,
    /// Input keys accounted for by some key spec
    pub(crate) claimed: HashSet<Key>,
}

/// Result of validating one sequence level
#[derive(Debug, Clone, Default)]
pub struct SequenceResult {
    /// Whether every element matched an alternative
    pub valid: bool,
    /// Cleaned elements, in input order
    pub cleaned: Vec<Value>,
    /// Per-index diagnostics
    pub errors: ErrorTree,
}

impl<'a> Matcher<'a> {
    /// Validate a mapping against every entry of a schema, in definition order
    pub fn validate_mapping(&mut self, schema: &Schema, input: &Mapping) -> MappingResult {
        let named = schema.named_keys();
        let mut result = MappingResult::default();
        let mut valid = true;

        for (spec, reference) in schema.entries() {
            if !self.match_key(spec, input, reference, &named, &mut result) {
                valid = false;
            }
        }

        if self.context.unknown_keys == UnknownKeys::Strict {
            for key in input.keys() {
                if !result.claimed.contains(key) {
                    trace!(key = %key, "unexpected key");
                    result.errors.push_section(Problem::UnexpectedKey(key.clone()));
                    valid = false;
                }
            }
        }

        result.valid = valid;
        result
    }

    /// Validate each element against the alternatives; the first match wins.
    ///
    /// Diagnostics of every failed alternative are kept under the element's
    /// index only when no alternative matched.
    pub fn validate_sequence(&mut self, alternatives: &[Node], items: &[Value]) -> SequenceResult {
        let mut result = SequenceResult {
            valid: true,
            ..SequenceResult::default()
        };

        for (index, item) in items.iter().enumerate() {
            let mut failures = Vec::new();
            let mut matched = None;

            for node in alternatives {
                let outcome = self.match_value(item, node);
                if outcome.valid {
                    matched = outcome.cleaned;
                    break;
                }
                failures.push(outcome);
            }

            match matched {
                Some(cleaned) => result.cleaned.push(cleaned),
                None => {
                    result.valid = false;
                    let key = Key::from(index);
                    if failures.is_empty() {
                        result.errors.push(
                            key.clone(),
                            Problem::NoMatch {
                                value: item.clone(),
                                alternatives: "[]".to_string(),
                            },
                        );
                    }
                    for outcome in failures {
                        outcome.record(&key, &mut result.errors);
                    }
                }
            }
        }

        result
    }
}
