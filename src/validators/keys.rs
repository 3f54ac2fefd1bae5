//! Key matcher
//!
//! Applies one [`KeySpec`] to an input mapping: decides whether the key is
//! required, delegates its value to the value matcher and records cleaned
//! entries, per-key problems and section-level problems for the level.

use super::containers::MappingResult;
use super::Matcher;
use crate::report::{KeyList, Problem};
use crate::schema::{KeySpec, Node, Schema};
use crate::value::{Key, Mapping};
use std::collections::HashSet;
use tracing::trace;

impl<'a> Matcher<'a> {
    /// Match one key spec against `input`.
    ///
    /// `named` holds the keys addressed by the entries of the enclosing
    /// schema; key filters skip them.
    pub fn match_key(
        &mut self,
        spec: &KeySpec,
        input: &Mapping,
        reference: &Node,
        named: &HashSet<Key>,
        level: &mut MappingResult,
    ) -> bool {
        match spec {
            KeySpec::Key(key) => self.match_plain_key(key, input, reference, level),
            KeySpec::Optional(inner) => {
                if inner.is_present(reference, input, self.root()) {
                    self.match_key(inner, input, reference, named, level)
                } else {
                    true
                }
            }
            KeySpec::If { paths, key } => {
                if paths.iter().all(|path| self.root().path_exists(path)) {
                    return self.match_key(key, input, reference, named, level);
                }
                self.claim_unmet(spec, input, reference, level);
                true
            }
            KeySpec::Or => match reference {
                Node::Mapping(alternatives) => {
                    self.match_any_of(alternatives, input, named, level)
                }
                _ => {
                    level.errors.push_section(Problem::MalformedGroup);
                    false
                }
            },
            KeySpec::XOr => match reference {
                Node::Mapping(alternatives) => {
                    self.match_one_of(alternatives, input, named, level)
                }
                _ => {
                    level.errors.push_section(Problem::MalformedGroup);
                    false
                }
            },
            KeySpec::And(conditions) => {
                self.match_filtered_keys(conditions, input, reference, named, level)
            }
            KeySpec::Msg { key, text } => {
                let saved = std::mem::take(&mut level.errors);
                let valid = self.match_key(key, input, reference, named, level);
                level.errors = saved;
                if !valid {
                    level.errors.push_section(Problem::Custom(text.clone()));
                }
                valid
            }
        }
    }

    fn match_plain_key(
        &mut self,
        key: &Key,
        input: &Mapping,
        reference: &Node,
        level: &mut MappingResult,
    ) -> bool {
        level.claimed.insert(key.clone());
        let Some(value) = input.get(key) else {
            trace!(key = %key, "missing required key");
            level.errors.push_section(Problem::MissingKey(key.clone()));
            return false;
        };

        let outcome = self.match_value(value, reference);
        let valid = outcome.valid;
        if let Some(cleaned) = outcome.record(key, &mut level.errors) {
            level.cleaned.insert(key.clone(), cleaned);
        }
        valid
    }

    /// Every present alternative must validate, and at least one must be present
    fn match_any_of(
        &mut self,
        alternatives: &Schema,
        input: &Mapping,
        named: &HashSet<Key>,
        level: &mut MappingResult,
    ) -> bool {
        let mut found = false;
        let mut valid = true;
        for (spec, node) in alternatives.entries() {
            if spec.is_present(node, input, self.root()) {
                found = true;
                if !self.match_key(spec, input, node, named, level) {
                    valid = false;
                }
            } else {
                self.claim_unmet(spec, input, node, level);
            }
        }
        if !found {
            level
                .errors
                .push_section(Problem::MissingAnyOf(alternative_names(alternatives)));
            return false;
        }
        valid
    }

    /// Exactly one present alternative must validate
    fn match_one_of(
        &mut self,
        alternatives: &Schema,
        input: &Mapping,
        named: &HashSet<Key>,
        level: &mut MappingResult,
    ) -> bool {
        let mut successes = 0usize;
        for (spec, node) in alternatives.entries() {
            if !spec.is_present(node, input, self.root()) {
                self.claim_unmet(spec, input, node, level);
                continue;
            }
            if self.match_key(spec, input, node, named, level) {
                successes += 1;
            }
        }
        match successes {
            1 => true,
            0 => {
                level
                    .errors
                    .push_section(Problem::MissingOneOf(alternative_names(alternatives)));
                false
            }
            _ => {
                level
                    .errors
                    .push_section(Problem::TooManyOf(alternative_names(alternatives)));
                false
            }
        }
    }

    /// Claim the input keys guarded by a condition that does not hold.
    ///
    /// Such keys are treated as absent: not validated, not cleaned and
    /// never unexpected.
    fn claim_unmet(&self, spec: &KeySpec, input: &Mapping, reference: &Node, level: &mut MappingResult) {
        match spec {
            KeySpec::If { paths, key } => {
                if paths.iter().all(|path| self.root().path_exists(path)) {
                    return;
                }
                let mut guarded = Vec::new();
                key.named_keys(reference, &mut guarded);
                for name in guarded {
                    if input.contains_key(&name) {
                        trace!(key = %name, "ignoring key with unmet condition");
                        level.claimed.insert(name);
                    }
                }
            }
            KeySpec::Optional(inner) | KeySpec::Msg { key: inner, .. } => {
                self.claim_unmet(inner, input, reference, level)
            }
            _ => {}
        }
    }

    /// Check the name of every key not named by a sibling entry, then its value
    fn match_filtered_keys(
        &mut self,
        conditions: &[Node],
        input: &Mapping,
        reference: &Node,
        named: &HashSet<Key>,
        level: &mut MappingResult,
    ) -> bool {
        let mut valid = true;
        for (key, value) in input.iter().filter(|(key, _)| !named.contains(*key)) {
            level.claimed.insert(key.clone());

            let name_check = self.match_all(&key.to_value(), conditions);
            if !name_check.valid {
                let reasons: Vec<String> =
                    name_check.messages.iter().map(ToString::to_string).collect();
                trace!(key = %key, "key name rejected by filter");
                level.errors.push_section(Problem::RejectedKey {
                    key: key.clone(),
                    reason: reasons.join("; "),
                });
                valid = false;
                continue;
            }

            let outcome = self.match_value(value, reference);
            if !outcome.valid {
                valid = false;
            }
            if let Some(cleaned) = outcome.record(key, &mut level.errors) {
                level.cleaned.insert(key.clone(), cleaned);
            }
        }
        valid
    }
}

fn alternative_names(alternatives: &Schema) -> KeyList {
    let mut names = Vec::new();
    for (spec, node) in alternatives.entries() {
        spec.named_keys(node, &mut names);
    }
    KeyList(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::ValidationContext;
    use crate::value::{Value, ValueType};

    fn run(spec: KeySpec, reference: Node, input: &Value) -> (bool, MappingResult) {
        let context = ValidationContext::new();
        let mut matcher = Matcher::new(input, &context);
        let mut level = MappingResult::default();
        let named = HashSet::new();
        let valid = matcher.match_key(&spec, input.as_map().unwrap(), &reference, &named, &mut level);
        (valid, level)
    }

    #[test]
    fn test_plain_key_missing() {
        let (valid, level) = run(KeySpec::from("id"), Node::from(ValueType::Int), &Value::empty_map());
        assert!(!valid);
        assert_eq!(level.errors.section_errors()[0].to_string(), "Missing id");
        assert!(level.cleaned.is_empty());
    }

    #[test]
    fn test_plain_key_invalid_value() {
        let input = Value::map([("id", "x")]);
        let (valid, level) = run(KeySpec::from("id"), Node::from(ValueType::Int), &input);
        assert!(!valid);
        assert_eq!(level.errors["id"].len(), 1);
        assert!(level.cleaned.is_empty());
        assert!(level.claimed.contains(&Key::from("id")));
    }

    #[test]
    fn test_optional_absent() {
        let (valid, level) = run(KeySpec::optional("id"), Node::from(1), &Value::empty_map());
        assert!(valid);
        assert!(level.errors.is_empty());
        assert!(level.cleaned.is_empty());
    }

    #[test]
    fn test_any_of_with_invalid_alternative() {
        let group = Node::mapping(Schema::new().key("a", 1).key("b", 2));
        let input = Value::map([("a", 1), ("b", 3)]);
        let (valid, level) = run(KeySpec::Or, group, &input);
        assert!(!valid);
        assert_eq!(level.cleaned.get(&Key::from("a")), Some(&Value::from(1)));
        assert!(level.errors.contains("b"));
    }

    #[test]
    fn test_one_of_counts_successes() {
        let group = Node::mapping(Schema::new().key("a", 1).key("b", 2));

        let (valid, level) = run(KeySpec::XOr, group.clone(), &Value::map([("a", 1), ("b", 3)]));
        assert!(valid);
        assert_eq!(level.cleaned.get(&Key::from("a")), Some(&Value::from(1)));
        assert_eq!(level.errors["b"][0].to_string(), "3 should equal 2");
        assert!(level.errors.section_errors().is_empty());

        let (valid, level) = run(KeySpec::XOr, group, &Value::map([("b", 3)]));
        assert!(!valid);
        assert_eq!(
            level.errors.section_errors()[0].to_string(),
            "Missing one of [\"a\", \"b\"]"
        );
    }

    #[test]
    fn test_one_of_skips_unmet_conditional() {
        let group = Node::mapping(Schema::new().when([["z"]], "a", 1).key("b", 2));
        let (valid, level) = run(KeySpec::XOr, group, &Value::map([("a", 5), ("b", 2)]));
        assert!(valid);
        assert!(level.errors.is_empty());
        assert!(level.claimed.contains(&Key::from("a")));
        assert_eq!(level.cleaned.get(&Key::from("a")), None);
    }

    #[test]
    fn test_any_of_unmet_conditional_is_missing() {
        let group = Node::mapping(Schema::new().when([["z"]], "a", 1).key("b", 2));
        let (valid, level) = run(KeySpec::Or, group, &Value::map([("a", 5)]));
        assert!(!valid);
        assert_eq!(
            level.errors.section_errors(),
            &[Problem::MissingAnyOf(KeyList(vec!["a".into(), "b".into()]))]
        );
        assert!(level.cleaned.is_empty());
    }

    #[test]
    fn test_malformed_group() {
        let (valid, level) = run(KeySpec::Or, Node::from(1), &Value::map([("a", 1)]));
        assert!(!valid);
        assert_eq!(level.errors.section_errors(), &[Problem::MalformedGroup]);
    }

    #[test]
    fn test_msg_key_replaces_section_errors() {
        let (valid, level) = run(
            KeySpec::msg("token", "a token is required"),
            Node::from(ValueType::Str),
            &Value::empty_map(),
        );
        assert!(!valid);
        assert_eq!(
            level.errors.section_errors(),
            &[Problem::Custom("a token is required".into())]
        );
    }
}
