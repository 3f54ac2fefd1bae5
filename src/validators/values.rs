//! Value matcher
//!
//! Validates a single value against a single [`Node`] and produces the
//! cleaned value. Container nodes recurse into the mapping and sequence
//! validators.

use super::{Matcher, Outcome};
use crate::report::Problem;
use crate::schema::{Node, Schema};
use crate::value::{Value, ValueType};

impl<'a> Matcher<'a> {
    /// Match `candidate` against `node`
    pub fn match_value(&mut self, candidate: &Value, node: &Node) -> Outcome {
        match node {
            Node::Literal(expected) => {
                if candidate == expected {
                    Outcome::accept(candidate.clone())
                } else {
                    Outcome::reject(Problem::LiteralMismatch {
                        value: candidate.clone(),
                        expected: expected.clone(),
                    })
                }
            }
            Node::Type(expected) => {
                if candidate.value_type() == *expected {
                    Outcome::accept(candidate.clone())
                } else {
                    Outcome::reject(Problem::TypeMismatch {
                        value: candidate.clone(),
                        expected: *expected,
                    })
                }
            }
            Node::Predicate { name, test } => match test(candidate) {
                Ok(true) => Outcome::accept(candidate.clone()),
                Ok(false) => Outcome::reject(Problem::PredicateRejected {
                    name: name.clone(),
                    value: candidate.clone(),
                }),
                Err(err) => Outcome::reject(Problem::PredicateRaised(err.to_string())),
            },
            Node::Use { transform, .. } => match transform(candidate) {
                Ok(result) => Outcome::accept(result),
                Err(err) => Outcome::reject(Problem::TransformRaised(err.to_string())),
            },
            Node::And(nodes) => self.match_all(candidate, nodes),
            Node::Or(nodes) => self.match_any(candidate, nodes),
            Node::Msg { inner, text } => {
                let outcome = self.match_value(candidate, inner);
                if outcome.valid {
                    outcome
                } else {
                    Outcome {
                        valid: false,
                        cleaned: outcome.cleaned,
                        messages: vec![Problem::Custom(text.clone())],
                        nested: None,
                    }
                }
            }
            Node::Mapping(schema) => self.match_mapping(candidate, schema),
            Node::Sequence(alternatives) => self.match_sequence(candidate, alternatives),
        }
    }

    /// Chain nodes, feeding each one the previous cleaned output.
    ///
    /// The first failure ends the chain and nothing is cleaned.
    pub(crate) fn match_all(&mut self, candidate: &Value, nodes: &[Node]) -> Outcome {
        let mut current = candidate.clone();
        for node in nodes {
            let outcome = self.match_value(&current, node);
            if !outcome.valid {
                return Outcome {
                    cleaned: None,
                    ..outcome
                };
            }
            if let Some(cleaned) = outcome.cleaned {
                current = cleaned;
            }
        }
        Outcome::accept(current)
    }

    /// Try each node against the original candidate; the first match wins
    fn match_any(&mut self, candidate: &Value, nodes: &[Node]) -> Outcome {
        for node in nodes {
            let outcome = self.match_value(candidate, node);
            if outcome.valid {
                return outcome;
            }
        }
        let alternatives: Vec<String> = nodes.iter().map(ToString::to_string).collect();
        Outcome::reject(Problem::NoMatch {
            value: candidate.clone(),
            alternatives: format!("[{}]", alternatives.join(", ")),
        })
    }

    fn match_mapping(&mut self, candidate: &Value, schema: &Schema) -> Outcome {
        let Some(input) = candidate.as_map() else {
            return Outcome::reject(Problem::TypeMismatch {
                value: candidate.clone(),
                expected: ValueType::Map,
            });
        };
        if let Some(outcome) = self.depth_guard() {
            return outcome;
        }

        self.context.enter_level();
        let result = self.validate_mapping(schema, input);
        self.context.exit_level();

        let cleaned = Value::Map(result.cleaned);
        self.container_outcome(result.valid, cleaned, result.errors)
    }

    fn match_sequence(&mut self, candidate: &Value, alternatives: &[Node]) -> Outcome {
        let Some(items) = candidate.as_seq() else {
            return Outcome::reject(Problem::TypeMismatch {
                value: candidate.clone(),
                expected: ValueType::Seq,
            });
        };
        if let Some(outcome) = self.depth_guard() {
            return outcome;
        }

        self.context.enter_level();
        let result = self.validate_sequence(alternatives, items);
        self.context.exit_level();

        let cleaned = Value::Seq(result.cleaned);
        self.container_outcome(result.valid, cleaned, result.errors)
    }

    fn depth_guard(&self) -> Option<Outcome> {
        if self.context.is_max_depth_exceeded() {
            let max = self.context.limits.max_depth.unwrap_or(self.context.level);
            Some(Outcome::reject(Problem::DepthExceeded(max)))
        } else {
            None
        }
    }

    fn container_outcome(
        &self,
        valid: bool,
        cleaned: Value,
        errors: crate::report::ErrorTree,
    ) -> Outcome {
        if valid {
            return Outcome::accept(cleaned);
        }
        let keep = self.context.partial_containers && !cleaned.is_empty_container();
        Outcome {
            valid: false,
            cleaned: keep.then_some(cleaned),
            messages: Vec::new(),
            nested: Some(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CallbackError;
    use crate::schema::builtins;
    use crate::validators::ValidationContext;

    fn run(node: &Node, candidate: Value) -> Outcome {
        let root = Value::Null;
        let context = ValidationContext::new();
        let mut matcher = Matcher::new(&root, &context);
        matcher.match_value(&candidate, node)
    }

    #[test]
    fn test_literal() {
        assert_eq!(run(&Node::from(2), Value::from(2)), Outcome::accept(Value::from(2)));

        let outcome = run(&Node::from(2), Value::from("two"));
        assert!(!outcome.valid);
        assert_eq!(outcome.cleaned, None);
        assert_eq!(outcome.messages[0].to_string(), "\"two\" should equal 2");
    }

    #[test]
    fn test_type_is_exact() {
        assert!(run(&Node::from(ValueType::Int), Value::from(1)).valid);
        let outcome = run(&Node::from(ValueType::Float), Value::from(1));
        assert!(!outcome.valid);
        assert_eq!(outcome.messages[0].to_string(), "1 must be of type float");
    }

    #[test]
    fn test_predicate_outcomes() {
        let even = Node::predicate("is_even", |v| Ok(v.as_int().map_or(false, |i| i % 2 == 0)));
        assert!(run(&even, Value::from(4)).valid);

        let outcome = run(&even, Value::from(3));
        assert_eq!(outcome.messages[0].to_string(), "is_even did not match 3");

        let raising = Node::predicate("boom", |_| Err(CallbackError::new("exploded")));
        let outcome = run(&raising, Value::from(3));
        assert_eq!(outcome.messages, vec![Problem::PredicateRaised("exploded".into())]);
    }

    #[test]
    fn test_use_replaces_candidate() {
        let outcome = run(&builtins::to_int(), Value::from("42"));
        assert!(outcome.valid);
        assert_eq!(outcome.cleaned, Some(Value::Int(42)));

        let outcome = run(&builtins::to_int(), Value::from("abc"));
        assert!(!outcome.valid);
        assert!(matches!(outcome.messages[0], Problem::TransformRaised(_)));
    }

    #[test]
    fn test_and_chains_outputs() {
        let node = Node::and([builtins::to_int(), Node::from(ValueType::Int), Node::from(42)]);
        assert_eq!(run(&node, Value::from("42")).cleaned, Some(Value::Int(42)));

        let node = Node::and([Node::from(ValueType::Str), builtins::to_int()]);
        let outcome = run(&node, Value::from(42));
        assert!(!outcome.valid);
        assert_eq!(outcome.cleaned, None);
        assert_eq!(outcome.messages.len(), 1);
    }

    #[test]
    fn test_or_first_match_wins() {
        let node = Node::or([builtins::to_int(), builtins::to_str()]);
        assert_eq!(run(&node, Value::from("7")).cleaned, Some(Value::Int(7)));
        assert_eq!(run(&node, Value::from(true)).cleaned, Some(Value::Int(1)));

        let node = Node::or([Node::from(1), Node::from("1")]);
        let outcome = run(&node, Value::from(2));
        assert_eq!(outcome.messages.len(), 1);
        assert_eq!(
            outcome.messages[0].to_string(),
            "2 is not valid for any of [1, \"1\"]"
        );
    }

    #[test]
    fn test_msg_replaces_diagnostics() {
        let node = Node::msg(Node::and([Node::from(ValueType::Str), builtins::non_empty()]), "name required");
        let outcome = run(&node, Value::from(""));
        assert_eq!(outcome.messages, vec![Problem::Custom("name required".into())]);
        assert!(run(&node, Value::from("x")).valid);
    }

    #[test]
    fn test_container_type_mismatch() {
        let outcome = run(&Node::mapping(Schema::new()), Value::from(1));
        assert_eq!(outcome.messages[0].to_string(), "1 must be of type mapping");

        let outcome = run(&Node::sequence([Node::from(1)]), Value::from("abc"));
        assert_eq!(outcome.messages[0].to_string(), "abc must be of type sequence");
    }

    #[test]
    fn test_depth_limit() {
        let node = Node::sequence([Node::sequence([Node::from(ValueType::Int)])]);
        let root = Value::Null;
        let context = ValidationContext::new().with_max_depth(1);
        let mut matcher = Matcher::new(&root, &context);

        let outcome = matcher.match_value(&Value::seq(vec![Value::seq(vec![1])]), &node);
        assert!(!outcome.valid);
        let nested = outcome.nested.unwrap();
        assert_eq!(nested.get(0)[0], Problem::DepthExceeded(1));
    }

    #[test]
    fn test_msg_keeps_partial_container() {
        let node = Node::msg(
            Node::mapping(Schema::new().key("a", 1).key("b", 2)),
            "bad record",
        );
        let candidate = Value::map([("a", 1), ("b", 3)]);
        let root = Value::Null;
        let context = ValidationContext::new().with_partial_containers();
        let mut matcher = Matcher::new(&root, &context);

        let outcome = matcher.match_value(&candidate, &node);
        assert!(!outcome.valid);
        assert_eq!(outcome.cleaned, Some(Value::map([("a", 1)])));
        assert_eq!(outcome.messages, vec![Problem::Custom("bad record".into())]);
        assert_eq!(outcome.nested, None);
    }
}
