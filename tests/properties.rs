//! Property-based tests for the matching laws

use formschema::schema::{Node, Schema};
use formschema::{Form, Key, Value, ValueType};
use proptest::prelude::*;

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::Int),
        any::<bool>().prop_map(Value::Bool),
        "[a-z0-9 ]{0,12}".prop_map(Value::Str),
        Just(Value::Null),
    ]
}

fn is_even() -> Node {
    Node::predicate("is_even", |v| Ok(v.as_int().map_or(false, |i| i % 2 == 0)))
}

fn is_positive() -> Node {
    Node::predicate("is_positive", |v| Ok(v.as_int().map_or(false, |i| i > 0)))
}

fn increment() -> Node {
    Node::transform("increment", |v| {
        v.as_int()
            .and_then(|i| i.checked_add(1))
            .map(Value::Int)
            .ok_or_else(|| "cannot increment".into())
    })
}

proptest! {
    #[test]
    fn literal_schema_round_trips(entries in proptest::collection::btree_map("[a-z]{1,8}", scalar(), 0..8)) {
        let input = Value::map(entries.clone());
        let schema = entries
            .into_iter()
            .fold(Schema::new(), |schema, (key, value)| schema.key(key, value));

        let mut form = Form::new(schema);
        prop_assert!(form.validate(&input));
        prop_assert_eq!(form.cleaned(), Some(&input));
        prop_assert!(form.errors().is_empty());
    }

    #[test]
    fn cleaned_and_errors_are_disjoint(entries in proptest::collection::btree_map("[a-z]{1,8}", scalar(), 1..8)) {
        let input = Value::map(entries.clone());
        let schema = entries
            .keys()
            .fold(Schema::new(), |schema, key| schema.key(key.as_str(), Node::and([ValueType::Int.into(), is_even()])));

        let mut form = Form::new(schema);
        let valid = form.validate(&input);
        let cleaned = form.cleaned().and_then(Value::as_map).cloned().unwrap_or_default();

        for key in entries.keys() {
            let in_cleaned = cleaned.contains_key(&Key::from(key.as_str()));
            let in_errors = form.errors().contains(key.as_str());
            prop_assert!(in_cleaned != in_errors, "key {} in both or neither", key);
            if in_cleaned {
                prop_assert!(cleaned[&Key::from(key.as_str())].as_int().map_or(false, |i| i % 2 == 0));
            }
        }
        prop_assert_eq!(valid, form.errors().is_empty());
    }

    #[test]
    fn and_feeds_cleaned_output_forward(x in any::<i64>()) {
        let mut form = Form::new(Node::and([increment(), is_even()]));
        let valid = form.validate(&Value::Int(x));

        let expected = x.checked_add(1).filter(|y| y % 2 == 0);
        prop_assert_eq!(valid, expected.is_some());
        prop_assert_eq!(form.cleaned().cloned(), expected.map(Value::Int));
    }

    #[test]
    fn or_takes_first_satisfying_branch(x in any::<i64>()) {
        let mut form = Form::new(Node::or([is_even(), increment()]));
        let valid = form.validate(&Value::Int(x));

        let expected = if x % 2 == 0 { Some(x) } else { x.checked_add(1) };
        prop_assert_eq!(valid, expected.is_some());
        prop_assert_eq!(form.cleaned().cloned(), expected.map(Value::Int));
    }

    #[test]
    fn or_is_valid_iff_a_branch_is(x in any::<i64>()) {
        let mut form = Form::new(Node::or([is_even(), is_positive()]));
        prop_assert_eq!(form.validate(&Value::Int(x)), x % 2 == 0 || x > 0);
    }

    #[test]
    fn optional_missing_is_silent(key in "[a-z]{1,8}", other in "[A-Z]{1,8}") {
        let schema = Schema::new().optional(key.as_str(), ValueType::Int).optional(other.as_str(), ValueType::Str);
        let mut form = Form::new(schema);
        let input = Value::map([(other.as_str(), "x")]);

        prop_assert!(form.validate(&input));
        prop_assert!(!form.errors().contains(key.as_str()));
        prop_assert_eq!(form.cleaned(), Some(&input));
    }
}
