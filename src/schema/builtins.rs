//! Built-in predicates and transforms
//!
//! Ready-made [`Node`]s for the common conversions and checks. They follow
//! the same callback contract as user-supplied functions: a rejected value
//! returns `Ok(false)` (predicates) and an unconvertible value returns a
//! [`CallbackError`] whose message ends up in the error tree.

use super::node::Node;
use crate::error::{CallbackError, Result, SchemaError};
use crate::value::Value;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Accepted boolean spellings
static BOOLEAN_MAP: Lazy<HashMap<&'static str, bool>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("false", false);
    m.insert("0", false);
    m.insert("true", true);
    m.insert("1", true);
    m
});

// Simplified address check: local part, one '@', dotted domain
static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)+$").unwrap()
});

fn cannot_convert(value: &Value, target: &str) -> CallbackError {
    CallbackError::new(format!(
        "cannot convert {} of type {} to {}",
        value.repr(),
        value.value_type(),
        target
    ))
}

// =============================================================================
// Transforms
// =============================================================================

/// Convert to an integer; strings are parsed after trimming
pub fn to_int() -> Node {
    Node::transform("to_int", |value| match value {
        Value::Int(i) => Ok(Value::Int(*i)),
        Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
        Value::Float(x) if x.fract() == 0.0 && x.abs() < i64::MAX as f64 => {
            Ok(Value::Int(*x as i64))
        }
        Value::Str(s) => s.trim().parse::<i64>().map(Value::Int).map_err(|_| {
            CallbackError::new(format!("invalid literal for int: {}", value.repr()))
        }),
        other => Err(cannot_convert(other, "int")),
    })
}

/// Convert to a float; strings are parsed after trimming
pub fn to_float() -> Node {
    Node::transform("to_float", |value| match value {
        Value::Float(x) => Ok(Value::Float(*x)),
        Value::Int(i) => Ok(Value::Float(*i as f64)),
        Value::Bool(b) => Ok(Value::Float(if *b { 1.0 } else { 0.0 })),
        Value::Str(s) => s.trim().parse::<f64>().map(Value::Float).map_err(|_| {
            CallbackError::new(format!("invalid literal for float: {}", value.repr()))
        }),
        other => Err(cannot_convert(other, "float")),
    })
}

/// Convert a scalar to its string form
pub fn to_str() -> Node {
    Node::transform("to_str", |value| match value {
        Value::Seq(_) | Value::Map(_) => Err(cannot_convert(value, "str")),
        scalar => Ok(Value::Str(scalar.to_string())),
    })
}

/// Convert to a boolean; accepts `true`/`false`/`1`/`0` spellings
pub fn to_bool() -> Node {
    Node::transform("to_bool", |value| match value {
        Value::Bool(b) => Ok(Value::Bool(*b)),
        Value::Int(0) => Ok(Value::Bool(false)),
        Value::Int(1) => Ok(Value::Bool(true)),
        Value::Str(s) => BOOLEAN_MAP
            .get(s.trim())
            .map(|b| Value::Bool(*b))
            .ok_or_else(|| CallbackError::new(format!("{} is not a valid boolean value", value.repr()))),
        other => Err(cannot_convert(other, "bool")),
    })
}

/// Strip leading and trailing whitespace from a string
pub fn trim() -> Node {
    Node::transform("trim", |value| match value {
        Value::Str(s) => Ok(Value::Str(s.trim().to_string())),
        other => Err(cannot_convert(other, "trimmed str")),
    })
}

/// Lowercase a string
pub fn lowercase() -> Node {
    Node::transform("lowercase", |value| match value {
        Value::Str(s) => Ok(Value::Str(s.to_lowercase())),
        other => Err(cannot_convert(other, "lowercase str")),
    })
}

// =============================================================================
// Predicates
// =============================================================================

/// Reject null, empty strings and empty containers
pub fn non_empty() -> Node {
    Node::predicate("non_empty", |value| {
        Ok(match value {
            Value::Null => false,
            Value::Str(s) => !s.is_empty(),
            other => !other.is_empty_container(),
        })
    })
}

/// Bound the length of a string (in chars), sequence or mapping
pub fn length(min: Option<usize>, max: Option<usize>) -> Node {
    let name = format!("length({}..={})", fmt_bound(min), fmt_bound(max));
    Node::predicate(name, move |value| {
        let len = match value {
            Value::Str(s) => s.chars().count(),
            Value::Seq(items) => items.len(),
            Value::Map(m) => m.len(),
            other => {
                return Err(CallbackError::new(format!(
                    "value of type {} has no length",
                    other.value_type()
                )))
            }
        };
        Ok(min.map_or(true, |lo| len >= lo) && max.map_or(true, |hi| len <= hi))
    })
}

/// Bound a numeric value (inclusive)
pub fn range(min: Option<f64>, max: Option<f64>) -> Node {
    let name = format!("range({}..={})", fmt_bound(min), fmt_bound(max));
    Node::predicate(name, move |value| {
        let x = match value {
            Value::Int(i) => *i as f64,
            Value::Float(x) => *x,
            other => {
                return Err(CallbackError::new(format!(
                    "value of type {} is not a number",
                    other.value_type()
                )))
            }
        };
        Ok(min.map_or(true, |lo| x >= lo) && max.map_or(true, |hi| x <= hi))
    })
}

/// Accept only the listed values
pub fn one_of<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Node {
    let allowed: Vec<Value> = values.into_iter().map(Into::into).collect();
    let shown: Vec<String> = allowed.iter().map(Value::repr).collect();
    Node::predicate(format!("one_of([{}])", shown.join(", ")), move |value| {
        Ok(allowed.contains(value))
    })
}

/// Accept strings shaped like an email address
pub fn email() -> Node {
    Node::predicate("email", |value| {
        Ok(value.as_str().map_or(false, |s| EMAIL.is_match(s)))
    })
}

/// Accept strings matching a regular expression.
///
/// Fails with a schema error when the pattern does not compile.
pub fn matches(pattern: &str) -> Result<Node> {
    let regex = Regex::new(pattern).map_err(|e| {
        SchemaError::new(format!("invalid pattern '{}'", pattern)).with_reason(e.to_string())
    })?;
    Ok(Node::predicate(format!("matches({:?})", pattern), move |value| {
        Ok(value.as_str().map_or(false, |s| regex.is_match(s)))
    }))
}

fn fmt_bound<T: ToString>(bound: Option<T>) -> String {
    bound.map(|b| b.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(node: &Node, value: Value) -> std::result::Result<Value, CallbackError> {
        match node {
            Node::Use { transform, .. } => transform(&value),
            Node::Predicate { test, .. } => test(&value).map(Value::Bool),
            _ => panic!("not a callback node"),
        }
    }

    #[test]
    fn test_to_int() {
        let node = to_int();
        assert_eq!(run(&node, Value::from("42")).unwrap(), Value::Int(42));
        assert_eq!(run(&node, Value::from(" 7 ")).unwrap(), Value::Int(7));
        assert_eq!(run(&node, Value::from(3.0)).unwrap(), Value::Int(3));
        assert_eq!(run(&node, Value::from(true)).unwrap(), Value::Int(1));

        let err = run(&node, Value::from("abc")).unwrap_err();
        assert_eq!(err.message(), "invalid literal for int: \"abc\"");
        assert!(run(&node, Value::from(1.5)).is_err());
        assert!(run(&node, Value::seq(vec![1])).is_err());
    }

    #[test]
    fn test_to_float_and_str() {
        assert_eq!(run(&to_float(), Value::from("0.5")).unwrap(), Value::Float(0.5));
        assert_eq!(run(&to_float(), Value::from(2)).unwrap(), Value::Float(2.0));
        assert_eq!(run(&to_str(), Value::from(2)).unwrap(), Value::from("2"));
        assert!(run(&to_str(), Value::empty_map()).is_err());
    }

    #[test]
    fn test_to_bool() {
        assert_eq!(run(&to_bool(), Value::from("true")).unwrap(), Value::Bool(true));
        assert_eq!(run(&to_bool(), Value::from("0")).unwrap(), Value::Bool(false));
        assert_eq!(run(&to_bool(), Value::from(1)).unwrap(), Value::Bool(true));
        assert!(run(&to_bool(), Value::from("yes")).is_err());
    }

    #[test]
    fn test_string_transforms() {
        assert_eq!(run(&trim(), Value::from("  a ")).unwrap(), Value::from("a"));
        assert_eq!(run(&lowercase(), Value::from("AbC")).unwrap(), Value::from("abc"));
        assert!(run(&trim(), Value::from(1)).is_err());
    }

    #[test]
    fn test_length_and_range() {
        let node = length(Some(1), Some(3));
        assert_eq!(run(&node, Value::from("ab")).unwrap(), Value::Bool(true));
        assert_eq!(run(&node, Value::from("")).unwrap(), Value::Bool(false));
        assert_eq!(run(&node, Value::seq(vec![1, 2, 3, 4])).unwrap(), Value::Bool(false));
        assert!(run(&node, Value::from(3)).is_err());

        let node = range(Some(0.0), None);
        assert_eq!(run(&node, Value::from(5)).unwrap(), Value::Bool(true));
        assert_eq!(run(&node, Value::from(-0.5)).unwrap(), Value::Bool(false));
        assert!(run(&node, Value::from("5")).is_err());
    }

    #[test]
    fn test_one_of_and_non_empty() {
        let node = one_of(["red", "green"]);
        assert_eq!(node.to_string(), "one_of([\"red\", \"green\"])");
        assert_eq!(run(&node, Value::from("red")).unwrap(), Value::Bool(true));
        assert_eq!(run(&node, Value::from("blue")).unwrap(), Value::Bool(false));

        assert_eq!(run(&non_empty(), Value::from("")).unwrap(), Value::Bool(false));
        assert_eq!(run(&non_empty(), Value::Null).unwrap(), Value::Bool(false));
        assert_eq!(run(&non_empty(), Value::from(0)).unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_patterns() {
        assert_eq!(run(&email(), Value::from("a.b@example.org")).unwrap(), Value::Bool(true));
        assert_eq!(run(&email(), Value::from("nope")).unwrap(), Value::Bool(false));

        let node = matches(r"^\d{3}$").unwrap();
        assert_eq!(run(&node, Value::from("123")).unwrap(), Value::Bool(true));
        assert_eq!(run(&node, Value::from(123)).unwrap(), Value::Bool(false));
        assert!(matches("(").is_err());
    }
}
