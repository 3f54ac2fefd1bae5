//! Key specs and mapping schemas
//!
//! A [`Schema`] is an ordered list of `(KeySpec, Node)` entries. The key
//! spec decides whether and how an input key is required; the node
//! validates its value.

use super::node::Node;
use crate::error::{Result, SchemaError};
use crate::value::{Key, Mapping, Value};
use std::collections::HashSet;
use std::fmt;

/// Governs one entry of a mapping schema
#[derive(Debug, Clone)]
pub enum KeySpec {
    /// Required key
    Key(Key),
    /// Key that may be absent
    Optional(Box<KeySpec>),
    /// Key required only when every path resolves from the root input
    If {
        /// Paths walked from the root input
        paths: Vec<Vec<Key>>,
        /// The guarded key spec
        key: Box<KeySpec>,
    },
    /// At least one alternative of the mapping reference must be present
    Or,
    /// Exactly one alternative of the mapping reference must validate
    XOr,
    /// Key-name filter applied to every key not named by a sibling entry
    And(Vec<Node>),
    /// Replaces the inner key spec's diagnostics with a section message
    Msg {
        /// Wrapped key spec
        key: Box<KeySpec>,
        /// Message recorded on failure
        text: String,
    },
}

impl KeySpec {
    /// Optional key spec
    pub fn optional(key: impl Into<KeySpec>) -> Self {
        KeySpec::Optional(Box::new(key.into()))
    }

    /// Conditional key spec
    pub fn when<P, S>(paths: P, key: impl Into<KeySpec>) -> Self
    where
        P: IntoIterator<Item = S>,
        S: IntoIterator,
        S::Item: Into<Key>,
    {
        KeySpec::If {
            paths: paths
                .into_iter()
                .map(|path| path.into_iter().map(Into::into).collect())
                .collect(),
            key: Box::new(key.into()),
        }
    }

    /// Key-name filter
    pub fn and<N: Into<Node>>(conditions: impl IntoIterator<Item = N>) -> Self {
        KeySpec::And(conditions.into_iter().map(Into::into).collect())
    }

    /// Wrap a key spec with a custom failure message
    pub fn msg(key: impl Into<KeySpec>, text: impl Into<String>) -> Self {
        KeySpec::Msg {
            key: Box::new(key.into()),
            text: text.into(),
        }
    }

    /// Collect the input key names this spec addresses.
    ///
    /// Group specs name the keys of their alternatives; key filters name
    /// nothing.
    pub fn named_keys(&self, reference: &Node, out: &mut Vec<Key>) {
        match self {
            KeySpec::Key(key) => out.push(key.clone()),
            KeySpec::Optional(inner) | KeySpec::If { key: inner, .. } | KeySpec::Msg { key: inner, .. } => {
                inner.named_keys(reference, out)
            }
            KeySpec::Or | KeySpec::XOr => {
                if let Node::Mapping(alternatives) = reference {
                    for (spec, node) in alternatives.entries() {
                        spec.named_keys(node, out);
                    }
                }
            }
            KeySpec::And(_) => {}
        }
    }

    /// Check whether the input carries anything this spec addresses.
    ///
    /// A conditional key whose paths do not all resolve from `root` is
    /// absent even when the key itself is in `input`. A key filter is
    /// present whenever `input` has any key; [`Schema::check`] rejects it
    /// as a group alternative.
    pub fn is_present(&self, reference: &Node, input: &Mapping, root: &Value) -> bool {
        match self {
            KeySpec::Key(key) => input.contains_key(key),
            KeySpec::Optional(inner) | KeySpec::Msg { key: inner, .. } => {
                inner.is_present(reference, input, root)
            }
            KeySpec::If { paths, key } => {
                paths.iter().all(|path| root.path_exists(path))
                    && key.is_present(reference, input, root)
            }
            KeySpec::Or | KeySpec::XOr => match reference {
                Node::Mapping(alternatives) => alternatives
                    .entries()
                    .iter()
                    .any(|(spec, node)| spec.is_present(node, input, root)),
                _ => false,
            },
            KeySpec::And(_) => !input.is_empty(),
        }
    }

    fn is_key_filter(&self) -> bool {
        match self {
            KeySpec::And(_) => true,
            KeySpec::Optional(inner) | KeySpec::If { key: inner, .. } | KeySpec::Msg { key: inner, .. } => {
                inner.is_key_filter()
            }
            _ => false,
        }
    }

    fn check(&self, reference: &Node, path: &str) -> Result<()> {
        match self {
            KeySpec::Key(_) | KeySpec::And(_) => Ok(()),
            KeySpec::Optional(inner) => inner.check(reference, path),
            KeySpec::If { paths, key } => {
                if paths.is_empty() || paths.iter().any(Vec::is_empty) {
                    return Err(SchemaError::new("conditional key needs non-empty paths")
                        .with_path(path)
                        .into());
                }
                key.check(reference, path)
            }
            KeySpec::Or | KeySpec::XOr => match reference {
                Node::Mapping(alternatives) => {
                    match alternatives.entries().iter().find(|(spec, _)| spec.is_key_filter()) {
                        Some((spec, _)) => Err(SchemaError::new(
                            "key filter cannot be a group alternative",
                        )
                        .with_path(path)
                        .with_reason(format!("found {}", spec))
                        .into()),
                        None => Ok(()),
                    }
                }
                other => Err(SchemaError::new("group key requires a mapping of alternatives")
                    .with_path(path)
                    .with_reason(format!("found {}", other))
                    .into()),
            },
            KeySpec::Msg { key, text } => {
                if text.is_empty() {
                    return Err(SchemaError::new("msg key with empty text")
                        .with_path(path)
                        .into());
                }
                key.check(reference, path)
            }
        }
    }
}

impl fmt::Display for KeySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySpec::Key(key) => write!(f, "{}", key),
            KeySpec::Optional(inner) => write!(f, "optional({})", inner),
            KeySpec::If { key, .. } => write!(f, "if({})", key),
            KeySpec::Or => f.write_str("or"),
            KeySpec::XOr => f.write_str("xor"),
            KeySpec::And(_) => f.write_str("and"),
            KeySpec::Msg { key, .. } => write!(f, "{}", key),
        }
    }
}

impl From<Key> for KeySpec {
    fn from(key: Key) -> Self {
        KeySpec::Key(key)
    }
}

impl From<&str> for KeySpec {
    fn from(s: &str) -> Self {
        KeySpec::Key(Key::from(s))
    }
}

impl From<String> for KeySpec {
    fn from(s: String) -> Self {
        KeySpec::Key(Key::from(s))
    }
}

impl From<i64> for KeySpec {
    fn from(i: i64) -> Self {
        KeySpec::Key(Key::Int(i))
    }
}

impl From<i32> for KeySpec {
    fn from(i: i32) -> Self {
        KeySpec::Key(Key::from(i))
    }
}

impl From<bool> for KeySpec {
    fn from(b: bool) -> Self {
        KeySpec::Key(Key::Bool(b))
    }
}

/// Ordered mapping schema
#[derive(Debug, Clone, Default)]
pub struct Schema {
    entries: Vec<(KeySpec, Node)>,
}

impl Schema {
    /// Create an empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry with any key spec
    pub fn entry(mut self, spec: impl Into<KeySpec>, node: impl Into<Node>) -> Self {
        self.entries.push((spec.into(), node.into()));
        self
    }

    /// Add a required key
    pub fn key(self, key: impl Into<Key>, node: impl Into<Node>) -> Self {
        self.entry(KeySpec::Key(key.into()), node)
    }

    /// Add an optional key
    pub fn optional(self, key: impl Into<Key>, node: impl Into<Node>) -> Self {
        self.entry(KeySpec::optional(KeySpec::Key(key.into())), node)
    }

    /// Add a key that is required only when every path exists in the root input
    pub fn when<P, S>(self, paths: P, key: impl Into<Key>, node: impl Into<Node>) -> Self
    where
        P: IntoIterator<Item = S>,
        S: IntoIterator,
        S::Item: Into<Key>,
    {
        self.entry(KeySpec::when(paths, KeySpec::Key(key.into())), node)
    }

    /// Add an `Or` group: at least one alternative present, all present ones valid
    pub fn any_of(self, alternatives: Schema) -> Self {
        self.entry(KeySpec::Or, Node::Mapping(alternatives))
    }

    /// Add an `XOr` group: exactly one alternative valid
    pub fn one_of(self, alternatives: Schema) -> Self {
        self.entry(KeySpec::XOr, Node::Mapping(alternatives))
    }

    /// Add a key-name filter; accepted keys are validated against `node`
    pub fn keys_matching<N: Into<Node>>(
        self,
        conditions: impl IntoIterator<Item = N>,
        node: impl Into<Node>,
    ) -> Self {
        self.entry(KeySpec::and(conditions), node)
    }

    /// Add an entry whose failure is reported as a single section message
    pub fn with_message(
        self,
        spec: impl Into<KeySpec>,
        text: impl Into<String>,
        node: impl Into<Node>,
    ) -> Self {
        self.entry(KeySpec::msg(spec, text), node)
    }

    /// Get the entries in definition order
    pub fn entries(&self) -> &[(KeySpec, Node)] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the schema has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys named by entries other than key filters
    pub fn named_keys(&self) -> HashSet<Key> {
        let mut names = Vec::new();
        for (spec, node) in &self.entries {
            spec.named_keys(node, &mut names);
        }
        names.into_iter().collect()
    }

    /// Check structural well-formedness of the schema and everything below it
    pub fn check(&self) -> Result<()> {
        self.check_at("")
    }

    pub(crate) fn check_at(&self, prefix: &str) -> Result<()> {
        for (spec, node) in &self.entries {
            let path = if prefix.is_empty() {
                spec.to_string()
            } else {
                format!("{}.{}", prefix, spec)
            };
            spec.check(node, &path)?;
            node.check(&path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::value::{Value, ValueType};

    #[test]
    fn test_entries_keep_definition_order() {
        let schema = Schema::new().key("b", 1).key("a", 2).optional(3, "three");
        let names: Vec<String> = schema.entries().iter().map(|(s, _)| s.to_string()).collect();
        assert_eq!(names, vec!["b", "a", "optional(3)"]);
    }

    #[test]
    fn test_named_keys() {
        let schema = Schema::new()
            .key("key", "value")
            .optional(2, "two")
            .any_of(Schema::new().key("opt1", 1).key("opt2", 2))
            .when([["opt1"]], "cond", true)
            .keys_matching([ValueType::Str], ValueType::Int);

        let names = schema.named_keys();
        assert_eq!(names.len(), 5);
        assert!(names.contains(&Key::from("opt2")));
        assert!(names.contains(&Key::from(2)));
        assert!(names.contains(&Key::from("cond")));
    }

    #[test]
    fn test_is_present() {
        let root = Value::map([("opt2", 2)]);
        let input = root.as_map().unwrap();
        let group = Node::Mapping(Schema::new().key("opt1", 1).key("opt2", 2));

        assert!(KeySpec::Or.is_present(&group, input, &root));
        assert!(KeySpec::optional("opt2").is_present(&Node::from(2), input, &root));
        assert!(!KeySpec::from("opt1").is_present(&Node::from(1), input, &root));
    }

    #[test]
    fn test_conditional_presence_follows_root() {
        let root = Value::map([("a", 5)]);
        let input = root.as_map().unwrap();

        let unmet = KeySpec::when([["z"]], "a");
        assert!(!unmet.is_present(&Node::from(1), input, &root));

        let met = KeySpec::when([["a"]], "a");
        assert!(met.is_present(&Node::from(1), input, &root));

        let group = Node::Mapping(Schema::new().when([["z"]], "a", 1));
        assert!(!KeySpec::XOr.is_present(&group, input, &root));
    }

    #[test]
    fn test_check_rejects_filter_in_group() {
        let schema = Schema::new().any_of(
            Schema::new()
                .key("a", 1)
                .keys_matching([ValueType::Str], ValueType::Int),
        );
        let err = schema.check().unwrap_err();
        assert!(err.to_string().contains("key filter cannot be a group alternative"));
    }

    #[test]
    fn test_check_group_reference() {
        let schema = Schema::new().entry(KeySpec::XOr, 1);
        let err = schema.check().unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
        assert!(err.to_string().contains("group key requires a mapping"));

        let schema = Schema::new().one_of(Schema::new().key("a", 1));
        assert!(schema.check().is_ok());
    }

    #[test]
    fn test_check_nested_path() {
        let schema = Schema::new().key(
            "outer",
            Schema::new().entry(KeySpec::when(Vec::<Vec<Key>>::new(), "x"), 1),
        );
        let err = schema.check().unwrap_err();
        assert!(err.to_string().contains("outer.if(x)"));
    }
}
