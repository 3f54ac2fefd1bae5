//! Schema nodes
//!
//! A [`Node`] is the value side of a schema entry, or an element of a
//! container schema. The set of node kinds is closed; each kind has exactly
//! one matching rule in [`crate::validators`].

use super::keys::Schema;
use crate::error::{CallbackError, Result, SchemaError};
use crate::value::{Value, ValueType};
use std::fmt;
use std::sync::Arc;

/// User predicate: `Ok(true)` accepts, `Ok(false)` rejects, `Err` reports
pub type PredicateFn = Arc<dyn Fn(&Value) -> std::result::Result<bool, CallbackError> + Send + Sync>;

/// User transform: the returned value replaces the candidate
pub type TransformFn =
    Arc<dyn Fn(&Value) -> std::result::Result<Value, CallbackError> + Send + Sync>;

/// A schema node
#[derive(Clone)]
pub enum Node {
    /// Matches by deep equality
    Literal(Value),
    /// Matches iff the runtime type is exactly this type
    Type(ValueType),
    /// Matches iff the predicate accepts the candidate
    Predicate {
        /// Name used in diagnostics
        name: String,
        /// The predicate
        test: PredicateFn,
    },
    /// Replaces the candidate with the transform's result
    Use {
        /// Name used in diagnostics
        name: String,
        /// The transform
        transform: TransformFn,
    },
    /// Sequential conjunction, each node receiving the previous output
    And(Vec<Node>),
    /// First-match alternation over the original candidate
    Or(Vec<Node>),
    /// Replaces the inner node's diagnostics with a fixed message
    Msg {
        /// Wrapped node
        inner: Box<Node>,
        /// Message recorded on failure
        text: String,
    },
    /// Nested mapping shape
    Mapping(Schema),
    /// Nested sequence shape; each element matches any of the nodes
    Sequence(Vec<Node>),
}

impl Node {
    /// Literal node
    pub fn literal(value: impl Into<Value>) -> Self {
        Node::Literal(value.into())
    }

    /// Type constraint node
    pub fn of_type(value_type: ValueType) -> Self {
        Node::Type(value_type)
    }

    /// Predicate node
    pub fn predicate<F>(name: impl Into<String>, test: F) -> Self
    where
        F: Fn(&Value) -> std::result::Result<bool, CallbackError> + Send + Sync + 'static,
    {
        Node::Predicate {
            name: name.into(),
            test: Arc::new(test),
        }
    }

    /// Transform (`Use`) node
    pub fn transform<F>(name: impl Into<String>, transform: F) -> Self
    where
        F: Fn(&Value) -> std::result::Result<Value, CallbackError> + Send + Sync + 'static,
    {
        Node::Use {
            name: name.into(),
            transform: Arc::new(transform),
        }
    }

    /// Conjunction of nodes
    pub fn and<N: Into<Node>>(nodes: impl IntoIterator<Item = N>) -> Self {
        Node::And(nodes.into_iter().map(Into::into).collect())
    }

    /// Alternation of nodes
    pub fn or<N: Into<Node>>(nodes: impl IntoIterator<Item = N>) -> Self {
        Node::Or(nodes.into_iter().map(Into::into).collect())
    }

    /// Wrap a node with a custom failure message
    pub fn msg(inner: impl Into<Node>, text: impl Into<String>) -> Self {
        Node::Msg {
            inner: Box::new(inner.into()),
            text: text.into(),
        }
    }

    /// Nested mapping node
    pub fn mapping(schema: Schema) -> Self {
        Node::Mapping(schema)
    }

    /// Nested sequence node
    pub fn sequence<N: Into<Node>>(alternatives: impl IntoIterator<Item = N>) -> Self {
        Node::Sequence(alternatives.into_iter().map(Into::into).collect())
    }

    /// Check structural well-formedness below this node
    pub(crate) fn check(&self, path: &str) -> Result<()> {
        match self {
            Node::Literal(_) | Node::Type(_) | Node::Predicate { .. } | Node::Use { .. } => {
                Ok(())
            }
            Node::Or(nodes) if nodes.is_empty() => Err(SchemaError::new(
                "or node without alternatives",
            )
            .with_path(path)
            .into()),
            Node::And(nodes) | Node::Or(nodes) | Node::Sequence(nodes) => {
                nodes.iter().try_for_each(|node| node.check(path))
            }
            Node::Msg { inner, text } => {
                if text.is_empty() {
                    return Err(SchemaError::new("msg node with empty text")
                        .with_path(path)
                        .into());
                }
                inner.check(path)
            }
            Node::Mapping(schema) => schema.check_at(path),
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, nodes: &[Node]) -> fmt::Result {
    for (i, node) in nodes.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", node)?;
    }
    Ok(())
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Literal(value) => f.write_str(&value.repr()),
            Node::Type(value_type) => write!(f, "{}", value_type),
            Node::Predicate { name, .. } => f.write_str(name),
            Node::Use { name, .. } => write!(f, "use({})", name),
            Node::And(nodes) => {
                f.write_str("and(")?;
                write_list(f, nodes)?;
                f.write_str(")")
            }
            Node::Or(nodes) => {
                f.write_str("or(")?;
                write_list(f, nodes)?;
                f.write_str(")")
            }
            Node::Msg { inner, .. } => write!(f, "{}", inner),
            Node::Mapping(schema) => write!(f, "mapping({} keys)", schema.len()),
            Node::Sequence(nodes) => {
                f.write_str("[")?;
                write_list(f, nodes)?;
                f.write_str("]")
            }
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Mapping(schema) => f.debug_tuple("Mapping").field(schema).finish(),
            other => write!(f, "Node({})", other),
        }
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        Node::Literal(value)
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::Literal(Value::from(s))
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::Literal(Value::from(s))
    }
}

impl From<i64> for Node {
    fn from(i: i64) -> Self {
        Node::Literal(Value::Int(i))
    }
}

impl From<i32> for Node {
    fn from(i: i32) -> Self {
        Node::Literal(Value::from(i))
    }
}

impl From<bool> for Node {
    fn from(b: bool) -> Self {
        Node::Literal(Value::Bool(b))
    }
}

impl From<f64> for Node {
    fn from(x: f64) -> Self {
        Node::Literal(Value::Float(x))
    }
}

impl From<ValueType> for Node {
    fn from(value_type: ValueType) -> Self {
        Node::Type(value_type)
    }
}

impl From<Schema> for Node {
    fn from(schema: Schema) -> Self {
        Node::Mapping(schema)
    }
}

impl From<Vec<Node>> for Node {
    fn from(alternatives: Vec<Node>) -> Self {
        Node::Sequence(alternatives)
    }
}
