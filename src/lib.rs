//! # formschema
//!
//! Declarative schema matching and data cleaning for nested in-memory values.
//!
//! A schema is built from composable nodes (literals, type constraints,
//! predicates, transforms, `And`/`Or`/`Msg` combinators and nested mapping
//! or sequence shapes) and key specs (required, optional, conditional and
//! group keys). Validating an untrusted value produces, in one pass:
//!
//! - a boolean verdict,
//! - a cleaned copy holding only the accepted (and transformed) data,
//! - an error tree that mirrors the schema's nesting, plus section-level
//!   messages not tied to a single key.
//!
//! ## Example
//!
//! ```rust
//! use formschema::schema::{builtins, Node, Schema};
//! use formschema::{Form, Value, ValueType};
//!
//! let schema = Schema::new()
//!     .key("name", ValueType::Str)
//!     .key("age", Node::and([builtins::to_int(), builtins::range(Some(0.0), None)]))
//!     .optional("nickname", ValueType::Str);
//!
//! let mut form = Form::new(schema);
//! let input = Value::map([("name", "Ada"), ("age", "36")]);
//!
//! assert!(form.validate(&input));
//! assert_eq!(
//!     form.cleaned(),
//!     Some(&Value::map([("name", Value::from("Ada")), ("age", Value::from(36))]))
//! );
//! assert!(form.errors().is_empty());
//! ```
//!
//! ## Preconditions
//!
//! Input trees are owned [`Value`]s and therefore acyclic. Recursion depth
//! follows the combined nesting of schema and input; use
//! [`Limits`](limits::Limits) to bound it for untrusted input.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Foundation
pub mod error;
pub mod limits;
pub mod value;

// Diagnostics
pub mod report;

// Schema model and matching engine
pub mod schema;
pub mod validators;

// Entry point
pub mod form;

// Re-exports for convenience
pub use error::{CallbackError, Error, Result, SchemaError};
pub use form::{Form, Validated};
pub use report::{ErrorTree, Problem};
pub use schema::{KeySpec, Node, Schema};
pub use validators::{UnknownKeys, ValidationContext};
pub use value::{Key, Mapping, Value, ValueType};

/// Version of the formschema library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
