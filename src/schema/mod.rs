//! Schema model
//!
//! Schemas are built from two closed sum types: [`Node`] for the value side
//! of an entry and [`KeySpec`] for the key side. Keeping them apart means
//! value-level and key-level combinators never share a dispatch path.

mod keys;
mod node;

pub mod builtins;

pub use keys::{KeySpec, Schema};
pub use node::{Node, PredicateFn, TransformFn};
