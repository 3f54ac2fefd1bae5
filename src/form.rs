//! Form facade
//!
//! A [`Form`] owns a schema and runs the matching engine against a root
//! input. The verdict, cleaned value and error tree of the last run are
//! kept on the form; [`Form::check`] returns them without touching the form.

use crate::error::Result;
use crate::report::{ErrorTree, Problem};
use crate::schema::Node;
use crate::validators::{Matcher, ValidationContext};
use crate::value::{Value, ValueType};
use tracing::debug;

/// Artifacts of one validation run
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Validated {
    /// Whether the input satisfied the schema
    pub valid: bool,
    /// The accepted, transformed subset of the input
    pub cleaned: Option<Value>,
    /// Diagnostics mirroring the schema's nesting
    pub errors: ErrorTree,
}

/// A schema together with the results of its last validation
#[derive(Debug, Clone)]
pub struct Form {
    schema: Node,
    context: ValidationContext,
    last: Validated,
}

impl Form {
    /// Create a form. Mapping and sequence nodes validate containers; any
    /// other node is matched against the whole input.
    pub fn new(schema: impl Into<Node>) -> Self {
        Self {
            schema: schema.into(),
            context: ValidationContext::default(),
            last: Validated::default(),
        }
    }

    /// Create a form after checking the schema is well-formed
    pub fn try_new(schema: impl Into<Node>) -> Result<Self> {
        let schema = schema.into();
        schema.check("")?;
        Ok(Self::new(schema))
    }

    /// Replace the validation options
    pub fn with_context(mut self, context: ValidationContext) -> Self {
        self.context = context;
        self
    }

    /// Get the schema
    pub fn schema(&self) -> &Node {
        &self.schema
    }

    /// Get the validation options
    pub fn context(&self) -> &ValidationContext {
        &self.context
    }

    /// Validate `input`, keeping the verdict, cleaned value and errors
    pub fn validate(&mut self, input: &Value) -> bool {
        self.last = self.check(input);
        self.last.valid
    }

    /// Validate `input` without storing the results
    pub fn check(&self, input: &Value) -> Validated {
        debug!(schema = %self.schema, "validating input");

        let mut matcher = Matcher::new(input, &self.context);
        let validated = match &self.schema {
            Node::Mapping(schema) => match input.as_map() {
                Some(map) => {
                    let result = matcher.validate_mapping(schema, map);
                    Validated {
                        valid: result.valid,
                        cleaned: Some(Value::Map(result.cleaned)),
                        errors: result.errors,
                    }
                }
                None => root_type_mismatch(input, ValueType::Map),
            },
            Node::Sequence(alternatives) => match input.as_seq() {
                Some(items) => {
                    let result = matcher.validate_sequence(alternatives, items);
                    Validated {
                        valid: result.valid,
                        cleaned: Some(Value::Seq(result.cleaned)),
                        errors: result.errors,
                    }
                }
                None => root_type_mismatch(input, ValueType::Seq),
            },
            node => {
                let outcome = matcher.match_value(input, node);
                let mut errors = ErrorTree::new();
                for problem in outcome.messages {
                    errors.push_section(problem);
                }
                if let Some(nested) = outcome.nested {
                    errors.merge(nested);
                }
                Validated {
                    valid: outcome.valid,
                    cleaned: outcome.cleaned,
                    errors,
                }
            }
        };

        debug!(
            valid = validated.valid,
            problems = validated.errors.problem_count(),
            "validation finished"
        );
        validated
    }

    /// Verdict of the last validation
    pub fn is_valid(&self) -> bool {
        self.last.valid
    }

    /// Cleaned value of the last validation
    pub fn cleaned(&self) -> Option<&Value> {
        self.last.cleaned.as_ref()
    }

    /// Error tree of the last validation
    pub fn errors(&self) -> &ErrorTree {
        &self.last.errors
    }

    /// Take the artifacts of the last validation
    pub fn into_validated(self) -> Validated {
        self.last
    }
}

fn root_type_mismatch(input: &Value, expected: ValueType) -> Validated {
    let mut errors = ErrorTree::new();
    errors.push_section(Problem::TypeMismatch {
        value: input.clone(),
        expected,
    });
    let cleaned = match expected {
        ValueType::Seq => Value::Seq(Vec::new()),
        _ => Value::empty_map(),
    };
    Validated {
        valid: false,
        cleaned: Some(cleaned),
        errors,
    }
}
