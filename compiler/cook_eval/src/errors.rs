//! Evaluation errors and their constructors.
//!
//! Every failure the evaluator can raise has one constructor here, so
//! messages stay consistent across the walker, the built-ins and the
//! sandbox layer.

use std::fmt;

use cook_ir::Span;

use crate::value::{ErrorData, Object, ObjectKind, Value};

/// The error class a failure surfaces as.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EvalErrorKind {
    SyntaxError,
    ReferenceError,
    TypeError,
    RangeError,
    UriError,
    /// A plain `Error`.
    Error,
    /// `throw` of a value that is not an error object.
    Thrown,
}

impl EvalErrorKind {
    pub fn name(self) -> &'static str {
        match self {
            EvalErrorKind::SyntaxError => "SyntaxError",
            EvalErrorKind::ReferenceError => "ReferenceError",
            EvalErrorKind::TypeError => "TypeError",
            EvalErrorKind::RangeError => "RangeError",
            EvalErrorKind::UriError => "URIError",
            EvalErrorKind::Error => "Error",
            EvalErrorKind::Thrown => "Uncaught",
        }
    }

    /// Kind for an error object's `name`; unknown names map to `Error`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "SyntaxError" => EvalErrorKind::SyntaxError,
            "ReferenceError" => EvalErrorKind::ReferenceError,
            "TypeError" => EvalErrorKind::TypeError,
            "RangeError" => EvalErrorKind::RangeError,
            "URIError" => EvalErrorKind::UriError,
            _ => EvalErrorKind::Error,
        }
    }
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An exception propagating out of evaluation.
///
/// User `throw`s keep the thrown value in `thrown` so a `catch` clause
/// sees the identical value; errors raised by the interpreter itself are
/// materialized as error objects only when caught.
#[derive(Clone, Debug)]
pub struct EvalError {
    pub kind: EvalErrorKind,
    pub message: String,
    pub span: Option<Span>,
    /// Source text of `span`, quoted in reports but not in the message a
    /// `catch` clause sees.
    pub snippet: Option<String>,
    pub thrown: Option<Value>,
}

/// Result of evaluation.
pub type EvalResult<T = Value> = Result<T, EvalError>;

impl EvalError {
    pub fn new(kind: EvalErrorKind, message: impl Into<String>) -> Self {
        EvalError {
            kind,
            message: message.into(),
            span: None,
            snippet: None,
            thrown: None,
        }
    }

    /// Attach a span and the text it covers in `source`, unless a span is
    /// already present. The innermost failing node wins.
    #[must_use]
    pub fn with_source(mut self, span: Span, source: &str) -> Self {
        if self.span.is_some() || span.is_empty() {
            return self;
        }
        self.span = Some(span);
        self.snippet = span
            .snippet(source)
            .filter(|text| !text.is_empty())
            .map(str::to_string);
        self
    }

    /// The message with the failing source text appended, for hosts.
    /// Messages that already quote the snippet are left alone.
    pub fn report(&self) -> String {
        match &self.snippet {
            Some(snippet) if !self.message.contains(&format!("`{snippet}`")) => {
                if self.message.is_empty() {
                    format!("`{snippet}`")
                } else {
                    format!("{}: `{snippet}`", self.message)
                }
            }
            _ => self.message.clone(),
        }
    }

    /// Wrap a thrown value. Error objects keep their class.
    pub fn thrown(value: Value) -> Self {
        if let Value::Object(obj) = &value {
            if let ObjectKind::Error(data) = &obj.borrow().kind {
                return EvalError {
                    kind: EvalErrorKind::from_name(&data.name),
                    message: data.message.clone(),
                    span: None,
                    snippet: None,
                    thrown: Some(value.clone()),
                };
            }
        }
        EvalError {
            kind: EvalErrorKind::Thrown,
            message: value.to_string(),
            span: None,
            snippet: None,
            thrown: Some(value),
        }
    }

    /// The value a `catch` clause binds.
    pub fn into_value(self) -> Value {
        match self.thrown {
            Some(value) => value,
            None => Value::Object(Object::new(ObjectKind::Error(ErrorData {
                name: self.kind.name().to_string(),
                message: self.message,
            }))),
        }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            EvalErrorKind::Thrown => write!(f, "Uncaught {}", self.report()),
            kind if self.message.is_empty() && self.snippet.is_none() => f.write_str(kind.name()),
            kind => write!(f, "{}: {}", kind.name(), self.report()),
        }
    }
}

impl std::error::Error for EvalError {}

// Generic constructors

pub fn syntax_error(message: impl Into<String>) -> EvalError {
    EvalError::new(EvalErrorKind::SyntaxError, message)
}

pub fn reference_error(message: impl Into<String>) -> EvalError {
    EvalError::new(EvalErrorKind::ReferenceError, message)
}

pub fn type_error(message: impl Into<String>) -> EvalError {
    EvalError::new(EvalErrorKind::TypeError, message)
}

pub fn range_error(message: impl Into<String>) -> EvalError {
    EvalError::new(EvalErrorKind::RangeError, message)
}

// Binding errors

pub fn not_defined(name: &str) -> EvalError {
    reference_error(format!("{name} is not defined"))
}

pub fn before_initialization(name: &str) -> EvalError {
    reference_error(format!("Cannot access '{name}' before initialization"))
}

pub fn assignment_to_constant() -> EvalError {
    type_error("Assignment to constant variable")
}

// Call and construct errors

pub fn not_a_function(callee: &str) -> EvalError {
    type_error(format!("{callee} is not a function"))
}

pub fn call_stack_exceeded() -> EvalError {
    range_error("Maximum call stack size exceeded")
}

pub fn unsupported_constructor(name: &str, snippet: &str) -> EvalError {
    type_error(format!("Unsupported constructor `{name}`: `{snippet}`"))
}

pub fn non_global_constructor(name: &str, snippet: &str) -> EvalError {
    type_error(format!(
        "Unsupported non-global constructor `{name}`: `{snippet}`"
    ))
}

pub fn unsupported_new(snippet: &str) -> EvalError {
    type_error(format!("Unsupported new expression: `{snippet}`"))
}

pub fn reserved_object() -> EvalError {
    type_error("Cannot access reserved objects such as `Function`.")
}

// Property and iteration errors

pub fn cannot_read_property(base: &str, key: &str) -> EvalError {
    type_error(format!("Cannot read properties of {base} (reading '{key}')"))
}

pub fn cannot_set_property(base: &str, key: &str) -> EvalError {
    type_error(format!("Cannot set properties of {base} (setting '{key}')"))
}

pub fn cannot_create_property(key: &str, base: &str) -> EvalError {
    type_error(format!("Cannot create property '{key}' on {base}"))
}

pub fn read_only_property(key: &str) -> EvalError {
    type_error(format!(
        "Cannot assign to read only property '{key}' of object"
    ))
}

pub fn not_iterable(what: &str) -> EvalError {
    type_error(format!("{what} is not iterable"))
}

pub fn cannot_destructure(value: &Value) -> EvalError {
    type_error(format!("Cannot destructure {value}"))
}

pub fn invalid_array_length() -> EvalError {
    range_error("Invalid array length")
}

pub fn array_too_large(len: usize) -> EvalError {
    range_error(format!(
        "Array length {len} exceeds the limit of {}",
        crate::value::MAX_ARRAY_LENGTH
    ))
}

pub fn invalid_string_length() -> EvalError {
    range_error("Invalid string length")
}

// Language errors detected during evaluation

pub fn unsupported_node(kind: &str, snippet: &str) -> EvalError {
    syntax_error(format!("Unsupported node type `{kind}`: `{snippet}`"))
}

pub fn var_not_allowed(snippet: &str) -> EvalError {
    syntax_error(format!(
        "Var declaration is not allowed, but received: `{snippet}`"
    ))
}

pub fn invalid_regex(raw: &str) -> EvalError {
    syntax_error(format!("Invalid regular expression: {raw}"))
}

pub fn unsupported_operator(category: &str, operator: &str, snippet: &str) -> EvalError {
    syntax_error(format!(
        "Unsupported {category} operator `{operator}`: `{snippet}`"
    ))
}

pub fn missing_scope(what: &str) -> EvalError {
    syntax_error(format!("No pre-analysis result for {what}; precook the tree first"))
}

// Built-in library errors

pub fn wrong_receiver(method: &str, expected: &str) -> EvalError {
    type_error(format!(
        "Method {expected}.prototype.{method} called on incompatible receiver"
    ))
}

pub fn invalid_weak_key(collection: &str) -> EvalError {
    type_error(format!("Invalid value used in weak {collection}"))
}

pub fn circular_json() -> EvalError {
    type_error("Converting circular structure to JSON")
}

pub fn json_parse(message: &str) -> EvalError {
    syntax_error(format!("Unexpected token in JSON: {message}"))
}

pub fn uri_malformed() -> EvalError {
    EvalError::new(EvalErrorKind::UriError, "URI malformed")
}

pub fn invalid_time_value() -> EvalError {
    range_error("Invalid time value")
}

pub fn invalid_radix() -> EvalError {
    range_error("toString() radix must be between 2 and 36")
}

pub fn invalid_digits(method: &str) -> EvalError {
    range_error(format!("{method}() argument must be between 0 and 100"))
}

pub fn invalid_count(count: f64) -> EvalError {
    range_error(format!("Invalid count value: {count}"))
}

pub fn reduce_of_empty() -> EvalError {
    type_error("Reduce of empty array with no initial value")
}

pub fn not_a_constructor_callback(what: &str) -> EvalError {
    type_error(format!("{what} is not a function"))
}

pub fn cannot_convert_to_object(value: &Value) -> EvalError {
    type_error(format!("Cannot convert {value} to object"))
}

pub fn requires_new(name: &str) -> EvalError {
    type_error(format!("Constructor {name} requires 'new'"))
}
