//! Evaluation for the cook interpreter.
//!
//! Runs trees that `cook_precook` has analyzed:
//! - [`Environment`]: the runtime scope chain with temporal-dead-zone
//!   tracking
//! - [`Interpreter`]: the evaluation walker (expressions, statements,
//!   patterns, calls and closures)
//! - [`sandbox`]: the global-supply layer and the value sanitizer that
//!   keep host intrinsics out of reach
//! - the built-in library handed to evaluated code (`Array`, `Math`,
//!   `JSON`, `Date`, `Map`, ...)
//!
//! # Usage
//!
//! ```text
//! precook ──► ScopeMap + free variables
//!                 │
//!   supply(free variables, host globals) ──► global Environment
//!                 │
//!   Interpreter::evaluate / instantiate_root ──► Value
//! ```
//!
//! Errors are [`EvalError`]s carrying the JavaScript error class, a message
//! and, where known, the span of the offending node.

mod environment;
mod errors;
mod exec;
mod globals;
mod interpreter;
mod methods;
mod operators;
pub mod sandbox;
pub mod value;

pub use environment::{BindingError, Environment};
pub use errors::{EvalError, EvalErrorKind, EvalResult};
pub use globals::{object_statics, BUILTIN_NAMES};
pub use interpreter::{Completion, EvalLimits, Interpreter, InterpreterBuilder, Program};
pub use sandbox::{global_environment, sanitize, supply, Globals, ALLOWED_CONSTRUCTORS};
pub use value::{Callable, Object, ObjectKind, Value};
