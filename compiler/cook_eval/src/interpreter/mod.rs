//! Tree-walking interpreter.
//!
//! # Program threading
//!
//! A [`Program`] is the unit of code the interpreter runs: the source text
//! spans refer to, the pre-analysis scope map and the language rules. Every
//! closure carries the program it was created from. Calling a closure swaps
//! the callee's program in for the duration of the call, so functions
//! cooked from different sources can call each other.

mod builder;
mod conversions;
mod property;

use std::rc::Rc;

use cook_ir::{Expression, Function, Span};
use cook_precook::{Rules, ScopeMap};

use crate::environment::Environment;
use crate::errors::{self, EvalError, EvalResult};
use crate::value::Value;

pub use builder::InterpreterBuilder;
pub(crate) use conversions::Hint;

/// Resource limits for one evaluation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EvalLimits {
    /// Nested calls allowed before a `RangeError`.
    pub max_call_depth: usize,
}

impl Default for EvalLimits {
    fn default() -> Self {
        EvalLimits {
            max_call_depth: 10_000,
        }
    }
}

/// Code the interpreter runs, together with its analysis.
///
/// Shared by every closure created from it, so a function returned to the
/// host keeps its source for error snippets and its scope map for frame
/// set-up after the run that created it has finished.
#[derive(Debug)]
pub struct Program {
    /// Text spans point into. Empty when the host had none, in which case
    /// errors carry no snippet.
    pub source: Rc<str>,
    /// Static scopes from pre-analysis, keyed by node.
    pub scopes: Rc<ScopeMap>,
    pub rules: Rules,
    pub limits: EvalLimits,
}

impl Default for Program {
    fn default() -> Self {
        Program {
            source: Rc::from(""),
            scopes: Rc::new(ScopeMap::default()),
            rules: Rules::default(),
            limits: EvalLimits::default(),
        }
    }
}

/// How a statement finished.
///
/// Exceptions travel as `Err(EvalError)` instead, so `?` unwinds them
/// through every statement until a `try` handles them.
#[derive(Clone, Debug)]
pub enum Completion {
    /// Fell off the end; the next statement runs.
    Normal,
    /// `break`, consumed by the nearest loop or `switch`.
    Break,
    /// `continue`, consumed by the nearest loop.
    Continue,
    /// `return`, consumed by the function call.
    Return(Value),
}

/// The evaluator. Cheap to create; holds no state between runs beyond the
/// current program and call depth.
///
/// All state a script can observe lives in [`Environment`] frames and heap
/// objects, never here, so one interpreter can run any number of
/// programs in turn.
pub struct Interpreter {
    /// Program of the code currently running. Swapped on every closure call.
    pub(crate) program: Rc<Program>,
    /// Nested closure calls, checked against [`EvalLimits::max_call_depth`].
    pub(crate) depth: usize,
    /// Arrays being joined, to cut cycles.
    pub(crate) join_stack: Vec<usize>,
}

impl Interpreter {
    /// An interpreter positioned at `program`, at call depth zero.
    pub fn new(program: Rc<Program>) -> Self {
        Interpreter {
            program,
            depth: 0,
            join_stack: Vec::new(),
        }
    }

    /// Start building an interpreter from its program's parts.
    pub fn builder() -> InterpreterBuilder {
        InterpreterBuilder::new()
    }

    /// The program currently running.
    pub fn program(&self) -> &Rc<Program> {
        &self.program
    }

    /// Evaluate a root expression in `env`.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn evaluate(&mut self, expression: &Expression, env: &Environment) -> EvalResult<Value> {
        self.eval_expr(expression, env)
    }

    /// Turn a root function declaration into a callable value. A named
    /// function can refer to itself through a binding in its own frame.
    #[tracing::instrument(level = "debug", skip_all, fields(name = func.name()))]
    pub fn instantiate_root(&mut self, func: &Rc<Function>, env: &Environment) -> EvalResult<Value> {
        let root = env.child();
        let closure = self.make_closure(func, &root);
        if let Some(name) = func.name() {
            root.declare(name, closure.clone(), true)
                .map_err(|err| self.binding_error(err, name, func.span))?;
        }
        Ok(closure)
    }

    /// Call any callable value: a closure, a built-in or a host function.
    ///
    /// Calling anything else is a `TypeError`. Closure calls count against
    /// the call depth limit.
    pub fn call(&mut self, callee: &Value, this: &Value, args: &[Value]) -> EvalResult<Value> {
        self.call_value(callee, this, args, None)
    }

    /// Source text of the current program.
    pub(crate) fn source(&self) -> &str {
        &self.program.source
    }

    /// Attach `span` and the source text under it to `err`, unless an
    /// inner node already located it.
    pub(crate) fn locate(&self, err: EvalError, span: Span) -> EvalError {
        err.with_source(span, &self.program.source)
    }

    /// Source text of `span` in the current program.
    pub(crate) fn snippet(&self, span: Span) -> String {
        span.snippet(&self.program.source)
            .unwrap_or_default()
            .to_string()
    }

    pub(crate) fn rules(&self) -> Rules {
        self.program.rules
    }

    /// Map a scope-level failure to the exception it surfaces as.
    pub(crate) fn binding_error(
        &self,
        err: crate::environment::BindingError,
        name: &str,
        span: Span,
    ) -> EvalError {
        use crate::environment::BindingError;
        let error = match err {
            BindingError::Uninitialized => errors::before_initialization(name),
            BindingError::Immutable => errors::assignment_to_constant(),
            BindingError::Unresolvable => errors::not_defined(name),
            BindingError::AlreadyDeclared => errors::syntax_error(format!(
                "Identifier '{name}' has already been declared"
            )),
        };
        self.locate(error, span)
    }
}
