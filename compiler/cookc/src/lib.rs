//! Cook - a sandboxed interpreter for a JavaScript subset.
//!
//! Entry points tying the passes together:
//!
//! | Step | Expression | Function |
//! |------|------------|----------|
//! | analyze | [`precook`], [`preevaluate`] | [`precook_function`], [`prefeast`] |
//! | run | [`cook`] | [`feast`], then [`invoke`] |
//!
//! Analysis yields the set of globals the code may read. Running hands the
//! evaluator only those globals, taken from [`CookOptions::global_variables`]
//! or from the built-in library.
//!
//! Parsing source text is left to an external ESTree parser; [`tree`] reads
//! its JSON output.

mod errors;
pub mod markers;
mod tracing_setup;
pub mod tree;

use std::rc::Rc;

use cook_eval::{global_environment, supply, EvalLimits, Globals, Interpreter, Program, Value};
use cook_ir::{Expression, Function};

pub use cook_precook::{PrecookFunctionResult, PrecookOptions, PrecookResult, Rules};
pub use errors::CookError;
pub use markers::{is_evaluable, split_evaluation, EvaluationSource, Tracking};
pub use tracing_setup::init_tracing;

/// Options for running analyzed code.
#[derive(Clone, Debug, Default)]
pub struct CookOptions {
    pub rules: Rules,
    /// Host values the code may read, by name.
    pub global_variables: Globals,
    pub limits: EvalLimits,
}

impl CookOptions {
    #[must_use]
    pub fn with_rules(mut self, rules: Rules) -> Self {
        self.rules = rules;
        self
    }

    #[must_use]
    pub fn with_global(mut self, name: impl Into<String>, value: Value) -> Self {
        self.global_variables.insert(name.into(), value);
        self
    }

    #[must_use]
    pub fn with_limits(mut self, limits: EvalLimits) -> Self {
        self.limits = limits;
        self
    }
}

/// An analyzed `<% ... %>` marker.
#[derive(Clone, Debug)]
pub struct Preevaluation<'a> {
    pub marker: EvaluationSource<'a>,
    pub precooked: PrecookResult,
}

/// Analyze a bare expression.
pub fn precook(
    expression: Rc<Expression>,
    source: &str,
    options: PrecookOptions,
) -> Result<PrecookResult, CookError> {
    Ok(cook_precook::precook_expression(expression, source, options)?)
}

/// Analyze a function.
pub fn precook_function(
    function: Rc<Function>,
    source: &str,
    options: PrecookOptions,
) -> Result<PrecookFunctionResult, CookError> {
    Ok(cook_precook::precook_function(function, source, options)?)
}

/// Analyze the expression inside an evaluation marker.
///
/// `expression` is the parse of [`EvaluationSource::source`]; its spans are
/// relative to that inner source.
pub fn preevaluate<'a>(
    raw: &'a str,
    expression: Rc<Expression>,
    options: PrecookOptions,
) -> Result<Preevaluation<'a>, CookError> {
    let marker =
        split_evaluation(raw).ok_or_else(|| CookError::NotEvaluable(raw.to_string()))?;
    let precooked = precook(expression, marker.source, options)?;
    Ok(Preevaluation { marker, precooked })
}

/// Read a function from parser JSON and analyze it.
pub fn prefeast(
    tree_json: &str,
    source: &str,
    options: PrecookOptions,
) -> Result<PrecookFunctionResult, CookError> {
    precook_function(tree::read_function(tree_json)?, source, options)
}

fn globals_for<'a>(
    free_variables: impl IntoIterator<Item = &'a String>,
    options: &CookOptions,
) -> Globals {
    supply(
        free_variables.into_iter().map(String::as_str),
        &options.global_variables,
    )
}

/// Evaluate an analyzed expression.
#[tracing::instrument(level = "debug", skip_all)]
pub fn cook(precooked: &PrecookResult, options: &CookOptions) -> Result<Value, CookError> {
    let globals = globals_for(&precooked.free_variables, options);
    let env = global_environment(&globals);
    let mut interpreter = Interpreter::builder()
        .source(Rc::clone(&precooked.source))
        .scopes(Rc::clone(&precooked.scopes))
        .rules(options.rules)
        .limits(options.limits)
        .build();
    Ok(interpreter.evaluate(&precooked.expression, &env)?)
}

/// Turn an analyzed function into a callable value.
///
/// The callable sees the globals supplied now; later changes to `options`
/// do not reach it.
#[tracing::instrument(level = "debug", skip_all, fields(name = precooked.function.name()))]
pub fn feast(precooked: &PrecookFunctionResult, options: &CookOptions) -> Result<Value, CookError> {
    let globals = globals_for(&precooked.free_variables, options);
    let env = global_environment(&globals);
    let mut interpreter = Interpreter::builder()
        .source(Rc::clone(&precooked.source))
        .scopes(Rc::clone(&precooked.scopes))
        .rules(options.rules)
        .limits(options.limits)
        .build();
    Ok(interpreter.instantiate_root(&precooked.function, &env)?)
}

/// Call a cooked function with `this` undefined. Each call runs on a fresh
/// evaluator.
pub fn invoke(function: &Value, args: &[Value]) -> Result<Value, CookError> {
    let mut interpreter = Interpreter::new(Rc::new(Program::default()));
    Ok(interpreter.call(function, &Value::Undefined, args)?)
}
