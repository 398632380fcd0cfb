//! Pre-analysis for the cook interpreter.
//!
//! Walks a function or bare expression once, without evaluating anything,
//! and produces:
//! - the static scope of every function and declaring block ([`ScopeMap`]),
//! - the set of free variables the code may read from the host, which
//!   becomes the sandbox contract for global injection,
//! - eager `SyntaxError`s for constructs the interpreter refuses to run.
//!
//! The result is a pure function of the tree and the options: running the
//! analysis twice on the same tree yields equal results.

mod errors;
mod rules;
mod scope;
mod walker;

use std::collections::BTreeSet;
use std::rc::Rc;

use cook_ir::{Expression, Function};

pub use errors::PrecookError;
pub use rules::{PrecookOptions, Rules};
pub use scope::{Declaration, ScopeKind, ScopeMap, StaticScope, VarKind};

use walker::Walker;

/// Analysis of a bare expression.
#[derive(Clone, Debug)]
pub struct PrecookResult {
    pub source: Rc<str>,
    pub expression: Rc<Expression>,
    pub scopes: Rc<ScopeMap>,
    /// Identifiers the expression reads from the global environment.
    pub free_variables: BTreeSet<String>,
}

/// Analysis of a whole function.
#[derive(Clone, Debug)]
pub struct PrecookFunctionResult {
    pub source: Rc<str>,
    pub function: Rc<Function>,
    pub scopes: Rc<ScopeMap>,
    /// Identifiers the function reads from the global environment.
    pub free_variables: BTreeSet<String>,
}

/// Analyze a bare expression, in the restricted expression dialect: arrow
/// functions must have expression bodies and `function` expressions are
/// rejected.
#[tracing::instrument(level = "debug", skip_all)]
pub fn precook_expression(
    expression: Rc<Expression>,
    source: &str,
    options: PrecookOptions,
) -> Result<PrecookResult, PrecookError> {
    let mut walker = Walker::new(source, options, true);
    walker.expression(&expression)?;
    let (scopes, free_variables) = walker.finish();
    tracing::debug!(
        scopes = scopes.len(),
        free_variables = ?free_variables,
        "precooked expression"
    );
    Ok(PrecookResult {
        source: Rc::from(source),
        expression,
        scopes: Rc::new(scopes),
        free_variables,
    })
}

/// Analyze a function declaration.
#[tracing::instrument(level = "debug", skip_all, fields(name = function.name()))]
pub fn precook_function(
    function: Rc<Function>,
    source: &str,
    options: PrecookOptions,
) -> Result<PrecookFunctionResult, PrecookError> {
    let mut walker = Walker::new(source, options, false);
    walker.root_function(&function)?;
    let (scopes, free_variables) = walker.finish();
    tracing::debug!(
        scopes = scopes.len(),
        free_variables = ?free_variables,
        "precooked function"
    );
    Ok(PrecookFunctionResult {
        source: Rc::from(source),
        function,
        scopes: Rc::new(scopes),
        free_variables,
    })
}
