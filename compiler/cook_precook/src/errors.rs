//! Pre-analysis errors.
//!
//! Everything pre-analysis rejects is a `SyntaxError`. Messages quote the
//! offending source text when the node carries a span.

use cook_ir::Span;
use thiserror::Error;

/// A construct rejected before evaluation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("SyntaxError: {message}")]
pub struct PrecookError {
    pub message: String,
    pub span: Span,
}

impl PrecookError {
    fn new(message: String, span: Span) -> Self {
        PrecookError { message, span }
    }
}

/// The source text of `span`, or an empty string.
fn snippet(source: &str, span: Span) -> &str {
    span.snippet(source).unwrap_or_default()
}

pub(crate) fn unsupported_node(kind: &str, source: &str, span: Span) -> PrecookError {
    PrecookError::new(
        format!("Unsupported node type `{kind}`: `{}`", snippet(source, span)),
        span,
    )
}

pub(crate) fn async_function(source: &str, span: Span) -> PrecookError {
    PrecookError::new(
        format!(
            "Async function is not allowed, but received: `{}`",
            snippet(source, span)
        ),
        span,
    )
}

pub(crate) fn generator_function(source: &str, span: Span) -> PrecookError {
    PrecookError::new(
        format!(
            "Generator function is not allowed, but received: `{}`",
            snippet(source, span)
        ),
        span,
    )
}

pub(crate) fn block_arrow_body(source: &str, span: Span) -> PrecookError {
    PrecookError::new(
        format!(
            "Only an `Expression` is allowed in `ArrowFunctionExpression`'s body, but received: `{}`",
            snippet(source, span)
        ),
        span,
    )
}

pub(crate) fn labeled_jump(statement: &str, source: &str, span: Span) -> PrecookError {
    PrecookError::new(
        format!(
            "Labeled {statement} statement is not allowed, but received `{}`",
            snippet(source, span)
        ),
        span,
    )
}

pub(crate) fn var_not_allowed(source: &str, span: Span) -> PrecookError {
    PrecookError::new(
        format!(
            "Var declaration is not allowed, but received: `{}`",
            snippet(source, span)
        ),
        span,
    )
}

pub(crate) fn unsupported_operator(
    category: &str,
    operator: &str,
    source: &str,
    span: Span,
) -> PrecookError {
    PrecookError::new(
        format!(
            "Unsupported {category} operator `{operator}`: `{}`",
            snippet(source, span)
        ),
        span,
    )
}

pub(crate) fn unsupported_property_kind(kind: &str, source: &str, span: Span) -> PrecookError {
    PrecookError::new(
        format!(
            "Unsupported property kind `{kind}`: `{}`",
            snippet(source, span)
        ),
        span,
    )
}

pub(crate) fn unicode_regex(raw: &str, span: Span) -> PrecookError {
    PrecookError::new(
        format!("Unsupported unicode flag in regular expression: {raw}"),
        span,
    )
}

pub(crate) fn regex_flag(flag: char, raw: &str, span: Span) -> PrecookError {
    PrecookError::new(
        format!("Unsupported flag `{flag}` in regular expression: {raw}"),
        span,
    )
}

pub(crate) fn bigint_literal(source: &str, span: Span) -> PrecookError {
    PrecookError::new(
        format!(
            "BigInt literal is not allowed, but received: `{}`",
            snippet(source, span)
        ),
        span,
    )
}

pub(crate) fn for_await(source: &str, span: Span) -> PrecookError {
    PrecookError::new(
        format!(
            "For-await statement is not allowed, but received: `{}`",
            snippet(source, span)
        ),
        span,
    )
}
