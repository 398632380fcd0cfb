//! Errors surfaced by the entry points.

use cook_eval::{EvalError, EvalErrorKind};
use cook_ir::Span;
use cook_precook::PrecookError;
use thiserror::Error;

/// Any failure between reading a tree and getting a result.
#[derive(Debug, Error)]
pub enum CookError {
    /// Rejected during analysis.
    #[error(transparent)]
    Precook(#[from] PrecookError),
    /// Thrown during evaluation.
    #[error(transparent)]
    Eval(#[from] EvalError),
    #[error("malformed syntax tree: {0}")]
    Tree(#[from] serde_json::Error),
    #[error("expected {expected}, found {found}")]
    UnexpectedRoot {
        expected: &'static str,
        found: String,
    },
    #[error("not an evaluation marker: {0:?}")]
    NotEvaluable(String),
}

impl CookError {
    /// The JavaScript error class this failure corresponds to, `None` for
    /// failures of the host input rather than of the code.
    pub fn error_class(&self) -> Option<&'static str> {
        match self {
            CookError::Precook(_) => Some(EvalErrorKind::SyntaxError.name()),
            CookError::Eval(err) if err.kind == EvalErrorKind::Thrown => None,
            CookError::Eval(err) => Some(err.kind.name()),
            CookError::Tree(_) | CookError::UnexpectedRoot { .. } | CookError::NotEvaluable(_) => {
                None
            }
        }
    }

    /// Where in the source the failure happened, when known.
    pub fn span(&self) -> Option<Span> {
        match self {
            CookError::Precook(err) => Some(err.span).filter(|span| !span.is_empty()),
            CookError::Eval(err) => err.span,
            _ => None,
        }
    }

    /// The message without its class prefix. Evaluation errors quote the
    /// source text of the failing node when positions are known.
    pub fn message(&self) -> String {
        match self {
            CookError::Precook(err) => err.message.clone(),
            CookError::Eval(err) => err.report(),
            other => other.to_string(),
        }
    }
}
