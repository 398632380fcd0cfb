//! Evaluation of syntax tree nodes.
//!
//! - `expr`: expressions, member access and calls
//! - `control`: statements and completions
//! - `pattern`: bindings, destructuring and assignment targets
//! - `call`: closures, function instantiation and calls

mod call;
mod control;
mod expr;
mod pattern;

pub(crate) use pattern::BindMode;
