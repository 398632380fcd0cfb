//! Cook IR - syntax tree types for the cook interpreter.
//!
//! This crate contains the data structures shared by both interpreter passes:
//! - Spans for source locations (UTF-16 offsets, as JS parsers report them)
//! - The ESTree subset the interpreter understands, as closed sum types
//! - Operator enums
//! - Bound-name collection over binding patterns
//! - Stack growth for the recursive walkers
//!
//! # Input Format
//!
//! Trees are produced by an external parser and handed over as ESTree JSON.
//! Every node type derives `serde::Deserialize`, dispatching on the `type`
//! discriminant. Unknown fields (`raw`, `loc`, type annotations, ...) are
//! ignored. Node kinds the interpreter recognizes but refuses to run
//! (`while`, classes, `this`, ...) deserialize into [`Unsupported`] so the
//! pre-analysis pass can reject them with a positioned `SyntaxError`.
//!
//! # Ownership
//!
//! The tree is a strict ownership tree. Function nodes are reference counted
//! so that cooked closures can hold on to their own body without borrowing
//! the whole tree.

pub mod ast;
mod json;
mod span;
mod stack;
pub mod visitor;

pub use ast::{
    ArrayExpression, ArrayPattern, ArrowBody, AssignmentExpression, AssignmentOperator,
    AssignmentPattern, AssignmentProperty, BinaryExpression, BinaryOperator, BlockStatement,
    BreakStatement, CallExpression, CatchClause, ChainExpression, ConditionalExpression,
    ContinueStatement, EmptyStatement, Expression, ExpressionOrSpread, ExpressionStatement,
    ForInOfStatement, ForInit, ForLeft, ForStatement, Function, Identifier, IfStatement, Literal,
    LiteralValue, LogicalExpression, LogicalOperator, MemberExpression, NewExpression, NodeKey,
    ObjectExpression, ObjectMember, ObjectPattern, Pattern, PatternProperty, Property,
    PropertyKind, RegexLiteral, RestElement, ReturnStatement, SequenceExpression, SpreadElement,
    Statement, SwitchCase, SwitchStatement, TaggedTemplateExpression, TemplateElement,
    TemplateElementValue, TemplateLiteral, ThrowStatement, TryStatement, TypeAssertion,
    UnaryExpression, UnaryOperator, Unsupported, UpdateExpression, UpdateOperator,
    VariableDeclaration, VariableDeclarator, VariableKind,
};
pub use json::from_json;
pub use span::Span;
pub use stack::ensure_sufficient_stack;
pub use visitor::{collect_bound_names, declaration_bound_names};
