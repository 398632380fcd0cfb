//! ESTree node types.
//!
//! # Design
//!
//! - Closed sum types per syntactic category ([`Expression`], [`Statement`],
//!   [`Pattern`]) so both passes dispatch with one exhaustive `match`.
//! - Large payloads are boxed so the category enums stay small.
//! - Every node struct flattens a [`Span`] from the parser's `start`/`end`.
//! - Nodes are never mutated after deserialization. [`NodeKey`] relies on
//!   that: a node's address is its identity for the lifetime of the tree.

mod expression;
mod operators;
mod pattern;
mod statement;

use serde::Deserialize;
use std::any::TypeId;
use std::fmt;

use crate::Span;

pub use expression::{
    ArrayExpression, AssignmentExpression, BinaryExpression, CallExpression, ChainExpression,
    ConditionalExpression, Expression, ExpressionOrSpread, LogicalExpression, MemberExpression,
    NewExpression, ObjectExpression, ObjectMember, Property, SequenceExpression, SpreadElement,
    TaggedTemplateExpression, TemplateElement, TemplateElementValue, TemplateLiteral,
    TypeAssertion, UnaryExpression, UpdateExpression,
};
pub use operators::{
    AssignmentOperator, BinaryOperator, LogicalOperator, PropertyKind, UnaryOperator,
    UpdateOperator, VariableKind,
};
pub use pattern::{
    ArrayPattern, AssignmentPattern, AssignmentProperty, ObjectPattern, Pattern, PatternProperty,
    RestElement,
};
pub use statement::{
    BlockStatement, BreakStatement, CatchClause, ContinueStatement, EmptyStatement,
    ExpressionStatement, ForInOfStatement, ForInit, ForLeft, ForStatement, IfStatement,
    ReturnStatement, Statement, SwitchCase, SwitchStatement, ThrowStatement, TryStatement,
    VariableDeclaration, VariableDeclarator,
};

/// Identity of a node inside an immutable tree.
///
/// Pairs the node's address with its Rust type, since a node and its first
/// field (a `CatchClause` and its inline body, say) may share an address.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct NodeKey {
    addr: usize,
    ty: TypeId,
}

impl NodeKey {
    /// Key for `node`. Only meaningful while the tree holding `node` is alive
    /// and unmoved.
    #[inline]
    pub fn of<T: 'static>(node: &T) -> Self {
        NodeKey {
            addr: std::ptr::from_ref(node) as usize,
            ty: TypeId::of::<T>(),
        }
    }
}

impl fmt::Debug for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeKey({:#x})", self.addr)
    }
}

/// `Identifier`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Identifier {
    #[serde(flatten)]
    pub span: Span,
    pub name: String,
}

/// Payload of a regular expression literal.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct RegexLiteral {
    pub pattern: String,
    #[serde(default)]
    pub flags: String,
}

/// Value carried by a `Literal`.
///
/// Regex and BigInt literals carry a parser-specific `value` (an empty
/// object, or a stringified number); their meaning lives in
/// [`Literal::regex`] and [`Literal::bigint`].
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LiteralValue {
    #[default]
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    Opaque(serde::de::IgnoredAny),
}

/// `Literal`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Literal {
    #[serde(flatten)]
    pub span: Span,
    #[serde(default)]
    pub value: LiteralValue,
    #[serde(default)]
    pub raw: Option<String>,
    #[serde(default)]
    pub regex: Option<RegexLiteral>,
    #[serde(default)]
    pub bigint: Option<String>,
}

/// Body of a function: a block, or a bare expression for concise arrows.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type")]
pub enum ArrowBody {
    #[serde(rename = "BlockStatement")]
    Block(BlockStatement),
    #[serde(untagged)]
    Expression(Expression),
}

/// `FunctionDeclaration`, `FunctionExpression` and `ArrowFunctionExpression`
/// share this payload; the enclosing enum variant says which one it is.
#[derive(Clone, Debug, Deserialize)]
pub struct Function {
    #[serde(flatten)]
    pub span: Span,
    #[serde(default)]
    pub id: Option<Identifier>,
    pub params: Vec<Pattern>,
    pub body: ArrowBody,
    #[serde(default, rename = "async")]
    pub is_async: bool,
    #[serde(default)]
    pub generator: bool,
    /// True for arrows with a concise (expression) body.
    #[serde(default)]
    pub expression: bool,
}

impl Function {
    /// Statements of a block body, `None` for concise arrow bodies.
    pub fn body_statements(&self) -> Option<&[Statement]> {
        match &self.body {
            ArrowBody::Block(block) => Some(&block.body),
            ArrowBody::Expression(_) => None,
        }
    }

    /// The function's own name, if any.
    pub fn name(&self) -> Option<&str> {
        self.id.as_ref().map(|id| id.name.as_str())
    }
}

/// A node kind the interpreter recognizes but refuses to run.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Unsupported {
    #[serde(flatten)]
    pub span: Span,
}
