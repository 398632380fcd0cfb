use serde::Deserialize;

use super::{Expression, Identifier, MemberExpression};
use crate::Span;

/// Binding and assignment targets.
///
/// `Member` only occurs as an assignment target (`a.b = 1`,
/// `[a.b] = xs`, `for (a.b of xs)`), never in declarations.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type")]
pub enum Pattern {
    Identifier(Identifier),
    #[serde(rename = "ObjectPattern")]
    Object(Box<ObjectPattern>),
    #[serde(rename = "ArrayPattern")]
    Array(Box<ArrayPattern>),
    #[serde(rename = "AssignmentPattern")]
    Assignment(Box<AssignmentPattern>),
    #[serde(rename = "RestElement")]
    Rest(Box<RestElement>),
    #[serde(rename = "MemberExpression")]
    Member(Box<MemberExpression>),
}

impl Pattern {
    pub fn span(&self) -> Span {
        match self {
            Pattern::Identifier(node) => node.span,
            Pattern::Object(node) => node.span,
            Pattern::Array(node) => node.span,
            Pattern::Assignment(node) => node.span,
            Pattern::Rest(node) => node.span,
            Pattern::Member(node) => node.span,
        }
    }
}

/// `ObjectPattern`.
#[derive(Clone, Debug, Deserialize)]
pub struct ObjectPattern {
    #[serde(flatten)]
    pub span: Span,
    pub properties: Vec<PatternProperty>,
}

/// A member of an object pattern.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type")]
pub enum PatternProperty {
    Property(AssignmentProperty),
    #[serde(rename = "RestElement")]
    Rest(RestElement),
}

/// `Property` inside an `ObjectPattern`.
#[derive(Clone, Debug, Deserialize)]
pub struct AssignmentProperty {
    #[serde(flatten)]
    pub span: Span,
    pub key: Expression,
    pub value: Pattern,
    #[serde(default)]
    pub computed: bool,
    #[serde(default)]
    pub shorthand: bool,
}

/// `ArrayPattern`. `None` elements are elisions.
#[derive(Clone, Debug, Deserialize)]
pub struct ArrayPattern {
    #[serde(flatten)]
    pub span: Span,
    pub elements: Vec<Option<Pattern>>,
}

/// `AssignmentPattern`: a target with a default value.
#[derive(Clone, Debug, Deserialize)]
pub struct AssignmentPattern {
    #[serde(flatten)]
    pub span: Span,
    pub left: Pattern,
    pub right: Expression,
}

/// `RestElement`.
#[derive(Clone, Debug, Deserialize)]
pub struct RestElement {
    #[serde(flatten)]
    pub span: Span,
    pub argument: Pattern,
}
