use serde::Deserialize;
use std::rc::Rc;

use super::{
    AssignmentOperator, BinaryOperator, Function, Identifier, Literal, LogicalOperator, Pattern,
    PropertyKind, UnaryOperator, Unsupported, UpdateOperator,
};
use crate::Span;

/// Expression nodes.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type")]
pub enum Expression {
    Identifier(Identifier),
    Literal(Box<Literal>),
    TemplateLiteral(Box<TemplateLiteral>),
    #[serde(rename = "TaggedTemplateExpression")]
    TaggedTemplate(Box<TaggedTemplateExpression>),
    #[serde(rename = "ArrayExpression")]
    Array(Box<ArrayExpression>),
    #[serde(rename = "ObjectExpression")]
    Object(Box<ObjectExpression>),
    #[serde(rename = "FunctionExpression")]
    Function(Rc<Function>),
    #[serde(rename = "ArrowFunctionExpression")]
    Arrow(Rc<Function>),
    #[serde(rename = "UnaryExpression")]
    Unary(Box<UnaryExpression>),
    #[serde(rename = "UpdateExpression")]
    Update(Box<UpdateExpression>),
    #[serde(rename = "BinaryExpression")]
    Binary(Box<BinaryExpression>),
    #[serde(rename = "LogicalExpression")]
    Logical(Box<LogicalExpression>),
    #[serde(rename = "AssignmentExpression")]
    Assignment(Box<AssignmentExpression>),
    #[serde(rename = "ConditionalExpression")]
    Conditional(Box<ConditionalExpression>),
    #[serde(rename = "CallExpression")]
    Call(Box<CallExpression>),
    #[serde(rename = "NewExpression")]
    New(Box<NewExpression>),
    #[serde(rename = "MemberExpression")]
    Member(Box<MemberExpression>),
    #[serde(rename = "ChainExpression")]
    Chain(Box<ChainExpression>),
    #[serde(rename = "SequenceExpression")]
    Sequence(Box<SequenceExpression>),
    #[serde(rename = "TSAsExpression", alias = "TSSatisfiesExpression")]
    TsAs(Box<TypeAssertion>),
    #[serde(rename = "TSNonNullExpression")]
    TsNonNull(Box<TypeAssertion>),

    // Recognized, always rejected.
    #[serde(rename = "ThisExpression")]
    This(Unsupported),
    #[serde(rename = "ClassExpression")]
    Class(Unsupported),
    #[serde(rename = "AwaitExpression")]
    Await(Unsupported),
    #[serde(rename = "YieldExpression")]
    Yield(Unsupported),
    Super(Unsupported),
    MetaProperty(Unsupported),
    #[serde(rename = "ImportExpression")]
    Import(Unsupported),
}

impl Expression {
    /// Source span of the node.
    pub fn span(&self) -> Span {
        match self {
            Expression::Identifier(node) => node.span,
            Expression::Literal(node) => node.span,
            Expression::TemplateLiteral(node) => node.span,
            Expression::TaggedTemplate(node) => node.span,
            Expression::Array(node) => node.span,
            Expression::Object(node) => node.span,
            Expression::Function(node) | Expression::Arrow(node) => node.span,
            Expression::Unary(node) => node.span,
            Expression::Update(node) => node.span,
            Expression::Binary(node) => node.span,
            Expression::Logical(node) => node.span,
            Expression::Assignment(node) => node.span,
            Expression::Conditional(node) => node.span,
            Expression::Call(node) => node.span,
            Expression::New(node) => node.span,
            Expression::Member(node) => node.span,
            Expression::Chain(node) => node.span,
            Expression::Sequence(node) => node.span,
            Expression::TsAs(node) | Expression::TsNonNull(node) => node.span,
            Expression::This(node)
            | Expression::Class(node)
            | Expression::Await(node)
            | Expression::Yield(node)
            | Expression::Super(node)
            | Expression::MetaProperty(node)
            | Expression::Import(node) => node.span,
        }
    }

    /// ESTree name of a rejected node kind, `None` for supported kinds.
    pub fn unsupported_kind(&self) -> Option<&'static str> {
        Some(match self {
            Expression::This(_) => "ThisExpression",
            Expression::Class(_) => "ClassExpression",
            Expression::Await(_) => "AwaitExpression",
            Expression::Yield(_) => "YieldExpression",
            Expression::Super(_) => "Super",
            Expression::MetaProperty(_) => "MetaProperty",
            Expression::Import(_) => "ImportExpression",
            _ => return None,
        })
    }

    /// Strip TypeScript-only wrappers.
    pub fn strip_type_assertions(&self) -> &Expression {
        let mut expr = self;
        while let Expression::TsAs(inner) | Expression::TsNonNull(inner) = expr {
            expr = &inner.expression;
        }
        expr
    }
}

/// An array element or call argument.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type")]
pub enum ExpressionOrSpread {
    #[serde(rename = "SpreadElement")]
    Spread(SpreadElement),
    #[serde(untagged)]
    Expression(Expression),
}

/// `SpreadElement`.
#[derive(Clone, Debug, Deserialize)]
pub struct SpreadElement {
    #[serde(flatten)]
    pub span: Span,
    pub argument: Expression,
}

/// A quasi of a template literal.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TemplateElement {
    #[serde(flatten)]
    pub span: Span,
    pub value: TemplateElementValue,
    #[serde(default)]
    pub tail: bool,
}

/// Raw and cooked text of a quasi. `cooked` is `None` for invalid escapes
/// in tagged templates.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TemplateElementValue {
    pub raw: String,
    #[serde(default)]
    pub cooked: Option<String>,
}

/// `TemplateLiteral`.
#[derive(Clone, Debug, Deserialize)]
pub struct TemplateLiteral {
    #[serde(flatten)]
    pub span: Span,
    pub quasis: Vec<TemplateElement>,
    pub expressions: Vec<Expression>,
}

/// `TaggedTemplateExpression`.
#[derive(Clone, Debug, Deserialize)]
pub struct TaggedTemplateExpression {
    #[serde(flatten)]
    pub span: Span,
    pub tag: Expression,
    pub quasi: TemplateLiteral,
}

/// `ArrayExpression`. `None` elements are holes.
#[derive(Clone, Debug, Deserialize)]
pub struct ArrayExpression {
    #[serde(flatten)]
    pub span: Span,
    pub elements: Vec<Option<ExpressionOrSpread>>,
}

/// `ObjectExpression`.
#[derive(Clone, Debug, Deserialize)]
pub struct ObjectExpression {
    #[serde(flatten)]
    pub span: Span,
    pub properties: Vec<ObjectMember>,
}

/// A member of an object literal.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type")]
pub enum ObjectMember {
    Property(Property),
    #[serde(rename = "SpreadElement")]
    Spread(SpreadElement),
}

/// `Property` inside an `ObjectExpression`.
#[derive(Clone, Debug, Deserialize)]
pub struct Property {
    #[serde(flatten)]
    pub span: Span,
    pub key: Expression,
    pub value: Expression,
    #[serde(default)]
    pub computed: bool,
    #[serde(default)]
    pub kind: PropertyKind,
    #[serde(default)]
    pub method: bool,
    #[serde(default)]
    pub shorthand: bool,
}

/// `UnaryExpression`.
#[derive(Clone, Debug, Deserialize)]
pub struct UnaryExpression {
    #[serde(flatten)]
    pub span: Span,
    pub operator: UnaryOperator,
    pub argument: Expression,
}

/// `UpdateExpression`.
#[derive(Clone, Debug, Deserialize)]
pub struct UpdateExpression {
    #[serde(flatten)]
    pub span: Span,
    pub operator: UpdateOperator,
    pub prefix: bool,
    pub argument: Pattern,
}

/// `BinaryExpression`.
#[derive(Clone, Debug, Deserialize)]
pub struct BinaryExpression {
    #[serde(flatten)]
    pub span: Span,
    pub operator: BinaryOperator,
    pub left: Expression,
    pub right: Expression,
}

/// `LogicalExpression`.
#[derive(Clone, Debug, Deserialize)]
pub struct LogicalExpression {
    #[serde(flatten)]
    pub span: Span,
    pub operator: LogicalOperator,
    pub left: Expression,
    pub right: Expression,
}

/// `AssignmentExpression`.
#[derive(Clone, Debug, Deserialize)]
pub struct AssignmentExpression {
    #[serde(flatten)]
    pub span: Span,
    pub operator: AssignmentOperator,
    pub left: Pattern,
    pub right: Expression,
}

/// `ConditionalExpression`.
#[derive(Clone, Debug, Deserialize)]
pub struct ConditionalExpression {
    #[serde(flatten)]
    pub span: Span,
    pub test: Expression,
    pub consequent: Expression,
    pub alternate: Expression,
}

/// `CallExpression`.
#[derive(Clone, Debug, Deserialize)]
pub struct CallExpression {
    #[serde(flatten)]
    pub span: Span,
    pub callee: Expression,
    pub arguments: Vec<ExpressionOrSpread>,
    #[serde(default)]
    pub optional: bool,
}

/// `NewExpression`.
#[derive(Clone, Debug, Deserialize)]
pub struct NewExpression {
    #[serde(flatten)]
    pub span: Span,
    pub callee: Expression,
    #[serde(default)]
    pub arguments: Vec<ExpressionOrSpread>,
}

/// `MemberExpression`.
#[derive(Clone, Debug, Deserialize)]
pub struct MemberExpression {
    #[serde(flatten)]
    pub span: Span,
    pub object: Expression,
    pub property: Expression,
    #[serde(default)]
    pub computed: bool,
    #[serde(default)]
    pub optional: bool,
}

/// `ChainExpression`, the boundary of an optional chain.
#[derive(Clone, Debug, Deserialize)]
pub struct ChainExpression {
    #[serde(flatten)]
    pub span: Span,
    pub expression: Expression,
}

/// `SequenceExpression`.
#[derive(Clone, Debug, Deserialize)]
pub struct SequenceExpression {
    #[serde(flatten)]
    pub span: Span,
    pub expressions: Vec<Expression>,
}

/// `TSAsExpression` / `TSNonNullExpression`. The type part is dropped.
#[derive(Clone, Debug, Deserialize)]
pub struct TypeAssertion {
    #[serde(flatten)]
    pub span: Span,
    pub expression: Expression,
}
