use serde::Deserialize;
use std::rc::Rc;

use super::{Expression, Function, Identifier, Pattern, Unsupported, VariableKind};
use crate::Span;

/// Statement nodes.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type")]
pub enum Statement {
    #[serde(rename = "BlockStatement")]
    Block(BlockStatement),
    #[serde(rename = "EmptyStatement")]
    Empty(EmptyStatement),
    #[serde(rename = "ExpressionStatement")]
    Expression(Box<ExpressionStatement>),
    #[serde(rename = "IfStatement")]
    If(Box<IfStatement>),
    #[serde(rename = "ForStatement")]
    For(Box<ForStatement>),
    #[serde(rename = "ForInStatement")]
    ForIn(Box<ForInOfStatement>),
    #[serde(rename = "ForOfStatement")]
    ForOf(Box<ForInOfStatement>),
    #[serde(rename = "BreakStatement")]
    Break(BreakStatement),
    #[serde(rename = "ContinueStatement")]
    Continue(ContinueStatement),
    #[serde(rename = "ReturnStatement")]
    Return(Box<ReturnStatement>),
    #[serde(rename = "ThrowStatement")]
    Throw(Box<ThrowStatement>),
    #[serde(rename = "TryStatement")]
    Try(Box<TryStatement>),
    #[serde(rename = "SwitchStatement")]
    Switch(Box<SwitchStatement>),
    VariableDeclaration(VariableDeclaration),
    FunctionDeclaration(Rc<Function>),

    // Recognized, always rejected.
    #[serde(rename = "WhileStatement")]
    While(Unsupported),
    #[serde(rename = "DoWhileStatement")]
    DoWhile(Unsupported),
    #[serde(rename = "LabeledStatement")]
    Labeled(Unsupported),
    #[serde(rename = "ClassDeclaration")]
    Class(Unsupported),
    #[serde(rename = "DebuggerStatement")]
    Debugger(Unsupported),
    #[serde(rename = "WithStatement")]
    With(Unsupported),
}

impl Statement {
    pub fn span(&self) -> Span {
        match self {
            Statement::Block(node) => node.span,
            Statement::Empty(node) => node.span,
            Statement::Expression(node) => node.span,
            Statement::If(node) => node.span,
            Statement::For(node) => node.span,
            Statement::ForIn(node) | Statement::ForOf(node) => node.span,
            Statement::Break(node) => node.span,
            Statement::Continue(node) => node.span,
            Statement::Return(node) => node.span,
            Statement::Throw(node) => node.span,
            Statement::Try(node) => node.span,
            Statement::Switch(node) => node.span,
            Statement::VariableDeclaration(node) => node.span,
            Statement::FunctionDeclaration(node) => node.span,
            Statement::While(node)
            | Statement::DoWhile(node)
            | Statement::Labeled(node)
            | Statement::Class(node)
            | Statement::Debugger(node)
            | Statement::With(node) => node.span,
        }
    }

    /// ESTree name of a rejected node kind, `None` for supported kinds.
    pub fn unsupported_kind(&self) -> Option<&'static str> {
        Some(match self {
            Statement::While(_) => "WhileStatement",
            Statement::DoWhile(_) => "DoWhileStatement",
            Statement::Labeled(_) => "LabeledStatement",
            Statement::Class(_) => "ClassDeclaration",
            Statement::Debugger(_) => "DebuggerStatement",
            Statement::With(_) => "WithStatement",
            _ => return None,
        })
    }
}

/// `BlockStatement`.
#[derive(Clone, Debug, Deserialize)]
pub struct BlockStatement {
    #[serde(flatten)]
    pub span: Span,
    pub body: Vec<Statement>,
}

/// `EmptyStatement`.
#[derive(Copy, Clone, Debug, Deserialize)]
pub struct EmptyStatement {
    #[serde(flatten)]
    pub span: Span,
}

/// `ExpressionStatement`.
#[derive(Clone, Debug, Deserialize)]
pub struct ExpressionStatement {
    #[serde(flatten)]
    pub span: Span,
    pub expression: Expression,
    /// Set for directive prologue entries such as `"use strict"`.
    #[serde(default)]
    pub directive: Option<String>,
}

/// `IfStatement`.
#[derive(Clone, Debug, Deserialize)]
pub struct IfStatement {
    #[serde(flatten)]
    pub span: Span,
    pub test: Expression,
    pub consequent: Statement,
    #[serde(default)]
    pub alternate: Option<Statement>,
}

/// `init` of a `for` statement.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type")]
pub enum ForInit {
    #[serde(rename = "VariableDeclaration")]
    Declaration(VariableDeclaration),
    #[serde(untagged)]
    Expression(Expression),
}

/// `ForStatement`.
#[derive(Clone, Debug, Deserialize)]
pub struct ForStatement {
    #[serde(flatten)]
    pub span: Span,
    #[serde(default)]
    pub init: Option<ForInit>,
    #[serde(default)]
    pub test: Option<Expression>,
    #[serde(default)]
    pub update: Option<Expression>,
    pub body: Statement,
}

/// `left` of a `for-in` / `for-of` statement.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type")]
pub enum ForLeft {
    #[serde(rename = "VariableDeclaration")]
    Declaration(VariableDeclaration),
    #[serde(untagged)]
    Pattern(Pattern),
}

/// `ForInStatement` and `ForOfStatement`.
#[derive(Clone, Debug, Deserialize)]
pub struct ForInOfStatement {
    #[serde(flatten)]
    pub span: Span,
    pub left: ForLeft,
    pub right: Expression,
    pub body: Statement,
    #[serde(default, rename = "await")]
    pub is_await: bool,
}

/// `BreakStatement`.
#[derive(Clone, Debug, Deserialize)]
pub struct BreakStatement {
    #[serde(flatten)]
    pub span: Span,
    #[serde(default)]
    pub label: Option<Identifier>,
}

/// `ContinueStatement`.
#[derive(Clone, Debug, Deserialize)]
pub struct ContinueStatement {
    #[serde(flatten)]
    pub span: Span,
    #[serde(default)]
    pub label: Option<Identifier>,
}

/// `ReturnStatement`.
#[derive(Clone, Debug, Deserialize)]
pub struct ReturnStatement {
    #[serde(flatten)]
    pub span: Span,
    #[serde(default)]
    pub argument: Option<Expression>,
}

/// `ThrowStatement`.
#[derive(Clone, Debug, Deserialize)]
pub struct ThrowStatement {
    #[serde(flatten)]
    pub span: Span,
    pub argument: Expression,
}

/// `TryStatement`.
#[derive(Clone, Debug, Deserialize)]
pub struct TryStatement {
    #[serde(flatten)]
    pub span: Span,
    pub block: BlockStatement,
    #[serde(default)]
    pub handler: Option<CatchClause>,
    #[serde(default)]
    pub finalizer: Option<BlockStatement>,
}

/// `CatchClause`. `param` is `None` for `catch { ... }`.
#[derive(Clone, Debug, Deserialize)]
pub struct CatchClause {
    #[serde(flatten)]
    pub span: Span,
    #[serde(default)]
    pub param: Option<Pattern>,
    pub body: BlockStatement,
}

/// `SwitchStatement`.
#[derive(Clone, Debug, Deserialize)]
pub struct SwitchStatement {
    #[serde(flatten)]
    pub span: Span,
    pub discriminant: Expression,
    pub cases: Vec<SwitchCase>,
}

/// `SwitchCase`. `test` is `None` for `default:`.
#[derive(Clone, Debug, Deserialize)]
pub struct SwitchCase {
    #[serde(flatten)]
    pub span: Span,
    #[serde(default)]
    pub test: Option<Expression>,
    pub consequent: Vec<Statement>,
}

/// `VariableDeclaration`.
#[derive(Clone, Debug, Deserialize)]
pub struct VariableDeclaration {
    #[serde(flatten)]
    pub span: Span,
    pub kind: VariableKind,
    pub declarations: Vec<VariableDeclarator>,
}

/// `VariableDeclarator`.
#[derive(Clone, Debug, Deserialize)]
pub struct VariableDeclarator {
    #[serde(flatten)]
    pub span: Span,
    pub id: Pattern,
    #[serde(default)]
    pub init: Option<Expression>,
}
