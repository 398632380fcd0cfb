//! Reading parser output.
//!
//! Parsers hand over either the node to run or a whole `Program`. A
//! `Program` must hold exactly the one statement that is meant.

use std::rc::Rc;

use cook_ir::{Expression, Function, Statement};
use serde::Deserialize;

use crate::CookError;

#[derive(Deserialize)]
struct NodeType {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Deserialize)]
struct Program {
    body: Vec<Statement>,
}

fn node_type(json: &str) -> Result<String, CookError> {
    Ok(cook_ir::from_json::<NodeType>(json)?.kind)
}

fn single_statement(json: &str, expected: &'static str) -> Result<Statement, CookError> {
    let mut program: Program = cook_ir::from_json(json)?;
    if program.body.len() != 1 {
        return Err(CookError::UnexpectedRoot {
            expected,
            found: format!("a program of {} statements", program.body.len()),
        });
    }
    Ok(program.body.remove(0))
}

/// Read a bare expression from an expression node, an `ExpressionStatement`
/// or a single-statement `Program`.
pub fn read_expression(json: &str) -> Result<Rc<Expression>, CookError> {
    let statement = match node_type(json)?.as_str() {
        "Program" => single_statement(json, "an expression")?,
        "ExpressionStatement" => cook_ir::from_json(json)?,
        _ => return Ok(Rc::new(cook_ir::from_json(json)?)),
    };
    match statement {
        Statement::Expression(statement) => Ok(Rc::new(statement.expression)),
        other => Err(CookError::UnexpectedRoot {
            expected: "an expression",
            found: statement_kind(&other).to_string(),
        }),
    }
}

/// Read a function from a `FunctionDeclaration`, a function or arrow
/// expression, or a single-statement `Program` holding one of those.
pub fn read_function(json: &str) -> Result<Rc<Function>, CookError> {
    let statement = match node_type(json)?.as_str() {
        "Program" => single_statement(json, "a function")?,
        "FunctionDeclaration" | "ExpressionStatement" => cook_ir::from_json(json)?,
        _ => {
            let expression: Expression = cook_ir::from_json(json)?;
            return function_of(&expression);
        }
    };
    match statement {
        Statement::FunctionDeclaration(function) => Ok(function),
        Statement::Expression(statement) => function_of(&statement.expression),
        other => Err(CookError::UnexpectedRoot {
            expected: "a function",
            found: statement_kind(&other).to_string(),
        }),
    }
}

fn function_of(expression: &Expression) -> Result<Rc<Function>, CookError> {
    match expression {
        Expression::Function(function) | Expression::Arrow(function) => Ok(Rc::clone(function)),
        _ => Err(CookError::UnexpectedRoot {
            expected: "a function",
            found: "an expression".to_string(),
        }),
    }
}

fn statement_kind(statement: &Statement) -> &'static str {
    match statement {
        Statement::Block(_) => "a block statement",
        Statement::Empty(_) => "an empty statement",
        Statement::Expression(_) => "an expression statement",
        Statement::If(_) => "an if statement",
        Statement::For(_) | Statement::ForIn(_) | Statement::ForOf(_) => "a for statement",
        Statement::Break(_) | Statement::Continue(_) => "a jump statement",
        Statement::Return(_) => "a return statement",
        Statement::Throw(_) => "a throw statement",
        Statement::Try(_) => "a try statement",
        Statement::Switch(_) => "a switch statement",
        Statement::VariableDeclaration(_) => "a variable declaration",
        Statement::FunctionDeclaration(_) => "a function declaration",
        Statement::While(_)
        | Statement::DoWhile(_)
        | Statement::Labeled(_)
        | Statement::Class(_)
        | Statement::Debugger(_)
        | Statement::With(_) => "an unsupported statement",
    }
}
