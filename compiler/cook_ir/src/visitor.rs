//! Declaration collectors shared by both passes.
//!
//! These walk statement lists without descending into nested function
//! bodies, mirroring the static-semantics rules `BoundNames`,
//! `VarScopedDeclarations` and `LexicallyScopedDeclarations`.

use std::rc::Rc;

use crate::ast::{
    ForInit, ForLeft, Function, Pattern, PatternProperty, Statement, VariableDeclaration,
    VariableKind,
};

/// Push every name bound by `pattern` onto `names`, in source order.
///
/// Member targets bind nothing.
pub fn collect_bound_names<'a>(pattern: &'a Pattern, names: &mut Vec<&'a str>) {
    match pattern {
        Pattern::Identifier(id) => names.push(&id.name),
        Pattern::Object(object) => {
            for prop in &object.properties {
                match prop {
                    PatternProperty::Property(prop) => collect_bound_names(&prop.value, names),
                    PatternProperty::Rest(rest) => collect_bound_names(&rest.argument, names),
                }
            }
        }
        Pattern::Array(array) => {
            for element in array.elements.iter().flatten() {
                collect_bound_names(element, names);
            }
        }
        Pattern::Assignment(assign) => collect_bound_names(&assign.left, names),
        Pattern::Rest(rest) => collect_bound_names(&rest.argument, names),
        Pattern::Member(_) => {}
    }
}

/// Names bound by all declarators of `decl`.
pub fn declaration_bound_names(decl: &VariableDeclaration) -> Vec<&str> {
    let mut names = Vec::new();
    for declarator in &decl.declarations {
        collect_bound_names(&declarator.id, &mut names);
    }
    names
}

/// Whether any parameter carries an expression (a default value or a
/// computed key) that runs during binding.
pub fn contains_expression(pattern: &Pattern) -> bool {
    match pattern {
        Pattern::Identifier(_) | Pattern::Member(_) => false,
        Pattern::Assignment(_) => true,
        Pattern::Object(object) => object.properties.iter().any(|prop| match prop {
            PatternProperty::Property(prop) => prop.computed || contains_expression(&prop.value),
            PatternProperty::Rest(rest) => contains_expression(&rest.argument),
        }),
        Pattern::Array(array) => array.elements.iter().flatten().any(contains_expression),
        Pattern::Rest(rest) => contains_expression(&rest.argument),
    }
}

/// `var` declarations of a function body, through nested blocks, loops,
/// `switch`, `try` and `catch`, but not into nested functions.
pub fn var_declarations(body: &[Statement]) -> Vec<&VariableDeclaration> {
    let mut out = Vec::new();
    for stmt in body {
        collect_vars(stmt, &mut out);
    }
    out
}

fn collect_vars<'a>(stmt: &'a Statement, out: &mut Vec<&'a VariableDeclaration>) {
    match stmt {
        Statement::VariableDeclaration(decl) => {
            if decl.kind == VariableKind::Var {
                out.push(decl);
            }
        }
        Statement::Block(block) => {
            for stmt in &block.body {
                collect_vars(stmt, out);
            }
        }
        Statement::If(node) => {
            collect_vars(&node.consequent, out);
            if let Some(alternate) = &node.alternate {
                collect_vars(alternate, out);
            }
        }
        Statement::For(node) => {
            if let Some(ForInit::Declaration(decl)) = &node.init {
                if decl.kind == VariableKind::Var {
                    out.push(decl);
                }
            }
            collect_vars(&node.body, out);
        }
        Statement::ForIn(node) | Statement::ForOf(node) => {
            if let ForLeft::Declaration(decl) = &node.left {
                if decl.kind == VariableKind::Var {
                    out.push(decl);
                }
            }
            collect_vars(&node.body, out);
        }
        Statement::Switch(node) => {
            for case in &node.cases {
                for stmt in &case.consequent {
                    collect_vars(stmt, out);
                }
            }
        }
        Statement::Try(node) => {
            for stmt in &node.block.body {
                collect_vars(stmt, out);
            }
            if let Some(handler) = &node.handler {
                for stmt in &handler.body.body {
                    collect_vars(stmt, out);
                }
            }
            if let Some(finalizer) = &node.finalizer {
                for stmt in &finalizer.body {
                    collect_vars(stmt, out);
                }
            }
        }
        Statement::Empty(_)
        | Statement::Expression(_)
        | Statement::Break(_)
        | Statement::Continue(_)
        | Statement::Return(_)
        | Statement::Throw(_)
        | Statement::FunctionDeclaration(_)
        | Statement::While(_)
        | Statement::DoWhile(_)
        | Statement::Labeled(_)
        | Statement::Class(_)
        | Statement::Debugger(_)
        | Statement::With(_) => {}
    }
}

/// `let`/`const` declarations directly inside a statement list.
pub fn lexical_declarations(body: &[Statement]) -> impl Iterator<Item = &VariableDeclaration> {
    body.iter().filter_map(|stmt| match stmt {
        Statement::VariableDeclaration(decl) if decl.kind != VariableKind::Var => Some(decl),
        _ => None,
    })
}

/// Function declarations directly inside a statement list.
pub fn function_declarations(body: &[Statement]) -> impl Iterator<Item = &Rc<Function>> {
    body.iter().filter_map(|stmt| match stmt {
        Statement::FunctionDeclaration(func) => Some(func),
        _ => None,
    })
}
