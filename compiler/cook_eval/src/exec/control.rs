//! Statement execution.
//!
//! Every statement yields a [`Completion`]. `break` and `continue` are
//! unlabeled, so loops and `switch` consume them directly.

use std::rc::Rc;

use cook_ir::{
    declaration_bound_names, ensure_sufficient_stack, BlockStatement, CatchClause,
    ForInOfStatement, ForInit, ForLeft, ForStatement, Function, Span, Statement, SwitchStatement,
    TryStatement, VariableDeclaration, VariableKind,
};
use cook_precook::{StaticScope, VarKind};

use super::BindMode;
use crate::environment::Environment;
use crate::errors::{self, EvalError, EvalResult};
use crate::interpreter::{Completion, Interpreter};
use crate::value::{ObjectKind, Value};

impl Interpreter {
    pub(crate) fn exec_statement(
        &mut self,
        stmt: &Statement,
        env: &Environment,
    ) -> EvalResult<Completion> {
        ensure_sufficient_stack(|| self.exec_statement_inner(stmt, env))
    }

    fn exec_statement_inner(
        &mut self,
        stmt: &Statement,
        env: &Environment,
    ) -> EvalResult<Completion> {
        match stmt {
            Statement::Block(block) => self.exec_block(block, env),
            Statement::Empty(_) => Ok(Completion::Normal),
            Statement::Expression(node) => {
                self.eval_expr(&node.expression, env)?;
                Ok(Completion::Normal)
            }
            Statement::If(node) => {
                if self.eval_expr(&node.test, env)?.to_boolean() {
                    self.exec_statement(&node.consequent, env)
                } else if let Some(alternate) = &node.alternate {
                    self.exec_statement(alternate, env)
                } else {
                    Ok(Completion::Normal)
                }
            }
            Statement::For(node) => self.exec_for(node, env),
            Statement::ForIn(node) => self.exec_for_in_of(node, env, false),
            Statement::ForOf(node) => self.exec_for_in_of(node, env, true),
            Statement::Break(_) => Ok(Completion::Break),
            Statement::Continue(_) => Ok(Completion::Continue),
            Statement::Return(node) => {
                let value = match &node.argument {
                    Some(argument) => self.eval_expr(argument, env)?,
                    None => Value::Undefined,
                };
                Ok(Completion::Return(value))
            }
            Statement::Throw(node) => {
                let value = self.eval_expr(&node.argument, env)?;
                Err(self.locate(EvalError::thrown(value), node.span))
            }
            Statement::Try(node) => self.exec_try(node, env),
            Statement::Switch(node) => self.exec_switch(node, env),
            Statement::VariableDeclaration(decl) => {
                self.exec_variable_declaration(decl, env)?;
                Ok(Completion::Normal)
            }
            Statement::FunctionDeclaration(func) => {
                self.exec_function_declaration(func, env)?;
                Ok(Completion::Normal)
            }
            Statement::While(node)
            | Statement::DoWhile(node)
            | Statement::Labeled(node)
            | Statement::Class(node)
            | Statement::Debugger(node)
            | Statement::With(node) => {
                let kind = stmt.unsupported_kind().unwrap_or("Statement");
                let err = errors::unsupported_node(kind, &self.snippet(node.span));
                Err(self.locate(err, node.span))
            }
        }
    }

    /// Create the bindings of a block-like scope in `env`: lexical names in
    /// their dead zone, block-level functions initialized.
    fn instantiate_block(&mut self, scope: &StaticScope, env: &Environment) -> EvalResult<()> {
        for decl in scope.declarations() {
            let name = decl.name.as_str();
            let created = if decl.kind.contains(VarKind::CONST) {
                env.create_immutable_binding(name, true)
            } else {
                env.create_mutable_binding(name)
            };
            created.map_err(|err| self.binding_error(err, name, Span::default()))?;
        }
        for func in &scope.hoisted_functions {
            let closure = self.make_closure(func, env);
            if let Some(name) = func.name() {
                env.initialize_binding(name, closure)
                    .map_err(|err| self.binding_error(err, name, func.span))?;
            }
        }
        Ok(())
    }

    /// The environment for a node's recorded scope, or `env` itself when
    /// the node declares nothing.
    fn scoped_env<T: 'static>(&mut self, node: &T, env: &Environment) -> EvalResult<Environment> {
        let scopes = Rc::clone(&self.program.scopes);
        match scopes.get(node) {
            Some(scope) => {
                let inner = env.child();
                self.instantiate_block(&scope, &inner)?;
                Ok(inner)
            }
            None => Ok(env.clone()),
        }
    }

    fn exec_statements(&mut self, body: &[Statement], env: &Environment) -> EvalResult<Completion> {
        for stmt in body {
            match self.exec_statement(stmt, env)? {
                Completion::Normal => {}
                abrupt => return Ok(abrupt),
            }
        }
        Ok(Completion::Normal)
    }

    fn exec_block(&mut self, block: &BlockStatement, env: &Environment) -> EvalResult<Completion> {
        let env = self.scoped_env(block, env)?;
        self.exec_statements(&block.body, &env)
    }

    fn exec_for(&mut self, node: &ForStatement, env: &Environment) -> EvalResult<Completion> {
        let loop_env = self.scoped_env(node, env)?;
        let per_iteration: Vec<&str> = match &node.init {
            Some(ForInit::Declaration(decl)) if decl.kind == VariableKind::Let => {
                declaration_bound_names(decl)
            }
            _ => Vec::new(),
        };
        match &node.init {
            Some(ForInit::Declaration(decl)) => self.exec_variable_declaration(decl, &loop_env)?,
            Some(ForInit::Expression(expr)) => {
                self.eval_expr(expr, &loop_env)?;
            }
            None => {}
        }

        let copy = |env: &Environment| {
            if per_iteration.is_empty() {
                env.clone()
            } else {
                env.copy_for_iteration(per_iteration.iter().copied())
            }
        };
        let mut iteration_env = copy(&loop_env);
        loop {
            if let Some(test) = &node.test {
                if !self.eval_expr(test, &iteration_env)?.to_boolean() {
                    break;
                }
            }
            match self.exec_statement(&node.body, &iteration_env)? {
                Completion::Break => break,
                Completion::Return(value) => return Ok(Completion::Return(value)),
                Completion::Normal | Completion::Continue => {}
            }
            iteration_env = copy(&iteration_env);
            if let Some(update) = &node.update {
                self.eval_expr(update, &iteration_env)?;
            }
        }
        Ok(Completion::Normal)
    }

    fn exec_for_in_of(
        &mut self,
        node: &ForInOfStatement,
        env: &Environment,
        of: bool,
    ) -> EvalResult<Completion> {
        let scopes = Rc::clone(&self.program.scopes);
        let scope = scopes.get(node);

        // The head's names are in their dead zone while `right` runs.
        let right_env = match &scope {
            Some(scope) => {
                let tdz = env.child();
                for decl in scope.declarations() {
                    // Declaration names of one scope are unique, and `tdz` is fresh.
                    let _ = tdz.create_mutable_binding(&decl.name);
                }
                tdz
            }
            None => env.clone(),
        };
        let right = self.eval_expr(&node.right, &right_env)?;

        if !of {
            let keys = Self::own_keys(&right);
            for key in keys {
                match self.for_in_of_iteration(node, scope.as_deref(), env, Value::String(key))? {
                    Completion::Break => break,
                    Completion::Return(value) => return Ok(Completion::Return(value)),
                    Completion::Normal | Completion::Continue => {}
                }
            }
            return Ok(Completion::Normal);
        }

        // Arrays are read live, so pushes during the loop are visited.
        if let Some(array) = right.as_object().filter(|obj| obj.is_array()) {
            let mut index = 0;
            loop {
                let item = match &array.borrow().kind {
                    ObjectKind::Array(items) => items.get(index).cloned(),
                    _ => None,
                };
                let Some(item) = item else { break };
                index += 1;
                match self.for_in_of_iteration(node, scope.as_deref(), env, item)? {
                    Completion::Break => break,
                    Completion::Return(value) => return Ok(Completion::Return(value)),
                    Completion::Normal | Completion::Continue => {}
                }
            }
            return Ok(Completion::Normal);
        }

        for item in self.iterate_at(&right, node.right.span())? {
            match self.for_in_of_iteration(node, scope.as_deref(), env, item)? {
                Completion::Break => break,
                Completion::Return(value) => return Ok(Completion::Return(value)),
                Completion::Normal | Completion::Continue => {}
            }
        }
        Ok(Completion::Normal)
    }

    /// Bind the head of a `for-in/of` to `item` and run the body once.
    fn for_in_of_iteration(
        &mut self,
        node: &ForInOfStatement,
        scope: Option<&StaticScope>,
        env: &Environment,
        item: Value,
    ) -> EvalResult<Completion> {
        let body_env = match &node.left {
            ForLeft::Declaration(decl) if decl.kind != VariableKind::Var => {
                let iteration = env.child();
                if let Some(scope) = scope {
                    self.instantiate_block(scope, &iteration)?;
                }
                if let Some(declarator) = decl.declarations.first() {
                    self.bind_pattern(&declarator.id, item, &iteration, BindMode::Initialize)?;
                }
                iteration
            }
            ForLeft::Declaration(decl) => {
                if self.rules().no_var {
                    let err = errors::var_not_allowed(&self.snippet(decl.span));
                    return Err(self.locate(err, decl.span));
                }
                if let Some(declarator) = decl.declarations.first() {
                    self.bind_pattern(&declarator.id, item, env, BindMode::Assign)?;
                }
                env.clone()
            }
            ForLeft::Pattern(pattern) => {
                self.bind_pattern(pattern, item, env, BindMode::Assign)?;
                env.clone()
            }
        };
        self.exec_statement(&node.body, &body_env)
    }

    fn exec_try(&mut self, node: &TryStatement, env: &Environment) -> EvalResult<Completion> {
        let result = match (self.exec_block(&node.block, env), &node.handler) {
            (Err(err), Some(handler)) => self.exec_catch(handler, err, env),
            (result, _) => result,
        };
        if let Some(finalizer) = &node.finalizer {
            match self.exec_block(finalizer, env)? {
                Completion::Normal => {}
                abrupt => return Ok(abrupt),
            }
        }
        result
    }

    fn exec_catch(
        &mut self,
        handler: &CatchClause,
        error: EvalError,
        env: &Environment,
    ) -> EvalResult<Completion> {
        tracing::trace!(error = %error, "caught");
        let catch_env = self.scoped_env(handler, env)?;
        if let Some(param) = &handler.param {
            self.bind_pattern(param, error.into_value(), &catch_env, BindMode::Initialize)?;
        }
        self.exec_block(&handler.body, &catch_env)
    }

    fn exec_switch(&mut self, node: &SwitchStatement, env: &Environment) -> EvalResult<Completion> {
        let discriminant = self.eval_expr(&node.discriminant, env)?;
        let switch_env = self.scoped_env(node, env)?;

        let mut start = None;
        for (i, case) in node.cases.iter().enumerate() {
            if let Some(test) = &case.test {
                if self.eval_expr(test, &switch_env)?.strict_equals(&discriminant) {
                    start = Some(i);
                    break;
                }
            }
        }
        let start = start.or_else(|| node.cases.iter().position(|case| case.test.is_none()));
        let Some(start) = start else {
            return Ok(Completion::Normal);
        };
        for case in &node.cases[start..] {
            match self.exec_statements(&case.consequent, &switch_env)? {
                Completion::Normal => {}
                Completion::Break => return Ok(Completion::Normal),
                abrupt => return Ok(abrupt),
            }
        }
        Ok(Completion::Normal)
    }

    pub(crate) fn exec_variable_declaration(
        &mut self,
        decl: &VariableDeclaration,
        env: &Environment,
    ) -> EvalResult<()> {
        if decl.kind == VariableKind::Var {
            if self.rules().no_var {
                let err = errors::var_not_allowed(&self.snippet(decl.span));
                return Err(self.locate(err, decl.span));
            }
            for declarator in &decl.declarations {
                if let Some(init) = &declarator.init {
                    let value = self.eval_expr(init, env)?;
                    self.bind_pattern(&declarator.id, value, env, BindMode::Assign)?;
                }
            }
            return Ok(());
        }
        for declarator in &decl.declarations {
            let value = match &declarator.init {
                Some(init) => self.eval_expr(init, env)?,
                None => Value::Undefined,
            };
            self.bind_pattern(&declarator.id, value, env, BindMode::Initialize)?;
        }
        Ok(())
    }

    /// Function declarations are instantiated at scope entry. Running one
    /// only matters for block-level functions that also update the
    /// enclosing function's binding.
    fn exec_function_declaration(&mut self, func: &Function, env: &Environment) -> EvalResult<()> {
        let Some(name) = func.name() else {
            return Ok(());
        };
        if !self.program.scopes.is_annex_b(func) {
            return Ok(());
        }
        let Some(block) = env.resolve(name) else {
            return Ok(());
        };
        let value = block
            .get_binding_value(name)
            .map_err(|err| self.binding_error(err, name, func.span))?;
        if let Some(target) = block.parent().and_then(|outer| outer.resolve(name)) {
            target
                .set_mutable_binding(name, value, false)
                .map_err(|err| self.binding_error(err, name, func.span))?;
        }
        Ok(())
    }
}
