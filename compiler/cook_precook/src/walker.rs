//! The pre-analysis walker.
//!
//! One pass over the tree. At every function boundary the declarations of
//! the whole body (hoisted `var`s, top-level function declarations, lexical
//! declarations) are collected up front, so references that textually
//! precede a declaration still resolve to it. Blocks do the same for their
//! own lexical declarations. Any identifier reference that resolves to no
//! enclosing declaration is a free variable.

use std::collections::BTreeSet;
use std::rc::Rc;

use cook_ir::visitor::{
    contains_expression, declaration_bound_names, function_declarations, lexical_declarations,
    var_declarations,
};
use cook_ir::{
    collect_bound_names, ensure_sufficient_stack, ArrowBody, BlockStatement, Expression,
    ExpressionOrSpread, ForInit, ForLeft, Function, Literal, MemberExpression, NodeKey,
    ObjectMember, Pattern, PatternProperty, PropertyKind, Statement, VariableDeclaration,
    VariableKind,
};

use crate::errors;
use crate::scope::{ScopeKind, ScopeMap, StaticScope, VarKind};
use crate::{PrecookError, PrecookOptions};

type WalkResult = Result<(), PrecookError>;

/// Syntactic role of a function node.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum FunctionKind {
    Declaration,
    Expression,
    Arrow,
}

pub(crate) struct Walker<'a> {
    source: &'a str,
    options: PrecookOptions,
    /// Bare-expression dialect: no `function` expressions, no block arrows.
    expression_only: bool,
    frames: Vec<StaticScope>,
    scopes: ScopeMap,
    free_variables: BTreeSet<String>,
}

impl<'a> Walker<'a> {
    pub(crate) fn new(source: &'a str, options: PrecookOptions, expression_only: bool) -> Self {
        Walker {
            source,
            options,
            expression_only,
            frames: Vec::new(),
            scopes: ScopeMap::default(),
            free_variables: BTreeSet::new(),
        }
    }

    pub(crate) fn finish(self) -> (ScopeMap, BTreeSet<String>) {
        (self.scopes, self.free_variables)
    }

    /// Walk a root function. A named root can refer to itself.
    pub(crate) fn root_function(&mut self, func: &Rc<Function>) -> WalkResult {
        let mut root = StaticScope::new(ScopeKind::Block);
        if let Some(name) = func.name() {
            root.declare(name, VarKind::FUNCTION);
        }
        self.frames.push(root);
        self.function(func, FunctionKind::Declaration)?;
        self.frames.pop();
        Ok(())
    }

    fn reference(&mut self, name: &str) {
        let declared = self
            .frames
            .iter()
            .rev()
            .any(|frame| frame.lookup(name).is_some());
        if !declared {
            self.free_variables.insert(name.to_string());
        }
    }

    /// Push `scope` for the duration of `walk` and record it under `key`.
    /// Scopes that declare nothing are neither pushed nor recorded.
    fn with_scope(
        &mut self,
        key: NodeKey,
        scope: StaticScope,
        walk: impl FnOnce(&mut Self) -> WalkResult,
    ) -> WalkResult {
        if scope.is_empty() {
            return walk(self);
        }
        self.frames.push(scope);
        walk(self)?;
        if let Some(scope) = self.frames.pop() {
            self.scopes.insert(key, scope);
        }
        Ok(())
    }

    // Functions

    fn function(&mut self, func: &Rc<Function>, kind: FunctionKind) -> WalkResult {
        if func.is_async {
            return Err(errors::async_function(self.source, func.span));
        }
        if func.generator {
            return Err(errors::generator_function(self.source, func.span));
        }
        if self.expression_only {
            match kind {
                FunctionKind::Expression => {
                    return Err(errors::unsupported_node(
                        "FunctionExpression",
                        self.source,
                        func.span,
                    ));
                }
                FunctionKind::Arrow if matches!(func.body, ArrowBody::Block(_)) => {
                    return Err(errors::block_arrow_body(self.source, func.span));
                }
                _ => {}
            }
        }

        let scope = function_scope(func);
        let self_name = match (kind, func.name()) {
            (FunctionKind::Expression, Some(name)) => {
                let mut frame = StaticScope::new(ScopeKind::Block);
                frame.declare(name, VarKind::CONST | VarKind::FUNCTION);
                Some(frame)
            }
            _ => None,
        };
        let has_self_name = self_name.is_some();
        if let Some(frame) = self_name {
            self.frames.push(frame);
        }
        self.frames.push(scope);

        for param in &func.params {
            self.pattern(param, true)?;
        }
        match &func.body {
            ArrowBody::Block(block) => self.statements(&block.body)?,
            ArrowBody::Expression(expr) => self.expression(expr)?,
        }

        if let Some(scope) = self.frames.pop() {
            self.scopes.insert(NodeKey::of(&**func), scope);
        }
        if has_self_name {
            self.frames.pop();
        }
        Ok(())
    }

    /// Whether a block-level declaration of `name` should also update the
    /// enclosing function's binding: the function declares `name` with `var`
    /// or as a top-level function, and no block in between shadows it.
    fn annex_b_applies(&self, name: &str) -> bool {
        let Some((_, outer)) = self.frames.split_last() else {
            return false;
        };
        for frame in outer.iter().rev() {
            let declared = frame.lookup(name);
            match frame.kind {
                ScopeKind::Block if declared.is_some() => return false,
                ScopeKind::Block => {}
                ScopeKind::Function => {
                    return declared
                        .is_some_and(|kind| kind.intersects(VarKind::VAR | VarKind::FUNCTION));
                }
            }
        }
        false
    }

    // Statements

    fn statements(&mut self, body: &[Statement]) -> WalkResult {
        for stmt in body {
            self.statement(stmt)?;
        }
        Ok(())
    }

    /// A statement in a position where declarations are not allowed.
    fn substatement(&mut self, stmt: &Statement) -> WalkResult {
        if let Statement::FunctionDeclaration(func) = stmt {
            return Err(errors::unsupported_node(
                "FunctionDeclaration",
                self.source,
                func.span,
            ));
        }
        self.statement(stmt)
    }

    fn block(&mut self, block: &BlockStatement) -> WalkResult {
        let scope = block_scope(&block.body);
        self.with_scope(NodeKey::of(block), scope, |this| {
            this.statements(&block.body)
        })
    }

    fn statement(&mut self, stmt: &Statement) -> WalkResult {
        ensure_sufficient_stack(|| self.statement_inner(stmt))
    }

    fn statement_inner(&mut self, stmt: &Statement) -> WalkResult {
        match stmt {
            Statement::Block(block) => self.block(block),
            Statement::Empty(_) => Ok(()),
            Statement::Expression(node) => self.expression(&node.expression),
            Statement::If(node) => {
                self.expression(&node.test)?;
                self.substatement(&node.consequent)?;
                if let Some(alternate) = &node.alternate {
                    self.substatement(alternate)?;
                }
                Ok(())
            }
            Statement::For(node) => {
                let mut scope = StaticScope::new(ScopeKind::Block);
                if let Some(ForInit::Declaration(decl)) = &node.init {
                    declare_lexical(&mut scope, decl);
                }
                self.with_scope(NodeKey::of(&**node), scope, |this| {
                    match &node.init {
                        Some(ForInit::Declaration(decl)) => this.variable_declaration(decl)?,
                        Some(ForInit::Expression(expr)) => this.expression(expr)?,
                        None => {}
                    }
                    if let Some(test) = &node.test {
                        this.expression(test)?;
                    }
                    this.substatement(&node.body)?;
                    if let Some(update) = &node.update {
                        this.expression(update)?;
                    }
                    Ok(())
                })
            }
            Statement::ForIn(node) | Statement::ForOf(node) => {
                if node.is_await {
                    return Err(errors::for_await(self.source, node.span));
                }
                let mut scope = StaticScope::new(ScopeKind::Block);
                if let ForLeft::Declaration(decl) = &node.left {
                    declare_lexical(&mut scope, decl);
                }
                self.with_scope(NodeKey::of(&**node), scope, |this| {
                    this.expression(&node.right)?;
                    match &node.left {
                        ForLeft::Declaration(decl) => this.variable_declaration(decl)?,
                        ForLeft::Pattern(pattern) => this.pattern(pattern, false)?,
                    }
                    this.substatement(&node.body)
                })
            }
            Statement::Break(node) => match &node.label {
                Some(_) => Err(errors::labeled_jump("break", self.source, node.span)),
                None => Ok(()),
            },
            Statement::Continue(node) => match &node.label {
                Some(_) => Err(errors::labeled_jump("continue", self.source, node.span)),
                None => Ok(()),
            },
            Statement::Return(node) => match &node.argument {
                Some(argument) => self.expression(argument),
                None => Ok(()),
            },
            Statement::Throw(node) => self.expression(&node.argument),
            Statement::Try(node) => {
                self.block(&node.block)?;
                if let Some(handler) = &node.handler {
                    let mut scope = StaticScope::new(ScopeKind::Block);
                    if let Some(param) = &handler.param {
                        let mut names = Vec::new();
                        collect_bound_names(param, &mut names);
                        for name in names {
                            scope.declare(name, VarKind::LET);
                        }
                    }
                    self.with_scope(NodeKey::of(handler), scope, |this| {
                        if let Some(param) = &handler.param {
                            this.pattern(param, true)?;
                        }
                        this.block(&handler.body)
                    })?;
                }
                if let Some(finalizer) = &node.finalizer {
                    self.block(finalizer)?;
                }
                Ok(())
            }
            Statement::Switch(node) => {
                self.expression(&node.discriminant)?;
                let scope = block_scope(node.cases.iter().flat_map(|case| &case.consequent));
                self.with_scope(NodeKey::of(&**node), scope, |this| {
                    for case in &node.cases {
                        if let Some(test) = &case.test {
                            this.expression(test)?;
                        }
                        this.statements(&case.consequent)?;
                    }
                    Ok(())
                })
            }
            Statement::VariableDeclaration(decl) => self.variable_declaration(decl),
            Statement::FunctionDeclaration(func) => {
                let in_block = self
                    .frames
                    .last()
                    .is_some_and(|frame| frame.kind == ScopeKind::Block);
                if in_block && self.options.rules.annex_b_block_functions {
                    if let Some(name) = func.name() {
                        if self.annex_b_applies(name) {
                            self.scopes.mark_annex_b(func);
                        }
                    }
                }
                self.function(func, FunctionKind::Declaration)
            }
            Statement::While(node)
            | Statement::DoWhile(node)
            | Statement::Labeled(node)
            | Statement::Class(node)
            | Statement::Debugger(node)
            | Statement::With(node) => Err(errors::unsupported_node(
                stmt.unsupported_kind().unwrap_or("Statement"),
                self.source,
                node.span,
            )),
        }
    }

    fn variable_declaration(&mut self, decl: &VariableDeclaration) -> WalkResult {
        if decl.kind == VariableKind::Var && self.options.rules.no_var {
            return Err(errors::var_not_allowed(self.source, decl.span));
        }
        for declarator in &decl.declarations {
            self.pattern(&declarator.id, true)?;
            if let Some(init) = &declarator.init {
                self.expression(init)?;
            }
        }
        Ok(())
    }

    // Patterns

    /// Walk a binding (`binding == true`) or assignment target. Bound names
    /// are already declared; only assignment targets and the expressions
    /// inside patterns are references.
    fn pattern(&mut self, pattern: &Pattern, binding: bool) -> WalkResult {
        ensure_sufficient_stack(|| match pattern {
            Pattern::Identifier(id) => {
                if !binding {
                    self.reference(&id.name);
                }
                Ok(())
            }
            Pattern::Member(member) => self.member(member),
            Pattern::Object(object) => {
                for prop in &object.properties {
                    match prop {
                        PatternProperty::Property(prop) => {
                            if prop.computed {
                                self.expression(&prop.key)?;
                            }
                            self.pattern(&prop.value, binding)?;
                        }
                        PatternProperty::Rest(rest) => self.pattern(&rest.argument, binding)?,
                    }
                }
                Ok(())
            }
            Pattern::Array(array) => {
                for element in array.elements.iter().flatten() {
                    self.pattern(element, binding)?;
                }
                Ok(())
            }
            Pattern::Assignment(assign) => {
                self.pattern(&assign.left, binding)?;
                self.expression(&assign.right)
            }
            Pattern::Rest(rest) => self.pattern(&rest.argument, binding),
        })
    }

    // Expressions

    pub(crate) fn expression(&mut self, expr: &Expression) -> WalkResult {
        ensure_sufficient_stack(|| self.expression_inner(expr))
    }

    fn expression_inner(&mut self, expr: &Expression) -> WalkResult {
        match expr {
            Expression::Identifier(id) => {
                self.reference(&id.name);
                Ok(())
            }
            Expression::Literal(lit) => self.literal(lit),
            Expression::TemplateLiteral(template) => self.expressions(&template.expressions),
            Expression::TaggedTemplate(tagged) => {
                self.expression(&tagged.tag)?;
                self.expressions(&tagged.quasi.expressions)
            }
            Expression::Array(array) => {
                for element in array.elements.iter().flatten() {
                    self.expression_or_spread(element)?;
                }
                Ok(())
            }
            Expression::Object(object) => {
                for member in &object.properties {
                    match member {
                        ObjectMember::Property(prop) => {
                            if prop.kind != PropertyKind::Init {
                                let kind = if prop.kind == PropertyKind::Get { "get" } else { "set" };
                                return Err(errors::unsupported_property_kind(
                                    kind,
                                    self.source,
                                    prop.span,
                                ));
                            }
                            if prop.computed {
                                self.expression(&prop.key)?;
                            }
                            self.expression(&prop.value)?;
                        }
                        ObjectMember::Spread(spread) => self.expression(&spread.argument)?,
                    }
                }
                Ok(())
            }
            Expression::Function(func) => self.function(func, FunctionKind::Expression),
            Expression::Arrow(func) => self.function(func, FunctionKind::Arrow),
            Expression::Unary(unary) => {
                if !unary.operator.is_supported() {
                    return Err(errors::unsupported_operator(
                        "unary",
                        unary.operator.as_str(),
                        self.source,
                        unary.span,
                    ));
                }
                self.expression(&unary.argument)
            }
            Expression::Update(update) => self.pattern(&update.argument, false),
            Expression::Binary(binary) => {
                if !binary.operator.is_supported() {
                    return Err(errors::unsupported_operator(
                        "binary",
                        binary.operator.as_str(),
                        self.source,
                        binary.span,
                    ));
                }
                self.expression(&binary.left)?;
                self.expression(&binary.right)
            }
            Expression::Logical(logical) => {
                self.expression(&logical.left)?;
                self.expression(&logical.right)
            }
            Expression::Assignment(assign) => {
                if !assign.operator.is_supported() {
                    return Err(errors::unsupported_operator(
                        "assignment",
                        assign.operator.as_str(),
                        self.source,
                        assign.span,
                    ));
                }
                self.expression(&assign.right)?;
                self.pattern(&assign.left, false)
            }
            Expression::Conditional(cond) => {
                self.expression(&cond.test)?;
                self.expression(&cond.consequent)?;
                self.expression(&cond.alternate)
            }
            Expression::Call(call) => {
                self.expression(&call.callee)?;
                for arg in &call.arguments {
                    self.expression_or_spread(arg)?;
                }
                Ok(())
            }
            Expression::New(new) => {
                self.expression(&new.callee)?;
                for arg in &new.arguments {
                    self.expression_or_spread(arg)?;
                }
                Ok(())
            }
            Expression::Member(member) => self.member(member),
            Expression::Chain(chain) => self.expression(&chain.expression),
            Expression::Sequence(seq) => self.expressions(&seq.expressions),
            Expression::TsAs(inner) | Expression::TsNonNull(inner) => {
                if !self.options.typescript {
                    let kind = if matches!(expr, Expression::TsAs(_)) {
                        "TSAsExpression"
                    } else {
                        "TSNonNullExpression"
                    };
                    return Err(errors::unsupported_node(kind, self.source, inner.span));
                }
                self.expression(&inner.expression)
            }
            Expression::This(node)
            | Expression::Class(node)
            | Expression::Await(node)
            | Expression::Yield(node)
            | Expression::Super(node)
            | Expression::MetaProperty(node)
            | Expression::Import(node) => Err(errors::unsupported_node(
                expr.unsupported_kind().unwrap_or("Expression"),
                self.source,
                node.span,
            )),
        }
    }

    fn expressions(&mut self, exprs: &[Expression]) -> WalkResult {
        for expr in exprs {
            self.expression(expr)?;
        }
        Ok(())
    }

    fn expression_or_spread(&mut self, item: &ExpressionOrSpread) -> WalkResult {
        match item {
            ExpressionOrSpread::Expression(expr) => self.expression(expr),
            ExpressionOrSpread::Spread(spread) => self.expression(&spread.argument),
        }
    }

    fn member(&mut self, member: &MemberExpression) -> WalkResult {
        self.expression(&member.object)?;
        if member.computed {
            self.expression(&member.property)?;
        }
        Ok(())
    }

    fn literal(&self, lit: &Literal) -> WalkResult {
        if lit.bigint.is_some() {
            return Err(errors::bigint_literal(self.source, lit.span));
        }
        if let Some(regex) = &lit.regex {
            let raw = lit
                .raw
                .clone()
                .unwrap_or_else(|| format!("/{}/{}", regex.pattern, regex.flags));
            for flag in regex.flags.chars() {
                match flag {
                    'g' | 'i' | 'm' | 's' => {}
                    'u' => return Err(errors::unicode_regex(&raw, lit.span)),
                    other => return Err(errors::regex_flag(other, &raw, lit.span)),
                }
            }
        }
        Ok(())
    }
}

/// Declarations of a function: parameters, hoisted `var`s, top-level
/// function declarations and top-level lexical declarations.
fn function_scope(func: &Function) -> StaticScope {
    let mut scope = StaticScope::new(ScopeKind::Function);
    let mut names = Vec::new();
    for param in &func.params {
        collect_bound_names(param, &mut names);
        scope.has_parameter_expressions |= contains_expression(param);
    }
    for name in names {
        scope.declare(name, VarKind::PARAM);
    }
    if let Some(body) = func.body_statements() {
        for decl in var_declarations(body) {
            for name in declaration_bound_names(decl) {
                scope.declare(name, VarKind::VAR);
            }
        }
        for hoisted in function_declarations(body) {
            if let Some(name) = hoisted.name() {
                scope.declare(name, VarKind::FUNCTION);
            }
            scope.hoisted_functions.push(Rc::clone(hoisted));
        }
        for decl in lexical_declarations(body) {
            declare_lexical(&mut scope, decl);
        }
    }
    scope
}

/// Lexical declarations of a block-like statement list; function
/// declarations are block scoped and instantiated at block entry.
fn block_scope<'s>(body: impl IntoIterator<Item = &'s Statement>) -> StaticScope {
    let mut scope = StaticScope::new(ScopeKind::Block);
    for stmt in body {
        match stmt {
            Statement::VariableDeclaration(decl) => declare_lexical(&mut scope, decl),
            Statement::FunctionDeclaration(func) => {
                if let Some(name) = func.name() {
                    scope.declare(name, VarKind::FUNCTION);
                }
                scope.hoisted_functions.push(Rc::clone(func));
            }
            _ => {}
        }
    }
    scope
}

fn declare_lexical(scope: &mut StaticScope, decl: &VariableDeclaration) {
    let kind = match decl.kind {
        VariableKind::Var => return,
        VariableKind::Let => VarKind::LET,
        VariableKind::Const => VarKind::CONST,
    };
    for name in declaration_bound_names(decl) {
        scope.declare(name, kind);
    }
}
