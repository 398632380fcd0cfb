//! Expression evaluation.

use std::rc::Rc;

use cook_ir::{
    ensure_sufficient_stack, AssignmentExpression, AssignmentOperator, BinaryOperator,
    CallExpression, Expression, ExpressionOrSpread, Identifier, Literal, LiteralValue,
    LogicalOperator, MemberExpression, NewExpression, ObjectExpression, ObjectMember, Pattern,
    TaggedTemplateExpression, TemplateLiteral, UnaryExpression, UnaryOperator, UpdateExpression,
    UpdateOperator,
};

use crate::environment::{BindingError, Environment};
use crate::errors::{self, EvalResult};
use crate::interpreter::Interpreter;
use crate::methods::regexp;
use crate::sandbox::{self, ALLOWED_CONSTRUCTORS};
use crate::value::{number_to_string, Callable, Object, ObjectKind, PropertyMap, Value};

/// An assignable location.
pub(crate) enum Reference {
    Binding(Rc<str>),
    Property(Value, Rc<str>),
}

impl Interpreter {
    pub(crate) fn eval_expr(&mut self, expr: &Expression, env: &Environment) -> EvalResult<Value> {
        ensure_sufficient_stack(|| self.eval_expr_inner(expr, env))
    }

    fn eval_expr_inner(&mut self, expr: &Expression, env: &Environment) -> EvalResult<Value> {
        match expr {
            Expression::Identifier(id) => self.lookup_identifier(id, env),
            Expression::Literal(lit) => self.eval_literal(lit),
            Expression::TemplateLiteral(tpl) => self.eval_template(tpl, env),
            Expression::TaggedTemplate(node) => self.eval_tagged_template(node, env),
            Expression::Array(node) => {
                let mut items = Vec::with_capacity(node.elements.len());
                for element in &node.elements {
                    match element {
                        Some(ExpressionOrSpread::Spread(spread)) => {
                            let value = self.eval_expr(&spread.argument, env)?;
                            items.extend(self.iterate_at(&value, spread.argument.span())?);
                        }
                        Some(ExpressionOrSpread::Expression(expr)) => {
                            items.push(self.eval_expr(expr, env)?);
                        }
                        None => items.push(Value::Undefined),
                    }
                }
                Ok(Value::array(items))
            }
            Expression::Object(node) => self.eval_object(node, env),
            Expression::Function(func) => Ok(self.function_expression(func, env)),
            Expression::Arrow(func) => Ok(self.make_closure(func, env)),
            Expression::Unary(node) => self.eval_unary(node, env),
            Expression::Update(node) => self.eval_update(node, env),
            Expression::Binary(node) => {
                let left = self.eval_expr(&node.left, env)?;
                let right = self.eval_expr(&node.right, env)?;
                if node.operator == BinaryOperator::Pipeline {
                    return self.pipeline(&left, &right, &node.right);
                }
                if !node.operator.is_supported() {
                    let snippet = self.snippet(node.span);
                    let operator = node.operator.as_str();
                    let err = errors::unsupported_operator("binary", operator, &snippet);
                    return Err(self.locate(err, node.span));
                }
                self.binary_operation(node.operator, &left, &right)
                    .map_err(|err| self.locate(err, node.span))
            }
            Expression::Logical(node) => {
                let left = self.eval_expr(&node.left, env)?;
                let short_circuit = match node.operator {
                    LogicalOperator::And => !left.to_boolean(),
                    LogicalOperator::Or => left.to_boolean(),
                    LogicalOperator::Coalesce => !left.is_nullish(),
                };
                if short_circuit {
                    Ok(left)
                } else {
                    self.eval_expr(&node.right, env)
                }
            }
            Expression::Assignment(node) => self.eval_assignment(node, env),
            Expression::Conditional(node) => {
                if self.eval_expr(&node.test, env)?.to_boolean() {
                    self.eval_expr(&node.consequent, env)
                } else {
                    self.eval_expr(&node.alternate, env)
                }
            }
            Expression::Call(node) => Ok(self.eval_call(node, env)?.unwrap_or_default()),
            Expression::New(node) => self.eval_new(node, env),
            Expression::Member(node) => Ok(self
                .eval_member(node, env)?
                .map(|(_, value)| value)
                .unwrap_or_default()),
            Expression::Chain(node) => Ok(self
                .eval_chain_link(&node.expression, env)?
                .unwrap_or_default()),
            Expression::Sequence(node) => {
                let mut last = Value::Undefined;
                for expr in &node.expressions {
                    last = self.eval_expr(expr, env)?;
                }
                Ok(last)
            }
            Expression::TsAs(node) | Expression::TsNonNull(node) => {
                self.eval_expr(&node.expression, env)
            }
            Expression::This(node)
            | Expression::Class(node)
            | Expression::Await(node)
            | Expression::Yield(node)
            | Expression::Super(node)
            | Expression::MetaProperty(node)
            | Expression::Import(node) => {
                let kind = expr.unsupported_kind().unwrap_or("Expression");
                let err = errors::unsupported_node(kind, &self.snippet(node.span));
                Err(self.locate(err, node.span))
            }
        }
    }

    pub(crate) fn lookup_identifier(&mut self, id: &Identifier, env: &Environment) -> EvalResult<Value> {
        env.lookup(&id.name)
            .map_err(|err| self.binding_error(err, &id.name, id.span))
    }

    fn eval_literal(&mut self, lit: &Literal) -> EvalResult<Value> {
        if let Some(re) = &lit.regex {
            let raw = lit
                .raw
                .clone()
                .unwrap_or_else(|| format!("/{}/{}", re.pattern, re.flags));
            return regexp::create(&re.pattern, &re.flags)
                .map_err(|_| self.locate(errors::invalid_regex(&raw), lit.span));
        }
        if lit.bigint.is_some() {
            let err = errors::unsupported_node("BigIntLiteral", &self.snippet(lit.span));
            return Err(self.locate(err, lit.span));
        }
        Ok(match &lit.value {
            LiteralValue::Null | LiteralValue::Opaque(_) => Value::Null,
            LiteralValue::Boolean(b) => Value::Bool(*b),
            LiteralValue::Number(n) => Value::Number(*n),
            LiteralValue::String(s) => Value::string(s),
        })
    }

    fn eval_template(&mut self, tpl: &TemplateLiteral, env: &Environment) -> EvalResult<Value> {
        let mut out = String::new();
        for (i, quasi) in tpl.quasis.iter().enumerate() {
            out.push_str(quasi.value.cooked.as_deref().unwrap_or_default());
            if let Some(expr) = tpl.expressions.get(i) {
                let value = self.eval_expr(expr, env)?;
                out.push_str(&self.to_js_string(&value)?);
            }
        }
        Ok(Value::from(out))
    }

    fn eval_tagged_template(
        &mut self,
        node: &TaggedTemplateExpression,
        env: &Environment,
    ) -> EvalResult<Value> {
        let (this, tag) = self.eval_callee(&node.tag, env)?.unwrap_or_default();
        sandbox::sanitize(&tag).map_err(|err| self.locate(err, node.tag.span()))?;

        let cooked: Vec<Value> = node
            .quasi
            .quasis
            .iter()
            .map(|quasi| quasi.value.cooked.as_deref().map_or(Value::Undefined, Value::string))
            .collect();
        let raw: Vec<Value> = node
            .quasi
            .quasis
            .iter()
            .map(|quasi| Value::string(&quasi.value.raw))
            .collect();
        let strings = Object::array(cooked);
        {
            let mut data = strings.borrow_mut();
            let raw = Object::array(raw);
            raw.borrow_mut().frozen = true;
            data.properties.insert("raw", Value::Object(raw));
            data.frozen = true;
        }

        let mut args = vec![Value::Object(strings)];
        for expr in &node.quasi.expressions {
            args.push(self.eval_expr(expr, env)?);
        }
        if !tag.is_callable() {
            let err = errors::not_a_function(&self.snippet(node.tag.span()));
            return Err(self.locate(err, node.span));
        }
        let result = self.call_value(&tag, &this, &args, Some(node.span))?;
        sandbox::sanitize(&result).map_err(|err| self.locate(err, node.span))?;
        Ok(result)
    }

    fn eval_object(&mut self, node: &ObjectExpression, env: &Environment) -> EvalResult<Value> {
        let mut properties = PropertyMap::new();
        for member in &node.properties {
            match member {
                ObjectMember::Property(prop) => {
                    let key = self.property_key(&prop.key, prop.computed, env)?;
                    let value = self.eval_expr(&prop.value, env)?;
                    properties.insert(&key, value);
                }
                ObjectMember::Spread(spread) => {
                    let source = self.eval_expr(&spread.argument, env)?;
                    for (key, value) in self.own_entries(&source)? {
                        properties.insert(&key, value);
                    }
                }
            }
        }
        Ok(Value::Object(Object::ordinary(properties)))
    }

    /// Key of an object literal member or destructuring property.
    pub(crate) fn property_key(
        &mut self,
        key: &Expression,
        computed: bool,
        env: &Environment,
    ) -> EvalResult<Rc<str>> {
        if computed {
            let value = self.eval_expr(key, env)?;
            return self.to_property_key(&value);
        }
        Ok(match key {
            Expression::Identifier(id) => Rc::from(id.name.as_str()),
            Expression::Literal(lit) => match &lit.value {
                LiteralValue::String(s) => Rc::from(s.as_str()),
                LiteralValue::Number(n) => Rc::from(number_to_string(*n)),
                LiteralValue::Boolean(b) => Rc::from(b.to_string()),
                LiteralValue::Null | LiteralValue::Opaque(_) => Rc::from("null"),
            },
            other => {
                let value = self.eval_expr(other, env)?;
                self.to_property_key(&value)?
            }
        })
    }

    fn eval_unary(&mut self, node: &UnaryExpression, env: &Environment) -> EvalResult<Value> {
        if node.operator == UnaryOperator::TypeOf {
            if let Expression::Identifier(id) = &node.argument {
                return match env.lookup(&id.name) {
                    Ok(value) => Ok(Value::string(value.type_of())),
                    Err(BindingError::Unresolvable) => Ok(Value::string("undefined")),
                    Err(err) => Err(self.binding_error(err, &id.name, id.span)),
                };
            }
        }
        let argument = self.eval_expr(&node.argument, env)?;
        Ok(match node.operator {
            UnaryOperator::Not => Value::Bool(!argument.to_boolean()),
            UnaryOperator::Minus => Value::Number(-self.to_number(&argument)?),
            UnaryOperator::Plus => Value::Number(self.to_number(&argument)?),
            UnaryOperator::TypeOf => Value::string(argument.type_of()),
            UnaryOperator::Void => Value::Undefined,
            UnaryOperator::BitNot | UnaryOperator::Delete => {
                let snippet = self.snippet(node.span);
                let err = errors::unsupported_operator("unary", node.operator.as_str(), &snippet);
                return Err(self.locate(err, node.span));
            }
        })
    }

    fn eval_update(&mut self, node: &UpdateExpression, env: &Environment) -> EvalResult<Value> {
        let reference = self.reference(&node.argument, env)?;
        let old = self.get_reference(&reference, env, node.span)?;
        let old = self.to_number(&old)?;
        let new = match node.operator {
            UpdateOperator::Increment => old + 1.0,
            UpdateOperator::Decrement => old - 1.0,
        };
        self.put_reference(&reference, Value::Number(new), env, node.span)?;
        Ok(Value::Number(if node.prefix { new } else { old }))
    }

    fn eval_assignment(&mut self, node: &AssignmentExpression, env: &Environment) -> EvalResult<Value> {
        if node.operator == AssignmentOperator::Assign {
            if let Pattern::Identifier(_) | Pattern::Member(_) = &node.left {
                let reference = self.reference(&node.left, env)?;
                let value = self.eval_expr(&node.right, env)?;
                self.put_reference(&reference, value.clone(), env, node.span)?;
                return Ok(value);
            }
            let value = self.eval_expr(&node.right, env)?;
            self.bind_pattern(&node.left, value.clone(), env, super::BindMode::Assign)?;
            return Ok(value);
        }

        let Some(op) = node.operator.binary() else {
            let snippet = self.snippet(node.span);
            let err = errors::unsupported_operator("assignment", node.operator.as_str(), &snippet);
            return Err(self.locate(err, node.span));
        };
        let reference = self.reference(&node.left, env)?;
        let old = self.get_reference(&reference, env, node.span)?;
        let right = self.eval_expr(&node.right, env)?;
        let value = self
            .binary_operation(op, &old, &right)
            .map_err(|err| self.locate(err, node.span))?;
        self.put_reference(&reference, value.clone(), env, node.span)?;
        Ok(value)
    }

    /// Evaluate an identifier or member target to a reference.
    pub(crate) fn reference(&mut self, target: &Pattern, env: &Environment) -> EvalResult<Reference> {
        match target {
            Pattern::Identifier(id) => Ok(Reference::Binding(Rc::from(id.name.as_str()))),
            Pattern::Member(member) => self.member_reference(member, env),
            other => {
                let snippet = self.snippet(other.span());
                let message = format!("Invalid assignment target: `{snippet}`");
                Err(self.locate(errors::syntax_error(message), other.span()))
            }
        }
    }

    pub(crate) fn member_reference(
        &mut self,
        member: &MemberExpression,
        env: &Environment,
    ) -> EvalResult<Reference> {
        let object = self.eval_expr(&member.object, env)?;
        sandbox::sanitize(&object).map_err(|err| self.locate(err, member.span))?;
        let key = self.member_key(member, env)?;
        Ok(Reference::Property(object, key))
    }

    pub(crate) fn get_reference(
        &mut self,
        reference: &Reference,
        env: &Environment,
        span: cook_ir::Span,
    ) -> EvalResult<Value> {
        match reference {
            Reference::Binding(name) => env
                .lookup(name)
                .map_err(|err| self.binding_error(err, name, span)),
            Reference::Property(object, key) => {
                let value = self
                    .get_property(object, key)
                    .map_err(|err| self.locate(err, span))?;
                sandbox::sanitize(&value).map_err(|err| self.locate(err, span))?;
                Ok(value)
            }
        }
    }

    pub(crate) fn put_reference(
        &mut self,
        reference: &Reference,
        value: Value,
        env: &Environment,
        span: cook_ir::Span,
    ) -> EvalResult<()> {
        match reference {
            Reference::Binding(name) => match env.resolve(name) {
                Some(frame) => frame
                    .set_mutable_binding(name, value, true)
                    .map_err(|err| self.binding_error(err, name, span)),
                None if self.rules().loose_global_assignment => env
                    .outermost()
                    .declare(name, value, true)
                    .map_err(|err| self.binding_error(err, name, span)),
                None => Err(self.binding_error(BindingError::Unresolvable, name, span)),
            },
            Reference::Property(object, key) => self
                .set_property(object, key, value)
                .map_err(|err| self.locate(err, span)),
        }
    }

    fn member_key(&mut self, member: &MemberExpression, env: &Environment) -> EvalResult<Rc<str>> {
        if member.computed {
            let key = self.eval_expr(&member.property, env)?;
            return self.to_property_key(&key);
        }
        match &member.property {
            Expression::Identifier(id) => Ok(Rc::from(id.name.as_str())),
            other => self.property_key(other, false, env),
        }
    }

    /// One link of a member/call chain. `None` means an optional link
    /// short-circuited.
    fn eval_chain_link(&mut self, expr: &Expression, env: &Environment) -> EvalResult<Option<Value>> {
        ensure_sufficient_stack(|| match expr {
            Expression::Member(member) => Ok(self.eval_member(member, env)?.map(|(_, value)| value)),
            Expression::Call(call) => self.eval_call(call, env),
            other => self.eval_expr(other, env).map(Some),
        })
    }

    /// Evaluate a member expression to `(object, value)`.
    fn eval_member(
        &mut self,
        node: &MemberExpression,
        env: &Environment,
    ) -> EvalResult<Option<(Value, Value)>> {
        let Some(object) = self.eval_chain_link(&node.object, env)? else {
            return Ok(None);
        };
        sandbox::sanitize(&object).map_err(|err| self.locate(err, node.span))?;
        if node.optional && object.is_nullish() {
            return Ok(None);
        }
        let key = self.member_key(node, env)?;
        let value = self
            .get_property(&object, &key)
            .map_err(|err| self.locate(err, node.span))?;
        sandbox::sanitize(&value).map_err(|err| self.locate(err, node.span))?;
        Ok(Some((object, value)))
    }

    /// Evaluate a callee to `(this, function)`.
    fn eval_callee(
        &mut self,
        callee: &Expression,
        env: &Environment,
    ) -> EvalResult<Option<(Value, Value)>> {
        match callee {
            Expression::Member(member) => self.eval_member(member, env),
            other => Ok(self
                .eval_chain_link(other, env)?
                .map(|func| (Value::Undefined, func))),
        }
    }

    fn eval_call(&mut self, node: &CallExpression, env: &Environment) -> EvalResult<Option<Value>> {
        let Some((this, callee)) = self.eval_callee(&node.callee, env)? else {
            return Ok(None);
        };
        sandbox::sanitize(&callee).map_err(|err| self.locate(err, node.span))?;
        if node.optional && callee.is_nullish() {
            return Ok(None);
        }
        let args = self.eval_arguments(&node.arguments, env)?;
        if !callee.is_callable() {
            let err = errors::not_a_function(&self.snippet(node.callee.span()));
            return Err(self.locate(err, node.span));
        }
        let result = self.call_value(&callee, &this, &args, Some(node.span))?;
        sandbox::sanitize(&result).map_err(|err| self.locate(err, node.span))?;
        Ok(Some(result))
    }

    pub(crate) fn eval_arguments(
        &mut self,
        arguments: &[ExpressionOrSpread],
        env: &Environment,
    ) -> EvalResult<Vec<Value>> {
        let mut args = Vec::with_capacity(arguments.len());
        for arg in arguments {
            match arg {
                ExpressionOrSpread::Expression(expr) => args.push(self.eval_expr(expr, env)?),
                ExpressionOrSpread::Spread(spread) => {
                    let value = self.eval_expr(&spread.argument, env)?;
                    args.extend(self.iterate_at(&value, spread.argument.span())?);
                }
            }
        }
        Ok(args)
    }

    fn pipeline(&mut self, left: &Value, right: &Value, right_expr: &Expression) -> EvalResult<Value> {
        sandbox::sanitize(right).map_err(|err| self.locate(err, right_expr.span()))?;
        if !right.is_callable() {
            let err = errors::not_a_function(&self.snippet(right_expr.span()));
            return Err(self.locate(err, right_expr.span()));
        }
        let result = self.call_value(right, &Value::Undefined, std::slice::from_ref(left), None)?;
        sandbox::sanitize(&result).map_err(|err| self.locate(err, right_expr.span()))?;
        Ok(result)
    }

    fn eval_new(&mut self, node: &NewExpression, env: &Environment) -> EvalResult<Value> {
        let snippet = self.snippet(node.span);
        let Expression::Identifier(id) = node.callee.strip_type_assertions() else {
            return Err(self.locate(errors::unsupported_new(&snippet), node.span));
        };
        let name = id.name.as_str();
        if !ALLOWED_CONSTRUCTORS.contains(&name) {
            return Err(self.locate(errors::unsupported_constructor(name, &snippet), node.span));
        }
        let callee = self.lookup_identifier(id, env)?;
        let is_global = env
            .resolve(name)
            .is_some_and(|frame| frame.parent().is_none());
        if !is_global || !sandbox::is_builtin_constructor(&callee, name) {
            return Err(self.locate(errors::non_global_constructor(name, &snippet), node.span));
        }
        sandbox::sanitize(&callee).map_err(|err| self.locate(err, node.span))?;

        let args = self.eval_arguments(&node.arguments, env)?;
        let construct = callee.as_object().and_then(|obj| match &obj.borrow().kind {
            ObjectKind::Function(Callable::Builtin(builtin)) => builtin.construct,
            _ => None,
        });
        let Some(construct) = construct else {
            return Err(self.locate(errors::non_global_constructor(name, &snippet), node.span));
        };
        let result = construct(self, &args).map_err(|err| self.locate(err, node.span))?;
        sandbox::sanitize(&result).map_err(|err| self.locate(err, node.span))?;
        Ok(result)
    }
}
