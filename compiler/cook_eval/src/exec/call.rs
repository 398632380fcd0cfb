//! Closures and calls.

use std::rc::Rc;

use cook_ir::{ArrowBody, Function, Pattern, Span};
use cook_precook::VarKind;

use super::BindMode;
use crate::environment::Environment;
use crate::errors::{self, EvalResult};
use crate::interpreter::{Completion, Interpreter, Program};
use crate::value::{Callable, Closure, HostFn, NativeFn, Object, ObjectKind, Value};

/// What a call dispatches to, detached from the callee's cell so the call
/// can run without holding a borrow.
enum Target {
    Closure(Rc<Function>, Environment, Rc<Program>),
    Builtin(NativeFn),
    Host(HostFn),
}

impl Interpreter {
    /// Create a closure over `env`.
    pub(crate) fn make_closure(&mut self, func: &Rc<Function>, env: &Environment) -> Value {
        Value::Object(Object::new(ObjectKind::Function(Callable::Closure(
            Closure {
                func: Rc::clone(func),
                env: env.clone(),
                program: Rc::clone(&self.program),
            },
        ))))
    }

    /// A `function` expression. A named one sees its own name in a frame
    /// between the closure and the surrounding scope.
    pub(crate) fn function_expression(&mut self, func: &Rc<Function>, env: &Environment) -> Value {
        let Some(name) = func.name() else {
            return self.make_closure(func, env);
        };
        let frame = env.child();
        let closure = self.make_closure(func, &frame);
        // The frame is fresh, so neither step can fail.
        let _ = frame.create_immutable_binding(name, false);
        let _ = frame.initialize_binding(name, closure.clone());
        closure
    }

    /// Call `callee` with `this` and `args`. `span` locates the call site
    /// for errors raised by built-ins.
    pub(crate) fn call_value(
        &mut self,
        callee: &Value,
        this: &Value,
        args: &[Value],
        span: Option<Span>,
    ) -> EvalResult<Value> {
        let target = callee.as_object().and_then(|obj| match &obj.borrow().kind {
            ObjectKind::Function(Callable::Closure(closure)) => Some(Target::Closure(
                Rc::clone(&closure.func),
                closure.env.clone(),
                Rc::clone(&closure.program),
            )),
            ObjectKind::Function(Callable::Builtin(builtin)) => Some(Target::Builtin(builtin.call)),
            ObjectKind::Function(Callable::Host(host)) => Some(Target::Host(Rc::clone(&host.call))),
            _ => None,
        });
        // Owned so the closure does not hold `self` across the call.
        let source = Rc::clone(&self.program.source);
        let locate = |err: errors::EvalError| match span {
            Some(span) => err.with_source(span, &source),
            None => err,
        };

        match target {
            None => Err(locate(errors::not_a_function(&callee.to_string()))),
            Some(Target::Builtin(call)) => call(self, this, args).map_err(locate),
            Some(Target::Host(call)) => call(this, args).map_err(locate),
            Some(Target::Closure(func, env, program)) => {
                if self.depth >= self.program.limits.max_call_depth {
                    return Err(locate(errors::call_stack_exceeded()));
                }
                self.depth += 1;
                let caller = std::mem::replace(&mut self.program, program);
                let result = self.run_function(&func, &env, args);
                self.program = caller;
                self.depth -= 1;
                result
            }
        }
    }

    /// Instantiate a fresh function environment and run the body.
    fn run_function(
        &mut self,
        func: &Rc<Function>,
        closure_env: &Environment,
        args: &[Value],
    ) -> EvalResult<Value> {
        let scopes = Rc::clone(&self.program.scopes);
        let scope = scopes
            .get(&**func)
            .ok_or_else(|| self.locate(errors::missing_scope("function"), func.span))?;
        let env = closure_env.child();

        for name in scope.params() {
            env.create_mutable_binding(name)
                .map_err(|err| self.binding_error(err, name, func.span))?;
        }
        for (i, param) in func.params.iter().enumerate() {
            if let Pattern::Rest(rest) = param {
                let rest_args = args.get(i..).unwrap_or_default().to_vec();
                self.bind_pattern(&rest.argument, Value::array(rest_args), &env, BindMode::Initialize)?;
                break;
            }
            let arg = args.get(i).cloned().unwrap_or_default();
            self.bind_pattern(param, arg, &env, BindMode::Initialize)?;
        }

        for decl in scope.declarations() {
            let name = decl.name.as_str();
            if decl.kind.contains(VarKind::PARAM) {
                continue;
            }
            let created = if decl.kind.is_var_like() {
                env.declare(name, Value::Undefined, true)
            } else if decl.kind.contains(VarKind::CONST) {
                env.create_immutable_binding(name, true)
            } else {
                env.create_mutable_binding(name)
            };
            created.map_err(|err| self.binding_error(err, name, func.span))?;
        }
        for hoisted in &scope.hoisted_functions {
            let closure = self.make_closure(hoisted, &env);
            if let Some(name) = hoisted.name() {
                env.set_mutable_binding(name, closure, true)
                    .map_err(|err| self.binding_error(err, name, hoisted.span))?;
            }
        }

        match &func.body {
            ArrowBody::Expression(expr) => self.eval_expr(expr, &env),
            ArrowBody::Block(block) => {
                for stmt in &block.body {
                    if let Completion::Return(value) = self.exec_statement(stmt, &env)? {
                        return Ok(value);
                    }
                }
                Ok(Value::Undefined)
            }
        }
    }
}
