//! Binding patterns and destructuring.

use std::rc::Rc;

use cook_ir::{Pattern, PatternProperty};
use rustc_hash::FxHashSet;

use super::expr::Reference;
use crate::environment::Environment;
use crate::errors::{self, EvalResult};
use crate::interpreter::Interpreter;
use crate::sandbox;
use crate::value::{Object, PropertyMap, Value};

/// How identifiers in a pattern receive their value.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum BindMode {
    /// Initialize a binding created in the given frame (`let`, `const`,
    /// parameters, `catch`).
    Initialize,
    /// Assign through scope resolution (`var`, assignment expressions,
    /// bare `for-in/of` heads).
    Assign,
}

impl Interpreter {
    pub(crate) fn bind_pattern(
        &mut self,
        pattern: &Pattern,
        value: Value,
        env: &Environment,
        mode: BindMode,
    ) -> EvalResult<()> {
        match pattern {
            Pattern::Identifier(id) => match mode {
                BindMode::Initialize => env
                    .initialize_binding(&id.name, value)
                    .map_err(|err| self.binding_error(err, &id.name, id.span)),
                BindMode::Assign => self.put_reference(
                    &Reference::Binding(Rc::from(id.name.as_str())),
                    value,
                    env,
                    id.span,
                ),
            },
            Pattern::Member(member) => {
                let reference = self.member_reference(member, env)?;
                self.put_reference(&reference, value, env, member.span)
            }
            Pattern::Assignment(node) => {
                let value = if value.is_undefined() {
                    self.eval_expr(&node.right, env)?
                } else {
                    value
                };
                self.bind_pattern(&node.left, value, env, mode)
            }
            Pattern::Rest(node) => self.bind_pattern(&node.argument, value, env, mode),
            Pattern::Array(node) => {
                let items = self.iterate_at(&value, node.span)?;
                let mut items = items.into_iter();
                for element in &node.elements {
                    match element {
                        None => {
                            items.next();
                        }
                        Some(Pattern::Rest(rest)) => {
                            let remaining = Value::array(items.by_ref().collect());
                            self.bind_pattern(&rest.argument, remaining, env, mode)?;
                        }
                        Some(target) => {
                            let item = items.next().unwrap_or_default();
                            self.bind_pattern(target, item, env, mode)?;
                        }
                    }
                }
                Ok(())
            }
            Pattern::Object(node) => {
                if value.is_nullish() {
                    return Err(self.locate(errors::cannot_destructure(&value), node.span));
                }
                let mut used: FxHashSet<Rc<str>> = FxHashSet::default();
                for property in &node.properties {
                    match property {
                        PatternProperty::Property(prop) => {
                            let key = self.property_key(&prop.key, prop.computed, env)?;
                            let item = self
                                .get_property(&value, &key)
                                .map_err(|err| self.locate(err, prop.span))?;
                            sandbox::sanitize(&item).map_err(|err| self.locate(err, prop.span))?;
                            used.insert(key);
                            self.bind_pattern(&prop.value, item, env, mode)?;
                        }
                        PatternProperty::Rest(rest) => {
                            let mut remaining = PropertyMap::new();
                            for (key, item) in self.own_entries(&value)? {
                                if !used.contains(&key) {
                                    remaining.insert(&key, item);
                                }
                            }
                            let remaining = Value::Object(Object::ordinary(remaining));
                            self.bind_pattern(&rest.argument, remaining, env, mode)?;
                        }
                    }
                }
                Ok(())
            }
        }
    }
}
