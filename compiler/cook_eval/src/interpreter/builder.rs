//! `InterpreterBuilder` for assembling a [`Program`] and an interpreter
//! around it.

use std::rc::Rc;

use cook_precook::{Rules, ScopeMap};

use super::{EvalLimits, Interpreter, Program};

/// Builder for interpreters. Every part defaults to an empty program with
/// strict rules and default limits.
#[derive(Default)]
pub struct InterpreterBuilder {
    source: Option<Rc<str>>,
    scopes: Option<Rc<ScopeMap>>,
    rules: Rules,
    limits: EvalLimits,
}

impl InterpreterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Source text the tree's spans refer to.
    #[must_use]
    pub fn source(mut self, source: Rc<str>) -> Self {
        self.source = Some(source);
        self
    }

    /// Pre-analysis of the tree that will be evaluated.
    #[must_use]
    pub fn scopes(mut self, scopes: Rc<ScopeMap>) -> Self {
        self.scopes = Some(scopes);
        self
    }

    #[must_use]
    pub fn rules(mut self, rules: Rules) -> Self {
        self.rules = rules;
        self
    }

    #[must_use]
    pub fn limits(mut self, limits: EvalLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn build_program(self) -> Rc<Program> {
        Rc::new(Program {
            source: self.source.unwrap_or_else(|| Rc::from("")),
            scopes: self.scopes.unwrap_or_default(),
            rules: self.rules,
            limits: self.limits,
        })
    }

    pub fn build(self) -> Interpreter {
        Interpreter::new(self.build_program())
    }
}
