//! Static scope model.
//!
//! One [`StaticScope`] per function and per block-like node that declares
//! names. The evaluator instantiates runtime environments from these instead
//! of re-deriving declarations at every entry.

use bitflags::bitflags;
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;
use std::rc::Rc;

use cook_ir::{Function, NodeKey};

bitflags! {
    /// How a name is declared in a scope.
    ///
    /// A function scope may combine flags for one name, e.g.
    /// `function f(a) { var a; function a() {} }` gives `a` all of
    /// `PARAM | VAR | FUNCTION`.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct VarKind: u8 {
        const PARAM = 1 << 0;
        const VAR = 1 << 1;
        const LET = 1 << 2;
        const CONST = 1 << 3;
        /// Function declaration (hoisted with its value).
        const FUNCTION = 1 << 4;
    }
}

impl VarKind {
    /// Bindings created initialized to `undefined` at scope entry.
    pub fn is_var_like(self) -> bool {
        self.intersects(VarKind::VAR | VarKind::FUNCTION) && !self.contains(VarKind::PARAM)
    }

    /// Bindings in their temporal dead zone until the declaration runs.
    pub fn is_lexical(self) -> bool {
        self.intersects(VarKind::LET | VarKind::CONST)
    }
}

/// Function scope or block scope.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ScopeKind {
    /// Function body, including its parameters.
    Function,
    /// Block, `for` head, `switch` body or `catch` clause.
    Block,
}

/// A declared name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub kind: VarKind,
}

/// Declarations of one scope, in first-declaration order.
#[derive(Clone)]
pub struct StaticScope {
    pub kind: ScopeKind,
    declarations: Vec<Declaration>,
    index: FxHashMap<String, usize>,
    /// Function declarations instantiated when the scope is entered.
    pub hoisted_functions: Vec<Rc<Function>>,
    /// Parameters carry defaults or computed keys.
    pub has_parameter_expressions: bool,
}

impl StaticScope {
    pub fn new(kind: ScopeKind) -> Self {
        StaticScope {
            kind,
            declarations: Vec::new(),
            index: FxHashMap::default(),
            hoisted_functions: Vec::new(),
            has_parameter_expressions: false,
        }
    }

    /// Record `name`, merging flags with an earlier declaration.
    pub fn declare(&mut self, name: &str, kind: VarKind) {
        if let Some(&i) = self.index.get(name) {
            self.declarations[i].kind |= kind;
            return;
        }
        self.index.insert(name.to_string(), self.declarations.len());
        self.declarations.push(Declaration {
            name: name.to_string(),
            kind,
        });
    }

    pub fn lookup(&self, name: &str) -> Option<VarKind> {
        self.index.get(name).map(|&i| self.declarations[i].kind)
    }

    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Parameter names, in declaration order.
    pub fn params(&self) -> impl Iterator<Item = &str> {
        self.declarations
            .iter()
            .filter(|d| d.kind.contains(VarKind::PARAM))
            .map(|d| d.name.as_str())
    }
}

impl PartialEq for StaticScope {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.declarations == other.declarations
            && self.has_parameter_expressions == other.has_parameter_expressions
            && self.hoisted_functions.len() == other.hoisted_functions.len()
            && self
                .hoisted_functions
                .iter()
                .zip(&other.hoisted_functions)
                .all(|(a, b)| Rc::ptr_eq(a, b))
    }
}

impl fmt::Debug for StaticScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticScope")
            .field("kind", &self.kind)
            .field("declarations", &self.declarations)
            .field(
                "hoisted_functions",
                &self
                    .hoisted_functions
                    .iter()
                    .map(|func| func.name().unwrap_or_default())
                    .collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

/// Node-to-scope association produced by pre-analysis.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScopeMap {
    scopes: FxHashMap<NodeKey, Rc<StaticScope>>,
    /// Block-level function declarations whose value is copied to the
    /// same-named function binding when the declaration runs.
    annex_b: FxHashSet<NodeKey>,
}

impl ScopeMap {
    pub fn insert(&mut self, key: NodeKey, scope: StaticScope) {
        self.scopes.insert(key, Rc::new(scope));
    }

    /// Scope introduced by `node`, if it declares anything.
    pub fn get<T: 'static>(&self, node: &T) -> Option<Rc<StaticScope>> {
        self.scopes.get(&NodeKey::of(node)).cloned()
    }

    pub fn mark_annex_b(&mut self, func: &Function) {
        self.annex_b.insert(NodeKey::of(func));
    }

    pub fn is_annex_b(&self, func: &Function) -> bool {
        self.annex_b.contains(&NodeKey::of(func))
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}
