//! Runtime scopes.
//!
//! Each function call, declaring block, loop iteration and `catch` clause
//! gets its own [`Scope`] frame, linked to the frame it was created in.
//! Closures keep the frame they were created in alive, so frames are
//! reference counted instead of living on a stack.

use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use crate::value::Value;

/// Why a binding operation failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindingError {
    /// The frame already has a binding with that name.
    AlreadyDeclared,
    /// The binding exists but is still in its temporal dead zone.
    Uninitialized,
    /// Strict assignment to an immutable binding.
    Immutable,
    /// No frame in the chain has the name.
    Unresolvable,
}

/// A single-threaded, shared, mutable frame.
///
/// Wraps `Rc<RefCell<T>>` so every frame allocation goes through
/// [`LocalScope::new`]. Frames are not `Send`: one evaluation runs on one
/// thread, and closures created in it may only be called there.
///
/// Borrows never outlive the method that takes them; values leave a frame
/// by clone.
#[repr(transparent)]
pub struct LocalScope<T>(Rc<RefCell<T>>);

impl<T> LocalScope<T> {
    /// Allocate a new shared frame.
    #[inline]
    pub fn new(value: T) -> Self {
        LocalScope(Rc::new(RefCell::new(value)))
    }

    /// Immutably borrow the frame.
    #[inline]
    pub fn borrow(&self) -> std::cell::Ref<'_, T> {
        self.0.borrow()
    }

    /// Mutably borrow the frame.
    #[inline]
    pub fn borrow_mut(&self) -> std::cell::RefMut<'_, T> {
        self.0.borrow_mut()
    }

    /// Whether both handles point at the same frame.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> Clone for LocalScope<T> {
    #[inline]
    fn clone(&self) -> Self {
        LocalScope(Rc::clone(&self.0))
    }
}

impl<T> Deref for LocalScope<T> {
    type Target = RefCell<T>;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// A single binding.
///
/// A binding starts uninitialized (its temporal dead zone) and is
/// initialized exactly once. `var` names and parameters are initialized at
/// frame entry; `let`, `const` and `catch` parameters when their
/// declaration runs.
#[derive(Clone, Debug)]
struct Binding {
    value: Value,
    initialized: bool,
    mutable: bool,
    /// Immutable bindings created non-strict ignore sloppy writes; strict
    /// ones always throw. Every write the evaluator performs is strict.
    strict: bool,
}

/// One frame of bindings.
///
/// Names are unique within a frame; the pre-analysis pass guarantees that
/// for user code, so [`BindingError::AlreadyDeclared`] signals an
/// interpreter bug rather than a user error.
#[derive(Default)]
pub struct Scope {
    bindings: FxHashMap<Rc<str>, Binding>,
    parent: Option<Environment>,
}

/// Handle to the innermost frame of a scope chain.
///
/// Cloning is cheap and shares the frame. The root frame holds the
/// supplied globals as immutable bindings; every other frame belongs to a
/// function call, block, loop iteration or `catch` clause.
///
/// Operations come in two layers:
/// - frame-local: [`create_mutable_binding`](Self::create_mutable_binding),
///   [`initialize_binding`](Self::initialize_binding),
///   [`set_mutable_binding`](Self::set_mutable_binding) and
///   [`get_binding_value`](Self::get_binding_value) act on this frame only;
/// - chain-wide: [`lookup`](Self::lookup) and [`assign`](Self::assign)
///   first [`resolve`](Self::resolve) the innermost frame with the name.
#[derive(Clone)]
pub struct Environment(LocalScope<Scope>);

impl Environment {
    /// A root frame with no parent. Globals live here.
    pub fn new() -> Self {
        Environment(LocalScope::new(Scope::default()))
    }

    /// A new empty frame whose parent is `self`.
    #[must_use]
    pub fn child(&self) -> Self {
        Environment(LocalScope::new(Scope {
            bindings: FxHashMap::default(),
            parent: Some(self.clone()),
        }))
    }

    /// The enclosing frame, `None` for the root.
    pub fn parent(&self) -> Option<Environment> {
        self.0.borrow().parent.clone()
    }

    /// The root frame of the chain.
    pub fn outermost(&self) -> Environment {
        let mut env = self.clone();
        while let Some(parent) = env.parent() {
            env = parent;
        }
        env
    }

    /// Whether both handles point at the same frame.
    pub fn same_frame(&self, other: &Environment) -> bool {
        self.0.ptr_eq(&other.0)
    }

    /// Whether this frame, ignoring parents, binds `name`.
    pub fn has_binding(&self, name: &str) -> bool {
        self.0.borrow().bindings.contains_key(name)
    }

    /// Whether the binding exists in this frame and has not been
    /// initialized yet.
    pub fn is_uninitialized(&self, name: &str) -> bool {
        self.0
            .borrow()
            .bindings
            .get(name)
            .is_some_and(|binding| !binding.initialized)
    }

    /// Create an uninitialized mutable binding in this frame.
    ///
    /// Fails with [`BindingError::AlreadyDeclared`] if the frame already
    /// has the name.
    pub fn create_mutable_binding(&self, name: &str) -> Result<(), BindingError> {
        self.create(name, true, false)
    }

    /// Create an uninitialized immutable binding in this frame.
    ///
    /// `strict` bindings reject every write. Non-strict ones, used for the
    /// self-reference of a named function expression, ignore sloppy writes.
    pub fn create_immutable_binding(&self, name: &str, strict: bool) -> Result<(), BindingError> {
        self.create(name, false, strict)
    }

    fn create(&self, name: &str, mutable: bool, strict: bool) -> Result<(), BindingError> {
        let mut scope = self.0.borrow_mut();
        if scope.bindings.contains_key(name) {
            return Err(BindingError::AlreadyDeclared);
        }
        scope.bindings.insert(
            Rc::from(name),
            Binding {
                value: Value::Undefined,
                initialized: false,
                mutable,
                strict,
            },
        );
        Ok(())
    }

    /// Give a binding of this frame its first value, ending its dead zone.
    ///
    /// The evaluator calls this once per binding. A missing name is
    /// [`BindingError::Unresolvable`].
    pub fn initialize_binding(&self, name: &str, value: Value) -> Result<(), BindingError> {
        let mut scope = self.0.borrow_mut();
        let binding = scope
            .bindings
            .get_mut(name)
            .ok_or(BindingError::Unresolvable)?;
        binding.value = value;
        binding.initialized = true;
        Ok(())
    }

    /// Create and initialize a binding in one step.
    pub fn declare(&self, name: &str, value: Value, mutable: bool) -> Result<(), BindingError> {
        self.create(name, mutable, true)?;
        self.initialize_binding(name, value)
    }

    /// Assign to a binding of this frame.
    ///
    /// # Errors
    /// - [`BindingError::Unresolvable`] if the frame lacks the name
    /// - [`BindingError::Uninitialized`] inside the dead zone
    /// - [`BindingError::Immutable`] for a `const`, or for a non-strict
    ///   immutable binding when `strict` is set
    pub fn set_mutable_binding(
        &self,
        name: &str,
        value: Value,
        strict: bool,
    ) -> Result<(), BindingError> {
        let mut scope = self.0.borrow_mut();
        let binding = scope
            .bindings
            .get_mut(name)
            .ok_or(BindingError::Unresolvable)?;
        if !binding.initialized {
            return Err(BindingError::Uninitialized);
        }
        if binding.mutable {
            binding.value = value;
            Ok(())
        } else if strict || binding.strict {
            Err(BindingError::Immutable)
        } else {
            Ok(())
        }
    }

    /// Read a binding of this frame. Reading inside the dead zone is
    /// [`BindingError::Uninitialized`].
    pub fn get_binding_value(&self, name: &str) -> Result<Value, BindingError> {
        let scope = self.0.borrow();
        let binding = scope.bindings.get(name).ok_or(BindingError::Unresolvable)?;
        if binding.initialized {
            Ok(binding.value.clone())
        } else {
            Err(BindingError::Uninitialized)
        }
    }

    /// The innermost frame in the chain that has `name`.
    pub fn resolve(&self, name: &str) -> Option<Environment> {
        let mut env = self.clone();
        loop {
            if env.has_binding(name) {
                return Some(env);
            }
            env = env.parent()?;
        }
    }

    /// Resolve and read. An undeclared name is
    /// [`BindingError::Unresolvable`], which surfaces as a `ReferenceError`.
    pub fn lookup(&self, name: &str) -> Result<Value, BindingError> {
        self.resolve(name)
            .ok_or(BindingError::Unresolvable)?
            .get_binding_value(name)
    }

    /// Resolve and assign, strictly. Creating a binding for an undeclared
    /// name is up to the caller.
    pub fn assign(&self, name: &str, value: Value) -> Result<(), BindingError> {
        self.resolve(name)
            .ok_or(BindingError::Unresolvable)?
            .set_mutable_binding(name, value, true)
    }

    /// A sibling frame holding copies of `names`, with their current
    /// values. Used to give each loop iteration its own bindings.
    #[must_use]
    pub fn copy_for_iteration<'n>(&self, names: impl IntoIterator<Item = &'n str>) -> Self {
        let scope = self.0.borrow();
        let mut bindings = FxHashMap::default();
        for name in names {
            if let Some((key, binding)) = scope.bindings.get_key_value(name) {
                bindings.insert(Rc::clone(key), binding.clone());
            }
        }
        Environment(LocalScope::new(Scope {
            bindings,
            parent: scope.parent.clone(),
        }))
    }

    /// Names bound in this frame, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .0
            .borrow()
            .bindings
            .keys()
            .map(ToString::to_string)
            .collect();
        names.sort();
        names
    }

    /// Number of frames in the chain, this one included.
    pub fn depth(&self) -> usize {
        let mut depth = 1;
        let mut env = self.clone();
        while let Some(parent) = env.parent() {
            depth += 1;
            env = parent;
        }
        depth
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("names", &self.names())
            .field("depth", &self.depth())
            .finish()
    }
}

#[cfg(test)]
mod tests;
