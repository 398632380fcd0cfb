//! Runtime values.
//!
//! Primitives are stored inline; everything else is an [`Object`], a shared
//! mutable cell whose [`ObjectKind`] decides which built-in behaviour it
//! has. There are no prototype chains: built-in methods are resolved by
//! kind at property lookup (see `crate::methods`).

mod json;
pub mod number;
mod property;
mod table;

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use cook_ir::Function;

use crate::environment::Environment;
use crate::errors::EvalResult;
use crate::interpreter::{Interpreter, Program};

pub use json::{from_json, to_json};

/// Longest array kept in dense storage. Growing past it is a `RangeError`.
pub const MAX_ARRAY_LENGTH: usize = 1 << 22;

/// Longest string, in bytes, an operation may build.
pub const MAX_STRING_LENGTH: usize = 1 << 29;
pub(crate) use json::Stringifier;
pub use number::number_to_string;
pub use property::PropertyMap;
pub use table::OrderedTable;

/// Signature of built-in functions and methods. The second argument is the
/// receiver (`this`).
pub type NativeFn = fn(&mut Interpreter, &Value, &[Value]) -> EvalResult<Value>;

/// Signature of built-in constructors invoked with `new`.
pub type NativeCtor = fn(&mut Interpreter, &[Value]) -> EvalResult<Value>;

/// A function supplied by the host. Receives `this` and the arguments.
pub type HostFn = Rc<dyn Fn(&Value, &[Value]) -> EvalResult<Value>>;

/// A runtime value.
#[derive(Clone, Debug, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(Rc<str>),
    Object(Object),
}

/// Shared handle to a heap object.
#[derive(Clone)]
pub struct Object(Rc<RefCell<ObjectData>>);

/// An object's state.
pub struct ObjectData {
    pub kind: ObjectKind,
    pub properties: PropertyMap,
    /// Set by `Object.freeze`; writes throw.
    pub frozen: bool,
}

/// What kind of built-in object this is.
pub enum ObjectKind {
    Ordinary,
    /// Holes are stored as `undefined`.
    Array(Vec<Value>),
    Function(Callable),
    Error(ErrorData),
    /// Milliseconds since the epoch; NaN for invalid dates.
    Date(f64),
    Map(OrderedTable),
    Set(OrderedTable),
    WeakMap(OrderedTable),
    WeakSet(OrderedTable),
    UrlSearchParams(Vec<(String, String)>),
    RegExp(Box<RegExpData>),
    /// Stand-in for an intrinsic the sandbox never hands out (`Function`,
    /// `Object`, prototypes). Any access to it throws.
    Reserved(&'static str),
}

/// Something callable.
pub enum Callable {
    Closure(Closure),
    Builtin(Builtin),
    Host(HostFunction),
}

/// A function created by evaluating a function node.
pub struct Closure {
    pub func: Rc<Function>,
    /// Environment the function was created in.
    pub env: Environment,
    /// Source and scope analysis the function body belongs to.
    pub program: Rc<Program>,
}

/// A function implemented by the interpreter.
#[derive(Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub call: NativeFn,
    pub construct: Option<NativeCtor>,
}

/// A function implemented by the host.
#[derive(Clone)]
pub struct HostFunction {
    pub name: Rc<str>,
    pub call: HostFn,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorData {
    pub name: String,
    pub message: String,
}

#[derive(Clone, Debug)]
pub struct RegExpData {
    pub source: String,
    pub flags: String,
    pub regex: regex::Regex,
    pub last_index: usize,
}

impl RegExpData {
    pub fn global(&self) -> bool {
        self.flags.contains('g')
    }
}

impl Object {
    pub fn new(kind: ObjectKind) -> Self {
        Self::with_properties(kind, PropertyMap::new())
    }

    pub fn with_properties(kind: ObjectKind, properties: PropertyMap) -> Self {
        Object(Rc::new(RefCell::new(ObjectData {
            kind,
            properties,
            frozen: false,
        })))
    }

    pub fn ordinary(properties: PropertyMap) -> Self {
        Self::with_properties(ObjectKind::Ordinary, properties)
    }

    pub fn array(items: Vec<Value>) -> Self {
        Self::new(ObjectKind::Array(items))
    }

    pub fn builtin(builtin: Builtin) -> Self {
        Self::new(ObjectKind::Function(Callable::Builtin(builtin)))
    }

    #[inline]
    pub fn borrow(&self) -> Ref<'_, ObjectData> {
        self.0.borrow()
    }

    #[inline]
    pub fn borrow_mut(&self) -> RefMut<'_, ObjectData> {
        self.0.borrow_mut()
    }

    #[inline]
    pub fn ptr_eq(&self, other: &Object) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Identity of the object, stable while it is alive.
    #[inline]
    pub fn addr(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }

    pub fn is_callable(&self) -> bool {
        matches!(self.borrow().kind, ObjectKind::Function(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self.borrow().kind, ObjectKind::Array(_))
    }

    /// Array elements, if this is an array.
    pub fn array_items(&self) -> Option<Vec<Value>> {
        match &self.borrow().kind {
            ObjectKind::Array(items) => Some(items.clone()),
            _ => None,
        }
    }
}

impl ObjectKind {
    /// Name used in diagnostics and `Object.prototype.toString`.
    pub fn class_name(&self) -> &'static str {
        match self {
            ObjectKind::Ordinary => "Object",
            ObjectKind::Array(_) => "Array",
            ObjectKind::Function(_) => "Function",
            ObjectKind::Error(_) => "Error",
            ObjectKind::Date(_) => "Date",
            ObjectKind::Map(_) => "Map",
            ObjectKind::Set(_) => "Set",
            ObjectKind::WeakMap(_) => "WeakMap",
            ObjectKind::WeakSet(_) => "WeakSet",
            ObjectKind::UrlSearchParams(_) => "URLSearchParams",
            ObjectKind::RegExp(_) => "RegExp",
            ObjectKind::Reserved(name) => name,
        }
    }
}

impl Callable {
    pub fn name(&self) -> String {
        match self {
            Callable::Closure(closure) => closure.func.name().unwrap_or_default().to_string(),
            Callable::Builtin(builtin) => builtin.name.to_string(),
            Callable::Host(host) => host.name.to_string(),
        }
    }

    /// Declared parameter count, up to the first default or rest.
    pub fn length(&self) -> usize {
        match self {
            Callable::Closure(closure) => closure
                .func
                .params
                .iter()
                .take_while(|param| {
                    !matches!(
                        param,
                        cook_ir::Pattern::Assignment(_) | cook_ir::Pattern::Rest(_)
                    )
                })
                .count(),
            Callable::Builtin(_) | Callable::Host(_) => 0,
        }
    }

    /// Source text of a closure, or a native placeholder.
    pub fn source_text(&self) -> String {
        match self {
            Callable::Closure(closure) => closure
                .func
                .span
                .snippet(&closure.program.source)
                .map_or_else(
                    || format!("function {}() {{ [code] }}", self.name()),
                    ToString::to_string,
                ),
            Callable::Builtin(_) | Callable::Host(_) => {
                format!("function {}() {{ [native code] }}", self.name())
            }
        }
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.try_borrow();
        match data {
            Ok(data) => match &data.kind {
                ObjectKind::Array(items) => write!(f, "Array(len={})", items.len()),
                ObjectKind::Function(callable) => write!(f, "Function({})", callable.name()),
                kind => write!(
                    f,
                    "{}({} properties)",
                    kind.class_name(),
                    data.properties.len()
                ),
            },
            Err(_) => f.write_str("Object(<borrowed>)"),
        }
    }
}

impl Value {
    pub fn string(s: &str) -> Self {
        Value::String(Rc::from(s))
    }

    pub fn array(items: Vec<Value>) -> Self {
        Value::Object(Object::array(items))
    }

    /// A plain object with the given own properties.
    pub fn object<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Object(Object::ordinary(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    /// Wrap a host closure as a callable value.
    pub fn host_function(
        name: &str,
        call: impl Fn(&Value, &[Value]) -> EvalResult<Value> + 'static,
    ) -> Self {
        Value::Object(Object::new(ObjectKind::Function(Callable::Host(
            HostFunction {
                name: Rc::from(name),
                call: Rc::new(call),
            },
        ))))
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_callable(&self) -> bool {
        self.as_object().is_some_and(Object::is_callable)
    }

    /// The `typeof` operator.
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "object",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Object(obj) if obj.is_callable() => "function",
            Value::Object(_) => "object",
        }
    }

    /// `ToBoolean`.
    pub fn to_boolean(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => !(n.is_nan() || *n == 0.0),
            Value::String(s) => !s.is_empty(),
            Value::Object(_) => true,
        }
    }

    /// `ToNumber` for primitives. Objects go through
    /// `Interpreter::to_number`, which may run user code.
    pub fn primitive_to_number(&self) -> f64 {
        match self {
            Value::Undefined => f64::NAN,
            Value::Null => 0.0,
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Number(n) => *n,
            Value::String(s) => number::string_to_number(s),
            Value::Object(_) => number::string_to_number(&self.to_string()),
        }
    }

    /// `IsStrictlyEqual`.
    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// `SameValueZero`, used by `includes` and the keyed collections.
    pub fn same_value_zero(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) if a.is_nan() && b.is_nan() => true,
            _ => self.strict_equals(other),
        }
    }

    /// `SameValue`, used by `Object.is`.
    pub fn same_value(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => {
                (a.is_nan() && b.is_nan()) || (a == b && a.is_sign_negative() == b.is_sign_negative())
            }
            _ => self.strict_equals(other),
        }
    }

    /// Read an own property without running user code. Meant for hosts
    /// inspecting results.
    pub fn get(&self, key: &str) -> Value {
        match self {
            Value::String(s) if key == "length" => Value::Number(s.encode_utf16().count() as f64),
            Value::Object(obj) => {
                let data = obj.borrow();
                if let ObjectKind::Array(items) = &data.kind {
                    if key == "length" {
                        return Value::Number(items.len() as f64);
                    }
                    if let Some(index) = number::array_index(key) {
                        return items.get(index).cloned().unwrap_or_default();
                    }
                }
                data.properties.get(key).cloned().unwrap_or_default()
            }
            _ => Value::Undefined,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Rc::from(s))
    }
}

impl From<Object> for Value {
    fn from(obj: Object) -> Self {
        Value::Object(obj)
    }
}

/// Structural equality for tests and host comparisons: primitives by
/// `SameValue`, arrays and plain objects by contents, everything else by
/// identity.
impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Object(a), Value::Object(b)) => {
                if a.ptr_eq(b) {
                    return true;
                }
                let (a, b) = (a.borrow(), b.borrow());
                match (&a.kind, &b.kind) {
                    (ObjectKind::Array(x), ObjectKind::Array(y)) => x == y,
                    (ObjectKind::Ordinary, ObjectKind::Ordinary) => {
                        a.properties.entries() == b.properties.entries()
                    }
                    (ObjectKind::Error(x), ObjectKind::Error(y)) => x == y,
                    _ => false,
                }
            }
            _ => self.same_value(other),
        }
    }
}

/// `ToString` without running user code.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => f.write_str(&number_to_string(*n)),
            Value::String(s) => f.write_str(s),
            Value::Object(obj) => f.write_str(&default_object_string(obj, &mut Vec::new())),
        }
    }
}

/// Built-in string conversion of an object. `seen` breaks cycles through
/// arrays, which convert to the empty string like in browsers.
pub(crate) fn default_object_string(obj: &Object, seen: &mut Vec<usize>) -> String {
    let data = obj.borrow();
    match &data.kind {
        ObjectKind::Array(items) => {
            if seen.contains(&obj.addr()) {
                return String::new();
            }
            seen.push(obj.addr());
            let parts: Vec<String> = items
                .iter()
                .map(|item| match item {
                    Value::Undefined | Value::Null => String::new(),
                    Value::Object(inner) => default_object_string(inner, seen),
                    other => other.to_string(),
                })
                .collect();
            seen.pop();
            parts.join(",")
        }
        ObjectKind::Function(callable) => callable.source_text(),
        ObjectKind::Error(error) if error.message.is_empty() => error.name.clone(),
        ObjectKind::Error(error) => format!("{}: {}", error.name, error.message),
        ObjectKind::Date(time) => crate::methods::date::to_date_string(*time),
        ObjectKind::RegExp(re) => format!("/{}/{}", re.source, re.flags),
        ObjectKind::UrlSearchParams(pairs) => crate::methods::url::serialize(pairs),
        ObjectKind::Reserved(name) => format!("function {name}() {{ [native code] }}"),
        kind => format!("[object {}]", kind.class_name()),
    }
}

#[cfg(test)]
mod tests;
