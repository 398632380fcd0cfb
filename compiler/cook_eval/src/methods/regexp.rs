//! Regular expressions on top of the `regex` crate.
//!
//! Patterns are translated from JavaScript syntax where the two differ.
//! Backreferences and lookaround have no equivalent and are rejected as
//! invalid patterns. Indexes exposed to evaluated code (`index`,
//! `lastIndex`) are UTF-16 offsets.

use regex::{Captures, Regex, RegexBuilder};

use super::{arg, MethodTable};
use crate::errors::{self, EvalResult};
use crate::interpreter::Interpreter;
use crate::value::{Object, ObjectKind, PropertyMap, RegExpData, Value};

pub(crate) const METHODS: MethodTable = &[("exec", exec), ("test", test), ("toString", to_string)];

const FLAGS: &str = "dgimsuy";

/// Rewrite JavaScript-only syntax into the `regex` dialect.
fn translate(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars().peekable();
    let mut in_class = false;
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('/') => out.push('/'),
                Some('0') if !chars.peek().is_some_and(char::is_ascii_digit) => out.push_str("\\x00"),
                Some('c') => match chars.next() {
                    Some(letter) if letter.is_ascii_alphabetic() => {
                        let code = (letter.to_ascii_uppercase() as u8) - b'A' + 1;
                        out.push_str(&format!("\\x{code:02X}"));
                    }
                    Some(other) => {
                        out.push_str("\\\\c");
                        out.push(other);
                    }
                    None => out.push_str("\\\\c"),
                },
                Some(escaped) => {
                    out.push('\\');
                    out.push(escaped);
                }
                None => out.push('\\'),
            },
            '[' if !in_class => {
                if pattern_starts_with(&chars, "^]") {
                    chars.next();
                    chars.next();
                    out.push_str("[\\s\\S]");
                } else if pattern_starts_with(&chars, "]") {
                    chars.next();
                    out.push_str("[^\\s\\S]");
                } else {
                    in_class = true;
                    out.push('[');
                }
            }
            '[' => out.push_str("\\["),
            ']' if in_class => {
                in_class = false;
                out.push(']');
            }
            _ => out.push(c),
        }
    }
    out
}

fn pattern_starts_with(chars: &std::iter::Peekable<std::str::Chars<'_>>, prefix: &str) -> bool {
    chars.clone().take(prefix.chars().count()).eq(prefix.chars())
}

/// Compile `pattern` with JavaScript `flags`.
pub(crate) fn compile(pattern: &str, flags: &str) -> Result<Regex, String> {
    for (i, flag) in flags.char_indices() {
        if !FLAGS.contains(flag) || flags[..i].contains(flag) {
            return Err(format!("Invalid flags supplied to RegExp constructor '{flags}'"));
        }
    }
    RegexBuilder::new(&translate(pattern))
        .case_insensitive(flags.contains('i'))
        .multi_line(flags.contains('m'))
        .dot_matches_new_line(flags.contains('s'))
        .build()
        .map_err(|err| err.to_string())
}

/// A RegExp object for a literal.
pub(crate) fn create(pattern: &str, flags: &str) -> EvalResult<Value> {
    let regex = compile(pattern, flags)
        .map_err(|_| errors::invalid_regex(&format!("/{pattern}/{flags}")))?;
    Ok(Value::Object(Object::new(ObjectKind::RegExp(Box::new(
        RegExpData {
            source: if pattern.is_empty() { "(?:)".to_string() } else { pattern.to_string() },
            flags: flags.to_string(),
            regex,
            last_index: 0,
        },
    )))))
}

/// UTF-16 offset of byte offset `byte` in `s`.
pub(crate) fn byte_to_utf16(s: &str, byte: usize) -> usize {
    s.get(..byte).map_or(0, |prefix| prefix.encode_utf16().count())
}

/// Byte offset of UTF-16 offset `index` in `s`, rounded up to a char
/// boundary and clamped to the end.
pub(crate) fn utf16_to_byte(s: &str, index: usize) -> usize {
    let mut units = 0;
    for (byte, c) in s.char_indices() {
        if units >= index {
            return byte;
        }
        units += c.len_utf16();
    }
    s.len()
}

/// One match, with offsets in both units.
pub(crate) struct Match {
    pub start: usize,
    pub end: usize,
    /// UTF-16 start offset.
    pub index: usize,
    pub matched: String,
    pub groups: Vec<Option<String>>,
    pub named: Vec<(String, Option<String>)>,
}

impl Match {
    fn from_captures(regex: &Regex, subject: &str, caps: &Captures<'_>) -> Option<Match> {
        let whole = caps.get(0)?;
        let groups = (1..caps.len())
            .map(|i| caps.get(i).map(|m| m.as_str().to_string()))
            .collect();
        let named = regex
            .capture_names()
            .flatten()
            .map(|name| (name.to_string(), caps.name(name).map(|m| m.as_str().to_string())))
            .collect();
        Some(Match {
            start: whole.start(),
            end: whole.end(),
            index: byte_to_utf16(subject, whole.start()),
            matched: whole.as_str().to_string(),
            groups,
            named,
        })
    }

    /// The array `exec` returns.
    pub(crate) fn to_value(&self, subject: &str) -> Value {
        let mut items = vec![Value::string(&self.matched)];
        items.extend(
            self.groups
                .iter()
                .map(|group| group.as_deref().map_or(Value::Undefined, Value::string)),
        );
        let groups = if self.named.is_empty() {
            Value::Undefined
        } else {
            Value::object(self.named.iter().map(|(name, value)| {
                (name.clone(), value.as_deref().map_or(Value::Undefined, Value::string))
            }))
        };
        let mut properties = PropertyMap::new();
        properties.insert("index", Value::Number(self.index as f64));
        properties.insert("input", Value::string(subject));
        properties.insert("groups", groups);
        Value::Object(Object::with_properties(ObjectKind::Array(items), properties))
    }

    /// The `groups` object passed to replacer functions.
    pub(crate) fn groups_value(&self) -> Option<Value> {
        (!self.named.is_empty()).then(|| {
            Value::object(self.named.iter().map(|(name, value)| {
                (name.clone(), value.as_deref().map_or(Value::Undefined, Value::string))
            }))
        })
    }
}

/// First match at or after byte offset `start`.
pub(crate) fn match_at(regex: &Regex, subject: &str, start: usize) -> Option<Match> {
    if start > subject.len() {
        return None;
    }
    let caps = regex.captures_at(subject, start)?;
    Match::from_captures(regex, subject, &caps)
}

/// Every non-overlapping match.
pub(crate) fn match_all(regex: &Regex, subject: &str) -> Vec<Match> {
    regex
        .captures_iter(subject)
        .filter_map(|caps| Match::from_captures(regex, subject, &caps))
        .collect()
}

/// `(regex, flags)` of a RegExp value, if it is one.
pub(crate) fn as_regexp(value: &Value) -> Option<(Regex, String)> {
    let obj = value.as_object()?;
    let data = obj.borrow();
    match &data.kind {
        ObjectKind::RegExp(re) => Some((re.regex.clone(), re.flags.clone())),
        _ => None,
    }
}

/// Reset `lastIndex` of a RegExp value.
pub(crate) fn reset_last_index(value: &Value) {
    if let Some(obj) = value.as_object() {
        if let ObjectKind::RegExp(re) = &mut obj.borrow_mut().kind {
            re.last_index = 0;
        }
    }
}

/// `RegExpBuiltinExec`: honours and updates `lastIndex` for global and
/// sticky expressions.
pub(crate) fn exec_regexp(this: &Value, subject: &str) -> EvalResult<Option<Match>> {
    let obj = this
        .as_object()
        .filter(|obj| matches!(obj.borrow().kind, ObjectKind::RegExp(_)))
        .ok_or_else(|| errors::wrong_receiver("exec", "RegExp"))?;
    let (regex, flags, last_index) = match &obj.borrow().kind {
        ObjectKind::RegExp(re) => (re.regex.clone(), re.flags.clone(), re.last_index),
        _ => return Err(errors::wrong_receiver("exec", "RegExp")),
    };
    let tracks = flags.contains('g') || flags.contains('y');
    let start = if tracks { last_index } else { 0 };

    let found = if start > subject.encode_utf16().count() {
        None
    } else {
        let byte_start = utf16_to_byte(subject, start);
        match_at(&regex, subject, byte_start)
            .filter(|m| !flags.contains('y') || m.start == byte_start)
    };
    if tracks {
        if let ObjectKind::RegExp(re) = &mut obj.borrow_mut().kind {
            re.last_index = found
                .as_ref()
                .map_or(0, |m| byte_to_utf16(subject, m.end));
        }
    }
    Ok(found)
}

fn exec(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let subject = interp.to_js_string(&arg(args, 0))?;
    Ok(exec_regexp(this, &subject)?.map_or(Value::Null, |m| m.to_value(&subject)))
}

fn test(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let subject = interp.to_js_string(&arg(args, 0))?;
    Ok(Value::Bool(exec_regexp(this, &subject)?.is_some()))
}

fn to_string(_interp: &mut Interpreter, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    Ok(Value::from(this.to_string()))
}

#[cfg(test)]
mod tests;
