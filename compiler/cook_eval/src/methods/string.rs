//! `String.prototype` methods and `String` statics.
//!
//! Positions are UTF-16 code unit offsets, as in JavaScript.

use std::rc::Rc;

use super::regexp::{self, Match};
use super::{arg, MethodTable};
use crate::errors::{self, EvalResult};
use crate::interpreter::Interpreter;
use crate::value::number::{is_js_whitespace, relative_index, to_integer_or_infinity};
use crate::value::{Value, MAX_STRING_LENGTH};

pub(crate) const METHODS: MethodTable = &[
    ("at", at),
    ("charAt", char_at),
    ("charCodeAt", char_code_at),
    ("codePointAt", code_point_at),
    ("concat", concat),
    ("endsWith", ends_with),
    ("includes", includes),
    ("indexOf", index_of),
    ("lastIndexOf", last_index_of),
    ("localeCompare", locale_compare),
    ("match", match_),
    ("matchAll", match_all),
    ("normalize", value_of),
    ("padEnd", pad_end),
    ("padStart", pad_start),
    ("repeat", repeat),
    ("replace", replace),
    ("replaceAll", replace_all),
    ("search", search),
    ("slice", slice),
    ("split", split),
    ("startsWith", starts_with),
    ("substr", substr),
    ("substring", substring),
    ("toLocaleLowerCase", to_lower_case),
    ("toLocaleUpperCase", to_upper_case),
    ("toLowerCase", to_lower_case),
    ("toString", value_of),
    ("toUpperCase", to_upper_case),
    ("trim", trim),
    ("trimEnd", trim_end),
    ("trimStart", trim_start),
    ("valueOf", value_of),
];

fn this_string(this: &Value, method: &str) -> EvalResult<Rc<str>> {
    match this {
        Value::String(s) => Ok(Rc::clone(s)),
        _ => Err(errors::wrong_receiver(method, "String")),
    }
}

fn units(s: &str) -> Vec<u16> {
    s.encode_utf16().collect()
}

fn from_units(units: &[u16]) -> Value {
    Value::from(String::from_utf16_lossy(units))
}

fn string_arg(interp: &mut Interpreter, args: &[Value], index: usize) -> EvalResult<Rc<str>> {
    interp.to_js_string(&arg(args, index))
}

/// Integer argument, `default` when absent or undefined.
fn int_arg(interp: &mut Interpreter, args: &[Value], index: usize, default: f64) -> EvalResult<f64> {
    match args.get(index) {
        None | Some(Value::Undefined) => Ok(default),
        Some(value) => Ok(to_integer_or_infinity(interp.to_number(value)?)),
    }
}

fn clamp(value: f64, len: usize) -> usize {
    value.max(0.0).min(len as f64) as usize
}

/// Position of `needle` in `haystack` at or after `from`.
fn find_units(haystack: &[u16], needle: &[u16], from: usize) -> Option<usize> {
    if needle.is_empty() {
        return (from <= haystack.len()).then_some(from);
    }
    if needle.len() > haystack.len() {
        return None;
    }
    (from..=haystack.len() - needle.len()).find(|&i| haystack[i..].starts_with(needle))
}

fn rfind_units(haystack: &[u16], needle: &[u16], from: usize) -> Option<usize> {
    if needle.len() > haystack.len() {
        return None;
    }
    let last = (haystack.len() - needle.len()).min(from);
    (0..=last).rev().find(|&i| haystack[i..].starts_with(needle))
}

fn at(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let s = units(&this_string(this, "at")?);
    let index = int_arg(interp, args, 0, 0.0)?;
    let index = if index < 0.0 { s.len() as f64 + index } else { index };
    if index < 0.0 || index >= s.len() as f64 {
        return Ok(Value::Undefined);
    }
    Ok(from_units(&s[index as usize..=index as usize]))
}

fn char_at(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let s = units(&this_string(this, "charAt")?);
    let index = int_arg(interp, args, 0, 0.0)?;
    if index < 0.0 || index >= s.len() as f64 {
        return Ok(Value::string(""));
    }
    Ok(from_units(&s[index as usize..=index as usize]))
}

fn char_code_at(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let s = units(&this_string(this, "charCodeAt")?);
    let index = int_arg(interp, args, 0, 0.0)?;
    if index < 0.0 || index >= s.len() as f64 {
        return Ok(Value::Number(f64::NAN));
    }
    Ok(Value::Number(f64::from(s[index as usize])))
}

fn code_point_at(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let s = units(&this_string(this, "codePointAt")?);
    let index = int_arg(interp, args, 0, 0.0)?;
    if index < 0.0 || index >= s.len() as f64 {
        return Ok(Value::Undefined);
    }
    let i = index as usize;
    let code = char::decode_utf16(s[i..].iter().copied())
        .next()
        .and_then(Result::ok)
        .map_or(u32::from(s[i]), u32::from);
    Ok(Value::Number(f64::from(code)))
}

fn concat(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let mut out = this_string(this, "concat")?.to_string();
    for value in args {
        out.push_str(&interp.to_js_string(value)?);
    }
    Ok(Value::from(out))
}

fn reject_regexp(value: &Value, method: &str) -> EvalResult<()> {
    if regexp::as_regexp(value).is_some() {
        return Err(errors::type_error(format!(
            "First argument to String.prototype.{method} must not be a regular expression"
        )));
    }
    Ok(())
}

fn ends_with(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let s = units(&this_string(this, "endsWith")?);
    reject_regexp(&arg(args, 0), "endsWith")?;
    let needle = units(&string_arg(interp, args, 0)?);
    let end = clamp(int_arg(interp, args, 1, s.len() as f64)?, s.len());
    Ok(Value::Bool(s[..end].ends_with(&needle)))
}

fn starts_with(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let s = units(&this_string(this, "startsWith")?);
    reject_regexp(&arg(args, 0), "startsWith")?;
    let needle = units(&string_arg(interp, args, 0)?);
    let start = clamp(int_arg(interp, args, 1, 0.0)?, s.len());
    Ok(Value::Bool(s[start..].starts_with(&needle)))
}

fn includes(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let s = units(&this_string(this, "includes")?);
    reject_regexp(&arg(args, 0), "includes")?;
    let needle = units(&string_arg(interp, args, 0)?);
    let start = clamp(int_arg(interp, args, 1, 0.0)?, s.len());
    Ok(Value::Bool(find_units(&s, &needle, start).is_some()))
}

fn index_of(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let s = units(&this_string(this, "indexOf")?);
    let needle = units(&string_arg(interp, args, 0)?);
    let start = clamp(int_arg(interp, args, 1, 0.0)?, s.len());
    Ok(Value::Number(find_units(&s, &needle, start).map_or(-1.0, |i| i as f64)))
}

fn last_index_of(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let s = units(&this_string(this, "lastIndexOf")?);
    let needle = units(&string_arg(interp, args, 0)?);
    let from = match args.get(1) {
        None | Some(Value::Undefined) => s.len(),
        Some(value) => {
            let n = interp.to_number(value)?;
            if n.is_nan() { s.len() } else { clamp(to_integer_or_infinity(n), s.len()) }
        }
    };
    Ok(Value::Number(rfind_units(&s, &needle, from).map_or(-1.0, |i| i as f64)))
}

fn locale_compare(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let s = this_string(this, "localeCompare")?;
    let other = string_arg(interp, args, 0)?;
    Ok(Value::Number(match s.cmp(&other) {
        std::cmp::Ordering::Less => -1.0,
        std::cmp::Ordering::Equal => 0.0,
        std::cmp::Ordering::Greater => 1.0,
    }))
}

/// The regex behind a `match`/`search`/`split` argument: a RegExp as is,
/// anything else compiled from its string form.
fn regexp_arg(interp: &mut Interpreter, value: &Value, flags: &str) -> EvalResult<(regex::Regex, String)> {
    if let Some(found) = regexp::as_regexp(value) {
        return Ok(found);
    }
    let source = match value {
        Value::Undefined => Rc::from(""),
        other => interp.to_js_string(other)?,
    };
    let regex = regexp::compile(&source, flags)
        .map_err(|_| errors::invalid_regex(&format!("/{source}/{flags}")))?;
    Ok((regex, flags.to_string()))
}

fn match_(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let s = this_string(this, "match")?;
    let pattern = arg(args, 0);
    let (regex, flags) = regexp_arg(interp, &pattern, "")?;
    if !flags.contains('g') {
        if regexp::as_regexp(&pattern).is_some() {
            return Ok(regexp::exec_regexp(&pattern, &s)?.map_or(Value::Null, |m| m.to_value(&s)));
        }
        return Ok(regexp::match_at(&regex, &s, 0).map_or(Value::Null, |m| m.to_value(&s)));
    }
    regexp::reset_last_index(&pattern);
    let matches = regexp::match_all(&regex, &s);
    if matches.is_empty() {
        return Ok(Value::Null);
    }
    Ok(Value::array(matches.into_iter().map(|m| Value::from(m.matched)).collect()))
}

/// Returns an array of match results rather than an iterator.
fn match_all(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let s = this_string(this, "matchAll")?;
    let pattern = arg(args, 0);
    let (regex, flags) = regexp_arg(interp, &pattern, "g")?;
    if !flags.contains('g') {
        return Err(errors::type_error(
            "String.prototype.matchAll called with a non-global RegExp argument",
        ));
    }
    Ok(Value::array(
        regexp::match_all(&regex, &s)
            .iter()
            .map(|m| m.to_value(&s))
            .collect(),
    ))
}

fn search(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let s = this_string(this, "search")?;
    let (regex, _) = regexp_arg(interp, &arg(args, 0), "")?;
    Ok(Value::Number(
        regexp::match_at(&regex, &s, 0).map_or(-1.0, |m| m.index as f64),
    ))
}

fn pad(interp: &mut Interpreter, this: &Value, args: &[Value], method: &str, at_start: bool) -> EvalResult<Value> {
    let s = this_string(this, method)?;
    let target = int_arg(interp, args, 0, 0.0)?;
    let filler = match args.get(1) {
        None | Some(Value::Undefined) => vec![u16::from(b' ')],
        Some(value) => units(&interp.to_js_string(value)?),
    };
    let len = s.encode_utf16().count();
    if target <= len as f64 || filler.is_empty() {
        return Ok(Value::String(s));
    }
    if target > MAX_STRING_LENGTH as f64 {
        return Err(errors::invalid_string_length());
    }
    let needed = target as usize - len;
    let padding: Vec<u16> = filler.iter().copied().cycle().take(needed).collect();
    let padding = String::from_utf16_lossy(&padding);
    Ok(Value::from(if at_start {
        format!("{padding}{s}")
    } else {
        format!("{s}{padding}")
    }))
}

fn pad_start(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    pad(interp, this, args, "padStart", true)
}

fn pad_end(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    pad(interp, this, args, "padEnd", false)
}

fn repeat(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let s = this_string(this, "repeat")?;
    let count = int_arg(interp, args, 0, 0.0)?;
    if count < 0.0 || count.is_infinite() {
        return Err(errors::invalid_count(count));
    }
    if s.is_empty() {
        return Ok(Value::string(""));
    }
    if count * s.len() as f64 > MAX_STRING_LENGTH as f64 {
        return Err(errors::invalid_string_length());
    }
    Ok(Value::from(s.repeat(count as usize)))
}

/// Expand `$` patterns of a replacement template.
fn expand(template: &str, m: &Match, subject: &str) -> String {
    let mut out = String::new();
    let mut chars = template.char_indices().peekable();
    while let Some((_, c)) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        match chars.peek().map(|&(_, next)| next) {
            Some('$') => {
                chars.next();
                out.push('$');
            }
            Some('&') => {
                chars.next();
                out.push_str(&m.matched);
            }
            Some('`') => {
                chars.next();
                out.push_str(&subject[..m.start]);
            }
            Some('\'') => {
                chars.next();
                out.push_str(&subject[m.end..]);
            }
            Some('<') if !m.named.is_empty() => {
                let rest: String = chars.clone().map(|(_, c)| c).collect();
                match rest[1..].find('>') {
                    Some(close) => {
                        let name = &rest[1..=close];
                        if let Some((_, Some(value))) = m.named.iter().find(|(n, _)| n == name) {
                            out.push_str(value);
                        }
                        for _ in 0..close + 2 {
                            chars.next();
                        }
                    }
                    None => out.push('$'),
                }
            }
            Some(d) if d.is_ascii_digit() => {
                let first = d.to_digit(10).unwrap_or(0) as usize;
                chars.next();
                let two = chars
                    .peek()
                    .and_then(|&(_, c)| c.to_digit(10))
                    .map(|second| first * 10 + second as usize)
                    .filter(|&n| n >= 1 && n <= m.groups.len());
                let index = match two {
                    Some(n) => {
                        chars.next();
                        n
                    }
                    None => first,
                };
                if index >= 1 && index <= m.groups.len() {
                    out.push_str(m.groups[index - 1].as_deref().unwrap_or_default());
                } else {
                    out.push('$');
                    out.push(d);
                }
            }
            _ => out.push('$'),
        }
    }
    out
}

/// Replace `matches` in `subject` with the template or replacer result.
fn splice_matches(interp: &mut Interpreter, subject: &str, matches: &[Match], replacement: &Value) -> EvalResult<Value> {
    let template = if replacement.is_callable() {
        None
    } else {
        Some(interp.to_js_string(replacement)?)
    };
    let mut out = String::with_capacity(subject.len());
    let mut last = 0;
    for m in matches {
        out.push_str(&subject[last..m.start]);
        match &template {
            Some(template) => out.push_str(&expand(template, m, subject)),
            None => {
                let mut call_args = vec![Value::string(&m.matched)];
                call_args.extend(
                    m.groups
                        .iter()
                        .map(|g| g.as_deref().map_or(Value::Undefined, Value::string)),
                );
                call_args.push(Value::Number(m.index as f64));
                call_args.push(Value::string(subject));
                if let Some(groups) = m.groups_value() {
                    call_args.push(groups);
                }
                let result = interp.call(replacement, &Value::Undefined, &call_args)?;
                out.push_str(&interp.to_js_string(&result)?);
            }
        }
        last = m.end;
    }
    out.push_str(&subject[last..]);
    Ok(Value::from(out))
}

/// Literal occurrences of `needle`, as matches.
fn literal_matches(subject: &str, needle: &str, all: bool) -> Vec<Match> {
    let mut found = Vec::new();
    let mut from = 0;
    while from <= subject.len() {
        let Some(offset) = subject[from..].find(needle) else {
            break;
        };
        let start = from + offset;
        let end = start + needle.len();
        found.push(Match {
            start,
            end,
            index: regexp::byte_to_utf16(subject, start),
            matched: needle.to_string(),
            groups: Vec::new(),
            named: Vec::new(),
        });
        if !all {
            break;
        }
        from = if needle.is_empty() {
            match subject[end..].chars().next() {
                Some(c) => end + c.len_utf8(),
                None => break,
            }
        } else {
            end
        };
    }
    found
}

fn replace_with(interp: &mut Interpreter, this: &Value, args: &[Value], method: &str, all: bool) -> EvalResult<Value> {
    let s = this_string(this, method)?;
    let pattern = arg(args, 0);
    let replacement = arg(args, 1);
    let matches = match regexp::as_regexp(&pattern) {
        Some((regex, flags)) => {
            if all && !flags.contains('g') {
                return Err(errors::type_error(
                    "replaceAll must be called with a global RegExp",
                ));
            }
            if flags.contains('g') {
                regexp::reset_last_index(&pattern);
                regexp::match_all(&regex, &s)
            } else {
                regexp::match_at(&regex, &s, 0).into_iter().collect()
            }
        }
        None => {
            let needle = interp.to_js_string(&pattern)?;
            literal_matches(&s, &needle, all)
        }
    };
    splice_matches(interp, &s, &matches, &replacement)
}

fn replace(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    replace_with(interp, this, args, "replace", false)
}

fn replace_all(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    replace_with(interp, this, args, "replaceAll", true)
}

fn slice(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let s = units(&this_string(this, "slice")?);
    let start = relative_index(int_arg(interp, args, 0, 0.0)?, s.len());
    let end = relative_index(int_arg(interp, args, 1, s.len() as f64)?, s.len());
    Ok(from_units(s.get(start..end.max(start)).unwrap_or_default()))
}

fn substring(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let s = units(&this_string(this, "substring")?);
    let a = clamp(int_arg(interp, args, 0, 0.0)?, s.len());
    let b = clamp(int_arg(interp, args, 1, s.len() as f64)?, s.len());
    Ok(from_units(&s[a.min(b)..a.max(b)]))
}

fn substr(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let s = units(&this_string(this, "substr")?);
    let start = relative_index(int_arg(interp, args, 0, 0.0)?, s.len());
    let count = clamp(int_arg(interp, args, 1, s.len() as f64)?, s.len() - start);
    Ok(from_units(&s[start..start + count]))
}

fn split(interp: &mut Interpreter, this: &Value, args: &[Value]) -> EvalResult<Value> {
    let s = this_string(this, "split")?;
    let separator = arg(args, 0);
    let limit = match args.get(1) {
        None | Some(Value::Undefined) => usize::MAX,
        Some(value) => interp.to_number(value)? as u32 as usize,
    };
    if limit == 0 {
        return Ok(Value::array(Vec::new()));
    }

    let mut parts: Vec<Value> = Vec::new();
    if let Some((regex, _)) = regexp::as_regexp(&separator) {
        if s.is_empty() {
            let matches_empty = regexp::match_at(&regex, &s, 0).is_some();
            return Ok(Value::array(if matches_empty { Vec::new() } else { vec![Value::String(s)] }));
        }
        let mut last = 0;
        for m in regexp::match_all(&regex, &s) {
            let empty = m.start == m.end;
            if empty && (m.start == 0 || m.start == s.len() || m.start == last) {
                continue;
            }
            parts.push(Value::string(&s[last..m.start]));
            parts.extend(m.groups.iter().map(|g| g.as_deref().map_or(Value::Undefined, Value::string)));
            last = m.end;
        }
        parts.push(Value::string(&s[last..]));
    } else if separator.is_undefined() {
        parts.push(Value::String(s));
    } else {
        let separator = interp.to_js_string(&separator)?;
        if separator.is_empty() {
            parts.extend(units(&s).chunks(1).map(from_units));
        } else {
            parts.extend(s.split(&*separator).map(Value::string));
        }
    }
    parts.truncate(limit);
    Ok(Value::array(parts))
}

fn to_lower_case(_interp: &mut Interpreter, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    Ok(Value::from(this_string(this, "toLowerCase")?.to_lowercase()))
}

fn to_upper_case(_interp: &mut Interpreter, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    Ok(Value::from(this_string(this, "toUpperCase")?.to_uppercase()))
}

fn trim(_interp: &mut Interpreter, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    Ok(Value::string(this_string(this, "trim")?.trim_matches(is_js_whitespace)))
}

fn trim_start(_interp: &mut Interpreter, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    Ok(Value::string(this_string(this, "trimStart")?.trim_start_matches(is_js_whitespace)))
}

fn trim_end(_interp: &mut Interpreter, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    Ok(Value::string(this_string(this, "trimEnd")?.trim_end_matches(is_js_whitespace)))
}

fn value_of(_interp: &mut Interpreter, this: &Value, _args: &[Value]) -> EvalResult<Value> {
    Ok(Value::String(this_string(this, "valueOf")?))
}

// Constructor and statics

/// `String(value)`.
pub(crate) fn call_constructor(interp: &mut Interpreter, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    match args.first() {
        None => Ok(Value::string("")),
        Some(value) => Ok(Value::String(interp.to_js_string(value)?)),
    }
}

/// `String.fromCharCode`.
pub(crate) fn from_char_code(interp: &mut Interpreter, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    let mut out = Vec::with_capacity(args.len());
    for value in args {
        out.push(crate::value::number::to_int32(interp.to_number(value)?) as u16);
    }
    Ok(from_units(&out))
}

/// `String.fromCodePoint`.
pub(crate) fn from_code_point(interp: &mut Interpreter, _this: &Value, args: &[Value]) -> EvalResult<Value> {
    let mut out = String::with_capacity(args.len());
    for value in args {
        let n = interp.to_number(value)?;
        let c = (n.fract() == 0.0 && n >= 0.0)
            .then(|| char::from_u32(n as u32))
            .flatten()
            .ok_or_else(|| errors::range_error(format!("Invalid code point {value}")))?;
        out.push(c);
    }
    Ok(Value::from(out))
}

#[cfg(test)]
mod tests;
