//! `repr()` and `str()` renderings.
//!
//! Renderings follow the scripting language's conventions: `repr` of a
//! string is quoted, `str` is not; floats print in their shortest
//! round-tripping form for `repr` and with 12 significant digits for
//! `str`; containers always render their elements with `repr`.

use std::fmt::Write as _;
use std::sync::Arc;

use rustc_hash::FxHashSet;

use super::Value;

impl Value {
    /// `repr(value)`
    pub fn repr(&self) -> String {
        let mut out = String::new();
        let mut seen = FxHashSet::default();
        write_repr(self, &mut out, &mut seen);
        out
    }

    /// `str(value)`
    pub fn to_str(&self) -> String {
        match self {
            Value::Str(s) => s.to_string(),
            Value::Float(f) => format_float_str(*f),
            Value::Exception(e) => e.message.clone(),
            Value::Buffer(buf) => buf.lock().clone(),
            Value::Custom(c) => c.text(),
            other => other.repr(),
        }
    }
}

fn write_repr(value: &Value, out: &mut String, seen: &mut FxHashSet<usize>) {
    reckon_stack::with_stack(|| match value {
        Value::None => out.push_str("None"),
        Value::Bool(true) => out.push_str("True"),
        Value::Bool(false) => out.push_str("False"),
        Value::Int(n) => {
            let _ = write!(out, "{n}");
        }
        Value::Float(f) => out.push_str(&format_float_repr(*f)),
        Value::Str(s) => out.push_str(&repr_str(s)),
        Value::Tuple(items) => {
            out.push('(');
            write_items(items, out, seen);
            if items.len() == 1 {
                out.push(',');
            }
            out.push(')');
        }
        Value::List(items) => {
            let id = Arc::as_ptr(items) as usize;
            if !seen.insert(id) {
                out.push_str("[...]");
                return;
            }
            let snapshot = items.lock().clone();
            out.push('[');
            write_items(&snapshot, out, seen);
            out.push(']');
            seen.remove(&id);
        }
        Value::Dict(dict) => {
            let id = Arc::as_ptr(dict) as usize;
            if !seen.insert(id) {
                out.push_str("{...}");
                return;
            }
            let snapshot = dict.lock().clone();
            out.push('{');
            for (i, (k, v)) in snapshot.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_repr(k, out, seen);
                out.push_str(": ");
                write_repr(v, out, seen);
            }
            out.push('}');
            seen.remove(&id);
        }
        Value::Namespace(ns) => {
            let id = Arc::as_ptr(ns) as usize;
            if !seen.insert(id) {
                out.push_str("namespace(...)");
                return;
            }
            let snapshot = ns.lock().clone();
            out.push_str("namespace(");
            for (i, (k, v)) in snapshot.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(k);
                out.push('=');
                write_repr(v, out, seen);
            }
            out.push(')');
            seen.remove(&id);
        }
        Value::Buffer(_) => out.push_str("<buffer>"),
        Value::Function(f) => {
            let _ = write!(out, "<function {}>", f.name());
        }
        Value::Builtin(b) => {
            let _ = write!(out, "<built-in function {}>", b.name());
        }
        Value::BoundMethod(m) => {
            let _ = write!(
                out,
                "<built-in method {} of {} object>",
                m.name,
                m.receiver.type_name()
            );
        }
        Value::Type(t) => {
            let _ = write!(out, "<type '{}'>", t.name());
        }
        Value::ExceptionType(name) => {
            let _ = write!(out, "<type '{name}'>");
        }
        Value::Exception(e) => {
            if e.message.is_empty() {
                let _ = write!(out, "{}()", e.type_name);
            } else {
                let _ = write!(out, "{}({},)", e.type_name, repr_str(&e.message));
            }
        }
        Value::Custom(c) => {
            let _ = write!(out, "<{} result>", c.kind());
        }
    });
}

fn write_items(items: &[Value], out: &mut String, seen: &mut FxHashSet<usize>) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_repr(item, out, seen);
    }
}

/// Quoted string literal. Single quotes unless the text contains a single
/// quote and no double quote.
pub fn repr_str(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// Shortest round-tripping float text: `0.1`, `1.0`, `1e+20`, `1e-05`.
pub fn format_float_repr(f: f64) -> String {
    if let Some(special) = special_float(f) {
        return special.to_owned();
    }
    let magnitude = f.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        return fix_exponent(&format!("{f:e}"));
    }
    let mut text = format!("{f}");
    if !text.contains('.') {
        text.push_str(".0");
    }
    text
}

/// Float text with 12 significant digits, as `str()` and `print` show it.
pub fn format_float_str(f: f64) -> String {
    const PRECISION: i32 = 12;
    if let Some(special) = special_float(f) {
        return special.to_owned();
    }
    let sci = format!("{:.*e}", PRECISION.unsigned_abs() as usize - 1, f);
    let exponent: i32 = sci
        .split_once('e')
        .and_then(|(_, e)| e.parse().ok())
        .unwrap_or(0);
    if exponent < -4 || exponent >= PRECISION {
        let (mantissa, _) = sci.split_once('e').unwrap_or((&sci, ""));
        let mantissa = trim_fraction(mantissa);
        return fix_exponent(&format!("{mantissa}e{exponent}"));
    }
    let decimals = usize::try_from(PRECISION - 1 - exponent).unwrap_or(0);
    let fixed = format!("{f:.decimals$}");
    let mut text = trim_fraction(&fixed).to_owned();
    if !text.contains('.') {
        text.push_str(".0");
    }
    text
}

fn special_float(f: f64) -> Option<&'static str> {
    if f.is_nan() {
        Some("nan")
    } else if f.is_infinite() {
        Some(if f > 0.0 { "inf" } else { "-inf" })
    } else {
        None
    }
}

/// Drop trailing fractional zeros and a dangling point.
fn trim_fraction(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

/// `1e20` becomes `1e+20`; `1.5e-5` becomes `1.5e-05`.
fn fix_exponent(text: &str) -> String {
    let Some((mantissa, exponent)) = text.split_once('e') else {
        return text.to_owned();
    };
    let (sign, digits) = match exponent.strip_prefix('-') {
        Some(digits) => ('-', digits),
        None => ('+', exponent.trim_start_matches('+')),
    };
    format!("{mantissa}e{sign}{digits:0>2}")
}
