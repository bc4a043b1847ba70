//! Methods of the builtin container and string types.
//!
//! `receiver.name(...)` on a builtin type dispatches here. Shared
//! containers are snapshotted before any element comparison and locked
//! only for the final read or write, so `a.extend(a)` or
//! `a.remove(a)` never deadlock.

use crate::builtins::{iterate, sort_values};
use crate::errors::{
    index_out_of_range, key_error, no_attribute, type_error, value_error, ErrorKind, EvalError,
    EvalResult,
};
use crate::value::Value;

const LIST_METHODS: &[&str] = &[
    "append", "count", "extend", "index", "insert", "pop", "remove", "reverse", "sort",
];
const DICT_METHODS: &[&str] = &[
    "clear", "copy", "get", "has_key", "items", "keys", "pop", "popitem", "setdefault",
    "update", "values",
];
const STR_METHODS: &[&str] = &[
    "capitalize", "count", "endswith", "find", "format", "isalpha", "isdigit", "isspace",
    "join", "ljust", "lower", "lstrip", "replace", "rjust", "rstrip", "split", "splitlines",
    "startswith", "strip", "title", "upper", "zfill",
];
const TUPLE_METHODS: &[&str] = &["count", "index"];
const BUFFER_METHODS: &[&str] = &["getvalue", "truncate", "write"];

/// Method names of `receiver`'s type, sorted.
pub fn method_names(receiver: &Value) -> &'static [&'static str] {
    match receiver {
        Value::List(_) => LIST_METHODS,
        Value::Dict(_) => DICT_METHODS,
        Value::Str(_) => STR_METHODS,
        Value::Tuple(_) => TUPLE_METHODS,
        Value::Buffer(_) => BUFFER_METHODS,
        _ => &[],
    }
}

pub fn has_method(receiver: &Value, name: &str) -> bool {
    method_names(receiver).contains(&name)
}

fn arity(name: &str, args: &[Value], min: usize, max: usize) -> EvalResult<()> {
    let n = args.len();
    if n < min || n > max {
        let expected = if min == max {
            format!("exactly {min}")
        } else if n < min {
            format!("at least {min}")
        } else {
            format!("at most {max}")
        };
        let noun = if expected.ends_with('1') { "argument" } else { "arguments" };
        return Err(type_error(format!(
            "{name}() takes {expected} {noun} ({n} given)"
        )));
    }
    Ok(())
}

fn arg(args: &[Value], i: usize) -> Value {
    args.get(i).cloned().unwrap_or(Value::None)
}

/// Resolve a possibly negative index; `None` when out of range.
pub(crate) fn normalize_index(index: i64, len: usize) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let i = if index < 0 { index + len } else { index };
    (0..len).contains(&i).then(|| usize::try_from(i).ok()).flatten()
}

/// Call `receiver.name(*args, **kwargs)`.
pub fn call_method(
    receiver: &Value,
    name: &str,
    args: Vec<Value>,
    kwargs: Vec<(String, Value)>,
) -> EvalResult {
    if let Some((key, _)) = kwargs.first() {
        if !(name == "sort" || (name == "update" && matches!(receiver, Value::Dict(_)))) {
            return Err(type_error(format!(
                "{name}() takes no keyword arguments ('{key}' given)"
            )));
        }
    }
    match receiver {
        Value::List(_) => list_method(receiver, name, &args, kwargs),
        Value::Dict(_) => dict_method(receiver, name, &args, kwargs),
        Value::Str(s) => str_method(s, name, &args),
        Value::Tuple(items) => sequence_query(items, name, &args, "tuple"),
        Value::Buffer(buf) => match name {
            "write" => {
                arity(name, &args, 1, 1)?;
                let text = match &args[0] {
                    Value::Str(s) => s.to_string(),
                    other => {
                        return Err(type_error(format!(
                            "write() argument must be str, not {}",
                            other.type_name()
                        )))
                    }
                };
                buf.lock().push_str(&text);
                Ok(Value::None)
            }
            "getvalue" => {
                arity(name, &args, 0, 0)?;
                Ok(Value::string(buf.lock().as_str()))
            }
            "truncate" => {
                arity(name, &args, 0, 0)?;
                buf.lock().clear();
                Ok(Value::None)
            }
            _ => Err(no_attribute(receiver.type_name(), name)),
        },
        _ => Err(no_attribute(receiver.type_name(), name)),
    }
}

fn sequence_query(items: &[Value], name: &str, args: &[Value], type_name: &str) -> EvalResult {
    match name {
        "count" => {
            arity(name, args, 1, 1)?;
            let n = items.iter().filter(|x| x.equals(&args[0])).count();
            Ok(Value::Int(i64::try_from(n).unwrap_or(i64::MAX)))
        }
        "index" => {
            arity(name, args, 1, 1)?;
            items
                .iter()
                .position(|x| x.equals(&args[0]))
                .map(|i| Value::Int(i64::try_from(i).unwrap_or(i64::MAX)))
                .ok_or_else(|| value_error(format!("{type_name}.index(x): x not in {type_name}")))
        }
        _ => Err(no_attribute(type_name, name)),
    }
}

fn list_method(
    receiver: &Value,
    name: &str,
    args: &[Value],
    kwargs: Vec<(String, Value)>,
) -> EvalResult {
    let Value::List(list) = receiver else {
        return Err(no_attribute(receiver.type_name(), name));
    };
    match name {
        "append" => {
            arity(name, args, 1, 1)?;
            list.lock().push(arg(args, 0));
        }
        "extend" => {
            arity(name, args, 1, 1)?;
            let items = iterate(&args[0])?;
            list.lock().extend(items);
        }
        "insert" => {
            arity(name, args, 2, 2)?;
            let index = args[0].expect_int("insert() index")?;
            let mut items = list.lock();
            let len = i64::try_from(items.len()).unwrap_or(i64::MAX);
            let at = if index < 0 { (index + len).max(0) } else { index.min(len) };
            items.insert(usize::try_from(at).unwrap_or(0), arg(args, 1));
        }
        "pop" => {
            arity(name, args, 0, 1)?;
            let index = match args.first() {
                Some(i) => i.expect_int("pop() index")?,
                None => -1,
            };
            let mut items = list.lock();
            if items.is_empty() {
                return Err(EvalError::new(ErrorKind::Index, "pop from empty list"));
            }
            let i = normalize_index(index, items.len())
                .ok_or_else(|| index_out_of_range("pop"))?;
            return Ok(items.remove(i));
        }
        "remove" => {
            arity(name, args, 1, 1)?;
            let snapshot = list.lock().clone();
            let i = snapshot
                .iter()
                .position(|x| x.equals(&args[0]))
                .ok_or_else(|| value_error("list.remove(x): x not in list"))?;
            list.lock().remove(i);
        }
        "reverse" => {
            arity(name, args, 0, 0)?;
            list.lock().reverse();
        }
        "sort" => {
            arity(name, args, 0, 0)?;
            let mut reverse = false;
            for (key, value) in kwargs {
                if key != "reverse" {
                    return Err(type_error(format!(
                        "sort() got an unexpected keyword argument '{key}'"
                    )));
                }
                reverse = value.is_truthy();
            }
            let mut snapshot = list.lock().clone();
            sort_values(&mut snapshot, reverse)?;
            *list.lock() = snapshot;
        }
        "count" | "index" => {
            let snapshot = list.lock().clone();
            return sequence_query(&snapshot, name, args, "list");
        }
        _ => return Err(no_attribute("list", name)),
    }
    Ok(Value::None)
}

fn dict_method(
    receiver: &Value,
    name: &str,
    args: &[Value],
    kwargs: Vec<(String, Value)>,
) -> EvalResult {
    let Value::Dict(dict) = receiver else {
        return Err(no_attribute(receiver.type_name(), name));
    };
    match name {
        "keys" | "values" | "items" => {
            arity(name, args, 0, 0)?;
            let d = dict.lock();
            Ok(Value::list(match name {
                "keys" => d.keys(),
                "values" => d.values(),
                _ => d.items(),
            }))
        }
        "get" => {
            arity(name, args, 1, 2)?;
            Ok(dict.lock().get(&args[0])?.unwrap_or_else(|| arg(args, 1)))
        }
        "has_key" => {
            arity(name, args, 1, 1)?;
            Ok(Value::Bool(dict.lock().contains(&args[0])?))
        }
        "pop" => {
            arity(name, args, 1, 2)?;
            match dict.lock().remove(&args[0])? {
                Some(v) => Ok(v),
                None if args.len() == 2 => Ok(arg(args, 1)),
                None => Err(key_error(args[0].repr())),
            }
        }
        "popitem" => {
            arity(name, args, 0, 0)?;
            dict.lock()
                .pop_first()
                .map(|(k, v)| Value::tuple(vec![k, v]))
                .ok_or_else(|| key_error("'popitem(): dictionary is empty'".to_owned()))
        }
        "setdefault" => {
            arity(name, args, 1, 2)?;
            let mut d = dict.lock();
            if let Some(v) = d.get(&args[0])? {
                return Ok(v);
            }
            let default = arg(args, 1);
            d.insert(args[0].clone(), default.clone())?;
            Ok(default)
        }
        "update" => {
            arity(name, args, 0, 1)?;
            let mut pairs = Vec::new();
            if let Some(other) = args.first() {
                match other {
                    Value::Dict(o) => {
                        let o = o.lock().clone();
                        pairs.extend(o.iter().map(|(k, v)| (k.clone(), v.clone())));
                    }
                    other => {
                        for pair in iterate(other)? {
                            let Ok([k, v]) = <[Value; 2]>::try_from(iterate(&pair)?) else {
                                return Err(value_error(
                                    "dictionary update sequence element has wrong length",
                                ));
                            };
                            pairs.push((k, v));
                        }
                    }
                }
            }
            pairs.extend(kwargs.into_iter().map(|(k, v)| (Value::string(k), v)));
            let mut d = dict.lock();
            for (k, v) in pairs {
                d.insert(k, v)?;
            }
            Ok(Value::None)
        }
        "clear" => {
            arity(name, args, 0, 0)?;
            dict.lock().clear();
            Ok(Value::None)
        }
        "copy" => {
            arity(name, args, 0, 0)?;
            Ok(Value::dict(dict.lock().clone()))
        }
        _ => Err(no_attribute("dict", name)),
    }
}

fn str_arg<'a>(args: &'a [Value], i: usize, name: &str) -> EvalResult<&'a str> {
    match args.get(i) {
        Some(Value::Str(s)) => Ok(s),
        Some(other) => Err(type_error(format!(
            "{name}() argument must be str, not {}",
            other.type_name()
        ))),
        None => Err(type_error(format!("{name}() missing argument"))),
    }
}

fn optional_chars<'a>(args: &'a [Value], name: &str) -> EvalResult<Option<&'a str>> {
    match args.first() {
        None | Some(Value::None) => Ok(None),
        Some(_) => str_arg(args, 0, name).map(Some),
    }
}

fn str_method(s: &str, name: &str, args: &[Value]) -> EvalResult {
    let text = |t: String| Ok(Value::string(t));
    match name {
        "upper" => {
            arity(name, args, 0, 0)?;
            text(s.to_uppercase())
        }
        "lower" => {
            arity(name, args, 0, 0)?;
            text(s.to_lowercase())
        }
        "strip" | "lstrip" | "rstrip" => {
            arity(name, args, 0, 1)?;
            let chars = optional_chars(args, name)?;
            let matches = |c: char| chars.map_or(c.is_whitespace(), |set| set.contains(c));
            text(match name {
                "strip" => s.trim_matches(matches),
                "lstrip" => s.trim_start_matches(matches),
                _ => s.trim_end_matches(matches),
            }
            .to_owned())
        }
        "split" => {
            arity(name, args, 0, 2)?;
            let sep = optional_chars(args, name)?;
            let max = match args.get(1) {
                Some(v) => usize::try_from(v.expect_int("maxsplit")?).ok(),
                None => None,
            };
            let parts: Vec<Value> = match (sep, max) {
                (Some(""), _) => return Err(value_error("empty separator")),
                (Some(sep), Some(n)) => s.splitn(n + 1, sep).map(Value::from).collect(),
                (Some(sep), None) => s.split(sep).map(Value::from).collect(),
                (None, Some(n)) => split_whitespace_n(s, n),
                (None, None) => s.split_whitespace().map(Value::from).collect(),
            };
            Ok(Value::list(parts))
        }
        "splitlines" => {
            arity(name, args, 0, 0)?;
            Ok(Value::list(s.lines().map(Value::from).collect()))
        }
        "join" => {
            arity(name, args, 1, 1)?;
            let items = iterate(&args[0])?;
            let mut parts = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                match item {
                    Value::Str(p) => parts.push(p.to_string()),
                    other => {
                        return Err(type_error(format!(
                            "sequence item {i}: expected string, {} found",
                            other.type_name()
                        )))
                    }
                }
            }
            text(parts.join(s))
        }
        "replace" => {
            arity(name, args, 2, 3)?;
            let (from, to) = (str_arg(args, 0, name)?, str_arg(args, 1, name)?);
            match args.get(2) {
                Some(n) => {
                    let n = usize::try_from(n.expect_int("count")?).unwrap_or(usize::MAX);
                    text(s.replacen(from, to, n))
                }
                None => text(s.replace(from, to)),
            }
        }
        "startswith" | "endswith" => {
            arity(name, args, 1, 1)?;
            let candidates = match &args[0] {
                Value::Tuple(items) => items.to_vec(),
                other => vec![other.clone()],
            };
            let mut hit = false;
            for candidate in &candidates {
                let p = candidate.as_str().ok_or_else(|| {
                    type_error(format!("{name} first arg must be str or a tuple of str"))
                })?;
                hit |= if name == "startswith" {
                    s.starts_with(p)
                } else {
                    s.ends_with(p)
                };
            }
            Ok(Value::Bool(hit))
        }
        "find" => {
            arity(name, args, 1, 1)?;
            let needle = str_arg(args, 0, name)?;
            let index = s
                .find(needle)
                .map_or(-1, |b| i64::try_from(s[..b].chars().count()).unwrap_or(-1));
            Ok(Value::Int(index))
        }
        "count" => {
            arity(name, args, 1, 1)?;
            let needle = str_arg(args, 0, name)?;
            let n = if needle.is_empty() {
                s.chars().count() + 1
            } else {
                s.matches(needle).count()
            };
            Ok(Value::Int(i64::try_from(n).unwrap_or(i64::MAX)))
        }
        "isdigit" | "isalpha" | "isspace" => {
            arity(name, args, 0, 0)?;
            let test: fn(char) -> bool = match name {
                "isdigit" => |c| c.is_ascii_digit(),
                "isalpha" => char::is_alphabetic,
                _ => char::is_whitespace,
            };
            Ok(Value::Bool(!s.is_empty() && s.chars().all(test)))
        }
        "title" | "capitalize" => {
            arity(name, args, 0, 0)?;
            let mut out = String::with_capacity(s.len());
            let mut start = true;
            for c in s.chars() {
                if start {
                    out.extend(c.to_uppercase());
                } else {
                    out.extend(c.to_lowercase());
                }
                start = name == "title" && !c.is_alphabetic();
            }
            text(out)
        }
        "ljust" | "rjust" | "zfill" => {
            arity(name, args, 1, 1)?;
            let width = usize::try_from(args[0].expect_int("width")?).unwrap_or(0);
            let len = s.chars().count();
            let fill = width.saturating_sub(len);
            text(match name {
                "ljust" => format!("{s}{}", " ".repeat(fill)),
                "rjust" => format!("{}{s}", " ".repeat(fill)),
                _ => match s.strip_prefix('-') {
                    Some(rest) => format!("-{}{rest}", "0".repeat(fill)),
                    None => format!("{}{s}", "0".repeat(fill)),
                },
            })
        }
        "format" => text(brace_format(s, args)?),
        _ => Err(no_attribute("str", name)),
    }
}

fn split_whitespace_n(s: &str, n: usize) -> Vec<Value> {
    let mut parts = Vec::new();
    let mut rest = s.trim_start();
    while !rest.is_empty() {
        if parts.len() == n {
            parts.push(Value::from(rest));
            break;
        }
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        parts.push(Value::from(&rest[..end]));
        rest = rest[end..].trim_start();
    }
    parts
}

/// `"{} {0} {1!r}".format(...)`: positional fields with optional `!r`
/// or `!s` conversion. Format specs after `:` are ignored.
fn brace_format(fmt: &str, args: &[Value]) -> EvalResult<String> {
    let mut out = String::with_capacity(fmt.len());
    let mut chars = fmt.chars().peekable();
    let mut auto = 0usize;
    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut field = String::new();
                for f in chars.by_ref() {
                    if f == '}' {
                        break;
                    }
                    field.push(f);
                }
                let field = field.split(':').next().unwrap_or("");
                let (index, conversion) = match field.split_once('!') {
                    Some((i, conv)) => (i, Some(conv)),
                    None => (field, None),
                };
                let i = if index.is_empty() {
                    auto += 1;
                    auto - 1
                } else {
                    index
                        .parse()
                        .map_err(|_| key_error(format!("'{index}'")))?
                };
                let value = args.get(i).ok_or_else(|| index_out_of_range("tuple"))?;
                out.push_str(&match conversion {
                    Some("r") => value.repr(),
                    _ => value.to_str(),
                });
            }
            '}' => return Err(value_error("Single '}' encountered in format string")),
            c => out.push(c),
        }
    }
    Ok(out)
}
