//! Builtin functions and constructible types.
//!
//! Builtins are bound in a fixed namespace consulted after a statement's
//! own scope. None of them call back into user code, so they are plain
//! functions over argument values.

use std::cmp::Ordering;

use reckon_ir::COPY_BUILTIN;

use crate::errors::{
    not_iterable, type_error, value_error, wrong_arg_count, EvalError, EvalResult,
    BUILTIN_EXCEPTIONS,
};
use crate::operators::{compare_values, evaluate_binary};
use crate::value::{Dict, HtmlResult, Namespace, Value, ValueType};


#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Builtin {
    Len,
    Range,
    Repr,
    Abs,
    Min,
    Max,
    Sum,
    Sorted,
    Reversed,
    Enumerate,
    Zip,
    Type,
    Isinstance,
    Namespace,
    Buffer,
    Html,
    Round,
    Any,
    All,
    Chr,
    Ord,
    Copy,
}

impl Builtin {
    pub const ALL: &'static [Builtin] = &[
        Builtin::Len,
        Builtin::Range,
        Builtin::Repr,
        Builtin::Abs,
        Builtin::Min,
        Builtin::Max,
        Builtin::Sum,
        Builtin::Sorted,
        Builtin::Reversed,
        Builtin::Enumerate,
        Builtin::Zip,
        Builtin::Type,
        Builtin::Isinstance,
        Builtin::Namespace,
        Builtin::Buffer,
        Builtin::Html,
        Builtin::Round,
        Builtin::Any,
        Builtin::All,
        Builtin::Chr,
        Builtin::Ord,
        Builtin::Copy,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Len => "len",
            Builtin::Range => "range",
            Builtin::Repr => "repr",
            Builtin::Abs => "abs",
            Builtin::Min => "min",
            Builtin::Max => "max",
            Builtin::Sum => "sum",
            Builtin::Sorted => "sorted",
            Builtin::Reversed => "reversed",
            Builtin::Enumerate => "enumerate",
            Builtin::Zip => "zip",
            Builtin::Type => "type",
            Builtin::Isinstance => "isinstance",
            Builtin::Namespace => "namespace",
            Builtin::Buffer => "buffer",
            Builtin::Html => "html",
            Builtin::Round => "round",
            Builtin::Any => "any",
            Builtin::All => "all",
            Builtin::Chr => "chr",
            Builtin::Ord => "ord",
            Builtin::Copy => COPY_BUILTIN,
        }
    }
}

/// Value of a builtin name, if `name` is one.
pub fn lookup_builtin(name: &str) -> Option<Value> {
    if let Some(b) = Builtin::ALL.iter().find(|b| b.name() == name) {
        return Some(Value::Builtin(*b));
    }
    if let Some(t) = ValueType::NAMED.iter().find(|t| t.name() == name) {
        return Some(Value::Type(*t));
    }
    BUILTIN_EXCEPTIONS
        .iter()
        .find(|e| **e == name)
        .map(|e| Value::ExceptionType((*e).into()))
}

/// Every builtin name, sorted. The copy helper is not listed.
pub fn builtin_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = Builtin::ALL
        .iter()
        .filter(|b| **b != Builtin::Copy)
        .map(|b| b.name())
        .chain(ValueType::NAMED.iter().map(|t| t.name()))
        .chain(BUILTIN_EXCEPTIONS.iter().copied())
        .collect();
    names.sort_unstable();
    names
}

/// Elements of an iterable value.
pub fn iterate(value: &Value) -> EvalResult<Vec<Value>> {
    value
        .snapshot_items()
        .ok_or_else(|| not_iterable(value.type_name()))
}

fn exact_args<const N: usize>(name: &str, args: Vec<Value>) -> EvalResult<[Value; N]> {
    let got = args.len();
    <[Value; N]>::try_from(args).map_err(|_| wrong_arg_count(name, N, got))
}

fn no_keywords(name: &str, kwargs: &[(String, Value)]) -> EvalResult<()> {
    match kwargs.first() {
        Some((key, _)) => Err(type_error(format!(
            "{name}() got an unexpected keyword argument '{key}'"
        ))),
        None => Ok(()),
    }
}

/// Call a builtin function.
pub fn call_builtin(
    builtin: Builtin,
    args: Vec<Value>,
    kwargs: Vec<(String, Value)>,
) -> EvalResult {
    let name = builtin.name();
    if !matches!(builtin, Builtin::Sorted | Builtin::Namespace) {
        no_keywords(name, &kwargs)?;
    }
    match builtin {
        Builtin::Len => {
            let [v] = exact_args::<1>(name, args)?;
            let n = match &v {
                Value::Str(s) => s.chars().count(),
                Value::Tuple(items) => items.len(),
                Value::List(items) => items.lock().len(),
                Value::Dict(d) => d.lock().len(),
                Value::Buffer(b) => b.lock().chars().count(),
                other => {
                    return Err(type_error(format!(
                        "object of type '{}' has no len()",
                        other.type_name()
                    )))
                }
            };
            Ok(Value::Int(i64::try_from(n).unwrap_or(i64::MAX)))
        }
        Builtin::Range => range(&args),
        Builtin::Repr => {
            let [v] = exact_args::<1>(name, args)?;
            Ok(Value::string(v.repr()))
        }
        Builtin::Abs => {
            let [v] = exact_args::<1>(name, args)?;
            match v {
                Value::Float(f) => Ok(Value::Float(f.abs())),
                other => {
                    let n = other.as_int().ok_or_else(|| {
                        type_error(format!(
                            "bad operand type for abs(): '{}'",
                            other.type_name()
                        ))
                    })?;
                    n.checked_abs()
                        .map(Value::Int)
                        .ok_or_else(|| crate::errors::overflow("abs"))
                }
            }
        }
        Builtin::Min => extremum(name, args, Ordering::Less),
        Builtin::Max => extremum(name, args, Ordering::Greater),
        Builtin::Sum => {
            let (items, start) = match args.len() {
                1 | 2 => {
                    let mut args = args.into_iter();
                    let items = args.next().unwrap_or(Value::None);
                    (items, args.next().unwrap_or(Value::Int(0)))
                }
                n => return Err(wrong_arg_count(name, 1, n)),
            };
            if matches!(start, Value::Str(_)) {
                return Err(type_error(
                    "sum() can't sum strings [use ''.join(seq) instead]",
                ));
            }
            iterate(&items)?
                .iter()
                .try_fold(start, |acc, item| {
                    evaluate_binary(&acc, item, reckon_ir::BinaryOp::Add)
                })
        }
        Builtin::Sorted => {
            let reverse = reverse_flag(name, kwargs)?;
            let [v] = exact_args::<1>(name, args)?;
            let mut items = iterate(&v)?;
            sort_values(&mut items, reverse)?;
            Ok(Value::list(items))
        }
        Builtin::Reversed => {
            let [v] = exact_args::<1>(name, args)?;
            let mut items = iterate(&v)?;
            items.reverse();
            Ok(Value::list(items))
        }
        Builtin::Enumerate => {
            let (items, start) = match args.len() {
                1 | 2 => {
                    let mut args = args.into_iter();
                    let items = args.next().unwrap_or(Value::None);
                    let start = args.next().unwrap_or(Value::Int(0)).expect_int("start")?;
                    (items, start)
                }
                n => return Err(wrong_arg_count(name, 1, n)),
            };
            let pairs = iterate(&items)?
                .into_iter()
                .zip(start..)
                .map(|(item, i)| Value::tuple(vec![Value::Int(i), item]))
                .collect();
            Ok(Value::list(pairs))
        }
        Builtin::Zip => {
            let columns = args.iter().map(iterate).collect::<EvalResult<Vec<_>>>()?;
            let len = columns.iter().map(Vec::len).min().unwrap_or(0);
            let rows = (0..len)
                .map(|i| Value::tuple(columns.iter().map(|c| c[i].clone()).collect()))
                .collect();
            Ok(Value::list(rows))
        }
        Builtin::Type => {
            let [v] = exact_args::<1>(name, args)?;
            Ok(match &v {
                Value::Exception(e) => Value::ExceptionType(e.type_name.clone()),
                other => Value::Type(other.value_type()),
            })
        }
        Builtin::Isinstance => {
            let [v, class] = exact_args::<2>(name, args)?;
            let classes = match &class {
                Value::Tuple(items) => items.to_vec(),
                _ => vec![class.clone()],
            };
            let mut result = false;
            for class in &classes {
                result |= match class {
                    Value::Type(ValueType::Int) => matches!(v, Value::Int(_) | Value::Bool(_)),
                    Value::Type(t) => v.value_type() == *t && !matches!(v, Value::Exception(_)),
                    Value::ExceptionType(name) => match &v {
                        Value::Exception(e) => {
                            crate::errors::ErrorKind::from_type_name(&e.type_name)
                                .is_caught_by(name)
                        }
                        _ => false,
                    },
                    other => {
                        return Err(type_error(format!(
                            "isinstance() arg 2 must be a type, not '{}'",
                            other.type_name()
                        )))
                    }
                };
            }
            Ok(Value::Bool(result))
        }
        Builtin::Namespace => {
            if !args.is_empty() {
                return Err(type_error("namespace() takes no positional arguments"));
            }
            Ok(Value::namespace(kwargs.into_iter().collect::<Namespace>()))
        }
        Builtin::Buffer => match args.len() {
            0 => Ok(Value::buffer(String::new())),
            1 => Ok(Value::buffer(args[0].to_str())),
            n => Err(wrong_arg_count(name, 1, n)),
        },
        Builtin::Html => {
            let [v] = exact_args::<1>(name, args)?;
            Ok(Value::custom(HtmlResult { html: v.to_str() }))
        }
        Builtin::Round => {
            let (x, digits) = match args.len() {
                1 | 2 => {
                    let mut it = args.into_iter();
                    let x = it.next().unwrap_or(Value::None);
                    let digits = it.next().unwrap_or(Value::Int(0)).expect_int("ndigits")?;
                    (x, digits)
                }
                n => return Err(wrong_arg_count(name, 1, n)),
            };
            let f = x.as_float().ok_or_else(|| {
                type_error(format!("a float is required, not '{}'", x.type_name()))
            })?;
            let scale = 10f64.powi(i32::try_from(digits).unwrap_or(0));
            Ok(Value::Float((f * scale).round() / scale))
        }
        Builtin::Any => {
            let [v] = exact_args::<1>(name, args)?;
            Ok(Value::Bool(iterate(&v)?.iter().any(Value::is_truthy)))
        }
        Builtin::All => {
            let [v] = exact_args::<1>(name, args)?;
            Ok(Value::Bool(iterate(&v)?.iter().all(Value::is_truthy)))
        }
        Builtin::Chr => {
            let [v] = exact_args::<1>(name, args)?;
            let n = v.expect_int("chr() argument")?;
            u32::try_from(n)
                .ok()
                .and_then(char::from_u32)
                .map(|c| Value::string(c.to_string()))
                .ok_or_else(|| value_error("chr() arg not in range"))
        }
        Builtin::Ord => {
            let [v] = exact_args::<1>(name, args)?;
            let mut chars = v.as_str().unwrap_or("").chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Value::Int(i64::from(u32::from(c)))),
                _ => Err(type_error("ord() expected a character")),
            }
        }
        Builtin::Copy => {
            let [v] = exact_args::<1>(name, args)?;
            v.shallow_copy()
        }
    }
}

fn range(args: &[Value]) -> EvalResult {
    let ints = args
        .iter()
        .map(|a| a.expect_int("range() argument"))
        .collect::<EvalResult<Vec<_>>>()?;
    let (start, stop, step) = match ints.as_slice() {
        [stop] => (0, *stop, 1),
        [start, stop] => (*start, *stop, 1),
        [start, stop, step] => (*start, *stop, *step),
        _ => {
            return Err(type_error(format!(
                "range expected at most 3 arguments, got {}",
                args.len()
            )))
        }
    };
    if step == 0 {
        return Err(value_error("range() step argument must not be zero"));
    }
    let mut items = Vec::new();
    let mut i = start;
    while (step > 0 && i < stop) || (step < 0 && i > stop) {
        items.push(Value::Int(i));
        match i.checked_add(step) {
            Some(next) => i = next,
            None => break,
        }
    }
    Ok(Value::list(items))
}

fn extremum(name: &str, args: Vec<Value>, want: Ordering) -> EvalResult {
    let items = match args.len() {
        0 => return Err(type_error(format!("{name} expected 1 arguments, got 0"))),
        1 => iterate(&args[0])?,
        _ => args,
    };
    let mut iter = items.into_iter();
    let Some(mut best) = iter.next() else {
        return Err(value_error(format!("{name}() arg is an empty sequence")));
    };
    for item in iter {
        if compare_values(&item, &best)? == want {
            best = item;
        }
    }
    Ok(best)
}

fn reverse_flag(name: &str, kwargs: Vec<(String, Value)>) -> EvalResult<bool> {
    let mut reverse = false;
    for (key, value) in kwargs {
        if key == "reverse" {
            reverse = value.is_truthy();
        } else {
            return Err(type_error(format!(
                "{name}() got an unexpected keyword argument '{key}'"
            )));
        }
    }
    Ok(reverse)
}

/// Stable sort with the language's ordering; the first comparison error
/// wins.
pub fn sort_values(items: &mut [Value], reverse: bool) -> EvalResult<()> {
    let mut error: Option<EvalError> = None;
    items.sort_by(|a, b| {
        if error.is_some() {
            return Ordering::Equal;
        }
        match compare_values(a, b) {
            Ok(ord) if reverse => ord.reverse(),
            Ok(ord) => ord,
            Err(e) => {
                error = Some(e);
                Ordering::Equal
            }
        }
    });
    error.map_or(Ok(()), Err)
}

/// Call a builtin type as a constructor: `int("3")`, `list(t)`, `dict(a=1)`.
pub fn call_type(t: ValueType, args: Vec<Value>, kwargs: Vec<(String, Value)>) -> EvalResult {
    let name = t.name();
    if t != ValueType::Dict {
        no_keywords(name, &kwargs)?;
    }
    if args.len() > 1 && t != ValueType::Int {
        return Err(type_error(format!(
            "{name}() takes at most 1 argument ({} given)",
            args.len()
        )));
    }
    let arg = args.first().cloned();
    match t {
        ValueType::Int => to_int(args),
        ValueType::Float => match arg {
            None => Ok(Value::Float(0.0)),
            Some(Value::Str(s)) => parse_float(&s).map(Value::Float),
            Some(v) => v.as_float().map(Value::Float).ok_or_else(|| {
                type_error(format!(
                    "float() argument must be a string or a number, not '{}'",
                    v.type_name()
                ))
            }),
        },
        ValueType::Str => Ok(Value::string(arg.map(|v| v.to_str()).unwrap_or_default())),
        ValueType::Bool => Ok(Value::Bool(arg.is_some_and(|v| v.is_truthy()))),
        ValueType::List => Ok(Value::list(match arg {
            Some(v) => iterate(&v)?,
            None => Vec::new(),
        })),
        ValueType::Tuple => Ok(match arg {
            Some(Value::Tuple(items)) => Value::Tuple(items),
            Some(v) => Value::tuple(iterate(&v)?),
            None => Value::tuple(Vec::new()),
        }),
        ValueType::Dict => {
            let mut dict = match arg {
                Some(Value::Dict(d)) => d.lock().clone(),
                Some(v) => {
                    let mut dict = Dict::new();
                    for pair in iterate(&v)? {
                        let Ok([k, v]) = <[Value; 2]>::try_from(iterate(&pair)?) else {
                            return Err(value_error(
                                "dictionary update sequence element has wrong length",
                            ));
                        };
                        dict.insert(k, v)?;
                    }
                    dict
                }
                None => Dict::new(),
            };
            for (key, value) in kwargs {
                dict.insert(Value::string(key), value)?;
            }
            Ok(Value::dict(dict))
        }
        other => Err(type_error(format!(
            "cannot create '{}' instances",
            other.name()
        ))),
    }
}

fn to_int(args: Vec<Value>) -> EvalResult {
    let mut it = args.into_iter();
    let (value, base) = (it.next(), it.next());
    if it.next().is_some() {
        return Err(type_error("int() takes at most 2 arguments"));
    }
    match (value, base) {
        (None, _) => Ok(Value::Int(0)),
        (Some(Value::Str(s)), base) => {
            let base = match base {
                Some(b) => u32::try_from(b.expect_int("int() base")?)
                    .ok()
                    .filter(|b| (2..=36).contains(b))
                    .ok_or_else(|| value_error("int() base must be >= 2 and <= 36"))?,
                None => 10,
            };
            i64::from_str_radix(s.trim(), base)
                .map(Value::Int)
                .map_err(|_| {
                    value_error(format!(
                        "invalid literal for int() with base {base}: {}",
                        Value::Str(s.clone()).repr()
                    ))
                })
        }
        (Some(_), Some(_)) => Err(type_error("int() can't convert non-string with explicit base")),
        (Some(Value::Float(f)), None) => {
            if !f.is_finite() || f.abs() >= 9.2e18 {
                return Err(crate::errors::overflow("int()"));
            }
            #[expect(clippy::cast_possible_truncation, reason = "int() truncates")]
            let n = f.trunc() as i64;
            Ok(Value::Int(n))
        }
        (Some(v), None) => v.as_int().map(Value::Int).ok_or_else(|| {
            type_error(format!(
                "int() argument must be a string or a number, not '{}'",
                v.type_name()
            ))
        }),
    }
}

fn parse_float(s: &str) -> EvalResult<f64> {
    let t = s.trim();
    match t.to_ascii_lowercase().as_str() {
        "inf" | "+inf" | "infinity" => return Ok(f64::INFINITY),
        "-inf" | "-infinity" => return Ok(f64::NEG_INFINITY),
        "nan" => return Ok(f64::NAN),
        _ => {}
    }
    t.parse::<f64>().map_err(|_| {
        value_error(format!(
            "could not convert string to float: {}",
            Value::string(s).repr()
        ))
    })
}

#[cfg(test)]
mod tests;
