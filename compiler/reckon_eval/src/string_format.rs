//! `format % args` string interpolation.
//!
//! Supports `%s %r %d %i %f %F %e %g %x %X %o %c %%`, the `- 0 + space`
//! flags, width, precision, and `%(key)s` lookups when the right-hand
//! side is a dict.

use crate::errors::{type_error, value_error, EvalResult};
use crate::value::{format_float_str, Value};

#[derive(Default)]
struct Spec {
    left: bool,
    zero: bool,
    plus: bool,
    space: bool,
    width: usize,
    precision: Option<usize>,
}

/// Interpolate `args` into `fmt`.
pub fn percent_format(fmt: &str, args: &Value) -> EvalResult<String> {
    let mapping = matches!(args, Value::Dict(_));
    let positional: Vec<Value> = match args {
        Value::Tuple(items) => items.to_vec(),
        Value::Dict(_) => Vec::new(),
        other => vec![other.clone()],
    };
    let mut next = positional.iter();
    let mut out = String::with_capacity(fmt.len());
    let mut chars = fmt.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let mut keyed: Option<Value> = None;
        if chars.peek() == Some(&'(') {
            chars.next();
            let mut key = String::new();
            for k in chars.by_ref() {
                if k == ')' {
                    break;
                }
                key.push(k);
            }
            let Value::Dict(dict) = args else {
                return Err(type_error("format requires a mapping"));
            };
            let value = dict.lock().get(&Value::string(key.as_str()))?;
            keyed = Some(value.ok_or_else(|| crate::errors::key_error(format!("'{key}'")))?);
        }
        let mut spec = Spec::default();
        while let Some(&flag) = chars.peek() {
            match flag {
                '-' => spec.left = true,
                '0' => spec.zero = true,
                '+' => spec.plus = true,
                ' ' => spec.space = true,
                _ => break,
            }
            chars.next();
        }
        spec.width = take_number(&mut chars);
        if chars.peek() == Some(&'.') {
            chars.next();
            spec.precision = Some(take_number(&mut chars));
        }
        let Some(conv) = chars.next() else {
            return Err(value_error("incomplete format"));
        };
        if conv == '%' {
            out.push('%');
            continue;
        }
        let arg = match keyed {
            Some(v) => v,
            None if mapping => args.clone(),
            None => next
                .next()
                .cloned()
                .ok_or_else(|| type_error("not enough arguments for format string"))?,
        };
        let text = convert(conv, &arg, &spec)?;
        pad(&mut out, &text, &spec, conv);
    }
    if !mapping && next.next().is_some() {
        return Err(type_error(
            "not all arguments converted during string formatting",
        ));
    }
    Ok(out)
}

fn take_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> usize {
    let mut n = 0usize;
    while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
        n = n.saturating_mul(10).saturating_add(d as usize);
        chars.next();
    }
    n
}

fn convert(conv: char, arg: &Value, spec: &Spec) -> EvalResult<String> {
    let sign = |negative: bool| {
        if negative {
            "-"
        } else if spec.plus {
            "+"
        } else if spec.space {
            " "
        } else {
            ""
        }
    };
    Ok(match conv {
        's' => {
            let s = arg.to_str();
            match spec.precision {
                Some(p) => s.chars().take(p).collect(),
                None => s,
            }
        }
        'r' => arg.repr(),
        'd' | 'i' => {
            let n = match arg {
                #[expect(clippy::cast_possible_truncation, reason = "%d truncates floats")]
                Value::Float(f) => f.trunc() as i64,
                other => other.as_int().ok_or_else(|| number_required(other))?,
            };
            format!("{}{}", sign(n < 0), n.unsigned_abs())
        }
        'x' | 'X' | 'o' => {
            let n = arg.as_int().ok_or_else(|| number_required(arg))?;
            let digits = match conv {
                'x' => format!("{:x}", n.unsigned_abs()),
                'X' => format!("{:X}", n.unsigned_abs()),
                _ => format!("{:o}", n.unsigned_abs()),
            };
            format!("{}{digits}", sign(n < 0))
        }
        'f' | 'F' | 'e' | 'g' => {
            let f = arg.as_float().ok_or_else(|| number_required(arg))?;
            let body = match conv {
                'e' => exponent_form(f.abs(), spec.precision.unwrap_or(6)),
                'g' => match spec.precision {
                    None => format_float_str(f.abs()).trim_end_matches(".0").to_owned(),
                    Some(p) => format!("{:.*}", p, f.abs()),
                },
                _ => format!("{:.*}", spec.precision.unwrap_or(6), f.abs()),
            };
            format!("{}{body}", sign(f.is_sign_negative() && f != 0.0))
        }
        'c' => match arg {
            Value::Str(s) if s.chars().count() == 1 => s.to_string(),
            other => {
                let n = other.as_int().ok_or_else(|| type_error("%c requires int or char"))?;
                u32::try_from(n)
                    .ok()
                    .and_then(char::from_u32)
                    .map(String::from)
                    .ok_or_else(|| value_error("%c arg not in range"))?
            }
        },
        other => {
            return Err(value_error(format!(
                "unsupported format character '{other}'"
            )))
        }
    })
}

fn exponent_form(f: f64, precision: usize) -> String {
    let text = format!("{f:.precision$e}");
    match text.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(d) => ('-', d),
                None => ('+', exp),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => text,
    }
}

#[cold]
fn number_required(arg: &Value) -> crate::errors::EvalError {
    type_error(format!(
        "%d format: a number is required, not {}",
        arg.type_name()
    ))
}

fn pad(out: &mut String, text: &str, spec: &Spec, conv: char) {
    let len = text.chars().count();
    if len >= spec.width {
        out.push_str(text);
        return;
    }
    let fill = spec.width - len;
    if spec.left {
        out.push_str(text);
        out.extend(std::iter::repeat(' ').take(fill));
    } else if spec.zero && !matches!(conv, 's' | 'r' | 'c') {
        let (sign, digits) = match text.chars().next() {
            Some(c @ ('-' | '+' | ' ')) => (Some(c), &text[1..]),
            _ => (None, text),
        };
        out.extend(sign);
        out.extend(std::iter::repeat('0').take(fill));
        out.push_str(digits);
    } else {
        out.extend(std::iter::repeat(' ').take(fill));
        out.push_str(text);
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Tests can panic")]

    use super::*;
    use crate::value::Dict;
    use pretty_assertions::assert_eq;

    fn fmt(f: &str, args: Value) -> String {
        percent_format(f, &args).unwrap()
    }

    #[test]
    fn basic_conversions() {
        assert_eq!(fmt("%s!", Value::from("hi")), "hi!");
        assert_eq!(fmt("%r", Value::from("hi")), "'hi'");
        assert_eq!(
            fmt("%d-%d", Value::tuple(vec![Value::Int(1), Value::Int(-2)])),
            "1--2"
        );
        assert_eq!(fmt("%.2f", Value::Float(3.14159)), "3.14");
        assert_eq!(fmt("%x", Value::Int(255)), "ff");
        assert_eq!(fmt("100%%", Value::tuple(vec![])), "100%");
        assert_eq!(fmt("%e", Value::Float(12345.0)), "1.234500e+04");
    }

    #[test]
    fn width_and_flags() {
        assert_eq!(fmt("[%5d]", Value::Int(42)), "[   42]");
        assert_eq!(fmt("[%-5d]", Value::Int(42)), "[42   ]");
        assert_eq!(fmt("[%05d]", Value::Int(-42)), "[-0042]");
        assert_eq!(fmt("[%+d]", Value::Int(3)), "[+3]");
        assert_eq!(fmt("[%.1s]", Value::from("abc")), "[a]");
    }

    #[test]
    fn mapping_keys() {
        let mut dict = Dict::new();
        dict.insert(Value::from("name"), Value::from("x")).unwrap();
        assert_eq!(fmt("%(name)s=1", Value::dict(dict)), "x=1");
    }

    #[test]
    fn argument_count_errors() {
        let err = percent_format("%s %s", &Value::Int(1)).unwrap_err();
        assert_eq!(err.message, "not enough arguments for format string");
        let err = percent_format("%s", &Value::tuple(vec![Value::Int(1), Value::Int(2)]))
            .unwrap_err();
        assert_eq!(
            err.message,
            "not all arguments converted during string formatting"
        );
    }
}
