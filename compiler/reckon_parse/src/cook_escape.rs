//! Literal decoding: string escapes and numeric values.

/// A decoded string literal, or why it could not be decoded.
pub(crate) type Cooked<T> = Result<T, &'static str>;

/// Decode a complete string literal including its prefix and quotes.
///
/// `r`/`R` prefixes disable escape processing; `u`/`U` are accepted and
/// ignored since all strings are Unicode.
pub(crate) fn cook_string(raw: &str) -> Cooked<String> {
    let quote_at = raw
        .find(['\'', '"'])
        .ok_or("EOL while scanning string literal")?;
    let prefix = &raw[..quote_at];
    let is_raw = prefix.contains(['r', 'R']);
    let rest = &raw[quote_at..];
    let quote = &rest[..1];
    let triple = quote.repeat(3);
    let delim: &str = if rest.starts_with(triple.as_str()) {
        &triple
    } else {
        quote
    };
    let unterminated = if delim.len() == 3 {
        "EOF while scanning triple-quoted string literal"
    } else {
        "EOL while scanning string literal"
    };
    let body_start = delim.len();
    if rest.len() < body_start * 2 || !rest.ends_with(delim) {
        return Err(unterminated);
    }
    let body = &rest[body_start..rest.len() - body_start];
    if ends_with_odd_backslashes(body) {
        return Err(unterminated);
    }
    if is_raw {
        Ok(body.to_owned())
    } else {
        Ok(unescape(body))
    }
}

fn ends_with_odd_backslashes(body: &str) -> bool {
    body.bytes().rev().take_while(|&b| b == b'\\').count() % 2 == 1
}

/// Process backslash escapes. Unknown escapes keep their backslash.
pub(crate) fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(next) = chars.next() else {
            out.push('\\');
            break;
        };
        match next {
            '\n' => {}
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'a' => out.push('\x07'),
            'b' => out.push('\x08'),
            'f' => out.push('\x0c'),
            'v' => out.push('\x0b'),
            'x' => {
                let digits = take_digits(&mut chars, 2, 16);
                match hex_char(&digits) {
                    Some(ch) if digits.len() == 2 => out.push(ch),
                    _ => {
                        out.push_str("\\x");
                        out.push_str(&digits);
                    }
                }
            }
            'u' | 'U' => {
                let width = if next == 'u' { 4 } else { 8 };
                let digits = take_digits(&mut chars, width, 16);
                match hex_char(&digits) {
                    Some(ch) if digits.len() == width => out.push(ch),
                    _ => {
                        out.push('\\');
                        out.push(next);
                        out.push_str(&digits);
                    }
                }
            }
            '0'..='7' => {
                let mut digits = String::from(next);
                digits.push_str(&take_digits(&mut chars, 2, 8));
                let code = u32::from_str_radix(&digits, 8).unwrap_or(0);
                out.push(char::from_u32(code).unwrap_or('\u{fffd}'));
            }
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }
    out
}

fn take_digits(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    max: usize,
    radix: u32,
) -> String {
    let mut digits = String::new();
    while digits.len() < max {
        match chars.peek() {
            Some(c) if c.is_digit(radix) => {
                digits.push(*c);
                chars.next();
            }
            _ => break,
        }
    }
    digits
}

fn hex_char(digits: &str) -> Option<char> {
    u32::from_str_radix(digits, 16).ok().and_then(char::from_u32)
}

/// Numeric literal value.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) enum Number {
    Int(i64),
    Float(f64),
}

/// Parse a numeric literal the lexer has already validated.
///
/// Hex (`0x1f`), octal (`017`), decimal and float forms are supported; an
/// `l`/`L` suffix is ignored. Imaginary literals are rejected.
pub(crate) fn cook_number(text: &str) -> Cooked<Number> {
    let text = text.trim_end_matches(['l', 'L']);
    if text.ends_with(['j', 'J']) {
        return Err("complex literals are not supported");
    }
    let lower = text.to_ascii_lowercase();
    if let Some(hex) = lower.strip_prefix("0x") {
        return i64::from_str_radix(hex, 16)
            .map(Number::Int)
            .map_err(|_| "integer literal too large");
    }
    let is_float = lower.contains(['.', 'e']);
    if is_float {
        return lower
            .parse::<f64>()
            .map(Number::Float)
            .map_err(|_| "invalid syntax");
    }
    if lower.len() > 1 && lower.starts_with('0') {
        return i64::from_str_radix(&lower[1..], 8)
            .map(Number::Int)
            .map_err(|_| "invalid token");
    }
    lower
        .parse::<i64>()
        .map(Number::Int)
        .map_err(|_| "integer literal too large")
}

#[cfg(test)]
mod tests;
