//! Strict numeric literal grammar.
//!
//! The scanner matches number-like text greedily (`0x1g`, `1e+a`, `12abc`)
//! and then checks it here; a greedy match that is not a valid literal
//! becomes one junk token instead of splitting into a number and a name.

/// Whether `text` is exactly one valid numeric literal.
///
/// Accepted forms: decimal integers (`0`, `17`), octal (`017`), hex
/// (`0x1F`), floats (`1.`, `.5`, `1.5e-3`, `2e10`), and an imaginary
/// `j` suffix on decimal integers and floats.
pub fn is_valid_number(text: &str) -> bool {
    let bytes = text.as_bytes();
    if bytes.len() >= 2 && bytes[0] == b'0' && matches!(bytes[1], b'x' | b'X') {
        return bytes[2..]
            .iter()
            .all(|b| b.is_ascii_hexdigit() || *b == b'_');
    }

    let (body, imaginary) = match text.strip_suffix('j') {
        Some(body) => (body, true),
        None => (text, false),
    };
    if body.is_empty() {
        return false;
    }

    if all_digits(body) {
        if body == "0" || !body.starts_with('0') {
            return true;
        }
        return !imaginary && body[1..].bytes().all(|b| (b'0'..=b'7').contains(&b));
    }

    match body.find(['e', 'E']) {
        Some(e) => {
            let exponent = &body[e + 1..];
            let digits = exponent.strip_prefix(['+', '-']).unwrap_or(exponent);
            mantissa_ok(&body[..e], true) && !digits.is_empty() && all_digits(digits)
        }
        None => mantissa_ok(body, false),
    }
}

/// `[0-9]*\.[0-9]+` or `[0-9]+\.`; with an exponent a bare `[0-9]+` too.
fn mantissa_ok(mantissa: &str, dotless_ok: bool) -> bool {
    match mantissa.split_once('.') {
        Some((int, frac)) => {
            all_digits(int) && all_digits(frac) && !(int.is_empty() && frac.is_empty())
        }
        None => dotless_ok && !mantissa.is_empty() && all_digits(mantissa),
    }
}

fn all_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_literals() {
        for ok in [
            "0", "0j", "7", "10j", "017", "0x1F", "0X_ff", "1.", ".5", "1.5", "1.e3", ".1e3",
            "1.1e+3", "2e10", "2E-1j", "3.25j",
        ] {
            assert!(is_valid_number(ok), "{ok} should be valid");
        }
    }

    #[test]
    fn rejects_garbage() {
        for bad in [
            "", "1a", "09", "017j", "0xg", "1.2.3", ".", "1e", "1e+", "1e+a", "1.1.e3", "j",
        ] {
            assert!(!is_valid_number(bad), "{bad} should be invalid");
        }
    }
}
