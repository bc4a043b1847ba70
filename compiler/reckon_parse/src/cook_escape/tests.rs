#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use super::*;
use pretty_assertions::assert_eq;

#[test]
fn plain_strings() {
    assert_eq!(cook_string("'abc'").unwrap(), "abc");
    assert_eq!(cook_string("\"a'b\"").unwrap(), "a'b");
    assert_eq!(cook_string("''").unwrap(), "");
}

#[test]
fn triple_quoted_strings_keep_newlines() {
    assert_eq!(cook_string("'''a\nb'''").unwrap(), "a\nb");
    assert_eq!(cook_string("\"\"\"\"\"\"").unwrap(), "");
}

#[test]
fn escapes() {
    assert_eq!(cook_string(r"'a\nb'").unwrap(), "a\nb");
    assert_eq!(cook_string(r"'\x41\101ä'").unwrap(), "AAä");
    assert_eq!(cook_string(r"'\q'").unwrap(), "\\q");
    assert_eq!(cook_string(r"'it\'s'").unwrap(), "it's");
}

#[test]
fn raw_and_unicode_prefixes() {
    assert_eq!(cook_string(r"r'a\nb'").unwrap(), "a\\nb");
    assert_eq!(cook_string("u'x'").unwrap(), "x");
    assert_eq!(cook_string(r"UR'\d'").unwrap(), "\\d");
}

#[test]
fn unterminated_strings() {
    assert_eq!(
        cook_string("'abc").unwrap_err(),
        "EOL while scanning string literal"
    );
    assert_eq!(
        cook_string(r"'abc\'").unwrap_err(),
        "EOL while scanning string literal"
    );
    assert_eq!(
        cook_string("'''abc").unwrap_err(),
        "EOF while scanning triple-quoted string literal"
    );
}

#[test]
fn numbers() {
    assert_eq!(cook_number("42").unwrap(), Number::Int(42));
    assert_eq!(cook_number("0x1F").unwrap(), Number::Int(31));
    assert_eq!(cook_number("017").unwrap(), Number::Int(15));
    assert_eq!(cook_number("0").unwrap(), Number::Int(0));
    assert_eq!(cook_number("10L").unwrap(), Number::Int(10));
    assert_eq!(cook_number("1.5").unwrap(), Number::Float(1.5));
    assert_eq!(cook_number(".5e1").unwrap(), Number::Float(5.0));
    assert_eq!(cook_number("1e3").unwrap(), Number::Float(1000.0));
    assert!(cook_number("3j").is_err());
    assert!(cook_number("99999999999999999999").is_err());
}
