//! Binary, unary and comparison operators.
//!
//! Direct enum dispatch over operand pairs. Integers are 64-bit with
//! checked arithmetic; `/` on two integers floors, `%` takes the sign of
//! the divisor, and a negative integer power produces a float.

use std::cmp::Ordering;

use reckon_ir::{BinaryOp, CmpOp, UnaryOp};

use crate::errors::{
    division_by_zero, overflow, type_error, unsupported_operands, value_error, EvalResult,
};
use crate::string_format::percent_format;
use crate::value::{Numeric, Value};

#[inline]
fn checked(result: Option<i64>, op: BinaryOp) -> EvalResult {
    result.map(Value::Int).ok_or_else(|| overflow(op.symbol()))
}

/// Evaluate `left op right`.
pub fn evaluate_binary(left: &Value, right: &Value, op: BinaryOp) -> EvalResult {
    if let (Some(a), Some(b)) = (left.as_numeric(), right.as_numeric()) {
        if matches!((left, right), (Value::Bool(_), Value::Bool(_)))
            && matches!(op, BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor)
        {
            let (a, b) = (left.is_truthy(), right.is_truthy());
            return Ok(Value::Bool(match op {
                BinaryOp::BitAnd => a & b,
                BinaryOp::BitOr => a | b,
                _ => a ^ b,
            }));
        }
        return match (a, b) {
            (Numeric::Int(a), Numeric::Int(b)) => eval_int_binary(a, b, op),
            _ => eval_float_binary(a.to_f64(), b.to_f64(), op)
                .ok_or_else(|| mismatch(left, right, op))?,
        };
    }
    match (left, right, op) {
        (Value::Str(a), Value::Str(b), BinaryOp::Add) => {
            Ok(Value::string(format!("{a}{b}")))
        }
        (Value::Str(a), _, BinaryOp::Mul) => {
            let n = repeat_count(right, left, op)?;
            Ok(Value::string(a.repeat(n)))
        }
        (_, Value::Str(b), BinaryOp::Mul) if is_int(left) => {
            let n = repeat_count(left, right, op)?;
            Ok(Value::string(b.repeat(n)))
        }
        (Value::Str(fmt), _, BinaryOp::Mod) => percent_format(fmt, right).map(Value::string),
        (Value::List(_), Value::List(_), BinaryOp::Add)
        | (Value::Tuple(_), Value::Tuple(_), BinaryOp::Add) => {
            let mut items = left.snapshot_items().unwrap_or_default();
            items.extend(right.snapshot_items().unwrap_or_default());
            Ok(rebuild_like(left, items))
        }
        (Value::List(_) | Value::Tuple(_), _, BinaryOp::Mul) => {
            let n = repeat_count(right, left, op)?;
            Ok(rebuild_like(left, repeat_items(left, n)))
        }
        (_, Value::List(_) | Value::Tuple(_), BinaryOp::Mul) if is_int(left) => {
            let n = repeat_count(left, right, op)?;
            Ok(rebuild_like(right, repeat_items(right, n)))
        }
        _ => Err(mismatch(left, right, op)),
    }
}

fn is_int(value: &Value) -> bool {
    value.as_int().is_some()
}

#[cold]
fn mismatch(left: &Value, right: &Value, op: BinaryOp) -> crate::errors::EvalError {
    unsupported_operands(op.symbol(), left.type_name(), right.type_name())
}

/// Repetition count for sequence `*`; negative counts repeat zero times.
fn repeat_count(count: &Value, seq: &Value, op: BinaryOp) -> EvalResult<usize> {
    let n = count
        .as_int()
        .ok_or_else(|| mismatch(seq, count, op))?;
    Ok(usize::try_from(n).unwrap_or(0))
}

fn repeat_items(seq: &Value, n: usize) -> Vec<Value> {
    let items = seq.snapshot_items().unwrap_or_default();
    let mut out = Vec::with_capacity(items.len().saturating_mul(n));
    for _ in 0..n {
        out.extend(items.iter().cloned());
    }
    out
}

fn rebuild_like(template: &Value, items: Vec<Value>) -> Value {
    match template {
        Value::Tuple(_) => Value::tuple(items),
        _ => Value::list(items),
    }
}

fn eval_int_binary(a: i64, b: i64, op: BinaryOp) -> EvalResult {
    match op {
        BinaryOp::Add => checked(a.checked_add(b), op),
        BinaryOp::Sub => checked(a.checked_sub(b), op),
        BinaryOp::Mul => checked(a.checked_mul(b), op),
        BinaryOp::Div | BinaryOp::FloorDiv => {
            if b == 0 {
                return Err(division_by_zero(false));
            }
            checked(floor_div(a, b), op)
        }
        BinaryOp::Mod => {
            if b == 0 {
                return Err(division_by_zero(false));
            }
            checked(floor_mod(a, b), op)
        }
        BinaryOp::Pow => {
            if b < 0 {
                #[expect(clippy::cast_precision_loss, reason = "negative powers are floats")]
                let (a, b) = (a as f64, b as f64);
                if a == 0.0 {
                    return Err(division_by_zero(true));
                }
                return Ok(Value::Float(a.powf(b)));
            }
            let exp = u32::try_from(b).map_err(|_| overflow("**"))?;
            checked(a.checked_pow(exp), op)
        }
        BinaryOp::LShift => {
            let shift = shift_count(b)?;
            let result = if shift >= 63 {
                (a == 0).then_some(0)
            } else {
                let shifted = a << shift;
                (shifted >> shift == a).then_some(shifted)
            };
            checked(result, op)
        }
        BinaryOp::RShift => {
            let shift = shift_count(b)?;
            Ok(Value::Int(a >> shift.min(63)))
        }
        BinaryOp::BitAnd => Ok(Value::Int(a & b)),
        BinaryOp::BitOr => Ok(Value::Int(a | b)),
        BinaryOp::BitXor => Ok(Value::Int(a ^ b)),
    }
}

fn shift_count(b: i64) -> EvalResult<u32> {
    if b < 0 {
        return Err(value_error("negative shift count"));
    }
    Ok(u32::try_from(b).unwrap_or(u32::MAX))
}

fn floor_div(a: i64, b: i64) -> Option<i64> {
    let q = a.checked_div(b)?;
    if (a % b != 0) && ((a < 0) != (b < 0)) {
        q.checked_sub(1)
    } else {
        Some(q)
    }
}

fn floor_mod(a: i64, b: i64) -> Option<i64> {
    let r = a.checked_rem(b)?;
    if r != 0 && ((r < 0) != (b < 0)) {
        r.checked_add(b)
    } else {
        Some(r)
    }
}

/// `None` when the operator does not apply to floats.
fn eval_float_binary(a: f64, b: f64, op: BinaryOp) -> Option<EvalResult> {
    Some(match op {
        BinaryOp::Add => Ok(Value::Float(a + b)),
        BinaryOp::Sub => Ok(Value::Float(a - b)),
        BinaryOp::Mul => Ok(Value::Float(a * b)),
        BinaryOp::Div => {
            if b == 0.0 {
                Err(division_by_zero(true))
            } else {
                Ok(Value::Float(a / b))
            }
        }
        BinaryOp::FloorDiv => {
            if b == 0.0 {
                Err(division_by_zero(true))
            } else {
                Ok(Value::Float((a / b).floor()))
            }
        }
        BinaryOp::Mod => {
            if b == 0.0 {
                Err(division_by_zero(true))
            } else {
                let r = a % b;
                Ok(Value::Float(if r != 0.0 && (r < 0.0) != (b < 0.0) {
                    r + b
                } else {
                    r
                }))
            }
        }
        BinaryOp::Pow => {
            if a == 0.0 && b < 0.0 {
                Err(division_by_zero(true))
            } else if a < 0.0 && b.fract() != 0.0 {
                Err(value_error("negative number cannot be raised to a fractional power"))
            } else {
                Ok(Value::Float(a.powf(b)))
            }
        }
        BinaryOp::LShift
        | BinaryOp::RShift
        | BinaryOp::BitAnd
        | BinaryOp::BitOr
        | BinaryOp::BitXor => return None,
    })
}

/// Evaluate a unary operator.
pub fn evaluate_unary(op: UnaryOp, operand: &Value) -> EvalResult {
    match (op, operand) {
        (UnaryOp::Not, v) => Ok(Value::Bool(!v.is_truthy())),
        (UnaryOp::Neg, Value::Float(f)) => Ok(Value::Float(-f)),
        (UnaryOp::Neg, v) if v.as_int().is_some() => {
            let n = v.as_int().unwrap_or(0);
            n.checked_neg()
                .map(Value::Int)
                .ok_or_else(|| overflow("-"))
        }
        (UnaryOp::Pos, Value::Float(f)) => Ok(Value::Float(*f)),
        (UnaryOp::Pos, v) if v.as_int().is_some() => Ok(Value::Int(v.as_int().unwrap_or(0))),
        (UnaryOp::Invert, v) if v.as_int().is_some() => Ok(Value::Int(!v.as_int().unwrap_or(0))),
        (op, v) => {
            let symbol = match op {
                UnaryOp::Neg => "unary -",
                UnaryOp::Pos => "unary +",
                _ => "unary ~",
            };
            Err(type_error(format!(
                "bad operand type for {symbol}: '{}'",
                v.type_name()
            )))
        }
    }
}

/// Ordering for `<`, `<=`, `>`, `>=`, `sorted`, `min` and `max`.
pub fn compare_values(left: &Value, right: &Value) -> EvalResult<Ordering> {
    if let (Some(a), Some(b)) = (left.as_numeric(), right.as_numeric()) {
        return Ok(match (a, b) {
            (Numeric::Int(a), Numeric::Int(b)) => a.cmp(&b),
            _ => a
                .to_f64()
                .partial_cmp(&b.to_f64())
                .unwrap_or(Ordering::Equal),
        });
    }
    match (left, right) {
        (Value::Str(a), Value::Str(b)) => Ok(a.cmp(b)),
        (Value::Tuple(_), Value::Tuple(_)) | (Value::List(_), Value::List(_)) => {
            let a = left.snapshot_items().unwrap_or_default();
            let b = right.snapshot_items().unwrap_or_default();
            reckon_stack::with_stack(|| {
                for (x, y) in a.iter().zip(&b) {
                    if !x.equals(y) {
                        return compare_values(x, y);
                    }
                }
                Ok(a.len().cmp(&b.len()))
            })
        }
        _ => Err(type_error(format!(
            "unorderable types: {}() < {}()",
            left.type_name(),
            right.type_name()
        ))),
    }
}

/// `item in container`
pub fn contains(container: &Value, item: &Value) -> EvalResult<bool> {
    match container {
        Value::Str(s) => match item {
            Value::Str(needle) => Ok(s.contains(&**needle)),
            other => Err(type_error(format!(
                "'in <string>' requires string as left operand, not {}",
                other.type_name()
            ))),
        },
        Value::Dict(d) => d.lock().contains(item),
        Value::Namespace(ns) => Ok(item.as_str().is_some_and(|k| ns.lock().contains_key(k))),
        other => match other.snapshot_items() {
            Some(items) => Ok(items.iter().any(|x| x.equals(item))),
            None => Err(type_error(format!(
                "argument of type '{}' is not iterable",
                other.type_name()
            ))),
        },
    }
}

/// Evaluate one comparison link.
pub fn evaluate_compare(op: CmpOp, left: &Value, right: &Value) -> EvalResult<bool> {
    Ok(match op {
        CmpOp::Eq => left.equals(right),
        CmpOp::NotEq => !left.equals(right),
        CmpOp::Lt => compare_values(left, right)? == Ordering::Less,
        CmpOp::LtE => compare_values(left, right)? != Ordering::Greater,
        CmpOp::Gt => compare_values(left, right)? == Ordering::Greater,
        CmpOp::GtE => compare_values(left, right)? != Ordering::Less,
        CmpOp::In => contains(right, left)?,
        CmpOp::NotIn => !contains(right, left)?,
        CmpOp::Is => left.is_same(right),
        CmpOp::IsNot => !left.is_same(right),
    })
}

#[cfg(test)]
mod tests;
