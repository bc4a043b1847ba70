//! Expression evaluation, assignment targets and item access.

use reckon_ir::{BoolOp, Comprehension, Expr, ExprKind};

use super::Interpreter;
use crate::builtins::iterate;
use crate::errors::{
    index_out_of_range, key_error, no_attribute, not_subscriptable, type_error, value_error,
    ErrorKind, EvalError, EvalResult,
};
use crate::methods::{has_method, normalize_index};
use crate::operators::{evaluate_binary, evaluate_compare, evaluate_unary};
use crate::value::{BoundMethod, Dict, Value};

/// Bounds of `a[lower:upper:step]`.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct SliceBounds {
    lower: Option<i64>,
    upper: Option<i64>,
    step: Option<i64>,
}

impl SliceBounds {
    /// Indices selected in a sequence of `len` items, in selection order.
    pub(crate) fn indices(self, len: usize) -> EvalResult<Vec<usize>> {
        let step = self.step.unwrap_or(1);
        if step == 0 {
            return Err(value_error("slice step cannot be zero"));
        }
        let len = i64::try_from(len).unwrap_or(i64::MAX);
        let clamp = |bound: i64, low: i64, high: i64| {
            let b = if bound < 0 { bound.saturating_add(len) } else { bound };
            b.clamp(low, high)
        };
        let (start, stop) = if step > 0 {
            (
                self.lower.map_or(0, |l| clamp(l, 0, len)),
                self.upper.map_or(len, |u| clamp(u, 0, len)),
            )
        } else {
            (
                self.lower.map_or(len - 1, |l| clamp(l, -1, len - 1)),
                self.upper.map_or(-1, |u| clamp(u, -1, len - 1)),
            )
        };
        let mut out = Vec::new();
        let mut i = start;
        while (step > 0 && i < stop) || (step < 0 && i > stop) {
            if let Ok(index) = usize::try_from(i) {
                out.push(index);
            }
            i = match i.checked_add(step) {
                Some(next) => next,
                None => break,
            };
        }
        Ok(out)
    }

    /// `[lo, hi)` for a contiguous slice assignment.
    fn contiguous(self, len: usize) -> EvalResult<(usize, usize)> {
        if self.step.is_some_and(|s| s != 1) {
            return Err(value_error("extended slice assignment is not supported"));
        }
        let indices = self.indices(len)?;
        let lo = match indices.first() {
            Some(&lo) => lo,
            None => {
                let l = i64::try_from(len).unwrap_or(i64::MAX);
                let lower = self.lower.unwrap_or(0);
                let lower = if lower < 0 { (lower + l).max(0) } else { lower.min(l) };
                usize::try_from(lower).unwrap_or(0)
            }
        };
        Ok((lo, lo + indices.len()))
    }
}

/// A resolved assignment target.
pub(crate) enum Place {
    Name(String),
    Attr(Value, String),
    Item(Value, Value),
    Slice(Value, SliceBounds),
}

impl Interpreter {
    pub(crate) fn eval(&mut self, expr: &Expr) -> EvalResult {
        reckon_stack::with_stack(|| match &expr.kind {
            ExprKind::Name(name) => self.lookup(name),
            ExprKind::Int(n) => Ok(Value::Int(*n)),
            ExprKind::Float(f) => Ok(Value::Float(*f)),
            ExprKind::Str(s) => Ok(Value::string(s.as_str())),
            ExprKind::NoneLit => Ok(Value::None),
            ExprKind::Bool(b) => Ok(Value::Bool(*b)),
            ExprKind::Tuple(items) => Ok(Value::tuple(self.eval_args(items)?)),
            ExprKind::List(items) => Ok(Value::list(self.eval_args(items)?)),
            ExprKind::Dict(pairs) => {
                let mut dict = Dict::new();
                for (k, v) in pairs {
                    let key = self.eval(k)?;
                    let value = self.eval(v)?;
                    dict.insert(key, value)?;
                }
                Ok(Value::dict(dict))
            }
            ExprKind::ListComp { elt, generators } => {
                let mut out = Vec::new();
                self.eval_comprehension(elt, generators, &mut out)?;
                Ok(Value::list(out))
            }
            ExprKind::Attribute { value, attr } => {
                let value = self.eval(value)?;
                get_attr(&value, attr)
            }
            ExprKind::Subscript { value, index } => {
                let place = self.resolve_subscript(value, index)?;
                self.read_place(&place)
            }
            ExprKind::Slice { .. } => Err(type_error("slice outside of a subscript")),
            ExprKind::Call {
                func,
                args,
                keywords,
            } => {
                let callee = self.eval(func)?;
                let args = self.eval_args(args)?;
                let mut kwargs = Vec::with_capacity(keywords.len());
                for keyword in keywords {
                    kwargs.push((keyword.name.clone(), self.eval(&keyword.value)?));
                }
                self.call_value(&callee, args, kwargs)
            }
            ExprKind::Binary { op, left, right } => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                evaluate_binary(&left, &right, *op)
            }
            ExprKind::Unary { op, operand } => {
                let operand = self.eval(operand)?;
                evaluate_unary(*op, &operand)
            }
            ExprKind::BoolOp { op, values } => {
                let mut last = Value::None;
                for value in values {
                    last = self.eval(value)?;
                    let done = match op {
                        BoolOp::And => !last.is_truthy(),
                        BoolOp::Or => last.is_truthy(),
                    };
                    if done {
                        break;
                    }
                }
                Ok(last)
            }
            ExprKind::Compare { left, ops } => {
                let mut left = self.eval(left)?;
                for (op, right) in ops {
                    let right = self.eval(right)?;
                    if !evaluate_compare(*op, &left, &right)? {
                        return Ok(Value::Bool(false));
                    }
                    left = right;
                }
                Ok(Value::Bool(true))
            }
            ExprKind::IfExp { test, body, orelse } => {
                if self.eval(test)?.is_truthy() {
                    self.eval(body)
                } else {
                    self.eval(orelse)
                }
            }
            ExprKind::Lambda(def) => self.make_function(def),
            ExprKind::Repr(inner) => Ok(Value::string(self.eval(inner)?.repr())),
        })
    }

    pub(crate) fn eval_args(&mut self, exprs: &[Expr]) -> EvalResult<Vec<Value>> {
        exprs.iter().map(|e| self.eval(e)).collect()
    }

    /// List comprehension; loop variables bind in the enclosing scope.
    fn eval_comprehension(
        &mut self,
        elt: &Expr,
        generators: &[Comprehension],
        out: &mut Vec<Value>,
    ) -> EvalResult<()> {
        let Some((first, rest)) = generators.split_first() else {
            out.push(self.eval(elt)?);
            return Ok(());
        };
        for item in iterate(&self.eval(&first.iter)?)? {
            self.check_cancelled()?;
            self.assign(&first.target, item)?;
            let mut keep = true;
            for cond in &first.ifs {
                if !self.eval(cond)?.is_truthy() {
                    keep = false;
                    break;
                }
            }
            if keep {
                self.eval_comprehension(elt, rest, out)?;
            }
        }
        Ok(())
    }

    // Places

    fn resolve_subscript(&mut self, value: &Expr, index: &Expr) -> EvalResult<Place> {
        let container = self.eval(value)?;
        if let ExprKind::Slice { lower, upper, step } = &index.kind {
            let mut bound = |e: &Option<Box<Expr>>| -> EvalResult<Option<i64>> {
                match e {
                    None => Ok(None),
                    Some(e) => match self.eval(e)? {
                        Value::None => Ok(None),
                        v => v.expect_int("slice indices").map(Some),
                    },
                }
            };
            let bounds = SliceBounds {
                lower: bound(lower)?,
                upper: bound(upper)?,
                step: bound(step)?,
            };
            return Ok(Place::Slice(container, bounds));
        }
        let key = self.eval(index)?;
        Ok(Place::Item(container, key))
    }

    pub(crate) fn resolve_place(&mut self, target: &Expr) -> EvalResult<Place> {
        match &target.kind {
            ExprKind::Name(name) => Ok(Place::Name(name.clone())),
            ExprKind::Attribute { value, attr } => {
                Ok(Place::Attr(self.eval(value)?, attr.clone()))
            }
            ExprKind::Subscript { value, index } => self.resolve_subscript(value, index),
            _ => Err(type_error("illegal assignment target")),
        }
    }

    pub(crate) fn read_place(&mut self, place: &Place) -> EvalResult {
        match place {
            Place::Name(name) => self.lookup(name),
            Place::Attr(value, attr) => get_attr(value, attr),
            Place::Item(container, key) => get_item(container, key),
            Place::Slice(container, bounds) => get_slice(container, *bounds),
        }
    }

    pub(crate) fn write_place(&mut self, place: Place, value: Value) -> EvalResult<()> {
        match place {
            Place::Name(name) => {
                self.bind(&name, value);
                Ok(())
            }
            Place::Attr(Value::Namespace(ns), attr) => {
                ns.lock().insert(attr, value);
                Ok(())
            }
            Place::Attr(other, attr) => Err(no_attribute(other.type_name(), &attr)),
            Place::Item(Value::List(list), key) => {
                let index = list_index(&key)?;
                let mut items = list.lock();
                let i = normalize_index(index, items.len()).ok_or_else(assignment_out_of_range)?;
                items[i] = value;
                Ok(())
            }
            Place::Item(Value::Dict(dict), key) => dict.lock().insert(key, value),
            Place::Item(other, _) => Err(type_error(format!(
                "'{}' object does not support item assignment",
                other.type_name()
            ))),
            Place::Slice(Value::List(list), bounds) => {
                let replacement = iterate(&value)?;
                let mut items = list.lock();
                let (lo, hi) = bounds.contiguous(items.len())?;
                items.splice(lo..hi, replacement);
                Ok(())
            }
            Place::Slice(other, _) => Err(type_error(format!(
                "'{}' object does not support slice assignment",
                other.type_name()
            ))),
        }
    }

    /// Assign `value` to a target, unpacking tuple and list targets.
    pub(crate) fn assign(&mut self, target: &Expr, value: Value) -> EvalResult<()> {
        match &target.kind {
            ExprKind::Tuple(targets) | ExprKind::List(targets) => {
                let items = iterate(&value)?;
                if items.len() > targets.len() {
                    return Err(value_error("too many values to unpack"));
                }
                if items.len() < targets.len() {
                    let n = items.len();
                    let noun = if n == 1 { "value" } else { "values" };
                    return Err(value_error(format!("need more than {n} {noun} to unpack")));
                }
                for (target, item) in targets.iter().zip(items) {
                    self.assign(target, item)?;
                }
                Ok(())
            }
            _ => {
                let place = self.resolve_place(target)?;
                self.write_place(place, value)
            }
        }
    }

    pub(crate) fn delete(&mut self, target: &Expr) -> EvalResult<()> {
        if let ExprKind::Tuple(targets) | ExprKind::List(targets) = &target.kind {
            for target in targets {
                self.delete(target)?;
            }
            return Ok(());
        }
        match self.resolve_place(target)? {
            Place::Name(name) => self.unbind(&name),
            Place::Attr(Value::Namespace(ns), attr) => match ns.lock().remove(&attr) {
                Some(_) => Ok(()),
                None => Err(no_attribute("namespace", &attr)),
            },
            Place::Attr(other, attr) => Err(no_attribute(other.type_name(), &attr)),
            Place::Item(Value::List(list), key) => {
                let index = list_index(&key)?;
                let mut items = list.lock();
                let i = normalize_index(index, items.len()).ok_or_else(assignment_out_of_range)?;
                items.remove(i);
                Ok(())
            }
            Place::Item(Value::Dict(dict), key) => match dict.lock().remove(&key)? {
                Some(_) => Ok(()),
                None => Err(key_error(key.repr())),
            },
            Place::Item(other, _) => Err(type_error(format!(
                "'{}' object does not support item deletion",
                other.type_name()
            ))),
            Place::Slice(Value::List(list), bounds) => {
                let mut items = list.lock();
                let mut doomed = bounds.indices(items.len())?;
                doomed.sort_unstable();
                for i in doomed.into_iter().rev() {
                    items.remove(i);
                }
                Ok(())
            }
            Place::Slice(other, _) => Err(type_error(format!(
                "'{}' object does not support item deletion",
                other.type_name()
            ))),
        }
    }
}

#[cold]
fn assignment_out_of_range() -> EvalError {
    EvalError::new(ErrorKind::Index, "list assignment index out of range")
}

fn list_index(key: &Value) -> EvalResult<i64> {
    key.as_int().ok_or_else(|| {
        type_error(format!(
            "list indices must be integers, not {}",
            key.type_name()
        ))
    })
}

/// `value.attr`
pub(crate) fn get_attr(value: &Value, attr: &str) -> EvalResult {
    match value {
        Value::Namespace(ns) => {
            if let Some(v) = ns.lock().get(attr) {
                return Ok(v.clone());
            }
        }
        Value::Exception(exc) => match attr {
            "message" => return Ok(Value::string(exc.message.as_str())),
            "args" => return Ok(Value::tuple(vec![Value::string(exc.message.as_str())])),
            _ => {}
        },
        Value::Function(f) => match attr {
            "__name__" => return Ok(Value::string(f.name())),
            "__doc__" => {
                return Ok(f.def.docstring().map_or(Value::None, Value::from));
            }
            _ => {}
        },
        _ if has_method(value, attr) => {
            return Ok(Value::BoundMethod(std::sync::Arc::new(BoundMethod {
                receiver: value.clone(),
                name: attr.into(),
            })));
        }
        _ => {}
    }
    Err(no_attribute(value.type_name(), attr))
}

/// `container[key]`
pub(crate) fn get_item(container: &Value, key: &Value) -> EvalResult {
    match container {
        Value::List(_) | Value::Tuple(_) | Value::Str(_) => {
            let type_name = container.type_name();
            let index = key.as_int().ok_or_else(|| {
                type_error(format!(
                    "{type_name} indices must be integers, not {}",
                    key.type_name()
                ))
            })?;
            let item = match container {
                Value::List(list) => {
                    let items = list.lock();
                    normalize_index(index, items.len()).map(|i| items[i].clone())
                }
                Value::Tuple(items) => {
                    normalize_index(index, items.len()).map(|i| items[i].clone())
                }
                Value::Str(s) => {
                    let count = s.chars().count();
                    normalize_index(index, count)
                        .and_then(|i| s.chars().nth(i))
                        .map(|c| Value::string(c.to_string()))
                }
                _ => None,
            };
            item.ok_or_else(|| {
                let what = if type_name == "str" { "string" } else { type_name };
                index_out_of_range(what)
            })
        }
        Value::Dict(dict) => dict
            .lock()
            .get(key)?
            .ok_or_else(|| key_error(key.repr())),
        other => Err(not_subscriptable(other.type_name())),
    }
}

fn get_slice(container: &Value, bounds: SliceBounds) -> EvalResult {
    match container {
        Value::Str(s) => {
            let chars: Vec<char> = s.chars().collect();
            let picked: String = bounds
                .indices(chars.len())?
                .into_iter()
                .map(|i| chars[i])
                .collect();
            Ok(Value::string(picked))
        }
        Value::List(_) | Value::Tuple(_) => {
            let items = container.snapshot_items().unwrap_or_default();
            let picked: Vec<Value> = bounds
                .indices(items.len())?
                .into_iter()
                .map(|i| items[i].clone())
                .collect();
            Ok(match container {
                Value::Tuple(_) => Value::tuple(picked),
                _ => Value::list(picked),
            })
        }
        other => Err(not_subscriptable(other.type_name())),
    }
}
