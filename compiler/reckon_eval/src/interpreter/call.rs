//! Calls: user functions, builtins, bound methods, type constructors
//! and exception classes.

use std::sync::Arc;

use reckon_ir::FunctionDef;
use rustc_hash::FxHashMap;

use super::stmt::exception_message;
use super::{CallFrame, Interpreter, Unwind};
use crate::builtins::{call_builtin, call_type};
use crate::errors::{not_callable, recursion_limit, type_error, EvalResult};
use crate::methods::call_method;
use crate::value::{FunctionValue, Value};

impl Interpreter {
    pub(crate) fn call_value(
        &mut self,
        callee: &Value,
        args: Vec<Value>,
        kwargs: Vec<(String, Value)>,
    ) -> EvalResult {
        self.check_cancelled()?;
        match callee {
            Value::Function(f) => self.call_function(f, args, kwargs),
            Value::Builtin(b) => call_builtin(*b, args, kwargs),
            Value::BoundMethod(m) => call_method(&m.receiver, &m.name, args, kwargs),
            Value::Type(t) => call_type(*t, args, kwargs),
            Value::ExceptionType(name) => {
                if let Some((key, _)) = kwargs.first() {
                    return Err(type_error(format!(
                        "{name}() takes no keyword arguments ('{key}' given)"
                    )));
                }
                Ok(Value::exception(name, exception_message(&args)))
            }
            other => Err(not_callable(other.type_name())),
        }
    }

    fn call_function(
        &mut self,
        function: &Arc<FunctionValue>,
        args: Vec<Value>,
        kwargs: Vec<(String, Value)>,
    ) -> EvalResult {
        if self.frames.len() >= self.recursion_limit {
            return Err(recursion_limit());
        }
        let locals = bind_arguments(function, args, kwargs)?;
        let lines = function.lines.clone();
        self.frames.push(CallFrame {
            name: function.name().to_owned(),
            locals,
            closure: function.closure.clone(),
            line: lines.line(function.def.span.start),
            lines,
        });
        let result = reckon_stack::with_stack(|| self.exec_suite(&function.def.body));
        let frame = self.frames.pop();
        match result {
            Ok(()) | Err(Unwind::Break | Unwind::Continue) => Ok(Value::None),
            Err(Unwind::Return(value)) => Ok(value),
            Err(Unwind::Error(mut err)) => {
                if let Some(frame) = frame.filter(|_| !err.is_interrupted()) {
                    Self::push_traceback(&mut err, &frame);
                }
                Err(err)
            }
        }
    }

    /// Build a function value for `def`, evaluating its defaults now.
    pub(crate) fn make_function(&mut self, def: &Arc<FunctionDef>) -> EvalResult {
        let mut defaults = Vec::new();
        for param in &def.params {
            if let Some(default) = &param.default {
                defaults.push(self.eval(default)?);
            }
        }
        Ok(Value::Function(Arc::new(FunctionValue {
            def: def.clone(),
            defaults,
            closure: self.visible_locals().map(Arc::new),
            lines: self.current_lines(),
        })))
    }
}

/// Match call arguments to parameters.
fn bind_arguments(
    function: &FunctionValue,
    args: Vec<Value>,
    kwargs: Vec<(String, Value)>,
) -> EvalResult<FxHashMap<String, Value>> {
    let params = &function.def.params;
    let name = function.name();
    let required = params.len() - function.defaults.len();
    let given = args.len() + kwargs.len();
    let count_error = || {
        let (qualifier, n) = if function.defaults.is_empty() {
            ("exactly", params.len())
        } else if given < required {
            ("at least", required)
        } else {
            ("at most", params.len())
        };
        let noun = if n == 1 { "argument" } else { "arguments" };
        type_error(format!(
            "{name}() takes {qualifier} {n} {noun} ({given} given)"
        ))
    };
    if args.len() > params.len() {
        return Err(count_error());
    }

    let mut slots: Vec<Option<Value>> = args.into_iter().map(Some).collect();
    slots.resize(params.len(), None);
    for (key, value) in kwargs {
        let Some(i) = params.iter().position(|p| p.name == key) else {
            return Err(type_error(format!(
                "{name}() got an unexpected keyword argument '{key}'"
            )));
        };
        if slots[i].is_some() {
            return Err(type_error(format!(
                "{name}() got multiple values for keyword argument '{key}'"
            )));
        }
        slots[i] = Some(value);
    }

    let mut locals = FxHashMap::default();
    for (i, (param, slot)) in params.iter().zip(slots).enumerate() {
        let value = match slot {
            Some(value) => value,
            None if i >= required => function.defaults[i - required].clone(),
            None => return Err(count_error()),
        };
        locals.insert(param.name.clone(), value);
    }
    Ok(locals)
}
