//! Statement execution.

use std::sync::Arc;

use reckon_ir::{BinaryOp, ExceptHandler, Expr, ExprKind, PrintTarget, Stmt, StmtKind, Suite};

use super::{ExecResult, Interpreter, Unwind};
use crate::builtins::iterate;
use crate::errors::{no_attribute, type_error, ErrorKind, EvalError, EvalResult};
use crate::operators::evaluate_binary;
use crate::value::Value;

/// Destination of one `print` statement.
enum PrintDest {
    Hook,
    Stdout,
    Stream(Value),
}

impl PrintDest {
    fn key(&self) -> usize {
        match self {
            PrintDest::Hook => 0,
            PrintDest::Stdout => 1,
            PrintDest::Stream(Value::Buffer(buf)) => Arc::as_ptr(buf) as usize,
            PrintDest::Stream(_) => 2,
        }
    }
}

impl Interpreter {
    pub(crate) fn exec_suite(&mut self, suite: &[Stmt]) -> ExecResult {
        for stmt in suite {
            self.exec_stmt(stmt)?;
        }
        Ok(())
    }

    fn exec_stmt(&mut self, stmt: &Stmt) -> ExecResult {
        self.check_cancelled()?;
        self.mark_line(stmt.span);
        reckon_stack::with_stack(|| match &stmt.kind {
            StmtKind::Expr(expr) => {
                self.eval(expr)?;
                Ok(())
            }
            StmtKind::Output(exprs) => self.exec_output(exprs),
            StmtKind::Assign { targets, value } => {
                let value = self.eval(value)?;
                for target in targets {
                    self.assign(target, value.clone())?;
                }
                Ok(())
            }
            StmtKind::AugAssign { target, op, value } => self.exec_aug_assign(target, *op, value),
            StmtKind::Print {
                target,
                values,
                newline,
            } => self.exec_print(target, values, *newline),
            StmtKind::Del(targets) => {
                for target in targets {
                    self.delete(target)?;
                }
                Ok(())
            }
            StmtKind::Pass | StmtKind::Global(_) | StmtKind::Nonlocal(_) => Ok(()),
            StmtKind::Break => Err(Unwind::Break),
            StmtKind::Continue => Err(Unwind::Continue),
            StmtKind::Return(value) => {
                let value = match value {
                    Some(expr) => self.eval(expr)?,
                    None => Value::None,
                };
                Err(Unwind::Return(value))
            }
            StmtKind::Assert { test, msg } => {
                if self.eval(test)?.is_truthy() {
                    return Ok(());
                }
                let message = match msg {
                    Some(msg) => self.eval(msg)?.to_str(),
                    None => String::new(),
                };
                Err(EvalError::new(ErrorKind::Assertion, message).into())
            }
            StmtKind::Raise(expr) => Err(self.exec_raise(expr.as_ref()).into()),
            StmtKind::If { test, body, orelse } => {
                if self.eval(test)?.is_truthy() {
                    self.exec_suite(body)
                } else {
                    self.exec_suite(orelse)
                }
            }
            StmtKind::While { test, body, orelse } => {
                loop {
                    self.check_cancelled()?;
                    if !self.eval(test)?.is_truthy() {
                        break;
                    }
                    match self.exec_suite(body) {
                        Ok(()) | Err(Unwind::Continue) => {}
                        Err(Unwind::Break) => return Ok(()),
                        Err(other) => return Err(other),
                    }
                }
                self.exec_suite(orelse)
            }
            StmtKind::For {
                target,
                iter,
                body,
                orelse,
            } => {
                let items = iterate(&self.eval(iter)?)?;
                for item in items {
                    self.check_cancelled()?;
                    self.assign(target, item)?;
                    match self.exec_suite(body) {
                        Ok(()) | Err(Unwind::Continue) => {}
                        Err(Unwind::Break) => return Ok(()),
                        Err(other) => return Err(other),
                    }
                }
                self.exec_suite(orelse)
            }
            StmtKind::FunctionDef(def) => {
                let function = self.make_function(def)?;
                self.bind(&def.name, function);
                Ok(())
            }
            StmtKind::Try {
                body,
                handlers,
                orelse,
                finalbody,
            } => self.exec_try(body, handlers, orelse, finalbody),
        })
    }

    /// Display values: `None` is skipped, custom results pass through,
    /// anything else is shown by `repr` and bound to `_`.
    fn exec_output(&mut self, exprs: &[Expr]) -> ExecResult {
        let mut values = Vec::with_capacity(exprs.len());
        for expr in exprs {
            values.push(self.eval(expr)?);
        }
        let value = if values.len() == 1 {
            values.pop().unwrap_or(Value::None)
        } else {
            Value::tuple(values)
        };
        match value {
            Value::None => {}
            Value::Custom(custom) => self.output.custom(custom),
            value => {
                self.output.text(value.repr());
                self.globals.set("_", value);
            }
        }
        Ok(())
    }

    fn exec_aug_assign(&mut self, target: &Expr, op: BinaryOp, value: &Expr) -> ExecResult {
        let place = self.resolve_place(target)?;
        let current = self.read_place(&place)?;
        let rhs = self.eval(value)?;
        let result = match (&current, op) {
            // In-place extension keeps the list's identity.
            (Value::List(list), BinaryOp::Add) => {
                let items = iterate(&rhs)?;
                list.lock().extend(items);
                current.clone()
            }
            _ => evaluate_binary(&current, &rhs, op)?,
        };
        self.write_place(place, result)?;
        Ok(())
    }

    fn exec_print(&mut self, target: &PrintTarget, values: &[Expr], newline: bool) -> ExecResult {
        let dest = match target {
            PrintTarget::Hook => PrintDest::Hook,
            PrintTarget::Stdout => PrintDest::Stdout,
            PrintTarget::Stream(expr) => match self.eval(expr)? {
                Value::None => PrintDest::Stdout,
                Value::Buffer(buf) => PrintDest::Stream(Value::Buffer(buf)),
                other => return Err(no_attribute(other.type_name(), "write").into()),
            },
        };
        let key = dest.key();
        for expr in values {
            let value = self.eval(expr)?;
            if self.softspace.get(&key).copied().unwrap_or(false) {
                self.print_write(&dest, " ");
            }
            let text = value.to_str();
            self.print_write(&dest, &text);
            // A string ending in whitespace other than a plain space
            // suppresses the separator before the next item.
            let soft = !(matches!(value, Value::Str(_))
                && text.ends_with(|c: char| c.is_whitespace() && c != ' '));
            self.softspace.insert(key, soft);
        }
        if newline {
            self.print_write(&dest, "\n");
            self.softspace.insert(key, false);
        }
        Ok(())
    }

    fn print_write(&mut self, dest: &PrintDest, text: &str) {
        match dest {
            PrintDest::Hook => self.output.write(text),
            PrintDest::Stdout => print!("{text}"),
            PrintDest::Stream(Value::Buffer(buf)) => buf.lock().push_str(text),
            PrintDest::Stream(_) => {}
        }
    }

    /// Error for a `raise` statement.
    fn exec_raise(&mut self, expr: Option<&Expr>) -> EvalError {
        let Some(expr) = expr else {
            return match self.handling.last() {
                Some(active) => active.clone(),
                None => EvalError::new(ErrorKind::Runtime, "No active exception to reraise"),
            };
        };
        // `raise Name(...)` with an unbound name raises an exception of
        // that name.
        let value = match &expr.kind {
            ExprKind::Name(name) if self.lookup(name).is_err() => {
                Ok(Value::exception(name, String::new()))
            }
            ExprKind::Call { func, args, .. } => match &func.kind {
                ExprKind::Name(name) if self.lookup(name).is_err() => self
                    .eval_args(args)
                    .map(|args| Value::exception(name, exception_message(&args))),
                _ => self.eval(expr),
            },
            _ => self.eval(expr),
        };
        match value {
            Err(err) => err,
            Ok(Value::ExceptionType(name)) => {
                EvalError::new(ErrorKind::from_type_name(&name), String::new())
            }
            Ok(Value::Exception(exc)) => {
                let mut err = EvalError::new(
                    ErrorKind::from_type_name(&exc.type_name),
                    exc.message.clone(),
                );
                err.value = Some(Value::Exception(exc));
                err
            }
            Ok(other) => type_error(format!(
                "exceptions must be exception types or instances, not {}",
                other.type_name()
            )),
        }
    }

    fn exec_try(
        &mut self,
        body: &Suite,
        handlers: &[ExceptHandler],
        orelse: &Suite,
        finalbody: &Suite,
    ) -> ExecResult {
        let result = match self.exec_suite(body) {
            Ok(()) => self.exec_suite(orelse),
            Err(Unwind::Error(err)) if !err.is_interrupted() => self.handle_exception(err, handlers),
            Err(other) => Err(other),
        };
        if !finalbody.is_empty() {
            self.exec_suite(finalbody)?;
        }
        result
    }

    fn handle_exception(&mut self, err: EvalError, handlers: &[ExceptHandler]) -> ExecResult {
        for handler in handlers {
            if let Some(kind) = &handler.kind {
                if !self.handler_matches(kind, &err)? {
                    continue;
                }
            }
            if let Some(name) = &handler.name {
                let value = err
                    .value
                    .clone()
                    .unwrap_or_else(|| Value::exception(err.type_name(), err.message.clone()));
                self.bind(name, value);
            }
            self.handling.push(err);
            let result = self.exec_suite(&handler.body);
            self.handling.pop();
            return result;
        }
        Err(Unwind::Error(err))
    }

    /// Whether `except <kind>:` catches `err`. Unbound names match by
    /// name, so user-raised exception names can be caught.
    fn handler_matches(&mut self, kind: &Expr, err: &EvalError) -> EvalResult<bool> {
        match &kind.kind {
            ExprKind::Tuple(items) => {
                for item in items {
                    if self.handler_matches(item, err)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            ExprKind::Name(name) if self.lookup(name).is_err() => {
                Ok(err.kind.is_caught_by(name))
            }
            _ => Ok(match self.eval(kind)? {
                Value::ExceptionType(name) => err.kind.is_caught_by(&name),
                Value::Tuple(items) => items.iter().any(|item| {
                    matches!(item, Value::ExceptionType(name) if err.kind.is_caught_by(name))
                }),
                _ => false,
            }),
        }
    }
}

/// Message of an exception constructed with `args`.
pub(crate) fn exception_message(args: &[Value]) -> String {
    match args {
        [] => String::new(),
        [single] => single.to_str(),
        many => Value::tuple(many.to_vec()).repr(),
    }
}

