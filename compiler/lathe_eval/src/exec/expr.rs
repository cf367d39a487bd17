//! Expression evaluation.

use crate::errors::{
    domain_error, missing_else, not_a_record, not_boolean,
    recursive_definition_used_as_value, type_mismatch, unbound_identifier, EvalError, EvalResult,
};
use crate::exec::{call, strings};
use crate::executor::{ListExecutor, RecordExecutor};
use crate::frame::Frame;
use crate::function::Closure;
use crate::ir::{Op, OpKind, SharedOp};
use crate::operators::{evaluate_binary, evaluate_unary};
use crate::record::Record;
use crate::value::Value;

impl Op {
    /// Evaluate this operation as an expression, returning its value.
    ///
    /// Recursion here rides the host stack; `Call` re-enters the
    /// trampoline for the callee body, so only non-tail nesting
    /// consumes stack, and the call boundary grows it as needed.
    pub fn eval(&self, frame: &mut Frame) -> EvalResult {
        match &self.kind {
            OpKind::Constant(value) => Ok(value.clone()),
            OpKind::SymbolicRef(name) => frame
                .system
                .global(name)
                .ok_or_else(|| unbound_identifier(self.phrase, name.clone())),
            OpKind::DataRef(slot) => Ok(frame[*slot].clone()),
            OpKind::NonlocalRef(slot) => {
                let Some(nonlocals) = &frame.nonlocals else {
                    return Err(type_mismatch(
                        self.phrase,
                        "captured environment",
                        "program frame",
                    ));
                };
                // A lambda stored in the nonlocal module is a bundle
                // member: close it over this frame's own nonlocals.
                Ok(match nonlocals.get(*slot) {
                    Value::Lambda(lambda) => Value::Closure(Closure {
                        lambda,
                        nonlocals: nonlocals.clone(),
                    }),
                    value => value,
                })
            }
            OpKind::ModuleRef { slot, index } => match &frame[*slot] {
                Value::Module(module) => Ok(module.get(*index)),
                other => Err(type_mismatch(self.phrase, "record", other.type_name())),
            },
            OpKind::Call { func, arg } => call::eval_call(self, func, arg, frame),
            OpKind::Unary { op, arg } => {
                let value = arg.eval(frame)?;
                evaluate_unary(*op, value, self.phrase)
            }
            OpKind::Binary { op, lhs, rhs } => {
                let a = lhs.eval(frame)?;
                let b = rhs.eval(frame)?;
                evaluate_binary(*op, a, b, self.phrase)
            }
            OpKind::And { lhs, rhs } => {
                if self.condition(lhs, frame)? {
                    Ok(Value::Bool(self.condition(rhs, frame)?))
                } else {
                    Ok(Value::Bool(false))
                }
            }
            OpKind::Or { lhs, rhs } => {
                if self.condition(lhs, frame)? {
                    Ok(Value::Bool(true))
                } else {
                    Ok(Value::Bool(self.condition(rhs, frame)?))
                }
            }
            OpKind::Ensure { arg, predicate } => {
                let value = arg.eval(frame)?;
                let pred = predicate.eval(frame)?;
                let verdict = call::apply(
                    pred,
                    value.clone(),
                    predicate.phrase,
                    frame.system.clone(),
                )?;
                match verdict.as_bool() {
                    Some(true) => Ok(value),
                    Some(false) => Err(domain_error(self.phrase, "predicate assertion failed")),
                    None => Err(not_boolean(predicate.phrase, verdict.type_name())),
                }
            }
            OpKind::Range {
                first,
                last,
                step,
                half_open,
            } => eval_range(self, first, last, step.as_ref(), *half_open, frame),
            OpKind::List(elements) => {
                let mut executor = ListExecutor::default();
                for element in elements {
                    element.exec(frame, &mut executor)?;
                }
                Ok(executor.into_list())
            }
            OpKind::Record(fields) => {
                let mut executor = RecordExecutor::default();
                for field in fields {
                    field.exec(frame, &mut executor)?;
                }
                Ok(executor.into_record())
            }
            OpKind::If { .. } => Err(missing_else(self.phrase)),
            OpKind::IfElse { cond, then, els } => {
                if self.condition(cond, frame)? {
                    then.eval(frame)
                } else {
                    els.eval(frame)
                }
            }
            OpKind::Dot { base, selector } => {
                let value = base.eval(frame)?;
                let name = selector.eval(frame)?;
                match &value {
                    Value::Record(_) | Value::Module(_) => value
                        .field(&name)
                        .ok_or_else(|| unbound_identifier(self.phrase, name)),
                    other => Err(not_a_record(self.phrase, other.type_name())),
                }
            }
            OpKind::Str(segments) => strings::eval_string(segments, frame),
            OpKind::Lambda { lambda, nonlocals } => {
                let captured = nonlocals.eval_module(frame)?;
                Ok(Value::Closure(Closure {
                    lambda: lambda.clone(),
                    nonlocals: captured,
                }))
            }
            OpKind::Parametric { ctor } => {
                let ctor_value = ctor.eval(frame)?;
                let made = call::apply(
                    ctor_value.clone(),
                    Value::record(Record::new()),
                    self.phrase,
                    frame.system.clone(),
                )?;
                let rec = match made {
                    Value::Record(rec) => rec,
                    other => return Err(not_a_record(self.phrase, other.type_name())),
                };
                // The reconstructor rides along as a field, so the
                // record can be re-made with different parameters.
                let mut rec = (*rec).clone();
                rec.set(frame.system.intern("constructor"), ctor_value);
                Ok(Value::record(rec))
            }
            OpKind::ConstModule(_) | OpKind::EnumModule { .. } | OpKind::ScopedModule(_) => {
                self.eval_module(frame).map(Value::Module)
            }
            OpKind::Block { scope, body } => {
                scope.exec(frame)?;
                body.eval(frame)
            }
            OpKind::Preaction { actions, body } => {
                actions.exec(frame, &mut crate::executor::ActionExecutor)?;
                body.eval(frame)
            }
            OpKind::RecursiveDefinition => {
                Err(recursive_definition_used_as_value(self.phrase))
            }
            // Statements have no value.
            OpKind::NullAction
            | OpKind::Compound(_)
            | OpKind::For { .. }
            | OpKind::While { .. }
            | OpKind::Spread(_)
            | OpKind::Assoc { .. }
            | OpKind::Assign { .. }
            | OpKind::DataSetter { .. }
            | OpKind::FunctionSetter { .. }
            | OpKind::IncludeSetter { .. }
            | OpKind::Print(_) => Err(type_mismatch(self.phrase, "expression", "statement")),
        }
    }

    /// Evaluate a boolean condition, citing the condition's phrase on
    /// mismatch.
    pub(crate) fn condition(&self, cond: &SharedOp, frame: &mut Frame) -> Result<bool, EvalError> {
        let value = cond.eval(frame)?;
        value
            .as_bool()
            .ok_or_else(|| not_boolean(cond.phrase, value.type_name()))
    }
}

fn eval_range(
    op: &Op,
    first: &SharedOp,
    last: &SharedOp,
    step: Option<&SharedOp>,
    half_open: bool,
    frame: &mut Frame,
) -> EvalResult {
    let first = expect_num(first, frame)?;
    let last = expect_num(last, frame)?;
    let step = match step {
        Some(step) => expect_num(step, frame)?,
        None => 1.0,
    };
    if step == 0.0 || !step.is_finite() {
        return Err(domain_error(op.phrase, "range step must be a nonzero number"));
    }
    let mut items = Vec::new();
    let mut x = first;
    loop {
        let in_range = if step > 0.0 {
            if half_open {
                x < last
            } else {
                x <= last
            }
        } else if half_open {
            x > last
        } else {
            x >= last
        };
        if !in_range {
            break;
        }
        items.push(Value::Num(x));
        x += step;
    }
    Ok(Value::list(items))
}

fn expect_num(op: &SharedOp, frame: &mut Frame) -> Result<f64, EvalError> {
    let value = op.eval(frame)?;
    value
        .as_num()
        .ok_or_else(|| type_mismatch(op.phrase, "number", value.type_name()))
}
