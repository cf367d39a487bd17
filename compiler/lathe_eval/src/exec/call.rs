//! Function application.
//!
//! Both entry points evaluate the function and the argument in the
//! caller's frame, left to right, then dispatch on the callable kind.
//! The eager path gives the callee its own trampoline, so a tail chain
//! inside the callee never deepens the host stack; the tail path
//! replaces the caller's frame in place and leaves the driving to the
//! trampoline already running.

use crate::errors::{arity_mismatch, not_callable, EvalError, EvalResult};
use crate::frame::{ensure_sufficient_stack, tail_eval_frame, Frame};
use crate::function::{Builtin, Closure};
use crate::ir::{Op, SharedOp};
use crate::system::System;
use crate::value::Value;
use lathe_ir::Phrase;

pub(crate) fn eval_call(
    op: &Op,
    func: &SharedOp,
    arg: &SharedOp,
    frame: &mut Frame,
) -> EvalResult {
    let func_value = func.eval(frame)?;
    let arg_value = arg.eval(frame)?;
    apply(func_value, arg_value, op.phrase, frame.system.clone())
}

/// Call a function value with one argument.
///
/// This is the evaluator's only way to enter a function, and the
/// public entry point for drivers and builtins that hold a function
/// value (predicates, reconstructors).
#[tracing::instrument(level = "debug", skip_all)]
pub fn apply(func: Value, arg: Value, call_phrase: Phrase, system: System) -> EvalResult {
    match func {
        Value::Closure(closure) => {
            let mut callee = closure_frame(&closure, call_phrase, system);
            closure
                .lambda
                .pattern
                .bind_into_frame(arg, &mut callee)
                .map_err(|e| e.in_call(call_phrase))?;
            callee.next_op = Some(closure.lambda.body.clone());
            ensure_sufficient_stack(|| tail_eval_frame(callee))
        }
        Value::Builtin(builtin) => {
            let mut callee = builtin_frame(&builtin, call_phrase, system);
            bind_builtin_args(&builtin, arg, &mut callee, call_phrase)?;
            ensure_sufficient_stack(|| (builtin.call)(&mut callee))
                .map_err(|e| e.in_call(call_phrase))
        }
        other => Err(not_callable(call_phrase, other.type_name())),
    }
}

/// Tail-position call: replace the current frame with the callee frame
/// and stage the body for the running trampoline.
pub(crate) fn tail_call(
    op: &Op,
    func: &SharedOp,
    arg: &SharedOp,
    frame: &mut Box<Frame>,
) -> Result<(), EvalError> {
    let func_value = func.eval(frame)?;
    let arg_value = arg.eval(frame)?;
    match func_value {
        Value::Closure(closure) => {
            let mut callee = closure_frame(&closure, op.phrase, frame.system.clone());
            closure
                .lambda
                .pattern
                .bind_into_frame(arg_value, &mut callee)
                .map_err(|e| e.in_call(op.phrase))?;
            callee.next_op = Some(closure.lambda.body.clone());
            *frame = callee;
            Ok(())
        }
        // Builtins do not tail-chain; run eagerly and finalize.
        Value::Builtin(builtin) => {
            let mut callee = builtin_frame(&builtin, op.phrase, frame.system.clone());
            bind_builtin_args(&builtin, arg_value, &mut callee, op.phrase)?;
            let result = ensure_sufficient_stack(|| (builtin.call)(&mut callee))
                .map_err(|e| e.in_call(op.phrase))?;
            frame.result = result;
            Ok(())
        }
        other => Err(not_callable(op.phrase, other.type_name())),
    }
}

fn closure_frame(closure: &Closure, call_phrase: Phrase, system: System) -> Box<Frame> {
    Frame::make(
        closure.lambda.nslots,
        system,
        Some(call_phrase),
        Some(closure.nonlocals.clone()),
        Some(Value::Closure(closure.clone())),
    )
}

fn builtin_frame(builtin: &Builtin, call_phrase: Phrase, system: System) -> Box<Frame> {
    Frame::make(
        builtin.nargs,
        system,
        Some(call_phrase),
        None,
        Some(Value::Builtin(*builtin)),
    )
}

/// Arity-1 builtins take any value in slot 0; arity-n builtins unpack
/// a list of exactly n values into slots 0..n-1.
fn bind_builtin_args(
    builtin: &Builtin,
    arg: Value,
    callee: &mut Frame,
    call_phrase: Phrase,
) -> Result<(), EvalError> {
    if builtin.nargs == 1 {
        callee[0] = arg;
        return Ok(());
    }
    match arg.as_list() {
        Some(items) if items.len() == builtin.nargs => {
            for (slot, item) in items.iter().enumerate() {
                callee[slot] = item.clone();
            }
            Ok(())
        }
        _ => Err(arity_mismatch(call_phrase, builtin.nargs)),
    }
}
