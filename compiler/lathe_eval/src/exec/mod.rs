//! The tree-walking evaluator.
//!
//! `Op` behavior is implemented here, split by concern:
//!
//! - `expr` - `Op::eval`, the expression dispatch
//! - `call` - function application, eager and tail
//! - `control` - `Op::exec`, `Op::tail_eval`, scopes and setters
//! - `strings` - interpolated string segments and symbol evaluation

pub(crate) mod call;
mod control;
mod expr;
mod strings;

use crate::errors::{EvalError, EvalResult};
use crate::executor::Executor;
use crate::frame::Frame;
use crate::ir::SharedOp;

/// Evaluate an expression in a frame. Driver entry point.
pub fn eval_expression(op: &SharedOp, frame: &mut Frame) -> EvalResult {
    op.eval(frame)
}

/// Execute a statement in a frame, sending generated values and fields
/// to `executor`. Driver entry point.
pub fn exec_statement(
    op: &SharedOp,
    frame: &mut Frame,
    executor: &mut dyn Executor,
) -> Result<(), EvalError> {
    op.exec(frame, executor)
}
