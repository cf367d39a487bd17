//! Strict operator dispatch.
//!
//! Enum-based dispatch over already-evaluated operands. Short-circuit
//! `and`/`or` never reach here; they are handled at the evaluation
//! site before their right operand is touched.

use lathe_ir::Phrase;

use crate::errors::{
    division_by_zero, domain_error, not_boolean, type_mismatch, EvalError, EvalResult,
};
use crate::ir::{BinaryOp, UnaryOp};
use crate::value::Value;

/// Apply a strict binary operator to two values.
pub fn evaluate_binary(op: BinaryOp, lhs: Value, rhs: Value, phrase: Phrase) -> EvalResult {
    match op {
        BinaryOp::Eq => Ok(Value::Bool(lhs.equal(&rhs))),
        BinaryOp::Ne => Ok(Value::Bool(!lhs.equal(&rhs))),
        BinaryOp::Lt => num_operands(lhs, rhs, phrase).map(|(a, b)| Value::Bool(a < b)),
        BinaryOp::Gt => num_operands(lhs, rhs, phrase).map(|(a, b)| Value::Bool(a > b)),
        BinaryOp::Le => num_operands(lhs, rhs, phrase).map(|(a, b)| Value::Bool(a <= b)),
        BinaryOp::Ge => num_operands(lhs, rhs, phrase).map(|(a, b)| Value::Bool(a >= b)),
        BinaryOp::Add => num_operands(lhs, rhs, phrase).map(|(a, b)| Value::Num(a + b)),
        BinaryOp::Sub => num_operands(lhs, rhs, phrase).map(|(a, b)| Value::Num(a - b)),
        BinaryOp::Mul => num_operands(lhs, rhs, phrase).map(|(a, b)| Value::Num(a * b)),
        BinaryOp::Div => {
            let (a, b) = num_operands(lhs, rhs, phrase)?;
            if b == 0.0 {
                return Err(division_by_zero(phrase));
            }
            Ok(Value::Num(a / b))
        }
        BinaryOp::Pow => {
            let (a, b) = num_operands(lhs, rhs, phrase)?;
            let result = a.powf(b);
            // powf yields NaN exactly when the operation leaves the
            // real domain (negative base, non-integral exponent).
            if result.is_nan() && !a.is_nan() && !b.is_nan() {
                return Err(domain_error(phrase, format!("{a}^{b} is not a real number")));
            }
            Ok(Value::Num(result))
        }
    }
}

/// Both operands as numbers, or a `TypeMismatch` citing the operator's
/// phrase.
fn num_operands(lhs: Value, rhs: Value, phrase: Phrase) -> Result<(f64, f64), EvalError> {
    let a = lhs
        .as_num()
        .ok_or_else(|| type_mismatch(phrase, "number", lhs.type_name()))?;
    let b = rhs
        .as_num()
        .ok_or_else(|| type_mismatch(phrase, "number", rhs.type_name()))?;
    Ok((a, b))
}

/// Apply a prefix operator to a value.
pub fn evaluate_unary(op: UnaryOp, value: Value, phrase: Phrase) -> EvalResult {
    match op {
        UnaryOp::Not => match value.as_bool() {
            Some(b) => Ok(Value::Bool(!b)),
            None => Err(not_boolean(phrase, value.type_name())),
        },
        UnaryOp::Pos => match value.as_num() {
            Some(n) => Ok(Value::Num(n)),
            None => Err(type_mismatch(phrase, "number", value.type_name())),
        },
        UnaryOp::Neg => match value.as_num() {
            Some(n) => Ok(Value::Num(-n)),
            None => Err(type_mismatch(phrase, "number", value.type_name())),
        },
    }
}
