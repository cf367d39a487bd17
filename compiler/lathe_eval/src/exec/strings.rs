//! Interpolated strings.
//!
//! A string expression is a sequence of segments, each appending text
//! to a builder. The `$` forms differ only in their default
//! conversion: identifier and brace interpolation keep string contents
//! as-is and print everything else, paren interpolation always prints,
//! bracket interpolation turns code points into characters.

use lathe_ir::Symbol;

use crate::errors::{domain_error, type_mismatch, EvalError, EvalResult};
use crate::frame::Frame;
use crate::ir::{Segment, SharedOp, SymbolExpr};
use crate::value::Value;

pub(crate) fn eval_string(segments: &[Segment], frame: &mut Frame) -> EvalResult {
    let mut text = String::new();
    for segment in segments {
        generate(segment, frame, &mut text)?;
    }
    Ok(Value::string(text))
}

fn generate(segment: &Segment, frame: &mut Frame, out: &mut String) -> Result<(), EvalError> {
    match segment {
        Segment::Literal(data) => {
            out.push_str(data);
            Ok(())
        }
        Segment::Ident(expr) | Segment::Brace(expr) => {
            let value = expr.eval(frame)?;
            match value.as_str() {
                Some(s) => out.push_str(s),
                None => out.push_str(&value.to_string()),
            }
            Ok(())
        }
        Segment::Paren(expr) => {
            let value = expr.eval(frame)?;
            out.push_str(&value.to_string());
            Ok(())
        }
        Segment::Bracket(expr) => {
            let value = expr.eval(frame)?;
            match &value {
                Value::Num(n) => push_codepoint(*n, expr, out),
                Value::List(items) => {
                    for item in items.iter() {
                        match item.as_num() {
                            Some(n) => push_codepoint(n, expr, out)?,
                            None => {
                                return Err(type_mismatch(
                                    expr.phrase,
                                    "number",
                                    item.type_name(),
                                ))
                            }
                        }
                    }
                    Ok(())
                }
                other => Err(type_mismatch(expr.phrase, "number", other.type_name())),
            }
        }
    }
}

fn push_codepoint(n: f64, expr: &SharedOp, out: &mut String) -> Result<(), EvalError> {
    let scalar = if n >= 0.0 && n.fract() == 0.0 && n <= f64::from(u32::MAX) {
        char::from_u32(n as u32)
    } else {
        None
    };
    match scalar {
        Some(c) => {
            out.push(c);
            Ok(())
        }
        None => Err(domain_error(
            expr.phrase,
            format!("{n} is not a Unicode scalar value"),
        )),
    }
}

/// Evaluate an expression whose result names a symbol: the result must
/// be a string, which is interned.
pub(crate) fn eval_symbol(expr: &SharedOp, frame: &mut Frame) -> Result<Symbol, EvalError> {
    let value = expr.eval(frame)?;
    match value.as_str() {
        Some(s) => Ok(frame.system.intern(s)),
        None => Err(type_mismatch(expr.phrase, "string", value.type_name())),
    }
}

impl SymbolExpr {
    /// The selector's symbol: fixed at analysis time or computed from
    /// an interpolated string.
    pub fn eval(&self, frame: &mut Frame) -> Result<Symbol, EvalError> {
        match self {
            SymbolExpr::Fixed(name) => Ok(name.clone()),
            SymbolExpr::Dynamic(expr) => eval_symbol(expr, frame),
        }
    }
}
