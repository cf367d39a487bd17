//! Shape-compiler hook points.
//!
//! The shape compiler re-walks the same operation tree and lowers a
//! restricted subset to a static form: typed registers over `num` and
//! `bool`, one assignment per register. The back-end proper lives
//! outside this crate; here every node answers `sc_eval`/`sc_exec`,
//! and the default answer is `ShapeCompilerUnsupported` citing the
//! node's phrase. Only nodes that lower cleanly do more.

use std::fmt;

use lathe_ir::Slot;

use crate::errors::{sc_unsupported, EvalError};
use crate::ir::{BinaryOp, Op, OpKind, UnaryOp};
use crate::pattern::Pattern;
use crate::locative::Locative;
use crate::value::Value;


/// Static types of the lowered form.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ScType {
    Num,
    Bool,
}

impl fmt::Display for ScType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScType::Num => f.write_str("num"),
            ScType::Bool => f.write_str("bool"),
        }
    }
}

/// A typed register of the lowered form.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ScValue {
    pub reg: u32,
    pub ty: ScType,
}

impl fmt::Display for ScValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.reg)
    }
}

/// Lowering context: the register counter, the emitted text, and the
/// lowered value of each frame slot.
pub struct ScFrame {
    body: String,
    next_reg: u32,
    slots: Vec<Option<ScValue>>,
}

impl ScFrame {
    pub fn new(nslots: usize) -> Self {
        ScFrame {
            body: String::new(),
            next_reg: 0,
            slots: vec![None; nslots],
        }
    }

    /// Emit one assignment of `expr` to a fresh register.
    pub fn emit(&mut self, ty: ScType, expr: &str) -> ScValue {
        let value = ScValue {
            reg: self.next_reg,
            ty,
        };
        self.next_reg += 1;
        self.body.push_str(&format!("{ty} {value} = {expr};\n"));
        value
    }

    pub fn slot(&self, slot: Slot) -> Option<ScValue> {
        self.slots.get(slot).copied().flatten()
    }

    pub fn set_slot(&mut self, slot: Slot, value: ScValue) {
        self.slots[slot] = Some(value);
    }

    /// The emitted statements.
    pub fn text(&self) -> &str {
        &self.body
    }
}

impl Op {
    /// Lower this expression to a register, or fail with
    /// `ShapeCompilerUnsupported`.
    pub fn sc_eval(&self, f: &mut ScFrame) -> Result<ScValue, EvalError> {
        match &self.kind {
            OpKind::Constant(Value::Num(n)) => Ok(f.emit(ScType::Num, &format!("{n:?}"))),
            OpKind::Constant(Value::Bool(b)) => Ok(f.emit(ScType::Bool, &format!("{b}"))),
            OpKind::DataRef(slot) => f.slot(*slot).ok_or_else(|| sc_unsupported(self.phrase)),
            OpKind::Unary { op, arg } => {
                let a = arg.sc_eval(f)?;
                match (op, a.ty) {
                    (UnaryOp::Neg, ScType::Num) => Ok(f.emit(ScType::Num, &format!("-{a}"))),
                    (UnaryOp::Pos, ScType::Num) => Ok(a),
                    (UnaryOp::Not, ScType::Bool) => Ok(f.emit(ScType::Bool, &format!("!{a}"))),
                    _ => Err(sc_unsupported(self.phrase)),
                }
            }
            OpKind::Binary { op, lhs, rhs } => {
                let a = lhs.sc_eval(f)?;
                let b = rhs.sc_eval(f)?;
                if a.ty != ScType::Num || b.ty != ScType::Num {
                    return Err(sc_unsupported(self.phrase));
                }
                match op {
                    BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => {
                        Ok(f.emit(ScType::Num, &format!("{a} {} {b}", op.token())))
                    }
                    BinaryOp::Pow => Ok(f.emit(ScType::Num, &format!("pow({a}, {b})"))),
                    BinaryOp::Eq
                    | BinaryOp::Ne
                    | BinaryOp::Lt
                    | BinaryOp::Gt
                    | BinaryOp::Le
                    | BinaryOp::Ge => {
                        Ok(f.emit(ScType::Bool, &format!("{a} {} {b}", op.token())))
                    }
                }
            }
            // The static target has no control flow; a conditional
            // expression lowers to a select over both branches.
            OpKind::IfElse { cond, then, els } => {
                let c = cond.sc_eval(f)?;
                if c.ty != ScType::Bool {
                    return Err(sc_unsupported(cond.phrase));
                }
                let a = then.sc_eval(f)?;
                let b = els.sc_eval(f)?;
                if a.ty != b.ty {
                    return Err(sc_unsupported(self.phrase));
                }
                Ok(f.emit(a.ty, &format!("select({c}, {a}, {b})")))
            }
            _ => Err(sc_unsupported(self.phrase)),
        }
    }

    /// Lower this statement, or fail with `ShapeCompilerUnsupported`.
    pub fn sc_exec(&self, f: &mut ScFrame) -> Result<(), EvalError> {
        match &self.kind {
            OpKind::NullAction => Ok(()),
            OpKind::Compound(parts) => {
                for part in parts {
                    part.sc_exec(f)?;
                }
                Ok(())
            }
            OpKind::Preaction { actions, body } => {
                actions.sc_exec(f)?;
                body.sc_exec(f)
            }
            OpKind::DataSetter {
                module_slot: None,
                pattern,
                definiens,
            } => match **pattern {
                Pattern::Id { slot, .. } => {
                    let value = definiens.sc_eval(f)?;
                    f.set_slot(slot, value);
                    Ok(())
                }
                _ => Err(sc_unsupported(self.phrase)),
            },
            OpKind::Assign { locative, expr } => match **locative {
                Locative::Local { slot, .. } => {
                    let value = expr.sc_eval(f)?;
                    f.set_slot(slot, value);
                    Ok(())
                }
                Locative::Dot { .. } => Err(sc_unsupported(self.phrase)),
            },
            _ => Err(sc_unsupported(self.phrase)),
        }
    }
}
