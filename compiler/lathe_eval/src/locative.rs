//! Assignment targets.
//!
//! A locative is the left side of `:=`: a path from a frame slot
//! through zero or more field selections into mutable storage. The
//! locative itself is immutable IR; the storage it names lives in a
//! frame or inside a record value.

use lathe_ir::{Phrase, Slot};

use crate::errors::{not_a_record, unbound_identifier, EvalError};
use crate::frame::Frame;
use crate::ir::SymbolExpr;
use crate::value::Value;
use std::rc::Rc;

pub enum Locative {
    /// A boxed local variable.
    Local { phrase: Phrase, slot: Slot },
    /// `base.name` - a field of the record held by another locative.
    Dot {
        phrase: Phrase,
        base: Rc<Locative>,
        selector: SymbolExpr,
    },
}

impl Locative {
    pub fn local(phrase: Phrase, slot: Slot) -> Rc<Locative> {
        Rc::new(Locative::Local { phrase, slot })
    }

    pub fn dot(phrase: Phrase, base: Rc<Locative>, selector: SymbolExpr) -> Rc<Locative> {
        Rc::new(Locative::Dot {
            phrase,
            base,
            selector,
        })
    }

    pub fn phrase(&self) -> Phrase {
        match self {
            Locative::Local { phrase, .. } | Locative::Dot { phrase, .. } => *phrase,
        }
    }

    /// Copy `value` into the target storage.
    pub fn store(&self, frame: &mut Frame, value: Value) -> Result<(), EvalError> {
        *self.reference(frame, false)? = value;
        Ok(())
    }

    /// A mutable reference to the backing cell. With `need_value`
    /// false the caller promises to overwrite without reading, which
    /// permits skipping work on the old contents; correctness never
    /// depends on it.
    pub fn reference<'f>(
        &self,
        frame: &'f mut Frame,
        _need_value: bool,
    ) -> Result<&'f mut Value, EvalError> {
        match self {
            Locative::Local { slot, .. } => Ok(&mut frame[*slot]),
            Locative::Dot {
                phrase,
                base,
                selector,
            } => {
                let name = selector.eval(frame)?;
                let cell = base.reference(frame, true)?;
                match cell {
                    Value::Record(rec) => {
                        // Updating through a shared record unshares it
                        // here; other holders keep the old value.
                        rec.make_mut()
                            .get_mut(&name)
                            .ok_or_else(|| unbound_identifier(*phrase, name))
                    }
                    other => Err(not_a_record(*phrase, other.type_name())),
                }
            }
        }
    }
}
