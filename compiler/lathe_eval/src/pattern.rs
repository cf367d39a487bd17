//! Parameter and binding patterns.
//!
//! A pattern destructures one value into slot bindings: function
//! parameters, `for` loop variables, and data definitions all bind
//! through one. Matching collects `(slot, value)` pairs first and the
//! caller applies them to frame or module slots afterwards, which keeps
//! the frame borrowable for evaluating field defaults mid-match.

use std::rc::Rc;

use lathe_ir::{Phrase, Slot, Symbol};

use crate::errors::{pattern_mismatch, EvalError};
use crate::frame::Frame;
use crate::ir::SharedOp;
use crate::record::Module;
use crate::value::Value;

#[cfg(test)]
mod tests;

/// One field of a record pattern.
pub struct RecordField {
    pub name: Symbol,
    pub pattern: Rc<Pattern>,
    /// Evaluated in the binding frame when the field is absent.
    pub default: Option<SharedOp>,
}

pub enum Pattern {
    /// `_` - matches anything, binds nothing.
    Skip,
    /// A name; binds the whole value to one slot.
    Id { phrase: Phrase, slot: Slot },
    /// `[p1, ..., pn]` - a list of exactly n elements.
    List {
        phrase: Phrase,
        items: Vec<Rc<Pattern>>,
    },
    /// `{name1: p1, ...}` - a record with exactly the named fields,
    /// except that fields with defaults may be absent.
    Record {
        phrase: Phrase,
        fields: Vec<RecordField>,
    },
}

impl Pattern {
    pub fn id(phrase: Phrase, slot: Slot) -> Rc<Pattern> {
        Rc::new(Pattern::Id { phrase, slot })
    }

    /// Match `value`, appending bindings to `out`. `frame` is only
    /// used to evaluate defaults of absent record fields.
    pub fn bindings(
        &self,
        value: Value,
        frame: &mut Frame,
        out: &mut Vec<(Slot, Value)>,
    ) -> Result<(), EvalError> {
        match self {
            Pattern::Skip => Ok(()),
            Pattern::Id { slot, .. } => {
                out.push((*slot, value));
                Ok(())
            }
            Pattern::List { phrase, items } => {
                let Some(elements) = value.as_list() else {
                    return Err(pattern_mismatch(*phrase));
                };
                if elements.len() != items.len() {
                    return Err(pattern_mismatch(*phrase));
                }
                let elements = elements.to_vec();
                for (item, element) in items.iter().zip(elements) {
                    item.bindings(element, frame, out)?;
                }
                Ok(())
            }
            Pattern::Record { phrase, fields } => {
                let Some(count) = value.field_count() else {
                    return Err(pattern_mismatch(*phrase));
                };
                // A field the pattern does not name is a mismatch.
                let mut matched = 0usize;
                for field in fields {
                    match value.field(&field.name) {
                        Some(v) => {
                            matched += 1;
                            field.pattern.bindings(v, frame, out)?;
                        }
                        None => match &field.default {
                            Some(default) => {
                                let v = default.eval(frame)?;
                                field.pattern.bindings(v, frame, out)?;
                            }
                            None => return Err(pattern_mismatch(*phrase)),
                        },
                    }
                }
                if matched != count {
                    return Err(pattern_mismatch(*phrase));
                }
                Ok(())
            }
        }
    }

    /// Match and store into frame slots.
    pub fn bind_into_frame(&self, value: Value, frame: &mut Frame) -> Result<(), EvalError> {
        let mut out = Vec::new();
        self.bindings(value, frame, &mut out)?;
        for (slot, v) in out {
            frame[slot] = v;
        }
        Ok(())
    }

    /// Match and store into a module's slot array.
    pub fn bind_into_module(
        &self,
        value: Value,
        frame: &mut Frame,
        module: &Module,
    ) -> Result<(), EvalError> {
        let mut out = Vec::new();
        self.bindings(value, frame, &mut out)?;
        for (slot, v) in out {
            module.set(slot, v);
        }
        Ok(())
    }
}
