//! Statement executors.
//!
//! A statement produces values or fields by pushing them into an
//! `Executor`; the executor passed at a call site decides which kinds
//! of generator are legal there. An action context accepts neither, a
//! list constructor accepts values, a record constructor accepts
//! fields.

use lathe_ir::{Phrase, Symbol};

use crate::errors::{
    duplicate_field, field_in_list, not_an_action, value_in_record, EvalError,
};
use crate::record::Record;
use crate::value::Value;

/// Receives the values and fields a statement generates. The phrase
/// argument cites the statement that generated the item, for
/// diagnostics.
pub trait Executor {
    fn push_value(&mut self, value: Value, phrase: Phrase) -> Result<(), EvalError>;
    fn push_field(&mut self, name: Symbol, value: Value, phrase: Phrase)
        -> Result<(), EvalError>;
}

/// Executor for action contexts: nothing may be generated.
#[derive(Default)]
pub struct ActionExecutor;

impl Executor for ActionExecutor {
    fn push_value(&mut self, _value: Value, phrase: Phrase) -> Result<(), EvalError> {
        Err(not_an_action(phrase))
    }

    fn push_field(
        &mut self,
        _name: Symbol,
        _value: Value,
        phrase: Phrase,
    ) -> Result<(), EvalError> {
        Err(not_an_action(phrase))
    }
}

/// Executor for list constructors.
#[derive(Default)]
pub struct ListExecutor {
    items: Vec<Value>,
}

impl ListExecutor {
    pub fn into_list(self) -> Value {
        Value::list(self.items)
    }
}

impl Executor for ListExecutor {
    fn push_value(&mut self, value: Value, _phrase: Phrase) -> Result<(), EvalError> {
        self.items.push(value);
        Ok(())
    }

    fn push_field(
        &mut self,
        _name: Symbol,
        _value: Value,
        phrase: Phrase,
    ) -> Result<(), EvalError> {
        Err(field_in_list(phrase))
    }
}

/// Executor for record constructors.
#[derive(Default)]
pub struct RecordExecutor {
    record: Record,
}

impl RecordExecutor {
    pub fn into_record(self) -> Value {
        Value::record(self.record)
    }
}

impl Executor for RecordExecutor {
    fn push_value(&mut self, _value: Value, phrase: Phrase) -> Result<(), EvalError> {
        Err(value_in_record(phrase))
    }

    fn push_field(&mut self, name: Symbol, value: Value, phrase: Phrase) -> Result<(), EvalError> {
        if self.record.insert(name.clone(), value) {
            Ok(())
        } else {
            Err(duplicate_field(phrase, name))
        }
    }
}
