//! Runtime error kinds and constructors.
//!
//! Evaluation errors form a closed set. Every error cites the phrase of
//! the operation that raised it, and while it unwinds through call
//! boundaries it accumulates the chain of call phrases - the same stack
//! trace a parent-frame walk would produce, built during unwinding
//! instead.
//!
//! Constructors live here, one `#[cold]` function per failure shape, so
//! call sites stay small and the messages live in one place.

use std::fmt;

use lathe_ir::{Phrase, Symbol};

use crate::value::Value;

/// Result of evaluating an expression.
pub type EvalResult = Result<Value, EvalError>;

/// The closed set of runtime failures.
#[derive(Clone, Debug, PartialEq)]
pub enum ErrorKind {
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    NotBoolean {
        found: &'static str,
    },
    NotCallable {
        found: &'static str,
    },
    NotSpreadable {
        found: &'static str,
    },
    NotAList {
        found: &'static str,
    },
    NotARecord {
        found: &'static str,
    },
    ArityMismatch {
        expected: usize,
    },
    PatternMismatch,
    MissingElse,
    DuplicateField {
        name: Symbol,
    },
    FieldInList,
    ValueInRecord,
    NotAnAction,
    DivisionByZero,
    DomainError {
        detail: String,
    },
    RecursiveDefinitionUsedAsValue,
    ShapeCompilerUnsupported,
    UnboundIdentifier {
        name: Symbol,
    },
}

/// A runtime error with its source phrase and accumulated call trace.
#[derive(Clone, Debug)]
pub struct EvalError {
    pub kind: ErrorKind,
    /// The phrase of the operation that raised the error.
    pub phrase: Phrase,
    /// Call phrases crossed while unwinding, innermost first.
    pub trace: Vec<Phrase>,
}

impl EvalError {
    pub fn new(kind: ErrorKind, phrase: Phrase) -> Self {
        EvalError {
            kind,
            phrase,
            trace: Vec::new(),
        }
    }

    /// Record that the error unwound through the call at `phrase`.
    #[must_use]
    pub fn in_call(mut self, phrase: Phrase) -> Self {
        self.trace.push(phrase);
        self
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::TypeMismatch { expected, found } => {
                write!(f, "expected {expected}, found {found}")?;
            }
            ErrorKind::NotBoolean { found } => {
                write!(f, "expected a boolean, found {found}")?;
            }
            ErrorKind::NotCallable { found } => write!(f, "{found} is not callable")?,
            ErrorKind::NotSpreadable { found } => write!(f, "cannot spread {found}")?,
            ErrorKind::NotAList { found } => write!(f, "expected a list, found {found}")?,
            ErrorKind::NotARecord { found } => {
                write!(f, "expected a record, found {found}")?;
            }
            ErrorKind::ArityMismatch { expected } => {
                write!(f, "function call argument is not a list of length {expected}")?;
            }
            ErrorKind::PatternMismatch => write!(f, "value does not match the pattern")?,
            ErrorKind::MissingElse => {
                write!(f, "not an expression: missing else branch")?;
            }
            ErrorKind::DuplicateField { name } => {
                write!(f, "duplicate definition of {name}")?;
            }
            ErrorKind::FieldInList => {
                write!(f, "a field generator is not allowed in a list")?;
            }
            ErrorKind::ValueInRecord => {
                write!(f, "a value generator is not allowed in a record")?;
            }
            ErrorKind::NotAnAction => write!(f, "not an action")?,
            ErrorKind::DivisionByZero => write!(f, "division by zero")?,
            ErrorKind::DomainError { detail } => f.write_str(detail)?,
            ErrorKind::RecursiveDefinitionUsedAsValue => {
                write!(f, "a recursive definition is not a value")?;
            }
            ErrorKind::ShapeCompilerUnsupported => {
                write!(f, "this operation is not supported by the shape compiler")?;
            }
            ErrorKind::UnboundIdentifier { name } => write!(f, "{name} is not defined")?,
        }
        if !self.phrase.is_synthetic() {
            write!(f, " at {}", self.phrase)?;
        }
        Ok(())
    }
}

impl std::error::Error for EvalError {}

#[cold]
pub fn type_mismatch(phrase: Phrase, expected: &'static str, found: &'static str) -> EvalError {
    EvalError::new(ErrorKind::TypeMismatch { expected, found }, phrase)
}

#[cold]
pub fn not_boolean(phrase: Phrase, found: &'static str) -> EvalError {
    EvalError::new(ErrorKind::NotBoolean { found }, phrase)
}

#[cold]
pub fn not_callable(phrase: Phrase, found: &'static str) -> EvalError {
    EvalError::new(ErrorKind::NotCallable { found }, phrase)
}

#[cold]
pub fn not_spreadable(phrase: Phrase, found: &'static str) -> EvalError {
    EvalError::new(ErrorKind::NotSpreadable { found }, phrase)
}

#[cold]
pub fn not_a_list(phrase: Phrase, found: &'static str) -> EvalError {
    EvalError::new(ErrorKind::NotAList { found }, phrase)
}

#[cold]
pub fn not_a_record(phrase: Phrase, found: &'static str) -> EvalError {
    EvalError::new(ErrorKind::NotARecord { found }, phrase)
}

#[cold]
pub fn arity_mismatch(phrase: Phrase, expected: usize) -> EvalError {
    EvalError::new(ErrorKind::ArityMismatch { expected }, phrase)
}

#[cold]
pub fn pattern_mismatch(phrase: Phrase) -> EvalError {
    EvalError::new(ErrorKind::PatternMismatch, phrase)
}

#[cold]
pub fn missing_else(phrase: Phrase) -> EvalError {
    EvalError::new(ErrorKind::MissingElse, phrase)
}

#[cold]
pub fn duplicate_field(phrase: Phrase, name: Symbol) -> EvalError {
    EvalError::new(ErrorKind::DuplicateField { name }, phrase)
}

#[cold]
pub fn field_in_list(phrase: Phrase) -> EvalError {
    EvalError::new(ErrorKind::FieldInList, phrase)
}

#[cold]
pub fn value_in_record(phrase: Phrase) -> EvalError {
    EvalError::new(ErrorKind::ValueInRecord, phrase)
}

#[cold]
pub fn not_an_action(phrase: Phrase) -> EvalError {
    EvalError::new(ErrorKind::NotAnAction, phrase)
}

#[cold]
pub fn division_by_zero(phrase: Phrase) -> EvalError {
    EvalError::new(ErrorKind::DivisionByZero, phrase)
}

#[cold]
pub fn domain_error(phrase: Phrase, detail: impl Into<String>) -> EvalError {
    EvalError::new(
        ErrorKind::DomainError {
            detail: detail.into(),
        },
        phrase,
    )
}

#[cold]
pub fn recursive_definition_used_as_value(phrase: Phrase) -> EvalError {
    EvalError::new(ErrorKind::RecursiveDefinitionUsedAsValue, phrase)
}

#[cold]
pub fn sc_unsupported(phrase: Phrase) -> EvalError {
    EvalError::new(ErrorKind::ShapeCompilerUnsupported, phrase)
}

#[cold]
pub fn unbound_identifier(phrase: Phrase, name: Symbol) -> EvalError {
    EvalError::new(ErrorKind::UnboundIdentifier { name }, phrase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lathe_ir::{Span, SymbolTable};

    #[test]
    fn display_cites_the_phrase() {
        let phrase = Phrase::new(Span::new(4, 9));
        let err = not_boolean(phrase, "number");
        assert_eq!(err.to_string(), "expected a boolean, found number at 4..9");
    }

    #[test]
    fn synthetic_phrase_is_not_printed() {
        let err = division_by_zero(Phrase::SYNTHETIC);
        assert_eq!(err.to_string(), "division by zero");
    }

    #[test]
    fn in_call_accumulates_innermost_first() {
        let a = Phrase::new(Span::new(1, 2));
        let b = Phrase::new(Span::new(3, 4));
        let err = pattern_mismatch(Phrase::SYNTHETIC).in_call(a).in_call(b);
        assert_eq!(err.trace, vec![a, b]);
    }

    #[test]
    fn unbound_identifier_names_the_symbol() {
        let table = SymbolTable::new();
        let err = unbound_identifier(Phrase::SYNTHETIC, table.intern("sphere"));
        assert_eq!(err.to_string(), "sphere is not defined");
    }
}
