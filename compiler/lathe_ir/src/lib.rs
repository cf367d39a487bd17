//! Lathe IR - base syntax types for the lathe language.
//!
//! This crate holds the small, dependency-light types that the analyzer
//! and the evaluator both speak:
//!
//! - [`Symbol`] / [`SymbolTable`]: interned identifier-like names
//! - [`Span`]: compact byte-offset source locations
//! - [`Phrase`]: the syntactic site an IR node or a runtime error cites
//! - [`Slot`]: an index into a frame's or module's value array
//!
//! The IR node type itself lives in `lathe_eval`, next to the value
//! model it embeds.

mod phrase;
mod span;
mod symbol;

pub use phrase::Phrase;
pub use span::Span;
pub use symbol::{Symbol, SymbolTable};

/// An index into a frame's or module's slot array.
///
/// Slots are assigned during semantic analysis; the evaluator treats
/// them as opaque indices.
pub type Slot = usize;
