//! Lathe Eval - the core evaluator for the lathe language.
//!
//! Lathe is a pure, expression-oriented language for programmatic
//! geometry. This crate is the heart of the runtime: the uniform value
//! model, the evaluation frame stack, the compiled operation tree, and
//! the tree-walking interpreter that executes it.
//!
//! # Architecture
//!
//! - `Value`: uniform tagged datum (numbers, symbols, strings, lists,
//!   records, modules, functions); composites are immutable and shared
//!   through the `Heap` wrapper.
//! - `Frame`: an evaluation context with a fixed slot array, the
//!   captured nonlocal module, and the trampoline registers driven by
//!   `tail_eval_frame`.
//! - `Op`: a closed union over every compiled construct. Each node
//!   answers `eval` (expressions), `exec` (statements, through an
//!   `Executor`), `tail_eval` (tail positions), and the shape-compiler
//!   hooks `sc_eval`/`sc_exec`.
//! - `System`: the process-wide host facade (symbol table, console,
//!   ambient globals) referenced by every frame.
//!
//! The analyzer builds `Op` trees with the constructors in `ir`; the
//! driver wraps a root operation in a frame and calls
//! [`eval_expression`], [`exec_statement`], or [`tail_eval_frame`].

mod console;
pub mod errors;
mod exec;
mod executor;
mod frame;
mod function;
mod heap;
mod ir;
mod locative;
mod operators;
mod pattern;
mod record;
mod sc;
mod system;
mod value;

#[cfg(test)]
mod tests;

pub use console::{buffer_console, silent_console, stdout_console, Console, SharedConsole};
pub use errors::{ErrorKind, EvalError, EvalResult};
pub use exec::call::apply;
pub use exec::{eval_expression, exec_statement};
pub use executor::{ActionExecutor, Executor, ListExecutor, RecordExecutor};
pub use frame::{ensure_sufficient_stack, tail_eval_frame, Frame};
pub use function::{Builtin, BuiltinFn, Closure, Lambda};
pub use heap::Heap;
pub use ir::{
    BinaryOp, FunctionElement, IncludeElement, Op, OpKind, PureOpKey, ScopeExec, Segment,
    SharedOp, SymbolExpr, UnaryOp,
};
pub use locative::Locative;
pub use operators::{evaluate_binary, evaluate_unary};
pub use pattern::{Pattern, RecordField};
pub use record::{Module, ModuleDict, Record};
pub use sc::{ScFrame, ScType, ScValue};
pub use system::{System, SystemBuilder};
pub use value::Value;

// Re-export the base types so downstream crates need only this one.
pub use lathe_ir::{Phrase, Slot, Span, Symbol, SymbolTable};
