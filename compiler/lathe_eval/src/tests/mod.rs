//! End-to-end suites over hand-built operation trees.
//!
//! Analysis is an external collaborator, so these tests play analyzer:
//! they construct small IR fragments directly and drive them through
//! the public entry points.

mod recursion_tests;

use std::rc::Rc;

use lathe_ir::Phrase;

use crate::console::{buffer_console, SharedConsole};
use crate::frame::Frame;
use crate::ir::{Op, SharedOp};
use crate::system::System;
use crate::value::Value;

pub(crate) fn p() -> Phrase {
    Phrase::SYNTHETIC
}

pub(crate) fn num(n: f64) -> SharedOp {
    Op::constant(p(), Value::Num(n))
}

pub(crate) fn num_list(items: &[f64]) -> Value {
    Value::list(items.iter().copied().map(Value::Num).collect())
}

/// A system whose console captures into a buffer, plus the buffer.
pub(crate) fn buffered_system() -> (System, SharedConsole) {
    let console = buffer_console();
    let system = System::builder().console(console.clone()).build();
    (system, console)
}

pub(crate) fn program_frame(nslots: usize, system: System) -> Box<Frame> {
    Frame::make(nslots, system, None, None, None)
}

/// An empty captured environment for lambdas that capture nothing.
pub(crate) fn no_nonlocals() -> SharedOp {
    Op::enum_module(
        p(),
        Rc::new(crate::record::ModuleDict::new(Vec::new())),
        Vec::new(),
    )
}
