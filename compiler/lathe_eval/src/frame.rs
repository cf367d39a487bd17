//! Evaluation frames and the tail-call trampoline.

use std::ops::{Index, IndexMut};

use lathe_ir::{Phrase, Slot};

use crate::errors::{EvalError, EvalResult};
use crate::ir::SharedOp;
use crate::record::Module;
use crate::system::System;
use crate::value::Value;

/// An evaluation context: the registers of the lathe machine.
///
/// The top-level program expression gets a frame; every call to a
/// closure or builtin gets a call frame. Frames are uniquely owned and
/// live exactly as long as the evaluation they belong to.
pub struct Frame {
    /// Host facade, shared by all frames of an evaluation.
    pub system: System,
    /// The call that created this frame; `None` for program frames.
    /// Frames without a call phrase do not appear in stack traces.
    pub call_phrase: Option<Phrase>,
    /// Captured nonlocal environment: the closure's module for a
    /// closure call frame, `None` for program and builtin frames.
    pub nonlocals: Option<Module>,
    /// Trampoline register: the next operation the driver loop should
    /// tail-evaluate, or `None` when `result` holds the answer.
    pub next_op: Option<SharedOp>,
    /// Trampoline register: the staged result.
    pub result: Value,
    /// Owning reference to the function that activated this frame.
    /// Keeps `nonlocals` and the storage behind `next_op` alive.
    func: Option<Value>,
    /// Local bindings: arguments, block bindings, temporaries.
    slots: Box<[Value]>,
}

impl Frame {
    pub fn make(
        nslots: usize,
        system: System,
        call_phrase: Option<Phrase>,
        nonlocals: Option<Module>,
        func: Option<Value>,
    ) -> Box<Frame> {
        Box::new(Frame {
            system,
            call_phrase,
            nonlocals,
            next_op: None,
            result: Value::Missing,
            func,
            slots: vec![Value::Missing; nslots].into_boxed_slice(),
        })
    }

    #[inline]
    pub fn nslots(&self) -> usize {
        self.slots.len()
    }

    pub fn set_nonlocals(&mut self, module: Module) {
        self.nonlocals = Some(module);
    }

    /// The function that activated this frame, if any.
    pub fn func(&self) -> Option<&Value> {
        self.func.as_ref()
    }

    #[inline]
    pub fn slots_mut(&mut self) -> &mut [Value] {
        &mut self.slots
    }
}

impl Index<Slot> for Frame {
    type Output = Value;

    #[inline]
    fn index(&self, slot: Slot) -> &Value {
        debug_assert!(slot < self.slots.len(), "slot {slot} out of range");
        &self.slots[slot]
    }
}

impl IndexMut<Slot> for Frame {
    #[inline]
    fn index_mut(&mut self, slot: Slot) -> &mut Value {
        debug_assert!(slot < self.slots.len(), "slot {slot} out of range");
        &mut self.slots[slot]
    }
}

/// Drive a frame to completion.
///
/// While the frame has a pending operation, tail-evaluate it; a tail
/// call replaces the frame in place, so the host stack stays flat no
/// matter how deep the tail chain goes. Errors pick up the current
/// frame's call phrase on the way out, which is how the call trace in
/// an [`EvalError`] gets built.
#[tracing::instrument(level = "trace", skip_all)]
pub fn tail_eval_frame(mut frame: Box<Frame>) -> EvalResult {
    while let Some(op) = frame.next_op.take() {
        op.tail_eval(&mut frame).map_err(|e| at_frame(e, &frame))?;
    }
    Ok(std::mem::replace(&mut frame.result, Value::Missing))
}

fn at_frame(err: EvalError, frame: &Frame) -> EvalError {
    match frame.call_phrase {
        Some(phrase) => err.in_call(phrase),
        None => err,
    }
}

/// Run `f` with enough host stack for one more round of non-tail
/// recursion, growing the stack when the red zone is reached. Tail
/// positions never need this; every other recursive `eval` goes
/// through it at the call boundary.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    /// Remaining stack that triggers a grow.
    const RED_ZONE: usize = 128 * 1024;
    /// Size of each newly allocated segment.
    const GROW_BY: usize = 1024 * 1024;

    stacker::maybe_grow(RED_ZONE, GROW_BY, f)
}

/// On wasm the engine manages the stack; call through.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
