//! Recursion scenarios: mutual recursion through a shared nonlocal
//! module, tail-call flattening, and deep non-tail recursion.

use std::rc::Rc;

use lathe_ir::SymbolTable;

use super::*;
use crate::exec::{eval_expression, exec_statement};
use crate::executor::ActionExecutor;
use crate::function::Lambda;
use crate::heap::Heap;
use crate::ir::{BinaryOp, FunctionElement};
use crate::pattern::Pattern;
use crate::record::ModuleDict;

/// `name = n -> if (n == 0) base else other(n - 1)`
///
/// `other` is nonlocal slot `other_slot` of the shared bundle module.
fn flip_lambda(
    table: &SymbolTable,
    name: &str,
    base: bool,
    other_slot: usize,
) -> Heap<Lambda> {
    let body = Op::if_else(
        p(),
        Op::binary(p(), BinaryOp::Eq, Op::data_ref(p(), 0), num(0.0)),
        Op::constant(p(), Value::Bool(base)),
        Op::call(
            p(),
            Op::nonlocal_ref(p(), other_slot),
            Op::binary(p(), BinaryOp::Sub, Op::data_ref(p(), 0), num(1.0)),
        ),
    );
    Lambda::shared(Pattern::id(p(), 0), body, 1, Some(table.intern(name)))
}

/// Build `even`/`odd` into frame slots 0 and 1 with one setter.
fn define_even_odd(table: &SymbolTable, frame: &mut Frame) {
    let even = flip_lambda(table, "even", true, 1);
    let odd = flip_lambda(table, "odd", false, 0);

    // The shared nonlocal module holds the bundle members as plain
    // lambdas; reading one through a nonlocal ref closes it over this
    // same module.
    let dict = Rc::new(ModuleDict::new(vec![
        table.intern("even"),
        table.intern("odd"),
    ]));
    let nonlocals = Op::enum_module(
        p(),
        dict,
        vec![
            Op::constant(p(), Value::Lambda(even.clone())),
            Op::constant(p(), Value::Lambda(odd.clone())),
        ],
    );
    let setter = Op::function_setter(
        p(),
        None,
        nonlocals,
        vec![
            FunctionElement {
                slot: 0,
                lambda: even,
            },
            FunctionElement {
                slot: 1,
                lambda: odd,
            },
        ],
    );
    exec_statement(&setter, frame, &mut ActionExecutor).unwrap();
}

#[test]
fn mutual_recursion_through_shared_nonlocals() {
    let table = SymbolTable::new();
    let mut frame = program_frame(2, System::new());
    define_even_odd(&table, &mut frame);

    let even_100 = Op::call(p(), Op::data_ref(p(), 0), num(100.0));
    assert_eq!(
        eval_expression(&even_100, &mut frame).unwrap(),
        Value::Bool(true)
    );

    let odd_7 = Op::call(p(), Op::data_ref(p(), 1), num(7.0));
    assert_eq!(
        eval_expression(&odd_7, &mut frame).unwrap(),
        Value::Bool(true)
    );

    let even_7 = Op::call(p(), Op::data_ref(p(), 0), num(7.0));
    assert_eq!(
        eval_expression(&even_7, &mut frame).unwrap(),
        Value::Bool(false)
    );
}

/// `loop = n -> if (n == 0) 0 else loop(n - 1)`, self-reference through
/// nonlocal slot 0.
fn countdown(table: &SymbolTable) -> Heap<Lambda> {
    let body = Op::if_else(
        p(),
        Op::binary(p(), BinaryOp::Eq, Op::data_ref(p(), 0), num(0.0)),
        num(0.0),
        Op::call(
            p(),
            Op::nonlocal_ref(p(), 0),
            Op::binary(p(), BinaryOp::Sub, Op::data_ref(p(), 0), num(1.0)),
        ),
    );
    Lambda::shared(Pattern::id(p(), 0), body, 1, Some(table.intern("loop")))
}

#[test]
fn tail_recursion_depth_is_unbounded() {
    let table = SymbolTable::new();
    let lambda = countdown(&table);
    let dict = Rc::new(ModuleDict::new(vec![table.intern("loop")]));
    let nonlocals = Op::enum_module(
        p(),
        dict,
        vec![Op::constant(p(), Value::Lambda(lambda.clone()))],
    );
    let setter = Op::function_setter(
        p(),
        None,
        nonlocals,
        vec![FunctionElement { slot: 0, lambda }],
    );

    let mut frame = program_frame(1, System::new());
    exec_statement(&setter, &mut frame, &mut ActionExecutor).unwrap();

    // One million tail calls: the trampoline replaces the frame in
    // place, so this terminates without growing the host stack.
    let call = Op::call(p(), Op::data_ref(p(), 0), num(1_000_000.0));
    assert_eq!(eval_expression(&call, &mut frame).unwrap(), Value::Num(0.0));
}

/// `sum = n -> if (n == 0) 0 else n + sum(n - 1)` - the recursive call
/// is an operand, not a tail position.
#[test]
fn deep_non_tail_recursion_grows_the_stack() {
    let table = SymbolTable::new();
    let body = Op::if_else(
        p(),
        Op::binary(p(), BinaryOp::Eq, Op::data_ref(p(), 0), num(0.0)),
        num(0.0),
        Op::binary(
            p(),
            BinaryOp::Add,
            Op::data_ref(p(), 0),
            Op::call(
                p(),
                Op::nonlocal_ref(p(), 0),
                Op::binary(p(), BinaryOp::Sub, Op::data_ref(p(), 0), num(1.0)),
            ),
        ),
    );
    let lambda = Lambda::shared(Pattern::id(p(), 0), body, 1, Some(table.intern("sum")));
    let dict = Rc::new(ModuleDict::new(vec![table.intern("sum")]));
    let nonlocals = Op::enum_module(
        p(),
        dict,
        vec![Op::constant(p(), Value::Lambda(lambda.clone()))],
    );
    let setter = Op::function_setter(
        p(),
        None,
        nonlocals,
        vec![FunctionElement { slot: 0, lambda }],
    );

    let mut frame = program_frame(1, System::new());
    exec_statement(&setter, &mut frame, &mut ActionExecutor).unwrap();

    let n = 20_000.0;
    let call = Op::call(p(), Op::data_ref(p(), 0), num(n));
    assert_eq!(
        eval_expression(&call, &mut frame).unwrap(),
        Value::Num(n * (n + 1.0) / 2.0)
    );
}

#[test]
fn determinism_across_runs() {
    let table = SymbolTable::new();
    for _ in 0..2 {
        let mut frame = program_frame(2, System::new());
        define_even_odd(&table, &mut frame);
        let call = Op::call(p(), Op::data_ref(p(), 0), num(10.0));
        assert_eq!(
            eval_expression(&call, &mut frame).unwrap(),
            Value::Bool(true)
        );
    }
}
