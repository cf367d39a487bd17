use std::rc::Rc;

use lathe_ir::{Phrase, SymbolTable};

use super::*;
use crate::errors::ErrorKind;
use crate::ir::Op;
use crate::system::System;

fn p() -> Phrase {
    Phrase::SYNTHETIC
}

fn frame(nslots: usize) -> Box<Frame> {
    Frame::make(nslots, System::new(), None, None, None)
}

#[test]
fn id_binds_the_whole_value() {
    let mut f = frame(1);
    Pattern::id(p(), 0)
        .bind_into_frame(Value::Num(41.0), &mut f)
        .unwrap();
    assert_eq!(f[0], Value::Num(41.0));
}

#[test]
fn list_pattern_binds_elementwise() {
    let pattern = Pattern::List {
        phrase: p(),
        items: vec![Pattern::id(p(), 0), Pattern::id(p(), 1), Pattern::id(p(), 2)],
    };
    let mut f = frame(3);
    pattern
        .bind_into_frame(
            Value::list(vec![Value::Num(1.0), Value::Num(2.0), Value::Num(3.0)]),
            &mut f,
        )
        .unwrap();
    assert_eq!(f[0], Value::Num(1.0));
    assert_eq!(f[1], Value::Num(2.0));
    assert_eq!(f[2], Value::Num(3.0));
}

#[test]
fn list_pattern_arity_must_match() {
    let pattern = Pattern::List {
        phrase: p(),
        items: vec![Pattern::id(p(), 0), Pattern::id(p(), 1), Pattern::id(p(), 2)],
    };
    let mut f = frame(3);
    let err = pattern
        .bind_into_frame(Value::list(vec![Value::Num(1.0), Value::Num(2.0)]), &mut f)
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::PatternMismatch);
}

#[test]
fn list_pattern_rejects_non_lists() {
    let pattern = Pattern::List {
        phrase: p(),
        items: vec![Pattern::id(p(), 0)],
    };
    let mut f = frame(1);
    let err = pattern
        .bind_into_frame(Value::Num(1.0), &mut f)
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::PatternMismatch);
}

#[test]
fn skip_binds_nothing() {
    let mut f = frame(1);
    Pattern::Skip
        .bind_into_frame(Value::Num(5.0), &mut f)
        .unwrap();
    assert!(matches!(f[0], Value::Missing));
}

#[test]
fn record_pattern_matches_fields() {
    let table = SymbolTable::new();
    let pattern = Pattern::Record {
        phrase: p(),
        fields: vec![
            RecordField {
                name: table.intern("x"),
                pattern: Pattern::id(p(), 0),
                default: None,
            },
            RecordField {
                name: table.intern("y"),
                pattern: Pattern::id(p(), 1),
                default: None,
            },
        ],
    };
    let mut rec = crate::record::Record::new();
    rec.insert(table.intern("x"), Value::Num(1.0));
    rec.insert(table.intern("y"), Value::Num(2.0));

    let mut f = frame(2);
    pattern.bind_into_frame(Value::record(rec), &mut f).unwrap();
    assert_eq!(f[0], Value::Num(1.0));
    assert_eq!(f[1], Value::Num(2.0));
}

#[test]
fn record_pattern_fills_absent_fields_from_defaults() {
    let table = SymbolTable::new();
    let pattern = Pattern::Record {
        phrase: p(),
        fields: vec![RecordField {
            name: table.intern("size"),
            pattern: Pattern::id(p(), 0),
            default: Some(Op::constant(p(), Value::Num(3.0))),
        }],
    };
    let mut f = frame(1);
    pattern
        .bind_into_frame(Value::record(crate::record::Record::new()), &mut f)
        .unwrap();
    assert_eq!(f[0], Value::Num(3.0));
}

#[test]
fn record_pattern_rejects_unnamed_extra_fields() {
    let table = SymbolTable::new();
    let pattern = Pattern::Record {
        phrase: p(),
        fields: vec![RecordField {
            name: table.intern("x"),
            pattern: Pattern::id(p(), 0),
            default: None,
        }],
    };
    let mut rec = crate::record::Record::new();
    rec.insert(table.intern("x"), Value::Num(1.0));
    rec.insert(table.intern("y"), Value::Num(2.0));

    let mut f = frame(1);
    let err = pattern
        .bind_into_frame(Value::record(rec), &mut f)
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::PatternMismatch);
}

#[test]
fn bindings_into_module_slots() {
    let table = SymbolTable::new();
    let dict = Rc::new(crate::record::ModuleDict::new(vec![table.intern("v")]));
    let module = Module::new(dict);
    let mut f = frame(0);
    Pattern::id(p(), 0)
        .bind_into_module(Value::Num(9.0), &mut f, &module)
        .unwrap();
    assert_eq!(module.get(0), Value::Num(9.0));
}
