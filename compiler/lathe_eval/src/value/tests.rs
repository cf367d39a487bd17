use std::hash::{Hash, Hasher};
use std::rc::Rc;

use lathe_ir::SymbolTable;

use super::*;
use crate::record::{Module, ModuleDict, Record};

fn hash_of(v: &Value) -> u64 {
    use rustc_hash::FxHasher;
    let mut hasher = FxHasher::default();
    v.hash(&mut hasher);
    hasher.finish()
}

#[test]
fn print_primitives() {
    assert_eq!(Value::Null.to_string(), "null");
    assert_eq!(Value::Bool(true).to_string(), "true");
    assert_eq!(Value::Num(42.0).to_string(), "42");
    assert_eq!(Value::Num(0.5).to_string(), "0.5");
    assert_eq!(Value::string("hi").to_string(), "\"hi\"");
}

#[test]
fn print_doubles_dollar_and_quote() {
    // The string a$b"c prints with both special bytes doubled.
    let v = Value::string("a$b\"c");
    assert_eq!(v.to_string(), "\"a$$b\"\"c\"");
}

#[test]
fn print_symbol_and_list() {
    let table = SymbolTable::new();
    let v = Value::list(vec![
        Value::Num(1.0),
        Value::Sym(table.intern("red")),
        Value::string("s"),
    ]);
    assert_eq!(v.to_string(), "[1,#red,\"s\"]");
}

#[test]
fn print_record_in_field_order() {
    let table = SymbolTable::new();
    let mut rec = Record::new();
    rec.insert(table.intern("b"), Value::Num(2.0));
    rec.insert(table.intern("a"), Value::Num(1.0));
    assert_eq!(Value::record(rec).to_string(), "{b:2,a:1}");
}

#[test]
fn display_value_strips_string_quoting() {
    assert_eq!(Value::string("x=7").display_value(), "x=7");
    assert_eq!(Value::Num(7.0).display_value(), "7");
}

#[test]
fn equality_is_structural_and_deep() {
    let a = Value::list(vec![Value::Num(1.0), Value::string("x")]);
    let b = Value::list(vec![Value::Num(1.0), Value::string("x")]);
    assert!(a.equal(&b));
    let c = Value::list(vec![Value::Num(1.0)]);
    assert!(!a.equal(&c));
}

#[test]
fn nan_is_not_equal_to_itself() {
    let nan = Value::Num(f64::NAN);
    assert!(!nan.equal(&nan));
}

#[test]
fn module_equals_record_with_same_fields() {
    let table = SymbolTable::new();
    let x = table.intern("x");

    let dict = Rc::new(ModuleDict::new(vec![x.clone()]));
    let module = Module::new(dict);
    module.set(0, Value::Num(3.0));

    let mut rec = Record::new();
    rec.insert(x, Value::Num(3.0));

    assert!(Value::Module(module).equal(&Value::record(rec)));
}

#[test]
fn equal_values_hash_equal() {
    let table = SymbolTable::new();
    assert_eq!(hash_of(&Value::Num(42.0)), hash_of(&Value::Num(42.0)));
    assert_eq!(hash_of(&Value::string("a")), hash_of(&Value::string("a")));
    assert_eq!(
        hash_of(&Value::Sym(table.intern("x"))),
        hash_of(&Value::Sym(table.intern("x")))
    );
    let l1 = Value::list(vec![Value::Num(1.0), Value::Bool(true)]);
    let l2 = Value::list(vec![Value::Num(1.0), Value::Bool(true)]);
    assert_eq!(hash_of(&l1), hash_of(&l2));
}

#[test]
fn type_names() {
    assert_eq!(Value::Num(1.0).type_name(), "number");
    assert_eq!(Value::list(vec![]).type_name(), "list");
    assert_eq!(Value::record(Record::new()).type_name(), "record");
    assert_eq!(Value::Missing.type_name(), "missing");
}

#[test]
fn downcasts() {
    assert_eq!(Value::Num(2.5).as_num(), Some(2.5));
    assert_eq!(Value::Bool(false).as_bool(), Some(false));
    assert_eq!(Value::string("s").as_str(), Some("s"));
    assert!(Value::Num(1.0).as_list().is_none());
    assert!(Value::Null.as_num().is_none());
}
