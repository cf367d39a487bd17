//! Records and modules.
//!
//! A record is an ordered symbol-to-value mapping with O(1) field
//! lookup. A module pairs a symbol-to-slot dictionary with a shared
//! slot array; it serves both as a record value (a scoped record
//! constructor evaluates to one) and as the captured nonlocal
//! environment of closures.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use lathe_ir::{Slot, Symbol};
use rustc_hash::FxHashMap;

use crate::value::Value;

/// An ordered mapping from symbols to values.
#[derive(Clone, Debug, Default)]
pub struct Record {
    /// Fields in insertion order.
    fields: Vec<(Symbol, Value)>,
    /// Field name to position in `fields`.
    index: FxHashMap<Symbol, usize>,
}

impl Record {
    pub fn new() -> Self {
        Record::default()
    }

    /// Insert a new field. Returns false (and leaves the record
    /// unchanged) if the field already exists.
    pub fn insert(&mut self, name: Symbol, value: Value) -> bool {
        if self.index.contains_key(&name) {
            return false;
        }
        self.index.insert(name.clone(), self.fields.len());
        self.fields.push((name, value));
        true
    }

    /// Insert or replace a field.
    pub fn set(&mut self, name: Symbol, value: Value) {
        match self.index.get(&name) {
            Some(&pos) => self.fields[pos].1 = value,
            None => {
                self.insert(name, value);
            }
        }
    }

    pub fn get(&self, name: &Symbol) -> Option<&Value> {
        self.index.get(name).map(|&pos| &self.fields[pos].1)
    }

    pub fn get_mut(&mut self, name: &Symbol) -> Option<&mut Value> {
        let pos = *self.index.get(name)?;
        Some(&mut self.fields[pos].1)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, &Value)> {
        self.fields.iter().map(|(name, value)| (name, value))
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(name, value)| other.get(name).is_some_and(|v| value == v))
    }
}

/// A module's field dictionary: each name maps to an index into the
/// module's slot array. Built once by analysis and shared by every
/// instantiation of the construct.
#[derive(Debug)]
pub struct ModuleDict {
    /// Names in declaration order; a name's position is its slot.
    order: Vec<Symbol>,
    index: FxHashMap<Symbol, Slot>,
}

impl ModuleDict {
    pub fn new(names: Vec<Symbol>) -> Self {
        let index = names
            .iter()
            .enumerate()
            .map(|(slot, name)| (name.clone(), slot))
            .collect();
        ModuleDict {
            order: names,
            index,
        }
    }

    pub fn slot_of(&self, name: &Symbol) -> Option<Slot> {
        self.index.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn names(&self) -> &[Symbol] {
        &self.order
    }
}

/// A slot-array-backed record.
///
/// The slot array is shared: a module stored into a frame before its
/// setters run is the same module those setters fill in, which is what
/// makes recursive definitions inside it resolve.
#[derive(Clone)]
pub struct Module {
    dict: Rc<ModuleDict>,
    slots: Rc<RefCell<Vec<Value>>>,
}

impl Module {
    /// Create a module with every slot set to the missing sentinel.
    pub fn new(dict: Rc<ModuleDict>) -> Self {
        let slots = vec![Value::Missing; dict.len()];
        Module {
            dict,
            slots: Rc::new(RefCell::new(slots)),
        }
    }

    pub fn dict(&self) -> &Rc<ModuleDict> {
        &self.dict
    }

    pub fn get(&self, slot: Slot) -> Value {
        self.slots.borrow()[slot].clone()
    }

    pub fn set(&self, slot: Slot, value: Value) {
        self.slots.borrow_mut()[slot] = value;
    }

    pub fn field(&self, name: &Symbol) -> Option<Value> {
        self.dict.slot_of(name).map(|slot| self.get(slot))
    }

    pub fn len(&self) -> usize {
        self.dict.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dict.is_empty()
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> Vec<(Symbol, Value)> {
        let slots = self.slots.borrow();
        self.dict
            .names()
            .iter()
            .zip(slots.iter())
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    /// Identity: do both handles share one slot array?
    pub fn ptr_eq(&self, other: &Module) -> bool {
        Rc::ptr_eq(&self.slots, &other.slots)
    }
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Module({} fields)", self.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lathe_ir::SymbolTable;

    #[test]
    fn record_preserves_insertion_order() {
        let table = SymbolTable::new();
        let mut rec = Record::new();
        assert!(rec.insert(table.intern("b"), Value::Num(2.0)));
        assert!(rec.insert(table.intern("a"), Value::Num(1.0)));
        let names: Vec<_> = rec.iter().map(|(n, _)| n.to_string()).collect();
        assert_eq!(names, ["b", "a"]);
    }

    #[test]
    fn record_rejects_duplicates() {
        let table = SymbolTable::new();
        let mut rec = Record::new();
        let a = table.intern("a");
        assert!(rec.insert(a.clone(), Value::Num(1.0)));
        assert!(!rec.insert(a.clone(), Value::Num(2.0)));
        assert_eq!(rec.get(&a), Some(&Value::Num(1.0)));
    }

    #[test]
    fn record_equality_ignores_order() {
        let table = SymbolTable::new();
        let (a, b) = (table.intern("a"), table.intern("b"));
        let mut left = Record::new();
        left.insert(a.clone(), Value::Num(1.0));
        left.insert(b.clone(), Value::Num(2.0));
        let mut right = Record::new();
        right.insert(b, Value::Num(2.0));
        right.insert(a, Value::Num(1.0));
        assert_eq!(left, right);
    }

    #[test]
    fn module_slots_start_missing() {
        let table = SymbolTable::new();
        let dict = Rc::new(ModuleDict::new(vec![table.intern("x")]));
        let module = Module::new(dict);
        assert!(matches!(module.get(0), Value::Missing));
    }

    #[test]
    fn module_clones_share_slots() {
        let table = SymbolTable::new();
        let x = table.intern("x");
        let dict = Rc::new(ModuleDict::new(vec![x.clone()]));
        let module = Module::new(dict);
        let alias = module.clone();
        module.set(0, Value::Num(7.0));
        assert_eq!(alias.field(&x), Some(Value::Num(7.0)));
        assert!(module.ptr_eq(&alias));
    }
}
