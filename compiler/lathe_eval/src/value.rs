//! Runtime values.
//!
//! A `Value` is the uniform datum every expression evaluates to.
//! Composites are immutable and internally shared; the heap variants
//! can only be built through the factory methods here, which keeps the
//! `Heap` discipline in one place.

use std::fmt::{self, Write as _};
use std::hash::{Hash, Hasher};

use lathe_ir::Symbol;

use crate::function::{Builtin, Closure, Lambda};
use crate::heap::Heap;
use crate::record::{Module, Record};

#[cfg(test)]
mod tests;

/// A uniform tagged datum.
#[derive(Clone, Debug)]
pub enum Value {
    Null,
    Bool(bool),
    /// IEEE-754 double. Equality is IEEE equality: NaN is not equal to
    /// itself.
    Num(f64),
    Sym(Symbol),
    /// Immutable UTF-8 string, shared among holders.
    Str(Heap<String>),
    List(Heap<Vec<Value>>),
    Record(Heap<Record>),
    /// A slot-array-backed record; also the captured environment of
    /// closures.
    Module(Module),
    Closure(Closure),
    /// Environment-free function body; promoted to a closure when read
    /// out of a nonlocal module. Never observable from the language.
    Lambda(Heap<Lambda>),
    Builtin(Builtin),
    /// Compiler-internal sentinel for slots not yet initialized.
    Missing,
}

impl Value {
    #[inline]
    pub fn string(s: impl Into<String>) -> Self {
        Value::Str(Heap::new(s.into()))
    }

    #[inline]
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Heap::new(items))
    }

    #[inline]
    pub fn record(rec: Record) -> Self {
        Value::Record(Heap::new(rec))
    }

    #[inline]
    pub fn closure(closure: Closure) -> Self {
        Value::Closure(closure)
    }

    /// The variant name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Num(_) => "number",
            Value::Sym(_) => "symbol",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Record(_) | Value::Module(_) => "record",
            Value::Closure(_) | Value::Lambda(_) | Value::Builtin(_) => "function",
            Value::Missing => "missing",
        }
    }

    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    pub fn as_num(&self) -> Option<f64> {
        match self {
            Value::Num(n) => Some(*n),
            _ => None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    pub fn as_sym(&self) -> Option<&Symbol> {
        match self {
            Value::Sym(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    #[inline]
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(rec) => Some(rec),
            _ => None,
        }
    }

    /// Field lookup across both record representations.
    pub fn field(&self, name: &Symbol) -> Option<Value> {
        match self {
            Value::Record(rec) => rec.get(name).cloned(),
            Value::Module(module) => module.field(name),
            _ => None,
        }
    }

    /// Number of fields of a record-like value.
    pub fn field_count(&self) -> Option<usize> {
        match self {
            Value::Record(rec) => Some(rec.len()),
            Value::Module(module) => Some(module.len()),
            _ => None,
        }
    }

    /// Structural equality. Lists and records compare element-wise and
    /// field-wise; numbers use IEEE equality; functions compare by
    /// identity.
    pub fn equal(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) | (Value::Missing, Value::Missing) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Num(a), Value::Num(b)) => a == b,
            (Value::Sym(a), Value::Sym(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.equal(y))
            }
            (Value::Record(a), Value::Record(b)) => a == b,
            // A module is a record; the two representations compare
            // field-wise against each other.
            (Value::Module(a), Value::Module(b)) => {
                a.ptr_eq(b) || record_like_equal(self, other)
            }
            (Value::Record(_), Value::Module(_)) | (Value::Module(_), Value::Record(_)) => {
                record_like_equal(self, other)
            }
            (Value::Closure(a), Value::Closure(b)) => {
                a.lambda.ptr_eq(&b.lambda) && a.nonlocals.ptr_eq(&b.nonlocals)
            }
            (Value::Lambda(a), Value::Lambda(b)) => a.ptr_eq(b),
            (Value::Builtin(a), Value::Builtin(b)) => {
                a.call as usize == b.call as usize && a.name == b.name
            }
            _ => false,
        }
    }

    /// The unquoted form used for console output: string contents are
    /// written raw; everything else matches the canonical form.
    pub fn display_value(&self) -> String {
        match self {
            Value::Str(s) => (**s).clone(),
            other => other.to_string(),
        }
    }
}

fn record_like_equal(a: &Value, b: &Value) -> bool {
    let (Some(len_a), Some(len_b)) = (a.field_count(), b.field_count()) else {
        return false;
    };
    if len_a != len_b {
        return false;
    }
    let fields: Vec<(Symbol, Value)> = match a {
        Value::Record(rec) => rec.iter().map(|(n, v)| (n.clone(), v.clone())).collect(),
        Value::Module(module) => module.fields(),
        _ => return false,
    };
    fields
        .iter()
        .all(|(name, value)| b.field(name).is_some_and(|v| value.equal(&v)))
}

impl PartialEq for Value {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.equal(other)
    }
}

/// Write a string in its canonical quoted form: surrounding `"`, with
/// each `$` and `"` byte doubled.
fn write_quoted(s: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("\"")?;
    for c in s.chars() {
        if c == '$' || c == '"' {
            f.write_char(c)?;
        }
        f.write_char(c)?;
    }
    f.write_str("\"")
}

impl fmt::Display for Value {
    /// The canonical printed form, re-readable by the surface parser
    /// for pure primitives.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Num(n) => write!(f, "{n}"),
            Value::Sym(s) => write!(f, "#{s}"),
            Value::Str(s) => write_quoted(s, f),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Record(rec) => {
                f.write_str("{")?;
                for (i, (name, value)) in rec.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{name}:{value}")?;
                }
                f.write_str("}")
            }
            Value::Module(module) => {
                f.write_str("{")?;
                for (i, (name, value)) in module.fields().iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{name}:{value}")?;
                }
                f.write_str("}")
            }
            Value::Closure(c) => match &c.lambda.name {
                Some(name) => write!(f, "<function {name}>"),
                None => f.write_str("<function>"),
            },
            Value::Lambda(_) => f.write_str("<function>"),
            Value::Builtin(b) => write!(f, "<function {}>", b.name),
            Value::Missing => f.write_str("<missing>"),
        }
    }
}

impl Hash for Value {
    /// Content hash, stable across executions for all pure values.
    /// Agrees with `equal` for everything except NaN (which is never
    /// equal to anything, itself included).
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null | Value::Missing => {}
            Value::Bool(b) => b.hash(state),
            Value::Num(n) => n.to_bits().hash(state),
            Value::Sym(s) => s.hash(state),
            Value::Str(s) => s.hash(state),
            Value::List(items) => {
                for item in items.iter() {
                    item.hash(state);
                }
            }
            Value::Record(rec) => {
                for (name, value) in rec.iter() {
                    name.hash(state);
                    value.hash(state);
                }
            }
            Value::Module(module) => {
                for (name, value) in module.fields() {
                    name.hash(state);
                    value.hash(state);
                }
            }
            // Functions hash by identity, matching their equality.
            Value::Closure(c) => payload_addr(&c.lambda).hash(state),
            Value::Lambda(l) => payload_addr(l).hash(state),
            Value::Builtin(b) => (b.call as usize).hash(state),
        }
    }
}

/// Address of a shared payload; stable for the allocation's lifetime,
/// which is all the identity hash of a function needs.
fn payload_addr<T>(heap: &Heap<T>) -> usize {
    &**heap as *const T as usize
}
