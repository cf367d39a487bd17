//! Interned identifier-like names.
//!
//! Symbols are shared `str` allocations deduplicated through a
//! [`SymbolTable`]. Equality takes the pointer fast path for interned
//! symbols and falls back to content comparison, and hashing is by
//! content so hashes are stable across executions.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashSet;

/// An interned identifier-like name.
#[derive(Clone, Eq)]
pub struct Symbol(Arc<str>);

impl Symbol {
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Pointer identity; true implies equality.
    #[inline]
    pub fn same(&self, other: &Symbol) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Symbol {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || *self.0 == *other.0
    }
}

impl PartialOrd for Symbol {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Symbol {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl Hash for Symbol {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({:?})", &*self.0)
    }
}

/// The process-wide symbol table.
///
/// A cheap-to-clone handle; all clones share one underlying table.
/// Interning takes a read lock on the fast path and upgrades to a
/// write lock only for names seen for the first time.
#[derive(Clone, Default)]
pub struct SymbolTable {
    names: Arc<RwLock<FxHashSet<Arc<str>>>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable::default()
    }

    /// Intern a name, returning its symbol.
    pub fn intern(&self, name: &str) -> Symbol {
        {
            let names = self.names.read();
            if let Some(existing) = names.get(name) {
                return Symbol(existing.clone());
            }
        }
        let mut names = self.names.write();
        // Re-check: another caller may have interned it between locks.
        if let Some(existing) = names.get(name) {
            return Symbol(existing.clone());
        }
        let shared: Arc<str> = Arc::from(name);
        names.insert(shared.clone());
        Symbol(shared)
    }

    /// Number of distinct interned names.
    pub fn len(&self) -> usize {
        self.names.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.read().is_empty()
    }
}

impl fmt::Debug for SymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymbolTable({} names)", self.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_deduplicates() {
        let table = SymbolTable::new();
        let a = table.intern("cube");
        let b = table.intern("cube");
        assert!(a.same(&b));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn clones_share_one_table() {
        let table = SymbolTable::new();
        let other = table.clone();
        let a = table.intern("sphere");
        let b = other.intern("sphere");
        assert!(a.same(&b));
        assert_eq!(other.len(), 1);
    }

    #[test]
    fn symbol_equality_and_ordering() {
        let table = SymbolTable::new();
        let a = table.intern("a");
        let b = table.intern("b");
        assert_ne!(a, b);
        assert!(a < b);
        assert_eq!(a.to_string(), "a");
    }

    #[test]
    fn symbol_hash_is_content_based() {
        use std::collections::hash_map::DefaultHasher;

        fn hash(sym: &Symbol) -> u64 {
            let mut hasher = DefaultHasher::new();
            sym.hash(&mut hasher);
            hasher.finish()
        }

        let table = SymbolTable::new();
        let other = SymbolTable::new();
        // Same content interned in distinct tables hashes the same.
        assert_eq!(hash(&table.intern("x")), hash(&other.intern("x")));
    }
}
