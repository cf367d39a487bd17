//! The process-wide host facade.

use std::rc::Rc;

use lathe_ir::{Symbol, SymbolTable};
use rustc_hash::FxHashMap;

use crate::console::{stdout_console, SharedConsole};
use crate::value::Value;

/// Host facilities available to every frame: the symbol table, the
/// console, and the ambient global environment consulted by symbolic
/// references. A `System` is a cheap handle; every frame of an
/// evaluation holds one, which costs less than threading it through
/// each `eval` call.
#[derive(Clone)]
pub struct System {
    symbols: SymbolTable,
    console: SharedConsole,
    globals: Rc<FxHashMap<Symbol, Value>>,
}

impl System {
    pub fn builder() -> SystemBuilder {
        SystemBuilder::default()
    }

    /// A system with stdout output and no globals.
    pub fn new() -> Self {
        System::builder().build()
    }

    #[inline]
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    #[inline]
    pub fn intern(&self, name: &str) -> Symbol {
        self.symbols.intern(name)
    }

    #[inline]
    pub fn console(&self) -> &SharedConsole {
        &self.console
    }

    /// Look up a name in the ambient global environment.
    pub fn global(&self, name: &Symbol) -> Option<Value> {
        self.globals.get(name).cloned()
    }
}

impl Default for System {
    fn default() -> Self {
        System::new()
    }
}

/// Configures a [`System`].
pub struct SystemBuilder {
    symbols: SymbolTable,
    console: Option<SharedConsole>,
    globals: FxHashMap<Symbol, Value>,
}

impl Default for SystemBuilder {
    fn default() -> Self {
        SystemBuilder {
            symbols: SymbolTable::new(),
            console: None,
            globals: FxHashMap::default(),
        }
    }
}

impl SystemBuilder {
    #[must_use]
    pub fn console(mut self, console: SharedConsole) -> Self {
        self.console = Some(console);
        self
    }

    /// Bind a name in the ambient global environment.
    #[must_use]
    pub fn global(mut self, name: &str, value: Value) -> Self {
        let sym = self.symbols.intern(name);
        self.globals.insert(sym, value);
        self
    }

    pub fn build(self) -> System {
        System {
            symbols: self.symbols,
            console: self.console.unwrap_or_else(stdout_console),
            globals: Rc::new(self.globals),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::buffer_console;

    #[test]
    fn globals_resolve_after_build() {
        let system = System::builder().global("tau", Value::Num(6.28)).build();
        let tau = system.intern("tau");
        assert_eq!(system.global(&tau), Some(Value::Num(6.28)));
        assert_eq!(system.global(&system.intern("pi")), None);
    }

    #[test]
    fn configured_console_is_shared() {
        let console = buffer_console();
        let system = System::builder().console(console.clone()).build();
        system.console().writeln("out");
        assert_eq!(console.captured(), "out\n");
    }
}
