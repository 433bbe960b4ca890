#![cfg(test)]

use std::sync::{Arc, Mutex};

use super::support::{event_log, module_exports, FailAt};
use crate::module_system::namespace::{
    GlobalSymbolLookup, ModuleNamespace, Symbol, SymbolTable,
};

/// Lookup counting how often it is consulted, for cache assertions.
struct CountingLookup {
    table: SymbolTable,
    probes: Mutex<u32>,
}

impl CountingLookup {
    fn new(table: SymbolTable) -> Self {
        Self {
            table,
            probes: Mutex::new(0),
        }
    }

    fn probes(&self) -> u32 {
        *self.probes.lock().unwrap()
    }
}

impl GlobalSymbolLookup for CountingLookup {
    fn symbol_by_name(&self, name: &str) -> Option<Symbol> {
        *self.probes.lock().unwrap() += 1;
        self.table.get(name).cloned()
    }
}

fn opaque_table(names: &[&str]) -> SymbolTable {
    let mut table = SymbolTable::new();
    for name in names {
        table.insert(Symbol::opaque(name, || Box::new(())));
    }
    table
}

fn namespace(exports: SymbolTable, parent: SymbolTable) -> ModuleNamespace {
    ModuleNamespace::new("test.module", exports, Arc::new(parent))
}

#[test]
fn test_resolve_from_exports() {
    let log = event_log();
    let ns = namespace(
        module_exports("main", "mod_a", &log, FailAt::Nowhere),
        SymbolTable::new(),
    );
    let symbol = ns.resolve("main", None).unwrap();
    assert_eq!(symbol.name(), "main");
    assert!(symbol.construct_module().is_some());
}

#[test]
fn test_resolve_falls_back_to_parent() {
    let ns = namespace(SymbolTable::new(), opaque_table(&["shared"]));
    assert!(ns.resolve("shared", None).is_some());
    assert!(ns.resolve("absent", None).is_none());
}

#[test]
fn test_exports_shadow_parent() {
    let log = event_log();
    let exports = module_exports("entry", "local", &log, FailAt::Nowhere);
    let ns = namespace(exports, opaque_table(&["entry"]));
    let symbol = ns.resolve("entry", None).unwrap();
    // The export wins over the parent's opaque symbol of the same name.
    assert!(symbol.construct_module().is_some());
}

#[test]
fn test_globals_queried_before_local_chain() {
    let log = event_log();
    let globals = CountingLookup::new(opaque_table(&["entry"]));
    let exports = module_exports("entry", "local", &log, FailAt::Nowhere);
    let ns = namespace(exports, SymbolTable::new());

    let symbol = ns.resolve("entry", Some(&globals)).unwrap();
    assert_eq!(globals.probes(), 1);
    // The global hit wins over the local export.
    assert!(symbol.construct_module().is_none());
}

#[test]
fn test_resolution_is_cached_permanently() {
    let globals = CountingLookup::new(opaque_table(&["remote"]));
    let ns = namespace(SymbolTable::new(), SymbolTable::new());

    assert!(ns.resolve("remote", Some(&globals)).is_some());
    assert!(ns.resolve("remote", Some(&globals)).is_some());
    assert!(ns.resolve("remote", Some(&globals)).is_some());
    // Only the first resolution reached the global lookup.
    assert_eq!(globals.probes(), 1);

    // The cached hit answers even in local-only mode.
    assert!(ns.resolve("remote", None).is_some());
}

#[test]
fn test_misses_are_not_cached() {
    let ns = namespace(SymbolTable::new(), SymbolTable::new());
    assert!(ns.resolve("ghost", None).is_none());

    let globals = CountingLookup::new(opaque_table(&["ghost"]));
    // A later resolve with globals available still finds it.
    assert!(ns.resolve("ghost", Some(&globals)).is_some());
}

#[test]
fn test_local_only_mode_skips_globals() {
    let globals = CountingLookup::new(opaque_table(&["remote"]));
    let ns = namespace(SymbolTable::new(), SymbolTable::new());
    assert!(ns.resolve("remote", None).is_none());
    assert_eq!(globals.probes(), 0);
}

#[test]
fn test_contains_probes_local_chain_only() {
    let log = event_log();
    let ns = namespace(
        module_exports("main", "mod_a", &log, FailAt::Nowhere),
        opaque_table(&["base"]),
    );
    assert!(ns.contains("main"));
    assert!(ns.contains("base"));
    assert!(!ns.contains("remote"));
}

#[test]
fn test_symbol_kind_constructors() {
    let log = event_log();
    let table = module_exports("main", "mod_a", &log, FailAt::Nowhere);
    let module_symbol = table.get("main").unwrap();
    assert!(module_symbol.construct_module().is_some());
    assert!(module_symbol.construct_loader().is_none());

    let opaque = Symbol::opaque("blob", || Box::new(42u32));
    assert!(opaque.construct_module().is_none());
    assert!(opaque.construct_loader().is_none());
}

#[test]
fn test_symbol_table_insert_replaces() {
    let mut table = SymbolTable::new();
    table
        .insert(Symbol::opaque("x", || Box::new(1u32)))
        .insert(Symbol::opaque("x", || Box::new(2u32)));
    assert_eq!(table.len(), 1);
}
