use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::module_system::expansion::ExpansionLoader;
use crate::module_system::traits::Module;

/// Factory signature for symbols constructing a module main entry.
pub type ModuleCtor = Arc<dyn Fn() -> Box<dyn Module> + Send + Sync>;
/// Factory signature for symbols constructing an expansion loader.
pub type LoaderCtor = Arc<dyn Fn() -> Box<dyn ExpansionLoader> + Send + Sync>;
/// Factory signature for symbols constructing anything else.
pub type OpaqueCtor = Arc<dyn Fn() -> Box<dyn Any + Send + Sync> + Send + Sync>;

/// What a resolved symbol constructs.
#[derive(Clone)]
pub enum SymbolKind {
    Module(ModuleCtor),
    ExpansionLoader(LoaderCtor),
    Opaque(OpaqueCtor),
}

/// A named zero-argument constructor resolvable through a namespace.
///
/// Symbols are the registration-based replacement for resolving an entry
/// name to a class and reflectively instantiating it: each package installs
/// its constructors under the names its manifest refers to.
#[derive(Clone)]
pub struct Symbol {
    name: String,
    kind: SymbolKind,
}

impl Symbol {
    pub fn module<F>(name: &str, ctor: F) -> Self
    where
        F: Fn() -> Box<dyn Module> + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            kind: SymbolKind::Module(Arc::new(ctor)),
        }
    }

    pub fn expansion_loader<F>(name: &str, ctor: F) -> Self
    where
        F: Fn() -> Box<dyn ExpansionLoader> + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            kind: SymbolKind::ExpansionLoader(Arc::new(ctor)),
        }
    }

    pub fn opaque<F>(name: &str, ctor: F) -> Self
    where
        F: Fn() -> Box<dyn Any + Send + Sync> + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            kind: SymbolKind::Opaque(Arc::new(ctor)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &SymbolKind {
        &self.kind
    }

    /// Construct the module this symbol names, if it is a module symbol.
    pub fn construct_module(&self) -> Option<Box<dyn Module>> {
        match &self.kind {
            SymbolKind::Module(ctor) => Some(ctor()),
            _ => None,
        }
    }

    /// Construct the expansion loader this symbol names, if it is one.
    pub fn construct_loader(&self) -> Option<Box<dyn ExpansionLoader>> {
        match &self.kind {
            SymbolKind::ExpansionLoader(ctor) => Some(ctor()),
            _ => None,
        }
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            SymbolKind::Module(_) => "module",
            SymbolKind::ExpansionLoader(_) => "expansion-loader",
            SymbolKind::Opaque(_) => "opaque",
        };
        f.debug_struct("Symbol")
            .field("name", &self.name)
            .field("kind", &kind)
            .finish()
    }
}

/// A flat name-to-symbol table. Used both for a package's own exports and
/// for the host's base symbol set shared by all namespaces.
#[derive(Debug, Default, Clone)]
pub struct SymbolTable {
    symbols: HashMap<String, Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a symbol, replacing any previous one under the same name.
    pub fn insert(&mut self, symbol: Symbol) -> &mut Self {
        self.symbols.insert(symbol.name().to_string(), symbol);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Manager-wide symbol lookup used for the cross-module fallback step of
/// namespace resolution. Implementations must query each namespace in
/// local-only mode, which is what keeps delegation to exactly one hop.
pub trait GlobalSymbolLookup {
    fn symbol_by_name(&self, name: &str) -> Option<Symbol>;
}

/// Per-module symbol-resolution scope.
///
/// Resolution order with cross-module fallback enabled: local cache, then
/// the manager's global lookup (every namespace queried in local-only
/// mode), then the default chain of this package's own exports extended by
/// the host's base symbol set. A resolved name is cached for the lifetime
/// of the namespace and never re-resolved.
pub struct ModuleNamespace {
    /// Package identity for diagnostics, e.g. the package file name.
    package: String,
    exports: SymbolTable,
    parent: Arc<SymbolTable>,
    cache: Mutex<HashMap<String, Symbol>>,
}

impl ModuleNamespace {
    pub fn new(package: &str, exports: SymbolTable, parent: Arc<SymbolTable>) -> Self {
        Self {
            package: package.to_string(),
            exports,
            parent,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    /// Existence probe over the local chain only. Does not construct and
    /// does not populate the cache; used for fail-fast entry checks during
    /// discovery.
    pub fn contains(&self, name: &str) -> bool {
        self.exports.contains(name) || self.parent.contains(name)
    }

    /// Resolve a symbol name within this namespace.
    ///
    /// Passing `Some(globals)` enables the cross-module fallback; passing
    /// `None` is local-only mode, the mode a namespace is queried in when
    /// the request originates from another namespace's fallback.
    pub fn resolve(
        &self,
        name: &str,
        globals: Option<&dyn GlobalSymbolLookup>,
    ) -> Option<Symbol> {
        if let Some(hit) = self.cache().get(name) {
            return Some(hit.clone());
        }

        let mut found = match globals {
            Some(globals) => globals.symbol_by_name(name),
            None => None,
        };
        if found.is_none() {
            found = self
                .exports
                .get(name)
                .or_else(|| self.parent.get(name))
                .cloned();
        }

        match found {
            Some(symbol) => {
                self.cache().insert(name.to_string(), symbol.clone());
                Some(symbol)
            }
            None => {
                log::debug!(
                    "Symbol '{}' not found in namespace '{}'",
                    name,
                    self.package
                );
                None
            }
        }
    }

    fn cache(&self) -> MutexGuard<'_, HashMap<String, Symbol>> {
        // A poisoned cache still holds valid symbols; recover the guard.
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl fmt::Debug for ModuleNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleNamespace")
            .field("package", &self.package)
            .field("exports", &self.exports.len())
            .finish_non_exhaustive()
    }
}
