use std::sync::Arc;

use crate::module_system::error::ModuleSystemError;
use crate::module_system::expansion::ExpansionLoader;
use crate::module_system::instance::{InstanceId, ModuleInstance};
use crate::module_system::namespace::{Symbol, SymbolTable};
use crate::module_system::registry::{ModuleRegistry, SweepPhase};
use crate::module_system::store::{PackageHandle, PackageStore};
use crate::module_system::traits::Module;

/// One in-process module handed to packaged initialization, optionally
/// paired with the expansion loader it contributes.
pub struct PackagedEntry {
    pub module: Box<dyn Module>,
    pub loader: Option<Box<dyn ExpansionLoader>>,
}

impl PackagedEntry {
    pub fn new(module: Box<dyn Module>) -> Self {
        Self {
            module,
            loader: None,
        }
    }

    pub fn with_loader(mut self, loader: Box<dyn ExpansionLoader>) -> Self {
        self.loader = Some(loader);
        self
    }
}

/// Orchestrates the full module lifecycle: discovery, dependency
/// verification, the load and enable passes, and teardown.
///
/// The manager is constructed by the host, not reached through any global.
/// It initializes exactly once: either from a package store or from a set
/// of packaged in-process modules. A second initialization call is a
/// logged no-op.
pub struct ModuleManager {
    registry: ModuleRegistry,
    /// Host-provided symbols visible to every module namespace.
    base_symbols: Arc<SymbolTable>,
    initialised: bool,
}

impl Default for ModuleManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleManager {
    pub fn new() -> Self {
        Self::with_base_symbols(SymbolTable::new())
    }

    pub fn with_base_symbols(base_symbols: SymbolTable) -> Self {
        Self {
            registry: ModuleRegistry::new(),
            base_symbols: Arc::new(base_symbols),
            initialised: false,
        }
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ModuleRegistry {
        &mut self.registry
    }

    pub fn is_initialised(&self) -> bool {
        self.initialised
    }

    /// Discover, verify and load modules from a package store.
    ///
    /// Packages whose manifest or entry symbols are bad are skipped with a
    /// report; they never abort the run. Afterwards the dependency sweep
    /// evicts instances with unsatisfied dependencies, then the load pass
    /// runs over the survivors.
    pub fn init_discover(&mut self, store: &dyn PackageStore) -> Result<(), ModuleSystemError> {
        if self.initialised {
            log::info!("Module manager is already initialised, skipping init.");
            return Ok(());
        }
        self.initialised = true;

        let packages = store.enumerate()?;
        if packages.is_empty() {
            log::info!("Modules folder was empty, skipping module loading.");
            return Ok(());
        }

        for package in &packages {
            match self.load_package(store, package) {
                Ok(name) => {
                    log::info!("Module '{}' has successfully been registered.", name)
                }
                Err(e) => log::info!(
                    "Failed to load module package '{}': {}",
                    package.file_name(),
                    e
                ),
            }
        }

        self.registry.sweep(SweepPhase::Depend);
        self.registry.load_all()
    }

    /// Register one discovered package: parse its manifest, open its
    /// namespace, and verify up front that the manifest's entry names are
    /// resolvable through the namespace's own chain. Nothing is constructed
    /// here; construction happens in the load pass.
    fn load_package(
        &mut self,
        store: &dyn PackageStore,
        package: &PackageHandle,
    ) -> Result<String, ModuleSystemError> {
        let manifest = store.read_manifest(package)?;
        let namespace = Arc::new(store.open_namespace(package, Arc::clone(&self.base_symbols))?);

        if !namespace.contains(&manifest.main) {
            return Err(ModuleSystemError::SymbolNotFound {
                name: manifest.main.clone(),
                namespace: namespace.package().to_string(),
            });
        }
        if let Some(entry) = &manifest.loader {
            if !namespace.contains(entry) {
                return Err(ModuleSystemError::SymbolNotFound {
                    name: entry.clone(),
                    namespace: namespace.package().to_string(),
                });
            }
        }

        let name = manifest.name.clone();
        self.registry.insert_namespace(Arc::clone(&namespace));
        self.registry.insert(ModuleInstance::new(manifest, namespace));
        Ok(name)
    }

    /// Initialize from modules compiled into the host process. No
    /// discovery, no manifests on disk, no dependency declarations; each
    /// entry's loader (if any) is registered before the load pass runs.
    pub fn init_packaged(&mut self, entries: Vec<PackagedEntry>) -> Result<(), ModuleSystemError> {
        if self.initialised {
            log::info!("Module manager is already initialised, skipping init.");
            return Ok(());
        }
        self.initialised = true;

        let names: Vec<&str> = entries.iter().map(|e| e.module.name()).collect();
        log::info!("Loading packaged modules {{{}}}.", names.join(", "));

        for entry in entries {
            let instance = ModuleInstance::packaged(entry.module);
            let id = instance.id();
            self.registry.insert(instance);
            if let Some(loader) = entry.loader {
                self.registry.add_loader(id, loader);
            }
        }

        self.registry.load_all()
    }

    /// Run the enable pass over everything currently loaded.
    pub fn enable(&mut self) -> Result<(), ModuleSystemError> {
        self.registry.enable_all()
    }

    /// Tear everything down. Never fails.
    pub fn shutdown(&mut self) {
        self.registry.shutdown_all();
    }

    /// Register an expansion loader on behalf of an instance outside the
    /// manifest-driven path.
    pub fn add_loader(&mut self, id: InstanceId, loader: Box<dyn ExpansionLoader>) {
        self.registry.add_loader(id, loader);
    }

    /// Cross-module symbol lookup over all registered namespaces.
    pub fn symbol_by_name(&self, name: &str) -> Option<Symbol> {
        self.registry.symbol_by_name(name)
    }
}
