use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::module_system::error::{LifecyclePhase, ModuleSystemError};
use crate::module_system::expansion::{is_assignable, ExpansionLoader};
use crate::module_system::manifest::ModuleManifest;
use crate::module_system::namespace::{GlobalSymbolLookup, ModuleNamespace};
use crate::module_system::traits::Module;

static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a module instance.
///
/// Dependency matching is by (case-insensitive) name, but two instances
/// remain distinguishable even when their manifests share a name; loader
/// registrations are keyed by this id, never by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceId(u64);

impl InstanceId {
    fn next() -> Self {
        Self(NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Lifecycle status of a module instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModuleStatus {
    /// Initial state, and also the state of a failed, retry-eligible
    /// module after it has been removed.
    #[default]
    None,
    /// Terminal removal signal set by the dependency-satisfaction check.
    MissingDependency,
    Enabled,
    Disabled,
}

/// Cheap view of an instance handed to expansion loader hooks.
#[derive(Debug, Clone)]
pub struct ModuleHandle {
    pub id: InstanceId,
    pub name: String,
    pub version: Option<String>,
}

/// Wraps one loaded module: its manifest, its namespace, its live object
/// and its lifecycle status.
///
/// File-backed instances construct their live object from the namespace
/// during `load`; packaged instances are created around an object the host
/// already owns and skip symbol resolution entirely.
pub struct ModuleInstance {
    id: InstanceId,
    manifest: ModuleManifest,
    /// Absent for packaged in-process modules.
    namespace: Option<Arc<ModuleNamespace>>,
    module: Option<Box<dyn Module>>,
    status: ModuleStatus,
}

impl ModuleInstance {
    /// A file-backed instance; the live object is constructed at load time.
    pub fn new(manifest: ModuleManifest, namespace: Arc<ModuleNamespace>) -> Self {
        Self {
            id: InstanceId::next(),
            manifest,
            namespace: Some(namespace),
            module: None,
            status: ModuleStatus::None,
        }
    }

    /// A packaged instance around a module object the host supplied
    /// directly. Its manifest is synthesized from the module's own name
    /// and declares no dependencies.
    pub fn packaged(module: Box<dyn Module>) -> Self {
        let manifest = ModuleManifest::new(module.name(), "<packaged>");
        Self {
            id: InstanceId::next(),
            manifest,
            namespace: None,
            module: Some(module),
            status: ModuleStatus::None,
        }
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn manifest(&self) -> &ModuleManifest {
        &self.manifest
    }

    pub fn status(&self) -> ModuleStatus {
        self.status
    }

    pub fn namespace(&self) -> Option<&Arc<ModuleNamespace>> {
        self.namespace.as_ref()
    }

    pub fn module(&self) -> Option<&dyn Module> {
        self.module.as_deref()
    }

    pub fn is_packaged(&self) -> bool {
        self.namespace.is_none()
    }

    pub fn handle(&self) -> ModuleHandle {
        ModuleHandle {
            id: self.id,
            name: self.manifest.name.clone(),
            version: self.manifest.version.clone(),
        }
    }

    /// Drive the load step.
    ///
    /// For a file-backed instance: construct the main entry inside the
    /// namespace, then construct the declared loader entry if any, then
    /// invoke the module's own `load` hook. The three steps short-circuit
    /// on first failure. The constructed expansion loader is *returned*
    /// rather than registered here, so a later failure can never leave a
    /// half-registered loader behind.
    pub fn load(
        &mut self,
        globals: &dyn GlobalSymbolLookup,
    ) -> Result<Option<Box<dyn ExpansionLoader>>, ModuleSystemError> {
        let loader = match &self.namespace {
            Some(namespace) => {
                let main = self.manifest.main.clone();
                let symbol = namespace.resolve(&main, Some(globals)).ok_or_else(|| {
                    ModuleSystemError::SymbolNotFound {
                        name: main.clone(),
                        namespace: namespace.package().to_string(),
                    }
                })?;
                let module = symbol.construct_module().ok_or(
                    ModuleSystemError::EntryKindMismatch {
                        name: main,
                        expected: "module",
                    },
                )?;
                self.module = Some(module);

                match self.manifest.loader.clone() {
                    Some(entry) => {
                        let symbol =
                            namespace.resolve(&entry, Some(globals)).ok_or_else(|| {
                                ModuleSystemError::SymbolNotFound {
                                    name: entry.clone(),
                                    namespace: namespace.package().to_string(),
                                }
                            })?;
                        let loader = symbol.construct_loader().ok_or(
                            ModuleSystemError::EntryKindMismatch {
                                name: entry,
                                expected: "expansion loader",
                            },
                        )?;
                        log::info!(
                            "Module '{}' has loaded an expansion loader '{}'",
                            self.manifest.name,
                            loader.name()
                        );
                        Some(loader)
                    }
                    None => None,
                }
            }
            // Packaged instances already own their live object.
            None => None,
        };

        let module = self.module.as_mut().ok_or_else(|| {
            ModuleSystemError::OperationError {
                module: Some(self.manifest.name.clone()),
                message: "instance has no module object to load".to_string(),
            }
        })?;
        module
            .load()
            .map_err(|e| ModuleSystemError::lifecycle(&self.manifest.name, LifecyclePhase::Load, e))?;

        Ok(loader)
    }

    /// Drive the enable step: the module's `enable` hook, then every
    /// contributed expansion is offered to every matching registered
    /// loader. The first loader failure fails the whole call and resets
    /// the status to `None`; loader invocations that already succeeded are
    /// not rolled back.
    pub fn enable(
        &mut self,
        loaders: &HashMap<InstanceId, Box<dyn ExpansionLoader>>,
    ) -> Result<(), ModuleSystemError> {
        log::info!("Attempting enable() for '{}'", self.manifest.name);
        let handle = self.handle();

        let hook = match self.module.as_mut() {
            Some(module) => module.enable(),
            None => {
                return Err(ModuleSystemError::OperationError {
                    module: Some(self.manifest.name.clone()),
                    message: "instance has no module object to enable".to_string(),
                })
            }
        };
        if let Err(e) = hook {
            self.status = ModuleStatus::None;
            return Err(ModuleSystemError::lifecycle(
                &self.manifest.name,
                LifecyclePhase::Enable,
                e,
            ));
        }

        let expansions = self
            .module
            .as_ref()
            .map(|m| m.expansions())
            .unwrap_or_default();
        for expansion in &expansions {
            for loader in loaders.values() {
                if !is_assignable(expansion.as_ref(), &loader.accepts()) {
                    continue;
                }
                if let Err(e) = loader.enable(&handle, expansion.as_ref()) {
                    log::info!(
                        "enable() failed for module '{}' with loader '{}': {}",
                        self.manifest.name,
                        loader.name(),
                        e
                    );
                    self.status = ModuleStatus::None;
                    return Err(ModuleSystemError::lifecycle(
                        &self.manifest.name,
                        LifecyclePhase::Enable,
                        format!("expansion loader '{}' rejected an expansion: {}", loader.name(), e),
                    ));
                }
            }
        }

        self.status = ModuleStatus::Enabled;
        log::info!("enable() success for '{}'", self.manifest.name);
        Ok(())
    }

    /// Drive the shutdown step: the module's `shutdown` hook, then every
    /// matching loader is notified to unload each contributed expansion,
    /// unconditionally. A hook failure resets the status to `None` and is
    /// reported; shutdown never propagates failure to the caller.
    pub fn shutdown(&mut self, loaders: &HashMap<InstanceId, Box<dyn ExpansionLoader>>) {
        log::info!("Attempting shutdown() for '{}'", self.manifest.name);
        let handle = self.handle();

        let hook = match self.module.as_mut() {
            Some(module) => module.shutdown(),
            None => Ok(()),
        };
        match hook {
            Ok(()) => {
                let expansions = self
                    .module
                    .as_ref()
                    .map(|m| m.expansions())
                    .unwrap_or_default();
                for expansion in &expansions {
                    for loader in loaders.values() {
                        if !is_assignable(expansion.as_ref(), &loader.accepts()) {
                            continue;
                        }
                        log::info!(
                            "Attempting shutdown() for module '{}' with expansion loader '{}'",
                            self.manifest.name,
                            loader.name()
                        );
                        loader.unload(&handle, expansion.as_ref());
                    }
                }
                self.status = ModuleStatus::Disabled;
            }
            Err(e) => {
                self.status = ModuleStatus::None;
                log::info!("Failed to disable module '{}': {}", self.manifest.name, e);
            }
        }
    }

    /// Check this instance's declared dependency names against a pool of
    /// candidate module names, case-insensitively. Any unmatched name is
    /// returned. The check itself is pure; the dependency sweep marks the
    /// instance when it acts on a miss.
    pub fn missing_dependencies(&self, pool: &[String]) -> HashSet<String> {
        let mut missing = HashSet::new();
        for dep in &self.manifest.dependencies {
            if !pool.iter().any(|name| name.eq_ignore_ascii_case(dep)) {
                missing.insert(dep.clone());
            }
        }
        missing
    }

    pub(crate) fn mark_missing_dependency(&mut self) {
        self.status = ModuleStatus::MissingDependency;
    }
}
