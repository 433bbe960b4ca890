use std::collections::HashMap;
use std::sync::Arc;

use crate::module_system::error::ModuleSystemError;
use crate::module_system::expansion::ExpansionLoader;
use crate::module_system::instance::{InstanceId, ModuleInstance};
use crate::module_system::namespace::{GlobalSymbolLookup, ModuleNamespace, Symbol};

/// Which orchestration phase a dependency sweep runs after; selects the
/// diagnostic message for evicted modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepPhase {
    Depend,
    Load,
    Enable,
}

/// All isolated namespaces currently owned by the registry.
///
/// Implements the global lookup consulted by cross-module resolution:
/// every namespace is queried in local-only mode, so a cross-module
/// request never re-triggers another cross-module request.
#[derive(Debug, Default)]
pub struct NamespaceSet {
    namespaces: Vec<Arc<ModuleNamespace>>,
}

impl NamespaceSet {
    pub fn push(&mut self, namespace: Arc<ModuleNamespace>) {
        self.namespaces.push(namespace);
    }

    pub fn len(&self) -> usize {
        self.namespaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }
}

impl GlobalSymbolLookup for NamespaceSet {
    fn symbol_by_name(&self, name: &str) -> Option<Symbol> {
        self.namespaces.iter().find_map(|ns| ns.resolve(name, None))
    }
}

/// Owns the live module instances, their namespaces and the registered
/// expansion loaders, and drives the lifecycle-wide passes over them.
///
/// Invariants: an instance stays registered only while its declared
/// dependencies are satisfied by other registered instances, and the
/// loader map holds entries only for instances currently registered.
/// Both are maintained by removal plus the repeated dependency sweep.
#[derive(Default)]
pub struct ModuleRegistry {
    instances: Vec<ModuleInstance>,
    loaders: HashMap<InstanceId, Box<dyn ExpansionLoader>>,
    namespaces: NamespaceSet,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an instance. Duplicate names are retained as distinct
    /// instances but cannot be told apart by name-based dependency
    /// matching, so they are worth a warning.
    pub fn insert(&mut self, instance: ModuleInstance) {
        let name = &instance.manifest().name;
        if self.has_module(name) {
            log::warn!(
                "A module named '{}' is already registered; the instances stay distinct but dependency matching by name cannot distinguish them",
                name
            );
        }
        self.instances.push(instance);
    }

    pub fn insert_namespace(&mut self, namespace: Arc<ModuleNamespace>) {
        self.namespaces.push(namespace);
    }

    /// Register an expansion loader on behalf of the given instance.
    pub fn add_loader(&mut self, id: InstanceId, loader: Box<dyn ExpansionLoader>) {
        self.loaders.insert(id, loader);
    }

    pub fn instances(&self) -> &[ModuleInstance] {
        &self.instances
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn loader_count(&self) -> usize {
        self.loaders.len()
    }

    pub fn has_loader_for(&self, id: InstanceId) -> bool {
        self.loaders.contains_key(&id)
    }

    pub fn get(&self, id: InstanceId) -> Option<&ModuleInstance> {
        self.instances.iter().find(|i| i.id() == id)
    }

    /// First registered instance matching `name` case-insensitively.
    pub fn instance_id_of(&self, name: &str) -> Option<InstanceId> {
        self.instances
            .iter()
            .find(|i| i.manifest().is_named(name))
            .map(|i| i.id())
    }

    pub fn has_module(&self, name: &str) -> bool {
        self.instances.iter().any(|i| i.manifest().is_named(name))
    }

    /// Names of all currently registered instances, in registration order.
    pub fn module_names(&self) -> Vec<String> {
        self.instances
            .iter()
            .map(|i| i.manifest().name.clone())
            .collect()
    }

    pub fn namespaces(&self) -> &NamespaceSet {
        &self.namespaces
    }

    /// Cross-module symbol lookup: first hit across all namespaces, each
    /// queried in local-only mode.
    pub fn symbol_by_name(&self, name: &str) -> Option<Symbol> {
        self.namespaces.symbol_by_name(name)
    }

    fn remove(&mut self, id: InstanceId) -> Option<ModuleInstance> {
        self.loaders.remove(&id);
        let pos = self.instances.iter().position(|i| i.id() == id)?;
        Some(self.instances.remove(pos))
    }

    fn position(&self, id: InstanceId) -> Option<usize> {
        self.instances.iter().position(|i| i.id() == id)
    }

    /// Compute a dependency-respecting order over the current instances.
    ///
    /// Fixed-point algorithm: repeatedly move every instance whose
    /// dependencies are all satisfied by instances already ordered, as a
    /// batch, until nothing remains. A full pass that makes no progress
    /// means the remaining instances form a dependency cycle (or depend on
    /// something outside the registry), which is reported instead of
    /// looping forever.
    pub fn ordered(&self) -> Result<Vec<InstanceId>, ModuleSystemError> {
        let mut ordered = Vec::new();
        let mut ordered_names: Vec<String> = Vec::new();
        let mut remaining: Vec<InstanceId> = self.instances.iter().map(|i| i.id()).collect();

        while !remaining.is_empty() {
            let mut moved = Vec::new();
            for &id in &remaining {
                let Some(instance) = self.get(id) else { continue };
                if instance.missing_dependencies(&ordered_names).is_empty() {
                    moved.push(id);
                }
            }

            if moved.is_empty() {
                let stuck: Vec<String> = remaining
                    .iter()
                    .filter_map(|id| self.get(*id))
                    .map(|i| i.manifest().name.clone())
                    .collect();
                return Err(ModuleSystemError::DependencyCycle(stuck));
            }

            for id in moved {
                if let Some(instance) = self.get(id) {
                    ordered_names.push(instance.manifest().name.clone());
                }
                ordered.push(id);
                remaining.retain(|r| *r != id);
            }
        }

        Ok(ordered)
    }

    /// The cascading dependency sweep: scan every instance's declared
    /// dependencies against the current registry and evict any with a
    /// miss, dropping its loader registration. Because an eviction can
    /// newly break another instance, the scan repeats until a full pass
    /// removes nothing.
    pub fn sweep(&mut self, phase: SweepPhase) {
        loop {
            let pool = self.module_names();
            let mut evicted = Vec::new();
            for instance in &mut self.instances {
                let missing = instance.missing_dependencies(&pool);
                if !missing.is_empty() {
                    instance.mark_missing_dependency();
                    let mut missing: Vec<String> = missing.into_iter().collect();
                    missing.sort();
                    evicted.push((instance.id(), instance.manifest().name.clone(), missing));
                }
            }
            if evicted.is_empty() {
                break;
            }

            for (id, name, missing) in evicted {
                self.remove(id);
                let missing = missing.join(", ");
                match phase {
                    SweepPhase::Depend => log::info!(
                        "Module '{}' is missing dependencies {{{}}} and has now been unloaded.",
                        name,
                        missing
                    ),
                    SweepPhase::Load => log::info!(
                        "Module '{}' has failed to load as dependencies {{{}}} failed to load.",
                        name,
                        missing
                    ),
                    SweepPhase::Enable => log::info!(
                        "Module '{}' has failed to enable as dependencies {{{}}} failed to enable.",
                        name,
                        missing
                    ),
                }
            }
        }
    }

    /// The load pass: drive `load()` over all instances in dependency
    /// order. On the first failure the failing instance is removed along
    /// with its loader registration, the dependency sweep runs, and the
    /// whole pass restarts over the smaller registry. The registry shrinks
    /// monotonically, so the pass terminates.
    pub fn load_all(&mut self) -> Result<(), ModuleSystemError> {
        'restart: loop {
            let order = self.ordered()?;
            for id in order {
                let Some(pos) = self.position(id) else { continue };
                let ModuleRegistry {
                    instances,
                    namespaces,
                    ..
                } = self;
                let instance = &mut instances[pos];
                let name = instance.manifest().name.clone();
                match instance.load(namespaces) {
                    Ok(Some(loader)) => {
                        self.loaders.insert(id, loader);
                    }
                    Ok(None) => {}
                    Err(e) => {
                        log::info!("Module '{}' failed to load: {}", name, e);
                        self.remove(id);
                        self.sweep(SweepPhase::Load);
                        continue 'restart;
                    }
                }
            }
            return Ok(());
        }
    }

    /// The enable pass: same restart-on-failure structure as the load
    /// pass, but the failing instance is additionally shut down before the
    /// sweep, to release anything its partial enable acquired. Logs the
    /// final enabled set.
    pub fn enable_all(&mut self) -> Result<(), ModuleSystemError> {
        'restart: loop {
            let order = self.ordered()?;
            for id in order {
                let Some(pos) = self.position(id) else { continue };
                let ModuleRegistry {
                    instances, loaders, ..
                } = self;
                if let Err(e) = instances[pos].enable(loaders) {
                    log::info!("{}", e);
                    if let Some(mut removed) = self.remove(id) {
                        removed.shutdown(&self.loaders);
                    }
                    self.sweep(SweepPhase::Enable);
                    continue 'restart;
                }
            }
            log::info!(
                "Modules {{{}}} have now been enabled.",
                self.module_names().join(", ")
            );
            return Ok(());
        }
    }

    /// Shut down every current instance. Order is unspecified and nothing
    /// here can fail; instances stay registered with status `Disabled` (or
    /// `None` if their hook failed).
    pub fn shutdown_all(&mut self) {
        let ModuleRegistry {
            instances, loaders, ..
        } = self;
        for instance in instances.iter_mut() {
            instance.shutdown(loaders);
        }
    }
}
