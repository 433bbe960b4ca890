#![cfg(test)]

use std::any::Any;
use std::sync::{Arc, Mutex};

use crate::module_system::error::ModuleSystemError;
use crate::module_system::expansion::{Expansion, ExpansionLoader, ExpansionTypeId};
use crate::module_system::instance::{ModuleHandle, ModuleInstance};
use crate::module_system::manifest::ModuleManifest;
use crate::module_system::namespace::{ModuleNamespace, Symbol, SymbolTable};
use crate::module_system::traits::Module;

/// Shared chronological record of lifecycle hook invocations.
pub type EventLog = Arc<Mutex<Vec<String>>>;

pub fn event_log() -> EventLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn events(log: &EventLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

pub fn record(log: &EventLog, event: impl Into<String>) {
    log.lock().unwrap().push(event.into());
}

/// Which lifecycle hook of a test module should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    Nowhere,
    Load,
    Enable,
    Shutdown,
}

/// Scripted module recording its hook invocations into a shared log.
pub struct TestModule {
    name: String,
    log: EventLog,
    fail_at: FailAt,
    expansions: Vec<Arc<dyn Expansion>>,
}

impl TestModule {
    pub fn new(name: &str, log: &EventLog) -> Self {
        Self {
            name: name.to_string(),
            log: Arc::clone(log),
            fail_at: FailAt::Nowhere,
            expansions: Vec::new(),
        }
    }

    pub fn failing_at(mut self, fail_at: FailAt) -> Self {
        self.fail_at = fail_at;
        self
    }

    pub fn with_expansion(mut self, expansion: Arc<dyn Expansion>) -> Self {
        self.expansions.push(expansion);
        self
    }

    fn hook(&self, hook: &str, fails_here: bool) -> Result<(), ModuleSystemError> {
        record(&self.log, format!("{}:{}", self.name, hook));
        if fails_here {
            Err(ModuleSystemError::operation(
                &self.name,
                format!("scripted {} failure", hook),
            ))
        } else {
            Ok(())
        }
    }
}

impl Module for TestModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&mut self) -> Result<(), ModuleSystemError> {
        self.hook("load", self.fail_at == FailAt::Load)
    }

    fn enable(&mut self) -> Result<(), ModuleSystemError> {
        self.hook("enable", self.fail_at == FailAt::Enable)
    }

    fn shutdown(&mut self) -> Result<(), ModuleSystemError> {
        self.hook("shutdown", self.fail_at == FailAt::Shutdown)
    }

    fn expansions(&self) -> Vec<Arc<dyn Expansion>> {
        self.expansions.clone()
    }
}

/// Expansion with an explicitly declared type lineage.
pub struct TestExpansion {
    lineage: Vec<ExpansionTypeId>,
}

impl TestExpansion {
    pub fn new(lineage: &[&str]) -> Arc<dyn Expansion> {
        Arc::new(Self {
            lineage: lineage.iter().map(|id| ExpansionTypeId::new(id)).collect(),
        })
    }
}

impl Expansion for TestExpansion {
    fn type_lineage(&self) -> Vec<ExpansionTypeId> {
        self.lineage.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Loader recording its adopt/release invocations into a shared log.
pub struct RecordingLoader {
    name: String,
    accepts: ExpansionTypeId,
    log: EventLog,
    fail_enable: bool,
}

impl RecordingLoader {
    pub fn new(name: &str, accepts: &str, log: &EventLog) -> Self {
        Self {
            name: name.to_string(),
            accepts: ExpansionTypeId::new(accepts),
            log: Arc::clone(log),
            fail_enable: false,
        }
    }

    pub fn failing_enable(mut self) -> Self {
        self.fail_enable = true;
        self
    }
}

impl ExpansionLoader for RecordingLoader {
    fn name(&self) -> &str {
        &self.name
    }

    fn accepts(&self) -> ExpansionTypeId {
        self.accepts.clone()
    }

    fn enable(
        &self,
        instance: &ModuleHandle,
        _expansion: &dyn Expansion,
    ) -> Result<(), ModuleSystemError> {
        record(&self.log, format!("{}:adopt:{}", self.name, instance.name));
        if self.fail_enable {
            Err(ModuleSystemError::operation(
                &instance.name,
                format!("loader {} rejects everything", self.name),
            ))
        } else {
            Ok(())
        }
    }

    fn unload(&self, instance: &ModuleHandle, _expansion: &dyn Expansion) {
        record(&self.log, format!("{}:release:{}", self.name, instance.name));
    }
}

/// Exports table containing one module symbol under `entry` that
/// constructs a scripted [`TestModule`].
pub fn module_exports(entry: &str, name: &str, log: &EventLog, fail_at: FailAt) -> SymbolTable {
    let name = name.to_string();
    let log = Arc::clone(log);
    let mut exports = SymbolTable::new();
    exports.insert(Symbol::module(entry, move || {
        Box::new(TestModule::new(&name, &log).failing_at(fail_at))
    }));
    exports
}

/// A file-backed instance whose namespace exports a `main` symbol for a
/// scripted module, with an empty parent table.
pub fn file_instance(name: &str, deps: &[&str], log: &EventLog, fail_at: FailAt) -> ModuleInstance {
    let mut manifest = ModuleManifest::new(name, "main");
    for dep in deps {
        manifest = manifest.with_dependency(dep);
    }
    let exports = module_exports("main", name, log, fail_at);
    let namespace = Arc::new(ModuleNamespace::new(
        &format!("{}.module", name),
        exports,
        Arc::new(SymbolTable::new()),
    ));
    ModuleInstance::new(manifest, namespace)
}
