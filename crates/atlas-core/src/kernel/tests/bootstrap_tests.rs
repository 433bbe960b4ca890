#![cfg(test)]

use std::fs;
use std::sync::{Arc, Mutex};

use tempfile::tempdir;

use crate::kernel::bootstrap::{Host, HostMode};
use crate::kernel::constants;
use crate::module_system::error::ModuleSystemError;
use crate::module_system::manager::PackagedEntry;
use crate::module_system::traits::Module;

/// Minimal module recording whether its hooks ran.
struct MarkerModule {
    name: String,
    loaded: Arc<Mutex<bool>>,
}

impl MarkerModule {
    fn new(name: &str, loaded: &Arc<Mutex<bool>>) -> Self {
        Self {
            name: name.to_string(),
            loaded: Arc::clone(loaded),
        }
    }
}

impl Module for MarkerModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&mut self) -> Result<(), ModuleSystemError> {
        *self.loaded.lock().unwrap() = true;
        Ok(())
    }

    fn enable(&mut self) -> Result<(), ModuleSystemError> {
        Ok(())
    }

    fn shutdown(&mut self) -> Result<(), ModuleSystemError> {
        Ok(())
    }
}

#[test]
fn test_host_mode_display() {
    assert_eq!(HostMode::Standalone.to_string(), "standalone");
    assert_eq!(HostMode::Implementation.to_string(), "implementation");
    assert_eq!(HostMode::Packaged.to_string(), "packaged");
}

#[test]
fn test_host_directory_layout() {
    let dir = tempdir().unwrap();
    let host = Host::new(HostMode::Standalone, dir.path());

    assert_eq!(host.mode(), HostMode::Standalone);
    assert_eq!(host.data_root(), dir.path());
    assert_eq!(host.modules_dir(), dir.path().join(constants::MODULES_DIR));
    assert_eq!(host.data_dir(), dir.path().join(constants::DATA_DIR));
    assert_eq!(host.configs_dir(), dir.path().join(constants::CONFIGS_DIR));
}

#[test]
fn test_standalone_discovery_creates_layout() {
    let dir = tempdir().unwrap();
    let mut host = Host::new(HostMode::Standalone, dir.path());
    let store = host.default_store();
    host.init_discover(&store).unwrap();

    assert!(host.data_dir().is_dir());
    assert!(host.configs_dir().is_dir());
    assert!(host.modules_dir().is_dir());
    assert!(host.manager().is_initialised());
    assert!(host.manager().registry().is_empty());
}

#[test]
fn test_discovery_loads_packages_from_modules_dir() {
    let dir = tempdir().unwrap();
    let mut host = Host::new(HostMode::Implementation, dir.path());
    fs::create_dir_all(host.modules_dir()).unwrap();
    fs::write(
        host.modules_dir().join("ghostly.module"),
        r#"{"name": "ghostly", "main": "nope"}"#,
    )
    .unwrap();

    let store = host.default_store();
    host.init_discover(&store).unwrap();
    // The package was discovered but its entry is unresolvable, so it was
    // skipped rather than aborting initialization.
    assert!(host.manager().registry().is_empty());
}

#[test]
fn test_packaged_host_ignores_discovery() {
    let dir = tempdir().unwrap();
    let mut host = Host::new(HostMode::Packaged, dir.path());
    let store = host.default_store();
    host.init_discover(&store).unwrap();

    assert!(!host.manager().is_initialised());
    // No layout is prepared for a discovery that never ran.
    assert!(!host.data_dir().exists());
}

#[test]
fn test_discovery_host_ignores_packaged_init() {
    let dir = tempdir().unwrap();
    let loaded = Arc::new(Mutex::new(false));
    let mut host = Host::new(HostMode::Standalone, dir.path());
    host.init_packaged(vec![PackagedEntry::new(Box::new(MarkerModule::new(
        "builtin", &loaded,
    )))])
    .unwrap();

    assert!(!host.manager().is_initialised());
    assert!(!*loaded.lock().unwrap());
}

#[test]
fn test_packaged_init_runs_lifecycle() {
    let dir = tempdir().unwrap();
    let loaded = Arc::new(Mutex::new(false));
    let mut host = Host::new(HostMode::Packaged, dir.path());
    host.init_packaged(vec![PackagedEntry::new(Box::new(MarkerModule::new(
        "builtin", &loaded,
    )))])
    .unwrap();
    host.enable().unwrap();
    host.shutdown();

    assert!(*loaded.lock().unwrap());
    assert!(host.configs_dir().is_dir());
    assert_eq!(host.manager().registry().instance_count(), 1);
}
