//! # Atlas Core Kernel Bootstrap
//!
//! Constructs and drives an Atlas host: the directory layout under the data
//! root, the embedded [`ModuleManager`], and the mode-specific
//! initialization entry points.
use std::fs;
use std::path::{Path, PathBuf};

use crate::kernel::constants;
use crate::kernel::error::{Error, KernelLifecyclePhase, Result};
use crate::module_system::manager::{ModuleManager, PackagedEntry};
use crate::module_system::namespace::SymbolTable;
use crate::module_system::store::{DirectoryPackageStore, PackageStore};

/// How the host embeds Atlas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostMode {
    /// Atlas runs as its own process and discovers module packages on disk.
    Standalone,
    /// Atlas is embedded in a larger application that discovers module
    /// packages on disk.
    Implementation,
    /// Atlas is embedded with its modules compiled into the host binary.
    Packaged,
}

impl std::fmt::Display for HostMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mode = match self {
            HostMode::Standalone => "standalone",
            HostMode::Implementation => "implementation",
            HostMode::Packaged => "packaged",
        };
        write!(f, "{}", mode)
    }
}

/// The host context owning the module manager and the on-disk layout.
///
/// Constructed once at startup and passed where needed; there is no global
/// instance. Which `init_*` entry point is valid depends on the mode the
/// host was constructed with: discovery modes reject packaged init and the
/// packaged mode rejects discovery, as a logged no-op.
pub struct Host {
    mode: HostMode,
    data_root: PathBuf,
    manager: ModuleManager,
}

impl Host {
    pub fn new(mode: HostMode, data_root: impl Into<PathBuf>) -> Self {
        Self::with_base_symbols(mode, data_root, SymbolTable::new())
    }

    /// A host whose base symbols are visible to every module namespace.
    pub fn with_base_symbols(
        mode: HostMode,
        data_root: impl Into<PathBuf>,
        base_symbols: SymbolTable,
    ) -> Self {
        let data_root = data_root.into();
        log::info!(
            "Initialising {} v{} in {} mode, data root '{}'",
            constants::APP_NAME,
            constants::APP_VERSION,
            mode,
            data_root.display()
        );
        Self {
            mode,
            data_root,
            manager: ModuleManager::with_base_symbols(base_symbols),
        }
    }

    pub fn mode(&self) -> HostMode {
        self.mode
    }

    pub fn data_root(&self) -> &Path {
        &self.data_root
    }

    pub fn manager(&self) -> &ModuleManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut ModuleManager {
        &mut self.manager
    }

    pub fn modules_dir(&self) -> PathBuf {
        self.data_root.join(constants::MODULES_DIR)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_root.join(constants::DATA_DIR)
    }

    pub fn configs_dir(&self) -> PathBuf {
        self.data_root.join(constants::CONFIGS_DIR)
    }

    /// The store a discovery-mode host reads packages from by default.
    pub fn default_store(&self) -> DirectoryPackageStore {
        DirectoryPackageStore::new(self.modules_dir())
    }

    /// Discover and load modules from a package store. Valid in the
    /// `Standalone` and `Implementation` modes only; in `Packaged` mode
    /// this is a logged no-op.
    pub fn init_discover(&mut self, store: &dyn PackageStore) -> Result<()> {
        if self.mode == HostMode::Packaged {
            log::info!("Host is in packaged mode, skipping module discovery.");
            return Ok(());
        }
        self.ensure_dir("module data", &self.data_dir())?;
        self.ensure_dir("configs", &self.configs_dir())?;
        self.manager.init_discover(store).map_err(|e| Error::KernelLifecycle {
            phase: KernelLifecyclePhase::Initialize,
            message: "module discovery failed".to_string(),
            source: Some(Box::new(e.into())),
        })
    }

    /// Load modules compiled into the host binary. Valid in `Packaged`
    /// mode only; in the discovery modes this is a logged no-op.
    pub fn init_packaged(&mut self, entries: Vec<PackagedEntry>) -> Result<()> {
        if self.mode != HostMode::Packaged {
            log::info!("Host is in {} mode, skipping packaged module loading.", self.mode);
            return Ok(());
        }
        self.ensure_dir("configs", &self.configs_dir())?;
        self.manager.init_packaged(entries).map_err(|e| Error::KernelLifecycle {
            phase: KernelLifecyclePhase::Initialize,
            message: "packaged module loading failed".to_string(),
            source: Some(Box::new(e.into())),
        })
    }

    /// Run the enable pass over everything loaded.
    pub fn enable(&mut self) -> Result<()> {
        self.manager.enable().map_err(|e| Error::KernelLifecycle {
            phase: KernelLifecyclePhase::Enable,
            message: "module enable pass failed".to_string(),
            source: Some(Box::new(e.into())),
        })
    }

    /// Tear everything down. Never fails.
    pub fn shutdown(&mut self) {
        log::info!("Shutting down {}.", constants::APP_NAME);
        self.manager.shutdown();
    }

    fn ensure_dir(&self, label: &str, path: &Path) -> Result<()> {
        if path.exists() {
            return Ok(());
        }
        match fs::create_dir_all(path) {
            Ok(()) => {
                log::info!("The {} directory was successfully created", label);
                Ok(())
            }
            Err(e) => {
                log::info!("The {} directory was not created", label);
                Err(Error::io(e, format!("create {} directory", label)))
            }
        }
    }
}
