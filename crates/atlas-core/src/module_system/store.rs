use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::kernel::constants;
use crate::module_system::error::ModuleSystemError;
use crate::module_system::manifest::ModuleManifest;
use crate::module_system::namespace::{ModuleNamespace, SymbolTable};

/// One candidate module package found by a store.
#[derive(Debug, Clone)]
pub struct PackageHandle {
    pub path: PathBuf,
}

impl PackageHandle {
    /// The package file name, used in diagnostics.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// The package file stem, the key under which exports are registered.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.file_name())
    }
}

/// Source of module packages, the external collaborator the manager
/// discovers from.
///
/// A store enumerates candidate packages and, per package, provides the
/// manifest document and an isolated symbol-resolution scope rooted at
/// that package with a given parent table.
pub trait PackageStore: Send + Sync {
    /// Enumerate candidate packages under the store root. Entries that are
    /// not recognized as packages are reported and skipped, never fatal to
    /// the run.
    fn enumerate(&self) -> Result<Vec<PackageHandle>, ModuleSystemError>;

    /// Read and parse the package's manifest document.
    fn read_manifest(&self, package: &PackageHandle) -> Result<ModuleManifest, ModuleSystemError>;

    /// Construct the package's isolated namespace with `parent` as the
    /// base symbol set of its default resolution chain.
    fn open_namespace(
        &self,
        package: &PackageHandle,
        parent: Arc<SymbolTable>,
    ) -> Result<ModuleNamespace, ModuleSystemError>;
}

/// File-backed store: a directory of `.module` JSON manifest files.
///
/// Per-package export tables are installed by explicit registration,
/// keyed by the package file stem; packages without registered exports
/// get an empty local scope and resolve through the parent table only.
pub struct DirectoryPackageStore {
    root: PathBuf,
    exports: HashMap<String, SymbolTable>,
}

impl DirectoryPackageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            exports: HashMap::new(),
        }
    }

    /// Install the symbol exports for the package whose file stem is
    /// `package`.
    pub fn with_exports(mut self, package: &str, table: SymbolTable) -> Self {
        self.exports.insert(package.to_string(), table);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl PackageStore for DirectoryPackageStore {
    fn enumerate(&self) -> Result<Vec<PackageHandle>, ModuleSystemError> {
        if !self.root.exists() {
            // Created eagerly; log macros skip disabled-level arguments.
            let created = fs::create_dir_all(&self.root).is_ok();
            log::info!(
                "Modules directory was {} created",
                if created { "successfully" } else { "not" }
            );
            return Ok(Vec::new());
        }

        let mut packages = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            let recognized = path.is_file()
                && path
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e == constants::PACKAGE_EXTENSION);
            if !recognized {
                log::info!(
                    "Failed to load '{}' as this is not a module package.",
                    path.file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| path.display().to_string())
                );
                continue;
            }
            packages.push(PackageHandle { path });
        }

        // Deterministic discovery order.
        packages.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(packages)
    }

    fn read_manifest(&self, package: &PackageHandle) -> Result<ModuleManifest, ModuleSystemError> {
        let contents = fs::read_to_string(&package.path).map_err(|e| {
            ModuleSystemError::ManifestError {
                path: package.path.clone(),
                message: "unreadable package manifest".to_string(),
                source: Some(Box::new(e)),
            }
        })?;
        ModuleManifest::parse(&package.path, &contents)
    }

    fn open_namespace(
        &self,
        package: &PackageHandle,
        parent: Arc<SymbolTable>,
    ) -> Result<ModuleNamespace, ModuleSystemError> {
        let exports = self
            .exports
            .get(&package.stem())
            .cloned()
            .unwrap_or_default();
        Ok(ModuleNamespace::new(&package.file_name(), exports, parent))
    }
}
