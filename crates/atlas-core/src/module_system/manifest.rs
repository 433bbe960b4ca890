use std::path::Path;

use serde::Deserialize;

use crate::module_system::error::ModuleSystemError;

/// Static metadata describing one module package.
///
/// Parsed once per package from its JSON manifest document. The `name` is
/// the unique identity used for dependency matching; comparison is always
/// case-insensitive. `main` names the symbol that constructs the module's
/// live object, `loader` optionally names a bundled expansion-loader
/// symbol, and `dependency` lists the names of modules this one requires.
#[derive(Debug, Clone, Deserialize)]
pub struct ModuleManifest {
    pub name: String,

    /// Symbol name of the module's main entry constructor.
    pub main: String,

    /// Symbol name of a bundled expansion-loader constructor, if any.
    #[serde(default)]
    pub loader: Option<String>,

    #[serde(default)]
    pub version: Option<String>,

    /// Source URL of the module, informational only.
    #[serde(default)]
    pub url: Option<String>,

    /// Names of modules this module depends on, in declaration order.
    #[serde(default, rename = "dependency")]
    pub dependencies: Vec<String>,
}

impl ModuleManifest {
    /// Create a minimal manifest, e.g. for a packaged in-process module.
    pub fn new(name: &str, main: &str) -> Self {
        Self {
            name: name.to_string(),
            main: main.to_string(),
            loader: None,
            version: None,
            url: None,
            dependencies: Vec::new(),
        }
    }

    /// Set the loader entry symbol.
    pub fn with_loader(mut self, loader: &str) -> Self {
        self.loader = Some(loader.to_string());
        self
    }

    /// Set the declared version string.
    pub fn with_version(mut self, version: &str) -> Self {
        self.version = Some(version.to_string());
        self
    }

    /// Add a dependency by module name.
    pub fn with_dependency(mut self, name: &str) -> Self {
        self.dependencies.push(name.to_string());
        self
    }

    /// Parse a manifest from the JSON contents of a package, reporting the
    /// package path in any diagnostic.
    pub fn parse(path: &Path, contents: &str) -> Result<Self, ModuleSystemError> {
        let manifest: ModuleManifest =
            serde_json::from_str(contents).map_err(|e| ModuleSystemError::ManifestError {
                path: path.to_path_buf(),
                message: format!("invalid manifest JSON: {}", e),
                source: Some(Box::new(e)),
            })?;

        if manifest.name.trim().is_empty() {
            return Err(ModuleSystemError::ManifestError {
                path: path.to_path_buf(),
                message: "manifest is missing a module name".to_string(),
                source: None,
            });
        }
        if manifest.main.trim().is_empty() {
            return Err(ModuleSystemError::ManifestError {
                path: path.to_path_buf(),
                message: "manifest is missing a main entry symbol".to_string(),
                source: None,
            });
        }

        // Version strings are informational; a non-semver value is worth a
        // warning but never rejects the package.
        if let Some(version) = &manifest.version {
            if semver::Version::parse(version).is_err() {
                log::warn!(
                    "Module '{}' declares a non-semver version '{}'",
                    manifest.name,
                    version
                );
            }
        }

        Ok(manifest)
    }

    /// Case-insensitive name comparison, the identity rule for modules.
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Whether this module declares a dependency on `name`.
    pub fn depends_on(&self, name: &str) -> bool {
        self.dependencies.iter().any(|d| d.eq_ignore_ascii_case(name))
    }
}
