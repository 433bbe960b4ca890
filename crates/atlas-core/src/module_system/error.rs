//! # Atlas Core Module System Errors
//!
//! Defines error types specific to the Atlas module system.
//!
//! This module includes [`ModuleSystemError`], the primary enum encompassing
//! errors that can occur during module orchestration: manifest parsing,
//! package discovery, symbol resolution, dependency resolution, and
//! lifecycle hook failures. The policy throughout the module system is
//! local containment: one module's failure removes that module (and its
//! dependents) and never aborts the whole orchestration pass.
use std::fmt;
use std::path::PathBuf;

/// The lifecycle step a module was executing when a hook failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    Load,
    Enable,
    Shutdown,
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecyclePhase::Load => write!(f, "load"),
            LifecyclePhase::Enable => write!(f, "enable"),
            LifecyclePhase::Shutdown => write!(f, "shutdown"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ModuleSystemError {
    #[error("Module manifest error for '{path}': {message}")]
    ManifestError {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Discovery error for '{path}': {message}")]
    DiscoveryError {
        path: PathBuf,
        message: String,
    },

    #[error("Symbol '{name}' not found in namespace '{namespace}'")]
    SymbolNotFound {
        name: String,
        namespace: String,
    },

    #[error("Symbol '{name}' is not a {expected} constructor")]
    EntryKindMismatch {
        name: String,
        expected: &'static str,
    },

    #[error("Module '{module}' failed during {phase}: {message}")]
    LifecycleError {
        module: String,
        phase: LifecyclePhase,
        message: String,
    },

    #[error("Circular module dependency involving: {}", .0.join(", "))]
    DependencyCycle(Vec<String>),

    #[error("Operation error in module '{module}': {message}", module = .module.as_deref().unwrap_or("<unknown>"))]
    OperationError {
        module: Option<String>,
        message: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ModuleSystemError {
    /// Wrap a hook failure with the owning module and lifecycle phase.
    pub fn lifecycle(module: &str, phase: LifecyclePhase, source: impl fmt::Display) -> Self {
        ModuleSystemError::LifecycleError {
            module: module.to_string(),
            phase,
            message: source.to_string(),
        }
    }

    /// Convenience constructor for module-authored hook errors.
    pub fn operation(module: &str, message: impl Into<String>) -> Self {
        ModuleSystemError::OperationError {
            module: Some(module.to_string()),
            message: message.into(),
        }
    }
}
