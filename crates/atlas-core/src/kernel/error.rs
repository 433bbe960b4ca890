//! # Atlas Core Kernel Errors
//!
//! Defines error types specific to the Atlas kernel.
//!
//! This module includes [`Error`], the primary enum encompassing errors that
//! can occur during host operations, such as bootstrapping failures or
//! anything the module system reports.
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::module_system::error::ModuleSystemError;

/// Top-level error type for an Atlas host.
#[derive(Debug, ThisError)]
pub enum Error {
    /// Specific, typed module system error
    #[error("Module system error: {0}")]
    ModuleSystem(#[from] ModuleSystemError),

    /// Error occurring during a specific host lifecycle phase.
    #[error("Kernel lifecycle error during {phase}: {message}")]
    KernelLifecycle {
        phase: KernelLifecyclePhase,
        message: String,
        #[source]
        source: Option<Box<Error>>,
    },

    /// I/O error while preparing the host environment
    #[error("I/O error during '{operation}': {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

/// Represents a specific phase in the host's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
pub enum KernelLifecyclePhase {
    #[error("Bootstrap")]
    Bootstrap,
    #[error("Initialize")]
    Initialize,
    #[error("Enable")]
    Enable,
    #[error("Shutdown")]
    Shutdown,
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}

impl Error {
    /// Helper to create an I/O error with operation context.
    pub fn io(source: std::io::Error, operation: impl Into<String>) -> Self {
        Error::Io {
            operation: operation.into(),
            source,
        }
    }
}
