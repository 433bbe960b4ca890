pub mod kernel;
pub mod module_system;

// Re-export key public types/traits for easier use by hosts and modules.
pub use kernel::error::Error as KernelError;
pub use kernel::{Host, HostMode};
pub use module_system::{
    Expansion, ExpansionLoader, Module, ModuleManager, ModuleManifest, ModuleSystemError,
    PackagedEntry,
};
