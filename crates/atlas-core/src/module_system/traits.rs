use std::sync::Arc;

use crate::module_system::error::ModuleSystemError;
use crate::module_system::expansion::Expansion;

/// Core trait that every module implements.
///
/// Hooks are driven strictly in lifecycle order by the manager:
/// `load` once per load pass, `enable` once per enable pass, `shutdown`
/// at teardown. Hooks return explicit results; a `load` or `enable`
/// failure removes the module from the registry, a `shutdown` failure is
/// reported and swallowed.
pub trait Module: Send + Sync {
    /// The declared module name. For packaged in-process modules this is
    /// also the name used for dependency matching.
    fn name(&self) -> &str;

    /// Acquire resources; runs before any module is enabled.
    fn load(&mut self) -> Result<(), ModuleSystemError>;

    /// Activate the module. Expansion wiring happens right after this hook
    /// returns successfully.
    fn enable(&mut self) -> Result<(), ModuleSystemError>;

    /// Release resources. Never propagates failure to the manager.
    fn shutdown(&mut self) -> Result<(), ModuleSystemError>;

    /// The expansions this module contributes for other modules' loaders
    /// to adopt. Queried after `enable` and again during shutdown.
    fn expansions(&self) -> Vec<Arc<dyn Expansion>> {
        Vec::new()
    }
}
