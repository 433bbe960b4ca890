//! # Atlas Core Module System
//!
//! Infrastructure for extending an Atlas host through manifest-described
//! module packages or modules compiled directly into the host process. It
//! covers the entire module lifecycle: discovery, manifest parsing,
//! dependency verification and ordering, the load and enable passes, the
//! expansion wiring between modules, and teardown.
//!
//! ## Key Submodules and Responsibilities:
//!
//! - **[`error`]**: The [`ModuleSystemError`](error::ModuleSystemError)
//!   taxonomy shared by every operation in this module.
//! - **[`expansion`]**: The typed expansion surface: [`Expansion`](expansion::Expansion)
//!   values contributed by modules and the [`ExpansionLoader`](expansion::ExpansionLoader)s
//!   that adopt them by declared type lineage.
//! - **[`instance`]**: [`ModuleInstance`](instance::ModuleInstance), the
//!   per-module lifecycle driver and status holder.
//! - **[`manager`]**: The central orchestrator ([`ModuleManager`]),
//!   coordinating discovery, the lifecycle passes and teardown.
//! - **[`manifest`]**: The package metadata document
//!   ([`ModuleManifest`]): name, entry symbols, version and dependencies.
//! - **[`namespace`]**: Isolated per-module symbol scopes with caching and
//!   one-hop cross-module fallback, plus the [`Symbol`](namespace::Symbol)
//!   registration model they resolve against.
//! - **[`registry`]**: [`ModuleRegistry`], the live instance collection and
//!   the dependency-sweep, load and enable passes over it.
//! - **[`store`]**: The [`PackageStore`](store::PackageStore) discovery
//!   seam and its directory-backed implementation.
//! - **[`traits`]**: The [`Module`] trait every module implements.
pub mod error;
pub mod expansion;
pub mod instance;
pub mod manager;
pub mod manifest;
pub mod namespace;
pub mod registry;
pub mod store;
pub mod traits;

pub use error::ModuleSystemError;
pub use expansion::{Expansion, ExpansionLoader, ExpansionTypeId};
pub use instance::{InstanceId, ModuleHandle, ModuleInstance, ModuleStatus};
pub use manager::{ModuleManager, PackagedEntry};
pub use manifest::ModuleManifest;
pub use namespace::{ModuleNamespace, Symbol, SymbolTable};
pub use registry::ModuleRegistry;
pub use store::{DirectoryPackageStore, PackageStore};
pub use traits::Module;
// Test module declaration
#[cfg(test)]
mod tests;
