//! # Atlas Core Kernel
//!
//! The `kernel` module forms the heart of the `atlas-core` framework. It is
//! responsible for bootstrapping a host, owning the module manager, and
//! providing the system-wide constants and error types the rest of the
//! crate builds on.
//!
//! ## Key Responsibilities & Components:
//!
//! - **Host Bootstrapping**: The [`Host`](bootstrap::Host) struct in the
//!   `bootstrap` submodule constructs the data-root layout and drives the
//!   mode-specific initialization entry points.
//! - **Core Constants**: System-wide constants via the `constants` submodule.
//! - **Error Handling**: Kernel-specific error types ([`Error`](error::Error))
//!   and a `Result` type alias in the `error` submodule.
pub mod bootstrap;
pub mod constants;
pub mod error;

pub use bootstrap::{Host, HostMode};
pub use error::{Error, Result};
// Test module declaration
#[cfg(test)]
mod tests;
