//! Shared helpers for stepcheck's integration and behavioural tests.
//!
//! - [`env_lock::EnvLock`] and [`env_var_guard::EnvVarGuard`] serialise and
//!   undo environment mutations.
//! - [`workspace::StepWorkspace`] lays out step sources and sentence catalogs
//!   in a temporary directory.
//! - [`error::display_error_chain`] flattens error chains for assertions.

pub mod env_lock;
pub mod env_var_guard;
pub mod error;
pub mod workspace;

pub use env_lock::EnvLock;
pub use env_var_guard::EnvVarGuard;
pub use workspace::StepWorkspace;
