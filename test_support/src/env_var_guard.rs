//! Guard for temporarily modifying environment variables in tests.
//!
//! `std::env::set_var` and `remove_var` are `unsafe` in Rust 2024 because they
//! mutate process-global state. Acquire an [`EnvLock`](crate::env_lock::EnvLock)
//! before calling the constructors. The guard restores the previous value on
//! drop.
//!
//! ```rust,ignore
//! use test_support::{EnvLock, EnvVarGuard};
//!
//! let _lock = EnvLock::acquire();
//! let _emoji = EnvVarGuard::set("STEPCHECK_NO_EMOJI", "1");
//! let _color = EnvVarGuard::remove("NO_COLOR");
//! ```
use std::ffi::{OsStr, OsString};

/// RAII guard that resets an environment variable to its previous value on drop.
#[derive(Debug)]
pub struct EnvVarGuard {
    name: String,
    prev: Option<OsString>,
}

impl EnvVarGuard {
    /// Set `name` to `value`, returning a guard that restores the prior value.
    ///
    /// Callers must hold an [`EnvLock`](crate::env_lock::EnvLock).
    #[must_use]
    pub fn set(name: impl Into<String>, value: impl AsRef<OsStr>) -> Self {
        let name = name.into();
        let prev = std::env::var_os(&name);
        // SAFETY: `EnvLock` serialises mutations of the process environment.
        unsafe { std::env::set_var(&name, value) };
        Self { name, prev }
    }

    /// Remove `name`, returning a guard that restores the prior value.
    ///
    /// Callers must hold an [`EnvLock`](crate::env_lock::EnvLock).
    #[must_use]
    pub fn remove(name: impl Into<String>) -> Self {
        let name = name.into();
        let prev = std::env::var_os(&name);
        // SAFETY: `EnvLock` serialises mutations of the process environment.
        unsafe { std::env::remove_var(&name) };
        Self { name, prev }
    }

    /// Variable this guard restores.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        // SAFETY: `EnvLock` serialises mutations while the prior value is
        // restored.
        unsafe {
            match self.prev.take() {
                Some(value) => std::env::set_var(&self.name, value),
                None => std::env::remove_var(&self.name),
            }
        }
    }
}
