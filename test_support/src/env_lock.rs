//! Serialise environment mutations across tests.
//!
//! Configuration merging reads `STEPCHECK_*`, `NO_COLOR` and the config path
//! variable from the process environment. Tests that set any of them hold an
//! [`EnvLock`] so concurrently running tests never observe each other's
//! values.

use std::sync::{Mutex, MutexGuard};
use std::{fmt, fmt::Formatter};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// RAII guard that holds the global environment lock.
pub struct EnvLock {
    _guard: MutexGuard<'static, ()>,
}

impl fmt::Debug for EnvLock {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvLock").finish_non_exhaustive()
    }
}

impl EnvLock {
    /// Acquire the global lock, recovering it if a previous holder panicked.
    pub fn acquire() -> Self {
        let guard = ENV_LOCK
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Self { _guard: guard }
    }
}
