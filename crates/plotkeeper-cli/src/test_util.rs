//! Helpers shared by the unit tests in this crate.

use std::sync::{Mutex, MutexGuard};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Serialize tests that read or mutate process environment variables.
///
/// A test that panicked while holding the lock must not fail every later
/// test, so poisoning is ignored.
pub fn lock_env() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
