// Copyright 2026 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use parking_lot::{Mutex, MutexGuard};

/// A lockable mutex used directly by callers that just need mutual
/// exclusion, and as the backing store for `Condition`.
pub struct Lock {
  inner: Mutex<()>,
}

impl Lock {
  pub fn new() -> Self {
    Lock { inner: Mutex::new(()) }
  }

  pub fn acquire(&self) -> MutexGuard<'_, ()> {
    self.inner.lock()
  }

  pub fn with_lock<R>(&self, f: impl FnOnce() -> R) -> R {
    let _guard = self.acquire();
    f()
  }
}

impl Default for Lock {
  fn default() -> Self {
    Self::new()
  }
}
