// Copyright 2026 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use crate::condition::Condition;
use parking_lot::MutexGuard;
#[cfg(windows)]
use std::thread;
use std::time::Duration;
#[cfg(windows)]
use std::time::Instant;

/// On platforms whose native condition variable wait rounds to the coarse
/// scheduler tick (Windows historically rounds to about 16ms), a plain
/// `Condition::wait_for` overshoots short timeouts substantially. This
/// wraps `Condition` with a coarse wait followed by a short busy-poll tail
/// so the effective precision stays within `BUSY_POLL_INTERVAL` regardless
/// of platform.
///
/// On every other platform the busy-poll tail is skipped: the native wait
/// is already precise enough and the extra spinning would only waste CPU.
#[cfg(windows)]
const COARSE_WAIT_PRECISION: Duration = Duration::from_millis(16);
#[cfg(windows)]
const BUSY_POLL_INTERVAL: Duration = Duration::from_millis(1);

pub struct HighPrecisionCondition<T> {
  inner: Condition<T>,
}

impl<T> HighPrecisionCondition<T> {
  pub fn new(initial: T) -> Self {
    HighPrecisionCondition {
      inner: Condition::new(initial),
    }
  }

  pub fn lock(&self) -> MutexGuard<'_, T> {
    self.inner.lock()
  }

  pub fn notify_one(&self) {
    self.inner.notify_one();
  }

  pub fn notify_all(&self) {
    self.inner.notify_all();
  }

  #[cfg(not(windows))]
  pub fn wait_for<'a>(
    &self,
    guard: MutexGuard<'a, T>,
    timeout: Duration,
    predicate: impl FnMut(&T) -> bool,
  ) -> (MutexGuard<'a, T>, bool) {
    self.inner.wait_for(guard, timeout, predicate)
  }

  #[cfg(windows)]
  pub fn wait_for<'a>(
    &self,
    guard: MutexGuard<'a, T>,
    timeout: Duration,
    mut predicate: impl FnMut(&T) -> bool,
  ) -> (MutexGuard<'a, T>, bool) {
    let deadline = Instant::now() + timeout;
    let long_wait = timeout.saturating_sub(COARSE_WAIT_PRECISION);
    let (mut guard, _) = self.inner.wait_for(guard, long_wait, &mut predicate);
    while !predicate(&guard) {
      if Instant::now() >= deadline {
        break;
      }
      drop(guard);
      thread::sleep(BUSY_POLL_INTERVAL);
      guard = self.inner.lock();
    }
    let held = predicate(&guard);
    (guard, held)
  }
}
