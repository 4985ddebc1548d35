// Copyright 2026 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use parking_lot::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// A condition variable paired with the mutex that guards the state callers
/// wait on, mirroring the Python `threading.Condition` API this crate's
/// callers are ported from: `wait`, `wait_for` with a deadline, and
/// `notify`/`notify_all`. Generic over the guarded state `T` so a command
/// queue's "not empty" flag and a runner's "alive" flag can each live
/// inside their own `Condition` without a separate bookkeeping mutex.
pub struct Condition<T> {
  state: Mutex<T>,
  condvar: Condvar,
}

impl<T> Condition<T> {
  pub fn new(initial: T) -> Self {
    Condition {
      state: Mutex::new(initial),
      condvar: Condvar::new(),
    }
  }

  pub fn lock(&self) -> MutexGuard<'_, T> {
    self.state.lock()
  }

  pub fn wait<'a>(&self, guard: &mut MutexGuard<'a, T>) {
    self.condvar.wait(guard);
  }

  /// Waits until `predicate(&state)` holds or `timeout` elapses. Returns
  /// whether the predicate held when the wait ended.
  pub fn wait_for<'a>(
    &self,
    mut guard: MutexGuard<'a, T>,
    timeout: Duration,
    mut predicate: impl FnMut(&T) -> bool,
  ) -> (MutexGuard<'a, T>, bool) {
    let deadline = Instant::now() + timeout;
    while !predicate(&guard) {
      let now = Instant::now();
      if now >= deadline {
        let held = predicate(&guard);
        return (guard, held);
      }
      let result = self.condvar.wait_for(&mut guard, deadline - now);
      if result.timed_out() && !predicate(&guard) {
        return (guard, false);
      }
    }
    (guard, true)
  }

  pub fn notify_one(&self) {
    self.condvar.notify_one();
  }

  pub fn notify_all(&self) {
    self.condvar.notify_all();
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::Arc;
  use std::thread;

  #[test]
  fn wait_for_returns_true_once_predicate_holds() {
    let condition = Arc::new(Condition::new(false));
    let waiter = Arc::clone(&condition);
    let handle = thread::spawn(move || {
      let guard = waiter.lock();
      let (_, held) = waiter.wait_for(guard, Duration::from_secs(1), |ready| *ready);
      held
    });

    thread::sleep(Duration::from_millis(20));
    *condition.lock() = true;
    condition.notify_all();

    assert!(handle.join().unwrap());
  }

  #[test]
  fn wait_for_times_out_when_predicate_never_holds() {
    let condition = Condition::new(false);
    let guard = condition.lock();
    let (_, held) = condition.wait_for(guard, Duration::from_millis(20), |ready| *ready);
    assert!(!held);
  }

  #[test]
  fn wait_for_returns_immediately_when_predicate_already_holds() {
    let condition = Condition::new(true);
    let guard = condition.lock();
    let start = Instant::now();
    let (_, held) = condition.wait_for(guard, Duration::from_secs(5), |ready| *ready);
    assert!(held);
    assert!(start.elapsed() < Duration::from_millis(500));
  }
}
