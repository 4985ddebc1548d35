// Copyright 2026 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use crate::condition::Condition;
use std::time::Duration;

/// A settable/clearable boolean signal with blocking wait, used to
/// coordinate startup (`wait_until_running`) and shutdown handshakes
/// between an owner scope and its hosted scope.
pub struct Event {
  condition: Condition<bool>,
}

impl Event {
  pub fn new() -> Self {
    Event {
      condition: Condition::new(false),
    }
  }

  pub fn set(&self) {
    *self.condition.lock() = true;
    self.condition.notify_all();
  }

  pub fn clear(&self) {
    *self.condition.lock() = false;
  }

  pub fn is_set(&self) -> bool {
    *self.condition.lock()
  }

  /// Blocks until the event is set, or `timeout` elapses. Returns whether
  /// the event was set when the wait ended.
  pub fn wait(&self, timeout: Duration) -> bool {
    let guard = self.condition.lock();
    let (_, set) = self.condition.wait_for(guard, timeout, |state| *state);
    set
  }
}

impl Default for Event {
  fn default() -> Self {
    Self::new()
  }
}
