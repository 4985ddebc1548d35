// Copyright 2026 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use crate::record::LogRecordWire;
use muster_buffer::{ManagedQueue, Scope};
use std::sync::Arc;

/// The managed queue dedicated to logging: identical to
/// any other `ManagedQueue`, except `put` made outside of its scope is
/// silently discarded instead of raising `ProgrammingError`. Raising about
/// an out-of-scope log put would itself attempt to log, which would itself
/// attempt to put, livelocking the process — so this is the one named
/// exception in the whole transport layer.
pub struct LogQueue {
  inner: Arc<ManagedQueue<LogRecordWire>>,
}

impl LogQueue {
  pub fn new(name: impl Into<String>, capacity: usize) -> Self {
    LogQueue {
      inner: Arc::new(
        ManagedQueue::new_process(name, Box::new(muster_buffer::ProcessQueueTransport::new(capacity)))
          .new_silent_outside_scope(),
      ),
    }
  }

  pub fn enter_scope(&self) -> Scope<LogRecordWire> {
    self.inner.enter_scope()
  }

  /// Never fails: the underlying queue is built `silent_outside_scope`,
  /// so a put issued before any scope guard exists (or after the last
  /// one has dropped) is simply dropped rather than surfaced as an
  /// error the caller would have to handle from inside logging code.
  pub fn put(&self, record: LogRecordWire) {
    let _ = self.inner.put(record);
  }

  pub fn recv_timeout(&self, timeout: std::time::Duration) -> Option<LogRecordWire> {
    self.inner.recv_timeout(timeout)
  }
}
