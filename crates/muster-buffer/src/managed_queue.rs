// Copyright 2026 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use crate::error::BufferError;
use crate::transport::Transport;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const THREAD_DISCARD_TIMEOUT: Duration = Duration::from_millis(0);
const PROCESS_DISCARD_TIMEOUT: Duration = Duration::from_millis(100);

/// A transport that may only be put into while at least one `Scope` guard
/// for it is held. Scope is reference-counted rather than boolean because a
/// `Buffer`'s publish side and its (possibly several, concurrently-calling)
/// subscribe sides each hold their own guard for the queue's whole
/// lifetime. Calling `put` outside scope is a programming error for every
/// queue except one built with `silent_outside_scope` set (the
/// log-dedicated queue in `muster-logging`, which must not raise in a
/// position that would itself try to log).
pub struct ManagedQueue<T: Send + 'static> {
  name: String,
  transport: parking_lot::Mutex<Box<dyn Transport<T>>>,
  scope_count: AtomicUsize,
  discard_timeout: Duration,
  silent_outside_scope: bool,
}

impl<T: Send + 'static> ManagedQueue<T> {
  pub fn new_thread(name: impl Into<String>, transport: Box<dyn Transport<T>>) -> Self {
    ManagedQueue {
      name: name.into(),
      transport: parking_lot::Mutex::new(transport),
      scope_count: AtomicUsize::new(0),
      discard_timeout: THREAD_DISCARD_TIMEOUT,
      silent_outside_scope: false,
    }
  }

  pub fn new_process(name: impl Into<String>, transport: Box<dyn Transport<T>>) -> Self {
    ManagedQueue {
      name: name.into(),
      transport: parking_lot::Mutex::new(transport),
      scope_count: AtomicUsize::new(0),
      discard_timeout: PROCESS_DISCARD_TIMEOUT,
      silent_outside_scope: false,
    }
  }

  /// Builds a queue that silently discards `put` calls made outside of
  /// scope instead of raising — the one named exception in this crate,
  /// reserved for the logging relay's dedicated queue.
  pub fn new_silent_outside_scope(mut self) -> Self {
    self.silent_outside_scope = true;
    self
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn is_in_scope(&self) -> bool {
    self.scope_count.load(Ordering::SeqCst) > 0
  }

  /// Enters scope for the lifetime of the returned guard. Once the last
  /// outstanding guard drops, drains any items still queued (bounded by
  /// this queue's per-pop discard timeout) and closes the transport.
  ///
  /// Takes `self` behind an `Arc` rather than a plain reference so the
  /// returned guard owns its share of the queue outright: a `Runner` can
  /// hold one as a plain struct field for its whole lifetime instead of
  /// threading a borrow through every type that outlives the call that
  /// created it.
  pub fn enter_scope(self: &Arc<Self>) -> Scope<T> {
    self.scope_count.fetch_add(1, Ordering::SeqCst);
    Scope {
      queue: Arc::clone(self),
    }
  }

  pub fn put(&self, item: T) -> Result<(), BufferError> {
    if !self.is_in_scope() {
      if self.silent_outside_scope {
        return Ok(());
      }
      return Err(BufferError::QueueOutsideScope(self.name.clone()));
    }
    self.transport
      .lock()
      .try_put(item)
      .map_err(|_| BufferError::Closed(self.name.clone()))
  }

  pub fn recv_timeout(&self, timeout: Duration) -> Option<T> {
    self.transport.lock().recv_timeout(timeout)
  }

  fn discard_queued_items(&self) {
    let transport = self.transport.lock();
    while transport.recv_timeout(self.discard_timeout).is_some() {}
  }

  fn close(&self) {
    self.discard_queued_items();
    self.transport.lock().close();
  }
}

/// RAII guard for one side (publish or subscribe) of a `ManagedQueue`'s
/// scope. On drop, decrements the scope count; when it reaches zero the
/// queue drains and closes its transport. Errors doing so would be printed
/// to stderr rather than logged, mirroring the log-recursion hazard that
/// motivates the same policy in `muster-logging`.
pub struct Scope<T: Send + 'static> {
  queue: Arc<ManagedQueue<T>>,
}

impl<T: Send + 'static> Drop for Scope<T> {
  fn drop(&mut self) {
    if self.queue.scope_count.fetch_sub(1, Ordering::SeqCst) == 1 {
      self.queue.close();
    }
  }
}
