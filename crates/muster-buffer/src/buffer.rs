// Copyright 2026 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use crate::managed_queue::{ManagedQueue, Scope};
use crate::transport::{ProcessQueueTransport, ThreadQueueTransport};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A scoped transport shared by one publisher and any number of concurrent
/// waiters looking for a specific message within it (distinguished, for
/// instance, by a `call_id`). A message popped by a waiter it wasn't
/// looking for is held in `pending` rather than dropped, so a second
/// waiter polling the same buffer still finds it.
pub struct Buffer<T: Send + 'static> {
  queue: Arc<ManagedQueue<T>>,
  pending: parking_lot::Mutex<VecDeque<T>>,
}

impl<T: Send + 'static> Buffer<T> {
  pub fn new_thread(name: impl Into<String>, capacity: usize) -> Self {
    Buffer {
      queue: Arc::new(ManagedQueue::new_thread(
        name,
        Box::new(ThreadQueueTransport::new(capacity)),
      )),
      pending: parking_lot::Mutex::new(VecDeque::new()),
    }
  }

  /// Same contract as `new_thread`, backed by the cross-process transport
  /// variant instead — used by a `muster_runner::ProcessRunner`'s command
  /// and status buffers. Items must be (de)serializable, since they cross
  /// a real OS pipe between the owner process and the forked hosted one.
  pub fn new_process(name: impl Into<String>, capacity: usize) -> Self
  where
    T: serde::Serialize + serde::de::DeserializeOwned,
  {
    Buffer {
      queue: Arc::new(ManagedQueue::new_process(
        name,
        Box::new(ProcessQueueTransport::new(capacity)),
      )),
      pending: parking_lot::Mutex::new(VecDeque::new()),
    }
  }

  pub fn publish(&self) -> Scope<T> {
    self.queue.enter_scope()
  }

  pub fn subscribe(&self) -> Scope<T> {
    self.queue.enter_scope()
  }

  pub fn put(&self, item: T) -> Result<(), crate::error::BufferError> {
    self.queue.put(item)
  }

  /// Blocks until an item for which `matches` returns true arrives, or
  /// `timeout` elapses. Items that do not match are kept in internal
  /// pending storage for other callers of this method.
  pub fn wait_for(&self, timeout: Duration, mut matches: impl FnMut(&T) -> bool) -> Option<T> {
    {
      let mut pending = self.pending.lock();
      if let Some(pos) = pending.iter().position(&mut matches) {
        return pending.remove(pos);
      }
    }

    let deadline = Instant::now() + timeout;
    loop {
      let now = Instant::now();
      if now >= deadline {
        return None;
      }
      let remaining = deadline - now;
      match self.queue.recv_timeout(remaining) {
        Some(item) => {
          if matches(&item) {
            return Some(item);
          }
          self.pending.lock().push_back(item);
        }
        None => return None,
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn wait_for_matches_the_right_item_and_holds_the_rest_for_later() {
    let buffer: Buffer<i32> = Buffer::new_thread("buf", 0);
    let _pub_scope = buffer.publish();
    let _sub_scope = buffer.subscribe();

    buffer.put(1).unwrap();
    buffer.put(2).unwrap();
    buffer.put(3).unwrap();

    let found = buffer.wait_for(Duration::from_secs(1), |v| *v == 2);
    assert_eq!(found, Some(2));

    // 1 and 3 were held in `pending`, not dropped, for a later waiter.
    let first = buffer.wait_for(Duration::from_secs(1), |_| true).unwrap();
    let second = buffer.wait_for(Duration::from_secs(1), |_| true).unwrap();
    assert_eq!(vec![first, second].into_iter().collect::<std::collections::HashSet<_>>(), [1, 3].into());
  }

  #[test]
  fn wait_for_times_out_when_nothing_matches() {
    let buffer: Buffer<i32> = Buffer::new_thread("buf2", 0);
    let _pub_scope = buffer.publish();
    let _sub_scope = buffer.subscribe();

    buffer.put(5).unwrap();
    assert_eq!(buffer.wait_for(Duration::from_millis(50), |v| *v == 999), None);
  }
}
