// Copyright 2026 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use crate::queue::LogQueue;
use crate::record::LogRecordWire;
use log::LevelFilter;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// The `log::Log` behavior every hosted scope's records flow through once
/// the cross-process relay is active: enqueue onto the central log queue
/// rather than emit directly. Rust allows only one `log::Log` to ever be
/// installed per process, so rather than this being literally re-installed
/// per thread or process, `GlobalDispatchLogger` delegates a record to an
/// `EnqueueLogger` instance once relaying has activated; before that, it
/// dispatches directly instead. `max_level` is a snapshot of the owner's
/// effective configuration taken at activation time, so records below it
/// never reach the queue at all — this is what keeps an unbounded stream
/// of `debug!()` calls in a hosted scope from overflowing a bounded
/// `LogQueue`.
pub struct EnqueueLogger {
  queue: Arc<LogQueue>,
  max_level: AtomicU8,
}

impl EnqueueLogger {
  pub fn new(queue: Arc<LogQueue>, max_level: LevelFilter) -> Self {
    EnqueueLogger {
      queue,
      max_level: AtomicU8::new(max_level as u8),
    }
  }

  /// Lets a running scope's effective level be updated without
  /// reinstalling a whole new logger, mirroring the original's
  /// `_make_existing_loggers_act_as_currently_configured` applying a
  /// fresh level to loggers already in hand after an override call.
  pub fn set_max_level(&self, level: LevelFilter) {
    self.max_level.store(level as u8, Ordering::SeqCst);
  }

  pub fn max_level(&self) -> LevelFilter {
    match self.max_level.load(Ordering::SeqCst) {
      0 => LevelFilter::Off,
      1 => LevelFilter::Error,
      2 => LevelFilter::Warn,
      3 => LevelFilter::Info,
      4 => LevelFilter::Debug,
      _ => LevelFilter::Trace,
    }
  }

  pub fn enabled(&self, level: log::Level) -> bool {
    level <= self.max_level()
  }

  pub fn enqueue(&self, record: LogRecordWire) {
    self.queue.put(record);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::time::Duration;

  #[test]
  fn records_below_effective_level_are_never_enqueued() {
    let queue = Arc::new(LogQueue::new("q", 8));
    let _scope = queue.enter_scope();
    let logger = EnqueueLogger::new(Arc::clone(&queue), LevelFilter::Warn);

    assert!(!logger.enabled(log::Level::Debug));
    assert!(logger.enabled(log::Level::Warn));

    assert!(queue.recv_timeout(Duration::from_millis(20)).is_none());
  }

  #[test]
  fn enqueued_records_are_delivered() {
    let queue = Arc::new(LogQueue::new("q2", 8));
    let _scope = queue.enter_scope();
    let logger = EnqueueLogger::new(Arc::clone(&queue), LevelFilter::Trace);

    logger.enqueue(LogRecordWire {
      level: crate::level::LogLevel::Info,
      target: "t".to_string(),
      message: "hi".to_string(),
      module_path: None,
      file: None,
      line: None,
      process_tag: None,
    });

    assert!(queue.recv_timeout(Duration::from_secs(1)).is_some());
  }
}
