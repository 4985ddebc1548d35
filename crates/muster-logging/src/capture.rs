// Copyright 2026 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use crate::level::LogLevel;
use crate::record::LogRecordWire;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};

/// One named in-memory capture of records at or above `level`, the
/// Rust-native replacement for the original `CaptureLogs` test helper
/// (`puma/logging/logging.py`'s `add_memory_log_handler`). Populated by
/// whichever scope actually performs final dispatch — the owner's direct
/// sink before any out-of-process runner has activated, or the log
/// listener scope afterwards — so a capture sees records regardless of
/// which process emitted them.
pub struct MemoryCapture {
  level: LogLevel,
  paused: AtomicBool,
  records: Mutex<VecDeque<LogRecordWire>>,
}

impl MemoryCapture {
  pub fn new(level: LogLevel) -> Self {
    MemoryCapture {
      level,
      paused: AtomicBool::new(false),
      records: Mutex::new(VecDeque::new()),
    }
  }

  pub fn offer(&self, record: &LogRecordWire) {
    if self.paused.load(Ordering::SeqCst) {
      return;
    }
    if record.level < self.level {
      return;
    }
    self.records.lock().push_back(record.clone());
  }

  pub fn pause(&self) {
    self.paused.store(true, Ordering::SeqCst);
  }

  pub fn resume(&self) {
    self.paused.store(false, Ordering::SeqCst);
  }

  /// Removes and returns every record captured so far, in arrival order.
  pub fn pop_captured_records(&self) -> Vec<LogRecordWire> {
    self.records.lock().drain(..).collect()
  }
}
