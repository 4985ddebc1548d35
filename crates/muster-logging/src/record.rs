// Copyright 2026 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use crate::level::LogLevel;
use serde::{Deserialize, Serialize};

/// A `log::Record`, flattened into an owned, serializable shape so it can
/// cross a real OS pipe on its way to the log listener scope — everything
/// a listener needs to re-emit the line as the owner would have. Captured
/// once, at the point `EnqueueLogger::log` runs, since a `log::Record`
/// itself borrows from the call site and cannot outlive it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecordWire {
  pub level: LogLevel,
  pub target: String,
  pub message: String,
  pub module_path: Option<String>,
  pub file: Option<String>,
  pub line: Option<u32>,
  /// A caller-supplied tag identifying which process emitted this record
  /// (e.g. "main" or a child's name), so the listener scope can label
  /// relayed output by origin once records from multiple processes are
  /// interleaved on one queue.
  pub process_tag: Option<String>,
}

impl LogRecordWire {
  pub fn from_record(record: &log::Record) -> Self {
    LogRecordWire {
      level: LogLevel::from(record.level()),
      target: record.target().to_string(),
      message: record.args().to_string(),
      module_path: record.module_path().map(str::to_string),
      file: record.file().map(str::to_string),
      line: record.line(),
      process_tag: None,
    }
  }

  pub fn with_process_tag(mut self, tag: impl Into<String>) -> Self {
    self.process_tag = Some(tag.into());
    self
  }
}
