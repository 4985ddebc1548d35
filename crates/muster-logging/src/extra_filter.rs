// Copyright 2026 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use crate::record::LogRecordWire;

/// Formats the `module.function:line`-style location string the original
/// `ExtraFilter` (`puma/logging/extra_filter.py`) injects into every
/// record so a logging config's format string can reference it. There is
/// no live config-file format-string interpolation in this port (format
/// strings are not part of `LoggingConfig`), so this is exposed as a
/// plain helper the listener's rendering can call, rather than a `log::Log`
/// wrapper trapping every record.
pub fn module_function_line(record: &LogRecordWire) -> String {
  let module = record.module_path.as_deref().unwrap_or("<unknown>");
  let line = record.line.map(|l| l.to_string()).unwrap_or_else(|| "?".to_string());
  format!("{module}:{line}")
}
