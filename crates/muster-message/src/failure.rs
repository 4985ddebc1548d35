// Copyright 2026 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use backtrace::Backtrace;
use std::fmt;

/// A failure that has crossed, or is about to cross, a scope or process
/// boundary. The originating `Backtrace` does not survive the crossing, so
/// it is rendered to a string eagerly at capture time rather than carried
/// as a live object.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TraceableFailure {
  pub type_name: String,
  pub message: String,
  pub rendered_traceback: String,
}

impl TraceableFailure {
  /// Captures a failure at the point it was raised. `type_name` is a
  /// short, stable label (e.g. the error enum's variant name) rather than
  /// a `std::any::type_name` dump, since the latter is not guaranteed
  /// stable across compiler versions and would leak internal module
  /// paths into logs readers can't act on.
  pub fn capture(type_name: impl Into<String>, message: impl Into<String>) -> Self {
    TraceableFailure {
      type_name: type_name.into(),
      message: message.into(),
      rendered_traceback: format!("{:?}", Backtrace::new()),
    }
  }

  /// Combines a failure observed on the far side of a boundary with the
  /// traceback of the call that crossed it, so the final rendering shows
  /// both halves of the journey instead of only the remote half.
  pub fn combine_with_local_context(mut self, local_context: &str) -> Self {
    self.rendered_traceback = format!(
      "{}\n--- crossed scope boundary ---\n{}",
      self.rendered_traceback, local_context
    );
    self
  }
}

impl fmt::Display for TraceableFailure {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}: {}", self.type_name, self.message)
  }
}

impl std::error::Error for TraceableFailure {}
