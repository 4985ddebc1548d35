// Copyright 2026 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use muster_buffer::BufferError;
use muster_message::TraceableFailure;
use thiserror::Error;

/// The error a `Runnable::execute` may return. Any other panic is caught by
/// the hosting `Runner` and wrapped the same way (see `muster-runner`), so
/// this is the only error shape `execute` itself needs to produce.
#[derive(Error, Debug)]
pub enum RunnableError {
  #[error(transparent)]
  Failed(#[from] TraceableFailure),
  #[error(transparent)]
  Buffer(#[from] BufferError),
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn failed_wraps_a_traceable_failure_transparently() {
    let failure = TraceableFailure::capture("RuntimeError", "boom");
    let err: RunnableError = failure.clone().into();
    assert_eq!(err.to_string(), failure.to_string());
  }

  #[test]
  fn buffer_wraps_a_buffer_error_transparently() {
    let buffer_err = BufferError::QueueOutsideScope("commands".to_string());
    let rendered = buffer_err.to_string();
    let err: RunnableError = buffer_err.into();
    assert!(matches!(err, RunnableError::Buffer(_)));
    assert_eq!(err.to_string(), rendered);
  }
}
