// Copyright 2026 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use muster_message::TraceableFailure;
use std::time::Duration;
use thiserror::Error;

/// Everything that can go wrong issuing a remote call, distinguished from
/// `TraceableFailure` (a failure *inside* the target's handler) by the fact
/// that these are all caught locally, before (or instead of) anything being
/// dispatched at all.
#[derive(Error, Debug)]
pub enum ProgrammingError {
  #[error("signature mismatch calling '{0}': {1}")]
  SignatureMismatch(String, String),
  #[error("source runner for '{0}' has already stopped")]
  SourceRunnerStopped(String),
  #[error("timed out after {1:?} waiting for a response to '{0}'")]
  Timeout(String, Duration),
  #[error(transparent)]
  Buffer(#[from] muster_buffer::BufferError),
  #[error(transparent)]
  Remote(#[from] TraceableFailure),
}
