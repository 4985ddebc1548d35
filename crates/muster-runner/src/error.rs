// Copyright 2026 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use muster_message::TraceableFailure;
use std::time::Duration;
use thiserror::Error;

/// Time a runner's scope exit gives a hosted scope to react to `Stop`
/// before escalating to `RunnerStillAlive`.
pub const DEFAULT_FINAL_JOIN_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum RunnerError {
  #[error("runner '{0}' has already been started")]
  AlreadyStarted(String),
  #[error("runner '{0}' has not been started")]
  NotStarted(String),
  #[error("timed out waiting for runner '{0}' to signal Started")]
  WaitUntilRunningTimeout(String),
  #[error("runner '{0}' did not stop within {1:?} of stop()")]
  RunnerStillAlive(String, Duration),
  #[error(transparent)]
  Runnable(#[from] TraceableFailure),
  #[error("failed to spawn hosted scope for runner '{0}': {1}")]
  Spawn(String, String),
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn already_started_message_names_the_runner() {
    let err = RunnerError::AlreadyStarted("Worker".to_string());
    assert_eq!(err.to_string(), "runner 'Worker' has already been started");
  }

  #[test]
  fn runner_still_alive_message_includes_the_timeout() {
    let err = RunnerError::RunnerStillAlive("Worker".to_string(), Duration::from_secs(5));
    assert!(err.to_string().contains("5s"));
  }

  #[test]
  fn wraps_a_traceable_failure_transparently() {
    let failure = TraceableFailure::capture("RuntimeError", "boom");
    let err: RunnerError = failure.clone().into();
    assert_eq!(err.to_string(), failure.to_string());
  }
}
