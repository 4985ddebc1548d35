// Copyright 2026 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use crate::error::RunnerError;
use crate::state::RunnerState;
use muster_buffer::{Buffer, Scope};
use muster_message::{CommandMessage, StatusMessage, TraceableFailure};
use muster_primitives::Event;
use muster_runnable::RunnableError;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Converts a `Runnable::execute` failure into the `TraceableFailure` shape
/// that crosses the owner/hosted boundary, regardless of which of its two
/// causes (an explicit error, or a buffer misuse) produced it.
pub(crate) fn runnable_error_to_failure(err: RunnableError) -> TraceableFailure {
  match err {
    RunnableError::Failed(failure) => failure,
    RunnableError::Buffer(buffer_err) => TraceableFailure::capture("BufferError", buffer_err.to_string()),
  }
}

/// Converts an unwound panic payload from inside `execute()` into the same
/// `TraceableFailure` shape, so a runnable that panics is indistinguishable
/// from one that returned an error, from the owner's point of view.
pub(crate) fn panic_to_failure(panic: Box<dyn std::any::Any + Send>) -> TraceableFailure {
  let message = if let Some(s) = panic.downcast_ref::<&str>() {
    s.to_string()
  } else if let Some(s) = panic.downcast_ref::<String>() {
    s.clone()
  } else {
    "runnable panicked with a non-string payload".to_string()
  };
  TraceableFailure::capture("RunnablePanic", message)
}

/// State and buffers shared by `ThreadRunner` and `ProcessRunner`. Both hold
/// their own `Scope` guards on the owner side of the command and status
/// buffers for their whole lifetime, so the owner can `stop()`/enqueue
/// remote calls even before the hosted side has opened its own scope.
///
/// Public (rather than `pub(crate)`) because `muster-remote` builds its
/// `RemoteHandle`s against a `Weak<RunnerCore>` obtained from whichever
/// `Runner` owns the call: that is the "weak reference to the owning
/// Runner's liveness flag" a handle needs to fail locally once its source
/// has stopped, instead of enqueuing onto a buffer nobody drains anymore.
pub struct RunnerCore {
  name: String,
  state: Mutex<RunnerState>,
  command_buffer: Buffer<CommandMessage>,
  status_buffer: Buffer<StatusMessage>,
  _command_scope: Scope<CommandMessage>,
  _status_scope: Scope<StatusMessage>,
  captured_failure: Mutex<Option<TraceableFailure>>,
  pub(crate) completion: Event,
  stop_sent: AtomicBool,
}

impl RunnerCore {
  pub(crate) fn new_thread_backed(name: String) -> Self {
    let command_buffer = Buffer::new_thread(format!("{name}-commands"), 0);
    let status_buffer = Buffer::new_thread(format!("{name}-status"), 0);
    Self::wrap(name, command_buffer, status_buffer)
  }

  pub(crate) fn new_process_backed(name: String) -> Self {
    let command_buffer = Buffer::new_process(format!("{name}-commands"), 0);
    let status_buffer = Buffer::new_process(format!("{name}-status"), 0);
    Self::wrap(name, command_buffer, status_buffer)
  }

  fn wrap(name: String, command_buffer: Buffer<CommandMessage>, status_buffer: Buffer<StatusMessage>) -> Self {
    let _command_scope = command_buffer.publish();
    let _status_scope = status_buffer.subscribe();
    RunnerCore {
      name,
      state: Mutex::new(RunnerState::Fresh),
      command_buffer,
      status_buffer,
      _command_scope,
      _status_scope,
      captured_failure: Mutex::new(None),
      completion: Event::new(),
      stop_sent: AtomicBool::new(false),
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub(crate) fn state(&self) -> RunnerState {
    *self.state.lock()
  }

  pub(crate) fn set_state(&self, s: RunnerState) {
    *self.state.lock() = s;
  }

  /// Atomically checks this runner is `Fresh` and, if so, transitions it
  /// to `Starting`. The single call site for the "fails if already
  /// started" rule, so `start()` implementations never need their own
  /// lock-then-check-then-set dance.
  pub(crate) fn try_begin_start(&self) -> Result<(), RunnerError> {
    let mut state = self.state.lock();
    if *state != RunnerState::Fresh {
      return Err(RunnerError::AlreadyStarted(self.name.clone()));
    }
    *state = RunnerState::Starting;
    Ok(())
  }

  pub fn command_buffer(&self) -> &Buffer<CommandMessage> {
    &self.command_buffer
  }

  pub fn status_buffer(&self) -> &Buffer<StatusMessage> {
    &self.status_buffer
  }

  pub(crate) fn wait_until_running(&self, timeout: Duration) -> Result<(), RunnerError> {
    match self
      .status_buffer
      .wait_for(timeout, |m| matches!(m, StatusMessage::Started))
    {
      Some(_) => {
        self.set_state(RunnerState::Running);
        Ok(())
      }
      None => Err(RunnerError::WaitUntilRunningTimeout(self.name.clone())),
    }
  }

  /// Enqueues `Stop`. Repeated calls coalesce: only the first actually
  /// puts anything on the buffer.
  pub(crate) fn stop(&self) {
    if !self.stop_sent.swap(true, Ordering::SeqCst) {
      self.set_state(RunnerState::Stopping);
      let _ = self.command_buffer.put(CommandMessage::Stop);
    }
  }

  pub fn is_alive(&self) -> bool {
    matches!(
      self.state(),
      RunnerState::Starting | RunnerState::Running | RunnerState::Stopping
    )
  }

  pub(crate) fn check_for_exceptions(&self) -> Result<(), RunnerError> {
    match self.captured_failure.lock().clone() {
      Some(failure) => Err(RunnerError::Runnable(failure)),
      None => Ok(()),
    }
  }

  pub(crate) fn record_failure(&self, failure: TraceableFailure) {
    *self.captured_failure.lock() = Some(failure);
    self.set_state(RunnerState::Failed);
  }

  pub(crate) fn record_clean_stop(&self) {
    let mut state = self.state.lock();
    if *state != RunnerState::Failed {
      *state = RunnerState::Stopped;
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn panic_to_failure_preserves_a_string_payload() {
    let payload: Box<dyn std::any::Any + Send> = Box::new("kaboom".to_string());
    let failure = panic_to_failure(payload);
    assert!(failure.to_string().contains("kaboom"));
  }

  #[test]
  fn panic_to_failure_falls_back_for_non_string_payloads() {
    let payload: Box<dyn std::any::Any + Send> = Box::new(42i32);
    let failure = panic_to_failure(payload);
    assert!(failure.to_string().contains("non-string payload"));
  }

  #[test]
  fn runnable_error_to_failure_passes_through_an_explicit_failure() {
    let failure = TraceableFailure::capture("RuntimeError", "explicit");
    let converted = runnable_error_to_failure(RunnableError::Failed(failure.clone()));
    assert_eq!(converted.to_string(), failure.to_string());
  }

  #[test]
  fn try_begin_start_rejects_a_second_call() {
    let core = RunnerCore::new_thread_backed("Core".to_string());
    core.try_begin_start().unwrap();
    let err = core.try_begin_start().unwrap_err();
    assert!(matches!(err, RunnerError::AlreadyStarted(_)));
  }

  #[test]
  fn stop_only_enqueues_once_across_repeated_calls() {
    let core = RunnerCore::new_thread_backed("Core".to_string());
    core.try_begin_start().unwrap();
    core.set_state(RunnerState::Running);

    core.stop();
    core.stop();
    core.stop();

    let _sub = core.command_buffer().subscribe();
    assert!(core
      .command_buffer()
      .wait_for(Duration::from_millis(200), |m| matches!(m, CommandMessage::Stop))
      .is_some());
    assert!(core
      .command_buffer()
      .wait_for(Duration::from_millis(50), |m| matches!(m, CommandMessage::Stop))
      .is_none());
  }

  #[test]
  fn record_failure_wins_over_a_later_clean_stop() {
    let core = RunnerCore::new_thread_backed("Core".to_string());
    core.record_failure(TraceableFailure::capture("RuntimeError", "oops"));
    core.record_clean_stop();
    assert!(core.check_for_exceptions().is_err());
    assert_eq!(core.state(), RunnerState::Failed);
  }
}
