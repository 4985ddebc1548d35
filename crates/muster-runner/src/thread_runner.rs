// Copyright 2026 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use crate::core::{panic_to_failure, runnable_error_to_failure, RunnerCore};
use crate::error::{RunnerError, DEFAULT_FINAL_JOIN_TIMEOUT};
use muster_runnable::{HostedScopeContext, Runnable, ScopeId};
use parking_lot::Mutex;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Hosts one `Runnable` on a dedicated OS thread within this process.
/// Identical public surface and state machine to `ProcessRunner`; the only
/// difference is where `execute()` actually runs.
pub struct ThreadRunner<R: Runnable + 'static> {
  core: Arc<RunnerCore>,
  runnable: Mutex<Option<R>>,
  join_handle: Mutex<Option<JoinHandle<()>>>,
}

impl<R: Runnable + 'static> ThreadRunner<R> {
  pub fn new(runnable: R) -> Self {
    let name = format!("ThreadRunner of {}", runnable.name());
    ThreadRunner {
      core: Arc::new(RunnerCore::new_thread_backed(name)),
      runnable: Mutex::new(Some(runnable)),
      join_handle: Mutex::new(None),
    }
  }

  pub fn get_name(&self) -> &str {
    self.core.name()
  }

  /// Weak handle onto this runner's shared core, for `muster-remote` to
  /// build `RemoteHandle`s against without extending this runner's own
  /// lifetime.
  pub fn remote_source(&self) -> std::sync::Weak<RunnerCore> {
    Arc::downgrade(&self.core)
  }

  /// Launches the hosted thread. Non-blocking; fails if this runner has
  /// already been started once.
  pub fn start(&self) -> Result<(), RunnerError> {
    self.core.try_begin_start()?;

    let mut runnable = self
      .runnable
      .lock()
      .take()
      .expect("start() already took the runnable out, in violation of the Fresh-state check above");
    let core = Arc::clone(&self.core);

    let handle = thread::Builder::new()
      .name(core.name().to_string())
      .spawn(move || {
        let _cmd_scope = core.command_buffer().subscribe();
        let _status_scope = core.status_buffer().publish();
        let ctx = HostedScopeContext::new(Some(core.command_buffer()), core.status_buffer(), ScopeId::Hosted);

        let result = catch_unwind(AssertUnwindSafe(|| runnable.execute(&ctx)));
        runnable.on_stop();
        match result {
          Ok(Ok(())) => core.record_clean_stop(),
          Ok(Err(err)) => core.record_failure(runnable_error_to_failure(err)),
          Err(panic) => core.record_failure(panic_to_failure(panic)),
        }
        core.completion.set();
      })
      .map_err(|e| RunnerError::Spawn(self.core.name().to_string(), e.to_string()))?;

    *self.join_handle.lock() = Some(handle);
    Ok(())
  }

  pub fn wait_until_running(&self, timeout: Duration) -> Result<(), RunnerError> {
    self.core.wait_until_running(timeout)
  }

  pub fn start_blocking(&self, timeout: Duration) -> Result<(), RunnerError> {
    self.start()?;
    self.wait_until_running(timeout)
  }

  pub fn stop(&self) {
    self.core.stop();
  }

  pub fn is_alive(&self) -> bool {
    self.core.is_alive()
  }

  pub fn check_for_exceptions(&self) -> Result<(), RunnerError> {
    self.core.check_for_exceptions()
  }

  /// Blocks until the hosted thread's completion event fires, or
  /// `timeout` elapses. Never itself returns an error; query `is_alive()`
  /// to tell a timeout apart from a real stop.
  pub fn join(&self, timeout: Duration) {
    if self.core.completion.wait(timeout) {
      if let Some(handle) = self.join_handle.lock().take() {
        let _ = handle.join();
      }
    }
  }

  /// Runs the full termination protocol: `stop()`, wait up to `timeout`,
  /// fail with `RunnerStillAlive` if the thread is still running. Safe to
  /// call more than once.
  pub fn close(&self, timeout: Duration) -> Result<(), RunnerError> {
    if !self.core.is_alive() {
      return Ok(());
    }
    self.core.stop();
    self.join(timeout);
    if self.core.is_alive() {
      return Err(RunnerError::RunnerStillAlive(self.core.name().to_string(), timeout));
    }
    Ok(())
  }
}

impl<R: Runnable + 'static> Drop for ThreadRunner<R> {
  fn drop(&mut self) {
    if let Err(err) = self.close(DEFAULT_FINAL_JOIN_TIMEOUT) {
      log::error!("{err}");
    }
  }
}
