// Copyright 2026 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use crate::activation::{note_process_runner_started, note_process_runner_stopped};
use crate::core::{panic_to_failure, runnable_error_to_failure, RunnerCore};
use crate::error::{RunnerError, DEFAULT_FINAL_JOIN_TIMEOUT};
use muster_message::{CallId, RemoteOutcome, StatusMessage};
use muster_process::ForkedChild;
use muster_runnable::{HostedScopeContext, Runnable, ScopeId};
use nix::sys::wait::waitpid;
use nix::unistd::{fork, ForkResult, Pid};
use parking_lot::Mutex;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// How long the waiter thread gives the status buffer to deliver the
/// hosted process's own completion message after `waitpid` observes the
/// child has already exited. Generous relative to the pipe's local-host
/// latency, never user-visible on the happy path.
const COMPLETION_MESSAGE_GRACE: Duration = Duration::from_millis(500);

/// Hosts one `Runnable` in a freshly forked OS process. Identical public
/// surface and state machine to `ThreadRunner`; the only differences are
/// where `execute()` actually runs and how its outcome is observed.
pub struct ProcessRunner<R: Runnable + 'static> {
  core: Arc<RunnerCore>,
  runnable: Mutex<Option<R>>,
  child: Mutex<Option<ForkedChild>>,
  waiter_handle: Mutex<Option<JoinHandle<()>>>,
}

impl<R: Runnable + 'static> ProcessRunner<R> {
  pub fn new(runnable: R) -> Self {
    let name = format!("ProcessRunner of {}", runnable.name());
    ProcessRunner {
      core: Arc::new(RunnerCore::new_process_backed(name)),
      runnable: Mutex::new(Some(runnable)),
      child: Mutex::new(None),
      waiter_handle: Mutex::new(None),
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

  /// Forks the hosted process. Non-blocking; fails if this runner has
  /// already been started once.
  ///
  /// The child continues running this same compiled binary rather than
  /// re-executing a fresh one, matching the default fork-based start
  /// method of process-hosted concurrency this design is drawn from:
  /// there is no `exec` here, deliberately.
  pub fn start(&self) -> Result<(), RunnerError> {
    self.core.try_begin_start()?;

    let runnable = self
      .runnable
      .lock()
      .take()
      .expect("start() already took the runnable out, in violation of the Fresh-state check above");
    let core = Arc::clone(&self.core);
    let runnable_name = runnable.name().to_string();

    // Counted (and, for the first ever process runner, hooked into
    // muster-logging's relay activation) before the fork, not after:
    // the child inherits a byte-copy of this process's memory at the
    // instant of `fork()`, so whatever global state the hook flips on
    // here is already on in the child with no extra per-child setup.
    note_process_runner_started();

    match unsafe { fork() }.map_err(|e| RunnerError::Spawn(self.core.name().to_string(), e.to_string()))? {
      ForkResult::Child => {
        crate::activation::note_child_process_started(&runnable_name);
        Self::run_hosted(core, runnable);
      }
      ForkResult::Parent { child } => {
        *self.child.lock() = Some(ForkedChild::new(child, DEFAULT_FINAL_JOIN_TIMEOUT));

        let waiter_core = Arc::clone(&self.core);
        let handle = thread::Builder::new()
          .name(format!("{}-waiter", self.core.name()))
          .spawn(move || Self::wait_for_child(waiter_core, child))
          .map_err(|e| RunnerError::Spawn(self.core.name().to_string(), e.to_string()))?;
        *self.waiter_handle.lock() = Some(handle);
      }
    }

    Ok(())
  }

  /// Runs entirely in the child after `fork()` returns there. Never
  /// returns: ends the process via `std::process::exit` so that none of
  /// the parent's `Drop` implementations (in particular the `Scope`
  /// guards this process inherited a copy of) run a second, unwanted
  /// close of shared transport state.
  fn run_hosted(core: Arc<RunnerCore>, mut runnable: R) -> ! {
    let _ = nix::unistd::setsid();

    let _cmd_scope = core.command_buffer().subscribe();
    let _status_scope = core.status_buffer().publish();
    let ctx = HostedScopeContext::new(Some(core.command_buffer()), core.status_buffer(), ScopeId::Hosted);

    let result = catch_unwind(AssertUnwindSafe(|| runnable.execute(&ctx)));
    runnable.on_stop();

    let failure = match result {
      Ok(Ok(())) => None,
      Ok(Err(err)) => Some(runnable_error_to_failure(err)),
      Err(panic) => Some(panic_to_failure(panic)),
    };

    match failure {
      Some(failure) => {
        let _ = core.status_buffer().put(StatusMessage::RemoteResult {
          call_id: CallId::nil(),
          outcome: RemoteOutcome::Failure(failure),
        });
        std::process::exit(1);
      }
      None => std::process::exit(0),
    }
  }

  /// Runs on a background thread in the owner process for as long as the
  /// hosted process is alive. Blocks on `waitpid` (the only correct way
  /// to learn when a raw-forked child has exited), then looks for the
  /// reserved-call-id failure message the child sends immediately before
  /// exiting to tell the two outcomes ("ran to completion", "panicked or
  /// returned an error") apart.
  fn wait_for_child(core: Arc<RunnerCore>, pid: Pid) {
    let _ = waitpid(pid, None);

    let outcome = core
      .status_buffer()
      .wait_for(COMPLETION_MESSAGE_GRACE, |m| m.call_id() == Some(CallId::nil()));

    match outcome {
      Some(StatusMessage::RemoteResult {
        outcome: RemoteOutcome::Failure(failure),
        ..
      }) => core.record_failure(failure),
      _ => core.record_clean_stop(),
    }

    core.completion.set();
    note_process_runner_stopped();
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

  /// Blocks until the hosted process's completion event fires, or
  /// `timeout` elapses. Never itself returns an error; query `is_alive()`
  /// to tell a timeout apart from a real stop.
  pub fn join(&self, timeout: Duration) {
    if self.core.completion.wait(timeout) {
      if let Some(handle) = self.waiter_handle.lock().take() {
        let _ = handle.join();
      }
    }
  }

  /// Runs the full termination protocol: `stop()`, wait up to `timeout`,
  /// then escalate to `SIGTERM`/`SIGKILL` against the hosted process
  /// group before giving up with `RunnerStillAlive`. The escalation has
  /// no equivalent in `ThreadRunner::close`: an ignored `Stop` leaves a
  /// thread merely parked until process exit, but an ignored `Stop` in a
  /// forked child is a leaked OS process that outlives its owner unless
  /// something signals it directly.
  pub fn close(&self, timeout: Duration) -> Result<(), RunnerError> {
    if !self.core.is_alive() {
      return Ok(());
    }
    self.core.stop();
    self.join(timeout);

    if self.core.is_alive() {
      if let Some(child) = self.child.lock().as_ref() {
        if let Err(e) = child.terminate() {
          log::warn!("failed to forcefully terminate {}: {e}", self.core.name());
        }
      }
      self.join(DEFAULT_FINAL_JOIN_TIMEOUT);
    }

    if self.core.is_alive() {
      return Err(RunnerError::RunnerStillAlive(self.core.name().to_string(), timeout));
    }
    Ok(())
  }
}

impl<R: Runnable + 'static> Drop for ProcessRunner<R> {
  fn drop(&mut self) {
    if let Err(err) = self.close(DEFAULT_FINAL_JOIN_TIMEOUT) {
      log::error!("{err}");
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use muster_runnable::RunnableError;

  struct WaitsForStop;

  impl Runnable for WaitsForStop {
    fn name(&self) -> &str {
      "waits-for-stop"
    }

    fn execute(&mut self, ctx: &HostedScopeContext) -> Result<(), RunnableError> {
      ctx.publish_started()?;
      let command_buffer = ctx.command_buffer().expect("a command buffer");
      command_buffer.wait_for(Duration::from_secs(5), |m| {
        matches!(m, muster_message::CommandMessage::Stop)
      });
      Ok(())
    }
  }

  struct Throws;

  impl Runnable for Throws {
    fn name(&self) -> &str {
      "throws"
    }

    fn execute(&mut self, ctx: &HostedScopeContext) -> Result<(), RunnableError> {
      ctx.publish_started()?;
      Err(RunnableError::Failed(muster_message::TraceableFailure::capture(
        "RuntimeError",
        "Test Error",
      )))
    }
  }

  #[test]
  fn start_blocking_then_stop_then_join_leaves_no_exception() {
    let runner = ProcessRunner::new(WaitsForStop);
    runner.start_blocking(Duration::from_secs(2)).unwrap();
    assert!(runner.is_alive());

    runner.stop();
    runner.join(Duration::from_secs(2));
    assert!(!runner.is_alive());
    assert!(runner.check_for_exceptions().is_ok());
  }

  #[test]
  fn a_raised_failure_crosses_the_process_boundary_intact() {
    let runner = ProcessRunner::new(Throws);
    runner.start_blocking(Duration::from_secs(2)).unwrap();
    runner.join(Duration::from_secs(2));

    let err = runner.check_for_exceptions().unwrap_err();
    assert!(err.to_string().contains("Test Error"));
  }
}
