// Copyright 2026 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

//! A child process running in its own process group, with graceful-then-
//! forceful termination. `ManagedChild` wraps a `Command::spawn` child;
//! `ForkedChild` wraps a pid obtained from a raw `fork()` instead. Both
//! share the same terminate-then-kill algorithm.

use std::io;
use std::ops::{Deref, DerefMut};
use std::process::{Child, Command};
use std::sync::atomic::{AtomicBool, Ordering};
use std::{thread, time};

use nix::sys::signal;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::{getpgid, Pid};
use thiserror::Error;

const GRACEFUL_SHUTDOWN_POLL_TIME: time::Duration = time::Duration::from_millis(50);

#[derive(Error, Debug)]
pub enum ManagedChildError {
  #[error("error spawning child process: {0}")]
  Spawn(#[source] io::Error),
  #[error("process had no PID")]
  NoPid,
  #[error("could not get process group id of child process: {0}")]
  GetPgid(#[source] nix::Error),
  #[error("failed to signal child process group: {0}")]
  Signal(#[source] nix::Error),
  #[error("error waiting on child process: {0}")]
  Wait(#[source] io::Error),
}

/// A child process running in its own PGID, with a `Drop` implementation
/// that kills that PGID if nothing else already has.
pub struct ManagedChild {
  child: Child,
  graceful_shutdown_timeout: time::Duration,
  killed: AtomicBool,
}

impl ManagedChild {
  /// Spawns `command` in a new process group of its own, so that later
  /// termination can safely target the whole group rather than risk
  /// racing with the parent's.
  pub fn spawn(
    mut command: Command,
    graceful_shutdown_timeout: time::Duration,
  ) -> Result<Self, ManagedChildError> {
    unsafe {
      command.pre_exec(|| {
        nix::unistd::setsid()
          .map(|_pgid| ())
          .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("could not create new pgid: {e}")))
      });
    }

    let child = command.spawn().map_err(ManagedChildError::Spawn)?;
    Ok(Self {
      child,
      graceful_shutdown_timeout,
      killed: AtomicBool::new(false),
    })
  }

  fn get_pgid(&self) -> Result<Pid, ManagedChildError> {
    let pid = self.child.id();
    getpgid(Some(Pid::from_raw(pid as i32))).map_err(ManagedChildError::GetPgid)
  }

  /// Sends `signal` to the entire child process group.
  fn signal_pg(&self, sig: signal::Signal) -> Result<(), ManagedChildError> {
    let pgid = self.get_pgid()?;
    signal::kill(Pid::from_raw(-pgid.as_raw()), sig).map_err(ManagedChildError::Signal)
  }

  fn check_has_exited(&mut self) -> Result<bool, ManagedChildError> {
    self.child
      .try_wait()
      .map(|status| status.is_some())
      .map_err(ManagedChildError::Wait)
  }

  /// Polls until the child exits or `max_wait` elapses. This blocks the
  /// calling thread, but only for a bounded amount of time.
  fn wait_for_exit(&mut self, max_wait: time::Duration) -> Result<bool, ManagedChildError> {
    let deadline = time::Instant::now() + max_wait;
    while time::Instant::now() <= deadline {
      if self.check_has_exited()? {
        return Ok(true);
      }
      thread::sleep(GRACEFUL_SHUTDOWN_POLL_TIME);
    }
    Ok(false)
  }

  /// Sends `SIGTERM` to the process group and gives it up to
  /// `graceful_shutdown_timeout` to exit before escalating to `SIGKILL`.
  pub fn terminate(&mut self) -> Result<(), ManagedChildError> {
    self.signal_pg(signal::Signal::SIGTERM)?;
    match self.wait_for_exit(self.graceful_shutdown_timeout) {
      Ok(true) => {
        self.killed.store(true, Ordering::SeqCst);
        Ok(())
      }
      Ok(false) => {
        log::warn!("timed out waiting for graceful shutdown of process group, sending SIGKILL");
        self.kill_pg()
      }
      Err(e) => {
        log::warn!("error waiting for graceful shutdown of process group ({e}), sending SIGKILL");
        self.kill_pg()
      }
    }
  }

  fn kill_pg(&mut self) -> Result<(), ManagedChildError> {
    self.signal_pg(signal::Signal::SIGKILL)?;
    self.killed.store(true, Ordering::SeqCst);
    Ok(())
  }
}

impl Deref for ManagedChild {
  type Target = Child;
  fn deref(&self) -> &Child {
    &self.child
  }
}

impl DerefMut for ManagedChild {
  fn deref_mut(&mut self) -> &mut Child {
    &mut self.child
  }
}

impl Drop for ManagedChild {
  fn drop(&mut self) {
    if !self.killed.load(Ordering::SeqCst) {
      let _ = self.terminate();
    }
  }
}

/// A child produced by a raw `fork()` rather than `Command::spawn`, used by
/// `muster_runner::ProcessRunner` to host an arbitrary `Runnable` by running
/// on, rather than re-executing, the parent's own compiled code. Shares
/// `ManagedChild`'s terminate-then-kill algorithm; only how the PID was
/// obtained, and how completion is observed (`waitpid` instead of
/// `Child::try_wait`), differ.
pub struct ForkedChild {
  pid: Pid,
  graceful_shutdown_timeout: time::Duration,
  killed: AtomicBool,
}

impl ForkedChild {
  /// Wraps a pid that the caller has already forked and moved into its
  /// own process group (typically via `setsid()` immediately after
  /// `fork()` returns zero in the child).
  pub fn new(pid: Pid, graceful_shutdown_timeout: time::Duration) -> Self {
    ForkedChild {
      pid,
      graceful_shutdown_timeout,
      killed: AtomicBool::new(false),
    }
  }

  pub fn pid(&self) -> Pid {
    self.pid
  }

  fn signal_pg(&self, sig: signal::Signal) -> Result<(), ManagedChildError> {
    let pgid = getpgid(Some(self.pid)).map_err(ManagedChildError::GetPgid)?;
    signal::kill(Pid::from_raw(-pgid.as_raw()), sig).map_err(ManagedChildError::Signal)
  }

  fn check_has_exited(&self) -> Result<bool, ManagedChildError> {
    match waitpid(self.pid, Some(WaitPidFlag::WNOHANG)) {
      Ok(WaitStatus::StillAlive) => Ok(false),
      Ok(_) => Ok(true),
      Err(nix::Error::ECHILD) => Ok(true),
      Err(e) => Err(ManagedChildError::Wait(io::Error::from(e))),
    }
  }

  fn wait_for_exit(&self, max_wait: time::Duration) -> Result<bool, ManagedChildError> {
    let deadline = time::Instant::now() + max_wait;
    while time::Instant::now() <= deadline {
      if self.check_has_exited()? {
        return Ok(true);
      }
      thread::sleep(GRACEFUL_SHUTDOWN_POLL_TIME);
    }
    Ok(false)
  }

  /// Sends `SIGTERM` to the process group and gives it up to
  /// `graceful_shutdown_timeout` to exit before escalating to `SIGKILL`.
  pub fn terminate(&self) -> Result<(), ManagedChildError> {
    self.signal_pg(signal::Signal::SIGTERM)?;
    match self.wait_for_exit(self.graceful_shutdown_timeout) {
      Ok(true) => {
        self.killed.store(true, Ordering::SeqCst);
        Ok(())
      }
      Ok(false) => {
        log::warn!("timed out waiting for graceful shutdown of forked process group, sending SIGKILL");
        self.kill_pg()
      }
      Err(e) => {
        log::warn!("error waiting for graceful shutdown of forked process group ({e}), sending SIGKILL");
        self.kill_pg()
      }
    }
  }

  fn kill_pg(&self) -> Result<(), ManagedChildError> {
    self.signal_pg(signal::Signal::SIGKILL)?;
    self.killed.store(true, Ordering::SeqCst);
    Ok(())
  }

  pub fn is_alive(&self) -> bool {
    !self.killed.load(Ordering::SeqCst) && matches!(self.check_has_exited(), Ok(false))
  }
}

impl Drop for ForkedChild {
  fn drop(&mut self) {
    if !self.killed.load(Ordering::SeqCst) {
      let _ = self.terminate();
    }
  }
}
