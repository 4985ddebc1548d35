// Copyright 2026 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use crate::process_runner::ProcessRunner;
use crate::thread_runner::ThreadRunner;
use muster_runnable::Runnable;

/// Factory for the thread-hosted runner variant. Mirrors the original
/// `ThreadEnvironment`: application code that only ever wants in-process
/// concurrency depends on this type alone, and never names `ThreadRunner`
/// directly, so switching to `ProcessEnvironment` later is a one-line
/// change at the call site that creates the runner.
pub struct ThreadEnvironment;

impl ThreadEnvironment {
  pub fn runner<R: Runnable + 'static>(runnable: R) -> ThreadRunner<R> {
    ThreadRunner::new(runnable)
  }

  pub fn descriptive_name() -> &'static str {
    "MultiThreaded"
  }
}

/// Factory for the process-hosted runner variant. Mirrors the original
/// `ProcessEnvironment`.
pub struct ProcessEnvironment;

impl ProcessEnvironment {
  pub fn runner<R: Runnable + 'static>(runnable: R) -> ProcessRunner<R> {
    ProcessRunner::new(runnable)
  }

  pub fn descriptive_name() -> &'static str {
    "MultiProcess"
  }
}
