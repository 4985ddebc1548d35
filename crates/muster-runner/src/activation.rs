// Copyright 2026 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use once_cell::sync::OnceCell;
use std::sync::atomic::{AtomicUsize, Ordering};

static FIRST_ACTIVATION_HOOK: OnceCell<Box<dyn Fn() + Send + Sync>> = OnceCell::new();
static CHILD_PROCESS_START_HOOK: OnceCell<Box<dyn Fn(&str) + Send + Sync>> = OnceCell::new();
static ACTIVE_PROCESS_RUNNERS: AtomicUsize = AtomicUsize::new(0);

/// Registers the callback `muster-logging` uses to launch its listener
/// scope the first time any `ProcessRunner` becomes active in this
/// program. Only the first registration takes effect; later calls are
/// no-ops, matching the singleton nature of the listener itself.
pub fn set_first_process_runner_hook(hook: impl Fn() + Send + Sync + 'static) {
  let _ = FIRST_ACTIVATION_HOOK.set(Box::new(hook));
}

/// Registers the callback `muster-logging` uses to tag a forked hosted
/// scope with its runnable's name, once that scope is actually running in
/// the child. Called for every `ProcessRunner`, not just the first.
pub fn set_child_process_start_hook(hook: impl Fn(&str) + Send + Sync + 'static) {
  let _ = CHILD_PROCESS_START_HOOK.set(Box::new(hook));
}

pub(crate) fn note_child_process_started(runnable_name: &str) {
  if let Some(hook) = CHILD_PROCESS_START_HOOK.get() {
    hook(runnable_name);
  }
}

/// Called once per `ProcessRunner::start()`, before the process forks, so
/// that a freshly forked child inherits an already-`true` activation state
/// (and, for the very first runner, an already-constructed log queue to
/// enqueue onto) rather than racing the parent's own post-fork activation.
pub(crate) fn note_process_runner_started() {
  if ACTIVE_PROCESS_RUNNERS.fetch_add(1, Ordering::SeqCst) == 0 {
    if let Some(hook) = FIRST_ACTIVATION_HOOK.get() {
      hook();
    }
  }
}

pub(crate) fn note_process_runner_stopped() {
  ACTIVE_PROCESS_RUNNERS.fetch_sub(1, Ordering::SeqCst);
}

pub fn active_process_runner_count() -> usize {
  ACTIVE_PROCESS_RUNNERS.load(Ordering::SeqCst)
}
