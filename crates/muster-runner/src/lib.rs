// Copyright 2026 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

//! The supervisor that hosts one `muster_runnable::Runnable` in a fresh
//! thread (`ThreadRunner`) or a fresh forked process (`ProcessRunner`),
//! starts it, waits for it to signal `Started`, observes its failures, and
//! stops it cleanly within a bounded deadline on scope exit.

mod activation;
mod core;
mod environment;
mod error;
mod process_runner;
mod state;
mod thread_runner;

pub use activation::{active_process_runner_count, set_child_process_start_hook, set_first_process_runner_hook};
pub use core::RunnerCore;
pub use environment::{ProcessEnvironment, ThreadEnvironment};
pub use error::{RunnerError, DEFAULT_FINAL_JOIN_TIMEOUT};
pub use process_runner::ProcessRunner;
pub use state::RunnerState;
pub use thread_runner::ThreadRunner;
