// Copyright 2026 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

//! The primary crate: re-exports the whole runtime so an application needs
//! only `muster = { .. }` in its own `Cargo.toml` rather than naming each
//! member crate individually. Each submodule here is a thin re-export of
//! the crate it is named after; nothing is reimplemented.

pub use muster_buffer as buffer;
pub use muster_logging as logging;
pub use muster_message as message;
pub use muster_primitives as primitives;
pub use muster_process as process;
pub use muster_remote as remote;
pub use muster_runnable as runnable;
pub use muster_runner as runner;

pub use muster_buffer::{Buffer, BufferError, ManagedQueue, Scope};
pub use muster_logging::{HandlerConfig, HandlerKind, LoggerConfig, Logging, LoggingConfig, LogLevel, LoggingError};
pub use muster_message::{CallId, CommandMessage, RemoteOutcome, StatusMessage, TraceableFailure};
pub use muster_primitives::{Condition, Event, HighPrecisionCondition, Lock};
pub use muster_process::{ForkedChild, ManagedChild, ManagedChildError};
pub use muster_remote::{ProgrammingError, RemoteHandle, RemoteSignature};
pub use muster_runnable::{CommandDrivenRunnable, HostedScopeContext, Runnable, RunnableError, ScopeId};
pub use muster_runner::{ProcessRunner, RunnerCore, RunnerError, RunnerState, ThreadRunner};
