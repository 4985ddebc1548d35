// Copyright 2026 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

//! Proxies for calling or reading something living in a hosted scope from
//! its owner, built on top of `muster-runner`'s command/status buffers.
//! Everything here runs in the owner scope; the hosted side's half of the
//! protocol (dispatch against a registration table) lives in
//! `muster_runnable::command_driven`.

pub mod error;
pub mod handle;
pub mod signature;
pub mod timestamp_tracker;

pub use error::ProgrammingError;
pub use handle::{RemoteHandle, REMOTE_METHOD_CALL_DEFAULT_TIMEOUT};
pub use signature::RemoteSignature;
pub use timestamp_tracker::TimestampTracker;
