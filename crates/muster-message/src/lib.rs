// Copyright 2026 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

//! The wire vocabulary exchanged between an owner scope and a hosted
//! scope: commands sent in, status sent back, and the value/failure/
//! reference shapes that can legally cross the boundary.

pub mod call_id;
pub mod command;
pub mod failure;
pub mod remote_reference;
pub mod status;
pub mod value;

pub use call_id::CallId;
pub use command::CommandMessage;
pub use failure::TraceableFailure;
pub use remote_reference::{ReceiverId, RemoteObjectReference, RemoteSchema};
pub use status::{RemoteOutcome, StatusMessage};
pub use value::RemoteValue;
