// Copyright 2026 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

//! Scoped, managed transport. A `ManagedQueue` may only be put into while a
//! `Scope` guard for it is held; dropping the guard drains whatever is left
//! with a bounded timeout. `Buffer` fans a single publish side out to many
//! subscribers, each with its own queue, and is what `muster-runner` and
//! `muster-remote` build their command/status plumbing on top of.

pub mod buffer;
pub mod error;
pub mod managed_queue;
pub mod transport;

pub use buffer::Buffer;
pub use error::BufferError;
pub use managed_queue::{ManagedQueue, Scope};
pub use transport::{ProcessQueueTransport, ThreadQueueTransport, Transport};
