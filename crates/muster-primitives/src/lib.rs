// Copyright 2026 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

//! Synchronization primitives shared by the thread- and process-hosted
//! runtime. Each type here is specified purely by behavior: a `muster_runner`
//! `Environment` picks the concrete backing (in-process vs. shared-memory)
//! without the rest of the crate needing to know which.

pub mod condition;
pub mod event;
pub mod high_precision_condition;
pub mod lock;
pub mod time;
pub mod util;

pub use condition::Condition;
pub use event::Event;
pub use high_precision_condition::HighPrecisionCondition;
pub use lock::Lock;
