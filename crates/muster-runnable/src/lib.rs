// Copyright 2026 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

//! The `Runnable` trait and its `CommandDrivenRunnable` implementation: the
//! piece of user code that a `muster_runner::Runner` actually executes,
//! either on a dedicated thread or inside a dedicated process.

pub mod command_driven;
pub mod context;
pub mod error;
pub mod receiver;
pub mod scope_id;

pub use command_driven::{CommandDrivenRunnable, ReceiverRegistry};
pub use context::HostedScopeContext;
pub use error::RunnableError;
pub use receiver::{RemoteReceiver, TickHooks};
pub use scope_id::ScopeId;

/// User code hosted by a `Runner`. `execute` is the hosted scope's entire
/// lifetime: it is called once, on the hosted thread or process, and its
/// return ends that lifetime.
pub trait Runnable: Send {
  fn name(&self) -> &str;

  fn execute(&mut self, ctx: &HostedScopeContext) -> Result<(), RunnableError>;

  /// Hook invoked from within `execute`'s loop once a `Stop` command has
  /// been received, before returning. The default does nothing; most
  /// runnables never need to override this.
  fn on_stop(&mut self) {}
}
