// Copyright 2026 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use crate::scope_id::ScopeId;
use muster_buffer::{Buffer, BufferError};
use muster_message::{CommandMessage, StatusMessage};

/// The hosted-scope side of a runnable's command/status wiring. Built by
/// whichever `muster_runner::Runner` variant spawned the hosted thread or
/// process, and handed to `Runnable::execute` for the lifetime of that
/// call only — the buffers it references stay in scope exactly as long as
/// this value does, since the caller holds the matching `Scope` guards on
/// its own stack for the same span.
pub struct HostedScopeContext<'a> {
  command_buffer: Option<&'a Buffer<CommandMessage>>,
  status_buffer: &'a Buffer<StatusMessage>,
  scope_id: ScopeId,
}

impl<'a> HostedScopeContext<'a> {
  pub fn new(
    command_buffer: Option<&'a Buffer<CommandMessage>>,
    status_buffer: &'a Buffer<StatusMessage>,
    scope_id: ScopeId,
  ) -> Self {
    HostedScopeContext {
      command_buffer,
      status_buffer,
      scope_id,
    }
  }

  pub fn command_buffer(&self) -> Option<&'a Buffer<CommandMessage>> {
    self.command_buffer
  }

  pub fn status_buffer(&self) -> &'a Buffer<StatusMessage> {
    self.status_buffer
  }

  pub fn scope_id(&self) -> ScopeId {
    self.scope_id
  }

  /// Emits the one `Started` status every hosted scope must send before
  /// it is willing to receive commands (spec invariant: no `Started` is
  /// emitted until then, so callers should invoke this once they have
  /// actually entered their execution loop, not before).
  pub fn publish_started(&self) -> Result<(), BufferError> {
    self.status_buffer.put(StatusMessage::Started)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn publish_started_requires_an_open_publish_scope_on_the_status_buffer() {
    let status_buffer = Buffer::new_thread("status".to_string(), 0);
    let _sub = status_buffer.subscribe();
    let ctx = HostedScopeContext::new(None, &status_buffer, ScopeId::Hosted);

    assert!(ctx.command_buffer().is_none());
    assert_eq!(ctx.scope_id(), ScopeId::Hosted);

    // No publish scope is open yet: putting onto the buffer is a
    // programming error, surfaced as a BufferError rather than a panic.
    assert!(ctx.publish_started().is_err());

    let _pub_scope = status_buffer.publish();
    assert!(ctx.publish_started().is_ok());
    assert!(matches!(
      status_buffer.wait_for(std::time::Duration::from_millis(200), |m| matches!(
        m,
        StatusMessage::Started
      )),
      Some(StatusMessage::Started)
    ));
  }
}
