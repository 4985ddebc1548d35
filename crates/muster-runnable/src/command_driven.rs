// Copyright 2026 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use crate::context::HostedScopeContext;
use crate::error::RunnableError;
use crate::receiver::{RemoteReceiver, TickHooks};
use crate::Runnable;
use muster_message::{
  CommandMessage, ReceiverId, RemoteObjectReference, RemoteOutcome, RemoteValue, StatusMessage,
  TraceableFailure,
};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// How long a single iteration of the command-driven loop blocks for a
/// command before re-checking the tick interval, when no tick interval was
/// configured. Chosen long enough that an idle runnable doesn't spin, short
/// enough that `stop()` (which re-enqueues on the same buffer and wakes the
/// wait immediately) is never meaningfully delayed.
const NO_TICK_POLL_INTERVAL: Duration = Duration::from_secs(3600);

type MethodHandler<S> = Box<
  dyn Fn(&mut S, &[RemoteValue], &BTreeMap<String, RemoteValue>, &ReceiverRegistry) -> Result<RemoteValue, TraceableFailure>
    + Send,
>;
type AttributeHandler<S> = Box<dyn Fn(&S) -> Result<RemoteValue, TraceableFailure> + Send>;

/// Where method handlers register freshly-created objects that must not
/// themselves cross the scope boundary — a non-copyable outcome becomes a
/// `RemoteObjectReference` instead. Shared by the root state's
/// dispatch and by any receiver already registered, so a method on one
/// receiver can register another in turn.
#[derive(Default)]
pub struct ReceiverRegistry {
  next_id: AtomicU64,
  receivers: Mutex<HashMap<ReceiverId, Box<dyn RemoteReceiver>>>,
}

impl ReceiverRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn register(&self, receiver: Box<dyn RemoteReceiver>) -> RemoteObjectReference {
    let schema = receiver.schema();
    let id = ReceiverId(self.next_id.fetch_add(1, Ordering::SeqCst));
    self.receivers.lock().insert(id, receiver);
    RemoteObjectReference {
      receiver_id: id,
      schema,
    }
  }

  fn call_method(
    &self,
    id: ReceiverId,
    name: &str,
    args: &[RemoteValue],
    kwargs: &BTreeMap<String, RemoteValue>,
  ) -> Result<RemoteValue, TraceableFailure> {
    let mut receivers = self.receivers.lock();
    match receivers.get_mut(&id) {
      Some(receiver) => receiver.call_method(name, args, kwargs),
      None => Err(unknown_receiver(id)),
    }
  }

  fn get_attribute(&self, id: ReceiverId, name: &str) -> Result<RemoteValue, TraceableFailure> {
    let receivers = self.receivers.lock();
    match receivers.get(&id) {
      Some(receiver) => receiver.get_attribute(name),
      None => Err(unknown_receiver(id)),
    }
  }
}

fn unknown_receiver(id: ReceiverId) -> TraceableFailure {
  TraceableFailure::capture(
    "ProgrammingError",
    format!("no live remote receiver for id {}", id.0),
  )
}

fn unknown_member(kind: &str, name: &str) -> TraceableFailure {
  TraceableFailure::capture(
    "ProgrammingError",
    format!("target has no remote {kind} named '{name}'"),
  )
}

/// A `Runnable` whose `execute()` is entirely driven by commands arriving
/// on the command buffer. Application code registers named method/attribute
/// handlers against a root state `S` at construction time instead of
/// subclassing and trapping attribute access: an explicit dispatch table
/// rather than reflection.
pub struct CommandDrivenRunnable<S: Send> {
  name: String,
  state: S,
  methods: HashMap<String, MethodHandler<S>>,
  attributes: HashMap<String, AttributeHandler<S>>,
  registry: ReceiverRegistry,
  tick_interval: Option<Duration>,
}

impl<S: Send + TickHooks> CommandDrivenRunnable<S> {
  pub fn new(name: impl Into<String>, state: S, tick_interval: Option<Duration>) -> Self {
    CommandDrivenRunnable {
      name: name.into(),
      state,
      methods: HashMap::new(),
      attributes: HashMap::new(),
      registry: ReceiverRegistry::new(),
      tick_interval,
    }
  }

  pub fn register_method(
    &mut self,
    name: impl Into<String>,
    handler: impl Fn(&mut S, &[RemoteValue], &BTreeMap<String, RemoteValue>, &ReceiverRegistry) -> Result<RemoteValue, TraceableFailure>
      + Send
      + 'static,
  ) {
    self.methods.insert(name.into(), Box::new(handler));
  }

  pub fn register_attribute(
    &mut self,
    name: impl Into<String>,
    handler: impl Fn(&S) -> Result<RemoteValue, TraceableFailure> + Send + 'static,
  ) {
    self.attributes.insert(name.into(), Box::new(handler));
  }

  pub fn state(&self) -> &S {
    &self.state
  }

  pub fn state_mut(&mut self) -> &mut S {
    &mut self.state
  }

  fn dispatch_call(
    &mut self,
    receiver_id: Option<ReceiverId>,
    target_name: &str,
    args: &[RemoteValue],
    kwargs: &BTreeMap<String, RemoteValue>,
  ) -> Result<RemoteValue, TraceableFailure> {
    match receiver_id {
      Some(id) => self.registry.call_method(id, target_name, args, kwargs),
      None => match self.methods.get(target_name) {
        Some(handler) => handler(&mut self.state, args, kwargs, &self.registry),
        None => Err(unknown_member("method", target_name)),
      },
    }
  }

  fn dispatch_get(
    &mut self,
    receiver_id: Option<ReceiverId>,
    attr_name: &str,
  ) -> Result<RemoteValue, TraceableFailure> {
    match receiver_id {
      Some(id) => self.registry.get_attribute(id, attr_name),
      None => match self.attributes.get(attr_name) {
        Some(handler) => handler(&self.state),
        None => Err(unknown_member("attribute", attr_name)),
      },
    }
  }
}

impl<S: Send + TickHooks> Runnable for CommandDrivenRunnable<S> {
  fn name(&self) -> &str {
    &self.name
  }

  fn execute(&mut self, ctx: &HostedScopeContext) -> Result<(), RunnableError> {
    let command_buffer = muster_primitives::util::expect_set(
      ctx.command_buffer(),
      "a command buffer for this CommandDrivenRunnable",
    );
    ctx.publish_started()?;

    let wait_timeout = self.tick_interval.unwrap_or(NO_TICK_POLL_INTERVAL);
    loop {
      self.state.pre_wait_hook();
      let command = command_buffer.wait_for(wait_timeout, |_| true);
      self.state.post_wait_hook();

      match command {
        Some(CommandMessage::Stop) => {
          self.state.on_tick();
          break;
        }
        Some(CommandMessage::RemoteCall {
          call_id,
          target_name,
          receiver_id,
          args,
          kwargs,
        }) => {
          let outcome = match self.dispatch_call(receiver_id, &target_name, &args, &kwargs) {
            Ok(value) => RemoteOutcome::Value(value),
            Err(failure) => RemoteOutcome::Failure(failure),
          };
          ctx.status_buffer()
            .put(StatusMessage::RemoteResult { call_id, outcome })?;
        }
        Some(CommandMessage::RemoteGet {
          call_id,
          attr_name,
          receiver_id,
        }) => {
          let outcome = match self.dispatch_get(receiver_id, &attr_name) {
            Ok(value) => RemoteOutcome::Value(value),
            Err(failure) => RemoteOutcome::Failure(failure),
          };
          ctx.status_buffer()
            .put(StatusMessage::RemoteResult { call_id, outcome })?;
        }
        None => {
          self.state.on_tick();
        }
      }
    }
    Ok(())
  }

  fn on_stop(&mut self) {
    // Default Runnable::stop already sends Stop on the command buffer;
    // nothing further to do here once the loop above observes it.
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use muster_buffer::Buffer;
  use muster_message::CallId;

  #[derive(Default)]
  struct Counter {
    value: i64,
  }

  impl TickHooks for Counter {}

  fn make_runnable() -> CommandDrivenRunnable<Counter> {
    let mut runnable = CommandDrivenRunnable::new("counter", Counter::default(), None);
    runnable.register_method("add", |state, args, _kwargs, _registry| {
      let delta = args.first().and_then(RemoteValue::as_int).unwrap_or(0);
      state.value += delta;
      Ok(RemoteValue::Int(state.value))
    });
    runnable.register_attribute("value", |state| Ok(RemoteValue::Int(state.value)));
    runnable
  }

  #[test]
  fn dispatches_registered_method_in_enqueue_order() {
    let mut runnable = make_runnable();
    let command_buffer: Buffer<CommandMessage> = Buffer::new_thread("cmd", 0);
    let status_buffer: Buffer<StatusMessage> = Buffer::new_thread("status", 0);
    let _cmd_scope = command_buffer.subscribe();
    let _cmd_pub_scope = command_buffer.publish();
    let _status_scope = status_buffer.publish();

    let ctx = HostedScopeContext::new(
      Some(&command_buffer),
      &status_buffer,
      crate::scope_id::ScopeId::Hosted,
    );

    let call_one = CallId::new();
    command_buffer
      .put(CommandMessage::RemoteCall {
        call_id: call_one,
        target_name: "add".into(),
        receiver_id: None,
        args: vec![RemoteValue::Int(5)],
        kwargs: BTreeMap::new(),
      })
      .unwrap();
    command_buffer.put(CommandMessage::Stop).unwrap();

    runnable.execute(&ctx).unwrap();

    assert_eq!(runnable.state().value, 5);
    let started = status_buffer.wait_for(Duration::from_secs(1), |m| matches!(m, StatusMessage::Started));
    assert!(started.is_some());
    let result = status_buffer
      .wait_for(Duration::from_secs(1), |m| m.call_id() == Some(call_one))
      .unwrap();
    match result {
      StatusMessage::RemoteResult { outcome, .. } => match outcome {
        RemoteOutcome::Value(RemoteValue::Int(v)) => assert_eq!(v, 5),
        other => panic!("unexpected outcome: {:?}", other),
      },
      _ => panic!("expected RemoteResult"),
    }
  }

  #[test]
  fn unknown_method_name_fails_locally_as_remote_failure() {
    let mut runnable = make_runnable();
    let command_buffer: Buffer<CommandMessage> = Buffer::new_thread("cmd", 0);
    let status_buffer: Buffer<StatusMessage> = Buffer::new_thread("status", 0);
    let _cmd_scope = command_buffer.subscribe();
    let _cmd_pub_scope = command_buffer.publish();
    let _status_scope = status_buffer.publish();
    let ctx = HostedScopeContext::new(
      Some(&command_buffer),
      &status_buffer,
      crate::scope_id::ScopeId::Hosted,
    );

    let call_id = CallId::new();
    command_buffer
      .put(CommandMessage::RemoteCall {
        call_id,
        target_name: "does_not_exist".into(),
        receiver_id: None,
        args: vec![],
        kwargs: BTreeMap::new(),
      })
      .unwrap();
    command_buffer.put(CommandMessage::Stop).unwrap();

    runnable.execute(&ctx).unwrap();

    let result = status_buffer
      .wait_for(Duration::from_secs(1), |m| m.call_id() == Some(call_id))
      .unwrap();
    match result {
      StatusMessage::RemoteResult {
        outcome: RemoteOutcome::Failure(failure),
        ..
      } => assert!(failure.message.contains("does_not_exist")),
      other => panic!("expected a failure outcome, got {:?}", other),
    }
  }
}
