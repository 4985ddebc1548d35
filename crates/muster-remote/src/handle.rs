// Copyright 2026 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use crate::error::ProgrammingError;
use crate::signature::RemoteSignature;
use crate::timestamp_tracker::TimestampTracker;
use muster_message::{CallId, CommandMessage, ReceiverId, RemoteOutcome, RemoteValue, StatusMessage};
use muster_runner::RunnerCore;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Weak;
use std::time::{Duration, Instant};

pub const REMOTE_METHOD_CALL_DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const CALL_CHECK_HISTORY_LENGTH: usize = 10;
const CALL_CHECK_RATE_LOOKBACK: Duration = Duration::from_secs(1);
const CALL_CHECK_RATE_LOOKBACK_COUNT: usize = 3;
const CALL_CHECK_LIMIT_RESPONSE: Duration = Duration::from_secs(1);

/// What a `RemoteHandle` calls or reads on the other side of a scope
/// boundary: either a free-standing method/attribute on a runnable's root
/// state, or one registered against a specific `RemoteObjectReference`.
enum Target {
  Root,
  Receiver(ReceiverId),
}

/// A proxy for one named remote method or attribute. Built once per
/// attribute/method at the point a caller obtains a reference to a hosted
/// object (or to the runnable itself); every subsequent call reuses the
/// same quality-of-service counters, so a handle's first slow call or
/// burst of calls is also its last warning.
pub struct RemoteHandle {
  name: String,
  target: Target,
  signature: RemoteSignature,
  call_timeout: Duration,
  source: Weak<RunnerCore>,
  call_check_timestamps: TimestampTracker,
  warning_shown: AtomicBool,
}

impl RemoteHandle {
  pub fn method(
    name: impl Into<String>,
    receiver_id: Option<ReceiverId>,
    signature: RemoteSignature,
    source: Weak<RunnerCore>,
  ) -> Self {
    Self::new(name, receiver_id, signature, source)
  }

  pub fn attribute(name: impl Into<String>, receiver_id: Option<ReceiverId>, source: Weak<RunnerCore>) -> Self {
    Self::new(name, receiver_id, RemoteSignature::none(), source)
  }

  fn new(name: impl Into<String>, receiver_id: Option<ReceiverId>, signature: RemoteSignature, source: Weak<RunnerCore>) -> Self {
    RemoteHandle {
      name: name.into(),
      target: match receiver_id {
        Some(id) => Target::Receiver(id),
        None => Target::Root,
      },
      signature,
      call_timeout: REMOTE_METHOD_CALL_DEFAULT_TIMEOUT,
      source,
      call_check_timestamps: TimestampTracker::new(CALL_CHECK_HISTORY_LENGTH),
      warning_shown: AtomicBool::new(false),
    }
  }

  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    self.call_timeout = timeout;
    self
  }

  fn receiver_id(&self) -> Option<ReceiverId> {
    match self.target {
      Target::Root => None,
      Target::Receiver(id) => Some(id),
    }
  }

  /// Calls this handle's method with `args`/`kwargs`. Validates the
  /// signature and checks the source runner's liveness before placing
  /// anything on the command buffer; neither failure mode reaches the
  /// hosted side.
  pub fn call(
    &self,
    args: Vec<RemoteValue>,
    kwargs: BTreeMap<String, RemoteValue>,
  ) -> Result<RemoteValue, ProgrammingError> {
    self.signature
      .validate(&args, &kwargs)
      .map_err(|reason| ProgrammingError::SignatureMismatch(self.name.clone(), reason))?;

    let args = self.replace_self_references(args);
    let call_id = CallId::new();
    self.dispatch(
      CommandMessage::RemoteCall {
        call_id,
        target_name: self.name.clone(),
        receiver_id: self.receiver_id(),
        args,
        kwargs,
      },
      call_id,
    )
  }

  pub fn get(&self) -> Result<RemoteValue, ProgrammingError> {
    let call_id = CallId::new();
    self.dispatch(
      CommandMessage::RemoteGet {
        call_id,
        attr_name: self.name.clone(),
        receiver_id: self.receiver_id(),
      },
      call_id,
    )
  }

  /// Sentinel replacement (spec'd "objects that by design must not cross
  /// the scope boundary"): a `RemoteObjectReference` argument that
  /// already names the receiver this call targets is replaced with a
  /// placeholder, since the hosted side already owns the real object and
  /// re-crossing a handle to it would be both wasteful and wrong once a
  /// receiver id is reused across scope restarts.
  fn replace_self_references(&self, args: Vec<RemoteValue>) -> Vec<RemoteValue> {
    let Some(own_id) = self.receiver_id() else {
      return args;
    };
    args.into_iter()
      .map(|arg| match &arg {
        RemoteValue::Reference(reference) if reference.receiver_id == own_id => {
          RemoteValue::ReferencePlaceholder
        }
        _ => arg,
      })
      .collect()
  }

  fn dispatch(&self, message: CommandMessage, call_id: CallId) -> Result<RemoteValue, ProgrammingError> {
    let core = self
      .source
      .upgrade()
      .ok_or_else(|| ProgrammingError::SourceRunnerStopped(self.name.clone()))?;
    if !core.is_alive() {
      return Err(ProgrammingError::SourceRunnerStopped(self.name.clone()));
    }

    let start = Instant::now();
    core.command_buffer().put(message)?;

    let response = core
      .status_buffer()
      .wait_for(self.call_timeout, |m| m.call_id() == Some(call_id));

    let outcome = match response {
      Some(StatusMessage::RemoteResult { outcome, .. }) => outcome,
      Some(StatusMessage::Started) | None => {
        return Err(ProgrammingError::Timeout(self.name.clone(), self.call_timeout));
      }
    };

    self.record_call_check(start);

    match outcome {
      RemoteOutcome::Value(value) => Ok(value),
      RemoteOutcome::Failure(failure) => Err(ProgrammingError::Remote(failure)),
    }
  }

  /// Quality-of-service counters: at most one warning per handle, for
  /// whichever of "slow single call" or "excessive call rate" trips
  /// first. Once shown, this handle never warns again — a fresh handle
  /// (e.g. from re-fetching a remote reference) gets a fresh flag.
  fn record_call_check(&self, call_start: Instant) {
    if self.warning_shown.load(Ordering::SeqCst) {
      return;
    }

    let call_duration = call_start.elapsed();
    if call_duration > CALL_CHECK_LIMIT_RESPONSE {
      log::warn!(
        "slow response calling '{}' - took {:?}. Please check for a slow on_tick or on_value method",
        self.name,
        call_duration
      );
      self.warning_shown.store(true, Ordering::SeqCst);
      return;
    }

    let now = Instant::now();
    self.call_check_timestamps.record(now);
    let call_count = self
      .call_check_timestamps
      .entries_in_last(CALL_CHECK_RATE_LOOKBACK, now);
    if call_count > CALL_CHECK_RATE_LOOKBACK_COUNT {
      log::warn!(
        "excessive calling of '{}' - {} calls in less than {:?} (max allowed = {})",
        self.name,
        call_count,
        CALL_CHECK_RATE_LOOKBACK,
        CALL_CHECK_RATE_LOOKBACK_COUNT
      );
      self.warning_shown.store(true, Ordering::SeqCst);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use muster_message::{RemoteObjectReference, RemoteSchema};

  #[test]
  fn calling_with_a_dead_source_fails_locally_as_source_runner_stopped() {
    let handle = RemoteHandle::method("increment".to_string(), None, RemoteSignature::new(0, 1, []), Weak::new());
    let err = handle.call(vec![], BTreeMap::new()).unwrap_err();
    assert!(matches!(err, ProgrammingError::SourceRunnerStopped(_)));
  }

  #[test]
  fn calling_with_a_bad_signature_fails_locally_without_touching_the_source() {
    let handle = RemoteHandle::method("increment".to_string(), None, RemoteSignature::none(), Weak::new());
    let err = handle.call(vec![RemoteValue::Int(1)], BTreeMap::new()).unwrap_err();
    assert!(matches!(err, ProgrammingError::SignatureMismatch(_, _)));
  }

  #[test]
  fn replace_self_references_swaps_a_reference_to_its_own_receiver_for_a_placeholder() {
    let own_id = ReceiverId(1);
    let handle = RemoteHandle::method("increment".to_string(), Some(own_id), RemoteSignature::new(0, 1, []), Weak::new());

    let own_reference = RemoteValue::Reference(RemoteObjectReference {
      receiver_id: own_id,
      schema: RemoteSchema::default(),
    });
    let other_reference = RemoteValue::Reference(RemoteObjectReference {
      receiver_id: ReceiverId(2),
      schema: RemoteSchema::default(),
    });

    let replaced = handle.replace_self_references(vec![own_reference, other_reference.clone()]);
    assert_eq!(replaced[0], RemoteValue::ReferencePlaceholder);
    assert_eq!(replaced[1], other_reference);
  }
}
