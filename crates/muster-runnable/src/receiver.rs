// Copyright 2026 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use muster_message::{RemoteSchema, RemoteValue, TraceableFailure};
use std::collections::BTreeMap;

/// An object living inside a hosted scope that can be called or read via
/// remote calls. `CommandDrivenRunnable` itself implements this for its own
/// root state; a method handler that must hand back something that cannot
/// cross the boundary instead registers a fresh `RemoteReceiver` with the
/// runnable's registry and returns the `RemoteObjectReference` that comes
/// back in its place.
pub trait RemoteReceiver: Send {
  fn schema(&self) -> RemoteSchema;

  fn call_method(
    &mut self,
    name: &str,
    args: &[RemoteValue],
    kwargs: &BTreeMap<String, RemoteValue>,
  ) -> Result<RemoteValue, TraceableFailure>;

  fn get_attribute(&self, name: &str) -> Result<RemoteValue, TraceableFailure>;
}

/// Overridable extension points on a `CommandDrivenRunnable`'s loop. All
/// default to doing nothing; most runnables only implement `on_tick`.
pub trait TickHooks {
  fn on_tick(&mut self) {}
  fn pre_wait_hook(&mut self) {}
  fn post_wait_hook(&mut self) {}
}

#[cfg(test)]
mod tests {
  use super::*;

  struct Counter {
    value: i64,
  }

  impl RemoteReceiver for Counter {
    fn schema(&self) -> RemoteSchema {
      RemoteSchema::new(vec!["increment".to_string()], vec!["value".to_string()])
    }

    fn call_method(
      &mut self,
      name: &str,
      args: &[RemoteValue],
      _kwargs: &BTreeMap<String, RemoteValue>,
    ) -> Result<RemoteValue, TraceableFailure> {
      match name {
        "increment" => {
          let by = args.first().and_then(RemoteValue::as_int).unwrap_or(1);
          self.value += by;
          Ok(RemoteValue::Int(self.value))
        }
        other => Err(TraceableFailure::capture("AttributeError", format!("no such method: {other}"))),
      }
    }

    fn get_attribute(&self, name: &str) -> Result<RemoteValue, TraceableFailure> {
      match name {
        "value" => Ok(RemoteValue::Int(self.value)),
        other => Err(TraceableFailure::capture("AttributeError", format!("no such attribute: {other}"))),
      }
    }
  }

  /// Struct implementing only the defaults, to confirm `TickHooks` is
  /// genuinely optional to override.
  struct Idle;
  impl TickHooks for Idle {}

  #[test]
  fn default_tick_hooks_are_all_no_ops() {
    let mut idle = Idle;
    idle.on_tick();
    idle.pre_wait_hook();
    idle.post_wait_hook();
  }

  #[test]
  fn call_method_dispatches_by_name_and_mutates_state() {
    let mut counter = Counter { value: 0 };
    let result = counter
      .call_method("increment", &[RemoteValue::Int(5)], &BTreeMap::new())
      .unwrap();
    assert_eq!(result, RemoteValue::Int(5));
    assert_eq!(counter.value, 5);
  }

  #[test]
  fn unknown_method_fails_without_touching_state() {
    let mut counter = Counter { value: 3 };
    let err = counter.call_method("decrement", &[], &BTreeMap::new()).unwrap_err();
    assert!(err.to_string().contains("decrement"));
    assert_eq!(counter.value, 3);
  }

  #[test]
  fn get_attribute_reads_the_current_value() {
    let counter = Counter { value: 9 };
    assert_eq!(counter.get_attribute("value").unwrap(), RemoteValue::Int(9));
    assert!(counter.get_attribute("missing").is_err());
  }

  #[test]
  fn schema_reports_the_registered_method_and_attribute() {
    let counter = Counter { value: 0 };
    let schema = counter.schema();
    assert!(schema.has_method("increment"));
    assert!(schema.has_attribute("value"));
    assert!(!schema.has_method("missing"));
  }
}
