// Copyright 2026 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use std::fmt;
use uuid::Uuid;

/// Identifies one in-flight remote call so its `StatusMessage::RemoteResult`
/// can be matched back to the waiter that issued it, even when other
/// traffic is interleaved on the same status buffer. Backed by `uuid`, the
/// same crate this workspace's own handler-registration ids are built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct CallId(Uuid);

impl CallId {
  /// A fresh, effectively-unique id: 128 random bits rendered as lowercase
  /// hex when displayed.
  pub fn new() -> Self {
    CallId(Uuid::new_v4())
  }

  /// The reserved all-zero id, never produced by `new()`. Used by
  /// `muster-runner`'s process-hosted runner to carry the hosted
  /// process's own completion outcome back over the same status wire a
  /// real remote call's `RemoteResult` travels on, without adding a third
  /// `StatusMessage` variant.
  pub const fn nil() -> Self {
    CallId(Uuid::nil())
  }
}

impl Default for CallId {
  fn default() -> Self {
    Self::new()
  }
}

impl fmt::Display for CallId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0.simple())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fresh_ids_are_distinct_and_never_nil() {
    let a = CallId::new();
    let b = CallId::new();
    assert_ne!(a, b);
    assert_ne!(a, CallId::nil());
  }

  #[test]
  fn displays_as_lowercase_hex() {
    let rendered = CallId::new().to_string();
    assert_eq!(rendered.len(), 32);
    assert!(rendered.chars().all(|c| c.is_ascii_hexdigit() && !c.is_uppercase()));
  }
}
