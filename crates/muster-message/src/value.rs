// Copyright 2026 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use crate::remote_reference::RemoteObjectReference;
use serde::{Deserialize, Serialize};

/// The closed set of shapes an argument or a return value may take when
/// crossing a scope or process boundary. Reifying a fixed enum instead of
/// accepting arbitrary objects is what lets a proxy validate a call
/// locally, before anything is enqueued, rather than discovering a type it
/// cannot carry only after the hosted scope has already tried to unpack it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RemoteValue {
  Unit,
  Bool(bool),
  Int(i64),
  Float(f64),
  Str(String),
  Bytes(Vec<u8>),
  List(Vec<RemoteValue>),
  Reference(RemoteObjectReference),
  /// Stands in for a `RemoteObjectReference` argument that is being
  /// passed back into a call on the scope that already owns it, so the
  /// receiving side can resolve it to the live object rather than
  /// re-serializing a handle to itself.
  ReferencePlaceholder,
}

impl RemoteValue {
  pub fn as_str(&self) -> Option<&str> {
    match self {
      RemoteValue::Str(s) => Some(s.as_str()),
      _ => None,
    }
  }

  pub fn as_int(&self) -> Option<i64> {
    match self {
      RemoteValue::Int(i) => Some(*i),
      _ => None,
    }
  }
}
