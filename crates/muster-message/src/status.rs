// Copyright 2026 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use crate::call_id::CallId;
use crate::failure::TraceableFailure;
use crate::value::RemoteValue;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RemoteOutcome {
  Value(RemoteValue),
  Failure(TraceableFailure),
}

/// A message sent from a hosted scope back to its owner's status buffer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StatusMessage {
  Started,
  RemoteResult {
    call_id: CallId,
    outcome: RemoteOutcome,
  },
}

impl StatusMessage {
  pub fn call_id(&self) -> Option<CallId> {
    match self {
      StatusMessage::Started => None,
      StatusMessage::RemoteResult { call_id, .. } => Some(*call_id),
    }
  }
}
