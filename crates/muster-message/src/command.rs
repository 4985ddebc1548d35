// Copyright 2026 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use crate::call_id::CallId;
use crate::remote_reference::ReceiverId;
use crate::value::RemoteValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A message sent from an owner scope into a hosted scope's command
/// buffer. `Stop` is the only one the hosted scope must always understand;
/// `RemoteCall`/`RemoteGet` are dispatched through a `CommandDrivenRunnable`'s
/// registration table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CommandMessage {
  Stop,
  RemoteCall {
    call_id: CallId,
    target_name: String,
    receiver_id: Option<ReceiverId>,
    args: Vec<RemoteValue>,
    kwargs: BTreeMap<String, RemoteValue>,
  },
  RemoteGet {
    call_id: CallId,
    attr_name: String,
    receiver_id: Option<ReceiverId>,
  },
}

impl CommandMessage {
  pub fn call_id(&self) -> Option<CallId> {
    match self {
      CommandMessage::Stop => None,
      CommandMessage::RemoteCall { call_id, .. } => Some(*call_id),
      CommandMessage::RemoteGet { call_id, .. } => Some(*call_id),
    }
  }
}
