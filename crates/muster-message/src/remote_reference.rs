// Copyright 2026 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Identifies one object living inside a hosted scope that cannot, or
/// should not, be copied across the boundary. Crossing it as a value
/// yields this handle instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReceiverId(pub u64);

/// The set of method and attribute names a `RemoteObjectReference` may
/// legally be used to call or read. Built once, at the point the reference
/// is created, rather than discovered per call — calling a name outside
/// this set fails locally before anything is enqueued.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteSchema {
  pub methods: BTreeSet<String>,
  pub attributes: BTreeSet<String>,
}

impl RemoteSchema {
  pub fn new(methods: impl IntoIterator<Item = String>, attributes: impl IntoIterator<Item = String>) -> Self {
    RemoteSchema {
      methods: methods.into_iter().collect(),
      attributes: attributes.into_iter().collect(),
    }
  }

  pub fn has_method(&self, name: &str) -> bool {
    self.methods.contains(name)
  }

  pub fn has_attribute(&self, name: &str) -> bool {
    self.attributes.contains(name)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteObjectReference {
  pub receiver_id: ReceiverId,
  pub schema: RemoteSchema,
}

impl PartialEq for RemoteSchema {
  fn eq(&self, other: &Self) -> bool {
    self.methods == other.methods && self.attributes == other.attributes
  }
}
impl Eq for RemoteSchema {}
