// Copyright 2026 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

/// Which side of a scope boundary code is currently running on. Used by
/// `muster-remote` to decide whether a call should be dispatched directly
/// (already in the hosted scope) or sent across the command buffer and
/// awaited (still in the owner scope).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeId {
  Owner,
  Hosted,
}
