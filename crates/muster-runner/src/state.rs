// Copyright 2026 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

/// Runner lifecycle, per the state table: `fresh -> starting -> running ->
/// stopping -> stopped|failed`. A runner is single-use; there is no
/// transition back to `fresh`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
  Fresh,
  Starting,
  Running,
  Stopping,
  Stopped,
  Failed,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn states_are_distinguishable_and_copy() {
    let a = RunnerState::Fresh;
    let b = a;
    assert_eq!(a, b);
    assert_ne!(RunnerState::Running, RunnerState::Stopped);
  }
}
