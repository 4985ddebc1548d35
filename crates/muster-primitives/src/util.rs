// Copyright 2026 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use log::debug;
use std::time::Instant;

/// Panics with a message naming `what` if `value` is `None`. Used in place
/// of a bare `.unwrap()` at points where an `Option` is populated by an
/// earlier, already-enforced step, so a violation is a programming error
/// worth naming rather than a generic panic location.
pub fn expect_set<T>(value: Option<T>, what: &str) -> T {
  match value {
    Some(v) => v,
    None => panic!("expected {} to be set by this point", what),
  }
}

/// Logs the wall-clock duration of `f` at `Debug` level, tagged with `name`.
pub fn timed<R>(name: &str, f: impl FnOnce() -> R) -> R {
  let start = Instant::now();
  let result = f();
  debug!("{} took {:?}", name, start.elapsed());
  result
}
