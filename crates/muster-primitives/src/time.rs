// Copyright 2026 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use std::time::Instant;

/// A monotonic timestamp, used by the remote-call QoS ring buffer and by
/// any caller that needs to measure elapsed wall-clock time without the
/// discontinuities a wall-clock `SystemTime` can exhibit across a suspend
/// or an NTP step.
pub fn precision_timestamp() -> Instant {
  Instant::now()
}
