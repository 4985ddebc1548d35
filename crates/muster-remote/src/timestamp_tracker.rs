// Copyright 2026 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// A fixed-capacity ring of recent call timestamps, used by `RemoteHandle`
/// to detect an excessive call rate without keeping an unbounded history.
pub struct TimestampTracker {
  capacity: usize,
  entries: Mutex<VecDeque<Instant>>,
}

impl TimestampTracker {
  pub fn new(capacity: usize) -> Self {
    TimestampTracker {
      capacity,
      entries: Mutex::new(VecDeque::with_capacity(capacity)),
    }
  }

  pub fn record(&self, at: Instant) {
    let mut entries = self.entries.lock();
    entries.push_back(at);
    while entries.len() > self.capacity {
      entries.pop_front();
    }
  }

  /// How many recorded timestamps fall within `lookback` of `now`.
  pub fn entries_in_last(&self, lookback: Duration, now: Instant) -> usize {
    self.entries
      .lock()
      .iter()
      .filter(|t| now.saturating_duration_since(**t) <= lookback)
      .count()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn recording_beyond_capacity_discards_the_oldest_entries() {
    let tracker = TimestampTracker::new(2);
    let base = Instant::now();
    tracker.record(base);
    tracker.record(base + Duration::from_millis(1));
    tracker.record(base + Duration::from_millis(2));

    let now = base + Duration::from_millis(2);
    // Only the two most recent survive; a lookback covering all three
    // original instants should still only count two.
    assert_eq!(tracker.entries_in_last(Duration::from_secs(10), now), 2);
  }

  #[test]
  fn entries_in_last_excludes_timestamps_older_than_the_lookback() {
    let tracker = TimestampTracker::new(8);
    let base = Instant::now();
    tracker.record(base);
    tracker.record(base + Duration::from_millis(500));

    let now = base + Duration::from_millis(600);
    assert_eq!(tracker.entries_in_last(Duration::from_millis(200), now), 1);
    assert_eq!(tracker.entries_in_last(Duration::from_secs(1), now), 2);
  }
}
