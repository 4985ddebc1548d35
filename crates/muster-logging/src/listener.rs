// Copyright 2026 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use crate::capture::MemoryCapture;
use crate::config::LoggingConfig;
use crate::history::ConfigurationHistory;
use crate::queue::LogQueue;
use crate::record::LogRecordWire;
use crate::sink::LogSink;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// How long the drain loop blocks on an empty queue before re-checking its
/// stop flag. Short enough that `stop()` is never meaningfully delayed.
const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// The single scope that performs real log output once any out-of-process
/// runner has activated. Launched once, handed a snapshot
/// of the owner's `ConfigurationHistory`, which it replays to reproduce
/// the owner's effective configuration before it starts draining the
/// shared `LogQueue` that every hosted scope (and the owner itself, once
/// this listener exists) now enqueues onto.
pub struct LogListener {
  config: Mutex<LoggingConfig>,
  queue: Arc<LogQueue>,
  sink: LogSink,
  captures: Arc<Mutex<HashMap<String, Arc<MemoryCapture>>>>,
  paused: AtomicBool,
  pending: Mutex<VecDeque<LogRecordWire>>,
  stop: Arc<AtomicBool>,
  drain_handle: Mutex<Option<JoinHandle<()>>>,
}

impl LogListener {
  /// Replays `history` into a fresh `LoggingConfig` and starts draining
  /// `queue` on a background thread. `captures` is shared with the
  /// owning `Logging` singleton so memory captures registered before or
  /// after this listener launches still see every relayed record.
  pub fn launch(
    history: &ConfigurationHistory,
    queue: Arc<LogQueue>,
    captures: Arc<Mutex<HashMap<String, Arc<MemoryCapture>>>>,
  ) -> Arc<Self> {
    let listener = Arc::new(LogListener {
      config: Mutex::new(history.replay_into_config()),
      queue,
      sink: LogSink::new(),
      captures,
      paused: AtomicBool::new(false),
      pending: Mutex::new(VecDeque::new()),
      stop: Arc::new(AtomicBool::new(false)),
      drain_handle: Mutex::new(None),
    });

    let worker = Arc::clone(&listener);
    let handle = thread::Builder::new()
      .name("muster-log-listener".to_string())
      .spawn(move || worker.drain_loop())
      .expect("failed to spawn log listener drain thread");
    *listener.drain_handle.lock() = Some(handle);
    listener
  }

  fn drain_loop(self: Arc<Self>) {
    while !self.stop.load(Ordering::SeqCst) {
      match self.queue.recv_timeout(DRAIN_POLL_INTERVAL) {
        Some(record) => self.receive(record),
        None => continue,
      }
    }
  }

  fn receive(&self, record: LogRecordWire) {
    if self.paused.load(Ordering::SeqCst) {
      self.pending.lock().push_back(record);
      return;
    }
    self.dispatch_one(record);
  }

  fn dispatch_one(&self, record: LogRecordWire) {
    for capture in self.captures.lock().values() {
      capture.offer(&record);
    }
    let config = self.config.lock();
    self.sink.dispatch(&config, &record);
  }

  /// Applies a fresh action to this listener's own replayed
  /// configuration, used when the owner calls an `override_*` method
  /// after the listener has already launched, so a long-running program
  /// can still tune a child process's effective output.
  pub fn apply(&self, action: &crate::history::ConfigAction) {
    use crate::history::ConfigAction;
    let mut config = self.config.lock();
    match action {
      ConfigAction::InitFromDict(loaded) => *config = loaded.clone(),
      ConfigAction::OverrideGlobalLevel(level) => config.override_global_level(*level),
      ConfigAction::OverrideSections(overrides) => config.override_sections(overrides),
      ConfigAction::OverrideRoot(level) => config.override_root(*level),
      _ => {}
    }
  }

  /// Stops temporarily draining new records without discarding them —
  /// meant for test instrumentation: records that arrive while paused
  /// are held in `pending` and written, in arrival order, as soon as
  /// `resume()` runs.
  pub fn pause(&self) {
    self.paused.store(true, Ordering::SeqCst);
  }

  pub fn resume(&self) {
    self.paused.store(false, Ordering::SeqCst);
    let drained: Vec<_> = self.pending.lock().drain(..).collect();
    for record in drained {
      self.dispatch_one(record);
    }
  }

  pub fn stop(&self) {
    self.stop.store(true, Ordering::SeqCst);
    if let Some(handle) = self.drain_handle.lock().take() {
      let _ = handle.join();
    }
  }
}

impl Drop for LogListener {
  fn drop(&mut self) {
    self.stop();
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::history::ConfigAction;
  use crate::level::LogLevel;
  use std::collections::BTreeMap;

  #[test]
  fn replays_history_and_drains_queued_records() {
    let history = ConfigurationHistory::new();
    history.record(ConfigAction::OverrideRoot(LogLevel::Debug));

    let queue = Arc::new(LogQueue::new("listener-test", 8));
    let _scope = queue.enter_scope();
    let captures = Arc::new(Mutex::new(HashMap::new()));
    let capture = Arc::new(MemoryCapture::new(LogLevel::Debug));
    captures.lock().insert("test".to_string(), Arc::clone(&capture));

    let listener = LogListener::launch(&history, Arc::clone(&queue), captures);

    queue.put(LogRecordWire {
      level: LogLevel::Debug,
      target: "muster::test".to_string(),
      message: "hello from a hosted scope".to_string(),
      module_path: None,
      file: None,
      line: None,
      process_tag: Some("child".to_string()),
    });

    let deadline = std::time::Instant::now() + Duration::from_secs(2);
    while capture.pop_captured_records().is_empty() && std::time::Instant::now() < deadline {
      thread::sleep(Duration::from_millis(20));
    }
    // pop_captured_records above already drained it for the check;
    // put another and assert it is seen this time, proving the
    // listener is draining continuously rather than once.
    queue.put(LogRecordWire {
      level: LogLevel::Debug,
      target: "muster::test".to_string(),
      message: "second".to_string(),
      module_path: None,
      file: None,
      line: None,
      process_tag: None,
    });
    let deadline = std::time::Instant::now() + Duration::from_secs(2);
    let mut seen = Vec::new();
    while seen.is_empty() && std::time::Instant::now() < deadline {
      seen = capture.pop_captured_records();
      if seen.is_empty() {
        thread::sleep(Duration::from_millis(20));
      }
    }
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].message, "second");

    listener.stop();
  }

  #[test]
  fn pause_holds_records_and_resume_delivers_them_in_order() {
    let history = ConfigurationHistory::new();
    let queue = Arc::new(LogQueue::new("pause-test", 8));
    let _scope = queue.enter_scope();
    let captures = Arc::new(Mutex::new(HashMap::new()));
    let capture = Arc::new(MemoryCapture::new(LogLevel::NotSet));
    captures.lock().insert("t".to_string(), Arc::clone(&capture));

    let listener = LogListener::launch(&history, Arc::clone(&queue), captures);
    listener.pause();

    for i in 0..3 {
      queue.put(LogRecordWire {
        level: LogLevel::Warn,
        target: "muster::test".to_string(),
        message: format!("msg-{i}"),
        module_path: None,
        file: None,
        line: None,
        process_tag: None,
      });
    }
    thread::sleep(Duration::from_millis(100));
    assert!(capture.pop_captured_records().is_empty());

    listener.resume();
    thread::sleep(Duration::from_millis(100));
    let records = capture.pop_captured_records();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].message, "msg-0");
    assert_eq!(records[2].message, "msg-2");

    listener.stop();
  }
}
