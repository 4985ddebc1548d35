// Copyright 2026 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use crate::capture::MemoryCapture;
use crate::config::LoggingConfig;
use crate::enqueue_logger::EnqueueLogger;
use crate::error::LoggingError;
use crate::history::{ConfigAction, ConfigurationHistory};
use crate::listener::LogListener;
use crate::queue::LogQueue;
use crate::record::LogRecordWire;
use crate::sink::LogSink;
use log::{LevelFilter, Log, Metadata, Record};
use once_cell::sync::OnceCell;
use parking_lot::{Mutex, ReentrantMutex};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// How many relayed records a hosted scope's log queue holds before a
/// slow or paused listener starts applying backpressure to its producers.
const LOG_QUEUE_CAPACITY: usize = 4096;

static GLOBAL: OnceCell<Logging> = OnceCell::new();

/// The single process-wide facade over every logging concern this crate
/// offers: configuration (with a replayable history so a
/// freshly forked or spawned scope can reproduce it), direct dispatch
/// before any out-of-process runner exists, relayed dispatch through a
/// `LogListener` afterwards, and the named in-memory captures tests use to
/// assert on emitted records. `guard` is a single coarse re-entrant lock
/// serializing every public mutator against every other — the individual
/// fields already use their own finer-grained locks for the hot read path
/// (`effective_level` lookups on every log call), but every call that
/// changes the configuration or the capture set goes through `guard` so two
/// concurrent `override_*` calls cannot interleave into a config neither
/// caller intended.
pub struct Logging {
  guard: ReentrantMutex<()>,
  history: ConfigurationHistory,
  config: Mutex<LoggingConfig>,
  sink: LogSink,
  captures: Arc<Mutex<HashMap<String, Arc<MemoryCapture>>>>,
  enqueue_logger: OnceCell<EnqueueLogger>,
  listener: Mutex<Option<Arc<LogListener>>>,
  relay_active: AtomicBool,
  process_tag: Mutex<Option<String>>,
}

impl Logging {
  fn new() -> Self {
    Logging {
      guard: ReentrantMutex::new(()),
      history: ConfigurationHistory::new(),
      config: Mutex::new(LoggingConfig::default()),
      sink: LogSink::new(),
      captures: Arc::new(Mutex::new(HashMap::new())),
      enqueue_logger: OnceCell::new(),
      listener: Mutex::new(None),
      relay_active: AtomicBool::new(false),
      process_tag: Mutex::new(None),
    }
  }

  /// The process-wide singleton. First access installs the global
  /// `log::Log` and registers this crate's two `muster-runner` activation
  /// hooks, so the very first time any code anywhere calls `log::info!`
  /// or starts a `ProcessRunner`, the relay machinery is already wired up.
  pub fn global() -> &'static Logging {
    GLOBAL.get_or_init(|| {
      let logging = Logging::new();
      logging
    });
    let logging = GLOBAL.get().expect("just initialized above");
    install_global_dispatcher();
    register_runner_hooks();
    logging
  }

  /// Loads a YAML configuration file, replacing the current configuration
  /// and recording the action so later-launched scopes replay it too.
  pub fn init_from_file(&self, path: impl AsRef<Path>) -> Result<(), LoggingError> {
    let _held = self.guard.lock();
    let loaded = LoggingConfig::from_file(path.as_ref())?;
    *self.config.lock() = loaded.clone();
    self.history.record(ConfigAction::InitFromFile(path.as_ref().to_path_buf()));
    let dict_action = ConfigAction::InitFromDict(loaded);
    self.history.record(dict_action.clone());
    self.listener_apply(&dict_action);
    Ok(())
  }

  /// Installs `config` directly, bypassing the file-parsing step — the
  /// programmatic equivalent of `init_from_file` for configs built in
  /// code.
  pub fn init_from_dict(&self, config: LoggingConfig) {
    let _held = self.guard.lock();
    *self.config.lock() = config.clone();
    let action = ConfigAction::InitFromDict(config);
    self.history.record(action.clone());
    self.listener_apply(&action);
  }

  pub fn override_global_level(&self, level: crate::level::LogLevel) {
    let _held = self.guard.lock();
    self.config.lock().override_global_level(level);
    let action = ConfigAction::OverrideGlobalLevel(level);
    self.history.record(action.clone());
    self.listener_apply(&action);
    self.resnapshot_enqueue_logger_level();
  }

  pub fn override_sections(&self, overrides: BTreeMap<String, crate::level::LogLevel>) {
    let _held = self.guard.lock();
    self.config.lock().override_sections(&overrides);
    let action = ConfigAction::OverrideSections(overrides);
    self.history.record(action.clone());
    self.listener_apply(&action);
    self.resnapshot_enqueue_logger_level();
  }

  pub fn override_root(&self, level: crate::level::LogLevel) {
    let _held = self.guard.lock();
    self.config.lock().override_root(level);
    let action = ConfigAction::OverrideRoot(level);
    self.history.record(action.clone());
    self.listener_apply(&action);
    self.resnapshot_enqueue_logger_level();
  }

  /// Drops back to a fresh default configuration and clears the replay
  /// history, the way a test harness resets state between cases.
  pub fn reset(&self) {
    let _held = self.guard.lock();
    *self.config.lock() = LoggingConfig::default();
    self.history.clear();
  }

  pub fn add_memory_capture(&self, name: impl Into<String>, level: crate::level::LogLevel) -> Arc<MemoryCapture> {
    let _held = self.guard.lock();
    let name = name.into();
    let capture = Arc::new(MemoryCapture::new(level));
    self.captures.lock().insert(name.clone(), Arc::clone(&capture));
    self.history.record(ConfigAction::AddMemoryCapture { name, level });
    capture
  }

  pub fn remove_memory_capture(&self, name: &str) -> Result<(), LoggingError> {
    let _held = self.guard.lock();
    if self.captures.lock().remove(name).is_none() {
      return Err(LoggingError::UnknownMemoryCapture(name.to_string()));
    }
    self.history.record(ConfigAction::RemoveMemoryCapture { name: name.to_string() });
    Ok(())
  }

  pub fn pause_memory_capture(&self, name: &str) -> Result<(), LoggingError> {
    let _held = self.guard.lock();
    let capture = self
      .captures
      .lock()
      .get(name)
      .cloned()
      .ok_or_else(|| LoggingError::UnknownMemoryCapture(name.to_string()))?;
    capture.pause();
    self.history.record(ConfigAction::PauseMemoryCapture { name: name.to_string() });
    Ok(())
  }

  pub fn resume_memory_capture(&self, name: &str) -> Result<(), LoggingError> {
    let _held = self.guard.lock();
    let capture = self
      .captures
      .lock()
      .get(name)
      .cloned()
      .ok_or_else(|| LoggingError::UnknownMemoryCapture(name.to_string()))?;
    capture.resume();
    self.history.record(ConfigAction::ResumeMemoryCapture { name: name.to_string() });
    Ok(())
  }

  pub fn get_captured_records(&self, name: &str) -> Result<Vec<LogRecordWire>, LoggingError> {
    let captures = self.captures.lock();
    let capture = captures
      .get(name)
      .ok_or_else(|| LoggingError::UnknownMemoryCapture(name.to_string()))?;
    Ok(capture.pop_captured_records())
  }

  /// Called from the `muster-runner` first-process-runner hook, before
  /// the first `ProcessRunner` ever forks. Flips relaying on (so the
  /// forked child inherits it already-true), lazily creates the shared
  /// log queue, enters this process's own scope on it, and launches the
  /// `LogListener` that will perform real output from here on, for both
  /// this process's own records and every hosted child's.
  pub(crate) fn activate_relay(&self) {
    let _held = self.guard.lock();
    if self.relay_active.swap(true, Ordering::SeqCst) {
      return;
    }
    let queue = Arc::new(LogQueue::new("muster-logging-relay", LOG_QUEUE_CAPACITY));
    // Leaked deliberately: the owner process's scope over the shared
    // log queue lasts for the rest of the process's life, just like
    // the listener itself.
    std::mem::forget(queue.enter_scope());

    let max_level = LevelFilter::from(self.config.lock().widest_enabled_level());
    let _ = self.enqueue_logger.set(EnqueueLogger::new(Arc::clone(&queue), max_level));

    let listener = LogListener::launch(&self.history, queue, Arc::clone(&self.captures));
    *self.listener.lock() = Some(listener);
  }

  fn resnapshot_enqueue_logger_level(&self) {
    if let Some(logger) = self.enqueue_logger.get() {
      let max_level = LevelFilter::from(self.config.lock().widest_enabled_level());
      logger.set_max_level(max_level);
    }
  }

  /// Called from the `muster-runner` child-process-start hook, inside a
  /// freshly forked child, before its runnable begins executing. Tags
  /// every record this child relays with its runnable's name.
  pub(crate) fn set_process_tag(&self, tag: impl Into<String>) {
    *self.process_tag.lock() = Some(tag.into());
  }

  fn listener_apply(&self, action: &ConfigAction) {
    if let Some(listener) = self.listener.lock().as_ref() {
      listener.apply(action);
    }
  }

  fn effective_level(&self, target: &str) -> crate::level::LogLevel {
    self.config.lock().effective_level(target)
  }

  /// The single dispatch point every log record reaches, whether it came
  /// from this process directly or was relayed from a hosted child: offer
  /// it to every memory capture, then let the sink render it per the
  /// current configuration.
  fn dispatch_direct(&self, record: &LogRecordWire) {
    for capture in self.captures.lock().values() {
      capture.offer(record);
    }
    let config = self.config.lock();
    self.sink.dispatch(&config, record);
  }
}

fn register_runner_hooks() {
  static REGISTERED: std::sync::Once = std::sync::Once::new();
  REGISTERED.call_once(|| {
    muster_runner::set_first_process_runner_hook(|| {
      Logging::global().activate_relay();
    });
    muster_runner::set_child_process_start_hook(|runnable_name| {
      Logging::global().set_process_tag(runnable_name);
    });
  });
}

fn install_global_dispatcher() {
  static INSTALLED: std::sync::Once = std::sync::Once::new();
  INSTALLED.call_once(|| {
    // `log::set_max_level` is left at its widest (Trace); this crate's
    // own `effective_level` lookup is the authority on what actually
    // gets dispatched, so `log`'s own filtering would only ever agree
    // with or be stricter than ours — never the useful kind of strict.
    log::set_max_level(LevelFilter::Trace);
    let _ = log::set_boxed_logger(Box::new(GlobalDispatchLogger));
  });
}

/// The `log::Log` installed exactly once per process. Before
/// any out-of-process runner has activated, every record is dispatched
/// directly; afterwards, a record is either enqueued for the listener to
/// relay (if this process is itself a hosted scope with a queue to put
/// onto) or, in the owner process, still dispatched directly — the owner
/// already holds the real sink the listener also uses.
struct GlobalDispatchLogger;

impl Log for GlobalDispatchLogger {
  fn enabled(&self, metadata: &Metadata) -> bool {
    let logging = Logging::global();
    metadata.level() <= LevelFilter::from(logging.effective_level(metadata.target()))
  }

  fn log(&self, record: &Record) {
    if !self.enabled(record.metadata()) {
      return;
    }
    let logging = Logging::global();
    let mut wire = LogRecordWire::from_record(record);
    if let Some(tag) = logging.process_tag.lock().clone() {
      wire = wire.with_process_tag(tag);
    }

    if logging.relay_active.load(Ordering::SeqCst) {
      if let Some(enqueue_logger) = logging.enqueue_logger.get() {
        enqueue_logger.enqueue(wire);
        return;
      }
    }
    logging.dispatch_direct(&wire);
  }

  fn flush(&self) {}
}
