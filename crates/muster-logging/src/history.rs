// Copyright 2026 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use crate::config::LoggingConfig;
use crate::level::LogLevel;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// One configuration-mutating call, recorded in the order it happened so
/// it can be replayed into a fresh scope. Memory-capture actions carry
/// only the handler's name;
/// the queue/capacity a capture writes into is owner-scope-local and is
/// not meaningful to replay into a different process.
#[derive(Debug, Clone)]
pub enum ConfigAction {
  InitFromFile(PathBuf),
  InitFromDict(LoggingConfig),
  OverrideGlobalLevel(LogLevel),
  OverrideSections(BTreeMap<String, LogLevel>),
  OverrideRoot(LogLevel),
  AddMemoryCapture { name: String, level: LogLevel },
  RemoveMemoryCapture { name: String },
  PauseMemoryCapture { name: String },
  ResumeMemoryCapture { name: String },
}

/// An append-only, thread-safe log of every action so far, cloneable so a
/// copy can be handed to a freshly launched scope (the log listener, or a
/// grandchild) without sharing the owner's own lock. Replaying the
/// sequence into a fresh `LoggingConfig` reproduces the owner's effective
/// configuration there.
#[derive(Default)]
pub struct ConfigurationHistory {
  actions: Mutex<Vec<ConfigAction>>,
}

impl ConfigurationHistory {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn record(&self, action: ConfigAction) {
    self.actions.lock().push(action);
  }

  pub fn clear(&self) {
    self.actions.lock().clear();
  }

  /// A point-in-time copy of the recorded actions, independent of this
  /// history's own lock — what gets handed to a newly launched scope.
  pub fn snapshot(&self) -> Vec<ConfigAction> {
    self.actions.lock().clone()
  }

  /// Replays `actions` into a fresh `LoggingConfig`, starting from
  /// `LoggingConfig::default()`, in the order they were recorded.
  /// Memory-capture actions are no-ops here: they affect which handlers
  /// a *running* process captures to, not the replayable level/handler
  /// configuration a fresh scope starts from.
  pub fn replay(actions: &[ConfigAction]) -> LoggingConfig {
    let mut config = LoggingConfig::default();
    for action in actions {
      match action {
        ConfigAction::InitFromFile(_) => {
          // The listener scope is handed the owner's already-
          // loaded LoggingConfig via InitFromDict at launch time
          // (see LogListener::launch); a bare InitFromFile entry
          // with no corresponding file available in this scope
          // is left as a no-op rather than re-reading a path
          // that may not exist here.
        }
        ConfigAction::InitFromDict(loaded) => config = loaded.clone(),
        ConfigAction::OverrideGlobalLevel(level) => config.override_global_level(*level),
        ConfigAction::OverrideSections(overrides) => config.override_sections(overrides),
        ConfigAction::OverrideRoot(level) => config.override_root(*level),
        ConfigAction::AddMemoryCapture { .. }
        | ConfigAction::RemoveMemoryCapture { .. }
        | ConfigAction::PauseMemoryCapture { .. }
        | ConfigAction::ResumeMemoryCapture { .. } => {}
      }
    }
    config
  }

  pub fn replay_into_config(&self) -> LoggingConfig {
    Self::replay(&self.snapshot())
  }
}

impl Clone for ConfigurationHistory {
  fn clone(&self) -> Self {
    ConfigurationHistory {
      actions: Mutex::new(self.actions.lock().clone()),
    }
  }
}
