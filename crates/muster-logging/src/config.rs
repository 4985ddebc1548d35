// Copyright 2026 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use crate::error::LoggingError;
use crate::level::LogLevel;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Where one named handler sends the records it receives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum HandlerKind {
  Console,
  /// `filename` is created (directories included) the first time this
  /// handler is realized by the listener scope, unless `delay` is set,
  /// in which case creation is deferred until the first record actually
  /// arrives.
  File { filename: PathBuf, delay: bool },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandlerConfig {
  pub level: LogLevel,
  #[serde(flatten)]
  pub kind: HandlerKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggerConfig {
  pub level: LogLevel,
  #[serde(default = "default_propagate")]
  pub propagate: bool,
  #[serde(default)]
  pub handlers: Vec<String>,
}

fn default_propagate() -> bool {
  true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootConfig {
  pub level: LogLevel,
  #[serde(default = "default_root_handlers")]
  pub handlers: Vec<String>,
}

fn default_root_handlers() -> Vec<String> {
  vec!["console".to_string()]
}

impl Default for RootConfig {
  fn default() -> Self {
    RootConfig {
      level: LogLevel::Warn,
      handlers: default_root_handlers(),
    }
  }
}

/// The full, typed shape of a logging configuration file: version, a
/// disable-existing-loggers flag, named handlers, named loggers
/// with level/propagation, and a root logger. Missing sections fall back
/// to the defaults documented on each field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
  #[serde(default = "default_version")]
  pub version: u32,
  #[serde(default)]
  pub disable_existing_loggers: bool,
  #[serde(default = "default_handlers")]
  pub handlers: BTreeMap<String, HandlerConfig>,
  #[serde(default)]
  pub loggers: BTreeMap<String, LoggerConfig>,
  #[serde(default)]
  pub root: RootConfig,
}

fn default_version() -> u32 {
  1
}

fn default_handlers() -> BTreeMap<String, HandlerConfig> {
  let mut handlers = BTreeMap::new();
  handlers.insert(
    "console".to_string(),
    HandlerConfig {
      level: LogLevel::NotSet,
      kind: HandlerKind::Console,
    },
  );
  handlers
}

impl Default for LoggingConfig {
  fn default() -> Self {
    LoggingConfig {
      version: default_version(),
      disable_existing_loggers: false,
      handlers: default_handlers(),
      loggers: BTreeMap::new(),
      root: RootConfig::default(),
    }
  }
}

impl LoggingConfig {
  pub fn from_yaml_str(contents: &str) -> Result<Self, LoggingError> {
    serde_yaml::from_str(contents).map_err(LoggingError::from)
  }

  pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LoggingError> {
    let contents = std::fs::read_to_string(path.as_ref())
      .map_err(|err| LoggingError::ReadConfigFile(path.as_ref().to_path_buf(), err))?;
    Self::from_yaml_str(&contents)
  }

  /// The effective level for `logger_name`, found by the longest
  /// dot-separated prefix match among configured loggers, falling back
  /// to the root level.
  pub fn effective_level(&self, logger_name: &str) -> LogLevel {
    let mut best: Option<(&str, LogLevel)> = None;
    for (name, cfg) in &self.loggers {
      if logger_name == name || logger_name.starts_with(&format!("{name}.")) {
        let better = match best {
          Some((best_name, _)) => name.len() > best_name.len(),
          None => true,
        };
        if better {
          best = Some((name.as_str(), cfg.level));
        }
      }
    }
    best.map(|(_, level)| level).unwrap_or(self.root.level)
  }

  /// Overrides every configured logger's level, as well as root, to
  /// `level`.
  pub fn override_global_level(&mut self, level: LogLevel) {
    for cfg in self.loggers.values_mut() {
      cfg.level = level;
    }
    self.root.level = level;
  }

  /// Sets/overrides the level of named sections, creating a logger entry
  /// if one did not already exist for that exact name; the prefix
  /// cascade is read back out by `effective_level` rather than eagerly
  /// applied to every descendant.
  pub fn override_sections(&mut self, section_overrides: &BTreeMap<String, LogLevel>) {
    for (name, level) in section_overrides {
      self.loggers
        .entry(name.clone())
        .and_modify(|cfg| cfg.level = *level)
        .or_insert_with(|| LoggerConfig {
          level: *level,
          propagate: true,
          handlers: Vec::new(),
        });
    }
  }

  pub fn override_root(&mut self, level: LogLevel) {
    self.root.level = level;
  }

  /// The most permissive (numerically lowest) level any configured
  /// logger or root would still accept — the snapshot a hosted scope's
  /// `EnqueueLogger` takes at spawn/reconfiguration time so it never
  /// filters out a record some more specific section still wants to see
  /// (the fine-grained, per-target decision is still made downstream, by
  /// `LogSink::dispatch` against the full configuration).
  pub fn widest_enabled_level(&self) -> LogLevel {
    self.loggers
      .values()
      .map(|cfg| cfg.level)
      .min()
      .map(|level| level.min(self.root.level))
      .unwrap_or(self.root.level)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_sections_fall_back_to_defaults() {
    let config = LoggingConfig::from_yaml_str("version: 1\n").unwrap();
    assert_eq!(config.root.level, LogLevel::Warn);
    assert!(config.handlers.contains_key("console"));
  }

  #[test]
  fn section_override_cascades_by_name_prefix() {
    let mut config = LoggingConfig::default();
    let mut overrides = BTreeMap::new();
    overrides.insert("muster.buffer".to_string(), LogLevel::Debug);
    config.override_sections(&overrides);

    assert_eq!(config.effective_level("muster.buffer"), LogLevel::Debug);
    assert_eq!(config.effective_level("muster.buffer.managed_queue"), LogLevel::Debug);
    assert_eq!(config.effective_level("muster.runner"), LogLevel::Warn);
  }

  #[test]
  fn file_handler_parses_filename_and_delay() {
    let yaml = r#"
handlers:
  app_file:
    level: info
    kind: file
    filename: /tmp/app.log
    delay: true
"#;
    let config = LoggingConfig::from_yaml_str(yaml).unwrap();
    match &config.handlers["app_file"].kind {
      HandlerKind::File { filename, delay } => {
        assert_eq!(filename, Path::new("/tmp/app.log"));
        assert!(delay);
      }
      other => panic!("expected a file handler, got {other:?}"),
    }
  }
}
