// Copyright 2026 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// The conventional six log levels, numbered the way most structured
/// logging systems number them, so a `LoggingConfig` loaded from YAML can
/// carry plain integers or names and a section override compares correctly
/// by ordering. `Display`/`EnumString` are derived rather than hand-rolled,
/// matching how small configuration enums elsewhere in this workspace get
/// their string forms.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, TryFromPrimitive, Serialize, Deserialize, Display, EnumString,
)]
#[repr(u8)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "UPPERCASE")]
pub enum LogLevel {
  NotSet = 0,
  Debug = 10,
  Info = 20,
  Warn = 30,
  Error = 40,
  Fatal = 50,
}

impl From<log::Level> for LogLevel {
  fn from(level: log::Level) -> Self {
    match level {
      log::Level::Error => LogLevel::Error,
      log::Level::Warn => LogLevel::Warn,
      log::Level::Info => LogLevel::Info,
      log::Level::Debug => LogLevel::Debug,
      // `log` has no Fatal/NotSet; Trace is the finest grain it
      // offers and collapses into Debug here.
      log::Level::Trace => LogLevel::Debug,
    }
  }
}

impl From<LogLevel> for log::LevelFilter {
  fn from(level: LogLevel) -> Self {
    match level {
      LogLevel::NotSet => log::LevelFilter::Off,
      LogLevel::Debug => log::LevelFilter::Debug,
      LogLevel::Info => log::LevelFilter::Info,
      LogLevel::Warn => log::LevelFilter::Warn,
      LogLevel::Error => log::LevelFilter::Error,
      LogLevel::Fatal => log::LevelFilter::Error,
    }
  }
}

impl TryFrom<LogLevel> for log::Level {
  type Error = &'static str;

  fn try_from(level: LogLevel) -> Result<Self, Self::Error> {
    match level {
      LogLevel::NotSet => Err("LogLevel::NotSet has no corresponding log::Level"),
      LogLevel::Debug => Ok(log::Level::Debug),
      LogLevel::Info => Ok(log::Level::Info),
      LogLevel::Warn => Ok(log::Level::Warn),
      LogLevel::Error | LogLevel::Fatal => Ok(log::Level::Error),
    }
  }
}
