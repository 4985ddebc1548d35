// Copyright 2026 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoggingError {
  #[error("could not read logging config file {0}: {1}")]
  ReadConfigFile(PathBuf, #[source] std::io::Error),
  #[error("could not parse logging config: {0}")]
  Parse(#[from] serde_yaml::Error),
  #[error("no memory capture handler named '{0}' is registered")]
  UnknownMemoryCapture(String),
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn unknown_memory_capture_message_names_the_handler() {
    let err = LoggingError::UnknownMemoryCapture("test-handler".to_string());
    assert_eq!(err.to_string(), "no memory capture handler named 'test-handler' is registered");
  }

  #[test]
  fn read_config_file_message_names_the_path() {
    let err = LoggingError::ReadConfigFile(
      PathBuf::from("/tmp/logging.yaml"),
      std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
    );
    assert!(err.to_string().contains("/tmp/logging.yaml"));
  }

  #[test]
  fn parse_wraps_a_serde_yaml_error() {
    let yaml_err = serde_yaml::from_str::<i32>("not: valid: : yaml: -").unwrap_err();
    let err: LoggingError = yaml_err.into();
    assert!(matches!(err, LoggingError::Parse(_)));
  }
}
