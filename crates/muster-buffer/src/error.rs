// Copyright 2026 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BufferError {
  #[error("cannot put into queue '{0}' outside of its scope")]
  QueueOutsideScope(String),
  #[error("queue '{0}' is closed")]
  Closed(String),
  #[error("timed out waiting on '{0}'")]
  Timeout(String),
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn display_messages_name_the_queue() {
    assert_eq!(
      BufferError::QueueOutsideScope("commands".to_string()).to_string(),
      "cannot put into queue 'commands' outside of its scope"
    );
    assert_eq!(BufferError::Closed("commands".to_string()).to_string(), "queue 'commands' is closed");
    assert_eq!(BufferError::Timeout("commands".to_string()).to_string(), "timed out waiting on 'commands'");
  }
}
