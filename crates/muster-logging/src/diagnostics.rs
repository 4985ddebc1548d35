// Copyright 2026 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use crate::config::LoggingConfig;

/// Writes the name, effective level, and handler list of every configured
/// logger directly to stdout. Never routed through `log`, to avoid the
/// same recursion hazard the rest of this crate's failure policy avoids.
pub fn print_all_loggers_for_process(config: &LoggingConfig) {
  println!("root: level={} handlers={:?}", config.root.level, config.root.handlers);
  for (name, logger) in &config.loggers {
    println!(
      "{name}: level={} propagate={} handlers={:?}",
      logger.level, logger.propagate, logger.handlers
    );
  }
}

/// Writes the resolved mechanics (effective level, which handlers a record
/// from it would reach) for one named logger.
pub fn print_logging_mechanics_for_logger(config: &LoggingConfig, logger_name: &str) {
  let effective_level = config.effective_level(logger_name);
  let handlers = config
    .loggers
    .get(logger_name)
    .map(|cfg| cfg.handlers.clone())
    .filter(|handlers| !handlers.is_empty())
    .unwrap_or_else(|| config.root.handlers.clone());
  println!("{logger_name}: effective_level={effective_level} handlers={handlers:?}");
}
