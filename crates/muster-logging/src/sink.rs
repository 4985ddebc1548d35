// Copyright 2026 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use crate::config::{HandlerConfig, HandlerKind, LoggingConfig};
use crate::record::LogRecordWire;
use colored::Colorize;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

/// Performs the actual I/O a `LoggingConfig` describes: which handlers a
/// record reaches is decided by the logger it matched (or root, if none
/// did); each handler renders to either the console or an open file.
/// Exactly one `LogSink` exists per process that ever does real output —
/// the owner process before any out-of-process runner activates, and the
/// log listener scope afterwards, using its replayed configuration to
/// decide final output.
pub struct LogSink {
  files: Mutex<HashMap<String, File>>,
}

impl LogSink {
  pub fn new() -> Self {
    LogSink {
      files: Mutex::new(HashMap::new()),
    }
  }

  /// Handler names a record should be rendered to, per `config`: the
  /// matching logger's own handler list if one was configured for a
  /// name-prefix of `record.target`, else the root logger's handlers.
  fn handlers_for(&self, config: &LoggingConfig, record: &LogRecordWire) -> Vec<String> {
    let mut best: Option<(&str, &[String])> = None;
    for (name, cfg) in &config.loggers {
      if record.target == *name || record.target.starts_with(&format!("{name}.")) {
        let better = match best {
          Some((best_name, _)) => name.len() > best_name.len(),
          None => true,
        };
        if better {
          best = Some((name.as_str(), &cfg.handlers));
        }
      }
    }
    match best {
      Some((_, handlers)) if !handlers.is_empty() => handlers.to_vec(),
      _ => config.root.handlers.clone(),
    }
  }

  pub fn dispatch(&self, config: &LoggingConfig, record: &LogRecordWire) {
    if record.level < config.effective_level(&record.target) {
      return;
    }
    for handler_name in self.handlers_for(config, record) {
      let Some(handler) = config.handlers.get(&handler_name) else {
        continue;
      };
      if record.level < handler.level && handler.level != crate::level::LogLevel::NotSet {
        continue;
      }
      self.write_to_handler(&handler_name, handler, record);
    }
  }

  fn write_to_handler(&self, handler_name: &str, handler: &HandlerConfig, record: &LogRecordWire) {
    let line = render_line(record);
    match &handler.kind {
      HandlerKind::Console => {
        println!("{}", colorize(record, &line));
      }
      HandlerKind::File { filename, .. } => {
        if let Err(err) = self.write_to_file(handler_name, filename, &line) {
          // Directory-creation and file-write failures are
          // printed to stderr, never routed back through
          // `log`, which would recurse.
          eprintln!("error writing log file for handler '{handler_name}': {err}");
        }
      }
    }
  }

  fn write_to_file(&self, handler_name: &str, filename: &Path, line: &str) -> std::io::Result<()> {
    let mut files = self.files.lock().expect("log sink file map lock poisoned");
    if !files.contains_key(handler_name) {
      if let Some(dir) = filename.parent() {
        if !dir.as_os_str().is_empty() {
          std::fs::create_dir_all(dir)?;
        }
      }
      let file = OpenOptions::new().create(true).append(true).open(filename)?;
      files.insert(handler_name.to_string(), file);
    }
    let file = files.get_mut(handler_name).expect("just inserted above");
    writeln!(file, "{line}")?;
    file.flush()
  }
}

impl Default for LogSink {
  fn default() -> Self {
    Self::new()
  }
}

fn render_line(record: &LogRecordWire) -> String {
  let now = chrono::Local::now();
  let time_str = now.format("%H:%M:%S%.2f");
  match &record.process_tag {
    Some(tag) => format!("{} [{}] ({}) {}", time_str, record.level, tag, record.message),
    None => format!("{} [{}] {}", time_str, record.level, record.message),
  }
}

fn colorize(record: &LogRecordWire, line: &str) -> colored::ColoredString {
  match record.level {
    crate::level::LogLevel::Error | crate::level::LogLevel::Fatal => line.red(),
    crate::level::LogLevel::Warn => line.yellow(),
    crate::level::LogLevel::Debug => line.green(),
    crate::level::LogLevel::Info | crate::level::LogLevel::NotSet => line.normal(),
  }
}
