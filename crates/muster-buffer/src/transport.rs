// Copyright 2026 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TrySendError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// The minimal operations a `ManagedQueue` needs from whatever carries its
/// items. Thread-hosted and process-hosted queues implement the same
/// interface over different internal machinery.
pub trait Transport<T: Send + 'static>: Send {
  fn try_put(&self, item: T) -> Result<(), T>;
  fn recv_timeout(&self, timeout: Duration) -> Option<T>;
  /// Shuts the transport down: after this returns, no further items will
  /// be delivered. Called once, when the owning `ManagedQueue` exits
  /// scope for the last time.
  fn close(&mut self);
}

/// Backed directly by `std::sync::mpsc`, which is already a bounded (when
/// constructed with `sync_channel`) multi-producer single-consumer queue —
/// exactly what an in-process command/status buffer needs.
pub struct ThreadQueueTransport<T> {
  sender: SyncSender<T>,
  receiver: Receiver<T>,
}

impl<T: Send + 'static> ThreadQueueTransport<T> {
  pub fn new(capacity: usize) -> Self {
    let (sender, receiver) = mpsc::sync_channel(capacity.max(1));
    ThreadQueueTransport { sender, receiver }
  }

  pub fn sender(&self) -> SyncSender<T> {
    self.sender.clone()
  }
}

impl<T: Send + 'static> Transport<T> for ThreadQueueTransport<T> {
  fn try_put(&self, item: T) -> Result<(), T> {
    match self.sender.try_send(item) {
      Ok(()) => Ok(()),
      Err(TrySendError::Full(item)) => Err(item),
      Err(TrySendError::Disconnected(item)) => Err(item),
    }
  }

  fn recv_timeout(&self, timeout: Duration) -> Option<T> {
    match self.receiver.recv_timeout(timeout) {
      Ok(item) => Some(item),
      Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
    }
  }

  fn close(&mut self) {
    // Dropping the sender would disconnect the channel for other
    // clones; since a ManagedQueue owns exactly one sender/receiver
    // pair there is nothing further to release here beyond what Drop
    // already does.
  }
}

/// The cross-process flavor. Backed by a real OS pipe created before the
/// hosting `muster_runner::ProcessRunner` forks, so both the owner process
/// and the forked hosted process inherit a valid end of it (pipe file
/// descriptors survive `fork()`). Items are newline-delimited JSON, chosen
/// for its portability across that same fork boundary for exactly this
/// purpose.
///
/// The consuming side's background feeder thread is started lazily, on
/// the first `recv_timeout` call made in whichever process actually ends
/// up consuming: `fork()` only duplicates the calling thread, so a thread
/// started before the fork would simply not exist in the other process.
pub struct ProcessQueueTransport<T: Send + 'static> {
  write_file: parking_lot::Mutex<File>,
  inbox_rx: Receiver<T>,
  inbox_tx: SyncSender<T>,
  reader: parking_lot::Mutex<ReaderState>,
  stop: Arc<AtomicBool>,
}

struct ReaderState {
  read_file: Option<File>,
  handle: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> ProcessQueueTransport<T> {
  pub fn new(capacity: usize) -> Self {
    let (read_fd, write_fd) =
      nix::unistd::pipe().expect("failed to create pipe for process queue transport");
    let (inbox_tx, inbox_rx) = mpsc::sync_channel(capacity.max(1));
    ProcessQueueTransport {
      write_file: parking_lot::Mutex::new(File::from(write_fd)),
      inbox_rx,
      inbox_tx,
      reader: parking_lot::Mutex::new(ReaderState {
        read_file: Some(File::from(read_fd)),
        handle: None,
      }),
      stop: Arc::new(AtomicBool::new(false)),
    }
  }

  fn ensure_reader_started(&self)
  where
    T: DeserializeOwned,
  {
    let mut state = self.reader.lock();
    if state.handle.is_some() {
      return;
    }
    if let Some(read_file) = state.read_file.take() {
      let sender = self.inbox_tx.clone();
      let stop = Arc::clone(&self.stop);
      let handle = thread::Builder::new()
        .name("muster-process-queue-feeder".to_string())
        .spawn(move || feed_from_pipe(read_file, sender, stop))
        .expect("failed to spawn process queue feeder thread");
      state.handle = Some(handle);
    }
  }
}

/// Background loop that reads newline-delimited JSON frames off `read_file`
/// and forwards decoded items into `sender`, until the write end closes
/// (`read()` returns `0`) or `stop` is raised by `close()`. The read end is
/// switched to non-blocking so the loop can observe `stop` promptly instead
/// of being stuck in a blocking `read()` forever.
fn feed_from_pipe<T: DeserializeOwned + Send + 'static>(
  mut read_file: File,
  sender: SyncSender<T>,
  stop: Arc<AtomicBool>,
) {
  use nix::fcntl::{fcntl, FcntlArg, OFlag};
  use std::os::fd::AsRawFd;

  if let Err(err) = fcntl(read_file.as_raw_fd(), FcntlArg::F_SETFL(OFlag::O_NONBLOCK)) {
    eprintln!("error switching process queue read end to non-blocking: {err}");
    return;
  }

  let mut pending = Vec::new();
  let mut chunk = [0u8; 4096];
  loop {
    if stop.load(Ordering::SeqCst) {
      return;
    }
    match read_file.read(&mut chunk) {
      Ok(0) => return,
      Ok(n) => {
        pending.extend_from_slice(&chunk[..n]);
        while let Some(pos) = pending.iter().position(|b| *b == b'\n') {
          let line: Vec<u8> = pending.drain(..=pos).collect();
          let line = &line[..line.len() - 1];
          match serde_json::from_slice::<T>(line) {
            Ok(item) => {
              if sender.send(item).is_err() {
                return;
              }
            }
            Err(err) => eprintln!("error decoding process queue frame: {err}"),
          }
        }
      }
      Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
        thread::sleep(Duration::from_millis(20));
      }
      Err(_) => return,
    }
  }
}

impl<T: Send + 'static> Transport<T> for ProcessQueueTransport<T>
where
  T: Serialize + DeserializeOwned,
{
  fn try_put(&self, item: T) -> Result<(), T> {
    let mut encoded = match serde_json::to_vec(&item) {
      Ok(bytes) => bytes,
      Err(_) => return Err(item),
    };
    encoded.push(b'\n');
    match self.write_file.lock().write_all(&encoded) {
      Ok(()) => Ok(()),
      Err(_) => Err(item),
    }
  }

  fn recv_timeout(&self, timeout: Duration) -> Option<T> {
    self.ensure_reader_started();
    match self.inbox_rx.recv_timeout(timeout) {
      Ok(item) => Some(item),
      Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
    }
  }

  fn close(&mut self) {
    self.stop.store(true, Ordering::SeqCst);
    if let Some(handle) = self.reader.lock().handle.take() {
      if let Err(err) = handle.join() {
        eprintln!("error joining process queue feeder thread: {err:?}");
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn thread_transport_put_and_recv_round_trip() {
    let transport = ThreadQueueTransport::new(2);
    assert!(transport.try_put(1).is_ok());
    assert_eq!(transport.recv_timeout(Duration::from_secs(1)), Some(1));
  }

  #[test]
  fn thread_transport_try_put_fails_once_full() {
    let transport = ThreadQueueTransport::new(1);
    assert!(transport.try_put(1).is_ok());
    assert!(transport.try_put(2).is_err());
  }

  #[test]
  fn thread_transport_recv_times_out_when_empty() {
    let transport: ThreadQueueTransport<i32> = ThreadQueueTransport::new(1);
    assert_eq!(transport.recv_timeout(Duration::from_millis(20)), None);
  }

  #[test]
  fn process_transport_carries_items_across_the_pipe() {
    let transport: ProcessQueueTransport<i32> = ProcessQueueTransport::new(4);
    transport.try_put(7).unwrap();
    transport.try_put(8).unwrap();

    assert_eq!(transport.recv_timeout(Duration::from_secs(2)), Some(7));
    assert_eq!(transport.recv_timeout(Duration::from_secs(2)), Some(8));
  }
}
