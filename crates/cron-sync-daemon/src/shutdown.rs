//! One-shot shutdown notification between the signal thread and the
//! scheduler loop.

use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};

/// Creates a connected trigger/listener pair with room for exactly one
/// pending notification.
pub fn shutdown_channel() -> (ShutdownTrigger, ShutdownListener) {
    let (tx, rx) = bounded(1);
    (ShutdownTrigger { tx }, ShutdownListener { rx })
}

#[derive(Debug, Clone)]
pub struct ShutdownTrigger {
    tx: Sender<()>,
}

impl ShutdownTrigger {
    /// Requests shutdown. Returns `false` when a request is already pending
    /// or the listener is gone; either way the call has no further effect.
    pub fn fire(&self) -> bool {
        self.tx.try_send(()).is_ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Elapsed,
    Shutdown,
}

#[derive(Debug)]
pub struct ShutdownListener {
    rx: Receiver<()>,
}

impl ShutdownListener {
    /// Blocks until `timeout` elapses or shutdown is requested, whichever
    /// comes first.
    ///
    /// If every trigger has been dropped without firing, no request can ever
    /// arrive and the full timeout is slept.
    pub fn wait(&self, timeout: Duration) -> WaitOutcome {
        match self.rx.recv_timeout(timeout) {
            Ok(()) => WaitOutcome::Shutdown,
            Err(RecvTimeoutError::Timeout) => WaitOutcome::Elapsed,
            Err(RecvTimeoutError::Disconnected) => {
                thread::sleep(timeout);
                WaitOutcome::Elapsed
            }
        }
    }
}
