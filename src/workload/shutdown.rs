//! Cooperative stop signal
//!
//! A flag workers poll between operations, plus a channel whose sender is
//! dropped on trigger so anything blocked in `recv` wakes immediately.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;

/// Clonable stop signal shared by every worker thread
#[derive(Clone)]
pub struct Shutdown {
    inner: Arc<Inner>,
}

struct Inner {
    triggered: AtomicBool,
    sender: Mutex<Option<Sender<()>>>,
    receiver: Receiver<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (sender, receiver) = channel::bounded(0);
        Self {
            inner: Arc::new(Inner {
                triggered: AtomicBool::new(false),
                sender: Mutex::new(Some(sender)),
                receiver,
            }),
        }
    }

    /// Fire the signal; idempotent
    pub fn trigger(&self) {
        self.inner.triggered.store(true, Ordering::Release);
        self.inner.sender.lock().take();
    }

    pub fn is_triggered(&self) -> bool {
        self.inner.triggered.load(Ordering::Acquire)
    }

    /// Receiver that disconnects when the signal fires; for `select!`
    pub fn receiver(&self) -> Receiver<()> {
        self.inner.receiver.clone()
    }

    /// Sleep for `duration` or until triggered; true if triggered
    pub fn pause(&self, duration: Duration) -> bool {
        if duration.is_zero() {
            return self.is_triggered();
        }
        match self.inner.receiver.recv_timeout(duration) {
            Err(RecvTimeoutError::Timeout) => false,
            _ => true,
        }
    }

    /// Block until triggered
    pub fn wait(&self) {
        let _ = self.inner.receiver.recv();
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
