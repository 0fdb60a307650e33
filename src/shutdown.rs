//! Process-wide shutdown request.
//!
//! The signal handler only flips a flag and wakes the waiter; the actual
//! shutdown sequence runs on the main thread.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

#[derive(Default)]
struct Inner {
    triggered: Mutex<bool>,
    cond: Condvar,
}

/// Cloneable one-way latch.
#[derive(Clone, Default)]
pub struct ShutdownSignal {
    inner: Arc<Inner>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        let mut triggered = self.inner.triggered.lock();
        *triggered = true;
        self.inner.cond.notify_all();
    }

    pub fn is_triggered(&self) -> bool {
        *self.inner.triggered.lock()
    }

    /// Block until [`trigger`](Self::trigger) has been called.
    pub fn wait(&self) {
        let mut triggered = self.inner.triggered.lock();
        while !*triggered {
            self.inner.cond.wait(&mut triggered);
        }
    }

    /// Like [`wait`](Self::wait) with an upper bound.  Returns whether the
    /// signal was triggered.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let mut triggered = self.inner.triggered.lock();
        if !*triggered {
            let _ = self.inner.cond.wait_while_for(&mut triggered, |t| !*t, timeout);
        }
        *triggered
    }
}
