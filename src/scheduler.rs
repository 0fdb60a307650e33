//! Deferred one-shot stimuli.
//!
//! The orchestrator arms a timer for each timed behaviour step.  A single
//! worker thread owns the queue, sleeps until the earliest deadline and
//! hands the expired action to a [`TimerDelegate`] (the state machine in
//! production, a recorder in tests).
//!
//! ```text
//! ┌──────────────┐ schedule(delay, action) ┌────────────────────────────┐
//! │ Orchestrator │────────────────────────▶│ Mutex<Queue>  (≤ capacity) │
//! └──────────────┘                         └─────────────┬──────────────┘
//!                                                        │ wait_until(earliest)
//!                                                        ▼
//!                                             ┌─────────────────────┐
//!                                             │ "timer-queue" thread│──▶ TimerDelegate
//!                                             └─────────────────────┘    on_timer_fired
//! ```
//!
//! Each entry fires at most once.  A firing that arrives after its state
//! has moved on is delivered anyway; the transition table absorbs it.

use core::fmt;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, error, info};
use parking_lot::{Condvar, Mutex, MutexGuard};

use crate::app::ports::TimerDelegate;
use crate::error::{Error, TimerError};
use crate::fsm::Action;

// ═══════════════════════════════════════════════════════════════
//  Timer identity
// ═══════════════════════════════════════════════════════════════

/// Upper bound on the configurable queue capacity (stack-allocated).
pub const MAX_TIMERS: usize = 32;

/// Handle returned by [`TimerQueue::schedule`], usable with
/// [`TimerQueue::cancel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u32);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    id: TimerId,
    deadline: Instant,
    action: Action,
}

struct Queue {
    entries: heapless::Vec<Entry, MAX_TIMERS>,
    capacity: usize,
    next_id: u32,
    stopped: bool,
}

impl Queue {
    /// Index of the entry due first; ties go to the earlier schedule.
    fn earliest(&self) -> Option<(usize, Instant)> {
        self.entries
            .iter()
            .enumerate()
            .min_by_key(|(_, e)| (e.deadline, e.id))
            .map(|(i, e)| (i, e.deadline))
    }
}

struct Shared {
    queue: Mutex<Queue>,
    wake: Condvar,
}

// ═══════════════════════════════════════════════════════════════
//  Queue handle
// ═══════════════════════════════════════════════════════════════

/// Cloneable handle onto the timer queue.
#[derive(Clone)]
pub struct TimerQueue {
    shared: Arc<Shared>,
}

/// Owner of the worker thread.  Join it after [`TimerQueue::stop`].
pub struct TimerWorker {
    handle: JoinHandle<()>,
}

impl TimerQueue {
    /// Start the worker thread.  `capacity` is clamped to [`MAX_TIMERS`].
    pub fn spawn(
        delegate: Arc<dyn TimerDelegate>,
        capacity: usize,
    ) -> Result<(Self, TimerWorker), Error> {
        let shared = Arc::new(Shared {
            queue: Mutex::new(Queue {
                entries: heapless::Vec::new(),
                capacity: capacity.min(MAX_TIMERS),
                next_id: 0,
                stopped: false,
            }),
            wake: Condvar::new(),
        });

        let worker_shared = Arc::clone(&shared);
        let handle = thread::Builder::new()
            .name("timer-queue".into())
            .spawn(move || run_worker(&worker_shared, delegate.as_ref()))
            .map_err(|_| Error::Spawn("timer-queue"))?;

        info!("Timers: worker started (capacity {})", capacity.min(MAX_TIMERS));
        Ok((Self { shared }, TimerWorker { handle }))
    }

    /// Arm a one-shot timer delivering `action` after `delay`.
    pub fn schedule(&self, delay: Duration, action: Action) -> Result<TimerId, TimerError> {
        let mut q = self.shared.queue.lock();
        if q.stopped {
            return Err(TimerError::Stopped);
        }
        if q.entries.len() >= q.capacity {
            return Err(TimerError::QueueFull);
        }

        let id = TimerId(q.next_id);
        let entry = Entry {
            id,
            deadline: Instant::now() + delay,
            action,
        };
        q.entries.push(entry).map_err(|_| TimerError::QueueFull)?;
        q.next_id = q.next_id.wrapping_add(1);
        self.shared.wake.notify_one();

        debug!("Timers: {id} armed for {action} in {:.3}s", delay.as_secs_f32());
        Ok(id)
    }

    /// Drop a timer that has not fired yet.  Returns `false` if it already
    /// fired, was cancelled, or never existed.
    pub fn cancel(&self, id: TimerId) -> bool {
        let mut q = self.shared.queue.lock();
        match q.entries.iter().position(|e| e.id == id) {
            Some(idx) => {
                q.entries.swap_remove(idx);
                self.shared.wake.notify_one();
                debug!("Timers: {id} cancelled");
                true
            }
            None => false,
        }
    }

    /// Number of timers waiting to fire.
    pub fn pending(&self) -> usize {
        self.shared.queue.lock().entries.len()
    }

    /// Discard outstanding timers and tell the worker to exit.  Further
    /// `schedule` calls fail with [`TimerError::Stopped`].
    pub fn stop(&self) {
        let mut q = self.shared.queue.lock();
        if q.stopped {
            return;
        }
        let dropped = q.entries.len();
        q.entries.clear();
        q.stopped = true;
        self.shared.wake.notify_all();
        info!("Timers: stopped ({dropped} discarded)");
    }

    pub fn is_stopped(&self) -> bool {
        self.shared.queue.lock().stopped
    }
}

impl TimerWorker {
    pub fn join(self) {
        if self.handle.join().is_err() {
            error!("Timers: worker thread panicked");
        }
    }
}

fn run_worker(shared: &Shared, delegate: &dyn TimerDelegate) {
    let mut q = shared.queue.lock();
    loop {
        if q.stopped {
            break;
        }
        match q.earliest() {
            None => shared.wake.wait(&mut q),
            Some((idx, deadline)) if deadline <= Instant::now() => {
                let entry = q.entries.swap_remove(idx);
                // Deliver unlocked: the delegate may cause new timers to be armed.
                MutexGuard::unlocked(&mut q, || delegate.on_timer_fired(entry.id, entry.action));
            }
            Some((_, deadline)) => {
                let _ = shared.wake.wait_until(&mut q, deadline);
            }
        }
    }
    debug!("Timers: worker exiting");
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
