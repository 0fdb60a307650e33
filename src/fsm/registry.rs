//! Fixed-capacity observer registry.
//!
//! Each registered observer owns one slot holding its id and a pending
//! flag.  The engine sets every flag on a real transition and each
//! observer clears its own flag when it consumes the change.  Slots live
//! in a `heapless::Vec`, so registration past capacity is a plain error
//! and never allocates.

use core::fmt;

use heapless::Vec;

use crate::error::FsmError;

/// Maximum number of simultaneously registered observers.
pub const MAX_OBSERVERS: usize = 10;

/// Identity handed out by [`StateMachine::register`](super::StateMachine::register).
///
/// Ids are assigned monotonically and never reused while the engine lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u32);

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug)]
struct Slot {
    id: ObserverId,
    pending: bool,
}

#[derive(Debug, Default)]
pub(crate) struct Registry {
    slots: Vec<Slot, MAX_OBSERVERS>,
    next_id: u32,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Add a new observer, pending so that its first wait returns at once.
    pub fn insert(&mut self) -> Result<ObserverId, FsmError> {
        let id = ObserverId(self.next_id);
        self.slots
            .push(Slot { id, pending: true })
            .map_err(|_| FsmError::RegistryFull)?;
        self.next_id = self.next_id.wrapping_add(1);
        Ok(id)
    }

    pub fn remove(&mut self, id: ObserverId) -> Result<(), FsmError> {
        let idx = self.position(id)?;
        self.slots.swap_remove(idx);
        Ok(())
    }

    /// Mark every observer pending.
    pub fn mark_all(&mut self) {
        for slot in &mut self.slots {
            slot.pending = true;
        }
    }

    /// Mark one observer pending.
    pub fn mark(&mut self, id: ObserverId) -> Result<(), FsmError> {
        let idx = self.position(id)?;
        self.slots[idx].pending = true;
        Ok(())
    }

    /// Consume the observer's pending flag, returning whether it was set.
    pub fn take_pending(&mut self, id: ObserverId) -> Result<bool, FsmError> {
        let idx = self.position(id)?;
        Ok(core::mem::replace(&mut self.slots[idx].pending, false))
    }

    fn position(&self, id: ObserverId) -> Result<usize, FsmError> {
        self.slots
            .iter()
            .position(|s| s.id == id)
            .ok_or(FsmError::UnknownObserver(id))
    }
}
