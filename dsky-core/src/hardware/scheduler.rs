//! Periodic invocation slots.
//!
//! A program that needs background work registers a slot instead of spawning
//! anything; the machine asks for due slots once per tick and calls the
//! owning program. Nothing here ever blocks or runs concurrently.

use std::collections::BTreeMap;

use log::{trace, warn};

/// Ownership token for a registered slot.
///
/// Not `Clone`: releasing consumes it, so a slot cannot be released twice.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "dropping a SlotHandle leaks the slot; release it instead"]
pub struct SlotHandle {
    id: u32,
}

#[derive(Debug)]
struct Slot {
    owner: usize,
    interval_ms: u64,
    next_due_ms: u64,
    suspended: bool,
}

/// Registry of periodic slots keyed by handle id.
#[derive(Debug, Default)]
pub struct Scheduler {
    slots: BTreeMap<u32, Slot>,
    next_id: u32,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a slot for `owner` that first fires `interval_ms` from `now_ms`.
    pub fn register(&mut self, owner: usize, interval_ms: u64, now_ms: u64) -> SlotHandle {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        let interval_ms = interval_ms.max(1);
        self.slots.insert(
            id,
            Slot {
                owner,
                interval_ms,
                next_due_ms: now_ms + interval_ms,
                suspended: false,
            },
        );
        trace!("slot {} registered for entry {} every {}ms", id, owner, interval_ms);
        SlotHandle { id }
    }

    /// Remove a slot.
    pub fn release(&mut self, handle: SlotHandle) {
        match self.slots.remove(&handle.id) {
            Some(slot) => trace!("slot {} released by entry {}", handle.id, slot.owner),
            None => warn!("release of unknown slot {}", handle.id),
        }
    }

    /// Stop a slot firing without giving it up.
    pub fn suspend(&mut self, handle: &SlotHandle) {
        if let Some(slot) = self.slots.get_mut(&handle.id) {
            slot.suspended = true;
        }
    }

    /// Let a suspended slot fire again, one interval from `now_ms`.
    pub fn resume(&mut self, handle: &SlotHandle, now_ms: u64) {
        if let Some(slot) = self.slots.get_mut(&handle.id) {
            if slot.suspended {
                slot.suspended = false;
                slot.next_due_ms = now_ms + slot.interval_ms;
            }
        }
    }

    /// Owners of every slot due at `now_ms`, in registration order.
    ///
    /// Each returned slot is rescheduled one interval from `now_ms`; missed
    /// periods are not replayed.
    pub fn due(&mut self, now_ms: u64) -> Vec<usize> {
        let mut owners = Vec::new();
        for slot in self.slots.values_mut() {
            if !slot.suspended && slot.next_due_ms <= now_ms {
                slot.next_due_ms = now_ms + slot.interval_ms;
                owners.push(slot.owner);
            }
        }
        owners
    }

    pub fn is_registered(&self, handle: &SlotHandle) -> bool {
        self.slots.contains_key(&handle.id)
    }

    pub fn is_suspended(&self, handle: &SlotHandle) -> bool {
        self.slots.get(&handle.id).is_some_and(|s| s.suspended)
    }

    /// Number of live slots held by `owner`.
    pub fn owned_by(&self, owner: usize) -> usize {
        self.slots.values().filter(|s| s.owner == owner).count()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
