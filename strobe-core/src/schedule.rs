//! Fixed-capacity delayed-action queue.
//!
//! Slots are reused by linear scan, so there is no ordering between entries
//! beyond array position and the same payload may be queued more than once.
//! When every slot is taken, a new entry can only get in by displacing the
//! entry with the longest remaining time, and only if it is due sooner.
//! Otherwise it is dropped. Memory use is bounded and no allocation happens.

use crate::route::Operation;

/// Number of slots in the firmware's schedule.
pub const SCHEDULE_LENGTH: usize = 128;

/// A deferred (payload, operation) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    pub payload: u8,
    pub operation: Operation,
    /// Milliseconds left before the entry fires.
    pub remaining: u16,
}

/// Outcome of [`Scheduler::enqueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Stored in a free slot.
    Stored(usize),
    /// Queue was full; this entry displaced a later one.
    Evicted { slot: usize, evicted: Entry },
    /// Queue was full and nothing pending was due later than this entry.
    Dropped,
    /// Payload 0 is "unbound" and never queued.
    Rejected,
}

#[derive(Debug, Clone)]
pub struct Scheduler<const N: usize = SCHEDULE_LENGTH> {
    slots: [Option<Entry>; N],
}

impl<const N: usize> Default for Scheduler<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Scheduler<N> {
    pub const fn new() -> Self {
        Self { slots: [None; N] }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of occupied slots.
    pub fn pending(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.slots.iter().flatten()
    }

    /// Drop everything pending.
    pub fn clear(&mut self) {
        self.slots = [None; N];
    }

    /// Queue `operation` on `payload` to fire after `delay` milliseconds.
    pub fn enqueue(&mut self, payload: u8, operation: Operation, delay: u16) -> Admission {
        if payload == 0 {
            return Admission::Rejected;
        }
        let entry = Entry {
            payload,
            operation,
            remaining: delay,
        };

        // While looking for a free slot, remember the latest-due entry in
        // case the queue turns out to be full. Ties keep the first slot.
        let mut longest: Option<(usize, u16)> = None;
        for (i, slot) in self.slots.iter_mut().enumerate() {
            match slot {
                None => {
                    *slot = Some(entry);
                    return Admission::Stored(i);
                }
                Some(pending) => {
                    if longest.map_or(true, |(_, t)| pending.remaining > t) {
                        longest = Some((i, pending.remaining));
                    }
                }
            }
        }

        match longest {
            Some((slot, t)) if delay < t => {
                let evicted = self.slots[slot].replace(entry);
                log::warn!(
                    "schedule full: evicted payload {:#04x} for {:#04x}",
                    evicted.map_or(0, |e| e.payload),
                    payload
                );
                match evicted {
                    Some(evicted) => Admission::Evicted { slot, evicted },
                    None => Admission::Stored(slot),
                }
            }
            _ => {
                log::warn!("schedule full: dropped payload {:#04x}", payload);
                Admission::Dropped
            }
        }
    }

    /// Advance every pending entry by `elapsed` milliseconds.
    ///
    /// Entries that are now due are cleared and handed to `fire` in slot
    /// order. Each entry fires at most once per call.
    pub fn tick<F>(&mut self, elapsed: u16, mut fire: F)
    where
        F: FnMut(u8, Operation),
    {
        for slot in self.slots.iter_mut() {
            let Some(entry) = slot else {
                continue;
            };
            if entry.remaining <= elapsed {
                let (payload, operation) = (entry.payload, entry.operation);
                *slot = None;
                fire(payload, operation);
            } else {
                entry.remaining -= elapsed;
            }
        }
    }
}
