use crate::error::{TrackError, TrackResult};

/// Fixed-capacity FIFO of the most recent frames.
///
/// Slots are reused in ring order: the `n`-th push (counting from zero)
/// lands in slot `n % capacity`, evicting whatever was there.
#[derive(Debug, Clone)]
pub struct FrameWindow<T> {
    slots: Vec<T>,
    capacity: usize,
    pushed: usize,
}

impl<T> FrameWindow<T> {
    pub fn new(capacity: usize) -> TrackResult<Self> {
        if capacity == 0 {
            return Err(TrackError::InvalidWindowCapacity(capacity));
        }
        Ok(Self {
            slots: Vec::with_capacity(capacity),
            capacity,
            pushed: 0,
        })
    }

    /// Append `item`, evicting the oldest entry when full, and return the
    /// stored entry so the caller can keep filling it in.
    pub fn push(&mut self, item: T) -> &mut T {
        let slot = self.pushed % self.capacity;
        if self.slots.len() < self.capacity {
            self.slots.push(item);
        } else {
            self.slots[slot] = item;
        }
        self.pushed += 1;
        &mut self.slots[slot]
    }

    /// Slot of the entry `back` positions before the newest one
    fn slot_from_back(&self, back: usize) -> Option<usize> {
        (back < self.slots.len()).then(|| (self.pushed - 1 - back) % self.capacity)
    }

    pub fn last(&self) -> Option<&T> {
        self.slot_from_back(0).map(|i| &self.slots[i])
    }

    pub fn last_mut(&mut self) -> Option<&mut T> {
        self.slot_from_back(0).map(|i| &mut self.slots[i])
    }

    pub fn second_to_last(&self) -> Option<&T> {
        self.slot_from_back(1).map(|i| &self.slots[i])
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        let start = if self.slots.len() < self.capacity {
            0
        } else {
            self.pushed % self.capacity
        };
        (0..self.slots.len()).map(move |i| &self.slots[(start + i) % self.capacity])
    }
}
