use alloc::vec::Vec;

/// Fixed-capacity circular store.
///
/// `count` only ever grows (until `clear`); the slot for entry `n` is
/// `n % capacity`, so once the ring is full each push overwrites the
/// oldest retained entry. Logical indices stay stable across wraps.
pub struct Ring<T> {
    slots: Vec<T>,
    count: usize,
}

impl<T: Clone + Default> Ring<T> {
    /// Returns `None` when the backing storage cannot be allocated.
    pub fn try_with_capacity(capacity: usize) -> Option<Self> {
        if capacity == 0 {
            return None;
        }
        let mut slots = Vec::new();
        slots.try_reserve_exact(capacity).ok()?;
        slots.resize(capacity, T::default());
        Some(Self { slots, count: 0 })
    }
}

impl<T> Ring<T> {
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Total number of entries ever pushed since the last clear.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn retained(&self) -> usize {
        self.count.min(self.capacity())
    }

    /// Logical index of the oldest entry still held.
    pub fn oldest(&self) -> usize {
        self.count - self.retained()
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn push(&mut self, item: T) {
        let slot = self.count % self.capacity();
        self.slots[slot] = item;
        self.count += 1;
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        if index < self.oldest() || index >= self.count {
            return None;
        }
        self.slots.get(index % self.capacity())
    }

    pub fn newest(&self) -> Option<&T> {
        self.count.checked_sub(1).and_then(|last| self.get(last))
    }

    pub fn iter_newest_first(&self) -> impl Iterator<Item = &T> + '_ {
        (self.oldest()..self.count).rev().filter_map(move |i| self.get(i))
    }

    /// Retained entries from logical index `start`, oldest first.
    pub fn iter_from(&self, start: usize) -> impl Iterator<Item = &T> + '_ {
        (start.max(self.oldest())..self.count).filter_map(move |i| self.get(i))
    }

    pub fn clear(&mut self) {
        self.count = 0;
    }
}
