//! Fixed-capacity rolling window for a single metric stream.
//!
//! Values are kept in arrival order. Once the window is full, every push
//! overwrites the oldest slot in place, so the backing `Vec` never grows
//! past `capacity` and never reallocates after warm-up.

use crate::sampler::InvalidConfig;

/// Default number of points kept per metric.
pub const DEFAULT_CAPACITY: usize = 100;

/// Circular buffer holding the most recent `capacity` values.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    slots: Vec<T>,
    /// Index of the oldest element once the buffer is full.
    head: usize,
    capacity: usize,
}

impl<T: Clone> RingBuffer<T> {
    /// Creates an empty buffer. A capacity of zero is rejected.
    pub fn new(capacity: usize) -> Result<Self, InvalidConfig> {
        if capacity == 0 {
            return Err(InvalidConfig::ZeroCapacity);
        }
        Ok(Self {
            slots: Vec::with_capacity(capacity),
            head: 0,
            capacity,
        })
    }

    /// Appends a value, evicting the oldest one when the buffer is full.
    pub fn push(&mut self, value: T) {
        if self.slots.len() < self.capacity {
            self.slots.push(value);
        } else {
            self.slots[self.head] = value;
            self.head = (self.head + 1) % self.capacity;
        }
    }

    /// Returns the contents oldest-to-newest without mutating the buffer.
    pub fn snapshot(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }

    /// Iterates oldest-to-newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        let (newer, older) = self.slots.split_at(self.head);
        older.iter().chain(newer.iter())
    }

    /// Most recently pushed value.
    pub fn last(&self) -> Option<&T> {
        if self.slots.is_empty() {
            return None;
        }
        let idx = if self.head == 0 {
            self.slots.len() - 1
        } else {
            self.head - 1
        };
        self.slots.get(idx)
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

    pub fn is_full(&self) -> bool {
        self.slots.len() == self.capacity
    }
}
