//! Fixed-capacity FIFO ring buffer.
//!
//! Backs both the snapshot time-series and the behavior event log. Eviction
//! on overflow is O(1); the old front-removal-from-a-plain-array approach is
//! exactly what this replaces.

use std::collections::VecDeque;

/// A bounded FIFO buffer that evicts its oldest element on overflow.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> RingBuffer<T> {
    /// Create a buffer holding at most `capacity` elements.
    ///
    /// A zero capacity is clamped to 1 so `push` always retains the newest
    /// element.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an element, returning the evicted oldest element if the
    /// buffer was full.
    pub fn push(&mut self, item: T) -> Option<T> {
        let evicted = if self.items.len() == self.capacity {
            self.items.pop_front()
        } else {
            None
        };
        self.items.push_back(item);
        evicted
    }

    /// The last `min(n, len)` elements in insertion order.
    pub fn recent(&self, n: usize) -> Vec<T>
    where
        T: Clone,
    {
        let skip = self.items.len().saturating_sub(n);
        self.items.iter().skip(skip).cloned().collect()
    }

    /// Drop every element for which `keep` returns false, preserving order.
    pub fn retain(&mut self, keep: impl FnMut(&T) -> bool) {
        self.items.retain(keep);
    }

    /// Iterate oldest-first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The most recently pushed element.
    pub fn back(&self) -> Option<&T> {
        self.items.back()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
