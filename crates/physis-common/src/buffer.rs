//! Bounded ring buffer
//!
//! Every history the harness keeps (episodes, prediction errors, confidence
//! samples, failure diagnoses) lives in one of these. Pushing past capacity
//! evicts the oldest entry.

use std::collections::vec_deque::{self, VecDeque};

/// Fixed-capacity FIFO with oldest-first eviction
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> RingBuffer<T> {
    /// Create an empty buffer. A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an item, returning the evicted oldest item if the buffer was full
    pub fn push(&mut self, item: T) -> Option<T> {
        let evicted = if self.items.len() >= self.capacity {
            self.items.pop_front()
        } else {
            None
        };
        self.items.push_back(item);
        evicted
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

    /// Oldest to newest
    pub fn iter(&self) -> vec_deque::Iter<'_, T> {
        self.items.iter()
    }

    /// The `n` newest items, oldest first
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &T> {
        self.items.iter().skip(self.items.len().saturating_sub(n))
    }

    pub fn last(&self) -> Option<&T> {
        self.items.back()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl RingBuffer<f64> {
    /// Arithmetic mean, `None` when empty
    pub fn mean(&self) -> Option<f64> {
        if self.items.is_empty() {
            None
        } else {
            Some(self.items.iter().sum::<f64>() / self.items.len() as f64)
        }
    }
}

impl<'a, T> IntoIterator for &'a RingBuffer<T> {
    type Item = &'a T;
    type IntoIter = vec_deque::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evicts_oldest_first() {
        let mut buf = RingBuffer::new(3);
        for i in 0..5 {
            buf.push(i);
        }
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.iter().copied().collect::<Vec<_>>(), vec![2, 3, 4]);
    }

    #[test]
    fn test_push_reports_eviction() {
        let mut buf = RingBuffer::new(1);
        assert_eq!(buf.push("a"), None);
        assert_eq!(buf.push("b"), Some("a"));
    }

    #[test]
    fn test_recent_and_mean() {
        let mut buf = RingBuffer::new(10);
        for v in [1.0, 2.0, 3.0, 4.0] {
            buf.push(v);
        }
        assert_eq!(buf.recent(2).copied().collect::<Vec<_>>(), vec![3.0, 4.0]);
        assert_eq!(buf.mean(), Some(2.5));
        assert_eq!(RingBuffer::<f64>::new(4).mean(), None);
    }
}
