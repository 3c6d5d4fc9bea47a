//! The recent-messages log shown over the playfield.

use std::collections::VecDeque;

use parking_lot::Mutex;

/// A bounded FIFO of display strings.
///
/// Pushing past capacity drops the oldest entry. Safe to share: the decode
/// loop pushes while the renderer reads.
#[derive(Debug)]
pub struct MessageLog {
    capacity: usize,
    entries: Mutex<VecDeque<String>>,
}

impl MessageLog {
    /// Creates an empty log. A capacity of 0 is treated as 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn push(&self, message: impl Into<String>) {
        let mut entries = self.entries.lock();
        entries.push_back(message.into());
        while entries.len() > self.capacity {
            entries.pop_front();
        }
    }

    /// Copies out the current messages, oldest first.
    pub fn messages(&self) -> Vec<String> {
        self.entries.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::new(5)
    }
}
