//! Ordered (FIFO) queue of pending outbound frames.
//!
//! Entries leave in exactly the order they entered.  Nothing is reordered,
//! deduplicated or dropped; the only way out is [`OrderedQueue::dequeue`].
//!
//! Every [`enqueue`](OrderedQueue::enqueue) raises an "item added"
//! notification synchronously, after the append: the returned [`ItemAdded`]
//! notice carries the new length and is `#[must_use]`, so the owner reacts in
//! the same call.  The bridge treats it as its flush trigger while still
//! holding the lock that guards the queue, which keeps enqueue and flush one
//! step for concurrent senders.
//!
//! The queue itself takes no locks.  Its owner serialises access; see the
//! bridge's state mutex.

use std::collections::VecDeque;

use thiserror::Error;

/// Errors returned by queue operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueueError {
    /// `dequeue` was called on an empty queue.  Check `is_empty` first.
    #[error("dequeue called on an empty queue")]
    Empty,
}

/// Notice returned by [`OrderedQueue::enqueue`] after the item was appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "the item-added notice is the flush trigger"]
pub struct ItemAdded {
    /// Queue length including the new item.
    pub len: usize,
}

/// A FIFO container with an item-added notification.
#[derive(Debug)]
pub struct OrderedQueue<T> {
    items: VecDeque<T>,
}

impl<T> Default for OrderedQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> OrderedQueue<T> {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }

    /// Appends `item` to the tail and returns the item-added notice.
    pub fn enqueue(&mut self, item: T) -> ItemAdded {
        self.items.push_back(item);
        ItemAdded {
            len: self.items.len(),
        }
    }

    /// Removes and returns the head item.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Empty`] if there is nothing to dequeue.
    pub fn dequeue(&mut self) -> Result<T, QueueError> {
        self.items.pop_front().ok_or(QueueError::Empty)
    }

    /// Puts an item back at the head without raising a notification.
    ///
    /// Used when a dequeued item could not be delivered, so that it is the
    /// first one retried and the original order is preserved.
    pub fn requeue_front(&mut self, item: T) {
        self.items.push_front(item);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_queue_is_empty() {
        let queue: OrderedQueue<String> = OrderedQueue::new();
        assert!(queue.is_empty());
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn test_dequeue_returns_items_in_fifo_order() {
        // Arrange
        let mut queue = OrderedQueue::new();
        for i in 0..5 {
            let _ = queue.enqueue(i);
        }

        // Act
        let drained: Vec<i32> = std::iter::from_fn(|| queue.dequeue().ok()).collect();

        // Assert
        assert_eq!(drained, vec![0, 1, 2, 3, 4]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_dequeue_on_empty_queue_fails() {
        let mut queue: OrderedQueue<u8> = OrderedQueue::new();
        assert_eq!(queue.dequeue(), Err(QueueError::Empty));
    }

    #[test]
    fn test_enqueue_returns_length_after_append() {
        let mut queue = OrderedQueue::new();
        assert_eq!(queue.enqueue("a"), ItemAdded { len: 1 });
        assert_eq!(queue.enqueue("b"), ItemAdded { len: 2 });
    }

    #[test]
    fn test_notice_follows_the_append() {
        // Arrange
        let mut queue = OrderedQueue::new();
        let _ = queue.enqueue('x');
        let _ = queue.enqueue('y');
        queue.dequeue().unwrap();

        // Act
        let notice = queue.enqueue('z');

        // Assert: the new item is already counted
        assert_eq!(notice, ItemAdded { len: 2 });
    }

    #[test]
    fn test_requeue_front_restores_order() {
        // Arrange
        let mut queue = OrderedQueue::new();
        for i in 1..=3 {
            let _ = queue.enqueue(i);
        }
        let first = queue.dequeue().unwrap();
        let second = queue.dequeue().unwrap();

        // Act: put back newest-first, as the bridge does for lost frames
        queue.requeue_front(second);
        queue.requeue_front(first);

        // Assert
        let drained: Vec<i32> = std::iter::from_fn(|| queue.dequeue().ok()).collect();
        assert_eq!(drained, vec![1, 2, 3]);
    }

    #[test]
    fn test_debug_output_lists_items() {
        let mut queue = OrderedQueue::new();
        let _ = queue.enqueue("frame");
        let text = format!("{queue:?}");
        assert!(text.contains("frame"));
    }
}
