//! Outbound message queue
//!
//! A mutex-protected FIFO with front insertion for priority traffic
//! (heartbeats, voice state). Multiple producers enqueue; the one-second
//! tick drains at the gateway rate limit.

use std::collections::VecDeque;
use std::sync::Mutex;

/// Rate-limited outbound message queue
///
/// Holds serialized JSON frames awaiting the drainer. The critical
/// sections contain only queue operations.
#[derive(Debug, Default)]
pub struct MessageQueue {
    inner: Mutex<VecDeque<String>>,
}

impl MessageQueue {
    /// Create an empty queue
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message at the back
    pub fn push_back(&self, message: String) {
        self.inner
            .lock()
            .expect("message queue poisoned")
            .push_back(message);
    }

    /// Insert a priority message at the front
    ///
    /// Front-queued messages overtake user traffic even when the queue is
    /// saturated; heartbeats rely on this.
    pub fn push_front(&self, message: String) {
        self.inner
            .lock()
            .expect("message queue poisoned")
            .push_front(message);
    }

    /// Take the next message to send
    pub fn pop_front(&self) -> Option<String> {
        self.inner
            .lock()
            .expect("message queue poisoned")
            .pop_front()
    }

    /// Drop every queued message
    ///
    /// Called on reconnect so stale commands are not replayed against a
    /// fresh session.
    pub fn clear(&self) {
        self.inner.lock().expect("message queue poisoned").clear();
    }

    /// Number of queued messages
    pub fn len(&self) -> usize {
        self.inner.lock().expect("message queue poisoned").len()
    }

    /// Whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let queue = MessageQueue::new();
        queue.push_back("a".to_string());
        queue.push_back("b".to_string());

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop_front().as_deref(), Some("a"));
        assert_eq!(queue.pop_front().as_deref(), Some("b"));
        assert_eq!(queue.pop_front(), None);
    }

    #[test]
    fn test_front_insertion_overtakes() {
        let queue = MessageQueue::new();
        queue.push_back("user1".to_string());
        queue.push_back("user2".to_string());
        queue.push_front("heartbeat".to_string());

        assert_eq!(queue.pop_front().as_deref(), Some("heartbeat"));
        assert_eq!(queue.pop_front().as_deref(), Some("user1"));
    }

    #[test]
    fn test_clear() {
        let queue = MessageQueue::new();
        queue.push_back("a".to_string());
        queue.push_front("b".to_string());
        assert!(!queue.is_empty());

        queue.clear();
        assert!(queue.is_empty());
        assert_eq!(queue.pop_front(), None);
    }

    #[test]
    fn test_concurrent_producers() {
        use std::sync::Arc;

        let queue = Arc::new(MessageQueue::new());
        let mut handles = Vec::new();

        for t in 0..4 {
            let queue = queue.clone();
            handles.push(std::thread::spawn(move || {
                for i in 0..100 {
                    queue.push_back(format!("{t}-{i}"));
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(queue.len(), 400);
    }
}
