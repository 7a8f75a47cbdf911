use std::collections::VecDeque;

use parking_lot::{Condvar, Mutex};

struct Inner<T> {
    items: VecDeque<T>,
    closed: bool,
}

/// Multi-producer/multi-consumer FIFO queue with close semantics.
///
/// `pop` blocks until an item arrives or the queue is closed and drained.
/// `close` wakes every waiter; items already queued are still delivered.
pub struct BlockingQueue<T> {
    inner: Mutex<Inner<T>>,
    available: Condvar,
}

impl<T> BlockingQueue<T> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                items: VecDeque::new(),
                closed: false,
            }),
            available: Condvar::new(),
        }
    }

    /// Returns false (item not enqueued) if the queue is closed.
    pub fn push(&self, item: T) -> bool {
        {
            let mut inner = self.inner.lock();
            if inner.closed {
                return false;
            }
            inner.items.push_back(item);
        }
        self.available.notify_one();
        true
    }

    /// Blocking pop; `None` only once the queue is closed and empty.
    pub fn pop(&self) -> Option<T> {
        let mut inner = self.inner.lock();
        loop {
            if let Some(item) = inner.items.pop_front() {
                return Some(item);
            }
            if inner.closed {
                return None;
            }
            self.available.wait(&mut inner);
        }
    }

    /// Non-blocking pop.
    pub fn try_pop(&self) -> Option<T> {
        self.inner.lock().items.pop_front()
    }

    /// Stop accepting pushes and wake all waiting consumers. Idempotent.
    pub fn close(&self) {
        let mut inner = self.inner.lock();
        inner.closed = true;
        self.available.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    pub fn len(&self) -> usize {
        self.inner.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().items.is_empty()
    }
}

impl<T> Default for BlockingQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_fifo_order() {
        let q = BlockingQueue::new();
        assert!(q.push(1));
        assert!(q.push(2));
        assert!(q.push(3));

        assert_eq!(q.pop(), Some(1));
        assert_eq!(q.pop(), Some(2));
        assert_eq!(q.try_pop(), Some(3));
        assert_eq!(q.try_pop(), None);
    }

    #[test]
    fn test_push_after_close_rejected() {
        let q = BlockingQueue::new();
        assert!(q.push(1));
        q.close();
        assert!(!q.push(2));
        assert!(q.is_closed());

        // Queued items drain before the close sentinel.
        assert_eq!(q.pop(), Some(1));
        assert_eq!(q.pop(), None);
    }

    #[test]
    fn test_close_wakes_blocked_consumers() {
        let q: Arc<BlockingQueue<u32>> = Arc::new(BlockingQueue::new());

        let mut handles = Vec::new();
        for _ in 0..3 {
            let q = Arc::clone(&q);
            handles.push(std::thread::spawn(move || q.pop()));
        }

        std::thread::sleep(Duration::from_millis(50));
        q.close();

        for h in handles {
            assert_eq!(h.join().unwrap(), None);
        }
    }

    #[test]
    fn test_no_item_dropped_under_contention() {
        let q: Arc<BlockingQueue<u64>> = Arc::new(BlockingQueue::new());

        let producers: Vec<_> = (0..4u64)
            .map(|p| {
                let q = Arc::clone(&q);
                std::thread::spawn(move || {
                    for i in 0..100 {
                        assert!(q.push(p * 100 + i));
                    }
                })
            })
            .collect();

        let consumers: Vec<_> = (0..4)
            .map(|_| {
                let q = Arc::clone(&q);
                std::thread::spawn(move || {
                    let mut seen = Vec::new();
                    while let Some(v) = q.pop() {
                        seen.push(v);
                    }
                    seen
                })
            })
            .collect();

        for p in producers {
            p.join().unwrap();
        }
        q.close();

        let mut all: Vec<u64> = consumers
            .into_iter()
            .flat_map(|c| c.join().unwrap())
            .collect();
        all.sort_unstable();
        assert_eq!(all.len(), 400);
        all.dedup();
        assert_eq!(all.len(), 400);
    }
}
