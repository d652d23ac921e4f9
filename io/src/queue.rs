//! Single-producer single-consumer queue between the game thread and the
//! I/O worker.
//!
//! Both ends share one unbounded lock-free [`SegQueue`]. Neither end is
//! `Clone`, so each queue has exactly one pusher and one popper.

use std::sync::Arc;

use crossbeam_queue::SegQueue;

/// Create a connected producer/consumer pair.
pub fn spsc<T>() -> (Producer<T>, Consumer<T>) {
    let queue = Arc::new(SegQueue::new());
    (
        Producer {
            queue: Arc::clone(&queue),
        },
        Consumer { queue },
    )
}

/// Pushing end of an [`spsc`] queue.
pub struct Producer<T> {
    queue: Arc<SegQueue<T>>,
}

impl<T> Producer<T> {
    /// Append an item. Never blocks; the queue is unbounded.
    #[inline]
    pub fn push(&self, item: T) {
        self.queue.push(item);
    }

    /// Approximate number of queued items.
    #[inline]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// Popping end of an [`spsc`] queue.
pub struct Consumer<T> {
    queue: Arc<SegQueue<T>>,
}

impl<T> Consumer<T> {
    /// Take the oldest item, if any.
    #[inline]
    pub fn pop(&self) -> Option<T> {
        self.queue.pop()
    }

    /// Pop everything currently queued.
    pub fn drain(&self) -> impl Iterator<Item = T> + '_ {
        std::iter::from_fn(move || self.queue.pop())
    }
}
