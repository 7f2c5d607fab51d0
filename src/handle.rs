//! The queue operations as seen by a host program that may not have a queue at all.
//!
//! Command harnesses and other drivers keep their current queue as an `Option<Box<Queue>>`, which
//! is `None` before the first `create` and after `destroy`. Every function here accepts that
//! absence and reacts to it in a fixed way: read-only operations and in-place rearrangements treat
//! a missing queue like an empty one, insertions reject it as an invalid argument, and removal
//! reports it as empty.

use crate::{Error, Queue, Result};

/// Allocates a new, empty queue on the heap.
pub fn create() -> Result<Box<Queue>> {
    Queue::try_new_boxed()
}

/// Releases the queue along with every node and payload it still holds. `None` is fine.
pub fn destroy(queue: Option<Box<Queue>>) {
    drop(queue);
}

pub fn insert_head(queue: Option<&mut Queue>, value: &str) -> Result<()> {
    queue
        .ok_or(Error::InvalidArgument("queue"))?
        .push_front(value)
}

pub fn insert_tail(queue: Option<&mut Queue>, value: &str) -> Result<()> {
    queue
        .ok_or(Error::InvalidArgument("queue"))?
        .push_back(value)
}

/// See [`Queue::remove_head`]. A missing queue has nothing to remove and reports [`Error::Empty`].
pub fn remove_head(queue: Option<&mut Queue>, out: Option<&mut [u8]>) -> Result<usize> {
    queue.ok_or(Error::Empty)?.remove_head(out)
}

pub fn size(queue: Option<&Queue>) -> usize {
    queue.map_or(0, Queue::len)
}

pub fn reverse(queue: Option<&mut Queue>) {
    if let Some(queue) = queue {
        queue.reverse();
    }
}

pub fn sort(queue: Option<&mut Queue>) {
    if let Some(queue) = queue {
        queue.sort();
    }
}
