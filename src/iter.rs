//! All iterator structs. You'll rarely want to use these directly.
//!
//! ```text
//!   next
//!    |
//!    v
//!   node -> node -> node -> (none)
//!   \________________/
//!        remaining
//! ```
//!
//! Since the chain is singly linked, iteration only goes front to back. [`Iter`] follows the
//! links and counts down `remaining` so it can report an exact size, [`IntoIter`] simply keeps
//! popping the front of the queue it owns.

use std::{iter::FusedIterator, marker::PhantomData};

use crate::{Link, Queue};

pub struct Iter<'list> {
    next: Link,
    remaining: usize,
    _bound_to_list: PhantomData<&'list Queue>,
}

impl<'list> Iter<'list> {
    /// # Safety
    ///
    /// `head` must start a chain of exactly `len` valid nodes that stay alive and unmodified
    /// for `'list`.
    pub(crate) unsafe fn new(head: Link, len: usize) -> Self {
        Self {
            next: head,
            remaining: len,
            _bound_to_list: PhantomData,
        }
    }
}

impl<'list> Iterator for Iter<'list> {
    type Item = &'list str;

    fn next(&mut self) -> Option<&'list str> {
        // SAFETY: delegated to the unsafe contract of `new`
        let node = unsafe { &*self.next?.as_ptr() };
        self.next = node.next;
        self.remaining -= 1;
        Some(node.value.as_str())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl FusedIterator for Iter<'_> {}

/// Consuming iterator, yielding the owned payloads front to back.
pub struct IntoIter {
    queue: Queue,
}

impl Iterator for IntoIter {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.queue.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.queue.len(), Some(self.queue.len()))
    }
}

impl ExactSizeIterator for IntoIter {}

impl FusedIterator for IntoIter {}

impl IntoIterator for Queue {
    type Item = String;
    type IntoIter = IntoIter;

    fn into_iter(self) -> IntoIter {
        IntoIter { queue: self }
    }
}

impl<'list> IntoIterator for &'list Queue {
    type Item = &'list str;
    type IntoIter = Iter<'list>;

    fn into_iter(self) -> Iter<'list> {
        self.iter()
    }
}
