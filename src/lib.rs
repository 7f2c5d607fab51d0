
pub mod error;
pub mod handle;
pub mod iter;
mod sort;

use std::{
    alloc::{self, Layout},
    fmt,
    ptr::NonNull,
};

pub use error::{Error, Result};

/// A link to a node allocated by [`Node::new`]. Whoever holds the link in `Queue::head` or in a
/// predecessor's `next` owns the node; `Queue::tail` is the only additional alias.
type Link = Option<NonNull<Node>>;

/// A singly linked queue of owned strings.
///
/// Every inserted value is copied into a buffer owned by the queue, so callers never have to keep
/// their own storage alive. Values can be pushed on either end, but only ever removed from the
/// front, which makes this usable as both a FIFO (`push_back` + `remove_head`) and a LIFO
/// (`push_front` + `remove_head`).
pub struct Queue {
    head: Link,
    /// Last node of the chain behind `head`. `None` exactly when the queue is empty.
    tail: Link,
    len: usize,
}

pub(crate) struct Node {
    pub(crate) value: String,
    pub(crate) next: Link,
}

impl Node {
    /// Copies `value` into a freshly allocated payload buffer of exactly its length and places it
    /// into an unlinked node. If the node itself can't be allocated, the payload is released
    /// again before returning.
    ///
    /// The returned node must eventually be released through `Box::from_raw`.
    fn new(value: &str) -> Result<NonNull<Self>> {
        let mut payload = String::new();
        payload.try_reserve_exact(value.len())?;
        payload.push_str(value);

        allocate(Node {
            value: payload,
            next: None,
        })
    }
}

impl Queue {
    pub const fn new() -> Self {
        Self {
            head: None,
            tail: None,
            len: 0,
        }
    }

    /// Like [`Queue::new`], but places the queue itself on the heap, reporting
    /// [`Error::OutOfMemory`] instead of aborting if that fails.
    pub fn try_new_boxed() -> Result<Box<Self>> {
        let queue = allocate(Self::new())?;
        // SAFETY: `allocate` hands out memory from the global allocator with the layout of `Self`
        Ok(unsafe { Box::from_raw(queue.as_ptr()) })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn front(&self) -> Option<&str> {
        // SAFETY: linked nodes stay valid as long as `&self` is borrowed
        self.head
            .map(|head| unsafe { &(*head.as_ptr()).value }.as_str())
    }

    pub fn back(&self) -> Option<&str> {
        // SAFETY: see `front`
        self.tail
            .map(|tail| unsafe { &(*tail.as_ptr()).value }.as_str())
    }

    pub fn iter(&self) -> iter::Iter<'_> {
        // SAFETY: the iterator borrows `self`, so no node can be released while it's alive
        unsafe { iter::Iter::new(self.head, self.len) }
    }

    /// Inserts a copy of `value` as the new first element. O(1).
    ///
    /// On [`Error::OutOfMemory`] the queue is left exactly as it was.
    pub fn push_front(&mut self, value: &str) -> Result<()> {
        let node = Node::new(value)?;

        // SAFETY: `node` was just allocated and isn't reachable from anywhere else yet
        unsafe { (*node.as_ptr()).next = self.head };
        if self.tail.is_none() {
            self.tail = Some(node);
        }
        self.head = Some(node);

        self.len += 1;
        Ok(())
    }

    /// Inserts a copy of `value` as the new last element. O(1).
    ///
    /// On [`Error::OutOfMemory`] the queue is left exactly as it was.
    pub fn push_back(&mut self, value: &str) -> Result<()> {
        let node = Node::new(value)?;

        match self.tail {
            // SAFETY: `tail` is the last node of the chain owned by this queue, and we hold
            //         `&mut self`, so nothing else can observe the node while relinking
            Some(tail) => unsafe { (*tail.as_ptr()).next = Some(node) },
            None => self.head = Some(node),
        }
        self.tail = Some(node);

        self.len += 1;
        Ok(())
    }

    /// Pushes every value of `values` to the back, stopping at the first failure. Values pushed
    /// before the failure stay in the queue.
    pub fn try_extend<I, S>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for value in values {
            self.push_back(value.as_ref())?;
        }
        Ok(())
    }

    /// Detaches the first element and hands its payload over.
    pub fn pop_front(&mut self) -> Option<String> {
        let head = self.head?;

        // SAFETY: `head` was allocated by `Node::new` and is owned by this queue. Unlinking it
        //         below means no other link refers to it once the box is reclaimed.
        let node = unsafe { Box::from_raw(head.as_ptr()) };
        self.head = node.next;
        if self.head.is_none() {
            self.tail = None;
        }

        self.len -= 1;
        Some(node.value)
    }

    /// Removes the first element, releasing both its payload and its node.
    ///
    /// If `out` is given, the removed value is copied into it as a zero-terminated byte string:
    /// at most `out.len() - 1` bytes of the value, followed by a `0`. Longer values are cut off
    /// silently. Returns how many bytes of the value were copied, which is `0` without `out`.
    ///
    /// # Errors
    ///
    /// - [`Error::Empty`] if there is nothing to remove.
    /// - [`Error::InvalidArgument`] if `out` is given but has no room for the terminator. Nothing
    ///   is removed in that case.
    pub fn remove_head(&mut self, out: Option<&mut [u8]>) -> Result<usize> {
        if self.is_empty() {
            return Err(Error::Empty);
        }
        if matches!(out.as_deref(), Some([])) {
            return Err(Error::InvalidArgument("out"));
        }

        let value = self.pop_front().ok_or(Error::Empty)?;
        Ok(out.map_or(0, |out| copy_terminated(value.as_bytes(), out)))
    }

    /// Reverses the order of all elements by flipping every link in place. No node is allocated
    /// or released.
    pub fn reverse(&mut self) {
        if self.len < 2 {
            return;
        }

        // the current head ends up last
        self.tail = self.head;

        let mut reversed: Link = None;
        let mut rest = self.head;
        while let Some(node) = rest {
            // SAFETY: every node on the chain is owned by this queue, and `&mut self` keeps
            //         anyone else from looking at the links while they're flipped
            unsafe {
                rest = (*node.as_ptr()).next;
                (*node.as_ptr()).next = reversed;
            }
            reversed = Some(node);
        }
        self.head = reversed;
    }

    /// Sorts the elements ascending by their bytes. The sort is stable and works by relinking the
    /// existing nodes.
    pub fn sort(&mut self) {
        if self.len < 2 {
            return;
        }

        // SAFETY: `head` starts a well-formed chain of exactly `len` nodes owned by this queue
        unsafe {
            self.head = sort::merge_sort(self.head, self.len);
            self.tail = last_node(self.head);
        }
    }
}

/// Copies as much of `src` as fits into `dst` while leaving room for a trailing `0`, and returns
/// how many bytes of `src` were copied. `dst` must not be empty.
fn copy_terminated(src: &[u8], dst: &mut [u8]) -> usize {
    let copied = src.len().min(dst.len() - 1);
    dst[..copied].copy_from_slice(&src[..copied]);
    dst[copied] = 0;
    copied
}

/// # Safety
///
/// `head` must start a well-formed, acyclic chain of valid nodes.
unsafe fn last_node(head: Link) -> Link {
    let mut node = head?;
    while let Some(next) = (*node.as_ptr()).next {
        node = next;
    }
    Some(node)
}

/// Moves `item` onto the heap, but reports a failing allocation as [`Error::OutOfMemory`] rather
/// than aborting the process. `item` is dropped on failure.
///
/// The returned pointer is compatible with `Box::from_raw`.
fn allocate<T>(item: T) -> Result<NonNull<T>> {
    let layout = Layout::new::<T>();
    if layout.size() == 0 {
        // SAFETY: `Box::into_raw` never returns null
        return Ok(unsafe { NonNull::new_unchecked(Box::into_raw(Box::new(item))) });
    }

    // SAFETY: `layout` has a non-zero size, checked above
    let ptr = unsafe { alloc::alloc(layout) }.cast::<T>();
    let ptr = NonNull::new(ptr).ok_or(Error::OutOfMemory)?;

    // SAFETY: `ptr` was just allocated with the layout of `T`, so it's valid and aligned for it
    unsafe { ptr.as_ptr().write(item) };
    Ok(ptr)
}

// SAFETY: the queue owns all of its nodes and payloads exclusively and never hands out links, so
//         it's exactly as thread-safe as a `Vec<String>` would be
unsafe impl Send for Queue {}
unsafe impl Sync for Queue {}

impl fmt::Debug for Queue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl Default for Queue {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Queue {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl Eq for Queue {}

impl Drop for Queue {
    fn drop(&mut self) {
        self.tail = None;
        let mut link = self.head.take();
        while let Some(node) = link {
            // SAFETY: every node on the chain came from `Node::new` and is owned by this queue,
            //         and the chain is acyclic, so each one is reclaimed exactly once
            let node = unsafe { Box::from_raw(node.as_ptr()) };
            link = node.next;
        }
    }
}
