//! Top-down merge sort over a raw node chain.
//!
//! The chain covering the index range `lo..=hi` is split at `mid = (lo + hi) / 2` into a left run
//! `lo..=mid` and a right run `mid + 1..=hi`. Both runs are sorted recursively and then merged by
//! repeatedly moving the smaller front node onto the output chain:
//!
//! ```text
//!  left:  a1 -> a3 -> a3'          merged: a1 -> a2 -> a3 -> a3' -> a4
//!  right: a2 -> a4
//! ```
//!
//! On equal values the left node goes first, which keeps the sort stable. Nodes are only ever
//! relinked, never allocated or cloned, and the recursion is O(log n) deep.
//!
//! Every function here shares one contract: the links passed in must each start a well-formed,
//! acyclic chain of valid nodes that nothing else accesses for the duration of the call.

use crate::{Link, Node};
use std::ptr::NonNull;

/// Sorts the chain starting at `head`, which must be exactly `len` nodes long.
///
/// # Safety
///
/// See the module docs.
pub(crate) unsafe fn merge_sort(head: Link, len: usize) -> Link {
    if len < 2 {
        return head;
    }

    // `mid` for the range `0..=len - 1`, the left run includes it
    let left_len = (len - 1) / 2 + 1;
    let right = split_off(head, left_len);

    let left = merge_sort(head, left_len);
    let right = merge_sort(right, len - left_len);
    merge(left, right)
}

/// Cuts the chain after its first `at` nodes and returns the detached rest. `at` must be positive.
unsafe fn split_off(head: Link, at: usize) -> Link {
    let mut node = head?;
    for _ in 1..at {
        node = (*node.as_ptr()).next?;
    }
    (*node.as_ptr()).next.take()
}

unsafe fn merge(mut left: Link, mut right: Link) -> Link {
    let mut merged: Link = None;
    let mut last: Link = None;

    while let (Some(l), Some(r)) = (left, right) {
        let node = if precedes(l, r) {
            left = (*l.as_ptr()).next;
            l
        } else {
            right = (*r.as_ptr()).next;
            r
        };

        match last {
            Some(last) => (*last.as_ptr()).next = Some(node),
            None => merged = Some(node),
        }
        last = Some(node);
    }

    // at most one of them is left over, and it's already sorted
    let rest = left.or(right);
    match last {
        Some(last) => (*last.as_ptr()).next = rest,
        None => merged = rest,
    }
    merged
}

/// Whether `left` may be placed before `right`. Byte-wise comparison, ties favour `left`.
unsafe fn precedes(left: NonNull<Node>, right: NonNull<Node>) -> bool {
    let left = &(*left.as_ptr()).value;
    let right = &(*right.as_ptr()).value;
    left.as_bytes() <= right.as_bytes()
}
