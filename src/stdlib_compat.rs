//! Standard library compatibility layer
//!
//! Wraps `std::collections::BinaryHeap` in the [`MinHeap`] interface so the
//! standard queue can be driven by the same generic code as [`DHeap`]. The
//! differential tests use it as the reference answer and the benches use it as
//! the baseline.
//!
//! # Differences from BinaryHeap
//!
//! - **Min-heap vs Max-heap**: `BinaryHeap` is a max-heap; keys are stored as
//!   `Reverse<i32>` so the smallest key is on top.
//! - **Errors instead of `None`**: `top` and `pop` on an empty queue return
//!   [`HeapError::EmptyContainer`].
//!
//! # Example
//!
//! ```rust
//! use simd_dheap::stdlib_compat::ReferenceHeap;
//! use simd_dheap::MinHeap;
//!
//! let mut heap = ReferenceHeap::new();
//! heap.push(5);
//! heap.push(3);
//! heap.push(7);
//! assert_eq!(heap.top(), Ok(3)); // min-heap, unlike BinaryHeap's max-heap
//! heap.pop().unwrap();
//! assert_eq!(heap.top(), Ok(5));
//! ```
//!
//! [`DHeap`]: crate::dheap::DHeap

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::traits::{HeapError, MinHeap};

/// `BinaryHeap<Reverse<i32>>` behind the [`MinHeap`] trait
#[derive(Debug, Clone, Default)]
pub struct ReferenceHeap {
    heap: BinaryHeap<Reverse<i32>>,
}

impl ReferenceHeap {
    /// Creates a new empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty queue with room for `capacity` keys
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(capacity),
        }
    }
}

impl MinHeap for ReferenceHeap {
    fn len(&self) -> usize {
        self.heap.len()
    }

    fn top(&self) -> Result<i32, HeapError> {
        self.heap
            .peek()
            .map(|Reverse(key)| *key)
            .ok_or(HeapError::EmptyContainer)
    }

    fn push(&mut self, key: i32) {
        self.heap.push(Reverse(key));
    }

    fn pop(&mut self) -> Result<(), HeapError> {
        self.heap
            .pop()
            .map(|_| ())
            .ok_or(HeapError::EmptyContainer)
    }

    fn clear(&mut self) {
        self.heap.clear();
    }

    fn reserve(&mut self, additional: usize) {
        self.heap.reserve(additional);
    }
}

impl From<Vec<i32>> for ReferenceHeap {
    fn from(keys: Vec<i32>) -> Self {
        Self {
            heap: keys.into_iter().map(Reverse).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_ordering() {
        let mut heap = ReferenceHeap::from(vec![4, -1, 9, 0]);
        assert_eq!(heap.len(), 4);
        assert_eq!(heap.drain_sorted(), vec![-1, 0, 4, 9]);
        assert!(heap.is_empty());
    }

    #[test]
    fn test_empty_errors() {
        let mut heap = ReferenceHeap::with_capacity(8);
        assert_eq!(heap.top(), Err(HeapError::EmptyContainer));
        assert_eq!(heap.pop(), Err(HeapError::EmptyContainer));
    }
}
