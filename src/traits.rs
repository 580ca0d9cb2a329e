//! Common error type and queue trait
//!
//! This module provides the pieces shared by the heap engine and anything that
//! wants to drive it generically:
//!
//! - [`HeapError`]: the two failure kinds the crate can report
//! - [`MinHeap`]: the priority-queue surface (`push`/`pop`/`top`/...) implemented
//!   by [`DHeap`](crate::dheap::DHeap) and by the standard-library reference queue
//!   in [`stdlib_compat`](crate::stdlib_compat)
//!
//! Unlike `std::collections::BinaryHeap`, `pop` does not return the removed key.
//! Read it with `top` first; `top` and `pop` report an empty queue as
//! [`HeapError::EmptyContainer`] instead of `None`.

use thiserror::Error;

/// Error type for heap operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HeapError {
    /// `top` or `pop` was called on a heap holding no elements
    #[error("heap is empty")]
    EmptyContainer,
    /// A heap configuration was rejected at construction time
    #[error("invalid heap configuration: {reason}")]
    InvalidConfiguration {
        /// What was wrong with the configuration
        reason: String,
    },
}

impl HeapError {
    /// Create an invalid configuration error
    #[inline]
    pub fn invalid_configuration(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }
}

/// Base trait for min-priority queues over `i32` keys
///
/// # Example
///
/// ```rust
/// use simd_dheap::{DHeap, MinHeap};
///
/// let mut heap = DHeap::new();
/// heap.push(3);
/// heap.push(1);
/// heap.push(2);
///
/// assert_eq!(heap.top(), Ok(1));
/// heap.pop().unwrap();
/// assert_eq!(heap.top(), Ok(2));
/// ```
pub trait MinHeap {
    /// Returns the number of elements in the heap
    fn len(&self) -> usize;

    /// Returns true if the heap is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the minimum key without removing it
    ///
    /// # Errors
    /// Returns [`HeapError::EmptyContainer`] when the heap is empty.
    fn top(&self) -> Result<i32, HeapError>;

    /// Inserts a key
    fn push(&mut self, key: i32);

    /// Removes the minimum key
    ///
    /// # Errors
    /// Returns [`HeapError::EmptyContainer`] when the heap is empty. The heap is
    /// left unchanged.
    fn pop(&mut self) -> Result<(), HeapError>;

    /// Removes every element
    fn clear(&mut self);

    /// Reserves capacity for at least `additional` more elements
    fn reserve(&mut self, additional: usize);

    /// Pops every element, returning the keys in non-decreasing order
    fn drain_sorted(&mut self) -> Vec<i32> {
        let mut out = Vec::with_capacity(self.len());
        while let Ok(key) = self.top() {
            out.push(key);
            if self.pop().is_err() {
                break;
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(HeapError::EmptyContainer.to_string(), "heap is empty");
        assert_eq!(
            HeapError::invalid_configuration("arity must be at least 2").to_string(),
            "invalid heap configuration: arity must be at least 2"
        );
    }

    #[test]
    fn test_error_is_std_error() {
        fn assert_error<E: std::error::Error>(_: &E) {}
        assert_error(&HeapError::EmptyContainer);
    }
}
