//! SIMD-accelerated d-ary min-heap
//!
//! This crate provides a priority queue of `i32` keys laid out as an implicit
//! d-ary tree, tuned for raw push/pop throughput in workloads such as event
//! scheduling, shortest-path frontiers and k-way merges.
//!
//! # Features
//!
//! - **Configurable arity**: any `d >= 2`, fixed at construction (default 4)
//! - **Vectorized sift-down**: the smallest of 4, 8 or 16 children is found with
//!   SSE4.1 (x86_64) or NEON (aarch64) compares, scalar everywhere else
//! - **Selectable policy**: never, always, or a hybrid that vectorizes only the
//!   steps where it pays off
//! - **O(n) bulk construction** with Floyd's heapify
//! - **Stable handles**: every key carries a handle that follows it through the
//!   array, with an optional fixed-size payload record per handle
//!
//! # Example
//!
//! ```rust
//! use simd_dheap::config::{HeapConfig, VectorPolicy};
//! use simd_dheap::{DHeap, MinHeap};
//!
//! let config = HeapConfig::builder()
//!     .arity(8)
//!     .policy(VectorPolicy::Always)
//!     .build()
//!     .unwrap();
//! let mut heap = DHeap::with_config(config).unwrap();
//!
//! for key in [5, 3, 7, 1] {
//!     heap.push(key);
//! }
//! assert_eq!(heap.top(), Ok(1));
//! heap.pop().unwrap();
//! assert_eq!(heap.top(), Ok(3));
//! ```

pub mod config;
pub mod dheap;
pub mod policy;
pub mod simd;
pub mod slots;
pub mod stdlib_compat;
pub mod traits;

// Re-export the main types for convenience
pub use config::{HeapConfig, VectorPolicy};
pub use dheap::DHeap;
pub use slots::Handle;
pub use traits::{HeapError, MinHeap};
