//! d-ary min-heap with vector-accelerated sift-down
//!
//! Keys live in a flat `Vec<i32>` in the usual implicit-tree layout: the
//! children of position `i` are `i*d + 1 ..= i*d + d` and its parent is
//! `(i - 1) / d`. A second vector holds the [`Handle`] of the element at each
//! position, and every key move is mirrored on it.
//!
//! A wide node (large `d`) makes the tree shallow, which shortens sift-up, but
//! makes every sift-down step compare up to `d` children. Those comparisons are
//! what [`VectorSearch`] accelerates; [`VectorComparePolicy`] decides where it
//! is worth it.
//!
//! # Time Complexity
//!
//! | Operation        | Complexity      |
//! |------------------|-----------------|
//! | `push`           | O(log_d n)      |
//! | `pop`            | O(d log_d n)    |
//! | `top`            | O(1)            |
//! | bulk construct   | O(n)            |
//!
//! # Example
//!
//! ```rust
//! use simd_dheap::{DHeap, MinHeap};
//!
//! let mut heap = DHeap::from_vec(vec![9, 4, 7, 1, 8, 2, 6, 3, 5]);
//! assert_eq!(heap.top(), Ok(1));
//!
//! heap.push(0);
//! assert_eq!(heap.drain_sorted(), vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
//! assert!(heap.top().is_err());
//! ```

use std::fmt;

use tracing::{debug, trace};

use crate::config::HeapConfig;
use crate::policy::{SiftPhase, VectorComparePolicy};
use crate::simd::{ChildMinSearch, ScalarSearch, VectorBackend, VectorSearch};
use crate::slots::{Handle, SlotPool};
use crate::traits::{HeapError, MinHeap};

/// A d-ary min-heap of `i32` keys
///
/// Operations come from the [`MinHeap`] trait. Arity, vector policy and
/// thresholds are taken from a [`HeapConfig`] at construction and never change.
#[derive(Clone)]
pub struct DHeap {
    keys: Vec<i32>,
    slots: Vec<Handle>,
    pool: SlotPool,
    config: HeapConfig,
    policy: VectorComparePolicy,
    vector: Option<VectorSearch>,
}

impl DHeap {
    /// Creates an empty heap with the default configuration
    pub fn new() -> Self {
        Self::configured(HeapConfig::default())
    }

    /// Creates an empty heap with room for `capacity` elements
    pub fn with_capacity(capacity: usize) -> Self {
        let mut heap = Self::new();
        heap.keys.reserve_exact(capacity);
        heap.slots.reserve_exact(capacity);
        heap
    }

    /// Creates an empty heap with the given configuration
    ///
    /// # Errors
    /// Returns [`HeapError::InvalidConfiguration`] if `config` does not validate.
    pub fn with_config(config: HeapConfig) -> Result<Self, HeapError> {
        config.validate()?;
        Ok(Self::configured(config))
    }

    /// Builds a heap from `keys` in O(n) with the default configuration
    ///
    /// Handles `0..n` are assigned in input order before heapifying.
    pub fn from_vec(keys: Vec<i32>) -> Self {
        Self::configured(HeapConfig::default()).heapify(keys)
    }

    /// Builds a heap from `keys` in O(n) with the given configuration
    ///
    /// # Errors
    /// Returns [`HeapError::InvalidConfiguration`] if `config` does not validate.
    pub fn from_vec_with_config(keys: Vec<i32>, config: HeapConfig) -> Result<Self, HeapError> {
        config.validate()?;
        Ok(Self::configured(config).heapify(keys))
    }

    fn configured(config: HeapConfig) -> Self {
        let vector = if config.vectorize {
            VectorSearch::detect()
        } else {
            None
        };
        let policy = VectorComparePolicy::new(&config, vector.is_some());
        debug!(
            arity = config.arity,
            policy = %config.policy,
            backend = vector.map_or("scalar", |v| v.backend().name()),
            vector_enabled = policy.is_enabled(),
            "configured d-ary heap"
        );
        Self {
            keys: Vec::new(),
            slots: Vec::new(),
            pool: SlotPool::new(config.payload_bytes),
            config,
            policy,
            vector,
        }
    }

    /// Floyd heapify: sift down every internal node, deepest first
    fn heapify(mut self, keys: Vec<i32>) -> Self {
        self.slots.reserve_exact(keys.len());
        for _ in 0..keys.len() {
            let slot = self.pool.acquire();
            self.slots.push(slot);
        }
        self.keys = keys;

        let len = self.keys.len();
        if len > 1 {
            debug!(len, arity = self.config.arity, "heapifying bulk input");
            let last_parent = self.parent(len - 1);
            for i in (0..=last_parent).rev() {
                self.sift_down(i, SiftPhase::Build);
            }
        }
        self
    }

    /// The configuration this heap was built with
    pub fn config(&self) -> &HeapConfig {
        &self.config
    }

    /// Number of children per node
    pub fn arity(&self) -> usize {
        self.config.arity
    }

    /// The vector backend sift-down may use, `None` if it is scalar-only
    pub fn vector_backend(&self) -> Option<VectorBackend> {
        if self.policy.is_enabled() {
            self.vector.map(|v| v.backend())
        } else {
            None
        }
    }

    /// Number of elements the heap can hold without reallocating
    pub fn capacity(&self) -> usize {
        self.keys.capacity().min(self.slots.capacity())
    }

    /// Checks `keys[parent(i)] <= keys[i]` for every non-root position
    pub fn verify_heap_property(&self) -> bool {
        (1..self.keys.len()).all(|i| self.keys[self.parent(i)] <= self.keys[i])
    }

    /// Positional key and handle arrays, for layout comparisons in tests
    #[doc(hidden)]
    pub fn layout(&self) -> (&[i32], &[Handle]) {
        (&self.keys, &self.slots)
    }

    #[inline]
    fn parent(&self, i: usize) -> usize {
        (i - 1) / self.config.arity
    }

    /// Move the element at `index` up until its parent is not larger
    fn sift_up(&mut self, mut index: usize) {
        let key = self.keys[index];
        let slot = self.slots[index];

        while index > 0 {
            let parent = self.parent(index);
            if key >= self.keys[parent] {
                break;
            }
            self.keys[index] = self.keys[parent];
            self.slots[index] = self.slots[parent];
            index = parent;
        }

        self.keys[index] = key;
        self.slots[index] = slot;
    }

    /// Move the element at `index` down until no child is smaller
    fn sift_down(&mut self, mut index: usize, phase: SiftPhase) {
        let len = self.keys.len();
        let arity = self.config.arity;
        let key = self.keys[index];
        let slot = self.slots[index];

        loop {
            let first = index.saturating_mul(arity).saturating_add(1);
            if first >= len {
                break;
            }
            let end = first.saturating_add(arity).min(len);
            let children = &self.keys[first..end];

            let (offset, min_key) = match self.vector {
                Some(vector) if self.policy.use_vector(phase, index, len) => {
                    vector.min_child(children)
                }
                _ => ScalarSearch.min_child(children),
            };

            if min_key >= key {
                break;
            }

            let child = first + offset;
            self.keys[index] = min_key;
            self.slots[index] = self.slots[child];
            index = child;
        }

        self.keys[index] = key;
        self.slots[index] = slot;
    }
}

impl MinHeap for DHeap {
    fn len(&self) -> usize {
        self.keys.len()
    }

    fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    fn top(&self) -> Result<i32, HeapError> {
        self.keys.first().copied().ok_or(HeapError::EmptyContainer)
    }

    fn push(&mut self, key: i32) {
        let slot = self.pool.acquire();
        self.keys.push(key);
        self.slots.push(slot);
        self.sift_up(self.keys.len() - 1);
    }

    fn pop(&mut self) -> Result<(), HeapError> {
        if self.keys.is_empty() {
            return Err(HeapError::EmptyContainer);
        }

        // the last element takes the root's place
        self.keys.swap_remove(0);
        let root_slot = self.slots.swap_remove(0);
        self.pool.release(root_slot);

        if !self.keys.is_empty() {
            self.sift_down(0, SiftPhase::Pop);
        }
        Ok(())
    }

    fn clear(&mut self) {
        trace!(len = self.keys.len(), "clearing heap");
        self.keys.clear();
        self.slots.clear();
        self.pool.reset();
    }

    fn reserve(&mut self, additional: usize) {
        self.keys.reserve(additional);
        self.slots.reserve(additional);
    }
}

impl Default for DHeap {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DHeap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DHeap")
            .field("len", &self.keys.len())
            .field("arity", &self.config.arity)
            .field("policy", &self.config.policy)
            .field("backend", &self.vector_backend())
            .field("top", &self.keys.first())
            .field("handles_minted", &self.pool.minted())
            .field("handles_free", &self.pool.free_len())
            .field("payload_store_bytes", &self.pool.payload_store_len())
            .finish()
    }
}

impl From<Vec<i32>> for DHeap {
    fn from(keys: Vec<i32>) -> Self {
        Self::from_vec(keys)
    }
}

impl FromIterator<i32> for DHeap {
    fn from_iter<I: IntoIterator<Item = i32>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl Extend<i32> for DHeap {
    fn extend<I: IntoIterator<Item = i32>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);
        for key in iter {
            self.push(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VectorPolicy;

    fn config(arity: usize, policy: VectorPolicy) -> HeapConfig {
        HeapConfig::builder()
            .arity(arity)
            .policy(policy)
            .build()
            .unwrap()
    }

    fn drain(heap: &mut DHeap) -> Vec<i32> {
        let mut out = Vec::new();
        while let Ok(key) = heap.top() {
            out.push(key);
            heap.pop().unwrap();
            assert!(heap.verify_heap_property());
        }
        out
    }

    #[test]
    fn test_basic_operations() {
        let mut heap = DHeap::new();
        assert!(heap.is_empty());
        assert_eq!(heap.len(), 0);

        heap.push(5);
        assert!(!heap.is_empty());
        assert_eq!(heap.len(), 1);
        assert_eq!(heap.top(), Ok(5));

        heap.push(3);
        assert_eq!(heap.top(), Ok(3));
        heap.push(7);
        heap.push(1);
        assert_eq!(heap.top(), Ok(1));

        assert_eq!(drain(&mut heap), vec![1, 3, 5, 7]);
        assert!(heap.is_empty());
    }

    #[test]
    fn test_empty_errors_leave_heap_empty() {
        let mut heap = DHeap::new();
        assert_eq!(heap.top(), Err(HeapError::EmptyContainer));
        assert_eq!(heap.pop(), Err(HeapError::EmptyContainer));
        assert_eq!(heap.len(), 0);

        heap.push(1);
        heap.pop().unwrap();
        assert_eq!(heap.pop(), Err(HeapError::EmptyContainer));
        assert_eq!(heap.len(), 0);
    }

    #[test]
    fn test_bulk_build_handles_in_input_order() {
        let heap = DHeap::from_vec(vec![9, 4, 7, 1, 8, 2, 6, 3, 5]);
        assert!(heap.verify_heap_property());

        let (keys, slots) = heap.layout();
        // handle h was minted for input position h
        let input = [9, 4, 7, 1, 8, 2, 6, 3, 5];
        for (key, slot) in keys.iter().zip(slots) {
            assert_eq!(input[slot.index()], *key);
        }
    }

    #[test]
    fn test_bulk_build_drains_sorted() {
        let mut heap = DHeap::from_vec(vec![9, 4, 7, 1, 8, 2, 6, 3, 5]);
        assert_eq!(drain(&mut heap), (1..=9).collect::<Vec<_>>());
    }

    #[test]
    fn test_empty_and_single_bulk_build() {
        let heap = DHeap::from_vec(Vec::new());
        assert!(heap.is_empty());

        let mut heap = DHeap::from_vec(vec![42]);
        assert_eq!(heap.top(), Ok(42));
        heap.pop().unwrap();
        assert!(heap.is_empty());
    }

    #[test]
    fn test_handles_follow_keys() {
        let mut heap = DHeap::new();
        let input = [50, 20, 80, 10, 60, 30, 70, 40, 90];
        for key in input {
            heap.push(key);
        }
        heap.pop().unwrap();
        heap.pop().unwrap();
        heap.push(5);
        heap.push(55);

        // popping 10 then 20 frees handles 3 then 1; reuse is LIFO
        let (keys, slots) = heap.layout();
        for (key, slot) in keys.iter().zip(slots) {
            let expected = match slot.value() {
                1 => 5,
                3 => 55,
                v => input[v as usize],
            };
            assert_eq!(*key, expected, "handle {slot} paired with wrong key");
        }
    }

    #[test]
    fn test_clear_restarts_handles() {
        let mut heap = DHeap::new();
        for key in [3, 1, 2] {
            heap.push(key);
        }
        heap.pop().unwrap();
        heap.clear();
        assert!(heap.is_empty());
        assert_eq!(heap.top(), Err(HeapError::EmptyContainer));

        heap.push(9);
        let (_, slots) = heap.layout();
        assert_eq!(slots[0].value(), 0);
    }

    #[test]
    fn test_reserve_is_only_a_hint() {
        let mut heap = DHeap::new();
        heap.push(2);
        heap.reserve(1000);
        assert!(heap.capacity() >= 1001);
        assert_eq!(heap.len(), 1);
        assert_eq!(heap.top(), Ok(2));

        let heap = DHeap::with_capacity(64);
        assert!(heap.capacity() >= 64);
        assert!(heap.is_empty());
    }

    #[test]
    fn test_invalid_configuration() {
        let bad = HeapConfig {
            arity: 1,
            ..HeapConfig::default()
        };
        assert!(matches!(
            DHeap::with_config(bad.clone()),
            Err(HeapError::InvalidConfiguration { .. })
        ));
        assert!(DHeap::from_vec_with_config(vec![1, 2], bad).is_err());
    }

    #[test]
    fn test_binary_and_odd_arities() {
        for arity in [2, 3, 5, 7] {
            let mut heap = DHeap::with_config(config(arity, VectorPolicy::Hybrid)).unwrap();
            for key in (0..200).rev() {
                heap.push(key * 7 % 101);
            }
            assert!(heap.verify_heap_property());
            let mut expected: Vec<i32> = (0..200).map(|k| k * 7 % 101).collect();
            expected.sort_unstable();
            assert_eq!(drain(&mut heap), expected);
        }
    }

    #[test]
    fn test_duplicates() {
        let mut heap = DHeap::new();
        for _ in 0..20 {
            heap.push(5);
        }
        for _ in 0..20 {
            assert_eq!(heap.top(), Ok(5));
            heap.pop().unwrap();
        }
        assert!(heap.is_empty());
    }

    #[test]
    fn test_boundary_values() {
        let input = vec![
            i32::MAX,
            i32::MIN,
            0,
            i32::MIN + 1,
            i32::MAX - 1,
            i32::MIN,
            i32::MAX,
            i32::MIN + 1,
            i32::MAX - 1,
            0,
        ];
        let mut expected = input.clone();
        expected.sort_unstable();
        for arity in [4, 8, 16] {
            let mut heap = DHeap::with_config(config(arity, VectorPolicy::Always)).unwrap();
            for &key in &input {
                heap.push(key);
            }
            assert_eq!(drain(&mut heap), expected);
        }
    }

    #[test]
    fn test_always_vectorize_matches_scalar_layout() {
        let input: Vec<i32> = (0..5000).map(|i| (i * 7919) % 613 - 300).collect();
        for arity in [4, 8, 16] {
            let mut vector =
                DHeap::from_vec_with_config(input.clone(), config(arity, VectorPolicy::Always))
                    .unwrap();
            let mut scalar =
                DHeap::from_vec_with_config(input.clone(), config(arity, VectorPolicy::Never))
                    .unwrap();
            assert_eq!(vector.layout(), scalar.layout());

            while !scalar.is_empty() {
                vector.pop().unwrap();
                scalar.pop().unwrap();
                assert_eq!(vector.layout(), scalar.layout());
            }
            assert!(vector.is_empty());
        }
    }

    #[test]
    fn test_extend_and_collect() {
        let mut heap: DHeap = vec![4, 2, 6].into_iter().collect();
        heap.extend([5, 1, 3]);
        assert_eq!(heap.len(), 6);
        assert_eq!(drain(&mut heap), vec![1, 2, 3, 4, 5, 6]);

        let heap = DHeap::from(vec![2, 1]);
        assert_eq!(heap.top(), Ok(1));
    }

    #[test]
    fn test_payload_store_sized_by_config() {
        let config = HeapConfig::builder().payload_bytes(24).build().unwrap();
        let mut heap = DHeap::with_config(config).unwrap();
        for key in 0..10 {
            heap.push(key);
        }
        assert_eq!(heap.pool.payload_store_len(), 240);
        heap.pop().unwrap();
        heap.push(11);
        assert_eq!(heap.pool.payload_store_len(), 240);
        heap.clear();
        assert_eq!(heap.pool.payload_store_len(), 0);
    }

    #[test]
    fn test_scalar_only_reports_no_backend() {
        let forced = HeapConfig::builder().arity(8).vectorize(false).build().unwrap();
        assert_eq!(DHeap::with_config(forced).unwrap().vector_backend(), None);

        let never = config(16, VectorPolicy::Never);
        assert_eq!(DHeap::with_config(never).unwrap().vector_backend(), None);

        let always = config(8, VectorPolicy::Always);
        assert_eq!(
            DHeap::with_config(always).unwrap().vector_backend(),
            VectorBackend::detect()
        );
    }

    #[test]
    fn test_debug_does_not_dump_keys() {
        let heap = DHeap::from_vec(vec![3, 1, 2]);
        let text = format!("{heap:?}");
        assert!(text.contains("len: 3"));
        assert!(text.contains("top: Some(1)"));
    }
}
