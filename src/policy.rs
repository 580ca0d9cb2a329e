//! Vector-compare policy
//!
//! Decides, for one step of sift-down, whether the children of the current node
//! are searched with vector compares or with a scalar scan. Vector setup has a
//! fixed cost, so the hybrid mode only spends it where a step compares many
//! children and the step happens rarely enough for the heap to be large:
//!
//! | Mode     | Build phase (heapify)                               | Pop phase                                  |
//! |----------|-----------------------------------------------------|--------------------------------------------|
//! | `Never`  | scalar                                              | scalar                                     |
//! | `Always` | vector                                              | vector                                     |
//! | `Hybrid` | vector if `d >= build_min_arity` and `i <= n / d²`  | vector if `i == 0`, `d >= 16`, `n >= pop_min_size` |
//!
//! In every mode the vector path also needs vector hardware, an arity that is
//! a vector block width (4, 8 or 16) and a full block of `d` children below the
//! node. Anything else falls back to the scalar scan.

use crate::config::{HeapConfig, VectorPolicy};
use crate::simd::is_vector_block_width;

/// Smallest arity for which the hybrid policy vectorizes a root pop
pub const POP_MIN_ARITY: usize = 16;

/// Which operation a sift-down runs on behalf of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SiftPhase {
    /// Floyd heapify of a bulk-constructed heap
    Build,
    /// Restoring the heap after the root was removed
    Pop,
}

/// Per-heap vector compare decision function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VectorComparePolicy {
    mode: VectorPolicy,
    arity: usize,
    arity_sq: usize,
    build_min_arity: usize,
    pop_min_size: usize,
    enabled: bool,
}

impl VectorComparePolicy {
    /// Policy for `config`; `hardware` tells whether a vector backend exists
    pub fn new(config: &HeapConfig, hardware: bool) -> Self {
        let enabled = hardware
            && config.vectorize
            && config.policy != VectorPolicy::Never
            && is_vector_block_width(config.arity);
        Self {
            mode: config.policy,
            arity: config.arity,
            arity_sq: config.arity.saturating_mul(config.arity),
            build_min_arity: config.build_min_arity,
            pop_min_size: config.pop_min_size,
            enabled,
        }
    }

    /// False if no sift-down step of this heap can ever be vectorized
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Should the sift-down step at `index` of a heap holding `len` keys use
    /// the vector search?
    #[inline]
    pub fn use_vector(&self, phase: SiftPhase, index: usize, len: usize) -> bool {
        if !self.enabled {
            return false;
        }

        let first_child = index.saturating_mul(self.arity).saturating_add(1);
        if first_child.saturating_add(self.arity) > len {
            return false;
        }

        match self.mode {
            VectorPolicy::Never => false,
            VectorPolicy::Always => true,
            VectorPolicy::Hybrid => match phase {
                SiftPhase::Build => {
                    self.arity >= self.build_min_arity && index <= len / self.arity_sq
                }
                SiftPhase::Pop => {
                    index == 0 && self.arity >= POP_MIN_ARITY && len >= self.pop_min_size
                }
            },
        }
    }
}
