//! Child-minimum search strategies
//!
//! Sift-down spends nearly all of its time answering one question: which of the
//! (up to `d`) children of a node holds the smallest key? This module answers it
//! two ways behind the [`ChildMinSearch`] trait:
//!
//! - [`ScalarSearch`]: a linear scan, correct for any slice on any target
//! - [`VectorSearch`]: 4-lane `i32` vector compares, SSE4.1 on x86_64 (detected
//!   at runtime) and NEON on aarch64
//!
//! Both return the lowest index holding the minimum. Sift-down relies on that
//! tie-break being identical so that the heap layout does not depend on which
//! strategy the policy picked.
//!
//! # Vector algorithm
//!
//! The children are read as `len / 4` blocks of four lanes:
//!
//! 1. fold the blocks with a lane-wise `min`
//! 2. reduce the four lanes to the global minimum
//! 3. compare each block against the broadcast minimum, in order, and return the
//!    first set lane of the first non-zero equality mask
//!
//! Slices whose length is not a whole number of blocks go to the scalar scan.

use std::fmt;

/// Number of `i32` lanes in one vector register
pub const LANES: usize = 4;

/// Child counts the vector search is used for
pub const VECTOR_BLOCK_WIDTHS: [usize; 3] = [4, 8, 16];

/// True if a node with `arity` children can be searched with vector compares
#[inline]
pub const fn is_vector_block_width(arity: usize) -> bool {
    matches!(arity, 4 | 8 | 16)
}

/// Strategy for finding the smallest key among a node's children
pub trait ChildMinSearch {
    /// Returns `(offset, key)` of the first minimum in `children`
    ///
    /// `children` must not be empty.
    fn min_child(&self, children: &[i32]) -> (usize, i32);
}

/// Linear scan; first strictly smaller key wins
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScalarSearch;

impl ChildMinSearch for ScalarSearch {
    #[inline]
    fn min_child(&self, children: &[i32]) -> (usize, i32) {
        let mut min_idx = 0;
        let mut min_key = children[0];
        for (i, &key) in children.iter().enumerate().skip(1) {
            if key < min_key {
                min_key = key;
                min_idx = i;
            }
        }
        (min_idx, min_key)
    }
}

/// Vector instruction set backing a [`VectorSearch`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VectorBackend {
    /// x86_64 SSE4.1 (`pminsd`, `pcmpeqd`, `movmskps`)
    Sse41,
    /// aarch64 Advanced SIMD (`smin`, `sminv`, `cmeq`)
    Neon,
}

impl VectorBackend {
    /// Detect the vector backend of the running CPU, if any
    pub fn detect() -> Option<Self> {
        #[cfg(target_arch = "x86_64")]
        {
            if std::arch::is_x86_feature_detected!("sse4.1") {
                return Some(VectorBackend::Sse41);
            }
            None
        }

        #[cfg(target_arch = "aarch64")]
        {
            // NEON is mandatory on aarch64
            Some(VectorBackend::Neon)
        }

        #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
        {
            None
        }
    }

    /// Short backend name
    pub const fn name(self) -> &'static str {
        match self {
            VectorBackend::Sse41 => "sse4.1",
            VectorBackend::Neon => "neon",
        }
    }
}

impl fmt::Display for VectorBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Vector compare search
///
/// Only obtainable through [`VectorSearch::detect`], so holding one proves the
/// CPU supports its backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VectorSearch {
    backend: VectorBackend,
}

impl VectorSearch {
    /// Returns a vector search if the running CPU supports one
    pub fn detect() -> Option<Self> {
        VectorBackend::detect().map(|backend| Self { backend })
    }

    /// The instruction set in use
    pub fn backend(&self) -> VectorBackend {
        self.backend
    }
}

impl ChildMinSearch for VectorSearch {
    #[inline]
    fn min_child(&self, children: &[i32]) -> (usize, i32) {
        if children.is_empty() || children.len() % LANES != 0 {
            return ScalarSearch.min_child(children);
        }

        match self.backend {
            #[cfg(target_arch = "x86_64")]
            // SAFETY: `Sse41` is only constructed after runtime SSE4.1 detection,
            // and the slice holds a whole, non-zero number of 4-lane blocks.
            VectorBackend::Sse41 => unsafe { x86_sse41::min_child(children) },
            #[cfg(target_arch = "aarch64")]
            // SAFETY: NEON is always available on aarch64, and the slice holds a
            // whole, non-zero number of 4-lane blocks.
            VectorBackend::Neon => unsafe { aarch64_neon::min_child(children) },
            _ => ScalarSearch.min_child(children),
        }
    }
}

#[cfg(target_arch = "x86_64")]
mod x86_sse41 {
    use super::{ChildMinSearch, ScalarSearch, LANES};
    use std::arch::x86_64::*;

    /// Caller guarantees SSE4.1 and `children.len()` a non-zero multiple of 4
    #[target_feature(enable = "sse4.1")]
    #[allow(unsafe_op_in_unsafe_fn)]
    pub(super) unsafe fn min_child(children: &[i32]) -> (usize, i32) {
        let ptr = children.as_ptr();
        let blocks = children.len() / LANES;

        let mut acc = _mm_loadu_si128(ptr as *const __m128i);
        for block in 1..blocks {
            let v = _mm_loadu_si128(ptr.add(block * LANES) as *const __m128i);
            acc = _mm_min_epi32(acc, v);
        }

        // swap halves, then swap neighbours: every lane ends up holding the min
        let m = _mm_min_epi32(acc, _mm_shuffle_epi32(acc, 0b01_00_11_10));
        let m = _mm_min_epi32(m, _mm_shuffle_epi32(m, 0b10_11_00_01));
        let min_key = _mm_cvtsi128_si32(m);

        let target = _mm_set1_epi32(min_key);
        for block in 0..blocks {
            let v = _mm_loadu_si128(ptr.add(block * LANES) as *const __m128i);
            let eq = _mm_cmpeq_epi32(v, target);
            let mask = _mm_movemask_ps(_mm_castsi128_ps(eq)) as u32;
            if mask != 0 {
                return (block * LANES + mask.trailing_zeros() as usize, min_key);
            }
        }

        // the reduced minimum is always present in some block
        ScalarSearch.min_child(children)
    }
}

#[cfg(target_arch = "aarch64")]
mod aarch64_neon {
    use super::{ChildMinSearch, ScalarSearch, LANES};
    use std::arch::aarch64::*;

    const LANE_BITS: [u32; 4] = [1, 2, 4, 8];

    /// Caller guarantees `children.len()` a non-zero multiple of 4
    #[target_feature(enable = "neon")]
    #[allow(unsafe_op_in_unsafe_fn)]
    pub(super) unsafe fn min_child(children: &[i32]) -> (usize, i32) {
        let ptr = children.as_ptr();
        let blocks = children.len() / LANES;

        let mut acc = vld1q_s32(ptr);
        for block in 1..blocks {
            acc = vminq_s32(acc, vld1q_s32(ptr.add(block * LANES)));
        }
        let min_key = vminvq_s32(acc);

        let target = vdupq_n_s32(min_key);
        let lane_bits = vld1q_u32(LANE_BITS.as_ptr());
        for block in 0..blocks {
            let eq = vceqq_s32(vld1q_s32(ptr.add(block * LANES)), target);
            let mask = vaddvq_u32(vandq_u32(eq, lane_bits));
            if mask != 0 {
                return (block * LANES + mask.trailing_zeros() as usize, min_key);
            }
        }

        ScalarSearch.min_child(children)
    }
}
