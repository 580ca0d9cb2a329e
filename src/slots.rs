//! Handle pool and payload store
//!
//! Every key in the heap is paired with a [`Handle`], a stable identifier that
//! travels with the key as sift-up and sift-down move it between array
//! positions. Handles are:
//!
//! - minted from a counter (`0, 1, 2, ...`) when the free list is empty
//! - released when their key is popped
//! - reused most-recently-released first
//!
//! When the heap is configured with a non-zero payload record size, minting a
//! handle also appends a zeroed record of that size to a flat byte store, so
//! record `h` lives at `h * payload_bytes`. Nothing reads the records yet; they
//! reserve room for satellite data addressed by handle.

use std::fmt;

/// Stable identifier of one logical heap element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(u32);

impl Handle {
    /// Raw handle value
    #[inline]
    pub fn value(self) -> u32 {
        self.0
    }

    /// Handle value as an index into per-handle storage
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Free-list handle allocator with an optional fixed-size payload per handle
#[derive(Debug, Clone, Default)]
pub(crate) struct SlotPool {
    free: Vec<Handle>,
    next: usize,
    payload_bytes: usize,
    payloads: Vec<u8>,
}

impl SlotPool {
    pub(crate) fn new(payload_bytes: usize) -> Self {
        Self {
            payload_bytes,
            ..Self::default()
        }
    }

    /// Reuse a released handle, or mint a new one
    #[inline]
    pub(crate) fn acquire(&mut self) -> Handle {
        if let Some(handle) = self.free.pop() {
            return handle;
        }
        // handle values wrap past u32::MAX; reaching that takes over 16 GiB of keys
        let handle = Handle(self.next as u32);
        self.next += 1;
        if self.payload_bytes > 0 {
            self.payloads
                .resize(self.payloads.len() + self.payload_bytes, 0);
        }
        handle
    }

    #[inline]
    pub(crate) fn release(&mut self, handle: Handle) {
        self.free.push(handle);
    }

    /// Forget every handle; the next mint starts again at 0
    pub(crate) fn reset(&mut self) {
        self.free.clear();
        self.next = 0;
        self.payloads.clear();
    }

    /// Number of handles minted since creation or the last reset
    pub(crate) fn minted(&self) -> usize {
        self.next
    }

    pub(crate) fn free_len(&self) -> usize {
        self.free.len()
    }

    pub(crate) fn payload_store_len(&self) -> usize {
        self.payloads.len()
    }

    #[cfg(test)]
    fn record(&self, handle: Handle) -> Option<&[u8]> {
        if self.payload_bytes == 0 || handle.index() >= self.next {
            return None;
        }
        let start = handle.index() * self.payload_bytes;
        self.payloads.get(start..start + self.payload_bytes)
    }
}
