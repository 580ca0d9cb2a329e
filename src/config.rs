//! Construction-time heap configuration
//!
//! Every tunable of the heap is fixed when the heap is built and never changes
//! afterwards. [`HeapConfig`] carries them; [`HeapConfig::validate`] rejects the
//! combinations the engine cannot run with.
//!
//! # Example
//!
//! ```rust
//! use simd_dheap::config::{HeapConfig, VectorPolicy};
//!
//! let config = HeapConfig::builder()
//!     .arity(16)
//!     .policy(VectorPolicy::Always)
//!     .build()
//!     .unwrap();
//! assert_eq!(config.arity, 16);
//!
//! assert!(HeapConfig::builder().arity(1).build().is_err());
//! ```

use std::fmt;
use std::str::FromStr;

use tracing::warn;

use crate::traits::HeapError;

/// Default number of children per node
pub const DEFAULT_ARITY: usize = 4;

/// Default smallest arity for which the hybrid policy vectorizes heapify
pub const DEFAULT_BUILD_MIN_ARITY: usize = 8;

/// Default smallest heap size for which the hybrid policy vectorizes a root pop
pub const DEFAULT_POP_MIN_SIZE: usize = 1 << 22;

/// Default payload record size (no payload storage)
pub const DEFAULT_PAYLOAD_BYTES: usize = 0;

/// When sift-down may use vector comparison to find the smallest child
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VectorPolicy {
    /// Scalar comparison only
    Never,
    /// Vector comparison whenever a full block of children is present
    Always,
    /// Vector comparison only where it pays for itself: the wide upper levels
    /// during heapify, and the root step of a pop on a very large, very wide heap
    #[default]
    Hybrid,
}

impl VectorPolicy {
    /// Numeric policy code: 0 = never, 1 = always, 2 = hybrid
    pub const fn code(self) -> u8 {
        match self {
            VectorPolicy::Never => 0,
            VectorPolicy::Always => 1,
            VectorPolicy::Hybrid => 2,
        }
    }

    /// Parse a numeric policy code
    ///
    /// # Errors
    /// Returns [`HeapError::InvalidConfiguration`] for codes other than 0, 1, 2.
    pub fn from_code(code: u8) -> Result<Self, HeapError> {
        match code {
            0 => Ok(VectorPolicy::Never),
            1 => Ok(VectorPolicy::Always),
            2 => Ok(VectorPolicy::Hybrid),
            other => Err(HeapError::invalid_configuration(format!(
                "unsupported vector policy code {other} (expected 0, 1 or 2)"
            ))),
        }
    }

    /// Lower-case policy name
    pub const fn as_str(self) -> &'static str {
        match self {
            VectorPolicy::Never => "never",
            VectorPolicy::Always => "always",
            VectorPolicy::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for VectorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VectorPolicy {
    type Err = HeapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "never" | "0" => Ok(VectorPolicy::Never),
            "always" | "1" => Ok(VectorPolicy::Always),
            "hybrid" | "2" => Ok(VectorPolicy::Hybrid),
            other => Err(HeapError::invalid_configuration(format!(
                "unsupported vector policy {other:?} (expected never, always or hybrid)"
            ))),
        }
    }
}

/// Immutable heap configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeapConfig {
    /// Maximum number of children per node, at least 2
    pub arity: usize,
    /// Vector comparison policy
    pub policy: VectorPolicy,
    /// Hybrid only: heapify is vectorized only when `arity >= build_min_arity`
    pub build_min_arity: usize,
    /// Hybrid only: the root pop step is vectorized only when `len >= pop_min_size`
    pub pop_min_size: usize,
    /// Size in bytes of the per-handle payload record; 0 allocates nothing
    pub payload_bytes: usize,
    /// Allow vector comparison at all; `false` forces the scalar path
    /// regardless of `policy`
    pub vectorize: bool,
}

impl Default for HeapConfig {
    fn default() -> Self {
        Self {
            arity: DEFAULT_ARITY,
            policy: VectorPolicy::default(),
            build_min_arity: DEFAULT_BUILD_MIN_ARITY,
            pop_min_size: DEFAULT_POP_MIN_SIZE,
            payload_bytes: DEFAULT_PAYLOAD_BYTES,
            vectorize: true,
        }
    }
}

impl HeapConfig {
    /// Start building a configuration from the defaults
    pub fn builder() -> HeapConfigBuilder {
        HeapConfigBuilder::default()
    }

    /// Default configuration with the given arity
    ///
    /// # Errors
    /// Returns [`HeapError::InvalidConfiguration`] when `arity < 2`.
    pub fn with_arity(arity: usize) -> Result<Self, HeapError> {
        Self::builder().arity(arity).build()
    }

    /// Check that the engine can run with this configuration
    ///
    /// # Errors
    /// Returns [`HeapError::InvalidConfiguration`] when the arity is below 2 or
    /// the hybrid build threshold is zero.
    pub fn validate(&self) -> Result<(), HeapError> {
        let rejection = if self.arity < 2 {
            Some(format!("arity must be at least 2, got {}", self.arity))
        } else if self.build_min_arity == 0 {
            Some("build_min_arity must be at least 1".to_string())
        } else {
            None
        };

        match rejection {
            Some(reason) => {
                warn!(arity = self.arity, policy = %self.policy, %reason, "rejecting heap configuration");
                Err(HeapError::invalid_configuration(reason))
            }
            None => Ok(()),
        }
    }
}

/// Consuming builder for [`HeapConfig`]
#[derive(Debug, Clone, Default)]
pub struct HeapConfigBuilder {
    config: HeapConfig,
}

impl HeapConfigBuilder {
    /// Set the arity
    pub fn arity(mut self, arity: usize) -> Self {
        self.config.arity = arity;
        self
    }

    /// Set the vector policy
    pub fn policy(mut self, policy: VectorPolicy) -> Self {
        self.config.policy = policy;
        self
    }

    /// Set the vector policy from its numeric code
    ///
    /// # Errors
    /// Returns [`HeapError::InvalidConfiguration`] for an unknown code.
    pub fn policy_code(self, code: u8) -> Result<Self, HeapError> {
        Ok(self.policy(VectorPolicy::from_code(code)?))
    }

    /// Set the hybrid heapify arity threshold
    pub fn build_min_arity(mut self, build_min_arity: usize) -> Self {
        self.config.build_min_arity = build_min_arity;
        self
    }

    /// Set the hybrid root-pop size threshold
    pub fn pop_min_size(mut self, pop_min_size: usize) -> Self {
        self.config.pop_min_size = pop_min_size;
        self
    }

    /// Set the per-handle payload record size
    pub fn payload_bytes(mut self, payload_bytes: usize) -> Self {
        self.config.payload_bytes = payload_bytes;
        self
    }

    /// Allow or forbid vector comparison
    pub fn vectorize(mut self, vectorize: bool) -> Self {
        self.config.vectorize = vectorize;
        self
    }

    /// Validate and return the configuration
    ///
    /// # Errors
    /// See [`HeapConfig::validate`].
    pub fn build(self) -> Result<HeapConfig, HeapError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
