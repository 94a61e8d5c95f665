//! Core types shared across the ring.
//!
//! Defines ring positions, the tunable ring configuration, and the error
//! type returned by fallible ring operations.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A position on the ring, always in `[0, modulus)`.
pub type Position = u64;

/// Default number of virtual nodes per physical node.
pub const DEFAULT_REPLICAS: u32 = 3;

/// Upper bound on virtual nodes per physical node.
pub const MAX_REPLICAS: u32 = 4096;

/// Default size of the hash space.
pub const DEFAULT_MODULUS: u64 = 1000;

/// Tunable parameters of a hash ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RingConfig {
    /// Virtual nodes placed for every physical node.
    #[serde(default = "default_replicas")]
    pub replicas: u32,
    /// Size of the hash space; positions fall in `[0, modulus)`.
    #[serde(default = "default_modulus")]
    pub modulus: u64,
}

fn default_replicas() -> u32 {
    DEFAULT_REPLICAS
}

fn default_modulus() -> u64 {
    DEFAULT_MODULUS
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            replicas: DEFAULT_REPLICAS,
            modulus: DEFAULT_MODULUS,
        }
    }
}

impl RingConfig {
    /// Create a config with explicit replica count and modulus.
    pub fn new(replicas: u32, modulus: u64) -> Self {
        Self { replicas, modulus }
    }

    /// Check that the config describes a usable ring.
    ///
    /// A zero modulus leaves no positions to place anything on, and zero
    /// replicas would let a registered node own nothing. Replicas are capped
    /// at [`MAX_REPLICAS`] since every add and remove walks all of them.
    pub fn validate(&self) -> RingResult<()> {
        if self.replicas == 0 {
            return Err(RingError::InvalidConfig(
                "replicas must be greater than 0".to_string(),
            ));
        }
        if self.replicas > MAX_REPLICAS {
            return Err(RingError::InvalidConfig(format!(
                "replicas must be at most {}, got {}",
                MAX_REPLICAS, self.replicas
            )));
        }
        if self.modulus == 0 {
            return Err(RingError::InvalidConfig(
                "modulus must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Errors that can occur in ring operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RingError {
    #[error("Node {0:?} not found")]
    NodeNotFound(String),

    #[error("Invalid ring config: {0}")]
    InvalidConfig(String),
}

/// Result type for ring operations.
pub type RingResult<T> = Result<T, RingError>;
