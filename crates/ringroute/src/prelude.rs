//! Convenient imports for common usage.
//!
//! ```rust
//! use ringroute::prelude::*;
//! ```

pub use crate::events::{RingEvent, RingObserver};
pub use crate::hashing::{RingHasher, Xxh3Hasher};
pub use crate::ring::{HashRing, HashRingBuilder};
pub use crate::types::{Position, RingConfig, RingError, RingResult};
