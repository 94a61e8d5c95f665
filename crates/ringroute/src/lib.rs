//! # ringroute
//!
//! Consistent hashing for routing keys to a changing set of nodes.
//! Every node is placed on a bounded hash ring as several virtual nodes,
//! and each key is owned by the first virtual node clockwise from it, so
//! nodes can join or leave while most keys keep their owner.

pub mod events;
pub mod hashing;
pub mod prelude;
pub mod ring;
pub mod types;

pub use events::{NoopObserver, RingEvent, RingObserver, TracingObserver};
pub use hashing::{RingHasher, Xxh3Hasher};
pub use ring::{HashRing, HashRingBuilder, SharedObserver};
pub use types::*;
