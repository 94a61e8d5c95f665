//! Consistent hash ring for key-to-node routing.
//!
//! Each physical node is placed on the ring as `replicas` virtual nodes,
//! one per string `"{node}:{replica}"`. A key is owned by the first occupied
//! position at or after the key's own position, wrapping to the lowest
//! position when the key hashes past every virtual node. Adding or removing
//! a node therefore only moves the keys adjacent to its virtual nodes.
//!
//! Two virtual nodes that land on the same position are resolved by last
//! write wins, and removal clears a node's positions whoever owns them at
//! the time. Both behaviors are reported through [`RingEvent`] so callers
//! can detect them.

use crate::events::{RingEvent, RingObserver, TracingObserver};
use crate::hashing::{position_of, vnode_key, RingHasher, Xxh3Hasher};
use crate::types::{Position, RingConfig, RingError, RingResult};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Shared handle to the observer notified of ring mutations.
pub type SharedObserver = Arc<dyn RingObserver + Send + Sync>;

/// A consistent hash ring mapping keys to node identifiers.
///
/// Lookups are O(log n) in the number of virtual nodes. The ring performs
/// no locking; wrap it in `Arc<RwLock<_>>` to share it between threads.
///
/// # Example
///
/// ```
/// use ringroute::HashRing;
///
/// let mut ring = HashRing::with_nodes(["node1", "node2"]);
/// let owner = ring.get_node("user:123").map(str::to_string);
/// assert!(owner.is_some());
///
/// ring.add_node("node3");
/// ring.remove_node("node2").unwrap();
/// assert!(ring.remove_node("node2").is_err());
/// ```
#[derive(Clone)]
pub struct HashRing<H = Xxh3Hasher> {
    /// Ring mapping positions to the node that owns them.
    ring: BTreeMap<Position, String>,
    /// Registered physical nodes.
    nodes: BTreeSet<String>,
    config: RingConfig,
    hasher: H,
    observer: SharedObserver,
}

impl HashRing {
    /// Create an empty ring with the default config and hasher.
    pub fn new() -> Self {
        Self::from_parts(RingConfig::default(), Xxh3Hasher, Arc::new(TracingObserver))
    }

    /// Create a ring with the default config, seeded with `nodes` in order.
    pub fn with_nodes<I, S>(nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ring = Self::new();
        ring.extend(nodes);
        ring
    }

    /// Start building a ring with a custom config, hasher or observer.
    pub fn builder() -> HashRingBuilder {
        HashRingBuilder::new()
    }
}

impl Default for HashRing {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: RingHasher> HashRing<H> {
    fn from_parts(config: RingConfig, hasher: H, observer: SharedObserver) -> Self {
        Self {
            ring: BTreeMap::new(),
            nodes: BTreeSet::new(),
            config,
            hasher,
            observer,
        }
    }

    /// Hash `key` to its position on the ring.
    pub fn hash(&self, key: &str) -> Position {
        position_of(&self.hasher, key, self.config.modulus)
    }

    /// Add a node and place its virtual nodes.
    ///
    /// Each virtual node overwrites whatever owned its position before.
    /// Adding a node that is already present rewrites the same positions.
    pub fn add_node(&mut self, node: impl Into<String>) {
        let node = node.into();
        let mut positions = Vec::with_capacity(self.config.replicas as usize);

        for replica in 0..self.config.replicas {
            let position = self.hash(&vnode_key(&node, replica));
            let displaced = self.ring.insert(position, node.clone());
            self.observer.on_event(&RingEvent::VirtualNodePlaced {
                node: node.clone(),
                replica,
                position,
                displaced,
            });
            positions.push(position);
        }

        self.nodes.insert(node.clone());
        self.observer.on_event(&RingEvent::NodeAdded { node, positions });
    }

    /// Remove a node and clear its virtual node positions.
    ///
    /// Fails with [`RingError::NodeNotFound`] if the node is not registered,
    /// in which case the ring is left untouched. Positions are cleared even
    /// if another node overwrote them after this node was added.
    pub fn remove_node(&mut self, node: &str) -> RingResult<()> {
        if !self.nodes.contains(node) {
            warn!(%node, "attempted to remove a node that is not on the ring");
            return Err(RingError::NodeNotFound(node.to_string()));
        }

        for replica in 0..self.config.replicas {
            let position = self.hash(&vnode_key(node, replica));
            let evicted = self.ring.remove(&position);
            self.observer.on_event(&RingEvent::VirtualNodeRemoved {
                node: node.to_string(),
                replica,
                position,
                evicted,
            });
        }

        self.nodes.remove(node);
        self.observer.on_event(&RingEvent::NodeRemoved {
            node: node.to_string(),
        });
        Ok(())
    }

    /// Get the node responsible for `key`, or `None` if the ring is empty.
    pub fn get_node(&self, key: &str) -> Option<&str> {
        self.locate(key).map(|(_, node)| node)
    }

    /// Like [`get_node`](Self::get_node), also returning the ring position
    /// of the virtual node that owns the key.
    pub fn locate(&self, key: &str) -> Option<(Position, &str)> {
        if self.ring.is_empty() {
            return None;
        }
        self.successor(self.hash(key))
    }

    /// Find the first occupied position at or after `position`, wrapping to
    /// the lowest occupied position.
    pub fn successor(&self, position: Position) -> Option<(Position, &str)> {
        self.ring
            .range(position..)
            .next()
            .or_else(|| self.ring.iter().next())
            .map(|(&pos, node)| (pos, node.as_str()))
    }

    /// Count how many of `keys` each node owns.
    ///
    /// Every registered node appears in the result, with zero if it owns
    /// none of the keys.
    pub fn distribution<I, S>(&self, keys: I) -> BTreeMap<String, usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut counts: BTreeMap<String, usize> =
            self.nodes.iter().map(|node| (node.clone(), 0)).collect();
        for key in keys {
            if let Some(node) = self.get_node(key.as_ref()) {
                *counts.entry(node.to_string()).or_insert(0) += 1;
            }
        }
        counts
    }
}

impl<H> HashRing<H> {
    /// Registered nodes in sorted order.
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(String::as_str)
    }

    /// Whether `node` is registered.
    pub fn contains_node(&self, node: &str) -> bool {
        self.nodes.contains(node)
    }

    /// Number of registered nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of occupied ring positions.
    pub fn vnode_count(&self) -> usize {
        self.ring.len()
    }

    /// True when no node is registered.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Occupied positions and their owners, in ring order.
    pub fn iter(&self) -> impl Iterator<Item = (Position, &str)> {
        self.ring.iter().map(|(&pos, node)| (pos, node.as_str()))
    }

    /// Positions currently owned by `node`, in ring order.
    pub fn positions_of(&self, node: &str) -> Vec<Position> {
        self.ring
            .iter()
            .filter(|(_, owner)| owner.as_str() == node)
            .map(|(&pos, _)| pos)
            .collect()
    }

    /// Size of the slice of hash space each node owns.
    ///
    /// A position owns the arc from just after its predecessor up to and
    /// including itself, so the shares of all nodes sum to the modulus
    /// whenever the ring is non-empty.
    pub fn ownership(&self) -> BTreeMap<String, u64> {
        let mut shares: BTreeMap<String, u64> =
            self.nodes.iter().map(|node| (node.clone(), 0)).collect();
        let Some((&last, _)) = self.ring.iter().next_back() else {
            return shares;
        };

        let mut prev = last;
        for (&pos, node) in &self.ring {
            let arc = if pos > prev {
                pos - prev
            } else {
                self.config.modulus - prev + pos
            };
            *shares.entry(node.clone()).or_insert(0) += arc;
            prev = pos;
        }
        shares
    }

    pub fn config(&self) -> &RingConfig {
        &self.config
    }
}

impl<H: RingHasher, S: Into<String>> Extend<S> for HashRing<H> {
    fn extend<I: IntoIterator<Item = S>>(&mut self, nodes: I) {
        for node in nodes {
            self.add_node(node);
        }
    }
}

impl<S: Into<String>> FromIterator<S> for HashRing {
    fn from_iter<I: IntoIterator<Item = S>>(nodes: I) -> Self {
        Self::with_nodes(nodes)
    }
}

impl<H> fmt::Debug for HashRing<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashRing")
            .field("config", &self.config)
            .field("nodes", &self.nodes)
            .field("ring", &self.ring)
            .finish_non_exhaustive()
    }
}

/// Builder for a [`HashRing`] with non-default settings.
pub struct HashRingBuilder<H = Xxh3Hasher> {
    config: RingConfig,
    hasher: H,
    observer: Option<SharedObserver>,
    nodes: Vec<String>,
}

impl HashRingBuilder {
    pub fn new() -> Self {
        Self {
            config: RingConfig::default(),
            hasher: Xxh3Hasher,
            observer: None,
            nodes: Vec::new(),
        }
    }
}

impl Default for HashRingBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> HashRingBuilder<H> {
    /// Replace the whole config.
    pub fn config(mut self, config: RingConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the number of virtual nodes per physical node.
    pub fn replicas(mut self, replicas: u32) -> Self {
        self.config.replicas = replicas;
        self
    }

    /// Set the size of the hash space.
    pub fn modulus(mut self, modulus: u64) -> Self {
        self.config.modulus = modulus;
        self
    }

    /// Use a different hash function for placement.
    pub fn hasher<H2: RingHasher>(self, hasher: H2) -> HashRingBuilder<H2> {
        HashRingBuilder {
            config: self.config,
            hasher,
            observer: self.observer,
            nodes: self.nodes,
        }
    }

    /// Send ring events to `observer` instead of `tracing`.
    pub fn observer<O>(mut self, observer: O) -> Self
    where
        O: RingObserver + Send + Sync + 'static,
    {
        self.observer = Some(Arc::new(observer));
        self
    }

    /// Share an existing observer handle.
    pub fn shared_observer(mut self, observer: SharedObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Nodes to add, in order, when the ring is built.
    pub fn nodes<I, S>(mut self, nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.nodes.extend(nodes.into_iter().map(Into::into));
        self
    }
}

impl<H: RingHasher> HashRingBuilder<H> {
    /// Validate the config and build the ring, adding any seed nodes.
    pub fn build(self) -> RingResult<HashRing<H>> {
        self.config.validate()?;
        let observer = self.observer.unwrap_or_else(|| Arc::new(TracingObserver));
        let mut ring = HashRing::from_parts(self.config, self.hasher, observer);
        ring.extend(self.nodes);
        Ok(ring)
    }
}
