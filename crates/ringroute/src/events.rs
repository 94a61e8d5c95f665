//! Ring mutation events and the observer hook that receives them.
//!
//! The ring reports every virtual-node placement and removal as a
//! [`RingEvent`]. Events are diagnostic; routing never depends on them.

use crate::types::Position;
use serde::Serialize;
use tracing::debug;

/// Event emitted by the ring while it is mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RingEvent {
    /// A virtual node was written to the ring.
    VirtualNodePlaced {
        node: String,
        replica: u32,
        position: Position,
        /// Previous owner of the position, if it was occupied.
        displaced: Option<String>,
    },
    /// A virtual node position was cleared.
    VirtualNodeRemoved {
        node: String,
        replica: u32,
        position: Position,
        /// Node that actually owned the position. May differ from `node`
        /// when another node's virtual node collided onto it later.
        evicted: Option<String>,
    },
    /// A physical node finished joining.
    NodeAdded { node: String, positions: Vec<Position> },
    /// A physical node finished leaving.
    NodeRemoved { node: String },
}

/// Receives ring events.
pub trait RingObserver {
    fn on_event(&self, event: &RingEvent);
}

impl<F> RingObserver for F
where
    F: Fn(&RingEvent),
{
    fn on_event(&self, event: &RingEvent) {
        self(event)
    }
}

/// Forwards events to `tracing` at debug level. Used when no observer is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl RingObserver for TracingObserver {
    fn on_event(&self, event: &RingEvent) {
        match event {
            RingEvent::VirtualNodePlaced {
                node,
                replica,
                position,
                displaced,
            } => {
                debug!(%node, replica, position, ?displaced, "placed virtual node");
            }
            RingEvent::VirtualNodeRemoved {
                node,
                replica,
                position,
                evicted,
            } => {
                debug!(%node, replica, position, ?evicted, "removed virtual node");
            }
            RingEvent::NodeAdded { node, positions } => {
                debug!(%node, ?positions, "added node to ring");
            }
            RingEvent::NodeRemoved { node } => {
                debug!(%node, "removed node from ring");
            }
        }
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl RingObserver for NoopObserver {
    fn on_event(&self, _event: &RingEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_closure_observer() {
        let seen = Mutex::new(Vec::new());
        let observer = |event: &RingEvent| seen.lock().unwrap().push(event.clone());
        observer.on_event(&RingEvent::NodeRemoved {
            node: "node1".to_string(),
        });
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_event_serialization() {
        let event = RingEvent::VirtualNodePlaced {
            node: "node1".to_string(),
            replica: 2,
            position: 780,
            displaced: None,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["VirtualNodePlaced"]["position"], 780);
        assert_eq!(json["VirtualNodePlaced"]["displaced"], serde_json::Value::Null);
    }

    /// Writer collecting formatted `tracing` output.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn capture_debug(f: impl FnOnce()) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        captured.text()
    }

    #[test]
    fn test_tracing_observer_logs_placement_fields() {
        let out = capture_debug(|| {
            TracingObserver.on_event(&RingEvent::VirtualNodePlaced {
                node: "node1".to_string(),
                replica: 2,
                position: 780,
                displaced: Some("node2".to_string()),
            });
        });

        assert!(out.contains("placed virtual node"), "{}", out);
        assert!(out.contains("node=node1"), "{}", out);
        assert!(out.contains("replica=2"), "{}", out);
        assert!(out.contains("position=780"), "{}", out);
        assert!(out.contains("displaced=Some(\"node2\")"), "{}", out);
    }

    #[test]
    fn test_tracing_observer_logs_removal() {
        let out = capture_debug(|| {
            TracingObserver.on_event(&RingEvent::NodeRemoved {
                node: "node2".to_string(),
            });
        });

        assert!(out.contains("DEBUG"), "{}", out);
        assert!(out.contains("removed node from ring"), "{}", out);
        assert!(out.contains("node=node2"), "{}", out);
    }

    #[test]
    fn test_noop_observer_logs_nothing() {
        let out = capture_debug(|| {
            NoopObserver.on_event(&RingEvent::NodeAdded {
                node: "node1".to_string(),
                positions: vec![12, 340, 780],
            });
        });
        assert!(out.is_empty(), "{}", out);
    }
}
