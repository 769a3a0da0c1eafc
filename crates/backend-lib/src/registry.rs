// ============================
// tripmate-backend-lib/src/registry.rs
// ============================
//! Live connection registry, readiness flags and broadcast fanout.
//!
//! One entry per open WebSocket, created on upgrade and discarded on
//! disconnect. Nothing here survives a restart. Readiness is aggregated
//! fresh on every flag change by scanning the live entries, so a connection
//! that drops without ever signalling can never block the group.

use std::collections::HashMap;

use dashmap::DashMap;
use tokio::sync::mpsc;
use uuid::Uuid;

use tripmate_common::ServerEvent;

pub type ConnId = Uuid;

/// Display colors handed out to announcing users. Assignment is by live
/// connection count modulo the palette size, not by identity, so two users
/// sharing a color is expected.
pub const COLOR_PALETTE: [&str; 3] = ["tomato", "greenyellow", "yellow"];

/// The planning steps a connection can signal readiness for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadinessKind {
    Flights,
    Hotels,
}

struct ConnectionEntry {
    tx: mpsc::UnboundedSender<ServerEvent>,
    flags: HashMap<ReadinessKind, bool>,
}

/// Registry of currently open connections
///
/// Owned by [`crate::AppState`]; handlers reach it by reference rather than
/// through any ambient global.
pub struct ConnectionRegistry {
    conns: DashMap<ConnId, ConnectionEntry>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            conns: DashMap::new(),
        }
    }

    /// Register a connection's outbound channel, returning its id.
    pub fn register(&self, tx: mpsc::UnboundedSender<ServerEvent>) -> ConnId {
        let id = Uuid::new_v4();
        self.conns.insert(
            id,
            ConnectionEntry {
                tx,
                flags: HashMap::new(),
            },
        );
        id
    }

    /// Drop a connection and its flags. Peers are not notified.
    pub fn unregister(&self, id: ConnId) {
        self.conns.remove(&id);
    }

    /// Number of currently live connections.
    pub fn live_count(&self) -> usize {
        self.conns.len()
    }

    /// Display color for a connection count.
    pub fn color_for_count(count: usize) -> &'static str {
        COLOR_PALETTE[count % COLOR_PALETTE.len()]
    }

    /// Update a readiness flag with the wire's toggle-or-initialize
    /// semantics: a flag currently `true` flips to `false`; an unset (or
    /// `false`) flag adopts the hint literally. Returns the stored value,
    /// or `false` for an unknown connection.
    pub fn toggle_or_set(&self, id: ConnId, kind: ReadinessKind, hint: bool) -> bool {
        let Some(mut entry) = self.conns.get_mut(&id) else {
            return false;
        };
        let current = entry.flags.get(&kind).copied().unwrap_or(false);
        let next = if current { false } else { hint };
        entry.flags.insert(kind, next);
        next
    }

    /// Set a readiness flag to `true` unconditionally. There is no reset:
    /// once every live connection is marked, the aggregate stays unanimous
    /// until someone disconnects.
    pub fn mark_ready(&self, id: ConnId, kind: ReadinessKind) {
        if let Some(mut entry) = self.conns.get_mut(&id) {
            entry.flags.insert(kind, true);
        }
    }

    /// AND of a readiness flag across all live connections; an unset flag
    /// counts as `false`. Only live entries participate, so disconnected
    /// ones are out of both numerator and denominator.
    pub fn is_unanimous(&self, kind: ReadinessKind) -> bool {
        self.conns
            .iter()
            .all(|entry| entry.value().flags.get(&kind).copied().unwrap_or(false))
    }

    /// Deliver an event to every live connection, sender included. One
    /// uninterrupted scan; failed sends (a peer mid-disconnect) are dropped.
    pub fn broadcast(&self, event: &ServerEvent) {
        for entry in self.conns.iter() {
            let _ = entry.value().tx.send(event.clone());
        }
    }

    /// Deliver an event to one connection only. Returns whether the event
    /// was handed to a live channel.
    pub fn send_to(&self, id: ConnId, event: ServerEvent) -> bool {
        match self.conns.get(&id) {
            Some(entry) => entry.tx.send(event).is_ok(),
            None => false,
        }
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    fn connect(registry: &ConnectionRegistry) -> (ConnId, UnboundedReceiver<ServerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (registry.register(tx), rx)
    }

    #[test]
    fn test_register_and_unregister() {
        let registry = ConnectionRegistry::new();
        let (id, _rx) = connect(&registry);
        assert_eq!(registry.live_count(), 1);

        registry.unregister(id);
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn test_color_cycles_through_palette() {
        let colors: Vec<_> = (0..6).map(ConnectionRegistry::color_for_count).collect();
        assert_eq!(
            colors,
            [
                "tomato",
                "greenyellow",
                "yellow",
                "tomato",
                "greenyellow",
                "yellow"
            ]
        );
    }

    #[test]
    fn test_toggle_or_set_semantics() {
        let registry = ConnectionRegistry::new();
        let (id, _rx) = connect(&registry);

        // unset flag adopts the hint literally
        assert!(!registry.toggle_or_set(id, ReadinessKind::Flights, false));
        // a false flag is indistinguishable from unset, so it adopts again
        assert!(registry.toggle_or_set(id, ReadinessKind::Flights, true));
        // a true flag flips regardless of the hint
        assert!(!registry.toggle_or_set(id, ReadinessKind::Flights, true));
        assert!(registry.toggle_or_set(id, ReadinessKind::Flights, true));
        assert!(!registry.toggle_or_set(id, ReadinessKind::Flights, false));
    }

    #[test]
    fn test_unanimity_requires_every_live_connection() {
        let registry = ConnectionRegistry::new();
        let (a, _rx_a) = connect(&registry);
        let (_b, _rx_b) = connect(&registry);

        registry.toggle_or_set(a, ReadinessKind::Flights, true);
        assert!(!registry.is_unanimous(ReadinessKind::Flights));
    }

    #[test]
    fn test_unanimity_ignores_disconnected_connections() {
        let registry = ConnectionRegistry::new();
        let (a, _rx_a) = connect(&registry);
        let (b, _rx_b) = connect(&registry);
        let (c, _rx_c) = connect(&registry);

        registry.toggle_or_set(a, ReadinessKind::Flights, true);
        registry.toggle_or_set(b, ReadinessKind::Flights, true);
        assert!(!registry.is_unanimous(ReadinessKind::Flights));

        // the holdout leaving makes the remaining pair unanimous
        registry.unregister(c);
        assert!(registry.is_unanimous(ReadinessKind::Flights));
    }

    #[test]
    fn test_flags_are_per_kind() {
        let registry = ConnectionRegistry::new();
        let (a, _rx_a) = connect(&registry);

        registry.mark_ready(a, ReadinessKind::Hotels);
        assert!(registry.is_unanimous(ReadinessKind::Hotels));
        assert!(!registry.is_unanimous(ReadinessKind::Flights));
    }

    #[test]
    fn test_broadcast_reaches_everyone_including_sender() {
        let registry = ConnectionRegistry::new();
        let (_a, mut rx_a) = connect(&registry);
        let (_b, mut rx_b) = connect(&registry);

        registry.broadcast(&ServerEvent::NextStep("flights".to_string()));

        assert_eq!(
            rx_a.try_recv().unwrap(),
            ServerEvent::NextStep("flights".to_string())
        );
        assert_eq!(
            rx_b.try_recv().unwrap(),
            ServerEvent::NextStep("flights".to_string())
        );
    }

    #[test]
    fn test_send_to_targets_one_connection() {
        let registry = ConnectionRegistry::new();
        let (a, mut rx_a) = connect(&registry);
        let (_b, mut rx_b) = connect(&registry);

        let delivered = registry.send_to(a, ServerEvent::NextStep("flights".to_string()));
        assert!(delivered);
        assert!(rx_a.try_recv().is_ok());
        assert!(rx_b.try_recv().is_err());

        registry.unregister(a);
        assert!(!registry.send_to(a, ServerEvent::NextStep("flights".to_string())));
    }
}
