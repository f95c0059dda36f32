//! Registry of live changes-feed connections.
//!
//! Each streaming connection runs an independent producer loop; nothing is
//! routed between them. The registry exists so the server handle can cancel
//! every open stream on shutdown and so logs can account for connection
//! lifecycles.

use dashmap::DashMap;
use log::*;
use tokio::sync::watch;

/// Unique identifier for a streaming connection (server-generated)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-connection bookkeeping held by the registry.
#[derive(Debug)]
struct ConnectionInfo {
    recipe: String,
    cancel: watch::Sender<bool>,
}

/// Connection registry keyed by [`ConnectionId`] - O(1) registration and
/// cleanup.
pub struct ConnectionRegistry {
    connections: DashMap<ConnectionId, ConnectionInfo>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    /// Register a new connection - O(1). Returns its id plus the receiver
    /// the driver selects on for shutdown cancellation.
    pub fn register(&self, recipe: &str) -> (ConnectionId, watch::Receiver<bool>) {
        let connection_id = ConnectionId::new();
        let (cancel_tx, cancel_rx) = watch::channel(false);

        self.connections.insert(
            connection_id.clone(),
            ConnectionInfo {
                recipe: recipe.to_string(),
                cancel: cancel_tx,
            },
        );

        info!(
            "Registered changes stream {} for recipe '{}'",
            connection_id.as_str(),
            recipe
        );
        (connection_id, cancel_rx)
    }

    /// Unregister a connection - O(1)
    pub fn unregister(&self, connection_id: &ConnectionId) {
        if let Some((_, info)) = self.connections.remove(connection_id) {
            info!(
                "Unregistered changes stream {} for recipe '{}'",
                connection_id.as_str(),
                info.recipe
            );
        }
    }

    /// Cancel every live stream. Used by the server handle on shutdown; each
    /// driver observes its receiver and tears its connection down.
    pub fn shutdown_all(&self) {
        for entry in self.connections.iter() {
            if entry.value().cancel.send(true).is_err() {
                debug!("Stream {} already finished", entry.key().as_str());
            }
        }
    }

    pub fn active_count(&self) -> usize {
        self.connections.len()
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

    #[test]
    fn register_and_unregister_track_the_count() {
        let registry = ConnectionRegistry::new();
        assert_eq!(registry.active_count(), 0);

        let (id_a, _rx_a) = registry.register("all");
        let (id_b, _rx_b) = registry.register("drafts");
        assert_eq!(registry.active_count(), 2);

        registry.unregister(&id_a);
        assert_eq!(registry.active_count(), 1);

        // Unregistering twice is harmless.
        registry.unregister(&id_a);
        assert_eq!(registry.active_count(), 1);

        registry.unregister(&id_b);
        assert_eq!(registry.active_count(), 0);
    }

    #[test]
    fn shutdown_all_signals_every_receiver() {
        let registry = ConnectionRegistry::new();
        let (_id_a, mut rx_a) = registry.register("all");
        let (_id_b, mut rx_b) = registry.register("drafts");

        registry.shutdown_all();

        assert!(rx_a.has_changed().unwrap());
        assert!(rx_b.has_changed().unwrap());
        assert!(*rx_a.borrow_and_update());
        assert!(*rx_b.borrow_and_update());
    }

    #[test]
    fn shutdown_all_tolerates_finished_streams() {
        let registry = ConnectionRegistry::new();
        let (_id, rx) = registry.register("all");
        drop(rx);
        // The receiver is gone but the entry lingers until unregistered;
        // shutdown must not panic on the dead sender.
        registry.shutdown_all();
    }

    #[test]
    fn connection_ids_are_unique() {
        assert_ne!(ConnectionId::new(), ConnectionId::new());
    }
}
