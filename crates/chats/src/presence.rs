//! Process-local presence: which live connection reaches which user.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info, warn};

use crate::types::ServerEvent;

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PushError {
    #[error("connection {0} is closed")]
    Closed(u64),
    #[error("outbound queue of connection {0} is full")]
    Full(u64),
}

/// The sending half of one live connection's outbound queue.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: u64,
    sender: mpsc::Sender<ServerEvent>,
}

impl ConnectionHandle {
    pub fn new(sender: mpsc::Sender<ServerEvent>) -> Self {
        Self {
            id: NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
            sender,
        }
    }

    /// A handle plus the receiver its connection task drains.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<ServerEvent>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self::new(sender), receiver)
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Queue an event without waiting for room in the outbound queue.
    pub fn push(&self, event: ServerEvent) -> Result<(), PushError> {
        self.sender.try_send(event).map_err(|error| match error {
            mpsc::error::TrySendError::Full(_) => PushError::Full(self.id),
            mpsc::error::TrySendError::Closed(_) => PushError::Closed(self.id),
        })
    }
}

/// Maps each online user to one connection. A newer registration for the
/// same user replaces the older one.
#[derive(Debug, Clone, Default)]
pub struct PresenceRegistry {
    connections: Arc<RwLock<HashMap<String, ConnectionHandle>>>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the handle this registration replaced, if any.
    pub async fn register(
        &self,
        user_id: impl Into<String>,
        handle: ConnectionHandle,
    ) -> Option<ConnectionHandle> {
        let user_id = user_id.into();
        let connection_id = handle.id();
        let previous = self
            .connections
            .write()
            .await
            .insert(user_id.clone(), handle);

        match &previous {
            Some(old) => info!(
                user_id = %user_id,
                connection_id,
                replaced = old.id(),
                "user reconnected, newest connection wins"
            ),
            None => info!(user_id = %user_id, connection_id, "user online"),
        }
        previous
    }

    pub async fn unregister(&self, user_id: &str) -> Option<ConnectionHandle> {
        let removed = self.connections.write().await.remove(user_id);
        if removed.is_some() {
            info!(user_id = %user_id, "user offline");
        }
        removed
    }

    /// Removes the entry only while it still points at `connection_id`, so a
    /// stale connection closing does not evict its replacement.
    pub async fn unregister_connection(&self, user_id: &str, connection_id: u64) -> bool {
        let mut connections = self.connections.write().await;
        match connections.get(user_id) {
            Some(handle) if handle.id() == connection_id => {
                connections.remove(user_id);
                info!(user_id = %user_id, connection_id, "user offline");
                true
            }
            Some(_) => {
                debug!(user_id = %user_id, connection_id, "stale connection closed");
                false
            }
            None => false,
        }
    }

    pub async fn lookup(&self, user_id: &str) -> Option<ConnectionHandle> {
        self.connections.read().await.get(user_id).cloned()
    }

    pub async fn is_online(&self, user_id: &str) -> bool {
        self.connections.read().await.contains_key(user_id)
    }

    pub async fn online_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Push `event` to every registered connection. Returns how many accepted it.
    pub async fn broadcast_all(&self, event: &ServerEvent) -> usize {
        let handles: Vec<(String, ConnectionHandle)> = self
            .connections
            .read()
            .await
            .iter()
            .map(|(user, handle)| (user.clone(), handle.clone()))
            .collect();

        let mut delivered = 0;
        for (user_id, handle) in handles {
            match handle.push(event.clone()) {
                Ok(()) => delivered += 1,
                Err(error) => warn!(user_id = %user_id, %error, "broadcast push failed"),
            }
        }
        delivered
    }

    /// Drops every entry. Returns how many were removed.
    pub async fn clear(&self) -> usize {
        let mut connections = self.connections.write().await;
        let count = connections.len();
        connections.clear();
        if count > 0 {
            info!(count, "presence registry cleared");
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn lookup_returns_latest_registration() {
        let presence = PresenceRegistry::new();
        let (first, _rx1) = ConnectionHandle::channel(4);
        let (second, _rx2) = ConnectionHandle::channel(4);

        assert!(presence.register("u1", first.clone()).await.is_none());
        let replaced = presence.register("u1", second.clone()).await;

        assert_eq!(replaced.map(|h| h.id()), Some(first.id()));
        assert_eq!(presence.lookup("u1").await.map(|h| h.id()), Some(second.id()));
        assert_eq!(presence.online_count().await, 1);
    }

    #[tokio::test]
    async fn unregister_is_a_noop_for_unknown_user() {
        let presence = PresenceRegistry::new();
        assert!(presence.unregister("ghost").await.is_none());
        assert!(!presence.is_online("ghost").await);
    }

    #[tokio::test]
    async fn stale_connection_does_not_evict_replacement() {
        let presence = PresenceRegistry::new();
        let (old, _rx1) = ConnectionHandle::channel(4);
        let (new, _rx2) = ConnectionHandle::channel(4);
        presence.register("u1", old.clone()).await;
        presence.register("u1", new.clone()).await;

        assert!(!presence.unregister_connection("u1", old.id()).await);
        assert!(presence.is_online("u1").await);

        assert!(presence.unregister_connection("u1", new.id()).await);
        assert!(!presence.is_online("u1").await);
    }

    #[tokio::test]
    async fn broadcast_reaches_every_open_connection() {
        let presence = PresenceRegistry::new();
        let (a, mut rx_a) = ConnectionHandle::channel(4);
        let (b, mut rx_b) = ConnectionHandle::channel(4);
        let (closed, rx_closed) = ConnectionHandle::channel(4);
        drop(rx_closed);
        presence.register("a", a).await;
        presence.register("b", b).await;
        presence.register("c", closed).await;

        let event = ServerEvent::Test(json!({ "ping": 1 }));
        assert_eq!(presence.broadcast_all(&event).await, 2);
        assert_eq!(rx_a.recv().await, Some(event.clone()));
        assert_eq!(rx_b.recv().await, Some(event));
    }

    #[tokio::test]
    async fn push_reports_full_queue() {
        let (handle, _rx) = ConnectionHandle::channel(1);
        handle.push(ServerEvent::Test(json!(1))).unwrap();
        assert_eq!(
            handle.push(ServerEvent::Test(json!(2))),
            Err(PushError::Full(handle.id()))
        );
    }

    #[tokio::test]
    async fn clear_drops_all_entries() {
        let presence = PresenceRegistry::new();
        let (a, _rx) = ConnectionHandle::channel(1);
        presence.register("a", a.clone()).await;
        presence.register("b", a).await;

        assert_eq!(presence.clear().await, 2);
        assert_eq!(presence.online_count().await, 0);
    }
}
