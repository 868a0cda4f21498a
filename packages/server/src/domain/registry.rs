//! Connection Registry: identity -> live connection.

use std::collections::HashMap;

use tokio::sync::Mutex;

use super::{
    connection::ConnectionHandle,
    subscription::SubscriptionTable,
    value_object::{ConnectionId, Identity, ProjectId},
};

/// Process-local map from identity to its single live connection.
///
/// At most one entry per identity. Registering again replaces the entry and
/// hands the previous handle back to the caller, who must close it.
///
/// Operations taking a [`SubscriptionTable`] update it while holding the
/// registry lock. Lock order is always registry, then subscriptions.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: Mutex<HashMap<Identity, ConnectionHandle>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `handle` under its identity.
    ///
    /// # Returns
    ///
    /// The handle that was registered for the same identity before, if any
    pub async fn register(&self, handle: ConnectionHandle) -> Option<ConnectionHandle> {
        let mut connections = self.connections.lock().await;
        connections.insert(handle.identity().clone(), handle)
    }

    /// Register `handle` and purge the subscriptions of the connection it
    /// replaces, in one critical section.
    ///
    /// # Returns
    ///
    /// The replaced handle and the number of projects purged, if a previous
    /// connection existed
    pub async fn register_replacing(
        &self,
        handle: ConnectionHandle,
        subscriptions: &SubscriptionTable,
    ) -> Option<(ConnectionHandle, usize)> {
        let mut connections = self.connections.lock().await;
        let identity = handle.identity().clone();
        let previous = connections.insert(identity.clone(), handle)?;
        let purged = subscriptions.unsubscribe_all(&identity).await;
        Some((previous, purged))
    }

    /// Subscribe `handle`'s identity to `project_id` only while `handle` is
    /// the current entry.
    ///
    /// # Returns
    ///
    /// `None` if `handle` is not current, otherwise whether the subscription
    /// is new
    pub async fn subscribe_if_current(
        &self,
        handle: &ConnectionHandle,
        project_id: ProjectId,
        subscriptions: &SubscriptionTable,
    ) -> Option<bool> {
        let connections = self.connections.lock().await;
        let identity = handle.identity();
        let current = connections
            .get(identity)
            .is_some_and(|entry| entry.id() == handle.id());
        if !current {
            return None;
        }
        Some(subscriptions.subscribe(project_id, identity.clone()).await)
    }

    /// Remove the entry of `identity` if it still belongs to `connection_id`
    /// and purge its subscriptions, in one critical section.
    ///
    /// # Returns
    ///
    /// Number of projects purged, or `None` if nothing was removed
    pub async fn remove_and_unsubscribe(
        &self,
        identity: &Identity,
        connection_id: &ConnectionId,
        subscriptions: &SubscriptionTable,
    ) -> Option<usize> {
        let mut connections = self.connections.lock().await;
        match connections.get(identity) {
            Some(handle) if handle.id() == connection_id => {
                connections.remove(identity);
                Some(subscriptions.unsubscribe_all(identity).await)
            }
            _ => None,
        }
    }

    /// Look up the live connection of `identity`.
    pub async fn lookup(&self, identity: &Identity) -> Option<ConnectionHandle> {
        let connections = self.connections.lock().await;
        connections.get(identity).cloned()
    }

    /// Remove the entry of `identity` if it still belongs to `connection_id`.
    ///
    /// # Returns
    ///
    /// `true` if an entry was removed
    pub async fn remove(&self, identity: &Identity, connection_id: &ConnectionId) -> bool {
        let mut connections = self.connections.lock().await;
        match connections.get(identity) {
            Some(handle) if handle.id() == connection_id => {
                connections.remove(identity);
                true
            }
            _ => false,
        }
    }

    /// Whether `connection_id` is the current entry for `identity`.
    pub async fn is_current(&self, identity: &Identity, connection_id: &ConnectionId) -> bool {
        let connections = self.connections.lock().await;
        connections
            .get(identity)
            .is_some_and(|handle| handle.id() == connection_id)
    }

    /// All registered connections.
    pub async fn snapshot(&self) -> Vec<ConnectionHandle> {
        let connections = self.connections.lock().await;
        connections.values().cloned().collect()
    }

    /// Number of registered identities.
    pub async fn len(&self) -> usize {
        let connections = self.connections.lock().await;
        connections.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
