//! Subscription Table: project -> interested identities.

use std::collections::{HashMap, HashSet};

use tokio::sync::Mutex;

use super::value_object::{Identity, ProjectId};

/// Process-local interest sets per project.
///
/// Entries are only ever added while a connection lives and are purged for
/// an identity as a whole when that connection goes away.
#[derive(Debug, Default)]
pub struct SubscriptionTable {
    projects: Mutex<HashMap<ProjectId, HashSet<Identity>>>,
}

impl SubscriptionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `identity` to the interest set of `project_id`.
    ///
    /// # Returns
    ///
    /// `true` if the identity was not subscribed yet
    pub async fn subscribe(&self, project_id: ProjectId, identity: Identity) -> bool {
        let mut projects = self.projects.lock().await;
        projects.entry(project_id).or_default().insert(identity)
    }

    /// Remove `identity` from every project, dropping sets that become empty.
    ///
    /// # Returns
    ///
    /// Number of projects the identity was removed from
    pub async fn unsubscribe_all(&self, identity: &Identity) -> usize {
        let mut projects = self.projects.lock().await;
        let mut removed = 0;
        projects.retain(|_, identities| {
            if identities.remove(identity) {
                removed += 1;
            }
            !identities.is_empty()
        });
        removed
    }

    /// Snapshot of the identities subscribed to `project_id`.
    pub async fn subscribers(&self, project_id: &ProjectId) -> Vec<Identity> {
        let projects = self.projects.lock().await;
        projects
            .get(project_id)
            .map(|identities| identities.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Projects `identity` is subscribed to.
    pub async fn projects_of(&self, identity: &Identity) -> Vec<ProjectId> {
        let projects = self.projects.lock().await;
        projects
            .iter()
            .filter(|(_, identities)| identities.contains(identity))
            .map(|(project_id, _)| project_id.clone())
            .collect()
    }

    /// Number of projects with at least one subscriber.
    pub async fn project_count(&self) -> usize {
        let projects = self.projects.lock().await;
        projects.len()
    }
}
