//! Reconciliation logic for MyCustomResource.
//!
//! Each pass re-derives `status.Healthy` from scratch: the resource is healthy
//! exactly when a pod named `spec.name` exists anywhere in the cluster.

use crate::error::ControllerError;
use cluster_store::{ClusterStore, ResourceKey, StoreError};
use crds::MyCustomResourceStatus;
use kube_runtime::controller::Action;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// Whether any of `pods` is named `friend_name`.
pub fn friend_present(friend_name: &str, pods: &[ResourceKey]) -> bool {
    pods.iter().any(|pod| pod.name == friend_name)
}

/// Reconciles MyCustomResource status against the current pod set.
#[derive(Clone)]
pub struct Reconciler {
    store: Arc<dyn ClusterStore>,
    resync_interval: Option<Duration>,
}

impl fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reconciler")
            .field("resync_interval", &self.resync_interval)
            .finish_non_exhaustive()
    }
}

impl Reconciler {
    /// Creates a new reconciler instance.
    pub fn new(store: Arc<dyn ClusterStore>, resync_interval: Option<Duration>) -> Self {
        Self {
            store,
            resync_interval,
        }
    }

    /// Reconciles one MyCustomResource.
    ///
    /// This method:
    /// 1. Fetches the resource (a missing resource is a successful no-op)
    /// 2. Lists all pods, degrading to an empty set if the list fails
    /// 3. Writes `status.Healthy` = "a pod named `spec.name` exists"
    ///
    /// The status is written on every pass, changed or not. A failed get
    /// (other than not-found) or a failed write is returned so the item is
    /// retried with backoff.
    pub async fn reconcile(&self, key: &ResourceKey) -> Result<Action, ControllerError> {
        info!("Reconciling MyCustomResource {}", key);

        let mut primary = match self.store.get_primary(key).await {
            Ok(primary) => primary,
            Err(StoreError::NotFound(_)) => {
                debug!("MyCustomResource {} no longer exists, nothing to do", key);
                return Ok(Action::await_change());
            }
            Err(e) => {
                error!("Unable to fetch MyCustomResource {}: {}", key, e);
                return Err(e.into());
            }
        };

        let pods = match self.store.list_pods().await {
            Ok(pods) => pods,
            Err(e) => {
                // Degrades to "friend not found" until the next pass
                error!("Unable to list pods while reconciling {}: {}", key, e);
                Vec::new()
            }
        };

        let friend_found = friend_present(primary.friend_name(), &pods);
        if friend_found {
            info!(
                "Pod {} linked to MyCustomResource {} found",
                primary.friend_name(),
                key
            );
        }

        primary.status = Some(MyCustomResourceStatus {
            healthy: friend_found,
        });
        if let Err(e) = self.store.update_status(&primary).await {
            error!(
                "Unable to update MyCustomResource {} Healthy status to {}: {}",
                key, friend_found, e
            );
            return Err(e.into());
        }
        info!("MyCustomResource {} Healthy status updated to {}", key, friend_found);

        Ok(match self.resync_interval {
            Some(interval) => Action::requeue(interval),
            None => Action::await_change(),
        })
    }
}
