//! Main controller implementation.
//!
//! This module contains the `Controller` struct that builds the cluster store,
//! the reconciler and the watcher from configuration.

use crate::config::ControllerConfig;
use crate::error::ControllerError;
use crate::mapper::EventMapper;
use crate::reconciler::Reconciler;
use crate::watcher::{Context, Watcher};
use cluster_store::{ClusterStore, KubeClusterStore};
use kube::Client;
use std::sync::Arc;
use tracing::info;

/// Main controller for MyCustomResource health tracking.
#[derive(Debug)]
pub struct Controller {
    config: ControllerConfig,
    watcher: Watcher,
}

impl Controller {
    /// Creates a new controller instance.
    pub async fn new(config: ControllerConfig) -> Result<Self, ControllerError> {
        info!("Initializing Friend Controller");

        // Create Kubernetes client
        let kube_client = Client::try_default().await?;

        let kube_store = KubeClusterStore::new(kube_client, config.namespace.clone());
        let primary_api = kube_store.primary_api();
        let pod_api = kube_store.pod_api();
        let store: Arc<dyn ClusterStore> = Arc::new(kube_store);

        let reconciler = Reconciler::new(Arc::clone(&store), config.resync_interval);
        let context = Arc::new(Context::new(reconciler, config.backoff, config.reconcile_timeout));
        let watcher = Watcher::new(
            context,
            EventMapper::new(store),
            primary_api,
            pod_api,
            config.worker_count,
        );

        Ok(Self { config, watcher })
    }

    /// Runs the controller until a shutdown signal.
    pub async fn run(self) {
        info!(
            "Friend Controller running with {} concurrent reconciles",
            self.config.worker_count
        );

        self.watcher.run().await;

        info!("Friend Controller stopped");
    }
}
