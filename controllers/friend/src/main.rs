//! Friend Controller
//!
//! Keeps `MyCustomResource.status.Healthy` in line with the cluster: a
//! resource is healthy while a pod named by its `spec.name` exists.
//!
//! The controller watches MyCustomResources and pods, maps pod events back to
//! the resources that name them, and re-derives the status of each affected
//! resource from scratch.

mod backoff;
mod config;
mod controller;
mod error;
mod mapper;
mod reconciler;
mod test_utils;
mod watcher;

use crate::config::ControllerConfig;
use crate::error::ControllerError;
use controller::Controller;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ControllerError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting Friend Controller");

    // kube is built with rustls; pick the ring provider before any client exists
    if rustls::crypto::ring::default_provider().install_default().is_err() {
        warn!("A rustls crypto provider was already installed");
    }

    // Load configuration from environment variables
    let config = ControllerConfig::from_env()?;

    info!("Configuration:");
    info!("  Namespace: {}", config.namespace.as_deref().unwrap_or("all namespaces"));
    info!("  Concurrent reconciles: {}", config.worker_count);
    info!("  Backoff: {:?}", config.backoff);
    info!("  Reconcile timeout: {:?}", config.reconcile_timeout);
    match config.resync_interval {
        Some(interval) => info!("  Resync interval: {:?}", interval),
        None => info!("  Resync interval: disabled"),
    }

    // Initialize and run controller
    let controller = Controller::new(config).await?;
    controller.run().await;

    Ok(())
}
