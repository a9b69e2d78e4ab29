//! Controller-specific error types.
//!
//! This module defines error types specific to the friend controller that are
//! not covered by upstream library errors.

use cluster_store::StoreError;
use kube::Error as KubeError;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur in the friend controller.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Kubernetes client error
    #[error("Kubernetes error: {0}")]
    Kube(#[from] KubeError),

    /// Cluster store error (get, list or status write)
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A reconcile pass did not finish in time
    #[error("Reconcile of {key} timed out after {timeout:?}")]
    Timeout {
        /// Work item being reconciled
        key: String,
        /// Configured per-pass limit
        timeout: Duration,
    },
}
