//! ClusterStore trait for mocking
//!
//! This trait abstracts the Kubernetes API calls made by the controller so the
//! reconciler and event mapper can be tested against an in-memory store.

use crate::error::StoreError;
use crate::key::ResourceKey;
use crds::MyCustomResource;

/// Object store operations consumed by the controller.
///
/// All async methods must be `Send` to work with Tokio's work-stealing runtime.
#[async_trait::async_trait]
pub trait ClusterStore: Send + Sync {
    /// Fetch one primary resource; `StoreError::NotFound` when it does not exist.
    async fn get_primary(&self, key: &ResourceKey) -> Result<MyCustomResource, StoreError>;

    /// List every primary resource in scope.
    async fn list_primaries(&self) -> Result<Vec<MyCustomResource>, StoreError>;

    /// List the identity of every pod in the cluster.
    async fn list_pods(&self) -> Result<Vec<ResourceKey>, StoreError>;

    /// Write the status of `obj` through the status subresource.
    ///
    /// The write is conditional on `obj`'s resourceVersion when it has one;
    /// a stale version fails with `StoreError::Conflict`.
    async fn update_status(&self, obj: &MyCustomResource) -> Result<MyCustomResource, StoreError>;
}
