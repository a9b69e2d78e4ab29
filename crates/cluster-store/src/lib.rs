//! Cluster State Store
//!
//! The object repository consumed by the friend controller: get-by-key and
//! list for `MyCustomResource`, metadata-only list for pods, and a
//! status-only update channel.
//!
//! # Example
//!
//! ```no_run
//! use cluster_store::{ClusterStore, KubeClusterStore, ResourceKey};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = kube::Client::try_default().await?;
//! let store = KubeClusterStore::new(client, None);
//!
//! let key = ResourceKey::new("default", "finder");
//! let mut primary = store.get_primary(&key).await?;
//! let pods = store.list_pods().await?;
//!
//! primary.status = Some(crds::MyCustomResourceStatus {
//!     healthy: pods.iter().any(|pod| pod.name == primary.spec.name),
//! });
//! store.update_status(&primary).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod key;
#[path = "trait.rs"]
pub mod store_trait;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;

pub use client::KubeClusterStore;
pub use error::StoreError;
pub use key::ResourceKey;
pub use store_trait::ClusterStore;
#[cfg(any(test, feature = "test-util"))]
pub use mock::MockClusterStore;
