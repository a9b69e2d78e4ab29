//! Mock ClusterStore for unit testing
//!
//! This module provides an in-memory implementation of `ClusterStore` that can
//! be used in unit tests without a running cluster. Failures can be injected
//! per operation to exercise degraded and retry paths.

use crate::error::StoreError;
use crate::key::ResourceKey;
use crate::store_trait::ClusterStore;
use crds::MyCustomResource;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Debug, Default)]
struct MockState {
    primaries: BTreeMap<ResourceKey, MyCustomResource>,
    pods: BTreeSet<ResourceKey>,
    fail_get: bool,
    fail_list_primaries: bool,
    fail_list_pods: bool,
    // Delay before `get_primary` answers
    latency: Duration,
    // Number of upcoming status writes to reject
    conflicting_updates: usize,
    failing_updates: usize,
    status_writes: usize,
    // Calls per operation
    gets: usize,
    primary_lists: usize,
    pod_lists: usize,
}

/// Mock ClusterStore for testing
///
/// Cloning shares the underlying state, so a test can keep a handle while the
/// code under test owns another.
#[derive(Debug, Clone, Default)]
pub struct MockClusterStore {
    state: Arc<Mutex<MockState>>,
}

impl MockClusterStore {
    /// Create an empty mock store
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add or replace a primary resource (for test setup)
    ///
    /// Objects without a resourceVersion are stored at version "1".
    pub fn add_primary(&self, mut obj: MyCustomResource) {
        let Some(key) = ResourceKey::from_resource(&obj) else {
            return;
        };
        if obj.metadata.resource_version.is_none() {
            obj.metadata.resource_version = Some("1".to_string());
        }
        self.state().primaries.insert(key, obj);
    }

    /// Delete a primary resource
    pub fn remove_primary(&self, key: &ResourceKey) {
        self.state().primaries.remove(key);
    }

    /// Current stored copy of a primary resource
    pub fn primary(&self, key: &ResourceKey) -> Option<MyCustomResource> {
        self.state().primaries.get(key).cloned()
    }

    /// Stored `status.Healthy` of a primary resource
    pub fn healthy(&self, key: &ResourceKey) -> Option<bool> {
        self.primary(key).and_then(|obj| obj.healthy())
    }

    /// Add a pod (for test setup)
    pub fn add_pod(&self, namespace: &str, name: &str) {
        self.state().pods.insert(ResourceKey::new(namespace, name));
    }

    /// Delete a pod
    pub fn remove_pod(&self, namespace: &str, name: &str) {
        self.state().pods.remove(&ResourceKey::new(namespace, name));
    }

    /// Make `get_primary` fail with `StoreError::Unavailable`
    pub fn set_fail_get(&self, fail: bool) {
        self.state().fail_get = fail;
    }

    /// Make `list_primaries` fail with `StoreError::Unavailable`
    pub fn set_fail_list_primaries(&self, fail: bool) {
        self.state().fail_list_primaries = fail;
    }

    /// Make `list_pods` fail with `StoreError::Unavailable`
    pub fn set_fail_list_pods(&self, fail: bool) {
        self.state().fail_list_pods = fail;
    }

    /// Delay every `get_primary` call by `latency`
    pub fn set_latency(&self, latency: Duration) {
        self.state().latency = latency;
    }

    /// Reject the next `count` status writes with `StoreError::Conflict`
    pub fn conflict_next_status_updates(&self, count: usize) {
        self.state().conflicting_updates = count;
    }

    /// Reject the next `count` status writes with `StoreError::Unavailable`
    pub fn fail_next_status_updates(&self, count: usize) {
        self.state().failing_updates = count;
    }

    /// Number of accepted status writes
    pub fn status_writes(&self) -> usize {
        self.state().status_writes
    }

    /// Number of `get_primary` calls
    pub fn gets(&self) -> usize {
        self.state().gets
    }

    /// Number of `list_primaries` calls
    pub fn primary_lists(&self) -> usize {
        self.state().primary_lists
    }

    /// Number of `list_pods` calls
    pub fn pod_lists(&self) -> usize {
        self.state().pod_lists
    }
}

fn next_version(current: Option<&str>) -> String {
    let version = current.and_then(|v| v.parse::<u64>().ok()).unwrap_or(0);
    version.saturating_add(1).to_string()
}

#[async_trait::async_trait]
impl ClusterStore for MockClusterStore {
    async fn get_primary(&self, key: &ResourceKey) -> Result<MyCustomResource, StoreError> {
        let latency = self.state().latency;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let mut state = self.state();
        state.gets += 1;
        if state.fail_get {
            return Err(StoreError::Unavailable(format!("get {}", key)));
        }
        state
            .primaries
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    async fn list_primaries(&self) -> Result<Vec<MyCustomResource>, StoreError> {
        let mut state = self.state();
        state.primary_lists += 1;
        if state.fail_list_primaries {
            return Err(StoreError::Unavailable("MyCustomResource list".to_string()));
        }
        Ok(state.primaries.values().cloned().collect())
    }

    async fn list_pods(&self) -> Result<Vec<ResourceKey>, StoreError> {
        let mut state = self.state();
        state.pod_lists += 1;
        if state.fail_list_pods {
            return Err(StoreError::Unavailable("Pod list".to_string()));
        }
        Ok(state.pods.iter().cloned().collect())
    }

    async fn update_status(&self, obj: &MyCustomResource) -> Result<MyCustomResource, StoreError> {
        let key = ResourceKey::from_resource(obj).ok_or_else(|| {
            StoreError::InvalidObject("MyCustomResource missing name".to_string())
        })?;

        let mut state = self.state();
        if state.conflicting_updates > 0 {
            state.conflicting_updates -= 1;
            return Err(StoreError::Conflict(key.to_string()));
        }
        if state.failing_updates > 0 {
            state.failing_updates -= 1;
            return Err(StoreError::Unavailable(format!("status update {}", key)));
        }

        let stored = state
            .primaries
            .get_mut(&key)
            .ok_or_else(|| StoreError::NotFound(key.to_string()))?;
        if let Some(rv) = &obj.metadata.resource_version {
            if stored.metadata.resource_version.as_ref() != Some(rv) {
                return Err(StoreError::Conflict(format!(
                    "{}: resourceVersion {} is stale",
                    key, rv
                )));
            }
        }

        stored.status = obj.status.clone();
        stored.metadata.resource_version =
            Some(next_version(stored.metadata.resource_version.as_deref()));
        let updated = stored.clone();
        state.status_writes += 1;
        Ok(updated)
    }
}
