//! Test utilities for unit testing the reconciler, mapper and retry policy
//!
//! This module provides helpers for creating test data and setting up test scenarios.

#[cfg(test)]
use cluster_store::MockClusterStore;
#[cfg(test)]
use crds::{MyCustomResource, MyCustomResourceSpec};
#[cfg(test)]
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

/// Helper to create a test MyCustomResource looking for `friend`
#[cfg(test)]
pub fn create_test_primary(name: &str, namespace: &str, friend: &str) -> MyCustomResource {
    MyCustomResource {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        spec: MyCustomResourceSpec {
            name: friend.to_string(),
        },
        status: None,
    }
}

/// Helper to create an empty mock store
#[cfg(test)]
pub fn mock_store() -> MockClusterStore {
    MockClusterStore::new()
}
