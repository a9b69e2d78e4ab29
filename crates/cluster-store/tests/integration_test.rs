//! Integration tests for the Kubernetes-backed store
//!
//! These tests require a reachable cluster (current kubeconfig context) with
//! the MyCustomResource CRD installed. Run with `cargo test -- --ignored`.

use cluster_store::{ClusterStore, KubeClusterStore, ResourceKey};

async fn store() -> KubeClusterStore {
    let client = kube::Client::try_default()
        .await
        .expect("Failed to create Kubernetes client");
    KubeClusterStore::new(client, None)
}

#[tokio::test]
#[ignore] // Requires running cluster
async fn test_list_pods() {
    let store = store().await;

    let pods = store.list_pods().await.expect("Failed to list pods");

    println!("Found {} pods", pods.len());
    assert!(pods.iter().all(|pod| !pod.name.is_empty()));
}

#[tokio::test]
#[ignore] // Requires running cluster with the CRD installed
async fn test_list_primaries() {
    let store = store().await;

    let primaries = store
        .list_primaries()
        .await
        .expect("Failed to list MyCustomResources");

    println!("Found {} MyCustomResources", primaries.len());
}

#[tokio::test]
#[ignore] // Requires running cluster with the CRD installed
async fn test_get_missing_primary_is_not_found() {
    let store = store().await;

    let err = store
        .get_primary(&ResourceKey::new("default", "does-not-exist-friend-controller"))
        .await
        .expect_err("Object should not exist");

    assert!(err.is_not_found(), "Unexpected error: {}", err);
}
