//! Kubernetes-backed cluster store

use crate::error::StoreError;
use crate::key::ResourceKey;
use crate::store_trait::ClusterStore;
use crds::MyCustomResource;
use k8s_openapi::api::core::v1::Pod;
use kube::api::{ListParams, Patch, PatchParams};
use kube::{Api, Client};
use serde_json::json;
use std::fmt;
use tracing::debug;

/// `ClusterStore` backed by the Kubernetes API server.
///
/// Primary resources are scoped to `namespace` when one is given, otherwise to
/// the whole cluster. Pods are always listed cluster-wide.
#[derive(Clone)]
pub struct KubeClusterStore {
    client: Client,
    namespace: Option<String>,
}

impl KubeClusterStore {
    /// Create a store over `client`, optionally restricted to one namespace
    pub fn new(client: Client, namespace: Option<String>) -> Self {
        Self { client, namespace }
    }

    /// Api over every primary resource in scope
    pub fn primary_api(&self) -> Api<MyCustomResource> {
        match &self.namespace {
            Some(ns) => Api::namespaced(self.client.clone(), ns),
            None => Api::all(self.client.clone()),
        }
    }

    /// Cluster-wide pod Api
    pub fn pod_api(&self) -> Api<Pod> {
        Api::all(self.client.clone())
    }

    fn primaries_in(&self, namespace: &str) -> Api<MyCustomResource> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

impl fmt::Debug for KubeClusterStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KubeClusterStore")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl ClusterStore for KubeClusterStore {
    async fn get_primary(&self, key: &ResourceKey) -> Result<MyCustomResource, StoreError> {
        self.primaries_in(&key.namespace)
            .get_opt(&key.name)
            .await
            .map_err(|e| StoreError::from_kube(e, &key.to_string()))?
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    async fn list_primaries(&self) -> Result<Vec<MyCustomResource>, StoreError> {
        let list = self
            .primary_api()
            .list(&ListParams::default())
            .await
            .map_err(|e| StoreError::from_kube(e, "MyCustomResource list"))?;
        debug!("Listed {} MyCustomResources", list.items.len());
        Ok(list.items)
    }

    async fn list_pods(&self) -> Result<Vec<ResourceKey>, StoreError> {
        let list = self
            .pod_api()
            .list_metadata(&ListParams::default())
            .await
            .map_err(|e| StoreError::from_kube(e, "Pod list"))?;
        debug!("Listed {} pods", list.items.len());
        Ok(list
            .items
            .iter()
            .filter_map(|pod| ResourceKey::from_resource(pod))
            .collect())
    }

    async fn update_status(&self, obj: &MyCustomResource) -> Result<MyCustomResource, StoreError> {
        let key = ResourceKey::from_resource(obj).ok_or_else(|| {
            StoreError::InvalidObject("MyCustomResource missing name".to_string())
        })?;

        let mut status_patch = json!({
            "status": obj.status.clone().unwrap_or_default()
        });
        // A resourceVersion in the patch makes the API server reject stale writes with 409
        if let Some(rv) = &obj.metadata.resource_version {
            status_patch["metadata"] = json!({ "resourceVersion": rv });
        }

        let pp = PatchParams::default();
        self.primaries_in(&key.namespace)
            .patch_status(&key.name, &pp, &Patch::Merge(&status_patch))
            .await
            .map_err(|e| StoreError::from_kube(e, &key.to_string()))
    }
}
