//! MyCustomResource CRD
//!
//! Declares the name of a "friend" pod and reports whether that pod exists.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// API group served by the CRD
pub const API_GROUP: &str = "tutorial.my.domain";

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[kube(
    group = "tutorial.my.domain",
    version = "v1",
    kind = "MyCustomResource",
    plural = "mycustomresources",
    namespaced,
    status = "MyCustomResourceStatus",
    printcolumn = r#"{"name":"Friend","type":"string","jsonPath":".spec.name"}"#,
    printcolumn = r#"{"name":"Healthy","type":"boolean","jsonPath":".status.Healthy"}"#
)]
pub struct MyCustomResourceSpec {
    /// Name of the friend pod this resource is looking for
    pub name: String,
}

/// Observed state, written only by the controller through the status subresource.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
pub struct MyCustomResourceStatus {
    /// True when a pod named `spec.name` existed at the last reconcile.
    ///
    /// Always serialized, so a merge patch can flip it back to false.
    #[serde(rename = "Healthy", default)]
    pub healthy: bool,
}

impl MyCustomResource {
    /// Name of the pod this resource declares as its friend
    pub fn friend_name(&self) -> &str {
        &self.spec.name
    }

    /// Last observed health, `None` until the first reconcile
    pub fn healthy(&self) -> Option<bool> {
        self.status.as_ref().map(|s| s.healthy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::CustomResourceExt;
    use serde_json::json;

    #[test]
    fn test_status_uses_capitalized_healthy_key() {
        let status = MyCustomResourceStatus { healthy: false };
        let value = serde_json::to_value(&status).unwrap();
        assert_eq!(value, json!({ "Healthy": false }));
    }

    #[test]
    fn test_status_absent_until_first_reconcile() {
        let obj: MyCustomResource = serde_json::from_value(json!({
            "apiVersion": "tutorial.my.domain/v1",
            "kind": "MyCustomResource",
            "metadata": { "name": "finder", "namespace": "ocean" },
            "spec": { "name": "nemo" }
        }))
        .unwrap();

        assert_eq!(obj.friend_name(), "nemo");
        assert_eq!(obj.healthy(), None);
    }

    #[test]
    fn test_missing_healthy_defaults_to_false() {
        let status: MyCustomResourceStatus = serde_json::from_value(json!({})).unwrap();
        assert!(!status.healthy);
    }

    #[test]
    fn test_crd_has_status_subresource() {
        let crd = MyCustomResource::crd();
        assert_eq!(crd.spec.group, API_GROUP);
        assert_eq!(crd.spec.names.kind, "MyCustomResource");
        let version = crd.spec.versions.first().unwrap();
        assert_eq!(version.name, "v1");
        assert!(version.subresources.as_ref().and_then(|s| s.status.as_ref()).is_some());
    }
}
