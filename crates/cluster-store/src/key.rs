//! Object identity used as the work queue key.

use kube::{Resource, ResourceExt};
use std::fmt;

/// Namespace used when an object carries none
pub const DEFAULT_NAMESPACE: &str = "default";

/// (namespace, name) identity of a namespaced object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKey {
    /// Object namespace
    pub namespace: String,
    /// Object name
    pub name: String,
}

impl ResourceKey {
    /// Create a key from a namespace and name
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Key of an object, or `None` if it has no name yet.
    ///
    /// A missing namespace falls back to [`DEFAULT_NAMESPACE`].
    pub fn from_resource<K: Resource>(obj: &K) -> Option<Self> {
        let name = obj.meta().name.clone()?;
        let namespace = obj
            .namespace()
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());
        Some(Self { namespace, name })
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crds::{MyCustomResource, MyCustomResourceSpec};
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    fn primary(name: Option<&str>, namespace: Option<&str>) -> MyCustomResource {
        MyCustomResource {
            metadata: ObjectMeta {
                name: name.map(str::to_string),
                namespace: namespace.map(str::to_string),
                ..Default::default()
            },
            spec: MyCustomResourceSpec { name: "nemo".to_string() },
            status: None,
        }
    }

    #[test]
    fn test_key_from_resource() {
        let key = ResourceKey::from_resource(&primary(Some("finder"), Some("ocean"))).unwrap();
        assert_eq!(key, ResourceKey::new("ocean", "finder"));
        assert_eq!(key.to_string(), "ocean/finder");
    }

    #[test]
    fn test_key_defaults_namespace() {
        let key = ResourceKey::from_resource(&primary(Some("finder"), None)).unwrap();
        assert_eq!(key.namespace, DEFAULT_NAMESPACE);
    }

    #[test]
    fn test_key_requires_name() {
        assert!(ResourceKey::from_resource(&primary(None, Some("ocean"))).is_none());
    }
}
