//! Maps pod events to the MyCustomResources that name them.
//!
//! A pod carries no reference to the resources interested in it, so every pod
//! event lists all MyCustomResources and keeps those whose `spec.name` equals
//! the pod's name. The list is read fresh on every call.

use cluster_store::{ClusterStore, ResourceKey};
use crds::MyCustomResource;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Keys of every primary resource whose friend is named `pod_name`.
///
/// Exact, case-sensitive match on the name only; the pod's namespace plays no
/// part. Resources without a name are skipped.
pub fn requests_for_pod(pod_name: &str, primaries: &[MyCustomResource]) -> Vec<ResourceKey> {
    primaries
        .iter()
        .filter(|primary| primary.friend_name() == pod_name)
        .filter_map(|primary| ResourceKey::from_resource(primary))
        .collect()
}

/// Translates secondary-resource (pod) events into primary resource keys.
#[derive(Clone)]
pub struct EventMapper {
    store: Arc<dyn ClusterStore>,
}

impl fmt::Debug for EventMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventMapper").finish_non_exhaustive()
    }
}

impl EventMapper {
    /// Creates a new mapper reading from `store`.
    pub fn new(store: Arc<dyn ClusterStore>) -> Self {
        Self { store }
    }

    /// Keys of the primary resources whose friend is `pod`.
    ///
    /// A failed list is logged and yields no keys; it never fails the
    /// pod watch that delivered the event.
    pub async fn map_pod(&self, pod: &ResourceKey) -> Vec<ResourceKey> {
        let primaries = match self.store.list_primaries().await {
            Ok(primaries) => primaries,
            Err(e) => {
                error!("Unable to list MyCustomResources while mapping pod {}: {}", pod, e);
                return Vec::new();
            }
        };

        let requests = requests_for_pod(&pod.name, &primaries);
        if requests.is_empty() {
            debug!("Pod {} is nobody's friend", pod);
        } else {
            for request in &requests {
                info!("Pod {} linked to MyCustomResource {} issued an event", pod, request);
            }
        }
        requests
    }

    /// Keys of every primary resource in scope.
    ///
    /// Used after a pod relist, when individual deletions may have been missed.
    pub async fn map_all(&self) -> Vec<ResourceKey> {
        match self.store.list_primaries().await {
            Ok(primaries) => primaries
                .iter()
                .filter_map(|primary| ResourceKey::from_resource(primary))
                .collect(),
            Err(e) => {
                error!("Unable to list MyCustomResources for resync: {}", e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_primary, mock_store};

    #[test]
    fn test_requests_for_pod_matches_name_exactly() {
        let primaries = vec![
            create_test_primary("finder", "ocean", "nemo"),
            create_test_primary("other", "ocean", "Nemo"),
            create_test_primary("third", "ocean", "nemo-2"),
        ];

        let requests = requests_for_pod("nemo", &primaries);
        assert_eq!(requests, vec![ResourceKey::new("ocean", "finder")]);
    }

    #[test]
    fn test_requests_for_pod_empty_when_nothing_matches() {
        let primaries = vec![create_test_primary("finder", "ocean", "nemo")];
        assert!(requests_for_pod("dory", &primaries).is_empty());
        assert!(requests_for_pod("nemo", &[]).is_empty());
    }

    #[test]
    fn test_requests_for_pod_fans_out() {
        let primaries = vec![
            create_test_primary("finder", "ocean", "nemo"),
            create_test_primary("seeker", "reef", "nemo"),
        ];

        let requests = requests_for_pod("nemo", &primaries);
        assert_eq!(requests.len(), 2);
        assert!(requests.contains(&ResourceKey::new("ocean", "finder")));
        assert!(requests.contains(&ResourceKey::new("reef", "seeker")));
    }

    #[tokio::test]
    async fn test_map_pod_ignores_pod_namespace() {
        let store = mock_store();
        store.add_primary(create_test_primary("finder", "ocean", "nemo"));
        let mapper = EventMapper::new(Arc::new(store.clone()));

        let requests = mapper.map_pod(&ResourceKey::new("elsewhere", "nemo")).await;
        assert_eq!(requests, vec![ResourceKey::new("ocean", "finder")]);
    }

    #[tokio::test]
    async fn test_map_pod_reads_fresh_state() {
        let store = mock_store();
        let mapper = EventMapper::new(Arc::new(store.clone()));
        let pod = ResourceKey::new("default", "nemo");

        assert!(mapper.map_pod(&pod).await.is_empty());

        store.add_primary(create_test_primary("finder", "default", "nemo"));
        assert_eq!(mapper.map_pod(&pod).await.len(), 1);
        assert_eq!(store.primary_lists(), 2);
    }

    #[tokio::test]
    async fn test_map_pod_list_failure_yields_nothing() {
        let store = mock_store();
        store.add_primary(create_test_primary("finder", "default", "nemo"));
        store.set_fail_list_primaries(true);
        let mapper = EventMapper::new(Arc::new(store.clone()));

        let requests = mapper.map_pod(&ResourceKey::new("default", "nemo")).await;
        assert!(requests.is_empty());
    }

    #[tokio::test]
    async fn test_map_all_returns_every_primary() {
        let store = mock_store();
        store.add_primary(create_test_primary("finder", "ocean", "nemo"));
        store.add_primary(create_test_primary("seeker", "reef", "dory"));
        let mapper = EventMapper::new(Arc::new(store.clone()));

        let mut requests = mapper.map_all().await;
        requests.sort();
        assert_eq!(
            requests,
            vec![ResourceKey::new("ocean", "finder"), ResourceKey::new("reef", "seeker")]
        );
    }
}
