//! Kubernetes resource watchers.
//!
//! MyCustomResources drive a `kube_runtime::Controller`, which owns the
//! reconcile queue, per-object deduplication and requeue scheduling. Pod
//! events are mapped to the resources that name them and fed into the same
//! controller through `reconcile_on`.

use crate::backoff::FibonacciBackoff;
use crate::error::ControllerError;
use crate::mapper::EventMapper;
use crate::reconciler::Reconciler;
use cluster_store::ResourceKey;
use crds::MyCustomResource;
use futures::{Stream, StreamExt, stream};
use k8s_openapi::api::core::v1::Pod;
use kube::{Api, Resource};
use kube_runtime::controller::{self, Action, Config as ControllerConfig};
use kube_runtime::reflector::ObjectRef;
use kube_runtime::{Controller, WatchStreamExt, metadata_watcher, watcher};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Shared state handed to every reconcile and error-policy call.
#[derive(Debug)]
pub struct Context {
    reconciler: Reconciler,
    backoff: FibonacciBackoff,
    reconcile_timeout: Duration,
    // Consecutive failed passes per object, cleared on success
    failures: Mutex<HashMap<ResourceKey, u32>>,
}

impl Context {
    /// Creates a new context instance.
    pub fn new(reconciler: Reconciler, backoff: FibonacciBackoff, reconcile_timeout: Duration) -> Self {
        Self {
            reconciler,
            backoff,
            reconcile_timeout,
            failures: Mutex::new(HashMap::new()),
        }
    }

    fn failure_counts(&self) -> MutexGuard<'_, HashMap<ResourceKey, u32>> {
        self.failures.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Consecutive failed passes recorded for `key`.
    pub fn failures(&self, key: &ResourceKey) -> u32 {
        self.failure_counts().get(key).copied().unwrap_or(0)
    }

    fn record_failure(&self, key: &ResourceKey) -> u32 {
        let mut counts = self.failure_counts();
        let count = counts.entry(key.clone()).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    fn forget(&self, key: &ResourceKey) -> u32 {
        self.failure_counts().remove(key).unwrap_or(0)
    }
}

fn object_ref(key: &ResourceKey) -> ObjectRef<MyCustomResource> {
    ObjectRef::new(&key.name).within(&key.namespace)
}

/// Runs one reconcile pass for `obj`, bounded by the configured timeout.
///
/// The object's state is re-read from the store; the cached copy only
/// supplies its identity.
pub async fn reconcile(obj: Arc<MyCustomResource>, ctx: Arc<Context>) -> Result<Action, ControllerError> {
    let Some(key) = ResourceKey::from_resource(obj.as_ref()) else {
        warn!("Ignoring MyCustomResource without a name");
        return Ok(Action::await_change());
    };

    let action = match tokio::time::timeout(ctx.reconcile_timeout, ctx.reconciler.reconcile(&key)).await {
        Ok(result) => result?,
        Err(_elapsed) => {
            return Err(ControllerError::Timeout {
                key: key.to_string(),
                timeout: ctx.reconcile_timeout,
            });
        }
    };

    let failures = ctx.forget(&key);
    if failures > 0 {
        info!("{} reconciled after {} failed attempts", key, failures);
    }
    Ok(action)
}

/// Requeues a failed object with Fibonacci backoff on its failure count.
pub fn error_policy(obj: Arc<MyCustomResource>, error: &ControllerError, ctx: Arc<Context>) -> Action {
    let (name, failures) = match ResourceKey::from_resource(obj.as_ref()) {
        Some(key) => {
            let failures = ctx.record_failure(&key);
            (key.to_string(), failures)
        }
        None => ("<unnamed>".to_string(), 1),
    };
    let delay = ctx.backoff.delay_for(failures);
    error!(
        "Reconciliation of {} failed (attempt {}), retrying in {:?}: {}",
        name, failures, delay, error
    );
    Action::requeue(delay)
}

/// Maps a pod watch event to the MyCustomResources that must be reconciled.
///
/// Pods seen during an initial list are not mapped one by one; once the list
/// is complete every primary resource is returned instead, which also covers
/// pods deleted while the watch was down.
pub async fn pod_event_requests<K: Resource>(
    mapper: &EventMapper,
    event: watcher::Event<K>,
) -> Vec<ObjectRef<MyCustomResource>> {
    let keys = match event {
        watcher::Event::Apply(pod) | watcher::Event::Delete(pod) => {
            let Some(key) = ResourceKey::from_resource(&pod) else {
                return Vec::new();
            };
            debug!("Pod event: {}", key);
            mapper.map_pod(&key).await
        }
        watcher::Event::InitApply(_) => Vec::new(),
        watcher::Event::Init => {
            debug!("Pod watcher initialized");
            Vec::new()
        }
        watcher::Event::InitDone => {
            info!("Pod watcher initialization complete, resyncing all MyCustomResources");
            mapper.map_all().await
        }
    };
    keys.iter().map(object_ref).collect()
}

/// Cluster-wide, metadata-only pod watch mapped to MyCustomResource triggers.
///
/// Watch errors are logged and the stream reconnects with the default backoff.
pub fn pod_triggers(
    pod_api: Api<Pod>,
    mapper: EventMapper,
) -> impl Stream<Item = ObjectRef<MyCustomResource>> + Send + 'static {
    metadata_watcher(pod_api, watcher::Config::default())
        .default_backoff()
        .filter_map(|result| async move {
            match result {
                Ok(event) => Some(event),
                Err(e) => {
                    warn!("Pod watch error: {}", e);
                    None
                }
            }
        })
        .then(move |event| {
            let mapper = mapper.clone();
            async move { pod_event_requests(&mapper, event).await }
        })
        .flat_map(stream::iter)
}

/// Watches Kubernetes resources for changes.
pub struct Watcher {
    context: Arc<Context>,
    mapper: EventMapper,
    primary_api: Api<MyCustomResource>,
    pod_api: Api<Pod>,
    concurrency: u16,
}

impl std::fmt::Debug for Watcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Watcher")
            .field("concurrency", &self.concurrency)
            .finish_non_exhaustive()
    }
}

impl Watcher {
    /// Creates a new watcher instance.
    pub fn new(
        context: Arc<Context>,
        mapper: EventMapper,
        primary_api: Api<MyCustomResource>,
        pod_api: Api<Pod>,
        concurrency: u16,
    ) -> Self {
        Self {
            context,
            mapper,
            primary_api,
            pod_api,
            concurrency,
        }
    }

    /// Runs the controller until SIGINT or SIGTERM.
    ///
    /// Reconciles already running when the signal arrives are allowed to
    /// finish.
    pub async fn run(self) {
        info!("Starting MyCustomResource controller");

        let controller_config = ControllerConfig::default().concurrency(self.concurrency);

        Controller::new(self.primary_api, watcher::Config::default())
            .with_config(controller_config)
            .reconcile_on(pod_triggers(self.pod_api, self.mapper))
            .shutdown_on_signal()
            .run(reconcile, error_policy, self.context)
            .for_each(|res| async move {
                match res {
                    Ok((obj, action)) => debug!("Reconciled {}: {:?}", obj, action),
                    // Already logged by the error policy
                    Err(controller::Error::ReconcilerFailed(e, obj)) => {
                        debug!("Reconcile of {} failed: {}", obj, e);
                    }
                    Err(e) => warn!("Controller error: {}", e),
                }
            })
            .await;

        info!("MyCustomResource controller stopped");
    }
}
