//! Controller configuration loaded from environment variables.

use crate::backoff::FibonacciBackoff;
use crate::error::ControllerError;
use std::time::Duration;

const DEFAULT_WORKER_COUNT: u16 = 3;
const DEFAULT_RECONCILE_TIMEOUT_SECS: u64 = 30;
const DEFAULT_BACKOFF_MIN_SECS: u64 = 1;
const DEFAULT_BACKOFF_MAX_SECS: u64 = 300;

/// Runtime settings for the friend controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Namespace to watch MyCustomResources in (`None` = all namespaces)
    pub namespace: Option<String>,
    /// Maximum number of concurrent reconciles
    pub worker_count: u16,
    /// Upper bound on a single reconcile pass
    pub reconcile_timeout: Duration,
    /// Retry delay for a failed work item
    pub backoff: FibonacciBackoff,
    /// Requeue interval after a successful pass (`None` = only on events)
    pub resync_interval: Option<Duration>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            namespace: None,
            worker_count: DEFAULT_WORKER_COUNT,
            reconcile_timeout: Duration::from_secs(DEFAULT_RECONCILE_TIMEOUT_SECS),
            backoff: FibonacciBackoff::new(
                Duration::from_secs(DEFAULT_BACKOFF_MIN_SECS),
                Duration::from_secs(DEFAULT_BACKOFF_MAX_SECS),
            ),
            resync_interval: None,
        }
    }
}

impl ControllerConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ControllerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    ///
    /// Unset and empty variables take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ControllerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let namespace = var("WATCH_NAMESPACE").map(|ns| ns.trim().to_string());

        let worker_count = match var("WORKER_COUNT") {
            Some(v) => parse_number::<u16>("WORKER_COUNT", &v)?,
            None => DEFAULT_WORKER_COUNT,
        };
        if worker_count == 0 {
            return Err(ControllerError::InvalidConfig(
                "WORKER_COUNT must be at least 1".to_string(),
            ));
        }

        let timeout_secs = match var("RECONCILE_TIMEOUT_SECS") {
            Some(v) => parse_number::<u64>("RECONCILE_TIMEOUT_SECS", &v)?,
            None => DEFAULT_RECONCILE_TIMEOUT_SECS,
        };
        if timeout_secs == 0 {
            return Err(ControllerError::InvalidConfig(
                "RECONCILE_TIMEOUT_SECS must be at least 1".to_string(),
            ));
        }

        let backoff_min = match var("BACKOFF_MIN_SECS") {
            Some(v) => parse_number::<u64>("BACKOFF_MIN_SECS", &v)?,
            None => DEFAULT_BACKOFF_MIN_SECS,
        };
        if backoff_min == 0 {
            return Err(ControllerError::InvalidConfig(
                "BACKOFF_MIN_SECS must be at least 1".to_string(),
            ));
        }
        let backoff_max = match var("BACKOFF_MAX_SECS") {
            Some(v) => parse_number::<u64>("BACKOFF_MAX_SECS", &v)?,
            None => DEFAULT_BACKOFF_MAX_SECS,
        };
        if backoff_max < backoff_min {
            return Err(ControllerError::InvalidConfig(format!(
                "BACKOFF_MAX_SECS ({}) must not be below BACKOFF_MIN_SECS ({})",
                backoff_max, backoff_min
            )));
        }

        let resync_interval = match var("RESYNC_INTERVAL_SECS") {
            Some(v) => match parse_number::<u64>("RESYNC_INTERVAL_SECS", &v)? {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
            None => None,
        };

        Ok(Self {
            namespace,
            worker_count,
            reconcile_timeout: Duration::from_secs(timeout_secs),
            backoff: FibonacciBackoff::new(
                Duration::from_secs(backoff_min),
                Duration::from_secs(backoff_max),
            ),
            resync_interval,
        })
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ControllerError> {
    value.trim().parse::<T>().map_err(|_| {
        ControllerError::InvalidConfig(format!(
            "{} must be a non-negative integer, got {:?}",
            key, value
        ))
    })
}
