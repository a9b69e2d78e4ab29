//! Cluster store errors

use thiserror::Error;

/// Errors that can occur when reading from or writing to the cluster
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested object does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The object changed since it was read (resourceVersion mismatch)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The API server is overloaded or temporarily failing (429/5xx)
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The object cannot be written as given (e.g. it has no name)
    #[error("Invalid object: {0}")]
    InvalidObject(String),

    /// Any other Kubernetes API failure
    #[error("Kubernetes error: {0}")]
    Kube(#[source] kube::Error),
}

impl StoreError {
    /// Classifies a kube error, splitting out 404 and 409 responses.
    pub fn from_kube(err: kube::Error, what: &str) -> Self {
        match &err {
            kube::Error::Api(resp) if resp.code == 404 => Self::NotFound(what.to_string()),
            kube::Error::Api(resp) if resp.code == 409 => {
                Self::Conflict(format!("{}: {}", what, resp.message))
            }
            kube::Error::Api(resp) if resp.code == 429 || resp.code >= 500 => {
                Self::Unavailable(format!("{}: {}", what, resp.message))
            }
            _ => Self::Kube(err),
        }
    }

    /// Whether this error means the object is gone.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Whether this error is an optimistic-concurrency conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}
