//! Friend Controller CRD Definitions
//!
//! Kubernetes Custom Resource Definitions watched by the friend controller.

pub mod my_custom_resource;

pub use my_custom_resource::*;
