//! Prints the CustomResourceDefinition manifests as YAML.
//!
//! Usage: `cargo run -p crds --bin crdgen > config/crd.yaml`

use crds::MyCustomResource;
use kube::CustomResourceExt;

fn main() -> anyhow::Result<()> {
    print!("{}", serde_yaml::to_string(&MyCustomResource::crd())?);
    Ok(())
}
