pub use error::K8sError as Error;
pub mod client;
pub mod configmap_store;
pub mod error;
