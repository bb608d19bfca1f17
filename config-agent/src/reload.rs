//! Reload of the running collector so it picks up the updated configuration.
use serde::Deserialize;
use std::fmt::{Display, Formatter};
use thiserror::Error;

pub mod k8s;

pub const DEFAULT_NAMESPACE: &str = "monitoring";
pub const DEFAULT_LABEL_SELECTOR: &str = "app.kubernetes.io/name=opentelemetrycollector";
const DEFAULT_TARGET_CONTAINER: &str = "opentelemetrycollector";
const DEFAULT_DEBUG_IMAGE: &str = "busybox";
const DEFAULT_SIGNAL: &str = "HUP";
const DEFAULT_KUBECTL_PATH: &str = "kubectl";

#[derive(Error, Debug)]
pub enum ReloadError {
    #[error("OpenTelemetry pod not found")]
    TargetNotFound,

    #[error("failed to signal the collector: {0}")]
    SignalFailed(String),

    #[error("reload unavailable: {0}")]
    Unavailable(String),
}

/// Where the collector to reload runs.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetSelector {
    pub namespace: String,
    pub label_selector: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TargetHandle {
    pub namespace: String,
    pub pod_name: String,
}

/// Confirmation of a delivered reload signal.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalSent {
    pub pod_name: String,
    pub signal: String,
}

impl Display for SignalSent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Signal {} sent to pod '{}'.", self.signal, self.pod_name)
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait ReloadSignal {
    fn find_target(&self, selector: &TargetSelector) -> Result<TargetHandle, ReloadError>;

    fn signal(&self, target: &TargetHandle) -> Result<SignalSent, ReloadError>;
}

/// Finds the collector matching `selector` and signals it.
pub fn reload_collector<R>(
    reloader: &R,
    selector: &TargetSelector,
) -> Result<SignalSent, ReloadError>
where
    R: ReloadSignal + ?Sized,
{
    let target = reloader.find_target(selector)?;
    reloader.signal(&target)
}

/// Used when the agent runs without access to a cluster: every reload fails as unavailable.
#[derive(Debug, Default)]
pub struct DisabledReloadSignal;

impl ReloadSignal for DisabledReloadSignal {
    fn find_target(&self, _selector: &TargetSelector) -> Result<TargetHandle, ReloadError> {
        Err(ReloadError::Unavailable(
            "no Kubernetes client, the agent runs in debug mode".to_string(),
        ))
    }

    fn signal(&self, target: &TargetHandle) -> Result<SignalSent, ReloadError> {
        Err(ReloadError::Unavailable(format!(
            "cannot signal pod {} without a Kubernetes client",
            target.pod_name
        )))
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ReloadConfig {
    pub namespace: String,
    pub label_selector: String,
    /// Container of the collector pod whose process namespace the debug container joins.
    pub target_container: String,
    pub debug_image: String,
    /// Signal name without the `SIG` prefix.
    pub signal: String,
    pub kubectl_path: String,
}

impl Default for ReloadConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            label_selector: DEFAULT_LABEL_SELECTOR.to_string(),
            target_container: DEFAULT_TARGET_CONTAINER.to_string(),
            debug_image: DEFAULT_DEBUG_IMAGE.to_string(),
            signal: DEFAULT_SIGNAL.to_string(),
            kubectl_path: DEFAULT_KUBECTL_PATH.to_string(),
        }
    }
}

impl ReloadConfig {
    /// Selector built from the configured defaults, overridden by the given values.
    pub fn selector(
        &self,
        namespace: Option<String>,
        label_selector: Option<String>,
    ) -> TargetSelector {
        TargetSelector {
            namespace: namespace.unwrap_or_else(|| self.namespace.clone()),
            label_selector: label_selector.unwrap_or_else(|| self.label_selector.clone()),
        }
    }
}
