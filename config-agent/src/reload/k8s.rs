use super::{ReloadConfig, ReloadError, ReloadSignal, SignalSent, TargetHandle, TargetSelector};
use crate::command::{CommandError, CommandRunner};
#[cfg_attr(test, mockall_double::double)]
use crate::k8s::client::SyncK8sClient;
use crate::k8s::Error as K8sError;
use std::sync::Arc;
use tracing::{debug, info};

/// Reloads a collector running in Kubernetes by attaching an ephemeral debug container to its
/// pod and sending a signal to the collector process (PID 1 of the target container).
pub struct K8sReloadSignal<C> {
    k8s_client: Arc<SyncK8sClient>,
    runner: C,
    config: ReloadConfig,
}

impl<C> K8sReloadSignal<C>
where
    C: CommandRunner,
{
    pub fn new(k8s_client: Arc<SyncK8sClient>, runner: C, config: ReloadConfig) -> Self {
        Self {
            k8s_client,
            runner,
            config,
        }
    }

    fn debug_args(&self, target: &TargetHandle) -> Vec<String> {
        vec![
            "debug".to_string(),
            target.pod_name.clone(),
            "-n".to_string(),
            target.namespace.clone(),
            format!("--image={}", self.config.debug_image),
            format!("--target={}", self.config.target_container),
            "--".to_string(),
            "/bin/sh".to_string(),
            "-c".to_string(),
            format!("kill -{} 1", self.config.signal),
        ]
    }
}

impl<C> ReloadSignal for K8sReloadSignal<C>
where
    C: CommandRunner,
{
    fn find_target(&self, selector: &TargetSelector) -> Result<TargetHandle, ReloadError> {
        let pods = self
            .k8s_client
            .list_pod_names(&selector.namespace, &selector.label_selector)?;
        // several replicas share the configmap, the first one is signaled
        let pod_name = pods.into_iter().next().ok_or(ReloadError::TargetNotFound)?;
        debug!(%pod_name, namespace = %selector.namespace, "collector pod found");
        Ok(TargetHandle {
            namespace: selector.namespace.clone(),
            pod_name,
        })
    }

    fn signal(&self, target: &TargetHandle) -> Result<SignalSent, ReloadError> {
        self.runner
            .run(&self.config.kubectl_path, &self.debug_args(target))?;
        info!(
            pod_name = %target.pod_name,
            signal = %self.config.signal,
            "reload signal sent to the collector"
        );
        Ok(SignalSent {
            pod_name: target.pod_name.clone(),
            signal: self.config.signal.clone(),
        })
    }
}

impl From<K8sError> for ReloadError {
    fn from(err: K8sError) -> Self {
        match err {
            err @ K8sError::Rejected { .. } => ReloadError::SignalFailed(err.to_string()),
            err => ReloadError::Unavailable(err.to_string()),
        }
    }
}

impl From<CommandError> for ReloadError {
    fn from(err: CommandError) -> Self {
        ReloadError::SignalFailed(err.to_string())
    }
}
