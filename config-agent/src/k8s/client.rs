use super::error::K8sError;
use duration_str::deserialize_duration;
use k8s_openapi::api::core::v1::{ConfigMap, Pod};
use kube::{
    api::{ListParams, PostParams},
    config::KubeConfigOptions,
    Api, Client, Config,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing::debug;

/// Provides a _sync_ implementation of [AsyncK8sClient].
///
/// Each method calls `runtime.block_on(self.async_client.future)` on the shared runtime, which
/// keeps the request pipeline of the agent synchronous while [kube] stays async.
pub struct SyncK8sClient {
    async_client: AsyncK8sClient,
    runtime: Arc<Runtime>,
}

impl Debug for SyncK8sClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncK8sClient")
            .field("async_client", &"AsyncK8sClient implementation")
            .field("runtime", &self.runtime)
            .finish()
    }
}

#[cfg_attr(test, mockall::automock)]
impl SyncK8sClient {
    pub fn try_new(runtime: Arc<Runtime>, client_timeout: ClientTimeout) -> Result<Self, K8sError> {
        Ok(Self {
            async_client: runtime.block_on(AsyncK8sClient::try_new(client_timeout))?,
            runtime,
        })
    }

    pub fn get_configmap_key(
        &self,
        name: &str,
        namespace: &str,
        key: &str,
    ) -> Result<Option<VersionedValue>, K8sError> {
        self.runtime
            .block_on(self.async_client.get_configmap_key(name, namespace, key))
    }

    pub fn replace_configmap_key(
        &self,
        name: &str,
        namespace: &str,
        key: &str,
        value: &str,
        resource_version: &str,
    ) -> Result<(), K8sError> {
        self.runtime.block_on(self.async_client.replace_configmap_key(
            name,
            namespace,
            key,
            value,
            resource_version,
        ))
    }

    pub fn list_pod_names(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> Result<Vec<String>, K8sError> {
        self.runtime
            .block_on(self.async_client.list_pod_names(namespace, label_selector))
    }
}

/// Value of a ConfigMap key together with the `resourceVersion` of the ConfigMap it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionedValue {
    pub value: String,
    pub resource_version: String,
}

/// Same as upstream kube-rs default client timeout (read/write).
const DEFAULT_CLIENT_TIMEOUT: Duration = Duration::from_secs(295);

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct ClientTimeout(#[serde(deserialize_with = "deserialize_duration")] Duration);

impl Default for ClientTimeout {
    fn default() -> Self {
        Self(DEFAULT_CLIENT_TIMEOUT)
    }
}

impl From<ClientTimeout> for Duration {
    fn from(value: ClientTimeout) -> Self {
        value.0
    }
}

pub struct AsyncK8sClient {
    client: Client,
}

impl AsyncK8sClient {
    /// Constructs a new Kubernetes client.
    ///
    /// If loading from the inCluster config fail we fall back to kube-config
    /// This will respect the `$KUBECONFIG` envvar, but otherwise default to `~/.kube/config`.
    pub async fn try_new(client_timeout: ClientTimeout) -> Result<Self, K8sError> {
        debug!("trying inClusterConfig for k8s client");

        let mut config = match Config::incluster() {
            Ok(c) => c,
            Err(e) => {
                debug!("inClusterConfig {}, trying kubeconfig for k8s client", e);
                let c = KubeConfigOptions::default();
                Config::from_kubeconfig(&c).await?
            }
        };
        config.read_timeout = Some(client_timeout.into());
        config.write_timeout = Some(client_timeout.into());

        let client = Client::try_from(config)?;

        debug!("k8s client initialization succeeded");
        Ok(Self { client })
    }

    pub async fn get_configmap_key(
        &self,
        name: &str,
        namespace: &str,
        key: &str,
    ) -> Result<Option<VersionedValue>, K8sError> {
        let cm_client: Api<ConfigMap> =
            Api::<ConfigMap>::namespaced(self.client.clone(), namespace);

        let Some(cm) = cm_client.get_opt(name).await? else {
            debug!("ConfigMap {} not found", name);
            return Ok(None);
        };
        let Some(value) = cm.data.and_then(|mut data| data.remove(key)) else {
            debug!("ConfigMap {} missing key {}", name, key);
            return Ok(None);
        };

        Ok(Some(VersionedValue {
            value,
            resource_version: cm.metadata.resource_version.unwrap_or_default(),
        }))
    }

    /// Writes `value` under `key`, conditioned on the ConfigMap still being at `resource_version`.
    /// The API server rejects the write with a conflict otherwise.
    pub async fn replace_configmap_key(
        &self,
        name: &str,
        namespace: &str,
        key: &str,
        value: &str,
        resource_version: &str,
    ) -> Result<(), K8sError> {
        let cm_client: Api<ConfigMap> =
            Api::<ConfigMap>::namespaced(self.client.clone(), namespace);

        let mut cm = cm_client
            .get_opt(name)
            .await?
            .ok_or_else(|| K8sError::ConfigMapNotFound(name.to_string()))?;

        cm.metadata.resource_version = Some(resource_version.to_string());
        cm.metadata.managed_fields = None;
        cm.data
            .get_or_insert_with(BTreeMap::default)
            .insert(key.to_string(), value.to_string());

        cm_client.replace(name, &PostParams::default(), &cm).await?;
        debug!("ConfigMap {} key {} replaced", name, key);
        Ok(())
    }

    pub async fn list_pod_names(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> Result<Vec<String>, K8sError> {
        let pod_client: Api<Pod> = Api::<Pod>::namespaced(self.client.clone(), namespace);

        let pods = pod_client
            .list(&ListParams::default().labels(label_selector))
            .await?;
        debug!(
            "found {} pods with label {} in namespace {}",
            pods.items.len(),
            label_selector,
            namespace
        );

        Ok(pods
            .items
            .into_iter()
            .filter_map(|pod| pod.metadata.name)
            .collect())
    }
}
