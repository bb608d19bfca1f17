//! Configuration of the agent, read from a YAML file and `OTEL_AGENT_` environment variables.
use crate::http_server::config::ServerConfig;
use crate::k8s::client::ClientTimeout;
use crate::logging::LoggingConfig;
use crate::reload::{ReloadConfig, DEFAULT_NAMESPACE};
use crate::store::{DocumentLocator, StoreConfig};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

const ENV_PREFIX: &str = "OTEL_AGENT";
const DEFAULT_CONFIGMAP_NAME: &str = "collector-config";
const DEFAULT_CONFIGMAP_KEY: &str = "collector.yaml";

#[derive(Error, Debug)]
pub enum AgentConfigError {
    #[error("error loading the agent config: `{0}`")]
    Load(#[from] config::ConfigError),
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct AgentConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub log: LoggingConfig,

    #[serde(default)]
    pub k8s: K8sConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub reload: ReloadConfig,

    #[serde(default)]
    pub debug: DebugConfig,
}

/// ConfigMap holding the collector configuration, used when a request does not name one.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct K8sConfig {
    pub namespace: String,
    pub configmap_name: String,
    /// Data key of the ConfigMap with the collector YAML.
    pub configmap_key: String,
    pub client_timeout: ClientTimeout,
}

impl Default for K8sConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            configmap_name: DEFAULT_CONFIGMAP_NAME.to_string(),
            configmap_key: DEFAULT_CONFIGMAP_KEY.to_string(),
            client_timeout: ClientTimeout::default(),
        }
    }
}

impl K8sConfig {
    pub fn default_locator(&self) -> DocumentLocator {
        DocumentLocator {
            namespace: self.namespace.clone(),
            name: self.configmap_name.clone(),
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct DebugConfig {
    /// Collector config served when the cluster cannot be reached. Without it the agent requires a
    /// working Kubernetes client to start.
    #[serde(default)]
    pub fallback_fixture: Option<PathBuf>,
}

pub struct AgentConfigLoader {
    config_path: PathBuf,
    config_builder: ConfigBuilder<DefaultState>,
}

impl AgentConfigLoader {
    pub fn new(file_path: &Path) -> Self {
        let config_builder = Config::builder()
            // The file is optional so the whole config can be passed through env vars.
            .add_source(File::new(&file_path.to_string_lossy(), FileFormat::Yaml).required(false))
            // `OTEL_AGENT_K8S__NAMESPACE=otel` sets the `k8s.namespace` key. The separator is a
            // double underscore because the keys are already snake_case.
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            );

        Self {
            config_path: file_path.to_path_buf(),
            config_builder,
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn load(&self) -> Result<AgentConfig, AgentConfigError> {
        Ok(self
            .config_builder
            .build_cloned()?
            .try_deserialize::<AgentConfig>()?)
    }
}
