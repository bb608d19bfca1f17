use crate::agent_config::AgentConfig;
use crate::command::ProcessRunner;
use crate::http_server::server::{run_server, AppState, SharedReloadSignal, SharedStore};
use crate::http_server::HttpServerError;
#[cfg_attr(test, mockall_double::double)]
use crate::k8s::client::SyncK8sClient;
use crate::k8s::configmap_store::ConfigMapStore;
use crate::k8s::Error as K8sError;
use crate::reload::k8s::K8sReloadSignal;
use crate::reload::DisabledReloadSignal;
use crate::service::ConfigurationService;
use crate::store::fallback::FallbackStore;
use crate::store::fixture::FixtureStore;
use std::sync::Arc;
use thiserror::Error;
use tokio::runtime::Runtime;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("could not build the tokio runtime: `{0}`")]
    Runtime(#[from] std::io::Error),

    #[error("could not build the Kubernetes client and no fallback fixture is configured: `{0}`")]
    K8sClient(#[from] K8sError),

    #[error(transparent)]
    HttpServer(#[from] HttpServerError),
}

/// Wires the stores, the reload signal and the HTTP server from the agent config.
pub struct AgentRunner {
    config: AgentConfig,
    runtime: Arc<Runtime>,
}

impl AgentRunner {
    pub fn new(config: AgentConfig) -> Result<Self, AgentError> {
        let runtime = Arc::new(
            tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?,
        );
        Ok(Self { config, runtime })
    }

    /// Runs the agent until the HTTP server stops.
    pub fn run(self) -> Result<(), AgentError> {
        info!("Starting the k8s client");
        let k8s_client =
            SyncK8sClient::try_new(self.runtime.clone(), self.config.k8s.client_timeout);
        let (store, reloader) = collaborators(k8s_client, &self.config)?;

        let state = AppState {
            service: ConfigurationService::new(store, self.config.store.conflict_retries),
            reloader,
            reload: self.config.reload.clone(),
            default_locator: self.config.k8s.default_locator(),
        };
        self.runtime
            .block_on(run_server(self.config.server.clone(), state))?;
        Ok(())
    }
}

/// Picks the store and reload implementations. Without a Kubernetes client the agent only runs in
/// debug mode, serving the fallback fixture.
fn collaborators(
    k8s_client: Result<SyncK8sClient, K8sError>,
    config: &AgentConfig,
) -> Result<(SharedStore, SharedReloadSignal), AgentError> {
    let fixture = config.debug.fallback_fixture.as_ref().map(FixtureStore::new);

    let client = match (k8s_client, fixture.as_ref()) {
        (Ok(client), _) => Arc::new(client),
        (Err(err), Some(fixture)) => {
            warn!(
                error_msg = %err,
                "Kubernetes client unavailable, running in debug mode with the local fixture"
            );
            let store: SharedStore = Arc::new(fixture.clone());
            let reloader: SharedReloadSignal = Arc::new(DisabledReloadSignal);
            return Ok((store, reloader));
        }
        (Err(err), None) => return Err(err.into()),
    };

    let configmap_store = ConfigMapStore::new(client.clone(), config.k8s.configmap_key.clone());
    let store: SharedStore = match fixture {
        Some(fixture) => Arc::new(FallbackStore::new(configmap_store, fixture)),
        None => Arc::new(configmap_store),
    };
    let reloader: SharedReloadSignal = Arc::new(K8sReloadSignal::new(
        client,
        ProcessRunner,
        config.reload.clone(),
    ));
    Ok((store, reloader))
}
