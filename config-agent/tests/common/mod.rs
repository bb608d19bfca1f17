use actix_web::web;
use otel_config_agent::http_server::server::{AppState, SharedReloadSignal, SharedStore};
use otel_config_agent::reload::{DisabledReloadSignal, ReloadConfig};
use otel_config_agent::service::ConfigurationService;
use otel_config_agent::store::fixture::FixtureStore;
use otel_config_agent::store::DocumentLocator;
use std::path::PathBuf;
use std::sync::Arc;

/// Collector config shipped with the agent for debug mode.
pub fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/collector.yaml")
}

/// State of an agent running in debug mode: documents come from the fixture and are never saved.
pub fn debug_mode_state() -> web::Data<AppState> {
    let store: SharedStore = Arc::new(FixtureStore::new(fixture_path()));
    let reloader: SharedReloadSignal = Arc::new(DisabledReloadSignal);
    web::Data::new(AppState {
        service: ConfigurationService::new(store, 3),
        reloader,
        reload: ReloadConfig::default(),
        default_locator: DocumentLocator {
            namespace: "monitoring".to_string(),
            name: "collector-config".to_string(),
        },
    })
}
