use super::config::ServerConfig;
use super::handlers::{
    add_configuration, add_transfer_metrics, delete_transfer_metrics, get_configuration, reload,
    remove_configuration, update_configuration, update_transfer_metrics,
};
use super::{ApiError, HttpServerError};
use crate::reload::{ReloadConfig, ReloadSignal};
use crate::service::ConfigurationService;
use crate::store::{DocumentLocator, DocumentStore};
use actix_web::{web, App, HttpServer};
use std::sync::Arc;
use tracing::info;

pub type SharedStore = Arc<dyn DocumentStore + Send + Sync>;
pub type SharedReloadSignal = Arc<dyn ReloadSignal + Send + Sync>;

/// Shared by every request handler.
pub struct AppState {
    pub service: ConfigurationService<SharedStore>,
    pub reloader: SharedReloadSignal,
    pub reload: ReloadConfig,
    /// ConfigMap edited when the request does not name one.
    pub default_locator: DocumentLocator,
}

impl AppState {
    pub(super) fn locator(
        &self,
        namespace: Option<String>,
        configmap_name: Option<String>,
    ) -> DocumentLocator {
        DocumentLocator {
            namespace: namespace.unwrap_or_else(|| self.default_locator.namespace.clone()),
            name: configmap_name.unwrap_or_else(|| self.default_locator.name.clone()),
        }
    }
}

/// Registers the API routes. Malformed bodies or queries are answered with a 422.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _| ApiError::InvalidRequest(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _| ApiError::InvalidRequest(err.to_string()).into()),
    )
    .service(
        web::resource("/configurations")
            .route(web::post().to(add_configuration))
            .route(web::put().to(update_configuration))
            .route(web::delete().to(remove_configuration))
            .route(web::get().to(get_configuration)),
    )
    .service(
        web::resource("/pipelines/transfermetrics")
            .route(web::post().to(add_transfer_metrics))
            .route(web::put().to(update_transfer_metrics))
            .route(web::delete().to(delete_transfer_metrics)),
    )
    .service(web::resource("/reload").route(web::post().to(reload)));
}

/// Serves the API until the process receives SIGINT or SIGTERM.
pub async fn run_server(
    server_config: ServerConfig,
    state: AppState,
) -> Result<(), HttpServerError> {
    info!(
        "starting HTTP server at http://{}:{}",
        server_config.host, server_config.port
    );

    let state = web::Data::new(state);
    HttpServer::new(move || App::new().app_data(state.clone()).configure(routes))
        .bind((server_config.host.to_string(), server_config.port.into()))
        .map_err(HttpServerError::BindError)?
        .workers(server_config.workers.into())
        .run()
        .await
        .map_err(HttpServerError::ServerError)?;

    info!("HTTP server stopped");
    Ok(())
}
