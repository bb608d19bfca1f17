use super::models::{
    ConfigurationQuery, ConfigurationRequest, ConfigurationResponse, MessageResponse,
    PipelinesResponse, ReloadRequest, TransferMetricsRequest, TransferMetricsSelector,
    UpdateTransferMetricsRequest,
};
use super::server::AppState;
use super::ApiError;
use crate::collector_config::transfer_metrics::TransferMetricsPipeline;
use crate::reload::reload_collector;
use crate::service::MutationOutcome;
use actix_web::web::{self, Data, Json, Query};
use actix_web::HttpResponse;
use tracing::info;

const CREATED_MESSAGE: &str = "Pipeline created and ConfigMap successfully updated.";
const DELETED_MESSAGE: &str = "Pipeline deleted and ConfigMap successfully updated.";
const TRANSFER_METRICS_DELETED_MESSAGE: &str = "Pipeline successfully deleted from ConfigMap";

fn mutation_response(message: impl Into<String>, outcome: MutationOutcome) -> HttpResponse {
    let mut body = MessageResponse::new(message);
    if !outcome.persisted {
        body.configuration = Some(outcome.document);
    }
    HttpResponse::Ok().json(body)
}

pub(super) async fn add_configuration(
    state: Data<AppState>,
    request: Json<ConfigurationRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = request.into_inner();
    let outcome = web::block(move || {
        let locator = state.locator(request.namespace, request.configmap_name);
        info!(%locator, "adding collector components");
        state.service.add(&locator, &request.patch)
    })
    .await??;
    Ok(mutation_response(CREATED_MESSAGE, outcome))
}

pub(super) async fn update_configuration(
    state: Data<AppState>,
    request: Json<ConfigurationRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = request.into_inner();
    let outcome = web::block(move || {
        let locator = state.locator(request.namespace, request.configmap_name);
        info!(%locator, "merging collector configuration");
        state.service.update(&locator, &request.patch)
    })
    .await??;
    Ok(mutation_response(CREATED_MESSAGE, outcome))
}

pub(super) async fn remove_configuration(
    state: Data<AppState>,
    request: Json<ConfigurationRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = request.into_inner();
    let outcome = web::block(move || {
        let locator = state.locator(request.namespace, request.configmap_name);
        info!(%locator, "removing collector configuration");
        state.service.remove(&locator, &request.patch)
    })
    .await??;
    Ok(mutation_response(DELETED_MESSAGE, outcome))
}

pub(super) async fn get_configuration(
    state: Data<AppState>,
    query: Query<ConfigurationQuery>,
) -> Result<HttpResponse, ApiError> {
    let ConfigurationQuery {
        full,
        namespace,
        configmap_name,
    } = query.into_inner();
    let locator = state.locator(namespace, configmap_name);
    if full {
        let configuration = web::block(move || state.service.document(&locator)).await??;
        Ok(HttpResponse::Ok().json(ConfigurationResponse { configuration }))
    } else {
        let pipelines = web::block(move || state.service.pipeline_names(&locator)).await??;
        Ok(HttpResponse::Ok().json(PipelinesResponse { pipelines }))
    }
}

pub(super) async fn add_transfer_metrics(
    state: Data<AppState>,
    request: Json<TransferMetricsRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = request.into_inner();
    let outcome = web::block(move || {
        let locator = state.locator(request.namespace, request.configmap_name);
        let pipeline = TransferMetricsPipeline::new(request.domain_id, request.flavor_id);
        info!(
            %locator,
            pipeline = %pipeline.pipeline_name(),
            "adding transfer metrics pipeline"
        );
        state
            .service
            .add_transfer_metrics(&locator, &pipeline, &request.prometheus_exporter)
    })
    .await??;
    Ok(mutation_response(CREATED_MESSAGE, outcome))
}

pub(super) async fn update_transfer_metrics(
    state: Data<AppState>,
    request: Json<UpdateTransferMetricsRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = request.into_inner();
    let pipeline = TransferMetricsPipeline::new(request.domain_id, request.flavor_id);
    let message = format!("Pipeline '{}' updated successfully.", pipeline.pipeline_name());
    let outcome = web::block(move || {
        let locator = state.locator(request.namespace, request.configmap_name);
        info!(
            %locator,
            pipeline = %pipeline.pipeline_name(),
            "updating transfer metrics pipeline"
        );
        state.service.update_transfer_metrics(
            &locator,
            &pipeline,
            request.new_exporter.as_deref(),
            request.new_processors.as_ref(),
        )
    })
    .await??;
    Ok(mutation_response(message, outcome))
}

pub(super) async fn delete_transfer_metrics(
    state: Data<AppState>,
    request: Json<TransferMetricsSelector>,
) -> Result<HttpResponse, ApiError> {
    let request = request.into_inner();
    let outcome = web::block(move || {
        let locator = state.locator(request.namespace, request.configmap_name);
        let pipeline = TransferMetricsPipeline::new(request.domain_id, request.flavor_id);
        info!(
            %locator,
            pipeline = %pipeline.pipeline_name(),
            "deleting transfer metrics pipeline"
        );
        state.service.delete_transfer_metrics(&locator, &pipeline)
    })
    .await??;
    Ok(mutation_response(TRANSFER_METRICS_DELETED_MESSAGE, outcome))
}

/// The body is optional, an empty one or missing fields fall back to the configured reload
/// target. A body that is not a valid [ReloadRequest] is rejected.
pub(super) async fn reload(
    state: Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let request = if body.trim_ascii().is_empty() {
        ReloadRequest::default()
    } else {
        serde_json::from_slice::<ReloadRequest>(&body)
            .map_err(|err| ApiError::InvalidRequest(format!("Json deserialize error: {err}")))?
    };
    let sent = web::block(move || {
        let selector = state
            .reload
            .selector(request.namespace, request.label_selector);
        reload_collector(state.reloader.as_ref(), &selector)
    })
    .await??;
    Ok(HttpResponse::Ok().json(MessageResponse::new(sent.to_string())))
}
