use super::models::ErrorResponse;
use crate::reload::ReloadError;
use crate::service::ServiceError;
use crate::store::StoreError;
use actix_web::error::BlockingError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;
use tracing::{debug, error};

/// Failure of an API request, rendered as `{"detail": <reason>}`.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Reload(#[from] ReloadError),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("request processing was interrupted: {0}")]
    Blocking(#[from] BlockingError),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Service(ServiceError::PipelineNotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Service(ServiceError::Store(err)) => match err {
                StoreError::NotFound(_) => StatusCode::NOT_FOUND,
                StoreError::Conflict(_) => StatusCode::CONFLICT,
                StoreError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                StoreError::Rejected(_) => StatusCode::BAD_GATEWAY,
                StoreError::InvalidDocument(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Reload(err) => match err {
                ReloadError::TargetNotFound => StatusCode::NOT_FOUND,
                ReloadError::SignalFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
                ReloadError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            },
            ApiError::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Blocking(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!(status = status.as_u16(), error_msg = %self, "request failed");
        } else {
            debug!(status = status.as_u16(), error_msg = %self, "request rejected");
        }
        HttpResponse::build(status).json(ErrorResponse {
            detail: self.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector_config::CollectorConfigError;
    use actix_web::body::MessageBody;
    use rstest::rstest;

    #[rstest]
    #[case::missing_configmap(
        ServiceError::Store(StoreError::NotFound("cm".to_string())).into(),
        StatusCode::NOT_FOUND
    )]
    #[case::missing_pipeline(
        ServiceError::PipelineNotFound("metrics/d1f1".to_string()).into(),
        StatusCode::NOT_FOUND
    )]
    #[case::conflict(
        ServiceError::Store(StoreError::Conflict("modified".to_string())).into(),
        StatusCode::CONFLICT
    )]
    #[case::unavailable(
        ServiceError::Store(StoreError::Unavailable("no cluster".to_string())).into(),
        StatusCode::SERVICE_UNAVAILABLE
    )]
    #[case::rejected(
        ServiceError::Store(StoreError::Rejected("forbidden".to_string())).into(),
        StatusCode::BAD_GATEWAY
    )]
    #[case::invalid_document(
        ServiceError::Store(StoreError::InvalidDocument(CollectorConfigError("bad".to_string()))).into(),
        StatusCode::INTERNAL_SERVER_ERROR
    )]
    #[case::missing_pod(ReloadError::TargetNotFound.into(), StatusCode::NOT_FOUND)]
    #[case::signal_failed(
        ReloadError::SignalFailed("exit 1".to_string()).into(),
        StatusCode::INTERNAL_SERVER_ERROR
    )]
    #[case::reload_unavailable(
        ReloadError::Unavailable("debug mode".to_string()).into(),
        StatusCode::SERVICE_UNAVAILABLE
    )]
    #[case::invalid_request(
        ApiError::InvalidRequest("missing field `service`".to_string()),
        StatusCode::UNPROCESSABLE_ENTITY
    )]
    fn test_status_code(#[case] err: ApiError, #[case] expected: StatusCode) {
        assert_eq!(err.status_code(), expected);
        assert_eq!(err.error_response().status(), expected);
    }

    #[test]
    fn test_detail_body() {
        let response = ApiError::from(ReloadError::TargetNotFound).error_response();
        assert_eq!(
            response.into_body().try_into_bytes().unwrap(),
            r#"{"detail":"OpenTelemetry pod not found"}"#
        );
    }
}
