use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Dataset error: {0}")]
    Dataset(#[from] dataset::DatasetError),
    #[error("Analytics error: {0}")]
    Analytics(#[from] analytics::AnalyticsError),
    #[error("Forecast error: {0}")]
    Forecast(#[from] forecast::ForecastError),
    #[error("Invalid parameter: {0}")]
    InvalidParam(String),
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Dataset(err) => {
                tracing::error!(error = ?err, "Dataset error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal data error occurred".to_string(),
                )
            }
            AppError::Analytics(err) => {
                tracing::warn!(error = ?err, "Degenerate metric.");
                (StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
            }
            AppError::Forecast(err) => {
                tracing::warn!(error = ?err, "Forecast rejected.");
                (StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
            }
            AppError::InvalidParam(message) => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
