use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ohlcview_core::{ChartError, WarehouseError};
use serde_json::json;
use thiserror::Error;
use tokio::task::JoinError;
use tracing::error;

/// Error body returned by every endpoint: `{"error": message}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn invalid_json() -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Invalid JSON data")
    }

    pub fn method_not_allowed() -> Self {
        Self::new(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
    }

    pub fn request_timeout() -> Self {
        Self::new(StatusCode::REQUEST_TIMEOUT, "Request timed out")
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<ChartError> for ApiError {
    fn from(value: ChartError) -> Self {
        let status = StatusCode::from_u16(value.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!(error = %value, "chart request failed");
        }
        Self::new(status, value.to_string())
    }
}

impl From<WarehouseError> for ApiError {
    fn from(value: WarehouseError) -> Self {
        error!(error = %value, "store request failed");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, value.to_string())
    }
}

impl From<JoinError> for ApiError {
    fn from(value: JoinError) -> Self {
        error!(error = %value, "blocking store task failed");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Errors that stop the server itself.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: std::net::SocketAddr,
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
