use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::error::DeskError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

/// Top-level failure of the binary and of every HTTP handler.
#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Desk(DeskError),
    Unauthenticated,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Desk(err) => write!(f, "{}", err),
            AppError::Unauthenticated => write!(f, "missing or empty x-actor-id header"),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Desk(err) => Some(err),
            AppError::Unauthenticated => None,
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Desk(DeskError::Authorization(_)) => StatusCode::FORBIDDEN,
            AppError::Desk(DeskError::Validation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Desk(DeskError::Blocked(_)) => StatusCode::CONFLICT,
            AppError::Desk(DeskError::NotFound { .. }) => StatusCode::NOT_FOUND,
            AppError::Desk(DeskError::Persistence(_)) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::Config(_) | AppError::Telemetry(_) | AppError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let category = match &self {
            AppError::Desk(err) => err.category(),
            AppError::Unauthenticated => "authentication",
            _ => "internal",
        };

        let body = Json(json!({ "error": self.to_string(), "category": category }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<DeskError> for AppError {
    fn from(value: DeskError) -> Self {
        Self::Desk(value)
    }
}
