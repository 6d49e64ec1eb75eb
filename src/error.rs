use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::num::ParseFloatError;
use thiserror::Error;

/// Failure talking to the metrics database. Callers usually degrade these to
/// an empty envelope rather than surfacing them.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Upstream returned HTTP {0}")]
    Status(reqwest::StatusCode),

    #[error("Malformed envelope: {0}")]
    Decode(String),
}

/// A sample whose value could not be turned into a float.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid value {raw:?} for {metric_key} (worker {worker}, pod {pod}): {source}")]
    InvalidValue {
        metric_key: String,
        worker: String,
        pod: String,
        raw: String,
        #[source]
        source: ParseFloatError,
    },

    #[error("Sample for {metric_key} (worker {worker}, pod {pod}) has no value")]
    MissingValue {
        metric_key: String,
        worker: String,
        pod: String,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("PROMETHEUS_URL must be set")]
    MissingPrometheusUrl,

    #[error("PROMETHEUS_URL must start with http:// or https://, got {0:?}")]
    InvalidPrometheusUrl(String),

    #[error("NAMESPACE must be set")]
    MissingNamespace,

    #[error("PORT is not a valid port number: {0:?}")]
    InvalidPort(String),

    #[error("LOG_FORMAT must be 'compact' or 'json', got {0:?}")]
    InvalidLogFormat(String),
}

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let status = match self {
            // The database answered, but with something we cannot read.
            DashboardError::Parse(_) => StatusCode::BAD_GATEWAY,
            DashboardError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
