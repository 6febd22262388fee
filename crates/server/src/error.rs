use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use byosnap_core::{DenialStatus, ErrorResponse};
use byosnap_events::{DispatchError, PublishError};
use byosnap_rpc::RpcError;
use thiserror::Error;

/// Errors that can occur when running the server or serving a request.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Invalid or missing configuration. Fatal at startup.
    #[error("configuration error: {0}")]
    Config(String),

    /// An I/O error (e.g. binding the listener).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Declaring event types with the bus failed. Fatal at startup.
    #[error("registration failed: {0}")]
    Registration(#[from] PublishError),

    /// No trust level of the endpoint's policy was satisfied (401).
    #[error("unauthorized")]
    Unauthorized,

    /// No trust level of the endpoint's policy was satisfied (403).
    #[error("forbidden")]
    Forbidden,

    /// A collaborator call failed or timed out.
    #[error(transparent)]
    Upstream(#[from] RpcError),

    /// A webhook body could not be decoded.
    #[error(transparent)]
    EnvelopeDecode(#[from] DispatchError),

    /// The request body was malformed or incomplete.
    #[error("{0}")]
    BadRequest(String),
}

impl ServerError {
    /// The denial error matching a policy's denial status.
    pub fn denied(status: DenialStatus) -> Self {
        match status {
            DenialStatus::Unauthorized => Self::Unauthorized,
            DenialStatus::Forbidden => Self::Forbidden,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, ErrorResponse::unauthorized()),
            Self::Forbidden => (StatusCode::FORBIDDEN, ErrorResponse::unauthorized()),
            Self::Upstream(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new(format!("{e}: {}", e.status_code())),
            ),
            Self::EnvelopeDecode(e) => (StatusCode::BAD_REQUEST, ErrorResponse::new(e.to_string())),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorResponse::new(msg.clone())),
            Self::Config(_) | Self::Io(_) | Self::Registration(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new(self.to_string()),
            ),
        };

        (status, axum::Json(body)).into_response()
    }
}
