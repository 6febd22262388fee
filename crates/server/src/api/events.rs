use axum::body::Bytes;
use axum::extract::State;
use byosnap_core::ErrorResponse;
use tracing::debug;

use super::AppState;
use crate::error::ServerError;

/// `POST /internal/events` -- event-bus webhook.
///
/// The body is a binary `WebhookRequest`. Every delivery whose envelope
/// decodes is acknowledged with `ok`, whatever its handler did.
#[utoipa::path(
    post,
    path = "/internal/events",
    tag = "Events",
    summary = "Event-bus webhook",
    request_body(content = Vec<u8>, content_type = "application/x-protobuf", description = "Encoded WebhookRequest"),
    responses(
        (status = 200, description = "Delivery acknowledged", body = String),
        (status = 400, description = "Envelope or payload could not be decoded", body = ErrorResponse)
    )
)]
pub async fn receive(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<&'static str, ServerError> {
    let outcome = state.dispatcher.dispatch(&body).await?;
    debug!(?outcome, "webhook delivery acknowledged");
    Ok("ok")
}
