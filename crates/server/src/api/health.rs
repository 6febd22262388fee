use axum::Json;
use axum::extract::State;

use super::AppState;
use super::schemas::HealthResponse;

/// `GET /healthz` -- service status with a snapshot of webhook dispatch counters.
#[utoipa::path(
    get,
    path = "/healthz",
    tag = "Health",
    summary = "Health check",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn healthz(State(state): State<AppState>) -> Json<HealthResponse> {
    let snap = state.dispatcher.metrics().snapshot();
    Json(HealthResponse {
        status: "ok".into(),
        dispatch: snap.into(),
    })
}
