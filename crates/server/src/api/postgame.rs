use axum::Json;
use axum::extract::{Path, State};
use byosnap_core::ErrorResponse;
use tracing::info;

use super::AppState;
use crate::error::ServerError;

/// Statistic incremented on a win.
pub const WINS_STAT: &str = "wins";
/// Statistic incremented on a loss.
pub const LOSSES_STAT: &str = "losses";
/// Currency granted on a win.
pub const REWARD_CURRENCY: &str = "coins";
/// Amount of [`REWARD_CURRENCY`] granted on a win.
pub const WIN_REWARD: i64 = 100;

/// `POST /v1/{snap_id}/user/{user_id}/win`
///
/// Counts the win, then grants the reward. If counting fails the reward is
/// not granted.
#[utoipa::path(
    post,
    path = "/v1/{snap_id}/user/{user_id}/win",
    tag = "Postgame",
    summary = "Win a game",
    description = "Increments the user's win count and grants the win reward.",
    params(("user_id" = String, Path, description = "Unique identifier of the user")),
    responses(
        (status = 200, description = "Win recorded"),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 500, description = "Collaborator failed", body = ErrorResponse)
    )
)]
pub async fn win(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<serde_json::Value>, ServerError> {
    state
        .statistics
        .increment_statistic(&user_id, WINS_STAT, 1)
        .await?;
    state
        .inventory
        .increment_currency(&user_id, REWARD_CURRENCY, WIN_REWARD)
        .await?;
    info!(user_id = %user_id, reward = WIN_REWARD, "win recorded");
    Ok(Json(serde_json::json!({})))
}

/// `POST /v1/{snap_id}/user/{user_id}/lose`
#[utoipa::path(
    post,
    path = "/v1/{snap_id}/user/{user_id}/lose",
    tag = "Postgame",
    summary = "Lose a game",
    description = "Increments the user's loss count.",
    params(("user_id" = String, Path, description = "Unique identifier of the user")),
    responses(
        (status = 200, description = "Loss recorded"),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 500, description = "Collaborator failed", body = ErrorResponse)
    )
)]
pub async fn lose(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<serde_json::Value>, ServerError> {
    state
        .statistics
        .increment_statistic(&user_id, LOSSES_STAT, 1)
        .await?;
    info!(user_id = %user_id, "loss recorded");
    Ok(Json(serde_json::json!({})))
}
