use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use byosnap_core::trust::{AUTH_TYPE_HEADER, USER_ID_HEADER};
use byosnap_core::{ErrorResponse, SuccessResponse};
use tracing::info;

use super::AppState;
use super::endpoints::Endpoint;
use super::schemas::ProfilePayload;
use crate::auth::header_str;
use crate::error::ServerError;

/// Echo body shared by the user endpoints.
pub(crate) fn success(
    endpoint: Endpoint,
    headers: &HeaderMap,
    path_user_id: String,
    message: impl Into<String>,
) -> SuccessResponse {
    let header_user_id = header_str(headers, USER_ID_HEADER)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("N/A");
    SuccessResponse {
        api: endpoint.operation().to_owned(),
        auth_type: header_str(headers, AUTH_TYPE_HEADER)
            .unwrap_or_default()
            .to_owned(),
        header_user_id: header_user_id.to_owned(),
        path_user_id,
        message: message.into(),
    }
}

/// `GET /v1/{snap_id}/users/{user_id}/game`
#[utoipa::path(
    get,
    path = "/v1/{snap_id}/users/{user_id}/game",
    tag = "Users",
    summary = "Get game",
    params(("user_id" = String, Path, description = "Unique identifier of the user")),
    responses(
        (status = 200, description = "Request accepted", body = SuccessResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
pub async fn get_game(Path(user_id): Path<String>, headers: HeaderMap) -> Json<SuccessResponse> {
    Json(success(Endpoint::GetGame, &headers, user_id, "success"))
}

/// `POST /v1/{snap_id}/users/{user_id}/game`
#[utoipa::path(
    post,
    path = "/v1/{snap_id}/users/{user_id}/game",
    tag = "Users",
    summary = "Update game",
    params(("user_id" = String, Path, description = "Unique identifier of the user")),
    responses(
        (status = 200, description = "Request accepted", body = SuccessResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
pub async fn update_game(
    Path(user_id): Path<String>,
    headers: HeaderMap,
) -> Json<SuccessResponse> {
    Json(success(Endpoint::UpdateGame, &headers, user_id, "success"))
}

/// `DELETE /v1/{snap_id}/users/{user_id}`
#[utoipa::path(
    delete,
    path = "/v1/{snap_id}/users/{user_id}",
    tag = "Users",
    summary = "Delete user",
    description = "Only callable from inside the snapend.",
    params(("user_id" = String, Path, description = "Unique identifier of the user")),
    responses(
        (status = 200, description = "Request accepted", body = SuccessResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
pub async fn delete_user(
    Path(user_id): Path<String>,
    headers: HeaderMap,
) -> Json<SuccessResponse> {
    Json(success(Endpoint::DeleteUser, &headers, user_id, "success"))
}

/// `PUT /v1/{snap_id}/users/{user_id}/profile`
///
/// Stores the profile of the user named in the path through the profiles
/// service and echoes the stored document in `message`.
#[utoipa::path(
    put,
    path = "/v1/{snap_id}/users/{user_id}/profile",
    tag = "Users",
    summary = "Update user profile",
    params(("user_id" = String, Path, description = "Unique identifier of the user")),
    request_body(content = ProfilePayload, description = "Profile fields"),
    responses(
        (status = 200, description = "Profile stored", body = SuccessResponse),
        (status = 400, description = "Missing or malformed profile", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Profiles service failed", body = ErrorResponse)
    )
)]
pub async fn upsert_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<SuccessResponse>, ServerError> {
    let payload: ProfilePayload = serde_json::from_slice(&body)
        .map_err(|_| ServerError::BadRequest("Error un-marshalling request body".into()))?;
    let profile = payload
        .profile
        .filter(|p| !p.is_null())
        .ok_or_else(|| ServerError::BadRequest("Profile is required".into()))?;

    let stored = state.profiles.upsert_profile(&user_id, profile).await?;
    info!(user_id = %user_id, "profile updated");

    let message = serde_json::json!({ "profile": stored }).to_string();
    Ok(Json(success(Endpoint::UpsertProfile, &headers, user_id, message)))
}
