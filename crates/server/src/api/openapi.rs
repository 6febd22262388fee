#![allow(clippy::needless_for_each)]

use axum::Json;
use axum::extract::State;
use byosnap_core::{ErrorResponse, SuccessResponse};
use utoipa::OpenApi;

use super::{AppState, SnapSettings};
use super::schemas::{DispatchCounters, HealthResponse, ProfilePayload};

#[derive(utoipa::OpenApi)]
#[openapi(
    info(
        title = "BYOSnap API",
        version = "0.1.0",
        description = "User endpoints gated on gateway trust signals, plus the event-bus webhook."
    ),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Users", description = "User game and profile endpoints"),
        (name = "Postgame", description = "Post-game statistics and rewards"),
        (name = "Events", description = "Event-bus webhook")
    ),
    paths(
        super::health::healthz,
        super::users::get_game,
        super::users::update_game,
        super::users::delete_user,
        super::users::upsert_profile,
        super::postgame::win,
        super::postgame::lose,
        super::events::receive,
    ),
    components(schemas(
        SuccessResponse, ErrorResponse, ProfilePayload, HealthResponse, DispatchCounters,
    ))
)]
pub struct ApiDoc;

/// The API document for one snap: `{snap_id}` resolved in every path and
/// the snap's description as the API description.
pub fn document(settings: &SnapSettings) -> utoipa::openapi::OpenApi {
    let snap_id = settings.snap_id.as_str();
    let mut doc = ApiDoc::openapi();
    doc.info.description = Some(settings.description.clone());
    let paths = std::mem::take(&mut doc.paths.paths);
    doc.paths.paths = paths
        .into_iter()
        .map(|(path, item)| (path.replace("{snap_id}", snap_id), item))
        .collect();
    doc
}

/// `GET /api-doc/openapi.json`
pub async fn openapi_json(State(state): State<AppState>) -> Json<utoipa::openapi::OpenApi> {
    Json(document(&state.settings))
}
