pub mod endpoints;
pub mod events;
pub mod health;
pub mod openapi;
pub mod postgame;
pub mod schemas;
pub mod users;

use std::sync::Arc;

use axum::Router;
use axum::handler::Handler;
use axum::routing::{delete, get, post, put};
use byosnap_events::EventDispatcher;
use byosnap_rpc::{InventoryService, ProfileService, StatisticsService};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use endpoints::{Endpoint, EndpointPolicies};

use crate::auth::GateLayer;

/// Immutable per-process settings.
#[derive(Debug)]
pub struct SnapSettings {
    pub snap_id: String,
    /// Human-readable summary, published as the API description.
    pub description: String,
    pub policies: EndpointPolicies,
}

impl SnapSettings {
    /// Prefix every user route is mounted under.
    pub fn base_path(&self) -> String {
        format!("/v1/{}", self.snap_id)
    }
}

/// Shared state for all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<SnapSettings>,
    pub statistics: Arc<dyn StatisticsService>,
    pub inventory: Arc<dyn InventoryService>,
    pub profiles: Arc<dyn ProfileService>,
    pub dispatcher: Arc<EventDispatcher>,
}

/// Build the Axum router with the gated user routes, the webhook, health and
/// the `OpenAPI` document.
pub fn router(state: AppState) -> Router {
    let base = state.settings.base_path();
    let policies = &state.settings.policies;
    let gate = |endpoint: Endpoint| GateLayer::new(endpoint.name(), policies.get(endpoint));

    let users = Router::new()
        .route(
            "/users/{user_id}/game",
            get(users::get_game.layer(gate(Endpoint::GetGame)))
                .post(users::update_game.layer(gate(Endpoint::UpdateGame))),
        )
        .route(
            "/users/{user_id}",
            delete(users::delete_user.layer(gate(Endpoint::DeleteUser))),
        )
        .route(
            "/users/{user_id}/profile",
            put(users::upsert_profile.layer(gate(Endpoint::UpsertProfile))),
        )
        .route(
            "/user/{user_id}/win",
            post(postgame::win.layer(gate(Endpoint::Win))),
        )
        .route(
            "/user/{user_id}/lose",
            post(postgame::lose.layer(gate(Endpoint::Lose))),
        );

    Router::new()
        .route("/healthz", get(health::healthz))
        .route("/api-doc/openapi.json", get(openapi::openapi_json))
        .route("/internal/events", post(events::receive))
        .nest(&base, users)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
