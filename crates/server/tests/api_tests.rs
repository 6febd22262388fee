use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use prost::Message;
use tower::ServiceExt;

use byosnap_core::payloads::{AuthAnonUserAdded, LobbiesMemberJoined, event_id, service};
use byosnap_core::{SnapEvent, WebhookRequest};
use byosnap_rpc::memory::{MemoryEventBus, MemoryInventory, MemoryProfiles, MemoryStatistics};
use byosnap_server::api::router;
use byosnap_server::bootstrap::{Collaborators, bootstrap};
use byosnap_server::config::{ByoSnapConfig, PolicyConfig};
use byosnap_server::error::ServerError;

const BASE: &str = "/v1/byosnap-rewards";

// -- Harness --------------------------------------------------------------

struct Harness {
    app: Router,
    statistics: MemoryStatistics,
    inventory: MemoryInventory,
    profiles: MemoryProfiles,
    bus: MemoryEventBus,
}

impl Harness {
    async fn new() -> Self {
        Self::with_config(ByoSnapConfig::default()).await
    }

    async fn with_config(config: ByoSnapConfig) -> Self {
        let statistics = MemoryStatistics::new();
        let inventory = MemoryInventory::new();
        let profiles = MemoryProfiles::new();
        let bus = MemoryEventBus::new();
        let collaborators = Collaborators {
            statistics: Arc::new(statistics.clone()),
            inventory: Arc::new(inventory.clone()),
            profiles: Arc::new(profiles.clone()),
            eventbus: Arc::new(bus.clone()),
        };
        let state = bootstrap(&config, collaborators).await.unwrap();
        Self {
            app: router(state),
            statistics,
            inventory,
            profiles,
            bus,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body.to_vec())
    }

    async fn json(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let (status, body) = self.send(request).await;
        (status, serde_json::from_slice(&body).unwrap())
    }
}

/// Request carrying gateway trust headers. `None` leaves a header unset.
fn gated(
    method: Method,
    uri: &str,
    gateway: Option<&str>,
    auth_type: Option<&str>,
    user_id: Option<&str>,
    body: Body,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(v) = gateway {
        builder = builder.header("Gateway", v);
    }
    if let Some(v) = auth_type {
        builder = builder.header("Auth-Type", v);
    }
    if let Some(v) = user_id {
        builder = builder.header("User-Id", v);
    }
    builder.body(body).unwrap()
}

fn webhook(raw: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/internal/events")
        .header("content-type", "application/x-protobuf")
        .body(Body::from(raw))
        .unwrap()
}

fn member_joined_delivery(user: &str) -> Vec<u8> {
    let payload = LobbiesMemberJoined {
        lobby_id: "lobby-1".into(),
        joined_user_id: user.into(),
    }
    .encode_to_vec();
    WebhookRequest::for_snap_event(SnapEvent::with_id(
        service::LOBBIES,
        event_id::LOBBIES_MEMBER_JOINED,
        payload,
    ))
    .encode_to_vec()
}

// -- User endpoints -------------------------------------------------------

#[tokio::test]
async fn internal_call_reads_game_without_other_headers() {
    let h = Harness::new().await;
    let (status, body) = h
        .json(gated(
            Method::GET,
            &format!("{BASE}/users/u2/game"),
            Some("internal"),
            None,
            None,
            Body::empty(),
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["api"], "GetGame");
    assert_eq!(body["auth_type"], "");
    assert_eq!(body["header_user_id"], "N/A");
    assert_eq!(body["path_user_id"], "u2");
    assert_eq!(body["message"], "success");
}

#[tokio::test]
async fn user_reads_own_game() {
    let h = Harness::new().await;
    let (status, body) = h
        .json(gated(
            Method::GET,
            &format!("{BASE}/users/u1/game"),
            Some("external"),
            Some("user"),
            Some("u1"),
            Body::empty(),
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["auth_type"], "user");
    assert_eq!(body["header_user_id"], "u1");
}

#[tokio::test]
async fn user_cannot_read_someone_elses_game() {
    let h = Harness::new().await;
    let (status, body) = h
        .json(gated(
            Method::GET,
            &format!("{BASE}/users/u2/game"),
            Some("external"),
            Some("user"),
            Some("u1"),
            Body::empty(),
        ))
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_message"], "Unauthorized");
}

#[tokio::test]
async fn api_key_caller_updates_any_game() {
    let h = Harness::new().await;
    let (status, body) = h
        .json(gated(
            Method::POST,
            &format!("{BASE}/users/u9/game"),
            None,
            Some("api-key"),
            None,
            Body::empty(),
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["api"], "PostGame");
}

#[tokio::test]
async fn user_cannot_update_game() {
    let h = Harness::new().await;
    let (status, _) = h
        .send(gated(
            Method::POST,
            &format!("{BASE}/users/u1/game"),
            None,
            Some("user"),
            Some("u1"),
            Body::empty(),
        ))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn app_auth_is_not_enough_for_game_read() {
    let h = Harness::new().await;
    let (status, _) = h
        .send(gated(
            Method::GET,
            &format!("{BASE}/users/u1/game"),
            None,
            Some("app"),
            None,
            Body::empty(),
        ))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn delete_requires_internal_origin() {
    let h = Harness::new().await;

    let (status, _) = h
        .send(gated(
            Method::DELETE,
            &format!("{BASE}/users/u1"),
            None,
            Some("api-key"),
            None,
            Body::empty(),
        ))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = h
        .json(gated(
            Method::DELETE,
            &format!("{BASE}/users/u1"),
            Some("INTERNAL"),
            None,
            None,
            Body::empty(),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["api"], "DeleteUser");
}

#[tokio::test]
async fn policy_override_tightens_an_endpoint() {
    let mut config = ByoSnapConfig::default();
    config.policies.push(PolicyConfig {
        endpoint: "get_game".into(),
        levels: vec!["internal".into()],
        denial: None,
        resource: None,
    });
    let h = Harness::with_config(config).await;

    let (status, _) = h
        .send(gated(
            Method::GET,
            &format!("{BASE}/users/u1/game"),
            None,
            Some("user"),
            Some("u1"),
            Body::empty(),
        ))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// -- Profile --------------------------------------------------------------

#[tokio::test]
async fn profile_is_stored_for_the_path_user() {
    let h = Harness::new().await;
    let (status, body) = h
        .json(gated(
            Method::PUT,
            &format!("{BASE}/users/u1/profile"),
            None,
            Some("user"),
            Some("u1"),
            Body::from(r#"{"profile":{"name":"Ada","level":3}}"#),
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["api"], "UpdateUserProfile");
    let message: serde_json::Value =
        serde_json::from_str(body["message"].as_str().unwrap()).unwrap();
    assert_eq!(message["profile"]["name"], "Ada");

    let stored = h.profiles.get("u1").await.unwrap();
    assert_eq!(stored["level"], 3);
}

#[tokio::test]
async fn profile_body_must_carry_a_profile() {
    let h = Harness::new().await;

    let (status, body) = h
        .json(gated(
            Method::PUT,
            &format!("{BASE}/users/u1/profile"),
            Some("internal"),
            None,
            None,
            Body::from(r#"{"nickname":"x"}"#),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_message"], "Profile is required");

    let (status, body) = h
        .json(gated(
            Method::PUT,
            &format!("{BASE}/users/u1/profile"),
            Some("internal"),
            None,
            None,
            Body::from("not json"),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_message"], "Error un-marshalling request body");
    assert!(h.profiles.get("u1").await.is_none());
}

#[tokio::test]
async fn profile_denial_never_reaches_the_store() {
    let h = Harness::new().await;
    let (status, _) = h
        .send(gated(
            Method::PUT,
            &format!("{BASE}/users/u2/profile"),
            None,
            Some("user"),
            Some("u1"),
            Body::from(r#"{"profile":{"name":"Mallory"}}"#),
        ))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(h.profiles.get("u2").await.is_none());
}

#[tokio::test]
async fn profile_store_failure_is_a_server_error() {
    let h = Harness::new().await;
    h.profiles.fail_with(502, "bad gateway").await;
    let (status, body) = h
        .json(gated(
            Method::PUT,
            &format!("{BASE}/users/u1/profile"),
            Some("internal"),
            None,
            None,
            Body::from(r#"{"profile":{"name":"Ada"}}"#),
        ))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(
        body["error_message"].as_str().unwrap().ends_with(": 502"),
        "{body}"
    );
}

// -- Postgame -------------------------------------------------------------

#[tokio::test]
async fn win_counts_and_rewards() {
    let h = Harness::new().await;
    let (status, body) = h
        .json(gated(
            Method::POST,
            &format!("{BASE}/user/u1/win"),
            None,
            Some("user"),
            Some("u1"),
            Body::empty(),
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({}));
    assert_eq!(h.statistics.get("u1", "wins").await, 1);
    assert_eq!(h.inventory.balance("u1", "coins").await, 100);
}

#[tokio::test]
async fn app_caller_may_record_results() {
    let h = Harness::new().await;
    let (status, _) = h
        .send(gated(
            Method::POST,
            &format!("{BASE}/user/u5/lose"),
            None,
            Some("app"),
            None,
            Body::empty(),
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(h.statistics.get("u5", "losses").await, 1);
    assert_eq!(h.statistics.get("u5", "wins").await, 0);
    assert_eq!(h.inventory.balance("u5", "coins").await, 0);
}

#[tokio::test]
async fn win_denial_is_forbidden_and_changes_nothing() {
    let h = Harness::new().await;
    let (status, body) = h
        .json(gated(
            Method::POST,
            &format!("{BASE}/user/u2/win"),
            None,
            Some("user"),
            Some("u1"),
            Body::empty(),
        ))
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error_message"], "Unauthorized");
    assert_eq!(h.statistics.get("u2", "wins").await, 0);
    assert_eq!(h.inventory.balance("u2", "coins").await, 0);
}

#[tokio::test]
async fn failed_win_count_skips_the_reward() {
    let h = Harness::new().await;
    h.statistics.fail_with(503, "statistics down").await;

    let (status, body) = h
        .json(gated(
            Method::POST,
            &format!("{BASE}/user/u1/win"),
            Some("internal"),
            None,
            None,
            Body::empty(),
        ))
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(
        body["error_message"].as_str().unwrap().contains(": 503"),
        "{body}"
    );
    assert_eq!(h.inventory.balance("u1", "coins").await, 0);

    h.statistics.clear_failure().await;
    let (status, _) = h
        .send(gated(
            Method::POST,
            &format!("{BASE}/user/u1/win"),
            Some("internal"),
            None,
            None,
            Body::empty(),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(h.inventory.balance("u1", "coins").await, 100);
}

#[tokio::test]
async fn failed_reward_after_count_is_reported() {
    let h = Harness::new().await;
    h.inventory.fail_with(500, "ledger locked").await;

    let (status, _) = h
        .send(gated(
            Method::POST,
            &format!("{BASE}/user/u1/win"),
            Some("internal"),
            None,
            None,
            Body::empty(),
        ))
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(h.statistics.get("u1", "wins").await, 1);
}

// -- Webhook --------------------------------------------------------------

#[tokio::test]
async fn lobby_join_is_acknowledged_and_praised() {
    let h = Harness::new().await;
    let (status, body) = h.send(webhook(member_joined_delivery("u7"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");
    let published = h.bus.published().await;
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].recipients, vec!["u7".to_string()]);
}

#[tokio::test]
async fn corrupt_delivery_fails_alone() {
    let h = Harness::new().await;

    let (status, body) = h.send(webhook(vec![0xff, 0xff, 0xff, 0x01])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(body["error_message"].is_string());

    let (status, _) = h.send(webhook(member_joined_delivery("u8"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(h.bus.published().await.len(), 1);
}

#[tokio::test]
async fn unknown_event_is_acknowledged_without_side_effects() {
    let h = Harness::new().await;
    let raw = WebhookRequest::for_snap_event(SnapEvent::with_id("matchmaking", 77, vec![1, 2, 3]))
        .encode_to_vec();

    let (status, body) = h.send(webhook(raw)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");
    assert!(h.bus.published().await.is_empty());
}

#[tokio::test]
async fn failing_handler_is_still_acknowledged() {
    let h = Harness::new().await;
    h.bus.fail_publish_with(503, "bus down").await;

    let (status, body) = h.send(webhook(member_joined_delivery("u7"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");
}

#[tokio::test]
async fn logging_handler_accepts_auth_events() {
    let h = Harness::new().await;
    let payload = AuthAnonUserAdded {
        user_id: "anon-1".into(),
    }
    .encode_to_vec();
    let raw = WebhookRequest::for_snap_event(SnapEvent::with_id(
        service::AUTH,
        event_id::AUTH_ANON_USER_ADDED,
        payload,
    ))
    .encode_to_vec();

    let (status, _) = h.send(webhook(raw)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(h.bus.published().await.is_empty());
}

// -- Health and docs ------------------------------------------------------

#[tokio::test]
async fn healthz_reports_dispatch_counters() {
    let h = Harness::new().await;
    h.send(webhook(member_joined_delivery("u1"))).await;
    h.send(webhook(vec![0xff, 0xff])).await;

    let (status, body) = h
        .json(
            Request::builder()
                .uri("/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["dispatch"]["received"], 2);
    assert_eq!(body["dispatch"]["handled"], 1);
    assert_eq!(body["dispatch"]["decode_failed"], 1);
}

#[tokio::test]
async fn openapi_document_uses_the_snap_id() {
    let h = Harness::new().await;
    let (status, body) = h
        .json(
            Request::builder()
                .uri("/api-doc/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    let paths = body["paths"].as_object().unwrap();
    assert!(paths.contains_key("/v1/byosnap-rewards/users/{user_id}/game"));
    assert!(paths.contains_key("/v1/byosnap-rewards/user/{user_id}/win"));
    assert!(paths.contains_key("/internal/events"));
    assert!(!paths.keys().any(|p| p.contains("{snap_id}")));
    assert_eq!(body["info"]["description"], "Rewards players for playing");
}

#[tokio::test]
async fn openapi_description_follows_config() {
    let mut config = ByoSnapConfig::default();
    config.snap.description = "Hands out coins".into();
    let h = Harness::with_config(config).await;

    let (_, body) = h
        .json(
            Request::builder()
                .uri("/api-doc/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(body["info"]["description"], "Hands out coins");
}

// -- Startup --------------------------------------------------------------

#[tokio::test]
async fn registration_failure_prevents_startup() {
    let bus = MemoryEventBus::new();
    bus.fail_registration_with(500, "bus rejected").await;
    let collaborators = Collaborators {
        statistics: Arc::new(MemoryStatistics::new()),
        inventory: Arc::new(MemoryInventory::new()),
        profiles: Arc::new(MemoryProfiles::new()),
        eventbus: Arc::new(bus),
    };

    let result = bootstrap(&ByoSnapConfig::default(), collaborators).await;
    assert!(matches!(result, Err(ServerError::Registration(_))));
}

#[tokio::test]
async fn custom_snap_id_moves_the_routes() {
    let mut config = ByoSnapConfig::default();
    config.snap.id = "byosnap-other".into();
    let h = Harness::with_config(config).await;

    let (status, _) = h
        .send(gated(
            Method::GET,
            "/v1/byosnap-other/users/u1/game",
            Some("internal"),
            None,
            None,
            Body::empty(),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = h
        .send(gated(
            Method::GET,
            &format!("{BASE}/users/u1/game"),
            Some("internal"),
            None,
            None,
            Body::empty(),
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        h.bus.registrations("byosnap-other").await.len(),
        2
    );
}
