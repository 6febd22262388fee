use byosnap_events::DispatchMetricsSnapshot;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Response body for the health check endpoint.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
    pub dispatch: DispatchCounters,
}

/// Webhook dispatch counters.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DispatchCounters {
    pub received: u64,
    pub handled: u64,
    pub handler_failed: u64,
    pub unrecognized: u64,
    pub unhandled_message_type: u64,
    pub decode_failed: u64,
}

impl From<DispatchMetricsSnapshot> for DispatchCounters {
    fn from(snap: DispatchMetricsSnapshot) -> Self {
        Self {
            received: snap.received,
            handled: snap.handled,
            handler_failed: snap.handler_failed,
            unrecognized: snap.unrecognized,
            unhandled_message_type: snap.unhandled_message_type,
            decode_failed: snap.decode_failed,
        }
    }
}

/// Request body of the profile upsert endpoint.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProfilePayload {
    /// Free-form profile document.
    #[schema(value_type = Object, example = json!({"display_name": "Ada"}))]
    pub profile: Option<serde_json::Value>,
}
