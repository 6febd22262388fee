use async_trait::async_trait;
use byosnap_core::{EventTypeRegistration, OutboundEvent};

use crate::error::RpcError;

/// Statistics collaborator: per-user counters.
#[async_trait]
pub trait StatisticsService: Send + Sync {
    /// Add `delta` to the user's `key` statistic.
    async fn increment_statistic(&self, user_id: &str, key: &str, delta: i64)
    -> Result<(), RpcError>;
}

/// Inventory collaborator: per-user virtual currencies.
#[async_trait]
pub trait InventoryService: Send + Sync {
    /// Add `delta` of `currency_name` to the user's balance.
    async fn increment_currency(
        &self,
        user_id: &str,
        currency_name: &str,
        delta: i64,
    ) -> Result<(), RpcError>;
}

/// Profiles collaborator: free-form per-user profile documents.
#[async_trait]
pub trait ProfileService: Send + Sync {
    /// Create or replace the profile of `user_id`, returning the stored document.
    async fn upsert_profile(
        &self,
        user_id: &str,
        profile: serde_json::Value,
    ) -> Result<serde_json::Value, RpcError>;
}

/// Event bus collaborator.
#[async_trait]
pub trait EventBusService: Send + Sync {
    /// Declare (upsert) the event types `owner` emits.
    async fn register_event_types(
        &self,
        owner: &str,
        event_types: &[EventTypeRegistration],
    ) -> Result<(), RpcError>;

    /// Publish one event.
    async fn publish_event(&self, event: &OutboundEvent) -> Result<(), RpcError>;
}
