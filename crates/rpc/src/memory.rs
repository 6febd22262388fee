//! In-memory collaborator doubles.
//!
//! Each double records the calls it receives and can be switched into
//! failing with a given status code.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use byosnap_core::{EventTypeRegistration, OutboundEvent};
use tokio::sync::Mutex;

use crate::error::RpcError;
use crate::service::{EventBusService, InventoryService, ProfileService, StatisticsService};

/// A failure a double should report instead of succeeding.
#[derive(Debug, Clone)]
struct InjectedFailure {
    code: u16,
    message: String,
}

impl InjectedFailure {
    fn into_error(self, service: &'static str) -> RpcError {
        RpcError::Status {
            service,
            code: self.code,
            message: self.message,
        }
    }
}

#[derive(Debug, Default)]
struct FailureSwitch {
    failure: Mutex<Option<InjectedFailure>>,
}

impl FailureSwitch {
    async fn set(&self, code: u16, message: impl Into<String>) {
        *self.failure.lock().await = Some(InjectedFailure {
            code,
            message: message.into(),
        });
    }

    async fn clear(&self) {
        *self.failure.lock().await = None;
    }

    async fn check(&self, service: &'static str) -> Result<(), RpcError> {
        match self.failure.lock().await.clone() {
            Some(f) => Err(f.into_error(service)),
            None => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Statistics double keeping per-user counters.
#[derive(Debug, Default, Clone)]
pub struct MemoryStatistics {
    counters: Arc<Mutex<HashMap<(String, String), i64>>>,
    failure: Arc<FailureSwitch>,
}

impl MemoryStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of `key` for `user_id` (zero if never incremented).
    pub async fn get(&self, user_id: &str, key: &str) -> i64 {
        self.counters
            .lock()
            .await
            .get(&(user_id.to_owned(), key.to_owned()))
            .copied()
            .unwrap_or(0)
    }

    /// Fail every call with `code` until [`clear_failure`](Self::clear_failure).
    pub async fn fail_with(&self, code: u16, message: impl Into<String>) {
        self.failure.set(code, message).await;
    }

    pub async fn clear_failure(&self) {
        self.failure.clear().await;
    }
}

#[async_trait]
impl StatisticsService for MemoryStatistics {
    async fn increment_statistic(
        &self,
        user_id: &str,
        key: &str,
        delta: i64,
    ) -> Result<(), RpcError> {
        self.failure.check("statistics").await?;
        *self
            .counters
            .lock()
            .await
            .entry((user_id.to_owned(), key.to_owned()))
            .or_insert(0) += delta;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Inventory
// ---------------------------------------------------------------------------

/// Inventory double keeping per-user currency balances.
#[derive(Debug, Default, Clone)]
pub struct MemoryInventory {
    balances: Arc<Mutex<HashMap<(String, String), i64>>>,
    failure: Arc<FailureSwitch>,
}

impl MemoryInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn balance(&self, user_id: &str, currency_name: &str) -> i64 {
        self.balances
            .lock()
            .await
            .get(&(user_id.to_owned(), currency_name.to_owned()))
            .copied()
            .unwrap_or(0)
    }

    pub async fn fail_with(&self, code: u16, message: impl Into<String>) {
        self.failure.set(code, message).await;
    }

    pub async fn clear_failure(&self) {
        self.failure.clear().await;
    }
}

#[async_trait]
impl InventoryService for MemoryInventory {
    async fn increment_currency(
        &self,
        user_id: &str,
        currency_name: &str,
        delta: i64,
    ) -> Result<(), RpcError> {
        self.failure.check("inventory").await?;
        *self
            .balances
            .lock()
            .await
            .entry((user_id.to_owned(), currency_name.to_owned()))
            .or_insert(0) += delta;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

/// Profiles double storing the last document per user.
#[derive(Debug, Default, Clone)]
pub struct MemoryProfiles {
    profiles: Arc<Mutex<HashMap<String, serde_json::Value>>>,
    failure: Arc<FailureSwitch>,
}

impl MemoryProfiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, user_id: &str) -> Option<serde_json::Value> {
        self.profiles.lock().await.get(user_id).cloned()
    }

    pub async fn fail_with(&self, code: u16, message: impl Into<String>) {
        self.failure.set(code, message).await;
    }
}

#[async_trait]
impl ProfileService for MemoryProfiles {
    async fn upsert_profile(
        &self,
        user_id: &str,
        profile: serde_json::Value,
    ) -> Result<serde_json::Value, RpcError> {
        self.failure.check("profiles").await?;
        self.profiles
            .lock()
            .await
            .insert(user_id.to_owned(), profile.clone());
        Ok(profile)
    }
}

// ---------------------------------------------------------------------------
// Event bus
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct BusState {
    /// Registrations keyed by `(owner, subject)`; re-registration replaces.
    registrations: Vec<EventTypeRegistration>,
    published: Vec<OutboundEvent>,
    register_calls: usize,
}

/// Event bus double recording registrations and published events.
#[derive(Debug, Default, Clone)]
pub struct MemoryEventBus {
    state: Arc<Mutex<BusState>>,
    register_failure: Arc<FailureSwitch>,
    publish_failure: Arc<FailureSwitch>,
}

impl MemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// All event types currently registered for `owner`.
    pub async fn registrations(&self, owner: &str) -> Vec<EventTypeRegistration> {
        self.state
            .lock()
            .await
            .registrations
            .iter()
            .filter(|r| r.owner_service_id == owner)
            .cloned()
            .collect()
    }

    pub async fn register_calls(&self) -> usize {
        self.state.lock().await.register_calls
    }

    /// Every event published so far, oldest first.
    pub async fn published(&self) -> Vec<OutboundEvent> {
        self.state.lock().await.published.clone()
    }

    pub async fn fail_registration_with(&self, code: u16, message: impl Into<String>) {
        self.register_failure.set(code, message).await;
    }

    pub async fn fail_publish_with(&self, code: u16, message: impl Into<String>) {
        self.publish_failure.set(code, message).await;
    }

    pub async fn clear_failures(&self) {
        self.register_failure.clear().await;
        self.publish_failure.clear().await;
    }
}

#[async_trait]
impl EventBusService for MemoryEventBus {
    async fn register_event_types(
        &self,
        owner: &str,
        event_types: &[EventTypeRegistration],
    ) -> Result<(), RpcError> {
        self.register_failure.check("eventbus").await?;
        let mut state = self.state.lock().await;
        state.register_calls += 1;
        for reg in event_types {
            let existing = state
                .registrations
                .iter()
                .position(|r| r.owner_service_id == owner && r.subject == reg.subject);
            match existing {
                Some(i) => state.registrations[i] = reg.clone(),
                None => state.registrations.push(reg.clone()),
            }
        }
        Ok(())
    }

    async fn publish_event(&self, event: &OutboundEvent) -> Result<(), RpcError> {
        self.publish_failure.check("eventbus").await?;
        self.state.lock().await.published.push(event.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn statistics_accumulate() {
        let stats = MemoryStatistics::new();
        stats.increment_statistic("u1", "wins", 1).await.unwrap();
        stats.increment_statistic("u1", "wins", 1).await.unwrap();
        stats.increment_statistic("u2", "wins", 1).await.unwrap();
        assert_eq!(stats.get("u1", "wins").await, 2);
        assert_eq!(stats.get("u1", "losses").await, 0);
    }

    #[tokio::test]
    async fn injected_failure_reports_status() {
        let inv = MemoryInventory::new();
        inv.fail_with(503, "down").await;
        let err = inv.increment_currency("u1", "coins", 100).await.unwrap_err();
        assert_eq!(err.status_code(), 503);
        assert_eq!(inv.balance("u1", "coins").await, 0);

        inv.clear_failure().await;
        inv.increment_currency("u1", "coins", 100).await.unwrap();
        assert_eq!(inv.balance("u1", "coins").await, 100);
    }

    #[tokio::test]
    async fn registration_is_idempotent_per_subject() {
        let bus = MemoryEventBus::new();
        let praise = EventTypeRegistration::new("svc", "praise", "Praise").with_enum_value(1);
        let money = EventTypeRegistration::new("svc", "money", "Money").with_enum_value(2);

        bus.register_event_types("svc", &[praise.clone(), money.clone()])
            .await
            .unwrap();
        bus.register_event_types("svc", &[praise.clone(), money])
            .await
            .unwrap();

        assert_eq!(bus.registrations("svc").await.len(), 2);
        assert_eq!(bus.register_calls().await, 2);
        assert!(bus.registrations("other").await.is_empty());
    }

    #[tokio::test]
    async fn publish_failure_records_nothing() {
        let bus = MemoryEventBus::new();
        let reg = EventTypeRegistration::new("svc", "praise", "Praise");
        bus.fail_publish_with(500, "bus unavailable").await;

        let event = OutboundEvent::new(&reg, Vec::new(), vec!["u1".into()]);
        assert!(bus.publish_event(&event).await.is_err());
        assert!(bus.published().await.is_empty());
    }
}
