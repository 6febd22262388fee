use serde::{Deserialize, Serialize};

use crate::trust::GatewayOrigin;

/// Declares an event this service can emit through the event bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTypeRegistration {
    /// Id of the BYOSnap that owns (emits) the event.
    pub owner_service_id: String,
    /// Fully qualified subject, `snapser.byo.<owner>.<name>`.
    pub subject: String,
    pub description: String,
    /// Schema name of the payload, e.g. `rewards.Praise`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_type: Option<String>,
    /// Enum value subscribers use to switch on the event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_value: Option<u32>,
}

impl EventTypeRegistration {
    /// Declare event `name` owned by `owner`, deriving the canonical subject.
    pub fn new(owner: &str, name: &str, description: impl Into<String>) -> Self {
        Self {
            owner_service_id: owner.to_owned(),
            subject: byo_subject(owner, name),
            description: description.into(),
            message_type: None,
            enum_value: None,
        }
    }

    #[must_use]
    pub fn with_message_type(mut self, message_type: impl Into<String>) -> Self {
        self.message_type = Some(message_type.into());
        self
    }

    #[must_use]
    pub fn with_enum_value(mut self, value: u32) -> Self {
        self.enum_value = Some(value);
        self
    }

    /// The short event name, i.e. the subject with the owner prefix removed.
    pub fn short_name(&self) -> &str {
        let prefix = byo_subject(&self.owner_service_id, "");
        self.subject
            .strip_prefix(prefix.as_str())
            .unwrap_or(&self.subject)
    }
}

/// Canonical subject of a BYOSnap event.
pub fn byo_subject(owner: &str, name: &str) -> String {
    format!("snapser.byo.{owner}.{name}")
}

/// An event about to be published on the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEvent {
    pub owner_service_id: String,
    pub subject: String,
    pub event_type_id: Option<u32>,
    pub payload: Vec<u8>,
    pub recipients: Vec<String>,
    /// Always [`GatewayOrigin::Internal`]: the bus must treat the event as
    /// service-originated.
    pub origin: GatewayOrigin,
}

impl OutboundEvent {
    pub fn new(
        registration: &EventTypeRegistration,
        payload: Vec<u8>,
        recipients: Vec<String>,
    ) -> Self {
        Self {
            owner_service_id: registration.owner_service_id.clone(),
            subject: registration.subject.clone(),
            event_type_id: registration.enum_value,
            payload,
            recipients,
            origin: GatewayOrigin::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_is_derived_from_owner() {
        let reg = EventTypeRegistration::new("byosnap-rewards", "praise", "Praise the user")
            .with_message_type("rewards.Praise")
            .with_enum_value(1);
        assert_eq!(reg.subject, "snapser.byo.byosnap-rewards.praise");
        assert_eq!(reg.short_name(), "praise");
        assert_eq!(reg.enum_value, Some(1));
    }

    #[test]
    fn outbound_event_is_internal() {
        let reg = EventTypeRegistration::new("svc", "money", "Money").with_enum_value(2);
        let ev = OutboundEvent::new(&reg, b"100".to_vec(), vec!["u1".into()]);
        assert_eq!(ev.origin, GatewayOrigin::Internal);
        assert_eq!(ev.event_type_id, Some(2));
        assert_eq!(ev.subject, "snapser.byo.svc.money");
    }

    #[test]
    fn registration_serializes_without_empty_options() {
        let reg = EventTypeRegistration::new("svc", "praise", "Praise");
        let json = serde_json::to_value(&reg).unwrap();
        assert!(json.get("enum_value").is_none());
        assert_eq!(json["subject"], "snapser.byo.svc.praise");
    }
}
