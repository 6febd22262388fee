use std::fmt;
use std::sync::Arc;

use byosnap_core::{EventTypeRegistration, OutboundEvent};
use byosnap_rpc::EventBusService;
use tracing::{debug, info, instrument, warn};

use crate::error::PublishError;

/// Short name of the praise event.
pub const PRAISE_EVENT: &str = "praise";
/// Short name of the money event.
pub const MONEY_EVENT: &str = "money";

/// The event types a rewards BYOSnap emits.
pub fn rewards_event_types(owner: &str) -> Vec<EventTypeRegistration> {
    vec![
        EventTypeRegistration::new(owner, PRAISE_EVENT, "Praise sent to a player")
            .with_message_type("rewards.Praise")
            .with_enum_value(1),
        EventTypeRegistration::new(owner, MONEY_EVENT, "Currency granted to a player")
            .with_message_type("rewards.Money")
            .with_enum_value(2),
    ]
}

/// Publishes this service's own events to the bus.
///
/// Built once at startup by [`register`](Self::register); afterwards the
/// registration table is read-only.
pub struct EventPublisher {
    owner: String,
    registrations: Vec<EventTypeRegistration>,
    bus: Arc<dyn EventBusService>,
}

impl fmt::Debug for EventPublisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventPublisher")
            .field("owner", &self.owner)
            .field("registrations", &self.registrations)
            .finish_non_exhaustive()
    }
}

impl EventPublisher {
    /// Declare `types` with the bus on behalf of `owner`.
    ///
    /// Types are de-duplicated by subject (first declaration wins) and any
    /// type owned by another service is rejected before the bus is called.
    #[instrument(skip(types, bus), fields(count = types.len()))]
    pub async fn register(
        owner: &str,
        types: Vec<EventTypeRegistration>,
        bus: Arc<dyn EventBusService>,
    ) -> Result<Self, PublishError> {
        if owner.trim().is_empty() {
            return Err(PublishError::EmptyOwner);
        }

        let mut registrations: Vec<EventTypeRegistration> = Vec::with_capacity(types.len());
        for reg in types {
            if reg.owner_service_id != owner {
                return Err(PublishError::ForeignOwner {
                    subject: reg.subject,
                    owner: reg.owner_service_id,
                    expected: owner.to_owned(),
                });
            }
            if registrations.iter().any(|r| r.subject == reg.subject) {
                debug!(subject = %reg.subject, "skipping duplicate event type");
                continue;
            }
            registrations.push(reg);
        }

        bus.register_event_types(owner, &registrations)
            .await
            .map_err(PublishError::Registration)?;

        info!(
            subjects = ?registrations.iter().map(|r| r.subject.as_str()).collect::<Vec<_>>(),
            "registered event types"
        );

        Ok(Self {
            owner: owner.to_owned(),
            registrations,
            bus,
        })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn registrations(&self) -> &[EventTypeRegistration] {
        &self.registrations
    }

    /// Look up a registration by short name or full subject.
    pub fn resolve(&self, name_or_subject: &str) -> Option<&EventTypeRegistration> {
        self.registrations
            .iter()
            .find(|r| r.subject == name_or_subject || r.short_name() == name_or_subject)
    }

    /// Publish a registered event to `recipients`.
    ///
    /// Failures are logged and returned; nothing is retried.
    #[instrument(skip(self, payload), fields(owner = %self.owner))]
    pub async fn publish(
        &self,
        name_or_subject: &str,
        payload: Vec<u8>,
        recipients: Vec<String>,
    ) -> Result<(), PublishError> {
        let Some(registration) = self.resolve(name_or_subject) else {
            warn!(event = name_or_subject, "refusing to publish unregistered event type");
            return Err(PublishError::Unregistered(name_or_subject.to_owned()));
        };

        let event = OutboundEvent::new(registration, payload, recipients);
        match self.bus.publish_event(&event).await {
            Ok(()) => {
                info!(subject = %event.subject, "published event");
                Ok(())
            }
            Err(e) => {
                warn!(subject = %event.subject, error = %e, "failed to publish event");
                Err(PublishError::Bus(e))
            }
        }
    }
}
