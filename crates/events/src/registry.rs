use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use byosnap_core::SnapEvent;

use crate::error::RegistryError;
use crate::handler::{DynEventHandler, SnapEventHandler};

/// Key a handler is registered under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKey {
    /// A self-describing subject such as `snapser.services.lobbies.member.joined`.
    Subject(String),
    /// An event id scoped to its emitting service.
    Id { service: String, event_id: u32 },
    /// Every event from one service. Consulted only when the subject and id
    /// lookups both miss.
    Service(String),
}

impl EventKey {
    pub fn by_subject(subject: impl Into<String>) -> Self {
        Self::Subject(subject.into())
    }

    pub fn by_id(service: impl Into<String>, event_id: u32) -> Self {
        Self::Id {
            service: service.into(),
            event_id,
        }
    }

    pub fn by_service(service: impl Into<String>) -> Self {
        Self::Service(service.into())
    }
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Subject(s) => write!(f, "subject {s}"),
            Self::Id { service, event_id } => write!(f, "{service}#{event_id}"),
            Self::Service(service) => write!(f, "service {service}"),
        }
    }
}

/// Maps event keys to handlers.
#[derive(Default, Clone)]
pub struct HandlerRegistry {
    handlers: HashMap<EventKey, Arc<dyn DynEventHandler>>,
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<String> = self.handlers.keys().map(ToString::to_string).collect();
        keys.sort();
        f.debug_struct("HandlerRegistry")
            .field("keys", &keys)
            .finish()
    }
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under every key in `keys`.
    ///
    /// Fails without registering anything if one of the keys is taken.
    pub fn register<H>(
        &mut self,
        keys: impl IntoIterator<Item = EventKey>,
        handler: H,
    ) -> Result<(), RegistryError>
    where
        H: SnapEventHandler + 'static,
    {
        self.register_dyn(keys, Arc::new(handler))
    }

    /// Register an already-erased handler under every key in `keys`.
    pub fn register_dyn(
        &mut self,
        keys: impl IntoIterator<Item = EventKey>,
        handler: Arc<dyn DynEventHandler>,
    ) -> Result<(), RegistryError> {
        let keys: Vec<EventKey> = keys.into_iter().collect();
        for (i, key) in keys.iter().enumerate() {
            if self.handlers.contains_key(key) || keys[..i].contains(key) {
                return Err(RegistryError::Duplicate(key.clone()));
            }
        }
        for key in keys {
            self.handlers.insert(key, Arc::clone(&handler));
        }
        Ok(())
    }

    /// Find the handler for `event`: by subject first, then by
    /// `(service_name, event_id)`, then by `service_name` alone.
    pub fn resolve(&self, event: &SnapEvent) -> Option<&Arc<dyn DynEventHandler>> {
        let by_subject = (!event.subject.is_empty())
            .then(|| self.handlers.get(&EventKey::by_subject(event.subject.as_str())))
            .flatten();
        by_subject
            .or_else(|| {
                self.handlers
                    .get(&EventKey::by_id(event.service_name.as_str(), event.event_id))
            })
            .or_else(|| {
                self.handlers
                    .get(&EventKey::by_service(event.service_name.as_str()))
            })
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn contains(&self, key: &EventKey) -> bool {
        self.handlers.contains_key(key)
    }
}
