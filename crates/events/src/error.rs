use byosnap_core::EnvelopeError;
use byosnap_rpc::RpcError;
use thiserror::Error;

use crate::registry::EventKey;

/// Errors that reject a webhook delivery.
///
/// Anything that is not a decode failure is acknowledged and reported through
/// [`DispatchOutcome`](crate::DispatchOutcome) instead.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The outer envelope could not be decoded.
    #[error(transparent)]
    Envelope(EnvelopeError),

    /// The nested payload did not match the handler's schema.
    #[error("{handler}: {source}")]
    Payload {
        handler: String,
        #[source]
        source: EnvelopeError,
    },
}

/// Errors returned by event handlers.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Publishing a follow-up event failed.
    #[error("publish failed: {0}")]
    Publish(#[from] PublishError),

    /// A collaborator call failed.
    #[error("collaborator call failed: {0}")]
    Rpc(#[from] RpcError),

    #[error("{0}")]
    Other(String),
}

/// Errors raised by the outbound event publisher.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The event name or subject was never registered by this service.
    #[error("event type '{0}' is not registered")]
    Unregistered(String),

    /// A registration names an owner other than this service.
    #[error("event type '{subject}' is owned by '{owner}', not '{expected}'")]
    ForeignOwner {
        subject: String,
        owner: String,
        expected: String,
    },

    /// The owner id is empty.
    #[error("owner service id must not be empty")]
    EmptyOwner,

    /// Registering event types with the bus failed.
    #[error("event type registration failed: {0}")]
    Registration(#[source] RpcError),

    /// Sending an event to the bus failed.
    #[error("event bus rejected the event: {0}")]
    Bus(#[source] RpcError),
}

/// Errors raised while building a [`HandlerRegistry`](crate::HandlerRegistry).
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("a handler is already registered for {0}")]
    Duplicate(EventKey),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_duplicate_names_the_key() {
        let err = RegistryError::Duplicate(EventKey::by_id("lobbies", 5));
        assert_eq!(
            err.to_string(),
            "a handler is already registered for lobbies#5"
        );
    }

    #[test]
    fn handler_error_wraps_publish_error() {
        let err: HandlerError = PublishError::Unregistered("praise".into()).into();
        assert_eq!(
            err.to_string(),
            "publish failed: event type 'praise' is not registered"
        );
    }
}
