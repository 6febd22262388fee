//! Wire types for the event-bus webhook.
//!
//! The bus delivers every event to `POST /internal/events` as a protobuf
//! [`WebhookRequest`]. For snap events the nested [`SnapEvent`] carries the
//! emitting service, the event id scoped to that service, an optional
//! self-describing subject, and the payload bytes whose schema follows from
//! those identifiers.

use std::fmt;

use prost::Message;

use crate::error::EnvelopeError;
use crate::payloads::EventPayload;

/// Kind of message carried by a webhook envelope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum MessageType {
    Unspecified = 0,
    SnapEvent = 1,
}

/// Outer envelope posted by the event bus.
#[derive(Clone, PartialEq, Message)]
pub struct WebhookRequest {
    #[prost(enumeration = "MessageType", tag = "1")]
    pub message_type: i32,
    #[prost(message, optional, tag = "2")]
    pub snap_event: Option<SnapEvent>,
}

impl WebhookRequest {
    /// Wrap a snap event in an envelope.
    pub fn for_snap_event(event: SnapEvent) -> Self {
        Self {
            message_type: MessageType::SnapEvent as i32,
            snap_event: Some(event),
        }
    }

    /// The decoded message type, or `None` for values this build does not know.
    pub fn kind(&self) -> Option<MessageType> {
        MessageType::try_from(self.message_type).ok()
    }
}

/// An event emitted by a snap (platform service or BYOSnap).
#[derive(Clone, PartialEq, Message)]
pub struct SnapEvent {
    #[prost(string, tag = "1")]
    pub service_name: String,
    /// Event id, unique only within `service_name`.
    #[prost(uint32, tag = "2")]
    pub event_id: u32,
    /// Bus-wide enum value of a registered event type.
    #[prost(uint32, tag = "3")]
    pub event_type_id: u32,
    #[prost(string, tag = "4")]
    pub subject: String,
    #[prost(bytes = "vec", tag = "5")]
    pub payload: Vec<u8>,
}

impl SnapEvent {
    /// Build an event identified by service name and event id.
    pub fn with_id(service_name: impl Into<String>, event_id: u32, payload: Vec<u8>) -> Self {
        Self {
            service_name: service_name.into(),
            event_id,
            event_type_id: 0,
            subject: String::new(),
            payload,
        }
    }

    /// Build an event identified by subject.
    pub fn with_subject(
        service_name: impl Into<String>,
        subject: impl Into<String>,
        payload: Vec<u8>,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            event_id: 0,
            event_type_id: 0,
            subject: subject.into(),
            payload,
        }
    }

    /// Decode the payload as `P`.
    pub fn decode_payload<P: EventPayload>(&self) -> Result<P, EnvelopeError> {
        P::decode_bytes(&self.payload).map_err(|source| EnvelopeError::Payload {
            schema: P::SCHEMA,
            source,
        })
    }

    /// Short label used in logs.
    pub fn label(&self) -> EventLabel<'_> {
        EventLabel(self)
    }
}

/// Display adapter for [`SnapEvent::label`].
pub struct EventLabel<'a>(&'a SnapEvent);

impl fmt::Display for EventLabel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ev = self.0;
        if ev.subject.is_empty() {
            write!(f, "{}#{}", ev.service_name, ev.event_id)
        } else {
            write!(f, "{}#{} ({})", ev.service_name, ev.event_id, ev.subject)
        }
    }
}

/// Decode the outer webhook envelope.
pub fn decode_envelope(raw: &[u8]) -> Result<WebhookRequest, EnvelopeError> {
    WebhookRequest::decode(raw).map_err(EnvelopeError::Malformed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payloads::LobbiesMemberJoined;

    #[test]
    fn envelope_decodes_what_the_bus_sends() {
        let joined = LobbiesMemberJoined {
            lobby_id: "lobby-1".into(),
            joined_user_id: "u1".into(),
        };
        let event = SnapEvent::with_id("lobbies", 5, joined.encode_to_vec());
        let raw = WebhookRequest::for_snap_event(event).encode_to_vec();

        let envelope = decode_envelope(&raw).unwrap();
        assert_eq!(envelope.kind(), Some(MessageType::SnapEvent));
        let event = envelope.snap_event.unwrap();
        assert_eq!(event.service_name, "lobbies");
        assert_eq!(event.event_id, 5);

        let decoded: LobbiesMemberJoined = event.decode_payload().unwrap();
        assert_eq!(decoded.joined_user_id, "u1");
    }

    #[test]
    fn truncated_envelope_is_an_error() {
        let event = SnapEvent::with_id("lobbies", 5, vec![1, 2, 3, 4, 5, 6, 7, 8]);
        let raw = WebhookRequest::for_snap_event(event).encode_to_vec();
        let err = decode_envelope(&raw[..raw.len() - 3]).unwrap_err();
        assert!(matches!(err, EnvelopeError::Malformed(_)));
    }

    #[test]
    fn unknown_message_type_is_preserved() {
        let envelope = WebhookRequest {
            message_type: 42,
            snap_event: None,
        };
        let decoded = decode_envelope(&envelope.encode_to_vec()).unwrap();
        assert_eq!(decoded.kind(), None);
        assert_eq!(decoded.message_type, 42);
    }

    #[test]
    fn payload_schema_mismatch_names_the_schema() {
        // A lone field header with wire type 7 is never valid protobuf.
        let event = SnapEvent::with_id("lobbies", 5, vec![0x0f]);
        let err = event.decode_payload::<LobbiesMemberJoined>().unwrap_err();
        assert!(err.to_string().contains("lobbies.MemberJoined"));
    }

    #[test]
    fn label_includes_subject_when_present() {
        let ev = SnapEvent::with_subject("lobbies", "snapser.services.lobbies.member.joined", vec![]);
        assert_eq!(
            ev.label().to_string(),
            "lobbies#0 (snapser.services.lobbies.member.joined)"
        );
    }
}
