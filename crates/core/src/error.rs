use thiserror::Error;

/// Errors raised while building an [`AuthorizationPolicy`](crate::AuthorizationPolicy).
#[derive(Debug, Error)]
pub enum PolicyError {
    /// The policy lists no trust levels and could never allow anything.
    #[error("policy must list at least one trust level")]
    Empty,

    /// A trust level name was not recognized.
    #[error("unknown trust level '{0}'")]
    UnknownLevel(String),

    /// A path-bound policy named an empty parameter.
    #[error("resource path parameter name must not be empty")]
    EmptyPathParam,
}

/// Errors raised while decoding event-bus envelopes and payloads.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// The outer webhook envelope is not a valid message.
    #[error("malformed webhook envelope: {0}")]
    Malformed(#[source] prost::DecodeError),

    /// A snap-event envelope carried no nested event.
    #[error("snap event envelope has no event body")]
    MissingEvent,

    /// The nested payload does not match the schema of its event type.
    #[error("malformed {schema} payload: {source}")]
    Payload {
        schema: &'static str,
        #[source]
        source: prost::DecodeError,
    },
}
