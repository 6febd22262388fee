pub mod envelope;
pub mod error;
pub mod event_type;
pub mod payloads;
pub mod policy;
pub mod schemas;
pub mod trust;

pub use envelope::{MessageType, SnapEvent, WebhookRequest, decode_envelope};
pub use error::{EnvelopeError, PolicyError};
pub use event_type::{EventTypeRegistration, OutboundEvent, byo_subject};
pub use payloads::{EventPayload, RawPayload};
pub use policy::{
    AuthorizationPolicy, Decision, DenialStatus, ResourceBinding, TrustLevel, authorize,
};
pub use schemas::{ErrorResponse, SuccessResponse};
pub use trust::{AuthType, GatewayOrigin, TrustContext};
