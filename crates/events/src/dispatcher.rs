use std::sync::Arc;

use byosnap_core::{EnvelopeError, MessageType, decode_envelope};
use tracing::{debug, error, info, instrument, warn};

use crate::error::DispatchError;
use crate::handler::{HandlerContext, InvokeError};
use crate::metrics::DispatchMetrics;
use crate::registry::HandlerRegistry;

/// What happened to an acknowledged webhook delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A handler processed the event.
    Handled { handler: String },
    /// The handler ran and failed.
    HandlerFailed { handler: String, error: String },
    /// No handler is registered for the event.
    Unrecognized { service_name: String, event_id: u32 },
    /// The envelope carried something other than a snap event.
    UnhandledMessageType(i32),
}

/// Decodes webhook deliveries and routes snap events to their handlers.
#[derive(Debug)]
pub struct EventDispatcher {
    registry: HandlerRegistry,
    ctx: HandlerContext,
    metrics: Arc<DispatchMetrics>,
}

impl EventDispatcher {
    pub fn new(registry: HandlerRegistry, ctx: HandlerContext) -> Self {
        Self {
            registry,
            ctx,
            metrics: Arc::new(DispatchMetrics::default()),
        }
    }

    pub fn metrics(&self) -> &Arc<DispatchMetrics> {
        &self.metrics
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Process one webhook body.
    ///
    /// Only decode failures are errors; every other result is acknowledged.
    #[instrument(skip_all, fields(bytes = raw.len()))]
    pub async fn dispatch(&self, raw: &[u8]) -> Result<DispatchOutcome, DispatchError> {
        self.metrics.increment_received();

        let envelope = match decode_envelope(raw) {
            Ok(envelope) => envelope,
            Err(e) => {
                self.metrics.increment_decode_failed();
                error!(error = %e, raw = %hex::encode(raw), "failed to decode webhook envelope");
                return Err(DispatchError::Envelope(e));
            }
        };

        if envelope.kind() != Some(MessageType::SnapEvent) {
            self.metrics.increment_unhandled_message_type();
            info!(message_type = envelope.message_type, "ignoring unhandled message type");
            return Ok(DispatchOutcome::UnhandledMessageType(envelope.message_type));
        }

        let Some(event) = envelope.snap_event else {
            self.metrics.increment_decode_failed();
            error!(raw = %hex::encode(raw), "snap event envelope has no event body");
            return Err(DispatchError::Envelope(EnvelopeError::MissingEvent));
        };

        let Some(handler) = self.registry.resolve(&event) else {
            self.metrics.increment_unrecognized();
            warn!(event = %event.label(), "no handler registered for event");
            return Ok(DispatchOutcome::Unrecognized {
                service_name: event.service_name,
                event_id: event.event_id,
            });
        };

        debug!(event = %event.label(), handler = handler.name(), "dispatching event");
        match handler.invoke(&event, &self.ctx).await {
            Ok(()) => {
                self.metrics.increment_handled();
                Ok(DispatchOutcome::Handled {
                    handler: handler.name().to_owned(),
                })
            }
            Err(InvokeError::Payload(source)) => {
                self.metrics.increment_decode_failed();
                error!(
                    event = %event.label(),
                    schema = handler.schema(),
                    payload = %hex::encode(&event.payload),
                    error = %source,
                    "failed to decode event payload"
                );
                Err(DispatchError::Payload {
                    handler: handler.name().to_owned(),
                    source,
                })
            }
            Err(InvokeError::Handler(e)) => {
                self.metrics.increment_handler_failed();
                error!(event = %event.label(), handler = handler.name(), error = %e, "event handler failed");
                Ok(DispatchOutcome::HandlerFailed {
                    handler: handler.name().to_owned(),
                    error: e.to_string(),
                })
            }
        }
    }
}
