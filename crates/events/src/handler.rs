use std::sync::Arc;

use async_trait::async_trait;
use byosnap_core::{EnvelopeError, EventPayload, SnapEvent};

use crate::error::HandlerError;
use crate::publisher::EventPublisher;

/// Shared state handed to every handler invocation.
#[derive(Debug, Clone)]
pub struct HandlerContext {
    publisher: Arc<EventPublisher>,
}

impl HandlerContext {
    pub fn new(publisher: Arc<EventPublisher>) -> Self {
        Self { publisher }
    }

    pub fn publisher(&self) -> &EventPublisher {
        &self.publisher
    }

    /// Id of the service this process runs as.
    pub fn own_service_id(&self) -> &str {
        self.publisher.owner()
    }
}

/// Strongly-typed snap-event handler with native `async fn`.
///
/// Not object-safe; every implementation gets [`DynEventHandler`] through the
/// blanket impl below, which decodes the payload before calling
/// [`handle`](Self::handle).
pub trait SnapEventHandler: Send + Sync {
    /// Payload schema this handler expects.
    type Payload: EventPayload;

    /// Name used in logs.
    fn name(&self) -> &str;

    fn handle(
        &self,
        event: &SnapEvent,
        payload: Self::Payload,
        ctx: &HandlerContext,
    ) -> impl std::future::Future<Output = Result<(), HandlerError>> + Send;
}

/// Why an erased handler invocation did not complete.
#[derive(Debug)]
pub enum InvokeError {
    /// The payload did not decode with the handler's schema.
    Payload(EnvelopeError),
    /// The handler ran and failed.
    Handler(HandlerError),
}

/// Object-safe handler trait for use behind `Arc<dyn DynEventHandler>`.
///
/// Implement [`SnapEventHandler`] instead of this trait directly.
#[async_trait]
pub trait DynEventHandler: Send + Sync {
    fn name(&self) -> &str;

    fn schema(&self) -> &'static str;

    /// Decode the event payload and run the handler.
    async fn invoke(&self, event: &SnapEvent, ctx: &HandlerContext) -> Result<(), InvokeError>;
}

#[async_trait]
impl<T: SnapEventHandler> DynEventHandler for T {
    fn name(&self) -> &str {
        SnapEventHandler::name(self)
    }

    fn schema(&self) -> &'static str {
        T::Payload::SCHEMA
    }

    async fn invoke(&self, event: &SnapEvent, ctx: &HandlerContext) -> Result<(), InvokeError> {
        let payload = event
            .decode_payload::<T::Payload>()
            .map_err(InvokeError::Payload)?;
        SnapEventHandler::handle(self, event, payload, ctx)
            .await
            .map_err(InvokeError::Handler)
    }
}
