use std::marker::PhantomData;

use byosnap_core::{EventPayload, SnapEvent};
use tracing::info;

use crate::error::HandlerError;
use crate::handler::{HandlerContext, SnapEventHandler};

/// Logs the decoded payload as JSON and does nothing else.
pub struct LogPayload<P> {
    name: &'static str,
    _payload: PhantomData<fn() -> P>,
}

impl<P> LogPayload<P> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            _payload: PhantomData,
        }
    }
}

impl<P> std::fmt::Debug for LogPayload<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogPayload").field("name", &self.name).finish()
    }
}

impl<P: EventPayload> SnapEventHandler for LogPayload<P> {
    type Payload = P;

    fn name(&self) -> &str {
        self.name
    }

    async fn handle(
        &self,
        event: &SnapEvent,
        payload: P,
        _ctx: &HandlerContext,
    ) -> Result<(), HandlerError> {
        let json = serde_json::to_string(&payload)
            .map_err(|e| HandlerError::Other(format!("cannot render {}: {e}", P::SCHEMA)))?;
        info!(event = %event.label(), schema = P::SCHEMA, payload = %json, "received event");
        Ok(())
    }
}
