use byosnap_core::{RawPayload, SnapEvent};
use tracing::info;

use crate::error::HandlerError;
use crate::handler::{HandlerContext, SnapEventHandler};

/// Acknowledges events this service emitted itself when the bus echoes them
/// back.
#[derive(Debug, Default)]
pub struct OwnEventEcho;

impl SnapEventHandler for OwnEventEcho {
    type Payload = RawPayload;

    fn name(&self) -> &str {
        "own_event_echo"
    }

    async fn handle(
        &self,
        event: &SnapEvent,
        payload: RawPayload,
        ctx: &HandlerContext,
    ) -> Result<(), HandlerError> {
        info!(
            owner = ctx.own_service_id(),
            event = %event.label(),
            payload = %String::from_utf8_lossy(&payload.0),
            "received own event"
        );
        Ok(())
    }
}
