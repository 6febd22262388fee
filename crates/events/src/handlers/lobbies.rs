use byosnap_core::SnapEvent;
use byosnap_core::payloads::LobbiesMemberJoined;
use rand::seq::SliceRandom;
use tracing::info;

use crate::error::HandlerError;
use crate::handler::{HandlerContext, SnapEventHandler};
use crate::publisher::PRAISE_EVENT;

/// Encouragements appended to the praise message.
pub const PRAISES: [&str; 6] = [
    "You're doing amazing work!",
    "Keep up the fantastic effort!",
    "Your dedication is inspiring!",
    "You're a star, keep shining!",
    "You have the power to achieve great things!",
    "Believe in yourself, you're unstoppable!",
];

const PRAISE_PREFIX: &str = "Nice work, you joined a lobby - ";

/// Sends a praise event to every player that joins a lobby.
#[derive(Debug, Default)]
pub struct PraiseOnLobbyJoin;

impl PraiseOnLobbyJoin {
    pub fn new() -> Self {
        Self
    }

    fn message() -> String {
        let praise = PRAISES
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(PRAISES[0]);
        format!("{PRAISE_PREFIX}{praise}")
    }
}

impl SnapEventHandler for PraiseOnLobbyJoin {
    type Payload = LobbiesMemberJoined;

    fn name(&self) -> &str {
        "lobbies.member_joined"
    }

    async fn handle(
        &self,
        _event: &SnapEvent,
        payload: LobbiesMemberJoined,
        ctx: &HandlerContext,
    ) -> Result<(), HandlerError> {
        if payload.joined_user_id.is_empty() {
            return Err(HandlerError::Other(
                "member joined event carries no user id".into(),
            ));
        }
        info!(
            lobby_id = %payload.lobby_id,
            user_id = %payload.joined_user_id,
            "member joined lobby"
        );

        let message = Self::message();
        ctx.publisher()
            .publish(
                PRAISE_EVENT,
                message.into_bytes(),
                vec![payload.joined_user_id],
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_uses_one_of_the_praises() {
        for _ in 0..20 {
            let msg = PraiseOnLobbyJoin::message();
            let praise = msg.strip_prefix(PRAISE_PREFIX).unwrap();
            assert!(PRAISES.contains(&praise), "unexpected praise: {praise}");
        }
    }
}
