//! Handlers for the platform events this service subscribes to.

mod lobbies;
mod logging;
mod own;

use std::sync::Arc;

use byosnap_core::payloads::{
    AuthAnonUserAdded, InventoryCurrencyBalanceUpdated, InventoryItemAdded,
    InventoryItemConsumed, InventoryItemPurchased, event_id, service, subject,
};

pub use lobbies::{PRAISES, PraiseOnLobbyJoin};
pub use logging::LogPayload;
pub use own::OwnEventEcho;

use crate::error::RegistryError;
use crate::handler::DynEventHandler;
use crate::publisher::EventPublisher;
use crate::registry::{EventKey, HandlerRegistry};

/// Registry with every built-in handler.
///
/// Events from `publisher`'s own service id are echoed: by registered
/// subject, and otherwise by the service id alone.
pub fn builtin_registry(publisher: &EventPublisher) -> Result<HandlerRegistry, RegistryError> {
    let mut registry = HandlerRegistry::new();

    registry.register(
        [
            EventKey::by_id(service::LOBBIES, event_id::LOBBIES_MEMBER_JOINED),
            EventKey::by_subject(subject::LOBBIES_MEMBER_JOINED),
        ],
        PraiseOnLobbyJoin::new(),
    )?;

    registry.register(
        [EventKey::by_id(service::AUTH, event_id::AUTH_ANON_USER_ADDED)],
        LogPayload::<AuthAnonUserAdded>::new("auth.anon_user_added"),
    )?;

    registry.register(
        [EventKey::by_id(service::INVENTORY, event_id::INVENTORY_ITEM_ADDED)],
        LogPayload::<InventoryItemAdded>::new("inventory.item_added"),
    )?;
    registry.register(
        [EventKey::by_id(service::INVENTORY, event_id::INVENTORY_ITEM_CONSUMED)],
        LogPayload::<InventoryItemConsumed>::new("inventory.item_consumed"),
    )?;
    registry.register(
        [EventKey::by_id(service::INVENTORY, event_id::INVENTORY_ITEM_PURCHASED)],
        LogPayload::<InventoryItemPurchased>::new("inventory.item_purchased"),
    )?;
    registry.register(
        [EventKey::by_id(
            service::INVENTORY,
            event_id::INVENTORY_CURRENCY_BALANCE_UPDATED,
        )],
        LogPayload::<InventoryCurrencyBalanceUpdated>::new("inventory.currency_balance_updated"),
    )?;

    let echo: Arc<dyn DynEventHandler> = Arc::new(OwnEventEcho);
    let own_keys = publisher
        .registrations()
        .iter()
        .map(|reg| EventKey::by_subject(reg.subject.as_str()))
        .chain([EventKey::by_service(publisher.owner())]);
    registry.register_dyn(own_keys, echo)?;

    Ok(registry)
}
