//! Typed payloads of the platform events this service understands.

use prost::Message;
use serde::{Serialize, Serializer};

/// Service names used in [`SnapEvent::service_name`](crate::SnapEvent::service_name).
pub mod service {
    pub const AUTH: &str = "auth";
    pub const LOBBIES: &str = "lobbies";
    pub const INVENTORY: &str = "inventory";
}

/// Event ids, scoped per service.
pub mod event_id {
    pub const AUTH_ANON_USER_ADDED: u32 = 1;

    pub const LOBBIES_MEMBER_JOINED: u32 = 5;

    pub const INVENTORY_ITEM_ADDED: u32 = 1;
    pub const INVENTORY_ITEM_CONSUMED: u32 = 2;
    pub const INVENTORY_ITEM_PURCHASED: u32 = 3;
    pub const INVENTORY_CURRENCY_BALANCE_UPDATED: u32 = 4;
}

/// Well-known subjects.
pub mod subject {
    pub const LOBBIES_MEMBER_JOINED: &str = "snapser.services.lobbies.member.joined";
}

/// A type that can appear as a snap-event payload.
pub trait EventPayload: Sized + Serialize + Send + 'static {
    /// Schema name, used in logs and decode errors.
    const SCHEMA: &'static str;

    /// Decode the payload bytes.
    fn decode_bytes(bytes: &[u8]) -> Result<Self, prost::DecodeError>;
}

macro_rules! proto_payload {
    ($ty:ty, $schema:literal) => {
        impl EventPayload for $ty {
            const SCHEMA: &'static str = $schema;

            fn decode_bytes(bytes: &[u8]) -> Result<Self, prost::DecodeError> {
                <$ty as Message>::decode(bytes)
            }
        }
    };
}

#[derive(Clone, PartialEq, Message, Serialize)]
pub struct LobbiesMemberJoined {
    #[prost(string, tag = "1")]
    pub lobby_id: String,
    #[prost(string, tag = "2")]
    pub joined_user_id: String,
}

proto_payload!(LobbiesMemberJoined, "lobbies.MemberJoined");

#[derive(Clone, PartialEq, Message, Serialize)]
pub struct AuthAnonUserAdded {
    #[prost(string, tag = "1")]
    pub user_id: String,
}

proto_payload!(AuthAnonUserAdded, "auth.AnonUserAdded");

#[derive(Clone, PartialEq, Message, Serialize)]
pub struct InventoryItemAdded {
    #[prost(string, tag = "1")]
    pub user_id: String,
    #[prost(string, tag = "2")]
    pub item_id: String,
    #[prost(int64, tag = "3")]
    pub count: i64,
}

proto_payload!(InventoryItemAdded, "inventory.ItemAdded");

#[derive(Clone, PartialEq, Message, Serialize)]
pub struct InventoryItemConsumed {
    #[prost(string, tag = "1")]
    pub user_id: String,
    #[prost(string, tag = "2")]
    pub item_id: String,
    #[prost(int64, tag = "3")]
    pub count: i64,
}

proto_payload!(InventoryItemConsumed, "inventory.ItemConsumed");

#[derive(Clone, PartialEq, Message, Serialize)]
pub struct InventoryItemPurchased {
    #[prost(string, tag = "1")]
    pub user_id: String,
    #[prost(string, tag = "2")]
    pub item_id: String,
    #[prost(int64, tag = "3")]
    pub count: i64,
}

proto_payload!(InventoryItemPurchased, "inventory.ItemPurchased");

#[derive(Clone, PartialEq, Message, Serialize)]
pub struct InventoryCurrencyBalanceUpdated {
    #[prost(string, tag = "1")]
    pub user_id: String,
    #[prost(string, tag = "2")]
    pub currency_name: String,
    #[prost(int64, tag = "3")]
    pub balance: i64,
}

proto_payload!(InventoryCurrencyBalanceUpdated, "inventory.CurrencyBalanceUpdated");

/// Payload bytes passed through untouched.
///
/// Used for events this service emitted itself; those come back through the
/// bus with free-form payloads rather than a protobuf schema.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawPayload(pub Vec<u8>);

impl EventPayload for RawPayload {
    const SCHEMA: &'static str = "raw";

    fn decode_bytes(bytes: &[u8]) -> Result<Self, prost::DecodeError> {
        Ok(Self(bytes.to_vec()))
    }
}

impl Serialize for RawPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&String::from_utf8_lossy(&self.0))
    }
}
