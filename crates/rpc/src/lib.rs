//! Clients for the collaborator services a BYOSnap calls: statistics,
//! inventory, profiles and the event bus.
//!
//! The service traits in [`service`] are the seam the HTTP handlers and event
//! handlers depend on. [`http`] talks to the real internal APIs and
//! [`memory`] provides recording doubles for tests and local runs.

mod error;
pub mod http;
pub mod memory;
pub mod service;

pub use error::RpcError;
pub use http::{
    DEFAULT_CALL_TIMEOUT, HttpCollaborator, HttpCollaboratorBuilder, HttpEventBusClient,
    HttpInventoryClient, HttpProfilesClient, HttpStatisticsClient,
};
pub use service::{EventBusService, InventoryService, ProfileService, StatisticsService};
