//! Event-bus plumbing for a BYOSnap.
//!
//! Inbound, the [`EventDispatcher`] decodes webhook deliveries and routes each
//! snap event to a handler from the [`HandlerRegistry`]. Outbound, the
//! [`EventPublisher`] declares this service's event types at startup and
//! publishes them afterwards.

pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod handlers;
pub mod metrics;
pub mod publisher;
pub mod registry;

pub use dispatcher::{DispatchOutcome, EventDispatcher};
pub use error::{DispatchError, HandlerError, PublishError, RegistryError};
pub use handler::{DynEventHandler, HandlerContext, InvokeError, SnapEventHandler};
pub use handlers::builtin_registry;
pub use metrics::{DispatchMetrics, DispatchMetricsSnapshot};
pub use publisher::{EventPublisher, MONEY_EVENT, PRAISE_EVENT, rewards_event_types};
pub use registry::{EventKey, HandlerRegistry};
