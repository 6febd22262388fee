//! Startup wiring: collaborator clients, event-type registration and the
//! immutable application state.

use std::sync::Arc;

use byosnap_events::{
    EventDispatcher, EventPublisher, HandlerContext, builtin_registry, rewards_event_types,
};
use byosnap_rpc::{
    EventBusService, HttpCollaborator, HttpEventBusClient, HttpInventoryClient,
    HttpProfilesClient, HttpStatisticsClient, InventoryService, ProfileService,
    StatisticsService,
};
use tracing::info;

use crate::api::{AppState, EndpointPolicies, SnapSettings};
use crate::config::{ByoSnapConfig, CollaboratorsConfig};
use crate::error::ServerError;

/// Handles to every collaborator service.
#[derive(Clone)]
pub struct Collaborators {
    pub statistics: Arc<dyn StatisticsService>,
    pub inventory: Arc<dyn InventoryService>,
    pub profiles: Arc<dyn ProfileService>,
    pub eventbus: Arc<dyn EventBusService>,
}

impl Collaborators {
    /// HTTP clients for the configured base URLs.
    pub fn http(config: &CollaboratorsConfig) -> Result<Self, ServerError> {
        let timeout = config.timeout();
        let build = |service: &'static str, url: Option<&String>| {
            let url = url.ok_or_else(|| {
                ServerError::Config(format!("missing base URL for {service}"))
            })?;
            HttpCollaborator::builder(service, url.as_str())
                .timeout(timeout)
                .build()
                .map_err(|e| ServerError::Config(e.to_string()))
        };

        Ok(Self {
            statistics: Arc::new(HttpStatisticsClient::new(build(
                "statistics",
                config.statistics_url.as_ref(),
            )?)),
            inventory: Arc::new(HttpInventoryClient::new(build(
                "inventory",
                config.inventory_url.as_ref(),
            )?)),
            profiles: Arc::new(HttpProfilesClient::new(build(
                "profiles",
                config.profiles_url.as_ref(),
            )?)),
            eventbus: Arc::new(HttpEventBusClient::new(build(
                "eventbus",
                config.eventbus_url.as_ref(),
            )?)),
        })
    }
}

/// Register this service's event types and assemble the application state.
///
/// Registration failure is returned before any state is built.
pub async fn bootstrap(
    config: &ByoSnapConfig,
    collaborators: Collaborators,
) -> Result<AppState, ServerError> {
    let policies = EndpointPolicies::from_config(&config.policies)?;
    let snap_id = config.snap.id.clone();

    let publisher = EventPublisher::register(
        &snap_id,
        rewards_event_types(&snap_id),
        Arc::clone(&collaborators.eventbus),
    )
    .await?;

    let registry =
        builtin_registry(&publisher).map_err(|e| ServerError::Config(e.to_string()))?;
    info!(
        snap_id = %snap_id,
        description = %config.snap.description,
        handlers = registry.len(),
        "event handlers registered"
    );

    let dispatcher = EventDispatcher::new(registry, HandlerContext::new(Arc::new(publisher)));

    Ok(AppState {
        settings: Arc::new(SnapSettings {
            snap_id,
            description: config.snap.description.clone(),
            policies,
        }),
        statistics: collaborators.statistics,
        inventory: collaborators.inventory,
        profiles: collaborators.profiles,
        dispatcher: Arc::new(dispatcher),
    })
}
