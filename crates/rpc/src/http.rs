//! HTTP/JSON clients for the collaborator internal APIs.
//!
//! Every request carries `Gateway: internal` and is bounded by the client's
//! call timeout.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use byosnap_core::trust::{GATEWAY_HEADER, GATEWAY_INTERNAL};
use byosnap_core::{EventTypeRegistration, OutboundEvent};
use reqwest::{Client, Response, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::RpcError;
use crate::service::{EventBusService, InventoryService, ProfileService, StatisticsService};

/// Default bound on a single collaborator call.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(5);

/// Builder for an [`HttpCollaborator`].
#[derive(Debug)]
pub struct HttpCollaboratorBuilder {
    service: &'static str,
    base_url: String,
    timeout: Duration,
    client: Option<Client>,
}

impl HttpCollaboratorBuilder {
    pub fn new(service: &'static str, base_url: impl Into<String>) -> Self {
        Self {
            service,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: DEFAULT_CALL_TIMEOUT,
            client: None,
        }
    }

    /// Set the per-call timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Use a custom reqwest Client.
    #[must_use]
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn build(self) -> Result<HttpCollaborator, RpcError> {
        if self.base_url.is_empty() {
            return Err(RpcError::Configuration(format!(
                "{} base URL is empty",
                self.service
            )));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(RpcError::Configuration(format!(
                "{} base URL must start with http:// or https://: {}",
                self.service, self.base_url
            )));
        }
        let base = Url::parse(&self.base_url).map_err(|e| {
            RpcError::Configuration(format!("{} base URL {}: {e}", self.service, self.base_url))
        })?;
        if base.cannot_be_a_base() {
            return Err(RpcError::Configuration(format!(
                "{} base URL cannot carry a path: {}",
                self.service, self.base_url
            )));
        }
        let client = match self.client {
            Some(c) => c,
            None => Client::builder()
                .build()
                .map_err(|e| RpcError::Configuration(e.to_string()))?,
        };
        Ok(HttpCollaborator {
            service: self.service,
            base,
            base_url: self.base_url,
            timeout: self.timeout,
            client,
        })
    }
}

/// Shared transport for one collaborator's internal API.
#[derive(Debug, Clone)]
pub struct HttpCollaborator {
    service: &'static str,
    base: Url,
    base_url: String,
    timeout: Duration,
    client: Client,
}

impl HttpCollaborator {
    pub fn builder(service: &'static str, base_url: impl Into<String>) -> HttpCollaboratorBuilder {
        HttpCollaboratorBuilder::new(service, base_url)
    }

    pub fn service(&self) -> &'static str {
        self.service
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Base URL extended with `segments`, each percent-encoded as exactly one
    /// path segment.
    fn url(&self, segments: &[&str]) -> Result<Url, RpcError> {
        // The url crate drops "." and ".." segments instead of encoding them.
        if let Some(bad) = segments
            .iter()
            .find(|s| s.is_empty() || **s == "." || **s == "..")
        {
            return Err(RpcError::InvalidPathSegment {
                service: self.service,
                segment: (*bad).to_owned(),
            });
        }
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| {
                RpcError::Configuration(format!("{} base URL cannot carry a path", self.service))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send `body` with `method` to the URL built from `segments` and return
    /// the response if it is a success.
    async fn send<B: Serialize + Sync>(
        &self,
        method: reqwest::Method,
        segments: &[&str],
        body: &B,
    ) -> Result<Response, RpcError> {
        let url = self.url(segments)?;
        let request = self
            .client
            .request(method, url)
            .header(GATEWAY_HEADER, GATEWAY_INTERNAL)
            .json(body)
            .send();

        let response = self
            .bounded(request)
            .await?
            .map_err(|e| self.transport_error(&e))?;

        let status = response.status();
        if status.is_success() {
            debug!(service = self.service, status = status.as_u16(), "collaborator call succeeded");
            return Ok(response);
        }

        let message = self
            .bounded(response.text())
            .await?
            .unwrap_or_default();
        Err(RpcError::Status {
            service: self.service,
            code: status.as_u16(),
            message,
        })
    }

    async fn bounded<F: Future>(&self, fut: F) -> Result<F::Output, RpcError> {
        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| RpcError::Timeout {
                service: self.service,
                after: self.timeout,
            })
    }

    fn transport_error(&self, e: &reqwest::Error) -> RpcError {
        if e.is_timeout() {
            RpcError::Timeout {
                service: self.service,
                after: self.timeout,
            }
        } else if e.is_builder() || e.is_body() || e.is_decode() {
            RpcError::Serialization {
                service: self.service,
                message: e.to_string(),
            }
        } else {
            RpcError::Connection {
                service: self.service,
                message: e.to_string(),
            }
        }
    }

    async fn json<T: for<'de> Deserialize<'de>>(&self, response: Response) -> Result<T, RpcError> {
        self.bounded(response.json::<T>())
            .await?
            .map_err(|e| RpcError::Serialization {
                service: self.service,
                message: e.to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct IncrementStatisticRequest<'a> {
    key: &'a str,
    delta: i64,
}

/// Statistics client over the internal HTTP API.
#[derive(Debug, Clone)]
pub struct HttpStatisticsClient {
    inner: HttpCollaborator,
}

impl HttpStatisticsClient {
    pub fn new(inner: HttpCollaborator) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl StatisticsService for HttpStatisticsClient {
    #[instrument(skip(self), fields(service = "statistics"))]
    async fn increment_statistic(
        &self,
        user_id: &str,
        key: &str,
        delta: i64,
    ) -> Result<(), RpcError> {
        self.inner
            .send(
                reqwest::Method::POST,
                &["v1", "internal", "statistics", "users", user_id, "increment"],
                &IncrementStatisticRequest { key, delta },
            )
            .await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Inventory
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct IncrementCurrencyRequest<'a> {
    currency_name: &'a str,
    delta: i64,
}

/// Inventory client over the internal HTTP API.
#[derive(Debug, Clone)]
pub struct HttpInventoryClient {
    inner: HttpCollaborator,
}

impl HttpInventoryClient {
    pub fn new(inner: HttpCollaborator) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl InventoryService for HttpInventoryClient {
    #[instrument(skip(self), fields(service = "inventory"))]
    async fn increment_currency(
        &self,
        user_id: &str,
        currency_name: &str,
        delta: i64,
    ) -> Result<(), RpcError> {
        self.inner
            .send(
                reqwest::Method::POST,
                &[
                    "v1",
                    "internal",
                    "inventory",
                    "users",
                    user_id,
                    "currencies",
                    "increment",
                ],
                &IncrementCurrencyRequest {
                    currency_name,
                    delta,
                },
            )
            .await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct UpsertProfileRequest {
    profile: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct UpsertProfileResponse {
    #[serde(default)]
    profile: serde_json::Value,
}

/// Profiles client over the internal HTTP API.
#[derive(Debug, Clone)]
pub struct HttpProfilesClient {
    inner: HttpCollaborator,
}

impl HttpProfilesClient {
    pub fn new(inner: HttpCollaborator) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ProfileService for HttpProfilesClient {
    #[instrument(skip(self, profile), fields(service = "profiles"))]
    async fn upsert_profile(
        &self,
        user_id: &str,
        profile: serde_json::Value,
    ) -> Result<serde_json::Value, RpcError> {
        let response = self
            .inner
            .send(
                reqwest::Method::PUT,
                &["v1", "internal", "profiles", "users", user_id],
                &UpsertProfileRequest { profile },
            )
            .await?;
        let body: UpsertProfileResponse = self.inner.json(response).await?;
        Ok(body.profile)
    }
}

// ---------------------------------------------------------------------------
// Event bus
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct RegisterEventTypesRequest<'a> {
    event_types: &'a [EventTypeRegistration],
}

#[derive(Debug, Serialize)]
struct PublishEventRequest<'a> {
    service_name: &'a str,
    subject: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    event_type_id: Option<u32>,
    /// Base64-encoded payload bytes.
    payload: String,
    recipients: &'a [String],
}

/// Event bus client over the internal HTTP API.
#[derive(Debug, Clone)]
pub struct HttpEventBusClient {
    inner: HttpCollaborator,
}

impl HttpEventBusClient {
    pub fn new(inner: HttpCollaborator) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl EventBusService for HttpEventBusClient {
    #[instrument(skip(self, event_types), fields(service = "eventbus", count = event_types.len()))]
    async fn register_event_types(
        &self,
        owner: &str,
        event_types: &[EventTypeRegistration],
    ) -> Result<(), RpcError> {
        self.inner
            .send(
                reqwest::Method::PUT,
                &["v1", "internal", "eventbus", "byosnaps", owner, "event-types"],
                &RegisterEventTypesRequest { event_types },
            )
            .await?;
        Ok(())
    }

    #[instrument(skip(self, event), fields(service = "eventbus", subject = %event.subject))]
    async fn publish_event(&self, event: &OutboundEvent) -> Result<(), RpcError> {
        let body = PublishEventRequest {
            service_name: &event.owner_service_id,
            subject: &event.subject,
            event_type_id: event.event_type_id,
            payload: BASE64.encode(&event.payload),
            recipients: &event.recipients,
        };
        self.inner
            .send(
                reqwest::Method::POST,
                &["v1", "internal", "eventbus", "events"],
                &body,
            )
            .await?;
        Ok(())
    }
}
