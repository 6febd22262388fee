mod collaborators;
mod policies;
mod server;
mod telemetry;


pub use collaborators::*;
pub use policies::*;
pub use server::*;
pub use telemetry::*;

use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::error::ServerError;

/// Environment variable overriding the statistics base URL.
pub const ENV_STATISTICS_URL: &str = "SNAPEND_STATISTICS_HTTP_URL";
/// Environment variable overriding the inventory base URL.
pub const ENV_INVENTORY_URL: &str = "SNAPEND_INVENTORY_HTTP_URL";
/// Environment variable overriding the profiles base URL.
pub const ENV_PROFILES_URL: &str = "SNAPEND_PROFILES_HTTP_URL";
/// Environment variable overriding the event bus base URL.
pub const ENV_EVENTBUS_URL: &str = "SNAPEND_EVENTBUS_HTTP_URL";
/// Environment variable overriding the snap id.
pub const ENV_SNAP_ID: &str = "BYOSNAP_ID";

/// Top-level configuration, loaded from `byosnap.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct ByoSnapConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub snap: SnapConfig,
    #[serde(default)]
    pub collaborators: CollaboratorsConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    /// Per-endpoint authorization policy overrides.
    #[serde(default)]
    pub policies: Vec<PolicyConfig>,
}

impl ByoSnapConfig {
    /// Load configuration from `path`, or use defaults if the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ServerError> {
        if !path.exists() {
            info!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, ServerError> {
        toml::from_str(contents).map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Apply environment overrides. `lookup` is usually `std::env::var(..).ok()`.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_empty(ENV_STATISTICS_URL) {
            self.collaborators.statistics_url = Some(url);
        }
        if let Some(url) = non_empty(ENV_INVENTORY_URL) {
            self.collaborators.inventory_url = Some(url);
        }
        if let Some(url) = non_empty(ENV_PROFILES_URL) {
            self.collaborators.profiles_url = Some(url);
        }
        if let Some(url) = non_empty(ENV_EVENTBUS_URL) {
            self.collaborators.eventbus_url = Some(url);
        }
        if let Some(id) = non_empty(ENV_SNAP_ID) {
            self.snap.id = id;
        }
    }

    /// Check everything startup depends on. Runs before anything binds.
    pub fn validate(&self) -> Result<(), ServerError> {
        if self.snap.id.trim().is_empty() {
            return Err(ServerError::Config("snap id must not be empty".into()));
        }
        let required = [
            ("statistics_url", ENV_STATISTICS_URL, &self.collaborators.statistics_url),
            ("inventory_url", ENV_INVENTORY_URL, &self.collaborators.inventory_url),
            ("profiles_url", ENV_PROFILES_URL, &self.collaborators.profiles_url),
            ("eventbus_url", ENV_EVENTBUS_URL, &self.collaborators.eventbus_url),
        ];
        for (key, env, value) in required {
            if value.as_deref().is_none_or(|v| v.trim().is_empty()) {
                return Err(ServerError::Config(format!(
                    "collaborators.{key} is required (or set {env})"
                )));
            }
        }
        if self.collaborators.timeout_ms == 0 {
            return Err(ServerError::Config(
                "collaborators.timeout_ms must be greater than zero".into(),
            ));
        }
        self.telemetry.validate()?;
        for policy in &self.policies {
            policy.to_policy()?;
        }
        Ok(())
    }
}
