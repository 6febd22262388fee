use std::time::Duration;

use serde::Deserialize;

/// Base URLs of the snapend services this BYOSnap calls.
///
/// All four are required; `SNAPEND_*_HTTP_URL` environment variables take
/// precedence over the file.
///
/// ```toml
/// [collaborators]
/// statistics_url = "http://statistics:8090"
/// inventory_url = "http://inventory:8090"
/// profiles_url = "http://profiles:8090"
/// eventbus_url = "http://eventbus:8090"
/// timeout_ms = 5000
/// ```
#[derive(Debug, Deserialize)]
pub struct CollaboratorsConfig {
    pub statistics_url: Option<String>,
    pub inventory_url: Option<String>,
    pub profiles_url: Option<String>,
    pub eventbus_url: Option<String>,
    /// Bound on every collaborator call, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for CollaboratorsConfig {
    fn default() -> Self {
        Self {
            statistics_url: None,
            inventory_url: None,
            profiles_url: None,
            eventbus_url: None,
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl CollaboratorsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_timeout_ms() -> u64 {
    5_000
}
