use serde::Deserialize;

/// HTTP server bind configuration.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum time to wait for in-flight requests during shutdown.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            shutdown_timeout_seconds: default_shutdown_timeout(),
        }
    }
}

fn default_shutdown_timeout() -> u64 {
    30
}

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

fn default_port() -> u16 {
    5003
}

/// Identity of this BYOSnap.
#[derive(Debug, Deserialize)]
pub struct SnapConfig {
    /// Snap id. Routes are mounted under `/v1/<id>` and published events are
    /// owned by this id.
    #[serde(default = "default_snap_id")]
    pub id: String,
    #[serde(default = "default_snap_description")]
    pub description: String,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            id: default_snap_id(),
            description: default_snap_description(),
        }
    }
}

fn default_snap_id() -> String {
    "byosnap-rewards".to_owned()
}

fn default_snap_description() -> String {
    "Rewards players for playing".to_owned()
}
