use std::collections::BTreeMap;
use std::time::Duration;

use opentelemetry::KeyValue;
use opentelemetry_sdk::trace::Sampler;
use serde::Deserialize;

use crate::error::ServerError;

/// OTLP transport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportProtocol {
    #[default]
    Grpc,
    Http,
}

/// `[telemetry]`: span export to an OTLP collector.
///
/// Disabled by default; logs always go to stdout through the fmt layer.
///
/// ```toml
/// [telemetry]
/// enabled = true
/// endpoint = "http://otel-collector:4317"
/// protocol = "grpc"
/// sample_ratio = 0.5
///
/// [telemetry.resource_attributes]
/// "deployment.environment" = "staging"
/// ```
#[derive(Debug, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Reported `service.name`. Defaults to the snap id.
    #[serde(default)]
    pub service_name: Option<String>,
    /// Fraction of traces kept, from 0.0 to 1.0.
    #[serde(default = "default_sample_ratio")]
    pub sample_ratio: f64,
    #[serde(default)]
    pub protocol: ExportProtocol,
    #[serde(default = "default_export_timeout")]
    pub timeout_seconds: u64,
    #[serde(default)]
    pub resource_attributes: BTreeMap<String, String>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_endpoint(),
            service_name: None,
            sample_ratio: default_sample_ratio(),
            protocol: ExportProtocol::default(),
            timeout_seconds: default_export_timeout(),
            resource_attributes: BTreeMap::new(),
        }
    }
}

impl TelemetryConfig {
    pub fn validate(&self) -> Result<(), ServerError> {
        if !(0.0..=1.0).contains(&self.sample_ratio) {
            return Err(ServerError::Config(format!(
                "telemetry.sample_ratio must be between 0.0 and 1.0, got {}",
                self.sample_ratio
            )));
        }
        if self.enabled && self.endpoint.trim().is_empty() {
            return Err(ServerError::Config(
                "telemetry.endpoint is required when telemetry is enabled".into(),
            ));
        }
        Ok(())
    }

    pub fn export_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn sampler(&self) -> Sampler {
        if self.sample_ratio >= 1.0 {
            Sampler::AlwaysOn
        } else if self.sample_ratio <= 0.0 {
            Sampler::AlwaysOff
        } else {
            Sampler::TraceIdRatioBased(self.sample_ratio)
        }
    }

    /// Resource attributes for spans exported by `snap_id`. Configured
    /// attributes come last and win on key collisions.
    pub fn resource_attributes(&self, snap_id: &str) -> Vec<KeyValue> {
        let service_name = self
            .service_name
            .clone()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| snap_id.to_owned());
        [
            KeyValue::new("service.name", service_name),
            KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
            KeyValue::new("byosnap.id", snap_id.to_owned()),
        ]
        .into_iter()
        .chain(
            self.resource_attributes
                .iter()
                .map(|(k, v)| KeyValue::new(k.clone(), v.clone())),
        )
        .collect()
    }
}

fn default_endpoint() -> String {
    "http://localhost:4317".to_owned()
}

fn default_sample_ratio() -> f64 {
    1.0
}

fn default_export_timeout() -> u64 {
    10
}
