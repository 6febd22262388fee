//! Global `tracing` subscriber: `RUST_LOG`-filtered fmt output, plus span
//! export over OTLP when `[telemetry]` is enabled.

use opentelemetry::global;
use opentelemetry::trace::{TraceError, TracerProvider};
use opentelemetry_otlp::{SpanExporter, WithExportConfig};
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::trace::{BatchSpanProcessor, SdkTracerProvider};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{ExportProtocol, TelemetryConfig};

/// Keeps the tracer provider alive. [`TelemetryGuard::shutdown`] flushes
/// spans still buffered in the batch processor.
pub struct TelemetryGuard {
    provider: Option<SdkTracerProvider>,
}

impl TelemetryGuard {
    pub fn shutdown(mut self) {
        if let Some(provider) = self.provider.take()
            && let Err(e) = provider.shutdown()
        {
            warn!(error = %e, "tracer provider shutdown failed");
        }
    }
}

/// Install the global subscriber for `snap_id`.
///
/// An exporter that cannot be built leaves the process on fmt output only.
pub fn init(config: &TelemetryConfig, snap_id: &str) -> TelemetryGuard {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let exported = if config.enabled {
        Some(tracer_provider(config, snap_id))
    } else {
        None
    };
    let provider = exported.as_ref().and_then(|p| p.as_ref().ok()).cloned();
    let otel_layer = provider
        .as_ref()
        .map(|p| tracing_opentelemetry::layer().with_tracer(p.tracer("byosnap")));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(otel_layer)
        .init();

    match exported {
        Some(Ok(provider)) => {
            global::set_tracer_provider(provider);
            info!(
                endpoint = %config.endpoint,
                protocol = ?config.protocol,
                sample_ratio = config.sample_ratio,
                "span export enabled"
            );
        }
        Some(Err(e)) => error!(
            error = %e,
            endpoint = %config.endpoint,
            protocol = ?config.protocol,
            "failed to build OTLP exporter, continuing with log output only"
        ),
        None => {}
    }

    TelemetryGuard { provider }
}

fn tracer_provider(
    config: &TelemetryConfig,
    snap_id: &str,
) -> Result<SdkTracerProvider, TraceError> {
    let exporter = match config.protocol {
        ExportProtocol::Grpc => SpanExporter::builder()
            .with_tonic()
            .with_endpoint(&config.endpoint)
            .with_timeout(config.export_timeout())
            .build()?,
        ExportProtocol::Http => SpanExporter::builder()
            .with_http()
            .with_endpoint(&config.endpoint)
            .with_timeout(config.export_timeout())
            .build()?,
    };

    Ok(SdkTracerProvider::builder()
        .with_span_processor(BatchSpanProcessor::builder(exporter).build())
        .with_sampler(config.sampler())
        .with_resource(
            Resource::builder()
                .with_attributes(config.resource_attributes(snap_id))
                .build(),
        )
        .build())
}
