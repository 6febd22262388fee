use std::future::IntoFuture;
use std::path::Path;
use std::time::Duration;

use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info, warn};

use byosnap_server::bootstrap::{Collaborators, bootstrap};
use byosnap_server::config::ByoSnapConfig;

/// BYOSnap HTTP server.
#[derive(Parser, Debug)]
#[command(name = "byosnap-server", about = "Gated user endpoints and event-bus webhook")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "byosnap.toml")]
    config: String,

    /// Override the bind host.
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = ByoSnapConfig::load(Path::new(&cli.config))?;
    config.apply_env_overrides(|name| std::env::var(name).ok());
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    let telemetry_guard = byosnap_server::telemetry::init(&config.telemetry, &config.snap.id);

    // Nothing binds until configuration and registration have succeeded.
    if let Err(e) = config.validate() {
        error!(error = %e, "invalid configuration");
        telemetry_guard.shutdown();
        return Err(e.into());
    }

    let collaborators = Collaborators::http(&config.collaborators)?;
    let state = match bootstrap(&config, collaborators).await {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "startup failed");
            telemetry_guard.shutdown();
            return Err(e.into());
        }
    };
    let base_path = state.settings.base_path();
    let app = byosnap_server::api::router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, base_path = %base_path, "byosnap-server listening");

    let (signalled_tx, signalled_rx) = watch::channel(false);
    let serve = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        let _ = signalled_tx.send(true);
    });

    let drain = Duration::from_secs(config.server.shutdown_timeout_seconds);
    tokio::select! {
        result = serve.into_future() => result?,
        () = drain_deadline(signalled_rx, drain) => {
            warn!(
                timeout_secs = config.server.shutdown_timeout_seconds,
                "shutdown timeout exceeded, dropping in-flight requests"
            );
        }
    }

    telemetry_guard.shutdown();
    info!("byosnap-server shut down");
    Ok(())
}

/// Resolves `timeout` after the shutdown signal fires.
async fn drain_deadline(mut signalled: watch::Receiver<bool>, timeout: Duration) {
    if signalled.wait_for(|fired| *fired).await.is_err() {
        std::future::pending::<()>().await;
    }
    tokio::time::sleep(timeout).await;
}

/// Wait for SIGINT (Ctrl+C) or SIGTERM, then return to trigger graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { info!("received SIGINT"); }
        () = terminate => { info!("received SIGTERM"); }
    }
}
