//! cellprobe exporter
//!
//! Polls each configured modem's serving-cell report and serves the values
//! on `/metrics`.
//!
//! Config path: first argument, else `CELLPROBE_CONFIG`, else `cellprobe.yaml`.

use std::process::ExitCode;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cellprobe_core::error::{CellProbeError, Result};
use cellprobe_exporter::{app_state::AppState, config, modem::HttpCellSource, router};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, kind = e.kind().as_str(), "cellprobe-exporter stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let path = config::resolve_path(std::env::args().nth(1));
    let cfg = config::load_from_file(&path)?;
    let listen = cfg.exporter.listen_addr()?;

    let source = HttpCellSource::new(
        cfg.poller.request_timeout(),
        cfg.poller.record_http_timing,
    )?;

    let state = AppState::new(cfg);
    let poller = state.poller(Arc::new(source));
    tokio::spawn(poller.run());

    let app = router::build_router(state);

    tracing::info!(%listen, config = %path, "cellprobe-exporter starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| CellProbeError::Internal(format!("bind {listen} failed: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| CellProbeError::Internal(format!("server failed: {e}")))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
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
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("signal received, starting graceful shutdown");
}
