//! API server entry point.

use std::process::ExitCode;
use std::sync::Arc;

use api::config::Config;
use api::error::StartupError;
use api::{DynBooking, DynStorage};
use checkout::{HttpBookingService, InMemoryBookingService};
use common::NotificationCenter;
use storage::{FileKeyValueStore, InMemoryKeyValueStore};
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
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
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

fn open_storage(config: &Config) -> Result<DynStorage, StartupError> {
    match &config.data_dir {
        Some(dir) => {
            let store = FileKeyValueStore::open_in_dir(dir)?;
            tracing::info!(path = %store.path().display(), "using file storage");
            Ok(Arc::new(store))
        }
        None => {
            tracing::info!("using in-memory storage; state is lost on shutdown");
            Ok(Arc::new(InMemoryKeyValueStore::new()))
        }
    }
}

fn booking_service(config: &Config) -> DynBooking {
    match &config.backend_url {
        Some(url) => {
            tracing::info!(backend_url = %url, "booking against backend");
            Arc::new(HttpBookingService::new(url.as_str()))
        }
        None => {
            tracing::warn!("BACKEND_URL is empty, booking offline with in-memory tickets");
            Arc::new(InMemoryBookingService::new())
        }
    }
}

async fn serve(config: Config) -> Result<(), StartupError> {
    // 1. Install Prometheus metrics recorder
    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder()?;

    // 2. Wire storage, session, cart and checkout
    let storage = open_storage(&config)?;
    let booking = booking_service(&config);
    let notices = NotificationCenter::with_ttl(config.notice_ttl);
    let state = api::create_state(storage, booking, notices);
    tracing::info!(entries = state.cart().len(), "cart restored");

    // 3. Build the application
    let app = api::create_app(state, metrics_handle);

    // 4. Start server
    let addr = config.addr();
    tracing::info!(%addr, "starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server shut down gracefully");
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match serve(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "server failed");
            ExitCode::FAILURE
        }
    }
}
