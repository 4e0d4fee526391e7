mod app;
mod config;
mod routes;
mod state;

use tokio::signal;
use tracing_subscriber::EnvFilter;

use crate::state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let catalog_path = config::catalog_path();
    let catalog = match state::load_catalog(&catalog_path).await {
        Ok(catalog) => catalog,
        Err(e) => {
            tracing::error!(error = %e, "failed to load city catalog");
            return;
        }
    };
    tracing::info!(
        cities = catalog.len(),
        default_city = %catalog.first().internal_id,
        path = %catalog_path.display(),
        "City catalog loaded"
    );

    let state = match AppState::new(catalog) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %e, "failed to prepare city catalog");
            return;
        }
    };

    let static_dir = config::static_dir();
    if !static_dir.is_dir() {
        tracing::warn!(path = %static_dir.display(), "static client directory not found");
    }
    let app = app::build_app(state, static_dir);

    let addr = format!("0.0.0.0:{}", config::server_port());
    tracing::info!("City map server listening on {addr}");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, %addr, "failed to bind TCP listener");
            return;
        }
    };
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "server failed");
    }

    tracing::info!("Server shut down gracefully");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        let mut sigterm = match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                return;
            }
        };
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
