//! API server entry point.

use api::{AppState, Config, Notifier};
use secrecy::ExposeSecret;
use storage::{DataStore, FallbackFlag, JsonFileStore, PostgresStore};
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
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

#[tokio::main]
async fn main() {
    // 1. Load configuration (.env first, if present)
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("invalid configuration");

    // 2. Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if config.uses_development_secret() {
        tracing::warn!("JWT_SECRET is not set, using the development secret");
    }

    // 3. Install Prometheus metrics recorder
    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // 4. Open the storage backends
    let local = JsonFileStore::with_bootstrap_admin(&config.local_data_dir, config.bootstrap_admin());
    let relational = match &config.database_url {
        Some(url) => {
            let pg = PostgresStore::connect(url.expose_secret(), config.database_max_connections)
                .await
                .expect("failed to connect to PostgreSQL");
            pg.run_migrations()
                .await
                .expect("failed to run database migrations");
            Some(pg)
        }
        None => None,
    };
    let store = DataStore::new(local, relational, FallbackFlag::new(config.force_local_store));
    tracing::info!(
        backend = store.backend().as_str(),
        data_dir = %config.local_data_dir.display(),
        "storage ready"
    );

    // 5. Build the application
    let notifier =
        Notifier::new(config.bot_webhook_url.clone()).expect("failed to build webhook client");
    let state = AppState::new(store, config.auth_config(), notifier);
    let app = api::create_app(state, metrics_handle, config.cors_allow_origin.as_deref());

    // 6. Start server
    let addr = config.addr();
    tracing::info!(%addr, "starting API server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("server shut down gracefully");
}
