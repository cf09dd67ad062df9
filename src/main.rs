//! Application entry point.

use std::env;
use std::sync::Arc;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use secrecy::{ExposeSecret, SecretString};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use payroll_ledger::api::create_router;
use payroll_ledger::app::AppState;
use payroll_ledger::infra::{PostgresClient, PostgresConfig};

/// Application configuration
struct Config {
    database_url: SecretString,
    host: String,
    port: u16,
    db_max_connections: u32,
    run_migrations: bool,
}

impl Config {
    fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL")
            .map(SecretString::from)
            .context("DATABASE_URL not set")?;
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);
        let db_max_connections = env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);
        let run_migrations = env::var("RUN_MIGRATIONS")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(true);

        Ok(Self {
            database_url,
            host,
            port,
            db_max_connections,
            run_migrations,
        })
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug,sqlx=warn"));

    let registry = tracing_subscriber::registry().with(env_filter);
    if env::var("LOG_FORMAT").is_ok_and(|v| v == "json") {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
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
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    init_tracing();

    info!("Payroll ledger v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;

    let db_config = PostgresConfig {
        max_connections: config.db_max_connections,
        ..PostgresConfig::default()
    };
    let postgres_client = PostgresClient::new(config.database_url.expose_secret(), db_config)
        .await
        .context("Failed to connect to PostgreSQL")?;

    if config.run_migrations {
        postgres_client
            .run_migrations()
            .await
            .context("Failed to run migrations")?;
        info!("Database connected and migrations applied");
    } else {
        info!("Database connected, migrations skipped");
    }

    let app_state = Arc::new(AppState::new(Arc::new(postgres_client)));
    let router = create_router(app_state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Server starting on http://{}", addr);
    info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
