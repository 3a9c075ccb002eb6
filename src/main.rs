
use agora::config::AppConfig;
use agora::util::common::load_dotenv;
use agora::{create_app, AppState};
use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or(format!("{}=debug", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    config.validate_config()?;
    debug!("Config:\n {:#?}", config);

    let app_state = AppState::new(config).await?;
    let config = app_state.config.clone();

    // This integrates database migrations into the application binary
    // to ensure the database is properly migrated during startup.
    let db = app_state.db.clone();
    if config.db.auto_migrate {
        debug!("Migrating database...");
        db.migrate().await.context("Cannot migrate database")?;
    }

    if let Err(e) = app_state.rd.ping().await {
        warn!("Redis is not reachable, logins will fail: {:?}", e);
    }

    let addr = format!("{}:{}", &config.http.ip, &config.http.port);
    let app = create_app(app_state);
    let listener = TcpListener::bind(&addr).await?;
    info!("{} {} listening on {}", config.app_name, config.app_version, addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down, closing database pool");
    db.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Cannot listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
