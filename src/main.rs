//! Application entry point for follow-api.
//!
//! Initializes all components and starts the HTTP server.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use dotenv::dotenv;
use follow_api::config::Config;
use follow_api::logging::setup_logging;
use follow_api::repository::Repository;
use follow_api::server;
use follow_api::server::state::AppState;
use follow_api::service::Services;
use follow_api::task::health_monitor::HealthMonitor;
use follow_api::upstream::mailer::HttpMailer;
use follow_api::upstream::session_api::HttpSessionApi;
use log::debug;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let init_start = Instant::now();
    let mut config = Config::new();
    config.load()?;
    let config = Arc::new(config);
    let _log_guard = setup_logging(&config)?;
    info!("Starting follow-api...");

    let db = setup_database(&config, init_start).await?;
    let services = setup_services(&config, db.clone())?;

    HealthMonitor::new(services.health.clone(), config.health_check_interval)
        .start()
        .await;

    info!(
        "follow-api is up in {:.2}s.",
        init_start.elapsed().as_secs_f64()
    );
    server::serve(AppState::new(config, services)).await?;

    db.close().await;
    Ok(())
}

async fn setup_database(config: &Config, init_start: Instant) -> Result<Arc<Repository>> {
    debug!("Setting up Repository...");
    let db = Arc::new(Repository::new(&config.db_url, &config.db_path).await?);

    info!("Running database migrations...");
    db.run_migrations().await?;
    info!(
        "Database setup complete ({:.2}s).",
        init_start.elapsed().as_secs_f64()
    );

    Ok(db)
}

fn setup_services(config: &Config, db: Arc<Repository>) -> Result<Arc<Services>> {
    debug!("Setting up Services...");
    let session_api = Arc::new(HttpSessionApi::new(
        &config.session_api_url,
        config.session_api_key.clone(),
    )?);
    let mailer = Arc::new(HttpMailer::new(
        &config.mailer_api_url,
        config.mailer_api_key.clone(),
    )?);

    Ok(Arc::new(Services::new(db, session_api, mailer, config)?))
}
