//! Butik Mas Anandia retention worker.
//!
//! Periodically deletes unpaid orders that sat past the retention window, so
//! abandoned checkouts do not pile up in the database.

#![forbid(unsafe_code)]

use std::env;
use std::sync::Arc;
use std::time::Duration;

use butik_application::CleanupService;
use butik_core::{AppError, AppResult};
use butik_infrastructure::{PostgresOrderRepository, SystemClock};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
struct WorkerConfig {
    database_url: String,
    max_age_hours: i64,
    interval_seconds: u64,
}

impl WorkerConfig {
    fn load() -> AppResult<Self> {
        let database_url = required_env("DATABASE_URL")?;
        let max_age_hours = parse_env_i64("CLEANUP_MAX_AGE_HOURS", 24)?;
        let interval_seconds = parse_env_u64("CLEANUP_INTERVAL_SECONDS", 3600)?;

        if max_age_hours <= 0 {
            return Err(AppError::Validation(
                "CLEANUP_MAX_AGE_HOURS must be greater than zero".to_owned(),
            ));
        }

        if interval_seconds == 0 {
            return Err(AppError::Validation(
                "CLEANUP_INTERVAL_SECONDS must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            database_url,
            max_age_hours,
            interval_seconds,
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = WorkerConfig::load()?;
    let pool = connect_pool(config.database_url.as_str()).await?;
    let cleanup_service = CleanupService::new(
        Arc::new(PostgresOrderRepository::new(pool)),
        Arc::new(SystemClock),
    );

    info!(
        max_age_hours = config.max_age_hours,
        interval_seconds = config.interval_seconds,
        "butik-worker started"
    );

    let max_age = chrono::Duration::hours(config.max_age_hours);
    let mut ticker = tokio::time::interval(Duration::from_secs(config.interval_seconds));

    loop {
        ticker.tick().await;

        match cleanup_service.purge_stale_orders(max_age).await {
            Ok(0) => {}
            Ok(purged) => info!(purged, "purged stale orders"),
            Err(error) => warn!(error = %error, "order purge failed"),
        }
    }
}

async fn connect_pool(database_url: &str) -> AppResult<PgPool> {
    PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> AppResult<String> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn parse_env_i64(name: &str, default: i64) -> AppResult<i64> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<i64>()
            .map_err(|error| AppError::Validation(format!("invalid {name}: {error}"))),
        Err(_) => Ok(default),
    }
}

fn parse_env_u64(name: &str, default: u64) -> AppResult<u64> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<u64>()
            .map_err(|error| AppError::Validation(format!("invalid {name}: {error}"))),
        Err(_) => Ok(default),
    }
}
