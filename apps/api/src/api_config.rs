use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use butik_core::AppError;
use tracing_subscriber::EnvFilter;

const DEFAULT_WILAYAH_API_URL: &str = "https://www.emsifa.com/api-wilayah-indonesia/api";

/// Runtime configuration for the API binary, read from the environment at
/// startup.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: String,
    pub frontend_url: String,
    pub admin_setup_key: String,
    pub storage_url: String,
    pub storage_service_key: String,
    pub telegram_bot_token: String,
    pub telegram_chat_id: String,
    pub wilayah_api_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub cookie_secure: bool,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

        let database_url = required_env("DATABASE_URL")?;
        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());
        let admin_setup_key = required_env("ADMIN_SETUP_KEY")?;
        let storage_url = required_env("SUPABASE_STORAGE_URL")?;
        let storage_service_key = required_env("SUPABASE_SERVICE_KEY")?;
        let telegram_bot_token = required_env("TELEGRAM_BOT_TOKEN")?;
        let telegram_chat_id = required_env("TELEGRAM_CHAT_ID")?;
        let wilayah_api_url =
            env::var("WILAYAH_API_URL").unwrap_or_else(|_| DEFAULT_WILAYAH_API_URL.to_owned());

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);
        let cookie_secure = env::var("SESSION_COOKIE_SECURE")
            .unwrap_or_else(|_| "false".to_owned())
            .eq_ignore_ascii_case("true");

        Ok(Self {
            migrate_only,
            database_url,
            frontend_url,
            admin_setup_key,
            storage_url,
            storage_service_key,
            telegram_bot_token,
            telegram_chat_id,
            wilayah_api_url,
            api_host,
            api_port,
            cookie_secure,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}
