//! Butik Mas Anandia API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod auth;
mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post, put};
use butik_application::{
    AbuseControlService, AdminAccountService, AdminOrderService, CatalogService, CheckoutService,
    NotificationService, OrderTrackingService, RateLimiter,
};
use butik_core::AppError;
use butik_domain::MAX_PROOF_BYTES;
use butik_infrastructure::{
    Argon2PasswordHasher, EmsifaRegionDirectory, PostgresAdminAccountRepository,
    PostgresGoldPriceRepository, PostgresOrderRepository, PostgresProductRepository,
    SupabaseObjectStorage, SystemClock, TelegramMessenger,
};
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tower_sessions::cookie::SameSite;
use tower_sessions::cookie::time::Duration as CookieDuration;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;
use tracing::{info, warn};

use crate::api_config::{ApiConfig, init_tracing};
use crate::state::AppState;

/// How often stale rate-limit entries are swept out of memory.
const SWEEP_INTERVAL_SECONDS: u64 = 5 * 60;

/// Body cap for the payment-proof upload: the largest accepted image plus
/// a megabyte of headroom for multipart framing and the other form fields.
const PROOF_UPLOAD_LIMIT_BYTES: usize = MAX_PROOF_BYTES + 1024 * 1024;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;
    let address = config.socket_address()?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))?;

    sqlx::migrate!("../../crates/infrastructure/migrations")
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;

    if config.migrate_only {
        info!("database migrations applied successfully");
        return Ok(());
    }

    let session_store = PostgresStore::new(pool.clone())
        .with_table_name("tower_sessions")
        .map_err(|error| {
            AppError::Validation(format!("invalid session table name configuration: {error}"))
        })?;
    session_store.migrate().await.map_err(|error| {
        AppError::Internal(format!("failed to initialize session store: {error}"))
    })?;

    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(config.cookie_secure)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_expiry(Expiry::OnInactivity(CookieDuration::minutes(30)));

    let clock = Arc::new(SystemClock);
    let http_client = reqwest::Client::new();

    let order_repository = Arc::new(PostgresOrderRepository::new(pool.clone()));
    let product_repository = Arc::new(PostgresProductRepository::new(pool.clone()));
    let gold_price_repository = Arc::new(PostgresGoldPriceRepository::new(pool.clone()));
    let admin_account_repository = Arc::new(PostgresAdminAccountRepository::new(pool.clone()));

    let object_storage = Arc::new(SupabaseObjectStorage::new(
        http_client.clone(),
        config.storage_url,
        config.storage_service_key,
    ));
    let messenger = Arc::new(TelegramMessenger::new(
        http_client.clone(),
        config.telegram_bot_token,
        config.telegram_chat_id,
    ));
    let region_directory = Arc::new(EmsifaRegionDirectory::new(http_client, config.wilayah_api_url));

    let abuse_control_service = Arc::new(AbuseControlService::new(clock.clone()));
    let notification_service = Arc::new(NotificationService::new(messenger, clock.clone()));

    let checkout_service = Arc::new(CheckoutService::new(
        product_repository.clone(),
        order_repository.clone(),
        object_storage.clone(),
        abuse_control_service.clone(),
        notification_service,
    ));
    let order_tracking_service = Arc::new(OrderTrackingService::new(order_repository.clone()));
    let admin_order_service = Arc::new(AdminOrderService::new(order_repository, object_storage));
    let catalog_service = Arc::new(CatalogService::new(
        product_repository,
        gold_price_repository,
    ));
    let admin_account_service = Arc::new(AdminAccountService::new(
        admin_account_repository,
        Arc::new(Argon2PasswordHasher::new()),
        config.admin_setup_key,
    ));

    // Login throttle: 10 attempts per IP per 15 minutes.
    let login_limiter = Arc::new(RateLimiter::new(
        10,
        chrono::Duration::minutes(15),
        chrono::Duration::minutes(15),
        clock,
    ));

    let app_state = AppState {
        checkout_service,
        order_tracking_service,
        admin_order_service,
        catalog_service,
        admin_account_service,
        region_directory,
        login_limiter: login_limiter.clone(),
        frontend_url: config.frontend_url.clone(),
    };

    spawn_sweeper(abuse_control_service, login_limiter);

    let cors_layer = CorsLayer::new()
        .allow_origin(
            HeaderValue::from_str(&config.frontend_url)
                .map_err(|error| AppError::Internal(format!("invalid FRONTEND_URL: {error}")))?,
        )
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE]);

    let admin_routes = Router::new()
        .route(
            "/api/admin/orders",
            get(handlers::admin_orders::list_orders_handler),
        )
        .route(
            "/api/admin/orders/stats",
            get(handlers::admin_orders::order_stats_handler),
        )
        .route(
            "/api/admin/orders/{order_id}/status",
            put(handlers::admin_orders::update_status_handler),
        )
        .route(
            "/api/admin/orders/{order_id}/proof-url",
            get(handlers::admin_orders::proof_url_handler),
        )
        .route(
            "/api/admin/products",
            get(handlers::catalog::admin_list_products_handler)
                .post(handlers::catalog::create_product_handler),
        )
        .route(
            "/api/admin/products/{product_id}",
            put(handlers::catalog::update_product_handler)
                .delete(handlers::catalog::delete_product_handler),
        )
        .route(
            "/api/admin/gold-prices",
            put(handlers::catalog::set_gold_price_handler),
        )
        .route_layer(from_fn(middleware::require_admin));

    let checkout_routes = Router::new()
        .route(
            "/api/checkout/sessions",
            post(handlers::checkout::start_session_handler),
        )
        .route(
            "/api/checkout/sessions/{session_id}",
            get(handlers::checkout::session_handler).delete(handlers::checkout::abandon_handler),
        )
        .route(
            "/api/checkout/sessions/{session_id}/form",
            put(handlers::checkout::update_form_handler),
        )
        .route(
            "/api/checkout/sessions/{session_id}/region",
            put(handlers::checkout::select_region_handler),
        )
        .route(
            "/api/checkout/sessions/{session_id}/advance",
            post(handlers::checkout::advance_handler),
        )
        .route(
            "/api/checkout/sessions/{session_id}/back",
            post(handlers::checkout::back_handler),
        )
        .route(
            "/api/checkout/sessions/{session_id}/submit",
            post(handlers::checkout::submit_handler)
                .layer(DefaultBodyLimit::max(PROOF_UPLOAD_LIMIT_BYTES)),
        );

    let app = Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route("/api/products", get(handlers::catalog::list_products_handler))
        .route("/api/gold-prices", get(handlers::catalog::gold_price_handler))
        .route(
            "/api/shipping-options",
            get(handlers::catalog::shipping_options_handler),
        )
        .route(
            "/api/regions/provinces",
            get(handlers::regions::provinces_handler),
        )
        .route(
            "/api/regions/regencies/{province_id}",
            get(handlers::regions::regencies_handler),
        )
        .route(
            "/api/regions/districts/{regency_id}",
            get(handlers::regions::districts_handler),
        )
        .route(
            "/api/regions/villages/{district_id}",
            get(handlers::regions::villages_handler),
        )
        .merge(checkout_routes)
        .route(
            "/api/orders/{order_number}",
            get(handlers::orders::track_order_handler),
        )
        .route(
            "/api/orders/{order_number}/confirm",
            post(handlers::orders::confirm_order_handler),
        )
        .route("/auth/setup", post(auth::setup_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .route("/auth/me", get(auth::me_handler))
        .merge(admin_routes)
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_same_origin_for_mutations,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .layer(session_layer)
        .with_state(app_state);

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "butik-api listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}

/// Periodically drops idle rate-limit windows so memory stays bounded.
fn spawn_sweeper(abuse: Arc<AbuseControlService>, login_limiter: Arc<RateLimiter>) {
    tokio::spawn(async move {
        let mut ticker =
            tokio::time::interval(std::time::Duration::from_secs(SWEEP_INTERVAL_SECONDS));
        ticker.tick().await;

        loop {
            ticker.tick().await;

            match abuse.sweep() {
                Ok(removed) if removed > 0 => info!(removed, "swept stale abuse entries"),
                Ok(_) => {}
                Err(error) => warn!(%error, "abuse sweep failed"),
            }
            match login_limiter.sweep() {
                Ok(removed) if removed > 0 => info!(removed, "swept stale login entries"),
                Ok(_) => {}
                Err(error) => warn!(%error, "login sweep failed"),
            }
        }
    });
}
