use std::sync::Arc;

use butik_application::{
    AdminAccountService, AdminOrderService, CatalogService, CheckoutService,
    OrderTrackingService, RateLimiter, RegionDirectory,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub checkout_service: Arc<CheckoutService>,
    pub order_tracking_service: Arc<OrderTrackingService>,
    pub admin_order_service: Arc<AdminOrderService>,
    pub catalog_service: Arc<CatalogService>,
    pub admin_account_service: Arc<AdminAccountService>,
    pub region_directory: Arc<dyn RegionDirectory>,
    /// Per-IP limiter over admin login attempts.
    pub login_limiter: Arc<RateLimiter>,
    pub frontend_url: String,
}
