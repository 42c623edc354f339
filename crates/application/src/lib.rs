//! Application services and ports for the Butik Emas backend.

#![forbid(unsafe_code)]

/// Abuse gate composing fingerprinting, bot scoring, and keyed limiters.
pub mod abuse_control_service;
/// One-time admin bootstrap and session login.
pub mod admin_account_service;
/// Admin console order listing, stats, and status transitions.
pub mod admin_order_service;
/// Product and gold-price administration.
pub mod catalog_service;
/// Checkout wizard sessions and the terminal submission pipeline.
pub mod checkout_service;
/// Stale-order retention purge.
pub mod cleanup_service;
/// Wall-clock port.
pub mod clock;
/// Admin alerts and buyer-facing status messages.
pub mod notification_service;
/// Buyer self-service order lookup and confirmation.
pub mod order_tracking_service;
/// Repository and collaborator ports.
pub mod ports;
/// Sliding-window keyed rate limiting.
pub mod rate_limit_service;

pub use abuse_control_service::AbuseControlService;
pub use admin_account_service::AdminAccountService;
pub use admin_order_service::{AdminOrderService, OrderQuery, OrderStats, StatusUpdateOutcome};
pub use catalog_service::CatalogService;
pub use checkout_service::{
    CheckoutService, FormUpdate, RegionLevel, SessionId, StepOutcome, SubmittedOrder,
};
pub use cleanup_service::CleanupService;
pub use clock::Clock;
pub use notification_service::NotificationService;
pub use order_tracking_service::OrderTrackingService;
pub use ports::{
    AdminAccount, AdminAccountRepository, AdminMessenger, GoldPriceRepository, NewOrder,
    ObjectStorage, OrderRepository, PasswordHasher, ProductRepository, Region, RegionDirectory,
    buckets,
};
pub use rate_limit_service::{Admission, RateLimiter, format_time_remaining};
