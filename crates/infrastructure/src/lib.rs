//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod argon2_password_hasher;
mod emsifa_region_directory;
mod postgres_admin_account_repository;
mod postgres_gold_price_repository;
mod postgres_order_repository;
mod postgres_product_repository;
mod supabase_object_storage;
mod system_clock;
mod telegram_messenger;

pub use argon2_password_hasher::Argon2PasswordHasher;
pub use emsifa_region_directory::EmsifaRegionDirectory;
pub use postgres_admin_account_repository::PostgresAdminAccountRepository;
pub use postgres_gold_price_repository::PostgresGoldPriceRepository;
pub use postgres_order_repository::PostgresOrderRepository;
pub use postgres_product_repository::PostgresProductRepository;
pub use supabase_object_storage::SupabaseObjectStorage;
pub use system_clock::SystemClock;
pub use telegram_messenger::TelegramMessenger;
