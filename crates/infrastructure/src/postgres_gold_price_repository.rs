//! PostgreSQL-backed gold price repository.
//!
//! The table holds a single row, keyed by a constant, so the current prices
//! are always one upsert away.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use butik_application::GoldPriceRepository;
use butik_core::{AppError, AppResult};
use butik_domain::GoldPrice;

/// PostgreSQL implementation of the gold price repository port.
#[derive(Clone)]
pub struct PostgresGoldPriceRepository {
    pool: PgPool,
}

impl PostgresGoldPriceRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct GoldPriceRow {
    buy_price: i64,
    sell_price: i64,
    updated_at: DateTime<Utc>,
}

impl From<GoldPriceRow> for GoldPrice {
    fn from(row: GoldPriceRow) -> Self {
        Self {
            buy_price: row.buy_price,
            sell_price: row.sell_price,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl GoldPriceRepository for PostgresGoldPriceRepository {
    async fn get(&self) -> AppResult<Option<GoldPrice>> {
        let row = sqlx::query_as::<_, GoldPriceRow>(
            "SELECT buy_price, sell_price, updated_at FROM gold_prices WHERE singleton LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read gold prices: {error}")))?;

        Ok(row.map(GoldPrice::from))
    }

    async fn upsert(&self, buy_price: i64, sell_price: i64) -> AppResult<GoldPrice> {
        let row = sqlx::query_as::<_, GoldPriceRow>(
            r"
            INSERT INTO gold_prices (singleton, buy_price, sell_price, updated_at)
            VALUES (TRUE, $1, $2, NOW())
            ON CONFLICT (singleton)
            DO UPDATE SET buy_price = $1, sell_price = $2, updated_at = NOW()
            RETURNING buy_price, sell_price, updated_at
            ",
        )
        .bind(buy_price)
        .bind(sell_price)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to upsert gold prices: {error}")))?;

        Ok(GoldPrice::from(row))
    }
}
