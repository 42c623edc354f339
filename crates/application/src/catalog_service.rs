//! Product catalog and gold-price administration.

use std::sync::Arc;

use butik_core::{AppError, AppResult};
use butik_domain::{GoldPrice, Product, ProductId, ProductInput};

use crate::ports::{GoldPriceRepository, ProductRepository};

/// CRUD over products and the gold-price board.
pub struct CatalogService {
    products: Arc<dyn ProductRepository>,
    gold_prices: Arc<dyn GoldPriceRepository>,
}

impl CatalogService {
    /// Creates the service.
    #[must_use]
    pub fn new(
        products: Arc<dyn ProductRepository>,
        gold_prices: Arc<dyn GoldPriceRepository>,
    ) -> Self {
        Self {
            products,
            gold_prices,
        }
    }

    /// Storefront product grid: active products only.
    pub async fn storefront_products(&self) -> AppResult<Vec<Product>> {
        self.products.list_active().await
    }

    /// Admin product list, inactive rows included.
    pub async fn all_products(&self) -> AppResult<Vec<Product>> {
        self.products.list_all().await
    }

    /// Creates a product after validating the input.
    pub async fn create_product(&self, input: ProductInput) -> AppResult<Product> {
        input.validate()?;
        let product = self.products.create(input).await?;
        tracing::info!(product_id = %product.id, name = %product.name, "produk dibuat");
        Ok(product)
    }

    /// Updates a product after validating the input.
    pub async fn update_product(&self, id: ProductId, input: ProductInput) -> AppResult<Product> {
        input.validate()?;
        self.products
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("produk tidak ditemukan".to_owned()))?;
        self.products.update(id, input).await
    }

    /// Deletes a product.
    pub async fn delete_product(&self, id: ProductId) -> AppResult<()> {
        self.products
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("produk tidak ditemukan".to_owned()))?;
        self.products.delete(id).await
    }

    /// Current gold buy/sell prices shown on the storefront banner.
    pub async fn gold_price(&self) -> AppResult<Option<GoldPrice>> {
        self.gold_prices.get().await
    }

    /// Replaces the gold prices. Both values must be positive.
    pub async fn set_gold_price(&self, buy_price: i64, sell_price: i64) -> AppResult<GoldPrice> {
        if buy_price <= 0 || sell_price <= 0 {
            return Err(AppError::Validation(
                "Harga emas harus lebih dari nol".to_owned(),
            ));
        }
        self.gold_prices.upsert(buy_price, sell_price).await
    }
}
