//! Catalog entities: bullion products and the gold price board.

use butik_core::{AppError, AppResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a product row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(Uuid);

impl ProductId {
    /// Creates a new random product identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a product identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ProductId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// A bullion product offered on the storefront.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Row identifier.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Weight label, e.g. "1 gram".
    pub weight: String,
    /// Price in rupiah.
    pub price: i64,
    /// Public image URL, if set.
    pub image_url: Option<String>,
    /// Position in the storefront grid.
    pub sort_order: i32,
    /// Whether the product is purchasable.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Validated input for creating or updating a product.
#[derive(Debug, Clone)]
pub struct ProductInput {
    /// Display name.
    pub name: String,
    /// Weight label.
    pub weight: String,
    /// Price in rupiah.
    pub price: i64,
    /// Public image URL, if any.
    pub image_url: Option<String>,
    /// Grid position.
    pub sort_order: i32,
    /// Purchasable flag.
    pub is_active: bool,
}

impl ProductInput {
    /// Validates catalog input before it reaches the repository.
    pub fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation(
                "product name must not be empty".to_owned(),
            ));
        }
        if self.weight.trim().is_empty() {
            return Err(AppError::Validation(
                "product weight must not be empty".to_owned(),
            ));
        }
        if self.price <= 0 {
            return Err(AppError::Validation(
                "product price must be positive".to_owned(),
            ));
        }

        Ok(())
    }
}

/// Current buy/sell gold price per gram.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoldPrice {
    /// Storefront buy price per gram in rupiah.
    pub buy_price: i64,
    /// Storefront sell price per gram in rupiah.
    pub sell_price: i64,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::ProductInput;

    #[test]
    fn product_input_requires_positive_price() {
        let input = ProductInput {
            name: "Emas Batangan".to_owned(),
            weight: "1 gram".to_owned(),
            price: 0,
            image_url: None,
            sort_order: 1,
            is_active: true,
        };
        assert!(input.validate().is_err());
    }
}
