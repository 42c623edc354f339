//! PostgreSQL-backed product repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use butik_application::ProductRepository;
use butik_core::{AppError, AppResult};
use butik_domain::{Product, ProductId, ProductInput};

/// PostgreSQL implementation of the product repository port.
#[derive(Clone)]
pub struct PostgresProductRepository {
    pool: PgPool,
}

impl PostgresProductRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: uuid::Uuid,
    name: String,
    weight: String,
    price: i64,
    image_url: Option<String>,
    sort_order: i32,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::from_uuid(row.id),
            name: row.name,
            weight: row.weight,
            price: row.price,
            image_url: row.image_url,
            sort_order: row.sort_order,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

const PRODUCT_COLUMNS: &str =
    "id, name, weight, price, image_url, sort_order, is_active, created_at";

#[async_trait]
impl ProductRepository for PostgresProductRepository {
    async fn list_active(&self) -> AppResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE is_active
            ORDER BY sort_order, created_at
            "
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list active products: {error}")))?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn list_all(&self) -> AppResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY sort_order, created_at"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list products: {error}")))?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn find_by_id(&self, id: ProductId) -> AppResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1 LIMIT 1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find product: {error}")))?;

        Ok(row.map(Product::from))
    }

    async fn create(&self, input: ProductInput) -> AppResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            INSERT INTO products (id, name, weight, price, image_url, sort_order, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(ProductId::new().as_uuid())
        .bind(&input.name)
        .bind(&input.weight)
        .bind(input.price)
        .bind(&input.image_url)
        .bind(input.sort_order)
        .bind(input.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to create product: {error}")))?;

        Ok(Product::from(row))
    }

    async fn update(&self, id: ProductId, input: ProductInput) -> AppResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            UPDATE products
            SET name = $2, weight = $3, price = $4, image_url = $5,
                sort_order = $6, is_active = $7
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(id.as_uuid())
        .bind(&input.name)
        .bind(&input.weight)
        .bind(input.price)
        .bind(&input.image_url)
        .bind(input.sort_order)
        .bind(input.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update product: {error}")))?
        .ok_or_else(|| AppError::NotFound("produk tidak ditemukan".to_owned()))?;

        Ok(Product::from(row))
    }

    async fn delete(&self, id: ProductId) -> AppResult<()> {
        sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to delete product: {error}")))?;

        Ok(())
    }
}
