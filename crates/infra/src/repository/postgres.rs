//! Postgres-backed product repository.
//!
//! `insert` relies on the primary key for atomic duplicate detection;
//! `save` is an upsert used for updates.
//!
//! Expects a provisioned table:
//!
//! ```sql
//! CREATE TABLE products (
//!     barcode    TEXT PRIMARY KEY,
//!     name       TEXT NOT NULL,
//!     price      BIGINT NOT NULL,
//!     quantity   BIGINT NOT NULL,
//!     created_at TIMESTAMPTZ
//! );
//! ```

use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use stockroom_products::{Product, ProductRepository, RepositoryError};

/// Product repository on a SQLx connection pool (thread-safe, cheap to clone).
#[derive(Debug, Clone)]
pub struct PostgresProductRepository {
    pool: PgPool,
}

impl PostgresProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect a fresh pool to `database_url`.
    pub async fn connect(database_url: &str) -> Result<Self, RepositoryError> {
        let pool = PgPool::connect(database_url).await.map_err(storage)?;
        Ok(Self::new(pool))
    }
}

fn storage(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Storage(e.to_string())
}

fn to_column(value: u64, field: &str) -> Result<i64, RepositoryError> {
    i64::try_from(value).map_err(|_| RepositoryError::Storage(format!("{field} out of range: {value}")))
}

fn from_column<T: TryFrom<i64>>(value: i64, field: &str) -> Result<T, RepositoryError> {
    T::try_from(value).map_err(|_| RepositoryError::Storage(format!("{field} out of range: {value}")))
}

fn product_from_row(row: &PgRow) -> Result<Product, RepositoryError> {
    let price: i64 = row.try_get("price").map_err(storage)?;
    let quantity: i64 = row.try_get("quantity").map_err(storage)?;
    let created_at: Option<DateTime<Utc>> = row.try_get("created_at").map_err(storage)?;

    Ok(Product {
        barcode: row.try_get("barcode").map_err(storage)?,
        name: row.try_get("name").map_err(storage)?,
        price: from_column(price, "price")?,
        quantity: from_column(quantity, "quantity")?,
        created_at,
    })
}

#[async_trait::async_trait]
impl ProductRepository for PostgresProductRepository {
    async fn insert(&self, product: Product) -> Result<Product, RepositoryError> {
        let price = to_column(product.price, "price")?;
        let quantity = i64::from(product.quantity);

        let inserted = sqlx::query(
            r#"
            INSERT INTO products (barcode, name, price, quantity, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (barcode) DO NOTHING
            "#,
        )
        .bind(&product.barcode)
        .bind(&product.name)
        .bind(price)
        .bind(quantity)
        .bind(product.created_at)
        .execute(&self.pool)
        .await
        .map_err(storage)?
        .rows_affected();

        if inserted == 0 {
            return Err(RepositoryError::Duplicate(product.barcode));
        }

        tracing::debug!(barcode = %product.barcode, "product row inserted");
        Ok(product)
    }

    async fn save(&self, product: Product) -> Result<Product, RepositoryError> {
        let price = to_column(product.price, "price")?;
        let quantity = i64::from(product.quantity);

        sqlx::query(
            r#"
            INSERT INTO products (barcode, name, price, quantity, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (barcode) DO UPDATE SET
                name = EXCLUDED.name,
                price = EXCLUDED.price,
                quantity = EXCLUDED.quantity,
                created_at = EXCLUDED.created_at
            "#,
        )
        .bind(&product.barcode)
        .bind(&product.name)
        .bind(price)
        .bind(quantity)
        .bind(product.created_at)
        .execute(&self.pool)
        .await
        .map_err(storage)?;

        tracing::debug!(barcode = %product.barcode, "product row upserted");
        Ok(product)
    }

    async fn find_by_id(&self, barcode: &str) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query(
            "SELECT barcode, name, price, quantity, created_at FROM products WHERE barcode = $1",
        )
        .bind(barcode)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;

        row.as_ref().map(product_from_row).transpose()
    }

    async fn find_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT barcode, name, price, quantity, created_at
            FROM products
            ORDER BY created_at ASC NULLS FIRST, barcode ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;

        rows.iter().map(product_from_row).collect()
    }

    async fn delete_by_id(&self, barcode: &str) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM products WHERE barcode = $1")
            .bind(barcode)
            .execute(&self.pool)
            .await
            .map_err(storage)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_conversions_reject_overflow() {
        assert_eq!(to_column(1999, "price").unwrap(), 1999);
        assert!(to_column(u64::MAX, "price").is_err());

        assert_eq!(from_column::<u32>(10, "quantity").unwrap(), 10);
        assert!(from_column::<u32>(-1, "quantity").is_err());
        assert!(from_column::<u64>(-5, "price").is_err());
    }
}
