//! Product persistence contract.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, RwLock};

use thiserror::Error;

use stockroom_core::{DomainError, Entity};

use crate::Product;

#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Internal lock poisoning (in-memory store).
    #[error("repository lock poisoned")]
    Poisoned,

    /// `insert` found the barcode already taken.
    #[error("product {0} already exists")]
    Duplicate(String),

    /// Backing store failure.
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<RepositoryError> for DomainError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Duplicate(barcode) => DomainError::duplicate_resource(&barcode),
            other => DomainError::internal(other.to_string()),
        }
    }
}

/// Keyed product storage, keyed by barcode.
#[async_trait::async_trait]
pub trait ProductRepository: Send + Sync {
    /// Store a product whose barcode is not taken yet.
    ///
    /// Atomic: of two concurrent inserts for one barcode exactly one succeeds,
    /// the other fails with [`RepositoryError::Duplicate`].
    async fn insert(&self, product: Product) -> Result<Product, RepositoryError>;

    /// Insert or replace.
    async fn save(&self, product: Product) -> Result<Product, RepositoryError>;

    async fn find_by_id(&self, barcode: &str) -> Result<Option<Product>, RepositoryError>;

    /// All products, oldest first (ties broken by barcode).
    async fn find_all(&self) -> Result<Vec<Product>, RepositoryError>;

    /// Remove a product; unknown barcodes are a no-op.
    async fn delete_by_id(&self, barcode: &str) -> Result<(), RepositoryError>;
}

#[async_trait::async_trait]
impl<R> ProductRepository for Arc<R>
where
    R: ProductRepository + ?Sized,
{
    async fn insert(&self, product: Product) -> Result<Product, RepositoryError> {
        (**self).insert(product).await
    }

    async fn save(&self, product: Product) -> Result<Product, RepositoryError> {
        (**self).save(product).await
    }

    async fn find_by_id(&self, barcode: &str) -> Result<Option<Product>, RepositoryError> {
        (**self).find_by_id(barcode).await
    }

    async fn find_all(&self) -> Result<Vec<Product>, RepositoryError> {
        (**self).find_all().await
    }

    async fn delete_by_id(&self, barcode: &str) -> Result<(), RepositoryError> {
        (**self).delete_by_id(barcode).await
    }
}

/// In-memory repository for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryProductRepository {
    inner: RwLock<HashMap<String, Product>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn insert(&self, product: Product) -> Result<Product, RepositoryError> {
        let mut map = self.inner.write().map_err(|_| RepositoryError::Poisoned)?;
        match map.entry(product.id().clone()) {
            Entry::Occupied(_) => Err(RepositoryError::Duplicate(product.barcode)),
            Entry::Vacant(slot) => Ok(slot.insert(product).clone()),
        }
    }

    async fn save(&self, product: Product) -> Result<Product, RepositoryError> {
        let mut map = self.inner.write().map_err(|_| RepositoryError::Poisoned)?;
        map.insert(product.id().clone(), product.clone());
        Ok(product)
    }

    async fn find_by_id(&self, barcode: &str) -> Result<Option<Product>, RepositoryError> {
        let map = self.inner.read().map_err(|_| RepositoryError::Poisoned)?;
        Ok(map.get(barcode).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let map = self.inner.read().map_err(|_| RepositoryError::Poisoned)?;
        let mut all: Vec<Product> = map.values().cloned().collect();
        all.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.barcode.cmp(&b.barcode))
        });
        Ok(all)
    }

    async fn delete_by_id(&self, barcode: &str) -> Result<(), RepositoryError> {
        let mut map = self.inner.write().map_err(|_| RepositoryError::Poisoned)?;
        map.remove(barcode);
        Ok(())
    }
}
