//! Product use cases.

use std::sync::Arc;

use chrono::Utc;

use stockroom_core::{DomainError, DomainResult};

use crate::{
    NewProduct, Product, ProductCreated, ProductEventPublisher, ProductRepository, RepositoryError,
};

/// Applies catalog rules on top of a [`ProductRepository`].
#[derive(Clone)]
pub struct ProductService {
    repository: Arc<dyn ProductRepository>,
    events: ProductEventPublisher,
}

impl ProductService {
    pub fn new(repository: Arc<dyn ProductRepository>, events: ProductEventPublisher) -> Self {
        Self { repository, events }
    }

    /// Save a new product and announce it.
    ///
    /// Fails with `DUPLICATE_RESOURCE` when the barcode is taken. A failed
    /// announcement is logged and does not fail the call.
    pub async fn create(&self, new: NewProduct) -> DomainResult<Product> {
        tracing::info!(barcode = %new.barcode, "saving product");
        new.validate()?;

        let saved = match self.repository.insert(new.into_product(Utc::now())).await {
            Ok(saved) => saved,
            Err(RepositoryError::Duplicate(barcode)) => {
                tracing::warn!(%barcode, "attempt to create duplicate product");
                return Err(DomainError::duplicate_resource(&barcode));
            }
            Err(e) => return Err(e.into()),
        };

        if let Err(e) = self.events.publish(&ProductCreated::from(&saved)) {
            tracing::warn!(barcode = %saved.barcode, error = %e, "failed to publish product created event");
        }

        Ok(saved)
    }

    pub async fn find_by_id(&self, barcode: &str) -> DomainResult<Option<Product>> {
        tracing::info!(%barcode, "returning product");
        Ok(self.repository.find_by_id(barcode).await?)
    }

    pub async fn find_all(&self) -> DomainResult<Vec<Product>> {
        tracing::info!("listing all products");
        Ok(self.repository.find_all().await?)
    }

    /// Delete by barcode; deleting an unknown product succeeds.
    pub async fn delete_by_id(&self, barcode: &str) -> DomainResult<()> {
        tracing::info!(%barcode, "deleting product");
        Ok(self.repository.delete_by_id(barcode).await?)
    }

    /// Returns `None` when no product has this barcode.
    pub async fn update_price(&self, barcode: &str, price: u64) -> DomainResult<Option<Product>> {
        tracing::info!(%barcode, price, "updating product price");
        let Some(mut product) = self.repository.find_by_id(barcode).await? else {
            return Ok(None);
        };
        product.price = price;
        Ok(Some(self.repository.save(product).await?))
    }
}

impl core::fmt::Debug for ProductService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ProductService")
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}
