//! Products domain module.
//!
//! The product entity, its persistence contract, and the service that applies
//! the catalog rules (unique barcodes, creation timestamps, "product created"
//! notifications). No HTTP here.

mod price;
pub mod product;
pub mod publisher;
pub mod repository;
pub mod service;

pub use product::{NewProduct, Product, ProductCreated, UpdatePrice};
pub use publisher::{DEFAULT_TOPIC, ProductEventPublisher};
pub use repository::{InMemoryProductRepository, ProductRepository, RepositoryError};
pub use service::ProductService;
