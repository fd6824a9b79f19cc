//! Product repository backends.

pub mod postgres;

pub use postgres::PostgresProductRepository;
