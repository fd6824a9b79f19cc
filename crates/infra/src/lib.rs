//! Infrastructure adapters: concrete storage and bus transports behind the
//! traits defined in the domain crates.

pub mod event_bus;
pub mod repository;
