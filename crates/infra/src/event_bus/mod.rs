//! Infrastructure event bus implementations.
//!
//! The bus abstraction lives in `stockroom-events` as pure mechanics.
//! This module provides broker-backed implementations (e.g. Redis).

#[cfg(feature = "redis")]
pub mod redis_pubsub;

#[cfg(feature = "redis")]
pub use redis_pubsub::RedisPubSubEventBus;
