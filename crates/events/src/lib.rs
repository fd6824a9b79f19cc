//! `stockroom-events`: topic messages and the pub/sub bus they travel on.
//!
//! Mechanics only: no domain events live here, and delivery guarantees are
//! whatever the chosen bus implementation provides.

pub mod bus;
pub mod in_memory_bus;
pub mod message;

pub use bus::{BusError, EventBus, Subscription};
pub use in_memory_bus::InMemoryEventBus;
pub use message::TopicMessage;
