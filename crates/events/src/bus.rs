//! Event publishing/subscription abstraction (mechanics only).
//!
//! The bus distributes messages to subscribers (in-process listeners, a Redis
//! channel, ...). It is fire-and-forget from the publisher's point of view:
//!
//! - **No ordering guarantees** across publishers
//! - **No persistence**: a message published with no subscriber is gone
//! - **Best effort**: `publish` reports transport failures, it never retries

use std::sync::Arc;
use std::sync::mpsc::Receiver;

use thiserror::Error;

/// A subscription to a bus.
///
/// Each subscription gets a copy of every message published after it was
/// created (broadcast semantics). Designed for single-threaded consumption.
///
/// ```ignore
/// let subscription = bus.subscribe();
/// while let Ok(message) = subscription.try_recv() {
///     handle(message);
/// }
/// ```
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Try to receive a message without blocking.
    pub fn try_recv(&self) -> Result<M, std::sync::mpsc::TryRecvError> {
        self.receiver.try_recv()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BusError {
    /// Internal lock poisoning.
    #[error("event bus lock poisoned")]
    Poisoned,

    #[error("failed to serialize message: {0}")]
    Serialize(String),

    /// Broker/transport failure.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Transport-agnostic pub/sub bus.
///
/// Object safe, so services can hold an `Arc<dyn EventBus<M>>` and the
/// transport is picked at startup.
pub trait EventBus<M>: Send + Sync {
    fn publish(&self, message: M) -> Result<(), BusError>;

    fn subscribe(&self) -> Subscription<M>;
}

impl<M, B> EventBus<M> for Arc<B>
where
    B: EventBus<M> + ?Sized,
{
    fn publish(&self, message: M) -> Result<(), BusError> {
        (**self).publish(message)
    }

    fn subscribe(&self) -> Subscription<M> {
        (**self).subscribe()
    }
}
