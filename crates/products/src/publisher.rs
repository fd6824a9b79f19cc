use std::sync::Arc;

use stockroom_events::{BusError, EventBus, TopicMessage};

use crate::ProductCreated;

/// Topic "product created" notifications go to unless configured otherwise.
pub const DEFAULT_TOPIC: &str = "product-events";

/// Publishes product notifications on a single topic.
#[derive(Clone)]
pub struct ProductEventPublisher {
    bus: Arc<dyn EventBus<TopicMessage>>,
    topic: String,
}

impl ProductEventPublisher {
    pub fn new(bus: Arc<dyn EventBus<TopicMessage>>, topic: impl Into<String>) -> Self {
        Self {
            bus,
            topic: topic.into(),
        }
    }

    pub fn publish(&self, event: &ProductCreated) -> Result<(), BusError> {
        tracing::info!(topic = %self.topic, barcode = %event.barcode, "publishing product created event");
        let message = TopicMessage::new(self.topic.as_str(), event.barcode.as_str(), event)?;
        self.bus.publish(message)
    }
}

impl core::fmt::Debug for ProductEventPublisher {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ProductEventPublisher")
            .field("topic", &self.topic)
            .finish_non_exhaustive()
    }
}
