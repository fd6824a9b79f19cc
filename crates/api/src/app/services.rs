//! Service wiring: picks repository and bus backends from configuration.

use std::sync::Arc;

use stockroom_events::{EventBus, InMemoryEventBus, TopicMessage};
use stockroom_infra::repository::PostgresProductRepository;
use stockroom_products::{
    InMemoryProductRepository, ProductEventPublisher, ProductRepository, ProductService,
};

use crate::config::ApiConfig;

/// Application services shared by all handlers.
#[derive(Debug, Clone)]
pub struct AppServices {
    pub products: ProductService,
}

impl AppServices {
    pub fn new(
        repository: Arc<dyn ProductRepository>,
        bus: Arc<dyn EventBus<TopicMessage>>,
        topic: impl Into<String>,
    ) -> Self {
        Self {
            products: ProductService::new(repository, ProductEventPublisher::new(bus, topic)),
        }
    }
}

pub async fn build_services(config: &ApiConfig) -> anyhow::Result<AppServices> {
    let repository: Arc<dyn ProductRepository> = match &config.database_url {
        Some(url) => {
            tracing::info!("using postgres product repository");
            Arc::new(PostgresProductRepository::connect(url).await?)
        }
        None => {
            tracing::info!("DATABASE_URL not set; using in-memory product repository");
            Arc::new(InMemoryProductRepository::new())
        }
    };

    Ok(AppServices::new(repository, event_bus(config)?, config.events_topic.clone()))
}

#[cfg(feature = "redis")]
fn event_bus(config: &ApiConfig) -> anyhow::Result<Arc<dyn EventBus<TopicMessage>>> {
    if let Some(url) = &config.redis_url {
        tracing::info!(topic = %config.events_topic, "publishing product events to redis");
        let bus = stockroom_infra::event_bus::RedisPubSubEventBus::new(url, config.events_topic.clone())?;
        return Ok(Arc::new(bus));
    }
    Ok(Arc::new(InMemoryEventBus::<TopicMessage>::new()))
}

#[cfg(not(feature = "redis"))]
fn event_bus(config: &ApiConfig) -> anyhow::Result<Arc<dyn EventBus<TopicMessage>>> {
    if config.redis_url.is_some() {
        tracing::warn!("REDIS_URL set but the `redis` feature is disabled; events stay in-process");
    }
    Ok(Arc::new(InMemoryEventBus::<TopicMessage>::new()))
}
