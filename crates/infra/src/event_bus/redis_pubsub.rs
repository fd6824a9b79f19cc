//! Redis pub/sub-backed event bus (optional).
//!
//! Each message goes to the Redis channel named after its topic. Pub/sub is not
//! durable: messages published while nobody listens are dropped.
//!
//! `publish` only serializes and queues; a dedicated thread owns the Redis
//! connection, so a slow or unreachable server never blocks the caller.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use redis::Commands;

use stockroom_events::{BusError, EventBus, Subscription, TopicMessage};

/// How long the publisher thread waits for a TCP connection.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// A serialized message waiting for the publisher thread.
#[derive(Debug)]
struct Outgoing {
    channel: String,
    payload: String,
}

/// Redis pub/sub bus for JSON topic messages.
#[derive(Debug, Clone)]
pub struct RedisPubSubEventBus {
    client: redis::Client,
    /// Channel `subscribe` listens on.
    channel: String,
    outbox: mpsc::Sender<Outgoing>,
}

impl RedisPubSubEventBus {
    pub fn new(redis_url: impl AsRef<str>, channel: impl Into<String>) -> Result<Self, BusError> {
        let client = redis::Client::open(redis_url.as_ref())
            .map_err(|e| BusError::Transport(e.to_string()))?;

        let (outbox, queue) = mpsc::channel();
        let worker_client = client.clone();
        thread::Builder::new()
            .name("redis-publisher".to_string())
            .spawn(move || publish_loop(worker_client, queue))
            .map_err(|e| BusError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            channel: channel.into(),
            outbox,
        })
    }
}

/// Drain the queue until every bus handle is dropped.
///
/// The connection is opened lazily and discarded after any failure; a message
/// that cannot be delivered is logged and dropped.
fn publish_loop(client: redis::Client, queue: mpsc::Receiver<Outgoing>) {
    let mut conn: Option<redis::Connection> = None;

    for message in queue {
        if conn.is_none() {
            match client.get_connection_with_timeout(CONNECT_TIMEOUT) {
                Ok(c) => conn = Some(c),
                Err(e) => {
                    tracing::warn!(channel = %message.channel, error = %e, "redis unreachable; event dropped");
                    continue;
                }
            }
        }

        let Some(c) = conn.as_mut() else { continue };
        match c.publish::<_, _, i64>(&message.channel, &message.payload) {
            Ok(receivers) => tracing::debug!(channel = %message.channel, receivers, "published to redis"),
            Err(e) => {
                tracing::warn!(channel = %message.channel, error = %e, "redis publish failed; event dropped");
                conn = None;
            }
        }
    }
}

impl EventBus<TopicMessage> for RedisPubSubEventBus {
    fn publish(&self, message: TopicMessage) -> Result<(), BusError> {
        let payload = serde_json::to_string(&message)
            .map_err(|e| BusError::Serialize(e.to_string()))?;

        self.outbox
            .send(Outgoing {
                channel: message.topic,
                payload,
            })
            .map_err(|_| BusError::Transport("redis publisher thread stopped".to_string()))
    }

    fn subscribe(&self) -> Subscription<TopicMessage> {
        let (tx, rx) = mpsc::channel();

        let client = self.client.clone();
        let channel = self.channel.clone();

        // Background thread that receives pub/sub messages and forwards them.
        thread::spawn(move || {
            let mut conn = match client.get_connection() {
                Ok(c) => c,
                Err(e) => {
                    tracing::warn!(error = %e, "redis subscription could not connect");
                    return;
                }
            };

            let mut pubsub = conn.as_pubsub();
            if pubsub.subscribe(&channel).is_err() {
                return;
            }

            loop {
                let msg = match pubsub.get_message() {
                    Ok(m) => m,
                    Err(_) => return,
                };

                let payload: String = match msg.get_payload() {
                    Ok(p) => p,
                    Err(_) => continue,
                };

                let message: TopicMessage = match serde_json::from_str(&payload) {
                    Ok(m) => m,
                    Err(_) => continue,
                };

                if tx.send(message).is_err() {
                    return;
                }
            }
        });

        Subscription::new(rx)
    }
}
