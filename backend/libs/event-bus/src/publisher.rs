//! Publishing side of the bus.

use async_trait::async_trait;
use event_schema::TopicEvent;
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error};

use crate::error::{EventBusError, EventBusResult};
use crate::metrics;

/// Sends an already-encoded JSON payload to a topic.
///
/// Implementations resolve only once the broker has accepted the record (or the
/// attempt has definitively failed).
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn send(&self, topic: &str, key: &str, payload: &str) -> EventBusResult<()>;
}

/// Serialize `event` as JSON and publish it under `key`.
pub async fn publish<E>(
    publisher: &dyn EventPublisher,
    topic: &str,
    key: &str,
    event: &E,
) -> EventBusResult<()>
where
    E: Serialize + Sync + ?Sized,
{
    let payload = match serde_json::to_string(event) {
        Ok(payload) => payload,
        Err(err) => {
            metrics::record_publish(topic, false);
            return Err(err.into());
        }
    };
    let result = publisher.send(topic, key, &payload).await;
    metrics::record_publish(topic, result.is_ok());
    result
}

/// Publish a typed event on its own topic, keyed by its correlation id.
pub async fn publish_event<E>(publisher: &dyn EventPublisher, event: &E) -> EventBusResult<()>
where
    E: TopicEvent + Sync,
{
    publish(publisher, E::TOPIC, &event.correlation_key(), event).await
}

/// Kafka-backed publisher
pub struct KafkaEventPublisher {
    producer: FutureProducer,
    delivery_timeout: Duration,
}

impl KafkaEventPublisher {
    /// Create a producer with idempotence and full acknowledgement enabled.
    pub fn new(brokers: &str) -> EventBusResult<Self> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .set("acks", "all")
            .set("enable.idempotence", "true")
            .create()?;

        Ok(Self::from_producer(producer))
    }

    pub fn from_producer(producer: FutureProducer) -> Self {
        Self {
            producer,
            delivery_timeout: Duration::from_secs(5),
        }
    }
}

#[async_trait]
impl EventPublisher for KafkaEventPublisher {
    async fn send(&self, topic: &str, key: &str, payload: &str) -> EventBusResult<()> {
        let record = FutureRecord::to(topic).key(key).payload(payload);

        match self.producer.send(record, self.delivery_timeout).await {
            Ok((partition, offset)) => {
                debug!(
                    topic = topic,
                    key = key,
                    partition = partition,
                    offset = offset,
                    "Event published"
                );
                Ok(())
            }
            Err((err, _)) => {
                error!(topic = topic, key = key, error = %err, "Failed to publish event");
                Err(EventBusError::Transport(format!(
                    "Kafka publish failed: {}",
                    err
                )))
            }
        }
    }
}
