//! In-process bus for tests and local wiring.
//!
//! Published events are recorded and fanned out to every subscription whose topic
//! set contains the event's topic. Individual topics can be made to fail so that
//! compensation paths can be exercised.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

use crate::dispatcher::{IncomingRecord, RecordStream};
use crate::error::{EventBusError, EventBusResult};
use crate::publisher::EventPublisher;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedEvent {
    pub topic: String,
    pub key: String,
    pub payload: String,
}

impl PublishedEvent {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.payload).unwrap_or(serde_json::Value::Null)
    }
}

type Subscriber = (HashSet<String>, mpsc::UnboundedSender<EventBusResult<IncomingRecord>>);

#[derive(Default)]
struct BusState {
    published: Vec<PublishedEvent>,
    failing_topics: HashSet<String>,
    subscribers: Vec<Subscriber>,
    next_offsets: HashMap<String, i64>,
    acknowledged: Vec<(String, i64)>,
}

impl BusState {
    fn deliver(&mut self, topic: &str, key: Option<String>, payload: Vec<u8>) {
        let offset = self.next_offsets.entry(topic.to_string()).or_insert(0);
        let record = IncomingRecord {
            topic: topic.to_string(),
            key,
            payload,
            partition: 0,
            offset: *offset,
        };
        *offset += 1;

        self.subscribers.retain(|(topics, tx)| {
            if !topics.contains(topic) {
                return true;
            }
            tx.send(Ok(record.clone())).is_ok()
        });
    }
}

#[derive(Clone, Default)]
pub struct InMemoryBus {
    state: Arc<Mutex<BusState>>,
}

impl InMemoryBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent send to `topic` fail with a transport error.
    pub async fn fail_topic(&self, topic: &str) {
        self.state.lock().await.failing_topics.insert(topic.to_string());
    }

    pub async fn restore_topic(&self, topic: &str) {
        self.state.lock().await.failing_topics.remove(topic);
    }

    /// Successfully published events, in publish order
    pub async fn published(&self) -> Vec<PublishedEvent> {
        self.state.lock().await.published.clone()
    }

    pub async fn published_on(&self, topic: &str) -> Vec<PublishedEvent> {
        self.state
            .lock()
            .await
            .published
            .iter()
            .filter(|e| e.topic == topic)
            .cloned()
            .collect()
    }

    /// `(topic, offset)` pairs acknowledged by subscribers
    pub async fn acknowledged(&self) -> Vec<(String, i64)> {
        self.state.lock().await.acknowledged.clone()
    }

    pub async fn subscribe(&self, topics: &[String]) -> InMemoryRecordStream {
        let (tx, rx) = mpsc::unbounded_channel();
        let topics = topics.iter().cloned().collect();
        self.state.lock().await.subscribers.push((topics, tx));
        InMemoryRecordStream {
            rx,
            bus: self.clone(),
        }
    }

    /// Deliver a raw record to subscribers without recording it as published.
    pub async fn inject(&self, topic: &str, key: Option<&str>, payload: &[u8]) {
        self.state
            .lock()
            .await
            .deliver(topic, key.map(str::to_string), payload.to_vec());
    }

    /// Surface a receive error on every open subscription.
    pub async fn inject_receive_error(&self, message: &str) {
        let state = self.state.lock().await;
        for (_, tx) in &state.subscribers {
            let _ = tx.send(Err(EventBusError::Transport(message.to_string())));
        }
    }
}

#[async_trait]
impl EventPublisher for InMemoryBus {
    async fn send(&self, topic: &str, key: &str, payload: &str) -> EventBusResult<()> {
        let mut state = self.state.lock().await;
        if state.failing_topics.contains(topic) {
            return Err(EventBusError::Transport(format!(
                "topic {} is unavailable",
                topic
            )));
        }

        state.published.push(PublishedEvent {
            topic: topic.to_string(),
            key: key.to_string(),
            payload: payload.to_string(),
        });
        state.deliver(topic, Some(key.to_string()), payload.as_bytes().to_vec());
        Ok(())
    }
}

pub struct InMemoryRecordStream {
    rx: mpsc::UnboundedReceiver<EventBusResult<IncomingRecord>>,
    bus: InMemoryBus,
}

#[async_trait]
impl RecordStream for InMemoryRecordStream {
    async fn next_record(&mut self) -> Option<EventBusResult<IncomingRecord>> {
        self.rx.recv().await
    }

    async fn acknowledge(&mut self, record: &IncomingRecord) -> EventBusResult<()> {
        self.bus
            .state
            .lock()
            .await
            .acknowledged
            .push((record.topic.clone(), record.offset));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_failed_topic_records_nothing() {
        let bus = InMemoryBus::new();
        bus.fail_topic("a").await;

        assert!(bus.send("a", "k", "{}").await.is_err());
        bus.send("b", "k", "{\"x\":1}").await.unwrap();

        let published = bus.published().await;
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].json()["x"], 1);

        bus.restore_topic("a").await;
        assert!(bus.send("a", "k", "{}").await.is_ok());
    }

    #[tokio::test]
    async fn test_subscription_receives_only_its_topics() {
        let bus = InMemoryBus::new();
        let mut stream = bus.subscribe(&["a".to_string()]).await;

        bus.send("b", "k1", "{}").await.unwrap();
        bus.send("a", "k2", "{}").await.unwrap();

        let record = stream.next_record().await.unwrap().unwrap();
        assert_eq!(record.topic, "a");
        assert_eq!(record.key.as_deref(), Some("k2"));
        assert_eq!(record.offset, 0);
    }
}
