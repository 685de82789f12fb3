//! Dispatcher loop over the in-memory bus

use async_trait::async_trait;
use event_bus::{
    publish, EventBusResult, EventHandler, HandlerRegistry, IncomingRecord, InMemoryBus,
    RecordStream, TopicDispatcher,
};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};

struct Recorder {
    seen: Mutex<Vec<String>>,
}

#[async_trait]
impl EventHandler for Recorder {
    async fn handle(&self, payload: &[u8]) -> anyhow::Result<()> {
        let value: serde_json::Value = serde_json::from_slice(payload)?;
        self.seen.lock().await.push(value["id"].to_string());
        Ok(())
    }
}

/// Replays a fixed list of records, then ends the stream.
struct ScriptedStream {
    records: VecDeque<IncomingRecord>,
    acknowledged: Arc<Mutex<Vec<(String, i64)>>>,
}

#[async_trait]
impl RecordStream for ScriptedStream {
    async fn next_record(&mut self) -> Option<EventBusResult<IncomingRecord>> {
        self.records.pop_front().map(Ok)
    }

    async fn acknowledge(&mut self, record: &IncomingRecord) -> EventBusResult<()> {
        self.acknowledged
            .lock()
            .await
            .push((record.topic.clone(), record.offset));
        Ok(())
    }
}

fn record(topic: &str, offset: i64, payload: &[u8]) -> IncomingRecord {
    IncomingRecord {
        topic: topic.to_string(),
        key: None,
        payload: payload.to_vec(),
        partition: 0,
        offset,
    }
}

async fn wait_for_acks(bus: &InMemoryBus, count: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while bus.acknowledged().await.len() < count {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("records were not acknowledged in time");
}

#[tokio::test]
async fn test_failed_records_are_acknowledged_and_loop_continues() {
    let bus = InMemoryBus::new();
    let recorder = Arc::new(Recorder {
        seen: Mutex::new(Vec::new()),
    });

    let mut registry = HandlerRegistry::new();
    registry.register("orders", recorder.clone()).unwrap();
    let dispatcher = TopicDispatcher::new(registry);

    let stream = bus.subscribe(&dispatcher.topics()).await;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(async move { dispatcher.run(stream, shutdown_rx).await });

    publish(&bus, "orders", "k1", &serde_json::json!({"id": 1}))
        .await
        .unwrap();
    bus.inject("orders", Some("k2"), b"not json").await;
    bus.inject_receive_error("broker went away").await;
    publish(&bus, "orders", "k3", &serde_json::json!({"id": 3}))
        .await
        .unwrap();

    wait_for_acks(&bus, 3).await;

    assert_eq!(*recorder.seen.lock().await, vec!["1", "3"]);
    let acked: Vec<i64> = bus
        .acknowledged()
        .await
        .into_iter()
        .map(|(_, offset)| offset)
        .collect();
    assert_eq!(acked, vec![0, 1, 2]);

    shutdown_tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("dispatcher did not stop")
        .unwrap();
}

#[tokio::test]
async fn test_publish_failure_is_reported() {
    let bus = InMemoryBus::new();
    bus.fail_topic("orders").await;

    let result = publish(&bus, "orders", "k", &serde_json::json!({"id": 1})).await;

    assert!(matches!(result, Err(event_bus::EventBusError::Transport(_))));
    assert!(bus.published().await.is_empty());
}

#[tokio::test]
async fn test_unrouted_record_is_acknowledged_without_invoking_handlers() {
    let recorder = Arc::new(Recorder {
        seen: Mutex::new(Vec::new()),
    });
    let mut registry = HandlerRegistry::new();
    registry.register("orders", recorder.clone()).unwrap();
    let dispatcher = TopicDispatcher::new(registry);

    let acknowledged = Arc::new(Mutex::new(Vec::new()));
    let stream = ScriptedStream {
        records: VecDeque::from([
            record("unknown", 0, br#"{"id": 9}"#),
            record("orders", 1, br#"{"id": 1}"#),
        ]),
        acknowledged: acknowledged.clone(),
    };
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::time::timeout(Duration::from_secs(2), dispatcher.run(stream, shutdown_rx))
        .await
        .expect("dispatcher did not drain the stream");

    assert_eq!(*recorder.seen.lock().await, vec!["1"]);
    assert_eq!(
        *acknowledged.lock().await,
        vec![("unknown".to_string(), 0), ("orders".to_string(), 1)]
    );
}
