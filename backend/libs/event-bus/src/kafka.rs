//! Kafka-backed record stream with manual offset commits.

use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::message::Message;
use rdkafka::{Offset, TopicPartitionList};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::dispatcher::{IncomingRecord, RecordStream, TopicDispatcher};
use crate::error::{EventBusError, EventBusResult};

#[derive(Debug, Clone)]
pub struct KafkaConsumerConfig {
    pub brokers: String,
    pub group_id: String,
}

impl KafkaConsumerConfig {
    pub fn new(brokers: impl Into<String>, group_id: impl Into<String>) -> Self {
        Self {
            brokers: brokers.into(),
            group_id: group_id.into(),
        }
    }
}

pub struct KafkaRecordStream {
    consumer: StreamConsumer,
}

impl KafkaRecordStream {
    pub fn new(config: &KafkaConsumerConfig, topics: &[String]) -> EventBusResult<Self> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("group.id", &config.group_id)
            .set("enable.auto.commit", "false")
            .set("enable.partition.eof", "false")
            .set("auto.offset.reset", "earliest")
            .set("session.timeout.ms", "45000")
            .set("max.poll.interval.ms", "300000")
            .create()?;

        let topic_refs: Vec<&str> = topics.iter().map(String::as_str).collect();
        consumer.subscribe(&topic_refs)?;

        Ok(Self { consumer })
    }
}

#[async_trait]
impl RecordStream for KafkaRecordStream {
    async fn next_record(&mut self) -> Option<EventBusResult<IncomingRecord>> {
        let result = match self.consumer.recv().await {
            Ok(message) => Ok(IncomingRecord {
                topic: message.topic().to_string(),
                key: message
                    .key()
                    .map(|k| String::from_utf8_lossy(k).into_owned()),
                payload: message.payload().map(<[u8]>::to_vec).unwrap_or_default(),
                partition: message.partition(),
                offset: message.offset(),
            }),
            Err(err) => Err(EventBusError::from(err)),
        };
        Some(result)
    }

    async fn acknowledge(&mut self, record: &IncomingRecord) -> EventBusResult<()> {
        let mut tpl = TopicPartitionList::new();
        tpl.add_partition_offset(
            &record.topic,
            record.partition,
            Offset::Offset(record.offset + 1),
        )?;
        self.consumer.commit(&tpl, CommitMode::Async)?;
        Ok(())
    }
}

/// Spawn a Tokio task subscribing to every registered topic and running the dispatcher.
pub fn spawn_dispatcher(
    dispatcher: TopicDispatcher,
    config: KafkaConsumerConfig,
    shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let topics = dispatcher.topics();
        info!(
            "Starting Kafka consumer (group: {}, topics: {:?})",
            config.group_id, topics
        );

        match KafkaRecordStream::new(&config, &topics) {
            Ok(stream) => dispatcher.run(stream, shutdown).await,
            Err(err) => error!("Kafka consumer terminated with error: {err}"),
        }
    })
}
