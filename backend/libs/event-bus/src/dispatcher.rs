//! Consume loop: route each record to its topic handler, then acknowledge it.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::error::EventBusResult;
use crate::metrics;
use crate::registry::HandlerRegistry;

/// Back-off after a failed receive
const RECEIVE_ERROR_BACKOFF: Duration = Duration::from_secs(1);

/// One record pulled off a subscription
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingRecord {
    pub topic: String,
    pub key: Option<String>,
    pub payload: Vec<u8>,
    pub partition: i32,
    pub offset: i64,
}

/// A subscription the dispatcher can drain.
///
/// `next_record` yields `None` once the stream is exhausted.
#[async_trait]
pub trait RecordStream: Send {
    async fn next_record(&mut self) -> Option<EventBusResult<IncomingRecord>>;

    /// Mark `record` as consumed so it is not redelivered.
    async fn acknowledge(&mut self, record: &IncomingRecord) -> EventBusResult<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Handled,
    HandlerFailed,
    Unrouted,
}

impl DispatchOutcome {
    fn as_str(&self) -> &'static str {
        match self {
            DispatchOutcome::Handled => "handled",
            DispatchOutcome::HandlerFailed => "failed",
            DispatchOutcome::Unrouted => "unrouted",
        }
    }
}

#[derive(Clone)]
pub struct TopicDispatcher {
    registry: Arc<HandlerRegistry>,
}

impl TopicDispatcher {
    pub fn new(registry: HandlerRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub fn topics(&self) -> Vec<String> {
        self.registry.topics()
    }

    /// Invoke the handler for `record.topic`. Handler errors are logged, never returned.
    pub async fn dispatch(&self, record: &IncomingRecord) -> DispatchOutcome {
        let outcome = match self.registry.get(&record.topic) {
            Some(handler) => match handler.handle(&record.payload).await {
                Ok(()) => DispatchOutcome::Handled,
                Err(err) => {
                    error!(
                        topic = %record.topic,
                        key = ?record.key,
                        offset = record.offset,
                        "Event handler failed: {:#}",
                        err
                    );
                    DispatchOutcome::HandlerFailed
                }
            },
            None => {
                warn!("Received message for unexpected topic: {}", record.topic);
                DispatchOutcome::Unrouted
            }
        };

        metrics::record_dispatch(&record.topic, outcome.as_str());
        outcome
    }

    /// Process records one at a time until the stream ends or shutdown is signalled.
    ///
    /// Every record is acknowledged after its handler returns, whether or not the
    /// handler succeeded.
    pub async fn run<S>(&self, mut stream: S, mut shutdown: watch::Receiver<bool>)
    where
        S: RecordStream,
    {
        info!("Event dispatcher started (topics: {:?})", self.topics());

        loop {
            if *shutdown.borrow() {
                break;
            }

            let next = tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
                next = stream.next_record() => next,
            };

            match next {
                Some(Ok(record)) => {
                    let outcome = self.dispatch(&record).await;
                    debug!(topic = %record.topic, offset = record.offset, ?outcome, "Record dispatched");

                    if let Err(err) = stream.acknowledge(&record).await {
                        warn!("Failed to commit offset: {}", err);
                    }
                }
                Some(Err(err)) => {
                    error!("Event bus receive error: {}", err);
                    tokio::time::sleep(RECEIVE_ERROR_BACKOFF).await;
                }
                None => {
                    info!("Record stream closed");
                    break;
                }
            }
        }

        info!("Event dispatcher stopped");
    }
}
