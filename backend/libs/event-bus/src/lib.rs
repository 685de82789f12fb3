//! Topic-addressed publish/subscribe for the video pipeline.
//!
//! Producers call [`publish`] / [`publish_event`] through an [`EventPublisher`].
//! Consumers register one [`EventHandler`] per topic in a [`HandlerRegistry`] and
//! hand a [`RecordStream`] to a [`TopicDispatcher`], which processes records one at a
//! time and acknowledges each after its handler returns.
//!
//! Delivery is at-most-once from the handler's point of view: a failed handler is
//! logged and its record acknowledged, never retried.

mod error;
pub mod dispatcher;
pub mod kafka;
pub mod memory;
pub mod metrics;
pub mod publisher;
pub mod registry;

pub use dispatcher::{DispatchOutcome, IncomingRecord, RecordStream, TopicDispatcher};
pub use error::{EventBusError, EventBusResult};
pub use kafka::{spawn_dispatcher, KafkaConsumerConfig, KafkaRecordStream};
pub use memory::InMemoryBus;
pub use publisher::{publish, publish_event, EventPublisher, KafkaEventPublisher};
pub use registry::{EventHandler, HandlerRegistry};
