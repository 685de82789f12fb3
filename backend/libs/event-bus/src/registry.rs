//! Topic -> handler routing table.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{EventBusError, EventBusResult};

/// Consumes the raw payload of one record.
///
/// An `Err` is logged by the dispatcher; the record is acknowledged either way.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, payload: &[u8]) -> anyhow::Result<()>;
}

/// At most one handler per topic
#[derive(Default, Clone)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn EventHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        topic: impl Into<String>,
        handler: Arc<dyn EventHandler>,
    ) -> EventBusResult<()> {
        let topic = topic.into();
        if self.handlers.contains_key(&topic) {
            return Err(EventBusError::DuplicateHandler(topic));
        }
        self.handlers.insert(topic, handler);
        Ok(())
    }

    pub fn get(&self, topic: &str) -> Option<Arc<dyn EventHandler>> {
        self.handlers.get(topic).cloned()
    }

    /// Subscribed topics, sorted for stable logging
    pub fn topics(&self) -> Vec<String> {
        let mut topics: Vec<String> = self.handlers.keys().cloned().collect();
        topics.sort();
        topics
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;

    #[async_trait]
    impl EventHandler for Noop {
        async fn handle(&self, _payload: &[u8]) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_register_rejects_duplicate_topic() {
        let mut registry = HandlerRegistry::new();
        registry.register("b.topic", Arc::new(Noop)).unwrap();
        registry.register("a.topic", Arc::new(Noop)).unwrap();

        let err = registry.register("a.topic", Arc::new(Noop)).unwrap_err();
        assert!(matches!(err, EventBusError::DuplicateHandler(t) if t == "a.topic"));
        assert_eq!(registry.topics(), vec!["a.topic", "b.topic"]);
        assert!(registry.get("c.topic").is_none());
    }
}
