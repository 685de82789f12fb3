/// Session registry: creator -> the one live connection that receives pushes
///
/// Last connect wins. Operations are atomic per key; no lock spans more than one
/// creator.
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::Result;

/// Identifies one physical connection, so a late close cannot evict a newer one
pub type ConnectionId = Uuid;

/// A transport handle the router can push text through.
pub trait LiveConnection: Send + Sync {
    fn id(&self) -> ConnectionId;

    fn is_open(&self) -> bool;

    fn send_text(&self, text: String) -> Result<()>;
}

#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<DashMap<Uuid, Arc<dyn LiveConnection>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the connection that was replaced, if any.
    pub fn register(
        &self,
        creator_id: Uuid,
        connection: Arc<dyn LiveConnection>,
    ) -> Option<Arc<dyn LiveConnection>> {
        self.sessions.insert(creator_id, connection)
    }

    pub fn unregister(&self, creator_id: Uuid) -> bool {
        self.sessions.remove(&creator_id).is_some()
    }

    /// Remove the entry only if it still belongs to `connection_id`.
    pub fn release(&self, creator_id: Uuid, connection_id: ConnectionId) -> bool {
        self.sessions
            .remove_if(&creator_id, |_, current| current.id() == connection_id)
            .is_some()
    }

    pub fn get(&self, creator_id: Uuid) -> Option<Arc<dyn LiveConnection>> {
        self.sessions
            .get(&creator_id)
            .map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn clear(&self) {
        self.sessions.clear();
    }
}
