/// Notification router
///
/// Delivers pushes to whichever connection a creator currently has open. Nothing
/// is queued: a creator offline at delivery time never sees the message.
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::messages::PushMessage;
use crate::registry::{ConnectionId, LiveConnection, SessionRegistry};

/// Close reason sent when a connection carries no usable creator identity
pub const MISSING_CREATOR_REASON: &str = "Missing validated Creator ID header.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    Dropped,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct RegistrationRejected {
    pub reason: &'static str,
}

#[derive(Clone)]
pub struct NotificationRouter {
    sessions: SessionRegistry,
}

impl NotificationRouter {
    pub fn new(sessions: SessionRegistry) -> Self {
        Self { sessions }
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Parse the creator identity forwarded by the gateway.
    pub fn validate_identity(raw: Option<&str>) -> Result<Uuid, RegistrationRejected> {
        raw.map(str::trim)
            .filter(|value| !value.is_empty())
            .and_then(|value| Uuid::parse_str(value).ok())
            .ok_or(RegistrationRejected {
                reason: MISSING_CREATOR_REASON,
            })
    }

    pub fn register(&self, creator_id: Uuid, connection: Arc<dyn LiveConnection>) {
        let connection_id = connection.id();
        if let Some(previous) = self.sessions.register(creator_id, connection) {
            info!(
                creator_id = %creator_id,
                previous = %previous.id(),
                current = %connection_id,
                "Replaced existing connection"
            );
        } else {
            info!(creator_id = %creator_id, connection = %connection_id, "Creator connected");
        }
    }

    pub fn unregister(&self, creator_id: Uuid) {
        if self.sessions.unregister(creator_id) {
            info!(creator_id = %creator_id, "Creator unregistered");
        }
    }

    /// Called when a connection closes; a newer connection for the creator is kept.
    pub fn release(&self, creator_id: Uuid, connection_id: ConnectionId) {
        if self.sessions.release(creator_id, connection_id) {
            info!(creator_id = %creator_id, connection = %connection_id, "Creator disconnected");
        } else {
            debug!(
                creator_id = %creator_id,
                connection = %connection_id,
                "Closed connection was already superseded"
            );
        }
    }

    pub fn deliver(&self, creator_id: Uuid, message: &PushMessage) -> DeliveryOutcome {
        let Some(connection) = self.sessions.get(creator_id) else {
            debug!(creator_id = %creator_id, "No live connection; notification dropped");
            return DeliveryOutcome::Dropped;
        };

        if !connection.is_open() {
            self.sessions.release(creator_id, connection.id());
            debug!(creator_id = %creator_id, "Connection closed; notification dropped");
            return DeliveryOutcome::Dropped;
        }

        let text = match serde_json::to_string(message) {
            Ok(text) => text,
            Err(err) => {
                error!(creator_id = %creator_id, "Failed to serialize notification: {}", err);
                return DeliveryOutcome::Dropped;
            }
        };

        match connection.send_text(text) {
            Ok(()) => {
                debug!(creator_id = %creator_id, "Notification delivered");
                DeliveryOutcome::Delivered
            }
            Err(err) => {
                warn!(creator_id = %creator_id, "Failed to push notification: {}", err);
                DeliveryOutcome::Dropped
            }
        }
    }

    /// Drop every session; used at shutdown.
    pub fn shutdown(&self) {
        let open = self.sessions.len();
        self.sessions.clear();
        info!(sessions = open, "Session registry cleared");
    }
}
