//! Routing of pushes to live creator connections

use event_bus::{DispatchOutcome, IncomingRecord, TopicDispatcher};
use event_schema::topics::{VIDEO_NOTIFICATION, VIDEO_UPLOAD_FAILED};
use event_schema::{NotificationStatus, VideoNotification, VideoUploadFailed};
use notification_service::{
    handler_registry, ConnectionId, DeliveryOutcome, LiveConnection, NotificationError,
    NotificationRouter, PushMessage, SessionRegistry, MISSING_CREATOR_REASON,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

struct FakeConnection {
    id: ConnectionId,
    open: AtomicBool,
    sent: Mutex<Vec<String>>,
}

impl FakeConnection {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            id: Uuid::new_v4(),
            open: AtomicBool::new(true),
            sent: Mutex::new(Vec::new()),
        })
    }

    fn close(&self) {
        self.open.store(false, Ordering::SeqCst);
    }

    fn sent(&self) -> Vec<serde_json::Value> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|text| serde_json::from_str(text).unwrap())
            .collect()
    }
}

impl LiveConnection for FakeConnection {
    fn id(&self) -> ConnectionId {
        self.id
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    fn send_text(&self, text: String) -> notification_service::Result<()> {
        if !self.is_open() {
            return Err(NotificationError::ConnectionClosed(self.id.to_string()));
        }
        self.sent.lock().unwrap().push(text);
        Ok(())
    }
}

fn router() -> Arc<NotificationRouter> {
    Arc::new(NotificationRouter::new(SessionRegistry::new()))
}

fn ready(creator_id: Uuid) -> PushMessage {
    PushMessage::from(VideoNotification {
        creator_id,
        video_id: Uuid::new_v4(),
        status: NotificationStatus::Success,
        message: "Your video is ready!".into(),
    })
}

fn record(topic: &str, offset: i64, payload: String) -> IncomingRecord {
    IncomingRecord {
        topic: topic.to_string(),
        key: None,
        payload: payload.into_bytes(),
        partition: 0,
        offset,
    }
}

#[test]
fn test_deliver_without_connection_is_dropped() {
    let router = router();
    assert_eq!(
        router.deliver(Uuid::new_v4(), &ready(Uuid::new_v4())),
        DeliveryOutcome::Dropped
    );
}

#[test]
fn test_deliver_reaches_registered_creator() {
    let router = router();
    let creator_id = Uuid::new_v4();
    let connection = FakeConnection::new();
    router.register(creator_id, connection.clone());

    assert_eq!(
        router.deliver(creator_id, &ready(creator_id)),
        DeliveryOutcome::Delivered
    );

    let sent = connection.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["type"], "VIDEO_STATUS");
    assert_eq!(sent[0]["creatorId"], creator_id.to_string());
}

#[test]
fn test_reconnect_replaces_previous_connection() {
    let router = router();
    let creator_id = Uuid::new_v4();
    let first = FakeConnection::new();
    let second = FakeConnection::new();

    router.register(creator_id, first.clone());
    router.register(creator_id, second.clone());
    router.deliver(creator_id, &ready(creator_id));

    assert!(first.sent().is_empty());
    assert_eq!(second.sent().len(), 1);
    assert_eq!(router.sessions().len(), 1);
}

#[test]
fn test_stale_close_keeps_newer_connection() {
    let router = router();
    let creator_id = Uuid::new_v4();
    let first = FakeConnection::new();
    let second = FakeConnection::new();

    router.register(creator_id, first.clone());
    router.register(creator_id, second.clone());
    router.release(creator_id, first.id);

    assert_eq!(
        router.deliver(creator_id, &ready(creator_id)),
        DeliveryOutcome::Delivered
    );
    assert_eq!(second.sent().len(), 1);

    router.release(creator_id, second.id);
    assert!(router.sessions().is_empty());
}

#[test]
fn test_closed_connection_is_dropped_and_evicted() {
    let router = router();
    let creator_id = Uuid::new_v4();
    let connection = FakeConnection::new();
    router.register(creator_id, connection.clone());
    connection.close();

    assert_eq!(
        router.deliver(creator_id, &ready(creator_id)),
        DeliveryOutcome::Dropped
    );
    assert!(router.sessions().get(creator_id).is_none());
}

#[test]
fn test_unregister_and_shutdown() {
    let router = router();
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    router.register(a, FakeConnection::new());
    router.register(b, FakeConnection::new());

    router.unregister(a);
    assert_eq!(router.sessions().len(), 1);

    router.shutdown();
    assert!(router.sessions().is_empty());
}

#[test]
fn test_validate_identity() {
    let creator_id = Uuid::new_v4();
    assert_eq!(
        NotificationRouter::validate_identity(Some(&creator_id.to_string())),
        Ok(creator_id)
    );

    for raw in [None, Some(""), Some("   "), Some("not-a-uuid")] {
        let rejected = NotificationRouter::validate_identity(raw).unwrap_err();
        assert_eq!(rejected.reason, MISSING_CREATOR_REASON);
    }
}

#[tokio::test]
async fn test_consumers_push_both_event_kinds() {
    let router = router();
    let creator_id = Uuid::new_v4();
    let connection = FakeConnection::new();
    router.register(creator_id, connection.clone());

    let dispatcher = TopicDispatcher::new(handler_registry(router.clone()).unwrap());

    let notification = VideoNotification {
        creator_id,
        video_id: Uuid::new_v4(),
        status: NotificationStatus::Failed,
        message: "Video processing failed: TRANSCODING_ERROR".into(),
    };
    let outcome = dispatcher
        .dispatch(&record(
            VIDEO_NOTIFICATION,
            0,
            serde_json::to_string(&notification).unwrap(),
        ))
        .await;
    assert_eq!(outcome, DispatchOutcome::Handled);

    let outcome = dispatcher
        .dispatch(&record(
            VIDEO_UPLOAD_FAILED,
            1,
            serde_json::to_string(&VideoUploadFailed::new(creator_id)).unwrap(),
        ))
        .await;
    assert_eq!(outcome, DispatchOutcome::Handled);

    let sent = connection.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0]["type"], "VIDEO_STATUS");
    assert_eq!(sent[0]["status"], "FAILED");
    assert_eq!(sent[1]["type"], "UPLOAD_FAILED");
    assert_eq!(sent[1]["creatorId"], creator_id.to_string());
}

#[tokio::test]
async fn test_malformed_notification_fails_handler() {
    let router = router();
    let dispatcher = TopicDispatcher::new(handler_registry(router).unwrap());

    let outcome = dispatcher
        .dispatch(&record(VIDEO_NOTIFICATION, 0, "{not json".to_string()))
        .await;
    assert_eq!(outcome, DispatchOutcome::HandlerFailed);
}
