/// Notification Service Library
///
/// Pushes pipeline status updates to creators over WebSocket.
pub mod config;
pub mod consumers;
pub mod error;
pub mod messages;
pub mod registry;
pub mod router;
pub mod websocket;

use actix_web::{web, HttpResponse};

pub use config::{Config, WebSocketConfig};
pub use consumers::handler_registry;
pub use error::{NotificationError, Result};
pub use messages::PushMessage;
pub use registry::{ConnectionId, LiveConnection, SessionRegistry};
pub use router::{DeliveryOutcome, NotificationRouter, MISSING_CREATOR_REASON};

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"status": "ok"}))
}

pub async fn metrics() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(event_bus::metrics::render())
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .route("/metrics", web::get().to(metrics))
        .route("/notifications", web::get().to(websocket::notifications_ws));
}
