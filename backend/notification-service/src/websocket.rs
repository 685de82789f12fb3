/// WebSocket transport for creator notifications
///
/// Each socket is an actor. On start it registers itself with the router (or
/// closes with a policy violation when the creator identity is missing), pings
/// the client on an interval, and releases its own registry entry when stopped.
use actix::{Actor, ActorContext, Addr, AsyncContext, Handler, Message, StreamHandler};
use actix_web::{web, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::config::WebSocketConfig;
use crate::error::{NotificationError, Result};
use crate::registry::{ConnectionId, LiveConnection};
use crate::router::{NotificationRouter, RegistrationRejected};

/// Header carrying the creator identity validated by the gateway
pub const CREATOR_ID_HEADER: &str = "X-Creator-ID";

#[derive(Message)]
#[rtype(result = "()")]
struct PushText(String);

pub struct NotificationSocket {
    id: ConnectionId,
    identity: std::result::Result<Uuid, RegistrationRejected>,
    router: Arc<NotificationRouter>,
    settings: WebSocketConfig,
    hb: Instant,
}

impl NotificationSocket {
    pub fn new(
        identity: std::result::Result<Uuid, RegistrationRejected>,
        router: Arc<NotificationRouter>,
        settings: WebSocketConfig,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            identity,
            router,
            settings,
            hb: Instant::now(),
        }
    }

    fn hb(&self, ctx: &mut ws::WebsocketContext<Self>) {
        let timeout = self.settings.client_timeout;
        ctx.run_interval(self.settings.heartbeat_interval, move |act, ctx| {
            if Instant::now().duration_since(act.hb) > timeout {
                tracing::warn!(connection = %act.id, "WebSocket heartbeat failed, disconnecting");
                ctx.stop();
                return;
            }
            ctx.ping(b"");
        });
    }
}

impl Actor for NotificationSocket {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        match &self.identity {
            Ok(creator_id) => {
                let connection = ActorConnection {
                    id: self.id,
                    addr: ctx.address(),
                };
                self.router.register(*creator_id, Arc::new(connection));
                self.hb(ctx);
            }
            Err(rejected) => {
                tracing::warn!(connection = %self.id, "Rejecting WebSocket: {}", rejected);
                ctx.close(Some(ws::CloseReason {
                    code: ws::CloseCode::Policy,
                    description: Some(rejected.reason.to_string()),
                }));
                ctx.stop();
            }
        }
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        if let Ok(creator_id) = &self.identity {
            self.router.release(*creator_id, self.id);
        }
    }
}

impl Handler<PushText> for NotificationSocket {
    type Result = ();

    fn handle(&mut self, msg: PushText, ctx: &mut Self::Context) {
        ctx.text(msg.0);
    }
}

impl StreamHandler<std::result::Result<ws::Message, ws::ProtocolError>> for NotificationSocket {
    fn handle(
        &mut self,
        msg: std::result::Result<ws::Message, ws::ProtocolError>,
        ctx: &mut Self::Context,
    ) {
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                self.hb = Instant::now();
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {
                self.hb = Instant::now();
            }
            Ok(ws::Message::Text(_)) | Ok(ws::Message::Binary(_)) => {
                // Push-only channel; client frames just count as liveness
                self.hb = Instant::now();
            }
            Ok(ws::Message::Close(reason)) => {
                tracing::info!(connection = %self.id, "WebSocket close received: {:?}", reason);
                ctx.close(reason);
                ctx.stop();
            }
            Err(err) => {
                tracing::warn!(connection = %self.id, "WebSocket protocol error: {}", err);
                ctx.stop();
            }
            _ => {}
        }
    }
}

/// Registry handle for a running socket actor
struct ActorConnection {
    id: ConnectionId,
    addr: Addr<NotificationSocket>,
}

impl LiveConnection for ActorConnection {
    fn id(&self) -> ConnectionId {
        self.id
    }

    fn is_open(&self) -> bool {
        self.addr.connected()
    }

    fn send_text(&self, text: String) -> Result<()> {
        self.addr
            .try_send(PushText(text))
            .map_err(|e| NotificationError::ConnectionClosed(e.to_string()))
    }
}

/// GET /notifications
pub async fn notifications_ws(
    req: HttpRequest,
    stream: web::Payload,
    router: web::Data<NotificationRouter>,
    settings: web::Data<WebSocketConfig>,
) -> std::result::Result<HttpResponse, actix_web::Error> {
    let raw = req
        .headers()
        .get(CREATOR_ID_HEADER)
        .and_then(|value| value.to_str().ok());
    let identity = NotificationRouter::validate_identity(raw);

    let socket = NotificationSocket::new(identity, router.into_inner(), *settings.get_ref());
    ws::start(socket, &req, stream)
}
