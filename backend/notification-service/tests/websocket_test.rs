//! WebSocket handshake against the running app

use actix_web::{dev::ServerHandle, test, web, App, HttpServer};
use awc::ws::{CloseCode, Frame};
use event_schema::NotificationStatus;
use futures::StreamExt;
use notification_service::{
    configure, DeliveryOutcome, NotificationRouter, PushMessage, SessionRegistry, WebSocketConfig,
    MISSING_CREATOR_REASON,
};
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

async fn start_server(router: Arc<NotificationRouter>) -> std::io::Result<(SocketAddr, ServerHandle)> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;

    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::from(router.clone()))
            .app_data(web::Data::new(WebSocketConfig::default()))
            .configure(configure)
    })
    .workers(1)
    .listen(listener)?
    .run();

    let handle = server.handle();
    actix_rt::spawn(server);
    Ok((addr, handle))
}

async fn wait_for_sessions(router: &NotificationRouter, expected: usize) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while router.sessions().len() != expected {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("session count never reached expected value");
}

#[actix_web::test]
async fn test_upgrade_is_accepted() {
    let router = web::Data::new(NotificationRouter::new(SessionRegistry::new()));
    let app = test::init_service(
        App::new()
            .app_data(router)
            .app_data(web::Data::new(WebSocketConfig::default()))
            .configure(configure),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/notifications")
        .insert_header(("X-Creator-ID", Uuid::new_v4().to_string()))
        .insert_header(("connection", "upgrade"))
        .insert_header(("upgrade", "websocket"))
        .insert_header(("sec-websocket-version", "13"))
        .insert_header(("sec-websocket-key", "dGhlIHNhbXBsZSBub25jZQ=="))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), actix_web::http::StatusCode::SWITCHING_PROTOCOLS);
}

#[actix_web::test]
async fn test_plain_get_is_rejected() {
    let router = web::Data::new(NotificationRouter::new(SessionRegistry::new()));
    let app = test::init_service(
        App::new()
            .app_data(router)
            .app_data(web::Data::new(WebSocketConfig::default()))
            .configure(configure),
    )
    .await;

    let req = test::TestRequest::get().uri("/notifications").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_health() {
    let app = test::init_service(App::new().configure(configure)).await;
    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert!(resp.status().is_success());
}

#[actix_rt::test]
async fn test_identified_connection_registers_and_receives_pushes() {
    let router = Arc::new(NotificationRouter::new(SessionRegistry::new()));
    let (addr, handle) = start_server(router.clone()).await.unwrap();
    let creator_id = Uuid::new_v4();

    let (resp, mut connection) = awc::Client::new()
        .ws(format!("http://{}/notifications", addr))
        .set_header("X-Creator-ID", creator_id.to_string())
        .connect()
        .await
        .unwrap();
    assert_eq!(resp.status(), actix_web::http::StatusCode::SWITCHING_PROTOCOLS);

    wait_for_sessions(&router, 1).await;
    assert!(router.sessions().get(creator_id).is_some());

    let push = PushMessage::VideoStatus {
        video_id: Uuid::new_v4(),
        creator_id,
        status: NotificationStatus::Success,
        message: "Your video is ready".into(),
    };
    assert_eq!(router.deliver(creator_id, &push), DeliveryOutcome::Delivered);

    let text = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            match connection.next().await {
                Some(Ok(Frame::Text(bytes))) => break bytes,
                Some(Ok(_)) => continue,
                other => panic!("unexpected frame: {:?}", other),
            }
        }
    })
    .await
    .unwrap();
    let received: PushMessage = serde_json::from_slice(&text).unwrap();
    assert_eq!(received, push);

    drop(connection);
    wait_for_sessions(&router, 0).await;

    handle.stop(true).await;
}

#[actix_rt::test]
async fn test_connection_without_identity_is_closed_with_policy_violation() {
    let router = Arc::new(NotificationRouter::new(SessionRegistry::new()));
    let (addr, handle) = start_server(router.clone()).await.unwrap();

    let (_resp, mut connection) = awc::Client::new()
        .ws(format!("http://{}/notifications", addr))
        .connect()
        .await
        .unwrap();

    let reason = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            match connection.next().await {
                Some(Ok(Frame::Close(reason))) => break reason,
                Some(Ok(_)) => continue,
                other => panic!("unexpected frame: {:?}", other),
            }
        }
    })
    .await
    .unwrap()
    .expect("close frame without reason");

    assert_eq!(reason.code, CloseCode::Policy);
    assert_eq!(reason.description.as_deref(), Some(MISSING_CREATOR_REASON));
    assert!(router.sessions().is_empty());

    handle.stop(true).await;
}
