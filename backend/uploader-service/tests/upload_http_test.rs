//! HTTP intake: status codes and the 202 body

use actix_web::{test, web, App};
use event_bus::InMemoryBus;
use event_schema::topics::VIDEO_UPLOADED;
use std::sync::Arc;
use std::time::Duration;
use uploader_service::{handlers, LocalBlobStorage, UploadSaga};
use uuid::Uuid;

const BOUNDARY: &str = "vidflow-boundary";

fn multipart_body(parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, file_name, data) in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match file_name {
            Some(file_name) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                    name, file_name
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
            ),
        }
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn saga(root: &std::path::Path, bus: &InMemoryBus) -> web::Data<UploadSaga> {
    web::Data::new(UploadSaga::new(
        Arc::new(LocalBlobStorage::new(root)),
        Arc::new(bus.clone()),
        Duration::from_secs(5),
    ))
}

#[actix_web::test]
async fn test_upload_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let bus = InMemoryBus::new();
    let app = test::init_service(
        App::new()
            .app_data(saga(dir.path(), &bus))
            .configure(handlers::configure),
    )
    .await;

    let body = multipart_body(&[
        ("title", None, b"My video"),
        ("description", None, b"About things"),
        ("image", Some("thumb.png"), b"png"),
        ("video", Some("clip.mp4"), b"mp4"),
    ]);
    let req = test::TestRequest::post()
        .uri("/api/v1/upload")
        .insert_header(("X-Creator-ID", Uuid::new_v4().to_string()))
        .insert_header((
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        ))
        .set_payload(body)
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 202);

    let json: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(json["message"], "Video processing started.");
    assert_eq!(bus.published_on(VIDEO_UPLOADED).await.len(), 1);
}

#[actix_web::test]
async fn test_upload_without_creator_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let bus = InMemoryBus::new();
    let app = test::init_service(
        App::new()
            .app_data(saga(dir.path(), &bus))
            .configure(handlers::configure),
    )
    .await;

    let body = multipart_body(&[("title", None, b"My video")]);
    let req = test::TestRequest::post()
        .uri("/api/v1/upload")
        .insert_header((
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        ))
        .set_payload(body)
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 400);
    assert!(bus.published().await.is_empty());
}

#[actix_web::test]
async fn test_health() {
    let app = test::init_service(App::new().configure(handlers::configure)).await;
    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
}
