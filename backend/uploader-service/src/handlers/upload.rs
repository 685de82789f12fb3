/// Multipart intake for new videos
use actix_multipart::Multipart;
use actix_web::{web, HttpRequest, HttpResponse};
use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use tracing::{debug, warn};
use uuid::Uuid;

use video_core::constants::{MAX_IMAGE_SIZE, MAX_VIDEO_SIZE};

use crate::error::{Result, UploadError};
use crate::saga::{UploadRequest, UploadSaga};

/// Guardrail on the whole multipart body
const MAX_UPLOAD_BYTES: usize = MAX_VIDEO_SIZE + MAX_IMAGE_SIZE + 64 * 1024;

/// Header carrying the creator identity validated by the gateway
pub const CREATOR_ID_HEADER: &str = "X-Creator-ID";

fn creator_id(req: &HttpRequest) -> Result<Uuid> {
    req.headers()
        .get(CREATOR_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| Uuid::parse_str(value.trim()).ok())
        .ok_or_else(|| UploadError::Validation("Missing validated Creator ID header.".into()))
}

#[derive(Default)]
struct UploadForm {
    title: Option<String>,
    description: Option<String>,
    image: Option<(String, Bytes)>,
    video: Option<Bytes>,
}

async fn read_form(mut payload: Multipart) -> Result<UploadForm> {
    let mut form = UploadForm::default();
    let mut total_bytes: usize = 0;

    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| UploadError::Validation(format!("malformed multipart body: {}", e)))?;

        let name = field.name().unwrap_or_default().to_string();
        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string);

        let mut data = BytesMut::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk
                .map_err(|e| UploadError::Validation(format!("error reading part {}: {}", name, e)))?;
            total_bytes += chunk.len();
            if total_bytes > MAX_UPLOAD_BYTES {
                return Err(UploadError::Validation("upload exceeds size limit".into()));
            }
            data.extend_from_slice(&chunk);
        }
        let data = data.freeze();

        match name.as_str() {
            "title" => form.title = Some(String::from_utf8_lossy(&data).into_owned()),
            "description" => form.description = Some(String::from_utf8_lossy(&data).into_owned()),
            "image" => {
                form.image = Some((file_name.unwrap_or_else(|| "thumbnail".to_string()), data))
            }
            "video" => form.video = Some(data),
            other => debug!("Ignoring unexpected multipart part: {}", other),
        }
    }

    Ok(form)
}

/// POST /api/v1/upload
pub async fn upload_video(
    req: HttpRequest,
    saga: web::Data<UploadSaga>,
    payload: Multipart,
) -> Result<HttpResponse> {
    let creator_id = creator_id(&req)?;
    let form = read_form(payload).await?;

    let (image_name, image) = form
        .image
        .ok_or_else(|| UploadError::Validation("image is required".into()))?;

    let request = UploadRequest {
        creator_id,
        title: form.title.unwrap_or_default(),
        description: form.description.unwrap_or_default(),
        image_name,
        image,
        video: form.video.unwrap_or_default(),
    };

    if let Err(err) = request.validate() {
        warn!(creator_id = %creator_id, "Rejected upload: {}", err);
        return Err(err);
    }

    saga.submit(request).await?;

    Ok(HttpResponse::Accepted().json(serde_json::json!({
        "message": "Video processing started."
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_creator_id_header_required() {
        let req = TestRequest::default().to_http_request();
        assert!(matches!(creator_id(&req), Err(UploadError::Validation(_))));

        let req = TestRequest::default()
            .insert_header((CREATOR_ID_HEADER, "not-a-uuid"))
            .to_http_request();
        assert!(creator_id(&req).is_err());

        let id = Uuid::new_v4();
        let req = TestRequest::default()
            .insert_header((CREATOR_ID_HEADER, id.to_string()))
            .to_http_request();
        assert_eq!(creator_id(&req).unwrap(), id);
    }
}
