use super::{ApiError, ApiResult, ErrorResponse};
use crate::storage::image::{object_name, validate_image, MAX_FILE_SIZE};
use crate::AppState;
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

/// Multipart overhead allowed on top of the file itself.
const FORM_OVERHEAD: usize = 64 * 1024;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/upload", post(upload))
        .layer(DefaultBodyLimit::max(MAX_FILE_SIZE + FORM_OVERHEAD))
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UploadResponse {
    pub message: String,
    /// Public URL of the stored image
    pub url: String,
}

#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadRequest {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

#[utoipa::path(
    post,
    path = "/upload",
    tag = "images",
    request_body(content_type = "multipart/form-data", content = UploadRequest),
    responses(
        (status = 200, description = "Image stored", body = UploadResponse),
        (status = 400, description = "No file, or not an image", body = ErrorResponse),
        (status = 500, description = "Upload to storage failed", body = ErrorResponse)
    )
)]
pub async fn upload(
    State(services): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    // Find the `file` field; other fields are skipped.
    let (file_name, data) = loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Err(ApiError::BadRequest("No file provided".to_string())),
            Err(e) => {
                tracing::warn!("Multipart read error: {}", e);
                return Err(multipart_error(e.status(), e.body_text()));
            }
        };
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let data = field.bytes().await.map_err(|e| {
            tracing::warn!("Field read error: {}", e);
            multipart_error(e.status(), e.body_text())
        })?;
        break (file_name, data);
    };

    if data.is_empty() {
        return Err(ApiError::BadRequest("Uploaded file is empty".to_string()));
    }
    if data.len() > MAX_FILE_SIZE {
        return Err(ApiError::BadRequest(format!(
            "File too large. Maximum size is {} bytes",
            MAX_FILE_SIZE
        )));
    }

    let format = validate_image(&data).map_err(ApiError::BadRequest)?;
    let name = object_name(file_name.as_deref(), format);

    let url = services
        .images
        .upload(&name, format.to_mime_type(), data.to_vec())
        .await?;

    tracing::info!(object = %name, size = data.len(), "image uploaded");

    Ok(Json(UploadResponse {
        message: "File uploaded successfully".to_string(),
        url,
    }))
}

fn multipart_error(status: StatusCode, body_text: String) -> ApiError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::BadRequest(format!(
            "File too large. Maximum size is {} bytes",
            MAX_FILE_SIZE
        ))
    } else {
        ApiError::BadRequest(format!("Failed to read multipart data: {}", body_text))
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(upload),
    components(schemas(UploadRequest, UploadResponse))
)]
pub struct ApiDoc;
