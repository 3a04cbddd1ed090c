use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::ApiError;
use crate::routes::auth::ServerState;

const ALLOWED_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "gif", "bmp", "webp"];

#[derive(Serialize)]
pub struct UploadOutput {
    pub url: String,
    pub file_name: String,
}

/// Accept one image under the `file` field and store it with a generated
/// name. The stored file is served back under `/uploads/images/`.
pub async fn upload_image(
    State(state): State<ServerState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadOutput>), ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let original = field.file_name().unwrap_or_default().to_string();
        let ext = original
            .rsplit('.')
            .next()
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
            return Err(ApiError::bad_request(format!(
                "unsupported file type: {:?} (allowed: {})",
                original,
                ALLOWED_EXTENSIONS.join(", ")
            )));
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(e.to_string()))?;
        if data.is_empty() {
            return Err(ApiError::bad_request("empty upload"));
        }
        if data.len() as u64 > state.uploads.max_bytes {
            return Err(ApiError::bad_request(format!(
                "file too large (max {} bytes)",
                state.uploads.max_bytes
            )));
        }

        let file_name = format!("{}.{}", Uuid::new_v4(), ext);
        let path = std::path::Path::new(&state.uploads.dir).join(&file_name);
        tokio::fs::write(&path, &data)
            .await
            .map_err(|e| ApiError::internal(e.to_string()))?;

        let out = UploadOutput {
            url: format!("/uploads/images/{}", file_name),
            file_name,
        };
        return Ok((StatusCode::CREATED, Json(out)));
    }
    Err(ApiError::bad_request("missing \"file\" field"))
}

/// Remove a previously uploaded image by its stored name.
pub async fn delete_image(
    State(state): State<ServerState>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    // Stored names are `{uuid}.{ext}`; anything else is not ours to delete
    let valid = name
        .split_once('.')
        .map(|(stem, ext)| {
            Uuid::parse_str(stem).is_ok() && ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
        })
        .unwrap_or(false);
    if !valid {
        return Err(ApiError::bad_request("invalid file name"));
    }
    let path = std::path::Path::new(&state.uploads.dir).join(&name);
    match tokio::fs::remove_file(&path).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ApiError::not_found("file not found"))
        }
        Err(e) => Err(ApiError::internal(e.to_string())),
    }
}
