use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Json, Response},
};
use axum_extra::extract::Multipart;
use tokio_util::io::ReaderStream;

use crate::errors::{AppError, Result};
use crate::services::upload_service::{classify, content_type_for, StoredUpload};
use crate::state::AppState;

/// Stores the first file part of the form.
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<StoredUpload>> {
    while let Some(field) = multipart.next_field().await? {
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };

        let content_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| "application/octet-stream".to_string());

        // Reject before buffering the body.
        if classify(&content_type).is_none() {
            return Err(AppError::UnsupportedFileType(content_type));
        }

        let data = field.bytes().await?;
        let stored = state
            .uploads
            .save(&data, Some(file_name.as_str()).filter(|n| !n.is_empty()), &content_type)
            .await?;

        tracing::info!(
            "📁 Stored upload {} ({}, {} bytes)",
            stored.filename,
            stored.content_type,
            stored.size
        );
        return Ok(Json(stored));
    }

    Err(AppError::NoFileProvided)
}

pub async fn serve_upload(
    State(state): State<AppState>,
    Path(file_name): Path<String>,
) -> Result<Response> {
    let file_path = state
        .uploads
        .resolve(&file_name)
        .ok_or_else(|| AppError::not_found("File"))?;

    let file = tokio::fs::File::open(&file_path)
        .await
        .map_err(|_| AppError::not_found("File"))?;

    // Convert the file into a Stream
    let stream = ReaderStream::new(file);

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type_for(&file_name))
        .header(header::CACHE_CONTROL, "public, max-age=31536000")
        .body(axum::body::Body::from_stream(stream))
        .map_err(|e| AppError::Io(std::io::Error::other(e)))
}
