use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use common::storage::{MediaPath, StorageError};
use tokio_util::io::ReaderStream;
use tracing::instrument;

use crate::error::AppError;
use crate::state::AppState;

/// Stream a stored media file.
///
/// Serves the canonical store-relative paths persisted in category, product
/// and variant records.
#[utoipa::path(
    get,
    path = "/media/{path}",
    tag = "Media",
    operation_id = "getMedia",
    summary = "Stream a stored media file",
    params(("path" = String, Path, description = "Store-relative media path")),
    responses(
        (status = 200, description = "File content"),
        (status = 404, description = "File not found (NOT_FOUND)"),
    ),
)]
#[instrument(skip(state))]
pub async fn serve_media(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Response, AppError> {
    let media_path =
        MediaPath::parse(&path).map_err(|_| AppError::NotFound("File not found".into()))?;

    let size = match state.blob_store.size(&media_path).await {
        Ok(size) => size,
        Err(StorageError::NotFound(_)) => {
            return Err(AppError::NotFound("File not found".into()));
        }
        Err(e) => return Err(e.into()),
    };

    let reader = state.blob_store.read_stream(&media_path).await?;
    let body = Body::from_stream(ReaderStream::new(reader));

    let content_type = mime_guess::from_path(media_path.as_str())
        .first()
        .map(|m| m.to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string());

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, size.to_string())
        .header(header::CACHE_CONTROL, "public, max-age=3600")
        .body(body)
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))
}
