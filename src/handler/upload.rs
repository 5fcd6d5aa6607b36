use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::response::Response;
use tracing::info;

use crate::app::state::AppState;
use crate::domain::pair_in_input_order;
use crate::error::{ApiError, UploadError};
use crate::render;
use crate::rows;

/// Handler for POST /uploadfile
///
/// Upload, row extraction and classification all finish before the first
/// byte of the body is produced, so failures never leave partial rows behind.
pub async fn upload_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let mut multipart =
        multipart.map_err(|rejection| UploadError::NotMultipart(rejection.body_text()))?;

    let upload = state.uploads.receive(&mut multipart).await?;
    info!(
        file_name = upload.file_name().unwrap_or("-"),
        bytes = upload.size(),
        "Received upload"
    );

    let path = upload.path().to_path_buf();
    let max_rows = state.max_rows;
    let records = tokio::task::spawn_blocking(move || rows::read_records(&path, max_rows))
        .await
        .map_err(|e| ApiError::Internal(format!("row extraction task failed: {e}")))??;
    info!(rows = records.len(), "Extracted rows from upload");

    let results = state.classifier.classify_collection(&records).await?;
    let labeled = pair_in_input_order(records, results)?;

    // Temp file is gone before the body starts streaming.
    drop(upload);

    info!(rows = labeled.len(), "Classified upload");
    Ok(render::table_rows(labeled))
}
