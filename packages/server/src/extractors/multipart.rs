//! Multipart field readers shared by the category and product forms.

use axum::extract::multipart::Field;

use crate::catalog::images::Upload;
use crate::error::AppError;

/// Read a text field to completion.
pub async fn text_field(field: Field<'_>, name: &str) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read '{name}': {e}")))
}

/// Buffer a file field, enforcing the per-file size cap.
pub async fn file_field(
    mut field: Field<'_>,
    name: &str,
    max_size: u64,
) -> Result<Upload, AppError> {
    let file_name = field.file_name().map(|s| s.to_string());

    let mut bytes = Vec::new();
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| AppError::Validation(format!("Upload read error on '{name}': {e}")))?
    {
        if (bytes.len() + chunk.len()) as u64 > max_size {
            return Err(AppError::Validation(format!(
                "File in '{name}' exceeds maximum size of {max_size} bytes"
            )));
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(Upload { file_name, bytes })
}
