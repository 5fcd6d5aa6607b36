use std::path::{Path, PathBuf};

use axum::extract::Multipart;
use axum::extract::multipart::{Field, MultipartError};
use axum::http::StatusCode;
use tempfile::TempPath;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::config::UploadSettings;
use crate::error::UploadError;

const DEFAULT_SUFFIX: &str = ".csv";
const MAX_EXTENSION_LEN: usize = 16;

/// An uploaded file saved to disk for the duration of one request.
///
/// The file is removed when this handle is dropped.
#[derive(Debug)]
pub struct UploadedFile {
    path: TempPath,
    file_name: Option<String>,
    size: usize,
}

impl UploadedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name as sent by the client, if any.
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

/// Streams the configured multipart file field into a request-scoped temp file.
#[derive(Debug, Clone)]
pub struct UploadReceiver {
    dir: PathBuf,
    field: String,
    max_bytes: usize,
}

impl UploadReceiver {
    pub fn new(settings: &UploadSettings) -> Self {
        Self {
            dir: settings.dir.clone(),
            field: settings.field.clone(),
            max_bytes: settings.max_upload_bytes,
        }
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    pub async fn receive(&self, multipart: &mut Multipart) -> Result<UploadedFile, UploadError> {
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| self.multipart_error(e))?
        {
            if field.name() == Some(self.field.as_str()) {
                return self.persist(field).await;
            }
            debug!(field = ?field.name(), "Skipping multipart field");
        }

        Err(UploadError::MissingField(self.field.clone()))
    }

    async fn persist(&self, mut field: Field<'_>) -> Result<UploadedFile, UploadError> {
        let file_name = field.file_name().map(str::to_owned);
        let suffix = extension_suffix(file_name.as_deref());

        let (file, path) = tempfile::Builder::new()
            .prefix("upload-")
            .suffix(&suffix)
            .tempfile_in(&self.dir)?
            .into_parts();
        let mut file = tokio::fs::File::from_std(file);

        let mut size = 0;
        while let Some(chunk) = field.chunk().await.map_err(|e| self.multipart_error(e))? {
            size += chunk.len();
            if size > self.max_bytes {
                return Err(UploadError::TooLarge {
                    limit: self.max_bytes,
                });
            }
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        if size == 0 {
            return Err(UploadError::Empty);
        }

        debug!(path = %path.display(), size, "Stored upload");
        Ok(UploadedFile {
            path,
            file_name,
            size,
        })
    }

    fn multipart_error(&self, err: MultipartError) -> UploadError {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            UploadError::TooLarge {
                limit: self.max_bytes,
            }
        } else {
            UploadError::Malformed(err.body_text())
        }
    }
}

/// Suffix for the temp file, keeping the client's extension when it is a
/// plain alphanumeric one.
fn extension_suffix(file_name: Option<&str>) -> String {
    file_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| {
            !ext.is_empty()
                && ext.len() <= MAX_EXTENSION_LEN
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map_or_else(|| DEFAULT_SUFFIX.to_string(), |ext| format!(".{ext}"))
}
