use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// Start-up and server lifecycle failures.
#[derive(Error, Debug)]
pub enum FrontendError {
    #[error("Failed to load configuration: {0}")]
    Config(String),

    #[error("Failed to build classifier client: {0}")]
    Classifier(#[from] ClassificationError),

    #[error("Failed to bind to address {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),
}

/// Failures while receiving the multipart upload.
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("request is not a multipart upload: {0}")]
    NotMultipart(String),

    #[error("malformed multipart body: {0}")]
    Malformed(String),

    #[error("missing file field `{0}`")]
    MissingField(String),

    #[error("uploaded file is empty")]
    Empty,

    #[error("uploaded file exceeds the limit of {limit} bytes")]
    TooLarge { limit: usize },

    #[error("failed to store upload: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures while turning the uploaded file into text records.
#[derive(Error, Debug)]
pub enum RowExtractionError {
    #[error("failed to open uploaded file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("line {line} has {found} columns, expected a single text column")]
    UnexpectedColumns { line: u64, found: usize },

    #[error("uploaded file contains no rows to classify")]
    Empty,

    #[error("uploaded file has more than {limit} rows")]
    TooManyRows { limit: usize },
}

/// Failures talking to the remote classifier.
#[derive(Error, Debug)]
pub enum ClassificationError {
    #[error("invalid classifier configuration: {0}")]
    Config(String),

    #[error("classifier request timed out: {0}")]
    Timeout(String),

    #[error("classifier request failed: {0}")]
    Transport(String),

    #[error("classifier returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode classifier response: {0}")]
    Decode(String),

    #[error("classifier results do not match the uploaded rows: {0}")]
    Mismatch(String),
}

/// Request-level error for `POST /uploadfile`.
///
/// Every variant renders as a terminated response with a JSON body.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Rows(#[from] RowExtractionError),

    #[error(transparent)]
    Classification(#[from] ClassificationError),

    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Upload(UploadError::TooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Upload(UploadError::Io(_)) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Upload(_) | ApiError::Rows(_) => StatusCode::BAD_REQUEST,
            ApiError::Classification(ClassificationError::Timeout(_)) => {
                StatusCode::GATEWAY_TIMEOUT
            }
            ApiError::Classification(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Stable machine-readable error kind used in the response body.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Upload(UploadError::TooLarge { .. }) => "payload_too_large",
            ApiError::Upload(UploadError::Io(_)) | ApiError::Internal(_) => "internal",
            ApiError::Upload(_) => "upload",
            ApiError::Rows(_) => "row_extraction",
            ApiError::Classification(ClassificationError::Timeout(_)) => "classification_timeout",
            ApiError::Classification(_) => "classification",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(kind = self.kind(), status = %status, "Upload request failed: {}", self);
        } else {
            warn!(kind = self.kind(), status = %status, "Rejected upload: {}", self);
        }

        let body = ErrorBody {
            error: self.kind(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
