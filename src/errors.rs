use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::time::Duration;
use thiserror::Error;

// --- Outbound service errors ---

#[derive(Error, Debug)]
pub enum CaptionError {
    #[error("GROQ_API_KEY is not configured")]
    MissingApiKey,

    #[error("Caption request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Caption request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Caption API returned {status}: {body}")]
    Upstream { status: reqwest::StatusCode, body: String },
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Invalid render URL: {0}")]
    InvalidUrl(String),

    #[error("Image request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Image API returned {0}")]
    Status(reqwest::StatusCode),

    #[error("Image API returned an empty body")]
    EmptyBody,
}

// --- History store errors ---

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("History backend error: {0}")]
    BackendError(#[from] anyhow::Error), // Wrap anyhow errors from the S3 layer

    #[error("Stored history could not be decoded: {0}")]
    DataCorruption(String),
}

// --- Orchestration errors ---

/// Why a single template attempt was abandoned.
#[derive(Error, Debug)]
pub enum AttemptError {
    #[error(transparent)]
    Caption(#[from] CaptionError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Failed to generate any memes after multiple attempts.")]
    NoMemesGenerated { attempts: usize },
}

// --- Web Layer Error ---

#[derive(Error, Debug)]
pub enum AppError {
    // Input validation / request parsing errors
    #[error("Topic is required")]
    TopicRequired,
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("History entry not found: {0}")]
    HistoryNotFound(String),

    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error("History storage failed")]
    HistoryError(#[source] HistoryError),

    // Configuration / Startup errors
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Initialization error: {0}")]
    InitError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<HistoryError> for AppError {
    fn from(err: HistoryError) -> Self {
        AppError::HistoryError(err)
    }
}

impl From<crate::config::ConfigError> for AppError {
    fn from(err: crate::config::ConfigError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

// --- Axum Response Implementation ---

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            // 4xx Client Errors
            AppError::TopicRequired => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::HistoryNotFound(id) => {
                tracing::debug!(history_id = %id, "History entry not found");
                (StatusCode::NOT_FOUND, "Not found".to_string())
            }

            // 5xx Server Errors
            AppError::Generation(e @ GenerationError::NoMemesGenerated { attempts }) => {
                tracing::error!(attempts, "Meme generation failed");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            AppError::HistoryError(e) => {
                tracing::error!(error.source = ?e, "History store error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, "History storage operation failed".to_string())
            }
            AppError::ConfigError(msg) => {
                tracing::error!("Configuration error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Server configuration error".to_string())
            }
            AppError::InitError(msg) => {
                tracing::error!("Initialization error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Server initialization error".to_string())
            }
            AppError::IoError(e) => {
                tracing::error!("IO error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "An internal server error occurred".to_string())
            }
        };

        tracing::debug!(error.message = %error_message, error.status = %status, "Responding with error");

        let body = Json(serde_json::json!({ "success": false, "error": error_message }));
        (status, body).into_response()
    }
}
