use thiserror::Error;

pub const NETWORK_ERROR_MESSAGE: &str = "Cannot reach the server. Check your connection";
pub const UNAUTHORIZED_MESSAGE: &str = "Invalid username or password";
pub const SERVER_ERROR_MESSAGE: &str = "Server error, try again later";

pub type ApiResult<T> = Result<T, ApiError>;

/// Failure of a single backend or object-storage call
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out")]
    Timeout,
    #[error("unauthorized")]
    Unauthorized,
    #[error("not found")]
    NotFound,
    #[error("server error (status {status})")]
    Server { status: u16 },
    #[error("request rejected (status {status}): {}", message.as_deref().unwrap_or("no details"))]
    Rejected {
        status: u16,
        message: Option<String>,
    },
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ApiError {
    /// Maps an HTTP error status and optional `{message}` body to the taxonomy
    pub fn from_status(status: u16, message: Option<String>) -> Self {
        match status {
            401 => ApiError::Unauthorized,
            404 => ApiError::NotFound,
            500..=599 => ApiError::Server { status },
            _ => ApiError::Rejected { status, message },
        }
    }

    /// Message suitable for showing to the user
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network(_) | ApiError::Timeout => NETWORK_ERROR_MESSAGE.to_string(),
            ApiError::Unauthorized => UNAUTHORIZED_MESSAGE.to_string(),
            ApiError::Server { .. } => SERVER_ERROR_MESSAGE.to_string(),
            ApiError::Rejected {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            ApiError::InvalidInput(message) => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized => Some(401),
            ApiError::NotFound => Some(404),
            ApiError::Server { status } | ApiError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Batch-fatal upload failures. Per-photo failures are reported in the
/// batch result instead.
#[derive(Debug, Error, PartialEq)]
pub enum UploadError {
    #[error("no images to upload")]
    EmptyBatch,
    #[error("an alert id is required to upload photos")]
    MissingAlert,
    #[error("requested {requested} upload slots but received {received}")]
    SlotCountMismatch { requested: usize, received: usize },
    #[error("could not obtain upload slots: {0}")]
    Slots(#[source] ApiError),
}
