use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    MissingInput,
    UnsupportedMedia,
    AlreadyRunning,
    Validation,
    Internal,
}

impl ErrorCode {
    /// Short headline used for user-facing notifications.
    pub fn title(self) -> &'static str {
        match self {
            ErrorCode::MissingInput => "Missing videos",
            ErrorCode::UnsupportedMedia => "Unsupported video",
            ErrorCode::AlreadyRunning => "Already processing",
            ErrorCode::Validation => "Invalid settings",
            ErrorCode::Internal => "Processing failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}
