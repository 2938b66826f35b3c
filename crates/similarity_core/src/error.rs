use std::path::PathBuf;

use shared::{
    domain::{SessionId, VideoRole},
    error::{ApiError, ErrorCode},
};
use thiserror::Error;

pub type StreamResult<T> = Result<T, StreamError>;

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("similarity stream already running (session {0})")]
    AlreadyRunning(SessionId),
    #[error("invalid stream configuration: {0}")]
    InvalidConfig(String),
    #[error("missing {} video", join_roles(.0))]
    MissingInput(Vec<VideoRole>),
    #[error("unsupported video '{}' ({mime_type}); expected mp4, quicktime or webm", .path.display())]
    UnsupportedMedia { path: PathBuf, mime_type: String },
    #[error("no tokio runtime available to drive the stream timer")]
    NoRuntime,
    #[error("failed to inspect '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

fn join_roles(roles: &[VideoRole]) -> String {
    roles
        .iter()
        .map(|role| role.label())
        .collect::<Vec<_>>()
        .join(" and ")
}

impl StreamError {
    pub fn code(&self) -> ErrorCode {
        match self {
            StreamError::AlreadyRunning(_) => ErrorCode::AlreadyRunning,
            StreamError::InvalidConfig(_) => ErrorCode::Validation,
            StreamError::MissingInput(_) => ErrorCode::MissingInput,
            StreamError::UnsupportedMedia { .. } => ErrorCode::UnsupportedMedia,
            StreamError::NoRuntime | StreamError::Io { .. } => ErrorCode::Internal,
        }
    }

    pub fn to_api_error(&self) -> ApiError {
        let message = match self {
            StreamError::MissingInput(_) => {
                "Please select both reference and target videos.".to_string()
            }
            other => other.to_string(),
        };
        ApiError::new(self.code(), message)
    }
}
