use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    domain::{SessionId, SimilarityEntry},
    error::ApiError,
};

/// Why a session stopped ticking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StopReason {
    /// `stop()` or the cancellation handle.
    Stopped,
    /// Elapsed time reached the configured maximum.
    Completed,
    /// A tick failed; the session was stopped, the host keeps running.
    Failed { message: String },
    /// The owning controller was dropped while the session was running.
    TornDown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: Option<SessionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    pub active: bool,
    pub elapsed: f64,
    pub entries: Vec<SimilarityEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<StopReason>,
}

impl SessionSnapshot {
    pub fn idle() -> Self {
        Self {
            session_id: None,
            started_at: None,
            active: false,
            elapsed: 0.0,
            entries: Vec::new(),
            stop_reason: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum StreamEvent {
    Started {
        session_id: SessionId,
        started_at: DateTime<Utc>,
        tick_interval_secs: f64,
        max_duration_secs: f64,
    },
    Tick {
        session_id: SessionId,
        entry: SimilarityEntry,
    },
    Stopped {
        session_id: SessionId,
        reason: StopReason,
        entries: usize,
    },
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Info,
    Destructive,
}

/// Transient user-facing message, the terminal counterpart of a toast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub description: String,
}

impl Notification {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Destructive,
            title: title.into(),
            description: description.into(),
        }
    }
}

impl From<&ApiError> for Notification {
    fn from(value: &ApiError) -> Self {
        Notification::destructive(value.code.title(), value.message.clone())
    }
}
