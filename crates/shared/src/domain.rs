use std::{fmt, path::PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

id_newtype!(SessionId);

/// Which side of the comparison a video was selected for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoRole {
    Reference,
    Target,
}

impl VideoRole {
    pub fn label(self) -> &'static str {
        match self {
            VideoRole::Reference => "reference",
            VideoRole::Target => "target",
        }
    }
}

impl fmt::Display for VideoRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Opaque handle to a selected video. The bytes are never read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoInput {
    pub role: VideoRole,
    pub name: String,
    pub path: PathBuf,
    pub size_bytes: u64,
    pub mime_type: String,
}

impl VideoInput {
    pub fn size_mb(&self) -> f64 {
        self.size_bytes as f64 / 1024.0 / 1024.0
    }

    /// `name (12.34 MB)`
    pub fn display_label(&self) -> String {
        format!("{} ({:.2} MB)", self.name, self.size_mb())
    }
}

/// One similarity measurement, `timestamp` in seconds since the session started.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityEntry {
    pub timestamp: f64,
    pub similarity: f64,
}

impl SimilarityEntry {
    /// Log-style `mm:ss` rendering of the timestamp.
    pub fn clock(&self) -> String {
        let total = self.timestamp.max(0.0).floor() as u64;
        format!("{:02}:{:02}", total / 60, total % 60)
    }
}
