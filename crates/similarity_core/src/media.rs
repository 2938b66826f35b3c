use std::path::Path;

use shared::domain::{VideoInput, VideoRole};

use crate::error::{StreamError, StreamResult};

pub const ACCEPTED_VIDEO_TYPES: &[&str] = &["video/mp4", "video/quicktime", "video/webm"];

pub fn is_accepted_video_type(mime_type: &str) -> bool {
    ACCEPTED_VIDEO_TYPES.contains(&mime_type)
}

pub fn guess_mime_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first()
        .map(|mime| mime.essence_str().to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string())
}

/// Builds an opaque [`VideoInput`] from file metadata. Contents are never read.
pub async fn probe_video(role: VideoRole, path: impl AsRef<Path>) -> StreamResult<VideoInput> {
    let path = path.as_ref();
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|source| StreamError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    if !metadata.is_file() {
        return Err(StreamError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a regular file"),
        });
    }

    let mime_type = guess_mime_type(path);
    if !is_accepted_video_type(&mime_type) {
        return Err(StreamError::UnsupportedMedia {
            path: path.to_path_buf(),
            mime_type,
        });
    }

    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    tracing::debug!(%role, %name, size_bytes = metadata.len(), %mime_type, "video selected");

    Ok(VideoInput {
        role,
        name,
        path: path.to_path_buf(),
        size_bytes: metadata.len(),
        mime_type,
    })
}

#[cfg(test)]
#[path = "tests/media_tests.rs"]
mod tests;
