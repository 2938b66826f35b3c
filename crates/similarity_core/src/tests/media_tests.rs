use super::*;

#[tokio::test]
async fn probes_accepted_video_without_reading_it() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("reference.mp4");
    std::fs::write(&path, vec![0u8; 2048]).expect("write fixture");

    let input = probe_video(VideoRole::Reference, &path)
        .await
        .expect("probe");
    assert_eq!(input.role, VideoRole::Reference);
    assert_eq!(input.name, "reference.mp4");
    assert_eq!(input.size_bytes, 2048);
    assert_eq!(input.mime_type, "video/mp4");
    assert_eq!(input.path, path);
}

#[tokio::test]
async fn quicktime_and_webm_are_accepted() {
    let dir = tempfile::tempdir().expect("tempdir");
    for (file, mime) in [("a.mov", "video/quicktime"), ("b.webm", "video/webm")] {
        let path = dir.path().join(file);
        std::fs::write(&path, b"x").expect("write fixture");
        let input = probe_video(VideoRole::Target, &path).await.expect("probe");
        assert_eq!(input.mime_type, mime);
    }
}

#[tokio::test]
async fn rejects_non_video_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, b"not a video").expect("write fixture");

    let err = probe_video(VideoRole::Target, &path)
        .await
        .expect_err("text file must be rejected");
    assert!(matches!(err, StreamError::UnsupportedMedia { ref mime_type, .. } if mime_type == "text/plain"));
    assert_eq!(err.code(), shared::error::ErrorCode::UnsupportedMedia);
}

#[tokio::test]
async fn missing_file_and_directories_are_io_errors() {
    let dir = tempfile::tempdir().expect("tempdir");

    let missing = probe_video(VideoRole::Reference, dir.path().join("gone.mp4")).await;
    assert!(matches!(missing, Err(StreamError::Io { .. })));

    let folder = dir.path().join("folder.mp4");
    std::fs::create_dir(&folder).expect("mkdir");
    let folder = probe_video(VideoRole::Reference, &folder).await;
    assert!(matches!(folder, Err(StreamError::Io { .. })));
}

#[test]
fn unknown_extensions_fall_back_to_octet_stream() {
    assert_eq!(
        guess_mime_type(Path::new("clip.unknownext")),
        "application/octet-stream"
    );
    assert!(!is_accepted_video_type("application/octet-stream"));
}
