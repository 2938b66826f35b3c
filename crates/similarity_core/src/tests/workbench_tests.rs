use std::{path::PathBuf, time::Duration};

use super::*;
use crate::source::SyntheticSource;
use shared::{error::ErrorCode, protocol::NotificationLevel};

fn video(role: VideoRole, name: &str) -> VideoInput {
    VideoInput {
        role,
        name: name.to_string(),
        path: PathBuf::from(format!("/videos/{name}")),
        size_bytes: 1024 * 1024,
        mime_type: "video/mp4".to_string(),
    }
}

fn ready_workbench() -> ComparisonWorkbench {
    let mut workbench = ComparisonWorkbench::new(StreamConfig::default());
    workbench.select(video(VideoRole::Reference, "reference.mp4"));
    workbench.select(video(VideoRole::Target, "target.mp4"));
    workbench
}

#[tokio::test]
async fn start_without_both_videos_is_rejected_with_notification() {
    let mut workbench = ComparisonWorkbench::new(StreamConfig::default());
    workbench.select(video(VideoRole::Reference, "reference.mp4"));

    let err = match workbench.start(SyntheticSource::flat()) {
        Err(err) => err,
        Ok(_) => panic!("start must fail without a target video"),
    };
    assert!(matches!(&err, StreamError::MissingInput(roles) if roles == &vec![VideoRole::Target]));
    assert_eq!(err.code(), ErrorCode::MissingInput);
    assert!(!workbench.is_processing());

    let notifications = workbench.drain_notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].level, NotificationLevel::Destructive);
    assert_eq!(notifications[0].title, "Missing videos");
    assert_eq!(
        notifications[0].description,
        "Please select both reference and target videos."
    );
    assert!(workbench.drain_notifications().is_empty());
}

#[tokio::test(start_paused = true)]
async fn full_run_reports_current_similarity_and_verdict() {
    let mut workbench = ready_workbench();
    assert!(workbench.can_start());
    assert_eq!(workbench.current_similarity(), 0.0);
    assert_eq!(workbench.verdict(), None);

    let handle = workbench.start(SyntheticSource::flat()).expect("start");
    assert!(!workbench.can_start());

    tokio::time::sleep(Duration::from_millis(1100)).await;
    assert_eq!(workbench.current_similarity(), 45.0);
    assert_eq!(workbench.verdict(), Some(Verdict::Fail));

    handle.finished().await;
    assert!(!workbench.is_processing());
    assert_eq!(workbench.entries().len(), 40);
    assert_eq!(workbench.current_similarity(), 95.0);
    assert_eq!(workbench.verdict(), Some(Verdict::Pass));
    assert_eq!(workbench.join().await, Some(StopReason::Completed));

    let titles: Vec<String> = workbench
        .drain_notifications()
        .into_iter()
        .map(|notification| notification.title)
        .collect();
    assert_eq!(titles, vec!["Processing started".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn selecting_a_new_video_resets_results() {
    let mut workbench = ready_workbench();
    let handle = workbench.start(SyntheticSource::flat()).expect("start");
    tokio::time::sleep(Duration::from_millis(1600)).await;
    assert_eq!(workbench.entries().len(), 3);

    workbench.select(video(VideoRole::Target, "other.webm"));
    assert!(handle.is_finished());
    assert!(!workbench.is_processing());
    assert!(workbench.entries().is_empty());
    assert_eq!(workbench.current_similarity(), 0.0);
    assert_eq!(
        workbench.input(VideoRole::Target).map(|input| input.name.as_str()),
        Some("other.webm")
    );

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert!(workbench.entries().is_empty());
}

#[tokio::test(start_paused = true)]
async fn clearing_a_video_keeps_results_but_blocks_restart() {
    let mut workbench = ready_workbench();
    workbench.start(SyntheticSource::flat()).expect("start");
    tokio::time::sleep(Duration::from_millis(1100)).await;
    assert!(workbench.stop());

    let cleared = workbench.clear(VideoRole::Reference);
    assert_eq!(cleared.map(|input| input.name), Some("reference.mp4".to_string()));
    assert_eq!(workbench.entries().len(), 2);
    assert_eq!(workbench.missing_inputs(), vec![VideoRole::Reference]);
    assert!(!workbench.can_start());
}

#[tokio::test(start_paused = true)]
async fn stop_notifies_only_when_something_was_running() {
    let mut workbench = ready_workbench();
    assert!(!workbench.stop());
    assert!(workbench.drain_notifications().is_empty());

    workbench.start(SyntheticSource::flat()).expect("start");
    assert!(workbench.stop());
    let titles: Vec<String> = workbench
        .drain_notifications()
        .into_iter()
        .map(|notification| notification.title)
        .collect();
    assert_eq!(titles, vec!["Processing started", "Processing stopped"]);
}

#[tokio::test(start_paused = true)]
async fn double_start_surfaces_already_running() {
    let mut workbench = ready_workbench();
    workbench.start(SyntheticSource::flat()).expect("start");
    workbench.drain_notifications();

    let err = match workbench.start(SyntheticSource::flat()) {
        Err(err) => err,
        Ok(_) => panic!("second start must be rejected"),
    };
    assert!(matches!(err, StreamError::AlreadyRunning(_)));
    let notifications = workbench.drain_notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].title, "Already processing");
}

#[test]
fn pass_threshold_is_configurable() {
    let workbench =
        ComparisonWorkbench::new(StreamConfig::default()).with_pass_threshold(40.0);
    assert_eq!(workbench.verdict(), None);
    assert_eq!(workbench.config(), StreamConfig::default());
}
