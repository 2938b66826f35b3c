//! Comparison page state: the two selected videos, the stream controller, and
//! the notifications a front-end would surface as toasts.

use shared::{
    domain::{SimilarityEntry, VideoInput, VideoRole},
    protocol::{Notification, SessionSnapshot, StopReason, StreamEvent},
};
use tokio::sync::broadcast;
use tracing::warn;

use crate::{
    controller::{SimilarityStreamController, StreamConfig, StreamHandle},
    error::{StreamError, StreamResult},
    model::{Verdict, DEFAULT_PASS_THRESHOLD},
    source::SimilaritySource,
};

pub struct ComparisonWorkbench {
    controller: SimilarityStreamController,
    config: StreamConfig,
    pass_threshold: f64,
    reference: Option<VideoInput>,
    target: Option<VideoInput>,
    notifications: Vec<Notification>,
}

impl ComparisonWorkbench {
    pub fn new(config: StreamConfig) -> Self {
        Self {
            controller: SimilarityStreamController::new(),
            config,
            pass_threshold: DEFAULT_PASS_THRESHOLD,
            reference: None,
            target: None,
            notifications: Vec::new(),
        }
    }

    pub fn with_pass_threshold(mut self, pass_threshold: f64) -> Self {
        self.pass_threshold = pass_threshold;
        self
    }

    pub fn config(&self) -> StreamConfig {
        self.config
    }

    /// Selecting a new video invalidates any results computed so far.
    pub fn select(&mut self, input: VideoInput) {
        match input.role {
            VideoRole::Reference => self.reference = Some(input),
            VideoRole::Target => self.target = Some(input),
        }
        self.controller.reset();
    }

    /// Forgets the selection for `role`; results are kept.
    pub fn clear(&mut self, role: VideoRole) -> Option<VideoInput> {
        match role {
            VideoRole::Reference => self.reference.take(),
            VideoRole::Target => self.target.take(),
        }
    }

    pub fn input(&self, role: VideoRole) -> Option<&VideoInput> {
        match role {
            VideoRole::Reference => self.reference.as_ref(),
            VideoRole::Target => self.target.as_ref(),
        }
    }

    pub fn missing_inputs(&self) -> Vec<VideoRole> {
        [VideoRole::Reference, VideoRole::Target]
            .into_iter()
            .filter(|role| self.input(*role).is_none())
            .collect()
    }

    pub fn can_start(&self) -> bool {
        self.missing_inputs().is_empty() && !self.controller.is_active()
    }

    pub fn is_processing(&self) -> bool {
        self.controller.is_active()
    }

    pub fn start<S>(&mut self, source: S) -> StreamResult<StreamHandle>
    where
        S: SimilaritySource + 'static,
    {
        self.start_with(source, |_, _| {})
    }

    /// Starts a comparison once both videos are selected. A missing video is
    /// reported both as the error and as a destructive notification.
    pub fn start_with<S, F>(&mut self, source: S, on_update: F) -> StreamResult<StreamHandle>
    where
        S: SimilaritySource + 'static,
        F: FnMut(f64, f64) + Send + 'static,
    {
        let missing = self.missing_inputs();
        if !missing.is_empty() {
            let err = StreamError::MissingInput(missing);
            warn!(%err, "comparison not started");
            self.notifications
                .push(Notification::from(&err.to_api_error()));
            return Err(err);
        }

        match self.controller.start(self.config, source, on_update) {
            Ok(handle) => {
                self.notifications.push(Notification::info(
                    "Processing started",
                    "Analyzing face similarity between videos...",
                ));
                Ok(handle)
            }
            Err(err) => {
                self.notifications
                    .push(Notification::from(&err.to_api_error()));
                Err(err)
            }
        }
    }

    pub fn stop(&mut self) -> bool {
        let stopped = self.controller.stop();
        if stopped {
            self.notifications.push(Notification::info(
                "Processing stopped",
                "Face similarity analysis has been stopped.",
            ));
        }
        stopped
    }

    pub fn reset(&mut self) {
        self.controller.reset();
    }

    /// Latest similarity, 0 before the first tick.
    pub fn current_similarity(&self) -> f64 {
        self.controller
            .latest()
            .map(|entry| entry.similarity)
            .unwrap_or(0.0)
    }

    pub fn verdict(&self) -> Option<Verdict> {
        Verdict::from_similarity(self.current_similarity(), self.pass_threshold)
    }

    pub fn entries(&self) -> Vec<SimilarityEntry> {
        self.controller.entries()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.controller.snapshot()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<StreamEvent> {
        self.controller.subscribe_events()
    }

    pub async fn join(&mut self) -> Option<StopReason> {
        self.controller.join().await
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }
}

#[cfg(test)]
#[path = "tests/workbench_tests.rs"]
mod tests;
