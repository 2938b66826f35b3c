//! Lifecycle of one simulated similarity stream: start, periodic emit, stop,
//! reset, and cancellation on teardown.
//!
//! The timer runs as a tokio task that shares the session state with the
//! controller through a mutex. Every tick re-checks its cancellation token
//! while holding that lock, and `stop()` takes the same lock after
//! cancelling, so once `stop()` returns no further update can land.

use std::{
    panic::{self, AssertUnwindSafe},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use chrono::{DateTime, Utc};
use shared::{
    domain::{SessionId, SimilarityEntry},
    protocol::{SessionSnapshot, StopReason, StreamEvent},
};
use tokio::{
    sync::{broadcast, mpsc},
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::{
    error::{StreamError, StreamResult},
    model::clamp_similarity,
    source::SimilaritySource,
};

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(500);
pub const DEFAULT_MAX_DURATION: Duration = Duration::from_secs(20);
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Lazy, finite sequence of entries for one session. Ends when the session stops.
pub type EntryStream = UnboundedReceiverStream<SimilarityEntry>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConfig {
    pub tick_interval: Duration,
    pub max_duration: Duration,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            max_duration: DEFAULT_MAX_DURATION,
        }
    }
}

impl StreamConfig {
    pub fn from_secs(tick_interval_secs: f64, max_duration_secs: f64) -> StreamResult<Self> {
        let tick_interval = Duration::try_from_secs_f64(tick_interval_secs).map_err(|_| {
            StreamError::InvalidConfig(format!("tick interval {tick_interval_secs}s"))
        })?;
        let max_duration = Duration::try_from_secs_f64(max_duration_secs).map_err(|_| {
            StreamError::InvalidConfig(format!("max duration {max_duration_secs}s"))
        })?;
        let config = Self {
            tick_interval,
            max_duration,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> StreamResult<()> {
        if self.tick_interval.is_zero() {
            return Err(StreamError::InvalidConfig(
                "tick interval must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Default)]
struct SessionState {
    id: Option<SessionId>,
    started_at: Option<DateTime<Utc>>,
    active: bool,
    elapsed: Duration,
    entries: Vec<SimilarityEntry>,
    stop_reason: Option<StopReason>,
    token: Option<CancellationToken>,
}

impl SessionState {
    /// Marks the current session inactive. Returns `false` if nothing was running.
    fn finish(&mut self, reason: StopReason, events: &broadcast::Sender<StreamEvent>) -> bool {
        if !self.active {
            return false;
        }
        self.active = false;
        if let Some(token) = &self.token {
            token.cancel();
        }
        self.stop_reason = Some(reason.clone());
        if let Some(session_id) = self.id {
            let _ = events.send(StreamEvent::Stopped {
                session_id,
                reason,
                entries: self.entries.len(),
            });
        }
        true
    }
}

struct Shared {
    state: Mutex<SessionState>,
    events: broadcast::Sender<StreamEvent>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Cancellation handle returned by `start`. Cloneable; cancelling any clone stops the session.
#[derive(Clone)]
pub struct StreamHandle {
    session_id: SessionId,
    token: CancellationToken,
    shared: Arc<Shared>,
}

impl StreamHandle {
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Stops the session this handle belongs to. A no-op once it has ended or
    /// been replaced by a newer session.
    pub fn cancel(&self) -> bool {
        self.token.cancel();
        let mut state = self.shared.lock();
        if state.id != Some(self.session_id) {
            return false;
        }
        state.finish(StopReason::Stopped, &self.shared.events)
    }

    pub fn is_finished(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the session stops for any reason.
    pub async fn finished(&self) {
        self.token.cancelled().await;
    }

    /// Why the session stopped; `None` while running or after a reset.
    pub fn stop_reason(&self) -> Option<StopReason> {
        let state = self.shared.lock();
        if state.id != Some(self.session_id) {
            return None;
        }
        state.stop_reason.clone()
    }
}

/// Owns at most one running similarity stream. Dropping the controller
/// cancels the stream.
pub struct SimilarityStreamController {
    shared: Arc<Shared>,
    task: Option<JoinHandle<()>>,
}

impl Default for SimilarityStreamController {
    fn default() -> Self {
        Self::new()
    }
}

impl SimilarityStreamController {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(SessionState::default()),
                events,
            }),
            task: None,
        }
    }

    /// Starts a session that calls `on_update(elapsed_secs, similarity)` once per tick.
    ///
    /// Fails with [`StreamError::AlreadyRunning`] while a session is active;
    /// the running session is left untouched. Entries of a previous, finished
    /// session are discarded. Must be called from within a tokio runtime.
    /// `on_update` must not call back into the controller.
    pub fn start<S, F>(
        &mut self,
        config: StreamConfig,
        source: S,
        on_update: F,
    ) -> StreamResult<StreamHandle>
    where
        S: SimilaritySource + 'static,
        F: FnMut(f64, f64) + Send + 'static,
    {
        config.validate()?;
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| StreamError::NoRuntime)?;

        let session_id = SessionId::new();
        let token = CancellationToken::new();
        {
            let mut state = self.shared.lock();
            if state.active {
                if let Some(running) = state.id {
                    return Err(StreamError::AlreadyRunning(running));
                }
            }

            let started_at = Utc::now();
            *state = SessionState {
                id: Some(session_id),
                started_at: Some(started_at),
                active: true,
                elapsed: Duration::ZERO,
                entries: Vec::new(),
                stop_reason: None,
                token: Some(token.clone()),
            };
            let _ = self.shared.events.send(StreamEvent::Started {
                session_id,
                started_at,
                tick_interval_secs: config.tick_interval.as_secs_f64(),
                max_duration_secs: config.max_duration.as_secs_f64(),
            });
        }

        info!(
            session = %session_id,
            tick_secs = config.tick_interval.as_secs_f64(),
            max_secs = config.max_duration.as_secs_f64(),
            "similarity stream started"
        );

        let task = runtime.spawn(run_ticks(
            Arc::clone(&self.shared),
            session_id,
            token.clone(),
            config,
            source,
            on_update,
        ));
        if let Some(previous) = self.task.replace(task) {
            previous.abort();
        }

        Ok(StreamHandle {
            session_id,
            token,
            shared: Arc::clone(&self.shared),
        })
    }

    /// Like [`start`](Self::start), but delivers entries as a stream instead of a callback.
    pub fn start_stream<S>(
        &mut self,
        config: StreamConfig,
        source: S,
    ) -> StreamResult<(StreamHandle, EntryStream)>
    where
        S: SimilaritySource + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = self.start(config, source, move |timestamp, similarity| {
            let _ = tx.send(SimilarityEntry {
                timestamp,
                similarity,
            });
        })?;
        Ok((handle, UnboundedReceiverStream::new(rx)))
    }

    /// Stops the running session, keeping its entries. Returns `false` when idle.
    pub fn stop(&mut self) -> bool {
        let stopped = self
            .shared
            .lock()
            .finish(StopReason::Stopped, &self.shared.events);
        if stopped {
            info!("similarity stream stopped");
        }
        stopped
    }

    /// Stops if running, then discards all entries and rewinds elapsed time.
    pub fn reset(&mut self) {
        {
            let mut state = self.shared.lock();
            state.finish(StopReason::Stopped, &self.shared.events);
            *state = SessionState::default();
        }
        let _ = self.shared.events.send(StreamEvent::Reset);
        debug!("similarity stream reset");
    }

    /// Waits for the timer task of the latest session to exit.
    pub async fn join(&mut self) -> Option<StopReason> {
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                if !err.is_cancelled() {
                    error!(%err, "similarity stream task failed");
                }
            }
        }
        self.shared.lock().stop_reason.clone()
    }

    pub fn is_active(&self) -> bool {
        self.shared.lock().active
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.shared.lock().id
    }

    pub fn elapsed(&self) -> f64 {
        self.shared.lock().elapsed.as_secs_f64()
    }

    pub fn entries(&self) -> Vec<SimilarityEntry> {
        self.shared.lock().entries.clone()
    }

    pub fn latest(&self) -> Option<SimilarityEntry> {
        self.shared.lock().entries.last().copied()
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        self.shared.lock().stop_reason.clone()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.shared.lock();
        SessionSnapshot {
            session_id: state.id,
            started_at: state.started_at,
            active: state.active,
            elapsed: state.elapsed.as_secs_f64(),
            entries: state.entries.clone(),
            stop_reason: state.stop_reason.clone(),
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<StreamEvent> {
        self.shared.events.subscribe()
    }
}

impl Drop for SimilarityStreamController {
    fn drop(&mut self) {
        let torn_down = self
            .shared
            .lock()
            .finish(StopReason::TornDown, &self.shared.events);
        if let Some(task) = self.task.take() {
            task.abort();
        }
        if torn_down {
            info!("similarity stream torn down with its controller");
        }
    }
}

enum TickOutcome {
    Continue,
    Done,
}

async fn run_ticks<S, F>(
    shared: Arc<Shared>,
    session_id: SessionId,
    token: CancellationToken,
    config: StreamConfig,
    mut source: S,
    mut on_update: F,
) where
    S: SimilaritySource,
    F: FnMut(f64, f64) + Send,
{
    let mut ticker = interval_at(Instant::now() + config.tick_interval, config.tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut ticks: u32 = 0;

    loop {
        tokio::select! {
            biased;

            _ = token.cancelled() => break,
            _ = ticker.tick() => {}
        }

        ticks = ticks.saturating_add(1);
        let elapsed = config.tick_interval.saturating_mul(ticks);
        let elapsed_secs = elapsed.as_secs_f64();

        let measured = tokio::select! {
            biased;

            _ = token.cancelled() => break,
            measured = source.measure(elapsed_secs) => measured,
        };

        let outcome = apply_tick(
            &shared,
            session_id,
            &token,
            &config,
            elapsed,
            measured,
            &mut on_update,
        );
        if let TickOutcome::Done = outcome {
            break;
        }
    }

    debug!(session = %session_id, ticks, "similarity stream task exited");
}

fn apply_tick<F>(
    shared: &Shared,
    session_id: SessionId,
    token: &CancellationToken,
    config: &StreamConfig,
    elapsed: Duration,
    measured: anyhow::Result<f64>,
    on_update: &mut F,
) -> TickOutcome
where
    F: FnMut(f64, f64),
{
    let mut state = shared.lock();
    if token.is_cancelled() || state.id != Some(session_id) || !state.active {
        return TickOutcome::Done;
    }

    let elapsed_secs = elapsed.as_secs_f64();
    let similarity = match measured {
        Ok(raw) => match clamp_similarity(raw) {
            Some(value) => value,
            None => {
                return fail_session(&mut state, shared, session_id, "similarity source produced NaN");
            }
        },
        Err(err) => {
            return fail_session(
                &mut state,
                shared,
                session_id,
                &format!("similarity source failed: {err:#}"),
            );
        }
    };

    state.elapsed = elapsed;
    if panic::catch_unwind(AssertUnwindSafe(|| on_update(elapsed_secs, similarity))).is_err() {
        return fail_session(&mut state, shared, session_id, "update callback panicked");
    }

    let entry = SimilarityEntry {
        timestamp: elapsed_secs,
        similarity,
    };
    state.entries.push(entry);
    let _ = shared.events.send(StreamEvent::Tick { session_id, entry });

    if elapsed >= config.max_duration {
        state.finish(StopReason::Completed, &shared.events);
        info!(
            session = %session_id,
            entries = state.entries.len(),
            "similarity stream completed"
        );
        return TickOutcome::Done;
    }

    TickOutcome::Continue
}

fn fail_session(
    state: &mut SessionState,
    shared: &Shared,
    session_id: SessionId,
    message: &str,
) -> TickOutcome {
    error!(session = %session_id, %message, "similarity tick failed; stopping session");
    state.finish(
        StopReason::Failed {
            message: message.to_string(),
        },
        &shared.events,
    );
    TickOutcome::Done
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
