use std::{sync::Arc, time::Duration};

use log::{debug, error, info, warn};
use tokio::{
    sync::{mpsc, Mutex},
    task::JoinHandle,
    time,
};
use tokio_util::sync::CancellationToken;

use super::events::{Cue, Notice, TimerEvent};
use super::state::{TimerMode, TimerPhase, TimerState};
use crate::api::ApiClient;
use crate::error::ClientError;
use crate::stats::StatsPeriod;
use crate::tasks::TaskBoard;

/// What to do locally when the backend refuses to close a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseFailurePolicy {
    /// Clear the local session immediately and surface a warning. The
    /// server may be left holding an orphaned open session.
    ClearAndWarn,
    /// Retry the close this many extra times, then clear and warn.
    Retry { attempts: u32 },
}

#[derive(Debug, Clone)]
pub struct TimerConfig {
    /// Countdown granularity for the background ticker. `None` disables the
    /// ticker entirely; the host drives [`TimerController::tick`] itself.
    pub tick_interval: Option<Duration>,
    /// Pause between a natural completion and the automatic mode switch.
    pub transition_delay: Duration,
    pub close_failure: CloseFailurePolicy,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            tick_interval: Some(Duration::from_secs(1)),
            transition_delay: Duration::from_secs(2),
            close_failure: CloseFailurePolicy::ClearAndWarn,
        }
    }
}

/// Owns the countdown and the open/close lifecycle of pomodoro sessions.
/// All side effects (cues, notices, display counters) leave as
/// [`TimerEvent`]s for the host to execute.
#[derive(Clone)]
pub struct TimerController {
    state: Arc<Mutex<TimerState>>,
    api: Arc<dyn ApiClient>,
    board: TaskBoard,
    events: mpsc::UnboundedSender<TimerEvent>,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
    pending_transition: Arc<Mutex<Option<CancellationToken>>>,
    config: TimerConfig,
}

impl TimerController {
    pub fn new(
        api: Arc<dyn ApiClient>,
        board: TaskBoard,
        events: mpsc::UnboundedSender<TimerEvent>,
    ) -> Self {
        Self::with_config(api, board, events, TimerConfig::default())
    }

    pub fn with_config(
        api: Arc<dyn ApiClient>,
        board: TaskBoard,
        events: mpsc::UnboundedSender<TimerEvent>,
        config: TimerConfig,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(TimerState::new())),
            api,
            board,
            events,
            ticker: Arc::new(Mutex::new(None)),
            pending_transition: Arc::new(Mutex::new(None)),
            config,
        }
    }

    pub async fn snapshot(&self) -> TimerState {
        self.state.lock().await.clone()
    }

    /// Opens a session and starts the countdown. Work mode is validated
    /// against the task board before anything touches the network; both
    /// validation failures and an API refusal leave the state untouched.
    pub async fn start(&self) -> Result<TimerState, ClientError> {
        self.cancel_pending_transition().await;

        let mode = {
            let state = self.state.lock().await;
            if state.is_running() {
                debug!("start ignored, timer already running");
                return Ok(state.clone());
            }
            state.mode
        };

        let task_id = if mode == TimerMode::Work {
            match self.board.work_selection().await {
                Ok(id) => Some(id),
                Err(err) => {
                    self.notify(Notice::error(err.to_string()));
                    return Err(err);
                }
            }
        } else {
            None
        };

        let session = match self.api.open_session(mode.session_type(), task_id).await {
            Ok(session) => session,
            Err(err) => {
                self.notify(Notice::error(err.to_string()));
                return Err(err.into());
            }
        };
        info!(
            "session {} opened ({})",
            session.id,
            mode.session_type().as_str()
        );

        let snapshot = {
            let mut state = self.state.lock().await;
            if let Some(orphan) = state.active_session_id {
                warn!("starting over a paused session {orphan}; it stays open server-side");
            }
            state.begin_session(session.id);
            state.clone()
        };
        self.emit(TimerEvent::Cue { cue: Cue::Start });
        self.emit_state(snapshot.clone());
        self.spawn_ticker().await;
        Ok(snapshot)
    }

    /// Halts the countdown; the session stays open. No-op when nothing is
    /// running.
    pub async fn stop(&self) {
        self.cancel_pending_transition().await;
        let snapshot = {
            let mut state = self.state.lock().await;
            if !state.is_running() {
                return;
            }
            state.halt();
            state.clone()
        };
        self.cancel_ticker().await;
        self.emit_state(snapshot);
    }

    /// Closes the open session (stopping first if needed), refreshes the
    /// display counters, and resets the countdown for the current mode.
    pub async fn finish(&self) -> Result<(), ClientError> {
        self.cancel_pending_transition().await;

        let (mode, was_running) = {
            let mut state = self.state.lock().await;
            if !state.has_open_session() {
                drop(state);
                self.notify(Notice::error(ClientError::NoActiveSession.to_string()));
                return Err(ClientError::NoActiveSession);
            }
            let was_running = state.is_running();
            state.halt();
            (state.mode, was_running)
        };
        if was_running {
            self.cancel_ticker().await;
        }

        self.close_open_session().await;

        if mode == TimerMode::Work {
            self.emit(TimerEvent::Cue { cue: Cue::Complete });
        }
        self.notify(Notice::success("Pomodoro session completed"));
        self.refresh_today_totals().await;

        let snapshot = {
            let mut state = self.state.lock().await;
            state.reset_for_mode(mode);
            state.clone()
        };
        self.emit_state(snapshot);
        Ok(())
    }

    /// Switches mode. The countdown and any pending auto-transition are
    /// cancelled; an open session is deliberately left open so its elapsed
    /// time is not silently discarded.
    pub async fn set_mode(&self, mode: TimerMode) {
        self.cancel_pending_transition().await;
        self.cancel_ticker().await;
        let snapshot = {
            let mut state = self.state.lock().await;
            state.reset_for_mode(mode);
            state.clone()
        };
        self.emit_state(snapshot);
    }

    /// One countdown step. Fires natural completion on the step that
    /// reaches zero. Returns false once the countdown is no longer running,
    /// which is the background ticker's exit signal.
    pub async fn tick(&self) -> bool {
        let (snapshot, completed) = {
            let mut state = self.state.lock().await;
            if !state.is_running() {
                return false;
            }
            let completed = state.tick();
            (state.clone(), completed)
        };
        self.emit_state(snapshot);
        if completed {
            self.natural_completion().await;
            return false;
        }
        true
    }

    /// The countdown hit zero: close like `finish`, then hand off to the
    /// delayed auto-transition (work → short break with auto-start, any
    /// break → work without).
    async fn natural_completion(&self) {
        let mode = {
            let mut state = self.state.lock().await;
            state.halt();
            state.mode
        };

        self.close_open_session().await;

        let snapshot = {
            let mut state = self.state.lock().await;
            state.phase = TimerPhase::Idle;
            state.clone()
        };
        self.emit_state(snapshot);

        match mode {
            TimerMode::Work => {
                self.emit(TimerEvent::Cue { cue: Cue::Complete });
                self.notify(Notice::success("Pomodoro complete! Time for a break."));
                self.refresh_today_totals().await;
                self.schedule_transition(TimerMode::ShortBreak, true).await;
            }
            _ => {
                self.notify(Notice::info("Break over! Back to work."));
                self.refresh_today_totals().await;
                self.schedule_transition(TimerMode::Work, false).await;
            }
        }
    }

    /// Reports the open session's duration to the backend. Local session
    /// state is cleared up front, so the close can never run twice for the
    /// same id; on failure the policy decides how loudly to give up.
    async fn close_open_session(&self) {
        let Some((session_id, duration_minutes)) =
            self.state.lock().await.take_open_session()
        else {
            return;
        };

        let extra_attempts = match self.config.close_failure {
            CloseFailurePolicy::ClearAndWarn => 0,
            CloseFailurePolicy::Retry { attempts } => attempts,
        };

        let mut result = self.api.close_session(session_id, duration_minutes).await;
        let mut tries = 0;
        while result.is_err() && tries < extra_attempts {
            tries += 1;
            warn!("close of session {session_id} failed, retrying ({tries}/{extra_attempts})");
            result = self.api.close_session(session_id, duration_minutes).await;
        }

        match result {
            Ok(_) => info!("session {session_id} closed at {duration_minutes:.2} minutes"),
            Err(err) => {
                // The server may now hold an orphaned open session; say so
                // instead of pretending the save worked.
                error!("failed to close session {session_id}: {err}");
                self.notify(Notice::error(
                    "The session could not be saved to the server and was discarded locally",
                ));
            }
        }
    }

    /// Re-queries the daily statistics endpoint for the display counters.
    /// An unreachable backend degrades to zeros.
    async fn refresh_today_totals(&self) {
        let (full_pomodoros, half_pomodoros, work_seconds) =
            match self.api.statistics(StatsPeriod::Daily).await {
                Ok(stats) => (
                    stats.full_pomodoros,
                    stats.half_pomodoros,
                    (stats.total_work_minutes * 60.0).round().max(0.0) as u64,
                ),
                Err(err) => {
                    warn!("could not refresh today's totals: {err}");
                    (0, 0, 0)
                }
            };
        self.emit(TimerEvent::TodayTotals {
            full_pomodoros,
            half_pomodoros,
            work_seconds,
        });
    }

    /// Arms the delayed auto-transition. Any manual start/stop/finish/mode
    /// switch before the delay elapses cancels it, so a user acting inside
    /// the window is never overridden.
    async fn schedule_transition(&self, mode: TimerMode, auto_start: bool) {
        let token = CancellationToken::new();
        if let Some(old) = self
            .pending_transition
            .lock()
            .await
            .replace(token.clone())
        {
            old.cancel();
        }

        let ctrl = self.clone();
        let delay = self.config.transition_delay;
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    debug!("pending auto-transition cancelled");
                }
                _ = time::sleep(delay) => {
                    ctrl.pending_transition.lock().await.take();
                    ctrl.set_mode(mode).await;
                    if auto_start {
                        if let Err(err) = ctrl.start().await {
                            warn!("auto-start after completion failed: {err}");
                        }
                    }
                }
            }
        });
    }

    async fn cancel_pending_transition(&self) {
        if let Some(token) = self.pending_transition.lock().await.take() {
            token.cancel();
        }
    }

    // Explicitly boxed return type (rather than an inferred `async fn`
    // opaque) so the mutually-recursive auto-transition futures
    // (start -> spawn_ticker -> tick -> natural_completion ->
    // schedule_transition -> start) have a named `Send` type to break the
    // opaque-inference cycle `tokio::spawn` would otherwise fail to resolve.
    fn spawn_ticker(&self) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            let Some(interval_dur) = self.config.tick_interval else {
                return;
            };
            let mut guard = self.ticker.lock().await;
            if let Some(handle) = guard.take() {
                handle.abort();
            }
            let ctrl = self.clone();
            let handle = tokio::spawn(async move {
                let mut interval = time::interval(interval_dur);
                interval.tick().await; // the first tick resolves immediately
                loop {
                    interval.tick().await;
                    if !ctrl.tick().await {
                        break;
                    }
                }
            });
            *guard = Some(handle);
        })
    }

    async fn cancel_ticker(&self) {
        if let Some(handle) = self.ticker.lock().await.take() {
            handle.abort();
        }
    }

    fn emit(&self, event: TimerEvent) {
        let _ = self.events.send(event);
    }

    fn emit_state(&self, state: TimerState) {
        self.emit(TimerEvent::StateChanged { state });
    }

    fn notify(&self, notice: Notice) {
        self.emit(TimerEvent::Notice { notice });
    }
}
