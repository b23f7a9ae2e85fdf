use serde::{Deserialize, Serialize};

use crate::models::SessionType;

pub const WORK_SECS: u32 = 25 * 60;
pub const SHORT_BREAK_SECS: u32 = 5 * 60;
pub const LONG_BREAK_SECS: u32 = 15 * 60;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TimerMode {
    Work,
    ShortBreak,
    LongBreak,
}

impl Default for TimerMode {
    fn default() -> Self {
        TimerMode::Work
    }
}

impl TimerMode {
    pub fn nominal_seconds(&self) -> u32 {
        match self {
            TimerMode::Work => WORK_SECS,
            TimerMode::ShortBreak => SHORT_BREAK_SECS,
            TimerMode::LongBreak => LONG_BREAK_SECS,
        }
    }

    pub fn session_type(&self) -> SessionType {
        match self {
            TimerMode::Work => SessionType::Work,
            TimerMode::ShortBreak => SessionType::ShortBreak,
            TimerMode::LongBreak => SessionType::LongBreak,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TimerPhase {
    Idle,
    Running,
    /// Countdown halted by an explicit stop while the session stays open.
    Paused,
}

impl Default for TimerPhase {
    fn default() -> Self {
        TimerPhase::Idle
    }
}

/// The countdown state proper. Running implies an open session; the reverse
/// does not hold (a stopped timer keeps its session open until it is
/// finished or completes naturally).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub phase: TimerPhase,
    pub mode: TimerMode,
    pub remaining_seconds: u32,
    /// Counts up from session open; only used to compute the reported
    /// duration at close time.
    pub elapsed_seconds: u32,
    pub active_session_id: Option<i64>,
}

impl Default for TimerState {
    fn default() -> Self {
        Self {
            phase: TimerPhase::Idle,
            mode: TimerMode::Work,
            remaining_seconds: WORK_SECS,
            elapsed_seconds: 0,
            active_session_id: None,
        }
    }
}

impl TimerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.phase == TimerPhase::Running
    }

    pub fn has_open_session(&self) -> bool {
        self.active_session_id.is_some()
    }

    /// Enters Running with a freshly opened backend session.
    pub fn begin_session(&mut self, session_id: i64) {
        self.active_session_id = Some(session_id);
        self.elapsed_seconds = 0;
        self.phase = TimerPhase::Running;
    }

    /// Halts the countdown without touching the open session.
    pub fn halt(&mut self) {
        if self.phase == TimerPhase::Running {
            self.phase = TimerPhase::Paused;
        }
    }

    /// One countdown step. Returns true on the step that exhausts the
    /// countdown; the caller runs natural completion then.
    pub fn tick(&mut self) -> bool {
        if self.phase != TimerPhase::Running {
            return false;
        }
        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        self.elapsed_seconds += 1;
        self.remaining_seconds == 0
    }

    /// Takes the open session out of the state, handing back the id and the
    /// duration to report. Elapsed time is reset so a later close cannot
    /// reuse it.
    pub fn take_open_session(&mut self) -> Option<(i64, f64)> {
        let id = self.active_session_id.take()?;
        let duration_minutes = f64::from(self.elapsed_seconds) / 60.0;
        self.elapsed_seconds = 0;
        Some((id, duration_minutes))
    }

    /// Switches mode: countdown reset to the new nominal duration, elapsed
    /// cleared, not running. An open session is left open on purpose; only
    /// finish or natural completion closes it, so elapsed work is never
    /// silently discarded.
    pub fn reset_for_mode(&mut self, mode: TimerMode) {
        self.mode = mode;
        self.remaining_seconds = mode.nominal_seconds();
        self.elapsed_seconds = 0;
        self.phase = if self.active_session_id.is_some() {
            TimerPhase::Paused
        } else {
            TimerPhase::Idle
        };
    }
}

/// Renders seconds as the familiar zero-padded `MM:SS`.
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_clock_round_trips() {
        for s in 0..6000u32 {
            let rendered = format_clock(s);
            let (mm, ss) = rendered.split_once(':').unwrap();
            assert_eq!(mm.len(), 2);
            assert_eq!(ss.len(), 2);
            let parsed = mm.parse::<u32>().unwrap() * 60 + ss.parse::<u32>().unwrap();
            assert_eq!(parsed, s, "mismatch for {rendered}");
        }
    }

    #[test]
    fn mode_switch_resets_duration_and_stops() {
        let mut state = TimerState::new();
        state.begin_session(7);
        for (mode, expected) in [
            (TimerMode::Work, 1500),
            (TimerMode::ShortBreak, 300),
            (TimerMode::LongBreak, 900),
        ] {
            state.reset_for_mode(mode);
            assert_eq!(state.remaining_seconds, expected);
            assert_eq!(state.elapsed_seconds, 0);
            assert!(!state.is_running());
        }
        // The open session survived every switch.
        assert_eq!(state.active_session_id, Some(7));
    }

    #[test]
    fn tick_counts_down_and_flags_completion() {
        let mut state = TimerState::new();
        state.reset_for_mode(TimerMode::ShortBreak);
        state.begin_session(1);
        for _ in 0..299 {
            assert!(!state.tick());
        }
        assert!(state.tick());
        assert_eq!(state.remaining_seconds, 0);
        assert_eq!(state.elapsed_seconds, 300);
    }

    #[test]
    fn tick_is_inert_outside_running() {
        let mut state = TimerState::new();
        assert!(!state.tick());
        assert_eq!(state.remaining_seconds, WORK_SECS);

        state.begin_session(1);
        state.halt();
        assert!(!state.tick());
        assert_eq!(state.elapsed_seconds, 0);
    }

    #[test]
    fn take_open_session_reports_minutes() {
        let mut state = TimerState::new();
        state.begin_session(42);
        for _ in 0..90 {
            state.tick();
        }
        let (id, duration) = state.take_open_session().unwrap();
        assert_eq!(id, 42);
        assert!((duration - 1.5).abs() < 1e-9);
        assert_eq!(state.take_open_session(), None);
    }

    #[test]
    fn halt_only_applies_to_running() {
        let mut state = TimerState::new();
        state.halt();
        assert_eq!(state.phase, TimerPhase::Idle);
        state.begin_session(1);
        state.halt();
        assert_eq!(state.phase, TimerPhase::Paused);
        state.halt();
        assert_eq!(state.phase, TimerPhase::Paused);
    }
}
