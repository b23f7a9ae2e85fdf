use serde::Serialize;

use super::TimerState;

/// Audio cue intents; the host owns actual playback and its gain.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Cue {
    Start,
    Complete,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, Serialize)]
pub struct Notice {
    pub message: String,
    pub severity: Severity,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Success,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Error,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Info,
        }
    }
}

/// Side effects the controller asks its host to perform. The controller
/// never touches a speaker or a screen itself.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum TimerEvent {
    StateChanged { state: TimerState },
    Notice { notice: Notice },
    Cue { cue: Cue },
    /// Display counters re-queried from the statistics API after every
    /// close; the timer keeps no running totals of its own.
    TodayTotals {
        full_pomodoros: u32,
        half_pomodoros: u32,
        work_seconds: u64,
    },
}
