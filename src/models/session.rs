use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Kind of tracked interval. Serialized camelCase to match the backend's
/// `session_type` strings (`work`, `shortBreak`, `longBreak`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SessionType {
    Work,
    ShortBreak,
    LongBreak,
}

impl SessionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionType::Work => "work",
            SessionType::ShortBreak => "shortBreak",
            SessionType::LongBreak => "longBreak",
        }
    }
}

/// One tracked interval as the backend reports it.
///
/// `id` is assigned by the backend when the session is opened. `ended_at`
/// stays empty while the session is open; `duration_minutes` is whatever the
/// client reported at close time (0.0 until then). Backend timestamps are
/// naive UTC.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: i64,
    pub task_id: Option<i64>,
    pub session_type: SessionType,
    pub duration_minutes: f64,
    pub started_at: NaiveDateTime,
    pub ended_at: Option<NaiveDateTime>,
}

impl Session {
    pub fn is_open(&self) -> bool {
        self.ended_at.is_none()
    }
}
