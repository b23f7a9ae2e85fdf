use serde::{Deserialize, Serialize};

use super::Session;

/// Raw statistics response from `GET /api/pomodoro/statistics`.
///
/// The backend pre-filters `sessions` to the requested period and includes
/// its own rollup counters; the client recomputes chart series and summaries
/// from the session list itself. Counter fields default to zero so a sparse
/// response still deserializes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatisticsPayload {
    #[serde(default)]
    pub total_work_minutes: f64,
    #[serde(default)]
    pub total_pomodoros: u32,
    #[serde(default)]
    pub full_pomodoros: u32,
    #[serde(default)]
    pub half_pomodoros: u32,
    #[serde(default)]
    pub sessions: Vec<Session>,
    #[serde(default)]
    pub task_statistics: Vec<TaskRollup>,
}

/// Per-task rollup computed server-side, passed through for display.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskRollup {
    pub task_id: i64,
    #[serde(default)]
    pub task_text: String,
    #[serde(default)]
    pub total_minutes: f64,
    #[serde(default)]
    pub full_pomodoros: u32,
    #[serde(default)]
    pub half_pomodoros: u32,
    #[serde(default)]
    pub full_minutes: f64,
    #[serde(default)]
    pub half_minutes: f64,
}
