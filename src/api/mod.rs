mod http;
#[cfg(test)]
pub(crate) mod mock;

pub use http::{HttpApi, DEFAULT_BASE_URL};

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Session, SessionType, StatisticsPayload, Task, User};
use crate::stats::StatsPeriod;

/// Failures at the backend boundary. Both kinds are terminal where they
/// occur: callers surface them as notifications and fall back to a safe
/// local state, never crash or retry on their own.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-2xx response; `message` comes from the error body when the
    /// backend supplied one.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// Connection-level failure (unreachable host, timeout, bad payload).
    #[error("network error: {0}")]
    Network(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Network(err.to_string())
    }
}

/// The logical operations the client consumes from the backend. Trait object
/// so the timer and task board can be driven against an in-memory backend in
/// tests.
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// Opens a session; the backend assigns and returns the id.
    async fn open_session(
        &self,
        session_type: SessionType,
        task_id: Option<i64>,
    ) -> Result<Session, ApiError>;

    /// Closes an open session with the client-computed duration. Not
    /// idempotent; callers must not close the same id twice.
    async fn close_session(
        &self,
        session_id: i64,
        duration_minutes: f64,
    ) -> Result<Session, ApiError>;

    async fn list_tasks(&self) -> Result<Vec<Task>, ApiError>;

    async fn create_task(&self, text: &str) -> Result<Task, ApiError>;

    async fn set_task_completed(&self, task_id: i64, completed: bool) -> Result<Task, ApiError>;

    async fn delete_task(&self, task_id: i64) -> Result<(), ApiError>;

    async fn statistics(&self, period: StatsPeriod) -> Result<StatisticsPayload, ApiError>;

    /// `Ok(None)` is the guest verdict (unauthenticated); only a transport
    /// failure is an error.
    async fn current_user(&self) -> Result<Option<User>, ApiError>;
}
