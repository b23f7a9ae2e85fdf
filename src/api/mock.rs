//! In-memory backend for unit tests: hands out ids, records every call, and
//! fails on demand.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::{ApiClient, ApiError};
use crate::models::{Session, SessionType, StatisticsPayload, Task, User};
use crate::stats::StatsPeriod;

#[derive(Default)]
struct MockState {
    next_id: i64,
    tasks: Vec<Task>,
    closed: Vec<(i64, f64)>,
    calls: Vec<String>,
    fail_open: bool,
    /// Number of close calls that should fail before one succeeds.
    close_failures: u32,
    fail_stats: bool,
    stats: StatisticsPayload,
}

pub(crate) struct MockApi {
    state: Mutex<MockState>,
}

fn server_error() -> ApiError {
    ApiError::Status {
        status: 500,
        message: "backend said no".into(),
    }
}

impl MockApi {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                next_id: 1,
                ..MockState::default()
            }),
        }
    }

    pub fn with_tasks(texts: &[&str]) -> Self {
        let api = Self::new();
        {
            let mut state = api.state.try_lock().unwrap();
            for text in texts {
                let id = state.next_id;
                state.next_id += 1;
                state.tasks.push(Task {
                    id,
                    text: (*text).to_string(),
                    completed: false,
                });
            }
        }
        api
    }

    pub fn fail_open(&self) {
        self.state.try_lock().unwrap().fail_open = true;
    }

    pub fn fail_next_closes(&self, n: u32) {
        self.state.try_lock().unwrap().close_failures = n;
    }

    pub fn fail_stats(&self) {
        self.state.try_lock().unwrap().fail_stats = true;
    }

    pub fn set_stats(&self, stats: StatisticsPayload) {
        self.state.try_lock().unwrap().stats = stats;
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.try_lock().unwrap().calls.clone()
    }

    pub fn closed(&self) -> Vec<(i64, f64)> {
        self.state.try_lock().unwrap().closed.clone()
    }
}

#[async_trait]
impl ApiClient for MockApi {
    async fn open_session(
        &self,
        session_type: SessionType,
        task_id: Option<i64>,
    ) -> Result<Session, ApiError> {
        let mut state = self.state.lock().await;
        state.calls.push("open_session".into());
        if state.fail_open {
            return Err(server_error());
        }
        let id = state.next_id;
        state.next_id += 1;
        Ok(Session {
            id,
            task_id,
            session_type,
            duration_minutes: 0.0,
            started_at: Utc::now().naive_utc(),
            ended_at: None,
        })
    }

    async fn close_session(
        &self,
        session_id: i64,
        duration_minutes: f64,
    ) -> Result<Session, ApiError> {
        let mut state = self.state.lock().await;
        state.calls.push("close_session".into());
        if state.close_failures > 0 {
            state.close_failures -= 1;
            return Err(server_error());
        }
        state.closed.push((session_id, duration_minutes));
        Ok(Session {
            id: session_id,
            task_id: None,
            session_type: SessionType::Work,
            duration_minutes,
            started_at: Utc::now().naive_utc(),
            ended_at: Some(Utc::now().naive_utc()),
        })
    }

    async fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
        let mut state = self.state.lock().await;
        state.calls.push("list_tasks".into());
        Ok(state.tasks.clone())
    }

    async fn create_task(&self, text: &str) -> Result<Task, ApiError> {
        let mut state = self.state.lock().await;
        state.calls.push("create_task".into());
        let id = state.next_id;
        state.next_id += 1;
        let task = Task {
            id,
            text: text.to_string(),
            completed: false,
        };
        state.tasks.push(task.clone());
        Ok(task)
    }

    async fn set_task_completed(&self, task_id: i64, completed: bool) -> Result<Task, ApiError> {
        let mut state = self.state.lock().await;
        state.calls.push("set_task_completed".into());
        let task = state
            .tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| ApiError::Status {
                status: 404,
                message: "task not found".into(),
            })?;
        task.completed = completed;
        Ok(task.clone())
    }

    async fn delete_task(&self, task_id: i64) -> Result<(), ApiError> {
        let mut state = self.state.lock().await;
        state.calls.push("delete_task".into());
        state.tasks.retain(|t| t.id != task_id);
        Ok(())
    }

    async fn statistics(&self, _period: StatsPeriod) -> Result<StatisticsPayload, ApiError> {
        let mut state = self.state.lock().await;
        state.calls.push("statistics".into());
        if state.fail_stats {
            return Err(ApiError::Network("connection refused".into()));
        }
        Ok(state.stats.clone())
    }

    async fn current_user(&self) -> Result<Option<User>, ApiError> {
        Ok(None)
    }
}
