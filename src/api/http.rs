use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use super::{ApiClient, ApiError};
use crate::models::{Session, SessionType, StatisticsPayload, Task, User};
use crate::stats::StatsPeriod;

/// Default backend address, overridable by the host.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// `reqwest`-backed implementation of [`ApiClient`]. The cookie jar carries
/// the backend's login session, the same way the browser client sent
/// requests with credentials included.
pub struct HttpApi {
    base: String,
    http: reqwest::Client,
}

// Response envelopes. Every endpoint wraps its payload in an object with a
// `success` flag; only the payload field matters here.
#[derive(Deserialize)]
struct SessionEnvelope {
    session: Session,
}

#[derive(Deserialize)]
struct TaskEnvelope {
    task: Task,
}

#[derive(Deserialize)]
struct TasksEnvelope {
    #[serde(default)]
    tasks: Vec<Task>,
}

#[derive(Deserialize)]
struct StatisticsEnvelope {
    statistics: StatisticsPayload,
}

#[derive(Deserialize)]
struct UserEnvelope {
    user: User,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self {
            base: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Decodes a success body, or turns a non-2xx response into
    /// [`ApiError::Status`] with the backend's message when it sent one.
    async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ApiError> {
        let status = resp.status();
        if status.is_success() {
            return resp.json::<T>().await.map_err(ApiError::from);
        }
        let message = match resp.json::<ErrorBody>().await {
            Ok(body) if !body.message.is_empty() => body.message,
            _ => format!("request failed with status {}", status.as_u16()),
        };
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl ApiClient for HttpApi {
    async fn open_session(
        &self,
        session_type: SessionType,
        task_id: Option<i64>,
    ) -> Result<Session, ApiError> {
        let resp = self
            .http
            .post(self.url("/api/pomodoro/start"))
            .json(&json!({
                "session_type": session_type.as_str(),
                "task_id": task_id,
            }))
            .send()
            .await?;
        Ok(Self::read_json::<SessionEnvelope>(resp).await?.session)
    }

    async fn close_session(
        &self,
        session_id: i64,
        duration_minutes: f64,
    ) -> Result<Session, ApiError> {
        let resp = self
            .http
            .post(self.url("/api/pomodoro/end"))
            .json(&json!({
                "session_id": session_id,
                "duration_minutes": duration_minutes,
            }))
            .send()
            .await?;
        Ok(Self::read_json::<SessionEnvelope>(resp).await?.session)
    }

    async fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
        let resp = self.http.get(self.url("/api/tasks")).send().await?;
        Ok(Self::read_json::<TasksEnvelope>(resp).await?.tasks)
    }

    async fn create_task(&self, text: &str) -> Result<Task, ApiError> {
        let resp = self
            .http
            .post(self.url("/api/tasks"))
            .json(&json!({ "text": text }))
            .send()
            .await?;
        Ok(Self::read_json::<TaskEnvelope>(resp).await?.task)
    }

    async fn set_task_completed(&self, task_id: i64, completed: bool) -> Result<Task, ApiError> {
        let resp = self
            .http
            .put(self.url(&format!("/api/tasks/{task_id}")))
            .json(&json!({ "completed": completed }))
            .send()
            .await?;
        Ok(Self::read_json::<TaskEnvelope>(resp).await?.task)
    }

    async fn delete_task(&self, task_id: i64) -> Result<(), ApiError> {
        let resp = self
            .http
            .delete(self.url(&format!("/api/tasks/{task_id}")))
            .send()
            .await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let message = match resp.json::<ErrorBody>().await {
            Ok(body) if !body.message.is_empty() => body.message,
            _ => format!("request failed with status {}", status.as_u16()),
        };
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn statistics(&self, period: StatsPeriod) -> Result<StatisticsPayload, ApiError> {
        let resp = self
            .http
            .get(self.url("/api/pomodoro/statistics"))
            .query(&[("period", period.as_str())])
            .send()
            .await?;
        Ok(Self::read_json::<StatisticsEnvelope>(resp).await?.statistics)
    }

    async fn current_user(&self) -> Result<Option<User>, ApiError> {
        let resp = self.http.get(self.url("/api/user")).send().await?;
        if !resp.status().is_success() {
            // 401 and friends all mean guest; the login flow is not ours.
            return Ok(None);
        }
        Ok(Some(resp.json::<UserEnvelope>().await.map_err(ApiError::from)?.user))
    }
}
