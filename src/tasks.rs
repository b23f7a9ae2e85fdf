use std::sync::Arc;

use log::{debug, warn};
use tokio::sync::Mutex;

use crate::api::ApiClient;
use crate::error::ClientError;
use crate::models::Task;

/// Local view of the user's task list plus the single optional selection the
/// work timer binds to. Every mutation goes through the API first, then the
/// cache; selection rules live entirely here.
#[derive(Clone)]
pub struct TaskBoard {
    api: Arc<dyn ApiClient>,
    inner: Arc<Mutex<BoardState>>,
}

#[derive(Default)]
struct BoardState {
    tasks: Vec<Task>,
    selected: Option<i64>,
}

impl TaskBoard {
    pub fn new(api: Arc<dyn ApiClient>) -> Self {
        Self {
            api,
            inner: Arc::new(Mutex::new(BoardState::default())),
        }
    }

    /// Reloads the list from the backend. Guests (or an unreachable backend)
    /// get an empty board rather than an error screen.
    pub async fn refresh(&self) -> Vec<Task> {
        match self.api.list_tasks().await {
            Ok(tasks) => {
                let mut state = self.inner.lock().await;
                // Drop a selection that no longer points at an incomplete task.
                if let Some(id) = state.selected {
                    if !tasks.iter().any(|t| t.id == id && !t.completed) {
                        state.selected = None;
                    }
                }
                state.tasks = tasks.clone();
                tasks
            }
            Err(err) => {
                warn!("could not load tasks, treating as empty: {err}");
                let mut state = self.inner.lock().await;
                state.tasks.clear();
                state.selected = None;
                Vec::new()
            }
        }
    }

    pub async fn add(&self, text: &str) -> Result<Task, ClientError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ClientError::EmptyTaskText);
        }
        let task = self.api.create_task(text).await?;
        self.inner.lock().await.tasks.push(task.clone());
        Ok(task)
    }

    pub async fn set_completed(&self, task_id: i64, completed: bool) -> Result<Task, ClientError> {
        let updated = self.api.set_task_completed(task_id, completed).await?;
        let mut state = self.inner.lock().await;
        if let Some(task) = state.tasks.iter_mut().find(|t| t.id == task_id) {
            *task = updated.clone();
        }
        if completed && state.selected == Some(task_id) {
            state.selected = None;
        }
        Ok(updated)
    }

    pub async fn delete(&self, task_id: i64) -> Result<(), ClientError> {
        self.api.delete_task(task_id).await?;
        let mut state = self.inner.lock().await;
        state.tasks.retain(|t| t.id != task_id);
        if state.selected == Some(task_id) {
            state.selected = None;
        }
        Ok(())
    }

    /// Selects the task a work session will bind to. Completed or unknown
    /// tasks are not selectable; returns whether the selection was applied.
    pub async fn select(&self, task_id: i64) -> bool {
        let mut state = self.inner.lock().await;
        match state.tasks.iter().find(|t| t.id == task_id) {
            Some(task) if !task.completed => {
                state.selected = Some(task_id);
                true
            }
            _ => {
                debug!("ignoring selection of completed or unknown task {task_id}");
                false
            }
        }
    }

    pub async fn selected(&self) -> Option<i64> {
        self.inner.lock().await.selected
    }

    pub async fn tasks(&self) -> Vec<Task> {
        self.inner.lock().await.tasks.clone()
    }

    /// Validates the board for starting a work session. The two failure
    /// kinds are distinct: an empty board asks the user to add a task, a
    /// populated one asks them to pick.
    pub async fn work_selection(&self) -> Result<i64, ClientError> {
        let state = self.inner.lock().await;
        if !state.tasks.iter().any(|t| !t.completed) {
            return Err(ClientError::NoEligibleTask);
        }
        match state.selected {
            Some(id) => Ok(id),
            None => Err(ClientError::NoTaskSelected),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockApi;

    fn board_with(texts: &[&str]) -> (Arc<MockApi>, TaskBoard) {
        let api = Arc::new(MockApi::with_tasks(texts));
        let board = TaskBoard::new(api.clone());
        (api, board)
    }

    #[tokio::test]
    async fn empty_board_blocks_work_start_before_any_call() {
        let (api, board) = board_with(&[]);
        board.refresh().await;
        assert!(matches!(
            board.work_selection().await,
            Err(ClientError::NoEligibleTask)
        ));
        assert!(!api.calls().contains(&"open_session".to_string()));
    }

    #[tokio::test]
    async fn unselected_board_asks_for_a_pick() {
        let (_, board) = board_with(&["write tests"]);
        board.refresh().await;
        assert!(matches!(
            board.work_selection().await,
            Err(ClientError::NoTaskSelected)
        ));
    }

    #[tokio::test]
    async fn selection_flows_through_to_work_start() {
        let (_, board) = board_with(&["write tests", "review code"]);
        board.refresh().await;
        assert!(board.select(1).await);
        assert_eq!(board.work_selection().await.unwrap(), 1);
        // A new selection replaces the old one.
        assert!(board.select(2).await);
        assert_eq!(board.work_selection().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn completing_the_selected_task_clears_selection() {
        let (_, board) = board_with(&["write tests"]);
        board.refresh().await;
        board.select(1).await;
        board.set_completed(1, true).await.unwrap();
        assert_eq!(board.selected().await, None);
        // And the completed task can never be re-selected.
        assert!(!board.select(1).await);
    }

    #[tokio::test]
    async fn deleting_the_selected_task_clears_selection() {
        let (_, board) = board_with(&["write tests"]);
        board.refresh().await;
        board.select(1).await;
        board.delete(1).await.unwrap();
        assert_eq!(board.selected().await, None);
        assert!(board.tasks().await.is_empty());
    }

    #[tokio::test]
    async fn empty_task_text_is_rejected_without_a_network_call() {
        let (api, board) = board_with(&[]);
        assert!(matches!(
            board.add("   ").await,
            Err(ClientError::EmptyTaskText)
        ));
        assert!(!api.calls().contains(&"create_task".to_string()));
    }

    #[tokio::test]
    async fn add_trims_and_caches() {
        let (_, board) = board_with(&[]);
        let task = board.add("  study math  ").await.unwrap();
        assert_eq!(task.text, "study math");
        assert_eq!(board.tasks().await.len(), 1);
    }

    #[tokio::test]
    async fn refresh_drops_a_stale_selection() {
        let (api, board) = board_with(&["write tests"]);
        board.refresh().await;
        board.select(1).await;
        // Task completed elsewhere; the next refresh must drop the selection.
        api.set_task_completed(1, true).await.unwrap();
        board.refresh().await;
        assert_eq!(board.selected().await, None);
    }
}
