use thiserror::Error;

use crate::api::ApiError;

/// User-facing failures the client core can produce. Validation variants are
/// raised before any network call is attempted; `Api` wraps failures from
/// the backend boundary.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("add at least one task before starting a work session")]
    NoEligibleTask,

    #[error("select the task you want to work on first")]
    NoTaskSelected,

    #[error("no active pomodoro session")]
    NoActiveSession,

    #[error("task text cannot be empty")]
    EmptyTaskText,

    #[error(transparent)]
    Api(#[from] ApiError),
}
