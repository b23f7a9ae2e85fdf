pub mod api;
pub mod audio;
pub mod error;
pub mod models;
pub mod settings;
pub mod stats;
pub mod tasks;
pub mod timer;

pub use api::{ApiClient, ApiError, HttpApi, DEFAULT_BASE_URL};
pub use error::ClientError;
pub use settings::{SettingsStore, Theme};
pub use tasks::TaskBoard;
pub use timer::{TimerConfig, TimerController, TimerEvent};
