pub mod session;
pub mod stats;
pub mod task;
pub mod user;

pub use session::{Session, SessionType};
pub use stats::{StatisticsPayload, TaskRollup};
pub use task::Task;
pub use user::User;
