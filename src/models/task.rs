use serde::{Deserialize, Serialize};

/// A user task. The client only ever reads these three fields; everything
/// else the backend stores about a task is ignored on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub text: String,
    pub completed: bool,
}
