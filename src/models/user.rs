use serde::{Deserialize, Serialize};

/// Authenticated account identity. Only used to decide guest-vs-signed-in
/// presentation; the timer and statistics logic never look at it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub email: String,
}
