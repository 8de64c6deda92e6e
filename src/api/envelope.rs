use serde::{Deserialize, Serialize};

/// The three-state response wrapper every endpoint returns.
///
/// ```json
/// { "status": "success", "data": { ... } }
/// { "status": "fail",    "message": "Contact not found" }
/// { "status": "error",   "message": "Error deleting all contacts" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Envelope<T> {
    Success {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<T>,
    },
    /// Client-caused outcome (4xx)
    Fail { message: String },
    /// Server-caused outcome (5xx)
    Error { message: String },
}

impl<T> Envelope<T> {
    pub fn success(data: T) -> Self {
        Envelope::Success { data: Some(data) }
    }

    pub fn empty() -> Self {
        Envelope::Success { data: None }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Envelope::Fail { message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Envelope::Error { message: message.into() }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Envelope::Success { .. })
    }
}
