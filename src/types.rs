//! Shared types used across the codebase

use std::fmt;

/// Contact operations, used to label log lines and pick the generic
/// message returned when the store fails underneath a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactOperation {
    Create,
    List,
    Get(i64),
    Update(i64),
    Delete(i64),
    DeleteAll,
}

impl ContactOperation {
    /// Client-facing message for a 500 response; never includes the underlying cause
    pub fn failure_message(&self) -> String {
        match self {
            ContactOperation::Create => "An error occurred while creating contact".to_string(),
            ContactOperation::List => "An error occurred while retrieving contacts".to_string(),
            ContactOperation::Get(id) => format!("Error retrieving contact with id {}", id),
            ContactOperation::Update(id) => format!("Error updating contact with id {}", id),
            ContactOperation::Delete(id) => format!("Error deleting contact with id {}", id),
            ContactOperation::DeleteAll => "Error deleting all contacts".to_string(),
        }
    }
}

impl fmt::Display for ContactOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContactOperation::Create => write!(f, "create"),
            ContactOperation::List => write!(f, "list"),
            ContactOperation::Get(id) => write!(f, "get({})", id),
            ContactOperation::Update(id) => write!(f, "update({})", id),
            ContactOperation::Delete(id) => write!(f, "delete({})", id),
            ContactOperation::DeleteAll => write!(f, "delete_all"),
        }
    }
}
