// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::Value;

use crate::api::Envelope;
use crate::database::StoreError;
use crate::filter::FilterError;
use crate::services::avatar_storage::UploadError;
use crate::types::ContactOperation;

/// HTTP API error; 4xx variants render as `fail`, 5xx as `error`
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),

    // 404 Not Found
    NotFound(String),

    // 405 Method Not Allowed
    MethodNotAllowed(String),

    // 413 Payload Too Large
    PayloadTooLarge(String),

    // 415 Unsupported Media Type
    UnsupportedMediaType(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::NotFound(msg)
            | ApiError::MethodNotAllowed(msg)
            | ApiError::PayloadTooLarge(msg)
            | ApiError::UnsupportedMediaType(msg)
            | ApiError::InternalServerError(msg)
            | ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Convert to the response envelope
    pub fn to_envelope(&self) -> Envelope<Value> {
        if self.status_code().is_server_error() {
            Envelope::error(self.message())
        } else {
            Envelope::fail(self.message())
        }
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn contact_not_found() -> Self {
        ApiError::NotFound("Contact not found".to_string())
    }

    pub fn method_not_allowed() -> Self {
        ApiError::MethodNotAllowed("Method not allowed".to_string())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }

    /// Log a store failure and hide it behind the operation's generic message
    pub fn store(operation: ContactOperation, err: StoreError) -> Self {
        tracing::error!(%operation, error = %err, "contact store failure");
        ApiError::internal_server_error(operation.failure_message())
    }
}

impl From<FilterError> for ApiError {
    fn from(err: FilterError) -> Self {
        ApiError::bad_request(err.to_string())
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::NotAnImage(_) | UploadError::TooManyFiles | UploadError::InvalidField(_) => {
                ApiError::bad_request(err.to_string())
            }
            UploadError::Io(io_err) => {
                // Don't expose filesystem paths to clients
                tracing::error!("Avatar storage error: {}", io_err);
                ApiError::internal_server_error("An error occurred while storing the avatar")
            }
        }
    }
}

impl From<axum::extract::multipart::MultipartError> for ApiError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge("Request body is too large".to_string())
        } else {
            ApiError::bad_request(format!("Malformed multipart body: {}", err.body_text()))
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_envelope())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn client_errors_render_as_fail() {
        let err = ApiError::bad_request("Name is required");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            serde_json::to_value(err.to_envelope()).unwrap(),
            json!({ "status": "fail", "message": "Name is required" })
        );
        assert_eq!(ApiError::method_not_allowed().status_code(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn store_failures_hide_the_cause() {
        let err = ApiError::store(
            ContactOperation::Delete(9),
            StoreError::QueryError("relation \"contacts\" does not exist".to_string()),
        );
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = serde_json::to_value(err.to_envelope()).unwrap();
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "Error deleting contact with id 9");
    }

    #[test]
    fn filter_errors_are_bad_requests() {
        let err: ApiError = FilterError::InvalidPage("'x' is not a positive integer".into()).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.message().contains("Invalid page"));
    }
}
