use crate::error::ApiError;

/// Known path, unsupported method
pub async fn method_not_allowed() -> ApiError {
    ApiError::method_not_allowed()
}

/// No route matched
pub async fn resource_not_found() -> ApiError {
    ApiError::not_found("Resource not found")
}
