use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;

use crate::api::Envelope;

/// Wrapper for handler results that adds the success envelope
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: Option<T>,
    pub status_code: StatusCode,
    pub location: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 OK carrying `data`
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            status_code: StatusCode::OK,
            location: None,
        }
    }

    /// 201 Created with a `Location` header pointing at the new resource
    pub fn created_at(location: impl Into<String>, data: T) -> Self {
        Self {
            data: Some(data),
            status_code: StatusCode::CREATED,
            location: Some(location.into()),
        }
    }
}

impl ApiResponse<()> {
    /// 200 OK with a bare `{"status":"success"}` body
    pub fn empty() -> Self {
        Self {
            data: None,
            status_code: StatusCode::OK,
            location: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let envelope = match self.data {
            Some(data) => Envelope::success(data),
            None => Envelope::<T>::empty(),
        };
        let mut response = (self.status_code, Json(envelope)).into_response();

        if let Some(location) = self.location {
            match HeaderValue::from_str(&location) {
                Ok(value) => {
                    response.headers_mut().insert(header::LOCATION, value);
                }
                Err(e) => tracing::warn!(%location, error = %e, "Invalid Location header"),
            }
        }

        response
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn created_sets_location() {
        let response = ApiResponse::created_at("/api/v1/contacts/7", serde_json::json!({"id": 7})).into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[header::LOCATION], "/api/v1/contacts/7");

        let body = body_json(response).await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["data"]["id"], 7);
    }

    #[tokio::test]
    async fn empty_has_no_data() {
        let response = ApiResponse::empty().into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body, serde_json::json!({"status": "success"}));
    }
}
