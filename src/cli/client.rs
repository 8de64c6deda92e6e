use std::path::Path;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::api::{Envelope, CONTACTS_PATH};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{message} (HTTP {status})")]
    Api { status: StatusCode, message: String },

    #[error("unexpected response from server (HTTP {status}): {body}")]
    Malformed { status: StatusCode, body: String },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to read avatar file: {0}")]
    Avatar(#[from] std::io::Error),
}

/// Text fields sent on create and update. `None` leaves a field out of the request.
#[derive(Debug, Clone, Default)]
pub struct ContactFields {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub favorite: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct ListParams {
    pub name: Option<String>,
    pub favorite: Option<bool>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// HTTP client for the contacts API. Every call returns the envelope's `data`.
pub struct ContactClient {
    base: Url,
    http: reqwest::Client,
}

impl ContactClient {
    pub fn new(base: Url) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { base, http })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub async fn list(&self, params: &ListParams) -> Result<Value, ClientError> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(name) = &params.name {
            query.push(("name", name.clone()));
        }
        if let Some(favorite) = params.favorite {
            query.push(("favorite", favorite.to_string()));
        }
        if let Some(page) = params.page {
            query.push(("page", page.to_string()));
        }
        if let Some(limit) = params.limit {
            query.push(("limit", limit.to_string()));
        }

        let request = self.request(Method::GET, CONTACTS_PATH).query(&query);
        self.send(request).await
    }

    pub async fn get(&self, id: &str) -> Result<Value, ClientError> {
        self.send(self.request(Method::GET, &item_path(id))).await
    }

    pub async fn create(&self, fields: &ContactFields, avatar: Option<&Path>) -> Result<Value, ClientError> {
        let form = build_form(fields, avatar).await?;
        self.send(self.request(Method::POST, CONTACTS_PATH).multipart(form)).await
    }

    pub async fn update(&self, id: &str, fields: &ContactFields, avatar: Option<&Path>) -> Result<Value, ClientError> {
        let form = build_form(fields, avatar).await?;
        self.send(self.request(Method::PUT, &item_path(id)).multipart(form)).await
    }

    pub async fn delete(&self, id: &str) -> Result<Value, ClientError> {
        self.send(self.request(Method::DELETE, &item_path(id))).await
    }

    pub async fn delete_all(&self) -> Result<Value, ClientError> {
        self.send(self.request(Method::DELETE, CONTACTS_PATH)).await
    }

    pub async fn health(&self) -> Result<Value, ClientError> {
        self.send(self.request(Method::GET, "/health").timeout(Duration::from_secs(5))).await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let base = self.base.as_str().trim_end_matches('/');
        self.http.request(method, format!("{}{}", base, path))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Value, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        tracing::debug!(%status, "Received response");

        match serde_json::from_str::<Envelope<Value>>(&body) {
            Ok(Envelope::Success { data }) => Ok(data.unwrap_or(Value::Null)),
            Ok(Envelope::Fail { message }) | Ok(Envelope::Error { message }) => {
                Err(ClientError::Api { status, message })
            }
            Err(_) => Err(ClientError::Malformed { status, body }),
        }
    }
}

fn item_path(id: &str) -> String {
    format!("{}/{}", CONTACTS_PATH, urlencode_segment(id))
}

fn urlencode_segment(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes()).collect()
}

async fn build_form(fields: &ContactFields, avatar: Option<&Path>) -> Result<Form, ClientError> {
    let mut form = Form::new();
    let text_fields = [
        ("name", &fields.name),
        ("email", &fields.email),
        ("address", &fields.address),
        ("phone", &fields.phone),
    ];
    for (key, value) in text_fields {
        if let Some(value) = value {
            form = form.text(key, value.clone());
        }
    }
    if let Some(favorite) = fields.favorite {
        form = form.text("favorite", favorite.to_string());
    }

    if let Some(path) = avatar {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("avatar")
            .to_string();
        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(guess_image_mime(path))?;
        form = form.part("avatarFile", part);
    }

    Ok(form)
}

fn guess_image_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "avif" => "image/avif",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_paths_are_escaped() {
        assert_eq!(item_path("42"), "/api/v1/contacts/42");
        assert_eq!(item_path("a/b"), "/api/v1/contacts/a%2Fb");
    }

    #[test]
    fn guesses_mime_from_extension() {
        assert_eq!(guess_image_mime(Path::new("me.JPG")), "image/jpeg");
        assert_eq!(guess_image_mime(Path::new("me.png")), "image/png");
        assert_eq!(guess_image_mime(Path::new("me")), "application/octet-stream");
    }
}
