use std::sync::Arc;

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Multipart, Request},
    http::{header, StatusCode},
    Form, Json,
};
use serde_json::{Map, Value};

use crate::database::models::{ContactPatch, NewContact};
use crate::error::ApiError;
use crate::filter::parse_flag;
use crate::services::{AvatarStorage, UploadError};

/// Multipart field names that may carry the avatar image
const AVATAR_FIELDS: &[&str] = &["avatarFile", "avatar"];

/// Fields the store assigns itself; silently dropped when clients echo them back
const SYSTEM_FIELDS: &[&str] = &["id", "created_at", "updated_at", "createdAt", "updatedAt"];

const CONTACT_FIELDS: &[&str] = &["name", "email", "address", "phone", "favorite", "avatar"];

/// Contact fields parsed from a create/update body.
///
/// Multipart bodies may include one avatar image, which is written to
/// `AvatarStorage` during extraction; `avatar` then holds its public path.
/// JSON and url-encoded bodies are accepted with the same field names.
/// Keys that are not contact fields are dropped.
///
/// A recognized field with an unusable value does not fail extraction.
/// It is kept in `rejected` so handlers can report it once the target
/// contact is known to exist.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ContactForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub favorite: Option<bool>,
    pub avatar: Option<String>,
    pub rejected: Option<String>,
    /// Keys present in the body that map to no contact column
    pub ignored: Vec<String>,
}

impl ContactForm {
    /// The body carried no keys at all
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.address.is_none()
            && self.phone.is_none()
            && self.favorite.is_none()
            && self.avatar.is_none()
            && self.rejected.is_none()
            && self.ignored.is_empty()
    }

    /// 400 for the first unusable field value, if any
    pub fn rejection(&self) -> Option<ApiError> {
        self.rejected.as_deref().map(ApiError::bad_request)
    }

    pub fn into_new_contact(self) -> Result<NewContact, ApiError> {
        let name = match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => return Err(ApiError::bad_request("Name is required")),
        };
        if let Some(err) = self.rejection() {
            return Err(err);
        }

        Ok(NewContact {
            name,
            email: self.email.and_then(non_blank),
            address: self.address.and_then(non_blank),
            phone: self.phone.and_then(non_blank),
            favorite: self.favorite.unwrap_or(false),
            avatar: self.avatar,
        })
    }

    /// Blank names are dropped; blank optional fields clear the column
    pub fn into_patch(self) -> ContactPatch {
        ContactPatch {
            name: self
                .name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            email: self.email.map(non_blank),
            address: self.address.map(non_blank),
            phone: self.phone.map(non_blank),
            favorite: self.favorite,
            avatar: self.avatar,
        }
    }

    fn set_text(&mut self, key: &str, value: String) {
        match key {
            "name" => self.name = Some(value),
            "email" => self.email = Some(value),
            "address" => self.address = Some(value),
            "phone" => self.phone = Some(value),
            "favorite" => match parse_flag(&value) {
                Some(flag) => self.favorite = Some(flag),
                None => self.reject(format!("favorite must be a boolean, got '{}'", value)),
            },
            // A textual avatar is never trusted; only uploaded files set it
            "avatar" => self.ignored.push(key.to_string()),
            k if SYSTEM_FIELDS.contains(&k) => self.ignored.push(k.to_string()),
            other => {
                tracing::debug!(field = %other, "Ignoring unknown contact field");
                self.ignored.push(other.to_string());
            }
        }
    }

    fn set_json(&mut self, key: &str, value: Value) {
        let text = match (key, value) {
            (_, Value::String(s)) => s,
            (_, Value::Null) => String::new(),
            // Names must be strings; a number is not a name
            ("name", _) => {
                self.reject("name must be a string".to_string());
                return;
            }
            (_, Value::Bool(b)) => b.to_string(),
            (_, Value::Number(n)) => n.to_string(),
            (k, Value::Array(_) | Value::Object(_)) => {
                if CONTACT_FIELDS.contains(&k) && k != "avatar" {
                    self.reject(format!("{} must be a scalar value", k));
                } else {
                    self.ignored.push(k.to_string());
                }
                return;
            }
        };
        self.set_text(key, text)
    }

    fn reject(&mut self, message: String) {
        if self.rejected.is_none() {
            self.rejected = Some(message);
        }
    }

    async fn from_multipart(
        mut multipart: Multipart,
        storage: &AvatarStorage,
    ) -> Result<Self, ApiError> {
        let mut form = ContactForm::default();
        let result = form.read_multipart(&mut multipart, storage).await;
        if let Err(err) = result {
            // Don't leave an orphaned file behind a rejected body
            if let Some(path) = form.avatar.take() {
                storage.discard(&path).await;
            }
            return Err(err);
        }
        Ok(form)
    }

    async fn read_multipart(
        &mut self,
        multipart: &mut Multipart,
        storage: &AvatarStorage,
    ) -> Result<(), ApiError> {
        while let Some(field) = multipart.next_field().await? {
            let Some(key) = field.name().map(str::to_owned) else {
                continue;
            };

            let Some(file_name) = field.file_name().map(str::to_owned) else {
                let value = field.text().await?;
                self.set_text(&key, value);
                continue;
            };

            if !AVATAR_FIELDS.contains(&key.as_str()) {
                return Err(UploadError::InvalidField(format!("unexpected file field '{}'", key)).into());
            }

            let content_type = field.content_type().map(str::to_owned);
            let bytes = field.bytes().await?;

            // Browsers submit an empty part for an untouched file input
            if file_name.is_empty() && bytes.is_empty() {
                continue;
            }
            if self.avatar.is_some() {
                return Err(UploadError::TooManyFiles.into());
            }

            let path = storage
                .store(Some(&file_name), content_type.as_deref(), &bytes)
                .await?;
            tracing::debug!(field = %key, file = %file_name, path = %path, "Stored uploaded avatar");
            self.avatar = Some(path);
        }
        Ok(())
    }

    fn from_json(object: Map<String, Value>) -> Self {
        let mut form = ContactForm::default();
        for (key, value) in object {
            form.set_json(&key, value);
        }
        form
    }

    fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut form = ContactForm::default();
        for (key, value) in pairs {
            form.set_text(&key, value);
        }
        form
    }
}

fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

fn rejection(status: StatusCode, body_text: String) -> ApiError {
    match status {
        StatusCode::PAYLOAD_TOO_LARGE => ApiError::PayloadTooLarge("Request body is too large".to_string()),
        StatusCode::UNSUPPORTED_MEDIA_TYPE => ApiError::UnsupportedMediaType(body_text),
        _ => ApiError::bad_request(body_text),
    }
}

#[async_trait]
impl<S> FromRequest<S> for ContactForm
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_ascii_lowercase());

        match content_type.as_deref() {
            Some(ct) if ct.starts_with("multipart/form-data") => {
                let storage = req
                    .extensions()
                    .get::<Arc<AvatarStorage>>()
                    .cloned()
                    .ok_or_else(|| {
                        tracing::error!("AvatarStorage extension missing from router");
                        ApiError::internal_server_error("An error occurred while storing the avatar")
                    })?;
                let multipart = Multipart::from_request(req, state)
                    .await
                    .map_err(|r| rejection(r.status(), r.body_text()))?;
                Self::from_multipart(multipart, &storage).await
            }
            Some(ct) if ct.starts_with("application/json") => {
                let Json(value) = Json::<Value>::from_request(req, state)
                    .await
                    .map_err(|r| rejection(r.status(), r.body_text()))?;
                match value {
                    Value::Object(object) => Ok(Self::from_json(object)),
                    _ => Err(ApiError::bad_request("Request body must be a JSON object")),
                }
            }
            Some(ct) if ct.starts_with("application/x-www-form-urlencoded") => {
                let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
                    .await
                    .map_err(|r| rejection(r.status(), r.body_text()))?;
                Ok(Self::from_pairs(pairs))
            }
            other => {
                let bytes = Bytes::from_request(req, state)
                    .await
                    .map_err(|r| rejection(r.status(), r.body_text()))?;
                if bytes.is_empty() {
                    return Ok(ContactForm::default());
                }
                Err(ApiError::UnsupportedMediaType(format!(
                    "Unsupported content type '{}'",
                    other.unwrap_or("none")
                )))
            }
        }
    }
}
