use std::sync::Arc;

use axum::extract::{Extension, Path};

use super::{discard_avatar, parse_id, ContactBody};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, ContactForm};
use crate::services::{AvatarStorage, ContactService};
use crate::types::ContactOperation;

/// GET /api/v1/contacts/:id
pub async fn get(
    Extension(service): Extension<Arc<ContactService>>,
    Path(id): Path<String>,
) -> ApiResult<ContactBody> {
    let id = parse_id(&id)?;

    match service.get_by_id(id).await {
        Ok(Some(contact)) => Ok(ApiResponse::success(ContactBody { contact })),
        Ok(None) => Err(ApiError::contact_not_found()),
        Err(e) => Err(ApiError::store(ContactOperation::Get(id), e)),
    }
}

/// PUT /api/v1/contacts/:id - Partial update; a new avatar replaces the old reference
pub async fn put(
    Extension(service): Extension<Arc<ContactService>>,
    Extension(storage): Extension<Arc<AvatarStorage>>,
    Path(id): Path<String>,
    form: ContactForm,
) -> ApiResult<ContactBody> {
    if form.is_empty() {
        return Err(ApiError::bad_request("Data to update can not be empty"));
    }
    let rejection = form.rejection();
    let patch = form.into_patch();

    let avatar = patch.avatar.clone();
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(e) => {
            discard_avatar(&storage, avatar).await;
            return Err(e);
        }
    };

    // A malformed value is only reported against a contact that exists
    if let Some(rejection) = rejection {
        discard_avatar(&storage, avatar).await;
        return match service.get_by_id(id).await {
            Ok(Some(_)) => Err(rejection),
            Ok(None) => Err(ApiError::contact_not_found()),
            Err(e) => Err(ApiError::store(ContactOperation::Update(id), e)),
        };
    }

    // Only ignored keys or a blank name; nothing to write
    if patch.is_empty() {
        return match service.get_by_id(id).await {
            Ok(Some(contact)) => Ok(ApiResponse::success(ContactBody { contact })),
            Ok(None) => Err(ApiError::contact_not_found()),
            Err(e) => Err(ApiError::store(ContactOperation::Update(id), e)),
        };
    }

    match service.update(id, patch).await {
        Ok(Some(contact)) => Ok(ApiResponse::success(ContactBody { contact })),
        Ok(None) => {
            discard_avatar(&storage, avatar).await;
            Err(ApiError::contact_not_found())
        }
        Err(e) => {
            discard_avatar(&storage, avatar).await;
            Err(ApiError::store(ContactOperation::Update(id), e))
        }
    }
}

/// DELETE /api/v1/contacts/:id
pub async fn delete(
    Extension(service): Extension<Arc<ContactService>>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let id = parse_id(&id)?;

    match service.delete_by_id(id).await {
        Ok(true) => Ok(ApiResponse::empty()),
        Ok(false) => Err(ApiError::contact_not_found()),
        Err(e) => Err(ApiError::store(ContactOperation::Delete(id), e)),
    }
}
