use std::sync::Arc;

use axum::extract::{rejection::QueryRejection, Extension, Query};

use super::{discard_avatar, ContactBody};
use crate::api::contact_location;
use crate::error::ApiError;
use crate::filter::{ContactFilter, ListQuery};
use crate::middleware::{ApiResponse, ApiResult, ContactForm};
use crate::services::{AvatarStorage, ContactPage, ContactService};
use crate::types::ContactOperation;

/// GET /api/v1/contacts - Filtered, paginated list
pub async fn get(
    Extension(service): Extension<Arc<ContactService>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<ContactPage> {
    let Query(query) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let filter = ContactFilter::from_query(&query, service.pagination())?;

    let page = service
        .list_by_filter(&filter)
        .await
        .map_err(|e| ApiError::store(ContactOperation::List, e))?;

    Ok(ApiResponse::success(page))
}

/// POST /api/v1/contacts - Create a contact, optionally with an avatar image
pub async fn post(
    Extension(service): Extension<Arc<ContactService>>,
    Extension(storage): Extension<Arc<AvatarStorage>>,
    form: ContactForm,
) -> ApiResult<ContactBody> {
    let avatar = form.avatar.clone();

    let new_contact = match form.into_new_contact() {
        Ok(contact) => contact,
        Err(e) => {
            discard_avatar(&storage, avatar).await;
            return Err(e);
        }
    };

    match service.create(new_contact).await {
        Ok(contact) => Ok(ApiResponse::created_at(
            contact_location(contact.id),
            ContactBody { contact },
        )),
        Err(e) => {
            discard_avatar(&storage, avatar).await;
            Err(ApiError::store(ContactOperation::Create, e))
        }
    }
}

/// DELETE /api/v1/contacts - Remove every contact
pub async fn delete(Extension(service): Extension<Arc<ContactService>>) -> ApiResult<()> {
    service
        .delete_all()
        .await
        .map_err(|e| ApiError::store(ContactOperation::DeleteAll, e))?;

    Ok(ApiResponse::empty())
}
