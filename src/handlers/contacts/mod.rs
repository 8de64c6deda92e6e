pub mod collection;
pub mod item;

use serde::Serialize;

use crate::database::models::Contact;
use crate::error::ApiError;
use crate::services::AvatarStorage;

// Re-export handler functions for use in routing
pub use collection::delete as collection_delete;
pub use collection::get as collection_get;
pub use collection::post as collection_post;

pub use item::delete as item_delete;
pub use item::get as item_get;
pub use item::put as item_put;

/// `data` payload of single-contact responses
#[derive(Debug, Serialize)]
pub struct ContactBody {
    pub contact: Contact,
}

/// Identifiers that are not integers can never match a row
fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.trim().parse::<i64>().map_err(|_| ApiError::contact_not_found())
}

/// Remove an avatar stored for a request that did not succeed
async fn discard_avatar(storage: &AvatarStorage, avatar: Option<String>) {
    if let Some(path) = avatar {
        storage.discard(&path).await;
    }
}
