use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::PaginationConfig;
use crate::database::models::{Contact, ContactPatch, NewContact};
use crate::database::{ContactStore, StoreError};
use crate::filter::{ContactFilter, PaginationMetadata};

/// One page of contacts with its paging metadata
#[derive(Debug, Clone, Serialize)]
pub struct ContactPage {
    pub contacts: Vec<Contact>,
    pub metadata: PaginationMetadata,
}

/// Domain operations over a `ContactStore`
pub struct ContactService {
    store: Arc<dyn ContactStore>,
    pagination: PaginationConfig,
}

impl ContactService {
    pub fn new(store: Arc<dyn ContactStore>, pagination: PaginationConfig) -> Self {
        Self { store, pagination }
    }

    pub fn pagination(&self) -> &PaginationConfig {
        &self.pagination
    }

    pub async fn create(&self, contact: NewContact) -> Result<Contact, StoreError> {
        let created = self.store.insert(contact).await?;
        info!(id = created.id, "Created contact");
        Ok(created)
    }

    pub async fn list_by_filter(&self, filter: &ContactFilter) -> Result<ContactPage, StoreError> {
        let (contacts, total) = self.store.select_page(filter).await?;
        debug!(
            total,
            page = filter.page,
            limit = filter.limit,
            returned = contacts.len(),
            "Listed contacts"
        );
        Ok(ContactPage {
            contacts,
            metadata: PaginationMetadata::new(total, filter.page, filter.limit),
        })
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Contact>, StoreError> {
        self.store.select_by_id(id).await
    }

    /// `None` when no contact has this id
    pub async fn update(&self, id: i64, patch: ContactPatch) -> Result<Option<Contact>, StoreError> {
        let updated = self.store.update(id, patch).await?;
        if updated.is_some() {
            info!(id, "Updated contact");
        }
        Ok(updated)
    }

    /// `false` when no contact has this id
    pub async fn delete_by_id(&self, id: i64) -> Result<bool, StoreError> {
        let deleted = self.store.delete_by_id(id).await?;
        if deleted {
            info!(id, "Deleted contact");
        }
        Ok(deleted)
    }

    pub async fn delete_all(&self) -> Result<u64, StoreError> {
        let removed = self.store.delete_all().await?;
        info!(removed, "Deleted all contacts");
        Ok(removed)
    }

    pub async fn health_check(&self) -> Result<(), StoreError> {
        self.store.ping().await
    }
}
