use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::database::error::StoreError;
use crate::database::models::{Contact, ContactPatch, NewContact};
use crate::database::repository::ContactStore;
use crate::filter::ContactFilter;

#[derive(Debug, Default)]
struct MemoryState {
    last_id: i64,
    rows: BTreeMap<i64, Contact>,
}

/// Process-local `ContactStore`. Identifiers come from a monotonic counter
/// and are never handed out twice, even after `delete_all`.
#[derive(Debug, Default)]
pub struct MemoryContactStore {
    state: RwLock<MemoryState>,
}

impl MemoryContactStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContactStore for MemoryContactStore {
    async fn insert(&self, contact: NewContact) -> Result<Contact, StoreError> {
        if contact.name.trim().is_empty() {
            return Err(StoreError::QueryError("name must not be empty".to_string()));
        }
        let mut state = self.state.write().await;
        state.last_id += 1;
        let now = Utc::now();
        let row = Contact {
            id: state.last_id,
            name: contact.name,
            email: contact.email,
            address: contact.address,
            phone: contact.phone,
            favorite: contact.favorite,
            avatar: contact.avatar,
            created_at: now,
            updated_at: now,
        };
        state.rows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn select_page(&self, filter: &ContactFilter) -> Result<(Vec<Contact>, u64), StoreError> {
        let state = self.state.read().await;
        let matching: Vec<&Contact> = state.rows.values().filter(|c| filter.matches(c)).collect();
        let total = matching.len() as u64;
        let offset = usize::try_from(filter.offset()).unwrap_or(usize::MAX);
        let page = matching
            .into_iter()
            .skip(offset)
            .take(filter.limit as usize)
            .cloned()
            .collect();
        Ok((page, total))
    }

    async fn select_by_id(&self, id: i64) -> Result<Option<Contact>, StoreError> {
        Ok(self.state.read().await.rows.get(&id).cloned())
    }

    async fn update(&self, id: i64, patch: ContactPatch) -> Result<Option<Contact>, StoreError> {
        let mut state = self.state.write().await;
        let Some(contact) = state.rows.get_mut(&id) else {
            return Ok(None);
        };
        patch.apply_to(contact);
        contact.updated_at = Utc::now();
        Ok(Some(contact.clone()))
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self.state.write().await.rows.remove(&id).is_some())
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        let mut state = self.state.write().await;
        let removed = state.rows.len() as u64;
        state.rows.clear();
        Ok(removed)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
