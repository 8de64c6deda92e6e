use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::error::StoreError;
use crate::database::models::{Contact, ContactPatch, NewContact};
use crate::database::query_builder::{build_update, fetch_optional_as, QueryBuilder};
use crate::filter::ContactFilter;

pub const CONTACTS_TABLE: &str = "contacts";

/// Persistence seam for contact records. Absence is reported through
/// `Option`/`bool`, never as an error.
#[async_trait]
pub trait ContactStore: Send + Sync {
    async fn insert(&self, contact: NewContact) -> Result<Contact, StoreError>;

    /// One page of matching contacts ordered by id, plus the total match count
    async fn select_page(&self, filter: &ContactFilter) -> Result<(Vec<Contact>, u64), StoreError>;

    async fn select_by_id(&self, id: i64) -> Result<Option<Contact>, StoreError>;

    async fn update(&self, id: i64, patch: ContactPatch) -> Result<Option<Contact>, StoreError>;

    async fn delete_by_id(&self, id: i64) -> Result<bool, StoreError>;

    /// Returns the number of removed rows
    async fn delete_all(&self) -> Result<u64, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

/// `ContactStore` backed by the PostgreSQL `contacts` table
pub struct PgContactStore {
    pool: PgPool,
}

impl PgContactStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContactStore for PgContactStore {
    async fn insert(&self, contact: NewContact) -> Result<Contact, StoreError> {
        let row = sqlx::query_as::<_, Contact>(
            "INSERT INTO contacts (name, email, address, phone, favorite, avatar)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING *",
        )
        .bind(contact.name)
        .bind(contact.email)
        .bind(contact.address)
        .bind(contact.phone)
        .bind(contact.favorite)
        .bind(contact.avatar)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn select_page(&self, filter: &ContactFilter) -> Result<(Vec<Contact>, u64), StoreError> {
        let query = QueryBuilder::<Contact>::new(filter.to_filter(CONTACTS_TABLE)?);
        let total = query.count(&self.pool).await?;
        let contacts = query.select_all(&self.pool).await?;
        Ok((contacts, u64::try_from(total).unwrap_or_default()))
    }

    async fn select_by_id(&self, id: i64) -> Result<Option<Contact>, StoreError> {
        let contact = sqlx::query_as::<_, Contact>("SELECT * FROM contacts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(contact)
    }

    async fn update(&self, id: i64, patch: ContactPatch) -> Result<Option<Contact>, StoreError> {
        let sql = build_update(CONTACTS_TABLE, id, &patch)?;
        fetch_optional_as::<Contact>(&sql, &self.pool).await
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM contacts").execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
