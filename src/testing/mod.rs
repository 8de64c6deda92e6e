//! Fixtures for unit tests: an in-memory store, a temporary upload
//! directory, and the router wired over both.

use std::sync::Arc;

use axum::Router;
use tempfile::TempDir;

use crate::app::app;
use crate::config::AppConfig;
use crate::database::models::NewContact;
use crate::database::MemoryContactStore;
use crate::services::{AvatarStorage, ContactService};

pub struct TestContext {
    config: AppConfig,
    service: Arc<ContactService>,
    storage: Arc<AvatarStorage>,
    // Removed on drop
    _public_dir: TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Development config with the temporary public dir, adjusted by `customize`
    pub fn with_config(customize: impl FnOnce(&mut AppConfig)) -> Self {
        let public_dir = tempfile::tempdir().expect("create temp public dir");

        let mut config = AppConfig::development();
        config.upload.public_dir = public_dir.path().to_path_buf();
        customize(&mut config);

        let store = Arc::new(MemoryContactStore::new());
        let service = Arc::new(ContactService::new(store, config.pagination.clone()));
        let storage = Arc::new(AvatarStorage::from_config(&config.upload));

        Self {
            config,
            service,
            storage,
            _public_dir: public_dir,
        }
    }

    /// Context pre-populated with one contact per name, in order
    pub async fn with_contacts(names: &[&str]) -> Self {
        let ctx = Self::new();
        for name in names {
            ctx.service
                .create(NewContact {
                    name: name.to_string(),
                    ..Default::default()
                })
                .await
                .expect("seed contact");
        }
        ctx
    }

    pub fn service(&self) -> Arc<ContactService> {
        self.service.clone()
    }

    pub fn storage(&self) -> Arc<AvatarStorage> {
        self.storage.clone()
    }

    pub fn router(&self) -> Router {
        app(self.service(), self.storage(), &self.config)
    }
}
