#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::Value;
use tempfile::TempDir;

use contactbook_api::app::app;
use contactbook_api::config::{AppConfig, StoreBackend};
use contactbook_api::database::DatabaseManager;
use contactbook_api::services::{AvatarStorage, ContactService};

/// Request body cap used by every test server
pub const MAX_REQUEST_BYTES: usize = 64 * 1024;

/// A server on its own port with a fresh in-memory store and upload directory
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
    public_dir: TempDir,
}

impl TestServer {
    async fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);
        let public_dir = tempfile::tempdir().context("failed to create public dir")?;

        let mut config = AppConfig::development();
        config.database.backend = StoreBackend::Memory;
        config.upload.public_dir = public_dir.path().to_path_buf();
        config.upload.max_request_size_bytes = MAX_REQUEST_BYTES;

        let store = DatabaseManager::open_store(&config.database).await?;
        let storage = Arc::new(AvatarStorage::from_config(&config.upload));
        storage.ensure_dir().await?;
        let service = Arc::new(ContactService::new(store, config.pagination.clone()));
        let router = app(service, storage, &config);

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .with_context(|| format!("failed to bind port {}", port))?;
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                eprintln!("test server stopped: {}", e);
            }
        });

        Ok(Self {
            port,
            base_url,
            client: reqwest::Client::new(),
            public_dir,
        })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = self.client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Directory avatars are written to
    pub fn upload_dir(&self) -> PathBuf {
        self.public_dir.path().join("uploads")
    }

    pub fn uploaded_files(&self) -> usize {
        std::fs::read_dir(self.upload_dir()).map(|d| d.count()).unwrap_or(0)
    }

    /// Create a contact from a JSON body and return the `contact` object
    pub async fn create(&self, body: Value) -> Result<Value> {
        let res = self.client.post(self.url("/api/v1/contacts")).json(&body).send().await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "create failed: {}", res.status());
        let payload = res.json::<Value>().await?;
        Ok(payload["data"]["contact"].clone())
    }
}

pub async fn spawn_server() -> Result<TestServer> {
    let server = TestServer::spawn().await?;
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}
