use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::UploadConfig;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp", "svg", "avif"];

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Avatar must be an image, got '{0}'")]
    NotAnImage(String),

    #[error("Only one avatar file may be uploaded")]
    TooManyFiles,

    #[error("Invalid field: {0}")]
    InvalidField(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Writes uploaded avatar images below the public static directory
#[derive(Debug, Clone)]
pub struct AvatarStorage {
    dir: PathBuf,
    url_prefix: String,
}

impl AvatarStorage {
    pub fn new(dir: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            url_prefix: url_prefix.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &UploadConfig) -> Self {
        Self::new(config.avatar_dir(), config.avatar_url_prefix())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn ensure_dir(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await
    }

    /// Store one image and return the public path it is served at
    pub async fn store(
        &self,
        file_name: Option<&str>,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> Result<String, UploadError> {
        let extension = image_extension(file_name, content_type)?;
        let stored_name = format!("{}.{}", Uuid::new_v4().simple(), extension);

        self.ensure_dir().await?;
        tokio::fs::write(self.dir.join(&stored_name), bytes).await?;

        let public_path = format!("{}/{}", self.url_prefix, stored_name);
        debug!(path = %public_path, size = bytes.len(), "Stored avatar");
        Ok(public_path)
    }

    /// Remove a file previously returned by `store`. Paths outside this storage are ignored.
    pub async fn discard(&self, public_path: &str) {
        let Some(name) = self.stored_name(public_path) else {
            warn!(path = %public_path, "Refusing to discard avatar outside upload directory");
            return;
        };
        match tokio::fs::remove_file(self.dir.join(name)).await {
            Ok(()) => debug!(path = %public_path, "Discarded avatar"),
            Err(e) => warn!(path = %public_path, error = %e, "Failed to discard avatar"),
        }
    }

    fn stored_name<'a>(&self, public_path: &'a str) -> Option<&'a str> {
        let name = public_path.strip_prefix(&self.url_prefix)?.strip_prefix('/')?;
        let valid = !name.is_empty()
            && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_')
            && !name.starts_with('.');
        valid.then_some(name)
    }
}

/// Pick the stored extension, rejecting anything that is not an image
fn image_extension(file_name: Option<&str>, content_type: Option<&str>) -> Result<String, UploadError> {
    let from_name = file_name
        .and_then(|n| Path::new(n).extension())
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .filter(|e| IMAGE_EXTENSIONS.contains(&e.as_str()));

    match content_type.map(|c| c.trim().to_ascii_lowercase()) {
        Some(ct) if ct.starts_with("image/") => {
            if let Some(ext) = from_name {
                return Ok(ext);
            }
            let subtype = ct.trim_start_matches("image/");
            let subtype = subtype.split(['+', ';']).next().unwrap_or_default();
            Ok(match subtype {
                "jpeg" | "pjpeg" => "jpg".to_string(),
                s if IMAGE_EXTENSIONS.contains(&s) => s.to_string(),
                _ => "img".to_string(),
            })
        }
        // Clients that send no type (or a generic one) are judged by the file name
        None => from_name.ok_or_else(|| UploadError::NotAnImage(file_name.unwrap_or("unnamed").to_string())),
        Some(ct) if ct == "application/octet-stream" => {
            from_name.ok_or(UploadError::NotAnImage(ct))
        }
        Some(ct) => Err(UploadError::NotAnImage(ct)),
    }
}
