//! Audio blob uploaders.
//!
//! An upload is written under `audio/<nanos>_<name>`: the creation time in
//! nanoseconds followed by a cleaned-up copy of the original file name. The
//! returned URL points at `<origin>/audio/<nanos>_<name>`, which the server
//! resolves through [`BlobUploader::fetch`].

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use betweenlines_shared::constants::AUDIO_PREFIX;
use chrono::Utc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::{Result, StoreError};

const MAX_NAME_LEN: usize = 100;

#[async_trait]
pub trait BlobUploader: Send + Sync {
    /// Store `content` durably and return a URL it can be fetched from.
    async fn upload(&self, content: &[u8], name_hint: &str) -> Result<String>;

    /// Read a blob back by its key (the part after `audio/`).
    /// Unknown or malformed keys are `Ok(None)`.
    async fn fetch(&self, key: &str) -> Result<Option<Vec<u8>>>;
}

/// Reduce a user-supplied file name to a safe single path component.
pub fn sanitize_name(hint: &str) -> String {
    let base = hint.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_NAME_LEN)
        .collect();

    if cleaned.trim_matches('.').is_empty() {
        "audio".to_string()
    } else {
        cleaned
    }
}

/// Storage key for a new upload: `<nanos>_<sanitized name>`.
pub fn blob_key(name_hint: &str) -> String {
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    format!("{}_{}", nanos, sanitize_name(name_hint))
}

/// Keys must be a single plain file name.
fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && !key.contains('/')
        && !key.contains('\\')
        && !key.contains("..")
        && Path::new(key)
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
}

fn check_size(content: &[u8], max_size: usize) -> Result<()> {
    if content.is_empty() {
        return Err(StoreError::Upload("Empty blob".to_string()));
    }
    if content.len() > max_size {
        return Err(StoreError::BlobTooLarge {
            size: content.len(),
            max: max_size,
        });
    }
    Ok(())
}

fn blob_url(origin: &str, key: &str) -> String {
    format!("{}/{}/{}", origin.trim_end_matches('/'), AUDIO_PREFIX, key)
}

// ---------------------------------------------------------------------------
// Filesystem
// ---------------------------------------------------------------------------

/// Durable uploader writing one file per blob under `<base>/audio/`.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    audio_dir: PathBuf,
    public_origin: String,
    max_size: usize,
}

impl FsBlobStore {
    pub async fn new(
        base_path: PathBuf,
        public_origin: impl Into<String>,
        max_size: usize,
    ) -> Result<Self> {
        let audio_dir = base_path.join(AUDIO_PREFIX);
        fs::create_dir_all(&audio_dir).await.map_err(|e| {
            StoreError::Upload(format!(
                "Failed to create blob directory '{}': {}",
                audio_dir.display(),
                e
            ))
        })?;

        info!(path = %audio_dir.display(), "Blob store initialized");

        Ok(Self {
            audio_dir,
            public_origin: public_origin.into(),
            max_size,
        })
    }

    pub fn audio_dir(&self) -> &Path {
        &self.audio_dir
    }

    fn blob_path(&self, key: &str) -> Option<PathBuf> {
        if !is_valid_key(key) {
            return None;
        }
        let path = self.audio_dir.join(key);
        path.starts_with(&self.audio_dir).then_some(path)
    }
}

#[async_trait]
impl BlobUploader for FsBlobStore {
    async fn upload(&self, content: &[u8], name_hint: &str) -> Result<String> {
        check_size(content, self.max_size)?;

        // create_new so a key clash can never overwrite an earlier upload
        let (key, mut file) = loop {
            let key = blob_key(name_hint);
            let path = self.audio_dir.join(&key);
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => break (key, file),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(StoreError::Upload(format!(
                        "Failed to create blob {}: {}",
                        key, e
                    )))
                }
            }
        };

        file.write_all(content)
            .await
            .map_err(|e| StoreError::Upload(format!("Failed to write blob {}: {}", key, e)))?;
        file.flush()
            .await
            .map_err(|e| StoreError::Upload(format!("Failed to flush blob {}: {}", key, e)))?;

        debug!(key = %key, size = content.len(), "Stored blob");
        Ok(blob_url(&self.public_origin, &key))
    }

    async fn fetch(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let Some(path) = self.blob_path(key) else {
            return Ok(None);
        };

        match fs::read(&path).await {
            Ok(data) => {
                debug!(key = %key, size = data.len(), "Retrieved blob");
                Ok(Some(data))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Unavailable(format!(
                "Failed to read blob {}: {}",
                key, e
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Memory
// ---------------------------------------------------------------------------

/// Local-only uploader keeping blobs in process memory.
#[derive(Debug, Clone)]
pub struct MemoryBlobStore {
    blobs: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    public_origin: String,
    max_size: usize,
}

impl MemoryBlobStore {
    pub fn new(public_origin: impl Into<String>, max_size: usize) -> Self {
        Self {
            blobs: Arc::new(RwLock::new(HashMap::new())),
            public_origin: public_origin.into(),
            max_size,
        }
    }

    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl BlobUploader for MemoryBlobStore {
    async fn upload(&self, content: &[u8], name_hint: &str) -> Result<String> {
        check_size(content, self.max_size)?;

        let mut blobs = self.blobs.write().await;
        let mut key = blob_key(name_hint);
        while blobs.contains_key(&key) {
            key = blob_key(name_hint);
        }
        blobs.insert(key.clone(), content.to_vec());

        debug!(key = %key, size = content.len(), "Stored blob in memory");
        Ok(blob_url(&self.public_origin, &key))
    }

    async fn fetch(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.blobs.read().await.get(key).cloned())
    }
}
