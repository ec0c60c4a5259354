//! Storage Abstraction
//!
//! Blob storage for signature images and rendered PDFs, plus the key layout
//! that ties every blob to its contract.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use sha2::{Digest, Sha256};
use staffing_core::error::StaffingError;
use staffing_core::traits::Id;
use staffing_models::SignerRole;
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("File not found: {0}")]
    NotFound(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Invalid path: {0}")]
    InvalidPath(String),
    #[error("Storage backend error: {0}")]
    BackendError(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for StaffingError {
    fn from(err: StorageError) -> Self {
        StaffingError::Storage(err.to_string())
    }
}

/// What the backend knows about a stored blob
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
    pub size: u64,
    pub content_type: String,
    /// Hex SHA-256 of the content
    pub digest: String,
}

impl FileMetadata {
    fn describe(key: &str, data: &[u8]) -> Self {
        Self {
            size: data.len() as u64,
            content_type: mime_guess::from_path(key)
                .first_or_octet_stream()
                .to_string(),
            digest: sha256_hex(data),
        }
    }
}

/// Storage trait - unified interface for storage backends
#[async_trait]
pub trait Storage: Send + Sync {
    /// Store data under `key`, replacing whatever was there
    async fn put(&self, key: &str, data: Bytes) -> StorageResult<FileMetadata>;

    async fn get(&self, key: &str) -> StorageResult<Bytes>;

    /// Deleting a missing key is not an error
    async fn delete(&self, key: &str) -> StorageResult<()>;

    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Get storage name for logging
    fn name(&self) -> &str;
}

/// Hex SHA-256 digest
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Prefix shared by every blob of a contract
pub fn contract_prefix(contract_id: Id) -> String {
    format!("contracts/{}", contract_id)
}

/// Content-addressed key for a signature image.
///
/// Two uploads with different bytes never share a key, so a rejected upload
/// can be removed without touching the image a contract already references.
pub fn signature_key(contract_id: Id, role: SignerRole, digest: &str, extension: &str) -> String {
    format!(
        "{}/signatures/{}/{}.{}",
        contract_prefix(contract_id),
        role.as_str(),
        digest,
        extension
    )
}

/// Stable key of the rendered PDF; each render overwrites it
pub fn document_key(contract_id: Id) -> String {
    format!("{}/contract.pdf", contract_prefix(contract_id))
}

/// Local filesystem storage
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a key to a full path
    fn resolve_path(&self, key: &str) -> StorageResult<PathBuf> {
        if key.is_empty()
            || key.starts_with('/')
            || key.starts_with('\\')
            || key.split(['/', '\\']).any(|segment| segment == "..")
        {
            return Err(StorageError::InvalidPath(key.to_string()));
        }
        Ok(self.root.join(key))
    }

    async fn ensure_parent(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for LocalStorage {
    #[instrument(skip(self, data), fields(storage = "local", size = data.len()))]
    async fn put(&self, key: &str, data: Bytes) -> StorageResult<FileMetadata> {
        let path = self.resolve_path(key)?;
        self.ensure_parent(&path).await?;

        // staged write, then rename over the target
        let staging = path.with_extension(format!("tmp-{}", uuid::Uuid::new_v4()));
        let mut file = fs::File::create(&staging).await?;
        file.write_all(&data).await?;
        file.sync_all().await?;
        drop(file);
        fs::rename(&staging, &path).await?;

        debug!(path = ?path, "File stored");
        Ok(FileMetadata::describe(key, &data))
    }

    #[instrument(skip(self), fields(storage = "local"))]
    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        let path = self.resolve_path(key)?;
        match fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self), fields(storage = "local"))]
    async fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.resolve_path(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(path = ?path, "File deleted");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let path = self.resolve_path(key)?;
        Ok(fs::try_exists(&path).await?)
    }

    fn name(&self) -> &str {
        "local"
    }
}

/// In-memory storage for testing
#[derive(Default)]
pub struct MemoryStorage {
    files: RwLock<HashMap<String, Bytes>>,
    fail_puts: RwLock<bool>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `put` fail
    pub async fn fail_puts(&self, fail: bool) {
        *self.fail_puts.write().await = fail;
    }

    /// Stored keys, sorted
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.files.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn put(&self, key: &str, data: Bytes) -> StorageResult<FileMetadata> {
        if *self.fail_puts.read().await {
            return Err(StorageError::BackendError("disk full".to_string()));
        }
        let metadata = FileMetadata::describe(key, &data);
        self.files.write().await.insert(key.to_string(), data);
        Ok(metadata)
    }

    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        self.files
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.files.write().await.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        Ok(self.files.read().await.contains_key(key))
    }

    fn name(&self) -> &str {
        "memory"
    }
}
