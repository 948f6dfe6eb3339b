use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use super::{RecordStore, StoreError, StoredRecord};

const STORE_VERSION: u8 = 1;

/// On-disk layout of the store file.
#[derive(Serialize, Deserialize)]
struct StoreFile {
    /// Version of the store format
    version: u8,
    /// Map of tag ID to record
    records: BTreeMap<String, StoredRecord>,
}

impl Default for StoreFile {
    fn default() -> Self {
        Self {
            version: STORE_VERSION,
            records: BTreeMap::new(),
        }
    }
}

/// Record store backed by a single JSON file.
///
/// A missing file reads as an empty store. Writes rewrite the whole file
/// and are serialized through an internal lock.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_file(&self) -> Result<StoreFile, StoreError> {
        if !fs::try_exists(&self.path).await? {
            return Ok(StoreFile::default());
        }

        let content = fs::read_to_string(&self.path).await?;
        let file: StoreFile = serde_json::from_str(&content)?;
        if file.version != STORE_VERSION {
            return Err(StoreError::Backend(format!(
                "Unsupported store version {} in {}",
                file.version,
                self.path.display()
            )));
        }
        Ok(file)
    }

    async fn write_file(&self, file: &StoreFile) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let content = serde_json::to_string_pretty(file)?;
        fs::write(&self.path, content).await?;

        // Set restrictive permissions (Unix only)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&self.path).await?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&self.path, perms).await?;
        }

        Ok(())
    }

    /// Tag IDs currently stored, in sorted order.
    pub async fn tag_ids(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.read_file().await?.records.into_keys().collect())
    }
}

#[async_trait]
impl RecordStore for FileStore {
    async fn get(&self, tag_id: &str) -> Result<Option<StoredRecord>, StoreError> {
        let mut file = self.read_file().await?;
        Ok(file.records.remove(tag_id))
    }

    async fn put(&self, tag_id: &str, record: StoredRecord) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut file = self.read_file().await?;
        file.records.insert(tag_id.to_string(), record);
        self.write_file(&file).await?;

        debug!(tag_id, path = %self.path.display(), "record stored");
        Ok(())
    }
}
