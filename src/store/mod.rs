//! Record store collaborator.
//!
//! Online tags reference a [`StoredRecord`] by tag ID. The store only moves
//! opaque blobs; it never sees a PIN or a plaintext profile (unless the
//! record was written unencrypted).
//!
//! Implementations:
//! - [`MemoryStore`]: process-local map, for tests and embedding
//! - [`FileStore`]: a JSON file on disk, used by the CLI

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cipher::{CipherError, CipherMethod};
use crate::profile::BloodGroup;

/// Errors that can occur while talking to a record store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Store backend error: {0}")]
    Backend(String),
}

/// What an online tag points at.
///
/// `full_name` and `blood_group` are stored in clear so a scanner can show
/// them before the PIN is entered. `encrypted_blob` holds the standard
/// base64 envelope of the profile JSON, or the plaintext JSON itself when
/// `is_encrypted` is false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRecord {
    pub full_name: String,
    pub blood_group: BloodGroup,
    pub encrypted_blob: String,
    pub is_encrypted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption_method: Option<String>,
}

impl StoredRecord {
    /// The cipher that sealed the blob. No marker means legacy XOR.
    pub fn cipher_method(&self) -> Result<CipherMethod, CipherError> {
        CipherMethod::from_marker(self.encryption_method.as_deref())
    }
}

/// Fetch and store opaque records by tag ID.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Returns `None` when no record exists for `tag_id`.
    async fn get(&self, tag_id: &str) -> Result<Option<StoredRecord>, StoreError>;

    /// Inserts or replaces the record for `tag_id`.
    async fn put(&self, tag_id: &str, record: StoredRecord) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_record_json_shape() {
        let record = StoredRecord {
            full_name: "Jane Roe".to_string(),
            blood_group: BloodGroup::ONegative,
            encrypted_blob: "AAAA".to_string(),
            is_encrypted: true,
            encryption_method: Some("AES-GCM".to_string()),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["fullName"], "Jane Roe");
        assert_eq!(json["bloodGroup"], "O-");
        assert_eq!(json["encryptedBlob"], "AAAA");
        assert_eq!(json["isEncrypted"], true);
        assert_eq!(json["encryptionMethod"], "AES-GCM");
    }

    #[test]
    fn test_missing_method_means_legacy() {
        let json = r#"{
            "fullName": "Old Tag",
            "bloodGroup": "A+",
            "encryptedBlob": "AAAA",
            "isEncrypted": true
        }"#;
        let record: StoredRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.encryption_method, None);
        assert_eq!(record.cipher_method().unwrap(), CipherMethod::Xor);
    }
}
