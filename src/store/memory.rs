use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{RecordStore, StoreError, StoredRecord};

/// In-memory record store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, StoredRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get(&self, tag_id: &str) -> Result<Option<StoredRecord>, StoreError> {
        Ok(self.records.read().await.get(tag_id).cloned())
    }

    async fn put(&self, tag_id: &str, record: StoredRecord) -> Result<(), StoreError> {
        self.records.write().await.insert(tag_id.to_string(), record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::BloodGroup;

    fn record(name: &str) -> StoredRecord {
        StoredRecord {
            full_name: name.to_string(),
            blood_group: BloodGroup::BPositive,
            encrypted_blob: String::new(),
            is_encrypted: false,
            encryption_method: None,
        }
    }

    #[tokio::test]
    async fn test_put_get_replace() {
        let store = MemoryStore::new();
        assert!(store.get("tag-1").await.unwrap().is_none());

        store.put("tag-1", record("First")).await.unwrap();
        store.put("tag-1", record("Second")).await.unwrap();

        assert_eq!(store.get("tag-1").await.unwrap().unwrap().full_name, "Second");
        assert_eq!(store.len().await, 1);
    }
}
