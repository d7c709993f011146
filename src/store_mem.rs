use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::Result;
use crate::model::{now_millis, Record};
use crate::store::RecordStore;

/// In-memory record store used by tests and single-process embedders.
/// Expiry is out of scope here; a durable backend brings its own TTL.
pub struct MemStore {
    records: RwLock<HashMap<String, Record>>,
}

impl MemStore {
    pub fn new() -> Self {
        MemStore {
            records: RwLock::new(HashMap::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.records.read().await.contains_key(id)
    }
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for MemStore {
    async fn create(&self, payload: Value) -> Result<Record> {
        let record = Record {
            id: Uuid::new_v4().to_string(),
            payload,
            created_at_ms: now_millis(),
        };
        let mut records = self.records.write().await;
        records.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn fetch(&self, id: &str) -> Result<Option<Record>> {
        let records = self.records.read().await;
        Ok(records.get(id).cloned())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut records = self.records.write().await;
        records.remove(id);
        Ok(())
    }
}
