use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::model::Record;

pub type DynRecordStore = Arc<dyn RecordStore + Send + Sync>;

/// Adapter over the external record store. Implementations must be safe
/// for concurrent use: a second `fetch` racing a `delete` of the same id
/// must observe absence, never a stale payload.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Persists a new record and returns it with its store-assigned id.
    async fn create(&self, payload: Value) -> Result<Record>;
    /// Returns `None` for ids that were already consumed, expired, or
    /// never existed. Absence is not an error.
    async fn fetch(&self, id: &str) -> Result<Option<Record>>;
    /// Idempotent: deleting an absent id succeeds, since the delete may
    /// race with store-side TTL expiry.
    async fn delete(&self, id: &str) -> Result<()>;
}
