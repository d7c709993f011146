use thiserror::Error;

pub type Result<T> = std::result::Result<T, RelayError>;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("store write failed: {0}")]
    StoreWrite(#[source] BoxError),
    #[error("store read failed: {0}")]
    StoreRead(#[source] BoxError),
    #[error("store delete failed: {0}")]
    StoreDelete(#[source] BoxError),
    #[error("queue send failed: {0}")]
    QueueSend(#[source] BoxError),
    #[error("queue receive failed: {0}")]
    QueueReceive(#[source] BoxError),
    #[error("queue ack failed: {0}")]
    QueueAck(#[source] BoxError),
    #[error("compensation failed, record {record_id} leaked: send: {original}; delete: {cleanup}")]
    CompensationFailure {
        record_id: String,
        original: Box<RelayError>,
        cleanup: Box<RelayError>,
    },
    #[error("record cleanup failed for {record_id}")]
    RecordCleanup {
        record_id: String,
        #[source]
        source: Box<RelayError>,
    },
    #[error("message handler failed: {0}")]
    Handler(#[source] BoxError),
    #[error("json error")]
    Json(#[from] serde_json::Error),
    #[error("consumer is not stopped")]
    NotStopped,
}
