use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{QueueMessage, SendAck};

pub type DynQueueTransport = Arc<dyn QueueTransport + Send + Sync>;

#[derive(Clone, Debug)]
pub struct ReceiveOptions {
    /// Long-poll wait before an empty receive returns.
    pub wait_ms: u64,
    /// Window during which a received message stays hidden from other
    /// consumers before redelivery.
    pub visibility_timeout_secs: u64,
    pub max_messages: usize,
}

/// Adapter over the external queue transport. The queue may carry
/// messages not produced by this relay; bodies are opaque strings here.
#[async_trait]
pub trait QueueTransport: Send + Sync {
    async fn send(&self, body: String) -> Result<SendAck>;
    /// Long-polls for up to `wait_ms`, returning at most `max_messages`.
    /// Returned messages are invisible to other receivers until their
    /// visibility timeout lapses or they are acked.
    async fn receive(&self, opts: &ReceiveOptions) -> Result<Vec<QueueMessage>>;
    /// Removes a message by its receipt. Acking with a receipt that was
    /// superseded by redelivery is a no-op.
    async fn ack(&self, receipt: &str) -> Result<()>;
}
