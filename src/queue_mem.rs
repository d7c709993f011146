use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::Result;
use crate::model::{now_millis, QueueMessage, SendAck};
use crate::queue::{QueueTransport, ReceiveOptions};

const POLL_STEP_MS: u64 = 10;

struct StoredMessage {
    id: String,
    body: String,
    visible_at_ms: u64,
    receipt: Option<String>,
}

/// In-memory queue with visibility-timeout semantics, used by tests and
/// single-process embedders. A received message is hidden for the
/// configured window and handed out under a fresh receipt; if it is not
/// acked before the window lapses it becomes receivable again.
pub struct MemQueue {
    messages: Mutex<Vec<StoredMessage>>,
}

impl MemQueue {
    pub fn new() -> Self {
        MemQueue {
            messages: Mutex::new(Vec::new()),
        }
    }

    /// Total messages still on the queue, visible or in flight.
    pub async fn len(&self) -> usize {
        self.messages.lock().await.len()
    }

    async fn take_visible(&self, opts: &ReceiveOptions) -> Vec<QueueMessage> {
        let now = now_millis();
        let hide_until = now + opts.visibility_timeout_secs * 1000;
        let mut messages = self.messages.lock().await;
        let mut taken = Vec::new();
        for stored in messages.iter_mut() {
            if taken.len() >= opts.max_messages {
                break;
            }
            if stored.visible_at_ms > now {
                continue;
            }
            let receipt = Uuid::new_v4().to_string();
            stored.visible_at_ms = hide_until;
            stored.receipt = Some(receipt.clone());
            taken.push(QueueMessage {
                id: stored.id.clone(),
                body: stored.body.clone(),
                receipt,
            });
        }
        taken
    }
}

impl Default for MemQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QueueTransport for MemQueue {
    async fn send(&self, body: String) -> Result<SendAck> {
        let id = Uuid::new_v4().to_string();
        let mut messages = self.messages.lock().await;
        messages.push(StoredMessage {
            id: id.clone(),
            body,
            visible_at_ms: now_millis(),
            receipt: None,
        });
        Ok(SendAck { message_id: id })
    }

    async fn receive(&self, opts: &ReceiveOptions) -> Result<Vec<QueueMessage>> {
        let deadline = now_millis() + opts.wait_ms;
        loop {
            let taken = self.take_visible(opts).await;
            if !taken.is_empty() || now_millis() >= deadline {
                return Ok(taken);
            }
            tokio::time::sleep(Duration::from_millis(POLL_STEP_MS)).await;
        }
    }

    async fn ack(&self, receipt: &str) -> Result<()> {
        let mut messages = self.messages.lock().await;
        messages.retain(|stored| stored.receipt.as_deref() != Some(receipt));
        Ok(())
    }
}
