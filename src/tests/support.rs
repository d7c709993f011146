use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{BoxError, RelayError, Result};
use crate::model::{QueueMessage, Record, SendAck};
use crate::queue::{QueueTransport, ReceiveOptions};
use crate::queue_mem::MemQueue;
use crate::relay::Relay;
use crate::store::RecordStore;
use crate::store_mem::MemStore;

fn refusal(label: &'static str) -> BoxError {
    label.into()
}

pub fn relay_with_mem() -> (Arc<Relay>, Arc<MemStore>, Arc<MemQueue>) {
    let store = Arc::new(MemStore::new());
    let queue = Arc::new(MemQueue::new());
    let relay = Arc::new(Relay::new(store.clone(), queue.clone()));
    (relay, store, queue)
}

pub async fn receive_one(queue: &MemQueue) -> QueueMessage {
    let opts = ReceiveOptions {
        wait_ms: 500,
        visibility_timeout_secs: 30,
        max_messages: 1,
    };
    let mut batch = queue.receive(&opts).await.unwrap();
    batch.pop().expect("expected a visible message")
}

/// Mem store wrapper with per-operation failure toggles and a fetch
/// counter, for exercising the relay's failure branches.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemStore,
    pub fail_create: AtomicBool,
    pub fail_fetch: AtomicBool,
    pub fail_delete: AtomicBool,
    pub fetch_calls: AtomicUsize,
}

#[async_trait]
impl RecordStore for FlakyStore {
    async fn create(&self, payload: Value) -> Result<Record> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(RelayError::StoreWrite(refusal("create refused")));
        }
        self.inner.create(payload).await
    }

    async fn fetch(&self, id: &str) -> Result<Option<Record>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(RelayError::StoreRead(refusal("fetch refused")));
        }
        self.inner.fetch(id).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(RelayError::StoreDelete(refusal("delete refused")));
        }
        self.inner.delete(id).await
    }
}

/// Mem queue wrapper whose sends can be made to fail.
#[derive(Default)]
pub struct FlakyQueue {
    pub inner: MemQueue,
    pub fail_send: AtomicBool,
}

#[async_trait]
impl QueueTransport for FlakyQueue {
    async fn send(&self, body: String) -> Result<SendAck> {
        if self.fail_send.load(Ordering::SeqCst) {
            return Err(RelayError::QueueSend(refusal("send refused")));
        }
        self.inner.send(body).await
    }

    async fn receive(&self, opts: &ReceiveOptions) -> Result<Vec<QueueMessage>> {
        self.inner.receive(opts).await
    }

    async fn ack(&self, receipt: &str) -> Result<()> {
        self.inner.ack(receipt).await
    }
}
