use std::sync::atomic::Ordering;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::consumer::MessageHandler;
use crate::error::{RelayError, Result};
use crate::metrics::RelayMetrics;
use crate::model::{
    parse_reference, Provenance, QueueMessage, ReferenceMessage, ReferenceParse, SendAck,
};
use crate::queue::DynQueueTransport;
use crate::store::DynRecordStore;

/// How a single consume step resolved; the loop acks everything except
/// `Foreign`.
#[derive(Debug)]
pub enum ConsumeOutcome {
    Delivered,
    /// Handler succeeded but the record delete failed; orphan left to TTL.
    CleanupFailed(RelayError),
    /// Duplicate delivery or TTL race.
    RecordAbsent,
    /// Not a reference produced by this relay.
    Foreign,
}

/// Core of the claim-check pattern: `publish` stores the payload and
/// sends only its id through the queue; `consume` resolves an inbound
/// reference back to the payload and retires the record.
pub struct Relay {
    store: DynRecordStore,
    queue: DynQueueTransport,
    metrics: Arc<RelayMetrics>,
}

impl Relay {
    pub fn new(store: DynRecordStore, queue: DynQueueTransport) -> Self {
        Relay {
            store,
            queue,
            metrics: Arc::new(RelayMetrics::default()),
        }
    }

    pub fn queue(&self) -> DynQueueTransport {
        self.queue.clone()
    }

    pub fn metrics(&self) -> Arc<RelayMetrics> {
        self.metrics.clone()
    }

    /// Stores the payload, then sends a reference message carrying the
    /// new record id. A failed send is compensated by deleting the
    /// record, so no durable artifact survives a failed reference; if the
    /// compensating delete itself fails the record is leaked and the
    /// caller gets `CompensationFailure` naming it.
    pub async fn publish(&self, payload: serde_json::Value) -> Result<SendAck> {
        self.metrics.publish_total.fetch_add(1, Ordering::Relaxed);
        let record = self.store.create(payload).await?;
        let body = serde_json::to_string(&ReferenceMessage {
            id: record.id.clone(),
        })?;
        match self.queue.send(body).await {
            Ok(ack) => {
                self.metrics.publish_sent.fetch_add(1, Ordering::Relaxed);
                Ok(ack)
            }
            Err(send_err) => match self.store.delete(&record.id).await {
                Ok(()) => {
                    self.metrics
                        .publish_compensated
                        .fetch_add(1, Ordering::Relaxed);
                    Err(send_err)
                }
                Err(delete_err) => {
                    warn!(record_id = %record.id, "compensating delete failed, record leaked");
                    Err(RelayError::CompensationFailure {
                        record_id: record.id,
                        original: Box::new(send_err),
                        cleanup: Box::new(delete_err),
                    })
                }
            },
        }
    }

    /// Resolves one raw queue message. Foreign or malformed bodies are
    /// skipped before any store access; a missing record is skipped as a
    /// duplicate. Handler errors propagate so the loop can leave the
    /// message for redelivery; the record is retained in that case.
    pub async fn consume(
        &self,
        message: &QueueMessage,
        handler: &MessageHandler,
    ) -> Result<ConsumeOutcome> {
        self.metrics.consume_total.fetch_add(1, Ordering::Relaxed);
        let record_id = match parse_reference(&message.body) {
            ReferenceParse::Valid(id) => id,
            ReferenceParse::Malformed => {
                self.metrics.skipped_foreign.fetch_add(1, Ordering::Relaxed);
                debug!(message_id = %message.id, "skipping foreign message");
                return Ok(ConsumeOutcome::Foreign);
            }
        };
        let record = match self.store.fetch(&record_id).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                self.metrics.skipped_absent.fetch_add(1, Ordering::Relaxed);
                debug!(%record_id, "record absent, duplicate delivery or TTL race");
                return Ok(ConsumeOutcome::RecordAbsent);
            }
            Err(err) => {
                self.metrics.skipped_absent.fetch_add(1, Ordering::Relaxed);
                warn!(%record_id, error = %err, "store read failed, treating record as absent");
                return Ok(ConsumeOutcome::RecordAbsent);
            }
        };
        let provenance = Provenance {
            message_id: message.id.clone(),
            receipt: message.receipt.clone(),
        };
        if let Err(err) = handler(record.payload, provenance).await {
            self.metrics.handler_errors.fetch_add(1, Ordering::Relaxed);
            return Err(RelayError::Handler(err));
        }
        match self.store.delete(&record_id).await {
            Ok(()) => {
                self.metrics.delivered.fetch_add(1, Ordering::Relaxed);
                Ok(ConsumeOutcome::Delivered)
            }
            Err(err) => {
                self.metrics
                    .cleanup_failures
                    .fetch_add(1, Ordering::Relaxed);
                warn!(%record_id, error = %err, "record cleanup failed after delivery");
                Ok(ConsumeOutcome::CleanupFailed(RelayError::RecordCleanup {
                    record_id,
                    source: Box::new(err),
                }))
            }
        }
    }
}
