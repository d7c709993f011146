pub mod config;
pub mod consumer;
pub mod error;
pub mod metrics;
pub mod model;
pub mod queue;
pub mod queue_mem;
pub mod relay;
pub mod store;
pub mod store_mem;
#[cfg(test)]
pub mod tests;

pub use config::ConsumerConfig;
pub use consumer::{
    message_handler, ConsumerHooks, ConsumerLoop, ConsumerState, MessageHandler, RunningConsumer,
};
pub use error::{BoxError, RelayError, Result};
pub use metrics::{MetricsSnapshot, RelayMetrics};
pub use model::{
    parse_reference, Provenance, QueueMessage, Record, ReferenceMessage, ReferenceParse, SendAck,
};
pub use queue::{DynQueueTransport, QueueTransport, ReceiveOptions};
pub use queue_mem::MemQueue;
pub use relay::{ConsumeOutcome, Relay};
pub use store::{DynRecordStore, RecordStore};
pub use store_mem::MemStore;
