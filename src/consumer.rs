use std::future::Future;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use serde_json::Value;
use tokio::sync::{oneshot, Semaphore};
use tokio::task::JoinHandle;

use crate::config::ConsumerConfig;
use crate::error::{BoxError, RelayError, Result};
use crate::model::{Provenance, QueueMessage};
use crate::queue::{DynQueueTransport, ReceiveOptions};
use crate::relay::{ConsumeOutcome, Relay};

pub type ShutdownSignal = Shared<oneshot::Receiver<()>>;

pub type HandlerFuture = BoxFuture<'static, std::result::Result<(), BoxError>>;
pub type MessageHandler = Arc<dyn Fn(Value, Provenance) -> HandlerFuture + Send + Sync>;

/// Boxes an async closure into the `MessageHandler` shape.
pub fn message_handler<F, Fut>(f: F) -> MessageHandler
where
    F: Fn(Value, Provenance) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = std::result::Result<(), BoxError>> + Send + 'static,
{
    Arc::new(move |payload, provenance| f(payload, provenance).boxed())
}

pub type ErrorHook = Arc<dyn Fn(&RelayError) + Send + Sync>;
pub type MessageHook = Arc<dyn Fn(&QueueMessage) + Send + Sync>;
pub type ProcessingErrorHook = Arc<dyn Fn(&RelayError, &QueueMessage) + Send + Sync>;
pub type StoppedHook = Arc<dyn Fn() + Send + Sync>;

/// Side-effecting notifications only; none of these influence ack or
/// delete decisions. Transport-level failures go to `on_error`, handler
/// and relay processing failures to `on_processing_error`, and a handler
/// that overruns the visibility window to `on_timeout`.
#[derive(Clone, Default)]
pub struct ConsumerHooks {
    pub on_error: Option<ErrorHook>,
    pub on_processing_error: Option<ProcessingErrorHook>,
    pub on_timeout: Option<MessageHook>,
    pub on_received: Option<MessageHook>,
    pub on_processed: Option<MessageHook>,
    pub on_stopped: Option<StoppedHook>,
}

impl ConsumerHooks {
    fn error(&self, err: &RelayError) {
        if let Some(hook) = &self.on_error {
            hook(err);
        }
    }

    fn processing_error(&self, err: &RelayError, message: &QueueMessage) {
        if let Some(hook) = &self.on_processing_error {
            hook(err, message);
        }
    }

    fn timeout(&self, message: &QueueMessage) {
        if let Some(hook) = &self.on_timeout {
            hook(message);
        }
    }

    fn received(&self, message: &QueueMessage) {
        if let Some(hook) = &self.on_received {
            hook(message);
        }
    }

    fn processed(&self, message: &QueueMessage) {
        if let Some(hook) = &self.on_processed {
            hook(message);
        }
    }

    fn stopped(&self) {
        if let Some(hook) = &self.on_stopped {
            hook();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumerState {
    Stopped,
    Running,
    Stopping,
}

const STATE_STOPPED: u8 = 0;
const STATE_RUNNING: u8 = 1;
const STATE_STOPPING: u8 = 2;

/// Long-poll receive driver. One task pulls batches from the queue and
/// fans each message out to a bounded pool of handler executions wired
/// through `Relay::consume`.
pub struct ConsumerLoop {
    relay: Arc<Relay>,
    cfg: ConsumerConfig,
    state: Arc<AtomicU8>,
}

pub struct RunningConsumer {
    pub shutdown: oneshot::Sender<()>,
    pub handle: JoinHandle<()>,
}

impl RunningConsumer {
    /// Suppresses new pulls, lets in-flight handlers complete, and
    /// returns once the loop has drained.
    pub async fn stop(self) {
        let _ = self.shutdown.send(());
        let _ = self.handle.await;
    }
}

impl ConsumerLoop {
    pub fn new(relay: Arc<Relay>, cfg: ConsumerConfig) -> Self {
        ConsumerLoop {
            relay,
            cfg,
            state: Arc::new(AtomicU8::new(STATE_STOPPED)),
        }
    }

    pub fn state(&self) -> ConsumerState {
        match self.state.load(Ordering::Acquire) {
            STATE_RUNNING => ConsumerState::Running,
            STATE_STOPPING => ConsumerState::Stopping,
            _ => ConsumerState::Stopped,
        }
    }

    pub fn start(&self, handler: MessageHandler, hooks: ConsumerHooks) -> Result<RunningConsumer> {
        self.state
            .compare_exchange(
                STATE_STOPPED,
                STATE_RUNNING,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map_err(|_| RelayError::NotStopped)?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let signal: ShutdownSignal = shutdown_rx.shared();
        let handle = tokio::spawn(run_driver(
            self.relay.clone(),
            self.cfg.clone(),
            handler,
            hooks,
            self.state.clone(),
            signal,
        ));
        Ok(RunningConsumer {
            shutdown: shutdown_tx,
            handle,
        })
    }
}

async fn run_driver(
    relay: Arc<Relay>,
    cfg: ConsumerConfig,
    handler: MessageHandler,
    hooks: ConsumerHooks,
    state: Arc<AtomicU8>,
    shutdown: ShutdownSignal,
) {
    let queue = relay.queue();
    let opts = ReceiveOptions {
        wait_ms: cfg.poll_interval_ms,
        visibility_timeout_secs: cfg.visibility_timeout_secs,
        max_messages: cfg.batch_size,
    };
    let visibility = Duration::from_secs(cfg.visibility_timeout_secs);
    let semaphore = Arc::new(Semaphore::new(cfg.concurrency));
    'poll: loop {
        let batch = tokio::select! {
            _ = shutdown.clone() => break 'poll,
            received = queue.receive(&opts) => match received {
                Ok(batch) => batch,
                Err(err) => {
                    hooks.error(&err);
                    tokio::select! {
                        _ = shutdown.clone() => break 'poll,
                        _ = tokio::time::sleep(Duration::from_millis(cfg.poll_interval_ms)) => {}
                    }
                    continue 'poll;
                }
            },
        };
        for message in batch {
            let permit = tokio::select! {
                _ = shutdown.clone() => break 'poll,
                acquired = semaphore.clone().acquire_owned() => match acquired {
                    Ok(permit) => permit,
                    Err(_) => break 'poll,
                },
            };
            let relay = relay.clone();
            let queue = queue.clone();
            let handler = handler.clone();
            let hooks = hooks.clone();
            tokio::spawn(async move {
                let _permit = permit;
                process_message(relay, queue, message, &handler, &hooks, visibility).await;
            });
        }
    }
    state.store(STATE_STOPPING, Ordering::Release);
    let _ = semaphore.acquire_many(cfg.concurrency as u32).await;
    state.store(STATE_STOPPED, Ordering::Release);
    hooks.stopped();
}

async fn process_message(
    relay: Arc<Relay>,
    queue: DynQueueTransport,
    message: QueueMessage,
    handler: &MessageHandler,
    hooks: &ConsumerHooks,
    visibility: Duration,
) {
    hooks.received(&message);
    let outcome = match tokio::time::timeout(visibility, relay.consume(&message, handler)).await {
        Err(_) => {
            hooks.timeout(&message);
            return;
        }
        Ok(Err(err)) => {
            hooks.processing_error(&err, &message);
            return;
        }
        Ok(Ok(outcome)) => outcome,
    };
    match outcome {
        // left to the queue's redelivery/DLQ policy
        ConsumeOutcome::Foreign => return,
        ConsumeOutcome::CleanupFailed(err) => hooks.error(&err),
        ConsumeOutcome::Delivered | ConsumeOutcome::RecordAbsent => {}
    }
    if let Err(err) = queue.ack(&message.receipt).await {
        hooks.error(&err);
        return;
    }
    hooks.processed(&message);
}
