//! Request queue, debounce timer and result fan-in

use super::config::ClientConfig;
use super::errors::{ClientError, Result};
use super::request::ClientRequest;
use super::stats::StatsCollector;
use super::transport::Transport;
use crate::core::batch::{BatchOptions, BatchRequest, BatchRequestPayload, RequestIdGenerator};
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::{Arc, Weak};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// A queued request and the channel completing its caller's future
pub(crate) struct PendingRequest {
    pub(crate) request: BatchRequest,
    pub(crate) responder: oneshot::Sender<Result<Value>>,
}

/// Queue state of the current cycle.
///
/// `cycle` is bumped on every flush; a timer only flushes the cycle it was
/// armed for.
#[derive(Default)]
struct QueueState {
    pending: Vec<PendingRequest>,
    cycle: u64,
    timer: Option<JoinHandle<()>>,
}

impl QueueState {
    fn take_batch(&mut self) -> Vec<PendingRequest> {
        self.cycle = self.cycle.wrapping_add(1);
        std::mem::take(&mut self.pending)
    }
}

pub(crate) struct Dispatcher {
    config: ClientConfig,
    transport: Transport,
    ids: RequestIdGenerator,
    queue: Mutex<QueueState>,
    stats: Arc<StatsCollector>,
}

impl Dispatcher {
    pub(crate) fn new(config: ClientConfig) -> Result<Self> {
        config.validate().map_err(ClientError::Config)?;
        let stats = Arc::new(StatsCollector::default());
        let transport = Transport::new(&config, Arc::clone(&stats))?;

        Ok(Self {
            config,
            transport,
            ids: RequestIdGenerator::new(),
            queue: Mutex::new(QueueState::default()),
            stats,
        })
    }

    pub(crate) fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub(crate) fn stats(&self) -> &StatsCollector {
        &self.stats
    }

    pub(crate) fn queued(&self) -> usize {
        self.queue.lock().pending.len()
    }

    /// Run one logical request through the batched or direct path
    pub(crate) async fn submit(self: &Arc<Self>, request: ClientRequest) -> Result<Value> {
        if !self.config.enable_batching {
            return self.transport.send_direct(&request).await;
        }

        let id = self.ids.next_id();
        let receiver = self.enqueue(request.into_batch_request(id));
        receiver.await.map_err(|_| ClientError::Cancelled)?
    }

    fn enqueue(self: &Arc<Self>, request: BatchRequest) -> oneshot::Receiver<Result<Value>> {
        let (responder, receiver) = oneshot::channel();

        let ready = {
            let mut state = self.queue.lock();
            state.pending.push(PendingRequest { request, responder });

            if state.pending.len() >= self.config.max_batch_size {
                if let Some(timer) = state.timer.take() {
                    timer.abort();
                }
                Some(state.take_batch())
            } else {
                if state.timer.is_none() {
                    state.timer = Some(self.arm_timer(state.cycle));
                }
                None
            }
        };

        if let Some(batch) = ready {
            debug!(size = batch.len(), "Batch size limit reached, flushing");
            tokio::spawn(Arc::clone(self).dispatch(batch));
        }

        receiver
    }

    fn arm_timer(self: &Arc<Self>, cycle: u64) -> JoinHandle<()> {
        let dispatcher: Weak<Self> = Arc::downgrade(self);
        let window = self.config.batch_window();

        tokio::spawn(async move {
            tokio::time::sleep(window).await;
            if let Some(dispatcher) = dispatcher.upgrade() {
                dispatcher.flush_cycle(cycle).await;
            }
        })
    }

    async fn flush_cycle(self: Arc<Self>, cycle: u64) {
        let batch = {
            let mut state = self.queue.lock();
            if state.cycle != cycle || state.pending.is_empty() {
                return;
            }
            // This task is the timer; drop the handle without aborting it.
            state.timer = None;
            state.take_batch()
        };

        debug!(size = batch.len(), "Batch window elapsed, flushing");
        self.dispatch(batch).await;
    }

    /// Dispatch whatever is queued and wait for that batch to complete
    pub(crate) async fn flush(self: &Arc<Self>) -> Result<()> {
        let batch = {
            let mut state = self.queue.lock();
            if state.pending.is_empty() {
                return Ok(());
            }
            if let Some(timer) = state.timer.take() {
                timer.abort();
            }
            state.take_batch()
        };

        tokio::spawn(Arc::clone(self).dispatch(batch))
            .await
            .map_err(|_| ClientError::Cancelled)
    }

    async fn dispatch(self: Arc<Self>, batch: Vec<PendingRequest>) {
        let size = batch.len();
        let (requests, responders): (Vec<BatchRequest>, Vec<_>) = batch
            .into_iter()
            .map(|pending| (pending.request, pending.responder))
            .unzip();
        let ids: Vec<String> = requests.iter().map(|r| r.id.clone()).collect();

        self.stats.record_batch(size);
        let payload = BatchRequestPayload {
            requests,
            options: BatchOptions::new(true, true),
        };

        match self.transport.send_batch(&payload).await {
            Ok(response) => {
                let mut results = response.into_index();
                for (id, responder) in ids.into_iter().zip(responders) {
                    let outcome = match results.remove(&id) {
                        Some(result) if result.success => Ok(result.data.unwrap_or(Value::Null)),
                        Some(result) => Err(ClientError::Request(
                            result.error.unwrap_or_else(|| "Request failed".to_string()),
                        )),
                        None => {
                            warn!(id = %id, "Batch response is missing a result");
                            Err(ClientError::ResultNotFound)
                        }
                    };
                    // The caller may have given up waiting
                    let _ = responder.send(outcome);
                }
                debug!(size, "Batch completed");
            }
            Err(error) => {
                warn!(size, error = %error, "Batch request failed, rejecting all members");
                let message = error.to_string();
                for responder in responders {
                    let _ = responder.send(Err(ClientError::BatchFailed(message.clone())));
                }
            }
        }
    }
}
