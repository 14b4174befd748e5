use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;
use tokio::sync::{Mutex as AsyncMutex, mpsc};
use tokio::task::JoinHandle;

use super::ingestor::Ingestor;
use crate::domain::entities::MetricSample;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum QueueError {
    #[error("ingest queue is closed")]
    Closed,
}

/// Bounded hand-off between request handlers and the ingestion workers.
///
/// Handlers acknowledge as soon as a sample is queued; workers run the
/// pipeline in the background. `submit` waits for room rather than
/// rejecting a valid sample.
pub struct IngestQueue {
    sender: Mutex<Option<mpsc::Sender<MetricSample>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl IngestQueue {
    /// Spawn `workers` tasks consuming a queue of `capacity` samples.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn start(ingestor: Arc<Ingestor>, capacity: usize, workers: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, receiver) = mpsc::channel(capacity);
        let receiver = Arc::new(AsyncMutex::new(receiver));

        let handles = (0..workers.max(1))
            .map(|id| {
                tokio::spawn(run_worker(
                    id,
                    Arc::clone(&receiver),
                    Arc::clone(&ingestor),
                ))
            })
            .collect();

        Self {
            sender: Mutex::new(Some(sender)),
            workers: Mutex::new(handles),
        }
    }

    /// Queue a validated sample for background processing.
    ///
    /// # Errors
    ///
    /// Returns `QueueError::Closed` once [`IngestQueue::shutdown`] has begun.
    pub async fn submit(&self, sample: MetricSample) -> Result<(), QueueError> {
        let sender = self
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(QueueError::Closed)?;
        sender.send(sample).await.map_err(|_| QueueError::Closed)
    }

    /// Stop accepting samples, let the workers drain the queue, and wait for
    /// them to finish.
    pub async fn shutdown(&self) {
        drop(
            self.sender
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take(),
        );
        let handles: Vec<_> = self
            .workers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        for handle in handles {
            if let Err(e) = handle.await {
                tracing::error!("ingest worker panicked: {e}");
            }
        }
        tracing::info!("ingest queue drained");
    }
}

async fn run_worker(
    id: usize,
    receiver: Arc<AsyncMutex<mpsc::Receiver<MetricSample>>>,
    ingestor: Arc<Ingestor>,
) {
    loop {
        let next = receiver.lock().await.recv().await;
        let Some(sample) = next else {
            break;
        };
        ingestor.process(&sample).await;
    }
    tracing::debug!(worker = id, "ingest worker stopped");
}
