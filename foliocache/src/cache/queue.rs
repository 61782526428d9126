//! Serial disk work queue.
//!
//! Every disk operation of one cache instance runs through a single FIFO
//! queue drained by one background task. This gives two guarantees without
//! any file locking:
//!
//! 1. Two writers never touch the same file at the same time
//! 2. An operation submitted before another completes before it starts
//!
//! Jobs are blocking closures; the worker runs each one on Tokio's blocking
//! pool and waits for it before taking the next.
//!
//! # Example
//!
//! ```ignore
//! let queue = DiskQueue::start("com.myportfolio.queue.Default")?;
//!
//! // Fire and forget
//! let _ = queue.submit("write", move || std::fs::write(&path, &bytes));
//!
//! // Request/response
//! let exists = queue.run("exists", move || path.is_file()).await?;
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace, warn};

use super::traits::CacheError;

/// Prefix used for queue labels in logs.
pub const QUEUE_LABEL_PREFIX: &str = "com.myportfolio.queue.";

type Job = Box<dyn FnOnce() + Send + 'static>;

/// A job waiting to be executed.
struct QueuedJob {
    /// Operation name for logging.
    name: &'static str,
    /// Submission order within this queue.
    sequence: u64,
    /// When the job was enqueued (for wait time logging).
    enqueued_at: Instant,
    run: Job,
}

/// Handle to a per-instance serial disk queue.
///
/// The background worker stops once every handle is dropped and the
/// remaining jobs have run.
pub struct DiskQueue {
    label: String,
    tx: mpsc::UnboundedSender<QueuedJob>,
    sequence: AtomicU64,
}

impl DiskQueue {
    /// Start the queue worker on the current Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::NoRuntime` when called outside a runtime.
    pub fn start(label: impl Into<String>) -> Result<Self, CacheError> {
        let handle = Handle::try_current().map_err(|e| CacheError::NoRuntime(e.to_string()))?;
        let label = label.into();
        let (tx, rx) = mpsc::unbounded_channel();

        handle.spawn(run_worker(label.clone(), rx));

        Ok(Self {
            label,
            tx,
            sequence: AtomicU64::new(0),
        })
    }

    /// Queue label, used in log fields.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Enqueue `job` and return a receiver for its result.
    ///
    /// Returns immediately. Dropping the receiver does not cancel the job.
    pub fn submit<R, F>(&self, name: &'static str, job: F) -> Result<oneshot::Receiver<R>, CacheError>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let queued = QueuedJob {
            name,
            sequence: self.sequence.fetch_add(1, Ordering::Relaxed),
            enqueued_at: Instant::now(),
            run: Box::new(move || {
                // Receiver may have been dropped by a fire-and-forget caller
                let _ = reply_tx.send(job());
            }),
        };

        self.tx.send(queued).map_err(|_| CacheError::QueueClosed)?;
        Ok(reply_rx)
    }

    /// Enqueue `job` and wait for its result.
    pub async fn run<R, F>(&self, name: &'static str, job: F) -> Result<R, CacheError>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let rx = self.submit(name, job)?;
        rx.await.map_err(|_| CacheError::QueueClosed)
    }

    /// Wait until every job submitted before this call has run.
    pub async fn flush(&self) {
        if let Err(e) = self.run("flush", || ()).await {
            warn!(queue = %self.label, error = %e, "Disk queue flush failed");
        }
    }
}

async fn run_worker(label: String, mut rx: mpsc::UnboundedReceiver<QueuedJob>) {
    debug!(queue = %label, "Disk queue started");

    while let Some(job) = rx.recv().await {
        let QueuedJob {
            name,
            sequence,
            enqueued_at,
            run,
        } = job;

        trace!(
            queue = %label,
            job = name,
            sequence,
            wait_us = enqueued_at.elapsed().as_micros() as u64,
            "Running disk job"
        );

        if let Err(e) = tokio::task::spawn_blocking(run).await {
            warn!(queue = %label, job = name, sequence, error = %e, "Disk job did not complete");
        }
    }

    debug!(queue = %label, "Disk queue stopped");
}
