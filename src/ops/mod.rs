//! Simulated long-running console operations.
//!
//! Nothing here performs I/O. An operation runs on a worker thread after a
//! fixed delay and reports back over a channel; the owner polls for the
//! result from its own event loop. Cancelling (or dropping the owner) raises
//! a stop flag so a late timer never delivers into discarded state.

pub mod connection;

pub use connection::{ConnectionProbe, ConnectionReport};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const STOP_CHECK_INTERVAL: Duration = Duration::from_millis(25);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OperationError {
    #[error("operation was cancelled")]
    Cancelled,
    #[error("operation worker exited without a result")]
    WorkerLost,
    #[error("operation failed: {0}")]
    Failed(String),
}

/// Work that resolves to a result or an error once its delay has elapsed.
pub trait ConsoleOperation: Send + 'static {
    type Output: Send + 'static;

    fn label(&self) -> &'static str;
    fn run(self) -> Result<Self::Output, OperationError>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum OperationStatus<T> {
    Idle,
    Pending,
    Done(Result<T, OperationError>),
}

impl<T> OperationStatus<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Pending => "pending",
            Self::Done(Ok(_)) => "done",
            Self::Done(Err(_)) => "failed",
        }
    }
}

#[derive(Debug)]
struct PendingRun<T> {
    stop: Arc<AtomicBool>,
    rx: Receiver<Result<T, OperationError>>,
}

/// Idle/pending/done status of at most one running operation.
#[derive(Debug)]
pub struct SimulatedOperation<T> {
    status: OperationStatus<T>,
    pending: Option<PendingRun<T>>,
}

impl<T> Default for SimulatedOperation<T> {
    fn default() -> Self {
        Self {
            status: OperationStatus::Idle,
            pending: None,
        }
    }
}

impl<T> SimulatedOperation<T> {
    pub fn status(&self) -> &OperationStatus<T> {
        &self.status
    }

    pub fn is_pending(&self) -> bool {
        self.status.is_pending()
    }

    /// Stops a pending run. The status returns to `Idle`.
    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.stop.store(true, Ordering::Relaxed);
        }
        if self.status.is_pending() {
            self.status = OperationStatus::Idle;
        }
    }

    /// Hands out a finished result and resets to `Idle`.
    pub fn take_result(&mut self) -> Option<Result<T, OperationError>> {
        if !matches!(self.status, OperationStatus::Done(_)) {
            return None;
        }
        match std::mem::replace(&mut self.status, OperationStatus::Idle) {
            OperationStatus::Done(result) => Some(result),
            _ => None,
        }
    }
}

impl<T: Send + 'static> SimulatedOperation<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts `op` after `delay`. Returns false when a run is already pending.
    pub fn start<O>(&mut self, op: O, delay: Duration) -> bool
    where
        O: ConsoleOperation<Output = T>,
    {
        if self.status.is_pending() {
            return false;
        }
        let stop = Arc::new(AtomicBool::new(false));
        let worker_stop = Arc::clone(&stop);
        let (tx, rx) = mpsc::channel();
        let label = op.label();
        let spawned = thread::Builder::new()
            .name(format!("op-{label}"))
            .spawn(move || {
                if !sleep_with_stop(&worker_stop, delay) {
                    return;
                }
                let result = op.run();
                if worker_stop.load(Ordering::Relaxed) {
                    return;
                }
                let _ = tx.send(result);
            });
        match spawned {
            Ok(_) => {
                self.pending = Some(PendingRun { stop, rx });
                self.status = OperationStatus::Pending;
            }
            Err(err) => {
                self.status = OperationStatus::Done(Err(OperationError::Failed(format!(
                    "failed to spawn {label} worker: {err}"
                ))));
            }
        }
        true
    }

    /// Collects a finished result without blocking.
    pub fn poll(&mut self) -> &OperationStatus<T> {
        let outcome = match &self.pending {
            Some(pending) => match pending.rx.try_recv() {
                Ok(result) => Some(result),
                Err(TryRecvError::Empty) => None,
                Err(TryRecvError::Disconnected) => Some(Err(OperationError::WorkerLost)),
            },
            None => None,
        };
        if let Some(result) = outcome {
            self.pending = None;
            self.status = OperationStatus::Done(result);
        }
        &self.status
    }

    /// Blocks up to `timeout` for a pending run to finish.
    pub fn wait(&mut self, timeout: Duration) -> &OperationStatus<T> {
        let outcome = match &self.pending {
            Some(pending) => match pending.rx.recv_timeout(timeout) {
                Ok(result) => Some(result),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => Some(Err(OperationError::WorkerLost)),
            },
            None => None,
        };
        if let Some(result) = outcome {
            self.pending = None;
            self.status = OperationStatus::Done(result);
        }
        &self.status
    }
}

impl<T> Drop for SimulatedOperation<T> {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.stop.store(true, Ordering::Relaxed);
        }
    }
}

pub(crate) fn sleep_with_stop(stop: &AtomicBool, total: Duration) -> bool {
    let mut remaining = total;
    while remaining > Duration::from_millis(0) {
        if stop.load(Ordering::Relaxed) {
            return false;
        }
        let step = remaining.min(STOP_CHECK_INTERVAL);
        thread::sleep(step);
        remaining = remaining.saturating_sub(step);
    }
    !stop.load(Ordering::Relaxed)
}
