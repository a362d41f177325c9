//! Helper threads for blocking collaborator calls.
//!
//! Each job runs on its own named thread and reports back over a one-shot
//! channel. The controller polls the handle at the start of a tick or waits
//! on it with a bounded timeout, so a slow collaborator never stalls the
//! control loop for longer than that timeout.

use anyhow::{Context, Result};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::time::{Duration, Instant};

/// Outcome of checking a pending job.
#[derive(Debug)]
pub(crate) enum TaskPoll<T> {
    Ready(T),
    Pending,
    /// The worker thread ended without reporting (it panicked).
    Lost,
}

/// Handle to a job running on a helper thread.
///
/// The handle carries the controller generation that was current when the
/// job started; results from an older generation are stale.
pub(crate) struct PendingTask<T> {
    generation: u64,
    started: Instant,
    rx: Receiver<T>,
}

impl<T> PendingTask<T> {
    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn age(&self) -> Duration {
        self.started.elapsed()
    }

    pub(crate) fn poll(&self) -> TaskPoll<T> {
        match self.rx.try_recv() {
            Ok(value) => TaskPoll::Ready(value),
            Err(TryRecvError::Empty) => TaskPoll::Pending,
            Err(TryRecvError::Disconnected) => TaskPoll::Lost,
        }
    }

    pub(crate) fn wait(&self, timeout: Duration) -> TaskPoll<T> {
        match self.rx.recv_timeout(timeout) {
            Ok(value) => TaskPoll::Ready(value),
            Err(RecvTimeoutError::Timeout) => TaskPoll::Pending,
            Err(RecvTimeoutError::Disconnected) => TaskPoll::Lost,
        }
    }
}

/// Run `job` on a new thread named `name`.
pub(crate) fn spawn<T, F>(name: &str, generation: u64, job: F) -> Result<PendingTask<T>>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    std::thread::Builder::new()
        .name(name.to_string())
        .spawn(move || {
            // The receiver is gone when the result was abandoned
            let _ = tx.send(job());
        })
        .with_context(|| format!("Failed to spawn {name} thread"))?;

    Ok(PendingTask {
        generation,
        started: Instant::now(),
        rx,
    })
}
