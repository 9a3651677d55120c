//! Task runner seam.
//!
//! Hooks never await their own fetch; they hand it to a runner and publish
//! the outcome when the task completes.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use futures::future::BoxFuture;

/// Spawns detached fetch tasks.
pub trait TaskRunner: Send + Sync {
    fn spawn(&self, task: BoxFuture<'static, ()>);
}

/// Runs tasks on the ambient tokio runtime.
///
/// # Panics
///
/// `spawn` panics when called outside a tokio runtime, as `tokio::spawn` does.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioRunner;

impl TaskRunner for TokioRunner {
    fn spawn(&self, task: BoxFuture<'static, ()>) {
        tokio::spawn(task);
    }
}

/// Queues tasks until the caller drives them.
///
/// Lets tests decide exactly when, and in which order, fetches settle.
#[derive(Default)]
pub struct ManualRunner {
    pending: Mutex<VecDeque<BoxFuture<'static, ()>>>,
}

impl ManualRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.queue().len()
    }

    /// Drive the oldest queued task to completion. Returns false when idle.
    pub async fn run_next(&self) -> bool {
        let next = self.queue().pop_front();
        match next {
            Some(task) => {
                task.await;
                true
            }
            None => false,
        }
    }

    /// Drive queued tasks, including ones queued while running, until idle.
    pub async fn run_all(&self) -> usize {
        let mut ran = 0;
        while self.run_next().await {
            ran += 1;
        }
        ran
    }

    fn queue(&self) -> std::sync::MutexGuard<'_, VecDeque<BoxFuture<'static, ()>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TaskRunner for ManualRunner {
    fn spawn(&self, task: BoxFuture<'static, ()>) {
        self.queue().push_back(task);
    }
}
