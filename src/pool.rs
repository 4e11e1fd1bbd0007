//! Bounded-concurrency worker pool.
//!
//! A fixed set of spawned workers pull items from a shared queue until it is
//! drained. A semaphore additionally gates how many worker invocations are in
//! flight at once, so effective parallelism never exceeds the configured
//! limit. The pool can be nested: an inner pool built inside an outer
//! worker's body bounds only its own level.

use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, Mutex, Semaphore};
use tracing::{trace, warn};

/// Why one item of a pool run produced no value.
#[derive(Error, Debug)]
pub enum TaskError<E> {
    #[error("{0}")]
    Failed(E),

    #[error("worker panicked: {0}")]
    Panicked(String),
}

/// Outcomes of one pool run, in completion order.
#[derive(Debug)]
pub struct PoolOutput<R, E> {
    results: Vec<Result<R, TaskError<E>>>,
}

impl<R, E> PoolOutput<R, E> {
    /// Number of outcomes; always equal to the number of inputs.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// First failure observed in completion order.
    pub fn first_error(&self) -> Option<&TaskError<E>> {
        self.results.iter().find_map(|r| r.as_ref().err())
    }

    /// Successful values only, in completion order.
    pub fn into_values(self) -> impl Iterator<Item = R> {
        self.results.into_iter().filter_map(|r| r.ok())
    }
}

/// Generic task executor with a fixed concurrency limit.
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    concurrency: usize,
}

impl WorkerPool {
    /// Create a pool. A limit of zero is treated as one.
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Run `worker` over every input and collect all outcomes.
    ///
    /// Failures never cancel sibling items, and an invocation that panics is
    /// recorded as `TaskError::Panicked` without taking its worker down. The
    /// returned outcomes are in completion order, with no positional
    /// correspondence to `inputs`.
    pub async fn run<T, R, E, F, Fut>(&self, inputs: Vec<T>, worker: F) -> PoolOutput<R, E>
    where
        T: Send + 'static,
        R: Send + 'static,
        E: Send + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, E>> + Send + 'static,
    {
        let total = inputs.len();
        if total == 0 {
            return PoolOutput {
                results: Vec::new(),
            };
        }

        let (queue_tx, queue_rx) = mpsc::channel::<T>(total);
        for input in inputs {
            // Capacity equals the input count, so this never blocks or fails.
            if queue_tx.try_send(input).is_err() {
                warn!("Worker queue rejected an item");
            }
        }
        drop(queue_tx);

        let queue = Arc::new(Mutex::new(queue_rx));
        let gate = Arc::new(Semaphore::new(self.concurrency));
        let worker = Arc::new(worker);
        let (result_tx, mut result_rx) = mpsc::unbounded_channel::<Result<R, TaskError<E>>>();

        let workers = self.concurrency.min(total);
        trace!("Starting {} workers for {} items", workers, total);

        let handles: Vec<_> = (0..workers)
            .map(|_| {
                let queue = queue.clone();
                let gate = gate.clone();
                let worker = worker.clone();
                let result_tx = result_tx.clone();

                tokio::spawn(async move {
                    loop {
                        let next = queue.lock().await.recv().await;
                        let Some(item) = next else {
                            break;
                        };

                        let outcome = {
                            // The semaphore is never closed, so acquire only
                            // fails if that changes; run the item regardless.
                            let _permit = gate.acquire().await.ok();
                            match tokio::spawn(worker(item)).await {
                                Ok(outcome) => outcome.map_err(TaskError::Failed),
                                Err(e) => {
                                    warn!("Worker invocation failed: {}", e);
                                    Err(TaskError::Panicked(e.to_string()))
                                }
                            }
                        };

                        if result_tx.send(outcome).is_err() {
                            break;
                        }
                    }
                })
            })
            .collect();
        drop(result_tx);

        let mut results = Vec::with_capacity(total);
        while let Some(outcome) = result_rx.recv().await {
            results.push(outcome);
        }

        for handle in handles {
            if let Err(e) = handle.await {
                warn!("Worker task failed: {}", e);
            }
        }

        PoolOutput { results }
    }
}
